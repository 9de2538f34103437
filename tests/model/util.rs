//! Shared builders for model tests.

use std::sync::Arc;

use yangforge::model::{
    EffectiveModelContext, StatementRecord, StatementSource, YangKeyword,
};
use yangforge::reactor::Reactor;

/// Shorthand for a statement record with an argument.
pub fn stmt(keyword: YangKeyword, arg: &str) -> StatementRecord {
    StatementRecord::new(keyword, Some(arg))
}

/// A string-typed leaf.
pub fn string_leaf(name: &str) -> StatementRecord {
    stmt(YangKeyword::Leaf, name).with_child(stmt(YangKeyword::Type, "string"))
}

/// Compiles one module source into a shared model context.
pub fn compile(name: &str, namespace: &str, prefix: &str, body: Vec<StatementRecord>) -> Arc<EffectiveModelContext> {
    let mut root = StatementRecord::new(YangKeyword::Module, Some(name))
        .with_child(stmt(YangKeyword::Namespace, namespace))
        .with_child(stmt(YangKeyword::Prefix, prefix));
    for child in body {
        root = root.with_child(child);
    }
    let mut reactor = Reactor::new();
    reactor.add_source(&StatementSource::new(format!("{name}.yang"), root));
    Arc::new(reactor.build().unwrap())
}
