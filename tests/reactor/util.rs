//! Shared builders for reactor tests.

use yangforge::model::{StatementRecord, StatementSource, YangKeyword};

/// Shorthand for a statement record with an argument.
pub fn stmt(keyword: YangKeyword, arg: &str) -> StatementRecord {
    StatementRecord::new(keyword, Some(arg))
}

/// A module skeleton with namespace and prefix statements.
pub fn module(name: &str, namespace: &str, prefix: &str) -> StatementRecord {
    StatementRecord::new(YangKeyword::Module, Some(name))
        .with_child(stmt(YangKeyword::Namespace, namespace))
        .with_child(stmt(YangKeyword::Prefix, prefix))
}

/// Wraps a record as a named source.
pub fn source(name: &str, root: StatementRecord) -> StatementSource {
    StatementSource::new(name, root)
}

/// A string-typed leaf.
pub fn string_leaf(name: &str) -> StatementRecord {
    stmt(YangKeyword::Leaf, name).with_child(stmt(YangKeyword::Type, "string"))
}

/// A keyed list with one string key leaf.
pub fn keyed_list(name: &str, key: &str) -> StatementRecord {
    stmt(YangKeyword::List, name)
        .with_child(stmt(YangKeyword::Key, key))
        .with_child(string_leaf(key))
}
