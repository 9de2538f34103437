//! Grouping expansion.

use yangforge::foundation::QName;
use yangforge::model::{InferenceStack, YangKeyword};
use yangforge::reactor::Reactor;

use crate::util::{module, source, stmt, string_leaf};
use std::sync::Arc;

const NS: &str = "urn:uses";

fn qn(local: &str) -> QName {
    QName::create(NS, local).unwrap()
}

#[test]
fn uses_clones_the_grouping_body() {
    let root = module("m", NS, "m")
        .with_child(
            stmt(YangKeyword::Grouping, "endpoint")
                .with_child(string_leaf("host"))
                .with_child(string_leaf("port")),
        )
        .with_child(
            stmt(YangKeyword::Container, "server").with_child(stmt(YangKeyword::Uses, "endpoint")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("m.yang", root));
    let model = reactor.build().unwrap();

    assert!(model
        .find_data_tree_child([qn("server"), qn("host")])
        .is_some());
    assert!(model
        .find_data_tree_child([qn("server"), qn("port")])
        .is_some());
    // The grouping itself gains no schema slot.
    assert!(model.find_data_tree_child([qn("endpoint")]).is_none());
}

#[test]
fn nested_uses_expand_transitively() {
    let root = module("m", NS, "m")
        .with_child(stmt(YangKeyword::Grouping, "base").with_child(string_leaf("id")))
        .with_child(
            stmt(YangKeyword::Grouping, "wrapper")
                .with_child(stmt(YangKeyword::Uses, "base"))
                .with_child(string_leaf("label")),
        )
        .with_child(
            stmt(YangKeyword::Container, "object").with_child(stmt(YangKeyword::Uses, "wrapper")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("m.yang", root));
    let model = reactor.build().unwrap();

    assert!(model
        .find_data_tree_child([qn("object"), qn("label")])
        .is_some());
    assert!(model
        .find_data_tree_child([qn("object"), qn("id")])
        .is_some());
}

#[test]
fn refine_applies_to_the_clone_not_the_grouping() {
    let root = module("m", NS, "m")
        .with_child(stmt(YangKeyword::Grouping, "g").with_child(string_leaf("name")))
        .with_child(
            stmt(YangKeyword::Container, "a").with_child(
                stmt(YangKeyword::Uses, "g").with_child(
                    stmt(YangKeyword::Refine, "name")
                        .with_child(stmt(YangKeyword::Config, "false")),
                ),
            ),
        )
        .with_child(
            stmt(YangKeyword::Container, "b").with_child(stmt(YangKeyword::Uses, "g")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("m.yang", root));
    let model = reactor.build().unwrap();

    let refined = model.find_data_tree_child([qn("a"), qn("name")]).unwrap();
    let untouched = model.find_data_tree_child([qn("b"), qn("name")]).unwrap();
    assert!(!refined.flags().is_config());
    assert!(untouched.flags().is_config());
}

#[test]
fn grouping_remains_navigable_for_the_stack() {
    let root = module("m", NS, "m")
        .with_child(stmt(YangKeyword::Grouping, "g").with_child(string_leaf("inner")))
        .with_child(
            stmt(YangKeyword::Container, "c").with_child(stmt(YangKeyword::Uses, "g")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("m.yang", root));
    let model = Arc::new(reactor.build().unwrap());

    let mut stack = InferenceStack::of(model);
    stack.enter_grouping(&qn("g")).unwrap();
    stack.enter_schema_tree(&qn("inner")).unwrap();
    assert!(!stack.in_instantiated_context());
}

#[test]
fn self_referential_grouping_is_a_cycle_error() {
    let root = module("m", NS, "m").with_child(
        stmt(YangKeyword::Grouping, "g")
            .with_child(stmt(YangKeyword::Uses, "g"))
            .with_child(string_leaf("x")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("m.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn unresolved_grouping_reports_the_stuck_action() {
    let root = module("m", NS, "m").with_child(
        stmt(YangKeyword::Container, "c").with_child(stmt(YangKeyword::Uses, "missing")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("m.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("Grouping"));
    assert!(err.to_string().contains("missing"));
}
