//! Deviation semantics.

use std::collections::{HashMap, HashSet};

use yangforge::foundation::{QName, QNameModule};
use yangforge::model::{StatementRecord, StatementSource, YangKeyword};
use yangforge::reactor::Reactor;

use crate::util::{module, source, stmt, string_leaf};

const FOO_NS: &str = "urn:dev-foo";
const BAR_NS: &str = "urn:dev-bar";

fn foo(local: &str) -> QName {
    QName::create(FOO_NS, local).unwrap()
}

// module foo: container target-cont { leaf timeout { type uint32? string } }
fn foo_module() -> StatementSource {
    let root = module("foo", FOO_NS, "f").with_child(
        stmt(YangKeyword::Container, "target-cont").with_child(string_leaf("timeout")),
    );
    source("foo.yang", root)
}

fn bar_module(deviations: impl IntoIterator<Item = StatementRecord>) -> StatementSource {
    let mut root = module("bar", BAR_NS, "b")
        .with_child(stmt(YangKeyword::Import, "foo").with_child(stmt(YangKeyword::Prefix, "f")));
    for deviation in deviations {
        root = root.with_child(deviation);
    }
    source("bar.yang", root)
}

fn target_cont(model: &yangforge::model::EffectiveModelContext) -> std::sync::Arc<yangforge::model::EffectiveStatement> {
    model
        .find_data_tree_child([foo("target-cont")])
        .expect("target container present")
}

#[test]
fn deviate_replace_on_implicit_config_succeeds() {
    // The target has no explicit config statement; the implicit
    // `config true` is replaced.
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont").with_child(
        stmt(YangKeyword::Deviate, "replace").with_child(stmt(YangKeyword::Config, "false")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let model = reactor.build().unwrap();

    assert!(!target_cont(&model).flags().is_config());
}

#[test]
fn deviate_replace_then_delete_equals_delete_alone() {
    // Both deviates name the same implicit substatement; the delete wins
    // and the model ends up exactly where a lone delete leaves it.
    let replace_then_delete = stmt(YangKeyword::Deviation, "/f:target-cont")
        .with_child(
            stmt(YangKeyword::Deviate, "replace").with_child(stmt(YangKeyword::Config, "false")),
        )
        .with_child(
            stmt(YangKeyword::Deviate, "delete").with_child(stmt(YangKeyword::Config, "false")),
        );
    let delete_alone = stmt(YangKeyword::Deviation, "/f:target-cont").with_child(
        stmt(YangKeyword::Deviate, "delete").with_child(stmt(YangKeyword::Config, "false")),
    );

    let mut first = Reactor::new();
    first.add_source(&foo_module());
    first.add_source(&bar_module([replace_then_delete]));
    let first_model = first.build().unwrap();

    let mut second = Reactor::new();
    second.add_source(&foo_module());
    second.add_source(&bar_module([delete_alone]));
    let second_model = second.build().unwrap();

    let foo_module_id = QNameModule::of(FOO_NS);
    assert_eq!(
        first_model.find_module(&foo_module_id),
        second_model.find_module(&foo_module_id)
    );
    assert!(target_cont(&first_model).flags().is_config());
}

#[test]
fn deviate_not_supported_removes_the_target() {
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont")
        .with_child(stmt(YangKeyword::Deviate, "not-supported"));

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let model = reactor.build().unwrap();

    assert!(model.find_data_tree_child([foo("target-cont")]).is_none());
}

#[test]
fn deviate_add_units_lands_on_the_leaf() {
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont/f:timeout").with_child(
        stmt(YangKeyword::Deviate, "add").with_child(stmt(YangKeyword::Units, "seconds")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let model = reactor.build().unwrap();

    let timeout = model
        .find_data_tree_child([foo("target-cont"), foo("timeout")])
        .unwrap();
    let units = timeout
        .find_first(YangKeyword::Units)
        .and_then(|u| u.argument().as_str().map(str::to_string));
    assert_eq!(units.as_deref(), Some("seconds"));
}

#[test]
fn deviate_add_of_existing_singleton_is_rejected() {
    // timeout already carries units after the first deviation; adding a
    // second one violates the singleton rule.
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont/f:timeout")
        .with_child(
            stmt(YangKeyword::Deviate, "add").with_child(stmt(YangKeyword::Units, "seconds")),
        )
        .with_child(
            stmt(YangKeyword::Deviate, "add").with_child(stmt(YangKeyword::Units, "minutes")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let err = reactor.build().unwrap_err();
    assert!(err
        .to_string()
        .contains("already defined in target and can appear only once"));
}

#[test]
fn deviate_delete_of_missing_substatement_is_not_an_error() {
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont/f:timeout").with_child(
        stmt(YangKeyword::Deviate, "delete").with_child(stmt(YangKeyword::Units, "seconds")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    // Logged, not raised.
    let model = reactor.build().unwrap();
    let timeout = model
        .find_data_tree_child([foo("target-cont"), foo("timeout")])
        .unwrap();
    assert!(timeout.find_first(YangKeyword::Units).is_none());
}

#[test]
fn unsupported_deviation_module_is_silently_dropped() {
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont").with_child(
        stmt(YangKeyword::Deviate, "replace").with_child(stmt(YangKeyword::Config, "false")),
    );

    // foo accepts deviations only from a module that is not bar.
    let mut supported = HashMap::new();
    supported.insert(
        QNameModule::of(FOO_NS),
        HashSet::from([QNameModule::of("urn:somebody-else")]),
    );

    let mut reactor = Reactor::new().with_supported_deviations(supported);
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let model = reactor.build().unwrap();

    // The deviation was dropped; the implicit config survives.
    assert!(target_cont(&model).flags().is_config());
}

#[test]
fn bad_deviate_argument_is_a_source_error() {
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont")
        .with_child(stmt(YangKeyword::Deviate, "remove"));

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let err = reactor.build().unwrap_err();
    assert!(err
        .to_string()
        .contains("String 'remove' is not valid deviate argument"));
}

#[test]
fn deviation_target_kind_is_validated() {
    // unique only applies to lists; target-cont is a container.
    let deviation = stmt(YangKeyword::Deviation, "/f:target-cont").with_child(
        stmt(YangKeyword::Deviate, "add").with_child(stmt(YangKeyword::Unique, "timeout")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    reactor.add_source(&bar_module([deviation]));
    let err = reactor.build().unwrap_err();
    assert!(err
        .to_string()
        .contains("is not a valid deviation target for substatement UNIQUE"));
}
