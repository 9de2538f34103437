//! Choice case enforcement in the apply engine.

use yangforge::data::{DataValue, InMemoryDataTree, InstancePath, NormalizedNode, PathArg};
use yangforge::foundation::QName;
use yangforge::model::YangKeyword;

use crate::util::{compile, stmt, typed_leaf};

const NS: &str = "urn:choice-data";

fn qn(local: &str) -> QName {
    QName::create(NS, local).unwrap()
}

// module c { choice mode { case a { leaf x; } case b { leaf y; } } }
fn tree() -> InMemoryDataTree {
    let model = compile(
        "c",
        NS,
        "c",
        vec![stmt(YangKeyword::Choice, "mode")
            .with_child(stmt(YangKeyword::Case, "a").with_child(typed_leaf("x", "uint8")))
            .with_child(stmt(YangKeyword::Case, "b").with_child(typed_leaf("y", "uint8")))],
    );
    InMemoryDataTree::new(&model).unwrap()
}

fn choice_with(leaves: &[(&str, u8)]) -> NormalizedNode {
    let mut node = NormalizedNode::choice(qn("mode"));
    for (name, value) in leaves {
        node = node.with_child(NormalizedNode::leaf(qn(name), DataValue::Uint8(*value)));
    }
    node
}

fn mode_path() -> InstancePath {
    InstancePath::of([PathArg::Node(qn("mode"))])
}

#[test]
fn children_from_two_cases_are_rejected() {
    let mut tree = tree();
    let mut modification = tree.new_modification();
    modification
        .write(&mode_path(), choice_with(&[("x", 1), ("y", 2)]))
        .unwrap();
    modification.seal();

    let err = tree.commit(&modification).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("x"), "message should name x: {message}");
    assert!(message.contains("y"), "message should name y: {message}");
}

#[test]
fn single_case_write_succeeds_and_replacement_switches_cases() {
    let mut tree = tree();

    let mut first = tree.new_modification();
    first.write(&mode_path(), choice_with(&[("x", 1)])).unwrap();
    first.seal();
    tree.commit(&first).unwrap();

    let snapshot = tree.snapshot();
    let mode = snapshot.child(&PathArg::Node(qn("mode"))).unwrap();
    assert!(mode.data().child(&PathArg::Node(qn("x"))).is_some());

    // A subsequent write replaces the choice contents entirely.
    let mut second = tree.new_modification();
    second.write(&mode_path(), choice_with(&[("y", 2)])).unwrap();
    second.seal();
    tree.commit(&second).unwrap();

    let snapshot = tree.snapshot();
    let mode = snapshot.child(&PathArg::Node(qn("mode"))).unwrap();
    assert!(mode.data().child(&PathArg::Node(qn("x"))).is_none());
    assert!(mode.data().child(&PathArg::Node(qn("y"))).is_some());
}

#[test]
fn unknown_child_cannot_select_a_case() {
    let mut tree = tree();
    let mut modification = tree.new_modification();
    let stray = NormalizedNode::choice(qn("mode"))
        .with_child(NormalizedNode::leaf(qn("z"), DataValue::Uint8(9)));
    modification.write(&mode_path(), stray).unwrap();
    modification.seal();

    let err = tree.commit(&modification).unwrap_err();
    assert!(err.to_string().contains("does not belong"));
}

#[test]
fn merge_into_the_active_case_keeps_the_choice() {
    let mut tree = tree();

    let mut first = tree.new_modification();
    first.write(&mode_path(), choice_with(&[("x", 1)])).unwrap();
    first.seal();
    tree.commit(&first).unwrap();

    let mut merge = tree.new_modification();
    merge
        .merge(&mode_path(), choice_with(&[("x", 7)]))
        .unwrap();
    merge.seal();
    tree.commit(&merge).unwrap();

    let snapshot = tree.snapshot();
    let mode = snapshot.child(&PathArg::Node(qn("mode"))).unwrap();
    let x = mode.data().child(&PathArg::Node(qn("x"))).unwrap();
    assert_eq!(x.value(), Some(&DataValue::Uint8(7)));
}

#[test]
fn merge_that_mixes_cases_is_rejected() {
    let mut tree = tree();

    let mut first = tree.new_modification();
    first.write(&mode_path(), choice_with(&[("x", 1)])).unwrap();
    first.seal();
    tree.commit(&first).unwrap();

    let mut merge = tree.new_modification();
    merge.merge(&mode_path(), choice_with(&[("y", 2)])).unwrap();
    merge.seal();
    let err = tree.commit(&merge).unwrap_err();
    assert!(err.to_string().contains("implies non-presence"));
}
