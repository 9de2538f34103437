//! Write/merge/touch/delete semantics and versioning.

use std::sync::Arc;

use yangforge::data::{DataValue, InMemoryDataTree, InstancePath, NormalizedNode, PathArg};
use yangforge::foundation::QName;
use yangforge::model::YangKeyword;

use crate::util::{compile, stmt, typed_leaf};

const NS: &str = "urn:mods";

fn qn(local: &str) -> QName {
    QName::create(NS, local).unwrap()
}

// module m { container top { leaf a(uint8); leaf b(string, mandatory in
// box); container box { presence? no } list items { key name; leaf name;
// max-elements 2; } } }
fn tree() -> InMemoryDataTree {
    let model = compile(
        "m",
        NS,
        "m",
        vec![stmt(YangKeyword::Container, "top")
            .with_child(typed_leaf("a", "uint8"))
            .with_child(typed_leaf("b", "string"))
            .with_child(
                stmt(YangKeyword::Container, "box")
                    .with_child(
                        typed_leaf("needed", "string")
                            .with_child(stmt(YangKeyword::Mandatory, "true")),
                    )
                    .with_child(typed_leaf("extra", "string")),
            )
            .with_child(
                stmt(YangKeyword::List, "items")
                    .with_child(stmt(YangKeyword::Key, "name"))
                    .with_child(typed_leaf("name", "string"))
                    .with_child(stmt(YangKeyword::MaxElements, "2")),
            )],
    );
    InMemoryDataTree::new(&model).unwrap()
}

fn top() -> PathArg {
    PathArg::Node(qn("top"))
}

fn leaf_path(name: &str) -> InstancePath {
    InstancePath::of([top(), PathArg::Node(qn(name))])
}

#[test]
fn write_then_read_back() {
    let mut tree = tree();
    let mut modification = tree.new_modification();
    modification
        .write(&leaf_path("a"), NormalizedNode::leaf(qn("a"), DataValue::Uint8(42)))
        .unwrap();
    modification.seal();
    tree.commit(&modification).unwrap();

    let snapshot = tree.snapshot();
    let top_node = snapshot.child(&top()).unwrap();
    let a = top_node.data().child(&PathArg::Node(qn("a"))).unwrap();
    assert_eq!(a.value(), Some(&DataValue::Uint8(42)));
}

#[test]
fn unchanged_subtrees_are_shared_between_versions() {
    let mut tree = tree();

    let mut first = tree.new_modification();
    first
        .write(&leaf_path("a"), NormalizedNode::leaf(qn("a"), DataValue::Uint8(1)))
        .unwrap();
    first.seal();
    tree.commit(&first).unwrap();
    let v1 = tree.snapshot();

    let mut second = tree.new_modification();
    second
        .write(&leaf_path("b"), NormalizedNode::leaf(qn("b"), DataValue::string("two")))
        .unwrap();
    second.seal();
    tree.commit(&second).unwrap();
    let v2 = tree.snapshot();

    // The untouched leaf is the same allocation in both snapshots.
    let a1 = v1.child(&top()).unwrap().child(&PathArg::Node(qn("a"))).unwrap();
    let a2 = v2.child(&top()).unwrap().child(&PathArg::Node(qn("a"))).unwrap();
    assert!(Arc::ptr_eq(a1, a2));

    // The first snapshot never observes the second write.
    assert!(v1
        .child(&top())
        .unwrap()
        .child(&PathArg::Node(qn("b")))
        .is_none());
    assert!(v2.version() > v1.version());
}

#[test]
fn failed_commit_leaves_the_tree_untouched() {
    let mut tree = tree();
    let before = tree.snapshot();

    let mut modification = tree.new_modification();
    modification
        .write(
            &leaf_path("a"),
            // uint8 leaf rejects a string value
            NormalizedNode::leaf(qn("a"), DataValue::string("nope")),
        )
        .unwrap();
    modification.seal();
    assert!(tree.commit(&modification).is_err());

    assert!(Arc::ptr_eq(&before, &tree.snapshot()));
    assert_eq!(before.version(), tree.snapshot().version());
}

#[test]
fn delete_tolerates_absent_targets() {
    let mut tree = tree();
    let mut modification = tree.new_modification();
    modification.delete(&leaf_path("a")).unwrap();
    modification.seal();
    tree.commit(&modification).unwrap();
}

#[test]
fn unsealed_modifications_do_not_commit() {
    let mut tree = tree();
    let modification = tree.new_modification();
    let err = tree.commit(&modification).unwrap_err();
    assert!(err.to_string().contains("sealed"));
}

#[test]
fn sealed_modifications_reject_further_edits() {
    let tree = tree();
    let mut modification = tree.new_modification();
    modification.seal();
    let err = modification
        .write(&leaf_path("a"), NormalizedNode::leaf(qn("a"), DataValue::Uint8(1)))
        .unwrap_err();
    assert!(err.to_string().contains("sealed"));
}

#[test]
fn unknown_children_are_a_schema_mismatch() {
    let mut tree = tree();
    let mut modification = tree.new_modification();
    modification
        .write(
            &InstancePath::of([top(), PathArg::Node(qn("ghost"))]),
            NormalizedNode::leaf(qn("ghost"), DataValue::Uint8(1)),
        )
        .unwrap();
    modification.seal();
    let err = tree.commit(&modification).unwrap_err();
    assert!(err.to_string().contains("schema mismatch"));
}

#[test]
fn mandatory_children_are_enforced_on_write() {
    let mut tree = tree();
    let mut modification = tree.new_modification();
    // box requires leaf "needed"
    let incomplete = NormalizedNode::container(qn("box"))
        .with_child(NormalizedNode::leaf(qn("extra"), DataValue::string("x")));
    modification
        .write(&InstancePath::of([top(), PathArg::Node(qn("box"))]), incomplete)
        .unwrap();
    modification.seal();
    let err = tree.commit(&modification).unwrap_err();
    assert!(err.to_string().contains("mandatory child needed is missing"));
}

#[test]
fn max_elements_is_enforced() {
    let mut tree = tree();

    let mut list = NormalizedNode::list(qn("items"));
    for name in ["one", "two", "three"] {
        list = list.with_child(NormalizedNode::list_entry(
            qn("items"),
            [(qn("name"), DataValue::string(name))],
        ));
    }

    let mut modification = tree.new_modification();
    modification
        .write(&InstancePath::of([top(), PathArg::Node(qn("items"))]), list)
        .unwrap();
    modification.seal();
    let err = tree.commit(&modification).unwrap_err();
    assert!(err.to_string().contains("max-elements"));
}

#[test]
fn merge_unions_children() {
    let mut tree = tree();

    let mut first = tree.new_modification();
    first
        .write(&leaf_path("a"), NormalizedNode::leaf(qn("a"), DataValue::Uint8(1)))
        .unwrap();
    first.seal();
    tree.commit(&first).unwrap();

    // Merge a sibling in via the parent container.
    let merged_top = NormalizedNode::container(qn("top"))
        .with_child(NormalizedNode::leaf(qn("b"), DataValue::string("kept")));
    let mut second = tree.new_modification();
    second
        .merge(&InstancePath::of([top()]), merged_top)
        .unwrap();
    second.seal();
    tree.commit(&second).unwrap();

    let snapshot = tree.snapshot();
    let top_node = snapshot.child(&top()).unwrap();
    assert!(top_node.data().child(&PathArg::Node(qn("a"))).is_some());
    assert!(top_node.data().child(&PathArg::Node(qn("b"))).is_some());
}

#[test]
fn touch_on_missing_non_auto_node_fails() {
    let model = compile(
        "pres",
        "urn:pres",
        "p",
        vec![stmt(YangKeyword::Container, "cfg")
            .with_child(stmt(YangKeyword::Presence, "explicit"))
            .with_child(typed_leaf("x", "string"))],
    );
    let mut tree = InMemoryDataTree::new(&model).unwrap();

    let cfg = QName::create("urn:pres", "cfg").unwrap();
    let mut modification = tree.new_modification();
    modification
        .touch(&InstancePath::of([PathArg::Node(cfg)]))
        .unwrap();
    modification.seal();
    let err = tree.commit(&modification).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn non_presence_containers_materialize_and_prune() {
    let mut tree = tree();

    // Writing a leaf under top materializes top automatically.
    let mut write = tree.new_modification();
    write
        .write(&leaf_path("a"), NormalizedNode::leaf(qn("a"), DataValue::Uint8(5)))
        .unwrap();
    write.seal();
    tree.commit(&write).unwrap();
    assert!(tree.snapshot().child(&top()).is_some());

    // Deleting the only child prunes the synthesized container again.
    let mut delete = tree.new_modification();
    delete.delete(&leaf_path("a")).unwrap();
    delete.seal();
    tree.commit(&delete).unwrap();
    assert!(tree.snapshot().child(&top()).is_none());
}
