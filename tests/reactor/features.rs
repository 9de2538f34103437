//! Feature gating of augments and uses.

use yangforge::foundation::QName;
use yangforge::model::{FeatureSet, YangKeyword};
use yangforge::reactor::Reactor;

use crate::util::{module, source, stmt};

const NS: &str = "urn:foo";

fn qn(local: &str) -> QName {
    QName::create(NS, local).unwrap()
}

// module foo {
//   feature my-feature;
//   container target;
//   grouping g { container my-con { description "New description"; } }
//   augment "/target" { if-feature my-feature; uses g; }
// }
fn foo_module() -> yangforge::model::StatementSource {
    let root = module("foo", NS, "f")
        .with_child(stmt(YangKeyword::Feature, "my-feature"))
        .with_child(stmt(YangKeyword::Container, "target"))
        .with_child(
            stmt(YangKeyword::Grouping, "g").with_child(
                stmt(YangKeyword::Container, "my-con")
                    .with_child(stmt(YangKeyword::Description, "New description")),
            ),
        )
        .with_child(
            stmt(YangKeyword::Augment, "/target")
                .with_child(stmt(YangKeyword::IfFeature, "my-feature"))
                .with_child(stmt(YangKeyword::Uses, "g")),
        );
    source("foo.yang", root)
}

#[test]
fn all_features_supported_applies_the_augment() {
    let mut reactor = Reactor::new();
    reactor.add_source(&foo_module());
    let model = reactor.build().unwrap();

    let my_con = model
        .find_data_tree_child([qn("target"), qn("my-con")])
        .expect("augmented container present");
    let description = my_con
        .find_first(YangKeyword::Description)
        .and_then(|d| d.argument().as_str().map(str::to_string));
    assert_eq!(description.as_deref(), Some("New description"));
}

#[test]
fn no_features_supported_leaves_no_residue() {
    let mut reactor = Reactor::new().with_features(FeatureSet::none());
    reactor.add_source(&foo_module());
    let model = reactor.build().unwrap();

    assert!(model
        .find_data_tree_child([qn("target"), qn("my-con")])
        .is_none());

    // No augmentations remain in the effective module.
    let (_, foo) = model.module_statements().next().unwrap();
    assert_eq!(foo.find_all(YangKeyword::Augment).count(), 0);
}

#[test]
fn statement_level_if_feature_elides_the_statement() {
    let root = module("gated", "urn:gated", "g")
        .with_child(stmt(YangKeyword::Feature, "extras"))
        .with_child(
            stmt(YangKeyword::Container, "box").with_child(
                stmt(YangKeyword::Leaf, "extra")
                    .with_child(stmt(YangKeyword::Type, "string"))
                    .with_child(stmt(YangKeyword::IfFeature, "extras")),
            ),
        );

    let mut with_features = Reactor::new();
    with_features.add_source(&source("gated.yang", root.clone()));
    let model = with_features.build().unwrap();
    let bx = QName::create("urn:gated", "box").unwrap();
    let extra = QName::create("urn:gated", "extra").unwrap();
    assert!(model
        .find_data_tree_child([bx.clone(), extra.clone()])
        .is_some());

    let mut without = Reactor::new().with_features(FeatureSet::none());
    without.add_source(&source("gated.yang", root));
    let model = without.build().unwrap();
    assert!(model.find_data_tree_child([bx, extra]).is_none());
}

#[test]
fn feature_filtering_is_idempotent() {
    let features = FeatureSet::of([qn("my-feature")]);

    let mut first = Reactor::new().with_features(features.clone());
    first.add_source(&foo_module());
    let first_model = first.build().unwrap();

    let mut second = Reactor::new().with_features(features);
    second.add_source(&foo_module());
    let second_model = second.build().unwrap();

    assert_eq!(first_model, second_model);
}
