//! Path-expression resolution: leafrefs and deref.

use yangforge::foundation::{ErrorKind, QName};
use yangforge::model::{InferenceStack, PathExpression, YangKeyword};

use crate::util::{compile, stmt, string_leaf};

const NS: &str = "urn:paths";

fn qn(local: &str) -> QName {
    QName::create(NS, local).unwrap()
}

// module p { container box { leaf name; leaf other;
//   leaf ref { type leafref { path "../name"; } }
//   leaf iref { type instance-identifier; } } }
fn model() -> std::sync::Arc<yangforge::model::EffectiveModelContext> {
    compile(
        "p",
        NS,
        "p",
        vec![stmt(YangKeyword::Container, "box")
            .with_child(string_leaf("name"))
            .with_child(string_leaf("other"))
            .with_child(
                stmt(YangKeyword::Leaf, "ref").with_child(
                    stmt(YangKeyword::Type, "leafref")
                        .with_child(stmt(YangKeyword::Path, "../name")),
                ),
            )
            .with_child(
                stmt(YangKeyword::Leaf, "iref")
                    .with_child(stmt(YangKeyword::Type, "instance-identifier")),
            )],
    )
}

fn no_prefixes(_: &str) -> Option<yangforge::foundation::QNameModule> {
    None
}

#[test]
fn relative_location_path_resolves() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("box")).unwrap();
    stack.enter_data_tree(&qn("ref")).unwrap();

    let path = PathExpression::parse("../name", &no_prefixes).unwrap();
    let target = stack.resolve_path_expression(&path).unwrap();
    assert_eq!(target.arg_qname(), Some(&qn("name")));
}

#[test]
fn absolute_location_path_restarts_from_root() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("box")).unwrap();
    stack.enter_data_tree(&qn("name")).unwrap();

    let path = PathExpression::parse("/other", &no_prefixes).unwrap();
    // Unqualified absolute steps bind to the module active at the start.
    let err_or_target = stack.resolve_path_expression(&path);
    // /other does not exist at module top level.
    assert!(err_or_target.is_err());

    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("box")).unwrap();
    let path = PathExpression::parse("/box/other", &no_prefixes).unwrap();
    let target = stack.resolve_path_expression(&path).unwrap();
    assert_eq!(target.arg_qname(), Some(&qn("other")));
}

#[test]
fn leafref_resolution_flattens_to_target_type() {
    let model = model();
    let mut stack = InferenceStack::of(model);
    stack.enter_data_tree(&qn("box")).unwrap();
    let ref_leaf = stack.enter_data_tree(&qn("ref")).unwrap();

    let resolved = stack.resolve_leafref(ref_leaf.type_spec().unwrap()).unwrap();
    assert_eq!(resolved.base, yangforge::model::BaseType::String);
}

#[test]
fn deref_navigates_through_the_leafref() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("box")).unwrap();
    stack.enter_data_tree(&qn("other")).unwrap();

    // deref(../ref) lands on name; ../other walks back out to the sibling.
    let path = PathExpression::parse("deref(../ref)/../other", &no_prefixes).unwrap();
    let target = stack.resolve_path_expression(&path).unwrap();
    assert_eq!(target.arg_qname(), Some(&qn("other")));
}

#[test]
fn deref_of_instance_identifier_is_a_recoverable_condition() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("box")).unwrap();
    stack.enter_data_tree(&qn("other")).unwrap();

    let path = PathExpression::parse("deref(../iref)/name", &no_prefixes).unwrap();
    let err = stack.resolve_path_expression(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedDeref { .. }));
}

#[test]
fn parent_step_beyond_root_is_an_illegal_argument() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("box")).unwrap();

    let path = PathExpression::parse("../../name", &no_prefixes).unwrap();
    let err = stack.resolve_path_expression(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalArgument { .. }));
}
