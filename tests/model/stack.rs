//! Inference-stack navigation over compiled models.

use yangforge::foundation::QName;
use yangforge::model::{InferenceStack, YangKeyword};

use crate::util::{compile, stmt, string_leaf};

const NS: &str = "urn:stack-it";

fn qn(local: &str) -> QName {
    QName::create(NS, local).unwrap()
}

// module m { container top { choice mode { case a { leaf x; container sub
// { leaf deep; } } case b { leaf y; } } leaf plain; } }
fn model() -> std::sync::Arc<yangforge::model::EffectiveModelContext> {
    compile(
        "m",
        NS,
        "m",
        vec![stmt(YangKeyword::Container, "top")
            .with_child(
                stmt(YangKeyword::Choice, "mode")
                    .with_child(
                        stmt(YangKeyword::Case, "a")
                            .with_child(string_leaf("x"))
                            .with_child(
                                stmt(YangKeyword::Container, "sub")
                                    .with_child(string_leaf("deep")),
                            ),
                    )
                    .with_child(stmt(YangKeyword::Case, "b").with_child(string_leaf("y"))),
            )
            .with_child(string_leaf("plain"))],
    )
}

#[test]
fn schema_and_data_tree_views_agree() {
    let model = model();

    let mut schema_stack = InferenceStack::of(model.clone());
    schema_stack.enter_schema_tree(&qn("top")).unwrap();
    schema_stack.enter_schema_tree(&qn("mode")).unwrap();
    schema_stack.enter_schema_tree(&qn("a")).unwrap();
    schema_stack.enter_schema_tree(&qn("x")).unwrap();
    let schema_id = schema_stack.to_schema_node_identifier().unwrap();

    let mut data_stack = InferenceStack::of(model);
    data_stack.enter_data_tree(&qn("top")).unwrap();
    data_stack.enter_data_tree(&qn("x")).unwrap();
    let data_id = data_stack.to_schema_node_identifier().unwrap();

    assert_eq!(schema_id, data_id);
}

#[test]
fn reconstruction_handles_nested_containers_under_cases() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("top")).unwrap();
    stack.enter_data_tree(&qn("sub")).unwrap();
    stack.enter_data_tree(&qn("deep")).unwrap();

    let id = stack.to_schema_node_identifier().unwrap();
    assert_eq!(id.to_string(), "/top/mode/a/sub/deep");
}

#[test]
fn stack_round_trips_through_inference() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("top")).unwrap();
    stack.enter_data_tree(&qn("x")).unwrap();
    let expected = stack.to_schema_node_identifier().unwrap();

    let inference = stack.to_inference();
    let mut rebuilt = InferenceStack::of_inference(&inference);
    assert_eq!(rebuilt.to_schema_node_identifier().unwrap(), expected);

    // The snapshot is reusable.
    let mut again = InferenceStack::of_inference(&inference);
    assert_eq!(again.to_schema_node_identifier().unwrap(), expected);
}

#[test]
fn exit_to_data_tree_rejects_schema_only_levels() {
    let mut stack = InferenceStack::of(model());
    stack.enter_schema_tree(&qn("top")).unwrap();
    stack.enter_schema_tree(&qn("mode")).unwrap();

    // Popping a choice is not a data-tree exit.
    assert!(stack.exit_to_data_tree().is_err());
}

#[test]
fn enter_choice_traverses_intermediate_cases() {
    let model = compile(
        "nested",
        "urn:nested-choice",
        "n",
        vec![stmt(YangKeyword::Choice, "outer").with_child(
            stmt(YangKeyword::Case, "only").with_child(
                stmt(YangKeyword::Choice, "inner")
                    .with_child(stmt(YangKeyword::Case, "c").with_child(string_leaf("z"))),
            ),
        )],
    );
    let qn = |local: &str| QName::create("urn:nested-choice", local).unwrap();

    let mut stack = InferenceStack::of(model);
    stack.enter_choice(&qn("outer")).unwrap();
    // choice-to-choice traversal sees through the case level.
    let inner = stack.enter_choice(&qn("inner")).unwrap();
    assert!(inner.is_choice());
}

#[test]
fn clear_resets_everything() {
    let mut stack = InferenceStack::of(model());
    stack.enter_data_tree(&qn("top")).unwrap();
    assert!(stack.current_module().is_ok());

    stack.clear();
    assert!(stack.is_empty());
    assert!(stack.current_module().is_err());
    assert!(!stack.in_instantiated_context());
}
