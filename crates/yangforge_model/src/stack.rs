//! A state-tracking cursor for walking an effective model.
//!
//! The stack tracks effective statements encountered along traversal of the
//! schema, data, and grouping namespaces. It resolves `path` expressions for
//! leafref and deref types and converts back to a canonical schema node
//! identifier, reconstructing schema-tree steps when the traversal took
//! data-tree shortcuts.
//!
//! Designed for single-threaded use; an immutable [`Inference`] snapshot can
//! be shared freely and turned back into a working stack.

use std::sync::Arc;

use yangforge_foundation::{Error, QName, QNameModule, Result};

use crate::context::EffectiveModelContext;
use crate::effective::EffectiveStatement;
use crate::ident::Absolute;
use crate::keyword::YangKeyword;
use crate::path::{NameRef, PathExpression, Step};
use crate::types::TypeSpec;

/// Immutable semantic snapshot of a stack's position.
///
/// Freely sharable; [`InferenceStack::of_inference`] produces an isolated
/// working stack from it.
#[derive(Clone, Debug)]
pub struct Inference {
    context: Arc<EffectiveModelContext>,
    statement_path: Vec<Arc<EffectiveStatement>>,
    current_module: Option<QNameModule>,
    grouping_depth: usize,
    clean: bool,
}

impl Inference {
    /// Creates an inference pointing at a data tree node.
    pub fn of_data_tree_path(
        context: Arc<EffectiveModelContext>,
        path: &[QName],
    ) -> Result<Self> {
        Ok(InferenceStack::of_data_tree_path(context, path)?.to_inference())
    }

    /// Returns the statement path from root to current position.
    #[must_use]
    pub fn statement_path(&self) -> &[Arc<EffectiveStatement>] {
        &self.statement_path
    }

    /// Returns the backing model context.
    #[must_use]
    pub fn context(&self) -> &Arc<EffectiveModelContext> {
        &self.context
    }
}

/// Mutable cursor over an [`EffectiveModelContext`].
#[derive(Clone, Debug)]
pub struct InferenceStack {
    context: Arc<EffectiveModelContext>,
    /// Bottom-to-top statement path; the last element is the current
    /// position.
    stack: Vec<Arc<EffectiveStatement>>,
    current_module: Option<QNameModule>,
    grouping_depth: usize,
    /// True while every step so far was a schema-tree or grouping step, so
    /// the stack converts to a schema node identifier without replay.
    clean: bool,
}

impl InferenceStack {
    /// Creates an empty stack over a model context.
    #[must_use]
    pub fn of(context: Arc<EffectiveModelContext>) -> Self {
        Self {
            context,
            stack: Vec::new(),
            current_module: None,
            grouping_depth: 0,
            clean: true,
        }
    }

    /// Creates a stack positioned at an absolute schema node identifier.
    pub fn of_schema_path(context: Arc<EffectiveModelContext>, path: &Absolute) -> Result<Self> {
        let mut stack = Self::of(context);
        for qname in path.node_identifiers() {
            stack.enter_schema_tree(qname)?;
        }
        Ok(stack)
    }

    /// Creates a stack positioned at a data tree path.
    pub fn of_data_tree_path(
        context: Arc<EffectiveModelContext>,
        path: &[QName],
    ) -> Result<Self> {
        let mut stack = Self::of(context);
        for qname in path {
            stack.enter_data_tree(qname)?;
        }
        Ok(stack)
    }

    /// Recreates a working stack from an [`Inference`] snapshot.
    #[must_use]
    pub fn of_inference(inference: &Inference) -> Self {
        Self {
            context: Arc::clone(&inference.context),
            stack: inference.statement_path.clone(),
            current_module: inference.current_module.clone(),
            grouping_depth: inference.grouping_depth,
            clean: inference.clean,
        }
    }

    /// Returns the backing model context.
    #[must_use]
    pub fn context(&self) -> &Arc<EffectiveModelContext> {
        &self.context
    }

    /// Creates a deep copy of this stack.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns true if no node has been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the statement at the top of the stack.
    pub fn current_statement(&self) -> Result<&Arc<EffectiveStatement>> {
        self.stack
            .last()
            .ok_or_else(|| Error::illegal_state("Cannot execute on empty stack"))
    }

    /// Returns the module the stack has entered.
    pub fn current_module(&self) -> Result<&QNameModule> {
        self.current_module
            .as_ref()
            .ok_or_else(|| Error::illegal_state("Cannot execute on empty stack"))
    }

    /// Returns true when non-empty with no grouping steps, i.e. the position
    /// names an instantiated schema node.
    #[must_use]
    pub fn in_instantiated_context(&self) -> bool {
        self.grouping_depth == 0 && !self.stack.is_empty()
    }

    /// Resets to the empty state.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.current_module = None;
        self.grouping_depth = 0;
        self.clean = true;
    }

    /// Looks up a schema-tree child and pushes it.
    pub fn enter_schema_tree(&mut self, qname: &QName) -> Result<Arc<EffectiveStatement>> {
        match self.stack.last().cloned() {
            Some(parent) => self.push_schema(&parent, qname),
            None => {
                let module = self.module_statement(qname)?;
                let ret = self.push_schema(&module, qname)?;
                self.current_module = Some(qname.module().clone());
                Ok(ret)
            }
        }
    }

    /// Looks up a data-tree child and pushes it, eliding any intermediate
    /// `choice`/`case` levels.
    pub fn enter_data_tree(&mut self, qname: &QName) -> Result<Arc<EffectiveStatement>> {
        match self.stack.last().cloned() {
            Some(parent) => self.push_data(&parent, qname),
            None => {
                let module = self.module_statement(qname)?;
                let ret = self.push_data(&module, qname)?;
                self.current_module = Some(qname.module().clone());
                Ok(ret)
            }
        }
    }

    /// Looks up a `choice` and pushes it.
    ///
    /// From a choice, traverses the intermediate case to a nested choice;
    /// from anywhere else this is a schema-tree step that must land on a
    /// choice, undone before reporting failure.
    pub fn enter_choice(&mut self, qname: &QName) -> Result<Arc<EffectiveStatement>> {
        if let Some(parent) = self.stack.last().cloned() {
            if parent.is_choice() {
                return self.enter_nested_choice(&parent, qname);
            }
        }

        let result = self.enter_schema_tree(qname)?;
        if result.is_choice() {
            return Ok(result);
        }
        self.exit()?;
        Err(Error::illegal_argument(format!(
            "Choice {qname} not present"
        )))
    }

    fn enter_nested_choice(
        &mut self,
        parent: &Arc<EffectiveStatement>,
        qname: &QName,
    ) -> Result<Arc<EffectiveStatement>> {
        for case in parent.substatements().iter().filter(|s| s.is_case()) {
            if let Some(found) = case.find_schema_tree_node(qname) {
                if found.is_choice() {
                    let found = Arc::clone(found);
                    self.stack.push(Arc::clone(&found));
                    self.clean = false;
                    return Ok(found);
                }
            }
        }
        Err(Error::illegal_argument(format!(
            "Choice {qname} not present"
        )))
    }

    /// Looks up a `grouping` child and pushes it.
    ///
    /// After a grouping step, the stack is no longer in instantiated
    /// context and cannot be converted to a schema node identifier.
    pub fn enter_grouping(&mut self, qname: &QName) -> Result<Arc<EffectiveStatement>> {
        let (parent, first_entry) = match self.stack.last().cloned() {
            Some(parent) => (parent, false),
            None => (self.module_statement(qname)?, true),
        };
        let ret = parent
            .find_grouping(qname)
            .cloned()
            .ok_or_else(|| Error::illegal_argument(format!("Grouping {qname} not present")))?;
        self.stack.push(Arc::clone(&ret));
        self.grouping_depth += 1;
        if first_entry {
            self.current_module = Some(qname.module().clone());
        }
        Ok(ret)
    }

    /// Pops the current statement.
    pub fn exit(&mut self) -> Result<Arc<EffectiveStatement>> {
        let prev = self
            .stack
            .pop()
            .ok_or_else(|| Error::illegal_state("Cannot exit an empty stack"))?;
        if prev.is_grouping() {
            self.grouping_depth -= 1;
        }
        if self.stack.is_empty() {
            self.current_module = None;
            self.clean = true;
        }
        Ok(prev)
    }

    /// Pops the current statement, asserting that both it and the new top
    /// are data-tree statements, so re-entering the same name finds it
    /// again.
    pub fn exit_to_data_tree(&mut self) -> Result<Arc<EffectiveStatement>> {
        let child = self.exit()?;
        if !child.is_data_tree_statement() {
            return Err(Error::illegal_state(format!(
                "Unexpected current {}",
                child.name()
            )));
        }
        if let Some(parent) = self.stack.last() {
            if !parent.is_data_tree_aware() {
                return Err(Error::illegal_state(format!(
                    "Unexpected parent {}",
                    parent.name()
                )));
            }
        }
        Ok(child)
    }

    /// Resolves a [`PathExpression`] from the current position.
    ///
    /// On error the stack may be left in an intermediate state.
    pub fn resolve_path_expression(
        &mut self,
        path: &PathExpression,
    ) -> Result<Arc<EffectiveStatement>> {
        match path {
            PathExpression::Absolute(steps) => self.resolve_location_path(true, steps),
            PathExpression::Relative(steps) => self.resolve_location_path(false, steps),
            PathExpression::Deref {
                deref_arg,
                relative,
            } => self.resolve_deref(deref_arg, relative),
        }
    }

    /// Resolves a leafref type to the non-leafref type at the end of its
    /// chain, detecting cycles.
    pub fn resolve_leafref(&self, spec: &TypeSpec) -> Result<TypeSpec> {
        let mut tmp = self.copy();
        let mut current = spec.clone();
        let mut seen: Vec<PathExpression> = Vec::new();
        loop {
            let path = current.path.clone().ok_or_else(|| {
                Error::illegal_state(format!("leafref type {current} has no path statement"))
            })?;
            if seen.contains(&path) {
                return Err(Error::illegal_argument(format!(
                    "Resolution of {spec} loops back onto itself via {path}"
                )));
            }
            let resolved = tmp.resolve_path_expression(&path)?;
            seen.push(path);
            let target_type = resolved.type_spec().ok_or_else(|| {
                Error::illegal_state(format!(
                    "Unexpected non-typed result {} resolving {spec}",
                    resolved.name()
                ))
            })?;
            if target_type.is_leafref() {
                current = target_type.clone();
            } else {
                return Ok(target_type.clone());
            }
        }
    }

    /// Returns an [`Inference`] snapshot of the current state.
    #[must_use]
    pub fn to_inference(&self) -> Inference {
        Inference {
            context: Arc::clone(&self.context),
            statement_path: self.stack.clone(),
            current_module: self.current_module.clone(),
            grouping_depth: self.grouping_depth,
            clean: self.clean,
        }
    }

    /// Converts the current state into an absolute schema node identifier.
    ///
    /// When data-tree shortcuts were taken, the schema-tree path is
    /// reconstructed by replaying every entry; if the replay has the same
    /// depth, the stack is marked clean for future calls.
    pub fn to_schema_node_identifier(&mut self) -> Result<Absolute> {
        if !self.in_instantiated_context() {
            return Err(Error::illegal_state(
                "Cannot convert uninstantiated context to schema node identifier",
            ));
        }
        let qnames = if self.clean {
            self.iterate_qnames()?
        } else {
            self.reconstruct_qnames()?
        };
        Absolute::new(qnames)
    }

    fn iterate_qnames(&self) -> Result<Vec<QName>> {
        self.stack
            .iter()
            .map(|stmt| {
                stmt.arg_qname().cloned().ok_or_else(|| {
                    Error::illegal_state(format!("Unexpected statement {}", stmt.name()))
                })
            })
            .collect()
    }

    // Replays logical steps into a schema-tree-only stack. Data-tree
    // entries may expand into choice/case chains.
    fn reconstruct_qnames(&mut self) -> Result<Vec<QName>> {
        let mut tmp = Self::of(Arc::clone(&self.context));
        let entries = self.stack.clone();
        for stmt in &entries {
            let qname = stmt.arg_qname().cloned().ok_or_else(|| {
                Error::illegal_state(format!("Unexpected statement {}", stmt.name()))
            })?;
            // Order of checks is significant
            if stmt.is_data_tree_statement() {
                tmp.resolve_data_tree_steps(&qname)?;
            } else if stmt.is_choice() {
                tmp.resolve_choice_steps(&qname)?;
            } else if stmt.is_schema_tree_statement() {
                tmp.enter_schema_tree(&qname)?;
            } else if stmt.is_grouping() {
                tmp.enter_grouping(&qname)?;
            } else {
                return Err(Error::illegal_state(format!(
                    "Unexpected statement {}",
                    stmt.name()
                )));
            }
        }
        if self.stack.len() == tmp.stack.len() {
            self.clean = true;
        }
        tmp.iterate_qnames()
    }

    fn resolve_choice_steps(&mut self, qname: &QName) -> Result<()> {
        if let Some(parent) = self.stack.last().cloned() {
            if parent.is_choice() {
                for case in parent.substatements().iter().filter(|s| s.is_case()) {
                    if let Some(found) = case.find_schema_tree_node(qname) {
                        if found.is_choice() {
                            let found = Arc::clone(found);
                            self.stack.push(Arc::clone(case));
                            self.stack.push(found);
                            return Ok(());
                        }
                    }
                }
                return Err(Error::illegal_state(format!(
                    "Failed to resolve {qname} in {}",
                    parent.name()
                )));
            }
        }
        self.enter_schema_tree(qname).map(|_| ())
    }

    fn resolve_data_tree_steps(&mut self, qname: &QName) -> Result<()> {
        let parent = match self.stack.last().cloned() {
            Some(parent) => parent,
            None => {
                let module = self.module_statement(qname)?;
                self.current_module = Some(qname.module().clone());
                module
            }
        };
        // A data-tree child visible on the parent directly is also its
        // schema-tree child; otherwise the child hides under choice/case
        // levels and we search them out.
        if let Some(found) = parent.find_schema_tree_node(qname) {
            if found.is_data_tree_statement() {
                self.stack.push(Arc::clone(found));
                return Ok(());
            }
        }
        let mut matched = Vec::new();
        for sub in parent.substatements() {
            if sub.is_choice() && search_choice(&mut matched, sub, qname) {
                self.stack.append(&mut matched);
                return Ok(());
            }
        }
        Err(Error::illegal_state(format!(
            "Failed to resolve {qname} in {}",
            parent.name()
        )))
    }

    fn resolve_location_path(
        &mut self,
        absolute: bool,
        steps: &[Step],
    ) -> Result<Arc<EffectiveStatement>> {
        // Capture the default namespace before an absolute path clears it.
        let default_module = self
            .stack
            .last()
            .and_then(|s| s.arg_qname())
            .map(|q| q.module().clone());
        if absolute {
            self.clear();
        }

        let mut current = None;
        for step in steps {
            match step {
                Step::Parent => {
                    current = Some(self.exit_to_data_tree().map_err(|e| {
                        Error::illegal_argument(format!("Illegal parent access: {e}"))
                    })?);
                }
                Step::Child(name) => {
                    let qname = match name {
                        NameRef::Qualified(qname) => qname.clone(),
                        NameRef::Unqualified(local) => {
                            let module = default_module.as_ref().ok_or_else(|| {
                                Error::illegal_argument(format!(
                                    "Can not find target module of step {local}"
                                ))
                            })?;
                            QName::new(module.clone(), local)?
                        }
                    };
                    current = Some(self.enter_data_tree(&qname)?);
                }
            }
        }
        current.ok_or_else(|| Error::illegal_argument("empty location path"))
    }

    fn resolve_deref(
        &mut self,
        deref_arg: &[Step],
        relative: &[Step],
    ) -> Result<Arc<EffectiveStatement>> {
        let deref_stmt = self.resolve_location_path(false, deref_arg)?;
        let target_type = deref_stmt.type_spec().ok_or_else(|| {
            Error::illegal_argument(format!(
                "deref target {} is not a typed node",
                deref_stmt.name()
            ))
        })?;

        // Static inference breaks down for instance-identifier; report the
        // dedicated recoverable condition.
        if target_type.is_instance_identifier() {
            return Err(Error::unsupported_deref(target_type.name.to_string()));
        }
        if !target_type.is_leafref() {
            return Err(Error::illegal_argument(format!(
                "Illegal deref target type {target_type}"
            )));
        }
        let leafref_path = target_type.path.clone().ok_or_else(|| {
            Error::illegal_state(format!("leafref type {target_type} has no path statement"))
        })?;

        let deref_node = self.resolve_path_expression(&leafref_path)?;
        if !deref_node.name().is(YangKeyword::Leaf) {
            return Err(Error::illegal_argument(format!(
                "Unexpected {} reference in dereferenced path",
                deref_node.name()
            )));
        }
        self.resolve_location_path(false, relative)
    }

    fn push_schema(
        &mut self,
        parent: &Arc<EffectiveStatement>,
        qname: &QName,
    ) -> Result<Arc<EffectiveStatement>> {
        if !parent.is_schema_tree_aware() {
            return Err(Error::illegal_state(format!(
                "Cannot descend schema tree at {}",
                parent.name()
            )));
        }
        let ret = parent
            .find_schema_tree_node(qname)
            .cloned()
            .ok_or_else(|| {
                Error::illegal_argument(format!("Schema tree child {qname} not present"))
            })?;
        self.stack.push(Arc::clone(&ret));
        Ok(ret)
    }

    fn push_data(
        &mut self,
        parent: &Arc<EffectiveStatement>,
        qname: &QName,
    ) -> Result<Arc<EffectiveStatement>> {
        if !parent.is_data_tree_aware() {
            return Err(Error::illegal_state(format!(
                "Cannot descend data tree at {}",
                parent.name()
            )));
        }
        let ret = parent.find_data_tree_node(qname).cloned().ok_or_else(|| {
            Error::illegal_argument(format!("Data tree child {qname} not present"))
        })?;
        self.stack.push(Arc::clone(&ret));
        self.clean = false;
        Ok(ret)
    }

    fn module_statement(&self, qname: &QName) -> Result<Arc<EffectiveStatement>> {
        self.context
            .find_module(qname.module())
            .cloned()
            .ok_or_else(|| Error::illegal_argument(format!("Module for {qname} not found")))
    }
}

fn search_choice(
    result: &mut Vec<Arc<EffectiveStatement>>,
    choice: &Arc<EffectiveStatement>,
    qname: &QName,
) -> bool {
    result.push(Arc::clone(choice));
    for sub in choice.substatements() {
        if sub.is_case() && search_case(result, sub, qname) {
            return true;
        }
    }
    result.pop();
    false
}

fn search_case(
    result: &mut Vec<Arc<EffectiveStatement>>,
    case: &Arc<EffectiveStatement>,
    qname: &QName,
) -> bool {
    result.push(Arc::clone(case));
    for sub in case.substatements() {
        if sub.is_data_tree_statement() && sub.arg_qname() == Some(qname) {
            result.push(Arc::clone(sub));
            return true;
        }
        if sub.is_choice() && search_choice(result, sub, qname) {
            return true;
        }
    }
    result.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::ArgValue;
    use crate::keyword::StatementName;
    use std::collections::HashMap;

    fn qname(local: &str) -> QName {
        QName::create("urn:stack", local).unwrap()
    }

    fn leaf(local: &str) -> Arc<EffectiveStatement> {
        EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Leaf),
            ArgValue::Identifier(qname(local)),
        )
        .build()
    }

    /// module stack { container top { choice mode { case a { leaf x; }
    /// case b { leaf y; } } leaf plain; } grouping g { leaf inner; } }
    fn test_context() -> Arc<EffectiveModelContext> {
        let case_a = EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Case),
            ArgValue::Identifier(qname("a")),
        )
        .substatement(leaf("x"))
        .build();
        let case_b = EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Case),
            ArgValue::Identifier(qname("b")),
        )
        .substatement(leaf("y"))
        .build();
        let choice = EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Choice),
            ArgValue::Identifier(qname("mode")),
        )
        .substatement(case_a)
        .substatement(case_b)
        .build();
        let top = EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Container),
            ArgValue::Identifier(qname("top")),
        )
        .substatement(choice)
        .substatement(leaf("plain"))
        .build();
        let grouping = EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Grouping),
            ArgValue::Identifier(qname("g")),
        )
        .substatement(leaf("inner"))
        .build();
        let module = EffectiveStatement::builder(
            StatementName::Rfc(YangKeyword::Module),
            ArgValue::Str("stack".into()),
        )
        .substatement(top)
        .substatement(grouping)
        .build();

        let mut modules = HashMap::new();
        modules.insert(QNameModule::of("urn:stack"), module);
        Arc::new(EffectiveModelContext::new(modules, HashMap::new()))
    }

    #[test]
    fn schema_tree_navigation() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_schema_tree(&qname("top")).unwrap();
        stack.enter_schema_tree(&qname("mode")).unwrap();
        stack.enter_schema_tree(&qname("a")).unwrap();
        stack.enter_schema_tree(&qname("x")).unwrap();

        let id = stack.to_schema_node_identifier().unwrap();
        assert_eq!(id.to_string(), "/top/mode/a/x");
    }

    #[test]
    fn data_tree_elides_choice_and_case() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_data_tree(&qname("top")).unwrap();
        let x = stack.enter_data_tree(&qname("x")).unwrap();
        assert!(x.name().is(YangKeyword::Leaf));

        // Reconstruction expands the elided levels.
        let id = stack.to_schema_node_identifier().unwrap();
        assert_eq!(id.to_string(), "/top/mode/a/x");
    }

    #[test]
    fn enter_choice_from_container() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_schema_tree(&qname("top")).unwrap();
        let choice = stack.enter_choice(&qname("mode")).unwrap();
        assert!(choice.is_choice());
    }

    #[test]
    fn enter_choice_rewinds_on_non_choice() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_schema_tree(&qname("top")).unwrap();
        let err = stack.enter_choice(&qname("plain")).unwrap_err();
        assert!(format!("{err}").contains("Choice"));
        // The failed step was undone.
        assert_eq!(
            stack.current_statement().unwrap().arg_qname(),
            Some(&qname("top"))
        );
    }

    #[test]
    fn grouping_leaves_instantiated_context() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_grouping(&qname("g")).unwrap();
        assert!(!stack.in_instantiated_context());
        assert!(stack.to_schema_node_identifier().is_err());

        stack.exit().unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn exit_to_data_tree_checks_shapes() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_data_tree(&qname("top")).unwrap();
        stack.enter_data_tree(&qname("plain")).unwrap();
        let child = stack.exit_to_data_tree().unwrap();
        assert_eq!(child.arg_qname(), Some(&qname("plain")));
    }

    #[test]
    fn inference_round_trip() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_data_tree(&qname("top")).unwrap();
        stack.enter_data_tree(&qname("x")).unwrap();
        let expected = stack.to_schema_node_identifier().unwrap();

        let inference = stack.to_inference();
        let mut rebuilt = InferenceStack::of_inference(&inference);
        assert_eq!(rebuilt.to_schema_node_identifier().unwrap(), expected);
    }

    #[test]
    fn empty_stack_operations_are_illegal_state() {
        let mut stack = InferenceStack::of(test_context());
        assert!(stack.current_statement().is_err());
        assert!(stack.current_module().is_err());
        assert!(stack.exit().is_err());
    }

    #[test]
    fn missing_child_is_illegal_argument() {
        let mut stack = InferenceStack::of(test_context());
        stack.enter_schema_tree(&qname("top")).unwrap();
        let err = stack.enter_schema_tree(&qname("nope")).unwrap_err();
        assert!(format!("{err}").contains("Schema tree child"));
    }
}
