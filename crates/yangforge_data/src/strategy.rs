//! Per-schema apply strategies.
//!
//! Each schema node kind gets a strategy that validates and materializes
//! modifications against the versioned tree: recursive apply for
//! containers and lists, type checks for leaves, exactly-one-case
//! enforcement for choices, and automatic lifecycle (synthesized empty
//! default, pruned when it empties again) for non-presence containers and
//! choices.

use std::collections::HashMap;
use std::sync::Arc;

use yangforge_foundation::{Error, OrderedMap, QName, Result};
use yangforge_model::{EffectiveModelContext, EffectiveStatement, TypeSpec, YangKeyword};

use crate::modification::{InstancePath, ModifiedNode, Operation};
use crate::node::{NormalizedNode, PathArg};
use crate::tree::{TreeNode, Version};
use crate::value::check_value;

/// Children of one `case`, used for exactly-one-case enforcement.
#[derive(Clone, Debug)]
pub(crate) struct CaseEnforcer {
    case_name: QName,
    child_names: Vec<QName>,
    mandatory: Vec<QName>,
}

#[derive(Clone, Debug)]
pub(crate) enum StrategyKind {
    /// The virtual root over every module's top-level data nodes.
    Root,
    Container {
        presence: bool,
    },
    List {
        entry: Arc<ApplyStrategy>,
        keys: Vec<QName>,
        min_elements: Option<u64>,
        max_elements: Option<u64>,
        uniques: Vec<Vec<QName>>,
    },
    ListEntry,
    Leaf {
        spec: TypeSpec,
    },
    LeafSet {
        spec: TypeSpec,
        min_elements: Option<u64>,
        max_elements: Option<u64>,
    },
    LeafSetEntry {
        spec: TypeSpec,
    },
    Choice {
        cases: Vec<CaseEnforcer>,
        by_child: HashMap<QName, usize>,
    },
    /// Transparent pass-through for augmentation nodes.
    Augmentation,
    Opaque,
}

/// Validates and materializes modifications for one schema node.
#[derive(Clone, Debug)]
pub struct ApplyStrategy {
    kind: StrategyKind,
    children: HashMap<QName, Arc<ApplyStrategy>>,
    mandatory: Vec<QName>,
}

impl ApplyStrategy {
    /// Builds the virtual-root strategy over an effective model.
    #[must_use]
    pub fn root_for(model: &EffectiveModelContext) -> Arc<ApplyStrategy> {
        let mut children = HashMap::new();
        for (_, module) in model.module_statements() {
            for child in module.schema_tree_nodes() {
                if let Some(qname) = child.arg_qname() {
                    children.insert(qname.clone(), Self::from_statement(child, model));
                }
            }
        }
        Arc::new(ApplyStrategy {
            kind: StrategyKind::Root,
            children,
            mandatory: Vec::new(),
        })
    }

    /// Builds the strategy for one schema node.
    #[must_use]
    pub fn from_statement(
        schema: &Arc<EffectiveStatement>,
        model: &EffectiveModelContext,
    ) -> Arc<ApplyStrategy> {
        let keyword = schema.name().keyword();
        let kind = match keyword {
            Some(YangKeyword::Leaf) => StrategyKind::Leaf {
                spec: resolved_type(schema, model),
            },
            Some(YangKeyword::LeafList) => StrategyKind::LeafSet {
                spec: resolved_type(schema, model),
                min_elements: min_elements(schema),
                max_elements: max_elements(schema),
            },
            Some(YangKeyword::Container) => StrategyKind::Container {
                presence: schema.flags().is_presence(),
            },
            Some(YangKeyword::List) => {
                let entry = Arc::new(ApplyStrategy {
                    kind: StrategyKind::ListEntry,
                    children: schema_children(schema, model),
                    mandatory: mandatory_children(schema),
                });
                StrategyKind::List {
                    entry,
                    keys: list_keys(schema),
                    min_elements: min_elements(schema),
                    max_elements: max_elements(schema),
                    uniques: list_uniques(schema),
                }
            }
            Some(YangKeyword::Choice) => {
                let mut cases = Vec::new();
                let mut by_child = HashMap::new();
                for case in schema.substatements().iter().filter(|s| s.is_case()) {
                    let Some(case_name) = case.arg_qname().cloned() else {
                        continue;
                    };
                    let child_names: Vec<QName> = case
                        .schema_tree_nodes()
                        .filter_map(|c| c.arg_qname().cloned())
                        .collect();
                    let enforcer = CaseEnforcer {
                        case_name,
                        child_names: child_names.clone(),
                        mandatory: mandatory_children(case),
                    };
                    let index = cases.len();
                    for name in child_names {
                        by_child.insert(name, index);
                    }
                    cases.push(enforcer);
                }
                StrategyKind::Choice { cases, by_child }
            }
            Some(YangKeyword::Anydata | YangKeyword::Anyxml) => StrategyKind::Opaque,
            _ => StrategyKind::Container { presence: false },
        };

        let children = match &kind {
            StrategyKind::Leaf { .. }
            | StrategyKind::LeafSet { .. }
            | StrategyKind::List { .. }
            | StrategyKind::Opaque => HashMap::new(),
            StrategyKind::Choice { .. } => {
                // Case levels are transparent: the choice's apply children
                // are the union of its cases' children.
                let mut children = HashMap::new();
                for case in schema.substatements().iter().filter(|s| s.is_case()) {
                    for (qname, strategy) in schema_children(case, model) {
                        children.insert(qname, strategy);
                    }
                }
                children
            }
            _ => schema_children(schema, model),
        };

        Arc::new(ApplyStrategy {
            mandatory: match kind {
                StrategyKind::Container { .. } => mandatory_children(schema),
                _ => Vec::new(),
            },
            kind,
            children,
        })
    }

    /// Resolves the strategy responsible for one child slot.
    #[must_use]
    pub fn child_strategy(&self, arg: &PathArg) -> Option<Arc<ApplyStrategy>> {
        match (&self.kind, arg) {
            (StrategyKind::List { entry, .. }, PathArg::ListEntry { .. }) => {
                Some(Arc::clone(entry))
            }
            (StrategyKind::LeafSet { spec, .. }, PathArg::LeafSetEntry { .. }) => {
                Some(Arc::new(ApplyStrategy {
                    kind: StrategyKind::LeafSetEntry { spec: spec.clone() },
                    children: HashMap::new(),
                    mandatory: Vec::new(),
                }))
            }
            (_, PathArg::Node(qname)) => self.children.get(qname).map(Arc::clone),
            (_, PathArg::Augmentation(id)) => {
                let mut children = HashMap::new();
                for qname in id.child_names() {
                    if let Some(strategy) = self.children.get(qname) {
                        children.insert(qname.clone(), Arc::clone(strategy));
                    } else {
                        return None;
                    }
                }
                Some(Arc::new(ApplyStrategy {
                    kind: StrategyKind::Augmentation,
                    children,
                    mandatory: Vec::new(),
                }))
            }
            _ => None,
        }
    }

    /// True when the node springs into existence for its children and is
    /// pruned when it empties.
    fn has_automatic_lifecycle(&self) -> bool {
        matches!(
            self.kind,
            StrategyKind::Root
                | StrategyKind::Choice { .. }
                | StrategyKind::Augmentation
                | StrategyKind::Container { presence: false }
        )
    }

    /// Applies one modification node against the current tree node.
    pub(crate) fn apply(
        &self,
        modification: &ModifiedNode,
        current: Option<&Arc<TreeNode>>,
        version: Version,
        path: &mut InstancePath,
    ) -> Result<Option<Arc<TreeNode>>> {
        match modification.operation() {
            Operation::None => Ok(current.cloned()),
            Operation::Delete => Ok(None),
            Operation::Write(value) => {
                self.verify_written(value, path)?;
                Ok(Some(TreeNode::from_node(value, version)))
            }
            Operation::Merge(value) => {
                let merged = self.merge_value(value, current, version, path)?;
                let result =
                    self.apply_children(modification, Some(&merged), version, path)?;
                self.finish(result, version, path)
            }
            Operation::Touch => {
                let base = match current {
                    Some(node) => Some(Arc::clone(node)),
                    None if self.has_automatic_lifecycle() => {
                        let template = self.empty_template(modification.arg(), path)?;
                        Some(TreeNode::from_node(&template, version))
                    }
                    None => {
                        return Err(Error::schema_violation(
                            path.to_string(),
                            "node does not exist",
                        ));
                    }
                };
                let result =
                    self.apply_children(modification, base.as_ref(), version, path)?;
                self.finish(result, version, path)
            }
        }
    }

    // Recurses into child modifications, producing the updated node.
    fn apply_children(
        &self,
        modification: &ModifiedNode,
        base: Option<&Arc<TreeNode>>,
        version: Version,
        path: &mut InstancePath,
    ) -> Result<Option<Arc<TreeNode>>> {
        let Some(base) = base else {
            return Ok(None);
        };
        if modification.children().is_empty() {
            return Ok(Some(Arc::clone(base)));
        }

        let mut children = base.children().clone();
        for child_mod in modification.children() {
            let arg = child_mod.arg().clone();
            let strategy = self.child_strategy(&arg).ok_or_else(|| {
                Error::schema_violation(
                    path.to_string(),
                    format!("schema mismatch: {arg} is not a valid child"),
                )
            })?;
            path.push(arg.clone());
            let result = strategy.apply(child_mod, children.get(&arg), version, path);
            path.pop();
            match result? {
                Some(updated) => children = children.insert(arg, updated),
                None => children = children.remove(&arg),
            }
        }

        Ok(Some(TreeNode::assemble(
            base.data(),
            children,
            version,
            version,
        )))
    }

    // Post-recursion bookkeeping: pruning, case enforcement, cardinality.
    fn finish(
        &self,
        result: Option<Arc<TreeNode>>,
        _version: Version,
        path: &mut InstancePath,
    ) -> Result<Option<Arc<TreeNode>>> {
        let Some(node) = result else {
            return Ok(None);
        };
        if self.has_automatic_lifecycle() && node.children().is_empty() {
            return Ok(None);
        }
        match &self.kind {
            StrategyKind::Choice { .. } => self.enforce_cases(node.data(), path)?,
            StrategyKind::List {
                min_elements,
                max_elements,
                uniques,
                ..
            } => {
                self.enforce_cardinality(
                    node.children().len() as u64,
                    *min_elements,
                    *max_elements,
                    path,
                )?;
                self.enforce_uniques(node.data(), uniques, path)?;
            }
            StrategyKind::LeafSet {
                min_elements,
                max_elements,
                ..
            } => {
                self.enforce_cardinality(
                    node.children().len() as u64,
                    *min_elements,
                    *max_elements,
                    path,
                )?;
            }
            _ => {}
        }
        Ok(Some(node))
    }

    // Folds a merge value into the current node: structural children
    // union recursively, leaves overwritten.
    fn merge_value(
        &self,
        value: &NormalizedNode,
        current: Option<&Arc<TreeNode>>,
        version: Version,
        path: &mut InstancePath,
    ) -> Result<Arc<TreeNode>> {
        let Some(current) = current else {
            self.verify_written(value, path)?;
            return Ok(TreeNode::from_node(value, version));
        };
        if !value.is_container_like() {
            self.verify_written(value, path)?;
            return Ok(TreeNode::from_node(value, version));
        }

        let mut children = current.children().clone();
        if let Some(value_children) = value.children() {
            for (arg, child_value) in value_children.iter() {
                let strategy = self.child_strategy(arg).ok_or_else(|| {
                    Error::schema_violation(
                        path.to_string(),
                        format!("schema mismatch: {arg} is not a valid child"),
                    )
                })?;
                path.push(arg.clone());
                let merged =
                    strategy.merge_value(child_value, children.get(arg), version, path);
                path.pop();
                children = children.insert(arg.clone(), merged?);
            }
        }
        Ok(TreeNode::assemble(
            current.data(),
            children,
            version,
            version,
        ))
    }

    // Full validation of a written value.
    fn verify_written(&self, value: &NormalizedNode, path: &mut InstancePath) -> Result<()> {
        match &self.kind {
            StrategyKind::Leaf { spec } | StrategyKind::LeafSetEntry { spec } => {
                let scalar = value.value().ok_or_else(|| {
                    Error::schema_violation(path.to_string(), "expected a value node")
                })?;
                check_value(spec, scalar)
                    .map_err(|e| Error::schema_violation(path.to_string(), e.kind.to_string()))
            }
            StrategyKind::Opaque => Ok(()),
            StrategyKind::LeafSet {
                spec,
                min_elements,
                max_elements,
            } => {
                let children = container_children(value, path)?;
                for (arg, entry) in children.iter() {
                    let scalar = entry.value().ok_or_else(|| {
                        Error::schema_violation(
                            path.to_string(),
                            format!("leaf-set entry {arg} has no value"),
                        )
                    })?;
                    check_value(spec, scalar).map_err(|e| {
                        Error::schema_violation(path.to_string(), e.kind.to_string())
                    })?;
                }
                self.enforce_cardinality(
                    children.len() as u64,
                    *min_elements,
                    *max_elements,
                    path,
                )
            }
            StrategyKind::List {
                entry,
                keys,
                min_elements,
                max_elements,
                uniques,
            } => {
                let children = container_children(value, path)?;
                for (arg, child) in children.iter() {
                    path.push(arg.clone());
                    let checked = check_entry_keys(arg, child, keys, path)
                        .and_then(|()| entry.verify_written(child, path));
                    path.pop();
                    checked?;
                }
                self.enforce_cardinality(
                    children.len() as u64,
                    *min_elements,
                    *max_elements,
                    path,
                )?;
                self.enforce_uniques(value, uniques, path)
            }
            StrategyKind::Choice { .. } => {
                // Case membership decides first: an unknown first child can
                // never select a case, whatever else is wrong with it.
                self.enforce_cases(value, path)?;
                self.verify_container_children(value, path)
            }
            _ => {
                self.verify_container_children(value, path)?;
                self.enforce_mandatory(value, path)
            }
        }
    }

    fn verify_container_children(
        &self,
        value: &NormalizedNode,
        path: &mut InstancePath,
    ) -> Result<()> {
        let children = container_children(value, path)?;
        for (arg, child) in children.iter() {
            let strategy = self.child_strategy(arg).ok_or_else(|| {
                Error::schema_violation(
                    path.to_string(),
                    format!("schema mismatch: {arg} is not a valid child"),
                )
            })?;
            path.push(arg.clone());
            let checked = strategy.verify_written(child, path);
            path.pop();
            checked?;
        }
        Ok(())
    }

    fn enforce_mandatory(&self, value: &NormalizedNode, path: &mut InstancePath) -> Result<()> {
        let Some(children) = value.children() else {
            return Ok(());
        };
        for name in &self.mandatory {
            if !children.contains_key(&PathArg::Node(name.clone())) {
                return Err(Error::schema_violation(
                    path.to_string(),
                    format!("mandatory child {} is missing", name.local_name()),
                ));
            }
        }
        Ok(())
    }

    // The exactly-one-case rule: the first child picks the case; children
    // of every other case must be absent; the chosen case's mandatory
    // children must be present.
    fn enforce_cases(&self, value: &NormalizedNode, path: &mut InstancePath) -> Result<()> {
        let StrategyKind::Choice { cases, by_child } = &self.kind else {
            return Ok(());
        };
        let Some(children) = value.children() else {
            return Ok(());
        };
        let Some((first_arg, _)) = children.first() else {
            return Ok(());
        };
        let first_name = first_arg.node_name().ok_or_else(|| {
            Error::schema_violation(
                path.to_string(),
                format!("child {first_arg} does not belong in this choice"),
            )
        })?;
        let Some(&selected) = by_child.get(first_name) else {
            return Err(Error::schema_violation(
                path.to_string(),
                format!("child {first_arg} does not belong in this choice"),
            ));
        };
        let selected_case = &cases[selected];

        for (index, other) in cases.iter().enumerate() {
            if index == selected {
                continue;
            }
            for child_name in &other.child_names {
                if children.contains_key(&PathArg::Node(child_name.clone())) {
                    return Err(Error::schema_violation(
                        path.to_string(),
                        format!(
                            "child {} (from case {}) implies non-presence of child {} \
                             (from case {}), which is present",
                            first_name.local_name(),
                            selected_case.case_name.local_name(),
                            child_name.local_name(),
                            other.case_name.local_name()
                        ),
                    ));
                }
            }
        }

        for name in &selected_case.mandatory {
            if !children.contains_key(&PathArg::Node(name.clone())) {
                return Err(Error::schema_violation(
                    path.to_string(),
                    format!(
                        "mandatory child {} of case {} is missing",
                        name.local_name(),
                        selected_case.case_name.local_name()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn enforce_cardinality(
        &self,
        count: u64,
        min_elements: Option<u64>,
        max_elements: Option<u64>,
        path: &mut InstancePath,
    ) -> Result<()> {
        if let Some(min) = min_elements {
            if count < min {
                return Err(Error::schema_violation(
                    path.to_string(),
                    format!("{count} element(s) present, min-elements is {min}"),
                ));
            }
        }
        if let Some(max) = max_elements {
            if count > max {
                return Err(Error::schema_violation(
                    path.to_string(),
                    format!("{count} element(s) present, max-elements is {max}"),
                ));
            }
        }
        Ok(())
    }

    fn enforce_uniques(
        &self,
        value: &NormalizedNode,
        uniques: &[Vec<QName>],
        path: &mut InstancePath,
    ) -> Result<()> {
        let Some(children) = value.children() else {
            return Ok(());
        };
        for unique in uniques {
            let mut seen: Vec<Vec<crate::value::DataValue>> = Vec::new();
            for (_, entry) in children.iter() {
                let tuple: Option<Vec<crate::value::DataValue>> = unique
                    .iter()
                    .map(|leaf| {
                        entry
                            .child(&PathArg::Node(leaf.clone()))
                            .and_then(|l| l.value().cloned())
                    })
                    .collect();
                let Some(tuple) = tuple else {
                    // Entries missing one of the leaves do not participate.
                    continue;
                };
                if seen.contains(&tuple) {
                    let names: Vec<&str> = unique.iter().map(QName::local_name).collect();
                    return Err(Error::schema_violation(
                        path.to_string(),
                        format!("unique constraint on ({}) violated", names.join(", ")),
                    ));
                }
                seen.push(tuple);
            }
        }
        Ok(())
    }

    // An empty instance of this node, synthesized for automatic lifecycle.
    fn empty_template(
        &self,
        arg: &PathArg,
        path: &mut InstancePath,
    ) -> Result<NormalizedNode> {
        match (&self.kind, arg) {
            (StrategyKind::Root, _) => empty_root(),
            (StrategyKind::Choice { .. }, PathArg::Node(qname)) => {
                Ok(NormalizedNode::choice(qname.clone()))
            }
            (StrategyKind::Augmentation, PathArg::Augmentation(id)) => {
                Ok(NormalizedNode::augmentation(id.clone()))
            }
            (_, PathArg::Node(qname)) => Ok(NormalizedNode::container(qname.clone())),
            _ => Err(Error::schema_violation(
                path.to_string(),
                "cannot synthesize an empty default here",
            )),
        }
    }
}

/// The synthetic root container every data tree hangs off.
pub(crate) fn empty_root() -> Result<NormalizedNode> {
    let qname = QName::create("urn:ietf:params:xml:ns:netconf:base:1.0", "data")?;
    Ok(NormalizedNode::container(qname))
}

fn container_children<'a>(
    value: &'a NormalizedNode,
    path: &mut InstancePath,
) -> Result<&'a OrderedMap<PathArg, NormalizedNode>> {
    value.children().ok_or_else(|| {
        Error::schema_violation(path.to_string(), "expected a container-like node")
    })
}

fn check_entry_keys(
    arg: &PathArg,
    entry: &NormalizedNode,
    keys: &[QName],
    path: &mut InstancePath,
) -> Result<()> {
    let PathArg::ListEntry {
        keys: predicates, ..
    } = arg
    else {
        return Err(Error::schema_violation(
            path.to_string(),
            format!("{arg} is not a list entry identifier"),
        ));
    };
    for key in keys {
        let Some(expected) = predicates.get(key) else {
            return Err(Error::schema_violation(
                path.to_string(),
                format!("key leaf {} is missing from the entry identifier", key.local_name()),
            ));
        };
        let actual = entry
            .child(&PathArg::Node(key.clone()))
            .and_then(NormalizedNode::value);
        if actual != Some(expected) {
            return Err(Error::schema_violation(
                path.to_string(),
                format!(
                    "key leaf {} does not match the entry identifier",
                    key.local_name()
                ),
            ));
        }
    }
    Ok(())
}

fn schema_children(
    schema: &Arc<EffectiveStatement>,
    model: &EffectiveModelContext,
) -> HashMap<QName, Arc<ApplyStrategy>> {
    let mut children = HashMap::new();
    for child in schema.schema_tree_nodes() {
        if child.is_case() {
            continue;
        }
        if let Some(qname) = child.arg_qname() {
            children.insert(qname.clone(), ApplyStrategy::from_statement(child, model));
        }
    }
    children
}

fn mandatory_children(schema: &Arc<EffectiveStatement>) -> Vec<QName> {
    schema
        .schema_tree_nodes()
        .filter(|child| {
            child.flags().is_mandatory()
                && child.name().keyword().is_some_and(|kw| {
                    matches!(
                        kw,
                        YangKeyword::Leaf | YangKeyword::Anydata | YangKeyword::Anyxml
                    )
                })
        })
        .filter_map(|child| child.arg_qname().cloned())
        .collect()
}

fn resolved_type(schema: &Arc<EffectiveStatement>, model: &EffectiveModelContext) -> TypeSpec {
    let Some(spec) = schema.type_spec() else {
        return TypeSpec::of(yangforge_model::BaseType::String);
    };
    if spec.is_leafref() {
        if let Some(resolved) = schema
            .schema_path()
            .and_then(|path| model.leafref_target(path))
        {
            return resolved.clone();
        }
    }
    spec.clone()
}

fn min_elements(schema: &Arc<EffectiveStatement>) -> Option<u64> {
    schema
        .find_first(YangKeyword::MinElements)
        .and_then(|s| match s.argument() {
            yangforge_model::ArgValue::UInt(v) => Some(*v),
            _ => None,
        })
}

fn max_elements(schema: &Arc<EffectiveStatement>) -> Option<u64> {
    schema
        .find_first(YangKeyword::MaxElements)
        .and_then(|s| match s.argument() {
            yangforge_model::ArgValue::MaxElements(v) => *v,
            _ => None,
        })
}

fn list_keys(schema: &Arc<EffectiveStatement>) -> Vec<QName> {
    let Some(module) = schema.arg_qname().map(|q| q.module().clone()) else {
        return Vec::new();
    };
    schema
        .find_first(YangKeyword::Key)
        .and_then(|s| s.argument().as_str().map(str::to_string))
        .map(|raw| {
            raw.split_whitespace()
                .filter_map(|name| QName::new(module.clone(), name).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn list_uniques(schema: &Arc<EffectiveStatement>) -> Vec<Vec<QName>> {
    let Some(module) = schema.arg_qname().map(|q| q.module().clone()) else {
        return Vec::new();
    };
    schema
        .find_all(YangKeyword::Unique)
        .filter_map(|s| s.argument().as_str().map(str::to_string))
        .map(|raw| {
            raw.split_whitespace()
                .filter_map(|descendant| {
                    // Only direct leaf children participate; deeper paths
                    // take their final segment.
                    let last = descendant.rsplit('/').next().unwrap_or(descendant);
                    let local = last.rsplit(':').next().unwrap_or(last);
                    QName::new(module.clone(), local).ok()
                })
                .collect()
        })
        .collect()
}
