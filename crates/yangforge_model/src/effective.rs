//! Effective statements.
//!
//! An effective statement is a declared statement after uses/augment/deviate
//! expansion and if-feature filtering, with inferred attributes folded into
//! a flags word and child lookup indices precomputed. Structurally immutable
//! once built; the whole tree is shared through `Arc`.

use std::sync::Arc;

use yangforge_foundation::{OrderedMap, QName};

use crate::arg::{ArgValue, Status};
use crate::decl::DeclaredStatement;
use crate::flags::StatementFlags;
use crate::ident::Absolute;
use crate::keyword::{StatementName, YangKeyword};
use crate::types::TypeSpec;

/// One statement of the effective model.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveStatement {
    name: StatementName,
    argument: ArgValue,
    flags: StatementFlags,
    declared: Option<Arc<DeclaredStatement>>,
    substatements: Vec<Arc<EffectiveStatement>>,
    schema_children: OrderedMap<QName, Arc<EffectiveStatement>>,
    data_children: OrderedMap<QName, Arc<EffectiveStatement>>,
    groupings: OrderedMap<QName, Arc<EffectiveStatement>>,
    typedefs: OrderedMap<QName, Arc<EffectiveStatement>>,
    type_spec: Option<TypeSpec>,
    schema_path: Option<Absolute>,
}

impl EffectiveStatement {
    /// Starts building an effective statement.
    #[must_use]
    pub fn builder(name: StatementName, argument: ArgValue) -> Builder {
        Builder {
            name,
            argument,
            flags: StatementFlags::default(),
            declared: None,
            substatements: Vec::new(),
            type_spec: None,
            schema_path: None,
        }
    }

    /// Returns the statement identity.
    #[must_use]
    pub fn name(&self) -> &StatementName {
        &self.name
    }

    /// Returns the parsed argument.
    #[must_use]
    pub fn argument(&self) -> &ArgValue {
        &self.argument
    }

    /// Returns the argument as a qualified name, if it is one.
    #[must_use]
    pub fn arg_qname(&self) -> Option<&QName> {
        self.argument.as_qname()
    }

    /// Returns the packed flags word.
    #[must_use]
    pub fn flags(&self) -> StatementFlags {
        self.flags
    }

    /// Returns the statement's status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.flags.status()
    }

    /// Returns the declared statement this was built from.
    #[must_use]
    pub fn declared(&self) -> Option<&Arc<DeclaredStatement>> {
        self.declared.as_ref()
    }

    /// Returns the effective substatements in order.
    #[must_use]
    pub fn substatements(&self) -> &[Arc<EffectiveStatement>] {
        &self.substatements
    }

    /// Returns the compiled type for typed (leaf / leaf-list) statements.
    #[must_use]
    pub fn type_spec(&self) -> Option<&TypeSpec> {
        self.type_spec.as_ref()
    }

    /// Returns the canonical schema node identifier, for schema-tree
    /// statements in instantiated context.
    #[must_use]
    pub fn schema_path(&self) -> Option<&Absolute> {
        self.schema_path.as_ref()
    }

    /// Finds the first substatement with the given keyword.
    #[must_use]
    pub fn find_first(&self, keyword: YangKeyword) -> Option<&Arc<EffectiveStatement>> {
        self.substatements.iter().find(|s| s.name.is(keyword))
    }

    /// Finds all substatements with the given keyword.
    pub fn find_all(
        &self,
        keyword: YangKeyword,
    ) -> impl Iterator<Item = &Arc<EffectiveStatement>> {
        self.substatements.iter().filter(move |s| s.name.is(keyword))
    }

    /// Looks up a direct schema-tree child.
    #[must_use]
    pub fn find_schema_tree_node(&self, qname: &QName) -> Option<&Arc<EffectiveStatement>> {
        self.schema_children.get(qname)
    }

    /// Looks up a data-tree child, seeing through `choice`/`case` levels.
    #[must_use]
    pub fn find_data_tree_node(&self, qname: &QName) -> Option<&Arc<EffectiveStatement>> {
        self.data_children.get(qname)
    }

    /// Iterates data-tree children in declaration order.
    pub fn data_tree_nodes(&self) -> impl Iterator<Item = &Arc<EffectiveStatement>> {
        self.data_children.values()
    }

    /// Iterates schema-tree children in declaration order.
    pub fn schema_tree_nodes(&self) -> impl Iterator<Item = &Arc<EffectiveStatement>> {
        self.schema_children.values()
    }

    /// Looks up a grouping child.
    #[must_use]
    pub fn find_grouping(&self, qname: &QName) -> Option<&Arc<EffectiveStatement>> {
        self.groupings.get(qname)
    }

    /// Looks up a typedef child.
    #[must_use]
    pub fn find_typedef(&self, qname: &QName) -> Option<&Arc<EffectiveStatement>> {
        self.typedefs.get(qname)
    }

    /// Returns true for statements that occupy a schema-tree slot.
    #[must_use]
    pub fn is_schema_tree_statement(&self) -> bool {
        self.name
            .keyword()
            .is_some_and(YangKeyword::is_schema_tree)
    }

    /// Returns true for statements that occupy a data-tree slot.
    #[must_use]
    pub fn is_data_tree_statement(&self) -> bool {
        self.name.keyword().is_some_and(YangKeyword::is_data_tree)
    }

    /// Returns true for statements that can hold data-tree children.
    #[must_use]
    pub fn is_data_tree_aware(&self) -> bool {
        self.name
            .keyword()
            .is_some_and(YangKeyword::is_data_tree_aware)
    }

    /// Returns true for statements that can hold schema-tree children.
    #[must_use]
    pub fn is_schema_tree_aware(&self) -> bool {
        self.name
            .keyword()
            .is_some_and(YangKeyword::is_schema_tree_aware)
    }

    /// Returns true for `choice` statements.
    #[must_use]
    pub fn is_choice(&self) -> bool {
        self.name.is(YangKeyword::Choice)
    }

    /// Returns true for `case` statements.
    #[must_use]
    pub fn is_case(&self) -> bool {
        self.name.is(YangKeyword::Case)
    }

    /// Returns true for `grouping` statements.
    #[must_use]
    pub fn is_grouping(&self) -> bool {
        self.name.is(YangKeyword::Grouping)
    }

    /// Returns true for typed data nodes (`leaf`, `leaf-list`).
    #[must_use]
    pub fn is_typed(&self) -> bool {
        self.name.is(YangKeyword::Leaf) || self.name.is(YangKeyword::LeafList)
    }
}

/// Builder for [`EffectiveStatement`].
#[derive(Clone, Debug)]
pub struct Builder {
    name: StatementName,
    argument: ArgValue,
    flags: StatementFlags,
    declared: Option<Arc<DeclaredStatement>>,
    substatements: Vec<Arc<EffectiveStatement>>,
    type_spec: Option<TypeSpec>,
    schema_path: Option<Absolute>,
}

impl Builder {
    /// Sets the flags word.
    #[must_use]
    pub fn flags(mut self, flags: StatementFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Links the declared statement.
    #[must_use]
    pub fn declared(mut self, declared: Arc<DeclaredStatement>) -> Self {
        self.declared = Some(declared);
        self
    }

    /// Appends an effective substatement.
    #[must_use]
    pub fn substatement(mut self, substatement: Arc<EffectiveStatement>) -> Self {
        self.substatements.push(substatement);
        self
    }

    /// Sets all effective substatements at once.
    #[must_use]
    pub fn substatements(mut self, substatements: Vec<Arc<EffectiveStatement>>) -> Self {
        self.substatements = substatements;
        self
    }

    /// Sets the compiled type.
    #[must_use]
    pub fn type_spec(mut self, type_spec: TypeSpec) -> Self {
        self.type_spec = Some(type_spec);
        self
    }

    /// Sets the schema node identifier.
    #[must_use]
    pub fn schema_path(mut self, schema_path: Absolute) -> Self {
        self.schema_path = Some(schema_path);
        self
    }

    /// Builds the statement, computing the child lookup indices.
    #[must_use]
    pub fn build(self) -> Arc<EffectiveStatement> {
        let mut schema_children = OrderedMap::new();
        let mut data_children = OrderedMap::new();
        let mut groupings = OrderedMap::new();
        let mut typedefs = OrderedMap::new();

        for sub in &self.substatements {
            let Some(qname) = sub.arg_qname().cloned() else {
                continue;
            };
            if sub.is_schema_tree_statement() {
                schema_children = schema_children.insert(qname.clone(), Arc::clone(sub));
            }
            if sub.is_data_tree_statement() {
                data_children = data_children.insert(qname, Arc::clone(sub));
            } else if sub.is_choice() || sub.is_case() {
                // Data-tree addressing sees through choice/case levels.
                for (nested, stmt) in sub.data_children.iter() {
                    data_children = data_children.insert(nested.clone(), Arc::clone(stmt));
                }
            } else if sub.is_grouping() {
                groupings = groupings.insert(qname, Arc::clone(sub));
            } else if sub.name.is(YangKeyword::Typedef) {
                typedefs = typedefs.insert(qname, Arc::clone(sub));
            }
        }

        Arc::new(EffectiveStatement {
            name: self.name,
            argument: self.argument,
            flags: self.flags,
            declared: self.declared,
            substatements: self.substatements,
            schema_children,
            data_children,
            groupings,
            typedefs,
            type_spec: self.type_spec,
            schema_path: self.schema_path,
        })
    }
}
