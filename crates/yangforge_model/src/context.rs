//! The effective model context.

use std::collections::HashMap;
use std::sync::Arc;

use yangforge_foundation::{QName, QNameModule};

use crate::effective::EffectiveStatement;
use crate::ident::Absolute;
use crate::types::TypeSpec;

/// The root of all schema navigation: module identifier → module effective
/// statement, plus the cache of resolved leafref targets.
///
/// Immutable after the reactor completes; share via `Arc`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EffectiveModelContext {
    modules: HashMap<QNameModule, Arc<EffectiveStatement>>,
    leafref_targets: HashMap<Absolute, TypeSpec>,
}

impl EffectiveModelContext {
    /// Creates a context from its parts.
    #[must_use]
    pub fn new(
        modules: HashMap<QNameModule, Arc<EffectiveStatement>>,
        leafref_targets: HashMap<Absolute, TypeSpec>,
    ) -> Self {
        Self {
            modules,
            leafref_targets,
        }
    }

    /// Returns the module statement for an exact module identifier.
    #[must_use]
    pub fn find_module(&self, module: &QNameModule) -> Option<&Arc<EffectiveStatement>> {
        self.modules.get(module)
    }

    /// Iterates all (module identifier, module statement) pairs.
    pub fn module_statements(
        &self,
    ) -> impl Iterator<Item = (&QNameModule, &Arc<EffectiveStatement>)> {
        self.modules.iter()
    }

    /// Returns the number of modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Walks a data-tree path from a module root.
    ///
    /// Each step resolves against data-tree children, so implicit
    /// `choice`/`case` levels are skipped, and the first step selects the
    /// module by its namespace.
    #[must_use]
    pub fn find_data_tree_child(
        &self,
        path: impl IntoIterator<Item = QName>,
    ) -> Option<Arc<EffectiveStatement>> {
        let mut iter = path.into_iter();
        let first = iter.next()?;
        let module = self.modules.get(first.module())?;
        let mut current = Arc::clone(module.find_data_tree_node(&first)?);
        for qname in iter {
            let next = Arc::clone(current.find_data_tree_node(&qname)?);
            current = next;
        }
        Some(current)
    }

    /// Returns the resolved target type of the leafref at `path`.
    #[must_use]
    pub fn leafref_target(&self, path: &Absolute) -> Option<&TypeSpec> {
        self.leafref_targets.get(path)
    }

    /// Iterates all resolved leafref targets.
    pub fn leafref_targets(&self) -> impl Iterator<Item = (&Absolute, &TypeSpec)> {
        self.leafref_targets.iter()
    }
}
