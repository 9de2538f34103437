//! Versioned immutable tree nodes.
//!
//! Every committed snapshot wraps its normalized data with version stamps:
//! `version` says when this node last changed, `subtree_version` when
//! anything beneath it changed. Unchanged subtrees are shared by reference
//! between successive snapshots, so readers holding an older root never
//! observe partial state.

use std::fmt;
use std::sync::Arc;

use yangforge_foundation::OrderedMap;

use crate::node::{NormalizedNode, PathArg};

/// A monotonic version stamp allocated per transaction.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u64);

impl Version {
    /// The version of an empty, never-written tree.
    #[must_use]
    pub const fn initial() -> Self {
        Self(0)
    }

    /// Returns the next version.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A normalized node plus version stamps and per-child tree nodes.
#[derive(Clone, Debug)]
pub struct TreeNode {
    data: Arc<NormalizedNode>,
    version: Version,
    subtree_version: Version,
    children: OrderedMap<PathArg, Arc<TreeNode>>,
}

impl TreeNode {
    /// Builds a tree node (and its subtree) from normalized data, stamping
    /// every node with `version`.
    #[must_use]
    pub fn from_node(data: &NormalizedNode, version: Version) -> Arc<TreeNode> {
        let mut children = OrderedMap::new();
        if let Some(child_map) = data.children() {
            for (arg, child) in child_map.iter() {
                children = children.insert(arg.clone(), Self::from_node(child, version));
            }
        }
        Arc::new(TreeNode {
            data: Arc::new(data.clone()),
            version,
            subtree_version: version,
            children,
        })
    }

    /// Assembles a tree node from already-built children.
    ///
    /// The node's normalized data is rebuilt to mirror the child map, so
    /// data and tree structure cannot diverge.
    #[must_use]
    pub fn assemble(
        template: &NormalizedNode,
        children: OrderedMap<PathArg, Arc<TreeNode>>,
        version: Version,
        subtree_version: Version,
    ) -> Arc<TreeNode> {
        let mut child_data = OrderedMap::new();
        for (arg, child) in children.iter() {
            child_data = child_data.insert(arg.clone(), (*child.data).clone());
        }
        let data = template.replace_children(child_data);
        Arc::new(TreeNode {
            data: Arc::new(data),
            version,
            subtree_version,
            children,
        })
    }

    /// Returns the normalized data.
    #[must_use]
    pub fn data(&self) -> &Arc<NormalizedNode> {
        &self.data
    }

    /// Returns when this node last changed.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns when anything beneath this node last changed.
    #[must_use]
    pub fn subtree_version(&self) -> Version {
        self.subtree_version
    }

    /// Looks up a direct child.
    #[must_use]
    pub fn child(&self, arg: &PathArg) -> Option<&Arc<TreeNode>> {
        self.children.get(arg)
    }

    /// Returns the child map.
    #[must_use]
    pub fn children(&self) -> &OrderedMap<PathArg, Arc<TreeNode>> {
        &self.children
    }
}
