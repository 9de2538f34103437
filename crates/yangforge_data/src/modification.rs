//! The modification tree and the data tree it commits into.
//!
//! A [`DataTreeModification`] is the transient record of one transaction's
//! edits: operations hung off instance paths, mutated while the
//! transaction is open, sealed before apply, and discarded afterwards.
//! [`InMemoryDataTree`] owns the committed snapshot; applying a sealed
//! modification produces a new root version and unchanged subtrees are
//! shared between versions.

use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{Error, Result};
use yangforge_model::EffectiveModelContext;

use crate::node::{NormalizedNode, PathArg};
use crate::strategy::{empty_root, ApplyStrategy};
use crate::tree::{TreeNode, Version};

/// The operation recorded at one path.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Operation {
    /// Nothing recorded here; the node exists to carry children.
    #[default]
    None,
    /// Recurse into children without changing this node.
    Touch,
    /// Union the value into the current node.
    Merge(NormalizedNode),
    /// Replace the current node entirely.
    Write(NormalizedNode),
    /// Remove the current node.
    Delete,
}

/// One node of the modification tree.
#[derive(Clone, Debug)]
pub struct ModifiedNode {
    arg: PathArg,
    operation: Operation,
    children: Vec<ModifiedNode>,
}

impl ModifiedNode {
    fn new(arg: PathArg) -> Self {
        Self {
            arg,
            operation: Operation::None,
            children: Vec::new(),
        }
    }

    /// Returns this node's path argument.
    #[must_use]
    pub fn arg(&self) -> &PathArg {
        &self.arg
    }

    /// Returns the recorded operation.
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Returns the child modifications.
    #[must_use]
    pub fn children(&self) -> &[ModifiedNode] {
        &self.children
    }

}

/// An instance path: the sequence of path arguments from the tree root.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstancePath {
    args: Vec<PathArg>,
}

impl InstancePath {
    /// The empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from its arguments.
    #[must_use]
    pub fn of(args: impl IntoIterator<Item = PathArg>) -> Self {
        Self {
            args: args.into_iter().collect(),
        }
    }

    /// Returns the path arguments.
    #[must_use]
    pub fn args(&self) -> &[PathArg] {
        &self.args
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub(crate) fn push(&mut self, arg: PathArg) {
        self.args.push(arg);
    }

    pub(crate) fn pop(&mut self) {
        self.args.pop();
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.args {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}

/// A transaction's pending edits.
#[derive(Clone, Debug)]
pub struct DataTreeModification {
    root: ModifiedNode,
    sealed: bool,
}

impl DataTreeModification {
    pub(crate) fn new(root_arg: PathArg) -> Self {
        Self {
            root: ModifiedNode::new(root_arg),
            sealed: false,
        }
    }

    /// Returns the root of the modification tree.
    #[must_use]
    pub fn root(&self) -> &ModifiedNode {
        &self.root
    }

    /// Returns true once [`DataTreeModification::seal`] has run.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Records a write: replace whatever is at `path` with `value`.
    ///
    /// Child modifications previously recorded beneath `path` are
    /// discarded; the write supersedes them.
    pub fn write(&mut self, path: &InstancePath, value: NormalizedNode) -> Result<()> {
        let node = self.node_for(path, &value)?;
        node.operation = Operation::Write(value);
        node.children.clear();
        Ok(())
    }

    /// Records a merge: union `value` into whatever is at `path`.
    pub fn merge(&mut self, path: &InstancePath, value: NormalizedNode) -> Result<()> {
        let node = self.node_for(path, &value)?;
        node.operation = Operation::Merge(value);
        Ok(())
    }

    /// Records a delete of the node at `path`.
    pub fn delete(&mut self, path: &InstancePath) -> Result<()> {
        let node = self.navigate(path)?;
        node.operation = Operation::Delete;
        node.children.clear();
        Ok(())
    }

    /// Records a touch: recurse into `path` without changing the node.
    pub fn touch(&mut self, path: &InstancePath) -> Result<()> {
        let node = self.navigate(path)?;
        if matches!(node.operation, Operation::None) {
            node.operation = Operation::Touch;
        }
        Ok(())
    }

    /// Seals the modification; no further edits are accepted.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    fn node_for(&mut self, path: &InstancePath, value: &NormalizedNode) -> Result<&mut ModifiedNode> {
        if let Some(last) = path.args().last() {
            if *last != value.path_arg() {
                return Err(Error::illegal_argument(format!(
                    "value identifier {} does not match path {path}",
                    value.path_arg()
                )));
            }
        }
        self.navigate(path)
    }

    fn navigate(&mut self, path: &InstancePath) -> Result<&mut ModifiedNode> {
        if self.sealed {
            return Err(Error::illegal_state("modification is already sealed"));
        }
        if path.is_empty() {
            return Err(Error::illegal_argument(
                "modifications must target a non-root path",
            ));
        }
        let mut node = &mut self.root;
        for arg in path.args() {
            // Intermediate nodes spring into existence as touches.
            if matches!(node.operation, Operation::None) {
                node.operation = Operation::Touch;
            }
            let index = match node.children.iter().position(|c| &c.arg == arg) {
                Some(index) => index,
                None => {
                    node.children.push(ModifiedNode::new(arg.clone()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
        Ok(node)
    }
}

/// The committed data tree: one snapshot per version.
///
/// Each transaction owns exactly one modification; the tree is shared by
/// reference across transactions and never mutated in place.
pub struct InMemoryDataTree {
    strategy: Arc<ApplyStrategy>,
    root: Arc<TreeNode>,
    version: Version,
}

impl InMemoryDataTree {
    /// Creates an empty tree validating against the given model.
    pub fn new(model: &EffectiveModelContext) -> Result<Self> {
        let template = empty_root()?;
        Ok(Self {
            strategy: ApplyStrategy::root_for(model),
            root: TreeNode::from_node(&template, Version::initial()),
            version: Version::initial(),
        })
    }

    /// Returns the current committed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TreeNode> {
        Arc::clone(&self.root)
    }

    /// Returns the current version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Starts a new, empty modification.
    #[must_use]
    pub fn new_modification(&self) -> DataTreeModification {
        DataTreeModification::new(self.root.data().path_arg())
    }

    /// Validates and applies a sealed modification, committing a new root
    /// version. The first violation aborts the pass; the tree is left on
    /// its previous version.
    pub fn commit(&mut self, modification: &DataTreeModification) -> Result<()> {
        if !modification.is_sealed() {
            return Err(Error::illegal_state(
                "modification must be sealed before apply",
            ));
        }
        let version = self.version.next();
        let mut path = InstancePath::root();
        let applied =
            self.strategy
                .apply(modification.root(), Some(&self.root), version, &mut path)?;
        self.root = match applied {
            Some(root) => root,
            // The virtual root lives on even when everything was deleted.
            None => TreeNode::from_node(&empty_root()?, version),
        };
        self.version = version;
        Ok(())
    }
}
