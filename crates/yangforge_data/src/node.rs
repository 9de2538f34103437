//! Normalized instance nodes.
//!
//! The canonical in-memory form of instance data: a tagged tree keyed by
//! path arguments. Nodes are structurally immutable; "modifying" one builds
//! a new value sharing children with the original.

use std::fmt;

use yangforge_foundation::{OrderedMap, QName};

use crate::value::DataValue;

/// Identifier of an augmentation node: the sorted set of child names the
/// augmentation contributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AugmentationId {
    child_names: Vec<QName>,
}

impl AugmentationId {
    /// Creates an augmentation identifier; the child set is sorted into
    /// canonical order.
    #[must_use]
    pub fn new(mut child_names: Vec<QName>) -> Self {
        child_names.sort_by(|a, b| {
            (a.module().namespace(), a.local_name())
                .cmp(&(b.module().namespace(), b.local_name()))
        });
        child_names.dedup();
        Self { child_names }
    }

    /// The contributed child names, in canonical order.
    #[must_use]
    pub fn child_names(&self) -> &[QName] {
        &self.child_names
    }

    /// Returns true if the augmentation contributes the name.
    #[must_use]
    pub fn contains(&self, qname: &QName) -> bool {
        self.child_names.contains(qname)
    }
}

/// Identifies one child slot within a normalized container.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathArg {
    /// An ordinary child node.
    Node(QName),
    /// A list entry, identified by its key leaf values.
    ListEntry {
        /// The list name.
        name: QName,
        /// Key leaf name → value, in key declaration order.
        keys: OrderedMap<QName, DataValue>,
    },
    /// A leaf-set entry, identified by its value.
    LeafSetEntry {
        /// The leaf-set name.
        name: QName,
        /// The entry value.
        value: DataValue,
    },
    /// An augmentation slot.
    Augmentation(AugmentationId),
}

impl PathArg {
    /// Returns the node name, when the argument carries one.
    #[must_use]
    pub const fn node_name(&self) -> Option<&QName> {
        match self {
            Self::Node(qname)
            | Self::ListEntry { name: qname, .. }
            | Self::LeafSetEntry { name: qname, .. } => Some(qname),
            Self::Augmentation(_) => None,
        }
    }
}

impl fmt::Display for PathArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(qname) => write!(f, "{}", qname.local_name()),
            Self::ListEntry { name, keys } => {
                write!(f, "{}", name.local_name())?;
                for (key, value) in keys.iter() {
                    write!(f, "[{}={value}]", key.local_name())?;
                }
                Ok(())
            }
            Self::LeafSetEntry { name, value } => {
                write!(f, "{}[.={value}]", name.local_name())
            }
            Self::Augmentation(id) => {
                f.write_str("augmentation{")?;
                let mut first = true;
                for qname in id.child_names() {
                    if !first {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", qname.local_name())?;
                    first = false;
                }
                f.write_str("}")
            }
        }
    }
}

/// The canonical instance-data node.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizedNode {
    /// A leaf with a single value.
    Leaf {
        /// Node name.
        id: QName,
        /// The value.
        value: DataValue,
    },
    /// One entry of a leaf-set.
    LeafSetEntry {
        /// Leaf-set name.
        id: QName,
        /// Entry value.
        value: DataValue,
    },
    /// A leaf-set (leaf-list instance).
    LeafSet {
        /// Node name.
        id: QName,
        /// Entries keyed by value.
        children: OrderedMap<PathArg, NormalizedNode>,
    },
    /// A container.
    Container {
        /// Node name.
        id: QName,
        /// Child slots.
        children: OrderedMap<PathArg, NormalizedNode>,
    },
    /// A keyed list instance.
    List {
        /// Node name.
        id: QName,
        /// Entries keyed by their key predicates.
        children: OrderedMap<PathArg, NormalizedNode>,
    },
    /// One entry of a keyed list.
    ListEntry {
        /// List name.
        id: QName,
        /// Key leaf values.
        keys: OrderedMap<QName, DataValue>,
        /// Child slots.
        children: OrderedMap<PathArg, NormalizedNode>,
    },
    /// A choice's materialized children.
    Choice {
        /// Choice name.
        id: QName,
        /// Children from the selected case.
        children: OrderedMap<PathArg, NormalizedNode>,
    },
    /// An augmentation's contributed children.
    Augmentation {
        /// Augmentation identity.
        id: AugmentationId,
        /// Contributed child slots.
        children: OrderedMap<PathArg, NormalizedNode>,
    },
    /// Opaque modeled data.
    Anydata {
        /// Node name.
        id: QName,
        /// Opaque payload.
        value: DataValue,
    },
    /// Opaque XML data.
    Anyxml {
        /// Node name.
        id: QName,
        /// Opaque payload.
        value: DataValue,
    },
}

impl NormalizedNode {
    /// Creates a leaf node.
    #[must_use]
    pub fn leaf(id: QName, value: DataValue) -> Self {
        Self::Leaf { id, value }
    }

    /// Creates an empty container.
    #[must_use]
    pub fn container(id: QName) -> Self {
        Self::Container {
            id,
            children: OrderedMap::new(),
        }
    }

    /// Creates an empty choice node.
    #[must_use]
    pub fn choice(id: QName) -> Self {
        Self::Choice {
            id,
            children: OrderedMap::new(),
        }
    }

    /// Creates an empty list.
    #[must_use]
    pub fn list(id: QName) -> Self {
        Self::List {
            id,
            children: OrderedMap::new(),
        }
    }

    /// Creates a list entry with its key values.
    #[must_use]
    pub fn list_entry(id: QName, keys: impl IntoIterator<Item = (QName, DataValue)>) -> Self {
        let keys: OrderedMap<QName, DataValue> = keys.into_iter().collect();
        let mut children = OrderedMap::new();
        // Key leaves materialize as ordinary leaf children too.
        for (key, value) in keys.iter() {
            children = children.insert(
                PathArg::Node(key.clone()),
                Self::leaf(key.clone(), value.clone()),
            );
        }
        Self::ListEntry { id, keys, children }
    }

    /// Creates an empty leaf-set.
    #[must_use]
    pub fn leaf_set(id: QName) -> Self {
        Self::LeafSet {
            id,
            children: OrderedMap::new(),
        }
    }

    /// Creates a leaf-set entry.
    #[must_use]
    pub fn leaf_set_entry(id: QName, value: DataValue) -> Self {
        Self::LeafSetEntry { id, value }
    }

    /// Creates an empty augmentation node.
    #[must_use]
    pub fn augmentation(id: AugmentationId) -> Self {
        Self::Augmentation {
            id,
            children: OrderedMap::new(),
        }
    }

    /// Creates an anydata node.
    #[must_use]
    pub fn anydata(id: QName, value: DataValue) -> Self {
        Self::Anydata { id, value }
    }

    /// Creates an anyxml node.
    #[must_use]
    pub fn anyxml(id: QName, value: DataValue) -> Self {
        Self::Anyxml { id, value }
    }

    /// Returns this node's path argument.
    #[must_use]
    pub fn path_arg(&self) -> PathArg {
        match self {
            Self::Leaf { id, .. }
            | Self::LeafSet { id, .. }
            | Self::Container { id, .. }
            | Self::List { id, .. }
            | Self::Choice { id, .. }
            | Self::Anydata { id, .. }
            | Self::Anyxml { id, .. } => PathArg::Node(id.clone()),
            Self::LeafSetEntry { id, value } => PathArg::LeafSetEntry {
                name: id.clone(),
                value: value.clone(),
            },
            Self::ListEntry { id, keys, .. } => PathArg::ListEntry {
                name: id.clone(),
                keys: keys.clone(),
            },
            Self::Augmentation { id, .. } => PathArg::Augmentation(id.clone()),
        }
    }

    /// Returns the node name, when the identity carries one.
    #[must_use]
    pub const fn node_name(&self) -> Option<&QName> {
        match self {
            Self::Leaf { id, .. }
            | Self::LeafSet { id, .. }
            | Self::LeafSetEntry { id, .. }
            | Self::Container { id, .. }
            | Self::List { id, .. }
            | Self::ListEntry { id, .. }
            | Self::Choice { id, .. }
            | Self::Anydata { id, .. }
            | Self::Anyxml { id, .. } => Some(id),
            Self::Augmentation { .. } => None,
        }
    }

    /// Returns the scalar value of value-bearing nodes.
    #[must_use]
    pub const fn value(&self) -> Option<&DataValue> {
        match self {
            Self::Leaf { value, .. }
            | Self::LeafSetEntry { value, .. }
            | Self::Anydata { value, .. }
            | Self::Anyxml { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the child map of container-like nodes.
    #[must_use]
    pub const fn children(&self) -> Option<&OrderedMap<PathArg, NormalizedNode>> {
        match self {
            Self::LeafSet { children, .. }
            | Self::Container { children, .. }
            | Self::List { children, .. }
            | Self::ListEntry { children, .. }
            | Self::Choice { children, .. }
            | Self::Augmentation { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Returns true for nodes that hold children.
    #[must_use]
    pub const fn is_container_like(&self) -> bool {
        self.children().is_some()
    }

    /// Looks up a direct child.
    #[must_use]
    pub fn child(&self, arg: &PathArg) -> Option<&NormalizedNode> {
        self.children().and_then(|children| children.get(arg))
    }

    /// Returns a copy with the child inserted; no-op for non-containers.
    #[must_use]
    pub fn with_child(&self, child: NormalizedNode) -> Self {
        let arg = child.path_arg();
        self.with_child_map(|children| children.insert(arg.clone(), child.clone()))
    }

    /// Returns a copy with the child removed; no-op for non-containers.
    #[must_use]
    pub fn without_child(&self, arg: &PathArg) -> Self {
        self.with_child_map(|children| children.remove(arg))
    }

    /// Returns a copy with the child map replaced; non-containers are
    /// returned unchanged.
    #[must_use]
    pub fn replace_children(&self, children: OrderedMap<PathArg, NormalizedNode>) -> Self {
        self.with_child_map(|_| children.clone())
    }

    fn with_child_map(
        &self,
        edit: impl Fn(&OrderedMap<PathArg, NormalizedNode>) -> OrderedMap<PathArg, NormalizedNode>,
    ) -> Self {
        match self {
            Self::LeafSet { id, children } => Self::LeafSet {
                id: id.clone(),
                children: edit(children),
            },
            Self::Container { id, children } => Self::Container {
                id: id.clone(),
                children: edit(children),
            },
            Self::List { id, children } => Self::List {
                id: id.clone(),
                children: edit(children),
            },
            Self::ListEntry { id, keys, children } => Self::ListEntry {
                id: id.clone(),
                keys: keys.clone(),
                children: edit(children),
            },
            Self::Choice { id, children } => Self::Choice {
                id: id.clone(),
                children: edit(children),
            },
            Self::Augmentation { id, children } => Self::Augmentation {
                id: id.clone(),
                children: edit(children),
            },
            other => other.clone(),
        }
    }
}
