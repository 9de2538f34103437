//! Instance data for Yangforge: normalized nodes, the versioned immutable
//! tree, and the schema-aware modification engine.
//!
//! This crate provides:
//! - [`DataValue`] - Scalar values with type checking
//! - [`NormalizedNode`] / [`PathArg`] - The canonical instance tree
//! - [`TreeNode`] / [`Version`] - Versioned snapshots with structural sharing
//! - [`DataTreeModification`] / [`InMemoryDataTree`] - The write path
//! - [`binfmt`] - Legacy value-codec tag selection

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::missing_errors_doc)]

pub mod binfmt;
pub mod modification;
pub mod node;
pub mod strategy;
pub mod tree;
pub mod value;

// Re-exports for convenience
pub use modification::{DataTreeModification, InMemoryDataTree, InstancePath, Operation};
pub use node::{AugmentationId, NormalizedNode, PathArg};
pub use strategy::ApplyStrategy;
pub use tree::{TreeNode, Version};
pub use value::DataValue;
