//! Yangforge - YANG statement compiler and schema-aware data tree engine
//!
//! This crate re-exports all layers of the Yangforge system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: yangforge_reactor    — Phased inference, statement supports
//!          yangforge_data       — Normalized nodes, versioned tree, apply
//! Layer 2: yangforge_model      — Declared/effective statements, stack
//! Layer 0: yangforge_foundation — QNames, revisions, errors, collections
//! ```

pub use yangforge_data as data;
pub use yangforge_foundation as foundation;
pub use yangforge_model as model;
pub use yangforge_reactor as reactor;
