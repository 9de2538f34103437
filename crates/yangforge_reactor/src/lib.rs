//! Phased inference engine for Yangforge.
//!
//! This crate provides:
//! - [`Reactor`] - The cross-source build driver
//! - [`Phase`] - The four processing phases
//! - [`InferenceAction`] - Deferred steps with prerequisites
//! - [`Namespace`] / [`NamespaceStore`] - Typed scoped lookups
//! - [`StatementSupport`] / [`SupportRegistry`] - Per-keyword behaviour
//! - [`stmt`] - The built-in RFC 7950 supports
//!
//! # Example
//!
//! ```
//! use yangforge_model::{StatementRecord, StatementSource, YangKeyword};
//! use yangforge_reactor::Reactor;
//!
//! let module = StatementRecord::new(YangKeyword::Module, Some("demo"))
//!     .with_child(StatementRecord::new(YangKeyword::Namespace, Some("urn:demo")))
//!     .with_child(StatementRecord::new(YangKeyword::Prefix, Some("d")))
//!     .with_child(
//!         StatementRecord::new(YangKeyword::Container, Some("state"))
//!             .with_child(
//!                 StatementRecord::new(YangKeyword::Leaf, Some("name")).with_child(
//!                     StatementRecord::new(YangKeyword::Type, Some("string")),
//!                 ),
//!             ),
//!     );
//!
//! let mut reactor = Reactor::new();
//! reactor.add_source(&StatementSource::new("demo.yang", module));
//! let model = reactor.build().unwrap();
//! assert_eq!(model.module_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::missing_errors_doc)]

pub mod action;
pub mod ctx;
pub mod namespace;
pub mod phase;
pub mod reactor;
pub mod stmt;
pub mod support;

// Re-exports for convenience
pub use action::{InferenceAction, Prereq};
pub use ctx::{Arena, CopyType, CtxId, StmtCtx};
pub use namespace::{Namespace, NamespaceBehaviour, NamespaceStore};
pub use phase::Phase;
pub use reactor::{Reactor, ReactorError};
pub use stmt::default_registry;
pub use support::{
    ArgKind, ArgumentContext, BuiltinSupport, StatementPolicy, StatementSupport, SupportRegistry,
};
