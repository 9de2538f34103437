//! Core identifiers, errors, and persistent collections for Yangforge.
//!
//! This crate provides:
//! - [`QName`] - Namespace-qualified schema node names
//! - [`QNameModule`] - Module identifiers (namespace + optional revision)
//! - [`Revision`] - Validated `YYYY-MM-DD` revision dates
//! - [`Error`] - Rich error types with source references
//! - [`OrderedMap`] - Persistent insertion-ordered map
//! - [`Interner`] - Deduplication of names and reserved argument strings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod collections;
pub mod error;
pub mod intern;
pub mod qname;

// Re-export primary types at crate root for convenience
pub use collections::OrderedMap;
pub use error::{Error, ErrorKind, SourceRef};
pub use intern::Interner;
pub use qname::{QName, QNameModule, Revision};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
