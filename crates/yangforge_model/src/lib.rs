//! Declared and effective statement model for Yangforge.
//!
//! This crate provides:
//! - [`YangKeyword`] and [`StatementName`] - Statement identity
//! - [`ArgValue`] - Parsed statement arguments
//! - [`StatementRecord`] / [`DeclaredStatement`] - The declared tree
//! - [`EffectiveStatement`] and [`EffectiveModelContext`] - The effective model
//! - [`SubstatementValidator`] - Cardinality grammar enforcement
//! - [`InferenceStack`] - Mutable cursor over an effective model

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::missing_errors_doc)]

pub mod arg;
pub mod context;
pub mod decl;
pub mod effective;
pub mod flags;
pub mod ident;
pub mod keyword;
pub mod path;
pub mod stack;
pub mod types;
pub mod validator;

// Re-exports for convenience
pub use arg::{ArgValue, DeviateKind, FeatureSet, IfFeatureExpr, OrderedBy, Status};
pub use context::EffectiveModelContext;
pub use decl::{DeclaredStatement, StatementRecord, StatementSource};
pub use effective::EffectiveStatement;
pub use flags::{FlagsBuilder, StatementFlags};
pub use ident::Absolute;
pub use keyword::{StatementName, YangKeyword};
pub use path::{NameRef, PathExpression, Step};
pub use stack::{Inference, InferenceStack};
pub use types::{
    BaseType, EnumSpec, LengthConstraint, PatternConstraint, RangeConstraint, TypeSpec,
};
pub use validator::SubstatementValidator;
