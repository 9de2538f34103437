//! Error types for the Yangforge system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! The taxonomy follows the processing pipeline: source errors are fatal to
//! one source, inference errors are accumulated by the reactor, schema
//! violations come from the data-tree apply engine, and illegal
//! argument/state errors signal caller bugs.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// The main error type for Yangforge operations.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind}{}", source_ref.as_ref().map(|r| format!(" [at {r}]")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Where in the source text the error originated, if known.
    pub source_ref: Option<SourceRef>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            source_ref: None,
        }
    }

    /// Attaches a source reference to this error.
    #[must_use]
    pub fn at(mut self, source_ref: SourceRef) -> Self {
        self.source_ref = Some(source_ref);
        self
    }

    /// Creates a source error (fatal to the affected source).
    #[must_use]
    pub fn source(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Source {
            message: message.into(),
        })
    }

    /// Creates an inference error (accumulated by the reactor).
    #[must_use]
    pub fn inference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Inference {
            message: message.into(),
        })
    }

    /// Creates a schema violation raised by the apply engine.
    #[must_use]
    pub fn schema_violation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaViolation {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Creates an illegal-argument error.
    #[must_use]
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalArgument {
            message: message.into(),
        })
    }

    /// Creates an illegal-state error (programmatic misuse).
    #[must_use]
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalState {
            message: message.into(),
        })
    }

    /// Creates the recoverable marker for `deref` of an instance-identifier.
    #[must_use]
    pub fn unsupported_deref(type_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedDeref {
            type_name: type_name.into(),
        })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ErrorKind {
    /// Malformed statement in one source: bad cardinality, unparseable
    /// argument, unknown mandatory statement.
    #[error("{message}")]
    Source {
        /// Description of the problem.
        message: String,
    },

    /// Unresolved reference, cycle, or target mismatch found during
    /// inference.
    #[error("{message}")]
    Inference {
        /// Description of the problem.
        message: String,
    },

    /// A modification violated a structural, type, or case constraint.
    #[error("schema violation at {path}: {message}")]
    SchemaViolation {
        /// Instance path of the offending node.
        path: String,
        /// Description of the violated constraint.
        message: String,
    },

    /// A lookup was given an argument the model cannot satisfy.
    #[error("{message}")]
    IllegalArgument {
        /// Description of the problem.
        message: String,
    },

    /// An operation was invoked on an object in the wrong state.
    #[error("{message}")]
    IllegalState {
        /// Description of the problem.
        message: String,
    },

    /// `deref` of an instance-identifier has no static semantics.
    #[error("cannot infer instance-identifier reference {type_name}")]
    UnsupportedDeref {
        /// The offending type.
        type_name: String,
    },
}

impl ErrorKind {
    /// Returns true for errors that indicate caller bugs rather than bad
    /// input data.
    #[must_use]
    pub const fn is_illegal_use(&self) -> bool {
        matches!(self, Self::IllegalState { .. })
    }
}

/// A reference into the source a statement was declared in.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceRef {
    /// Source (file or module) name.
    pub source: Arc<str>,
    /// Line number, 1-indexed. Zero when unknown.
    pub line: u32,
}

impl SourceRef {
    /// Creates a new source reference.
    #[must_use]
    pub fn new(source: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }

    /// A reference to a source with no position information.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            source: "<unknown>".into(),
            line: 0,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{}:{}", self.source, self.line)
        }
    }
}

impl fmt::Debug for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceRef({self})")
    }
}
