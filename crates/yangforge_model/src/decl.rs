//! Declared statements and the parser input contract.
//!
//! The external lexer/parser delivers each source as a tree of
//! [`StatementRecord`]s: keyword, raw argument, source reference, children.
//! The reactor parses arguments and produces [`DeclaredStatement`]s, which
//! are immutable from then on.

use std::sync::Arc;

use yangforge_foundation::SourceRef;

use crate::arg::ArgValue;
use crate::keyword::{StatementName, YangKeyword};

/// One record of the declared-statement input stream.
#[derive(Clone, Debug, PartialEq)]
pub struct StatementRecord {
    /// Statement identity.
    pub name: StatementName,
    /// The raw argument string, if the keyword takes one.
    pub raw_argument: Option<String>,
    /// Where the statement was declared.
    pub source_ref: SourceRef,
    /// Ordered child records.
    pub children: Vec<StatementRecord>,
}

impl StatementRecord {
    /// Creates a record for an RFC keyword.
    #[must_use]
    pub fn new(keyword: YangKeyword, raw_argument: Option<&str>) -> Self {
        Self {
            name: StatementName::Rfc(keyword),
            raw_argument: raw_argument.map(String::from),
            source_ref: SourceRef::unknown(),
            children: Vec::new(),
        }
    }

    /// Creates a record for an extension statement.
    #[must_use]
    pub fn extension(name: StatementName, raw_argument: Option<&str>) -> Self {
        Self {
            name,
            raw_argument: raw_argument.map(String::from),
            source_ref: SourceRef::unknown(),
            children: Vec::new(),
        }
    }

    /// Sets the source reference.
    #[must_use]
    pub fn at(mut self, source_ref: SourceRef) -> Self {
        self.source_ref = source_ref;
        self
    }

    /// Appends one child record.
    #[must_use]
    pub fn with_child(mut self, child: StatementRecord) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child records.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = StatementRecord>) -> Self {
        self.children.extend(children);
        self
    }
}

/// One source handed to the reactor: a named tree rooted at a `module` or
/// `submodule` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct StatementSource {
    /// Source name used in diagnostics (typically the file name).
    pub name: Arc<str>,
    /// The root statement record.
    pub root: StatementRecord,
}

impl StatementSource {
    /// Creates a named source.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, root: StatementRecord) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

/// A declared statement: a record plus its parsed argument.
///
/// Immutable once the defining phase completes.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredStatement {
    /// Statement identity.
    pub name: StatementName,
    /// The raw argument string.
    pub raw_argument: Option<Arc<str>>,
    /// The parsed argument value.
    pub argument: ArgValue,
    /// Where the statement was declared.
    pub source_ref: SourceRef,
}

impl DeclaredStatement {
    /// Creates a declared statement.
    #[must_use]
    pub fn new(
        name: StatementName,
        raw_argument: Option<Arc<str>>,
        argument: ArgValue,
        source_ref: SourceRef,
    ) -> Self {
        Self {
            name,
            raw_argument,
            argument,
            source_ref,
        }
    }
}
