//! Statement keywords and statement identity.
//!
//! RFC 7950 keywords live in the reserved YANG namespace and are represented
//! directly as [`YangKeyword`]. Extension statements are identified by the
//! qualified name of their defining `extension` statement.

use std::fmt;

use yangforge_foundation::QName;

/// RFC 6020 / RFC 7950 statement keywords understood by this engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum YangKeyword {
    Action,
    Anydata,
    Anyxml,
    Argument,
    Augment,
    Base,
    BelongsTo,
    Bit,
    Case,
    Choice,
    Config,
    Contact,
    Container,
    Default,
    Description,
    Deviate,
    Deviation,
    Enum,
    ErrorMessage,
    Extension,
    Feature,
    FractionDigits,
    Grouping,
    Identity,
    IfFeature,
    Import,
    Include,
    Input,
    Key,
    Leaf,
    LeafList,
    Length,
    List,
    Mandatory,
    MaxElements,
    MinElements,
    Modifier,
    Module,
    Must,
    Namespace,
    Notification,
    OrderedBy,
    Organization,
    Output,
    Path,
    Pattern,
    Position,
    Prefix,
    Presence,
    Range,
    Reference,
    Refine,
    RequireInstance,
    Revision,
    RevisionDate,
    Rpc,
    Status,
    Submodule,
    Type,
    Typedef,
    Unique,
    Units,
    Uses,
    Value,
    When,
    YangVersion,
}

impl YangKeyword {
    /// Returns the keyword as it appears in YANG source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Anydata => "anydata",
            Self::Anyxml => "anyxml",
            Self::Argument => "argument",
            Self::Augment => "augment",
            Self::Base => "base",
            Self::BelongsTo => "belongs-to",
            Self::Bit => "bit",
            Self::Case => "case",
            Self::Choice => "choice",
            Self::Config => "config",
            Self::Contact => "contact",
            Self::Container => "container",
            Self::Default => "default",
            Self::Description => "description",
            Self::Deviate => "deviate",
            Self::Deviation => "deviation",
            Self::Enum => "enum",
            Self::ErrorMessage => "error-message",
            Self::Extension => "extension",
            Self::Feature => "feature",
            Self::FractionDigits => "fraction-digits",
            Self::Grouping => "grouping",
            Self::Identity => "identity",
            Self::IfFeature => "if-feature",
            Self::Import => "import",
            Self::Include => "include",
            Self::Input => "input",
            Self::Key => "key",
            Self::Leaf => "leaf",
            Self::LeafList => "leaf-list",
            Self::Length => "length",
            Self::List => "list",
            Self::Mandatory => "mandatory",
            Self::MaxElements => "max-elements",
            Self::MinElements => "min-elements",
            Self::Modifier => "modifier",
            Self::Module => "module",
            Self::Must => "must",
            Self::Namespace => "namespace",
            Self::Notification => "notification",
            Self::OrderedBy => "ordered-by",
            Self::Organization => "organization",
            Self::Output => "output",
            Self::Path => "path",
            Self::Pattern => "pattern",
            Self::Position => "position",
            Self::Prefix => "prefix",
            Self::Presence => "presence",
            Self::Range => "range",
            Self::Reference => "reference",
            Self::Refine => "refine",
            Self::RequireInstance => "require-instance",
            Self::Revision => "revision",
            Self::RevisionDate => "revision-date",
            Self::Rpc => "rpc",
            Self::Status => "status",
            Self::Submodule => "submodule",
            Self::Type => "type",
            Self::Typedef => "typedef",
            Self::Unique => "unique",
            Self::Units => "units",
            Self::Uses => "uses",
            Self::Value => "value",
            Self::When => "when",
            Self::YangVersion => "yang-version",
        }
    }

    /// Returns the uppercase form used in validator diagnostics,
    /// e.g. `MAX_ELEMENTS` for `max-elements`.
    #[must_use]
    pub fn validator_name(self) -> String {
        self.name().replace('-', "_").to_uppercase()
    }

    /// Returns true for keywords that introduce schema-tree nodes.
    #[must_use]
    pub const fn is_schema_tree(self) -> bool {
        matches!(
            self,
            Self::Container
                | Self::Leaf
                | Self::LeafList
                | Self::List
                | Self::Choice
                | Self::Case
                | Self::Anydata
                | Self::Anyxml
                | Self::Rpc
                | Self::Action
                | Self::Notification
                | Self::Input
                | Self::Output
        )
    }

    /// Returns true for keywords that introduce data-tree nodes.
    ///
    /// `choice` and `case` are schema-tree-only; they do not appear in
    /// instance data.
    #[must_use]
    pub const fn is_data_tree(self) -> bool {
        self.is_schema_tree() && !matches!(self, Self::Choice | Self::Case)
    }

    /// Returns true for keywords whose statement may hold schema-tree
    /// children.
    #[must_use]
    pub const fn is_schema_tree_aware(self) -> bool {
        matches!(
            self,
            Self::Module
                | Self::Submodule
                | Self::Container
                | Self::List
                | Self::Choice
                | Self::Case
                | Self::Grouping
                | Self::Rpc
                | Self::Action
                | Self::Notification
                | Self::Input
                | Self::Output
        )
    }

    /// Returns true for keywords whose statement may hold data-tree
    /// children directly.
    #[must_use]
    pub const fn is_data_tree_aware(self) -> bool {
        matches!(
            self,
            Self::Module
                | Self::Submodule
                | Self::Container
                | Self::List
                | Self::Case
                | Self::Grouping
                | Self::Rpc
                | Self::Action
                | Self::Notification
                | Self::Input
                | Self::Output
        )
    }
}

impl fmt::Display for YangKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a statement: an RFC keyword or an extension's qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatementName {
    /// A keyword defined by RFC 6020 / RFC 7950.
    Rfc(YangKeyword),
    /// An extension statement, identified by its defining module.
    Extension(QName),
}

impl StatementName {
    /// Returns the RFC keyword, if this is not an extension.
    #[must_use]
    pub const fn keyword(&self) -> Option<YangKeyword> {
        match self {
            Self::Rfc(kw) => Some(*kw),
            Self::Extension(_) => None,
        }
    }

    /// Returns true if this names the given RFC keyword.
    #[must_use]
    pub fn is(&self, keyword: YangKeyword) -> bool {
        matches!(self, Self::Rfc(kw) if *kw == keyword)
    }

    /// Returns true for extension (unknown) statements.
    #[must_use]
    pub const fn is_extension(&self) -> bool {
        matches!(self, Self::Extension(_))
    }
}

impl From<YangKeyword> for StatementName {
    fn from(kw: YangKeyword) -> Self {
        Self::Rfc(kw)
    }
}

impl fmt::Display for StatementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfc(kw) => write!(f, "{kw}"),
            Self::Extension(qname) => write!(f, "{qname}"),
        }
    }
}
