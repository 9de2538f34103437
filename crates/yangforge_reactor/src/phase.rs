//! Model processing phases.

use std::fmt;

/// The fixed sequence of phases every statement moves through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Resolve module/submodule/belongs-to/import; bind prefixes.
    SourceLinkage,
    /// Identify unknown statements and parse arguments.
    StatementDefinition,
    /// Enforce substatement cardinality; run per-keyword hooks.
    FullDeclaration,
    /// Expand uses/augment/deviate, evaluate if-feature, build the
    /// effective model.
    EffectiveModel,
}

impl Phase {
    /// All phases, in execution order.
    pub const ALL: [Phase; 4] = [
        Phase::SourceLinkage,
        Phase::StatementDefinition,
        Phase::FullDeclaration,
        Phase::EffectiveModel,
    ];

    /// Returns the phase executed before this one.
    #[must_use]
    pub const fn prev(self) -> Option<Phase> {
        match self {
            Self::SourceLinkage => None,
            Self::StatementDefinition => Some(Self::SourceLinkage),
            Self::FullDeclaration => Some(Self::StatementDefinition),
            Self::EffectiveModel => Some(Self::FullDeclaration),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SourceLinkage => "source-linkage",
            Self::StatementDefinition => "statement-definition",
            Self::FullDeclaration => "full-declaration",
            Self::EffectiveModel => "effective-model",
        })
    }
}
