//! Substatement cardinality validation.
//!
//! Each keyword's support declares which child keywords may appear and how
//! many times. The FullDeclaration phase runs these validators over every
//! declared statement. Extension (unknown) statements are always admitted.

use std::collections::HashMap;

use yangforge_foundation::{Error, Result, SourceRef};

use crate::keyword::{StatementName, YangKeyword};

/// Occurrence bounds for one child keyword.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cardinality {
    /// Minimum number of occurrences.
    pub min: usize,
    /// Maximum number of occurrences.
    pub max: usize,
}

/// Cardinality rules for the children of one keyword.
#[derive(Clone, Debug)]
pub struct SubstatementValidator {
    parent: YangKeyword,
    rules: HashMap<YangKeyword, Cardinality>,
}

impl SubstatementValidator {
    /// Starts building a validator for the given parent keyword.
    #[must_use]
    pub fn builder(parent: YangKeyword) -> Builder {
        Builder {
            parent,
            rules: HashMap::new(),
        }
    }

    /// Validates the children of one declared statement.
    ///
    /// # Errors
    /// Returns a source error naming the first violated rule.
    pub fn validate<'a>(
        &self,
        children: impl Iterator<Item = &'a StatementName>,
        at: &SourceRef,
    ) -> Result<()> {
        let mut counts: HashMap<YangKeyword, usize> = HashMap::new();
        for child in children {
            let Some(keyword) = child.keyword() else {
                // Extension statements are outside the RFC grammar.
                continue;
            };
            if !self.rules.contains_key(&keyword) {
                return Err(Error::source(format!(
                    "{} is not valid for {}",
                    keyword.validator_name(),
                    self.parent.validator_name()
                ))
                .at(at.clone()));
            }
            *counts.entry(keyword).or_insert(0) += 1;
        }

        for (keyword, cardinality) in &self.rules {
            let count = counts.get(keyword).copied().unwrap_or(0);
            if count > cardinality.max {
                return Err(Error::source(format!(
                    "Maximal count of {} for {} is {}, detected {}",
                    keyword.validator_name(),
                    self.parent.validator_name(),
                    cardinality.max,
                    count
                ))
                .at(at.clone()));
            }
            if count < cardinality.min {
                return Err(Error::source(format!(
                    "Minimal count of {} for {} is {}, detected {}",
                    keyword.validator_name(),
                    self.parent.validator_name(),
                    cardinality.min,
                    count
                ))
                .at(at.clone()));
            }
        }
        Ok(())
    }

    /// Returns the parent keyword this validator covers.
    #[must_use]
    pub const fn parent(&self) -> YangKeyword {
        self.parent
    }
}

/// Builder for [`SubstatementValidator`].
#[derive(Clone, Debug)]
pub struct Builder {
    parent: YangKeyword,
    rules: HashMap<YangKeyword, Cardinality>,
}

impl Builder {
    /// Permits `keyword` zero or one time.
    #[must_use]
    pub fn add_optional(mut self, keyword: YangKeyword) -> Self {
        self.rules.insert(keyword, Cardinality { min: 0, max: 1 });
        self
    }

    /// Permits `keyword` any number of times.
    #[must_use]
    pub fn add_any(mut self, keyword: YangKeyword) -> Self {
        self.rules
            .insert(keyword, Cardinality { min: 0, max: usize::MAX });
        self
    }

    /// Requires `keyword` exactly once.
    #[must_use]
    pub fn add_mandatory(mut self, keyword: YangKeyword) -> Self {
        self.rules.insert(keyword, Cardinality { min: 1, max: 1 });
        self
    }

    /// Requires `keyword` at least once.
    #[must_use]
    pub fn add_multiple(mut self, keyword: YangKeyword) -> Self {
        self.rules
            .insert(keyword, Cardinality { min: 1, max: usize::MAX });
        self
    }

    /// Permits `keyword` with explicit bounds.
    #[must_use]
    pub fn add_with_cardinality(mut self, keyword: YangKeyword, min: usize, max: usize) -> Self {
        self.rules.insert(keyword, Cardinality { min, max });
        self
    }

    /// Finishes the validator.
    #[must_use]
    pub fn build(self) -> SubstatementValidator {
        SubstatementValidator {
            parent: self.parent,
            rules: self.rules,
        }
    }
}
