//! Interning for names and reserved argument strings.
//!
//! Namespace URIs, local names, and the small reserved argument lexicon
//! (deviate kinds, the pattern modifier) occur many times across sources.
//! Interning them makes repeated arguments share storage and makes QName
//! clones cheap pointer bumps.

use std::collections::HashMap;
use std::sync::Arc;

use crate::qname::QName;

/// Reserved argument strings shared by every interner instance.
///
/// These are the deviate kind keywords plus the `pattern` modifier.
pub const RESERVED_ARGUMENTS: [&str; 5] =
    ["add", "delete", "replace", "not-supported", "invert-match"];

/// Deduplication table for strings and qualified names.
///
/// Not thread-safe; each reactor owns one.
#[derive(Clone, Debug)]
pub struct Interner {
    strings: HashMap<Arc<str>, Arc<str>>,
    qnames: HashMap<QName, QName>,
}

impl Interner {
    /// Creates an interner pre-populated with the reserved lexicon.
    #[must_use]
    pub fn new() -> Self {
        let mut strings = HashMap::new();
        for s in RESERVED_ARGUMENTS {
            let arc: Arc<str> = s.into();
            strings.insert(Arc::clone(&arc), arc);
        }
        Self {
            strings,
            qnames: HashMap::new(),
        }
    }

    /// Interns a string, returning the shared copy.
    pub fn intern_str(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return Arc::clone(existing);
        }
        let arc: Arc<str> = s.into();
        self.strings.insert(Arc::clone(&arc), Arc::clone(&arc));
        arc
    }

    /// Interns a qualified name, returning the shared copy.
    pub fn intern_qname(&mut self, qname: QName) -> QName {
        if let Some(existing) = self.qnames.get(&qname) {
            return existing.clone();
        }
        self.qnames.insert(qname.clone(), qname.clone());
        qname
    }

    /// Returns the shared copy of a reserved argument, if `s` is one.
    #[must_use]
    pub fn reserved(&self, s: &str) -> Option<Arc<str>> {
        if RESERVED_ARGUMENTS.contains(&s) {
            self.strings.get(s).map(Arc::clone)
        } else {
            None
        }
    }

    /// Returns the number of distinct interned strings.
    #[must_use]
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Returns the number of distinct interned qualified names.
    #[must_use]
    pub fn qname_count(&self) -> usize {
        self.qnames.len()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
