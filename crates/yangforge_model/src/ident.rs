//! Schema node identifiers.

use std::fmt;

use yangforge_foundation::{Error, QName, Result};

/// An absolute schema node identifier: the sequence of qualified names from
/// the module root down to one schema node.
///
/// Never empty; unique within one effective model.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Absolute {
    qnames: Vec<QName>,
}

impl Absolute {
    /// Creates an identifier from a non-empty path.
    ///
    /// # Errors
    /// Returns an illegal-argument error for an empty path.
    pub fn new(qnames: Vec<QName>) -> Result<Self> {
        if qnames.is_empty() {
            return Err(Error::illegal_argument(
                "schema node identifier requires at least one node identifier",
            ));
        }
        Ok(Self { qnames })
    }

    /// Creates a single-element identifier.
    #[must_use]
    pub fn of(qname: QName) -> Self {
        Self {
            qnames: vec![qname],
        }
    }

    /// Returns the path from the module root.
    #[must_use]
    pub fn node_identifiers(&self) -> &[QName] {
        &self.qnames
    }

    /// Returns the last (deepest) node identifier.
    #[must_use]
    pub fn last(&self) -> &QName {
        // Construction guarantees non-emptiness.
        &self.qnames[self.qnames.len() - 1]
    }

    /// Returns the first (module-root) node identifier.
    #[must_use]
    pub fn first(&self) -> &QName {
        &self.qnames[0]
    }

    /// Returns the number of path elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.qnames.len()
    }

    /// Always false; identifiers are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns a new identifier with one more descendant step.
    #[must_use]
    pub fn descendant(&self, qname: QName) -> Self {
        let mut qnames = self.qnames.clone();
        qnames.push(qname);
        Self { qnames }
    }
}

impl fmt::Display for Absolute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qname in &self.qnames {
            write!(f, "/{}", qname.local_name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Absolute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Absolute({self})")
    }
}
