//! Qualified names and module identifiers.
//!
//! Every schema node, feature, and normalized-node child slot is identified
//! by a [`QName`]: the triple of namespace, optional revision, and local
//! name. Two revisions of the same namespace are distinct modules and their
//! names never compare equal.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};
use crate::Result;

/// A validated `YYYY-MM-DD` revision date.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision {
    year: u16,
    month: u8,
    day: u8,
}

impl Revision {
    /// Creates a revision from its components.
    ///
    /// # Errors
    /// Returns a source error if the components do not form a calendar date.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self> {
        if month == 0 || month > 12 {
            return Err(Error::new(ErrorKind::IllegalArgument {
                message: format!("invalid revision month {month}"),
            }));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(Error::new(ErrorKind::IllegalArgument {
                message: format!("invalid revision day {day}"),
            }));
        }
        Ok(Self { year, month, day })
    }

    /// Parses a `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let malformed = || {
            Error::new(ErrorKind::IllegalArgument {
                message: format!("revision '{s}' is not in YYYY-MM-DD format"),
            })
        };
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(malformed());
        }
        let year: u16 = s[0..4].parse().map_err(|_| malformed())?;
        let month: u8 = s[5..7].parse().map_err(|_| malformed())?;
        let day: u8 = s[8..10].parse().map_err(|_| malformed())?;
        Self::new(year, month, day)
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
            if leap {
                29
            } else {
                28
            }
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({self})")
    }
}

/// A module identifier: namespace URI plus optional revision.
///
/// Clone is O(1); the namespace string is shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QNameModule {
    namespace: Arc<str>,
    revision: Option<Revision>,
}

impl QNameModule {
    /// Creates a module identifier.
    #[must_use]
    pub fn new(namespace: impl Into<Arc<str>>, revision: Option<Revision>) -> Self {
        Self {
            namespace: namespace.into(),
            revision,
        }
    }

    /// Creates a revision-less module identifier.
    #[must_use]
    pub fn of(namespace: impl Into<Arc<str>>) -> Self {
        Self::new(namespace, None)
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the revision, if any.
    #[must_use]
    pub const fn revision(&self) -> Option<Revision> {
        self.revision
    }

    /// Binds a local name to this module.
    pub fn with_local_name(&self, local_name: &str) -> Result<QName> {
        QName::new(self.clone(), local_name)
    }
}

impl fmt::Debug for QNameModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(rev) => write!(f, "QNameModule({}@{rev})", self.namespace),
            None => write!(f, "QNameModule({})", self.namespace),
        }
    }
}

impl fmt::Display for QNameModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(rev) => write!(f, "{}@{rev}", self.namespace),
            None => write!(f, "{}", self.namespace),
        }
    }
}

/// A namespace-qualified name.
///
/// Equality and hash cover the namespace, the revision, and the local name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QName {
    module: QNameModule,
    local_name: Arc<str>,
}

impl QName {
    /// Creates a qualified name in the given module.
    ///
    /// # Errors
    /// Returns an error if `local_name` is not a valid YANG identifier.
    pub fn new(module: QNameModule, local_name: &str) -> Result<Self> {
        if !is_valid_identifier(local_name) {
            return Err(Error::new(ErrorKind::IllegalArgument {
                message: format!("'{local_name}' is not a valid identifier"),
            }));
        }
        Ok(Self {
            module,
            local_name: local_name.into(),
        })
    }

    /// Creates a qualified name in a revision-less namespace.
    pub fn create(namespace: &str, local_name: &str) -> Result<Self> {
        Self::new(QNameModule::of(namespace), local_name)
    }

    /// Returns the owning module identifier.
    #[must_use]
    pub fn module(&self) -> &QNameModule {
        &self.module
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns a copy of this name re-bound to another module.
    #[must_use]
    pub fn bind_to(&self, module: QNameModule) -> Self {
        Self {
            module,
            local_name: Arc::clone(&self.local_name),
        }
    }
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({}){}", self.module, self.local_name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.module, self.local_name)
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::{QName, QNameModule, Revision};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Revision {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Revision {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Revision::parse(&s).map_err(D::Error::custom)
        }
    }

    #[derive(Serialize, Deserialize)]
    struct ModuleRepr {
        namespace: String,
        revision: Option<Revision>,
    }

    impl Serialize for QNameModule {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            ModuleRepr {
                namespace: self.namespace().to_string(),
                revision: self.revision(),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for QNameModule {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let repr = ModuleRepr::deserialize(deserializer)?;
            Ok(QNameModule::new(repr.namespace, repr.revision))
        }
    }

    #[derive(Serialize, Deserialize)]
    struct QNameRepr {
        module: QNameModule,
        local_name: String,
    }

    impl Serialize for QName {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            QNameRepr {
                module: self.module().clone(),
                local_name: self.local_name().to_string(),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for QName {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let repr = QNameRepr::deserialize(deserializer)?;
            QName::new(repr.module, &repr.local_name).map_err(D::Error::custom)
        }
    }
}
