//! Path expressions for `leafref` and `instance-identifier` types.
//!
//! The external XPath library delivers these already typed; this module also
//! carries the small textual parser used when a `path` argument arrives as a
//! raw string. Only the child and parent axes exist in YANG path arguments.

use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{Error, QName, QNameModule, Result};

/// A possibly-unqualified node name inside a path step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameRef {
    /// A name resolved to a concrete module.
    Qualified(QName),
    /// A bare name, bound to the active module at resolution time.
    Unqualified(Arc<str>),
}

impl fmt::Display for NameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified(qname) => write!(f, "{qname}"),
            Self::Unqualified(name) => write!(f, "{name}"),
        }
    }
}

/// One step of a location path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// `..` - move to the data-tree parent.
    Parent,
    /// A child step naming the next node.
    Child(NameRef),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => f.write_str(".."),
            Self::Child(name) => write!(f, "{name}"),
        }
    }
}

/// A parsed `path` argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathExpression {
    /// Location path anchored at the module root.
    Absolute(Vec<Step>),
    /// Location path relative to the current node.
    Relative(Vec<Step>),
    /// `deref(<relative>)/<relative>` - dereference then navigate.
    Deref {
        /// The path to the leafref being dereferenced.
        deref_arg: Vec<Step>,
        /// The remaining navigation from the dereferenced target.
        relative: Vec<Step>,
    },
}

impl PathExpression {
    /// Returns true for absolute location paths.
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute(_))
    }

    /// Parses a `path` argument string.
    ///
    /// Key predicates (`[...]`) are accepted and discarded; leafref
    /// resolution is purely structural. `resolve_prefix` maps a prefix to
    /// its module, returning `None` for unknown prefixes.
    pub fn parse(
        raw: &str,
        resolve_prefix: &dyn Fn(&str) -> Option<QNameModule>,
    ) -> Result<Self> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("deref(") {
            let close = rest.find(')').ok_or_else(|| {
                Error::source(format!("unterminated deref in path '{raw}'"))
            })?;
            let deref_arg = parse_steps(&rest[..close], resolve_prefix, raw)?;
            let tail = rest[close + 1..].trim_start_matches('/');
            let relative = parse_steps(tail, resolve_prefix, raw)?;
            return Ok(Self::Deref { deref_arg, relative });
        }
        if let Some(rest) = raw.strip_prefix('/') {
            Ok(Self::Absolute(parse_steps(rest, resolve_prefix, raw)?))
        } else {
            Ok(Self::Relative(parse_steps(raw, resolve_prefix, raw)?))
        }
    }
}

fn parse_steps(
    text: &str,
    resolve_prefix: &dyn Fn(&str) -> Option<QNameModule>,
    whole: &str,
) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for segment in text.split('/') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        // Strip key predicates; structural resolution ignores them.
        let segment = match segment.find('[') {
            Some(idx) => segment[..idx].trim(),
            None => segment,
        };
        if segment == ".." {
            steps.push(Step::Parent);
            continue;
        }
        let name = match segment.split_once(':') {
            Some((prefix, local)) => {
                let module = resolve_prefix(prefix).ok_or_else(|| {
                    Error::source(format!("unknown prefix '{prefix}' in path '{whole}'"))
                })?;
                NameRef::Qualified(QName::new(module, local)?)
            }
            None => NameRef::Unqualified(segment.into()),
        };
        steps.push(Step::Child(name));
    }
    if steps.is_empty() {
        return Err(Error::source(format!("empty path expression '{whole}'")));
    }
    Ok(steps)
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, steps: &[Step]| -> fmt::Result {
            let mut first = true;
            for step in steps {
                if !first {
                    f.write_str("/")?;
                }
                write!(f, "{step}")?;
                first = false;
            }
            Ok(())
        };
        match self {
            Self::Absolute(steps) => {
                f.write_str("/")?;
                join(f, steps)
            }
            Self::Relative(steps) => join(f, steps),
            Self::Deref { deref_arg, relative } => {
                f.write_str("deref(")?;
                join(f, deref_arg)?;
                f.write_str(")/")?;
                join(f, relative)
            }
        }
    }
}
