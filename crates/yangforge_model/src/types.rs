//! Compiled type specifications.
//!
//! A [`TypeSpec`] is the flattened result of walking a `typedef` derivation
//! chain: the base built-in type plus every restriction accumulated along
//! the way. Leafref types keep their path expression; the resolved target
//! type is cached on the effective model context, not here.

use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{Error, Result};

use crate::path::PathExpression;

/// The YANG built-in types understood by this engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BaseType {
    Binary,
    Boolean,
    Decimal64,
    Empty,
    Enumeration,
    InstanceIdentifier,
    Int8,
    Int16,
    Int32,
    Int64,
    Leafref,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Union,
}

impl BaseType {
    /// Maps a built-in type name to its descriptor.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "binary" => Self::Binary,
            "boolean" => Self::Boolean,
            "decimal64" => Self::Decimal64,
            "empty" => Self::Empty,
            "enumeration" => Self::Enumeration,
            "instance-identifier" => Self::InstanceIdentifier,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "leafref" => Self::Leafref,
            "string" => Self::String,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "union" => Self::Union,
            _ => return None,
        })
    }

    /// Returns the type name as written in YANG source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Boolean => "boolean",
            Self::Decimal64 => "decimal64",
            Self::Empty => "empty",
            Self::Enumeration => "enumeration",
            Self::InstanceIdentifier => "instance-identifier",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Leafref => "leafref",
            Self::String => "string",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Union => "union",
        }
    }

    /// Returns true for the integral types.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
        )
    }

    /// Returns the value bounds of an integral type.
    #[must_use]
    pub const fn integral_bounds(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::Int8 => (i8::MIN as i128, i8::MAX as i128),
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::Uint8 => (0, u8::MAX as i128),
            Self::Uint16 => (0, u16::MAX as i128),
            Self::Uint32 => (0, u32::MAX as i128),
            Self::Uint64 => (0, u64::MAX as i128),
            _ => return None,
        })
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `range` restriction: union of inclusive value spans.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeConstraint {
    /// Inclusive spans, in ascending order.
    pub spans: Vec<(i128, i128)>,
}

impl RangeConstraint {
    /// Parses a range argument like `1..10 | 100..max` against type bounds.
    pub fn parse(raw: &str, bounds: (i128, i128)) -> Result<Self> {
        let mut spans = Vec::new();
        for part in raw.split('|') {
            let part = part.trim();
            let (lo, hi) = match part.split_once("..") {
                Some((lo, hi)) => (
                    parse_bound(lo.trim(), bounds)?,
                    parse_bound(hi.trim(), bounds)?,
                ),
                None => {
                    let v = parse_bound(part, bounds)?;
                    (v, v)
                }
            };
            if lo > hi {
                return Err(Error::source(format!("range span '{part}' is inverted")));
            }
            spans.push((lo, hi));
        }
        if spans.is_empty() {
            return Err(Error::source(format!("empty range argument '{raw}'")));
        }
        Ok(Self { spans })
    }

    /// Returns true if the value lies in one of the spans.
    #[must_use]
    pub fn contains(&self, value: i128) -> bool {
        self.spans.iter().any(|(lo, hi)| value >= *lo && value <= *hi)
    }
}

fn parse_bound(text: &str, bounds: (i128, i128)) -> Result<i128> {
    match text {
        "min" => Ok(bounds.0),
        "max" => Ok(bounds.1),
        other => other
            .parse()
            .map_err(|_| Error::source(format!("'{other}' is not a valid range bound"))),
    }
}

/// A `length` restriction: union of inclusive length spans.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LengthConstraint {
    /// Inclusive spans, in ascending order.
    pub spans: Vec<(u64, u64)>,
}

impl LengthConstraint {
    /// Parses a length argument like `1..63 | 128`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut spans = Vec::new();
        for part in raw.split('|') {
            let part = part.trim();
            let (lo, hi) = match part.split_once("..") {
                Some((lo, hi)) => (parse_length(lo.trim())?, parse_length(hi.trim())?),
                None => {
                    let v = parse_length(part)?;
                    (v, v)
                }
            };
            if lo > hi {
                return Err(Error::source(format!("length span '{part}' is inverted")));
            }
            spans.push((lo, hi));
        }
        if spans.is_empty() {
            return Err(Error::source(format!("empty length argument '{raw}'")));
        }
        Ok(Self { spans })
    }

    /// Returns true if the length lies in one of the spans.
    #[must_use]
    pub fn contains(&self, length: u64) -> bool {
        self.spans
            .iter()
            .any(|(lo, hi)| length >= *lo && length <= *hi)
    }
}

fn parse_length(text: &str) -> Result<u64> {
    match text {
        "min" => Ok(0),
        "max" => Ok(u64::MAX),
        other => other
            .parse()
            .map_err(|_| Error::source(format!("'{other}' is not a valid length bound"))),
    }
}

/// A `pattern` restriction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternConstraint {
    /// The regular expression as written in the source.
    pub regex: Arc<str>,
    /// True when a `modifier invert-match` substatement is present.
    pub invert_match: bool,
}

/// One member of an `enumeration`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumSpec {
    /// The assigned name.
    pub name: Arc<str>,
    /// The assigned or derived value.
    pub value: i32,
}

/// A fully compiled type: base type plus accumulated restrictions.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    /// The built-in base type at the end of the derivation chain.
    pub base: BaseType,
    /// The type name as written at the point of use.
    pub name: Arc<str>,
    /// Accumulated range restriction, innermost wins.
    pub range: Option<RangeConstraint>,
    /// Accumulated length restriction, innermost wins.
    pub length: Option<LengthConstraint>,
    /// Accumulated pattern restrictions; all must hold.
    pub patterns: Vec<PatternConstraint>,
    /// `fraction-digits` for decimal64.
    pub fraction_digits: Option<u8>,
    /// Members for enumeration types.
    pub enums: Vec<EnumSpec>,
    /// The path statement for leafref types.
    pub path: Option<PathExpression>,
    /// Member types for unions.
    pub union_types: Vec<TypeSpec>,
}

impl TypeSpec {
    /// Creates an unrestricted spec for a base type.
    #[must_use]
    pub fn of(base: BaseType) -> Self {
        Self {
            base,
            name: base.name().into(),
            range: None,
            length: None,
            patterns: Vec::new(),
            fraction_digits: None,
            enums: Vec::new(),
            path: None,
            union_types: Vec::new(),
        }
    }

    /// Creates a leafref spec with its path.
    #[must_use]
    pub fn leafref(path: PathExpression) -> Self {
        let mut spec = Self::of(BaseType::Leafref);
        spec.path = Some(path);
        spec
    }

    /// Returns true for leafref types.
    #[must_use]
    pub const fn is_leafref(&self) -> bool {
        matches!(self.base, BaseType::Leafref)
    }

    /// Returns true for instance-identifier types.
    #[must_use]
    pub const fn is_instance_identifier(&self) -> bool {
        matches!(self.base, BaseType::InstanceIdentifier)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
