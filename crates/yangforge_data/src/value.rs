//! Scalar values and type checking.

use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{Error, Result};
use yangforge_model::{BaseType, TypeSpec};

/// A scalar value carried by a leaf, leaf-set entry, or anydata blob.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataValue {
    /// A string.
    Str(Arc<str>),
    /// A boolean.
    Bool(bool),
    /// Signed integers.
    Int8(i8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 8-bit unsigned integer.
    Uint8(u8),
    /// 16-bit unsigned integer.
    Uint16(u16),
    /// 32-bit unsigned integer.
    Uint32(u32),
    /// 64-bit unsigned integer.
    Uint64(u64),
    /// A decimal64 value as unscaled digits plus fraction digits.
    Decimal64 {
        /// The unscaled value.
        unscaled: i64,
        /// Number of fraction digits.
        fraction_digits: u8,
    },
    /// Opaque bytes.
    Binary(Arc<[u8]>),
    /// The `empty` type's single value.
    Empty,
}

impl DataValue {
    /// Convenience constructor for string values.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::Str(s.into())
    }

    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value widened to `i128`, for integral values.
    #[must_use]
    pub const fn as_integral(&self) -> Option<i128> {
        Some(match self {
            Self::Int8(v) => *v as i128,
            Self::Int16(v) => *v as i128,
            Self::Int32(v) => *v as i128,
            Self::Int64(v) => *v as i128,
            Self::Uint8(v) => *v as i128,
            Self::Uint16(v) => *v as i128,
            Self::Uint32(v) => *v as i128,
            Self::Uint64(v) => *v as i128,
            _ => return None,
        })
    }

    /// Returns the built-in type this value naturally carries.
    #[must_use]
    pub const fn natural_type(&self) -> BaseType {
        match self {
            Self::Str(_) => BaseType::String,
            Self::Bool(_) => BaseType::Boolean,
            Self::Int8(_) => BaseType::Int8,
            Self::Int16(_) => BaseType::Int16,
            Self::Int32(_) => BaseType::Int32,
            Self::Int64(_) => BaseType::Int64,
            Self::Uint8(_) => BaseType::Uint8,
            Self::Uint16(_) => BaseType::Uint16,
            Self::Uint32(_) => BaseType::Uint32,
            Self::Uint64(_) => BaseType::Uint64,
            Self::Decimal64 { .. } => BaseType::Decimal64,
            Self::Binary(_) => BaseType::Binary,
            Self::Empty => BaseType::Empty,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Decimal64 {
                unscaled,
                fraction_digits,
            } => write!(f, "{unscaled}e-{fraction_digits}"),
            Self::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Empty => f.write_str("(empty)"),
        }
    }
}

/// Checks a value against a compiled type: base-type compatibility, range,
/// length, patterns, and fraction digits. Union members are tried in
/// order. Leafref specs are expected to have been substituted with their
/// resolved target before checking.
pub fn check_value(spec: &TypeSpec, value: &DataValue) -> Result<()> {
    match spec.base {
        BaseType::Union => {
            if spec
                .union_types
                .iter()
                .any(|member| check_value(member, value).is_ok())
            {
                return Ok(());
            }
            return Err(Error::illegal_argument(format!(
                "value '{value}' matches no member of union {spec}"
            )));
        }
        BaseType::Enumeration => {
            let Some(name) = value.as_str() else {
                return Err(type_mismatch(spec, value));
            };
            if !spec.enums.iter().any(|e| &*e.name == name) {
                return Err(Error::illegal_argument(format!(
                    "'{name}' is not a member of enumeration {spec}"
                )));
            }
            return Ok(());
        }
        // An unresolved leafref cannot constrain the value shape.
        BaseType::Leafref | BaseType::InstanceIdentifier => return Ok(()),
        _ => {}
    }

    if spec.base.is_integral() {
        let Some(integral) = value.as_integral() else {
            return Err(type_mismatch(spec, value));
        };
        let Some((lo, hi)) = spec.base.integral_bounds() else {
            return Err(type_mismatch(spec, value));
        };
        if integral < lo || integral > hi {
            return Err(Error::illegal_argument(format!(
                "value '{value}' is outside the bounds of {spec}"
            )));
        }
        if let Some(range) = &spec.range {
            if !range.contains(integral) {
                return Err(Error::illegal_argument(format!(
                    "value '{value}' violates the range of {spec}"
                )));
            }
        }
        return Ok(());
    }

    match spec.base {
        BaseType::String => {
            let Some(s) = value.as_str() else {
                return Err(type_mismatch(spec, value));
            };
            if let Some(length) = &spec.length {
                let chars = u64::try_from(s.chars().count()).unwrap_or(u64::MAX);
                if !length.contains(chars) {
                    return Err(Error::illegal_argument(format!(
                        "value '{value}' violates the length of {spec}"
                    )));
                }
            }
            for pattern in &spec.patterns {
                let anchored = format!("^(?:{})$", pattern.regex);
                let regex = regex::Regex::new(&anchored).map_err(|e| {
                    Error::illegal_argument(format!(
                        "pattern '{}' of {spec} is not a valid expression: {e}",
                        pattern.regex
                    ))
                })?;
                let matched = regex.is_match(s);
                if matched == pattern.invert_match {
                    return Err(Error::illegal_argument(format!(
                        "value '{value}' violates pattern '{}' of {spec}",
                        pattern.regex
                    )));
                }
            }
            Ok(())
        }
        BaseType::Boolean => match value {
            DataValue::Bool(_) => Ok(()),
            _ => Err(type_mismatch(spec, value)),
        },
        BaseType::Empty => match value {
            DataValue::Empty => Ok(()),
            _ => Err(type_mismatch(spec, value)),
        },
        BaseType::Binary => {
            let DataValue::Binary(bytes) = value else {
                return Err(type_mismatch(spec, value));
            };
            if let Some(length) = &spec.length {
                if !length.contains(bytes.len() as u64) {
                    return Err(Error::illegal_argument(format!(
                        "value '{value}' violates the length of {spec}"
                    )));
                }
            }
            Ok(())
        }
        BaseType::Decimal64 => {
            let DataValue::Decimal64 {
                unscaled,
                fraction_digits,
            } = value
            else {
                return Err(type_mismatch(spec, value));
            };
            if let Some(expected) = spec.fraction_digits {
                if expected != *fraction_digits {
                    return Err(Error::illegal_argument(format!(
                        "value '{value}' carries {fraction_digits} fraction digits, \
                         {spec} requires {expected}"
                    )));
                }
            }
            if let Some(range) = &spec.range {
                if !range.contains(i128::from(*unscaled)) {
                    return Err(Error::illegal_argument(format!(
                        "value '{value}' violates the range of {spec}"
                    )));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn type_mismatch(spec: &TypeSpec, value: &DataValue) -> Error {
    Error::illegal_argument(format!(
        "value '{value}' of type {} does not conform to {spec}",
        value.natural_type()
    ))
}
