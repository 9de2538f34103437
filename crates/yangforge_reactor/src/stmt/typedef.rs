//! `typedef` and `type` supports, and type-chain compilation.
//!
//! A type use site is compiled by flattening its derivation chain down to
//! a built-in base type, merging restrictions along the way: the innermost
//! range/length wins, patterns accumulate, and a leafref keeps its path for
//! stack-based resolution. Chains are depth-bounded; exceeding the bound is
//! reported as a cycle.

use std::sync::Arc;

use yangforge_foundation::{Error, QName, Result};
use yangforge_model::{
    ArgValue, BaseType, EnumSpec, LengthConstraint, PatternConstraint, RangeConstraint,
    StatementName, SubstatementValidator, TypeSpec, YangKeyword,
};

use crate::ctx::CtxId;
use crate::namespace::TypedefNamespace;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementSupport, SupportRegistry};

const MAX_TYPE_DEPTH: usize = 32;

/// Registers the typedef and type supports.
pub fn register(registry: &mut SupportRegistry) {
    registry.register(Arc::new(TypedefSupport::new()));
    registry.register(Arc::new(TypeSupport::new()));
}

/// Support for `typedef`: registers the definition for type resolution.
pub struct TypedefSupport {
    validator: SubstatementValidator,
}

impl TypedefSupport {
    /// Creates the typedef support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Typedef)
                .add_mandatory(YangKeyword::Type)
                .add_optional(YangKeyword::Default)
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .add_optional(YangKeyword::Status)
                .add_optional(YangKeyword::Units)
                .build(),
        }
    }
}

impl Default for TypedefSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for TypedefSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Typedef)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::NodeIdentifier.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        if let Some(qname) = reactor.arena().get(ctx).arg.as_qname().cloned() {
            reactor.ns_put::<TypedefNamespace>(ctx, qname, ctx);
        }
        Ok(())
    }
}

/// Support for `type`.
pub struct TypeSupport {
    validator: SubstatementValidator,
}

impl TypeSupport {
    /// Creates the type support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Type)
                .add_optional(YangKeyword::FractionDigits)
                .add_optional(YangKeyword::Range)
                .add_optional(YangKeyword::Length)
                .add_any(YangKeyword::Pattern)
                .add_optional(YangKeyword::Path)
                .add_any(YangKeyword::Enum)
                .add_any(YangKeyword::Bit)
                .add_any(YangKeyword::Type)
                .add_optional(YangKeyword::Base)
                .add_optional(YangKeyword::RequireInstance)
                .build(),
        }
    }
}

impl Default for TypeSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for TypeSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Type)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::NodeIdentifier.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }
}

/// Resolves a typedef reference: enclosing scopes first, then the owning
/// module of the reference.
pub(crate) fn resolve_typedef(reactor: &Reactor, from: CtxId, qname: &QName) -> Option<CtxId> {
    let mut current = reactor.arena().get(from).parent;
    while let Some(scope) = current {
        for child in reactor.arena().get(scope).all_children() {
            let c = reactor.arena().get(child);
            if c.is_supported
                && c.name.is(YangKeyword::Typedef)
                && c.arg.as_qname() == Some(qname)
            {
                return Some(child);
            }
        }
        current = reactor.arena().get(scope).parent;
    }
    reactor.ns_get_in_module::<TypedefNamespace>(qname.module(), qname)
}

/// Compiles a `type` statement into its flattened [`TypeSpec`].
pub(crate) fn compile_type(reactor: &Reactor, type_ctx: CtxId, depth: usize) -> Result<TypeSpec> {
    let source_ref = reactor.arena().get(type_ctx).source_ref.clone();
    if depth > MAX_TYPE_DEPTH {
        return Err(Error::inference(
            "type derivation chain exceeds nesting limit, possible typedef cycle",
        )
        .at(source_ref));
    }
    let qname = reactor
        .arena()
        .get(type_ctx)
        .arg
        .as_qname()
        .cloned()
        .ok_or_else(|| {
            Error::source("type statement requires a type name").at(source_ref.clone())
        })?;

    if let Some(base) = BaseType::from_name(qname.local_name()) {
        let mut spec = TypeSpec::of(base);
        apply_restrictions(reactor, &mut spec, type_ctx, depth)?;
        if base == BaseType::Leafref && spec.path.is_none() {
            return Err(
                Error::source("leafref type requires a path statement").at(source_ref)
            );
        }
        return Ok(spec);
    }

    let typedef = resolve_typedef(reactor, type_ctx, &qname).ok_or_else(|| {
        Error::inference(format!("Type '{qname}' was not found")).at(source_ref.clone())
    })?;
    let inner = reactor
        .find_child(typedef, YangKeyword::Type)
        .ok_or_else(|| {
            Error::inference(format!("typedef {qname} has no type statement")).at(source_ref)
        })?;
    let mut spec = compile_type(reactor, inner, depth + 1)?;
    // Restrictions at the use site tighten the derived type.
    apply_restrictions(reactor, &mut spec, type_ctx, depth)?;
    spec.name = qname.local_name().into();
    Ok(spec)
}

fn apply_restrictions(
    reactor: &Reactor,
    spec: &mut TypeSpec,
    type_ctx: CtxId,
    depth: usize,
) -> Result<()> {
    let children: Vec<CtxId> = reactor.arena().get(type_ctx).all_children().collect();
    let mut next_enum_value: i32 = 0;

    for child in children {
        let c = reactor.arena().get(child);
        if !c.is_supported {
            continue;
        }
        let at = c.source_ref.clone();
        let Some(kw) = c.name.keyword() else {
            continue;
        };
        match kw {
            YangKeyword::Range => {
                let raw = c.raw_arg.clone().ok_or_else(|| {
                    Error::source("range requires an argument").at(at.clone())
                })?;
                let bounds = range_bounds(spec.base).ok_or_else(|| {
                    Error::source(format!("type {} does not support range", spec.base))
                        .at(at.clone())
                })?;
                spec.range = Some(RangeConstraint::parse(&raw, bounds).map_err(|e| e.at(at))?);
            }
            YangKeyword::Length => {
                let raw = c.raw_arg.clone().ok_or_else(|| {
                    Error::source("length requires an argument").at(at.clone())
                })?;
                if !matches!(spec.base, BaseType::String | BaseType::Binary) {
                    return Err(Error::source(format!(
                        "type {} does not support length",
                        spec.base
                    ))
                    .at(at.clone()));
                }
                spec.length = Some(LengthConstraint::parse(&raw).map_err(|e| e.at(at))?);
            }
            YangKeyword::Pattern => {
                let raw = c.raw_arg.clone().ok_or_else(|| {
                    Error::source("pattern requires an argument").at(at.clone())
                })?;
                let invert_match = match reactor.child_raw(child, YangKeyword::Modifier) {
                    Some(modifier) if &*modifier == "invert-match" => true,
                    Some(modifier) => {
                        return Err(Error::source(format!(
                            "'{modifier}' is not a valid pattern modifier"
                        ))
                        .at(at));
                    }
                    None => false,
                };
                spec.patterns.push(PatternConstraint {
                    regex: Arc::from(&*raw),
                    invert_match,
                });
            }
            YangKeyword::FractionDigits => {
                if let ArgValue::UInt(digits) = &c.arg {
                    let digits = u8::try_from(*digits).map_err(|_| {
                        Error::source("fraction-digits out of range").at(at.clone())
                    })?;
                    if digits == 0 || digits > 18 {
                        return Err(
                            Error::source("fraction-digits must be 1..18").at(at)
                        );
                    }
                    spec.fraction_digits = Some(digits);
                }
            }
            YangKeyword::Path => {
                if let ArgValue::Path(path) = &c.arg {
                    spec.path = Some(path.clone());
                }
            }
            YangKeyword::Enum => {
                let name = c.raw_arg.clone().ok_or_else(|| {
                    Error::source("enum requires a name").at(at.clone())
                })?;
                let value = match reactor.child_raw(child, YangKeyword::Value) {
                    Some(raw) => raw.parse::<i32>().map_err(|_| {
                        Error::source(format!("'{raw}' is not a valid enum value")).at(at)
                    })?,
                    None => next_enum_value,
                };
                next_enum_value = value.saturating_add(1);
                spec.enums.push(EnumSpec {
                    name: Arc::from(&*name),
                    value,
                });
            }
            YangKeyword::Type => {
                if spec.base == BaseType::Union {
                    spec.union_types.push(compile_type(reactor, child, depth + 1)?);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn range_bounds(base: BaseType) -> Option<(i128, i128)> {
    base.integral_bounds().or(match base {
        BaseType::Decimal64 => Some((i64::MIN as i128, i64::MAX as i128)),
        _ => None,
    })
}
