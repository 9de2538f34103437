//! Statement supports and the support registry.
//!
//! Each keyword is implemented by a support: argument parsing, a
//! substatement validator, per-phase hooks, and a replication policy.
//! Unknown (extension) statements fall back to an opaque support that
//! treats the keyword as a plain string-argument statement.

use std::collections::HashMap;
use std::sync::Arc;

use yangforge_foundation::{Error, QName, QNameModule, Result, SourceRef};
use yangforge_model::{
    Absolute, ArgValue, DeviateKind, IfFeatureExpr, OrderedBy, PathExpression, StatementName,
    Status, SubstatementValidator, YangKeyword,
};

use crate::ctx::CtxId;
use crate::reactor::Reactor;

/// Context handed to argument parsers: the defining module and the
/// source's prefix bindings.
pub struct ArgumentContext<'a> {
    /// Namespace of the defining module.
    pub module: &'a QNameModule,
    /// Prefix bindings active in the source.
    pub prefixes: &'a HashMap<String, QNameModule>,
    /// Declaration site, for diagnostics.
    pub source_ref: &'a SourceRef,
}

impl ArgumentContext<'_> {
    /// Resolves a prefix to its module.
    #[must_use]
    pub fn resolve_prefix(&self, prefix: &str) -> Option<QNameModule> {
        self.prefixes.get(prefix).cloned()
    }

    /// Resolves a possibly-prefixed node name; bare names bind to the
    /// defining module.
    pub fn resolve_node_name(&self, raw: &str) -> Result<QName> {
        match raw.split_once(':') {
            Some((prefix, local)) => {
                let module = self.resolve_prefix(prefix).ok_or_else(|| {
                    Error::source(format!("unknown prefix '{prefix}' in '{raw}'"))
                        .at(self.source_ref.clone())
                })?;
                QName::new(module, local)
            }
            None => QName::new(self.module.clone(), raw),
        }
    }

    /// Resolves a feature reference inside an `if-feature` expression.
    pub fn resolve_feature(&self, prefix: Option<&str>, local: &str) -> Result<QName> {
        match prefix {
            Some(prefix) => {
                let module = self.resolve_prefix(prefix).ok_or_else(|| {
                    Error::source(format!("unknown prefix '{prefix}' in if-feature"))
                        .at(self.source_ref.clone())
                })?;
                QName::new(module, local)
            }
            None => QName::new(self.module.clone(), local),
        }
    }

    /// Parses a schema node identifier argument (`/a:b/c` or `a/b`).
    pub fn parse_schema_node_id(&self, raw: &str) -> Result<Absolute> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut qnames = Vec::new();
        for segment in body.split('/') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            qnames.push(self.resolve_node_name(segment)?);
        }
        Absolute::new(qnames)
            .map_err(|_| Error::source(format!("empty schema node identifier '{raw}'")))
    }
}

/// How the reactor treats a statement when `uses` or `augment` copies it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StatementPolicy {
    /// Replication is an error.
    Reject,
    /// The statement means the same thing everywhere; replicas may share.
    #[default]
    ContextIndependent,
    /// Every copy is materialized fresh.
    CopyOnUse,
}

/// What shape of argument a keyword takes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// No argument.
    None,
    /// Free-form string.
    Str,
    /// Node or definition identifier, prefix-resolvable.
    NodeIdentifier,
    /// `true` / `false`.
    Bool,
    /// Unsigned count.
    UInt,
    /// `max-elements`: a count or `unbounded`.
    MaxElements,
    /// `YYYY-MM-DD`.
    Revision,
    /// `status` lexicon.
    Status,
    /// `ordered-by` lexicon.
    OrderedBy,
    /// `deviate` lexicon.
    Deviate,
    /// Boolean feature expression.
    IfFeature,
    /// `path` expression.
    Path,
    /// Absolute or descendant schema node identifier.
    SchemaNodeId,
}

impl ArgKind {
    /// Parses a raw argument of this kind.
    pub fn parse(self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        if self == Self::None {
            return Ok(ArgValue::None);
        }
        let raw = raw.ok_or_else(|| {
            Error::source("statement requires an argument").at(ctx.source_ref.clone())
        })?;
        let at = |e: Error| e.at(ctx.source_ref.clone());
        match self {
            Self::None => Ok(ArgValue::None),
            Self::Str => Ok(ArgValue::Str(raw.into())),
            Self::NodeIdentifier => Ok(ArgValue::Identifier(
                ctx.resolve_node_name(raw).map_err(at)?,
            )),
            Self::Bool => match raw {
                "true" => Ok(ArgValue::Bool(true)),
                "false" => Ok(ArgValue::Bool(false)),
                other => Err(at(Error::source(format!(
                    "'{other}' is not a valid boolean argument"
                )))),
            },
            Self::UInt => raw
                .parse::<u64>()
                .map(ArgValue::UInt)
                .map_err(|_| at(Error::source(format!("'{raw}' is not a valid count")))),
            Self::MaxElements => {
                if raw == "unbounded" {
                    Ok(ArgValue::MaxElements(None))
                } else {
                    raw.parse::<u64>()
                        .map(|v| ArgValue::MaxElements(Some(v)))
                        .map_err(|_| {
                            at(Error::source(format!(
                                "'{raw}' is not a valid max-elements argument"
                            )))
                        })
                }
            }
            Self::Revision => Ok(ArgValue::Revision(
                yangforge_foundation::Revision::parse(raw).map_err(at)?,
            )),
            Self::Status => Ok(ArgValue::Status(Status::parse(raw).map_err(at)?)),
            Self::OrderedBy => Ok(ArgValue::OrderedBy(OrderedBy::parse(raw).map_err(at)?)),
            Self::Deviate => Ok(ArgValue::Deviate(DeviateKind::parse(raw).map_err(at)?)),
            Self::IfFeature => {
                let expr = IfFeatureExpr::parse(raw, &|prefix, local| {
                    ctx.resolve_feature(prefix, local)
                })
                .map_err(at)?;
                Ok(ArgValue::IfFeature(expr))
            }
            Self::Path => {
                let resolve = |prefix: &str| ctx.resolve_prefix(prefix);
                Ok(ArgValue::Path(
                    PathExpression::parse(raw, &resolve).map_err(at)?,
                ))
            }
            Self::SchemaNodeId => Ok(ArgValue::SchemaNodeId(
                ctx.parse_schema_node_id(raw).map_err(at)?,
            )),
        }
    }
}

/// Per-keyword behaviour plugged into the reactor.
pub trait StatementSupport {
    /// The statement this support implements.
    fn name(&self) -> StatementName;

    /// Replication policy under uses/augment.
    fn policy(&self) -> StatementPolicy {
        StatementPolicy::ContextIndependent
    }

    /// Parses the raw argument.
    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue>;

    /// Validates substatement cardinality. The default consults
    /// [`StatementSupport::validator`].
    fn validate(&self, reactor: &Reactor, ctx: CtxId) -> Result<()> {
        match self.validator() {
            Some(validator) => {
                let stmt = reactor.arena().get(ctx);
                let names: Vec<StatementName> = stmt
                    .all_children()
                    .map(|child| reactor.arena().get(child).name.clone())
                    .collect();
                validator.validate(names.iter(), &stmt.source_ref)
            }
            None => Ok(()),
        }
    }

    /// The declared cardinality grammar, if any.
    fn validator(&self) -> Option<&SubstatementValidator> {
        None
    }

    /// Hook run while the source is loaded, before linkage.
    fn on_pre_linkage_declared(&self, _reactor: &mut Reactor, _ctx: CtxId) -> Result<()> {
        Ok(())
    }

    /// Hook run during [`crate::Phase::SourceLinkage`].
    fn on_linkage_declared(&self, _reactor: &mut Reactor, _ctx: CtxId) -> Result<()> {
        Ok(())
    }

    /// Hook run during [`crate::Phase::StatementDefinition`].
    fn on_statement_definition_declared(
        &self,
        _reactor: &mut Reactor,
        _ctx: CtxId,
    ) -> Result<()> {
        Ok(())
    }

    /// Hook run during [`crate::Phase::FullDeclaration`].
    fn on_full_definition_declared(&self, _reactor: &mut Reactor, _ctx: CtxId) -> Result<()> {
        Ok(())
    }
}

/// A data-driven support for keywords with no special hooks.
pub struct BuiltinSupport {
    keyword: YangKeyword,
    arg_kind: ArgKind,
    policy: StatementPolicy,
    validator: Option<SubstatementValidator>,
}

impl BuiltinSupport {
    /// Creates a builtin support.
    #[must_use]
    pub fn new(keyword: YangKeyword, arg_kind: ArgKind) -> Self {
        Self {
            keyword,
            arg_kind,
            policy: StatementPolicy::default(),
            validator: None,
        }
    }

    /// Sets the replication policy.
    #[must_use]
    pub fn with_policy(mut self, policy: StatementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the cardinality validator.
    #[must_use]
    pub fn with_validator(mut self, validator: SubstatementValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

impl StatementSupport for BuiltinSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(self.keyword)
    }

    fn policy(&self) -> StatementPolicy {
        self.policy
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        self.arg_kind.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        self.validator.as_ref()
    }
}

/// Fallback support for extension statements: argument kept as an opaque
/// string, no grammar enforced.
pub struct UnknownSupport {
    name: StatementName,
}

impl UnknownSupport {
    /// Creates a fallback support for one extension statement.
    #[must_use]
    pub fn new(name: StatementName) -> Self {
        Self { name }
    }
}

impl StatementSupport for UnknownSupport {
    fn name(&self) -> StatementName {
        self.name.clone()
    }

    fn policy(&self) -> StatementPolicy {
        StatementPolicy::CopyOnUse
    }

    fn parse_argument(&self, _ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        Ok(match raw {
            Some(raw) => ArgValue::Str(raw.into()),
            None => ArgValue::None,
        })
    }
}

/// Maps statement names to supports, with the opaque fallback for unknown
/// statements.
pub struct SupportRegistry {
    supports: HashMap<StatementName, Arc<dyn StatementSupport>>,
}

impl SupportRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supports: HashMap::new(),
        }
    }

    /// Registers a support, replacing any previous one for the same name.
    pub fn register(&mut self, support: Arc<dyn StatementSupport>) {
        self.supports.insert(support.name(), support);
    }

    /// Returns the support for a statement, falling back to the opaque
    /// extension support.
    #[must_use]
    pub fn get(&self, name: &StatementName) -> Arc<dyn StatementSupport> {
        self.supports.get(name).map_or_else(
            || Arc::new(UnknownSupport::new(name.clone())) as Arc<dyn StatementSupport>,
            Arc::clone,
        )
    }

    /// Returns true if a dedicated support is registered.
    #[must_use]
    pub fn is_known(&self, name: &StatementName) -> bool {
        self.supports.contains_key(name)
    }
}

impl Default for SupportRegistry {
    fn default() -> Self {
        Self::new()
    }
}
