//! `feature` support.

use std::sync::Arc;

use yangforge_foundation::Result;
use yangforge_model::{ArgValue, StatementName, SubstatementValidator, YangKeyword};

use crate::ctx::CtxId;
use crate::namespace::FeatureNamespace;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementPolicy, StatementSupport, SupportRegistry};

/// Registers the feature support.
pub fn register(registry: &mut SupportRegistry) {
    registry.register(Arc::new(FeatureSupport::new()));
}

/// Support for `feature`: registers the feature for `if-feature`
/// evaluation.
pub struct FeatureSupport {
    validator: SubstatementValidator,
}

impl FeatureSupport {
    /// Creates the feature support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Feature)
                .add_optional(YangKeyword::Description)
                .add_any(YangKeyword::IfFeature)
                .add_optional(YangKeyword::Status)
                .add_optional(YangKeyword::Reference)
                .build(),
        }
    }
}

impl Default for FeatureSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for FeatureSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Feature)
    }

    fn policy(&self) -> StatementPolicy {
        StatementPolicy::Reject
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::NodeIdentifier.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        if let Some(qname) = reactor.arena().get(ctx).arg.as_qname().cloned() {
            reactor.ns_put::<FeatureNamespace>(ctx, qname, ctx);
        }
        Ok(())
    }
}
