//! Module-level `augment` support.
//!
//! The target path resolves inside the effective-model phase, so augments
//! may point into modules that arrive later or into nodes other augments
//! inject. Injected children keep the augmenting module's namespace, which
//! is what makes collisions across augments of one target detectable.

use std::sync::Arc;

use yangforge_foundation::{Error, Result};
use yangforge_model::{
    validator, ArgValue, StatementName, SubstatementValidator, YangKeyword,
};

use crate::action::{InferenceAction, Prereq};
use crate::ctx::{CopyType, CtxId};
use crate::phase::Phase;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementSupport, SupportRegistry};

/// Registers the augment support.
pub fn register(registry: &mut SupportRegistry) {
    registry.register(Arc::new(AugmentSupport::new()));
}

fn data_definitions(builder: validator::Builder) -> validator::Builder {
    builder
        .add_any(YangKeyword::Container)
        .add_any(YangKeyword::Leaf)
        .add_any(YangKeyword::LeafList)
        .add_any(YangKeyword::List)
        .add_any(YangKeyword::Choice)
        .add_any(YangKeyword::Case)
        .add_any(YangKeyword::Anydata)
        .add_any(YangKeyword::Anyxml)
        .add_any(YangKeyword::Uses)
}

/// Support for `augment`.
pub struct AugmentSupport {
    validator: SubstatementValidator,
}

impl AugmentSupport {
    /// Creates the augment support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: data_definitions(SubstatementValidator::builder(YangKeyword::Augment))
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .add_optional(YangKeyword::Status)
                .add_optional(YangKeyword::When)
                .add_any(YangKeyword::IfFeature)
                .add_any(YangKeyword::Action)
                .add_any(YangKeyword::Notification)
                .build(),
        }
    }
}

impl Default for AugmentSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for AugmentSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Augment)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::SchemaNodeId.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        // Augments under uses apply during grouping expansion instead.
        let Some(parent) = reactor.arena().get(ctx).parent else {
            return Ok(());
        };
        if reactor.arena().get(parent).name.is(YangKeyword::Uses) {
            return Ok(());
        }

        let ArgValue::SchemaNodeId(target) = reactor.arena().get(ctx).arg.clone() else {
            return Ok(());
        };
        let source_ref = reactor.arena().get(ctx).source_ref.clone();

        let wanted = target.clone();
        let action = InferenceAction::builder(Phase::EffectiveModel)
            .requires(Prereq::new(
                format!("augment target '{target}'"),
                move |reactor: &Reactor| reactor.resolve_schema_path(&wanted).is_some(),
            ))
            .apply(
                move |reactor: &mut Reactor| apply_augment(reactor, ctx),
                move |_missing| {
                    Error::inference(format!("Augment target '{target}' not found"))
                        .at(source_ref.clone())
                },
            );
        reactor.register_action(action);
        Ok(())
    }
}

/// Injects an augment's children into its resolved target.
pub(crate) fn apply_augment(reactor: &mut Reactor, augment: CtxId) -> Result<()> {
    // An augment whose predicate fails vanishes entirely.
    if !reactor.evaluate_if_features(augment) {
        reactor.mark_unsupported(augment);
        return Ok(());
    }

    let source_ref = reactor.arena().get(augment).source_ref.clone();
    let ArgValue::SchemaNodeId(target_path) = reactor.arena().get(augment).arg.clone() else {
        return Ok(());
    };
    let target = reactor.resolve_schema_path(&target_path).ok_or_else(|| {
        Error::inference(format!("Augment target '{target_path}' not found")).at(source_ref)
    })?;

    let body: Vec<CtxId> = reactor
        .arena()
        .get(augment)
        .all_children()
        .filter(|&child| {
            let c = reactor.arena().get(child);
            c.is_supported && is_augment_body(&c.name)
        })
        .collect();

    for child in body {
        // No namespace rebind: injected children carry the augmenting
        // module's namespace.
        let clone = reactor.clone_tree(child, target, CopyType::AddedByAugmentation, None)?;
        reactor
            .arena_mut()
            .get_mut(target)
            .effective_added
            .push(clone);
        crate::stmt::grouping::expand_pending_uses(reactor, clone)?;
    }
    Ok(())
}

fn is_augment_body(name: &StatementName) -> bool {
    match name.keyword() {
        Some(kw) => kw.is_schema_tree() || matches!(kw, YangKeyword::Uses),
        None => true,
    }
}
