//! `deviation` and `deviate` supports.
//!
//! The four deviate kinds carry their own substatement grammars. Whether a
//! deviation applies at all is gated by the per-module supported-deviations
//! configuration; a deviate dropped by the gate, and a `deviate delete`
//! whose target substatement does not exist, are logged and not raised.

use std::sync::Arc;

use tracing::{error, warn};
use yangforge_foundation::{Error, Result};
use yangforge_model::{
    Absolute, ArgValue, DeviateKind, StatementName, SubstatementValidator, YangKeyword,
};

use crate::action::{InferenceAction, Prereq};
use crate::ctx::{CopyType, CtxId};
use crate::phase::Phase;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementSupport, SupportRegistry};

/// Registers the deviation supports.
pub fn register(registry: &mut SupportRegistry) {
    registry.register(Arc::new(DeviationSupport::new()));
    registry.register(Arc::new(DeviateSupport::new()));
}

/// Substatements that may appear at most once on any deviation target.
const SINGLETON_STATEMENTS: [YangKeyword; 5] = [
    YangKeyword::Units,
    YangKeyword::Config,
    YangKeyword::Mandatory,
    YangKeyword::MinElements,
    YangKeyword::MaxElements,
];

/// Substatements that are implicitly present on every target, so a
/// `deviate replace` of them may land on a node with no explicit
/// declaration.
const IMPLICIT_STATEMENTS: [YangKeyword; 4] = [
    YangKeyword::Config,
    YangKeyword::Mandatory,
    YangKeyword::MinElements,
    YangKeyword::MaxElements,
];

/// Support for `deviation`.
pub struct DeviationSupport {
    validator: SubstatementValidator,
}

impl DeviationSupport {
    /// Creates the deviation support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Deviation)
                .add_multiple(YangKeyword::Deviate)
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .build(),
        }
    }
}

impl Default for DeviationSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for DeviationSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Deviation)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::SchemaNodeId.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }
}

/// Support for `deviate`.
pub struct DeviateSupport {
    not_supported: SubstatementValidator,
    add: SubstatementValidator,
    replace: SubstatementValidator,
    delete: SubstatementValidator,
}

impl DeviateSupport {
    /// Creates the deviate support with its four per-kind grammars.
    #[must_use]
    pub fn new() -> Self {
        Self {
            not_supported: SubstatementValidator::builder(YangKeyword::Deviate).build(),
            add: SubstatementValidator::builder(YangKeyword::Deviate)
                .add_optional(YangKeyword::Config)
                .add_optional(YangKeyword::Default)
                .add_optional(YangKeyword::Mandatory)
                .add_optional(YangKeyword::MaxElements)
                .add_optional(YangKeyword::MinElements)
                .add_any(YangKeyword::Must)
                .add_any(YangKeyword::Unique)
                .add_optional(YangKeyword::Units)
                .build(),
            replace: SubstatementValidator::builder(YangKeyword::Deviate)
                .add_optional(YangKeyword::Config)
                .add_optional(YangKeyword::Default)
                .add_optional(YangKeyword::Mandatory)
                .add_optional(YangKeyword::MaxElements)
                .add_optional(YangKeyword::MinElements)
                .add_optional(YangKeyword::Type)
                .add_optional(YangKeyword::Units)
                .build(),
            delete: SubstatementValidator::builder(YangKeyword::Deviate)
                .add_optional(YangKeyword::Default)
                .add_any(YangKeyword::Must)
                .add_any(YangKeyword::Unique)
                .add_optional(YangKeyword::Units)
                .build(),
        }
    }

    fn validator_for(&self, kind: DeviateKind) -> &SubstatementValidator {
        match kind {
            DeviateKind::NotSupported => &self.not_supported,
            DeviateKind::Add => &self.add,
            DeviateKind::Replace => &self.replace,
            DeviateKind::Delete => &self.delete,
        }
    }
}

impl Default for DeviateSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for DeviateSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Deviate)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::Deviate.parse(ctx, raw)
    }

    fn validate(&self, reactor: &Reactor, ctx: CtxId) -> Result<()> {
        let stmt = reactor.arena().get(ctx);
        let ArgValue::Deviate(kind) = &stmt.arg else {
            // The argument failed to parse; that error is already recorded.
            return Ok(());
        };
        let names: Vec<StatementName> = stmt
            .all_children()
            .map(|child| reactor.arena().get(child).name.clone())
            .collect();
        self.validator_for(*kind)
            .validate(names.iter(), &stmt.source_ref)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        let ArgValue::Deviate(kind) = reactor.arena().get(ctx).arg.clone() else {
            return Ok(());
        };
        let Some(deviation) = reactor.arena().get(ctx).parent else {
            return Ok(());
        };
        let ArgValue::SchemaNodeId(target) = reactor.arena().get(deviation).arg.clone() else {
            return Ok(());
        };
        let deviation_ref = reactor.arena().get(deviation).source_ref.clone();

        if !is_deviation_supported(reactor, ctx, &target) {
            warn!(
                target_path = %target,
                "deviation dropped: deviating module is not listed for the target module"
            );
            return Ok(());
        }

        let wanted = target.clone();
        let action = InferenceAction::builder(Phase::EffectiveModel)
            .requires(Prereq::new(
                format!("deviation target '{target}'"),
                move |reactor: &Reactor| reactor.resolve_schema_path(&wanted).is_some(),
            ))
            .apply(
                {
                    let target = target.clone();
                    move |reactor: &mut Reactor| apply_deviate(reactor, ctx, kind, &target)
                },
                move |_missing| {
                    Error::inference(format!("Deviation target '{target}' not found."))
                        .at(deviation_ref.clone())
                },
            );
        reactor.register_action(action);
        Ok(())
    }
}

fn is_deviation_supported(reactor: &Reactor, deviate: CtxId, target: &Absolute) -> bool {
    let Some(map) = reactor.supported_deviations() else {
        return true;
    };
    let Some(current_module) = reactor.module_of(deviate) else {
        return false;
    };
    let target_module = target.last().module();
    map.get(target_module)
        .is_some_and(|allowed| allowed.contains(&current_module))
}

fn apply_deviate(
    reactor: &mut Reactor,
    deviate: CtxId,
    kind: DeviateKind,
    target_path: &Absolute,
) -> Result<()> {
    let source_ref = reactor.arena().get(deviate).source_ref.clone();
    let target = reactor.resolve_schema_path(target_path).ok_or_else(|| {
        Error::inference(format!("Deviation target '{target_path}' not found.")).at(source_ref)
    })?;

    match kind {
        DeviateKind::NotSupported => {
            reactor.mark_unsupported(target);
            Ok(())
        }
        DeviateKind::Add => {
            for child in reactor.arena().get(deviate).children.clone() {
                if !reactor.arena().get(child).is_supported {
                    continue;
                }
                validate_deviation_target(reactor, child, target)?;
                add_statement(reactor, child, target)?;
            }
            Ok(())
        }
        DeviateKind::Replace => {
            for child in reactor.arena().get(deviate).children.clone() {
                if !reactor.arena().get(child).is_supported {
                    continue;
                }
                validate_deviation_target(reactor, child, target)?;
                replace_statement(reactor, child, target)?;
            }
            Ok(())
        }
        DeviateKind::Delete => {
            for child in reactor.arena().get(deviate).children.clone() {
                if !reactor.arena().get(child).is_supported {
                    continue;
                }
                validate_deviation_target(reactor, child, target)?;
                delete_statement(reactor, child, target);
            }
            Ok(())
        }
    }
}

fn add_statement(reactor: &mut Reactor, stmt: CtxId, target: CtxId) -> Result<()> {
    let stmt_name = reactor.arena().get(stmt).name.clone();
    if let Some(kw) = stmt_name.keyword() {
        let target_kw = reactor.arena().get(target).name.clone();
        let singleton = SINGLETON_STATEMENTS.contains(&kw)
            || (kw == YangKeyword::Default && target_kw.is(YangKeyword::Leaf));
        if singleton {
            let already = reactor.arena().get(target).all_children().any(|child| {
                let c = reactor.arena().get(child);
                c.is_supported && c.name.is(kw)
            });
            if already {
                let source_ref = reactor.arena().get(stmt).source_ref.clone();
                let target_arg = target_display(reactor, target);
                return Err(Error::inference(format!(
                    "Deviation cannot add substatement {} to target node {target_arg} \
                     because it is already defined in target and can appear only once.",
                    kw.validator_name()
                ))
                .at(source_ref));
            }
        }
    }
    copy_statement(reactor, stmt, target)
}

fn replace_statement(reactor: &mut Reactor, stmt: CtxId, target: CtxId) -> Result<()> {
    let stmt_name = reactor.arena().get(stmt).name.clone();
    let Some(kw) = stmt_name.keyword() else {
        return copy_statement(reactor, stmt, target);
    };

    // A leaf-list may carry multiple defaults; replacing one is ambiguous.
    if kw == YangKeyword::Default
        && reactor.arena().get(target).name.is(YangKeyword::LeafList)
    {
        error!(
            target_node = %target_display(reactor, target),
            at = %reactor.arena().get(stmt).source_ref,
            "deviation cannot replace a default on a leaf-list target"
        );
        return Ok(());
    }

    // Inference-added substatements are dropped outright.
    let added_match = reactor
        .arena()
        .get(target)
        .effective_added
        .iter()
        .copied()
        .find(|&child| reactor.arena().get(child).name.is(kw));
    if let Some(found) = added_match {
        let retained: Vec<CtxId> = reactor
            .arena()
            .get(target)
            .effective_added
            .iter()
            .copied()
            .filter(|&child| child != found)
            .collect();
        reactor.arena_mut().get_mut(target).effective_added = retained;
        return copy_statement(reactor, stmt, target);
    }

    // Declared substatements survive but no longer build effective output.
    let declared_match = reactor
        .arena()
        .get(target)
        .children
        .iter()
        .copied()
        .find(|&child| {
            let c = reactor.arena().get(child);
            c.is_supported && c.name.is(kw)
        });
    if let Some(found) = declared_match {
        reactor.mark_unsupported(found);
        return copy_statement(reactor, stmt, target);
    }

    // config/mandatory/min/max are implicitly present on every node, so
    // replacing an undeclared one degenerates to an add.
    if IMPLICIT_STATEMENTS.contains(&kw) {
        return add_statement(reactor, stmt, target);
    }

    let source_ref = reactor.arena().get(stmt).source_ref.clone();
    Err(Error::inference(format!(
        "Deviation cannot replace substatement {} in target node {} \
         because it does not exist in target node.",
        kw.validator_name(),
        target_display(reactor, target)
    ))
    .at(source_ref))
}

fn delete_statement(reactor: &mut Reactor, stmt: CtxId, target: CtxId) {
    let stmt_name = reactor.arena().get(stmt).name.clone();
    let stmt_raw = reactor.arena().get(stmt).raw_arg.clone();
    let matches = |reactor: &Reactor, child: CtxId| {
        let c = reactor.arena().get(child);
        c.name == stmt_name && c.raw_arg == stmt_raw
    };

    let added_match = reactor
        .arena()
        .get(target)
        .effective_added
        .iter()
        .copied()
        .find(|&child| matches(reactor, child));
    if let Some(found) = added_match {
        let retained: Vec<CtxId> = reactor
            .arena()
            .get(target)
            .effective_added
            .iter()
            .copied()
            .filter(|&child| child != found)
            .collect();
        reactor.arena_mut().get_mut(target).effective_added = retained;
        return;
    }

    let declared_match = reactor
        .arena()
        .get(target)
        .children
        .iter()
        .copied()
        .find(|&child| reactor.arena().get(child).is_supported && matches(reactor, child));
    if let Some(found) = declared_match {
        reactor.mark_unsupported(found);
        return;
    }

    // Deleting a substatement that is not there is logged, not raised.
    error!(
        statement = %stmt_name,
        argument = stmt_raw.as_deref().unwrap_or(""),
        target_node = %target_display(reactor, target),
        at = %reactor.arena().get(stmt).source_ref,
        "deviation cannot delete substatement: it does not exist in the target node"
    );
}

fn copy_statement(reactor: &mut Reactor, stmt: CtxId, target: CtxId) -> Result<()> {
    let clone = reactor.clone_tree(stmt, target, CopyType::Original, None)?;
    reactor
        .arena_mut()
        .get_mut(target)
        .effective_added
        .push(clone);
    Ok(())
}

fn validate_deviation_target(reactor: &Reactor, stmt: CtxId, target: CtxId) -> Result<()> {
    let Some(sub) = reactor.arena().get(stmt).name.keyword() else {
        return Ok(());
    };
    let Some(target_kw) = reactor.arena().get(target).name.keyword() else {
        return Ok(());
    };
    if is_supported_deviation_target(sub, target_kw) {
        return Ok(());
    }
    let source_ref = reactor.arena().get(stmt).source_ref.clone();
    Err(Error::inference(format!(
        "{} is not a valid deviation target for substatement {}.",
        target_display(reactor, target),
        sub.validator_name()
    ))
    .at(source_ref))
}

fn is_supported_deviation_target(sub: YangKeyword, target: YangKeyword) -> bool {
    use YangKeyword::{
        Anydata, Anyxml, Choice, Config, Container, Default, Leaf, LeafList, List, Mandatory,
        MaxElements, MinElements, Must, Type, Unique, Units,
    };
    match sub {
        Config => matches!(target, Container | Leaf | LeafList | List | Choice | Anydata | Anyxml),
        Default => matches!(target, Leaf | LeafList | Choice),
        Mandatory => matches!(target, Leaf | Choice | Anydata | Anyxml),
        MinElements | MaxElements => matches!(target, List | LeafList),
        Units | Type => matches!(target, Leaf | LeafList),
        Must => matches!(target, Container | Leaf | LeafList | List | Choice | Anydata | Anyxml),
        Unique => matches!(target, List),
        _ => true,
    }
}

fn target_display(reactor: &Reactor, target: CtxId) -> String {
    reactor
        .arena()
        .get(target)
        .raw_arg
        .as_deref()
        .unwrap_or("?")
        .to_string()
}
