//! `grouping` and `uses` supports.
//!
//! A resolved `uses` clones the target grouping's body into the uses'
//! parent. The first expansion is tagged `Original`; clones made by nested
//! expansions are `AddedByUses`. `refine` and `augment` substatements of
//! the uses apply to the cloned tree, never to the grouping itself.

use std::sync::Arc;

use yangforge_foundation::{Error, QName, Result};
use yangforge_model::{
    validator, Absolute, ArgValue, StatementName, SubstatementValidator, YangKeyword,
};

use crate::action::{InferenceAction, Prereq};
use crate::ctx::{CopyType, CtxId};
use crate::namespace::{GroupingNamespace, SchemaTreeNamespace};
use crate::phase::Phase;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementPolicy, StatementSupport, SupportRegistry};

const MAX_USES_DEPTH: usize = 32;

/// Registers the grouping and uses supports.
pub fn register(registry: &mut SupportRegistry) {
    registry.register(Arc::new(GroupingSupport::new()));
    registry.register(Arc::new(UsesSupport::new()));
    registry.register(Arc::new(RefineSupport::new()));
}

fn data_definitions(builder: validator::Builder) -> validator::Builder {
    builder
        .add_any(YangKeyword::Container)
        .add_any(YangKeyword::Leaf)
        .add_any(YangKeyword::LeafList)
        .add_any(YangKeyword::List)
        .add_any(YangKeyword::Choice)
        .add_any(YangKeyword::Anydata)
        .add_any(YangKeyword::Anyxml)
        .add_any(YangKeyword::Uses)
}

/// Support for `grouping`: registers the definition for uses resolution.
pub struct GroupingSupport {
    validator: SubstatementValidator,
}

impl GroupingSupport {
    /// Creates the grouping support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: data_definitions(SubstatementValidator::builder(YangKeyword::Grouping))
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .add_optional(YangKeyword::Status)
                .add_any(YangKeyword::Typedef)
                .add_any(YangKeyword::Grouping)
                .add_any(YangKeyword::Action)
                .add_any(YangKeyword::Notification)
                .build(),
        }
    }
}

impl Default for GroupingSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for GroupingSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Grouping)
    }

    fn policy(&self) -> StatementPolicy {
        StatementPolicy::CopyOnUse
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::NodeIdentifier.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        if let Some(qname) = reactor.arena().get(ctx).arg.as_qname().cloned() {
            reactor.ns_put::<GroupingNamespace>(ctx, qname, ctx);
        }
        Ok(())
    }
}

/// Support for `uses`: expands the referenced grouping.
pub struct UsesSupport {
    validator: SubstatementValidator,
}

impl UsesSupport {
    /// Creates the uses support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Uses)
                .add_any(YangKeyword::Augment)
                .add_any(YangKeyword::Refine)
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .add_optional(YangKeyword::Status)
                .add_optional(YangKeyword::When)
                .add_any(YangKeyword::IfFeature)
                .build(),
        }
    }
}

impl Default for UsesSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for UsesSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Uses)
    }

    fn policy(&self) -> StatementPolicy {
        StatementPolicy::CopyOnUse
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::NodeIdentifier.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        let Some(qname) = reactor.arena().get(ctx).arg.as_qname().cloned() else {
            return Ok(());
        };
        let source_ref = reactor.arena().get(ctx).source_ref.clone();

        let wanted = qname.clone();
        let action = InferenceAction::builder(Phase::EffectiveModel)
            .requires(Prereq::new(
                format!("grouping '{qname}'"),
                move |reactor: &Reactor| resolve_grouping(reactor, ctx, &wanted).is_some(),
            ))
            .apply(
                move |reactor: &mut Reactor| expand_uses(reactor, ctx, 0),
                move |_missing| {
                    Error::inference(format!("Grouping '{qname}' was not resolved"))
                        .at(source_ref.clone())
                },
            );
        reactor.register_action(action);
        Ok(())
    }
}

/// Support for `refine` inside `uses`.
pub struct RefineSupport {
    validator: SubstatementValidator,
}

impl RefineSupport {
    /// Creates the refine support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Refine)
                .add_optional(YangKeyword::Config)
                .add_optional(YangKeyword::Default)
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Mandatory)
                .add_optional(YangKeyword::MinElements)
                .add_optional(YangKeyword::MaxElements)
                .add_optional(YangKeyword::Presence)
                .add_optional(YangKeyword::Reference)
                .add_any(YangKeyword::IfFeature)
                .add_any(YangKeyword::Must)
                .build(),
        }
    }
}

impl Default for RefineSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for RefineSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Refine)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::SchemaNodeId.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }
}

/// Resolves the grouping a `uses` refers to: enclosing scopes first, then
/// the owning module of the reference.
pub(crate) fn resolve_grouping(reactor: &Reactor, from: CtxId, qname: &QName) -> Option<CtxId> {
    let mut current = reactor.arena().get(from).parent;
    while let Some(scope) = current {
        for child in reactor.arena().get(scope).all_children() {
            let c = reactor.arena().get(child);
            if c.is_supported
                && c.name.is(YangKeyword::Grouping)
                && c.arg.as_qname() == Some(qname)
            {
                return Some(child);
            }
        }
        current = reactor.arena().get(scope).parent;
    }
    reactor.ns_get_in_module::<GroupingNamespace>(qname.module(), qname)
}

/// Expands one `uses` statement into its parent.
pub(crate) fn expand_uses(reactor: &mut Reactor, uses: CtxId, depth: usize) -> Result<()> {
    let source_ref = reactor.arena().get(uses).source_ref.clone();
    if depth > MAX_USES_DEPTH {
        return Err(Error::inference(
            "grouping expansion exceeds nesting limit, possible uses/grouping cycle",
        )
        .at(source_ref));
    }
    if reactor.arena().get(uses).expanded {
        return Ok(());
    }
    reactor.arena_mut().get_mut(uses).expanded = true;

    // A uses gated off by if-feature leaves no residue.
    if !reactor.evaluate_if_features(uses) {
        reactor.mark_unsupported(uses);
        return Ok(());
    }

    let Some(qname) = reactor.arena().get(uses).arg.as_qname().cloned() else {
        return Ok(());
    };
    let grouping = resolve_grouping(reactor, uses, &qname).ok_or_else(|| {
        Error::inference(format!("Grouping '{qname}' was not resolved")).at(source_ref.clone())
    })?;
    // Expanding a grouping into itself can never terminate.
    let mut ancestor = reactor.arena().get(uses).parent;
    while let Some(scope) = ancestor {
        if scope == grouping {
            return Err(Error::inference(format!(
                "Grouping '{qname}' participates in a uses cycle"
            ))
            .at(source_ref.clone()));
        }
        ancestor = reactor.arena().get(scope).parent;
    }
    let Some(parent) = reactor.arena().get(uses).parent else {
        return Ok(());
    };
    let target_module = reactor.module_of(parent).ok_or_else(|| {
        Error::inference("uses parent has no module linkage").at(source_ref.clone())
    })?;

    let copy_type = if depth == 0 {
        CopyType::Original
    } else {
        CopyType::AddedByUses
    };

    let body: Vec<CtxId> = reactor
        .arena()
        .get(grouping)
        .all_children()
        .filter(|&child| {
            let c = reactor.arena().get(child);
            c.is_supported && is_copyable_body(&c.name)
        })
        .collect();

    for child in body {
        let clone = reactor.clone_tree(child, parent, copy_type, Some(&target_module))?;
        reactor
            .arena_mut()
            .get_mut(parent)
            .effective_added
            .push(clone);
        expand_cloned_uses(reactor, clone, depth)?;
    }

    // refine and uses-augment apply to the clones, not the grouping.
    let uses_children = reactor.arena().get(uses).children.clone();
    for child in uses_children {
        let (supported, name) = {
            let c = reactor.arena().get(child);
            (c.is_supported, c.name.clone())
        };
        if !supported {
            continue;
        }
        if name.is(YangKeyword::Refine) {
            apply_refine(reactor, child, parent)?;
        } else if name.is(YangKeyword::Augment) {
            apply_uses_augment(reactor, child, parent, &target_module, depth)?;
        }
    }
    Ok(())
}

fn is_copyable_body(name: &StatementName) -> bool {
    match name.keyword() {
        Some(kw) => {
            kw.is_schema_tree()
                || matches!(
                    kw,
                    YangKeyword::Uses | YangKeyword::Grouping | YangKeyword::Typedef
                )
        }
        // Extension statements travel with the grouping body.
        None => true,
    }
}

/// Expands every unexpanded `uses` in a freshly injected subtree.
pub(crate) fn expand_pending_uses(reactor: &mut Reactor, clone: CtxId) -> Result<()> {
    expand_cloned_uses(reactor, clone, 0)
}

// Clones of uses statements (and clones carrying nested uses) expand in
// place so the whole grouping closure materializes.
fn expand_cloned_uses(reactor: &mut Reactor, clone: CtxId, depth: usize) -> Result<()> {
    let pending: Vec<CtxId> = reactor
        .arena()
        .subtree(clone)
        .into_iter()
        .filter(|&id| {
            let c = reactor.arena().get(id);
            c.is_supported && c.name.is(YangKeyword::Uses) && !c.expanded
        })
        .collect();
    for uses in pending {
        expand_uses(reactor, uses, depth + 1)?;
    }
    Ok(())
}

// Walks a descendant schema node identifier through the cloned subtree.
fn resolve_descendant(reactor: &Reactor, from: CtxId, path: &Absolute) -> Option<CtxId> {
    let mut current = from;
    for qname in path.node_identifiers() {
        current = reactor.ns_get::<SchemaTreeNamespace>(current, &(current, qname.clone()))?;
    }
    Some(current)
}

fn apply_refine(reactor: &mut Reactor, refine: CtxId, parent: CtxId) -> Result<()> {
    let source_ref = reactor.arena().get(refine).source_ref.clone();
    let ArgValue::SchemaNodeId(path) = reactor.arena().get(refine).arg.clone() else {
        return Ok(());
    };
    let target = resolve_descendant(reactor, parent, &path).ok_or_else(|| {
        Error::inference(format!("Refine target '{path}' not found in expanded grouping"))
            .at(source_ref)
    })?;

    let refinements = reactor.arena().get(refine).children.clone();
    for refinement in refinements {
        let c = reactor.arena().get(refinement);
        if !c.is_supported || c.name.is(YangKeyword::IfFeature) {
            continue;
        }
        replace_or_add_child(reactor, target, refinement)?;
    }
    Ok(())
}

fn apply_uses_augment(
    reactor: &mut Reactor,
    augment: CtxId,
    parent: CtxId,
    target_module: &yangforge_foundation::QNameModule,
    depth: usize,
) -> Result<()> {
    if !reactor.evaluate_if_features(augment) {
        reactor.mark_unsupported(augment);
        return Ok(());
    }
    let source_ref = reactor.arena().get(augment).source_ref.clone();
    let ArgValue::SchemaNodeId(path) = reactor.arena().get(augment).arg.clone() else {
        return Ok(());
    };
    let target = resolve_descendant(reactor, parent, &path).ok_or_else(|| {
        Error::inference(format!(
            "Augment target '{path}' not found in expanded grouping"
        ))
        .at(source_ref)
    })?;

    let body: Vec<CtxId> = reactor
        .arena()
        .get(augment)
        .children
        .clone()
        .into_iter()
        .filter(|&child| {
            let c = reactor.arena().get(child);
            c.is_supported && is_copyable_body(&c.name)
        })
        .collect();
    for child in body {
        let clone = reactor.clone_tree(child, target, CopyType::AddedByUses, Some(target_module))?;
        reactor
            .arena_mut()
            .get_mut(target)
            .effective_added
            .push(clone);
        expand_cloned_uses(reactor, clone, depth)?;
    }
    Ok(())
}

/// Replaces a same-keyword singleton child of `target` with a copy of
/// `stmt`, or adds the copy if none exists.
pub(crate) fn replace_or_add_child(
    reactor: &mut Reactor,
    target: CtxId,
    stmt: CtxId,
) -> Result<()> {
    let keyword = reactor.arena().get(stmt).name.clone();
    if let Some(kw) = keyword.keyword() {
        // must is additive; everything else in the refine grammar is a
        // singleton.
        if kw != YangKeyword::Must {
            let existing: Vec<CtxId> = reactor
                .arena()
                .get(target)
                .children
                .clone()
                .into_iter()
                .filter(|&child| {
                    let c = reactor.arena().get(child);
                    c.is_supported && c.name.is(kw)
                })
                .collect();
            for child in existing {
                reactor.mark_unsupported(child);
            }
            let retained: Vec<CtxId> = reactor
                .arena()
                .get(target)
                .effective_added
                .iter()
                .copied()
                .filter(|&child| !reactor.arena().get(child).name.is(kw))
                .collect();
            reactor.arena_mut().get_mut(target).effective_added = retained;
        }
    }
    let parent_of_copy = target;
    let clone = reactor.clone_tree(stmt, parent_of_copy, CopyType::Original, None)?;
    reactor
        .arena_mut()
        .get_mut(target)
        .effective_added
        .push(clone);
    Ok(())
}
