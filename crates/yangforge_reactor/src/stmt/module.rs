//! Module, submodule, and linkage supports.
//!
//! Source linkage establishes every source's module identity and prefix
//! bindings. Imports and includes are inference actions on the module
//! namespaces, so sources may arrive in any order.

use std::sync::Arc;

use yangforge_foundation::{Error, QNameModule, Result, Revision};
use yangforge_model::{
    ArgValue, StatementName, SubstatementValidator, YangKeyword,
};

use crate::action::{InferenceAction, Prereq};
use crate::ctx::CtxId;
use crate::namespace::{
    ModuleCtxToQName, ModuleNamespace, ModuleQNameNamespace, PrefixToModule, SubmoduleNamespace,
};
use crate::phase::Phase;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementSupport, SupportRegistry};

/// Registers the linkage supports.
pub fn register(registry: &mut SupportRegistry) {
    registry.register(Arc::new(ModuleSupport::new(YangKeyword::Module)));
    registry.register(Arc::new(ModuleSupport::new(YangKeyword::Submodule)));
    registry.register(Arc::new(ImportSupport::new()));
    registry.register(Arc::new(IncludeSupport::new()));
    registry.register(Arc::new(BelongsToSupport::new()));
}

fn data_definitions(
    builder: yangforge_model::validator::Builder,
) -> yangforge_model::validator::Builder {
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

fn module_validator(keyword: YangKeyword) -> SubstatementValidator {
    let mut builder = SubstatementValidator::builder(keyword)
        .add_optional(YangKeyword::YangVersion)
        .add_any(YangKeyword::Import)
        .add_any(YangKeyword::Include)
        .add_optional(YangKeyword::Organization)
        .add_optional(YangKeyword::Contact)
        .add_optional(YangKeyword::Description)
        .add_optional(YangKeyword::Reference)
        .add_any(YangKeyword::Revision)
        .add_any(YangKeyword::Extension)
        .add_any(YangKeyword::Feature)
        .add_any(YangKeyword::Identity)
        .add_any(YangKeyword::Typedef)
        .add_any(YangKeyword::Grouping)
        .add_any(YangKeyword::Augment)
        .add_any(YangKeyword::Deviation)
        .add_any(YangKeyword::Rpc)
        .add_any(YangKeyword::Notification);
    builder = data_definitions(builder);
    builder = match keyword {
        YangKeyword::Module => builder
            .add_mandatory(YangKeyword::Namespace)
            .add_mandatory(YangKeyword::Prefix),
        _ => builder.add_mandatory(YangKeyword::BelongsTo),
    };
    builder.build()
}

/// Support for `module` and `submodule` roots.
pub struct ModuleSupport {
    keyword: YangKeyword,
    validator: SubstatementValidator,
}

impl ModuleSupport {
    /// Creates the support for one of the two root keywords.
    #[must_use]
    pub fn new(keyword: YangKeyword) -> Self {
        Self {
            keyword,
            validator: module_validator(keyword),
        }
    }
}

impl StatementSupport for ModuleSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(self.keyword)
    }

    fn parse_argument(&self, _ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        match raw {
            Some(raw) => Ok(ArgValue::Str(raw.into())),
            None => Err(Error::source("module statement requires a name")),
        }
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_linkage_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        // Only roots carry module identity.
        if reactor.arena().get(ctx).parent.is_some() {
            return Ok(());
        }
        let source_ref = reactor.arena().get(ctx).source_ref.clone();
        let name = reactor
            .arena()
            .get(ctx)
            .raw_arg
            .clone()
            .ok_or_else(|| Error::source("module statement requires a name").at(source_ref.clone()))?;

        if self.keyword == YangKeyword::Submodule {
            reactor.ns_put::<SubmoduleNamespace>(ctx, name.to_string(), ctx);
            return Ok(());
        }

        let namespace = reactor.child_raw(ctx, YangKeyword::Namespace).ok_or_else(|| {
            Error::source(format!("module {name} is missing a namespace statement"))
                .at(source_ref.clone())
        })?;
        let prefix = reactor.child_raw(ctx, YangKeyword::Prefix).ok_or_else(|| {
            Error::source(format!("module {name} is missing a prefix statement"))
                .at(source_ref.clone())
        })?;

        let revision = latest_revision(reactor, ctx)?;
        let namespace = reactor.interner_mut().intern_str(&namespace);
        let module = QNameModule::new(namespace, revision);

        reactor.ns_put::<ModuleNamespace>(ctx, name.to_string(), ctx);
        reactor.ns_put::<ModuleQNameNamespace>(ctx, module.clone(), ctx);
        reactor.ns_put::<ModuleCtxToQName>(ctx, ctx, module.clone());
        reactor.ns_put::<PrefixToModule>(ctx, prefix.to_string(), module);
        Ok(())
    }
}

fn latest_revision(reactor: &Reactor, root: CtxId) -> Result<Option<Revision>> {
    let mut latest = None;
    for child in reactor.arena().get(root).children.clone() {
        let c = reactor.arena().get(child);
        if !c.name.is(YangKeyword::Revision) {
            continue;
        }
        let raw = c.raw_arg.clone().ok_or_else(|| {
            Error::source("revision statement requires a date").at(c.source_ref.clone())
        })?;
        let revision = Revision::parse(&raw).map_err(|e| e.at(c.source_ref.clone()))?;
        latest = match latest {
            Some(existing) if existing >= revision => Some(existing),
            _ => Some(revision),
        };
    }
    Ok(latest)
}

/// Support for `import`: binds a prefix once the imported module appears.
pub struct ImportSupport {
    validator: SubstatementValidator,
}

impl ImportSupport {
    /// Creates the import support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Import)
                .add_mandatory(YangKeyword::Prefix)
                .add_optional(YangKeyword::RevisionDate)
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .build(),
        }
    }
}

impl Default for ImportSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for ImportSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Import)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::Str.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_linkage_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        let source_ref = reactor.arena().get(ctx).source_ref.clone();
        let module_name = reactor
            .arena()
            .get(ctx)
            .raw_arg
            .clone()
            .ok_or_else(|| Error::source("import requires a module name").at(source_ref.clone()))?
            .to_string();
        let prefix = reactor
            .child_raw(ctx, YangKeyword::Prefix)
            .ok_or_else(|| {
                Error::source(format!("import {module_name} is missing a prefix"))
                    .at(source_ref.clone())
            })?
            .to_string();
        let revision_date = match reactor.child_raw(ctx, YangKeyword::RevisionDate) {
            Some(raw) => Some(Revision::parse(&raw).map_err(|e| e.at(source_ref.clone()))?),
            None => None,
        };

        let wanted = module_name.clone();
        let action = InferenceAction::builder(Phase::SourceLinkage)
            .requires(Prereq::new(
                format!("module '{module_name}'"),
                move |reactor: &Reactor| {
                    reactor
                        .ns_get::<ModuleNamespace>(CtxId(0), &wanted)
                        .is_some()
                },
            ))
            .apply(
                {
                    let module_name = module_name.clone();
                    let source_ref = source_ref.clone();
                    move |reactor: &mut Reactor| {
                        let target_root = reactor
                            .ns_get::<ModuleNamespace>(ctx, &module_name)
                            .ok_or_else(|| {
                                Error::inference(format!("imported module {module_name} vanished"))
                            })?;
                        let module = reactor.module_of_root(target_root).ok_or_else(|| {
                            Error::inference(format!(
                                "imported module {module_name} has no linkage"
                            ))
                            .at(source_ref.clone())
                        })?;
                        if let Some(wanted_revision) = revision_date {
                            if module.revision() != Some(wanted_revision) {
                                return Err(Error::inference(format!(
                                    "imported module {module_name} revision {wanted_revision} \
                                     is not available"
                                ))
                                .at(source_ref.clone()));
                            }
                        }
                        reactor.ns_put::<PrefixToModule>(ctx, prefix.clone(), module);
                        Ok(())
                    }
                },
                move |_missing| {
                    Error::inference(format!("Imported module '{module_name}' was not found"))
                        .at(source_ref.clone())
                },
            );
        reactor.register_action(action);
        Ok(())
    }
}

/// Support for `include`: splices a resolved submodule into its module.
pub struct IncludeSupport {
    validator: SubstatementValidator,
}

impl IncludeSupport {
    /// Creates the include support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::Include)
                .add_optional(YangKeyword::RevisionDate)
                .add_optional(YangKeyword::Description)
                .add_optional(YangKeyword::Reference)
                .build(),
        }
    }
}

impl Default for IncludeSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for IncludeSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::Include)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::Str.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_linkage_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        let source_ref = reactor.arena().get(ctx).source_ref.clone();
        let submodule_name = reactor
            .arena()
            .get(ctx)
            .raw_arg
            .clone()
            .ok_or_else(|| {
                Error::source("include requires a submodule name").at(source_ref.clone())
            })?
            .to_string();
        let Some(module_root) = reactor.arena().get(ctx).parent else {
            return Ok(());
        };

        // The splice waits for full declaration so the submodule's
        // arguments are parsed and its schema children can re-register
        // under the including module's root.
        let wanted = submodule_name.clone();
        let linked = submodule_name.clone();
        let action = InferenceAction::builder(Phase::FullDeclaration)
            .requires(Prereq::new(
                format!("submodule '{submodule_name}'"),
                move |reactor: &Reactor| {
                    reactor
                        .ns_get::<SubmoduleNamespace>(CtxId(0), &wanted)
                        .is_some()
                },
            ))
            .requires(Prereq::new(
                format!("linkage of submodule '{submodule_name}'"),
                move |reactor: &Reactor| {
                    reactor
                        .ns_get::<SubmoduleNamespace>(CtxId(0), &linked)
                        .is_some_and(|root| reactor.module_of_root(root).is_some())
                },
            ))
            .apply(
                {
                    let submodule_name = submodule_name.clone();
                    move |reactor: &mut Reactor| {
                        let sub_root = reactor
                            .ns_get::<SubmoduleNamespace>(ctx, &submodule_name)
                            .ok_or_else(|| {
                                Error::inference(format!(
                                    "included submodule {submodule_name} vanished"
                                ))
                            })?;
                        let spliced: Vec<CtxId> = reactor
                            .arena()
                            .get(sub_root)
                            .children
                            .clone()
                            .into_iter()
                            .filter(|&child| {
                                !reactor.arena().get(child).name.is(YangKeyword::BelongsTo)
                            })
                            .collect();
                        for child in &spliced {
                            if let Some(qname) = reactor.arena().get(*child).arg.as_qname().cloned()
                            {
                                let is_schema = reactor
                                    .arena()
                                    .get(*child)
                                    .name
                                    .keyword()
                                    .is_some_and(YangKeyword::is_schema_tree);
                                if is_schema {
                                    reactor.register_schema_child(module_root, qname, *child)?;
                                }
                            }
                        }
                        reactor
                            .arena_mut()
                            .get_mut(module_root)
                            .effective_added
                            .extend(spliced);
                        Ok(())
                    }
                },
                move |_missing| {
                    Error::inference(format!(
                        "Included submodule '{submodule_name}' was not found"
                    ))
                    .at(source_ref.clone())
                },
            );
        reactor.register_action(action);
        Ok(())
    }
}

/// Support for `belongs-to`: links a submodule into its parent module's
/// identity.
pub struct BelongsToSupport {
    validator: SubstatementValidator,
}

impl BelongsToSupport {
    /// Creates the belongs-to support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: SubstatementValidator::builder(YangKeyword::BelongsTo)
                .add_mandatory(YangKeyword::Prefix)
                .build(),
        }
    }
}

impl Default for BelongsToSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSupport for BelongsToSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(YangKeyword::BelongsTo)
    }

    fn parse_argument(&self, ctx: &ArgumentContext<'_>, raw: Option<&str>) -> Result<ArgValue> {
        ArgKind::Str.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_linkage_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        let source_ref = reactor.arena().get(ctx).source_ref.clone();
        let module_name = reactor
            .arena()
            .get(ctx)
            .raw_arg
            .clone()
            .ok_or_else(|| {
                Error::source("belongs-to requires a module name").at(source_ref.clone())
            })?
            .to_string();
        let prefix = reactor
            .child_raw(ctx, YangKeyword::Prefix)
            .ok_or_else(|| {
                Error::source(format!("belongs-to {module_name} is missing a prefix"))
                    .at(source_ref.clone())
            })?
            .to_string();
        let sub_root = reactor.arena().get(ctx).root;

        let wanted = module_name.clone();
        let action = InferenceAction::builder(Phase::SourceLinkage)
            .requires(Prereq::new(
                format!("module '{module_name}'"),
                move |reactor: &Reactor| {
                    reactor
                        .ns_get::<ModuleNamespace>(CtxId(0), &wanted)
                        .is_some()
                },
            ))
            .apply(
                {
                    let module_name = module_name.clone();
                    move |reactor: &mut Reactor| {
                        let parent_root = reactor
                            .ns_get::<ModuleNamespace>(ctx, &module_name)
                            .ok_or_else(|| {
                                Error::inference(format!("module {module_name} vanished"))
                            })?;
                        let module = reactor.module_of_root(parent_root).ok_or_else(|| {
                            Error::inference(format!("module {module_name} has no linkage"))
                        })?;
                        reactor.ns_put::<ModuleCtxToQName>(ctx, sub_root, module.clone());
                        reactor.ns_put::<PrefixToModule>(ctx, prefix.clone(), module);
                        Ok(())
                    }
                },
                move |_missing| {
                    Error::inference(format!(
                        "Parent module '{module_name}' of submodule was not found"
                    ))
                    .at(source_ref.clone())
                },
            );
        reactor.register_action(action);
        Ok(())
    }
}
