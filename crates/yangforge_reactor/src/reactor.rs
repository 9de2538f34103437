//! The cross-source reactor.
//!
//! Owns the statement arena, the namespace scopes, and the pending
//! inference actions, and drives every source through the four phases.
//! Within a phase, per-statement hooks run first, then the fixed-point loop
//! fires actions as their prerequisites are satisfied. A phase that ends
//! with errors or stuck actions aborts the build with one aggregated
//! [`ReactorError`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{Error, Interner, QName, QNameModule, Result};
use yangforge_model::{
    Absolute, ArgValue, DeclaredStatement, EffectiveModelContext, EffectiveStatement, FeatureSet,
    FlagsBuilder, InferenceStack, OrderedBy, StatementName, StatementSource, Status, TypeSpec,
    YangKeyword,
};

use crate::action::InferenceAction;
use crate::ctx::{Arena, CopyType, CtxId, StmtCtx};
use crate::namespace::{
    ModuleCtxToQName, ModuleQNameNamespace, Namespace, NamespaceBehaviour, NamespaceStore,
    SchemaTreeNamespace,
};
use crate::phase::Phase;
use crate::stmt::typedef::compile_type;
use crate::support::{ArgumentContext, StatementPolicy, SupportRegistry};

/// Aggregated failure of a build: every source and inference error
/// collected up to the end of the failing phase.
#[derive(Debug)]
pub struct ReactorError {
    /// The phase that failed.
    pub phase: Phase,
    /// All accumulated errors.
    pub errors: Vec<Error>,
}

impl std::error::Error for ReactorError {}

impl fmt::Display for ReactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reactor aborted in phase {} with {} error(s)",
            self.phase,
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

/// The phased inference engine.
pub struct Reactor {
    registry: Arc<SupportRegistry>,
    features: FeatureSet,
    supported_deviations: Option<HashMap<QNameModule, HashSet<QNameModule>>>,
    arena: Arena,
    roots: Vec<CtxId>,
    global_ns: NamespaceStore,
    root_ns: HashMap<CtxId, NamespaceStore>,
    actions: Vec<Option<InferenceAction>>,
    errors: Vec<Error>,
    interner: Interner,
}

impl Reactor {
    /// Creates a reactor with the default statement-support registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(crate::stmt::default_registry())
    }

    /// Creates a reactor with an explicit registry.
    #[must_use]
    pub fn with_registry(registry: Arc<SupportRegistry>) -> Self {
        Self {
            registry,
            features: FeatureSet::All,
            supported_deviations: None,
            arena: Arena::new(),
            roots: Vec::new(),
            global_ns: NamespaceStore::new(),
            root_ns: HashMap::new(),
            actions: Vec::new(),
            errors: Vec::new(),
            interner: Interner::new(),
        }
    }

    /// Sets the active feature set; `if-feature` predicates are evaluated
    /// against it.
    #[must_use]
    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Restricts which modules may deviate which target modules. When set,
    /// a deviate whose module is not listed for its target module is
    /// silently dropped.
    #[must_use]
    pub fn with_supported_deviations(
        mut self,
        map: HashMap<QNameModule, HashSet<QNameModule>>,
    ) -> Self {
        self.supported_deviations = Some(map);
        self
    }

    /// Adds a source to the build.
    pub fn add_source(&mut self, source: &StatementSource) {
        let root = self.arena.load_source(&source.name, &source.root);
        self.roots.push(root);
        self.root_ns.insert(root, NamespaceStore::new());

        // Pre-linkage hooks run as the source is loaded.
        for id in self.arena.subtree(root) {
            let support = self.registry.get(&self.arena.get(id).name.clone());
            if let Err(error) = support.on_pre_linkage_declared(self, id) {
                self.errors.push(error);
            }
        }
    }

    /// Drives all sources to the effective model.
    pub fn build(mut self) -> std::result::Result<EffectiveModelContext, ReactorError> {
        for phase in Phase::ALL {
            self.run_phase(phase)?;
        }
        self.assemble()
    }

    // --- Accessors used by statement supports ---

    /// Returns the statement arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the statement arena, mutably.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns the active feature set.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Returns the interner.
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    /// Returns the supported-deviations configuration.
    #[must_use]
    pub fn supported_deviations(
        &self,
    ) -> Option<&HashMap<QNameModule, HashSet<QNameModule>>> {
        self.supported_deviations.as_ref()
    }

    /// Records a non-fatal error; the current phase fails at its end.
    pub fn record_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Registers an inference action.
    pub fn register_action(&mut self, action: InferenceAction) {
        self.actions.push(Some(action));
    }

    /// Looks up a namespace entry, dispatching on the namespace behaviour.
    #[must_use]
    pub fn ns_get<N: Namespace>(&self, at: CtxId, key: &N::Key) -> Option<N::Value> {
        match N::behaviour() {
            NamespaceBehaviour::Global => self.global_ns.get::<N>(key).cloned(),
            _ => {
                let root = self.arena.get(at).root;
                self.root_ns
                    .get(&root)
                    .and_then(|store| store.get::<N>(key))
                    .cloned()
            }
        }
    }

    /// Writes a namespace entry, dispatching on the namespace behaviour.
    pub fn ns_put<N: Namespace>(
        &mut self,
        at: CtxId,
        key: N::Key,
        value: N::Value,
    ) -> Option<N::Value> {
        match N::behaviour() {
            NamespaceBehaviour::Global => self.global_ns.put::<N>(key, value),
            _ => {
                let root = self.arena.get(at).root;
                self.root_ns.entry(root).or_default().put::<N>(key, value)
            }
        }
    }

    /// Looks up a module-local namespace entry in the module owning
    /// `module`, from anywhere.
    #[must_use]
    pub fn ns_get_in_module<N: Namespace>(
        &self,
        module: &QNameModule,
        key: &N::Key,
    ) -> Option<N::Value> {
        let root = self.global_ns.get::<ModuleQNameNamespace>(module)?;
        self.root_ns
            .get(root)
            .and_then(|store| store.get::<N>(key))
            .cloned()
    }

    /// Returns the module identifier of a source root.
    #[must_use]
    pub fn module_of_root(&self, root: CtxId) -> Option<QNameModule> {
        self.global_ns.get::<ModuleCtxToQName>(&root).cloned()
    }

    /// Returns the module identifier owning a context.
    #[must_use]
    pub fn module_of(&self, ctx: CtxId) -> Option<QNameModule> {
        self.module_of_root(self.arena.get(ctx).root)
    }

    /// Finds the first supported child with the given keyword.
    #[must_use]
    pub fn find_child(&self, ctx: CtxId, keyword: YangKeyword) -> Option<CtxId> {
        self.arena.get(ctx).all_children().find(|&child| {
            let c = self.arena.get(child);
            c.is_supported && c.name.is(keyword)
        })
    }

    /// Returns the raw argument of the first supported child with the
    /// given keyword.
    #[must_use]
    pub fn child_raw(&self, ctx: CtxId, keyword: YangKeyword) -> Option<Arc<str>> {
        self.find_child(ctx, keyword)
            .and_then(|child| self.arena.get(child).raw_arg.clone())
    }

    /// Evaluates every `if-feature` predicate declared on a context.
    #[must_use]
    pub fn evaluate_if_features(&self, ctx: CtxId) -> bool {
        self.arena.get(ctx).all_children().all(|child| {
            let c = self.arena.get(child);
            if !c.is_supported || !c.name.is(YangKeyword::IfFeature) {
                return true;
            }
            match &c.arg {
                ArgValue::IfFeature(expr) => expr.evaluate(&self.features),
                _ => true,
            }
        })
    }

    /// Registers a schema-tree child of `parent`, failing on a name
    /// collision.
    pub fn register_schema_child(
        &mut self,
        parent: CtxId,
        qname: QName,
        child: CtxId,
    ) -> Result<()> {
        if let Some(existing) = self.ns_get::<SchemaTreeNamespace>(parent, &(parent, qname.clone()))
        {
            if existing != child {
                let at = self.arena.get(child).source_ref.clone();
                return Err(Error::inference(format!(
                    "schema node {qname} is already declared in this scope"
                ))
                .at(at));
            }
            return Ok(());
        }
        self.ns_put::<SchemaTreeNamespace>(parent, (parent, qname), child);
        Ok(())
    }

    /// Walks an absolute schema node identifier through the schema-tree
    /// namespace, returning the target context.
    #[must_use]
    pub fn resolve_schema_path(&self, path: &Absolute) -> Option<CtxId> {
        let first = path.first();
        let mut current = *self.global_ns.get::<ModuleQNameNamespace>(first.module())?;
        for qname in path.node_identifiers() {
            let next =
                self.ns_get::<SchemaTreeNamespace>(current, &(current, qname.clone()))?;
            if !self.arena.get(next).is_supported {
                return None;
            }
            current = next;
        }
        Some(current)
    }

    /// Deep-copies a statement subtree under a new parent.
    ///
    /// `rebind` carries the namespace the clone's node identifiers move to
    /// (grouping instantiation); `None` keeps original namespaces
    /// (augment injection). Schema-tree clones register themselves with
    /// their new parent.
    pub fn clone_tree(
        &mut self,
        src: CtxId,
        new_parent: CtxId,
        copy_type: CopyType,
        rebind: Option<&QNameModule>,
    ) -> Result<CtxId> {
        let source = self.arena.get(src).clone();
        let policy = self.registry.get(&source.name).policy();
        if policy == StatementPolicy::Reject {
            return Err(Error::inference(format!(
                "statement {} cannot be replicated",
                source.name
            ))
            .at(source.source_ref.clone()));
        }

        let rebinds_identifier = source
            .name
            .keyword()
            .is_some_and(|kw| kw.is_schema_tree() || matches!(kw, YangKeyword::Grouping | YangKeyword::Typedef));
        let arg = match (rebind, rebinds_identifier) {
            (Some(module), true) => source.arg.bind_to(module),
            _ => source.arg.clone(),
        };

        let new_root = self.arena.get(new_parent).root;
        let id = self.arena.alloc(StmtCtx {
            name: source.name.clone(),
            raw_arg: source.raw_arg.clone(),
            arg,
            source_ref: source.source_ref.clone(),
            parent: Some(new_parent),
            children: Vec::new(),
            effective_added: Vec::new(),
            is_supported: source.is_supported,
            copy_type,
            origin: Some(src),
            root: new_root,
            expanded: source.expanded,
        });

        let child_copy_type = match copy_type {
            CopyType::Original => CopyType::AddedByUses,
            other => other,
        };
        let mut children = Vec::new();
        for child in source.all_children() {
            children.push(self.clone_tree(child, id, child_copy_type, rebind)?);
        }
        self.arena.get_mut(id).children = children;

        if let Some(qname) = self.arena.get(id).arg.as_qname().cloned() {
            if self.arena.get(id).name.keyword().is_some_and(YangKeyword::is_schema_tree) {
                self.register_schema_child(new_parent, qname, id)?;
            }
        }
        Ok(id)
    }

    /// Marks a context (and its effect on the model) unsupported.
    pub fn mark_unsupported(&mut self, ctx: CtxId) {
        self.arena.get_mut(ctx).is_supported = false;
    }

    // --- Phase driving ---

    fn run_phase(&mut self, phase: Phase) -> std::result::Result<(), ReactorError> {
        let roots = self.roots.clone();
        for root in roots {
            let ids = self.arena.subtree(root);
            match phase {
                Phase::SourceLinkage => {
                    for id in ids {
                        let support = self.registry.get(&self.arena.get(id).name.clone());
                        if let Err(error) = support.on_linkage_declared(self, id) {
                            self.errors.push(error);
                        }
                    }
                }
                Phase::StatementDefinition => {
                    self.parse_arguments(root, &ids);
                    for id in ids {
                        let support = self.registry.get(&self.arena.get(id).name.clone());
                        if let Err(error) = support.on_statement_definition_declared(self, id) {
                            self.errors.push(error);
                        }
                    }
                }
                Phase::FullDeclaration => {
                    for id in ids {
                        let support = self.registry.get(&self.arena.get(id).name.clone());
                        if let Err(error) = support.validate(self, id) {
                            self.errors.push(error);
                            continue;
                        }
                        if let Err(error) = support.on_full_definition_declared(self, id) {
                            self.errors.push(error);
                        }
                    }
                }
                Phase::EffectiveModel => {}
            }
        }

        self.run_actions(phase);

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ReactorError {
                phase,
                errors: std::mem::take(&mut self.errors),
            })
        }
    }

    fn parse_arguments(&mut self, root: CtxId, ids: &[CtxId]) {
        let Some(module) = self.module_of_root(root) else {
            // Linkage already failed for this source.
            return;
        };
        let prefixes: HashMap<String, QNameModule> = self
            .root_ns
            .get(&root)
            .map(|store| {
                store
                    .entries::<crate::namespace::PrefixToModule>()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        for &id in ids {
            let (name, raw, source_ref) = {
                let ctx = self.arena.get(id);
                if !matches!(ctx.arg, ArgValue::None) {
                    continue;
                }
                (ctx.name.clone(), ctx.raw_arg.clone(), ctx.source_ref.clone())
            };
            let support = self.registry.get(&name);
            let arg_ctx = ArgumentContext {
                module: &module,
                prefixes: &prefixes,
                source_ref: &source_ref,
            };
            match support.parse_argument(&arg_ctx, raw.as_deref()) {
                Ok(arg) => self.arena.get_mut(id).arg = arg,
                Err(error) => self.errors.push(error),
            }
        }
    }

    fn run_actions(&mut self, phase: Phase) {
        loop {
            let mut progressed = false;
            for index in 0..self.actions.len() {
                let ready = match &self.actions[index] {
                    Some(action) if action.phase == phase => {
                        action.prereqs.iter().all(|p| (p.check)(self))
                    }
                    _ => false,
                };
                if ready {
                    if let Some(action) = self.actions[index].take() {
                        if let Err(error) = (action.apply)(self) {
                            self.errors.push(error);
                        }
                        progressed = true;
                    }
                }
            }
            if !progressed {
                break;
            }
        }

        // Whatever is left for this phase is stuck.
        for index in 0..self.actions.len() {
            let stuck = matches!(&self.actions[index], Some(action) if action.phase == phase);
            if stuck {
                if let Some(action) = self.actions[index].take() {
                    let missing: Vec<String> = action
                        .prereqs
                        .iter()
                        .filter(|p| !(p.check)(self))
                        .map(|p| p.description.clone())
                        .collect();
                    self.errors.push((action.failure)(&missing));
                }
            }
        }
    }

    // --- Effective model assembly ---

    fn assemble(mut self) -> std::result::Result<EffectiveModelContext, ReactorError> {
        let mut modules = HashMap::new();
        let mut seen_paths = HashSet::new();
        let roots = self.roots.clone();
        for root in roots {
            if !self.arena.get(root).name.is(YangKeyword::Module) {
                continue;
            }
            if !self.arena.get(root).is_supported {
                continue;
            }
            let Some(module_qname) = self.module_of_root(root) else {
                continue;
            };
            match self.build_effective(root, true, false, &mut Vec::new(), &mut seen_paths) {
                Ok(Some(stmt)) => {
                    modules.insert(module_qname, stmt);
                }
                Ok(None) => {}
                Err(error) => self.errors.push(error),
            }
        }

        let context = EffectiveModelContext::new(modules, HashMap::new());
        let context = match self.resolve_leafrefs(context) {
            Ok(context) => context,
            Err(error) => {
                self.errors.push(error);
                EffectiveModelContext::default()
            }
        };

        if self.errors.is_empty() {
            Ok(context)
        } else {
            Err(ReactorError {
                phase: Phase::EffectiveModel,
                errors: self.errors,
            })
        }
    }

    fn build_effective(
        &self,
        id: CtxId,
        parent_config: bool,
        in_grouping: bool,
        path: &mut Vec<QName>,
        seen_paths: &mut HashSet<Absolute>,
    ) -> Result<Option<Arc<EffectiveStatement>>> {
        let ctx = self.arena.get(id);
        if !ctx.is_supported {
            return Ok(None);
        }
        if !self.evaluate_if_features(id) {
            return Ok(None);
        }

        let name = ctx.name.clone();
        let keyword = name.keyword();
        let is_schema = keyword.is_some_and(YangKeyword::is_schema_tree);

        // Inherited config resolves before recursion so children see it.
        let config = self
            .find_child(id, YangKeyword::Config)
            .and_then(|c| self.arena.get(c).arg.as_bool())
            .unwrap_or(parent_config);

        let qname = ctx.arg.as_qname().cloned();
        // Statements inside groupings are uninstantiated and carry no
        // schema node identifier.
        let mut pushed = false;
        if is_schema && !in_grouping {
            if let Some(qname) = qname.clone() {
                path.push(qname);
                pushed = true;
            }
        }

        // Augment, deviation, and uses bodies are declaration sites; only
        // the copies injected at their targets are instantiated.
        let child_in_grouping = in_grouping
            || name.is(YangKeyword::Grouping)
            || name.is(YangKeyword::Augment)
            || name.is(YangKeyword::Deviation)
            || name.is(YangKeyword::Uses);
        let mut substatements = Vec::new();
        for child in ctx.all_children().collect::<Vec<_>>() {
            if let Some(built) =
                self.build_effective(child, config, child_in_grouping, path, seen_paths)?
            {
                substatements.push(built);
            }
        }

        // Shorthand choice children get their implicit case wrapper.
        if name.is(YangKeyword::Choice) {
            substatements = substatements
                .into_iter()
                .map(|sub| {
                    if sub.is_data_tree_statement() {
                        let arg = sub.argument().clone();
                        EffectiveStatement::builder(
                            StatementName::Rfc(YangKeyword::Case),
                            arg,
                        )
                        .flags(sub.flags())
                        .substatement(sub)
                        .build()
                    } else {
                        sub
                    }
                })
                .collect();
        }

        let flags = self.compute_flags(id, config)?;

        let mut builder = EffectiveStatement::builder(name.clone(), ctx.arg.clone())
            .flags(flags)
            .declared(Arc::new(DeclaredStatement::new(
                name.clone(),
                ctx.raw_arg.clone(),
                ctx.arg.clone(),
                ctx.source_ref.clone(),
            )))
            .substatements(substatements);

        if keyword == Some(YangKeyword::Leaf) || keyword == Some(YangKeyword::LeafList) {
            let type_child = self.find_child(id, YangKeyword::Type).ok_or_else(|| {
                Error::inference(format!(
                    "typed node {} has no type statement",
                    ctx.raw_arg.as_deref().unwrap_or("?")
                ))
                .at(ctx.source_ref.clone())
            })?;
            builder = builder.type_spec(compile_type(self, type_child, 0)?);
        }

        if pushed {
            let absolute = Absolute::new(path.clone())?;
            path.pop();
            if !seen_paths.insert(absolute.clone()) {
                return Err(Error::inference(format!(
                    "duplicate schema node identifier {absolute}"
                ))
                .at(ctx.source_ref.clone()));
            }
            builder = builder.schema_path(absolute);
        }

        Ok(Some(builder.build()))
    }

    fn compute_flags(&self, id: CtxId, config: bool) -> Result<yangforge_model::StatementFlags> {
        let status = self
            .find_child(id, YangKeyword::Status)
            .and_then(|c| match &self.arena.get(c).arg {
                ArgValue::Status(status) => Some(*status),
                _ => None,
            })
            .unwrap_or(Status::Current);
        let mandatory = self
            .find_child(id, YangKeyword::Mandatory)
            .and_then(|c| self.arena.get(c).arg.as_bool())
            .unwrap_or(false);
        let ordered_by = self
            .find_child(id, YangKeyword::OrderedBy)
            .and_then(|c| match &self.arena.get(c).arg {
                ArgValue::OrderedBy(ordered_by) => Some(*ordered_by),
                _ => None,
            })
            .unwrap_or(OrderedBy::System);
        let presence = self.find_child(id, YangKeyword::Presence).is_some();

        Ok(FlagsBuilder::new()
            .status(status)
            .config(config)
            .mandatory(mandatory)
            .ordered_by(ordered_by)
            .presence(presence)
            .build())
    }

    // Resolves every leafref in the model to its target type, caching the
    // results on the context. Also proves leafref closure: resolution must
    // terminate in a non-leafref type.
    fn resolve_leafrefs(
        &mut self,
        context: EffectiveModelContext,
    ) -> Result<EffectiveModelContext> {
        let shared = Arc::new(context);
        let mut targets = HashMap::new();
        let mut errors = Vec::new();

        for (_, module) in shared.module_statements() {
            let mut data_path = Vec::new();
            collect_leafrefs(&shared, module, &mut data_path, &mut targets, &mut errors);
        }

        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }

        let context = Arc::try_unwrap(shared)
            .map_err(|_| Error::illegal_state("model context leaked during leafref resolution"))?;
        let mut modules = HashMap::new();
        for (qnm, stmt) in context.module_statements() {
            modules.insert(qnm.clone(), Arc::clone(stmt));
        }
        Ok(EffectiveModelContext::new(modules, targets))
    }
}

fn collect_leafrefs(
    context: &Arc<EffectiveModelContext>,
    stmt: &Arc<EffectiveStatement>,
    data_path: &mut Vec<QName>,
    targets: &mut HashMap<Absolute, TypeSpec>,
    errors: &mut Vec<Error>,
) {
    if stmt.is_grouping() {
        // Leafrefs inside uninstantiated groupings have no resolution
        // context.
        return;
    }
    let pushed = if stmt.is_data_tree_statement() {
        match stmt.arg_qname() {
            Some(qname) => {
                data_path.push(qname.clone());
                true
            }
            None => false,
        }
    } else {
        false
    };

    if let (Some(spec), Some(schema_path)) = (stmt.type_spec(), stmt.schema_path()) {
        if spec.is_leafref() {
            match InferenceStack::of_data_tree_path(Arc::clone(context), data_path) {
                Ok(stack) => match stack.resolve_leafref(spec) {
                    Ok(resolved) => {
                        targets.insert(schema_path.clone(), resolved);
                    }
                    Err(error) => errors.push(error),
                },
                Err(error) => errors.push(error),
            }
        }
    }

    for sub in stmt.substatements() {
        collect_leafrefs(context, sub, data_path, targets, errors);
    }

    if pushed {
        data_path.pop();
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}
