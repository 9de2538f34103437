//! The statement-context arena.
//!
//! Statement contexts form cyclic-looking graphs during inference (uses
//! reaching back into groupings, deviates into other modules), so contexts
//! live in one arena and refer to each other by index, never by owning
//! pointer.

use std::fmt;
use std::sync::Arc;

use yangforge_foundation::SourceRef;
use yangforge_model::{ArgValue, StatementName, StatementRecord};

/// Index of a statement context in the arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct CtxId(pub(crate) u32);

impl CtxId {
    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CtxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CtxId({})", self.0)
    }
}

/// How a context came to exist at its position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CopyType {
    /// Declared here, or the first expansion of a grouping.
    #[default]
    Original,
    /// Cloned by a nested `uses` expansion.
    AddedByUses,
    /// Injected by an `augment`.
    AddedByAugmentation,
}

/// One statement context.
#[derive(Clone, Debug)]
pub struct StmtCtx {
    /// Statement identity.
    pub name: StatementName,
    /// Raw argument text.
    pub raw_arg: Option<Arc<str>>,
    /// Parsed argument; `ArgValue::None` until statement definition runs.
    pub arg: ArgValue,
    /// Declaration site.
    pub source_ref: SourceRef,
    /// Parent context, if any.
    pub parent: Option<CtxId>,
    /// Declared children, in order.
    pub children: Vec<CtxId>,
    /// Children added during inference (uses, augment, deviate add).
    pub effective_added: Vec<CtxId>,
    /// False once a deviation or feature evaluation dropped this context.
    pub is_supported: bool,
    /// Replication provenance.
    pub copy_type: CopyType,
    /// The context this one was cloned from, for diagnostics.
    pub origin: Option<CtxId>,
    /// The source root this context belongs to.
    pub root: CtxId,
    /// True once a `uses` statement has been expanded; clones of an
    /// expanded uses carry its expansion results and must not re-expand.
    pub expanded: bool,
}

impl StmtCtx {
    /// Iterates declared and inference-added children, in order.
    pub fn all_children(&self) -> impl Iterator<Item = CtxId> + '_ {
        self.children
            .iter()
            .chain(self.effective_added.iter())
            .copied()
    }
}

/// Arena of statement contexts.
#[derive(Default, Debug)]
pub struct Arena {
    ctxs: Vec<StmtCtx>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ctxs.len()
    }

    /// Returns true if no contexts have been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ctxs.is_empty()
    }

    /// Returns the context at `id`.
    ///
    /// # Panics
    /// Panics if `id` did not come from this arena; ids are never removed.
    #[must_use]
    pub fn get(&self, id: CtxId) -> &StmtCtx {
        &self.ctxs[id.0 as usize]
    }

    /// Returns the context at `id`, mutably.
    ///
    /// # Panics
    /// Panics if `id` did not come from this arena.
    pub fn get_mut(&mut self, id: CtxId) -> &mut StmtCtx {
        &mut self.ctxs[id.0 as usize]
    }

    /// Allocates a context and returns its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` contexts.
    pub fn alloc(&mut self, ctx: StmtCtx) -> CtxId {
        let id = CtxId(u32::try_from(self.ctxs.len()).expect("arena exhausted"));
        self.ctxs.push(ctx);
        id
    }

    /// Loads a record tree into the arena, returning the root id.
    pub fn load_source(&mut self, source_name: &Arc<str>, record: &StatementRecord) -> CtxId {
        // Reserve the root so children can point at it.
        let root = self.alloc(StmtCtx {
            name: record.name.clone(),
            raw_arg: record.raw_argument.as_deref().map(Arc::from),
            arg: ArgValue::None,
            source_ref: SourceRef::new(Arc::clone(source_name), record.source_ref.line),
            parent: None,
            children: Vec::new(),
            effective_added: Vec::new(),
            is_supported: true,
            copy_type: CopyType::Original,
            origin: None,
            root: CtxId(0),
            expanded: false,
        });
        self.get_mut(root).root = root;
        let children: Vec<CtxId> = record
            .children
            .iter()
            .map(|child| self.load_record(source_name, child, root, root))
            .collect();
        self.get_mut(root).children = children;
        root
    }

    fn load_record(
        &mut self,
        source_name: &Arc<str>,
        record: &StatementRecord,
        parent: CtxId,
        root: CtxId,
    ) -> CtxId {
        let id = self.alloc(StmtCtx {
            name: record.name.clone(),
            raw_arg: record.raw_argument.as_deref().map(Arc::from),
            arg: ArgValue::None,
            source_ref: SourceRef::new(Arc::clone(source_name), record.source_ref.line),
            parent: Some(parent),
            children: Vec::new(),
            effective_added: Vec::new(),
            is_supported: true,
            copy_type: CopyType::Original,
            origin: None,
            root,
            expanded: false,
        });
        let children: Vec<CtxId> = record
            .children
            .iter()
            .map(|child| self.load_record(source_name, child, id, root))
            .collect();
        self.get_mut(id).children = children;
        id
    }

    /// Walks the subtree rooted at `id` in depth-first declaration order.
    #[must_use]
    pub fn subtree(&self, id: CtxId) -> Vec<CtxId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            out.push(current);
            let ctx = self.get(current);
            // Reverse so the leftmost child is processed first.
            for child in ctx.all_children().collect::<Vec<_>>().into_iter().rev() {
                pending.push(child);
            }
        }
        out
    }
}
