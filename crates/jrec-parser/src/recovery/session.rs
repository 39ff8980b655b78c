//! The recovery session: node arena, active node and advisory diagnostics.
//!
//! One session exists per source unit. The reader drives it with fragments
//! (`absorb`) and token events (braces, semicolons, modifiers, annotation
//! names); `finalize` turns whatever has been built so far into a complete
//! `CompilationUnit`.

use super::attributes::PendingAttributes;
use super::balance::BracketBalance;
use super::node::{RecoveryData, RecoveryIndex, RecoveryKind, RecoveryNode, UnitData};
use crate::ast::{CompilationUnit, Expression, ExpressionKind, TypeKind};
use jrec_common::diagnostics::{Diagnostic, diagnostic_codes};
use jrec_common::limits::{MAX_NODE_PREALLOC, SOURCE_BYTES_PER_NODE};
use jrec_common::Span;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

/// Advisory problems recovery reports while it repairs the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralProblem {
    UnexpectedClosingBrace,
    UnexpectedOpeningBrace,
    DeclarationOutsideType,
    OrphanedAnonymousType,
    EnumConstantAfterMembers,
    DiscardedAttributes,
    MissingClosingBrace,
    DuplicateField,
    DuplicateMethod,
    DuplicateDefaultConstructor,
    StatementOutsideBody,
}

impl StructuralProblem {
    pub const fn code(self) -> u32 {
        match self {
            StructuralProblem::UnexpectedClosingBrace => diagnostic_codes::UNEXPECTED_CLOSING_BRACE,
            StructuralProblem::UnexpectedOpeningBrace => diagnostic_codes::UNEXPECTED_OPENING_BRACE,
            StructuralProblem::DeclarationOutsideType => diagnostic_codes::DECLARATION_OUTSIDE_TYPE,
            StructuralProblem::OrphanedAnonymousType => diagnostic_codes::ORPHANED_ANONYMOUS_TYPE,
            StructuralProblem::EnumConstantAfterMembers => {
                diagnostic_codes::ENUM_CONSTANT_AFTER_MEMBERS
            }
            StructuralProblem::DiscardedAttributes => diagnostic_codes::DISCARDED_ATTRIBUTES,
            StructuralProblem::MissingClosingBrace => diagnostic_codes::MISSING_CLOSING_BRACE,
            StructuralProblem::DuplicateField => diagnostic_codes::DUPLICATE_FIELD,
            StructuralProblem::DuplicateMethod => diagnostic_codes::DUPLICATE_METHOD,
            StructuralProblem::DuplicateDefaultConstructor => {
                diagnostic_codes::DUPLICATE_DEFAULT_CONSTRUCTOR
            }
            StructuralProblem::StatementOutsideBody => diagnostic_codes::STATEMENT_OUTSIDE_BODY,
        }
    }
}

/// What kind of source the innermost open node expects next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadingContext {
    /// Package, imports and top-level types.
    Unit,
    /// Members of a type body.
    TypeBody {
        kind: TypeKind,
        /// Empty for anonymous types.
        name: String,
        /// Enum body before its first `;` or non-constant member.
        enum_constants: bool,
    },
    /// Statements of a method or initializer body.
    Executable {
        /// The method or initializer node owning the body.
        body: RecoveryIndex,
        /// Name of the type declaring the enclosing body.
        type_name: String,
    },
}

/// Saved session state for speculative recovery.
///
/// Taken with `RecoverySession::checkpoint` and consumed by `rollback` or
/// `commit`. Only the nodes changed after it was taken are copied, the first
/// time each one changes.
#[derive(Debug)]
pub struct RecoveryCheckpoint {
    node_count: usize,
    journal_len: usize,
    active: RecoveryIndex,
    diagnostics_len: usize,
    closure: Option<u32>,
}

impl RecoveryCheckpoint {
    pub fn active(&self) -> RecoveryIndex {
        self.active
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

/// Finalized unit together with every advisory reported along the way.
#[derive(Clone, Debug, Serialize)]
pub struct RecoveryResult {
    pub unit: CompilationUnit,
    pub diagnostics: Vec<Diagnostic>,
}

impl RecoveryResult {
    /// Pretty-printed JSON of the unit and its diagnostics.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct RecoverySession {
    pub(crate) nodes: Vec<RecoveryNode>,
    pub(crate) active: RecoveryIndex,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) file_name: String,
    pub(crate) source_len: u32,
    /// Offset of the token at which recovery was abandoned, if it was.
    pub(crate) closure: Option<u32>,
    /// Nodes as they were before their first change under a checkpoint,
    /// oldest first.
    journal: Vec<(RecoveryIndex, RecoveryNode)>,
    /// Nodes copied into the journal since the newest checkpoint.
    journaled: FxHashSet<RecoveryIndex>,
    /// Nodes from this index on are newer than the newest checkpoint.
    journal_floor: usize,
    live_checkpoints: u32,
}

impl RecoverySession {
    pub fn new(file_name: impl Into<String>, source_len: u32) -> Self {
        let file_name = file_name.into();
        let capacity = (source_len as usize / SOURCE_BYTES_PER_NODE + 1).min(MAX_NODE_PREALLOC);
        let mut nodes = Vec::with_capacity(capacity);

        let unit = CompilationUnit {
            file_name: file_name.clone(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            span: Span::new(0, source_len),
        };
        nodes.push(RecoveryNode::new(
            RecoveryIndex::NONE,
            0,
            RecoveryData::Unit(Box::new(UnitData {
                unit,
                types: Vec::new(),
                pending: PendingAttributes::new(),
            })),
        ));

        RecoverySession {
            nodes,
            active: RecoveryIndex::ROOT,
            diagnostics: Vec::new(),
            file_name,
            source_len,
            closure: None,
            journal: Vec::new(),
            journaled: FxHashSet::default(),
            journal_floor: 0,
            live_checkpoints: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn active(&self) -> RecoveryIndex {
        self.active
    }

    /// Node at `index`. Indexing a node that does not exist is a caller bug.
    #[inline]
    pub fn node(&self, index: RecoveryIndex) -> &RecoveryNode {
        &self.nodes[index.get()]
    }

    /// Every change to an existing node goes through here, so that a live
    /// checkpoint can restore it.
    #[inline]
    pub(crate) fn node_mut(&mut self, index: RecoveryIndex) -> &mut RecoveryNode {
        let slot = index.get();
        if self.live_checkpoints > 0 && slot < self.journal_floor && self.journaled.insert(index) {
            self.journal.push((index, self.nodes[slot].clone()));
        }
        &mut self.nodes[slot]
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Span of the active node's declaration as built so far.
    pub fn current_span(&self) -> Span {
        self.node(self.active).span()
    }

    pub fn span_of(&self, index: RecoveryIndex) -> Span {
        self.node(index).span()
    }

    pub fn balance_of(&self, index: RecoveryIndex) -> BracketBalance {
        self.node(index).balance
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Parent chain of the active node, innermost first, ending at the unit.
    pub fn active_chain(&self) -> Vec<RecoveryIndex> {
        let mut chain = Vec::new();
        let mut current = self.active;
        while current.is_some() {
            chain.push(current);
            current = self.node(current).parent;
        }
        chain
    }

    /// Innermost node that is still open, starting from the active node.
    pub(crate) fn innermost_open(&self) -> RecoveryIndex {
        let mut current = self.active;
        loop {
            let node = self.node(current);
            if node.is_open() || node.parent.is_none() {
                return current;
            }
            current = node.parent;
        }
    }

    /// The innermost open node when it is a field reading the braces of an
    /// array initializer.
    pub fn open_array_initializer(&self) -> Option<RecoveryIndex> {
        let index = self.innermost_open();
        let node = self.node(index);
        let RecoveryData::Field(d) = &node.data else {
            return None;
        };
        let reading = node.is_open()
            && !node.balance.is_zero()
            && !d.initializer_captured
            && matches!(
                d.decl.initialization,
                Some(Expression { kind: ExpressionKind::ArrayInitializer(_), .. })
            );
        reading.then_some(index)
    }

    /// Innermost open node that owns a pending attribute buffer.
    pub(crate) fn attribute_owner(&self) -> RecoveryIndex {
        let mut current = self.innermost_open();
        loop {
            let node = self.node(current);
            if node.pending().is_some() && node.is_open() {
                return current;
            }
            if node.parent.is_none() {
                return current;
            }
            current = node.parent;
        }
    }

    pub fn pending_attributes(&self) -> &PendingAttributes {
        let owner = self.attribute_owner();
        match self.node(owner).pending() {
            Some(pending) => pending,
            None => unreachable!("the unit node owns a pending buffer"),
        }
    }

    /// What the innermost open node expects to read next.
    pub fn reading_context(&self) -> ReadingContext {
        let mut current = self.innermost_open();
        loop {
            let node = self.node(current);
            match &node.data {
                RecoveryData::Unit(_) => return ReadingContext::Unit,
                RecoveryData::TypeBody(d) => {
                    return ReadingContext::TypeBody {
                        kind: d.decl.kind,
                        name: d.decl.name.clone(),
                        enum_constants: d.inside_enum_constants,
                    };
                }
                RecoveryData::Method(_) | RecoveryData::Initializer(_) => {
                    return ReadingContext::Executable {
                        body: current,
                        type_name: self.enclosing_type_name(current),
                    };
                }
                RecoveryData::Field(_) | RecoveryData::Statement(_) => current = node.parent,
            }
        }
    }

    fn enclosing_type_name(&self, from: RecoveryIndex) -> String {
        let mut current = from;
        while current.is_some() {
            let node = self.node(current);
            if let RecoveryData::TypeBody(d) = &node.data {
                return d.decl.name.clone();
            }
            current = node.parent;
        }
        String::new()
    }

    /// Innermost type body at or above `from`.
    pub(crate) fn enclosing_type_body(&self, from: RecoveryIndex) -> Option<RecoveryIndex> {
        let mut current = from;
        while current.is_some() {
            if self.node(current).kind() == RecoveryKind::TypeBody {
                return Some(current);
            }
            current = self.node(current).parent;
        }
        None
    }

    // =========================================================================
    // Diagnostics sink
    // =========================================================================

    /// Record an advisory problem. Recovery continues regardless.
    pub fn report_structural_problem(&mut self, problem: StructuralProblem, span: Span, args: &[&str]) {
        let span = if span.is_end_known() {
            span
        } else {
            Span::at(span.start)
        };
        self.diagnostics
            .push(Diagnostic::from_code(&self.file_name, span, problem.code(), args));
    }

    /// Record a diagnostic produced outside recovery (reader, scanner), so
    /// that checkpoints cover it too.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    // =========================================================================
    // Checkpoint / rollback
    // =========================================================================

    pub fn checkpoint(&mut self) -> RecoveryCheckpoint {
        debug!(
            active = ?self.active,
            nodes = self.nodes.len(),
            "recovery checkpoint"
        );
        self.live_checkpoints += 1;
        self.journal_floor = self.nodes.len();
        self.journaled.clear();
        RecoveryCheckpoint {
            node_count: self.nodes.len(),
            journal_len: self.journal.len(),
            active: self.active,
            diagnostics_len: self.diagnostics.len(),
            closure: self.closure,
        }
    }

    /// Restore the state saved by `checkpoint`. Nodes created since then are
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics if the checkpoint is newer than the current state.
    pub fn rollback(&mut self, checkpoint: RecoveryCheckpoint) {
        assert!(
            checkpoint.node_count <= self.nodes.len()
                && checkpoint.journal_len <= self.journal.len()
                && checkpoint.diagnostics_len <= self.diagnostics.len(),
            "rollback to a checkpoint taken from a newer recovery state"
        );
        debug!(
            active = ?checkpoint.active,
            dropped_nodes = self.nodes.len() - checkpoint.node_count,
            restored_nodes = self.journal.len() - checkpoint.journal_len,
            "recovery rollback"
        );
        // Newest copies first, so the oldest copy of a node is the one kept.
        while self.journal.len() > checkpoint.journal_len {
            if let Some((index, node)) = self.journal.pop() {
                if index.get() < checkpoint.node_count {
                    self.nodes[index.get()] = node;
                }
            }
        }
        self.nodes.truncate(checkpoint.node_count);
        self.active = checkpoint.active;
        self.diagnostics.truncate(checkpoint.diagnostics_len);
        self.closure = checkpoint.closure;
        self.journal_floor = checkpoint.node_count;
        self.release_checkpoint();
    }

    /// Keep everything done since `checkpoint` was taken.
    pub fn commit(&mut self, checkpoint: RecoveryCheckpoint) {
        debug!(nodes = checkpoint.node_count, "recovery commit");
        self.release_checkpoint();
    }

    fn release_checkpoint(&mut self) {
        self.journaled.clear();
        self.live_checkpoints = self.live_checkpoints.saturating_sub(1);
        if self.live_checkpoints == 0 {
            self.journal.clear();
        }
    }

    // =========================================================================
    // Arena
    // =========================================================================

    pub(crate) fn push_node(
        &mut self,
        parent: RecoveryIndex,
        balance: u32,
        data: RecoveryData,
    ) -> RecoveryIndex {
        let index = RecoveryIndex(self.nodes.len() as u32);
        self.nodes.push(RecoveryNode::new(parent, balance, data));
        index
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
