//! Absorption protocol.
//!
//! `absorb` offers a fragment to the active node. Each node either keeps it
//! (as a child, or by folding it into its own declaration) or hands it on:
//! upward when the fragment lies past its end or is a kind it cannot
//! contain, downward when a type body routes an anonymous type to the
//! method that is still open.

use super::attributes::PendingAttributes;
use super::node::{
    BodyData, FieldData, Fragment, RecoveryData, RecoveryIndex, RecoveryKind, TypeBodyData,
};
use super::session::{RecoverySession, StructuralProblem};
use crate::ast::{
    Expression, ExpressionKind, FieldDeclaration, FieldKind, MethodDeclaration, ModifierFlags,
    Statement, StatementKind, TypeDeclaration, TypeKind,
};
use jrec_common::Spanned;
use tracing::trace;

/// Outcome of offering a fragment to one node.
enum Absorbed {
    /// The fragment was placed or dropped; the index is the new active node.
    Done(RecoveryIndex),
    /// Offer the fragment to another node.
    Redirect(RecoveryIndex, Fragment),
}

impl RecoverySession {
    /// Offer `fragment` to the active node and return the node that is
    /// active afterwards.
    ///
    /// `bracket_balance` is the number of braces the reader has already
    /// consumed inside the fragment; it seeds the child node's balance.
    pub fn absorb(&mut self, fragment: Fragment, bracket_balance: u32) -> RecoveryIndex {
        let mut target = self.active;
        let mut fragment = fragment;
        loop {
            match self.absorb_into(target, fragment, bracket_balance) {
                Absorbed::Done(active) => {
                    self.active = active;
                    return active;
                }
                Absorbed::Redirect(next, item) => {
                    target = next;
                    fragment = item;
                }
            }
        }
    }

    fn absorb_into(
        &mut self,
        index: RecoveryIndex,
        fragment: Fragment,
        bracket_balance: u32,
    ) -> Absorbed {
        let node = self.node(index);
        let kind = node.kind();
        trace!(
            node = ?index,
            ?kind,
            item = fragment.kind_name(),
            start = fragment.start(),
            "absorb"
        );

        // Nothing past a known end belongs to the node.
        if kind != RecoveryKind::Unit && node.span().ends_before(fragment.start()) {
            trace!(node = ?index, parent = ?node.parent, "bubble past end");
            return Absorbed::Redirect(node.parent, fragment);
        }

        match kind {
            RecoveryKind::Unit => self.absorb_into_unit(index, fragment, bracket_balance),
            RecoveryKind::TypeBody => self.absorb_into_type_body(index, fragment, bracket_balance),
            RecoveryKind::Field => self.absorb_into_field(index, fragment, bracket_balance),
            RecoveryKind::Initializer | RecoveryKind::Method => {
                self.absorb_into_body(index, fragment, bracket_balance)
            }
            RecoveryKind::Statement => self.close_and_bubble(index, fragment),
        }
    }

    // =========================================================================
    // Per-variant acceptance
    // =========================================================================

    fn absorb_into_unit(
        &mut self,
        index: RecoveryIndex,
        fragment: Fragment,
        bracket_balance: u32,
    ) -> Absorbed {
        match fragment {
            Fragment::Package(mut package) => {
                let mut pending = self.take_pending_at(index);
                let mut modifiers = ModifierFlags::empty();
                pending.flush_into(&mut modifiers, &mut package.annotations, &mut package.span);
                if let RecoveryData::Unit(d) = &mut self.node_mut(index).data {
                    d.unit.package = Some(package);
                }
            }
            Fragment::Import(import) => {
                self.discard_pending_at(index, true);
                if let RecoveryData::Unit(d) = &mut self.node_mut(index).data {
                    d.unit.imports.push(import);
                }
            }
            Fragment::Type(ty) if ty.is_anonymous() => {
                let name = Fragment::Type(ty);
                self.orphan(index, &name, StructuralProblem::OrphanedAnonymousType);
            }
            Fragment::Type(ty) => {
                let child = self.adopt_type(index, ty, bracket_balance);
                if let RecoveryData::Unit(d) = &mut self.node_mut(index).data {
                    d.types.push(child);
                }
                return Absorbed::Done(self.active_after(child, index));
            }
            item @ (Fragment::Field(_) | Fragment::Method(_)) => {
                self.orphan(index, &item, StructuralProblem::DeclarationOutsideType);
            }
            item @ Fragment::Statement(_) => {
                self.orphan(index, &item, StructuralProblem::StatementOutsideBody);
            }
        }
        Absorbed::Done(index)
    }

    fn absorb_into_type_body(
        &mut self,
        index: RecoveryIndex,
        fragment: Fragment,
        bracket_balance: u32,
    ) -> Absorbed {
        match fragment {
            Fragment::Type(ty) if ty.is_anonymous() => {
                // Anonymous classes are local to executable code.
                let open_method = self
                    .type_body(index)
                    .methods
                    .last()
                    .copied()
                    .filter(|m| self.node(*m).is_open());
                self.discard_pending_at(index, false);
                match open_method {
                    Some(method) => {
                        trace!(from = ?index, to = ?method, "route anonymous type to open method");
                        Absorbed::Redirect(method, Fragment::Type(ty))
                    }
                    None => {
                        let item = Fragment::Type(ty);
                        self.orphan(index, &item, StructuralProblem::OrphanedAnonymousType);
                        Absorbed::Done(index)
                    }
                }
            }
            Fragment::Type(ty) => {
                self.type_body_mut(index).inside_enum_constants = false;
                self.note_implicit_brace(index);
                let child = self.adopt_type(index, ty, bracket_balance);
                self.type_body_mut(index).member_types.push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            Fragment::Field(field) => {
                match field.kind {
                    FieldKind::EnumConstant => {
                        if !self.type_body(index).inside_enum_constants {
                            self.report_structural_problem(
                                StructuralProblem::EnumConstantAfterMembers,
                                field.name_span,
                                &[&field.name],
                            );
                        }
                    }
                    FieldKind::Field | FieldKind::Initializer => {
                        self.type_body_mut(index).inside_enum_constants = false;
                    }
                }
                self.note_implicit_brace(index);
                let child = self.adopt_field(index, field, bracket_balance);
                self.type_body_mut(index).fields.push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            Fragment::Method(method) => {
                self.type_body_mut(index).inside_enum_constants = false;
                self.note_implicit_brace(index);
                let child = self.adopt_method(index, method, bracket_balance);
                self.type_body_mut(index).methods.push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            Fragment::Statement(statement) => {
                let local = self
                    .node(self.node(index).parent)
                    .kind()
                    .is_executable();
                if local && !self.type_body(index).decl.is_anonymous() {
                    // An unclosed local class ends where its method goes on.
                    self.close_and_bubble(index, Fragment::Statement(statement))
                } else {
                    let item = Fragment::Statement(statement);
                    self.orphan(index, &item, StructuralProblem::StatementOutsideBody);
                    Absorbed::Done(index)
                }
            }
            item @ (Fragment::Package(_) | Fragment::Import(_)) => self.close_and_bubble(index, item),
        }
    }

    fn absorb_into_field(
        &mut self,
        index: RecoveryIndex,
        fragment: Fragment,
        bracket_balance: u32,
    ) -> Absorbed {
        let (captured, field_span, constant, has_body) = {
            let d = self.field(index);
            (
                d.initializer_captured,
                d.decl.declaration_span,
                d.decl.kind == FieldKind::EnumConstant,
                !d.anonymous_types.is_empty(),
            )
        };
        match fragment {
            Fragment::Statement(Statement {
                kind: StatementKind::Expression(expression),
                span,
            }) if !captured && !constant => {
                trace!(node = ?index, end = span.end, "capture initializer");
                let d = self.field_mut(index);
                d.decl.initialization = Some(expression);
                d.initializer_captured = true;
                d.decl.declaration_span.close_at(span.end);
                Absorbed::Done(index)
            }
            Fragment::Type(ty)
                if ty.is_anonymous()
                    && !captured
                    && !(constant && has_body)
                    && (!field_span.is_end_known() || ty.start() < field_span.end) =>
            {
                let child = self.adopt_type(index, ty, bracket_balance);
                self.field_mut(index).anonymous_types.push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            item => self.close_and_bubble(index, item),
        }
    }

    fn absorb_into_body(
        &mut self,
        index: RecoveryIndex,
        fragment: Fragment,
        bracket_balance: u32,
    ) -> Absorbed {
        match fragment {
            Fragment::Field(field) if self.is_local_declaration(index, &field) => {
                self.note_implicit_brace(index);
                let child = self.adopt_field(index, field, bracket_balance);
                self.body_statements_mut(index).push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            Fragment::Statement(statement) => {
                self.note_implicit_brace(index);
                let child = self.adopt_statement(index, statement);
                self.body_statements_mut(index).push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            Fragment::Type(ty) => {
                self.note_implicit_brace(index);
                let child = self.adopt_type(index, ty, bracket_balance);
                self.body_statements_mut(index).push(child);
                Absorbed::Done(self.active_after(child, index))
            }
            item @ (Fragment::Field(_)
            | Fragment::Method(_)
            | Fragment::Import(_)
            | Fragment::Package(_)) => self.close_and_bubble(index, item),
        }
    }

    /// A field-shaped declaration is a local variable only if its modifiers
    /// (written or pending) are at most `final`, it is not typed `void`, and
    /// it is a plain field rather than a constant or initializer block.
    fn is_local_declaration(&self, index: RecoveryIndex, field: &FieldDeclaration) -> bool {
        if field.kind != FieldKind::Field {
            return false;
        }
        let pending = self
            .node(index)
            .pending()
            .map_or(ModifierFlags::empty(), PendingAttributes::modifiers);
        let modifiers = field.modifiers | pending;
        modifiers.difference(ModifierFlags::FINAL).is_empty()
            && field.ty.as_ref().is_some_and(|ty| !ty.is_void())
    }

    // =========================================================================
    // Shared steps
    // =========================================================================

    /// Close `index` just before the fragment and offer the fragment to the
    /// parent.
    fn close_and_bubble(&mut self, index: RecoveryIndex, fragment: Fragment) -> Absorbed {
        let parent = self.close_before(index, fragment.start());
        Absorbed::Redirect(parent, fragment)
    }

    /// Close `index` where something that is not its own starts (including
    /// the attributes waiting for it), move its pending attributes to the
    /// parent and return the parent.
    pub(crate) fn close_before(&mut self, index: RecoveryIndex, offset: u32) -> RecoveryIndex {
        let end = self.effective_start(index, offset);
        let node = self.node_mut(index);
        node.close_at(end);
        let parent = node.parent;
        let carried = node.pending_mut().map(std::mem::take);
        trace!(node = ?index, end, parent = ?parent, "closed before");

        if let Some(mut carried) = carried {
            if !carried.is_empty() {
                let owner = self.pending_owner_at(parent);
                if let Some(pending) = self.node_mut(owner).pending_mut() {
                    pending.merge_from(&mut carried);
                }
            }
        }
        parent
    }

    /// A node that had not seen its opening brace evidently has one once
    /// something arrives for its body.
    fn note_implicit_brace(&mut self, index: RecoveryIndex) {
        let node = self.node_mut(index);
        if !node.found_opening_brace {
            node.found_opening_brace = true;
            node.balance.increment();
            trace!(node = ?index, "implicit opening brace");
        }
    }

    fn orphan(&mut self, index: RecoveryIndex, item: &Fragment, problem: StructuralProblem) {
        trace!(node = ?index, item = item.kind_name(), ?problem, "orphaned");
        self.discard_pending_at(index, false);
        let span = item.span();
        let name = item.display_name();
        self.report_structural_problem(problem, span, &[&name]);
    }

    #[inline]
    fn active_after(&self, child: RecoveryIndex, parent: RecoveryIndex) -> RecoveryIndex {
        if self.node(child).is_open() {
            child
        } else {
            parent
        }
    }

    /// Where the fragment really starts: attributes waiting for it come first.
    pub(crate) fn effective_start(&self, index: RecoveryIndex, item_start: u32) -> u32 {
        let owner = self.pending_owner_at(index);
        self.node(owner)
            .pending()
            .and_then(PendingAttributes::start)
            .map_or(item_start, |start| start.min(item_start))
    }

    /// Nearest node at or above `index` that owns a pending buffer.
    pub(crate) fn pending_owner_at(&self, index: RecoveryIndex) -> RecoveryIndex {
        let mut current = index;
        loop {
            let node = self.node(current);
            if node.pending().is_some() || node.parent.is_none() {
                return current;
            }
            current = node.parent;
        }
    }

    pub(crate) fn take_pending_at(&mut self, index: RecoveryIndex) -> PendingAttributes {
        let owner = self.pending_owner_at(index);
        self.node_mut(owner)
            .pending_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Drop buffered attributes, optionally reporting them as lost.
    pub(crate) fn discard_pending_at(&mut self, index: RecoveryIndex, report: bool) {
        let pending = self.take_pending_at(index);
        if report {
            if let Some(span) = pending.span() {
                self.report_structural_problem(StructuralProblem::DiscardedAttributes, span, &[]);
            }
        }
    }

    // =========================================================================
    // Child creation
    // =========================================================================

    fn adopt_type(
        &mut self,
        parent: RecoveryIndex,
        mut decl: TypeDeclaration,
        bracket_balance: u32,
    ) -> RecoveryIndex {
        let mut pending = self.take_pending_for_child(parent);
        pending.flush_into(
            &mut decl.modifiers,
            &mut decl.annotations,
            &mut decl.declaration_span,
        );
        let inside_enum_constants = decl.kind == TypeKind::Enum;
        self.push_node(
            parent,
            bracket_balance,
            RecoveryData::TypeBody(Box::new(TypeBodyData {
                decl,
                member_types: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                inside_enum_constants,
                pending: PendingAttributes::new(),
            })),
        )
    }

    fn adopt_field(
        &mut self,
        parent: RecoveryIndex,
        mut decl: FieldDeclaration,
        bracket_balance: u32,
    ) -> RecoveryIndex {
        let mut pending = self.take_pending_for_child(parent);
        pending.flush_into(
            &mut decl.modifiers,
            &mut decl.annotations,
            &mut decl.declaration_span,
        );
        let data = if decl.kind == FieldKind::Initializer {
            RecoveryData::Initializer(Box::new(BodyData {
                decl,
                statements: Vec::new(),
                pending: PendingAttributes::new(),
            }))
        } else {
            // The argument list of an enum constant still takes a body.
            let initializer_captured = match &decl.initialization {
                Some(Expression {
                    kind: ExpressionKind::Allocation(allocation),
                    ..
                }) if decl.kind == FieldKind::EnumConstant => allocation.anonymous_type.is_some(),
                value => value.is_some(),
            };
            RecoveryData::Field(Box::new(FieldData {
                decl,
                anonymous_types: Vec::new(),
                initializer_captured,
            }))
        };
        self.push_node(parent, bracket_balance, data)
    }

    fn adopt_method(
        &mut self,
        parent: RecoveryIndex,
        mut decl: MethodDeclaration,
        bracket_balance: u32,
    ) -> RecoveryIndex {
        let mut pending = self.take_pending_for_child(parent);
        pending.flush_into(
            &mut decl.modifiers,
            &mut decl.annotations,
            &mut decl.declaration_span,
        );
        self.push_node(
            parent,
            bracket_balance,
            RecoveryData::Method(Box::new(BodyData {
                decl,
                statements: Vec::new(),
                pending: PendingAttributes::new(),
            })),
        )
    }

    fn adopt_statement(&mut self, parent: RecoveryIndex, statement: Statement) -> RecoveryIndex {
        // Statements take no modifiers.
        self.discard_pending_at(parent, true);
        self.push_node(parent, 0, RecoveryData::Statement(Box::new(statement)))
    }

    /// The parent's own buffer; fields have none, so their anonymous
    /// initializer types start clean.
    fn take_pending_for_child(&mut self, parent: RecoveryIndex) -> PendingAttributes {
        self.node_mut(parent)
            .pending_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    pub(crate) fn type_body(&self, index: RecoveryIndex) -> &TypeBodyData {
        match &self.node(index).data {
            RecoveryData::TypeBody(d) => d,
            _ => panic!("recovery node {index:?} is not a type body"),
        }
    }

    pub(crate) fn type_body_mut(&mut self, index: RecoveryIndex) -> &mut TypeBodyData {
        match &mut self.node_mut(index).data {
            RecoveryData::TypeBody(d) => d,
            _ => panic!("recovery node {index:?} is not a type body"),
        }
    }

    pub(crate) fn field(&self, index: RecoveryIndex) -> &FieldData {
        match &self.node(index).data {
            RecoveryData::Field(d) => d,
            _ => panic!("recovery node {index:?} is not a field"),
        }
    }

    pub(crate) fn field_mut(&mut self, index: RecoveryIndex) -> &mut FieldData {
        match &mut self.node_mut(index).data {
            RecoveryData::Field(d) => d,
            _ => panic!("recovery node {index:?} is not a field"),
        }
    }

    fn body_statements_mut(&mut self, index: RecoveryIndex) -> &mut Vec<RecoveryIndex> {
        match &mut self.node_mut(index).data {
            RecoveryData::Method(d) => &mut d.statements,
            RecoveryData::Initializer(d) => &mut d.statements,
            _ => panic!("recovery node {index:?} has no executable body"),
        }
    }
}

#[cfg(test)]
#[path = "tests/absorb_tests.rs"]
mod tests;
