//! Token-level events: braces, semicolons, modifiers and annotation names.
//!
//! Events go to the innermost open node. A node that cannot own the token
//! closes (where the token starts) and passes the event to its parent.

use super::balance::BalanceChange;
use super::node::{RecoveryData, RecoveryIndex, RecoveryKind};
use super::session::{RecoverySession, StructuralProblem};
use crate::ast::{Annotation, Expression, ExpressionKind, FieldKind, ModifierFlags};
use jrec_common::Span;
use tracing::trace;

impl RecoverySession {
    /// A `{` was consumed at `offset`.
    pub fn opening_brace_consumed(&mut self, offset: u32) {
        let mut index = self.innermost_open();
        loop {
            trace!(node = ?index, offset, "opening brace");
            let node = self.node_mut(index);
            match node.kind() {
                RecoveryKind::Unit => {
                    self.active = index;
                    self.report_structural_problem(
                        StructuralProblem::UnexpectedOpeningBrace,
                        Span::new(offset, offset + 1),
                        &[],
                    );
                    return;
                }
                RecoveryKind::TypeBody | RecoveryKind::Method | RecoveryKind::Initializer => {
                    if !node.found_opening_brace {
                        node.found_opening_brace = true;
                        node.set_body_start(offset);
                    }
                    node.balance.increment();
                    self.active = index;
                    return;
                }
                RecoveryKind::Field => {
                    if self.field_takes_brace(index) {
                        self.node_mut(index).balance.increment();
                        self.start_array_value(index, offset);
                        self.active = index;
                        return;
                    }
                    index = self.close_before(index, offset);
                }
                RecoveryKind::Statement => {
                    index = self.close_before(index, offset);
                }
            }
        }
    }

    /// A `}` was consumed at `offset`.
    pub fn closing_brace_consumed(&mut self, offset: u32) {
        let end = offset + 1;
        let mut index = self.innermost_open();
        loop {
            trace!(node = ?index, offset, "closing brace");
            let node = self.node_mut(index);
            match node.kind() {
                RecoveryKind::Unit => {
                    self.active = index;
                    self.report_structural_problem(
                        StructuralProblem::UnexpectedClosingBrace,
                        Span::new(offset, end),
                        &[],
                    );
                    return;
                }
                RecoveryKind::TypeBody | RecoveryKind::Method | RecoveryKind::Initializer => {
                    if !node.found_opening_brace {
                        // Not this node's brace: it belongs to an enclosing body.
                        index = self.close_before(index, offset);
                        continue;
                    }
                    match node.balance.decrement() {
                        BalanceChange::Open => {
                            self.active = index;
                        }
                        BalanceChange::Closed | BalanceChange::Underflow => {
                            node.close_at(end);
                            let parent = node.parent;
                            trace!(node = ?index, end, "closed by brace");
                            self.discard_pending_at(index, true);
                            self.active = self.close_constant_with_body(parent, end);
                        }
                    }
                    return;
                }
                RecoveryKind::Field => {
                    match node.balance.decrement() {
                        BalanceChange::Open => {
                            self.active = index;
                        }
                        BalanceChange::Closed => {
                            let parent = node.parent;
                            let d = self.field_mut(index);
                            if d.decl.kind == FieldKind::EnumConstant {
                                d.decl.declaration_span.close_at(end);
                                self.active = parent;
                            } else {
                                d.initializer_captured = true;
                                if let Some(Expression {
                                    kind: ExpressionKind::ArrayInitializer(_),
                                    span,
                                }) = d.decl.initialization.as_mut()
                                {
                                    span.end = span.end.max(end);
                                }
                                self.active = index;
                            }
                        }
                        BalanceChange::Underflow => {
                            index = self.close_before(index, offset);
                            continue;
                        }
                    }
                    return;
                }
                RecoveryKind::Statement => {
                    index = self.close_before(index, offset);
                }
            }
        }
    }

    /// A `;` was consumed at `offset`.
    pub fn semicolon_consumed(&mut self, offset: u32) {
        if let Some(body) = self.enclosing_type_body(self.active) {
            self.type_body_mut(body).inside_enum_constants = false;
        }

        let index = self.active;
        let node = self.node_mut(index);
        let terminates = match node.kind() {
            RecoveryKind::Field => node.balance.is_zero(),
            RecoveryKind::Statement => true,
            _ => false,
        };
        if terminates {
            node.close_at(offset + 1);
            let parent = node.parent;
            trace!(node = ?index, end = offset + 1, "terminated by semicolon");
            self.active = parent;
        }
    }

    /// An element of the array initializer that the innermost open field is
    /// reading. Nested braces that did not balance flatten into the same
    /// value.
    pub fn array_element_read(&mut self, element: Expression) {
        let Some(index) = self.open_array_initializer() else {
            return;
        };
        trace!(node = ?index, start = element.span.start, "array element");
        let d = self.field_mut(index);
        if let Some(Expression {
            kind: ExpressionKind::ArrayInitializer(elements),
            span,
        }) = d.decl.initialization.as_mut()
        {
            span.end = span.end.max(element.span.end);
            elements.push(element);
        }
    }

    /// End the array initializer of the innermost open field at `end`,
    /// braces still open or not. The field's parent becomes active.
    pub fn end_array_initializer(&mut self, end: u32) {
        let Some(index) = self.open_array_initializer() else {
            return;
        };
        self.field_mut(index).initializer_captured = true;
        let node = self.node_mut(index);
        node.close_at(end);
        let parent = node.parent;
        trace!(node = ?index, end, "array initializer ended");
        self.active = parent;
    }

    /// A modifier keyword was consumed at `offset`.
    pub fn modifier_seen(&mut self, flag: ModifierFlags, offset: u32) {
        let owner = self.attribute_owner();
        trace!(node = ?owner, ?flag, offset, "modifier");
        if let Some(pending) = self.node_mut(owner).pending_mut() {
            pending.add_modifier(flag, offset);
        }
    }

    /// An annotation name was read; `range` covers `@` through the name.
    pub fn annotation_name_started(&mut self, name: &str, range: Span) {
        let owner = self.attribute_owner();
        trace!(node = ?owner, name, "annotation");
        if let Some(pending) = self.node_mut(owner).pending_mut() {
            pending.add_annotation(Annotation {
                type_name: name.to_string(),
                span: range,
            });
        }
    }

    /// Drop buffered attributes without reporting them, for a declaration
    /// the reader skips on purpose.
    pub fn discard_pending_attributes(&mut self) {
        let owner = self.attribute_owner();
        if let Some(pending) = self.node_mut(owner).pending_mut() {
            pending.clear();
        }
    }

    /// Mark the end of reading: nodes still open are closed at `offset` by
    /// finalization rather than at end of input.
    pub fn abandon_at(&mut self, offset: u32) {
        trace!(offset, "recovery abandoned");
        self.closure = Some(offset.min(self.source_len));
    }

    /// The first `{` of an array field's initializer starts its value.
    fn start_array_value(&mut self, index: RecoveryIndex, offset: u32) {
        let d = self.field_mut(index);
        if d.decl.kind == FieldKind::Field && d.decl.initialization.is_none() {
            d.decl.initialization = Some(Expression::new(
                ExpressionKind::ArrayInitializer(Vec::new()),
                Span::new(offset, offset + 1),
            ));
        }
    }

    /// An enum constant ends where its body does. Returns the node that is
    /// active afterwards.
    fn close_constant_with_body(&mut self, parent: RecoveryIndex, end: u32) -> RecoveryIndex {
        let node = self.node(parent);
        let RecoveryData::Field(d) = &node.data else {
            return parent;
        };
        if d.decl.kind != FieldKind::EnumConstant || !node.balance.is_zero() {
            return parent;
        }
        let enum_body = node.parent;
        self.node_mut(parent).close_at(end);
        trace!(node = ?parent, end, "enum constant closed with its body");
        enum_body
    }

    /// A field takes a `{` only while it can still be the start of its
    /// initializer value: an array initializer or an enum constant body.
    fn field_takes_brace(&self, index: RecoveryIndex) -> bool {
        let node = self.node(index);
        if !node.balance.is_zero() {
            return true;
        }
        let RecoveryData::Field(d) = &node.data else {
            return false;
        };
        if d.initializer_captured || d.decl.declaration_span.is_end_known() {
            return false;
        }
        match (&d.decl.ty, d.decl.kind) {
            (Some(ty), FieldKind::Field) => ty.is_array() && d.decl.initialization.is_none(),
            (None, FieldKind::EnumConstant) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
