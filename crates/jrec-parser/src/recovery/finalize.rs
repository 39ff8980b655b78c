//! Finalization: fold the recovery arena into a `CompilationUnit`.
//!
//! Children are folded before their parents so a parent can use its
//! children's ends as evidence for its own. Declarations still open get an
//! end from, in order: the last known end of a child, the offset at which
//! recovery was abandoned, the end of input. Type bodies then receive the
//! members implied by the language (class initializer, default constructor).

use super::node::{
    FieldData, InitializerData, MethodData, RecoveryData, RecoveryIndex, RecoveryKind,
    RecoveryNode, TypeBodyData, UnitData,
};
use super::session::{RecoveryResult, RecoverySession, StructuralProblem};
use crate::ast::{
    AllocationExpression, Block, CompilationUnit, DeclarationBits, Expression, ExpressionKind,
    FieldDeclaration, FieldKind, MethodDeclaration, MethodKind, ModifierFlags, Statement,
    StatementKind, TypeDeclaration, TypeKind, TypeReference,
};
use jrec_common::diagnostics::Diagnostic;
use jrec_common::limits::MAX_RECOVERY_DEPTH;
use jrec_common::{Span, Spanned};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

impl RecoverySession {
    /// Build the complete tree from the current recovery state.
    ///
    /// The session is left untouched, so finalizing twice gives the same
    /// tree and reading may continue afterwards.
    pub fn finalize(&self) -> CompilationUnit {
        Finalizer::new(self).finish().0
    }

    /// Finalize as if reading stopped at the token starting at `offset`.
    pub fn finalize_at(&mut self, offset: u32) -> CompilationUnit {
        self.abandon_at(offset);
        self.finalize()
    }

    /// Finalize and collect every diagnostic, including those found while
    /// finalizing, without consuming the session.
    pub fn finalize_with_diagnostics(&self) -> RecoveryResult {
        let (unit, found) = Finalizer::new(self).finish();
        assemble(unit, self.diagnostics.clone(), found)
    }

    /// Finalize and hand out the tree together with every diagnostic.
    pub fn freeze(self) -> RecoveryResult {
        let (unit, found) = Finalizer::new(&self).finish();
        assemble(unit, self.diagnostics, found)
    }
}

fn assemble(
    unit: CompilationUnit,
    mut diagnostics: Vec<Diagnostic>,
    found: Vec<Diagnostic>,
) -> RecoveryResult {
    diagnostics.extend(found);
    diagnostics.sort_by_key(|d| d.start);
    debug!(
        types = unit.types.len(),
        diagnostics = diagnostics.len(),
        "recovery finalized"
    );
    RecoveryResult { unit, diagnostics }
}

/// Result of folding one node.
enum Folded {
    Type(TypeDeclaration),
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Statement(Statement),
}

struct Finalizer<'a> {
    session: &'a RecoverySession,
    /// End assigned to open declarations without child evidence.
    fallback_end: u32,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Finalizer<'a> {
    fn new(session: &'a RecoverySession) -> Self {
        Finalizer {
            session,
            fallback_end: session.closure.unwrap_or(session.source_len),
            diagnostics: Vec::new(),
        }
    }

    fn finish(mut self) -> (CompilationUnit, Vec<Diagnostic>) {
        let session = self.session;
        let unit = match &session.node(RecoveryIndex::ROOT).data {
            RecoveryData::Unit(d) => self.fold_unit(d),
            _ => panic!("recovery arena root is not a unit"),
        };
        (unit, self.diagnostics)
    }

    fn report(&mut self, problem: StructuralProblem, span: Span, args: &[&str]) {
        let span = if span.is_end_known() {
            span
        } else {
            Span::at(span.start)
        };
        self.diagnostics.push(Diagnostic::from_code(
            &self.session.file_name,
            span,
            problem.code(),
            args,
        ));
    }

    fn fold_unit(&mut self, d: &UnitData) -> CompilationUnit {
        let mut unit = d.unit.clone();
        for &child in &d.types {
            if let Folded::Type(ty) = self.fold(child, 1) {
                unit.types.push(ty);
            }
        }
        if let Some(span) = d.pending.span() {
            self.report(StructuralProblem::DiscardedAttributes, span, &[]);
        }
        unit
    }

    fn fold(&mut self, index: RecoveryIndex, depth: u32) -> Folded {
        let session = self.session;
        let node = session.node(index);
        let descend = depth < MAX_RECOVERY_DEPTH;
        if !descend {
            trace!(node = ?index, depth, "recovery depth limit, children not folded");
        }
        match &node.data {
            RecoveryData::TypeBody(d) => Folded::Type(self.fold_type(node, d, depth, descend)),
            RecoveryData::Field(d) => Folded::Field(self.fold_field(d, depth, descend)),
            RecoveryData::Initializer(d) => {
                Folded::Field(self.fold_initializer(node, d, depth, descend))
            }
            RecoveryData::Method(d) => Folded::Method(self.fold_method(node, d, depth, descend)),
            RecoveryData::Statement(s) => {
                let mut statement = (**s).clone();
                statement.span.close_at(self.fallback_end);
                Folded::Statement(statement)
            }
            RecoveryData::Unit(_) => panic!("unit node {index:?} nested in the recovery tree"),
        }
    }

    /// Assign the end of an open declaration; returns whether it was open.
    fn resolve_end(&self, span: &mut Span, child_end: Option<u32>) -> bool {
        if span.is_end_known() {
            return false;
        }
        span.close_at(child_end.unwrap_or(self.fallback_end));
        true
    }

    fn report_unclosed(&mut self, node: &RecoveryNode, span: Span, name: &str) {
        if let Some(pending) = node.pending().and_then(|p| p.span()) {
            self.report(StructuralProblem::DiscardedAttributes, pending, &[]);
        }
        self.report(
            StructuralProblem::MissingClosingBrace,
            Span::at(span.end),
            &[name],
        );
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn fold_type(
        &mut self,
        node: &RecoveryNode,
        d: &TypeBodyData,
        depth: u32,
        descend: bool,
    ) -> TypeDeclaration {
        let mut decl = d.decl.clone();
        match self.session.node(node.parent).kind() {
            RecoveryKind::Unit => {}
            RecoveryKind::TypeBody => decl.bits |= DeclarationBits::IS_MEMBER,
            RecoveryKind::Field
            | RecoveryKind::Initializer
            | RecoveryKind::Method
            | RecoveryKind::Statement => decl.bits |= DeclarationBits::IS_LOCAL,
        }

        if descend {
            for &child in &d.member_types {
                if let Folded::Type(mut ty) = self.fold(child, depth + 1) {
                    ty.bits |= DeclarationBits::IS_MEMBER;
                    decl.member_types.push(ty);
                }
            }
            for &child in &d.fields {
                if let Folded::Field(field) = self.fold(child, depth + 1) {
                    decl.fields.push(field);
                }
            }
            for &child in &d.methods {
                if let Folded::Method(method) = self.fold(child, depth + 1) {
                    decl.methods.push(method);
                }
            }
        }

        let child_end = decl
            .member_types
            .iter()
            .map(Spanned::span)
            .chain(decl.fields.iter().map(Spanned::span))
            .chain(decl.methods.iter().map(Spanned::span))
            .filter_map(|s| s.known_end())
            .max();
        if self.resolve_end(&mut decl.declaration_span, child_end) {
            decl.bits |= DeclarationBits::END_INFERRED;
            let name = type_display_name(&decl);
            self.report_unclosed(node, decl.declaration_span, &name);
        }

        if needs_class_initializer(&decl) {
            let clinit = class_initializer(&decl);
            decl.methods.insert(0, clinit);
        }
        self.reconcile_default_constructor(&mut decl);
        self.report_duplicate_members(&decl);
        decl
    }

    /// Exactly one constructor survives for a concrete named class or enum:
    /// the explicit ones if any exist, otherwise a single default.
    fn reconcile_default_constructor(&mut self, decl: &mut TypeDeclaration) {
        if !matches!(decl.kind, TypeKind::Class | TypeKind::Enum) || decl.allocation.is_some() {
            return;
        }
        let has_explicit = decl
            .methods
            .iter()
            .any(|m| m.is_constructor() && !m.is_default_constructor());
        if has_explicit {
            decl.methods.retain(|m| !m.is_default_constructor());
            return;
        }

        let placeholders: Vec<usize> = decl
            .methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_default_constructor())
            .map(|(i, _)| i)
            .collect();
        if placeholders.is_empty() {
            let ctor = default_constructor(decl);
            decl.methods.insert(0, ctor);
            return;
        }
        for &i in placeholders[1..].iter().rev() {
            let removed = decl.methods.remove(i);
            self.report(
                StructuralProblem::DuplicateDefaultConstructor,
                removed.name_span,
                &[&decl.name],
            );
        }
    }

    fn report_duplicate_members(&mut self, decl: &TypeDeclaration) {
        let mut problems: Vec<(StructuralProblem, Span, String, String)> = Vec::new();

        let mut fields: FxHashSet<&str> = FxHashSet::default();
        for field in &decl.fields {
            if field.kind == FieldKind::Initializer || field.name.is_empty() {
                continue;
            }
            if !fields.insert(field.name.as_str()) {
                problems.push((
                    StructuralProblem::DuplicateField,
                    field.name_span,
                    field.name.clone(),
                    String::new(),
                ));
            }
        }

        let mut methods: FxHashSet<(&str, usize)> = FxHashSet::default();
        for method in &decl.methods {
            if method.kind == MethodKind::Clinit || method.is_default_constructor() {
                continue;
            }
            if !methods.insert((method.name.as_str(), method.parameters.len())) {
                problems.push((
                    StructuralProblem::DuplicateMethod,
                    method.name_span,
                    method.name.clone(),
                    method.parameters.len().to_string(),
                ));
            }
        }

        for (problem, span, name, arity) in problems {
            self.report(problem, span, &[&name, &arity]);
        }
    }

    // =========================================================================
    // Fields and initializers
    // =========================================================================

    fn fold_field(&mut self, d: &FieldData, depth: u32, descend: bool) -> FieldDeclaration {
        let mut decl = d.decl.clone();
        let mut anonymous = Vec::new();
        if descend {
            for &child in &d.anonymous_types {
                if let Folded::Type(ty) = self.fold(child, depth + 1) {
                    anonymous.push(ty);
                }
            }
        }
        if !anonymous.is_empty() {
            decl.bits |= DeclarationBits::HAS_LOCAL_TYPE;
            attach_anonymous_types(&mut decl, anonymous);
        }

        let child_end = decl
            .initialization
            .as_ref()
            .and_then(|e| e.span.known_end());
        if self.resolve_end(&mut decl.declaration_span, child_end) {
            decl.bits |= DeclarationBits::END_INFERRED;
        }
        decl
    }

    fn fold_initializer(
        &mut self,
        node: &RecoveryNode,
        d: &InitializerData,
        depth: u32,
        descend: bool,
    ) -> FieldDeclaration {
        let mut decl = d.decl.clone();
        let statements = if descend {
            self.fold_body_statements(&d.statements, depth)
        } else {
            Vec::new()
        };
        if statements.iter().any(declares_type) {
            decl.bits |= DeclarationBits::HAS_LOCAL_TYPE;
        }

        let child_end = statements.iter().filter_map(|s| s.span.known_end()).max();
        if self.resolve_end(&mut decl.declaration_span, child_end) {
            decl.bits |= DeclarationBits::END_INFERRED;
            self.report_unclosed(node, decl.declaration_span, "initializer");
        }

        let Span { start, end } = decl.declaration_span;
        let block = decl.block.get_or_insert_with(|| Block::empty(Span::open(start)));
        block.statements.extend(statements);
        block.span.close_at(end);
        decl
    }

    // =========================================================================
    // Methods
    // =========================================================================

    fn fold_method(
        &mut self,
        node: &RecoveryNode,
        d: &MethodData,
        depth: u32,
        descend: bool,
    ) -> MethodDeclaration {
        let mut decl = d.decl.clone();
        let statements = if descend {
            self.fold_body_statements(&d.statements, depth)
        } else {
            Vec::new()
        };
        if statements.iter().any(declares_type) {
            decl.bits |= DeclarationBits::HAS_LOCAL_TYPE;
        }

        let child_end = statements.iter().filter_map(|s| s.span.known_end()).max();
        if self.resolve_end(&mut decl.declaration_span, child_end) {
            decl.bits |= DeclarationBits::END_INFERRED;
            let name = decl.name.clone();
            self.report_unclosed(node, decl.declaration_span, &name);
        }

        let end = decl.declaration_span.end;
        // A header read without its body still gets one.
        if decl.body.is_none() && (node.created_open || !statements.is_empty()) {
            decl.body = Some(Block::empty(Span::open(end)));
        }
        if let Some(body) = decl.body.as_mut() {
            body.statements.extend(statements);
            body.span.close_at(end);
        }
        decl
    }

    fn fold_body_statements(&mut self, children: &[RecoveryIndex], depth: u32) -> Vec<Statement> {
        let mut statements = Vec::with_capacity(children.len());
        for &child in children {
            let statement = match self.fold(child, depth + 1) {
                Folded::Statement(statement) => statement,
                Folded::Field(field) if field.kind == FieldKind::Initializer => {
                    let span = field.declaration_span;
                    let block = field.block.unwrap_or_else(|| Block::empty(span));
                    Statement::new(StatementKind::Block(block), span)
                }
                Folded::Field(field) => {
                    let span = field.declaration_span;
                    Statement::new(StatementKind::LocalDeclaration(Box::new(field)), span)
                }
                Folded::Type(ty) if ty.is_anonymous() => {
                    let expression = allocation_of(ty);
                    let span = expression.span;
                    Statement::new(StatementKind::Expression(expression), span)
                }
                Folded::Type(ty) => {
                    let span = ty.declaration_span;
                    Statement::new(StatementKind::LocalType(Box::new(ty)), span)
                }
                Folded::Method(method) => {
                    trace!(name = %method.name, "method folded inside a body dropped");
                    continue;
                }
            };
            statements.push(statement);
        }
        statements
    }
}

// =============================================================================
// Synthesis helpers
// =============================================================================

fn type_display_name(decl: &TypeDeclaration) -> String {
    match &decl.allocation {
        Some(header) => format!("new {}()", header.ty.to_source()),
        None => decl.name.clone(),
    }
}

fn declares_type(statement: &Statement) -> bool {
    match &statement.kind {
        StatementKind::LocalType(_) => true,
        StatementKind::Expression(e) => {
            matches!(&e.kind, ExpressionKind::Allocation(a) if a.anonymous_type.is_some())
        }
        StatementKind::LocalDeclaration(f) => f.bits.contains(DeclarationBits::HAS_LOCAL_TYPE),
        _ => false,
    }
}

/// A static field that is not a compile-time constant, or a static
/// initializer block, needs `<clinit>`.
fn needs_class_initializer(decl: &TypeDeclaration) -> bool {
    if decl.methods.iter().any(|m| m.kind == MethodKind::Clinit) {
        return false;
    }
    let implicit = decl.kind.is_interface_like();
    decl.fields.iter().any(|field| match field.kind {
        FieldKind::Initializer => field.is_static(),
        FieldKind::EnumConstant => true,
        FieldKind::Field => {
            let is_static = implicit || field.is_static();
            let is_final = implicit || field.modifiers.contains(ModifierFlags::FINAL);
            let constant =
                is_final && field.initialization.as_ref().is_some_and(Expression::is_literal);
            is_static && !constant
        }
    })
}

fn class_initializer(decl: &TypeDeclaration) -> MethodDeclaration {
    let at = Span::at(decl.declaration_span.start);
    let mut clinit = MethodDeclaration::new(MethodKind::Clinit, "<clinit>", at);
    clinit.modifiers = ModifierFlags::STATIC;
    clinit.body = Some(Block::empty(at));
    clinit
}

fn default_constructor(decl: &TypeDeclaration) -> MethodDeclaration {
    let at = Span::at(decl.declaration_span.start);
    let mut ctor = MethodDeclaration::new(MethodKind::Constructor, decl.name.clone(), at);
    ctor.name_span = decl.name_span;
    ctor.modifiers = if decl.kind == TypeKind::Enum {
        ModifierFlags::PRIVATE
    } else {
        decl.modifiers & ModifierFlags::VISIBILITY
    };
    ctor.bits = DeclarationBits::IS_DEFAULT_CONSTRUCTOR;
    let statements = if decl.kind == TypeKind::Class {
        vec![Statement::new(
            StatementKind::ExplicitConstructorCall {
                is_super: true,
                arguments: Vec::new(),
            },
            at,
        )]
    } else {
        Vec::new()
    };
    ctor.body = Some(Block {
        statements,
        span: at,
    });
    ctor
}

/// `new T(args) { body }` as an expression.
fn allocation_of(ty: TypeDeclaration) -> Expression {
    let (alloc_ty, arguments, start) = match &ty.allocation {
        Some(header) => (header.ty.clone(), header.arguments.clone(), header.start),
        None => (
            TypeReference {
                name: ty.name.clone(),
                dimensions: 0,
                span: ty.name_span,
            },
            Vec::new(),
            ty.declaration_span.start,
        ),
    };
    let span = Span::new(start, ty.declaration_span.end.max(start));
    Expression::new(
        ExpressionKind::Allocation(Box::new(AllocationExpression {
            ty: alloc_ty,
            arguments,
            anonymous_type: Some(ty),
        })),
        span,
    )
}

/// Anonymous types captured by a field become its initializer value: a
/// single allocation, or an array initializer of several. An array value
/// read element by element takes them in source order. An enum constant
/// keeps its argument list and takes the body.
fn attach_anonymous_types(decl: &mut FieldDeclaration, mut types: Vec<TypeDeclaration>) {
    if decl.kind == FieldKind::EnumConstant {
        let body = types.swap_remove(0);
        let body_end = body.declaration_span.end;
        match decl.initialization.as_mut() {
            Some(Expression {
                kind: ExpressionKind::Allocation(allocation),
                span,
            }) if allocation.anonymous_type.is_none() => {
                allocation.anonymous_type = Some(body);
                span.end = span.end.max(body_end);
            }
            _ => decl.initialization = Some(allocation_of(body)),
        }
        return;
    }
    match decl.initialization.as_mut() {
        Some(Expression {
            kind: ExpressionKind::ArrayInitializer(elements),
            span,
        }) => {
            for ty in types {
                let allocation = allocation_of(ty);
                span.end = span.end.max(allocation.span.end);
                elements.push(allocation);
            }
            elements.sort_by_key(|e| e.span.start);
            return;
        }
        Some(_) => return,
        None => {}
    }
    let mut allocations: Vec<Expression> = types.into_iter().map(allocation_of).collect();
    let value = if allocations.len() == 1 {
        allocations.swap_remove(0)
    } else {
        let start = allocations.first().map_or(0, |e| e.span.start);
        let end = allocations.last().map_or(start, |e| e.span.end);
        Expression::new(ExpressionKind::ArrayInitializer(allocations), Span::new(start, end))
    };
    decl.initialization = Some(value);
}

#[cfg(test)]
#[path = "tests/finalize_tests.rs"]
mod tests;
