use super::*;
use crate::ast::{AllocationHeader, Argument};
use crate::recovery::node::Fragment;
use jrec_common::diagnostics::diagnostic_codes;

// =============================================================================
// Builders
// =============================================================================

fn type_ref(name: &str, at: u32) -> TypeReference {
    TypeReference {
        name: name.to_string(),
        dimensions: 0,
        span: Span::new(at, at + name.len() as u32),
    }
}

fn open_type(session: &mut RecoverySession, kind: TypeKind, name: &str, start: u32) -> RecoveryIndex {
    let mut decl = TypeDeclaration::new(kind, name, Span::open(start));
    decl.name_span = Span::new(start + 6, start + 6 + name.len() as u32);
    session.absorb(Fragment::Type(decl), 1)
}

fn field(name: &str, span: Span) -> FieldDeclaration {
    FieldDeclaration::new(name, type_ref("int", span.start), span)
}

fn literal(text: &str, at: u32) -> Expression {
    Expression::new(
        ExpressionKind::Literal(text.to_string()),
        Span::new(at, at + text.len() as u32),
    )
}

fn method(name: &str, span: Span) -> MethodDeclaration {
    let mut decl = MethodDeclaration::new(MethodKind::Method, name, span);
    decl.return_type = Some(type_ref("void", span.start));
    decl
}

fn anonymous(ty: &str, start: u32) -> Fragment {
    Fragment::Type(TypeDeclaration::anonymous(AllocationHeader {
        ty: type_ref(ty, start + 4),
        arguments: Vec::new(),
        start,
    }))
}

fn codes(result: &RecoveryResult) -> Vec<u32> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

// =============================================================================
// Ends
// =============================================================================

#[test]
fn empty_session_yields_an_empty_unit() {
    let session = RecoverySession::new("A.java", 12);
    let unit = session.finalize();
    assert_eq!(unit.file_name, "A.java");
    assert_eq!(unit.span, Span::new(0, 12));
    assert!(unit.types.is_empty());
    assert!(unit.package.is_none());
}

#[test]
fn open_type_ends_at_end_of_input() {
    let mut session = RecoverySession::new("A.java", 50);
    open_type(&mut session, TypeKind::Class, "A", 0);

    let result = session.freeze();
    let ty = &result.unit.types[0];
    assert_eq!(ty.declaration_span, Span::new(0, 50));
    assert!(ty.bits.contains(DeclarationBits::END_INFERRED));
    assert_eq!(codes(&result), vec![diagnostic_codes::MISSING_CLOSING_BRACE]);
    assert_eq!(result.diagnostics[0].message_text, "'}' expected to complete 'A'.");
}

#[test]
fn open_type_ends_after_its_last_member() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Field(field("x", Span::new(10, 16))), 0);
    session.absorb(Fragment::Method(method("m", Span::new(20, 32))), 0);

    let unit = session.finalize();
    assert_eq!(unit.types[0].declaration_span, Span::new(0, 32));
}

#[test]
fn finalize_at_closes_open_nodes_at_the_given_offset() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0);
    let mut run = method("run", Span::open(10));
    run.body = None;
    session.absorb(Fragment::Method(run), 1);

    let unit = session.finalize_at(30);
    let ty = &unit.types[0];
    assert_eq!(ty.declaration_span, Span::new(0, 30));
    let run = ty.find_method("run").expect("run kept");
    assert_eq!(run.declaration_span, Span::new(10, 30));
    assert!(run.bits.contains(DeclarationBits::END_INFERRED));
    assert_eq!(run.body.as_ref().map(|b| b.span), Some(Span::new(30, 30)));
}

#[test]
fn finalize_leaves_the_session_untouched() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Field(field("x", Span::new(10, 16))), 0);

    let first = session.finalize();
    let second = session.finalize();
    assert_eq!(first, second);
    assert!(session.node(class).is_open());
    assert_eq!(session.active(), class);

    session.absorb(Fragment::Field(field("y", Span::new(20, 26))), 0);
    let third = session.finalize();
    assert_eq!(third.types[0].fields.len(), 2);
}

// =============================================================================
// Synthesized members
// =============================================================================

#[test]
fn class_gets_a_default_constructor() {
    let mut session = RecoverySession::new("A.java", 50);
    session.modifier_seen(ModifierFlags::PUBLIC, 0);
    open_type(&mut session, TypeKind::Class, "A", 7);

    let unit = session.finalize();
    let ty = &unit.types[0];
    assert_eq!(ty.methods.len(), 1);
    let ctor = &ty.methods[0];
    assert!(ctor.is_constructor());
    assert!(ctor.is_default_constructor());
    assert_eq!(ctor.name, "A");
    assert_eq!(ctor.name_span, ty.name_span);
    assert_eq!(ctor.modifiers, ModifierFlags::PUBLIC);
    let body = ctor.body.as_ref().expect("constructor body");
    assert!(matches!(
        body.statements[0].kind,
        StatementKind::ExplicitConstructorCall { is_super: true, .. }
    ));
}

#[test]
fn enum_default_constructor_is_private() {
    let mut session = RecoverySession::new("E.java", 50);
    open_type(&mut session, TypeKind::Enum, "E", 0);

    let unit = session.finalize();
    let ctor = unit.types[0].constructors().next().expect("enum constructor");
    assert_eq!(ctor.modifiers, ModifierFlags::PRIVATE);
    assert!(ctor.body.as_ref().is_some_and(|b| b.statements.is_empty()));
}

#[test]
fn explicit_constructor_suppresses_the_default() {
    let mut session = RecoverySession::new("A.java", 80);
    open_type(&mut session, TypeKind::Class, "A", 0);
    let mut ctor = MethodDeclaration::new(MethodKind::Constructor, "A", Span::new(10, 30));
    ctor.parameters.push(Argument {
        name: "x".to_string(),
        ty: type_ref("int", 12),
        modifiers: ModifierFlags::empty(),
        is_varargs: false,
        span: Span::new(12, 17),
    });
    session.absorb(Fragment::Method(ctor), 0);

    let unit = session.finalize();
    let ctors: Vec<_> = unit.types[0].constructors().collect();
    assert_eq!(ctors.len(), 1);
    assert!(!ctors[0].is_default_constructor());
}

#[test]
fn repeated_default_constructors_collapse_to_one() {
    let mut session = RecoverySession::new("A.java", 80);
    open_type(&mut session, TypeKind::Class, "A", 0);
    for start in [10, 30] {
        let mut ctor = MethodDeclaration::new(MethodKind::Constructor, "A", Span::new(start, start + 10));
        ctor.bits = DeclarationBits::IS_DEFAULT_CONSTRUCTOR;
        session.absorb(Fragment::Method(ctor), 0);
    }

    let result = session.freeze();
    let ctors: Vec<_> = result.unit.types[0].constructors().collect();
    assert_eq!(ctors.len(), 1);
    assert_eq!(ctors[0].declaration_span, Span::new(10, 20));
    assert!(codes(&result).contains(&diagnostic_codes::DUPLICATE_DEFAULT_CONSTRUCTOR));
}

#[test]
fn interfaces_get_no_constructor() {
    let mut session = RecoverySession::new("I.java", 80);
    open_type(&mut session, TypeKind::Interface, "I", 0);
    let mut constant = field("X", Span::new(14, 24));
    constant.initialization = Some(literal("1", 22));
    session.absorb(Fragment::Field(constant), 0);

    let unit = session.finalize();
    assert!(unit.types[0].methods.is_empty());
}

#[test]
fn static_state_needs_a_class_initializer() {
    let mut session = RecoverySession::new("A.java", 80);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.modifier_seen(ModifierFlags::STATIC, 10);
    session.absorb(Fragment::Field(field("counter", Span::new(17, 29))), 0);

    let unit = session.finalize();
    let kinds: Vec<MethodKind> = unit.types[0].methods.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MethodKind::Constructor, MethodKind::Clinit]);
    assert_eq!(unit.types[0].methods[1].name, "<clinit>");
}

#[test]
fn constants_do_not_need_a_class_initializer() {
    let mut session = RecoverySession::new("A.java", 80);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.modifier_seen(ModifierFlags::STATIC, 10);
    session.modifier_seen(ModifierFlags::FINAL, 17);
    let mut constant = field("MAX", Span::new(23, 37));
    constant.initialization = Some(literal("10", 34));
    session.absorb(Fragment::Field(constant), 0);

    let unit = session.finalize();
    assert!(unit.types[0].methods.iter().all(|m| m.kind != MethodKind::Clinit));
}

#[test]
fn static_initializer_block_needs_a_class_initializer() {
    let mut session = RecoverySession::new("A.java", 80);
    open_type(&mut session, TypeKind::Class, "A", 0);
    let block = FieldDeclaration::initializer(ModifierFlags::STATIC, Span::open(10));
    session.absorb(Fragment::Field(block), 1);

    let result = session.freeze();
    let ty = &result.unit.types[0];
    assert!(ty.methods.iter().any(|m| m.kind == MethodKind::Clinit));
    let init = &ty.fields[0];
    assert_eq!(init.kind, FieldKind::Initializer);
    assert_eq!(init.declaration_span, Span::new(10, 80));
    assert!(init.block.is_some());
    let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message_text.as_str()).collect();
    assert!(messages.contains(&"'}' expected to complete 'initializer'."));
}

// =============================================================================
// Folding children
// =============================================================================

#[test]
fn duplicate_members_are_reported() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Field(field("x", Span::new(10, 16))), 0);
    session.absorb(Fragment::Field(field("x", Span::new(17, 23))), 0);
    session.absorb(Fragment::Method(method("m", Span::new(30, 40))), 0);
    session.absorb(Fragment::Method(method("m", Span::new(41, 51))), 0);

    let result = session.freeze();
    let ty = &result.unit.types[0];
    assert_eq!(ty.fields.len(), 2);
    let found = codes(&result);
    assert!(found.contains(&diagnostic_codes::DUPLICATE_FIELD));
    assert!(found.contains(&diagnostic_codes::DUPLICATE_METHOD));
}

#[test]
fn anonymous_type_becomes_the_field_value() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Field(field("r", Span::open(10))), 0);
    session.absorb(anonymous("Runnable", 21), 1);
    session.closing_brace_consumed(40);
    session.semicolon_consumed(41);

    let unit = session.finalize();
    let r = unit.types[0].find_field("r").expect("field r");
    assert_eq!(r.declaration_span, Span::new(10, 42));
    assert!(r.bits.contains(DeclarationBits::HAS_LOCAL_TYPE));
    let Some(Expression {
        kind: ExpressionKind::Allocation(allocation),
        span,
    }) = &r.initialization
    else {
        panic!("expected an allocation, got {:?}", r.initialization);
    };
    assert_eq!(*span, Span::new(21, 41));
    assert_eq!(allocation.ty.name, "Runnable");
    let body = allocation.anonymous_type.as_ref().expect("anonymous body");
    assert!(body.is_anonymous());
    assert!(body.bits.contains(DeclarationBits::IS_LOCAL));
    assert!(body.methods.is_empty());
}

#[test]
fn method_body_collects_statements_locals_and_types() {
    let mut session = RecoverySession::new("A.java", 200);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Method(method("run", Span::open(10))), 1);
    session.absorb(
        Fragment::Statement(Statement::new(
            StatementKind::Opaque("go();".to_string()),
            Span::new(20, 25),
        )),
        0,
    );
    session.absorb(Fragment::Field(field("i", Span::new(26, 32))), 0);
    session.absorb(anonymous("Object", 33), 1);
    session.closing_brace_consumed(50);
    session.absorb(
        Fragment::Type(TypeDeclaration::new(TypeKind::Class, "Local", Span::new(60, 80))),
        0,
    );

    let unit = session.finalize();
    let run = unit.types[0].find_method("run").expect("run kept");
    assert!(run.bits.contains(DeclarationBits::HAS_LOCAL_TYPE));
    let body = run.body.as_ref().expect("streamed method has a body");
    assert_eq!(body.statements.len(), 4);
    assert!(matches!(body.statements[0].kind, StatementKind::Opaque(_)));
    assert!(matches!(body.statements[1].kind, StatementKind::LocalDeclaration(_)));
    assert!(matches!(&body.statements[2].kind, StatementKind::Expression(e)
        if matches!(e.kind, ExpressionKind::Allocation(_))));
    let StatementKind::LocalType(local) = &body.statements[3].kind else {
        panic!("expected a local type");
    };
    assert!(local.bits.contains(DeclarationBits::IS_LOCAL));
    assert_eq!(run.declaration_span.end, 80);
}

#[test]
fn header_closed_by_the_next_member_gets_an_empty_body() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Method(method("first", Span::open(10))), 0);
    session.absorb(Fragment::Method(method("second", Span::new(30, 45))), 0);

    let unit = session.finalize();
    let first = unit.types[0].find_method("first").expect("first kept");
    assert_eq!(first.declaration_span, Span::new(10, 30));
    assert!(first.body.as_ref().is_some_and(|b| b.statements.is_empty()));
    let second = unit.types[0].find_method("second").expect("second kept");
    assert!(second.body.is_none());
}

#[test]
fn member_types_are_marked() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "Outer", 0);
    open_type(&mut session, TypeKind::Interface, "Inner", 20);

    let unit = session.finalize();
    let inner = unit.types[0].find_member_type("Inner").expect("member type");
    assert!(inner.bits.contains(DeclarationBits::IS_MEMBER));
    assert!(!inner.bits.contains(DeclarationBits::IS_LOCAL));
    assert!(!unit.types[0].bits.contains(DeclarationBits::IS_MEMBER));
}

#[test]
fn deep_nesting_is_folded_up_to_the_limit() {
    let mut session = RecoverySession::new("A.java", 10_000);
    for i in 0..MAX_RECOVERY_DEPTH + 20 {
        open_type(&mut session, TypeKind::Class, "N", i * 10);
    }

    let unit = session.finalize();
    let mut depth = 0;
    let mut current = unit.types.first();
    while let Some(ty) = current {
        depth += 1;
        current = ty.member_types.first();
    }
    assert_eq!(depth, MAX_RECOVERY_DEPTH);
}

#[test]
fn freeze_sorts_diagnostics_by_position() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0);
    session.absorb(Fragment::Field(field("x", Span::new(10, 16))), 0);
    session.absorb(Fragment::Field(field("x", Span::new(17, 23))), 0);
    session.closing_brace_consumed(30);
    session.closing_brace_consumed(31);

    let result = session.freeze();
    let starts: Vec<u32> = result.diagnostics.iter().map(|d| d.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert_eq!(
        codes(&result),
        vec![diagnostic_codes::DUPLICATE_FIELD, diagnostic_codes::UNEXPECTED_CLOSING_BRACE]
    );
}
