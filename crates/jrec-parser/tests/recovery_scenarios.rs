//! End-to-end recovery scenarios, through the session API and from source.

use jrec_common::Span;
use jrec_common::diagnostics::diagnostic_codes;
use jrec_parser::ast::{
    AllocationHeader, Block, ExpressionKind, FieldDeclaration, MethodDeclaration, MethodKind,
    TypeDeclaration, TypeKind, TypeReference,
};
use jrec_parser::{Fragment, ParserOptions, RecoveryResult, RecoverySession, parse_source};

fn type_ref(name: &str, at: u32) -> TypeReference {
    TypeReference {
        name: name.to_string(),
        dimensions: 0,
        span: Span::new(at, at + name.len() as u32),
    }
}

fn class(name: &str, start: u32) -> Fragment {
    Fragment::Type(TypeDeclaration::new(TypeKind::Class, name, Span::open(start)))
}

fn field(name: &str, span: Span) -> Fragment {
    Fragment::Field(FieldDeclaration::new(name, type_ref("int", span.start), span))
}

fn constructor(name: &str, span: Span) -> Fragment {
    let mut decl = MethodDeclaration::new(MethodKind::Constructor, name, span);
    if span.is_end_known() {
        decl.body = Some(Block::empty(Span::new(span.end - 2, span.end)));
    }
    Fragment::Method(decl)
}

fn read(source: &str) -> RecoveryResult {
    parse_source("A.java", source, ParserOptions::default())
}

fn has_code(result: &RecoveryResult, code: u32) -> bool {
    result.diagnostics.iter().any(|d| d.code == code)
}

// =============================================================================
// Missing closing brace
// =============================================================================

#[test]
fn missing_closing_brace_ends_at_end_of_input() {
    let source = "class A { int x;";
    let result = read(source);
    let a = &result.unit.types[0];
    assert_eq!(a.name, "A");
    assert_eq!(a.fields.len(), 1);
    assert_eq!(a.fields[0].name, "x");
    assert_eq!(a.declaration_span.end, source.len() as u32);
    assert_eq!(a.constructors().count(), 1);
    assert!(a.constructors().all(MethodDeclaration::is_default_constructor));
    assert!(has_code(&result, diagnostic_codes::MISSING_CLOSING_BRACE));
}

#[test]
fn missing_closing_brace_through_the_session() {
    let mut session = RecoverySession::new("A.java", 16);
    session.absorb(class("A", 0), 0);
    session.opening_brace_consumed(8);
    session.absorb(field("x", Span::new(10, 16)), 0);

    let result = session.freeze();
    let a = &result.unit.types[0];
    assert_eq!(a.declaration_span, Span::new(0, 16));
    assert_eq!(a.fields[0].declaration_span, Span::new(10, 16));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, diagnostic_codes::MISSING_CLOSING_BRACE);
}

// =============================================================================
// Initializers
// =============================================================================

#[test]
fn dangling_initializer_ends_at_its_expression() {
    let source = "class A { int x = foo(1, 2) }";
    let result = read(source);
    let x = result.unit.types[0].find_field("x").expect("x");
    let value = x.initialization.as_ref().expect("initializer");
    assert_eq!(value.kind, ExpressionKind::Opaque("foo(1, 2)".to_string()));
    assert_eq!(value.span.end, 27);
    assert_eq!(x.declaration_span.end, 27);
    assert!(has_code(&result, diagnostic_codes::TOKEN_EXPECTED));
}

#[test]
fn broken_initializer_keeps_the_text_before_the_block() {
    let source = "class A { int x = foo() { bar();";
    let result = read(source);
    let a = &result.unit.types[0];
    let x = a.find_field("x").expect("x");
    let value = x.initialization.as_ref().expect("initializer");
    assert_eq!(value.kind, ExpressionKind::Opaque("foo()".to_string()));
    assert_eq!(value.span, Span::new(18, 23));
    assert_eq!(x.declaration_span.end, 23);
}

#[test]
fn anonymous_type_mid_recovery_is_the_field_value() {
    let source = "class A { Runnable r = new Runnable() { public void run() {} };";
    let result = read(source);
    let a = &result.unit.types[0];
    assert_eq!(a.fields.len(), 1);
    assert!(a.member_types.is_empty());

    let Some(ExpressionKind::Allocation(allocation)) =
        a.fields[0].initialization.as_ref().map(|i| &i.kind)
    else {
        panic!("r has no allocation");
    };
    let body = allocation.anonymous_type.as_ref().expect("anonymous body");
    assert!(body.is_anonymous());
    assert!(body.find_method("run").is_some());
    assert!(a.find_method("run").is_none());
}

#[test]
fn anonymous_type_outside_any_type_is_orphaned() {
    let mut session = RecoverySession::new("A.java", 20);
    session.absorb(
        Fragment::Type(TypeDeclaration::anonymous(AllocationHeader {
            ty: type_ref("Runnable", 4),
            arguments: Vec::new(),
            start: 0,
        })),
        0,
    );
    let result = session.freeze();
    assert!(result.unit.types.is_empty());
    assert!(has_code(&result, diagnostic_codes::ORPHANED_ANONYMOUS_TYPE));
}

// =============================================================================
// Checkpoint and rollback
// =============================================================================

#[test]
fn rollback_discards_the_speculative_branch() {
    let mut session = RecoverySession::new("A.java", 60);
    let a = session.absorb(class("A", 0), 0);
    session.opening_brace_consumed(8);

    let active = session.active();
    let balance = session.balance_of(a);
    let nodes = session.node_count();
    let checkpoint = session.checkpoint();

    session.absorb(constructor("A", Span::open(10)), 0);
    session.opening_brace_consumed(14);
    session.absorb(field("y", Span::new(20, 26)), 0);
    session.closing_brace_consumed(30);
    session.closing_brace_consumed(31);

    session.rollback(checkpoint);
    assert_eq!(session.active(), active);
    assert_eq!(session.balance_of(a), balance);
    assert_eq!(session.node_count(), nodes);

    let unit = session.finalize();
    let decl = &unit.types[0];
    assert!(decl.fields.is_empty());
    let constructors: Vec<_> = decl.constructors().collect();
    assert_eq!(constructors.len(), 1);
    assert!(constructors[0].is_default_constructor());
}

// =============================================================================
// Constructors
// =============================================================================

#[test]
fn explicit_constructor_after_finalize_replaces_the_default() {
    let mut session = RecoverySession::new("A.java", 40);
    session.absorb(class("A", 0), 0);
    session.opening_brace_consumed(8);

    let first = session.finalize();
    assert!(first.types[0].constructors().all(MethodDeclaration::is_default_constructor));

    session.absorb(constructor("A", Span::new(10, 16)), 0);
    let second = session.finalize();
    let constructors: Vec<_> = second.types[0].constructors().collect();
    assert_eq!(constructors.len(), 1);
    assert!(!constructors[0].is_default_constructor());
}

#[test]
fn interfaces_get_no_constructor() {
    let result = read("interface I { void f(); }");
    assert_eq!(result.unit.types[0].constructors().count(), 0);
}

// =============================================================================
// Advisories
// =============================================================================

#[test]
fn duplicate_members_are_reported_and_kept() {
    let result = read("class A { int x; int x; void f() {} void f() {} void f(int a) {} }");
    let a = &result.unit.types[0];
    assert_eq!(a.fields.len(), 2);
    assert_eq!(a.methods.iter().filter(|m| m.name == "f").count(), 3);
    assert!(has_code(&result, diagnostic_codes::DUPLICATE_FIELD));
    let duplicate_methods = result
        .diagnostics
        .iter()
        .filter(|d| d.code == diagnostic_codes::DUPLICATE_METHOD)
        .count();
    assert_eq!(duplicate_methods, 1);
}

#[test]
fn statement_in_a_type_body_is_reported() {
    let result = read("class A { x = 1; int y; }");
    let a = &result.unit.types[0];
    assert_eq!(a.fields.len(), 1);
    assert!(has_code(&result, diagnostic_codes::STATEMENT_OUTSIDE_BODY));
}

#[test]
fn stray_braces_at_unit_level_are_reported() {
    let result = read("{ } class A {}");
    assert_eq!(result.unit.types.len(), 1);
    assert!(has_code(&result, diagnostic_codes::UNEXPECTED_OPENING_BRACE));
    assert!(has_code(&result, diagnostic_codes::UNEXPECTED_CLOSING_BRACE));
}

#[test]
fn members_outside_a_type_are_reported() {
    let result = read("int x; class A {}");
    assert_eq!(result.unit.types.len(), 1);
    assert!(result.unit.types[0].fields.is_empty());
    assert!(has_code(&result, diagnostic_codes::DECLARATION_OUTSIDE_TYPE));
}

#[test]
fn diagnostics_are_ordered_by_position() {
    let result = read("class A { int x = ; void f( }\n}}");
    let starts: Vec<u32> = result.diagnostics.iter().map(|d| d.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert!(!starts.is_empty());
}
