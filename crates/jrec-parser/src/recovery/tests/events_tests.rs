use super::*;
use crate::ast::{
    Expression, ExpressionKind, FieldDeclaration, MethodDeclaration, MethodKind, TypeDeclaration,
    TypeKind, TypeReference,
};
use crate::recovery::node::Fragment;
use crate::recovery::session::ReadingContext;
use jrec_common::diagnostics::diagnostic_codes;

fn open_type(session: &mut RecoverySession, kind: TypeKind, name: &str, start: u32, balance: u32) -> RecoveryIndex {
    let decl = TypeDeclaration::new(kind, name, Span::open(start));
    session.absorb(Fragment::Type(decl), balance)
}

fn open_method(session: &mut RecoverySession, name: &str, start: u32, balance: u32) -> RecoveryIndex {
    let decl = MethodDeclaration::new(MethodKind::Method, name, Span::open(start));
    session.absorb(Fragment::Method(decl), balance)
}

fn open_field(session: &mut RecoverySession, name: &str, dimensions: u32, start: u32) -> RecoveryIndex {
    let ty = TypeReference {
        name: "int".to_string(),
        dimensions,
        span: Span::new(start, start + 3),
    };
    session.absorb(
        Fragment::Field(FieldDeclaration::new(name, ty, Span::open(start))),
        0,
    )
}

#[test]
fn braces_at_the_unit_are_reported() {
    let mut session = RecoverySession::new("A.java", 10);
    session.closing_brace_consumed(0);
    session.opening_brace_consumed(2);

    let codes: Vec<u32> = session.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            diagnostic_codes::UNEXPECTED_CLOSING_BRACE,
            diagnostic_codes::UNEXPECTED_OPENING_BRACE,
        ]
    );
    assert_eq!(session.diagnostics()[0].span(), Span::new(0, 1));
    assert_eq!(session.active(), RecoveryIndex::ROOT);
}

#[test]
fn first_brace_opens_the_body() {
    let mut session = RecoverySession::new("A.java", 40);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 0);
    assert!(!session.node(class).found_opening_brace);

    session.opening_brace_consumed(8);
    assert!(session.node(class).found_opening_brace);
    assert_eq!(session.balance_of(class).get(), 1);
    assert_eq!(session.type_body(class).decl.body_start, Some(8));

    session.closing_brace_consumed(20);
    assert_eq!(session.span_of(class), Span::new(0, 21));
    assert_eq!(session.active(), RecoveryIndex::ROOT);
}

#[test]
fn nested_braces_keep_a_method_open() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let run = open_method(&mut session, "run", 10, 1);

    session.opening_brace_consumed(30);
    assert_eq!(session.balance_of(run).get(), 2);
    session.closing_brace_consumed(40);
    assert!(session.node(run).is_open());
    assert_eq!(session.active(), run);

    session.closing_brace_consumed(45);
    assert_eq!(session.span_of(run), Span::new(10, 46));
    assert!(session.balance_of(run).is_zero());
}

#[test]
fn brace_of_an_enclosing_body_closes_a_header_first() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let run = open_method(&mut session, "run", 10, 0);

    session.closing_brace_consumed(20);
    assert_eq!(session.span_of(run), Span::new(10, 20));
    assert_eq!(session.span_of(class), Span::new(0, 21));
    assert_eq!(session.active(), RecoveryIndex::ROOT);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn semicolon_terminates_an_open_field() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let field = open_field(&mut session, "x", 0, 10);

    session.semicolon_consumed(15);
    assert_eq!(session.span_of(field), Span::new(10, 16));
    assert_eq!(session.active(), class);
}

#[test]
fn array_initializer_braces_stay_in_the_field() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let field = open_field(&mut session, "values", 1, 10);

    session.opening_brace_consumed(20);
    assert_eq!(session.balance_of(field).get(), 1);
    session.closing_brace_consumed(25);
    assert_eq!(session.active(), field);
    assert!(session.field(field).initializer_captured);

    session.semicolon_consumed(26);
    assert_eq!(session.span_of(field), Span::new(10, 27));
    assert_eq!(session.active(), class);
    assert!(session.node(class).is_open());
}

fn literal(text: &str, start: u32) -> Expression {
    Expression::new(
        ExpressionKind::Literal(text.to_string()),
        Span::new(start, start + text.len() as u32),
    )
}

#[test]
fn array_elements_collect_in_the_field_value() {
    let mut session = RecoverySession::new("A.java", 100);
    open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let field = open_field(&mut session, "a", 1, 10);

    session.opening_brace_consumed(20);
    assert_eq!(session.open_array_initializer(), Some(field));
    session.array_element_read(literal("1", 22));
    session.array_element_read(literal("2", 25));

    let value = session.field(field).decl.initialization.as_ref().expect("value");
    assert_eq!(value.span, Span::new(20, 26));
    let ExpressionKind::ArrayInitializer(elements) = &value.kind else {
        panic!("not an array initializer: {value:?}");
    };
    assert_eq!(elements.len(), 2);

    session.closing_brace_consumed(27);
    assert_eq!(session.open_array_initializer(), None);
    let value = session.field(field).decl.initialization.as_ref().expect("value");
    assert_eq!(value.span, Span::new(20, 28));
}

#[test]
fn ending_an_open_array_value_closes_the_field() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let field = open_field(&mut session, "a", 2, 10);

    session.opening_brace_consumed(20);
    session.opening_brace_consumed(21);
    session.array_element_read(literal("1", 22));
    assert_eq!(session.balance_of(field).get(), 2);

    session.end_array_initializer(24);
    assert!(session.field(field).initializer_captured);
    assert_eq!(session.span_of(field), Span::new(10, 24));
    assert_eq!(session.active(), class);
    assert_eq!(session.open_array_initializer(), None);
}

#[test]
fn brace_after_a_scalar_field_belongs_to_the_type() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let field = open_field(&mut session, "x", 0, 10);

    session.opening_brace_consumed(16);
    assert_eq!(session.span_of(field), Span::new(10, 16));
    assert_eq!(session.balance_of(class).get(), 2);
    assert_eq!(session.active(), class);
}

#[test]
fn enum_constant_body_closes_the_constant() {
    let mut session = RecoverySession::new("E.java", 100);
    let enum_index = open_type(&mut session, TypeKind::Enum, "E", 0, 1);
    let constant = session.absorb(
        Fragment::Field(FieldDeclaration::enum_constant(
            "A",
            Span::new(9, 10),
            Span::open(9),
        )),
        0,
    );

    session.opening_brace_consumed(11);
    session.closing_brace_consumed(30);
    assert_eq!(session.span_of(constant), Span::new(9, 31));
    assert_eq!(session.active(), enum_index);
}

#[test]
fn semicolon_ends_the_enum_constant_list() {
    let mut session = RecoverySession::new("E.java", 100);
    open_type(&mut session, TypeKind::Enum, "E", 0, 1);
    assert!(matches!(
        session.reading_context(),
        ReadingContext::TypeBody {
            enum_constants: true,
            ..
        }
    ));

    session.semicolon_consumed(12);
    assert!(matches!(
        session.reading_context(),
        ReadingContext::TypeBody {
            enum_constants: false,
            ..
        }
    ));
}

#[test]
fn modifiers_go_to_the_innermost_open_body() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    let field = open_field(&mut session, "x", 0, 10);

    // A field has no buffer of its own.
    session.modifier_seen(ModifierFlags::STATIC, 14);
    assert_eq!(session.attribute_owner(), class);
    assert!(session.node(field).pending().is_none());
    assert_eq!(session.pending_attributes().modifiers(), ModifierFlags::STATIC);
    assert_eq!(session.pending_attributes().start(), Some(14));
}

#[test]
fn closing_brace_drops_unused_attributes() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_type(&mut session, TypeKind::Class, "A", 0, 1);
    session.annotation_name_started("Deprecated", Span::new(10, 21));
    session.closing_brace_consumed(22);

    assert!(!session.node(class).is_open());
    assert_eq!(session.diagnostics().len(), 1);
    assert_eq!(session.diagnostics()[0].code, diagnostic_codes::DISCARDED_ATTRIBUTES);
    assert_eq!(session.diagnostics()[0].span(), Span::new(10, 21));
}

#[test]
fn abandon_is_clamped_to_the_source() {
    let mut session = RecoverySession::new("A.java", 10);
    session.abandon_at(50);
    assert_eq!(session.closure, Some(10));
}
