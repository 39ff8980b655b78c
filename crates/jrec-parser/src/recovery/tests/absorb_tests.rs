use super::*;
use crate::ast::{
    AllocationHeader, Annotation, Expression, ExpressionKind, ImportReference, MethodKind,
    PackageDeclaration, TypeReference,
};
use jrec_common::Span;
use jrec_common::diagnostics::diagnostic_codes;

// =============================================================================
// Fragment builders
// =============================================================================

fn type_ref(name: &str, at: u32) -> TypeReference {
    TypeReference {
        name: name.to_string(),
        dimensions: 0,
        span: Span::new(at, at + name.len() as u32),
    }
}

fn class(name: &str, span: Span) -> Fragment {
    Fragment::Type(TypeDeclaration::new(TypeKind::Class, name, span))
}

fn field(name: &str, span: Span) -> Fragment {
    Fragment::Field(FieldDeclaration::new(name, type_ref("int", span.start), span))
}

fn method(name: &str, span: Span) -> Fragment {
    Fragment::Method(MethodDeclaration::new(MethodKind::Method, name, span))
}

fn statement(start: u32, end: u32) -> Fragment {
    Fragment::Statement(Statement::new(
        StatementKind::Opaque("f();".to_string()),
        Span::new(start, end),
    ))
}

fn anonymous(ty: &str, start: u32) -> Fragment {
    Fragment::Type(TypeDeclaration::anonymous(AllocationHeader {
        ty: type_ref(ty, start + 4),
        arguments: Vec::new(),
        start,
    }))
}

fn codes(session: &RecoverySession) -> Vec<u32> {
    session.diagnostics().iter().map(|d| d.code).collect()
}

// =============================================================================
// Unit
// =============================================================================

#[test]
fn package_takes_pending_annotations() {
    let mut session = RecoverySession::new("A.java", 100);
    session.annotation_name_started("Generated", Span::new(0, 10));
    session.absorb(
        Fragment::Package(PackageDeclaration {
            name: "a.b".to_string(),
            annotations: Vec::new(),
            span: Span::new(11, 21),
        }),
        0,
    );

    let unit = session.finalize();
    let package = unit.package.expect("package recorded");
    assert_eq!(package.span, Span::new(0, 21));
    assert_eq!(
        package.annotations,
        vec![Annotation {
            type_name: "Generated".to_string(),
            span: Span::new(0, 10),
        }]
    );
    assert!(session.diagnostics().is_empty());
}

#[test]
fn import_discards_pending_modifiers() {
    let mut session = RecoverySession::new("A.java", 100);
    session.modifier_seen(ModifierFlags::PUBLIC, 0);
    session.absorb(
        Fragment::Import(ImportReference {
            name: "java.util.List".to_string(),
            on_demand: false,
            is_static: false,
            span: Span::new(7, 29),
        }),
        0,
    );

    assert_eq!(codes(&session), vec![diagnostic_codes::DISCARDED_ATTRIBUTES]);
    assert!(session.pending_attributes().is_empty());
    assert_eq!(session.finalize().imports.len(), 1);
}

#[test]
fn members_outside_any_type_are_dropped() {
    let mut session = RecoverySession::new("A.java", 100);
    session.absorb(field("x", Span::new(0, 6)), 0);
    session.absorb(method("m", Span::new(7, 20)), 0);
    session.absorb(statement(21, 25), 0);
    session.absorb(anonymous("Runnable", 26), 1);

    assert_eq!(
        codes(&session),
        vec![
            diagnostic_codes::DECLARATION_OUTSIDE_TYPE,
            diagnostic_codes::DECLARATION_OUTSIDE_TYPE,
            diagnostic_codes::STATEMENT_OUTSIDE_BODY,
            diagnostic_codes::ORPHANED_ANONYMOUS_TYPE,
        ]
    );
    assert_eq!(session.active(), RecoveryIndex::ROOT);
    assert_eq!(session.node_count(), 1);
}

// =============================================================================
// Type bodies
// =============================================================================

#[test]
fn open_type_becomes_active_and_complete_members_do_not() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    assert_eq!(session.node(class_index).kind(), RecoveryKind::TypeBody);
    assert!(session.node(class_index).found_opening_brace);
    assert_eq!(session.balance_of(class_index).get(), 1);

    let active = session.absorb(field("x", Span::new(10, 16)), 0);
    assert_eq!(active, class_index);
    assert_eq!(session.type_body(class_index).fields.len(), 1);
}

#[test]
fn pending_modifiers_move_into_the_next_member() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    session.modifier_seen(ModifierFlags::PUBLIC, 10);
    session.modifier_seen(ModifierFlags::STATIC, 17);
    session.absorb(field("x", Span::new(24, 30)), 0);

    let child = session.type_body(class_index).fields[0];
    let data = session.field(child);
    assert_eq!(data.decl.modifiers, ModifierFlags::PUBLIC | ModifierFlags::STATIC);
    assert_eq!(data.decl.declaration_span, Span::new(10, 30));
    assert!(session.pending_attributes().is_empty());
}

#[test]
fn enum_constant_after_members_is_reported() {
    let mut session = RecoverySession::new("E.java", 100);
    session.absorb(
        Fragment::Type(TypeDeclaration::new(TypeKind::Enum, "E", Span::open(0))),
        1,
    );
    session.absorb(
        Fragment::Field(FieldDeclaration::enum_constant(
            "A",
            Span::new(9, 10),
            Span::new(9, 10),
        )),
        0,
    );
    assert!(session.diagnostics().is_empty());

    session.absorb(field("x", Span::new(12, 18)), 0);
    session.absorb(
        Fragment::Field(FieldDeclaration::enum_constant(
            "B",
            Span::new(19, 20),
            Span::new(19, 20),
        )),
        0,
    );
    assert_eq!(codes(&session), vec![diagnostic_codes::ENUM_CONSTANT_AFTER_MEMBERS]);
}

#[test]
fn statement_in_a_member_type_body_is_dropped() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    let active = session.absorb(statement(10, 14), 0);

    assert_eq!(active, class_index);
    assert!(session.node(class_index).is_open());
    assert_eq!(codes(&session), vec![diagnostic_codes::STATEMENT_OUTSIDE_BODY]);
}

#[test]
fn anonymous_type_without_open_method_is_orphaned() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    session.modifier_seen(ModifierFlags::FINAL, 8);
    let active = session.absorb(anonymous("Runnable", 14), 1);

    assert_eq!(active, class_index);
    assert_eq!(codes(&session), vec![diagnostic_codes::ORPHANED_ANONYMOUS_TYPE]);
    assert!(session.pending_attributes().is_empty());
}

// =============================================================================
// Bubbling
// =============================================================================

#[test]
fn member_after_open_method_closes_it() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    let first = session.absorb(method("first", Span::open(10)), 1);
    assert_eq!(session.active(), first);

    let second = session.absorb(method("second", Span::new(40, 60)), 0);
    assert_eq!(second, class_index);
    assert_eq!(session.span_of(first), Span::new(10, 40));
    assert_eq!(session.type_body(class_index).methods.len(), 2);
}

#[test]
fn pending_attributes_travel_with_the_bubbling_fragment() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    let first = session.absorb(method("first", Span::open(10)), 1);
    session.modifier_seen(ModifierFlags::PRIVATE, 40);
    session.absorb(method("second", Span::new(48, 60)), 0);

    // The open method ends where the attributes of the next member begin.
    assert_eq!(session.span_of(first), Span::new(10, 40));
    let second = session.type_body(class_index).methods[1];
    let RecoveryData::Method(data) = &session.node(second).data else {
        panic!("expected a method node");
    };
    assert_eq!(data.decl.modifiers, ModifierFlags::PRIVATE);
    assert_eq!(data.decl.declaration_span, Span::new(40, 60));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn fragment_past_a_known_end_goes_to_the_parent() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    session.absorb(field("x", Span::open(10)), 0);
    session.absorb(
        Fragment::Statement(Statement::new(
            StatementKind::Expression(Expression::new(
                ExpressionKind::Literal("1".to_string()),
                Span::new(18, 19),
            )),
            Span::new(18, 19),
        )),
        0,
    );

    let field_index = session.type_body(class_index).fields[0];
    assert_eq!(session.span_of(field_index), Span::new(10, 19));
    assert!(session.field(field_index).initializer_captured);

    session.absorb(field("y", Span::new(21, 27)), 0);
    assert_eq!(session.active(), class_index);
    assert_eq!(session.type_body(class_index).fields.len(), 2);
}

#[test]
fn unclosed_local_class_ends_where_its_method_continues() {
    let mut session = RecoverySession::new("A.java", 100);
    session.absorb(class("A", Span::open(0)), 1);
    let run = session.absorb(method("run", Span::open(10)), 1);
    let local = session.absorb(class("Local", Span::open(20)), 1);

    let active = session.absorb(statement(40, 45), 0);
    assert_eq!(active, run);
    assert_eq!(session.span_of(local), Span::new(20, 40));
    let RecoveryData::Method(data) = &session.node(run).data else {
        panic!("expected a method node");
    };
    assert_eq!(data.statements.len(), 2);
}

// =============================================================================
// Executable bodies
// =============================================================================

#[test]
fn locals_and_statements_stay_in_the_body() {
    let mut session = RecoverySession::new("A.java", 100);
    session.absorb(class("A", Span::open(0)), 1);
    let run = session.absorb(method("run", Span::open(10)), 1);
    session.absorb(statement(20, 24), 0);
    session.modifier_seen(ModifierFlags::FINAL, 25);
    let active = session.absorb(field("local", Span::new(31, 41)), 0);

    assert_eq!(active, run);
    let RecoveryData::Method(data) = &session.node(run).data else {
        panic!("expected a method node");
    };
    assert_eq!(data.statements.len(), 2);
    assert!(session.node(run).is_open());
}

#[test]
fn field_with_member_modifiers_leaves_the_body() {
    let mut session = RecoverySession::new("A.java", 100);
    let class_index = session.absorb(class("A", Span::open(0)), 1);
    let run = session.absorb(method("run", Span::open(10)), 1);
    session.modifier_seen(ModifierFlags::PUBLIC, 25);
    let active = session.absorb(field("x", Span::new(32, 38)), 0);

    assert_eq!(active, class_index);
    assert_eq!(session.span_of(run), Span::new(10, 25));
    assert_eq!(session.type_body(class_index).fields.len(), 1);
}

#[test]
fn anonymous_type_in_open_field_is_captured() {
    let mut session = RecoverySession::new("A.java", 100);
    session.absorb(class("A", Span::open(0)), 1);
    let field_index = session.absorb(field("r", Span::open(10)), 0);
    let anon = session.absorb(anonymous("Runnable", 21), 1);

    assert_eq!(session.node(anon).parent, field_index);
    assert_eq!(session.field(field_index).anonymous_types, vec![anon]);
    assert_eq!(session.active(), anon);
}
