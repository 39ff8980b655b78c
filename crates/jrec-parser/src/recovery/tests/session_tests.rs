use super::*;
use crate::ast::{FieldDeclaration, ModifierFlags, TypeDeclaration, TypeReference};
use crate::recovery::node::Fragment;

fn int_type(at: u32) -> TypeReference {
    TypeReference {
        name: "int".to_string(),
        dimensions: 0,
        span: Span::new(at, at + 3),
    }
}

fn open_class(session: &mut RecoverySession, name: &str, start: u32) -> RecoveryIndex {
    let decl = TypeDeclaration::new(TypeKind::Class, name, Span::open(start));
    session.absorb(Fragment::Type(decl), 1)
}

#[test]
fn new_session_starts_at_the_unit() {
    let session = RecoverySession::new("A.java", 40);
    assert_eq!(session.active(), RecoveryIndex::ROOT);
    assert_eq!(session.node_count(), 1);
    assert_eq!(session.node(RecoveryIndex::ROOT).kind(), RecoveryKind::Unit);
    assert_eq!(session.reading_context(), ReadingContext::Unit);
    assert_eq!(session.current_span(), Span::new(0, 40));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn reading_context_follows_the_active_node() {
    let mut session = RecoverySession::new("A.java", 100);
    open_class(&mut session, "A", 0);
    assert_eq!(
        session.reading_context(),
        ReadingContext::TypeBody {
            kind: TypeKind::Class,
            name: "A".to_string(),
            enum_constants: false,
        }
    );

    let method = crate::ast::MethodDeclaration::new(
        crate::ast::MethodKind::Method,
        "run",
        Span::open(10),
    );
    let run = session.absorb(Fragment::Method(method), 1);
    assert_eq!(
        session.reading_context(),
        ReadingContext::Executable {
            body: run,
            type_name: "A".to_string()
        }
    );
}

#[test]
fn active_chain_ends_at_the_unit() {
    let mut session = RecoverySession::new("A.java", 100);
    let outer = open_class(&mut session, "Outer", 0);
    let inner = open_class(&mut session, "Inner", 20);
    assert_eq!(
        session.active_chain(),
        vec![inner, outer, RecoveryIndex::ROOT]
    );
}

#[test]
fn open_spans_are_reported_zero_width() {
    let mut session = RecoverySession::new("A.java", 100);
    session.report_structural_problem(StructuralProblem::MissingClosingBrace, Span::open(12), &["A"]);
    let diag = &session.diagnostics()[0];
    assert_eq!(diag.start, 12);
    assert_eq!(diag.length, 0);
    assert_eq!(diag.code, diagnostic_codes::MISSING_CLOSING_BRACE);
    assert_eq!(diag.message_text, "'}' expected to complete 'A'.");
}

#[test]
fn rollback_restores_nodes_active_and_diagnostics() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_class(&mut session, "A", 0);
    let checkpoint = session.checkpoint();
    assert_eq!(checkpoint.active(), class);
    assert_eq!(checkpoint.node_count(), 2);

    let field = FieldDeclaration::new("x", int_type(10), Span::open(10));
    session.absorb(Fragment::Field(field), 0);
    session.closing_brace_consumed(30);
    session.closing_brace_consumed(31);
    assert_eq!(session.node_count(), 3);
    assert_eq!(session.diagnostics().len(), 1);

    session.rollback(checkpoint);
    assert_eq!(session.node_count(), 2);
    assert_eq!(session.active(), class);
    assert!(session.diagnostics().is_empty());
    assert!(session.node(class).is_open());
}

#[test]
fn rollback_restores_pending_attributes() {
    let mut session = RecoverySession::new("A.java", 100);
    open_class(&mut session, "A", 0);
    let checkpoint = session.checkpoint();
    session.modifier_seen(ModifierFlags::PUBLIC, 10);
    assert!(!session.pending_attributes().is_empty());

    session.rollback(checkpoint);
    assert!(session.pending_attributes().is_empty());
}

#[test]
fn nested_rollbacks_restore_each_level() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_class(&mut session, "A", 0);
    let outer = session.checkpoint();
    session.modifier_seen(ModifierFlags::PUBLIC, 10);

    let inner = session.checkpoint();
    session.closing_brace_consumed(30);
    assert!(!session.node(class).is_open());

    session.rollback(inner);
    assert!(session.node(class).is_open());
    assert!(!session.pending_attributes().is_empty());

    session.rollback(outer);
    assert!(session.node(class).is_open());
    assert!(session.pending_attributes().is_empty());
}

#[test]
fn commit_keeps_changes_until_an_outer_rollback() {
    let mut session = RecoverySession::new("A.java", 100);
    let class = open_class(&mut session, "A", 0);
    let outer = session.checkpoint();
    let inner = session.checkpoint();
    session.closing_brace_consumed(30);
    session.commit(inner);
    assert_eq!(session.span_of(class), Span::new(0, 31));

    session.rollback(outer);
    assert!(session.node(class).is_open());

    let again = session.checkpoint();
    session.closing_brace_consumed(40);
    session.commit(again);
    assert_eq!(session.span_of(class), Span::new(0, 41));
}

#[test]
#[should_panic(expected = "newer recovery state")]
fn rollback_to_a_newer_checkpoint_panics() {
    let mut session = RecoverySession::new("A.java", 100);
    let older = session.checkpoint();
    open_class(&mut session, "A", 0);
    let newer = session.checkpoint();
    session.rollback(older);
    session.rollback(newer);
}
