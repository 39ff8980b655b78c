use crate::reporter::Reporter;
use jrec::Span;
use jrec::common::diagnostics::{Diagnostic, diagnostic_codes};

#[test]
fn positions_are_one_based() {
    let source = "class A {\n  int x\n}";
    let reporter = Reporter::new(source, false);
    assert_eq!(reporter.position_for(0), (1, 1));
    assert_eq!(reporter.position_for(12), (2, 3));
}

#[test]
fn plain_rendering_has_location_category_and_code() {
    let source = "class A {\n  int x;";
    let reporter = Reporter::new(source, false);
    let diagnostic = Diagnostic::from_code(
        "A.java",
        Span::at(16),
        diagnostic_codes::MISSING_CLOSING_BRACE,
        &["A"],
    );
    let rendered = reporter.format_diagnostic(&diagnostic);
    assert!(rendered.starts_with("A.java:2:7 - error JREC1007: "), "{rendered}");
    assert!(rendered.ends_with(&diagnostic.message_text));
}

fn closing_brace(span: Span) -> Diagnostic {
    Diagnostic::from_code("B.java", span, diagnostic_codes::UNEXPECTED_CLOSING_BRACE, &[])
}

#[test]
fn render_joins_diagnostics_by_line() {
    let source = "}}";
    let reporter = Reporter::new(source, false);
    let diagnostics = vec![
        closing_brace(Span::new(0, 1)),
        closing_brace(Span::new(1, 2)),
    ];
    let rendered = reporter.render(&diagnostics);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("B.java:1:1"));
    assert!(lines[1].starts_with("B.java:1:2"));
}
