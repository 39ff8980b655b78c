use colored::Colorize;
use jrec::common::diagnostics::{Diagnostic, DiagnosticCategory};
use jrec::LineMap;

/// Renders diagnostics of one source file as
/// `file:line:column - category JREC<code>: message`.
pub struct Reporter<'a> {
    color: bool,
    source: &'a str,
    line_map: LineMap,
}

impl<'a> Reporter<'a> {
    pub fn new(source: &'a str, color: bool) -> Self {
        Reporter {
            color,
            source,
            line_map: LineMap::build(source),
        }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = self.format_location(&diagnostic.file, diagnostic.start);
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);
        output
    }

    /// 1-based `line:column` of `offset`.
    pub fn position_for(&self, offset: u32) -> (u32, u32) {
        let position = self.line_map.offset_to_position(offset, self.source);
        (position.line + 1, position.character + 1)
    }

    fn format_location(&self, file: &str, offset: u32) -> String {
        let (line, column) = self.position_for(offset);
        let file = if file.is_empty() { "<unknown>" } else { file };
        format!("{file}:{line}:{column}")
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.as_str();
        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("JREC{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}
