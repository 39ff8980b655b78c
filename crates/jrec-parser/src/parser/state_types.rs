//! Parser state - type references, names and annotations

use super::parse_rules::{is_type_argument_token, push_type_token};
use super::state::ParserState;
use crate::ast::TypeReference;
use jrec_common::Span;
use jrec_common::diagnostics::diagnostic_codes;
use jrec_scanner::{SyntaxKind, token_is_primitive_type};

impl ParserState {
    // =========================================================================
    // Types
    // =========================================================================

    /// Read a type: `int`, `void`, `java.util.Map<K, V>[]`. Returns `None`
    /// without consuming anything when the current token cannot start one.
    pub(crate) fn parse_type_reference(&mut self) -> Option<TypeReference> {
        let start = self.token_pos();
        let mut name = String::new();
        match self.token() {
            SyntaxKind::VoidKeyword => {
                name.push_str("void");
                self.next_token();
            }
            kind if token_is_primitive_type(kind) => {
                name.push_str(self.scanner.token_text());
                self.next_token();
            }
            SyntaxKind::Identifier => self.parse_class_type_into(&mut name),
            _ => return None,
        }
        let dimensions = self.parse_dimensions();
        Some(TypeReference {
            name,
            dimensions,
            span: Span::new(start, self.prev_token_end),
        })
    }

    /// `Outer<T>.Inner<U>`; the current token is an identifier.
    fn parse_class_type_into(&mut self, out: &mut String) {
        loop {
            out.push_str(self.scanner.token_text());
            self.next_token();
            if self.is_token(SyntaxKind::LessThanToken) {
                self.parse_type_arguments_into(out);
            }
            if self.is_token(SyntaxKind::DotToken) && self.peek_token() == SyntaxKind::Identifier {
                out.push('.');
                self.next_token();
                continue;
            }
            return;
        }
    }

    /// Append `<...>` to `out`. Stops early, leaving the arguments
    /// unterminated, at a token that cannot appear inside them.
    fn parse_type_arguments_into(&mut self, out: &mut String) {
        let mut depth = 0u32;
        let mut prev = None;
        loop {
            let kind = self.token();
            if !is_type_argument_token(kind) {
                return;
            }
            match kind {
                SyntaxKind::LessThanToken => depth += 1,
                SyntaxKind::GreaterThanToken => depth = depth.saturating_sub(1),
                _ => {}
            }
            push_type_token(out, prev, kind, self.scanner.token_text());
            prev = Some(kind);
            self.next_token();
            if depth == 0 {
                return;
            }
        }
    }

    /// Count `[]` pairs.
    pub(crate) fn parse_dimensions(&mut self) -> u32 {
        let mut dimensions = 0;
        while self.is_token(SyntaxKind::OpenBracketToken)
            && self.peek_token() == SyntaxKind::CloseBracketToken
        {
            self.next_token();
            self.next_token();
            dimensions += 1;
        }
        dimensions
    }

    /// Type parameters of a generic declaration, one string per parameter:
    /// `<K extends Comparable<K>, V>` gives `["K extends Comparable<K>", "V"]`.
    pub(crate) fn parse_type_parameters(&mut self) -> Vec<String> {
        let mut parameters = Vec::new();
        let mut current = String::new();
        let mut prev = None;
        let mut depth = 0u32;
        self.next_token();
        loop {
            let kind = self.token();
            match kind {
                SyntaxKind::GreaterThanToken if depth == 0 => {
                    self.next_token();
                    break;
                }
                SyntaxKind::CommaToken if depth == 0 => {
                    parameters.push(std::mem::take(&mut current));
                    prev = None;
                    self.next_token();
                    continue;
                }
                SyntaxKind::LessThanToken => depth += 1,
                SyntaxKind::GreaterThanToken => depth -= 1,
                kind if !is_type_argument_token(kind) => {
                    self.report_token_expected(">");
                    break;
                }
                _ => {}
            }
            push_type_token(&mut current, prev, kind, self.scanner.token_text());
            prev = Some(kind);
            self.next_token();
        }
        if !current.is_empty() {
            parameters.push(current);
        }
        parameters
    }

    /// Comma-separated types after `extends`, `implements` or `throws`.
    pub(crate) fn parse_type_list(&mut self) -> Vec<TypeReference> {
        let mut types = Vec::new();
        loop {
            match self.parse_type_reference() {
                Some(ty) => types.push(ty),
                None => {
                    self.parse_error_at(
                        self.token_span(),
                        diagnostic_codes::IDENTIFIER_EXPECTED,
                        &[],
                    );
                    break;
                }
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        types
    }

    // =========================================================================
    // Names and annotations
    // =========================================================================

    /// `a.b.c`; the current token is an identifier.
    pub(crate) fn parse_qualified_name(&mut self) -> String {
        let mut name = self.token_text();
        self.next_token();
        while self.is_token(SyntaxKind::DotToken) && self.peek_token() == SyntaxKind::Identifier {
            self.next_token();
            name.push('.');
            name.push_str(self.scanner.token_text());
            self.next_token();
        }
        name
    }

    /// `@Name` or `@Name(...)`. With `report`, the name goes to the pending
    /// attributes of the session; otherwise the annotation is only skipped.
    pub(crate) fn parse_annotation(&mut self, report: bool) {
        let start = self.token_pos();
        self.next_token();
        if !self.is_token(SyntaxKind::Identifier) {
            self.parse_error_at(self.token_span(), diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
            return;
        }
        let name = self.parse_qualified_name();
        if report {
            let range = Span::new(start, self.prev_token_end);
            self.session.annotation_name_started(&name, range);
        }
        if self.is_token(SyntaxKind::OpenParenToken) && !self.skip_parenthesized() {
            self.report_token_expected(")");
        }
    }

    /// Consume `( ... )` including nested parentheses. Stops without
    /// consuming at the end of input or at a `;` or `}` outside any brace.
    pub(crate) fn skip_parenthesized(&mut self) -> bool {
        let mut parens = 0u32;
        let mut braces = 0u32;
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => return false,
                SyntaxKind::OpenParenToken => parens += 1,
                SyntaxKind::CloseParenToken => {
                    parens = parens.saturating_sub(1);
                    if parens == 0 {
                        self.next_token();
                        return true;
                    }
                }
                SyntaxKind::OpenBraceToken => braces += 1,
                SyntaxKind::CloseBraceToken if braces == 0 => return false,
                SyntaxKind::CloseBraceToken => braces -= 1,
                SyntaxKind::SemicolonToken if braces == 0 => return false,
                _ => {}
            }
            self.next_token();
        }
    }
}
