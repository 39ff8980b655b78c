//! Parser state - statements of method and initializer bodies

use super::parse_rules::is_type_start;
use super::state::ParserState;
use super::state_expressions::{
    CaptureEnd, CaptureMode, CapturedToken, arguments_from_tokens, expression_from_tokens,
    tokens_span, tokens_to_text, trailing_allocation,
};
use crate::ast::{Statement, StatementKind};
use crate::recovery::Fragment;
use jrec_scanner::SyntaxKind;
use tracing::trace;

/// What a statement starting with a type turns out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeclarationShape {
    /// `Type name (`
    Method,
    /// `Type name` followed by anything else.
    Variable,
}

impl ParserState {
    /// One statement of an executable body. `balanced` is set when the body
    /// is known to balance; method headers inside it are then broken
    /// statements rather than the start of the next member.
    pub(crate) fn parse_statement(&mut self, balanced: bool) {
        let kind = self.token();
        if kind == SyntaxKind::NewKeyword {
            let snapshot = self.save();
            if let Some(header) = self.parse_allocation_header() {
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.parse_anonymous_body(header);
                    return;
                }
            }
            self.restore(snapshot);
        }

        if is_type_start(kind) {
            match self.look_ahead_declaration_shape() {
                Some(DeclarationShape::Variable) => {
                    self.parse_local_declaration(true, balanced);
                    return;
                }
                Some(DeclarationShape::Method) if !balanced => {
                    self.parse_local_declaration(false, balanced);
                    return;
                }
                _ => {}
            }
        }

        self.parse_captured_statement(balanced);
    }

    fn look_ahead_declaration_shape(&mut self) -> Option<DeclarationShape> {
        self.look_ahead(|p| {
            p.parse_type_reference()?;
            if !p.is_token(SyntaxKind::Identifier) {
                return None;
            }
            p.next_token();
            if p.is_token(SyntaxKind::OpenParenToken) {
                Some(DeclarationShape::Method)
            } else {
                Some(DeclarationShape::Variable)
            }
        })
    }

    /// A local variable, or a method header that ends the body it appears in.
    fn parse_local_declaration(&mut self, variable: bool, balanced: bool) {
        let start = self.token_pos();
        let Some(ty) = self.parse_type_reference() else {
            return;
        };
        trace!(start, variable, "declaration in body");
        self.parse_typed_declaration(start, Vec::new(), ty, true, balanced);
    }

    /// Capture a statement and hand it to the session.
    pub(crate) fn parse_captured_statement(&mut self, balanced: bool) {
        let capture = self.capture(CaptureMode::Statement, balanced);
        let mut tokens = capture.tokens;
        match capture.end {
            CaptureEnd::Terminated => {}
            CaptureEnd::Unterminated => self.report_token_expected(";"),
            CaptureEnd::Broken => {
                if let Some((snapshot, len)) = capture.first_brace {
                    // Stream from the first unmatched block instead.
                    self.restore(snapshot);
                    tokens.truncate(len);
                }
                if tokens.is_empty() {
                    if self.is_token(SyntaxKind::OpenBraceToken) {
                        self.session.opening_brace_consumed(self.token_pos());
                        self.next_token();
                    }
                    return;
                }
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    if let Some((new_index, header)) = trailing_allocation(&tokens) {
                        if new_index > 0 {
                            self.offer_statement(statement_from_tokens(&tokens[..new_index]));
                        }
                        self.parse_anonymous_body(header);
                        return;
                    }
                }
            }
        }
        if !tokens.is_empty() {
            self.offer_statement(statement_from_tokens(&tokens));
        }
    }

    /// Statements are dropped when method bodies are not read.
    fn offer_statement(&mut self, statement: Statement) {
        if !self.options.method_bodies {
            trace!(start = statement.span.start, "statement skipped");
            return;
        }
        self.session.absorb(Fragment::Statement(statement), 0);
    }
}

/// Classify captured statement tokens.
pub(crate) fn statement_from_tokens(tokens: &[CapturedToken]) -> Statement {
    let span = tokens_span(tokens);
    let body = match tokens.split_last() {
        Some((last, rest)) if last.kind == SyntaxKind::SemicolonToken => rest,
        _ => tokens,
    };

    let kind = match body {
        [first, value @ ..] if first.kind == SyntaxKind::ReturnKeyword => {
            if value.is_empty() {
                StatementKind::Return(None)
            } else {
                StatementKind::Return(Some(expression_from_tokens(value, 0)))
            }
        }
        [first, open, arguments @ .., close]
            if matches!(first.kind, SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword)
                && open.kind == SyntaxKind::OpenParenToken
                && close.kind == SyntaxKind::CloseParenToken
                && is_single_group(&body[1..]) =>
        {
            StatementKind::ExplicitConstructorCall {
                is_super: first.kind == SyntaxKind::SuperKeyword,
                arguments: arguments_from_tokens(arguments, 0),
            }
        }
        _ => StatementKind::Opaque(tokens_to_text(tokens)),
    };
    Statement::new(kind, span)
}

/// Whether `tokens` is one parenthesized group: `( ... )`.
fn is_single_group(tokens: &[CapturedToken]) -> bool {
    let mut depth = 0u32;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            SyntaxKind::OpenParenToken => depth += 1,
            SyntaxKind::CloseParenToken => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != tokens.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
