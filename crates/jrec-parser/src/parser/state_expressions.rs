//! Parser state - token captures and the expressions built from them
//!
//! Statements and initializer values are not parsed into full expression
//! trees. The reader captures their tokens up to a terminator, tracking
//! bracket depth, and recognizes the few shapes recovery cares about:
//! literals, names, array initializers and instance creations. Anything
//! else is kept as normalized source text.

use super::parse_rules::{
    continues_block_statement, is_block_statement_keyword, is_member_start_keyword,
    is_type_start, push_type_token,
};
use super::state::{ParserState, ReaderSnapshot};
use crate::ast::{
    AllocationExpression, AllocationHeader, Expression, ExpressionKind, ModifierFlags, TypeReference,
};
use jrec_common::Span;
use jrec_common::limits::MAX_CAPTURE_DEPTH;
use jrec_scanner::{SyntaxKind, token_is_literal};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CapturedToken {
    pub kind: SyntaxKind,
    pub span: Span,
    /// Trivia separated the token from the one before it.
    pub spaced: bool,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CaptureMode {
    /// Up to and including `;`, or through the closing brace of a block
    /// statement.
    Statement,
    /// Up to, not including, a `,` or `;` outside brackets.
    Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CaptureEnd {
    /// The terminator was found.
    Terminated,
    /// Input or the construct ended outside any bracket without a
    /// terminator.
    Unterminated,
    /// Input or the construct ended inside brackets.
    Broken,
}

pub(crate) struct Capture {
    pub tokens: Vec<CapturedToken>,
    pub end: CaptureEnd,
    /// Position of the first `{` outside any bracket and the number of
    /// tokens captured before it.
    pub first_brace: Option<(ReaderSnapshot, usize)>,
}

/// Outcome of reading the value after `=`.
pub(crate) enum InitializerValue {
    Value(Expression),
    Missing,
    /// `new T(args) {`: the current token is the `{` of the anonymous body.
    Anonymous(AllocationHeader),
    /// The value broke off; these tokens were read.
    Broken(Capture),
}

impl ParserState {
    // =========================================================================
    // Captures
    // =========================================================================

    pub(crate) fn capture_token(&mut self) -> CapturedToken {
        let token = CapturedToken {
            kind: self.token(),
            span: self.token_span(),
            spaced: self.scanner.token_full_start() < self.token_pos(),
            text: self.token_text(),
        };
        self.next_token();
        token
    }

    /// Capture tokens from the current one. `balanced` is set inside bodies
    /// known to balance, where member keywords do not end the capture.
    pub(crate) fn capture(&mut self, mode: CaptureMode, balanced: bool) -> Capture {
        let mut tokens: Vec<CapturedToken> = Vec::new();
        let mut braces = 0u32;
        let mut parens = 0u32;
        let mut first_brace = None;

        let first = self.token();
        let labeled = first == SyntaxKind::Identifier && self.peek_token() == SyntaxKind::ColonToken;
        let block_like =
            mode == CaptureMode::Statement && (is_block_statement_keyword(first) || labeled);

        let finish = |tokens, end, first_brace| Capture {
            tokens,
            end,
            first_brace,
        };
        let open_end = |braces: u32, parens: u32| {
            if braces == 0 && parens == 0 {
                CaptureEnd::Unterminated
            } else {
                CaptureEnd::Broken
            }
        };

        loop {
            let kind = self.token();
            if kind == SyntaxKind::EndOfFileToken {
                return finish(tokens, open_end(braces, parens), first_brace);
            }
            if braces + parens >= MAX_CAPTURE_DEPTH {
                return finish(tokens, CaptureEnd::Broken, first_brace);
            }
            let prev = tokens.last().map(|t| t.kind);
            if !tokens.is_empty() && braces == 0 && !balanced && is_member_start_keyword(kind, prev) {
                return finish(tokens, open_end(braces, parens), first_brace);
            }

            let at_top = braces == 0 && parens == 0;
            match kind {
                SyntaxKind::SemicolonToken if at_top => {
                    if mode == CaptureMode::Value {
                        return finish(tokens, CaptureEnd::Terminated, first_brace);
                    }
                    tokens.push(self.capture_token());
                    if block_like && continues_block_statement(first, self.token()) {
                        continue;
                    }
                    return finish(tokens, CaptureEnd::Terminated, first_brace);
                }
                SyntaxKind::CommaToken if at_top && mode == CaptureMode::Value => {
                    return finish(tokens, CaptureEnd::Terminated, first_brace);
                }
                SyntaxKind::OpenBraceToken => {
                    if at_top && first_brace.is_none() {
                        first_brace = Some((self.save(), tokens.len()));
                        if !self.braces.is_closed(self.token_pos()) {
                            // Everything after a brace that never closes
                            // would be captured; stop in front of it.
                            return finish(tokens, CaptureEnd::Broken, first_brace);
                        }
                    }
                    braces += 1;
                }
                SyntaxKind::CloseBraceToken => {
                    if braces == 0 {
                        return finish(tokens, open_end(braces, parens), first_brace);
                    }
                    braces -= 1;
                    tokens.push(self.capture_token());
                    if block_like
                        && braces == 0
                        && parens == 0
                        && !continues_block_statement(first, self.token())
                    {
                        return finish(tokens, CaptureEnd::Terminated, first_brace);
                    }
                    continue;
                }
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken => parens += 1,
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken => {
                    parens = parens.saturating_sub(1);
                }
                SyntaxKind::NewKeyword => {
                    // Commas of `new Map<K, V>()` are not separators.
                    tokens.push(self.capture_token());
                    let type_end =
                        self.look_ahead(|p| p.parse_type_reference().map(|_| p.prev_token_end));
                    if let Some(type_end) = type_end {
                        while self.token_pos() < type_end
                            && !self.is_token(SyntaxKind::EndOfFileToken)
                        {
                            tokens.push(self.capture_token());
                        }
                    }
                    continue;
                }
                _ => {}
            }
            tokens.push(self.capture_token());
        }
    }

    /// Read the value after `=` of a field or local variable.
    pub(crate) fn parse_variable_initializer(&mut self, balanced: bool) -> InitializerValue {
        if self.is_token(SyntaxKind::NewKeyword) {
            let snapshot = self.save();
            if let Some(header) = self.parse_allocation_header() {
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    return InitializerValue::Anonymous(header);
                }
            }
            self.restore(snapshot);
        }

        let capture = self.capture(CaptureMode::Value, balanced);
        match capture.end {
            CaptureEnd::Broken => InitializerValue::Broken(capture),
            _ if capture.tokens.is_empty() => InitializerValue::Missing,
            _ => InitializerValue::Value(expression_from_tokens(&capture.tokens, 0)),
        }
    }

    // =========================================================================
    // Array initializers left open
    // =========================================================================

    /// One step inside the braces of an array initializer whose value broke
    /// off: an element, a separator or a brace. A declaration or statement
    /// keyword ends the value without being consumed.
    pub(crate) fn parse_array_element(&mut self) {
        match self.token() {
            SyntaxKind::CommaToken => {
                self.next_token();
                return;
            }
            SyntaxKind::CloseBraceToken => {
                self.session.closing_brace_consumed(self.token_pos());
                self.next_token();
                return;
            }
            SyntaxKind::SemicolonToken => {
                self.report_token_expected("}");
                self.session.end_array_initializer(self.token_end());
                self.next_token();
                return;
            }
            _ => {}
        }
        if self.ends_array_value() {
            self.session.end_array_initializer(self.prev_token_end);
            return;
        }

        if self.is_token(SyntaxKind::NewKeyword) {
            let snapshot = self.save();
            if let Some(header) = self.parse_allocation_header() {
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.parse_anonymous_body(header);
                    return;
                }
            }
            self.restore(snapshot);
        }

        let capture = self.capture(CaptureMode::Value, false);
        let mut tokens = capture.tokens;
        if capture.end == CaptureEnd::Broken {
            if let Some((snapshot, len)) = capture.first_brace {
                self.restore(snapshot);
                tokens.truncate(len);
            }
        }
        if !tokens.is_empty() {
            self.session.array_element_read(expression_from_tokens(&tokens, 0));
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            self.session.opening_brace_consumed(self.token_pos());
            self.next_token();
        }
    }

    /// Whether the current token starts something other than an element.
    fn ends_array_value(&mut self) -> bool {
        let kind = self.token();
        if kind == SyntaxKind::AtToken
            || ModifierFlags::from_token(kind).is_some()
            || is_member_start_keyword(kind, None)
            || (is_block_statement_keyword(kind) && kind != SyntaxKind::OpenBraceToken)
            || matches!(
                kind,
                SyntaxKind::ReturnKeyword
                    | SyntaxKind::ThrowKeyword
                    | SyntaxKind::BreakKeyword
                    | SyntaxKind::ContinueKeyword
            )
        {
            return true;
        }
        is_type_start(kind)
            && self.look_ahead(|p| {
                p.parse_type_reference().is_some() && p.is_token(SyntaxKind::Identifier)
            })
    }

    /// `new T(args)`; the current token is `new`. Returns `None` when the
    /// tokens do not form a complete header.
    pub(crate) fn parse_allocation_header(&mut self) -> Option<AllocationHeader> {
        let start = self.token_pos();
        self.next_token();
        let ty = self.parse_type_reference()?;
        if !self.is_token(SyntaxKind::OpenParenToken) || ty.is_void() {
            return None;
        }
        let arguments = self.parse_argument_list()?;
        Some(AllocationHeader {
            ty,
            arguments,
            start,
        })
    }

    /// `( a, b )`; the current token is `(`. Returns `None` if the list is
    /// not closed before a `;` or the end of input.
    pub(crate) fn parse_argument_list(&mut self) -> Option<Vec<Expression>> {
        let mut inner = Vec::new();
        let mut parens = 0u32;
        let mut braces = 0u32;
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => return None,
                SyntaxKind::SemicolonToken if braces == 0 => return None,
                SyntaxKind::OpenParenToken => {
                    parens += 1;
                    if parens == 1 {
                        self.next_token();
                        continue;
                    }
                }
                SyntaxKind::CloseParenToken => {
                    parens = parens.saturating_sub(1);
                    if parens == 0 {
                        self.next_token();
                        break;
                    }
                }
                SyntaxKind::OpenBraceToken => braces += 1,
                SyntaxKind::CloseBraceToken => {
                    if braces == 0 {
                        return None;
                    }
                    braces -= 1;
                }
                _ => {}
            }
            if parens + braces >= MAX_CAPTURE_DEPTH {
                return None;
            }
            inner.push(self.capture_token());
        }
        Some(arguments_from_tokens(&inner, 0))
    }
}

// =============================================================================
// Building expressions from captured tokens
// =============================================================================

/// Source text of `tokens`, with one space wherever the source had trivia.
pub(crate) fn tokens_to_text(tokens: &[CapturedToken]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.spaced {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

pub(crate) fn tokens_span(tokens: &[CapturedToken]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
        _ => Span::at(0),
    }
}

pub(crate) fn opaque_expression(tokens: &[CapturedToken]) -> Expression {
    Expression::new(ExpressionKind::Opaque(tokens_to_text(tokens)), tokens_span(tokens))
}

/// Split at commas outside any bracket. A trailing comma yields no empty
/// element.
pub(crate) fn split_top_level(tokens: &[CapturedToken]) -> Vec<&[CapturedToken]> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut begin = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken => {
                depth += 1;
            }
            SyntaxKind::CloseParenToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::CloseBraceToken => depth = depth.saturating_sub(1),
            SyntaxKind::CommaToken if depth == 0 => {
                parts.push(&tokens[begin..i]);
                begin = i + 1;
            }
            _ => {}
        }
    }
    if begin < tokens.len() {
        parts.push(&tokens[begin..]);
    }
    parts
}

pub(crate) fn arguments_from_tokens(tokens: &[CapturedToken], depth: u32) -> Vec<Expression> {
    split_top_level(tokens)
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(|part| expression_from_tokens(part, depth + 1))
        .collect()
}

/// Index of the bracket closing the one at `open`.
fn matching_close(tokens: &[CapturedToken], open: usize) -> Option<usize> {
    let mut depth = 0u32;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken => {
                depth += 1;
            }
            SyntaxKind::CloseParenToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::CloseBraceToken => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Recognize a literal, name, array initializer or instance creation;
/// anything else becomes an opaque expression.
pub(crate) fn expression_from_tokens(tokens: &[CapturedToken], depth: u32) -> Expression {
    let span = tokens_span(tokens);
    if depth >= MAX_CAPTURE_DEPTH {
        return opaque_expression(tokens);
    }

    let kind = match tokens {
        [single] if token_is_literal(single.kind) => ExpressionKind::Literal(single.text.clone()),
        [sign, literal]
            if sign.kind == SyntaxKind::MinusToken
                && !literal.spaced
                && matches!(
                    literal.kind,
                    SyntaxKind::IntegerLiteral | SyntaxKind::FloatingPointLiteral
                ) =>
        {
            ExpressionKind::Literal(format!("-{}", literal.text))
        }
        _ if is_name(tokens) => ExpressionKind::Name(tokens_to_text(tokens)),
        [first, .., last]
            if first.kind == SyntaxKind::OpenBraceToken
                && last.kind == SyntaxKind::CloseBraceToken
                && matching_close(tokens, 0) == Some(tokens.len() - 1) =>
        {
            ExpressionKind::ArrayInitializer(arguments_from_tokens(
                &tokens[1..tokens.len() - 1],
                depth,
            ))
        }
        [first, ..] if first.kind == SyntaxKind::NewKeyword => {
            match allocation_from_tokens(tokens, depth) {
                Some(allocation) => ExpressionKind::Allocation(Box::new(allocation)),
                None => ExpressionKind::Opaque(tokens_to_text(tokens)),
            }
        }
        _ => ExpressionKind::Opaque(tokens_to_text(tokens)),
    };
    Expression::new(kind, span)
}

/// `a`, `a.b.c`, `this`, `this.a`.
fn is_name(tokens: &[CapturedToken]) -> bool {
    if tokens.is_empty() || tokens.len() % 2 == 0 {
        return false;
    }
    tokens.iter().enumerate().all(|(i, token)| {
        if i % 2 == 1 {
            token.kind == SyntaxKind::DotToken
        } else {
            token.kind == SyntaxKind::Identifier || (i == 0 && token.kind == SyntaxKind::ThisKeyword)
        }
    })
}

/// `new T(args)` spanning all of `tokens`.
fn allocation_from_tokens(tokens: &[CapturedToken], depth: u32) -> Option<AllocationExpression> {
    let open = tokens
        .iter()
        .position(|t| t.kind == SyntaxKind::OpenParenToken)?;
    let close = matching_close(tokens, open)?;
    if close != tokens.len() - 1 {
        return None;
    }
    let ty = type_reference_from_tokens(&tokens[1..open])?;
    Some(AllocationExpression {
        ty,
        arguments: arguments_from_tokens(&tokens[open + 1..close], depth),
        anonymous_type: None,
    })
}

/// A type from captured tokens: name and type arguments, then `[]` pairs.
pub(crate) fn type_reference_from_tokens(tokens: &[CapturedToken]) -> Option<TypeReference> {
    let first = tokens.first()?;
    if !is_type_start(first.kind) {
        return None;
    }

    let mut end = tokens.len();
    let mut dimensions = 0;
    while end >= 2
        && tokens[end - 1].kind == SyntaxKind::CloseBracketToken
        && tokens[end - 2].kind == SyntaxKind::OpenBracketToken
    {
        end -= 2;
        dimensions += 1;
    }

    let mut name = String::new();
    let mut prev = None;
    for token in &tokens[..end] {
        match token.kind {
            SyntaxKind::OpenParenToken
            | SyntaxKind::CloseParenToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::CloseBraceToken
            | SyntaxKind::SemicolonToken
            | SyntaxKind::EqualsToken => return None,
            _ => {}
        }
        push_type_token(&mut name, prev, token.kind, &token.text);
        prev = Some(token.kind);
    }
    Some(TypeReference {
        name,
        dimensions,
        span: tokens_span(tokens),
    })
}

/// When `tokens` end with `new T(args)`, the index of `new` and the header.
pub(crate) fn trailing_allocation(tokens: &[CapturedToken]) -> Option<(usize, AllocationHeader)> {
    let new_index = tokens
        .iter()
        .rposition(|t| t.kind == SyntaxKind::NewKeyword)?;
    let tail = &tokens[new_index..];
    let allocation = allocation_from_tokens(tail, 0)?;
    Some((
        new_index,
        AllocationHeader {
            ty: allocation.ty,
            arguments: allocation.arguments,
            start: tail[0].span.start,
        },
    ))
}

#[cfg(test)]
#[path = "tests/expression_tests.rs"]
mod tests;
