//! Parser state: token cursor, reader diagnostics and the top-level loop.
//!
//! The reader never assembles the tree itself. It recognizes declaration
//! headers, statements and structural tokens and reports each one to the
//! `RecoverySession`, which decides where it belongs.

use super::brace_table::BraceTable;
use super::parse_rules::cannot_start_statement;
use crate::ast::{CompilationUnit, ModifierFlags};
use crate::recovery::{ReadingContext, RecoveryIndex, RecoveryResult, RecoverySession};
use jrec_common::Span;
use jrec_common::diagnostics::{Diagnostic, diagnostic_codes};
use jrec_scanner::{ScannerSnapshot, ScannerState, SyntaxKind, keyword_to_text, punctuation_to_text};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Read the statements of method and initializer bodies. When off, a
    /// body whose braces balance is skipped and recorded as empty.
    pub method_bodies: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            method_bodies: true,
        }
    }
}

impl ParserOptions {
    /// Declarations only.
    pub const fn diet() -> Self {
        ParserOptions {
            method_bodies: false,
        }
    }
}

/// Saved reader position for look-ahead.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReaderSnapshot {
    scanner: ScannerSnapshot,
    token: SyntaxKind,
    prev_token_end: u32,
}

/// Reads one source unit into a `RecoverySession`.
pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) session: RecoverySession,
    pub(crate) options: ParserOptions,
    pub(crate) current_token: SyntaxKind,
    /// End of the last consumed token.
    pub(crate) prev_token_end: u32,
    /// Executable bodies whose braces are known to balance. Member-like
    /// text inside them is read as statements instead of closing them.
    pub(crate) balanced_bodies: FxHashSet<RecoveryIndex>,
    /// Which braces of the unit are closed, and where.
    pub(crate) braces: BraceTable,
    last_error_pos: Option<u32>,
    result: Option<RecoveryResult>,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> Self {
        ParserState::with_options(file_name, source_text, ParserOptions::default())
    }

    pub fn with_options(file_name: String, source_text: String, options: ParserOptions) -> Self {
        let braces = BraceTable::build(&source_text);
        let scanner = ScannerState::new(source_text);
        let session = RecoverySession::new(file_name, scanner.source_len());
        ParserState {
            scanner,
            session,
            options,
            current_token: SyntaxKind::Unknown,
            prev_token_end: 0,
            balanced_bodies: FxHashSet::default(),
            braces,
            last_error_pos: None,
            result: None,
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    #[inline]
    pub(crate) fn token_span(&self) -> Span {
        Span::new(self.token_pos(), self.token_end())
    }

    pub(crate) fn token_text(&self) -> String {
        self.scanner.token_text().to_string()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        if self.current_token == SyntaxKind::EndOfFileToken {
            return self.current_token;
        }
        if self.current_token != SyntaxKind::Unknown {
            self.prev_token_end = self.scanner.token_end();
        }
        self.current_token = self.scanner.scan();
        self.current_token
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn save(&self) -> ReaderSnapshot {
        ReaderSnapshot {
            scanner: self.scanner.save_state(),
            token: self.current_token,
            prev_token_end: self.prev_token_end,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ReaderSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current_token = snapshot.token;
        self.prev_token_end = snapshot.prev_token_end;
    }

    /// Run `f` and rewind to where it started.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.save();
        let result = f(self);
        self.restore(snapshot);
        result
    }

    pub(crate) fn peek_token(&mut self) -> SyntaxKind {
        self.look_ahead(|p| p.next_token())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Report a reader diagnostic. Only the first error at a position is
    /// kept.
    pub(crate) fn parse_error_at(&mut self, span: Span, code: u32, args: &[&str]) {
        if self.last_error_pos == Some(span.start) {
            return;
        }
        self.last_error_pos = Some(span.start);
        trace!(start = span.start, code, "reader diagnostic");
        let diagnostic = Diagnostic::from_code(self.session.file_name(), span, code, args);
        self.session.push_diagnostic(diagnostic);
    }

    /// `'text' expected.` right after the last consumed token.
    pub(crate) fn report_token_expected(&mut self, text: &str) {
        self.parse_error_at(
            Span::at(self.prev_token_end),
            diagnostic_codes::TOKEN_EXPECTED,
            &[text],
        );
    }

    pub(crate) fn report_unexpected_token(&mut self) {
        let text = match self.current_token {
            SyntaxKind::EndOfFileToken => return,
            kind => punctuation_to_text(kind)
                .or_else(|| keyword_to_text(kind))
                .map_or_else(|| self.token_text(), str::to_string),
        };
        self.parse_error_at(self.token_span(), diagnostic_codes::UNEXPECTED_TOKEN, &[&text]);
    }

    fn collect_scanner_diagnostics(&mut self) {
        for diag in self.scanner.take_scanner_diagnostics() {
            let span = Span::new(diag.start, diag.start + diag.length);
            let text = span.slice(self.scanner.source_text()).to_string();
            let diagnostic =
                Diagnostic::from_code(self.session.file_name(), span, diag.code, &[&text]);
            self.session.push_diagnostic(diagnostic);
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Read the whole unit and return the recovered tree. Reading happens
    /// once; later calls return the same tree.
    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        if let Some(result) = &self.result {
            return result.unit.clone();
        }

        self.next_token();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            self.parse_next();
            if self.token_pos() == before && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.report_unexpected_token();
                self.next_token();
            }
        }
        self.collect_scanner_diagnostics();

        let result = self.session.finalize_with_diagnostics();
        debug!(
            file = self.session.file_name(),
            types = result.unit.types.len(),
            diagnostics = result.diagnostics.len(),
            nodes = self.session.node_count(),
            "compilation unit recovered"
        );
        let unit = result.unit.clone();
        self.result = Some(result);
        unit
    }

    /// Every diagnostic of the unit, ordered by position. Empty until
    /// `parse_compilation_unit` has run.
    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        self.result.as_ref().map_or(&[], |r| r.diagnostics.as_slice())
    }

    pub fn session(&self) -> &RecoverySession {
        &self.session
    }

    pub fn into_result(mut self) -> RecoveryResult {
        if self.result.is_none() {
            self.parse_compilation_unit();
        }
        match self.result {
            Some(result) => result,
            None => unreachable!("parse_compilation_unit stores its result"),
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn parse_next(&mut self) {
        if self.session.open_array_initializer().is_some() {
            let before = self.token_pos();
            self.parse_array_element();
            if self.token_pos() != before {
                return;
            }
        }
        let context = self.session.reading_context();
        let balanced = matches!(
            &context,
            ReadingContext::Executable { body, .. } if self.balanced_bodies.contains(body)
        );

        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_open_brace(&context, balanced),
            SyntaxKind::CloseBraceToken => {
                self.session.closing_brace_consumed(self.token_pos());
                self.next_token();
            }
            SyntaxKind::SemicolonToken => {
                self.session.semicolon_consumed(self.token_pos());
                self.next_token();
            }
            SyntaxKind::AtToken => {
                if self.peek_token() == SyntaxKind::InterfaceKeyword {
                    self.parse_type_declaration();
                } else {
                    self.parse_annotation(true);
                }
            }
            SyntaxKind::PackageKeyword => self.parse_package_declaration(),
            SyntaxKind::ImportKeyword => self.parse_import_declaration(),
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword => {
                self.parse_type_declaration();
            }
            SyntaxKind::CommaToken
                if matches!(
                    context,
                    ReadingContext::TypeBody {
                        enum_constants: true,
                        ..
                    }
                ) =>
            {
                self.next_token();
            }
            kind => {
                if let Some(flag) = self.modifier_in_context(kind, &context, balanced) {
                    self.session.modifier_seen(flag, self.token_pos());
                    self.next_token();
                    return;
                }
                match context {
                    ReadingContext::Unit | ReadingContext::TypeBody { .. } => {
                        self.parse_member_declaration(&context);
                    }
                    ReadingContext::Executable { .. } => {
                        if cannot_start_statement(kind) {
                            self.report_unexpected_token();
                            self.next_token();
                        } else {
                            self.parse_statement(balanced);
                        }
                    }
                }
            }
        }
    }

    /// Modifier flag of `kind` if it acts as one here.
    fn modifier_in_context(
        &mut self,
        kind: SyntaxKind,
        context: &ReadingContext,
        balanced: bool,
    ) -> Option<ModifierFlags> {
        let flag = ModifierFlags::from_token(kind)?;
        match context {
            ReadingContext::Executable { .. } => {
                if flag == ModifierFlags::DEFAULT {
                    return None;
                }
                if flag == ModifierFlags::SYNCHRONIZED
                    && self.peek_token() == SyntaxKind::OpenParenToken
                {
                    return None;
                }
                // Inside a body that balances, only local class modifiers
                // start a declaration; the rest is a broken statement.
                let local = ModifierFlags::FINAL
                    | ModifierFlags::ABSTRACT
                    | ModifierFlags::STATIC
                    | ModifierFlags::STRICTFP;
                if balanced && !local.contains(flag) {
                    return None;
                }
                Some(flag)
            }
            ReadingContext::TypeBody { .. } => Some(flag),
            ReadingContext::Unit => (flag != ModifierFlags::DEFAULT).then_some(flag),
        }
    }

    fn parse_open_brace(&mut self, context: &ReadingContext, balanced: bool) {
        match context {
            ReadingContext::TypeBody { .. } => self.parse_initializer_block(),
            ReadingContext::Executable { .. } => {
                if self.braces.is_closed(self.token_pos()) {
                    self.parse_statement(balanced);
                } else {
                    self.session.opening_brace_consumed(self.token_pos());
                    self.next_token();
                }
            }
            ReadingContext::Unit => {
                self.session.opening_brace_consumed(self.token_pos());
                self.next_token();
            }
        }
    }

    /// Consume a `{ ... }` block. Returns the end of its closing brace, or
    /// `None` when input ends first (everything up to the end is consumed).
    /// Callers check the brace table first so only closed blocks are
    /// consumed.
    pub(crate) fn skip_balanced_block(&mut self) -> Option<u32> {
        let mut depth = 0u32;
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => return None,
                SyntaxKind::OpenBraceToken => depth += 1,
                SyntaxKind::CloseBraceToken => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let end = self.token_end();
                        self.next_token();
                        return Some(end);
                    }
                }
                _ => {}
            }
            self.next_token();
        }
    }
}
