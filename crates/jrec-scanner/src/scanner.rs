//! Tokenizer state machine.
//!
//! The scanner never fails: malformed literals and stray characters produce a
//! token plus a `ScannerDiagnostic`, and scanning continues after them. Trivia
//! (whitespace and comments) is always skipped; `has_preceding_line_break`
//! records whether any of it contained a newline.

use crate::syntax_kind::{SyntaxKind, text_to_keyword};
use jrec_common::diagnostics::diagnostic_codes;
use jrec_common::limits::MAX_SOURCE_BYTES;
use memchr::{memchr2, memmem};

/// A lexical problem found while scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub start: u32,
    pub length: u32,
    pub code: u32,
}

/// Saved scanner position for speculative look-ahead.
///
/// Restoring a snapshot also drops any diagnostics produced after it was
/// taken, so a rejected speculation leaves no trace.
#[derive(Clone, Copy, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    full_start: usize,
    token_start: usize,
    token: SyntaxKind,
    preceding_line_break: bool,
    diagnostics_len: usize,
}

/// Offsets are `u32`: the source is cut at `MAX_SOURCE_BYTES` when the
/// scanner is created, so every position fits.
pub struct ScannerState {
    source: String,
    /// Current byte position (end of the current token)
    pos: usize,
    /// Start of the current token including leading trivia
    full_start: usize,
    /// Start of the current token excluding trivia
    token_start: usize,
    token: SyntaxKind,
    preceding_line_break: bool,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl ScannerState {
    pub fn new(source: impl Into<String>) -> Self {
        ScannerState::with_limit(source, MAX_SOURCE_BYTES)
    }

    /// Scan at most `limit` bytes of `source`. Longer input is cut at the
    /// last character boundary within the limit, and the cut is reported.
    pub fn with_limit(source: impl Into<String>, limit: usize) -> Self {
        let mut source = source.into();
        let mut diagnostics = Vec::new();
        let limit = limit.min(MAX_SOURCE_BYTES);
        if source.len() > limit {
            let mut cut = limit;
            while !source.is_char_boundary(cut) {
                cut -= 1;
            }
            source.truncate(cut);
            diagnostics.push(ScannerDiagnostic {
                start: cut as u32,
                length: 0,
                code: diagnostic_codes::SOURCE_TOO_LARGE,
            });
        }
        ScannerState {
            source,
            pos: 0,
            full_start: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            preceding_line_break: false,
            diagnostics,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Start of the current token, excluding leading trivia.
    #[inline]
    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    /// End of the current token (exclusive).
    #[inline]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Start of the current token, including leading trivia.
    #[inline]
    pub fn token_full_start(&self) -> u32 {
        self.full_start as u32
    }

    pub fn token_text(&self) -> &str {
        self.source.get(self.token_start..self.pos).unwrap_or("")
    }

    #[inline]
    pub fn source_text(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source.len() as u32
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    pub fn get_scanner_diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    pub fn take_scanner_diagnostics(&mut self) -> Vec<ScannerDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // =========================================================================
    // Look-ahead support
    // =========================================================================

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            full_start: self.full_start,
            token_start: self.token_start,
            token: self.token,
            preceding_line_break: self.preceding_line_break,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.full_start = snapshot.full_start;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.preceding_line_break = snapshot.preceding_line_break;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Advance to the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.full_start = self.pos;
        self.preceding_line_break = false;
        self.skip_trivia();
        self.token_start = self.pos;

        let bytes = self.source.as_bytes();
        let Some(&ch) = bytes.get(self.pos) else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b'@' => self.single(SyntaxKind::AtToken),
            b'?' => self.single(SyntaxKind::QuestionToken),
            b'~' => self.single(SyntaxKind::TildeToken),
            // Nested type arguments close one level per token.
            b'<' => self.single(SyntaxKind::LessThanToken),
            b'>' => self.single(SyntaxKind::GreaterThanToken),
            b'.' => {
                if self.byte_at(1).is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_number()
                } else if self.byte_at(1) == Some(b'.') && self.byte_at(2) == Some(b'.') {
                    self.pos += 3;
                    SyntaxKind::DotDotDotToken
                } else {
                    self.single(SyntaxKind::DotToken)
                }
            }
            b':' => self.one_or_two(b':', SyntaxKind::ColonToken, SyntaxKind::ColonColonToken),
            b'=' => self.one_or_two(b'=', SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken),
            b'!' => self.one_or_two(
                b'=',
                SyntaxKind::ExclamationToken,
                SyntaxKind::ExclamationEqualsToken,
            ),
            b'*' => self.one_or_two(b'=', SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken),
            b'/' => self.one_or_two(b'=', SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken),
            b'%' => self.one_or_two(b'=', SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            b'^' => self.one_or_two(b'=', SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            b'+' => match self.byte_at(1) {
                Some(b'+') => self.double(SyntaxKind::PlusPlusToken),
                Some(b'=') => self.double(SyntaxKind::PlusEqualsToken),
                _ => self.single(SyntaxKind::PlusToken),
            },
            b'-' => match self.byte_at(1) {
                Some(b'-') => self.double(SyntaxKind::MinusMinusToken),
                Some(b'=') => self.double(SyntaxKind::MinusEqualsToken),
                Some(b'>') => self.double(SyntaxKind::MinusGreaterThanToken),
                _ => self.single(SyntaxKind::MinusToken),
            },
            b'&' => match self.byte_at(1) {
                Some(b'&') => self.double(SyntaxKind::AmpersandAmpersandToken),
                Some(b'=') => self.double(SyntaxKind::AmpersandEqualsToken),
                _ => self.single(SyntaxKind::AmpersandToken),
            },
            b'|' => match self.byte_at(1) {
                Some(b'|') => self.double(SyntaxKind::BarBarToken),
                Some(b'=') => self.double(SyntaxKind::BarEqualsToken),
                _ => self.single(SyntaxKind::BarToken),
            },
            b'"' => self.scan_string(),
            b'\'' => self.scan_character(),
            b'0'..=b'9' => self.scan_number(),
            _ => self.scan_identifier_or_unknown(),
        };
        self.token
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    #[inline]
    fn double(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 2;
        kind
    }

    #[inline]
    fn one_or_two(&mut self, second: u8, one: SyntaxKind, two: SyntaxKind) -> SyntaxKind {
        if self.byte_at(1) == Some(second) {
            self.double(two)
        } else {
            self.single(one)
        }
    }

    fn error(&mut self, start: usize, end: usize, code: u32) {
        self.diagnostics.push(ScannerDiagnostic {
            start: start as u32,
            length: end.saturating_sub(start) as u32,
            code,
        });
    }

    fn skip_trivia(&mut self) {
        let len = self.source.len();
        while self.pos < len {
            let bytes = self.source.as_bytes();
            match bytes[self.pos] {
                b'\n' | b'\r' => {
                    self.preceding_line_break = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0c => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    self.pos = match memchr2(b'\n', b'\r', &bytes[self.pos..]) {
                        Some(idx) => self.pos + idx,
                        None => len,
                    };
                }
                b'/' if bytes.get(self.pos + 1) == Some(&b'*') => {
                    let body = self.pos + 2;
                    match memmem::find(&bytes[body..], b"*/") {
                        Some(idx) => {
                            if memchr2(b'\n', b'\r', &bytes[body..body + idx]).is_some() {
                                self.preceding_line_break = true;
                            }
                            self.pos = body + idx + 2;
                        }
                        None => {
                            let start = self.pos;
                            self.error(start, len, diagnostic_codes::UNTERMINATED_COMMENT);
                            self.pos = len;
                        }
                    }
                }
                _ => {
                    // Non-ASCII whitespace (e.g. no-break space) is trivia too.
                    let Some(ch) = self.source[self.pos..].chars().next() else {
                        return;
                    };
                    if ch.is_whitespace() {
                        self.pos += ch.len_utf8();
                    } else {
                        return;
                    }
                }
            }
        }
    }

    fn scan_string(&mut self) -> SyntaxKind {
        if self.byte_at(1) == Some(b'"') && self.byte_at(2) == Some(b'"') {
            return self.scan_text_block();
        }
        let start = self.pos;
        self.pos += 1;
        let bytes = self.source.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'"' => {
                    self.pos += 1;
                    return SyntaxKind::StringLiteral;
                }
                b'\\' => self.pos += 2,
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(bytes.len());
        self.error(start, self.pos, diagnostic_codes::UNTERMINATED_STRING_LITERAL);
        SyntaxKind::StringLiteral
    }

    fn scan_text_block(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 3;
        let bytes = self.source.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'\\' => self.pos += 2,
                b'"' if bytes.get(self.pos + 1) == Some(&b'"')
                    && bytes.get(self.pos + 2) == Some(&b'"') =>
                {
                    self.pos += 3;
                    return SyntaxKind::TextBlock;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = bytes.len();
        self.error(start, self.pos, diagnostic_codes::UNTERMINATED_STRING_LITERAL);
        SyntaxKind::TextBlock
    }

    fn scan_character(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let bytes = self.source.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'\'' => {
                    self.pos += 1;
                    return SyntaxKind::CharacterLiteral;
                }
                b'\\' => self.pos += 2,
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(bytes.len());
        self.error(start, self.pos, diagnostic_codes::UNTERMINATED_CHARACTER_LITERAL);
        SyntaxKind::CharacterLiteral
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.source.as_bytes();
        let len = bytes.len();

        if bytes[self.pos] == b'0' && matches!(bytes.get(self.pos + 1), Some(b'x' | b'X' | b'b' | b'B'))
        {
            self.pos += 2;
            while self.pos < len && (bytes[self.pos].is_ascii_hexdigit() || bytes[self.pos] == b'_') {
                self.pos += 1;
            }
            if matches!(bytes.get(self.pos), Some(b'l' | b'L')) {
                self.pos += 1;
            }
            return SyntaxKind::IntegerLiteral;
        }

        let mut floating = false;
        let digits = |pos: &mut usize| {
            while *pos < len && (bytes[*pos].is_ascii_digit() || bytes[*pos] == b'_') {
                *pos += 1;
            }
        };

        digits(&mut self.pos);
        if bytes.get(self.pos) == Some(&b'.') && bytes.get(self.pos + 1) != Some(&b'.') {
            floating = true;
            self.pos += 1;
            digits(&mut self.pos);
        }
        if matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            let mut exponent = self.pos + 1;
            if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            if bytes.get(exponent).is_some_and(u8::is_ascii_digit) {
                floating = true;
                self.pos = exponent;
                digits(&mut self.pos);
            }
        }
        match bytes.get(self.pos) {
            Some(b'f' | b'F' | b'd' | b'D') => {
                self.pos += 1;
                SyntaxKind::FloatingPointLiteral
            }
            Some(b'l' | b'L') if !floating => {
                self.pos += 1;
                SyntaxKind::IntegerLiteral
            }
            _ if floating => SyntaxKind::FloatingPointLiteral,
            _ => SyntaxKind::IntegerLiteral,
        }
    }

    fn scan_identifier_or_unknown(&mut self) -> SyntaxKind {
        let start = self.pos;
        let mut chars = self.source[start..].char_indices();
        let Some((_, first)) = chars.next() else {
            return SyntaxKind::EndOfFileToken;
        };

        if !is_identifier_start(first) {
            self.pos = start + first.len_utf8();
            self.error(start, self.pos, diagnostic_codes::INVALID_CHARACTER);
            return SyntaxKind::Unknown;
        }

        let mut end = self.source.len();
        for (idx, ch) in chars {
            if !is_identifier_part(ch) {
                end = start + idx;
                break;
            }
        }
        self.pos = end;
        text_to_keyword(&self.source[start..end]).unwrap_or(SyntaxKind::Identifier)
    }
}

#[inline]
fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

#[inline]
fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
