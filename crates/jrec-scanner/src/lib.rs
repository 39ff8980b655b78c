//! Java scanner/tokenizer for the jrec recovery parser.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine with snapshots for look-ahead
//! - Keyword and punctuation tables

pub mod syntax_kind;
pub use syntax_kind::{
    SyntaxKind, keyword_to_text, punctuation_to_text, text_to_keyword, token_is_identifier_or_keyword,
    token_is_keyword, token_is_literal, token_is_modifier, token_is_primitive_type,
};

pub mod scanner;
pub use scanner::{ScannerDiagnostic, ScannerSnapshot, ScannerState};
