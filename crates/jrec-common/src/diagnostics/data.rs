//! Diagnostic message table.
//!
//! Codes are grouped by producer: 1000-1099 recovery, 1100-1199 reader,
//! 1200-1299 scanner.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const UNEXPECTED_CLOSING_BRACE: u32 = 1001;
    pub const UNEXPECTED_OPENING_BRACE: u32 = 1002;
    pub const DECLARATION_OUTSIDE_TYPE: u32 = 1003;
    pub const ORPHANED_ANONYMOUS_TYPE: u32 = 1004;
    pub const ENUM_CONSTANT_AFTER_MEMBERS: u32 = 1005;
    pub const DISCARDED_ATTRIBUTES: u32 = 1006;
    pub const MISSING_CLOSING_BRACE: u32 = 1007;
    pub const DUPLICATE_FIELD: u32 = 1008;
    pub const DUPLICATE_METHOD: u32 = 1009;
    pub const DUPLICATE_DEFAULT_CONSTRUCTOR: u32 = 1010;
    pub const STATEMENT_OUTSIDE_BODY: u32 = 1011;

    pub const TOKEN_EXPECTED: u32 = 1101;
    pub const UNEXPECTED_TOKEN: u32 = 1102;
    pub const IDENTIFIER_EXPECTED: u32 = 1103;
    pub const RETURN_TYPE_MISSING: u32 = 1104;
    pub const INCOMPLETE_DECLARATION: u32 = 1105;

    pub const UNTERMINATED_STRING_LITERAL: u32 = 1201;
    pub const UNTERMINATED_COMMENT: u32 = 1202;
    pub const UNTERMINATED_CHARACTER_LITERAL: u32 = 1203;
    pub const INVALID_CHARACTER: u32 = 1204;
    pub const SOURCE_TOO_LARGE: u32 = 1205;
}

pub mod diagnostic_messages {
    pub const UNEXPECTED_CLOSING_BRACE: &str = "Unexpected '}' outside of any declaration.";
    pub const UNEXPECTED_OPENING_BRACE: &str = "Unexpected '{' outside of any declaration.";
    pub const DECLARATION_OUTSIDE_TYPE: &str =
        "Declaration '{0}' is not inside a type and was dropped.";
    pub const ORPHANED_ANONYMOUS_TYPE: &str =
        "Anonymous type '{0}' cannot appear here and was dropped.";
    pub const ENUM_CONSTANT_AFTER_MEMBERS: &str = "Enum constant '{0}' must precede other members.";
    pub const DISCARDED_ATTRIBUTES: &str =
        "Modifiers or annotations are not followed by a declaration.";
    pub const MISSING_CLOSING_BRACE: &str = "'}' expected to complete '{0}'.";
    pub const DUPLICATE_FIELD: &str = "Duplicate field '{0}'.";
    pub const DUPLICATE_METHOD: &str = "Duplicate method '{0}' with {1} parameter(s).";
    pub const DUPLICATE_DEFAULT_CONSTRUCTOR: &str =
        "Duplicate default constructor for '{0}' discarded.";
    pub const STATEMENT_OUTSIDE_BODY: &str =
        "Statement is not inside a method or initializer and was dropped.";

    pub const TOKEN_EXPECTED: &str = "'{0}' expected.";
    pub const UNEXPECTED_TOKEN: &str = "Syntax error on token '{0}', delete this token.";
    pub const IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const RETURN_TYPE_MISSING: &str = "Return type for the method '{0}' is missing.";
    pub const INCOMPLETE_DECLARATION: &str = "Declaration '{0}' is incomplete.";

    pub const UNTERMINATED_STRING_LITERAL: &str =
        "String literal is not properly closed by a double-quote.";
    pub const UNTERMINATED_COMMENT: &str = "Unexpected end of comment.";
    pub const UNTERMINATED_CHARACTER_LITERAL: &str = "Invalid character constant.";
    pub const INVALID_CHARACTER: &str = "Invalid character '{0}'.";
    pub const SOURCE_TOO_LARGE: &str = "Source is too large; reading stopped here.";
}

macro_rules! message {
    ($name:ident, $category:ident) => {
        DiagnosticMessage {
            code: diagnostic_codes::$name,
            category: DiagnosticCategory::$category,
            message: diagnostic_messages::$name,
        }
    };
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    message!(UNEXPECTED_CLOSING_BRACE, Warning),
    message!(UNEXPECTED_OPENING_BRACE, Warning),
    message!(DECLARATION_OUTSIDE_TYPE, Warning),
    message!(ORPHANED_ANONYMOUS_TYPE, Warning),
    message!(ENUM_CONSTANT_AFTER_MEMBERS, Warning),
    message!(DISCARDED_ATTRIBUTES, Warning),
    message!(MISSING_CLOSING_BRACE, Error),
    message!(DUPLICATE_FIELD, Warning),
    message!(DUPLICATE_METHOD, Warning),
    message!(DUPLICATE_DEFAULT_CONSTRUCTOR, Warning),
    message!(STATEMENT_OUTSIDE_BODY, Warning),
    message!(TOKEN_EXPECTED, Error),
    message!(UNEXPECTED_TOKEN, Error),
    message!(IDENTIFIER_EXPECTED, Error),
    message!(RETURN_TYPE_MISSING, Error),
    message!(INCOMPLETE_DECLARATION, Error),
    message!(UNTERMINATED_STRING_LITERAL, Error),
    message!(UNTERMINATED_COMMENT, Error),
    message!(UNTERMINATED_CHARACTER_LITERAL, Error),
    message!(INVALID_CHARACTER, Error),
    message!(SOURCE_TOO_LARGE, Error),
];
