//! Token classification shared by the reading routines.

use jrec_scanner::{SyntaxKind, token_is_keyword, token_is_literal, token_is_primitive_type};

/// Identifiers, keywords and literals: tokens that need a space between
/// them when printed next to each other.
pub(crate) fn is_word(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || token_is_keyword(kind) || token_is_literal(kind)
}

/// Tokens that can begin a type reference.
pub(crate) fn is_type_start(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier
        || kind == SyntaxKind::VoidKeyword
        || token_is_primitive_type(kind)
}

/// Tokens allowed between the angle brackets of type arguments or type
/// parameters.
pub(crate) fn is_type_argument_token(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::QuestionToken
            | SyntaxKind::CommaToken
            | SyntaxKind::DotToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::AtToken
            | SyntaxKind::ExtendsKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::VoidKeyword
    ) || token_is_primitive_type(kind)
}

/// Append one token of a type to `out`, spacing it the way types are
/// printed: `Map<String, List<? extends T>>`.
pub(crate) fn push_type_token(
    out: &mut String,
    prev: Option<SyntaxKind>,
    kind: SyntaxKind,
    text: &str,
) {
    if let Some(prev) = prev {
        let after_word = is_word(kind) && (is_word(prev) || prev == SyntaxKind::QuestionToken);
        if after_word || prev == SyntaxKind::CommaToken {
            out.push(' ');
        }
    }
    out.push_str(text);
}

/// Keywords that only begin member or unit level declarations. Outside
/// bodies known to balance, a capture that meets one at brace depth zero
/// has run past the end of its statement.
pub(crate) fn is_member_start_keyword(kind: SyntaxKind, prev: Option<SyntaxKind>) -> bool {
    match kind {
        SyntaxKind::PublicKeyword
        | SyntaxKind::PrivateKeyword
        | SyntaxKind::ProtectedKeyword
        | SyntaxKind::StaticKeyword
        | SyntaxKind::NativeKeyword
        | SyntaxKind::TransientKeyword
        | SyntaxKind::VolatileKeyword
        | SyntaxKind::StrictfpKeyword
        | SyntaxKind::InterfaceKeyword
        | SyntaxKind::EnumKeyword
        | SyntaxKind::PackageKeyword
        | SyntaxKind::ImportKeyword => true,
        // `Foo.class` and `void.class` are expressions.
        SyntaxKind::ClassKeyword | SyntaxKind::VoidKeyword => prev != Some(SyntaxKind::DotToken),
        _ => false,
    }
}

/// Statements that end with a block rather than a semicolon.
pub(crate) fn is_block_statement_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IfKeyword
            | SyntaxKind::ForKeyword
            | SyntaxKind::WhileKeyword
            | SyntaxKind::DoKeyword
            | SyntaxKind::TryKeyword
            | SyntaxKind::SwitchKeyword
            | SyntaxKind::SynchronizedKeyword
            | SyntaxKind::OpenBraceToken
    )
}

/// Whether `next` continues the block statement begun by `first` after one
/// of its parts ended.
pub(crate) fn continues_block_statement(first: SyntaxKind, next: SyntaxKind) -> bool {
    match next {
        SyntaxKind::ElseKeyword => first == SyntaxKind::IfKeyword,
        SyntaxKind::CatchKeyword | SyntaxKind::FinallyKeyword => first == SyntaxKind::TryKeyword,
        SyntaxKind::WhileKeyword => first == SyntaxKind::DoKeyword,
        _ => false,
    }
}

/// Tokens after an identifier that mark it as an enum constant.
pub(crate) fn follows_enum_constant(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::OpenParenToken
            | SyntaxKind::CommaToken
            | SyntaxKind::SemicolonToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::CloseBraceToken
            | SyntaxKind::EndOfFileToken
    )
}

/// Tokens that cannot begin any statement; the reader reports and skips them.
pub(crate) fn cannot_start_statement(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CloseParenToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::CommaToken
            | SyntaxKind::DotToken
            | SyntaxKind::DotDotDotToken
            | SyntaxKind::ColonColonToken
            | SyntaxKind::QuestionToken
            | SyntaxKind::ColonToken
            | SyntaxKind::MinusGreaterThanToken
            | SyntaxKind::EqualsToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::SlashToken
            | SyntaxKind::PercentToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::BarToken
            | SyntaxKind::CaretToken
            | SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarBarToken
            | SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::PlusEqualsToken
            | SyntaxKind::MinusEqualsToken
            | SyntaxKind::AsteriskEqualsToken
            | SyntaxKind::SlashEqualsToken
            | SyntaxKind::PercentEqualsToken
            | SyntaxKind::AmpersandEqualsToken
            | SyntaxKind::BarEqualsToken
            | SyntaxKind::CaretEqualsToken
            | SyntaxKind::Unknown
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tokens_are_spaced_like_source() {
        let mut out = String::new();
        let tokens = [
            (SyntaxKind::Identifier, "Map"),
            (SyntaxKind::LessThanToken, "<"),
            (SyntaxKind::Identifier, "K"),
            (SyntaxKind::CommaToken, ","),
            (SyntaxKind::QuestionToken, "?"),
            (SyntaxKind::ExtendsKeyword, "extends"),
            (SyntaxKind::Identifier, "V"),
            (SyntaxKind::GreaterThanToken, ">"),
        ];
        let mut prev = None;
        for (kind, text) in tokens {
            push_type_token(&mut out, prev, kind, text);
            prev = Some(kind);
        }
        assert_eq!(out, "Map<K, ? extends V>");
    }

    #[test]
    fn class_literals_do_not_stop_a_capture() {
        assert!(is_member_start_keyword(SyntaxKind::ClassKeyword, None));
        assert!(!is_member_start_keyword(
            SyntaxKind::ClassKeyword,
            Some(SyntaxKind::DotToken)
        ));
        assert!(!is_member_start_keyword(SyntaxKind::FinalKeyword, None));
    }

    #[test]
    fn else_only_continues_an_if() {
        assert!(continues_block_statement(SyntaxKind::IfKeyword, SyntaxKind::ElseKeyword));
        assert!(!continues_block_statement(SyntaxKind::ForKeyword, SyntaxKind::ElseKeyword));
        assert!(continues_block_statement(SyntaxKind::DoKeyword, SyntaxKind::WhileKeyword));
    }
}
