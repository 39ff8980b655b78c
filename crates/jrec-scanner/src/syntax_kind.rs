//! Token kinds and keyword/punctuation tables.

use serde::Serialize;

/// Token kinds produced by the scanner.
///
/// `<` and `>` are always scanned as single characters so that nested type
/// arguments (`Map<K, List<V>>`) close one level per token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum SyntaxKind {
    Unknown = 0,
    EndOfFileToken,

    // Literals
    IntegerLiteral,
    FloatingPointLiteral,
    CharacterLiteral,
    StringLiteral,
    TextBlock,

    Identifier,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    DotToken,
    DotDotDotToken,
    AtToken,
    ColonColonToken,
    QuestionToken,
    ColonToken,
    MinusGreaterThanToken,

    // Operators
    EqualsToken,
    LessThanToken,
    GreaterThanToken,
    ExclamationToken,
    TildeToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    PlusPlusToken,
    MinusMinusToken,
    AmpersandAmpersandToken,
    BarBarToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,

    // Keywords
    AbstractKeyword,
    AssertKeyword,
    BooleanKeyword,
    BreakKeyword,
    ByteKeyword,
    CaseKeyword,
    CatchKeyword,
    CharKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DefaultKeyword,
    DoKeyword,
    DoubleKeyword,
    ElseKeyword,
    EnumKeyword,
    ExtendsKeyword,
    FinalKeyword,
    FinallyKeyword,
    FloatKeyword,
    ForKeyword,
    GotoKeyword,
    IfKeyword,
    ImplementsKeyword,
    ImportKeyword,
    InstanceofKeyword,
    IntKeyword,
    InterfaceKeyword,
    LongKeyword,
    NativeKeyword,
    NewKeyword,
    PackageKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReturnKeyword,
    ShortKeyword,
    StaticKeyword,
    StrictfpKeyword,
    SuperKeyword,
    SwitchKeyword,
    SynchronizedKeyword,
    ThisKeyword,
    ThrowKeyword,
    ThrowsKeyword,
    TransientKeyword,
    TryKeyword,
    VoidKeyword,
    VolatileKeyword,
    WhileKeyword,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
}

impl SyntaxKind {
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::AbstractKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::NullKeyword;
}

/// Map identifier text to a keyword kind.
pub fn text_to_keyword(text: &str) -> Option<SyntaxKind> {
    use SyntaxKind::*;
    let kind = match text {
        "abstract" => AbstractKeyword,
        "assert" => AssertKeyword,
        "boolean" => BooleanKeyword,
        "break" => BreakKeyword,
        "byte" => ByteKeyword,
        "case" => CaseKeyword,
        "catch" => CatchKeyword,
        "char" => CharKeyword,
        "class" => ClassKeyword,
        "const" => ConstKeyword,
        "continue" => ContinueKeyword,
        "default" => DefaultKeyword,
        "do" => DoKeyword,
        "double" => DoubleKeyword,
        "else" => ElseKeyword,
        "enum" => EnumKeyword,
        "extends" => ExtendsKeyword,
        "final" => FinalKeyword,
        "finally" => FinallyKeyword,
        "float" => FloatKeyword,
        "for" => ForKeyword,
        "goto" => GotoKeyword,
        "if" => IfKeyword,
        "implements" => ImplementsKeyword,
        "import" => ImportKeyword,
        "instanceof" => InstanceofKeyword,
        "int" => IntKeyword,
        "interface" => InterfaceKeyword,
        "long" => LongKeyword,
        "native" => NativeKeyword,
        "new" => NewKeyword,
        "package" => PackageKeyword,
        "private" => PrivateKeyword,
        "protected" => ProtectedKeyword,
        "public" => PublicKeyword,
        "return" => ReturnKeyword,
        "short" => ShortKeyword,
        "static" => StaticKeyword,
        "strictfp" => StrictfpKeyword,
        "super" => SuperKeyword,
        "switch" => SwitchKeyword,
        "synchronized" => SynchronizedKeyword,
        "this" => ThisKeyword,
        "throw" => ThrowKeyword,
        "throws" => ThrowsKeyword,
        "transient" => TransientKeyword,
        "try" => TryKeyword,
        "void" => VoidKeyword,
        "volatile" => VolatileKeyword,
        "while" => WhileKeyword,
        "true" => TrueKeyword,
        "false" => FalseKeyword,
        "null" => NullKeyword,
        _ => return None,
    };
    Some(kind)
}

/// Source text of a keyword kind.
pub fn keyword_to_text(kind: SyntaxKind) -> Option<&'static str> {
    use SyntaxKind::*;
    let text = match kind {
        AbstractKeyword => "abstract",
        AssertKeyword => "assert",
        BooleanKeyword => "boolean",
        BreakKeyword => "break",
        ByteKeyword => "byte",
        CaseKeyword => "case",
        CatchKeyword => "catch",
        CharKeyword => "char",
        ClassKeyword => "class",
        ConstKeyword => "const",
        ContinueKeyword => "continue",
        DefaultKeyword => "default",
        DoKeyword => "do",
        DoubleKeyword => "double",
        ElseKeyword => "else",
        EnumKeyword => "enum",
        ExtendsKeyword => "extends",
        FinalKeyword => "final",
        FinallyKeyword => "finally",
        FloatKeyword => "float",
        ForKeyword => "for",
        GotoKeyword => "goto",
        IfKeyword => "if",
        ImplementsKeyword => "implements",
        ImportKeyword => "import",
        InstanceofKeyword => "instanceof",
        IntKeyword => "int",
        InterfaceKeyword => "interface",
        LongKeyword => "long",
        NativeKeyword => "native",
        NewKeyword => "new",
        PackageKeyword => "package",
        PrivateKeyword => "private",
        ProtectedKeyword => "protected",
        PublicKeyword => "public",
        ReturnKeyword => "return",
        ShortKeyword => "short",
        StaticKeyword => "static",
        StrictfpKeyword => "strictfp",
        SuperKeyword => "super",
        SwitchKeyword => "switch",
        SynchronizedKeyword => "synchronized",
        ThisKeyword => "this",
        ThrowKeyword => "throw",
        ThrowsKeyword => "throws",
        TransientKeyword => "transient",
        TryKeyword => "try",
        VoidKeyword => "void",
        VolatileKeyword => "volatile",
        WhileKeyword => "while",
        TrueKeyword => "true",
        FalseKeyword => "false",
        NullKeyword => "null",
        _ => return None,
    };
    Some(text)
}

/// Source text of a punctuation or operator kind.
pub fn punctuation_to_text(kind: SyntaxKind) -> Option<&'static str> {
    use SyntaxKind::*;
    let text = match kind {
        OpenBraceToken => "{",
        CloseBraceToken => "}",
        OpenParenToken => "(",
        CloseParenToken => ")",
        OpenBracketToken => "[",
        CloseBracketToken => "]",
        SemicolonToken => ";",
        CommaToken => ",",
        DotToken => ".",
        DotDotDotToken => "...",
        AtToken => "@",
        ColonColonToken => "::",
        QuestionToken => "?",
        ColonToken => ":",
        MinusGreaterThanToken => "->",
        EqualsToken => "=",
        LessThanToken => "<",
        GreaterThanToken => ">",
        ExclamationToken => "!",
        TildeToken => "~",
        PlusToken => "+",
        MinusToken => "-",
        AsteriskToken => "*",
        SlashToken => "/",
        PercentToken => "%",
        AmpersandToken => "&",
        BarToken => "|",
        CaretToken => "^",
        PlusPlusToken => "++",
        MinusMinusToken => "--",
        AmpersandAmpersandToken => "&&",
        BarBarToken => "||",
        EqualsEqualsToken => "==",
        ExclamationEqualsToken => "!=",
        PlusEqualsToken => "+=",
        MinusEqualsToken => "-=",
        AsteriskEqualsToken => "*=",
        SlashEqualsToken => "/=",
        PercentEqualsToken => "%=",
        AmpersandEqualsToken => "&=",
        BarEqualsToken => "|=",
        CaretEqualsToken => "^=",
        _ => return None,
    };
    Some(text)
}

pub fn token_is_keyword(kind: SyntaxKind) -> bool {
    kind >= SyntaxKind::FIRST_KEYWORD && kind <= SyntaxKind::LAST_KEYWORD
}

pub fn token_is_identifier_or_keyword(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || token_is_keyword(kind)
}

pub fn token_is_literal(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IntegerLiteral
            | SyntaxKind::FloatingPointLiteral
            | SyntaxKind::CharacterLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TextBlock
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
    )
}

/// Declaration modifiers. `default` is only a modifier on interface methods,
/// so callers decide about it from context.
pub fn token_is_modifier(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PublicKeyword
            | SyntaxKind::ProtectedKeyword
            | SyntaxKind::PrivateKeyword
            | SyntaxKind::StaticKeyword
            | SyntaxKind::AbstractKeyword
            | SyntaxKind::FinalKeyword
            | SyntaxKind::NativeKeyword
            | SyntaxKind::SynchronizedKeyword
            | SyntaxKind::TransientKeyword
            | SyntaxKind::VolatileKeyword
            | SyntaxKind::StrictfpKeyword
    )
}

pub fn token_is_primitive_type(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BooleanKeyword
            | SyntaxKind::ByteKeyword
            | SyntaxKind::CharKeyword
            | SyntaxKind::ShortKeyword
            | SyntaxKind::IntKeyword
            | SyntaxKind::LongKeyword
            | SyntaxKind::FloatKeyword
            | SyntaxKind::DoubleKeyword
    )
}
