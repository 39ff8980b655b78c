//! Modifier and declaration bit sets.

use bitflags::bitflags;
use jrec_scanner::SyntaxKind;
use serde::Serialize;

bitflags! {
    /// Declaration modifiers as written in source.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct ModifierFlags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const SYNCHRONIZED = 1 << 5;
        const VOLATILE = 1 << 6;
        const TRANSIENT = 1 << 7;
        const NATIVE = 1 << 8;
        const ABSTRACT = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;

        const VISIBILITY = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
    }
}

/// Print order of modifiers.
const MODIFIER_TEXT: &[(ModifierFlags, &str)] = &[
    (ModifierFlags::PUBLIC, "public"),
    (ModifierFlags::PRIVATE, "private"),
    (ModifierFlags::PROTECTED, "protected"),
    (ModifierFlags::STATIC, "static"),
    (ModifierFlags::FINAL, "final"),
    (ModifierFlags::SYNCHRONIZED, "synchronized"),
    (ModifierFlags::VOLATILE, "volatile"),
    (ModifierFlags::TRANSIENT, "transient"),
    (ModifierFlags::NATIVE, "native"),
    (ModifierFlags::ABSTRACT, "abstract"),
    (ModifierFlags::STRICTFP, "strictfp"),
    (ModifierFlags::DEFAULT, "default"),
];

impl ModifierFlags {
    /// Modifier for a keyword token, if it is one.
    pub fn from_token(kind: SyntaxKind) -> Option<ModifierFlags> {
        let flag = match kind {
            SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
            SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
            SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
            SyntaxKind::StaticKeyword => ModifierFlags::STATIC,
            SyntaxKind::FinalKeyword => ModifierFlags::FINAL,
            SyntaxKind::SynchronizedKeyword => ModifierFlags::SYNCHRONIZED,
            SyntaxKind::VolatileKeyword => ModifierFlags::VOLATILE,
            SyntaxKind::TransientKeyword => ModifierFlags::TRANSIENT,
            SyntaxKind::NativeKeyword => ModifierFlags::NATIVE,
            SyntaxKind::AbstractKeyword => ModifierFlags::ABSTRACT,
            SyntaxKind::StrictfpKeyword => ModifierFlags::STRICTFP,
            SyntaxKind::DefaultKeyword => ModifierFlags::DEFAULT,
            _ => return None,
        };
        Some(flag)
    }

    /// Space-separated keywords followed by a trailing space, or the empty
    /// string.
    pub fn to_source_prefix(self) -> String {
        let mut out = String::new();
        for (flag, text) in MODIFIER_TEXT {
            if self.contains(*flag) {
                out.push_str(text);
                out.push(' ');
            }
        }
        out
    }
}

bitflags! {
    /// Structural facts about a declaration established during recovery.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct DeclarationBits: u32 {
        /// Type declared by an instance creation expression.
        const IS_ANONYMOUS = 1 << 0;
        /// Type declared directly inside another type body.
        const IS_MEMBER = 1 << 1;
        /// Type declared inside executable code.
        const IS_LOCAL = 1 << 2;
        /// Declaration whose initializer or body contains a local or anonymous type.
        const HAS_LOCAL_TYPE = 1 << 3;
        /// Constructor synthesized because none was written.
        const IS_DEFAULT_CONSTRUCTOR = 1 << 4;
        /// End position was inferred when the declaration was finalized.
        const END_INFERRED = 1 << 5;
    }
}
