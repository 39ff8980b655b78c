//! Consumer-facing declaration tree.
//!
//! These are the values recovery hands out: the reader builds fragments of
//! them, the recovery session folds the fragments together, and
//! finalization produces a complete `CompilationUnit`. Every declaration
//! carries a `Span`; spans of declarations still being recovered may have an
//! unknown end (`Span::UNKNOWN_END`), finalized trees never do.

pub mod flags;
pub use flags::{DeclarationBits, ModifierFlags};

use jrec_common::{Span, Spanned};
use serde::Serialize;

// =============================================================================
// Compilation unit
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompilationUnit {
    pub file_name: String,
    pub package: Option<PackageDeclaration>,
    pub imports: Vec<ImportReference>,
    pub types: Vec<TypeDeclaration>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackageDeclaration {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportReference {
    pub name: String,
    pub on_demand: bool,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub type_name: String,
    pub span: Span,
}

/// A type as written, including type arguments (`Map<K, V>`), with array
/// dimensions counted separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeReference {
    pub name: String,
    pub dimensions: u32,
    pub span: Span,
}

impl TypeReference {
    pub fn is_void(&self) -> bool {
        self.dimensions == 0 && self.name == "void"
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    pub fn to_source(&self) -> String {
        let mut out = self.name.clone();
        for _ in 0..self.dimensions {
            out.push_str("[]");
        }
        out
    }
}

// =============================================================================
// Types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }

    /// Interface and annotation members are implicitly static and final.
    pub const fn is_interface_like(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}

/// The `new T(args)` part of an anonymous type declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocationHeader {
    pub ty: TypeReference,
    pub arguments: Vec<Expression>,
    pub start: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeDeclaration {
    pub kind: TypeKind,
    /// Empty for anonymous types.
    pub name: String,
    pub name_span: Span,
    pub modifiers: ModifierFlags,
    pub annotations: Vec<Annotation>,
    pub type_parameters: Vec<String>,
    pub superclass: Option<TypeReference>,
    pub super_interfaces: Vec<TypeReference>,
    pub member_types: Vec<TypeDeclaration>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    /// Present when the type is the body of an instance creation.
    pub allocation: Option<AllocationHeader>,
    pub bits: DeclarationBits,
    pub declaration_span: Span,
    /// Offset of the opening brace of the body, once seen.
    pub body_start: Option<u32>,
}

impl TypeDeclaration {
    pub fn new(kind: TypeKind, name: impl Into<String>, declaration_span: Span) -> Self {
        TypeDeclaration {
            kind,
            name: name.into(),
            name_span: Span::at(declaration_span.start),
            modifiers: ModifierFlags::empty(),
            annotations: Vec::new(),
            type_parameters: Vec::new(),
            superclass: None,
            super_interfaces: Vec::new(),
            member_types: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            allocation: None,
            bits: DeclarationBits::empty(),
            declaration_span,
            body_start: None,
        }
    }

    /// An anonymous class body introduced by `new ty(arguments) {`.
    pub fn anonymous(header: AllocationHeader) -> Self {
        let mut decl = TypeDeclaration::new(TypeKind::Class, "", Span::open(header.start));
        decl.name_span = header.ty.span;
        decl.bits = DeclarationBits::IS_ANONYMOUS;
        decl.allocation = Some(header);
        decl
    }

    pub fn is_anonymous(&self) -> bool {
        self.bits.contains(DeclarationBits::IS_ANONYMOUS)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.methods
            .iter()
            .filter(|m| m.kind == MethodKind::Constructor)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&MethodDeclaration> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_member_type(&self, name: &str) -> Option<&TypeDeclaration> {
        self.member_types.iter().find(|t| t.name == name)
    }
}

impl Spanned for TypeDeclaration {
    fn span(&self) -> Span {
        self.declaration_span
    }
}

// =============================================================================
// Fields and initializers
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    Field,
    EnumConstant,
    /// Static or instance initializer block; it has no type and no name.
    Initializer,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDeclaration {
    pub kind: FieldKind,
    pub name: String,
    pub name_span: Span,
    /// `None` for enum constants and initializer blocks.
    pub ty: Option<TypeReference>,
    pub modifiers: ModifierFlags,
    pub annotations: Vec<Annotation>,
    pub initialization: Option<Expression>,
    /// Body of an initializer block.
    pub block: Option<Block>,
    pub bits: DeclarationBits,
    pub declaration_span: Span,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, ty: TypeReference, declaration_span: Span) -> Self {
        FieldDeclaration {
            kind: FieldKind::Field,
            name: name.into(),
            name_span: Span::at(declaration_span.start),
            ty: Some(ty),
            modifiers: ModifierFlags::empty(),
            annotations: Vec::new(),
            initialization: None,
            block: None,
            bits: DeclarationBits::empty(),
            declaration_span,
        }
    }

    pub fn enum_constant(name: impl Into<String>, name_span: Span, declaration_span: Span) -> Self {
        FieldDeclaration {
            kind: FieldKind::EnumConstant,
            name: name.into(),
            name_span,
            ty: None,
            modifiers: ModifierFlags::empty(),
            annotations: Vec::new(),
            initialization: None,
            block: None,
            bits: DeclarationBits::empty(),
            declaration_span,
        }
    }

    /// An initializer block; `modifiers` is either empty or `STATIC`.
    pub fn initializer(modifiers: ModifierFlags, declaration_span: Span) -> Self {
        FieldDeclaration {
            kind: FieldKind::Initializer,
            name: String::new(),
            name_span: Span::at(declaration_span.start),
            ty: None,
            modifiers,
            annotations: Vec::new(),
            initialization: None,
            block: None,
            bits: DeclarationBits::empty(),
            declaration_span,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }
}

impl Spanned for FieldDeclaration {
    fn span(&self) -> Span {
        self.declaration_span
    }
}

// =============================================================================
// Methods
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MethodKind {
    Method,
    Constructor,
    /// Synthesized class initialization routine.
    Clinit,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub ty: TypeReference,
    pub modifiers: ModifierFlags,
    pub is_varargs: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MethodDeclaration {
    pub kind: MethodKind,
    pub name: String,
    pub name_span: Span,
    pub type_parameters: Vec<String>,
    /// `None` for constructors and the class initializer.
    pub return_type: Option<TypeReference>,
    pub parameters: Vec<Argument>,
    pub thrown: Vec<TypeReference>,
    pub modifiers: ModifierFlags,
    pub annotations: Vec<Annotation>,
    /// `None` for abstract, native and interface methods written with `;`.
    pub body: Option<Block>,
    /// Annotation type member default value.
    pub default_value: Option<Expression>,
    pub bits: DeclarationBits,
    pub declaration_span: Span,
}

impl MethodDeclaration {
    pub fn new(kind: MethodKind, name: impl Into<String>, declaration_span: Span) -> Self {
        MethodDeclaration {
            kind,
            name: name.into(),
            name_span: Span::at(declaration_span.start),
            type_parameters: Vec::new(),
            return_type: None,
            parameters: Vec::new(),
            thrown: Vec::new(),
            modifiers: ModifierFlags::empty(),
            annotations: Vec::new(),
            body: None,
            default_value: None,
            bits: DeclarationBits::empty(),
            declaration_span,
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    pub fn is_default_constructor(&self) -> bool {
        self.bits.contains(DeclarationBits::IS_DEFAULT_CONSTRUCTOR)
    }
}

impl Spanned for MethodDeclaration {
    fn span(&self) -> Span {
        self.declaration_span
    }
}

// =============================================================================
// Statements and expressions
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    pub fn empty(span: Span) -> Self {
        Block {
            statements: Vec::new(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum StatementKind {
    Expression(Expression),
    LocalDeclaration(Box<FieldDeclaration>),
    LocalType(Box<TypeDeclaration>),
    Return(Option<Expression>),
    Block(Block),
    ExplicitConstructorCall {
        is_super: bool,
        arguments: Vec<Expression>,
    },
    /// Any other statement, kept as whitespace-normalized source text.
    Opaque(String),
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Statement { kind, span }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self.kind, StatementKind::Expression(_))
    }
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ExpressionKind {
    /// Literal token text, e.g. `42`, `"s"`, `null`.
    Literal(String),
    /// Simple or qualified name.
    Name(String),
    ArrayInitializer(Vec<Expression>),
    Allocation(Box<AllocationExpression>),
    /// Any other expression, kept as whitespace-normalized source text.
    Opaque(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocationExpression {
    pub ty: TypeReference,
    pub arguments: Vec<Expression>,
    pub anonymous_type: Option<TypeDeclaration>,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Expression { kind, span }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExpressionKind::Literal(_))
    }
}

impl Spanned for Expression {
    fn span(&self) -> Span {
        self.span
    }
}
