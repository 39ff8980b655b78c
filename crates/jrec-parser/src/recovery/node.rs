//! Recovery nodes and the fragments they absorb.
//!
//! Nodes live in one arena owned by the session and refer to each other by
//! `RecoveryIndex`. The parent index is a back-reference only; children are
//! owned through the per-variant queues.

use super::attributes::PendingAttributes;
use super::balance::BracketBalance;
use crate::ast::{
    CompilationUnit, FieldDeclaration, FieldKind, ImportReference, MethodDeclaration,
    PackageDeclaration, Statement, TypeDeclaration, TypeKind,
};
use jrec_common::{Span, Spanned};
use std::fmt;

/// Index of a node in the recovery arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecoveryIndex(pub u32);

impl RecoveryIndex {
    pub const NONE: RecoveryIndex = RecoveryIndex(u32::MAX);
    /// The unit node is always created first.
    pub const ROOT: RecoveryIndex = RecoveryIndex(0);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RecoveryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "#none")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Variant tag of a recovery node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecoveryKind {
    Unit,
    TypeBody,
    Field,
    Initializer,
    Method,
    Statement,
}

impl RecoveryKind {
    /// Executable bodies: locals, statements and local types live here.
    pub const fn is_executable(self) -> bool {
        matches!(self, RecoveryKind::Method | RecoveryKind::Initializer)
    }

    /// Variants that open a brace-delimited body of their own.
    pub const fn has_body(self) -> bool {
        matches!(
            self,
            RecoveryKind::TypeBody | RecoveryKind::Method | RecoveryKind::Initializer
        )
    }
}

// =============================================================================
// Fragments
// =============================================================================

/// A declaration or statement handed to recovery by the reader.
///
/// A fragment with a known end is complete; one whose span end is unknown is
/// still being read and becomes the active node when absorbed.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    Package(PackageDeclaration),
    Import(ImportReference),
    Type(TypeDeclaration),
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Statement(Statement),
}

impl Fragment {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fragment::Package(_) => "package",
            Fragment::Import(_) => "import",
            Fragment::Type(_) => "type",
            Fragment::Field(f) => match f.kind {
                FieldKind::Field => "field",
                FieldKind::EnumConstant => "enum constant",
                FieldKind::Initializer => "initializer",
            },
            Fragment::Method(_) => "method",
            Fragment::Statement(_) => "statement",
        }
    }

    /// Name used in advisory messages.
    pub fn display_name(&self) -> String {
        match self {
            Fragment::Package(p) => p.name.clone(),
            Fragment::Import(i) => i.name.clone(),
            Fragment::Type(t) => match &t.allocation {
                Some(header) => format!("new {}()", header.ty.to_source()),
                None => t.name.clone(),
            },
            Fragment::Field(f) if f.kind == FieldKind::Initializer => "{...}".to_string(),
            Fragment::Field(f) => f.name.clone(),
            Fragment::Method(m) => m.name.clone(),
            Fragment::Statement(_) => String::new(),
        }
    }
}

impl Spanned for Fragment {
    fn span(&self) -> Span {
        match self {
            Fragment::Package(p) => p.span,
            Fragment::Import(i) => i.span,
            Fragment::Type(t) => t.declaration_span,
            Fragment::Field(f) => f.declaration_span,
            Fragment::Method(m) => m.declaration_span,
            Fragment::Statement(s) => s.span,
        }
    }
}

// =============================================================================
// Per-variant data
// =============================================================================

/// The synthetic root: package, imports and top-level types.
#[derive(Clone, Debug)]
pub struct UnitData {
    pub unit: CompilationUnit,
    pub types: Vec<RecoveryIndex>,
    pub pending: PendingAttributes,
}

#[derive(Clone, Debug)]
pub struct TypeBodyData {
    pub decl: TypeDeclaration,
    pub member_types: Vec<RecoveryIndex>,
    /// Fields, enum constants and initializer blocks, in discovery order.
    pub fields: Vec<RecoveryIndex>,
    pub methods: Vec<RecoveryIndex>,
    /// Enum bodies start with their constant list.
    pub inside_enum_constants: bool,
    pub pending: PendingAttributes,
}

#[derive(Clone, Debug)]
pub struct FieldData {
    pub decl: FieldDeclaration,
    /// Anonymous types that make up the initializer value.
    pub anonymous_types: Vec<RecoveryIndex>,
    /// Set once the initializer value is complete.
    pub initializer_captured: bool,
}

/// Statements, local variables and local or anonymous types of an
/// executable body, in source order.
#[derive(Clone, Debug)]
pub struct BodyData<D> {
    pub decl: D,
    pub statements: Vec<RecoveryIndex>,
    pub pending: PendingAttributes,
}

pub type InitializerData = BodyData<FieldDeclaration>;
pub type MethodData = BodyData<MethodDeclaration>;

#[derive(Clone, Debug)]
pub enum RecoveryData {
    Unit(Box<UnitData>),
    TypeBody(Box<TypeBodyData>),
    Field(Box<FieldData>),
    Initializer(Box<InitializerData>),
    Method(Box<MethodData>),
    Statement(Box<Statement>),
}

#[derive(Clone, Debug)]
pub struct RecoveryNode {
    pub parent: RecoveryIndex,
    pub balance: BracketBalance,
    pub found_opening_brace: bool,
    /// The wrapped declaration had no known end when it arrived.
    pub created_open: bool,
    pub data: RecoveryData,
}

impl RecoveryNode {
    pub fn new(parent: RecoveryIndex, balance: u32, data: RecoveryData) -> Self {
        let mut node = RecoveryNode {
            parent,
            balance: BracketBalance::new(balance),
            found_opening_brace: balance > 0,
            created_open: false,
            data,
        };
        node.created_open = !node.span().is_end_known();
        node
    }

    pub fn kind(&self) -> RecoveryKind {
        match &self.data {
            RecoveryData::Unit(_) => RecoveryKind::Unit,
            RecoveryData::TypeBody(_) => RecoveryKind::TypeBody,
            RecoveryData::Field(_) => RecoveryKind::Field,
            RecoveryData::Initializer(_) => RecoveryKind::Initializer,
            RecoveryData::Method(_) => RecoveryKind::Method,
            RecoveryData::Statement(_) => RecoveryKind::Statement,
        }
    }

    /// Span of the wrapped declaration or statement.
    pub fn span(&self) -> Span {
        match &self.data {
            RecoveryData::Unit(d) => d.unit.span,
            RecoveryData::TypeBody(d) => d.decl.declaration_span,
            RecoveryData::Field(d) => d.decl.declaration_span,
            RecoveryData::Initializer(d) => d.decl.declaration_span,
            RecoveryData::Method(d) => d.decl.declaration_span,
            RecoveryData::Statement(s) => s.span,
        }
    }

    pub(crate) fn span_mut(&mut self) -> &mut Span {
        match &mut self.data {
            RecoveryData::Unit(d) => &mut d.unit.span,
            RecoveryData::TypeBody(d) => &mut d.decl.declaration_span,
            RecoveryData::Field(d) => &mut d.decl.declaration_span,
            RecoveryData::Initializer(d) => &mut d.decl.declaration_span,
            RecoveryData::Method(d) => &mut d.decl.declaration_span,
            RecoveryData::Statement(s) => &mut s.span,
        }
    }

    /// The unit never closes; every other node is open until its end is set.
    pub fn is_open(&self) -> bool {
        match self.data {
            RecoveryData::Unit(_) => true,
            _ => !self.span().is_end_known(),
        }
    }

    /// Close the node at `end`. A known end is never overwritten.
    pub(crate) fn close_at(&mut self, end: u32) -> bool {
        if matches!(self.data, RecoveryData::Unit(_)) {
            return false;
        }
        self.span_mut().close_at(end)
    }

    pub fn pending(&self) -> Option<&PendingAttributes> {
        match &self.data {
            RecoveryData::Unit(d) => Some(&d.pending),
            RecoveryData::TypeBody(d) => Some(&d.pending),
            RecoveryData::Initializer(d) => Some(&d.pending),
            RecoveryData::Method(d) => Some(&d.pending),
            RecoveryData::Field(_) | RecoveryData::Statement(_) => None,
        }
    }

    pub(crate) fn pending_mut(&mut self) -> Option<&mut PendingAttributes> {
        match &mut self.data {
            RecoveryData::Unit(d) => Some(&mut d.pending),
            RecoveryData::TypeBody(d) => Some(&mut d.pending),
            RecoveryData::Initializer(d) => Some(&mut d.pending),
            RecoveryData::Method(d) => Some(&mut d.pending),
            RecoveryData::Field(_) | RecoveryData::Statement(_) => None,
        }
    }

    /// Record the offset of the body's opening brace.
    pub(crate) fn set_body_start(&mut self, offset: u32) {
        match &mut self.data {
            RecoveryData::TypeBody(d) => {
                if d.decl.body_start.is_none() {
                    d.decl.body_start = Some(offset);
                }
            }
            RecoveryData::Method(d) => {
                if d.decl.body.is_none() {
                    d.decl.body = Some(crate::ast::Block::empty(Span::open(offset)));
                }
            }
            RecoveryData::Initializer(d) => {
                if d.decl.block.is_none() {
                    d.decl.block = Some(crate::ast::Block::empty(Span::open(offset)));
                }
            }
            _ => {}
        }
    }

    /// Children in discovery order, across all queues of the node.
    pub fn children(&self) -> Vec<RecoveryIndex> {
        match &self.data {
            RecoveryData::Unit(d) => d.types.clone(),
            RecoveryData::TypeBody(d) => {
                let mut out = Vec::with_capacity(
                    d.member_types.len() + d.fields.len() + d.methods.len(),
                );
                out.extend_from_slice(&d.member_types);
                out.extend_from_slice(&d.fields);
                out.extend_from_slice(&d.methods);
                out.sort_unstable();
                out
            }
            RecoveryData::Field(d) => d.anonymous_types.clone(),
            RecoveryData::Initializer(d) => d.statements.clone(),
            RecoveryData::Method(d) => d.statements.clone(),
            RecoveryData::Statement(_) => Vec::new(),
        }
    }

    /// Name of the wrapped declaration, for logs and advisories.
    pub fn name(&self) -> &str {
        match &self.data {
            RecoveryData::Unit(d) => &d.unit.file_name,
            RecoveryData::TypeBody(d) => &d.decl.name,
            RecoveryData::Field(d) => &d.decl.name,
            RecoveryData::Initializer(_) => "{...}",
            RecoveryData::Method(d) => &d.decl.name,
            RecoveryData::Statement(_) => "",
        }
    }

    pub fn type_kind(&self) -> Option<TypeKind> {
        match &self.data {
            RecoveryData::TypeBody(d) => Some(d.decl.kind),
            _ => None,
        }
    }
}
