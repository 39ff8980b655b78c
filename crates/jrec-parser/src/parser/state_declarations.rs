//! Parser state - unit and member declarations
//!
//! Declaration headers are read completely and handed to the session as one
//! fragment. A header followed by `{` also consumes that brace, so a `{`
//! met by the top-level loop in a type body always starts an initializer.

use super::parse_rules::{follows_enum_constant, is_type_start};
use super::state::ParserState;
use super::state_expressions::{
    Capture, CaptureMode, InitializerValue, expression_from_tokens, opaque_expression,
};
use crate::ast::{
    AllocationExpression, AllocationHeader, Argument, Block, Expression, ExpressionKind,
    FieldDeclaration, ImportReference, MethodDeclaration, MethodKind, ModifierFlags,
    PackageDeclaration, Statement, StatementKind, TypeDeclaration, TypeKind, TypeReference,
};
use crate::recovery::{Fragment, ReadingContext};
use jrec_common::Span;
use jrec_common::diagnostics::diagnostic_codes;
use jrec_scanner::SyntaxKind;
use tracing::trace;

/// A method or constructor header read up to its name.
pub(crate) struct MethodHeader {
    pub start: u32,
    pub kind: MethodKind,
    pub type_parameters: Vec<String>,
    pub return_type: Option<TypeReference>,
    pub name: String,
    pub name_span: Span,
}

/// A declaration that owns an executable body.
pub(crate) enum BodyOwner {
    Method(MethodDeclaration),
    Initializer(FieldDeclaration),
}

impl BodyOwner {
    fn into_fragment(self) -> Fragment {
        match self {
            BodyOwner::Method(method) => Fragment::Method(method),
            BodyOwner::Initializer(field) => Fragment::Field(field),
        }
    }

    /// The declaration complete with an empty body spanning `body`.
    fn with_skipped_body(self, body: Span) -> Fragment {
        match self {
            BodyOwner::Method(mut method) => {
                method.body = Some(Block::empty(body));
                method.declaration_span.close_at(body.end);
                Fragment::Method(method)
            }
            BodyOwner::Initializer(mut field) => {
                field.block = Some(Block::empty(body));
                field.declaration_span.close_at(body.end);
                Fragment::Field(field)
            }
        }
    }
}

impl ParserState {
    // =========================================================================
    // Package and imports
    // =========================================================================

    pub(crate) fn parse_package_declaration(&mut self) {
        let start = self.token_pos();
        self.next_token();
        let name = if self.is_token(SyntaxKind::Identifier) {
            self.parse_qualified_name()
        } else {
            self.parse_error_at(self.token_span(), diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
            String::new()
        };
        let end = self.parse_declaration_terminator();
        self.session.absorb(
            Fragment::Package(PackageDeclaration {
                name,
                annotations: Vec::new(),
                span: Span::new(start, end),
            }),
            0,
        );
    }

    pub(crate) fn parse_import_declaration(&mut self) {
        let start = self.token_pos();
        self.next_token();
        let is_static = self.parse_optional(SyntaxKind::StaticKeyword);
        if !self.is_token(SyntaxKind::Identifier) {
            self.parse_error_at(self.token_span(), diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
            self.parse_declaration_terminator();
            return;
        }
        let name = self.parse_qualified_name();
        let mut on_demand = false;
        if self.is_token(SyntaxKind::DotToken) && self.peek_token() == SyntaxKind::AsteriskToken {
            self.next_token();
            self.next_token();
            on_demand = true;
        }
        let end = self.parse_declaration_terminator();
        self.session.absorb(
            Fragment::Import(ImportReference {
                name,
                on_demand,
                is_static,
                span: Span::new(start, end),
            }),
            0,
        );
    }

    /// Consume the `;` ending a declaration and return the declaration end.
    fn parse_declaration_terminator(&mut self) -> u32 {
        if self.is_token(SyntaxKind::SemicolonToken) {
            let end = self.token_end();
            self.next_token();
            end
        } else {
            self.report_token_expected(";");
            self.prev_token_end
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// `class`, `interface`, `enum` or `@interface` header. The current
    /// token is the keyword (or the `@`).
    pub(crate) fn parse_type_declaration(&mut self) {
        let start = self.token_pos();
        let kind = match self.token() {
            SyntaxKind::ClassKeyword => TypeKind::Class,
            SyntaxKind::InterfaceKeyword => TypeKind::Interface,
            SyntaxKind::EnumKeyword => TypeKind::Enum,
            SyntaxKind::AtToken => {
                self.next_token();
                TypeKind::Annotation
            }
            _ => return,
        };
        self.next_token();

        let (name, name_span) = if self.is_token(SyntaxKind::Identifier) {
            let name = (self.token_text(), self.token_span());
            self.next_token();
            name
        } else {
            self.parse_error_at(self.token_span(), diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
            (String::new(), Span::at(self.prev_token_end))
        };
        let mut decl = TypeDeclaration::new(kind, name, Span::open(start));
        decl.name_span = name_span;
        if self.is_token(SyntaxKind::LessThanToken) {
            decl.type_parameters = self.parse_type_parameters();
        }

        loop {
            match self.token() {
                SyntaxKind::ExtendsKeyword => {
                    self.next_token();
                    let mut types = self.parse_type_list();
                    if kind.is_interface_like() || types.is_empty() {
                        decl.super_interfaces.append(&mut types);
                    } else {
                        decl.superclass = Some(types.remove(0));
                        decl.super_interfaces.append(&mut types);
                    }
                }
                SyntaxKind::ImplementsKeyword => {
                    self.next_token();
                    let mut types = self.parse_type_list();
                    decl.super_interfaces.append(&mut types);
                }
                SyntaxKind::Identifier if self.scanner.token_text() == "permits" => {
                    self.next_token();
                    self.parse_type_list();
                }
                _ => break,
            }
        }

        trace!(name = %decl.name, kind = kind.keyword(), start, "type header");
        let has_body = self.is_token(SyntaxKind::OpenBraceToken);
        self.session.absorb(Fragment::Type(decl), 0);
        if has_body {
            self.session.opening_brace_consumed(self.token_pos());
            self.next_token();
        } else {
            self.report_token_expected("{");
        }
    }

    /// `new T(args) {`; the current token is the `{`.
    pub(crate) fn parse_anonymous_body(&mut self, header: AllocationHeader) {
        trace!(ty = %header.ty.name, start = header.start, "anonymous type");
        self.session
            .absorb(Fragment::Type(TypeDeclaration::anonymous(header)), 0);
        self.session.opening_brace_consumed(self.token_pos());
        self.next_token();
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// A member of a type body, or a declaration found at unit level.
    pub(crate) fn parse_member_declaration(&mut self, context: &ReadingContext) {
        let type_name = match context {
            ReadingContext::TypeBody {
                name,
                enum_constants,
                ..
            } => {
                if *enum_constants
                    && self.is_token(SyntaxKind::Identifier)
                    && follows_enum_constant(self.peek_token())
                {
                    let enum_name = name.clone();
                    self.parse_enum_constant(enum_name);
                    return;
                }
                name.as_str()
            }
            _ => "",
        };

        let start = self.token_pos();
        let type_parameters = if self.is_token(SyntaxKind::LessThanToken) {
            self.parse_type_parameters()
        } else {
            Vec::new()
        };

        // Constructor, or a method written without its return type.
        if self.is_token(SyntaxKind::Identifier) && self.peek_token() == SyntaxKind::OpenParenToken {
            let name = self.token_text();
            let name_span = self.token_span();
            self.next_token();
            let kind = if !type_name.is_empty() && name == type_name {
                MethodKind::Constructor
            } else {
                self.parse_error_at(name_span, diagnostic_codes::RETURN_TYPE_MISSING, &[&name]);
                MethodKind::Method
            };
            self.parse_method_declaration(MethodHeader {
                start,
                kind,
                type_parameters,
                return_type: None,
                name,
                name_span,
            });
            return;
        }

        let snapshot = self.save();
        if let Some(ty) = self.parse_type_reference() {
            if self.is_token(SyntaxKind::Identifier) {
                self.parse_typed_declaration(start, type_parameters, ty, false, false);
                return;
            }
            self.restore(snapshot);
        }
        self.parse_misplaced_statement();
    }

    /// Text in a type body or at unit level that is no declaration. It is
    /// read as a statement so recovery can decide where it goes.
    fn parse_misplaced_statement(&mut self) {
        let kind = self.token();
        if !is_type_start(kind) && !self.can_start_misplaced_statement(kind) {
            self.report_unexpected_token();
            self.next_token();
            return;
        }
        self.parse_captured_statement(false);
    }

    fn can_start_misplaced_statement(&self, kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::ThisKeyword
                | SyntaxKind::SuperKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::IfKeyword
                | SyntaxKind::ForKeyword
                | SyntaxKind::WhileKeyword
                | SyntaxKind::DoKeyword
                | SyntaxKind::TryKeyword
                | SyntaxKind::SwitchKeyword
                | SyntaxKind::ThrowKeyword
                | SyntaxKind::OpenParenToken
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
        )
    }

    /// After a type, with the current token at the declared name: a method
    /// when `(` follows the name, fields otherwise.
    pub(crate) fn parse_typed_declaration(
        &mut self,
        start: u32,
        type_parameters: Vec<String>,
        ty: TypeReference,
        executable: bool,
        balanced: bool,
    ) {
        let name = self.token_text();
        let name_span = self.token_span();
        self.next_token();
        if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_method_declaration(MethodHeader {
                start,
                kind: MethodKind::Method,
                type_parameters,
                return_type: Some(ty),
                name,
                name_span,
            });
        } else {
            self.parse_field_declarators(start, ty, name, name_span, executable, balanced);
        }
    }

    // =========================================================================
    // Methods
    // =========================================================================

    /// Parameters, throws clause and body of a method; the current token is
    /// the `(` after its name.
    pub(crate) fn parse_method_declaration(&mut self, header: MethodHeader) {
        let mut decl = MethodDeclaration::new(header.kind, header.name, Span::open(header.start));
        decl.name_span = header.name_span;
        decl.type_parameters = header.type_parameters;
        decl.return_type = header.return_type;

        self.next_token();
        let closed = self.parse_parameter_list(&mut decl.parameters);
        if closed {
            let dimensions = self.parse_dimensions();
            if let Some(return_type) = decl.return_type.as_mut() {
                return_type.dimensions += dimensions;
            }
            if self.parse_optional(SyntaxKind::ThrowsKeyword) {
                decl.thrown = self.parse_type_list();
            }
            if self.parse_optional(SyntaxKind::DefaultKeyword) {
                let capture = self.capture(CaptureMode::Value, false);
                if !capture.tokens.is_empty() {
                    decl.default_value = Some(expression_from_tokens(&capture.tokens, 0));
                }
            }
        } else {
            self.report_token_expected(")");
        }

        trace!(name = %decl.name, kind = ?decl.kind, closed, "method header");
        match self.token() {
            SyntaxKind::SemicolonToken => {
                decl.declaration_span.close_at(self.token_end());
                self.next_token();
                self.session.absorb(Fragment::Method(decl), 0);
            }
            SyntaxKind::OpenBraceToken => self.parse_body(BodyOwner::Method(decl)),
            _ => {
                if closed {
                    self.report_token_expected("{");
                }
                self.session.absorb(Fragment::Method(decl), 0);
            }
        }
    }

    /// Read parameters up to and including `)`. Returns whether the list was
    /// closed. A parameter followed by `(` is the start of another method
    /// header and is left unread.
    fn parse_parameter_list(&mut self, parameters: &mut Vec<Argument>) -> bool {
        loop {
            match self.token() {
                SyntaxKind::CloseParenToken => {
                    self.next_token();
                    return true;
                }
                SyntaxKind::EndOfFileToken => return false,
                _ => {}
            }

            let snapshot = self.save();
            let start = self.token_pos();
            let mut modifiers = ModifierFlags::empty();
            loop {
                if self.parse_optional(SyntaxKind::FinalKeyword) {
                    modifiers |= ModifierFlags::FINAL;
                } else if self.is_token(SyntaxKind::AtToken) {
                    self.parse_annotation(false);
                } else {
                    break;
                }
            }

            let Some(mut ty) = self.parse_type_reference() else {
                self.restore(snapshot);
                return false;
            };
            let is_varargs = self.parse_optional(SyntaxKind::DotDotDotToken);
            if !self.is_token(SyntaxKind::Identifier) {
                self.restore(snapshot);
                return false;
            }
            let name = self.token_text();
            self.next_token();
            ty.dimensions += self.parse_dimensions();
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.restore(snapshot);
                return false;
            }
            parameters.push(Argument {
                name,
                ty,
                modifiers,
                is_varargs,
                span: Span::new(start, self.prev_token_end),
            });

            match self.token() {
                SyntaxKind::CommaToken => {
                    self.next_token();
                }
                SyntaxKind::CloseParenToken => {
                    self.next_token();
                    return true;
                }
                _ => return false,
            }
        }
    }

    /// An initializer block in a type body; the current token is `{`.
    pub(crate) fn parse_initializer_block(&mut self) {
        let decl = FieldDeclaration::initializer(ModifierFlags::empty(), Span::open(self.token_pos()));
        self.parse_body(BodyOwner::Initializer(decl));
    }

    /// The `{` of a method or initializer body. Without method bodies, a
    /// body that balances is skipped; otherwise the declaration stays open
    /// and its statements stream in.
    fn parse_body(&mut self, owner: BodyOwner) {
        let brace = self.token_pos();
        let balanced = self.braces.is_closed(brace);
        if !self.options.method_bodies && balanced {
            if let Some(end) = self.skip_balanced_block() {
                trace!(start = brace, end, "body skipped");
                self.session.absorb(owner.with_skipped_body(Span::new(brace, end)), 0);
                return;
            }
        }

        let index = self.session.absorb(owner.into_fragment(), 0);
        self.session.opening_brace_consumed(brace);
        self.next_token();
        if balanced && self.session.node(index).kind().is_executable() {
            self.balanced_bodies.insert(index);
        }
    }

    // =========================================================================
    // Fields and enum constants
    // =========================================================================

    /// One or more declarators sharing a type, from the first name on.
    /// Declarators after the first repeat the modifiers and annotations of
    /// the first.
    pub(crate) fn parse_field_declarators(
        &mut self,
        start: u32,
        ty: TypeReference,
        name: String,
        name_span: Span,
        executable: bool,
        balanced: bool,
    ) {
        let shared = self.session.pending_attributes().clone();
        // Without method bodies, locals of a body being streamed are dropped.
        let dropped = executable
            && !self.options.method_bodies
            && shared.modifiers().difference(ModifierFlags::FINAL).is_empty()
            && !ty.is_void();
        if dropped {
            self.session.discard_pending_attributes();
        }

        let mut start = start;
        let mut name = name;
        let mut name_span = name_span;
        let mut first = true;
        loop {
            let mut field_type = ty.clone();
            field_type.dimensions += self.parse_dimensions();
            let mut decl = FieldDeclaration::new(name, field_type, Span::open(start));
            decl.name_span = name_span;
            if !first {
                decl.modifiers = shared.modifiers();
                decl.annotations = shared.annotations().to_vec();
            }
            first = false;

            if self.parse_optional(SyntaxKind::EqualsToken) {
                match self.parse_variable_initializer(balanced) {
                    InitializerValue::Value(value) => decl.initialization = Some(value),
                    InitializerValue::Missing => {
                        self.parse_error_at(
                            Span::at(self.prev_token_end),
                            diagnostic_codes::INCOMPLETE_DECLARATION,
                            &[&decl.name],
                        );
                    }
                    InitializerValue::Anonymous(header) => {
                        if !dropped {
                            self.session.absorb(Fragment::Field(decl), 0);
                        }
                        self.parse_anonymous_body(header);
                        return;
                    }
                    InitializerValue::Broken(capture) => {
                        self.parse_broken_initializer(decl, capture, dropped);
                        return;
                    }
                }
            }

            let (end, more) = match self.token() {
                SyntaxKind::CommaToken => {
                    let end = self.prev_token_end;
                    self.next_token();
                    (end, true)
                }
                SyntaxKind::SemicolonToken => {
                    let end = self.token_end();
                    self.next_token();
                    (end, false)
                }
                _ => {
                    self.report_token_expected(";");
                    (self.prev_token_end, false)
                }
            };
            decl.declaration_span.close_at(end);
            if !dropped {
                self.session.absorb(Fragment::Field(decl), 0);
            }
            if !more {
                return;
            }
            if !self.is_token(SyntaxKind::Identifier) {
                self.parse_error_at(self.token_span(), diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
                return;
            }
            start = self.token_pos();
            name = self.token_text();
            name_span = self.token_span();
            self.next_token();
        }
    }

    /// An initializer value that broke off. The field stays open; what was
    /// read before the first unmatched `{` becomes its value, and the brace
    /// itself streams as the field's own when nothing came before it.
    fn parse_broken_initializer(
        &mut self,
        decl: FieldDeclaration,
        capture: Capture,
        dropped: bool,
    ) {
        let mut tokens = capture.tokens;
        if let Some((snapshot, len)) = capture.first_brace {
            self.restore(snapshot);
            tokens.truncate(len);
        }
        if dropped {
            return;
        }
        trace!(name = %decl.name, tokens = tokens.len(), "broken initializer");
        self.session.absorb(Fragment::Field(decl), 0);
        if tokens.is_empty() {
            if self.is_token(SyntaxKind::OpenBraceToken) {
                self.session.opening_brace_consumed(self.token_pos());
                self.next_token();
            }
            return;
        }
        let value = opaque_expression(&tokens);
        let span = value.span;
        self.session.absorb(
            Fragment::Statement(Statement::new(StatementKind::Expression(value), span)),
            0,
        );
    }

    /// `NAME`, `NAME(args)` or `NAME(args) { body }` in an enum body.
    fn parse_enum_constant(&mut self, enum_name: String) {
        let start = self.token_pos();
        let name = self.token_text();
        let name_span = self.token_span();
        self.next_token();

        let mut decl = FieldDeclaration::enum_constant(name, name_span, Span::open(start));
        let ty = TypeReference {
            name: enum_name,
            dimensions: 0,
            span: name_span,
        };
        let mut arguments = None;
        if self.is_token(SyntaxKind::OpenParenToken) {
            match self.parse_argument_list() {
                Some(args) => arguments = Some(args),
                None => {
                    self.report_token_expected(")");
                    arguments = Some(Vec::new());
                }
            }
            decl.initialization = Some(Expression::new(
                ExpressionKind::Allocation(Box::new(AllocationExpression {
                    ty: ty.clone(),
                    arguments: arguments.clone().unwrap_or_default(),
                    anonymous_type: None,
                })),
                Span::new(start, self.prev_token_end),
            ));
        }

        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.session.absorb(Fragment::Field(decl), 0);
            let header = AllocationHeader {
                ty,
                arguments: arguments.unwrap_or_default(),
                start: self.token_pos(),
            };
            self.parse_anonymous_body(header);
            return;
        }

        decl.declaration_span.close_at(self.prev_token_end);
        self.session.absorb(Fragment::Field(decl), 0);
        self.parse_optional(SyntaxKind::CommaToken);
    }
}

