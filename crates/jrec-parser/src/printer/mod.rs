//! Outline printer.
//!
//! Renders a recovered `CompilationUnit` as Java-like source: one member per
//! line, two spaces per nesting level, members of a type in the order member
//! types, fields, methods. Statements kept as text print verbatim. The
//! output is stable, so outlines can be compared as strings.

use crate::ast::{
    Annotation, Argument, Block, CompilationUnit, Expression, ExpressionKind, FieldDeclaration,
    FieldKind, ImportReference, MethodDeclaration, MethodKind, ModifierFlags, Statement,
    StatementKind, TypeDeclaration,
};

/// Print a whole unit.
pub fn print_compilation_unit(unit: &CompilationUnit) -> String {
    let mut printer = OutlinePrinter::new();
    printer.emit_unit(unit);
    printer.finish()
}

/// Print one type declaration at the outermost level.
pub fn print_type_declaration(decl: &TypeDeclaration) -> String {
    let mut printer = OutlinePrinter::new();
    printer.emit_type(decl);
    printer.finish()
}

pub struct OutlinePrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
}

impl Default for OutlinePrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlinePrinter {
    pub fn new() -> Self {
        OutlinePrinter {
            output: String::with_capacity(1024),
            indent_level: 0,
            indent_str: "  ",
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    // =========================================================================
    // Writing primitives
    // =========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    const fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    const fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn write_separated<T>(
        &mut self,
        items: &[T],
        separator: &str,
        mut emit: impl FnMut(&mut Self, &T),
    ) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            emit(self, item);
        }
    }

    fn write_attributes(&mut self, annotations: &[Annotation], modifiers: ModifierFlags) {
        for annotation in annotations {
            self.write("@");
            self.write(&annotation.type_name);
            self.write(" ");
        }
        self.write(&modifiers.to_source_prefix());
    }

    // =========================================================================
    // Unit
    // =========================================================================

    pub fn emit_unit(&mut self, unit: &CompilationUnit) {
        if let Some(package) = &unit.package {
            self.write_attributes(&package.annotations, ModifierFlags::empty());
            self.write("package ");
            self.write(&package.name);
            self.write(";");
            self.write_line();
        }
        for import in &unit.imports {
            self.emit_import(import);
            self.write_line();
        }
        for decl in &unit.types {
            self.emit_type(decl);
            self.write_line();
        }
    }

    fn emit_import(&mut self, import: &ImportReference) {
        self.write("import ");
        if import.is_static {
            self.write("static ");
        }
        self.write(&import.name);
        if import.on_demand {
            self.write(".*");
        }
        self.write(";");
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Header and body at the current indentation; the caller has written
    /// the indentation of the first line.
    pub fn emit_type(&mut self, decl: &TypeDeclaration) {
        self.write_attributes(&decl.annotations, decl.modifiers);
        self.write(decl.kind.keyword());
        self.write(" ");
        self.write(&decl.name);
        if !decl.type_parameters.is_empty() {
            self.write("<");
            self.write(&decl.type_parameters.join(", "));
            self.write(">");
        }
        if let Some(superclass) = &decl.superclass {
            self.write(" extends ");
            self.write(&superclass.to_source());
        }
        if !decl.super_interfaces.is_empty() {
            self.write(if decl.kind.is_interface_like() {
                " extends "
            } else {
                " implements "
            });
            self.write_separated(&decl.super_interfaces, ", ", |p, ty| p.write(&ty.to_source()));
        }
        self.emit_type_body(decl);
    }

    fn emit_type_body(&mut self, decl: &TypeDeclaration) {
        self.write(" {");
        self.increase_indent();
        for member in &decl.member_types {
            self.write_line();
            self.write_indent();
            self.emit_type(member);
        }

        let constants = decl
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::EnumConstant)
            .count();
        let mut written = 0;
        for field in &decl.fields {
            self.write_line();
            self.write_indent();
            if field.kind == FieldKind::EnumConstant {
                written += 1;
                self.emit_enum_constant(field);
                self.write(if written == constants { ";" } else { "," });
            } else {
                self.emit_field(field);
            }
        }

        for method in &decl.methods {
            self.write_line();
            self.write_indent();
            self.emit_method(method);
        }
        self.decrease_indent();
        self.write_line();
        self.write_indent();
        self.write("}");
    }

    // =========================================================================
    // Fields
    // =========================================================================

    fn emit_field(&mut self, field: &FieldDeclaration) {
        match field.kind {
            FieldKind::Initializer => {
                if field.is_static() {
                    self.write("static ");
                }
                match &field.block {
                    Some(block) => self.emit_block(block),
                    None => self.emit_block(&Block::empty(field.declaration_span)),
                }
            }
            FieldKind::Field | FieldKind::EnumConstant => {
                self.write_attributes(&field.annotations, field.modifiers);
                if let Some(ty) = &field.ty {
                    self.write(&ty.to_source());
                    self.write(" ");
                }
                self.write(&field.name);
                if let Some(value) = &field.initialization {
                    self.write(" = ");
                    self.emit_expression(value);
                }
                self.write(";");
            }
        }
    }

    /// `A`, `B(1)` or `C(...) { body }`, without the trailing separator.
    fn emit_enum_constant(&mut self, field: &FieldDeclaration) {
        self.write_attributes(&field.annotations, ModifierFlags::empty());
        self.write(&field.name);
        let Some(Expression {
            kind: ExpressionKind::Allocation(allocation),
            ..
        }) = &field.initialization
        else {
            return;
        };
        if !allocation.arguments.is_empty() || allocation.anonymous_type.is_none() {
            self.emit_arguments(&allocation.arguments);
        }
        if let Some(body) = &allocation.anonymous_type {
            self.emit_type_body(body);
        }
    }

    // =========================================================================
    // Methods
    // =========================================================================

    fn emit_method(&mut self, method: &MethodDeclaration) {
        if method.kind != MethodKind::Clinit {
            self.write_attributes(&method.annotations, method.modifiers);
        }
        if !method.type_parameters.is_empty() {
            self.write("<");
            self.write(&method.type_parameters.join(", "));
            self.write("> ");
        }
        if method.kind == MethodKind::Method {
            if let Some(ty) = &method.return_type {
                self.write(&ty.to_source());
                self.write(" ");
            }
        }
        self.write(&method.name);
        self.write("(");
        self.write_separated(&method.parameters, ", ", Self::emit_parameter);
        self.write(")");
        if !method.thrown.is_empty() {
            self.write(" throws ");
            self.write_separated(&method.thrown, ", ", |p, ty| p.write(&ty.to_source()));
        }
        if let Some(value) = &method.default_value {
            self.write(" default ");
            self.emit_expression(value);
        }
        match &method.body {
            Some(body) => {
                self.write(" ");
                self.emit_block(body);
            }
            None => self.write(";"),
        }
    }

    fn emit_parameter(&mut self, parameter: &Argument) {
        self.write(&parameter.modifiers.to_source_prefix());
        self.write(&parameter.ty.to_source());
        if parameter.is_varargs {
            self.write("...");
        }
        self.write(" ");
        self.write(&parameter.name);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn emit_block(&mut self, block: &Block) {
        self.write("{");
        self.increase_indent();
        for statement in &block.statements {
            self.write_line();
            self.write_indent();
            self.emit_statement(statement);
        }
        self.decrease_indent();
        self.write_line();
        self.write_indent();
        self.write("}");
    }

    fn emit_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::Expression(expression) => {
                self.emit_expression(expression);
                self.write(";");
            }
            StatementKind::LocalDeclaration(field) => self.emit_field(field),
            StatementKind::LocalType(decl) => self.emit_type(decl),
            StatementKind::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.emit_expression(value);
                }
                self.write(";");
            }
            StatementKind::Block(block) => self.emit_block(block),
            StatementKind::ExplicitConstructorCall {
                is_super,
                arguments,
            } => {
                self.write(if *is_super { "super" } else { "this" });
                self.emit_arguments(arguments);
                self.write(";");
            }
            StatementKind::Opaque(text) => self.write(text),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_expression(&mut self, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Literal(text)
            | ExpressionKind::Name(text)
            | ExpressionKind::Opaque(text) => self.write(text),
            ExpressionKind::ArrayInitializer(elements) => {
                self.write("{");
                self.write_separated(elements, ", ", Self::emit_expression);
                self.write("}");
            }
            ExpressionKind::Allocation(allocation) => {
                self.write("new ");
                self.write(&allocation.ty.to_source());
                self.emit_arguments(&allocation.arguments);
                if let Some(body) = &allocation.anonymous_type {
                    self.emit_type_body(body);
                }
            }
        }
    }

    fn emit_arguments(&mut self, arguments: &[Expression]) {
        self.write("(");
        self.write_separated(arguments, ", ", Self::emit_expression);
        self.write(")");
    }
}

#[cfg(test)]
#[path = "tests/printer_tests.rs"]
mod tests;
