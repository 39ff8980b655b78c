//! Reading source files and rendering what was recovered from them.

use crate::args::{CliArgs, OutputFormat};
use crate::reporter::Reporter;
use anyhow::{Context, Result};
use jrec::parser::ast::{
    CompilationUnit, DeclarationBits, ExpressionKind, FieldDeclaration, FieldKind,
    MethodDeclaration, MethodKind, Statement, StatementKind, TypeDeclaration,
};
use jrec::{ParserOptions, RecoveryResult, parse_source, print_compilation_unit};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One input file and its recovered tree.
pub struct RecoveredFile {
    pub path: PathBuf,
    pub source: String,
    pub result: RecoveryResult,
}

/// Everything a run prints to stdout.
pub struct RunOutput {
    pub stdout: String,
    pub diagnostic_count: usize,
}

/// Read `path` and recover it. Only I/O fails; broken source never does.
pub fn recover_file(path: &Path, options: ParserOptions) -> Result<RecoveredFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path.display().to_string();
    let result = parse_source(&file_name, &source, options);
    debug!(
        file = %file_name,
        types = result.unit.types.len(),
        diagnostics = result.diagnostics.len(),
        "file recovered"
    );
    Ok(RecoveredFile {
        path: path.to_path_buf(),
        source,
        result,
    })
}

pub fn run(args: &CliArgs, color: bool) -> Result<RunOutput> {
    let options = args.parser_options();
    let files = args
        .files
        .iter()
        .map(|path| recover_file(path, options))
        .collect::<Result<Vec<_>>>()?;

    let mut stdout = String::new();
    match args.format {
        OutputFormat::Outline => {
            for file in &files {
                stdout.push_str(&print_compilation_unit(&file.result.unit));
            }
        }
        OutputFormat::Tree => {
            for file in &files {
                stdout.push_str(&render_tree(&file.result.unit));
            }
        }
        OutputFormat::Json => {
            let results: Vec<&RecoveryResult> = files.iter().map(|f| &f.result).collect();
            let json =
                serde_json::to_string_pretty(&results).context("failed to serialize results")?;
            stdout.push_str(&json);
            stdout.push('\n');
        }
    }

    // JSON already carries the diagnostics.
    if args.diagnostics && args.format != OutputFormat::Json {
        for file in files.iter().filter(|f| !f.result.diagnostics.is_empty()) {
            let reporter = Reporter::new(&file.source, color);
            stdout.push_str(&reporter.render(&file.result.diagnostics));
            stdout.push('\n');
        }
    }

    Ok(RunOutput {
        stdout,
        diagnostic_count: files.iter().map(|f| f.result.diagnostics.len()).sum(),
    })
}

// =============================================================================
// Span listing
// =============================================================================

/// One line per declaration and statement: kind, name, span and markers
/// for what recovery had to make up.
pub fn render_tree(unit: &CompilationUnit) -> String {
    let mut lister = TreeLister::default();
    lister.line(&format!("unit {} {:?}", unit.file_name, unit.span));
    lister.depth += 1;
    if let Some(package) = &unit.package {
        lister.line(&format!("package {}", package.name));
    }
    for import in &unit.imports {
        let on_demand = if import.on_demand { ".*" } else { "" };
        let keyword = if import.is_static { "import static" } else { "import" };
        lister.line(&format!("{keyword} {}{on_demand}", import.name));
    }
    for decl in &unit.types {
        lister.type_declaration(decl);
    }
    lister.output
}

#[derive(Default)]
struct TreeLister {
    output: String,
    depth: usize,
}

impl TreeLister {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn type_declaration(&mut self, decl: &TypeDeclaration) {
        let name = if decl.is_anonymous() {
            "<anonymous>"
        } else {
            decl.name.as_str()
        };
        let text = format!(
            "{} {name} {:?}{}",
            decl.kind.keyword(),
            decl.declaration_span,
            markers(decl.bits)
        );
        self.line(&text);
        self.nested(|l| {
            for member in &decl.member_types {
                l.type_declaration(member);
            }
            for field in &decl.fields {
                l.field(field);
            }
            for method in &decl.methods {
                l.method(method);
            }
        });
    }

    fn field(&mut self, field: &FieldDeclaration) {
        let text = match field.kind {
            FieldKind::Field => format!("field {} {:?}", field.name, field.declaration_span),
            FieldKind::EnumConstant => {
                format!("constant {} {:?}", field.name, field.declaration_span)
            }
            FieldKind::Initializer => {
                let keyword = if field.is_static() {
                    "static initializer"
                } else {
                    "initializer"
                };
                format!("{keyword} {:?}", field.declaration_span)
            }
        };
        self.line(&format!("{text}{}", markers(field.bits)));
        self.nested(|l| {
            if let Some(initialization) = &field.initialization {
                if let ExpressionKind::Allocation(allocation) = &initialization.kind {
                    if let Some(body) = &allocation.anonymous_type {
                        l.type_declaration(body);
                    }
                }
            }
            if let Some(block) = &field.block {
                for statement in &block.statements {
                    l.statement(statement);
                }
            }
        });
    }

    fn method(&mut self, method: &MethodDeclaration) {
        let keyword = match method.kind {
            MethodKind::Method => "method",
            MethodKind::Constructor => "constructor",
            MethodKind::Clinit => "clinit",
        };
        let text = format!(
            "{keyword} {}/{} {:?}{}",
            method.name,
            method.parameters.len(),
            method.declaration_span,
            markers(method.bits)
        );
        self.line(&text);
        if let Some(body) = &method.body {
            self.nested(|l| {
                for statement in &body.statements {
                    l.statement(statement);
                }
            });
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::LocalDeclaration(field) => {
                self.line(&format!("local {} {:?}", field.name, statement.span));
            }
            StatementKind::LocalType(decl) => self.type_declaration(decl),
            StatementKind::Block(block) => {
                self.line(&format!("block {:?}", statement.span));
                self.nested(|l| {
                    for statement in &block.statements {
                        l.statement(statement);
                    }
                });
            }
            StatementKind::Expression(expression) => {
                self.line(&format!("expression {:?}", statement.span));
                if let ExpressionKind::Allocation(allocation) = &expression.kind {
                    if let Some(body) = &allocation.anonymous_type {
                        self.nested(|l| l.type_declaration(body));
                    }
                }
            }
            StatementKind::Return(_) => self.line(&format!("return {:?}", statement.span)),
            StatementKind::ExplicitConstructorCall { is_super, .. } => {
                let keyword = if *is_super { "super" } else { "this" };
                self.line(&format!("{keyword}(...) {:?}", statement.span));
            }
            StatementKind::Opaque(_) => self.line(&format!("statement {:?}", statement.span)),
        }
    }
}

fn markers(bits: DeclarationBits) -> String {
    let mut out = String::new();
    if bits.contains(DeclarationBits::IS_DEFAULT_CONSTRUCTOR) {
        out.push_str(" [default]");
    }
    if bits.contains(DeclarationBits::END_INFERRED) {
        out.push_str(" [end inferred]");
    }
    out
}
