//! jrec: best-effort declaration recovery for Java source under edit.
//!
//! A broken unit is read by the diet reader, which feeds what it recognizes
//! into a recovery session. The session keeps a tree of partial
//! declarations, decides where each fragment belongs and finally freezes it
//! into a consumer-facing `CompilationUnit` with advisory diagnostics.
//!
//! ```
//! use jrec::{ParserOptions, parse_source, print_compilation_unit};
//!
//! let result = parse_source("A.java", "class A { int x;", ParserOptions::default());
//! assert_eq!(result.unit.types[0].fields[0].name, "x");
//! assert!(print_compilation_unit(&result.unit).starts_with("class A {"));
//! ```

pub use jrec_common as common;
pub use jrec_parser as parser;
pub use jrec_scanner as scanner;

pub use jrec_common::{Diagnostic, DiagnosticCategory, LineMap, Position, Span};
pub use jrec_parser::{
    CompilationUnit, Fragment, ParserOptions, ParserState, ReadingContext, RecoveryResult,
    RecoverySession, parse_source, print_compilation_unit, print_type_declaration,
};

// Subscriber setup for the binaries
pub mod tracing_config;
