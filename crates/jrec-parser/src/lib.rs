//! Declaration recovery for Java-like source.
//!
//! This crate provides:
//! - `ast` - The declaration-level tree a recovered unit is folded into
//! - `recovery` - `RecoverySession`, the tree of partially read declarations
//!   that absorbs fragments, tracks brace balance and synthesizes what is
//!   missing when finalized
//! - `parser` - `ParserState`, the diet reader that drives a session
//! - `printer` - Outline printing of recovered units

pub mod ast;
pub mod parser;
pub mod printer;
pub mod recovery;

pub use ast::CompilationUnit;
pub use parser::{ParserOptions, ParserState, parse_source};
pub use printer::{print_compilation_unit, print_type_declaration};
pub use recovery::{Fragment, ReadingContext, RecoveryResult, RecoverySession};
