//! Common types and utilities for the jrec recovery parser.
//!
//! This crate provides foundational types used across all jrec crates:
//! - Source spans (`Span`, `Spanned`) with an "end unknown" sentinel
//! - Line/column positions (`LineMap`, `Position`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, code and message tables)
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{Span, Spanned};

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Diagnostics shared by the scanner, the reader and the recovery session
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
