//! Centralized limits and thresholds.
//!
//! Recovery must terminate on any input, including machine-generated files
//! with pathological nesting. The constants here bound the work done by the
//! reader and the finalizer.

/// Maximum nesting of recovery nodes followed by the finalizer.
///
/// Children deeper than this are folded without descending further; their
/// declarations keep whatever span evidence they already carry. Real sources
/// rarely exceed a few dozen levels (type → method → anonymous type → ...).
pub const MAX_RECOVERY_DEPTH: u32 = 256;

/// Maximum nesting the reader follows when it speculatively captures a
/// balanced statement or expression. Deeper input is streamed instead.
pub const MAX_CAPTURE_DEPTH: u32 = 128;

/// Maximum pre-allocation for the recovery arena.
pub const MAX_NODE_PREALLOC: usize = 1_000_000;

/// Heuristic ratio of source bytes per recovery node, used to size the arena.
pub const SOURCE_BYTES_PER_NODE: usize = 48;

/// Largest source the scanner reads, in bytes. Offsets are `u32` and stay
/// below `Span::UNKNOWN_END`; longer input is cut and reported.
pub const MAX_SOURCE_BYTES: usize = u32::MAX as usize - 1;
