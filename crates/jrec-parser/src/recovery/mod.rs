//! Declaration recovery.
//!
//! A `RecoverySession` keeps a tree of partially read declarations while the
//! reader works through source that may be syntactically broken. The reader
//! hands it fragments and token events; the session decides where each piece
//! belongs, closes declarations that evidently ended, and on request folds
//! everything into a complete `CompilationUnit`.
//!
//! Recovery never fails. Problems it works around are recorded as advisory
//! diagnostics alongside the tree.

mod absorb;
pub mod attributes;
pub mod balance;
mod events;
mod finalize;
pub mod node;
pub mod session;

pub use attributes::PendingAttributes;
pub use balance::{BalanceChange, BracketBalance};
pub use node::{Fragment, RecoveryIndex, RecoveryKind, RecoveryNode};
pub use session::{
    ReadingContext, RecoveryCheckpoint, RecoveryResult, RecoverySession, StructuralProblem,
};
