//! Bracket balance tracking.

/// Braces opened but not yet closed within one recovery node.
///
/// Never negative: a closing brace that would underflow is reported as
/// `BalanceChange::Underflow` and leaves the count at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BracketBalance(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceChange {
    /// Still inside at least one brace.
    Open,
    /// The brace that opened the node was closed.
    Closed,
    /// There was nothing to close.
    Underflow,
}

impl BracketBalance {
    pub const ZERO: BracketBalance = BracketBalance(0);

    #[inline]
    pub const fn new(value: u32) -> Self {
        BracketBalance(value)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn decrement(&mut self) -> BalanceChange {
        match self.0 {
            0 => BalanceChange::Underflow,
            1 => {
                self.0 = 0;
                BalanceChange::Closed
            }
            _ => {
                self.0 -= 1;
                BalanceChange::Open
            }
        }
    }
}
