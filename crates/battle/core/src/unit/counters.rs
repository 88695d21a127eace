//! Per-battle and per-round usage counters (shots, casts, retaliations).

use bitflags::bitflags;

/// Tracks how much of a bonus-defined allowance has been spent.
///
/// The allowance itself is a derived value (e.g. the `Shots` total), so it is
/// passed to every call instead of being stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageCounter {
    used: i32,
}

impl UsageCounter {
    pub const fn new() -> Self {
        Self { used: 0 }
    }

    pub const fn used(&self) -> i32 {
        self.used
    }

    pub fn available(&self, total: i32) -> i32 {
        (total - self.used).max(0)
    }

    pub fn can_use(&self, total: i32, amount: i32) -> bool {
        self.available(total) >= amount
    }

    /// Spends `amount`, saturating at the allowance.
    pub fn spend(&mut self, total: i32, amount: i32) {
        if self.available(total) >= amount {
            self.used += amount;
        } else {
            self.used = total.max(self.used);
        }
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}

bitflags! {
    /// Per-round state, cleared when a new round starts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u8 {
        const MOVED     = 1 << 0;
        const WAITED    = 1 << 1;
        const DEFENDING = 1 << 2;
    }
}

bitflags! {
    /// Lifetime markers. Ghost transitions are one-way.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitMarkers: u8 {
        const CLONED        = 1 << 0;
        const HAS_CLONE     = 1 << 1;
        const SUMMONED      = 1 << 2;
        const GHOST_PENDING = 1 << 3;
        const GHOST         = 1 << 4;
    }
}
