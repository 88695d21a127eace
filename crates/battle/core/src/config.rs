/// Battle rules constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Hard stop for scripted or simulated battles.
    pub max_rounds: u32,
    /// Reject a whole packet if any single operation fails to apply, instead
    /// of skipping the operation.
    pub strict_mutations: bool,
}

impl BattleConfig {
    // ===== rule constants =====
    /// Attacks per turn before `AdditionalAttack` bonuses.
    pub const BASE_ATTACKS: i32 = 1;
    /// Retaliations per round before `AdditionalRetaliation` bonuses.
    pub const BASE_RETALIATIONS: i32 = 1;
    /// Wire format version written into every mutation packet.
    pub const PACKET_VERSION: u16 = 1;
    pub const MAX_UNITS: usize = 42;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ROUNDS: u32 = 100;

    pub fn new() -> Self {
        Self {
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            strict_mutations: true,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_strict_mutations(mut self, strict: bool) -> Self {
        self.strict_mutations = strict;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
