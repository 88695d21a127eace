//! Owned description of a battle, from which [`BattleState`]s are built.
//!
//! A [`BattleState`] borrows its unit records and environment. The setup owns
//! them, so every participant (authority, replicas, a local session) builds
//! an identical state from the same setup.

use battle_core::{
    BattleConfig, BattleEnvironment, BattleHex, BattleState, BonusNode, MutationError, UnitRecord,
};

/// One stack as it enters the battle.
#[derive(Debug, Clone)]
pub struct UnitSetup {
    pub record: UnitRecord,
    pub bonuses: BonusNode,
    pub position: BattleHex,
}

#[derive(Debug, Clone, Default)]
pub struct BattleSetup {
    pub env: BattleEnvironment,
    pub units: Vec<UnitSetup>,
}

impl BattleSetup {
    pub fn new(env: BattleEnvironment) -> Self {
        Self {
            env,
            units: Vec::new(),
        }
    }

    pub fn push(&mut self, record: UnitRecord, bonuses: BonusNode, position: BattleHex) {
        self.units.push(UnitSetup {
            record,
            bonuses,
            position,
        });
    }

    pub fn with_unit(mut self, record: UnitRecord, bonuses: BonusNode, position: BattleHex) -> Self {
        self.push(record, bonuses, position);
        self
    }

    /// Builds a fresh battle borrowing from this setup.
    pub fn build(&self, config: BattleConfig) -> Result<BattleState<'_>, MutationError> {
        let mut battle = BattleState::new(config, &self.env);
        for unit in &self.units {
            battle.add_unit(&unit.record, unit.bonuses.clone(), unit.position)?;
        }
        Ok(battle)
    }
}
