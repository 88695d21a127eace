//! Scenario loader: armies plus a script of casts for the simulator.

use std::path::Path;

use battle_core::{BattleEnvironment, BattleHex, BattleSide, BonusNode, UnitId, UnitRecord};
use serde::{Deserialize, Serialize};

use crate::loaders::{CreatureCatalog, LoadResult, read_file};

/// One stack placed on the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    pub side: BattleSide,
    /// Creature name, looked up case-insensitively in the catalog.
    pub creature: String,
    pub amount: i32,
    pub position: BattleHex,
}

/// A spell or ability cast at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastSpec {
    pub round: u32,
    /// Spell name from the spell catalog.
    pub spell: String,
    /// Effect file stem.
    pub effect: String,
    #[serde(default)]
    pub caster: Option<UnitId>,
    pub side: BattleSide,
    pub targets: Vec<UnitId>,
    #[serde(default)]
    pub value: i64,
    #[serde(default = "default_duration")]
    pub duration: u16,
    #[serde(default = "default_level")]
    pub level: u8,
    /// Casts by creatures ignore spell immunity.
    #[serde(default)]
    pub ability: bool,
}

fn default_duration() -> u16 {
    1
}

fn default_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub ammo_carts: Vec<BattleSide>,
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub casts: Vec<CastSpec>,
}

impl Scenario {
    /// Casts scheduled for `round`, in file order.
    pub fn casts_in(&self, round: u32) -> impl Iterator<Item = &CastSpec> + '_ {
        self.casts.iter().filter(move |c| c.round == round)
    }

    pub fn last_round(&self) -> u32 {
        self.casts.iter().map(|c| c.round).max().unwrap_or(0)
    }

    pub fn environment(&self) -> BattleEnvironment {
        self.ammo_carts
            .iter()
            .fold(BattleEnvironment::new(), |env, side| env.with_ammo_cart(*side))
    }

    /// Resolves every stack against the creature catalog.
    ///
    /// Army slots are numbered per side in file order.
    pub fn place(&self, creatures: &CreatureCatalog) -> LoadResult<Vec<PlacedUnit>> {
        let mut slots = [0u8; 2];
        self.units
            .iter()
            .map(|spec| {
                let template = creatures.find(&spec.creature).ok_or_else(|| {
                    anyhow::anyhow!("unit {} uses unknown creature {}", spec.id, spec.creature)
                })?;
                if spec.amount <= 0 {
                    anyhow::bail!("unit {} must have a positive amount", spec.id);
                }
                let slot = &mut slots[spec.side as usize];
                let record = template.record(spec.id, spec.side, spec.amount, *slot);
                *slot += 1;
                Ok(PlacedUnit {
                    record,
                    bonuses: template.bonus_node(),
                    position: spec.position,
                })
            })
            .collect()
    }
}

/// A scenario stack resolved to its record and innate bonuses.
#[derive(Debug, Clone)]
pub struct PlacedUnit {
    pub record: UnitRecord,
    pub bonuses: BonusNode,
    pub position: BattleHex,
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load scenario {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        for cast in &scenario.casts {
            let known = |id: UnitId| scenario.units.iter().any(|u| u.id == id);
            if let Some(missing) = cast
                .targets
                .iter()
                .chain(cast.caster.iter())
                .find(|id| !known(**id))
            {
                anyhow::bail!("cast of {} references unknown unit {}", cast.spell, missing);
            }
        }
        Ok(scenario)
    }
}
