//! Creature catalog loader.

use std::path::Path;

use battle_core::{
    BattleSide, Bonus, BonusNode, CreatureId, CreatureType, UnitId, UnitRecord, UnitSlot,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// A creature type with its innate bonuses (base stats included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub id: CreatureId,
    pub name: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
}

impl CreatureTemplate {
    pub fn creature_type(&self) -> CreatureType {
        CreatureType::new(self.id, self.name.clone(), self.level)
    }

    /// Fresh bonus storage for one stack of this creature.
    pub fn bonus_node(&self) -> BonusNode {
        BonusNode::with_bonuses(self.bonuses.iter().cloned())
    }

    pub fn record(&self, id: UnitId, side: BattleSide, amount: i32, slot: u8) -> UnitRecord {
        UnitRecord::new(id, side, self.creature_type(), amount).with_slot(UnitSlot::Army(slot))
    }
}

/// Creature catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatureCatalog {
    pub creatures: Vec<CreatureTemplate>,
}

impl CreatureCatalog {
    pub fn get(&self, id: CreatureId) -> Option<&CreatureTemplate> {
        self.creatures.iter().find(|c| c.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&CreatureTemplate> {
        self.creatures
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }
}

/// Loader for the creature catalog from RON files.
pub struct CreatureLoader;

impl CreatureLoader {
    pub fn load(path: &Path) -> LoadResult<CreatureCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load creatures from {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<CreatureCatalog> {
        let catalog: CreatureCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse creature catalog RON: {}", e))?;

        for (i, creature) in catalog.creatures.iter().enumerate() {
            if catalog.creatures[..i].iter().any(|c| c.id == creature.id) {
                anyhow::bail!("duplicate creature id {}", creature.id.0);
            }
        }
        Ok(catalog)
    }
}
