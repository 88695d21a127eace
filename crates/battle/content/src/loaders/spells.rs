//! Spell catalog loader.

use std::path::Path;

use battle_core::{SpellDefinition, SpellTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalog {
    pub spells: Vec<SpellDefinition>,
}

/// Loader for the spell catalog from RON files.
pub struct SpellLoader;

impl SpellLoader {
    /// Load the spell catalog from a RON file.
    ///
    /// Duplicate ids are an error; the table would otherwise silently keep
    /// only the last definition.
    pub fn load(path: &Path) -> LoadResult<SpellTable> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load spells from {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<SpellTable> {
        let catalog: SpellCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        let mut table = SpellTable::default();
        for spell in catalog.spells {
            let id = spell.id;
            if table.insert(spell).is_some() {
                anyhow::bail!("duplicate spell id {}", id.0);
            }
        }
        Ok(table)
    }
}
