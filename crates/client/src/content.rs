//! Loaded content for one scenario run.
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use battle_content::{CastSpec, ContentFactory, CreatureCatalog, Scenario};
use battle_core::{CastContext, Effect, SpellTable};
use battle_runtime::BattleSetup;
use tracing::debug;

pub struct Content {
    pub spells: SpellTable,
    pub creatures: CreatureCatalog,
    pub effects: BTreeMap<String, Box<dyn Effect>>,
    pub scenario: Scenario,
}

impl Content {
    pub fn load(factory: &ContentFactory, scenario: &str) -> Result<Self> {
        let content = Self {
            spells: factory.load_spells()?,
            creatures: factory.load_creatures()?,
            effects: factory.load_effects()?,
            scenario: factory.load_scenario(scenario)?,
        };
        debug!(
            dir = %factory.data_dir().display(),
            spells = content.spells.len(),
            creatures = content.creatures.len(),
            effects = content.effects.len(),
            "content loaded"
        );
        content.validate()?;
        Ok(content)
    }

    /// Every scripted cast must name a known spell and effect.
    fn validate(&self) -> Result<()> {
        for cast in &self.scenario.casts {
            self.effect(cast)?;
            self.context(cast)?;
        }
        Ok(())
    }

    pub fn setup(&self) -> Result<BattleSetup> {
        let mut setup = BattleSetup::new(self.scenario.environment());
        for unit in self.scenario.place(&self.creatures)? {
            setup.push(unit.record, unit.bonuses, unit.position);
        }
        Ok(setup)
    }

    pub fn effect(&self, cast: &CastSpec) -> Result<&dyn Effect> {
        self.effects
            .get(&cast.effect)
            .map(|effect| effect.as_ref())
            .with_context(|| format!("Unknown effect `{}` in round {}", cast.effect, cast.round))
    }

    /// Mechanics for one scripted cast.
    pub fn context(&self, cast: &CastSpec) -> Result<CastContext<'_>> {
        let spell = self
            .spells
            .find_by_name(&cast.spell)
            .with_context(|| format!("Unknown spell `{}` in round {}", cast.spell, cast.round))?;
        let mut m = CastContext::new(&self.spells, spell)
            .with_side(cast.side)
            .with_level(cast.level)
            .with_duration(cast.duration)
            .with_value(cast.value);
        if let Some(caster) = cast.caster {
            m = m.with_caster(caster, cast.side);
        }
        if cast.ability {
            m = m.as_ability();
        }
        Ok(m)
    }
}
