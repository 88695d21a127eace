#![allow(dead_code)]

use std::collections::BTreeMap;

use battle_content::{CastSpec, ContentFactory, CreatureCatalog, Scenario};
use battle_core::{CastContext, Effect, SpellTable};
use battle_runtime::BattleSetup;

/// Everything a scenario run needs, loaded from one content directory.
pub struct Content {
    pub spells: SpellTable,
    pub creatures: CreatureCatalog,
    pub effects: BTreeMap<String, Box<dyn Effect>>,
    pub scenario: Scenario,
}

impl Content {
    pub fn load(factory: &ContentFactory, scenario: &str) -> Self {
        Self {
            spells: factory.load_spells().expect("spells should load"),
            creatures: factory.load_creatures().expect("creatures should load"),
            effects: factory.load_effects().expect("effects should load"),
            scenario: factory
                .load_scenario(scenario)
                .expect("scenario should load"),
        }
    }

    pub fn bundled() -> Self {
        Self::load(&ContentFactory::bundled(), "skirmish")
    }

    pub fn setup(&self) -> BattleSetup {
        let mut setup = BattleSetup::new(self.scenario.environment());
        for unit in self
            .scenario
            .place(&self.creatures)
            .expect("scenario units should resolve")
        {
            setup.push(unit.record, unit.bonuses, unit.position);
        }
        setup
    }

    pub fn effect(&self, cast: &CastSpec) -> &dyn Effect {
        self.effects
            .get(&cast.effect)
            .unwrap_or_else(|| panic!("missing effect {}", cast.effect))
            .as_ref()
    }

    pub fn context(&self, cast: &CastSpec) -> CastContext<'_> {
        let spell = self
            .spells
            .find_by_name(&cast.spell)
            .unwrap_or_else(|| panic!("missing spell {}", cast.spell));
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
        m
    }
}
