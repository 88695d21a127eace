//! Effects: configured behaviors that screen targets and emit mutations.
//!
//! An effect never touches unit state directly. It inspects targets through
//! the read-only [`Unit`] view, builds one [`BattleMutation`] describing
//! everything it does, and submits it to a [`BattleStateProxy`]. When the
//! change becomes visible is the proxy's business.
//!
//! ```text
//! EffectTarget ─▶ filter_target (valid ∧ receptive ∧ is_valid_target)
//!                        │
//!                     prepare ─▶ BattleMutation ─▶ proxy.submit
//! ```
//!
//! New effect kinds implement [`Effect`]; nothing here needs to change.

mod damage;
mod dispel;
mod heal;
mod mechanics;
mod target;
mod timed;
mod unit_effect;

pub use damage::Damage;
pub use dispel::Dispel;
pub use heal::Heal;
pub use mechanics::{CastContext, Mechanics};
pub use target::{Destination, EffectTarget};
pub use timed::Timed;
pub use unit_effect::UnitEffectOptions;

use crate::env::BattleRng;
use crate::mutation::{BattleMutation, BattleStateProxy, ProxyError, SubmitReceipt};
use crate::unit::Unit;

pub trait Effect: Send + Sync + core::fmt::Debug {
    /// Registry name, e.g. `core:dispel`.
    fn name(&self) -> &'static str;

    fn options(&self) -> &UnitEffectOptions;

    /// Whether dead (but not removed) units may be targeted.
    fn allows_dead(&self) -> bool {
        false
    }

    /// Effect-specific legality for one unit.
    fn is_valid_target(&self, m: &dyn Mechanics, unit: &dyn Unit) -> bool;

    /// Builds the changes for already screened units.
    fn prepare(
        &self,
        rng: &mut dyn BattleRng,
        m: &dyn Mechanics,
        units: &[&dyn Unit],
    ) -> BattleMutation;

    fn is_receptive(&self, m: &dyn Mechanics, unit: &dyn Unit) -> bool {
        self.options().is_receptive(m, unit)
    }

    /// Units of `target` this effect would act on. Invalid ones are skipped.
    fn filter_target<'t>(&self, m: &dyn Mechanics, target: &EffectTarget<'t>) -> Vec<&'t dyn Unit> {
        target
            .units()
            .into_iter()
            .filter(|unit| {
                unit.is_valid_target(self.allows_dead())
                    && self.is_receptive(m, *unit)
                    && self.is_valid_target(m, *unit)
            })
            .collect()
    }

    /// Screens `target`, then submits one mutation covering every valid unit.
    ///
    /// Each unit's part of the mutation applies on its own: a unit whose
    /// changes no longer fit its state is rejected without holding back the
    /// others. Returns `Ok(None)` when nothing was submitted.
    fn apply(
        &self,
        proxy: &mut dyn BattleStateProxy,
        rng: &mut dyn BattleRng,
        m: &dyn Mechanics,
        target: &EffectTarget<'_>,
    ) -> Result<Option<SubmitReceipt>, ProxyError> {
        let units = self.filter_target(m, target);
        if units.is_empty() {
            return Ok(None);
        }
        let mutation = self.prepare(rng, m, &units);
        if mutation.is_empty() {
            return Ok(None);
        }
        proxy.submit(mutation).map(Some)
    }
}
