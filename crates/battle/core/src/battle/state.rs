//! Authoritative battle state: the arena of unit states and its round clock.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::bonus::{BonusDuration, BonusList, BonusNode, Selector};
use crate::config::BattleConfig;
use crate::effect::EffectTarget;
use crate::error::ErrorContext;
use crate::mutation::{AppliedMutation, BattleMutation, PacketError, UnitDelta, UnitFields, UnitOperation};
use crate::unit::{
    BattleHex, BattleSide, CreatureId, Unit, UnitEnvironment, UnitId, UnitInfo, UnitState,
};

use super::error::MutationError;

/// Bonuses that ran out at a round boundary, per unit.
#[derive(Clone, Debug, Default)]
pub struct RoundReport {
    pub round: u32,
    pub expired: Vec<(UnitId, BonusList)>,
    /// Units removed from the field this round.
    pub removed: Vec<UnitId>,
}

/// Final tally for one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Casualties {
    pub unit: UnitId,
    pub side: BattleSide,
    pub creature: CreatureId,
    pub killed: i32,
    pub survivors: i32,
}

/// Every unit of one battle, exclusively owned.
///
/// All mutation goes through [`apply_mutation`](Self::apply_mutation) or the
/// round hooks; callers never hold a unit mutably across a query.
pub struct BattleState<'a> {
    config: BattleConfig,
    env: &'a dyn UnitEnvironment,
    units: BTreeMap<UnitId, UnitState<'a>>,
    round: u32,
    active: Option<UnitId>,
    applied: u64,
}

impl<'a> BattleState<'a> {
    pub fn new(config: BattleConfig, env: &'a dyn UnitEnvironment) -> Self {
        Self {
            config,
            env,
            units: BTreeMap::new(),
            round: 0,
            active: None,
            applied: 0,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn active_unit(&self) -> Option<UnitId> {
        self.active
    }

    /// Number of mutations applied so far.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Places a unit on the field at full strength.
    pub fn add_unit(
        &mut self,
        info: &'a dyn UnitInfo,
        bonuses: BonusNode,
        position: BattleHex,
    ) -> Result<UnitId, MutationError> {
        let id = info.unit_id();
        if self.units.contains_key(&id) {
            return Err(MutationError::DuplicateUnit(id));
        }
        if self.units.len() >= BattleConfig::MAX_UNITS {
            return Err(MutationError::TooManyUnits {
                limit: BattleConfig::MAX_UNITS,
            });
        }
        let mut unit = UnitState::new(info, bonuses);
        unit.local_init(self.env);
        unit.set_position(position);
        self.units.insert(id, unit);
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitState<'a>> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitState<'a>> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitState<'a>> + '_ {
        self.units.values()
    }

    pub fn alive_units(&self, side: BattleSide) -> impl Iterator<Item = &UnitState<'a>> + '_ {
        self.units
            .values()
            .filter(move |u| u.alive() && u.info().unit_side() == side)
    }

    /// Effect target over the given units; unknown ids are skipped.
    pub fn target(&self, ids: &[UnitId]) -> EffectTarget<'_> {
        ids.iter()
            .filter_map(|id| self.units.get(id))
            .map(|u| u as &dyn Unit)
            .collect()
    }

    /// Every unit of `side`, alive or not.
    pub fn side_target(&self, side: BattleSide) -> EffectTarget<'_> {
        self.units
            .values()
            .filter(|u| u.info().unit_side() == side)
            .map(|u| u as &dyn Unit)
            .collect()
    }

    fn require(&self, unit: UnitId) -> Result<&UnitState<'a>, MutationError> {
        self.units.get(&unit).ok_or(MutationError::UnknownUnit {
            unit,
            context: ErrorContext::new(self.round).with_unit(unit),
        })
    }

    /// Applies a packet.
    ///
    /// An unknown unit or version rejects the packet before anything
    /// changes. Each unit's changes then apply atomically and independently:
    /// in strict mode an operation that does not apply discards every change
    /// to that unit and the unit is listed in [`AppliedMutation::rejected`];
    /// otherwise the operation is skipped. The packet fails only when every
    /// unit it touches was rejected.
    pub fn apply_mutation(
        &mut self,
        mutation: &BattleMutation,
    ) -> Result<AppliedMutation, MutationError> {
        if mutation.version != BattleConfig::PACKET_VERSION {
            return Err(PacketError::UnsupportedVersion {
                found: mutation.version,
                expected: BattleConfig::PACKET_VERSION,
            }
            .into());
        }
        for unit in mutation.units() {
            self.require(unit)?;
        }

        let mut staged: BTreeMap<UnitId, UnitState<'a>> = BTreeMap::new();
        let mut failed: Vec<(UnitId, MutationError)> = Vec::new();
        let mut applied = AppliedMutation {
            log: mutation.log.clone(),
            ..AppliedMutation::default()
        };

        for changes in &mutation.changes {
            if failed.iter().any(|(id, _)| *id == changes.unit) {
                continue;
            }
            let unit = match staged.entry(changes.unit) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(self.require(changes.unit)?.clone()),
            };
            let was_alive = unit.alive();
            let mut delta = UnitDelta::new(changes.unit);
            let mut error = None;

            for op in &changes.ops {
                match apply_operation(unit, op, &mut delta, self.round) {
                    Ok(()) => delta.fields |= UnitFields::of(op),
                    Err(e) if self.config.strict_mutations => {
                        error = Some(e);
                        break;
                    }
                    Err(_) => applied.skipped += 1,
                }
            }
            let alive = unit.alive();

            if let Some(e) = error {
                staged.remove(&changes.unit);
                applied.deltas.retain(|d| d.unit != changes.unit);
                failed.push((changes.unit, e));
                continue;
            }

            delta.died = was_alive && !alive;
            match applied.deltas.iter_mut().find(|d| d.unit == delta.unit) {
                Some(existing) => {
                    existing.fields |= delta.fields;
                    existing.health_change =
                        existing.health_change.saturating_add(delta.health_change);
                    existing.died |= delta.died;
                }
                None => applied.deltas.push(delta),
            }
        }

        if staged.is_empty()
            && let Some((_, e)) = failed.first()
        {
            return Err(e.clone());
        }
        applied.rejected = failed
            .into_iter()
            .map(|(unit, e)| (unit, e.to_string()))
            .collect();
        self.units.extend(staged);
        self.applied += 1;
        Ok(applied)
    }

    /// Advances to the next round.
    ///
    /// Turn-limited bonuses tick, round-scoped bonuses expire, turn flags and
    /// retaliations reset, and units pending removal leave the field.
    pub fn start_round(&mut self) -> RoundReport {
        self.round += 1;
        self.active = None;
        let mut report = RoundReport {
            round: self.round,
            ..RoundReport::default()
        };

        for (id, unit) in &mut self.units {
            let mut expired = unit.tick_turns();
            expired.extend(
                unit.expire_bonuses(BonusDuration::UNTIL_ROUND_END)
                    .iter()
                    .cloned(),
            );
            unit.after_new_round();
            if unit.is_ghost_pending() {
                unit.on_removed();
                report.removed.push(*id);
            }
            if !expired.is_empty() {
                report.expired.push((*id, expired));
            }
        }
        report
    }

    /// Marks `unit` as acting and drops its until-next-turn bonuses.
    pub fn unit_gets_turn(&mut self, unit: UnitId) -> Result<BonusList, MutationError> {
        self.require(unit)?;
        self.active = Some(unit);
        let state = self.unit_state_mut(unit)?;
        Ok(state.after_gets_turn())
    }

    /// Records an attack between two units and expires attack-scoped bonuses.
    pub fn after_attack(
        &mut self,
        attacker: UnitId,
        defender: UnitId,
        ranged: bool,
        retaliation: bool,
    ) -> Result<(), MutationError> {
        self.require(attacker)?;
        self.require(defender)?;

        let state = self.unit_state_mut(attacker)?;
        state.after_attack(ranged, retaliation);
        state.expire_bonuses(BonusDuration::UNTIL_ATTACK);

        self.unit_state_mut(defender)?
            .expire_bonuses(BonusDuration::UNTIL_BEING_ATTACKED);
        Ok(())
    }

    /// Side with no living units left, if any.
    pub fn defeated_side(&self) -> Option<BattleSide> {
        [BattleSide::Attacker, BattleSide::Defender]
            .into_iter()
            .find(|side| self.alive_units(*side).next().is_none())
    }

    pub fn is_over(&self) -> bool {
        self.defeated_side().is_some() || self.round >= self.config.max_rounds
    }

    /// Ends the battle: one-battle resurrections and bonuses are reverted
    /// and the per-unit casualties reported.
    pub fn finish(mut self) -> Vec<Casualties> {
        let mut casualties = Vec::with_capacity(self.units.len());
        for unit in self.units.values_mut() {
            unit.take_resurrected();
            unit.remove_bonuses(&Selector::new(|b| !b.duration.is_permanent()));
            casualties.push(Casualties {
                unit: unit.unit_id(),
                side: unit.info().unit_side(),
                creature: unit.info().creature_id(),
                killed: unit.killed(),
                survivors: unit.count(),
            });
        }
        casualties
    }

    fn unit_state_mut(&mut self, unit: UnitId) -> Result<&mut UnitState<'a>, MutationError> {
        let round = self.round;
        self.units.get_mut(&unit).ok_or(MutationError::UnknownUnit {
            unit,
            context: ErrorContext::new(round).with_unit(unit),
        })
    }
}

impl core::fmt::Debug for BattleState<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BattleState")
            .field("round", &self.round)
            .field("active", &self.active)
            .field("units", &self.units.values().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn apply_operation(
    unit: &mut UnitState<'_>,
    op: &UnitOperation,
    delta: &mut UnitDelta,
    round: u32,
) -> Result<(), MutationError> {
    let id = delta.unit;
    let missing = |action| MutationError::MissingBonus {
        unit: id,
        action,
        context: ErrorContext::new(round).with_unit(id),
    };
    match op {
        UnitOperation::AddBonus(bonus) => unit.add_bonus(bonus.clone()),
        UnitOperation::UpdateBonus(bonus) => {
            if !unit.update_bonus(bonus.clone()) {
                return Err(missing("update"));
            }
        }
        UnitOperation::RemoveBonus(bonus) => {
            if !unit.remove_bonus(bonus) {
                return Err(missing("remove"));
            }
        }
        UnitOperation::RemoveBonuses(duration) => {
            unit.expire_bonuses(*duration);
        }
        UnitOperation::Damage { amount } => {
            delta.health_change = delta.health_change.saturating_add(unit.damage(*amount));
        }
        UnitOperation::Heal {
            amount,
            level,
            power,
        } => {
            delta.health_change = delta
                .health_change
                .saturating_sub(unit.heal(*amount, *level, *power));
        }
        UnitOperation::SetPosition(hex) => unit.set_position(*hex),
        UnitOperation::SetFlags(flags) => unit.set_flags(*flags),
    }
    Ok(())
}
