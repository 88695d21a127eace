//! Single-process battle session.
//!
//! [`LocalSession`] owns the authoritative [`BattleState`] and applies every
//! submitted mutation before the casting call returns. Effects still go
//! through the two-phase ledger: the mutation is proposed, then committed and
//! applied in one step, so a cast that fails to apply leaves no trace.

use battle_core::{
    AppliedMutation, BattleMutation, BattleState, Casualties, Effect, Mechanics, MutationTicket,
    PendingMutations, RoundReport, SeededRng, UnitId,
};
use tracing::{debug, info, warn};

use crate::commit::{Outcome, announce};
use crate::error::{Result, RuntimeError};
use crate::events::{Change, Commit, Event, EventBus, MutationEvent, RoundEvent};

pub struct LocalSession<'a> {
    battle: BattleState<'a>,
    ledger: PendingMutations,
    rng: SeededRng,
    bus: Option<EventBus>,
    next_seq: u64,
}

impl<'a> LocalSession<'a> {
    pub fn new(battle: BattleState<'a>, seed: u64) -> Self {
        Self {
            battle,
            ledger: PendingMutations::new(),
            rng: SeededRng::new(seed),
            bus: None,
            next_seq: 0,
        }
    }

    /// Publishes commits and notifications on `bus`.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn battle(&self) -> &BattleState<'a> {
        &self.battle
    }

    /// Commits applied so far.
    pub fn commits(&self) -> u64 {
        self.next_seq
    }

    /// Runs `effect` against `targets` and applies what it submits.
    ///
    /// Returns `Ok(None)` if the effect found nothing to do. Unknown target
    /// ids are ignored.
    pub fn cast(
        &mut self,
        effect: &dyn Effect,
        m: &dyn Mechanics,
        targets: &[UnitId],
    ) -> Result<Option<AppliedMutation>> {
        if self.battle.is_over() {
            return Err(RuntimeError::BattleOver);
        }

        let receipt = {
            let target = self.battle.target(targets);
            effect.apply(&mut self.ledger, &mut self.rng, m, &target)?
        };
        let Some(receipt) = receipt else {
            debug!(effect = effect.name(), spell = m.spell_name(), "cast had no valid target");
            return Ok(None);
        };

        let ticket = receipt.ticket();
        let mutation = self.ledger.commit(ticket)?;
        debug!(
            effect = effect.name(),
            %ticket,
            units = mutation.changes.len(),
            ops = mutation.op_count(),
            "mutation submitted"
        );
        self.apply_mutation(Some(ticket), mutation).map(Some)
    }

    /// Applies a packet built outside an effect.
    pub fn submit(&mut self, mutation: BattleMutation) -> Result<AppliedMutation> {
        self.apply_mutation(None, mutation)
    }

    fn apply_mutation(
        &mut self,
        local: Option<MutationTicket>,
        mutation: BattleMutation,
    ) -> Result<AppliedMutation> {
        match self.apply(Change::Mutation {
            origin: None,
            local,
            mutation,
        })? {
            Outcome::Mutation(applied) => Ok(applied),
            other => unreachable!("mutation change produced {other:?}"),
        }
    }

    pub fn start_round(&mut self) -> Result<RoundReport> {
        let report = match self.apply(Change::StartRound)? {
            Outcome::Round(report) => report,
            other => unreachable!("round change produced {other:?}"),
        };
        self.rng.scope(report.round, 0);
        Ok(report)
    }

    pub fn unit_gets_turn(&mut self, unit: UnitId) -> Result<()> {
        self.apply(Change::UnitGetsTurn(unit)).map(drop)
    }

    pub fn after_attack(
        &mut self,
        attacker: UnitId,
        defender: UnitId,
        ranged: bool,
        retaliation: bool,
    ) -> Result<()> {
        self.apply(Change::AfterAttack {
            attacker,
            defender,
            ranged,
            retaliation,
        })
        .map(drop)
    }

    /// Ends the battle and reports casualties.
    pub fn finish(self) -> Vec<Casualties> {
        let round = self.battle.round();
        let casualties = self.battle.finish();
        info!(round, units = casualties.len(), "battle finished");
        if let Some(bus) = &self.bus {
            bus.publish(Event::Round(RoundEvent::Finished {
                casualties: casualties.clone(),
            }));
        }
        casualties
    }

    fn apply(&mut self, change: Change) -> Result<Outcome> {
        let outcome = match change.apply(&mut self.battle) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(code = battle_core::BattleError::error_code(&e), "change rejected: {}", e);
                return Err(e.into());
            }
        };

        let round = self.battle.round();
        let seq = MutationTicket(self.next_seq);
        self.next_seq += 1;
        announce(self.bus.as_ref(), round, &outcome);
        if let Some(bus) = &self.bus {
            bus.publish(Event::Mutation(MutationEvent::Committed(Commit {
                seq,
                round,
                change,
            })));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        BattleConfig, BattleEnvironment, BattleHex, BattleSide, Bonus, BonusNode, BonusType,
        CastContext, CreatureId, CreatureType, Damage, PrimarySkill, Positiveness, SpellDefinition,
        SpellId, SpellTable, Timed, UnitRecord,
    };

    use crate::setup::BattleSetup;

    fn setup() -> BattleSetup {
        let stats = |hp| {
            BonusNode::with_bonuses([
                Bonus::new(BonusType::StacksSpeed, 5),
                Bonus::primary_skill(PrimarySkill::Attack, 6),
                Bonus::primary_skill(PrimarySkill::Defense, 6),
                Bonus::new(BonusType::StackHealth, hp),
            ])
        };
        BattleSetup::new(BattleEnvironment::new())
            .with_unit(
                UnitRecord::new(
                    UnitId(1),
                    BattleSide::Attacker,
                    CreatureType::new(CreatureId(0), "pikeman", 1),
                    10,
                ),
                stats(10),
                BattleHex::new(0, 0),
            )
            .with_unit(
                UnitRecord::new(
                    UnitId(2),
                    BattleSide::Defender,
                    CreatureType::new(CreatureId(1), "wolf", 2),
                    4,
                ),
                stats(25),
                BattleHex::new(16, 0),
            )
    }

    fn spells() -> SpellTable {
        [
            SpellDefinition::new(SpellId(53), "Haste", Positiveness::Positive),
            SpellDefinition::new(SpellId(17), "Lightning Bolt", Positiveness::Negative),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn cast_is_visible_immediately() {
        let setup = setup();
        let spells = spells();
        let battle = setup.build(BattleConfig::new()).unwrap();
        let mut session = LocalSession::new(battle, 9);

        let haste = Timed::new(vec![Bonus::new(BonusType::StacksSpeed, 3)]);
        let def = spells.find_by_name("haste").unwrap();
        let m = CastContext::new(&spells, def).with_duration(2);

        let applied = session.cast(&haste, &m, &[UnitId(1)]).unwrap().unwrap();
        assert_eq!(applied.deltas.len(), 1);
        assert_eq!(session.battle().unit(UnitId(1)).unwrap().initiative(), 8);
        assert_eq!(session.commits(), 1);

        session.start_round().unwrap();
        session.start_round().unwrap();
        assert_eq!(session.battle().unit(UnitId(1)).unwrap().initiative(), 5);
    }

    #[test]
    fn nothing_to_do_is_not_an_error() {
        let setup = setup();
        let spells = spells();
        let mut session = LocalSession::new(setup.build(BattleConfig::new()).unwrap(), 1);

        let def = spells.find_by_name("lightning bolt").unwrap();
        let m = CastContext::new(&spells, def).with_value(10);
        assert!(session.cast(&Damage::new(), &m, &[UnitId(99)]).unwrap().is_none());
        assert_eq!(session.commits(), 0);
    }

    #[test]
    fn killing_the_last_enemy_ends_the_battle() {
        let setup = setup();
        let spells = spells();
        let mut session = LocalSession::new(setup.build(BattleConfig::new()).unwrap(), 1);
        let def = spells.find_by_name("lightning bolt").unwrap();
        let m = CastContext::new(&spells, def).with_value(1_000);

        let applied = session.cast(&Damage::new(), &m, &[UnitId(2)]).unwrap().unwrap();
        assert_eq!(applied.deaths().collect::<Vec<_>>(), vec![UnitId(2)]);
        assert!(matches!(
            session.cast(&Damage::new(), &m, &[UnitId(1)]),
            Err(RuntimeError::BattleOver)
        ));

        let casualties = session.finish();
        let wolves = casualties.iter().find(|c| c.unit == UnitId(2)).unwrap();
        assert_eq!(wolves.killed, 4);
        assert_eq!(wolves.survivors, 0);
    }
}
