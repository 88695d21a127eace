//! Applying ordered changes to a battle and announcing their outcome.

use battle_core::{AppliedMutation, BattleState, BonusList, MutationError, RoundReport};
use tracing::{debug, info, warn};

use crate::events::{Change, Event, EventBus, RoundEvent, UnitEvent};

/// What applying a [`Change`] did.
#[derive(Debug, Clone)]
pub enum Outcome {
    Mutation(AppliedMutation),
    Round(RoundReport),
    /// Bonuses that expired as the unit got its turn.
    Turn(BonusList),
    Attack,
}

impl Change {
    /// Applies the change. On error the battle is left untouched.
    pub fn apply(&self, battle: &mut BattleState<'_>) -> Result<Outcome, MutationError> {
        match self {
            Change::Mutation { mutation, .. } => battle.apply_mutation(mutation).map(Outcome::Mutation),
            Change::StartRound => Ok(Outcome::Round(battle.start_round())),
            Change::UnitGetsTurn(unit) => battle.unit_gets_turn(*unit).map(Outcome::Turn),
            Change::AfterAttack {
                attacker,
                defender,
                ranged,
                retaliation,
            } => battle
                .after_attack(*attacker, *defender, *ranged, *retaliation)
                .map(|()| Outcome::Attack),
        }
    }
}

/// Logs an outcome and publishes its unit and round notifications.
pub(crate) fn announce(bus: Option<&EventBus>, round: u32, outcome: &Outcome) {
    match outcome {
        Outcome::Mutation(applied) => {
            for line in &applied.log {
                debug!(round, "{}", line);
            }
            for (unit, reason) in &applied.rejected {
                warn!(round, %unit, "unit changes discarded: {}", reason);
            }
            for delta in &applied.deltas {
                if let Some(bus) = bus {
                    bus.publish(Event::Unit(UnitEvent::Changed {
                        unit: delta.unit,
                        fields: delta.fields,
                        health_change: delta.health_change,
                    }));
                }
                if delta.died {
                    info!(round, unit = %delta.unit, "unit died");
                    if let Some(bus) = bus {
                        bus.publish(Event::Unit(UnitEvent::Died {
                            unit: delta.unit,
                            round,
                        }));
                    }
                }
            }
        }
        Outcome::Round(report) => {
            let expired: usize = report.expired.iter().map(|(_, list)| list.len()).sum();
            info!(round = report.round, expired, removed = report.removed.len(), "round started");
            if let Some(bus) = bus {
                bus.publish(Event::Round(RoundEvent::Started {
                    round: report.round,
                    expired,
                    removed: report.removed.clone(),
                }));
            }
        }
        Outcome::Turn(expired) if !expired.is_empty() => {
            debug!(round, expired = expired.len(), "turn bonuses expired");
        }
        Outcome::Turn(_) | Outcome::Attack => {}
    }
}
