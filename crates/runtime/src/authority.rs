//! Authority task that owns the canonical [`BattleState`].
//!
//! Replicas propose mutations through [`ReplicaProxy`](crate::ReplicaProxy);
//! the authority decodes, validates and applies them one at a time, then
//! publishes the result on [`Topic::Mutation`](crate::Topic::Mutation). The
//! order of `Committed` events is the battle's total order.

use battle_core::{
    AppliedMutation, BattleError, BattleMutation, BattleState, Casualties, MutationTicket,
    RoundReport, UnitId,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::commit::{Outcome, announce};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{
    Change, Commit, Event, EventBus, MutationEvent, Rejection, ReplicaId, RoundEvent,
};
use crate::handle::AuthorityHandle;
use crate::setup::BattleSetup;

/// Requests accepted by the authority task.
pub enum Command {
    /// A replica's encoded packet. Answered on the event bus.
    Propose {
        origin: ReplicaId,
        local: MutationTicket,
        bytes: Vec<u8>,
    },
    Submit {
        mutation: BattleMutation,
        reply: oneshot::Sender<Result<AppliedMutation>>,
    },
    StartRound {
        reply: oneshot::Sender<Result<RoundReport>>,
    },
    UnitGetsTurn {
        unit: UnitId,
        reply: oneshot::Sender<Result<()>>,
    },
    AfterAttack {
        attacker: UnitId,
        defender: UnitId,
        ranged: bool,
        retaliation: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Number of changes committed so far.
    AppliedSeq { reply: oneshot::Sender<u64> },
    Finish {
        reply: oneshot::Sender<Vec<Casualties>>,
    },
}

pub struct Authority {
    config: RuntimeConfig,
    commands: mpsc::Receiver<Command>,
    bus: EventBus,
    next_seq: u64,
}

impl Authority {
    /// Creates the authority and the handle used to reach it.
    pub fn new(config: RuntimeConfig, bus: EventBus) -> (Self, AuthorityHandle) {
        let (tx, rx) = mpsc::channel(config.command_buffer_size);
        let handle = AuthorityHandle::new(tx, bus.clone(), config.max_in_flight);
        let authority = Self {
            config,
            commands: rx,
            bus,
            next_seq: 0,
        };
        (authority, handle)
    }

    /// Runs until [`AuthorityHandle::finish`] is called or every handle is
    /// dropped, then reports casualties.
    pub async fn serve(mut self, setup: BattleSetup) -> Result<Vec<Casualties>> {
        let mut battle = setup.build(self.config.battle.clone())?;
        info!(units = setup.units.len(), seed = self.config.seed, "authority started");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Finish { reply } => {
                    let casualties = self.finish(battle);
                    if reply.send(casualties.clone()).is_err() {
                        debug!("Finish reply channel closed (caller dropped)");
                    }
                    return Ok(casualties);
                }
                command => self.handle_command(&mut battle, command),
            }
        }

        debug!("all handles dropped, finishing battle");
        Ok(self.finish(battle))
    }

    fn handle_command(&mut self, battle: &mut BattleState<'_>, command: Command) {
        match command {
            Command::Propose {
                origin,
                local,
                bytes,
            } => self.handle_proposal(battle, origin, local, &bytes),
            Command::Submit { mutation, reply } => {
                let result = self.accept(
                    battle,
                    Change::Mutation {
                        origin: None,
                        local: None,
                        mutation,
                    },
                );
                let result = result.map(|outcome| match outcome {
                    Outcome::Mutation(applied) => applied,
                    other => unreachable!("mutation change produced {other:?}"),
                });
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::StartRound { reply } => {
                let result = self.commit(battle, Change::StartRound).map(|outcome| match outcome {
                    Outcome::Round(report) => report,
                    other => unreachable!("round change produced {other:?}"),
                });
                if reply.send(result).is_err() {
                    debug!("StartRound reply channel closed (caller dropped)");
                }
            }
            Command::UnitGetsTurn { unit, reply } => {
                let result = self.commit(battle, Change::UnitGetsTurn(unit)).map(drop);
                if reply.send(result).is_err() {
                    debug!("UnitGetsTurn reply channel closed (caller dropped)");
                }
            }
            Command::AfterAttack {
                attacker,
                defender,
                ranged,
                retaliation,
                reply,
            } => {
                let change = Change::AfterAttack {
                    attacker,
                    defender,
                    ranged,
                    retaliation,
                };
                let result = self.commit(battle, change).map(drop);
                if reply.send(result).is_err() {
                    debug!("AfterAttack reply channel closed (caller dropped)");
                }
            }
            Command::AppliedSeq { reply } => {
                if reply.send(self.next_seq).is_err() {
                    debug!("AppliedSeq reply channel closed (caller dropped)");
                }
            }
            Command::Finish { .. } => unreachable!("handled by serve"),
        }
    }

    fn handle_proposal(
        &mut self,
        battle: &mut BattleState<'_>,
        origin: ReplicaId,
        local: MutationTicket,
        bytes: &[u8],
    ) {
        let mutation = match BattleMutation::decode(bytes) {
            Ok(mutation) => mutation,
            Err(e) => {
                self.reject(Some(origin), Some(local), e.error_code(), e.to_string());
                return;
            }
        };
        debug!(%origin, %local, ops = mutation.op_count(), "proposal received");
        // Failures were already published as rejections.
        let _ = self.accept(
            battle,
            Change::Mutation {
                origin: Some(origin),
                local: Some(local),
                mutation,
            },
        );
    }

    /// Commits a mutation change unless the battle is already decided.
    fn accept(&mut self, battle: &mut BattleState<'_>, change: Change) -> Result<Outcome> {
        if battle.is_over() {
            let e = RuntimeError::BattleOver;
            if let Change::Mutation { origin, local, .. } = &change {
                self.reject(*origin, *local, e.error_code(), e.to_string());
            }
            return Err(e);
        }
        self.commit(battle, change)
    }

    fn commit(&mut self, battle: &mut BattleState<'_>, change: Change) -> Result<Outcome> {
        let outcome = match change.apply(battle) {
            Ok(outcome) => outcome,
            Err(e) => {
                let (origin, local) = match &change {
                    Change::Mutation { origin, local, .. } => (*origin, *local),
                    _ => (None, None),
                };
                self.reject(origin, local, e.error_code(), e.to_string());
                return Err(e.into());
            }
        };

        let seq = MutationTicket(self.next_seq);
        self.next_seq += 1;
        let round = battle.round();
        announce(Some(&self.bus), round, &outcome);
        self.bus.publish(Event::Mutation(MutationEvent::Committed(Commit {
            seq,
            round,
            change,
        })));
        Ok(outcome)
    }

    fn reject(
        &self,
        origin: Option<ReplicaId>,
        local: Option<MutationTicket>,
        code: &str,
        reason: String,
    ) {
        warn!(origin = ?origin, local = ?local, code, "change rejected: {}", reason);
        self.bus.publish(Event::Mutation(MutationEvent::Rejected(Rejection {
            origin,
            local,
            code: code.to_string(),
            reason,
        })));
    }

    fn finish(&self, battle: BattleState<'_>) -> Vec<Casualties> {
        let round = battle.round();
        let casualties = battle.finish();
        info!(round, commits = self.next_seq, "battle finished");
        self.bus.publish(Event::Round(RoundEvent::Finished {
            casualties: casualties.clone(),
        }));
        casualties
    }
}
