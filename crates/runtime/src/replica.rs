//! Replicas: followers of the authority's commit stream.
//!
//! A [`Replica`] holds its own [`BattleState`] and applies commits strictly in
//! sequence. Effects run on a replica submit through its [`ReplicaProxy`];
//! their changes only become visible once the authority's commit comes back
//! on the stream.

use std::collections::BTreeMap;

use battle_core::{
    BattleMutation, BattleState, BattleStateProxy, MutationTicket, PendingMutations, ProxyError,
    SubmitReceipt,
};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace, warn};

use crate::authority::Command;
use crate::error::{Result, RuntimeError};
use crate::events::{Change, Commit, Event, MutationEvent, ReplicaId};

/// Mutation channel that forwards packets to the authority.
///
/// Submissions return [`SubmitReceipt::Pending`]; the local ticket resolves
/// when [`acknowledge`](Self::acknowledge) sees the authority's verdict.
#[derive(Debug)]
pub struct ReplicaProxy {
    origin: ReplicaId,
    commands: mpsc::Sender<Command>,
    ledger: PendingMutations,
}

/// How the authority resolved one of this proxy's proposals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Committed {
        local: MutationTicket,
        seq: MutationTicket,
    },
    Rejected {
        local: MutationTicket,
        code: String,
        reason: String,
    },
}

impl ReplicaProxy {
    pub(crate) fn new(
        origin: ReplicaId,
        commands: mpsc::Sender<Command>,
        max_in_flight: Option<usize>,
    ) -> Self {
        let ledger = match max_in_flight {
            Some(limit) => PendingMutations::with_capacity(limit),
            None => PendingMutations::new(),
        };
        Self {
            origin,
            commands,
            ledger,
        }
    }

    pub fn origin(&self) -> ReplicaId {
        self.origin
    }

    /// Proposals not yet answered by the authority.
    pub fn in_flight(&self) -> usize {
        self.ledger.len()
    }

    pub fn pending(&self, local: MutationTicket) -> Option<&BattleMutation> {
        self.ledger.get(local)
    }

    /// Resolves the local ticket an event answers, if it is one of ours.
    pub fn acknowledge(&mut self, event: &MutationEvent) -> Option<Resolution> {
        match event {
            MutationEvent::Committed(Commit {
                seq,
                change:
                    Change::Mutation {
                        origin: Some(origin),
                        local: Some(local),
                        ..
                    },
                ..
            }) if *origin == self.origin => {
                self.ledger.commit(*local).ok()?;
                Some(Resolution::Committed {
                    local: *local,
                    seq: *seq,
                })
            }
            MutationEvent::Rejected(rejection)
                if rejection.origin == Some(self.origin) =>
            {
                let local = rejection.local?;
                self.ledger.reject(local).ok()?;
                Some(Resolution::Rejected {
                    local,
                    code: rejection.code.clone(),
                    reason: rejection.reason.clone(),
                })
            }
            _ => None,
        }
    }
}

impl BattleStateProxy for ReplicaProxy {
    fn submit(&mut self, mutation: BattleMutation) -> std::result::Result<SubmitReceipt, ProxyError> {
        let bytes = mutation.encode()?;
        let local = self.ledger.propose(mutation)?;

        let command = Command::Propose {
            origin: self.origin,
            local,
            bytes,
        };
        match self.commands.try_send(command) {
            Ok(()) => {
                trace!(origin = %self.origin, %local, "proposal sent");
                Ok(SubmitReceipt::Pending(local))
            }
            Err(e) => {
                // Nothing reached the authority; forget the proposal.
                let _ = self.ledger.reject(local);
                Err(match e {
                    TrySendError::Full(_) => ProxyError::QueueFull {
                        capacity: self.commands.max_capacity(),
                    },
                    TrySendError::Closed(_) => ProxyError::ChannelClosed,
                })
            }
        }
    }
}

/// What one synchronisation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Commits applied to the replica's state.
    pub applied: usize,
    pub resolved: Vec<Resolution>,
}

/// A follower copy of the battle.
pub struct Replica<'a> {
    id: ReplicaId,
    battle: BattleState<'a>,
    next_seq: u64,
    buffered: BTreeMap<u64, Commit>,
}

impl<'a> Replica<'a> {
    pub fn new(id: ReplicaId, battle: BattleState<'a>) -> Self {
        Self {
            id,
            battle,
            next_seq: 0,
            buffered: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ReplicaId {
        self.id
    }

    pub fn battle(&self) -> &BattleState<'a> {
        &self.battle
    }

    /// Sequence number of the next commit this replica expects.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Commits held back until the gap before them closes.
    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }

    /// Accepts a commit and applies everything now in sequence.
    ///
    /// Returns how many commits were applied. A commit the authority applied
    /// but this replica cannot means the two have diverged; that is an error.
    pub fn receive(&mut self, commit: Commit) -> Result<usize> {
        let seq = commit.seq.0;
        if seq < self.next_seq {
            trace!(replica = %self.id, seq, "duplicate commit ignored");
            return Ok(0);
        }
        self.buffered.insert(seq, commit);

        let mut applied = 0;
        while let Some(commit) = self.buffered.remove(&self.next_seq) {
            if let Err(e) = commit.change.apply(&mut self.battle) {
                warn!(replica = %self.id, seq = commit.seq.0, "replica diverged: {}", e);
                return Err(e.into());
            }
            self.next_seq += 1;
            applied += 1;
        }
        if !self.buffered.is_empty() {
            debug!(replica = %self.id, waiting_for = self.next_seq, buffered = self.buffered.len(), "commit gap");
        }
        Ok(applied)
    }

    /// Processes every event already queued on `rx` without waiting.
    pub fn drain(
        &mut self,
        rx: &mut broadcast::Receiver<Event>,
        mut proxy: Option<&mut ReplicaProxy>,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        loop {
            match rx.try_recv() {
                Ok(event) => self.handle_event(event, proxy.as_deref_mut(), &mut report)?,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(missed)) => {
                    return Err(RuntimeError::ReplicaLagged { missed });
                }
            }
        }
        Ok(report)
    }

    /// Waits on `rx` until every commit below `seq` has been applied.
    pub async fn sync_to(
        &mut self,
        rx: &mut broadcast::Receiver<Event>,
        mut proxy: Option<&mut ReplicaProxy>,
        seq: u64,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        while self.next_seq < seq {
            match rx.recv().await {
                Ok(event) => self.handle_event(event, proxy.as_deref_mut(), &mut report)?,
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(missed)) => {
                    return Err(RuntimeError::ReplicaLagged { missed });
                }
            }
        }
        Ok(report)
    }

    fn handle_event(
        &mut self,
        event: Event,
        proxy: Option<&mut ReplicaProxy>,
        report: &mut SyncReport,
    ) -> Result<()> {
        let Event::Mutation(event) = event else {
            return Ok(());
        };
        if let Some(resolution) = proxy.and_then(|proxy| proxy.acknowledge(&event)) {
            report.resolved.push(resolution);
        }
        if let MutationEvent::Committed(commit) = event {
            report.applied += self.receive(commit)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Replica<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replica")
            .field("id", &self.id)
            .field("next_seq", &self.next_seq)
            .field("buffered", &self.buffered.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        BattleConfig, BattleEnvironment, BattleHex, BattleSide, BonusNode, CreatureId,
        CreatureType, UnitId, UnitOperation, UnitRecord,
    };

    use crate::setup::BattleSetup;

    fn setup() -> BattleSetup {
        BattleSetup::new(BattleEnvironment::new()).with_unit(
            UnitRecord::new(
                UnitId(1),
                BattleSide::Attacker,
                CreatureType::new(CreatureId(0), "pikeman", 1),
                10,
            ),
            BonusNode::with_bonuses([battle_core::Bonus::new(
                battle_core::BonusType::StackHealth,
                10,
            )]),
            BattleHex::new(0, 0),
        )
    }

    fn damage(seq: u64, amount: i64) -> Commit {
        Commit {
            seq: MutationTicket(seq),
            round: 0,
            change: Change::Mutation {
                origin: None,
                local: None,
                mutation: BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount }),
            },
        }
    }

    #[test]
    fn out_of_order_commits_wait_for_the_gap() {
        let setup = setup();
        let mut replica = Replica::new(ReplicaId(1), setup.build(BattleConfig::new()).unwrap());

        assert_eq!(replica.receive(damage(1, 5)).unwrap(), 0);
        assert_eq!(replica.buffered(), 1);
        assert_eq!(replica.battle().unit(UnitId(1)).unwrap().available_health(), 100);

        assert_eq!(replica.receive(damage(0, 10)).unwrap(), 2);
        assert_eq!(replica.next_seq(), 2);
        assert_eq!(replica.battle().unit(UnitId(1)).unwrap().available_health(), 85);

        // replayed commit
        assert_eq!(replica.receive(damage(0, 10)).unwrap(), 0);
        assert_eq!(replica.battle().unit(UnitId(1)).unwrap().available_health(), 85);
    }

    #[test]
    fn full_queue_rolls_back_the_proposal() {
        let (tx, _rx) = mpsc::channel(1);
        let mut proxy = ReplicaProxy::new(ReplicaId(3), tx, None);
        let packet = || BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount: 1 });

        assert!(proxy.submit(packet()).unwrap().ticket() == MutationTicket(0));
        assert_eq!(
            proxy.submit(packet()),
            Err(ProxyError::QueueFull { capacity: 1 })
        );
        assert_eq!(proxy.in_flight(), 1);
    }

    #[test]
    fn closed_channel_is_reported() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let mut proxy = ReplicaProxy::new(ReplicaId(3), tx, None);
        let packet = BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount: 1 });

        assert_eq!(proxy.submit(packet), Err(ProxyError::ChannelClosed));
        assert_eq!(proxy.in_flight(), 0);
    }

    #[test]
    fn in_flight_limit_is_enforced_locally() {
        let (tx, _rx) = mpsc::channel(8);
        let mut proxy = ReplicaProxy::new(ReplicaId(3), tx, Some(2));
        let packet = || BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount: 1 });

        proxy.submit(packet()).unwrap();
        proxy.submit(packet()).unwrap();
        assert_eq!(
            proxy.submit(packet()),
            Err(ProxyError::QueueFull { capacity: 2 })
        );
    }

    #[test]
    fn only_own_proposals_are_acknowledged() {
        let (tx, _rx) = mpsc::channel(8);
        let mut proxy = ReplicaProxy::new(ReplicaId(3), tx, None);
        let packet = BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount: 1 });
        let local = proxy.submit(packet.clone()).unwrap().ticket();

        let commit = |origin| {
            MutationEvent::Committed(Commit {
                seq: MutationTicket(7),
                round: 1,
                change: Change::Mutation {
                    origin: Some(ReplicaId(origin)),
                    local: Some(local),
                    mutation: packet.clone(),
                },
            })
        };
        assert_eq!(proxy.acknowledge(&commit(4)), None);
        assert_eq!(
            proxy.acknowledge(&commit(3)),
            Some(Resolution::Committed {
                local,
                seq: MutationTicket(7)
            })
        );
        assert_eq!(proxy.in_flight(), 0);
    }
}
