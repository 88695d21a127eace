use tokio::sync::{broadcast, mpsc, oneshot};

use battle_core::{AppliedMutation, BattleMutation, Casualties, RoundReport, UnitId};

use crate::authority::Command;
use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, ReplicaId, Topic};
use crate::replica::ReplicaProxy;

/// Client-facing handle to the authority task.
#[derive(Clone, Debug)]
pub struct AuthorityHandle {
    commands: mpsc::Sender<Command>,
    bus: EventBus,
    max_in_flight: Option<usize>,
}

impl AuthorityHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        bus: EventBus,
        max_in_flight: Option<usize>,
    ) -> Self {
        Self {
            commands,
            bus,
            max_in_flight,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Applies a packet on the authority and waits for the outcome.
    pub async fn submit(&self, mutation: BattleMutation) -> Result<AppliedMutation> {
        self.request(|reply| Command::Submit { mutation, reply })
            .await?
    }

    pub async fn start_round(&self) -> Result<RoundReport> {
        self.request(|reply| Command::StartRound { reply }).await?
    }

    pub async fn unit_gets_turn(&self, unit: UnitId) -> Result<()> {
        self.request(|reply| Command::UnitGetsTurn { unit, reply })
            .await?
    }

    pub async fn after_attack(
        &self,
        attacker: UnitId,
        defender: UnitId,
        ranged: bool,
        retaliation: bool,
    ) -> Result<()> {
        self.request(|reply| Command::AfterAttack {
            attacker,
            defender,
            ranged,
            retaliation,
            reply,
        })
        .await?
    }

    /// Changes committed so far. Every commit below this number has already
    /// been published.
    pub async fn applied_seq(&self) -> Result<u64> {
        self.request(|reply| Command::AppliedSeq { reply }).await
    }

    /// Ends the battle. The authority task exits afterwards.
    pub async fn finish(&self) -> Result<Vec<Casualties>> {
        self.request(|reply| Command::Finish { reply }).await
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// A mutation channel for effects run by `origin`.
    pub fn proposer(&self, origin: ReplicaId) -> ReplicaProxy {
        ReplicaProxy::new(origin, self.commands.clone(), self.max_in_flight)
    }
}
