//! Two-phase mutation ledger: propose, then commit or reject.

use std::collections::BTreeMap;

use super::packet::BattleMutation;
use super::proxy::{BattleStateProxy, ProxyError, SubmitReceipt};

/// Handle for a proposed mutation. Tickets are issued in increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationTicket(pub u64);

impl core::fmt::Display for MutationTicket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutations proposed but not yet resolved.
#[derive(Clone, Debug, Default)]
pub struct PendingMutations {
    next_ticket: u64,
    pending: BTreeMap<MutationTicket, BattleMutation>,
    capacity: Option<usize>,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that refuses proposals beyond `capacity` unresolved entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Continues ticket numbering after `last` (e.g. when resuming a replica).
    pub fn starting_after(mut self, last: MutationTicket) -> Self {
        self.next_ticket = last.0 + 1;
        self
    }

    pub fn propose(&mut self, mutation: BattleMutation) -> Result<MutationTicket, ProxyError> {
        if let Some(capacity) = self.capacity
            && self.pending.len() >= capacity
        {
            return Err(ProxyError::QueueFull { capacity });
        }
        let ticket = MutationTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, mutation);
        Ok(ticket)
    }

    /// Resolves `ticket` as accepted and hands back its mutation for application.
    pub fn commit(&mut self, ticket: MutationTicket) -> Result<BattleMutation, ProxyError> {
        self.pending
            .remove(&ticket)
            .ok_or(ProxyError::UnknownTicket(ticket))
    }

    /// Resolves `ticket` as refused; the mutation is dropped.
    pub fn reject(&mut self, ticket: MutationTicket) -> Result<BattleMutation, ProxyError> {
        self.pending
            .remove(&ticket)
            .ok_or(ProxyError::UnknownTicket(ticket))
    }

    pub fn get(&self, ticket: MutationTicket) -> Option<&BattleMutation> {
        self.pending.get(&ticket)
    }

    /// Removes every pending mutation, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = (MutationTicket, BattleMutation)> + use<> {
        core::mem::take(&mut self.pending).into_iter()
    }

    pub fn tickets(&self) -> impl Iterator<Item = MutationTicket> + '_ {
        self.pending.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl BattleStateProxy for PendingMutations {
    fn submit(&mut self, mutation: BattleMutation) -> Result<SubmitReceipt, ProxyError> {
        self.propose(mutation).map(SubmitReceipt::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::UnitOperation;
    use crate::unit::UnitId;

    fn packet(amount: i64) -> BattleMutation {
        BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount })
    }

    #[test]
    fn propose_commit_reject() {
        let mut ledger = PendingMutations::new();
        let a = ledger.propose(packet(1)).unwrap();
        let b = ledger.propose(packet(2)).unwrap();
        assert!(a < b);
        assert_eq!(ledger.len(), 2);

        assert_eq!(ledger.commit(a).unwrap(), packet(1));
        assert!(matches!(ledger.commit(a), Err(ProxyError::UnknownTicket(t)) if t == a));

        ledger.reject(b).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn capacity_limits_unresolved_proposals() {
        let mut ledger = PendingMutations::with_capacity(1);
        let first = ledger.submit(packet(1)).unwrap();
        assert!(!first.is_applied());
        assert_eq!(
            ledger.submit(packet(2)),
            Err(ProxyError::QueueFull { capacity: 1 })
        );

        ledger.commit(first.ticket()).unwrap();
        assert!(ledger.submit(packet(3)).is_ok());
    }

    #[test]
    fn drain_is_ticket_ordered() {
        let mut ledger = PendingMutations::new().starting_after(MutationTicket(9));
        ledger.propose(packet(1)).unwrap();
        ledger.propose(packet(2)).unwrap();

        let tickets: Vec<_> = ledger.drain().map(|(t, _)| t).collect();
        assert_eq!(tickets, vec![MutationTicket(10), MutationTicket(11)]);
        assert!(ledger.is_empty());
    }
}
