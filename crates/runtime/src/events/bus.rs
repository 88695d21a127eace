//! Topic-based event bus implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{MutationEvent, RoundEvent, UnitEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Ordered commits and rejections; replicas follow this topic
    Mutation,
    /// Round transitions and battle end
    Round,
    /// Per-unit notifications (changes, deaths)
    Unit,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Mutation(MutationEvent),
    Round(RoundEvent),
    Unit(UnitEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Mutation(_) => Topic::Mutation,
            Event::Round(_) => Topic::Round,
            Event::Unit(_) => Topic::Unit,
        }
    }
}

struct Channels {
    mutation: broadcast::Sender<Event>,
    round: broadcast::Sender<Event>,
    unit: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Mutation => &self.mutation,
            Topic::Round => &self.round,
            Topic::Unit => &self.unit,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; a subscriber that falls
/// more than the capacity behind observes `RecvError::Lagged`.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Channels {
                mutation: broadcast::channel(capacity).0,
                round: broadcast::channel(capacity).0,
                unit: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.get(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("mutation_subscribers", &self.channels.mutation.receiver_count())
            .field("round_subscribers", &self.channels.round.receiver_count())
            .field("unit_subscribers", &self.channels.unit.receiver_count())
            .finish()
    }
}
