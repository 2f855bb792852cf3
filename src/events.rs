//! Notifications from the simulation to the presentation shell
//!
//! The simulation queues events on the state; the `Game` facade drains them
//! after every call and fans them out to subscribers.

use crate::audio::FeedbackKind;
use crate::sim::GamePhase;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    StateChanged(GamePhase),
    ScoreUpdated(u64),
    BestScoreUpdated(u64),
    ComboUpdated(u32),
    LevelUpdated(u32),
    /// Sound/haptic cue; filtered by settings before it reaches the device
    Feedback(FeedbackKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Multi-subscriber event fan-out, called in subscription order
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &GameEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
