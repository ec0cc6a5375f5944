use std::collections::HashMap;

use super::event::{ConversationId, EventDescriptor};

/// Confirmation state for one conversation. The pending batch is owned
/// exclusively by this state and is replaced or cleared atomically on the
/// next turn; it is never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    PendingConfirmation { batch: Vec<EventDescriptor> },
}

impl ConversationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ConversationState::PendingConfirmation { .. })
    }
}

/// Explicit per-conversation state, keyed by id. Conversations that have
/// never spoken (or whose batch was consumed) are Idle.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<ConversationId, ConversationState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the current state, leaving Idle behind.
    /// The caller decides the next state and puts it back via `set`.
    pub fn take(&mut self, id: &ConversationId) -> ConversationState {
        self.sessions.remove(id).unwrap_or(ConversationState::Idle)
    }

    pub fn set(&mut self, id: ConversationId, state: ConversationState) {
        match state {
            // Absent entry == Idle.
            ConversationState::Idle => {
                self.sessions.remove(&id);
            }
            pending => {
                self.sessions.insert(id, pending);
            }
        }
    }

    pub fn state(&self, id: &ConversationId) -> &ConversationState {
        static IDLE: ConversationState = ConversationState::Idle;
        self.sessions.get(id).unwrap_or(&IDLE)
    }
}
