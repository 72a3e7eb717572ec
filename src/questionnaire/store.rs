//! In-process tier of questionnaire state.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::UserId;
use crate::questionnaire::state::ConversationState;

/// Keyed storage for in-progress questionnaires.
///
/// This tier is authoritative for the step cursor; the remote profile has no
/// notion of which question is pending.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, user: UserId) -> Option<ConversationState>;

    async fn save(&self, user: UserId, state: ConversationState);

    /// Drop the entry. Returns whether one existed.
    async fn delete(&self, user: UserId) -> bool;
}

/// Sharded in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: DashMap<UserId, ConversationState>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, user: UserId) -> Option<ConversationState> {
        self.entries.get(&user).map(|entry| entry.value().clone())
    }

    async fn save(&self, user: UserId, state: ConversationState) {
        self.entries.insert(user, state);
    }

    async fn delete(&self, user: UserId) -> bool {
        self.entries.remove(&user).is_some()
    }
}
