//! Questionnaire engine: the transition function wired to both storage tiers.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::UserId;
use crate::error::ApiError;
use crate::profile::{ProfileStore, ProfileUpdate};
use crate::questionnaire::machine::{self, FormEvent, IgnoreReason, Outcome};
use crate::questionnaire::question::Question;
use crate::questionnaire::state::{ConversationState, IDLE_STEP};
use crate::questionnaire::store::StateStore;

/// What the front end should show after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormReply {
    /// Render the prompt for this question.
    Ask(Question),
    /// The form is done; show the summary of stored labels.
    Finished(ProfileUpdate),
    /// The questionnaire was deleted in both tiers.
    Deleted,
    /// Nothing to show.
    Ignored(IgnoreReason),
}

/// Drives one questionnaire per user.
///
/// Events for the same user are applied one at a time; different users never
/// wait on each other.
pub struct FormEngine {
    states: Arc<dyn StateStore>,
    profiles: Arc<dyn ProfileStore>,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl FormEngine {
    pub fn new(states: Arc<dyn StateStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            states,
            profiles,
            locks: DashMap::new(),
        }
    }

    /// Current state for `user`. Never fails.
    ///
    /// The in-memory entry wins. Without one, the remote profile is loaded as
    /// an idle state; an unreachable remote yields an empty idle state.
    pub async fn get_user_state(&self, user: UserId) -> ConversationState {
        if let Some(state) = self.states.load(user).await {
            tracing::debug!(user, step = state.step, "Using in-memory questionnaire state");
            return state;
        }

        match self.profiles.load_authoritative(user).await {
            Ok(Some(profile)) => profile.to_state(),
            Ok(None) => ConversationState::idle(),
            Err(e) => {
                tracing::warn!(user, error = %e, "Remote profile unavailable, starting from empty state");
                ConversationState::idle()
            }
        }
    }

    /// Write `state` to memory, then mirror it remotely. A failed mirror is
    /// logged by the store and never reaches the caller.
    pub async fn save_user_state(&self, user: UserId, state: ConversationState) {
        let update = ProfileUpdate::from_state(&state);
        let step = state.step;
        self.states.save(user, state).await;
        tracing::debug!(user, step, "Questionnaire state saved");
        self.profiles.mirror_best_effort(user, &update).await;
    }

    /// Apply `event` for `user` and persist the result.
    ///
    /// Only deleting the questionnaire can fail, when the remote copy cannot
    /// be cleared.
    pub async fn handle(&self, user: UserId, event: FormEvent) -> Result<FormReply, ApiError> {
        let lock = self.user_lock(user);
        let reply = {
            let _guard = lock.lock().await;
            self.apply_locked(user, event).await
        };
        drop(lock);
        self.release_lock(user);
        reply
    }

    async fn apply_locked(&self, user: UserId, event: FormEvent) -> Result<FormReply, ApiError> {
        if event == FormEvent::Retake && self.states.delete(user).await {
            tracing::debug!(user, "Dropped cached questionnaire before retake");
        }

        let current = match event {
            FormEvent::StartForm | FormEvent::Retake | FormEvent::DeleteQuestionnaire => {
                ConversationState::idle()
            }
            FormEvent::Answer(_) | FormEvent::FreeText(_) => self.get_user_state(user).await,
        };

        match machine::apply(&current, &event) {
            Outcome::Started(state) => {
                tracing::info!(user, "Questionnaire started");
                self.save_user_state(user, state).await;
                Ok(FormReply::Ask(Question::SkinType))
            }
            Outcome::Advanced { state, next } => {
                tracing::info!(user, from = current.step, to = state.step, "Questionnaire advanced");
                self.save_user_state(user, state).await;
                Ok(FormReply::Ask(next))
            }
            Outcome::Completed(state) => Ok(FormReply::Finished(self.finalize(user, state).await)),
            Outcome::Cleared => {
                self.states.delete(user).await;
                self.profiles.clear(user).await?;
                tracing::info!(user, "Questionnaire deleted");
                Ok(FormReply::Deleted)
            }
            Outcome::Ignored(reason) => {
                tracing::info!(user, ?reason, "Ignoring questionnaire event");
                Ok(FormReply::Ignored(reason))
            }
        }
    }

    /// Persist a finished questionnaire and return the stored labels.
    ///
    /// The in-memory entry goes back to idle with its answers kept. Running
    /// this twice with the same answers stores the same profile.
    pub async fn finalize(&self, user: UserId, mut state: ConversationState) -> ProfileUpdate {
        state.step = IDLE_STEP;
        let summary = ProfileUpdate::from_state(&state);
        tracing::info!(user, "Questionnaire completed");
        self.save_user_state(user, state).await;
        summary
    }

    fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        self.locks.entry(user).or_default().clone()
    }

    /// Forget the lock for `user` unless another event holds or awaits it.
    fn release_lock(&self, user: UserId) {
        self.locks.remove_if(&user, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Users with an event in flight.
    pub fn active_users(&self) -> usize {
        self.locks.len()
    }
}
