//! Durable skincare profile and the remote store that holds it.
//!
//! The remote side keeps the eleven answers as human-readable labels and has
//! no notion of questionnaire progress. Writes translate option codes through
//! [`vocabulary::human_readable`]; reads pass values through untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::UserId;
use crate::api::{ApiClient, UserProduct};
use crate::error::ApiError;
use crate::questionnaire::{ConversationState, Question};
use crate::vocabulary;

/// Profile as the data API returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredProfile {
    pub user_id: UserId,
    pub skin_type: String,
    pub age: String,
    pub gender: String,
    pub pregnancy: String,
    pub concern: String,
    pub goal: String,
    pub climate: String,
    pub fitzpatrick: String,
    pub lifestyle: String,
    pub diet: String,
    pub allergy: String,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredProfile {
    pub fn field(&self, question: Question) -> &str {
        match question {
            Question::SkinType => &self.skin_type,
            Question::Age => &self.age,
            Question::Gender => &self.gender,
            Question::Pregnancy => &self.pregnancy,
            Question::Concerns => &self.concern,
            Question::Goal => &self.goal,
            Question::Climate => &self.climate,
            Question::Fitzpatrick => &self.fitzpatrick,
            Question::Lifestyle => &self.lifestyle,
            Question::Diet => &self.diet,
            Question::Allergies => &self.allergy,
        }
    }

    /// Non-empty fields in question order.
    pub fn filled_fields(&self) -> impl Iterator<Item = (Question, &str)> {
        Question::ALL
            .into_iter()
            .map(|q| (q, self.field(q)))
            .filter(|(_, v)| !v.is_empty())
    }

    /// True when no answer is stored, which the API uses for "no questionnaire".
    pub fn is_empty(&self) -> bool {
        self.filled_fields().next().is_none()
    }

    /// Rebuild a conversation state from the remote copy.
    ///
    /// The step is always idle: the remote has no record of which question
    /// was pending.
    pub fn to_state(&self) -> ConversationState {
        let mut state = ConversationState::idle();
        for (question, value) in self.filled_fields() {
            state.set_answer(question, value);
        }
        state
    }
}

/// Body of `PUT /user/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub skin_type: String,
    pub age: String,
    pub gender: String,
    pub pregnancy: String,
    pub concern: String,
    pub goal: String,
    pub climate: String,
    pub fitzpatrick: String,
    pub lifestyle: String,
    pub diet: String,
    pub allergy: String,
}

impl ProfileUpdate {
    /// Translate the collected answers to labels. Concerns are free text and
    /// go through as typed; unanswered fields are sent empty.
    pub fn from_state(state: &ConversationState) -> Self {
        let label = |q: Question| {
            state
                .answer(q)
                .map(|v| vocabulary::human_readable(v).to_string())
                .unwrap_or_default()
        };

        Self {
            skin_type: label(Question::SkinType),
            age: label(Question::Age),
            gender: label(Question::Gender),
            pregnancy: label(Question::Pregnancy),
            concern: state.answer(Question::Concerns).unwrap_or_default().to_string(),
            goal: label(Question::Goal),
            climate: label(Question::Climate),
            fitzpatrick: label(Question::Fitzpatrick),
            lifestyle: label(Question::Lifestyle),
            diet: label(Question::Diet),
            allergy: label(Question::Allergies),
        }
    }

    pub fn field(&self, question: Question) -> &str {
        match question {
            Question::SkinType => &self.skin_type,
            Question::Age => &self.age,
            Question::Gender => &self.gender,
            Question::Pregnancy => &self.pregnancy,
            Question::Concerns => &self.concern,
            Question::Goal => &self.goal,
            Question::Climate => &self.climate,
            Question::Fitzpatrick => &self.fitzpatrick,
            Question::Lifestyle => &self.lifestyle,
            Question::Diet => &self.diet,
            Question::Allergies => &self.allergy,
        }
    }
}

/// Remote profile tier plus the product collection that shares its identity.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the durable profile. A 404 is reported as `Ok(None)`.
    async fn load_authoritative(&self, user: UserId) -> Result<Option<StoredProfile>, ApiError>;

    async fn save(&self, user: UserId, profile: &ProfileUpdate) -> Result<(), ApiError>;

    /// Write-through that never fails the caller. Returns whether the write
    /// landed.
    async fn mirror_best_effort(&self, user: UserId, profile: &ProfileUpdate) -> bool {
        match self.save(user, profile).await {
            Ok(()) => {
                tracing::debug!(user, "Profile mirrored to remote store");
                true
            }
            Err(e) => {
                tracing::warn!(user, error = %e, "Failed to mirror profile to remote store");
                false
            }
        }
    }

    async fn clear(&self, user: UserId) -> Result<(), ApiError>;

    async fn list_products(&self, user: UserId) -> Result<Vec<UserProduct>, ApiError>;

    async fn add_product(&self, user: UserId, product_id: i64) -> Result<(), ApiError>;

    async fn remove_product(&self, user: UserId, product_id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl ProfileStore for ApiClient {
    async fn load_authoritative(&self, user: UserId) -> Result<Option<StoredProfile>, ApiError> {
        match self.get_profile(user).await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save(&self, user: UserId, profile: &ProfileUpdate) -> Result<(), ApiError> {
        self.update_profile(user, profile).await
    }

    async fn clear(&self, user: UserId) -> Result<(), ApiError> {
        self.empty_profile(user).await
    }

    async fn list_products(&self, user: UserId) -> Result<Vec<UserProduct>, ApiError> {
        self.user_products(user).await
    }

    async fn add_product(&self, user: UserId, product_id: i64) -> Result<(), ApiError> {
        self.add_user_product(user, product_id).await
    }

    async fn remove_product(&self, user: UserId, product_id: i64) -> Result<(), ApiError> {
        self.remove_user_product(user, product_id).await
    }
}
