//! Per-user questionnaire progress.

use serde::{Deserialize, Serialize};

use crate::questionnaire::question::Question;

/// Step value meaning "not filling a form".
pub const IDLE_STEP: u8 = 0;

/// Step reached when the last answer is accepted. Never rendered.
pub const TERMINAL_STEP: u8 = 12;

/// Answers collected so far plus the cursor of the pending question.
///
/// Answer fields hold raw option codes (or free text for concerns) until the
/// form is finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub step: u8,
    pub skin_type: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub pregnancy: Option<String>,
    pub concerns: Option<String>,
    pub goal: Option<String>,
    pub climate: Option<String>,
    pub fitzpatrick: Option<String>,
    pub lifestyle: Option<String>,
    pub diet: Option<String>,
    pub allergies: Option<String>,
}

impl ConversationState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Fresh run positioned at the first question.
    pub fn started() -> Self {
        Self {
            step: 1,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.step == IDLE_STEP
    }

    pub fn is_complete(&self) -> bool {
        Question::ALL.iter().all(|q| self.answer(*q).is_some())
    }

    /// Question waiting for an answer, if any.
    pub fn pending_question(&self) -> Option<Question> {
        Question::for_step(self.step)
    }

    pub fn answer(&self, question: Question) -> Option<&str> {
        self.slot(question).as_deref()
    }

    pub fn set_answer(&mut self, question: Question, value: impl Into<String>) {
        *self.slot_mut(question) = Some(value.into());
    }

    /// Answers in question order, skipping the unanswered ones.
    pub fn answers(&self) -> impl Iterator<Item = (Question, &str)> {
        Question::ALL
            .into_iter()
            .filter_map(|q| self.answer(q).map(|a| (q, a)))
    }

    fn slot(&self, question: Question) -> &Option<String> {
        match question {
            Question::SkinType => &self.skin_type,
            Question::Age => &self.age,
            Question::Gender => &self.gender,
            Question::Pregnancy => &self.pregnancy,
            Question::Concerns => &self.concerns,
            Question::Goal => &self.goal,
            Question::Climate => &self.climate,
            Question::Fitzpatrick => &self.fitzpatrick,
            Question::Lifestyle => &self.lifestyle,
            Question::Diet => &self.diet,
            Question::Allergies => &self.allergies,
        }
    }

    fn slot_mut(&mut self, question: Question) -> &mut Option<String> {
        match question {
            Question::SkinType => &mut self.skin_type,
            Question::Age => &mut self.age,
            Question::Gender => &mut self.gender,
            Question::Pregnancy => &mut self.pregnancy,
            Question::Concerns => &mut self.concerns,
            Question::Goal => &mut self.goal,
            Question::Climate => &mut self.climate,
            Question::Fitzpatrick => &mut self.fitzpatrick,
            Question::Lifestyle => &mut self.lifestyle,
            Question::Diet => &mut self.diet,
            Question::Allergies => &mut self.allergies,
        }
    }
}
