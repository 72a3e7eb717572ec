//! Questions of the skincare form and the typed answer codes for them.

use std::fmt;

use crate::vocabulary;

/// The eleven questions, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    SkinType,
    Age,
    Gender,
    Pregnancy,
    Concerns,
    Goal,
    Climate,
    Fitzpatrick,
    Lifestyle,
    Diet,
    Allergies,
}

impl Question {
    pub const ALL: [Self; 11] = [
        Self::SkinType,
        Self::Age,
        Self::Gender,
        Self::Pregnancy,
        Self::Concerns,
        Self::Goal,
        Self::Climate,
        Self::Fitzpatrick,
        Self::Lifestyle,
        Self::Diet,
        Self::Allergies,
    ];

    /// Step index (1-based) at which this question is pending.
    pub fn step(self) -> u8 {
        match self {
            Self::SkinType => 1,
            Self::Age => 2,
            Self::Gender => 3,
            Self::Pregnancy => 4,
            Self::Concerns => 5,
            Self::Goal => 6,
            Self::Climate => 7,
            Self::Fitzpatrick => 8,
            Self::Lifestyle => 9,
            Self::Diet => 10,
            Self::Allergies => 11,
        }
    }

    /// Question pending at `step`, if the step renders one.
    pub fn for_step(step: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.step() == step)
    }

    /// Whether the question is answered by typing instead of pressing a button.
    pub fn is_free_text(self) -> bool {
        matches!(self, Self::Concerns)
    }

    /// Russian label used in summaries and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::SkinType => "Тип кожи",
            Self::Age => "Возраст",
            Self::Gender => "Пол",
            Self::Pregnancy => "Беременность/лактация",
            Self::Concerns => "Проблемы",
            Self::Goal => "Цель",
            Self::Climate => "Климат",
            Self::Fitzpatrick => "Тип кожи по Фитцпатрику",
            Self::Lifestyle => "Образ жизни",
            Self::Diet => "Питание",
            Self::Allergies => "Аллергии",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::SkinType => "👤",
            Self::Age => "📅",
            Self::Gender => "🚻",
            Self::Pregnancy => "🤱",
            Self::Concerns => "💭",
            Self::Goal => "🎯",
            Self::Climate => "🌍",
            Self::Fitzpatrick => "☀️",
            Self::Lifestyle => "🏃",
            Self::Diet => "🥗",
            Self::Allergies => "⚠️",
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SkinType => "skin_type",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Pregnancy => "pregnancy",
            Self::Concerns => "concerns",
            Self::Goal => "goal",
            Self::Climate => "climate",
            Self::Fitzpatrick => "fitzpatrick",
            Self::Lifestyle => "lifestyle",
            Self::Diet => "diet",
            Self::Allergies => "allergies",
        };
        f.write_str(name)
    }
}

/// A button answer, classified by the question it belongs to.
///
/// Built once at the transport boundary from callback data; the state machine
/// only ever matches on [`OptionCode::question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCode {
    question: Question,
    code: String,
}

impl OptionCode {
    /// Classify raw callback data. Returns `None` for anything that is not a
    /// questionnaire answer.
    pub fn parse(data: &str) -> Option<Self> {
        let question = if data.starts_with("skin_") {
            Question::SkinType
        } else if data.starts_with("age_") {
            Question::Age
        } else if data.starts_with("gender_") {
            Question::Gender
        } else if matches!(
            data,
            "pregnancy" | "lactation" | "pregnancy_and_lactation" | vocabulary::PREGNANCY_NONE
        ) || data.starts_with("pregnancy_")
        {
            Question::Pregnancy
        } else if data.starts_with("goal_") {
            Question::Goal
        } else if data.starts_with("climate_") {
            Question::Climate
        } else if data.starts_with("fitzpatrick_") {
            Question::Fitzpatrick
        } else if data.starts_with("lifestyle_") {
            Question::Lifestyle
        } else if data.starts_with("diet_") {
            Question::Diet
        } else if data.starts_with("allergies_") {
            Question::Allergies
        } else {
            return None;
        };

        Some(Self {
            question,
            code: data.to_string(),
        })
    }

    pub fn question(&self) -> Question {
        self.question
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The gender answer that skips the pregnancy question.
    pub fn is_male(&self) -> bool {
        self.question == Question::Gender && self.code == vocabulary::GENDER_MALE
    }
}
