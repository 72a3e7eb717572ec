//! Pure transition function of the questionnaire.
//!
//! [`apply`] never touches storage or the transport; the engine decides what
//! to persist and render from the returned [`Outcome`].

use crate::questionnaire::question::{OptionCode, Question};
use crate::questionnaire::state::{ConversationState, TERMINAL_STEP};
use crate::vocabulary;

/// Inbound events the questionnaire reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Explicit start, from `/form` or the start button.
    StartForm,
    /// Start over, dropping any cached progress first.
    Retake,
    /// A button answer.
    Answer(OptionCode),
    /// Typed text.
    FreeText(String),
    /// Wipe the questionnaire in both tiers.
    DeleteQuestionnaire,
}

/// Why an event left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The answer belongs to a different question than the pending one.
    UnexpectedOption {
        step: u8,
        expected: Option<Question>,
        got: Question,
    },
    /// Typed text outside the free-text step.
    UnexpectedText { step: u8 },
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A fresh run positioned at step 1.
    Started(ConversationState),
    /// The answer was stored and the cursor moved to `next`.
    Advanced {
        state: ConversationState,
        next: Question,
    },
    /// The last answer was stored; the state sits at the terminal step.
    Completed(ConversationState),
    /// All answers dropped.
    Cleared,
    Ignored(IgnoreReason),
}

/// Apply `event` to `state`.
pub fn apply(state: &ConversationState, event: &FormEvent) -> Outcome {
    match event {
        FormEvent::StartForm | FormEvent::Retake => Outcome::Started(ConversationState::started()),
        FormEvent::DeleteQuestionnaire => Outcome::Cleared,
        FormEvent::Answer(option) => apply_option(state, option),
        FormEvent::FreeText(text) => apply_text(state, text),
    }
}

fn apply_option(state: &ConversationState, option: &OptionCode) -> Outcome {
    let expected = state.pending_question();
    if expected != Some(option.question()) || option.question().is_free_text() {
        return Outcome::Ignored(IgnoreReason::UnexpectedOption {
            step: state.step,
            expected,
            got: option.question(),
        });
    }

    let mut next = state.clone();
    next.set_answer(option.question(), option.code());

    next.step = if option.is_male() {
        next.set_answer(Question::Pregnancy, vocabulary::PREGNANCY_NONE);
        Question::Concerns.step()
    } else {
        state.step + 1
    };

    match Question::for_step(next.step) {
        Some(question) => Outcome::Advanced {
            state: next,
            next: question,
        },
        None => {
            debug_assert_eq!(next.step, TERMINAL_STEP);
            Outcome::Completed(next)
        }
    }
}

fn apply_text(state: &ConversationState, text: &str) -> Outcome {
    match state.pending_question() {
        Some(question) if question.is_free_text() => {
            let mut next = state.clone();
            next.set_answer(question, text);
            next.step = state.step + 1;
            Outcome::Advanced {
                state: next,
                next: Question::Goal,
            }
        }
        _ => Outcome::Ignored(IgnoreReason::UnexpectedText { step: state.step }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn answer(code: &str) -> FormEvent {
        FormEvent::Answer(OptionCode::parse(code).expect("valid option code"))
    }

    fn at_step(step: u8) -> ConversationState {
        ConversationState {
            step,
            ..ConversationState::default()
        }
    }

    fn step_of(outcome: &Outcome) -> Option<u8> {
        match outcome {
            Outcome::Started(s) | Outcome::Advanced { state: s, .. } | Outcome::Completed(s) => {
                Some(s.step)
            }
            _ => None,
        }
    }

    #[test]
    fn start_clears_previous_answers() {
        let mut state = at_step(7);
        state.skin_type = Some("skin_dry".to_string());

        for event in [FormEvent::StartForm, FormEvent::Retake] {
            assert_eq!(
                apply(&state, &event),
                Outcome::Started(ConversationState::started())
            );
        }
    }

    #[test]
    fn each_step_accepts_its_own_family() {
        let table = [
            (1, "skin_dry", 2),
            (2, "age_25_34", 3),
            (3, "gender_female", 4),
            (4, "lactation", 5),
            (6, "goal_hydration", 7),
            (7, "climate_cold", 8),
            (8, "fitzpatrick_2", 9),
            (9, "lifestyle_active", 10),
            (10, "diet_vegan", 11),
            (11, "allergies_none", 12),
        ];
        for (from, code, to) in table {
            let outcome = apply(&at_step(from), &answer(code));
            assert_eq!(step_of(&outcome), Some(to), "{code} at step {from}");
        }
    }

    #[test]
    fn mismatched_family_is_ignored() {
        let codes = [
            "skin_dry",
            "age_25_34",
            "gender_female",
            "none_of_above",
            "goal_tone",
            "climate_dry",
            "fitzpatrick_1",
            "lifestyle_other",
            "diet_none",
            "allergies_none",
        ];
        for step in 0..=TERMINAL_STEP {
            for code in codes {
                let event = answer(code);
                let FormEvent::Answer(option) = &event else {
                    unreachable!()
                };
                if Question::for_step(step) == Some(option.question()) {
                    continue;
                }
                assert!(
                    matches!(apply(&at_step(step), &event), Outcome::Ignored(_)),
                    "{code} at step {step} should be ignored"
                );
            }
        }
    }

    #[test]
    fn male_skips_pregnancy_question() {
        let outcome = apply(&at_step(3), &answer("gender_male"));
        let Outcome::Advanced { state: next, next: question } = outcome else {
            panic!("expected advance, got {outcome:?}");
        };
        assert_eq!(question, Question::Concerns);
        assert_eq!(next.step, 5);
        assert_eq!(next.gender.as_deref(), Some("gender_male"));
        assert_eq!(next.pregnancy.as_deref(), Some(vocabulary::PREGNANCY_NONE));
    }

    #[test]
    fn free_text_only_at_concerns_step() {
        let outcome = apply(&at_step(5), &FormEvent::FreeText("acne".to_string()));
        let Outcome::Advanced { state: next, .. } = outcome else {
            panic!("expected advance, got {outcome:?}");
        };
        assert_eq!(next.step, 6);
        assert_eq!(next.concerns.as_deref(), Some("acne"));

        for step in [0, 1, 4, 6, 11] {
            assert_eq!(
                apply(&at_step(step), &FormEvent::FreeText("acne".to_string())),
                Outcome::Ignored(IgnoreReason::UnexpectedText { step })
            );
        }
    }

    #[test]
    fn last_answer_completes() {
        let outcome = apply(&at_step(11), &answer("allergies_fragrance"));
        let Outcome::Completed(done) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(done.step, TERMINAL_STEP);
        assert_eq!(done.allergies.as_deref(), Some("allergies_fragrance"));
    }

    #[test]
    fn delete_clears() {
        assert_eq!(
            apply(&at_step(4), &FormEvent::DeleteQuestionnaire),
            Outcome::Cleared
        );
    }
}
