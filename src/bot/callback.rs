//! Inline button payloads.
//!
//! Callback data is parsed once into [`CallbackAction`]; the handlers never
//! look at raw strings. [`CallbackAction::data`] renders the same strings back
//! for keyboards, so parse and render stay in one place.

use crate::questionnaire::OptionCode;
use crate::recommendations::RecommendationKind;

const PRODUCT_PREFIX: &str = "product_";
const ADD_PRODUCT_PREFIX: &str = "add_product_";
const REMOVE_PRODUCT_PREFIX: &str = "remove_product_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// "Анкета" on the main menu: show the stored questionnaire or offer one.
    ShowQuestionnaire,
    /// Start filling the questionnaire from the first question.
    StartForm,
    /// Start over, discarding the cached state.
    Retake,
    DeleteQuestionnaire,
    Answer(OptionCode),
    ShowProduct(i64),
    AddProduct(i64),
    RemoveProduct(i64),
    RecommendationsMenu,
    Recommend(RecommendationKind),
    MyProducts,
    DeleteProductsMenu,
    BackToStart,
    /// A product button with a non-numeric id.
    BadProductId(String),
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            "start_form" => return Self::ShowQuestionnaire,
            "start_form_new" => return Self::StartForm,
            "retake_anketa" => return Self::Retake,
            "delete_anketa" => return Self::DeleteQuestionnaire,
            "recommendations" => return Self::RecommendationsMenu,
            "recommendations_anketa" => return Self::Recommend(RecommendationKind::Questionnaire),
            "recommendations_products" => return Self::Recommend(RecommendationKind::WithProducts),
            "recommendations_general" => return Self::Recommend(RecommendationKind::General),
            "my_products" => return Self::MyProducts,
            "delete_products" => return Self::DeleteProductsMenu,
            "back_to_start" => return Self::BackToStart,
            _ => {}
        }

        if let Some(code) = OptionCode::parse(data) {
            return Self::Answer(code);
        }

        // `add_product_` and `remove_product_` also end in `product_`, so the
        // longer prefixes go first.
        if let Some(id) = data.strip_prefix(ADD_PRODUCT_PREFIX) {
            return product_id(id, Self::AddProduct);
        }
        if let Some(id) = data.strip_prefix(REMOVE_PRODUCT_PREFIX) {
            return product_id(id, Self::RemoveProduct);
        }
        if let Some(id) = data.strip_prefix(PRODUCT_PREFIX) {
            return product_id(id, Self::ShowProduct);
        }

        Self::Unknown(data.to_string())
    }

    /// Callback data for a button that triggers this action.
    pub fn data(&self) -> String {
        match self {
            Self::ShowQuestionnaire => "start_form".to_string(),
            Self::StartForm => "start_form_new".to_string(),
            Self::Retake => "retake_anketa".to_string(),
            Self::DeleteQuestionnaire => "delete_anketa".to_string(),
            Self::Answer(code) => code.code().to_string(),
            Self::ShowProduct(id) => format!("{PRODUCT_PREFIX}{id}"),
            Self::AddProduct(id) => format!("{ADD_PRODUCT_PREFIX}{id}"),
            Self::RemoveProduct(id) => format!("{REMOVE_PRODUCT_PREFIX}{id}"),
            Self::RecommendationsMenu => "recommendations".to_string(),
            Self::Recommend(RecommendationKind::Questionnaire) => {
                "recommendations_anketa".to_string()
            }
            Self::Recommend(RecommendationKind::WithProducts) => {
                "recommendations_products".to_string()
            }
            Self::Recommend(RecommendationKind::General) => "recommendations_general".to_string(),
            Self::MyProducts => "my_products".to_string(),
            Self::DeleteProductsMenu => "delete_products".to_string(),
            Self::BackToStart => "back_to_start".to_string(),
            Self::BadProductId(raw) | Self::Unknown(raw) => raw.clone(),
        }
    }
}

fn product_id(raw: &str, action: fn(i64) -> CallbackAction) -> CallbackAction {
    match raw.parse() {
        Ok(id) => action(id),
        Err(_) => CallbackAction::BadProductId(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::questionnaire::Question;

    #[test]
    fn menu_actions_round_trip_through_data() {
        let actions = [
            CallbackAction::ShowQuestionnaire,
            CallbackAction::StartForm,
            CallbackAction::Retake,
            CallbackAction::DeleteQuestionnaire,
            CallbackAction::RecommendationsMenu,
            CallbackAction::Recommend(RecommendationKind::Questionnaire),
            CallbackAction::Recommend(RecommendationKind::WithProducts),
            CallbackAction::Recommend(RecommendationKind::General),
            CallbackAction::MyProducts,
            CallbackAction::DeleteProductsMenu,
            CallbackAction::BackToStart,
            CallbackAction::ShowProduct(12),
            CallbackAction::AddProduct(12),
            CallbackAction::RemoveProduct(12),
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(&action.data()), action);
        }
    }

    #[test]
    fn option_codes_become_answers() {
        match CallbackAction::parse("gender_male") {
            CallbackAction::Answer(code) => {
                assert_eq!(code.question(), Question::Gender);
                assert!(code.is_male());
            }
            other => panic!("expected answer, got {other:?}"),
        }

        assert!(matches!(
            CallbackAction::parse("none_of_above"),
            CallbackAction::Answer(code) if code.question() == Question::Pregnancy
        ));
    }

    #[test]
    fn product_prefixes_do_not_shadow_each_other() {
        assert_eq!(
            CallbackAction::parse("add_product_7"),
            CallbackAction::AddProduct(7)
        );
        assert_eq!(
            CallbackAction::parse("remove_product_7"),
            CallbackAction::RemoveProduct(7)
        );
        assert_eq!(
            CallbackAction::parse("product_7"),
            CallbackAction::ShowProduct(7)
        );
    }

    #[test]
    fn malformed_payloads() {
        assert_eq!(
            CallbackAction::parse("product_abc"),
            CallbackAction::BadProductId("abc".to_string())
        );
        assert_eq!(
            CallbackAction::parse("surprise"),
            CallbackAction::Unknown("surprise".to_string())
        );
    }
}
