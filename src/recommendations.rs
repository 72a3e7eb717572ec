//! Recommendation requests: stored profile (and products) in, generated text out.
//!
//! Prompt assembly is pure and deterministic; the service adds the two reads
//! and the single provider call. No retries, no caching.

use std::sync::Arc;

use crate::UserId;
use crate::api::UserProduct;
use crate::error::{LlmError, RecommendationError};
use crate::llm::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};
use crate::profile::{ProfileStore, StoredProfile};

const CONSULTANT_ROLE: &str = "Ты — профессиональный косметолог и дерматолог-консультант.";

const ROUTINE_RULES: &str = "- Учитывай тип кожи, возраст, пол, беременность, аллергию на ингредиенты, климат и цели ухода.
- Если найден потенциальный аллерген в составе — предупреди.
- Рекомендации должны быть понятными и аккуратными, как будто ты — дерматолог-консультант.
- Укажи, какие продукты можно использовать утром, какие вечером, какие через день, какие несовместимы между собой.
- В конце дай 2–3 рекомендации по продуктам, которых явно не хватает.";

const GENERAL_RULES: &str = "- Проанализируй текущий уход и дай общие советы по улучшению.
- Укажи, какие этапы ухода отсутствуют или недостаточно проработаны.
- Дай рекомендации по изменению образа жизни для улучшения состояния кожи.
- Предложи общие принципы ухода, которые подходят для данного типа кожи и возраста.
- Укажи сезонные особенности ухода.
- Дай советы по питанию и образу жизни для здоровья кожи.";

const NO_PRODUCTS: &str = "У пользователя пока нет добавленных продуктов.";

/// The three recommendation flavours offered in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationKind {
    /// From the questionnaire alone.
    Questionnaire,
    /// Routine built from the user's own products.
    WithProducts,
    /// Broad advice on current care, lifestyle and diet.
    General,
}

impl RecommendationKind {
    pub fn needs_products(self) -> bool {
        !matches!(self, Self::Questionnaire)
    }
}

/// How a failed request should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Slow provider; worth offering a retry.
    Timeout,
    /// Bad or missing credentials.
    Auth,
    Other,
}

/// Classify a failure for the user-facing message.
pub fn classify(err: &RecommendationError) -> FailureClass {
    match err {
        RecommendationError::Generation(LlmError::Timeout { .. }) => FailureClass::Timeout,
        RecommendationError::Generation(LlmError::AuthFailed { .. }) => FailureClass::Auth,
        other => {
            let text = other.to_string().to_lowercase();
            if text.contains("timeout") || text.contains("timed out") || text.contains("deadline exceeded") {
                FailureClass::Timeout
            } else if text.contains("401") {
                FailureClass::Auth
            } else {
                FailureClass::Other
            }
        }
    }
}

/// Profile lines for the prompt, one `Label: value` per filled field.
pub fn profile_block(profile: &StoredProfile) -> String {
    profile
        .filled_fields()
        .map(|(question, value)| format!("{}: {}", question.label(), value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Product lines for the prompt.
pub fn products_block(products: &[UserProduct]) -> String {
    if products.is_empty() {
        return NO_PRODUCTS.to_string();
    }

    let mut lines = Vec::with_capacity(products.len() * 2);
    for product in products {
        lines.push(format!("- {} ({})", product.title, product.brand));
        if !product.details.is_empty() {
            lines.push(format!("  Описание: {}", product.details));
        }
    }
    lines.join("\n")
}

/// Render the full prompt. Products are ignored for [`RecommendationKind::Questionnaire`].
pub fn build_prompt(
    kind: RecommendationKind,
    profile: &StoredProfile,
    products: &[UserProduct],
) -> String {
    let profile = profile_block(profile);
    match kind {
        RecommendationKind::Questionnaire => format!(
            "{CONSULTANT_ROLE}

На основе анкеты, составь рекомендации:
- Распиши оптимальный план ухода (утро/вечер) с последовательностью применения (step-by-step).
{ROUTINE_RULES}

**Анкета пользователя:**
{profile}"
        ),
        RecommendationKind::WithProducts => format!(
            "{CONSULTANT_ROLE}

На основе анкеты и списка косметических средств, составь рекомендации:
- Распиши оптимальный план ухода (утро/вечер) с последовательностью применения (step-by-step).
- Используй только средства, которые уже есть у пользователя, **но укажи, если какого-то этапа не хватает**.
{ROUTINE_RULES}

**Анкета пользователя:**
{profile}

**Продукты пользователя:**
{products}",
            products = products_block(products)
        ),
        RecommendationKind::General => format!(
            "{CONSULTANT_ROLE}

На основе анкеты и списка косметических средств, составь общие рекомендации:
{GENERAL_RULES}

**Анкета пользователя:**
{profile}

**Продукты пользователя:**
{products}",
            products = products_block(products)
        ),
    }
}

/// Loads inputs and asks the provider for a recommendation.
pub struct RecommendationService {
    profiles: Arc<dyn ProfileStore>,
    llm: Arc<dyn LlmProvider>,
    max_tokens: u32,
    temperature: f32,
}

impl RecommendationService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        llm: Arc<dyn LlmProvider>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            profiles,
            llm,
            max_tokens,
            temperature,
        }
    }

    /// Generate a recommendation. The provider's text is returned unmodified.
    pub async fn generate(
        &self,
        user: UserId,
        kind: RecommendationKind,
    ) -> Result<String, RecommendationError> {
        let profile = self
            .profiles
            .load_authoritative(user)
            .await
            .map_err(RecommendationError::ProfileUnavailable)?
            .ok_or(RecommendationError::ProfileMissing)?;

        let products = if kind.needs_products() {
            self.profiles
                .list_products(user)
                .await
                .map_err(RecommendationError::ProductsUnavailable)?
        } else {
            Vec::new()
        };

        let prompt = build_prompt(kind, &profile, &products);
        tracing::info!(
            user,
            ?kind,
            products = products.len(),
            model = self.llm.model_name(),
            "Requesting recommendation"
        );

        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let response = self.llm.complete(request).await?;
        tracing::debug!(
            user,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Recommendation generated"
        );
        if response.finish_reason == FinishReason::Length {
            tracing::warn!(user, max_tokens = self.max_tokens, "Recommendation cut off at the token limit");
        }
        Ok(response.content)
    }
}
