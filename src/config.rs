//! Configuration for the skincare bot.
//!
//! Everything comes from environment variables; a `.env` file in the working
//! directory is loaded first if present.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Default OpenRouter endpoint.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model used for recommendations.
pub const DEFAULT_OPENROUTER_MODEL: &str = "deepseek/deepseek-r1";

/// Photo shown above every questionnaire step.
pub const DEFAULT_FORM_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1464983953574-0892a716854b";

/// Main configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub api: ApiConfig,
    pub llm: LlmConfig,
    pub assets: AssetsConfig,
    pub debug: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            telegram: TelegramConfig::from_env()?,
            api: ApiConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            assets: AssetsConfig::from_env()?,
            debug: parse_optional_env("DEBUG", false)?,
        })
    }

    /// One line per setting with secrets reduced to their length.
    pub fn redacted_summary(&self) -> Vec<String> {
        vec![
            format!(
                "BOT_TOKEN: <{} chars>",
                self.telegram.bot_token.expose_secret().len()
            ),
            format!("API_URL: {}", self.api.base_url),
            format!("API_TIMEOUT_SECS: {}", self.api.timeout.as_secs()),
            format!(
                "OPENROUTER_API_KEY: <{} chars>",
                self.llm.api_key.expose_secret().len()
            ),
            format!("OPENROUTER_BASE_URL: {}", self.llm.base_url),
            format!("OPENROUTER_MODEL: {}", self.llm.model),
            format!("LLM_MAX_TOKENS: {}", self.llm.max_tokens),
            format!("LLM_TEMPERATURE: {}", self.llm.temperature),
            format!("LLM_TIMEOUT_SECS: {}", self.llm.timeout.as_secs()),
            format!("FORM_IMAGE_URL: {}", self.assets.form_image_url),
            format!("IMAGES_DIR: {}", self.assets.images_dir.display()),
            format!("DEBUG: {}", self.debug),
        ]
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub api_base: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl TelegramConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bot_token = required_env("BOT_TOKEN", "Create a bot with @BotFather and set BOT_TOKEN")?;
        let api_base = optional_env("TELEGRAM_API_BASE")?
            .unwrap_or_else(|| "https://api.telegram.org".to_string());
        validate_url("TELEGRAM_API_BASE", &api_base)?;

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            api_base: api_base.trim_end_matches('/').to_string(),
            poll_timeout_secs: parse_optional_env("TELEGRAM_POLL_TIMEOUT_SECS", 60)?,
        })
    }

    /// Get the bot token (exposes the secret).
    pub fn token(&self) -> &str {
        self.bot_token.expose_secret()
    }
}

/// Remote data API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = required_env("API_URL", "Set API_URL to the cosmetics data API base URL")?;
        validate_url("API_URL", &base_url)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(parse_optional_env("API_TIMEOUT_SECS", 30)?),
        })
    }
}

/// Text-generation provider settings (OpenRouter, OpenAI-compatible).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = required_env(
            "OPENROUTER_API_KEY",
            "Get a key at https://openrouter.ai/keys and set OPENROUTER_API_KEY",
        )?;
        let base_url = optional_env("OPENROUTER_BASE_URL")?
            .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());
        validate_url("OPENROUTER_BASE_URL", &base_url)?;

        let temperature: f32 = parse_optional_env("LLM_TEMPERATURE", 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TEMPERATURE".to_string(),
                message: "must be between 0.0 and 2.0".to_string(),
            });
        }

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            model: optional_env("OPENROUTER_MODEL")?
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            max_tokens: parse_optional_env("LLM_MAX_TOKENS", 4000)?,
            temperature,
            timeout: Duration::from_secs(parse_optional_env("LLM_TIMEOUT_SECS", 120)?),
        })
    }
}

/// Images used by the bot menus.
#[derive(Debug, Clone)]
pub struct AssetsConfig {
    pub form_image_url: String,
    pub images_dir: PathBuf,
}

impl AssetsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            form_image_url: optional_env("FORM_IMAGE_URL")?
                .unwrap_or_else(|| DEFAULT_FORM_IMAGE_URL.to_string()),
            images_dir: optional_env("IMAGES_DIR")?
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("images")),
        })
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            form_image_url: DEFAULT_FORM_IMAGE_URL.to_string(),
            images_dir: PathBuf::from("images"),
        }
    }
}

// Helper functions

fn required_env(key: &str, hint: &str) -> Result<String, ConfigError> {
    optional_env(key)?.ok_or_else(|| ConfigError::MissingRequired {
        key: key.to_string(),
        hint: hint.to_string(),
    })
}

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must start with http:// or https://".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}
