//! Error types for the skincare bot.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data API error: {0}")]
    Api(#[from] ApiError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Recommendation error: {0}")]
    Recommendation(#[from] RecommendationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Errors from the remote data API (profiles, products, ingredients).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {path} failed: {reason}")]
    RequestFailed { path: String, reason: String },

    #[error("Request to {path} timed out")]
    Timeout { path: String },

    #[error("API error: {status} - {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },

    #[error("Failed to build API client: {0}")]
    Client(String),
}

impl ApiError {
    /// True when the remote answered 404 for the resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Chat transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text-generation provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Authentication failed for provider {provider} (HTTP 401)")]
    AuthFailed { provider: String },

    #[error("Provider {provider} rate limited")]
    RateLimited { provider: String },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Provider {provider} reported an error: {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} returned no choices")]
    EmptyResponse { provider: String },
}

/// Recommendation request failures.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("failed to load profile: {0}")]
    ProfileUnavailable(#[source] ApiError),

    #[error("questionnaire has not been filled in")]
    ProfileMissing,

    #[error("failed to load products: {0}")]
    ProductsUnavailable(#[source] ApiError),

    #[error("{0}")]
    Generation(#[from] LlmError),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
