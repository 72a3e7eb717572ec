//! Telegram skincare assistant.
//!
//! Walks a user through an eleven-question skin questionnaire, keeps the
//! answers in a remote profile API, manages their product collection and asks
//! an OpenRouter model for care routines built from both.

pub mod api;
pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod formatting;
pub mod llm;
pub mod profile;
pub mod questionnaire;
pub mod recommendations;
pub mod vocabulary;

pub use config::Config;
pub use error::{Error, Result};

/// Telegram user id. Also the key for questionnaire state and the remote profile.
pub type UserId = i64;
