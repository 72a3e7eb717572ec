//! Text-generation providers.

mod openrouter;
pub mod provider;

pub use openrouter::OpenRouterProvider;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};
