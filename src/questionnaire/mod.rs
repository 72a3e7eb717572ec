//! Step-indexed skincare questionnaire.
//!
//! ```text
//!   callback / text ──► FormEvent ──► machine::apply ──► Outcome
//!                                          │
//!                      FormEngine ◄────────┘
//!                      ├── StateStore    (in-memory, owns the step cursor)
//!                      └── ProfileStore  (remote, best-effort mirror)
//! ```

mod engine;
mod machine;
mod prompts;
mod question;
mod state;
mod store;

pub use engine::{FormEngine, FormReply};
pub use machine::{FormEvent, IgnoreReason, Outcome, apply};
pub use prompts::{OptionRow, StepPrompt, prompt_for};
pub use question::{OptionCode, Question};
pub use state::{ConversationState, IDLE_STEP, TERMINAL_STEP};
pub use store::{InMemoryStateStore, StateStore};
