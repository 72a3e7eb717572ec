//! Chat transport abstraction.
//!
//! The bot only needs a handful of capabilities from the messenger: an
//! inbound event stream and a few send/answer calls. Everything is keyed by
//! numeric ids so the bot never sees transport-specific types.

mod telegram;

pub use telegram::TelegramChannel;

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;

use crate::UserId;
use crate::error::ChannelError;

/// Chat to send into. For private chats it equals the user id.
pub type ChatId = i64;

/// Stream of inbound events produced by [`ChatTransport::start`].
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingEvent> + Send>>;

/// An inbound event, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingEvent {
    /// Plain text message.
    Text {
        user: UserId,
        chat: ChatId,
        text: String,
    },
    /// `/command args`.
    Command {
        user: UserId,
        chat: ChatId,
        command: String,
        args: String,
    },
    /// Inline button press.
    Callback {
        user: UserId,
        chat: ChatId,
        callback_id: String,
        message_id: Option<i64>,
        data: String,
    },
    /// Inline-mode search typed in any chat.
    InlineQuery {
        user: UserId,
        query_id: String,
        query: String,
    },
}

impl IncomingEvent {
    pub fn user(&self) -> UserId {
        match self {
            Self::Text { user, .. }
            | Self::Command { user, .. }
            | Self::Callback { user, .. }
            | Self::InlineQuery { user, .. } => *user,
        }
    }
}

/// Button carrying callback data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    #[serde(rename = "inline_keyboard")]
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row.
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// Append a row with a single button.
    pub fn button(self, text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.row(vec![InlineButton::new(text, callback_data)])
    }

    pub fn callback_data(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.callback_data.as_str())
    }
}

/// Where a photo comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    File(PathBuf),
}

/// Parse mode for outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// One result of an inline query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineArticle {
    pub id: String,
    pub title: String,
    /// Text posted when the user picks the result.
    pub message_text: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub keyboard: Option<InlineKeyboard>,
}

/// Messenger capabilities the bot depends on.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Start receiving events. May be called once.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChannelError>;

    /// Send a photo with an HTML caption.
    async fn send_photo(
        &self,
        chat: ChatId,
        image: &ImageRef,
        caption: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChannelError>;

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), ChannelError>;

    async fn answer_callback(&self, callback_id: &str) -> Result<(), ChannelError>;

    async fn answer_inline_query(
        &self,
        query_id: &str,
        articles: &[InlineArticle],
        cache_time: u32,
    ) -> Result<(), ChannelError>;
}
