//! Telegram Bot API transport over plain HTTPS.
//!
//! Updates arrive by `getUpdates` long polling on a background task and are
//! forwarded into an mpsc channel; sends are individual JSON (or multipart,
//! for local photos) POSTs.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channels::{
    ChatId, ChatTransport, ImageRef, IncomingEvent, InlineArticle, InlineKeyboard, MessageStream,
    TextFormat,
};
use crate::config::TelegramConfig;
use crate::error::ChannelError;
use crate::formatting::balance_tags;

const CHANNEL_NAME: &str = "telegram";

/// Hard limit on message text length.
pub const MESSAGE_LIMIT: usize = 4096;

/// Hard limit on photo caption length.
pub const CAPTION_LIMIT: usize = 1024;

/// Pause after a failed poll before trying again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Bot API endpoint plus credentials. Cheap to clone into the poller task.
#[derive(Clone)]
struct BotApi {
    client: Client,
    api_base: String,
    token: SecretString,
    poll_timeout_secs: u64,
}

impl BotApi {
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base,
            self.token.expose_secret(),
            method
        )
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, ChannelError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| send_failed(method, e))?;
        parse_response(method, response).await
    }

    async fn call_multipart<T: DeserializeOwned>(
        &self,
        method: &str,
        form: Form,
    ) -> Result<T, ChannelError> {
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_failed(method, e))?;
        parse_response(method, response).await
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ChannelError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message", "callback_query", "inline_query"],
            }),
        )
        .await
    }

    async fn poll_loop(self, tx: mpsc::Sender<IncomingEvent>) {
        let mut offset = 0;
        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "Telegram poll failed, retrying");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(event) = update.into_event() else {
                    continue;
                };
                if tx.send(event).await.is_err() {
                    tracing::info!("Event receiver dropped, stopping Telegram polling");
                    return;
                }
            }
        }
    }
}

pub struct TelegramChannel {
    api: BotApi,
    started: AtomicBool,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> Result<Self, ChannelError> {
        // Long polls hold the connection open for `poll_timeout_secs`.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 15))
            .build()
            .map_err(|e| ChannelError::StartupFailed {
                name: CHANNEL_NAME.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            api: BotApi {
                client,
                api_base: config.api_base.trim_end_matches('/').to_string(),
                token: config.bot_token.clone(),
                poll_timeout_secs: config.poll_timeout_secs,
            },
            started: AtomicBool::new(false),
        })
    }

    async fn send_chunk(
        &self,
        chat: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChannelError> {
        let mut body = json!({ "chat_id": chat, "text": text });
        if format == TextFormat::Html {
            body["parse_mode"] = json!("HTML");
        }
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = markup(keyboard)?;
        }
        let _: Value = self.api.call("sendMessage", &body).await?;
        Ok(())
    }

    async fn upload_photo(
        &self,
        chat: ChatId,
        image: &ImageRef,
        caption: Option<&str>,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChannelError> {
        match image {
            ImageRef::Url(url) => {
                let mut body = json!({ "chat_id": chat, "photo": url });
                if let Some(caption) = caption {
                    body["caption"] = json!(caption);
                    body["parse_mode"] = json!("HTML");
                }
                if let Some(keyboard) = keyboard {
                    body["reply_markup"] = markup(keyboard)?;
                }
                let _: Value = self.api.call("sendPhoto", &body).await?;
            }
            ImageRef::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                let mut form = Form::new()
                    .text("chat_id", chat.to_string())
                    .part("photo", Part::bytes(bytes).file_name(file_name(path)));
                if let Some(caption) = caption {
                    form = form
                        .text("caption", caption.to_string())
                        .text("parse_mode", "HTML");
                }
                if let Some(keyboard) = keyboard {
                    form = form.text("reply_markup", markup(keyboard)?.to_string());
                }
                let _: Value = self.api.call_multipart("sendPhoto", form).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ChannelError::StartupFailed {
                name: CHANNEL_NAME.to_string(),
                reason: "start() already called".to_string(),
            });
        }

        let me: Value = match self.api.call("getMe", &json!({})).await {
            Ok(me) => me,
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(ChannelError::StartupFailed {
                    name: CHANNEL_NAME.to_string(),
                    reason: e.to_string(),
                });
            }
        };
        tracing::info!(
            username = me["username"].as_str().unwrap_or_default(),
            "Telegram bot authorized"
        );

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(self.api.clone().poll_loop(tx));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChannelError> {
        let chunks = match format {
            TextFormat::Html => split_html(text, MESSAGE_LIMIT),
            TextFormat::Plain => split_message(text, MESSAGE_LIMIT),
        };
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            // Buttons go under the last chunk only.
            let keyboard = if i == last { keyboard } else { None };
            self.send_chunk(chat, chunk, format, keyboard).await?;
        }
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        image: &ImageRef,
        caption: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChannelError> {
        if caption.chars().count() <= CAPTION_LIMIT {
            return self.upload_photo(chat, image, Some(caption), keyboard).await;
        }

        // Too long for a caption: bare photo, then the text with the buttons.
        self.upload_photo(chat, image, None, None).await?;
        self.send_text(chat, caption, TextFormat::Html, keyboard)
            .await
    }

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), ChannelError> {
        let _: Value = self
            .api
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), ChannelError> {
        let _: Value = self
            .api
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }

    async fn answer_inline_query(
        &self,
        query_id: &str,
        articles: &[InlineArticle],
        cache_time: u32,
    ) -> Result<(), ChannelError> {
        let results = articles
            .iter()
            .map(article_json)
            .collect::<Result<Vec<_>, _>>()?;
        let _: Value = self
            .api
            .call(
                "answerInlineQuery",
                &json!({
                    "inline_query_id": query_id,
                    "results": results,
                    "cache_time": cache_time,
                }),
            )
            .await?;
        Ok(())
    }
}

fn send_failed(method: &str, e: reqwest::Error) -> ChannelError {
    // reqwest errors carry the URL, which embeds the token.
    let e = e.without_url();
    ChannelError::SendFailed {
        name: CHANNEL_NAME.to_string(),
        reason: format!("{method}: {e}"),
    }
}

async fn parse_response<T: DeserializeOwned>(
    method: &str,
    response: reqwest::Response,
) -> Result<T, ChannelError> {
    let status = response.status();
    let body: ApiResponse<T> = response.json().await.map_err(|e| send_failed(method, e))?;

    match (body.ok, body.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(ChannelError::SendFailed {
            name: CHANNEL_NAME.to_string(),
            reason: format!(
                "{method}: HTTP {status}: {}",
                body.description.unwrap_or_else(|| "no description".to_string())
            ),
        }),
    }
}

fn markup(keyboard: &InlineKeyboard) -> Result<Value, ChannelError> {
    serde_json::to_value(keyboard).map_err(|e| ChannelError::InvalidMessage(e.to_string()))
}

fn article_json(article: &InlineArticle) -> Result<Value, ChannelError> {
    let mut value = json!({
        "type": "article",
        "id": article.id,
        "title": article.title,
        "input_message_content": { "message_text": article.message_text },
        "description": article.description,
    });
    if let Some(url) = article.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
        value["thumbnail_url"] = json!(url);
    }
    if let Some(keyboard) = &article.keyboard {
        value["reply_markup"] = markup(keyboard)?;
    }
    Ok(value)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo.png".to_string())
}

/// Split `text` into chunks of at most `max_len` characters, preferring
/// newline and then space boundaries.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    split_at_boundaries(text, max_len, false)
}

/// Split Telegram HTML into chunks that each parse on their own.
///
/// Every chunk gets its `<b>` and `<i>` tags balanced. When the added tags
/// push a chunk past `max_len`, the text is split again with a smaller
/// budget.
pub fn split_html(text: &str, max_len: usize) -> Vec<String> {
    let mut budget = max_len;
    loop {
        let chunks: Vec<String> = split_at_boundaries(text, budget, true)
            .iter()
            .map(|chunk| balance_tags(chunk))
            .collect();
        let fits = chunks.iter().all(|c| c.chars().count() <= max_len);
        if fits || budget <= MIN_HTML_BUDGET {
            return chunks;
        }
        budget = (budget * 3 / 4).max(MIN_HTML_BUDGET);
    }
}

/// Smallest raw chunk `split_html` will shrink to.
const MIN_HTML_BUDGET: usize = 256;

fn split_at_boundaries(text: &str, max_len: usize, keep_tags: bool) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((hard_end, _)) = remaining.char_indices().nth(max_len) else {
            chunks.push(remaining.to_string());
            break;
        };

        let window = &remaining[..hard_end];
        let mut split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(hard_end);

        // Never cut through a tag.
        if keep_tags
            && let Some(open) = window[..split_at].rfind('<')
            && open > 0
            && !window[open..split_at].contains('>')
        {
            split_at = open;
        }

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start_matches(['\n', ' ']);
    }

    chunks
}

/// Split a command message into the command name and its arguments.
///
/// `/start@my_bot payload` yields `("start", "payload")`.
fn parse_command(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let command = head.split('@').next().unwrap_or(head);
    if command.is_empty() {
        return None;
    }
    Some((command.to_string(), args.trim().to_string()))
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<TgMessage>,
    callback_query: Option<TgCallbackQuery>,
    inline_query: Option<TgInlineQuery>,
}

impl Update {
    fn into_event(self) -> Option<IncomingEvent> {
        if let Some(message) = self.message {
            let user = message.from.as_ref().map_or(message.chat.id, |u| u.id);
            let chat = message.chat.id;
            let text = message.text?;
            return Some(match parse_command(&text) {
                Some((command, args)) => IncomingEvent::Command {
                    user,
                    chat,
                    command,
                    args,
                },
                None => IncomingEvent::Text { user, chat, text },
            });
        }

        if let Some(callback) = self.callback_query {
            let chat = callback
                .message
                .as_ref()
                .map_or(callback.from.id, |m| m.chat.id);
            return Some(IncomingEvent::Callback {
                user: callback.from.id,
                chat,
                callback_id: callback.id,
                message_id: callback.message.map(|m| m.message_id),
                data: callback.data.unwrap_or_default(),
            });
        }

        self.inline_query.map(|query| IncomingEvent::InlineQuery {
            user: query.from.id,
            query_id: query.id,
            query: query.query,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    from: Option<TgUser>,
    chat: TgChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgCallbackQuery {
    id: String,
    from: TgUser,
    message: Option<TgMessage>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgInlineQuery {
    id: String,
    from: TgUser,
    #[serde(default)]
    query: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn update(json: Value) -> Update {
        serde_json::from_value(json).expect("valid update")
    }

    #[test]
    fn test_split_message_short() {
        assert_eq!(split_message("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_split_message_prefers_newlines() {
        let text = "first line\nsecond line\nthird";
        let chunks = split_message(text, 15);
        assert_eq!(chunks, vec!["first line", "second line", "third"]);
    }

    #[test]
    fn test_split_message_counts_characters() {
        let text = "яяяяяяяяяя";
        let chunks = split_message(text, 4);
        assert_eq!(chunks, vec!["яяяя", "яяяя", "яя"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
    }

    #[test]
    fn test_split_html_balances_every_chunk() {
        let raw = "**Очищение** утром мягкой пенкой, затем ниацинамид и SPF.\n".repeat(120);
        let html = crate::formatting::format_for_telegram(&raw);
        assert!(html.chars().count() > MESSAGE_LIMIT);

        let chunks = split_html(&html, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MESSAGE_LIMIT);
            assert_eq!(balance_tags(chunk), *chunk, "unbalanced chunk");
            assert_eq!(chunk.matches("<b>").count(), chunk.matches("</b>").count());
        }
    }

    #[test]
    fn test_split_html_never_cuts_a_tag() {
        let chunks = split_at_boundaries("ааааа<b>бб</b>", 7, true);
        assert_eq!(chunks, vec!["ааааа", "<b>бб", "</b>"]);
        assert_eq!(split_html("<b>short</b>", 20), vec!["<b>short</b>"]);
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("/start"),
            Some(("start".to_string(), String::new()))
        );
        assert_eq!(
            parse_command("/form@cosmetics_bot now"),
            Some(("form".to_string(), "now".to_string()))
        );
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("hello"), None);
    }

    #[test]
    fn test_message_update_becomes_text_or_command() {
        let text = update(json!({
            "update_id": 1,
            "message": {
                "message_id": 5,
                "from": { "id": 42 },
                "chat": { "id": 42 },
                "text": "acne and redness"
            }
        }));
        assert_eq!(
            text.into_event(),
            Some(IncomingEvent::Text {
                user: 42,
                chat: 42,
                text: "acne and redness".to_string()
            })
        );

        let command = update(json!({
            "update_id": 2,
            "message": {
                "message_id": 6,
                "from": { "id": 42 },
                "chat": { "id": 42 },
                "text": "/help"
            }
        }));
        assert!(matches!(
            command.into_event(),
            Some(IncomingEvent::Command { command, .. }) if command == "help"
        ));
    }

    #[test]
    fn test_message_without_text_is_skipped() {
        let photo = update(json!({
            "update_id": 3,
            "message": { "message_id": 7, "chat": { "id": 42 } }
        }));
        assert_eq!(photo.into_event(), None);
    }

    #[test]
    fn test_callback_update() {
        let callback = update(json!({
            "update_id": 4,
            "callback_query": {
                "id": "cb-1",
                "from": { "id": 42 },
                "message": { "message_id": 9, "chat": { "id": 100 } },
                "data": "skin_dry"
            }
        }));
        assert_eq!(
            callback.into_event(),
            Some(IncomingEvent::Callback {
                user: 42,
                chat: 100,
                callback_id: "cb-1".to_string(),
                message_id: Some(9),
                data: "skin_dry".to_string(),
            })
        );
    }

    #[test]
    fn test_inline_query_update() {
        let inline = update(json!({
            "update_id": 5,
            "inline_query": { "id": "iq", "from": { "id": 42 }, "query": "add spf" }
        }));
        assert_eq!(
            inline.into_event(),
            Some(IncomingEvent::InlineQuery {
                user: 42,
                query_id: "iq".to_string(),
                query: "add spf".to_string(),
            })
        );
    }

    #[test]
    fn test_article_json_shape() {
        let article = InlineArticle {
            id: "product_7".to_string(),
            title: "CeraVe Cleanser".to_string(),
            message_text: "Gentle".to_string(),
            description: "Gentle".to_string(),
            thumbnail_url: Some(String::new()),
            keyboard: Some(InlineKeyboard::new().button("➕", "add_product_7")),
        };
        let value = article_json(&article).expect("serializes");
        assert_eq!(value["type"], "article");
        assert_eq!(value["input_message_content"]["message_text"], "Gentle");
        assert!(value.get("thumbnail_url").is_none());
        assert_eq!(
            value["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "add_product_7"
        );
    }
}
