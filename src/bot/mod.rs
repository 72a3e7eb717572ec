//! Event dispatch: turns transport events into questionnaire, catalog and
//! recommendation calls and sends the resulting views.

pub mod callback;
pub mod views;

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;

use crate::UserId;
use crate::api::{ProductCatalog, SearchQuery};
use crate::channels::{ChatId, ChatTransport, IncomingEvent};
use crate::config::AssetsConfig;
use crate::error::ChannelError;
use crate::profile::ProfileStore;
use crate::questionnaire::{FormEngine, FormEvent, FormReply};
use crate::recommendations::{RecommendationKind, RecommendationService};

pub use callback::CallbackAction;
pub use views::Reply;

/// Marker for product links the bot cannot import yet.
const INCIDECODER_HOST: &str = "incidecoder.com";

pub struct Bot {
    transport: Arc<dyn ChatTransport>,
    forms: FormEngine,
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<dyn ProductCatalog>,
    recommendations: RecommendationService,
    form_image_url: String,
    images_dir: PathBuf,
}

impl Bot {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        forms: FormEngine,
        profiles: Arc<dyn ProfileStore>,
        catalog: Arc<dyn ProductCatalog>,
        recommendations: RecommendationService,
        assets: &AssetsConfig,
    ) -> Self {
        Self {
            transport,
            forms,
            profiles,
            catalog,
            recommendations,
            form_image_url: assets.form_image_url.clone(),
            images_dir: assets.images_dir.clone(),
        }
    }

    /// Consume the transport stream, handling each event on its own task.
    pub async fn run(self: Arc<Self>) -> Result<(), ChannelError> {
        let mut events = self.transport.start().await?;
        tracing::info!(channel = self.transport.name(), "Bot started");

        while let Some(event) = events.next().await {
            let bot = Arc::clone(&self);
            tokio::spawn(async move { bot.handle_event(event).await });
        }

        tracing::info!("Event stream closed, bot stopping");
        Ok(())
    }

    pub async fn handle_event(&self, event: IncomingEvent) {
        match event {
            IncomingEvent::Text { user, chat, text } => self.on_text(user, chat, text).await,
            IncomingEvent::Command {
                user,
                chat,
                command,
                ..
            } => self.on_command(user, chat, &command).await,
            IncomingEvent::Callback {
                user,
                chat,
                callback_id,
                message_id,
                data,
            } => {
                self.on_callback(user, chat, &callback_id, message_id, &data)
                    .await
            }
            IncomingEvent::InlineQuery {
                user,
                query_id,
                query,
            } => self.on_inline_query(user, &query_id, &query).await,
        }
    }

    async fn on_text(&self, user: UserId, chat: ChatId, text: String) {
        tracing::debug!(user, len = text.len(), "Text message");

        if text.contains(INCIDECODER_HOST) {
            for reply in views::incidecoder_notices() {
                self.send(chat, &reply).await;
            }
            return;
        }

        self.form_event(user, chat, FormEvent::FreeText(text)).await;
    }

    async fn on_command(&self, user: UserId, chat: ChatId, command: &str) {
        tracing::info!(user, command, "Command");
        match command {
            "start" => self.send(chat, &views::welcome(&self.images_dir)).await,
            "help" => self.send(chat, &views::help()).await,
            "form" => self.form_event(user, chat, FormEvent::StartForm).await,
            "myproducts" => self.show_collection(user, chat, false).await,
            _ => self.send(chat, &views::unknown_command()).await,
        }
    }

    async fn on_callback(
        &self,
        user: UserId,
        chat: ChatId,
        callback_id: &str,
        message_id: Option<i64>,
        data: &str,
    ) {
        tracing::info!(user, data, "Callback");

        // The pressed menu goes away before anything new is shown.
        if let Some(message_id) = message_id
            && let Err(e) = self.transport.delete_message(chat, message_id).await
        {
            tracing::debug!(user, error = %e, "Failed to delete pressed message");
        }
        if let Err(e) = self.transport.answer_callback(callback_id).await {
            tracing::debug!(user, error = %e, "Failed to answer callback");
        }

        match CallbackAction::parse(data) {
            CallbackAction::ShowQuestionnaire => self.show_questionnaire(user, chat).await,
            CallbackAction::StartForm => self.form_event(user, chat, FormEvent::StartForm).await,
            CallbackAction::Retake => self.form_event(user, chat, FormEvent::Retake).await,
            CallbackAction::DeleteQuestionnaire => {
                self.form_event(user, chat, FormEvent::DeleteQuestionnaire)
                    .await
            }
            CallbackAction::Answer(code) => {
                self.form_event(user, chat, FormEvent::Answer(code)).await
            }
            CallbackAction::ShowProduct(id) => self.show_product(chat, id).await,
            CallbackAction::AddProduct(id) => {
                let result = self.profiles.add_product(user, id).await;
                if let Err(e) = &result {
                    tracing::warn!(user, product = id, error = %e, "Failed to add product");
                }
                self.send(chat, &views::product_added(&result)).await;
            }
            CallbackAction::RemoveProduct(id) => {
                let result = self.profiles.remove_product(user, id).await;
                self.send(chat, &views::product_removed(&result)).await;
                if result.is_ok() {
                    self.show_collection(user, chat, true).await;
                }
            }
            CallbackAction::RecommendationsMenu => {
                self.send(chat, &views::recommendations_menu(&self.images_dir))
                    .await
            }
            CallbackAction::Recommend(kind) => self.recommend(user, chat, kind).await,
            CallbackAction::MyProducts => self.show_collection(user, chat, true).await,
            CallbackAction::DeleteProductsMenu => match self.profiles.list_products(user).await {
                Ok(products) => self.send(chat, &views::removal_menu(&products)).await,
                Err(e) => self.send(chat, &views::products_error(&e)).await,
            },
            CallbackAction::BackToStart => {
                self.send(chat, &views::welcome(&self.images_dir)).await
            }
            CallbackAction::BadProductId(raw) => {
                tracing::warn!(user, raw, "Callback with malformed product id");
                self.send(chat, &views::bad_product_id()).await;
            }
            CallbackAction::Unknown(raw) => {
                tracing::warn!(user, raw, "Unknown callback");
            }
        }
    }

    async fn on_inline_query(&self, user: UserId, query_id: &str, query: &str) {
        tracing::info!(user, query, "Inline query");

        let (articles, cache_time) = if query.chars().count() < views::INLINE_MIN_QUERY_CHARS {
            (vec![views::inline_too_short()], 0)
        } else {
            let search = SearchQuery::new(query, views::INLINE_SEARCH_LIMIT);
            match self.catalog.search(&search).await {
                Ok(products) if products.is_empty() => (vec![views::inline_not_found(query)], 0),
                Ok(products) => {
                    tracing::debug!(user, hits = products.len(), "Inline search results");
                    (views::inline_results(&products), views::INLINE_CACHE_SECS)
                }
                Err(e) => {
                    tracing::warn!(user, error = %e, "Inline search failed");
                    (vec![views::inline_error()], 0)
                }
            }
        };

        if let Err(e) = self
            .transport
            .answer_inline_query(query_id, &articles, cache_time)
            .await
        {
            tracing::warn!(user, error = %e, "Failed to answer inline query");
        }
    }

    async fn form_event(&self, user: UserId, chat: ChatId, event: FormEvent) {
        let reply = match self.forms.handle(user, event).await {
            Ok(FormReply::Ask(question)) => views::form_step(question, &self.form_image_url),
            Ok(FormReply::Finished(profile)) => views::form_summary(&profile, &self.images_dir),
            Ok(FormReply::Deleted) => views::questionnaire_deleted(),
            Ok(FormReply::Ignored(_)) => return,
            Err(e) => {
                tracing::warn!(user, error = %e, "Failed to delete questionnaire");
                views::questionnaire_delete_failed(&e)
            }
        };
        self.send(chat, &reply).await;
    }

    async fn show_questionnaire(&self, user: UserId, chat: ChatId) {
        let reply = match self.profiles.load_authoritative(user).await {
            Ok(Some(profile)) if !profile.is_empty() => {
                views::stored_questionnaire(&profile, &self.images_dir)
            }
            Ok(_) => views::no_questionnaire(),
            Err(e) => {
                tracing::warn!(user, error = %e, "Profile lookup failed");
                views::no_questionnaire()
            }
        };
        self.send(chat, &reply).await;
    }

    async fn show_collection(&self, user: UserId, chat: ChatId, with_back: bool) {
        self.send(chat, &views::products_loading()).await;
        let reply = match self.profiles.list_products(user).await {
            Ok(products) => views::collection(&products, &self.images_dir, with_back),
            Err(e) => {
                tracing::warn!(user, error = %e, "Failed to load products");
                views::products_error(&e)
            }
        };
        self.send(chat, &reply).await;
    }

    async fn show_product(&self, chat: ChatId, id: i64) {
        let reply = match self.catalog.product(id).await {
            Ok(product) => views::product_card(&product),
            Err(e) => views::product_error(&e),
        };
        self.send(chat, &reply).await;
    }

    async fn recommend(&self, user: UserId, chat: ChatId, kind: RecommendationKind) {
        self.send(chat, &views::recommendation_loading(kind)).await;

        let text = match self.recommendations.generate(user, kind).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user, ?kind, error = %e, "Recommendation failed");
                self.send(chat, &views::recommendation_error(kind, &e)).await;
                return;
            }
        };

        let (html, plain) = views::recommendation_result(kind, &text);
        if let Err(e) = self.try_send(chat, &html).await {
            tracing::warn!(user, error = %e, "HTML send failed, retrying as plain text");
            self.send(chat, &plain).await;
        }
    }

    async fn try_send(&self, chat: ChatId, reply: &Reply) -> Result<(), ChannelError> {
        match reply {
            Reply::Text {
                text,
                format,
                keyboard,
            } => {
                self.transport
                    .send_text(chat, text, *format, keyboard.as_ref())
                    .await
            }
            Reply::Photo {
                image,
                caption,
                keyboard,
            } => {
                self.transport
                    .send_photo(chat, image, caption, keyboard.as_ref())
                    .await
            }
        }
    }

    /// Send and log failures; the conversation carries on either way.
    async fn send(&self, chat: ChatId, reply: &Reply) {
        if let Err(e) = self.try_send(chat, reply).await {
            tracing::warn!(chat, error = %e, "Failed to send reply");
        }
    }
}
