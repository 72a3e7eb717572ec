//! Texts, photos and keyboards for every screen the bot shows.
//!
//! Views are pure: they take data and return a [`Reply`]. Dynamic values are
//! HTML-escaped wherever the reply is sent with the HTML parse mode.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::api::{Product, ProductDetail, UserProduct};
use crate::bot::callback::CallbackAction;
use crate::channels::{ImageRef, InlineArticle, InlineButton, InlineKeyboard, TextFormat};
use crate::error::{ApiError, RecommendationError};
use crate::formatting::format_for_telegram;
use crate::profile::{ProfileUpdate, StoredProfile};
use crate::questionnaire::{Question, prompt_for};
use crate::recommendations::{FailureClass, RecommendationKind, classify};

/// Minimum inline query length, in characters.
pub const INLINE_MIN_QUERY_CHARS: usize = 3;
/// Products requested from the search endpoint per inline query.
pub const INLINE_SEARCH_LIMIT: u32 = 20;
/// Articles returned per inline query.
pub const INLINE_MAX_RESULTS: usize = 10;
pub const INLINE_CACHE_SECS: u32 = 300;

/// Products listed in the collection and removal views.
const LIST_LIMIT: usize = 10;
/// Ingredients listed on a product card.
const INGREDIENT_LIMIT: usize = 10;

const WELCOME_IMAGE: &str = "01.png";
const COLLECTION_IMAGE: &str = "02.png";
const RECOMMENDATIONS_IMAGE: &str = "04.png";
const EMPTY_COLLECTION_IMAGE: &str = "08.png";
const QUESTIONNAIRE_IMAGE: &str = "12.png";

const WELCOME: &str = "✨ Я — твой умный бьюти-бот, созданный, чтобы наконец навести порядок в косметичке. Этот бот - часть проекта Cos AI, созданного для того, чтобы помочь тебе собрать персонализированный уход за кожей.
Хочешь попробовать? Давай начнем с небольшой анкеты 💬👇";

const HELP: &str = "Доступные команды:
/start - Начать работу с ботом
/help - Показать эту справку
/form - Заполнить форму подбора ухода
/myproducts - Показать мои продукты

🔍 Для поиска продуктов используйте inline режим:
@cosmetics_lab_ai_bot add [название продукта]";

const NO_QUESTIONNAIRE: &str = "📋 У вас пока нет заполненной анкеты.

Заполните анкету, чтобы получить персонализированные рекомендации по уходу за кожей!";

const RECOMMENDATIONS_MENU: &str = "🤖 <b>Рекомендации</b>

Мы можем предложить тебе советы по уходу на основе анкеты, твоих текущих продуктов, или подсказать, чего не хватает в твоем уходе.

<i>Данные рекомендации только для ознакомления и не заменяют консультацию дерматолога и не ставят точные диагнозы.</i>";

const EMPTY_COLLECTION: &str = "🧴 <b>Ваша коллекция пуста</b>

У вас пока нет добавленных продуктов в коллекцию.

<b>Для поиска продуктов введите:</b>
@cosmetics_lab_ai_bot add [продукт который хотите найти]

<b>Пример:</b>
@cosmetics_lab_ai_bot add Repair Sunscreen SPF 50";

const WAIT_NOTICE: &str = "⏳ Это может занять до 2 минут. Пожалуйста, подождите...";

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        format: TextFormat,
        keyboard: Option<InlineKeyboard>,
    },
    /// Photo with an HTML caption.
    Photo {
        image: ImageRef,
        caption: String,
        keyboard: Option<InlineKeyboard>,
    },
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            format: TextFormat::Html,
            keyboard: None,
        }
    }

    fn photo(image: ImageRef, caption: impl Into<String>) -> Self {
        Self::Photo {
            image,
            caption: caption.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, markup: InlineKeyboard) -> Self {
        match &mut self {
            Self::Text { keyboard, .. } | Self::Photo { keyboard, .. } => *keyboard = Some(markup),
        }
        self
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboard> {
        match self {
            Self::Text { keyboard, .. } | Self::Photo { keyboard, .. } => keyboard.as_ref(),
        }
    }

    /// Message text or photo caption.
    pub fn body(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Photo { caption, .. } => caption,
        }
    }
}

fn local_image(images_dir: &Path, name: &str) -> ImageRef {
    ImageRef::File(images_dir.join(name))
}

fn action_button(text: &str, action: CallbackAction) -> InlineButton {
    InlineButton::new(text, action.data())
}

fn keyboard(buttons: impl IntoIterator<Item = InlineButton>) -> InlineKeyboard {
    buttons
        .into_iter()
        .fold(InlineKeyboard::new(), |kb, button| kb.row(vec![button]))
}

fn back_to_start() -> InlineButton {
    action_button("⬅️ Назад", CallbackAction::BackToStart)
}

fn back_to_recommendations() -> InlineButton {
    action_button("⬅️ Назад к рекомендациям", CallbackAction::RecommendationsMenu)
}

/// Escape text for the HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shorten to `keep` characters plus `...` when longer than `max` characters.
pub fn truncate_chars(text: &str, max: usize, keep: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// Render an API timestamp as a day. Unrecognized values are shown as sent.
fn added_on(raw: &str) -> String {
    const DAY: &str = "%d.%m.%Y";
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format(DAY).to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.format(DAY).to_string();
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => day.format(DAY).to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn welcome(images_dir: &Path) -> Reply {
    Reply::photo(local_image(images_dir, WELCOME_IMAGE), WELCOME).with_keyboard(keyboard([
        action_button("📋 Анкета", CallbackAction::ShowQuestionnaire),
        action_button("🤖 Рекомендации", CallbackAction::RecommendationsMenu),
        action_button("🧴 Мои продукты", CallbackAction::MyProducts),
    ]))
}

pub fn help() -> Reply {
    Reply::plain(HELP)
}

pub fn unknown_command() -> Reply {
    Reply::plain("Неизвестная команда. Используйте /help для справки.")
}

/// Photo with the question caption. The free-text question has no buttons.
pub fn form_step(question: Question, form_image_url: &str) -> Reply {
    let prompt = prompt_for(question);
    let reply = Reply::photo(ImageRef::Url(form_image_url.to_string()), prompt.caption);
    if !prompt.has_buttons() {
        return reply;
    }

    let markup = prompt.rows.iter().fold(InlineKeyboard::new(), |kb, row| {
        kb.row(
            row.iter()
                .map(|(label, code)| InlineButton::new(*label, *code))
                .collect(),
        )
    });
    reply.with_keyboard(markup)
}

/// Summary shown right after the last answer.
pub fn form_summary(profile: &ProfileUpdate, images_dir: &Path) -> Reply {
    let mut text = String::from("✅ Форма заполнена! Вот ваши данные:\n\n");
    for question in Question::ALL {
        let _ = writeln!(
            text,
            "{} {}: {}",
            question.emoji(),
            question.label(),
            escape_html(profile.field(question))
        );
    }
    text.push_str("\nТеперь я могу подобрать для вас подходящие средства!");

    Reply::photo(local_image(images_dir, QUESTIONNAIRE_IMAGE), text).with_keyboard(keyboard([
        action_button("🗑️ Удалить анкету", CallbackAction::DeleteQuestionnaire),
        action_button("🔄 Пройти заново", CallbackAction::Retake),
        back_to_start(),
    ]))
}

/// The stored questionnaire, filled fields only.
pub fn stored_questionnaire(profile: &StoredProfile, images_dir: &Path) -> Reply {
    let mut text = String::from("📋 <b>Ваша анкета:</b>\n\n");
    for (question, value) in profile.filled_fields() {
        let _ = writeln!(
            text,
            "{} <b>{}:</b> {}",
            question.emoji(),
            question.label(),
            escape_html(value)
        );
    }

    Reply::photo(local_image(images_dir, QUESTIONNAIRE_IMAGE), text).with_keyboard(keyboard([
        action_button("🗑️ Удалить анкету", CallbackAction::DeleteQuestionnaire),
        action_button("🔄 Пройти анкету заново", CallbackAction::Retake),
        back_to_start(),
    ]))
}

pub fn no_questionnaire() -> Reply {
    Reply::plain(NO_QUESTIONNAIRE).with_keyboard(keyboard([
        action_button("📝 Пройти анкету", CallbackAction::StartForm),
        back_to_start(),
    ]))
}

pub fn questionnaire_deleted() -> Reply {
    Reply::plain("✅ Ваша анкета удалена!").with_keyboard(keyboard([back_to_start()]))
}

pub fn questionnaire_delete_failed(err: &ApiError) -> Reply {
    Reply::plain(format!("Ошибка удаления анкеты: {err}"))
}

pub fn incidecoder_notices() -> [Reply; 2] {
    [
        Reply::plain("Парсинг продукта с Incidecoder..."),
        Reply::plain(
            "Функция парсинга продуктов с Incidecoder будет реализована в следующих версиях.",
        ),
    ]
}

pub fn recommendations_menu(images_dir: &Path) -> Reply {
    Reply::photo(
        local_image(images_dir, RECOMMENDATIONS_IMAGE),
        RECOMMENDATIONS_MENU,
    )
    .with_keyboard(keyboard([
        action_button(
            "📊 Рекомендации на основе анкеты",
            CallbackAction::Recommend(RecommendationKind::Questionnaire),
        ),
        action_button(
            "🧴 Рекомендации с учётом моих продуктов",
            CallbackAction::Recommend(RecommendationKind::WithProducts),
        ),
        action_button(
            "🧩 Общие рекомендации",
            CallbackAction::Recommend(RecommendationKind::General),
        ),
        back_to_start(),
    ]))
}

pub fn recommendation_loading(kind: RecommendationKind) -> Reply {
    let what = match kind {
        RecommendationKind::Questionnaire => "рекомендации на основе вашей анкеты",
        RecommendationKind::WithProducts => "рекомендации с учётом ваших продуктов",
        RecommendationKind::General => "общие рекомендации",
    };
    Reply::plain(format!("🤖 Генерирую {what}...\n\n{WAIT_NOTICE}"))
}

fn recommendation_title(kind: RecommendationKind) -> (&'static str, &'static str) {
    match kind {
        RecommendationKind::Questionnaire => ("📊", "Рекомендации на основе анкеты"),
        RecommendationKind::WithProducts => ("🧴", "Рекомендации с учётом моих продуктов"),
        RecommendationKind::General => ("🧩", "Общие рекомендации"),
    }
}

/// Formatted reply and its plain-text fallback.
pub fn recommendation_result(kind: RecommendationKind, raw: &str) -> (Reply, Reply) {
    let (icon, title) = recommendation_title(kind);
    let back = keyboard([back_to_recommendations()]);

    let html = Reply::html(format!(
        "{icon} <b>{title}</b>\n\n{}",
        format_for_telegram(raw)
    ))
    .with_keyboard(back.clone());
    let plain = Reply::plain(format!("{icon} {title}\n\n{raw}")).with_keyboard(back);
    (html, plain)
}

/// Failure message. Only timeouts offer a retry.
pub fn recommendation_error(kind: RecommendationKind, err: &RecommendationError) -> Reply {
    match classify(err) {
        FailureClass::Timeout => Reply::plain(
            "⏰ Время ожидания истекло. Нейросеть работает медленно. Попробуйте еще раз через несколько минут.",
        )
        .with_keyboard(keyboard([
            action_button("🔄 Попробовать снова", CallbackAction::Recommend(kind)),
            back_to_recommendations(),
        ])),
        FailureClass::Auth => {
            Reply::plain("🔑 Ошибка аутентификации. Проверьте настройки API.")
                .with_keyboard(keyboard([back_to_recommendations()]))
        }
        FailureClass::Other => {
            Reply::plain(format!("❌ Ошибка получения рекомендаций: {err}"))
                .with_keyboard(keyboard([back_to_recommendations()]))
        }
    }
}

pub fn products_loading() -> Reply {
    Reply::plain("🔄 Загружаю ваши продукты...")
}

pub fn products_error(err: &ApiError) -> Reply {
    Reply::plain(format!("❌ Ошибка получения ваших продуктов: {err}"))
}

fn more_products(text: &mut String, total: usize) {
    if total > LIST_LIMIT {
        let _ = writeln!(text, "... и еще {} продуктов", total - LIST_LIMIT);
    }
}

fn product_name(brand: &str, title: &str) -> String {
    escape_html(&format!("{brand} {title}"))
}

/// The user's collection. `with_back` adds the main-menu button, shown when
/// the view is opened from a menu rather than a command.
pub fn collection(products: &[UserProduct], images_dir: &Path, with_back: bool) -> Reply {
    let back = with_back.then(back_to_start);

    if products.is_empty() {
        let reply = Reply::photo(
            local_image(images_dir, EMPTY_COLLECTION_IMAGE),
            EMPTY_COLLECTION,
        );
        return match back {
            Some(button) => reply.with_keyboard(keyboard([button])),
            None => reply,
        };
    }

    let mut text = format!(
        "🧴 <b>Ваша коллекция ({} продуктов)</b>\n\n💡 <b>Для добавления новых продуктов введите:</b>\n@cosmetics_lab_ai_bot add [название продукта]\n\n",
        products.len()
    );
    for product in products.iter().take(LIST_LIMIT) {
        let _ = writeln!(
            text,
            "🔸 <b>{}</b>",
            product_name(&product.brand, &product.title)
        );
        if !product.details.is_empty() {
            let _ = writeln!(
                text,
                "   📝 {}",
                escape_html(&truncate_chars(&product.details, 100, 97))
            );
        }
        if !product.added_at.is_empty() {
            let _ = writeln!(
                text,
                "   📅 Добавлено: {}",
                escape_html(&added_on(&product.added_at))
            );
        }
        text.push('\n');
    }
    more_products(&mut text, products.len());

    let buttons = std::iter::once(action_button(
        "🗑️ Удалить продукты",
        CallbackAction::DeleteProductsMenu,
    ))
    .chain(back);
    Reply::photo(local_image(images_dir, COLLECTION_IMAGE), text).with_keyboard(keyboard(buttons))
}

/// One removal button per listed product.
pub fn removal_menu(products: &[UserProduct]) -> Reply {
    if products.is_empty() {
        return Reply::plain("🧴 У вас нет продуктов для удаления.");
    }

    let mut text = format!(
        "🗑️ <b>Выберите продукты для удаления ({} продуктов):</b>\n\n",
        products.len()
    );
    for product in products.iter().take(LIST_LIMIT) {
        let _ = writeln!(
            text,
            "🔸 <b>{}</b>",
            product_name(&product.brand, &product.title)
        );
    }
    more_products(&mut text, products.len());

    let buttons = products
        .iter()
        .take(LIST_LIMIT)
        .map(|p| {
            action_button(
                &format!("🗑️ {} {}", p.brand, p.title),
                CallbackAction::RemoveProduct(p.product_id),
            )
        })
        .chain(std::iter::once(action_button(
            "⬅️ Назад к продуктам",
            CallbackAction::MyProducts,
        )));
    Reply::html(text).with_keyboard(keyboard(buttons))
}

pub fn product_card(product: &ProductDetail) -> Reply {
    let mut text = format!(
        "🧴 <b>{}</b>\n\n",
        product_name(&product.brand, &product.title)
    );
    if !product.details.is_empty() {
        let _ = write!(
            text,
            "📝 <b>Описание:</b>\n{}\n\n",
            escape_html(&product.details)
        );
    }
    if !product.ingredients.is_empty() {
        text.push_str("🧪 <b>Ингредиенты:</b>\n");
        for ingredient in product.ingredients.iter().take(INGREDIENT_LIMIT) {
            let _ = writeln!(text, "• {}", escape_html(&ingredient.name));
        }
        if product.ingredients.len() > INGREDIENT_LIMIT {
            let _ = write!(
                text,
                "... и еще {} ингредиентов",
                product.ingredients.len() - INGREDIENT_LIMIT
            );
        }
    }

    Reply::html(text).with_keyboard(keyboard([action_button(
        "➕ Добавить в коллекцию",
        CallbackAction::AddProduct(product.id),
    )]))
}

pub fn product_error(err: &ApiError) -> Reply {
    Reply::plain(format!("Ошибка получения продукта: {err}"))
}

pub fn bad_product_id() -> Reply {
    Reply::plain("❌ Ошибка: неверный ID продукта")
}

pub fn product_added(result: &Result<(), ApiError>) -> Reply {
    match result {
        Ok(()) => Reply::plain("✅ Продукт успешно добавлен в вашу коллекцию!"),
        Err(e) => Reply::plain(format!("Ошибка добавления продукта: {e}")),
    }
}

pub fn product_removed(result: &Result<(), ApiError>) -> Reply {
    match result {
        Ok(()) => Reply::plain("✅ Продукт успешно удален из вашей коллекции!"),
        Err(e) => Reply::plain(format!("❌ Ошибка удаления продукта: {e}")),
    }
}

fn notice_article(id: &str, title: &str, text: &str, description: String) -> InlineArticle {
    InlineArticle {
        id: id.to_string(),
        title: title.to_string(),
        message_text: text.to_string(),
        description,
        thumbnail_url: None,
        keyboard: None,
    }
}

pub fn inline_too_short() -> InlineArticle {
    notice_article(
        "too_short",
        "⚠️ Запрос слишком короткий",
        "Введите минимум 3 символа для поиска продуктов.",
        "Минимум 3 символа для поиска".to_string(),
    )
}

pub fn inline_error() -> InlineArticle {
    notice_article(
        "error",
        "❌ Ошибка поиска",
        "Произошла ошибка при поиске продуктов. Попробуйте позже.",
        "Ошибка соединения с сервером".to_string(),
    )
}

pub fn inline_not_found(query: &str) -> InlineArticle {
    notice_article(
        "not_found",
        "❌ Продукт не найден",
        "По вашему запросу ничего не найдено. Попробуйте другой поисковый запрос.",
        format!("По запросу '{query}' ничего не найдено"),
    )
}

/// Search hits as articles, each with an "add to collection" button.
pub fn inline_results(products: &[Product]) -> Vec<InlineArticle> {
    products
        .iter()
        .take(INLINE_MAX_RESULTS)
        .map(|product| {
            let title = format!("{} {}", product.brand, product.title);
            let description = truncate_chars(&product.details, 200, 197);
            // The posted message cannot be empty.
            let message_text = if description.is_empty() {
                title.clone()
            } else {
                description.clone()
            };
            InlineArticle {
                id: CallbackAction::ShowProduct(product.id).data(),
                title,
                message_text,
                description,
                thumbnail_url: Some(product.image.clone()).filter(|url| !url.is_empty()),
                keyboard: Some(keyboard([action_button(
                    "➕ Добавить в коллекцию",
                    CallbackAction::AddProduct(product.id),
                )])),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::IngredientRef;
    use crate::error::LlmError;

    fn images() -> PathBuf {
        PathBuf::from("images")
    }

    fn user_product(id: i64, details: &str) -> UserProduct {
        UserProduct {
            product_id: id,
            brand: "CeraVe".to_string(),
            title: format!("Product {id}"),
            details: details.to_string(),
            added_at: "2024-05-01".to_string(),
            ..UserProduct::default()
        }
    }

    fn buttons(reply: &Reply) -> Vec<String> {
        reply
            .keyboard()
            .map(|kb| kb.callback_data().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("short", 100, 97), "short");
        let long = "я".repeat(150);
        let cut = truncate_chars(&long, 100, 97);
        assert_eq!(cut.chars().count(), 100);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn added_dates_render_as_days() {
        assert_eq!(added_on("2024-05-01T10:20:30Z"), "01.05.2024");
        assert_eq!(added_on("2024-05-01T10:20:30.123456"), "01.05.2024");
        assert_eq!(added_on("2024-05-01"), "01.05.2024");
        assert_eq!(added_on("вчера"), "вчера");
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("A&B <3>"), "A&amp;B &lt;3&gt;");
    }

    #[test]
    fn welcome_has_main_menu() {
        let reply = welcome(&images());
        assert!(matches!(&reply, Reply::Photo { image: ImageRef::File(p), .. } if p.ends_with("01.png")));
        assert_eq!(
            buttons(&reply),
            vec!["start_form", "recommendations", "my_products"]
        );
    }

    #[test]
    fn free_text_step_has_no_keyboard() {
        let reply = form_step(Question::Concerns, "https://example.com/form.jpg");
        assert!(reply.keyboard().is_none());
        assert!(matches!(reply, Reply::Photo { image: ImageRef::Url(_), .. }));

        let reply = form_step(Question::SkinType, "https://example.com/form.jpg");
        assert!(buttons(&reply).contains(&"skin_dry".to_string()));
    }

    #[test]
    fn summary_lists_all_eleven_answers() {
        let profile = ProfileUpdate {
            skin_type: "Сухая".to_string(),
            concern: "acne & <redness>".to_string(),
            ..ProfileUpdate::default()
        };
        let reply = form_summary(&profile, &images());
        let body = reply.body();
        assert!(body.starts_with("✅ Форма заполнена!"));
        assert!(body.contains("👤 Тип кожи: Сухая"));
        assert!(body.contains("💭 Проблемы: acne &amp; &lt;redness&gt;"));
        assert_eq!(body.lines().filter(|l| l.contains(": ")).count(), 11);
        assert_eq!(
            buttons(&reply),
            vec!["delete_anketa", "retake_anketa", "back_to_start"]
        );
    }

    #[test]
    fn stored_questionnaire_skips_empty_fields() {
        let profile = StoredProfile {
            skin_type: "Жирная".to_string(),
            allergy: "Нет аллергий".to_string(),
            ..StoredProfile::default()
        };
        let body = stored_questionnaire(&profile, &images()).body().to_string();
        assert!(body.contains("👤 <b>Тип кожи:</b> Жирная"));
        assert!(body.contains("⚠️ <b>Аллергии:</b> Нет аллергий"));
        assert!(!body.contains("Возраст"));
    }

    #[test]
    fn collection_lists_ten_products() {
        let products: Vec<_> = (1..=12).map(|i| user_product(i, &"x".repeat(120))).collect();
        let reply = collection(&products, &images(), true);
        let body = reply.body();
        assert!(body.contains("Ваша коллекция (12 продуктов)"));
        assert!(body.contains("Product 10"));
        assert!(!body.contains("Product 11"));
        assert!(body.contains("... и еще 2 продуктов"));
        assert!(body.contains(&format!("📝 {}...", "x".repeat(97))));
        assert!(body.contains("📅 Добавлено: 01.05.2024"));
        assert_eq!(buttons(&reply), vec!["delete_products", "back_to_start"]);

        let from_command = collection(&products, &images(), false);
        assert_eq!(buttons(&from_command), vec!["delete_products"]);
    }

    #[test]
    fn empty_collection() {
        let reply = collection(&[], &images(), true);
        assert!(reply.body().contains("Ваша коллекция пуста"));
        assert_eq!(buttons(&reply), vec!["back_to_start"]);
        assert!(collection(&[], &images(), false).keyboard().is_none());
    }

    #[test]
    fn removal_menu_buttons_use_product_ids() {
        let products = vec![user_product(7, ""), user_product(9, "")];
        let reply = removal_menu(&products);
        assert_eq!(
            buttons(&reply),
            vec!["remove_product_7", "remove_product_9", "my_products"]
        );
        assert_eq!(
            removal_menu(&[]).body(),
            "🧴 У вас нет продуктов для удаления."
        );
    }

    #[test]
    fn product_card_caps_ingredients() {
        let product = ProductDetail {
            id: 5,
            brand: "The Ordinary".to_string(),
            title: "Niacinamide 10%".to_string(),
            ingredients: (0..13)
                .map(|i| IngredientRef {
                    id: i,
                    name: format!("ing{i}"),
                })
                .collect(),
            ..ProductDetail::default()
        };
        let reply = product_card(&product);
        let body = reply.body();
        assert!(body.starts_with("🧴 <b>The Ordinary Niacinamide 10%</b>"));
        assert!(body.contains("• ing9"));
        assert!(!body.contains("• ing10"));
        assert!(body.ends_with("... и еще 3 ингредиентов"));
        assert_eq!(buttons(&reply), vec!["add_product_5"]);
    }

    #[test]
    fn recommendation_errors_by_class() {
        let timeout = RecommendationError::Generation(LlmError::Timeout {
            provider: "openrouter".to_string(),
            timeout: std::time::Duration::from_secs(120),
        });
        let reply = recommendation_error(RecommendationKind::General, &timeout);
        assert!(reply.body().starts_with("⏰"));
        assert_eq!(
            buttons(&reply),
            vec!["recommendations_general", "recommendations"]
        );

        let missing = recommendation_error(
            RecommendationKind::Questionnaire,
            &RecommendationError::ProfileMissing,
        );
        assert!(missing.body().starts_with("❌ Ошибка получения рекомендаций:"));
        assert_eq!(buttons(&missing), vec!["recommendations"]);
    }

    #[test]
    fn recommendation_result_has_html_and_plain_forms() {
        let (html, plain) = recommendation_result(RecommendationKind::Questionnaire, "**Утро**");
        assert!(html.body().starts_with("📊 <b>Рекомендации на основе анкеты</b>\n\n"));
        assert!(html.body().contains("<b>Утро"));
        assert_eq!(plain.body(), "📊 Рекомендации на основе анкеты\n\n**Утро**");
        assert!(matches!(plain, Reply::Text { format: TextFormat::Plain, .. }));
    }

    #[test]
    fn inline_results_are_capped_and_carry_add_buttons() {
        let products: Vec<_> = (1..=15)
            .map(|i| Product {
                id: i,
                brand: "Brand".to_string(),
                title: format!("T{i}"),
                details: if i == 1 { "d".repeat(250) } else { String::new() },
                image: String::new(),
            })
            .collect();
        let articles = inline_results(&products);
        assert_eq!(articles.len(), INLINE_MAX_RESULTS);
        assert_eq!(articles[0].id, "product_1");
        assert_eq!(articles[0].description.chars().count(), 200);
        assert_eq!(articles[1].message_text, "Brand T2");
        assert_eq!(articles[1].thumbnail_url, None);
        assert_eq!(
            articles[0]
                .keyboard
                .as_ref()
                .map(|kb| kb.callback_data().collect::<Vec<_>>()),
            Some(vec!["add_product_1"])
        );
    }

    #[test]
    fn inline_notices() {
        assert_eq!(inline_too_short().id, "too_short");
        assert_eq!(inline_error().id, "error");
        let not_found = inline_not_found("spf");
        assert_eq!(not_found.id, "not_found");
        assert_eq!(not_found.description, "По запросу 'spf' ничего не найдено");
    }
}
