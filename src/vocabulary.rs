//! Option codes and their human-readable labels.
//!
//! Callback buttons carry short machine codes (`skin_dry`, `age_25_34`, ...).
//! The remote profile stores the labels, so every write goes through
//! [`human_readable`]. Unknown values (free text, or labels read back from the
//! remote) pass through unchanged, which makes the mapping safe to apply twice.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Pregnancy answer auto-filled when the user picks the male gender option.
pub const PREGNANCY_NONE: &str = "none_of_above";

/// Gender code that skips the pregnancy question.
pub const GENDER_MALE: &str = "gender_male";

const LABELS: &[(&str, &str)] = &[
    // Skin type
    ("skin_dry", "Сухая"),
    ("skin_oily", "Жирная"),
    ("skin_normal", "Нормальная"),
    ("skin_sensitive", "Чувствительная"),
    ("skin_combined", "Комбинированная"),
    ("skin_unknown", "Не знаю"),
    // Age
    ("age_18_minus", "До 18 лет"),
    ("age_18_24", "18-24 года"),
    ("age_25_34", "25-34 года"),
    ("age_35_44", "35-44 года"),
    ("age_45_plus", "45+ лет"),
    ("age_ignore", "Не учитывать"),
    // Gender
    ("gender_male", "Мужчина"),
    ("gender_female", "Женщина"),
    ("gender_other", "Другое"),
    ("gender_ignore", "Не учитывать"),
    // Pregnancy / lactation
    ("pregnancy", "Беременность"),
    ("lactation", "Лактация"),
    ("pregnancy_and_lactation", "Беременность и лактация"),
    ("none_of_above", "Ничего из перечисленного"),
    ("pregnancy_ignore", "Не учитывать"),
    // Goal
    ("goal_hydration", "Увлажнение и питание"),
    ("goal_tone", "Выравнивание тона"),
    ("goal_antiage", "Антивозрастной уход"),
    ("goal_texture", "Улучшение текстуры"),
    ("goal_refresh", "Освежить и поддерживать"),
    ("goal_minimalism", "Минимализм, только базовый уход"),
    ("goal_other", "Другое"),
    // Climate
    ("climate_dry", "Сухой"),
    ("climate_humid", "Влажный"),
    ("climate_hot", "Жаркий"),
    ("climate_cold", "Холодный"),
    ("climate_temperate", "Переменный / умеренный"),
    ("climate_polluted", "Загрязнённый (город, смог, пыль)"),
    (
        "climate_multiple",
        "Живу в нескольких климатах (путешествую/переезды)",
    ),
    ("climate_unknown", "Не знаю"),
    // Fitzpatrick photo-type
    ("fitzpatrick_1", "I – очень светлая, всегда обгорает"),
    ("fitzpatrick_2", "II – светлая, обгорает, но может немного загорать"),
    ("fitzpatrick_3", "III – светло-смуглая, легко загорает"),
    ("fitzpatrick_4", "IV – смуглая, редко обгорает"),
    ("fitzpatrick_5", "V – тёмная, почти не обгорает"),
    ("fitzpatrick_6", "VI – очень тёмная, никогда не обгорает"),
    ("fitzpatrick_unknown", "Не знаю / Не хочу указывать"),
    // Lifestyle
    ("lifestyle_stress", "Частые стрессы"),
    ("lifestyle_sleep", "Недосып / сбитый режим"),
    ("lifestyle_screen", "Много экранного времени"),
    ("lifestyle_sweat", "Часто потею (спорт, жара и т.д.)"),
    ("lifestyle_computer", "Работаю за компьютером"),
    ("lifestyle_active", "Активно двигаюсь в течение дня"),
    ("lifestyle_outdoor", "Регулярно на улице"),
    ("lifestyle_passive", "Пассивный / домашний образ жизни"),
    ("lifestyle_other", "Другое"),
    // Diet
    ("diet_vegan", "Веганство"),
    ("diet_vegetarian", "Вегетарианство"),
    ("diet_halal", "Халяль"),
    ("diet_keto", "Кето / Палео / Низкоуглеводная"),
    ("diet_gluten_free", "Безглютеновая"),
    ("diet_no_alcohol", "Я избегаю спирта в составе"),
    ("diet_no_animal", "Я избегаю компонентов животного происхождения"),
    ("diet_none", "Нет особых ограничений"),
    ("diet_other", "Другое"),
    // Allergies
    ("allergies_none", "Нет аллергий"),
    ("allergies_nickel", "Аллергия на никель"),
    ("allergies_lanolin", "Аллергия на ланолин"),
    ("allergies_fragrance", "Аллергия на отдушки"),
    ("allergies_preservatives", "Аллергия на консерванты"),
    ("allergies_other", "Другое"),
];

static LABEL_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| LABELS.iter().copied().collect());

/// Translate an option code to its label; anything unknown is returned as-is.
pub fn human_readable(value: &str) -> &str {
    LABEL_MAP.get(value).copied().unwrap_or(value)
}

/// True when `value` is a known option code.
pub fn is_known_code(value: &str) -> bool {
    LABEL_MAP.contains_key(value)
}
