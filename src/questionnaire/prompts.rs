//! Captions and answer buttons for each question.

use crate::questionnaire::question::Question;

/// One row of `(label, option code)` buttons.
pub type OptionRow = &'static [(&'static str, &'static str)];

/// What to render while a question is pending.
#[derive(Debug, Clone, Copy)]
pub struct StepPrompt {
    pub caption: &'static str,
    /// Empty for the free-text question.
    pub rows: &'static [OptionRow],
}

impl StepPrompt {
    pub fn has_buttons(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Every option code offered by this prompt.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> {
        self.rows.iter().flat_map(|row| row.iter().map(|(_, code)| *code))
    }
}

pub fn prompt_for(question: Question) -> StepPrompt {
    match question {
        Question::SkinType => StepPrompt {
            caption: "Какой ваш тип кожи?\n\nТип кожи влияет на выбор текстур и активных ингредиентов — от этого зависит, как хорошо средство будет работать",
            rows: &[
                &[("Сухая", "skin_dry"), ("Жирная", "skin_oily")],
                &[("Нормальная", "skin_normal"), ("Чувствительная", "skin_sensitive")],
                &[("Комбинированная", "skin_combined")],
                &[("Я не знаю какой у меня тип", "skin_unknown")],
            ],
        },
        Question::Age => StepPrompt {
            caption: "Какой ваш возраст?\n\nВ 20, 30 и 50 лет коже нужны разные вещи. Уточним возраст, чтобы подобрать то, что подходит именно вам",
            rows: &[
                &[("<18", "age_18_minus"), ("18–24", "age_18_24")],
                &[("25–34", "age_25_34"), ("35–44", "age_35_44")],
                &[("45+", "age_45_plus"), ("Не учитывать", "age_ignore")],
            ],
        },
        Question::Gender => StepPrompt {
            caption: "Укажите ваш пол\n\nМужская и женская кожа отличаются по структуре и гормональному фону — это помогает нам точнее подобрать уход",
            rows: &[
                &[("Мужчина", "gender_male"), ("Женщина", "gender_female")],
                &[("Другое", "gender_other"), ("Не учитывать", "gender_ignore")],
            ],
        },
        Question::Pregnancy => StepPrompt {
            caption: "Находитесь ли вы сейчас в периоде беременности или кормления?\n\nНекоторые ингредиенты не рекомендуются в этот период. Мы подберём безопасные альтернативы.",
            rows: &[
                &[("Беременность", "pregnancy"), ("Лактация", "lactation")],
                &[
                    ("И то, и другое", "pregnancy_and_lactation"),
                    ("Ничего из перечисленного", "none_of_above"),
                ],
                &[("Не учитывать", "pregnancy_ignore")],
            ],
        },
        Question::Concerns => StepPrompt {
            caption: "Что беспокоит вас больше всего?\n\nЧто вы ждёте от ухода: убрать проблему, предотвратить, освежить внешний вид? Ответ в свободной форме, например:\n\nХочу исправить повышенную чувствительность у моей кожи, а так же меня беспокоит акне и чёрные точки",
            rows: &[],
        },
        Question::Goal => StepPrompt {
            caption: "Какой результат вы хотите получить?\n\nВаша цель = наша стратегия. Разберёмся, куда стремиться.",
            rows: &[
                &[("Увлажнение и питание", "goal_hydration")],
                &[("Выравнивание тона", "goal_tone")],
                &[("Антивозрастной уход", "goal_antiage")],
                &[("Улучшение текстуры", "goal_texture")],
                &[("Освежить и поддерживать", "goal_refresh")],
                &[("Минимализм, только базовый уход", "goal_minimalism")],
                &[("Другое", "goal_other")],
            ],
        },
        Question::Climate => StepPrompt {
            caption: "Какой у вас климат?\n\nКлимат влияет на потребности кожи в увлажнении и защите",
            rows: &[
                &[("Сухой", "climate_dry"), ("Влажный", "climate_humid")],
                &[("Жаркий", "climate_hot"), ("Холодный", "climate_cold")],
                &[
                    ("Переменный / умеренный", "climate_temperate"),
                    ("Загрязнённый (город, смог, пыль)", "climate_polluted"),
                ],
                &[
                    (
                        "Живу в нескольких климатах (путешествую/переезды)",
                        "climate_multiple",
                    ),
                    ("Не знаю", "climate_unknown"),
                ],
            ],
        },
        Question::Fitzpatrick => StepPrompt {
            caption: "Как бы вы описали свою кожу по реакции на солнце?\n\nЭто поможет подобрать правильную защиту от солнца",
            rows: &[
                &[("I – очень светлая, всегда обгорает", "fitzpatrick_1")],
                &[(
                    "II – светлая, обгорает, но может немного загорать",
                    "fitzpatrick_2",
                )],
                &[("III – светло-смуглая, легко загорает", "fitzpatrick_3")],
                &[("IV – смуглая, редко обгорает", "fitzpatrick_4")],
                &[("V – тёмная, почти не обгорает", "fitzpatrick_5")],
                &[("VI – очень тёмная, никогда не обгорает", "fitzpatrick_6")],
                &[("Не знаю / Не хочу указывать", "fitzpatrick_unknown")],
            ],
        },
        Question::Lifestyle => StepPrompt {
            caption: "Какой у вас ритм жизни?\n\nОбраз жизни влияет на выбор средств и режим ухода",
            rows: &[
                &[
                    ("Частые стрессы", "lifestyle_stress"),
                    ("Недосып / сбитый режим", "lifestyle_sleep"),
                ],
                &[
                    ("Много экранного времени", "lifestyle_screen"),
                    ("Часто потею (спорт, жара и т.д.)", "lifestyle_sweat"),
                ],
                &[
                    ("Работаю за компьютером", "lifestyle_computer"),
                    ("Активно двигаюсь в течение дня", "lifestyle_active"),
                ],
                &[
                    ("Регулярно на улице", "lifestyle_outdoor"),
                    ("Пассивный / домашний образ жизни", "lifestyle_passive"),
                ],
                &[("Другое", "lifestyle_other")],
            ],
        },
        Question::Diet => StepPrompt {
            caption: "Есть ли у вас особенности в питании или убеждения, которые важно учесть?\n\nЭто поможет подобрать подходящие ингредиенты",
            rows: &[
                &[("Веганство", "diet_vegan"), ("Вегетарианство", "diet_vegetarian")],
                &[("Халяль", "diet_halal"), ("Кето / Палео / Низкоуглеводная", "diet_keto")],
                &[
                    ("Безглютеновая", "diet_gluten_free"),
                    ("Я избегаю спирта в составе", "diet_no_alcohol"),
                ],
                &[
                    ("Я избегаю компонентов животного происхождения", "diet_no_animal"),
                    ("Нет особых ограничений", "diet_none"),
                ],
                &[("Другое", "diet_other")],
            ],
        },
        Question::Allergies => StepPrompt {
            caption: "Есть ли у вас аллергии или непереносимость?\n\nВажно знать, чтобы исключить проблемные ингредиенты",
            rows: &[
                &[("Нет аллергий", "allergies_none")],
                &[
                    ("Аллергия на никель", "allergies_nickel"),
                    ("Аллергия на ланолин", "allergies_lanolin"),
                ],
                &[
                    ("Аллергия на отдушки", "allergies_fragrance"),
                    ("Аллергия на консерванты", "allergies_preservatives"),
                ],
                &[("Другое", "allergies_other")],
            ],
        },
    }
}
