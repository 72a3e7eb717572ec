//! Markdown-ish model output to Telegram HTML.
//!
//! A fixed sequence of literal substitutions followed by a tag balance pass.
//! Apply once: a second pass may double-wrap labels.

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

const REPLACEMENTS: &[(&str, &str)] = &[
    // Bold before italic so `**` is not read as two italics.
    ("**", "<b>"),
    ("*", "<i>"),
    // Headings
    ("### ", "🔹 <b>"),
    ("#### ", "🔸 <b>"),
    ("## ", "🔹 <b>"),
    ("# ", "🔹 <b>"),
    // Horizontal rules
    ("---", RULE),
    ("--", RULE),
    // Numbered lists
    ("1. ", "1️⃣ "),
    ("2. ", "2️⃣ "),
    ("3. ", "3️⃣ "),
    ("4. ", "4️⃣ "),
    ("5. ", "5️⃣ "),
    ("6. ", "6️⃣ "),
    ("7. ", "7️⃣ "),
    ("8. ", "8️⃣ "),
    ("9. ", "9️⃣ "),
    // Nested bullets
    ("   * ", "   • "),
    ("   - ", "   • "),
    // Labels
    ("Зачем:", "💡 <b>Зачем:</b>"),
    ("Средство:", "🧴 <b>Средство:</b>"),
    ("Тип кожи:", "👤 <b>Тип кожи:</b>"),
    ("Цель:", "🎯 <b>Цель:</b>"),
    // Routine steps
    ("Очищение", "🧼 <b>Очищение</b>"),
    ("Тоник", "💧 <b>Тоник</b>"),
    ("Активный уход", "⚡ <b>Активный уход</b>"),
    ("Увлажнение", "💧 <b>Увлажнение</b>"),
    ("Солнцезащита", "☀️ <b>Солнцезащита</b>"),
    ("Двойное очищение", "🔄 <b>Двойное очищение</b>"),
    // Time of day
    ("Утренний уход", "🌅 <b>Утренний уход</b>"),
    ("Вечерний уход", "🌙 <b>Вечерний уход</b>"),
    // Ingredients
    ("салициловая кислота", "<b>салициловая кислота</b>"),
    ("ниацинамид", "<b>ниацинамид</b>"),
    ("гиалуроновая кислота", "<b>гиалуроновая кислота</b>"),
    ("азулаиновая кислота", "<b>азулаиновая кислота</b>"),
    ("оксид цинка", "<b>оксид цинка</b>"),
    // Collapse doubled tags
    ("<b><b>", "<b>"),
    ("</b></b>", "</b>"),
    ("<i><i>", "<i>"),
    ("</i></i>", "</i>"),
];

/// Convert generated text to Telegram HTML with balanced `<b>` and `<i>` tags.
pub fn format_for_telegram(text: &str) -> String {
    let formatted = REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to));
    balance_tags(&formatted)
}

/// Close every open `<b>` and `<i>`, and open every stray closer.
///
/// Tags are matched in reading order, so a closer before any opener counts
/// as stray even when the totals agree. Missing closers are appended; stray
/// closers get an opener prepended.
pub fn balance_tags(text: &str) -> String {
    let mut prefix = String::new();
    let mut suffix = String::new();

    for (open, close) in [("<b>", "</b>"), ("<i>", "</i>")] {
        let (stray, unclosed) = unmatched(text, open, close);
        prefix.push_str(&open.repeat(stray));
        suffix.push_str(&close.repeat(unclosed));
    }

    format!("{prefix}{text}{suffix}")
}

/// Count closers without an earlier opener and openers left unclosed.
fn unmatched(text: &str, open: &str, close: &str) -> (usize, usize) {
    let mut tags: Vec<(usize, bool)> = text
        .match_indices(open)
        .map(|(i, _)| (i, true))
        .chain(text.match_indices(close).map(|(i, _)| (i, false)))
        .collect();
    tags.sort_unstable();

    let (mut stray, mut depth) = (0, 0usize);
    for (_, is_open) in tags {
        if is_open {
            depth += 1;
        } else if depth == 0 {
            stray += 1;
        } else {
            depth -= 1;
        }
    }
    (stray, depth)
}
