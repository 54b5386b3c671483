const MAX_VISIBLE_CHARS: usize = 100;

/// Shortens transcript text for log lines.
pub fn preview_transcript(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total = trimmed.chars().count();
    if total > MAX_VISIBLE_CHARS {
        let visible: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", visible, total)
    } else {
        trimmed.to_string()
    }
}
