/// Normalize text for matching: lowercase, punctuation to spaces, collapsed
/// whitespace. "A Baleia-azul!" becomes "a baleia azul".
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Whole-word search of an already normalized `phrase` inside normalized text.
/// Returns the byte offset of the match in `normalized`.
pub fn find_phrase(normalized: &str, phrase: &str) -> Option<usize> {
    if phrase.is_empty() {
        return None;
    }
    let padded = format!(" {normalized} ");
    padded.find(&format!(" {phrase} "))
}

pub fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    find_phrase(normalized, phrase).is_some()
}
