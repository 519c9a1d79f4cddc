//! Text normalization, tokenization and lemmatization shared by every engine.

/// Lowercases, turns punctuation into spaces, collapses whitespace and trims.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits on whitespace and ASCII punctuation, lowercasing every piece.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|piece| !piece.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Reduces a lowercase word to a crude singular form.
///
/// Only handles regular English plurals; irregular forms pass through. Short `-ies`
/// words keep their `e`: "lies" becomes "lie", not "ly".
pub fn lemmatize(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    for suffix in ["xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    let keeps_s = ["ss", "us", "is"].iter().any(|end| word.ends_with(end));
    if word.len() > 3 && word.ends_with('s') && !keeps_s {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Tokenizes, then lemmatizes each token.
pub fn lemmatized_tokens(text: &str) -> Vec<String> {
    tokenize(text).iter().map(|t| lemmatize(t)).collect()
}
