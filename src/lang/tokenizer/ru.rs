use super::{split_sentences, Tokenizer};

/// Russian tokenizer: whitespace normalization only, nothing is ever
/// protected from splitting — unlike the Ukrainian tokenizer it shares
/// an alphabet with, it carries no compound-term or proper-noun
/// protection list.
pub struct RussianTokenizer;

impl RussianTokenizer {
    pub fn new() -> Self {
        RussianTokenizer
    }
}

impl Default for RussianTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for RussianTokenizer {
    fn language_code(&self) -> &str {
        "ru"
    }

    fn tokenize_sentences(&self, text: &str) -> Vec<String> {
        split_sentences(text, |_| false)
    }

    fn normalize_text(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn should_split(&self, _text: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace() {
        let tok = RussianTokenizer::new();
        assert_eq!(tok.normalize_text("привет   мир"), "привет мир");
    }

    #[test]
    fn never_protects_anything() {
        let tok = RussianTokenizer::new();
        assert!(tok.should_split("Москва Россия"));
    }
}
