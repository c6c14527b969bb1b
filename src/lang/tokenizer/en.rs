use super::{split_sentences, Tokenizer};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// English tokenizer: protects a fixed set of multi-word terms plus any
/// Title-Case two-word phrase from being split mid-phrase.
pub struct EnglishTokenizer {
    protected_terms: HashSet<&'static str>,
}

fn title_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").expect("valid regex"))
}

impl EnglishTokenizer {
    pub fn new() -> Self {
        let protected_terms = [
            "United States",
            "New York",
            "Machine Learning",
            "Artificial Intelligence",
            "Data Science",
            "Natural Language Processing",
            "Deep Learning",
        ]
        .into_iter()
        .collect();
        EnglishTokenizer { protected_terms }
    }

    fn contains_protected_phrase(&self, text: &str) -> bool {
        self.protected_terms.iter().any(|t| text.contains(t)) || title_case_re().is_match(text)
    }
}

impl Default for EnglishTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for EnglishTokenizer {
    fn language_code(&self) -> &str {
        "en"
    }

    fn tokenize_sentences(&self, text: &str) -> Vec<String> {
        split_sentences(text, |s| self.contains_protected_phrase(s))
    }

    fn normalize_text(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn should_split(&self, text: &str) -> bool {
        !self.contains_protected_phrase(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protects_known_terms() {
        let tok = EnglishTokenizer::new();
        assert!(!tok.should_split("Machine Learning is a subfield of AI."));
    }

    #[test]
    fn protects_title_case_names() {
        let tok = EnglishTokenizer::new();
        assert!(!tok.should_split("John Smith wrote this."));
    }

    #[test]
    fn allows_splitting_plain_text() {
        let tok = EnglishTokenizer::new();
        assert!(tok.should_split("the quick brown fox"));
    }
}
