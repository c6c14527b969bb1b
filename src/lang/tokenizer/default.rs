use super::Tokenizer;
use regex::Regex;

/// Fallback tokenizer for any language with no dedicated rules: plain
/// regex sentence splitting, no normalization beyond whitespace
/// collapse, nothing is ever protected from splitting.
pub struct DefaultTokenizer {
    language_code: String,
    sentence_re: Regex,
}

impl DefaultTokenizer {
    pub fn new(language_code: String) -> Self {
        DefaultTokenizer {
            language_code,
            sentence_re: Regex::new(r"[.!?]+").expect("valid regex"),
        }
    }
}

impl Tokenizer for DefaultTokenizer {
    fn language_code(&self) -> &str {
        &self.language_code
    }

    fn tokenize_sentences(&self, text: &str) -> Vec<String> {
        self.sentence_re
            .split(text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
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
    fn splits_on_sentence_punctuation() {
        let tok = DefaultTokenizer::new("fr".to_string());
        let sentences = tok.tokenize_sentences("Bonjour. Ça va? Oui!");
        assert_eq!(sentences, vec!["Bonjour", "Ça va", "Oui"]);
    }

    #[test]
    fn never_protects_anything() {
        let tok = DefaultTokenizer::new("fr".to_string());
        assert!(tok.should_split("Tour Eiffel"));
    }
}
