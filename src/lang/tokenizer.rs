//! Tokenizer trait + registry (C2): per-language sentence splitting,
//! normalization, and protected-phrase detection.

mod default;
mod en;
mod ru;
mod uk;

pub use default::DefaultTokenizer;
pub use en::EnglishTokenizer;
pub use ru::RussianTokenizer;
pub use uk::UkrainianTokenizer;

use std::collections::HashMap;
use std::sync::Arc;

/// Split `text` on sentence-ending punctuation (`.`, `!`, `?`) followed by
/// whitespace, re-merging adjacent fragments whose boundary falls inside a
/// protected phrase (so `"Тарас. Шевченко"`-style splits never separate a
/// protected name across two sentences). Shared by every concrete
/// tokenizer; `DefaultTokenizer` skips the re-merge step since it has no
/// protected phrases.
pub(super) fn split_sentences(text: &str, is_protected: impl Fn(&str) -> bool) -> Vec<String> {
    use regex::Regex;
    let re = Regex::new(r"(?:[.!?]+)\s+").expect("valid sentence boundary regex");

    let mut raw: Vec<String> = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        raw.push(text[last..m.end()].trim().to_string());
        last = m.end();
    }
    if last < text.len() {
        raw.push(text[last..].trim().to_string());
    }
    raw.retain(|s| !s.is_empty());

    if raw.len() <= 1 {
        return raw;
    }

    let mut merged: Vec<String> = Vec::new();
    for sentence in raw {
        if let Some(prev) = merged.last_mut() {
            if is_protected(&format!("{} {}", prev, sentence)) && !is_protected(prev) {
                *prev = format!("{} {}", prev, sentence);
                continue;
            }
        }
        merged.push(sentence);
    }
    merged
}

/// Separators used by the sentence-window splitter, from coarsest to
/// finest. Callers try them in order until a split produces chunks
/// under the size limit.
pub fn default_separators() -> &'static [&'static str] {
    &["\n\n", "\n", ". ", "! ", "? ", "; ", ", ", " ", ""]
}

/// Per-language tokenization rules: sentence splitting, text
/// normalization, and a "protect this phrase from being split" check
/// used by the chunker's overlap/confidence logic.
pub trait Tokenizer: Send + Sync {
    fn language_code(&self) -> &str;

    /// Split `text` into sentences.
    fn tokenize_sentences(&self, text: &str) -> Vec<String>;

    /// Normalize `text` (Unicode form, whitespace, language-specific
    /// compound-term repair) before sentence splitting.
    fn normalize_text(&self, text: &str) -> String;

    /// Returns `false` when `text` contains a protected phrase (a proper
    /// noun, a compound term) that must not be split across a chunk
    /// boundary.
    fn should_split(&self, text: &str) -> bool;

    fn separators(&self) -> &'static [&'static str] {
        default_separators()
    }
}

/// Registry of language-specific tokenizers, falling back to
/// `DefaultTokenizer` for any language code with no dedicated entry —
/// mirrors `TokenizerRegistry._tokenizers.get(lang_code, DefaultTokenizer())`,
/// where `DefaultTokenizer` is constructed fresh on a lookup miss rather
/// than pre-registered.
pub struct TokenizerRegistry {
    tokenizers: HashMap<String, Arc<dyn Tokenizer>>,
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenizerRegistry {
    pub fn new() -> Self {
        let mut tokenizers: HashMap<String, Arc<dyn Tokenizer>> = HashMap::new();
        tokenizers.insert(
            crate::lang::LANG_UKRAINIAN.to_string(),
            Arc::new(UkrainianTokenizer::new()) as Arc<dyn Tokenizer>,
        );
        tokenizers.insert(
            crate::lang::LANG_ENGLISH.to_string(),
            Arc::new(EnglishTokenizer::new()) as Arc<dyn Tokenizer>,
        );
        tokenizers.insert(
            crate::lang::LANG_RUSSIAN.to_string(),
            Arc::new(RussianTokenizer::new()) as Arc<dyn Tokenizer>,
        );
        TokenizerRegistry { tokenizers }
    }

    pub fn register(&mut self, lang_code: impl Into<String>, tokenizer: Arc<dyn Tokenizer>) {
        let lang_code = lang_code.into();
        tracing::info!(language = %lang_code, "registered tokenizer");
        self.tokenizers.insert(lang_code, tokenizer);
    }

    /// Look up the tokenizer for `lang_code`, falling back to a freshly
    /// constructed `DefaultTokenizer` on a miss.
    pub fn get(&self, lang_code: &str) -> Arc<dyn Tokenizer> {
        self.tokenizers
            .get(lang_code)
            .cloned()
            .unwrap_or_else(|| Arc::new(DefaultTokenizer::new(lang_code.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_for_unknown_language() {
        let registry = TokenizerRegistry::new();
        let tok = registry.get("fr");
        assert_eq!(tok.language_code(), "fr");
        assert!(tok.should_split("anything"));
    }

    #[test]
    fn known_languages_resolve_to_dedicated_tokenizers() {
        let registry = TokenizerRegistry::new();
        assert_eq!(registry.get("uk").language_code(), "uk");
        assert_eq!(registry.get("en").language_code(), "en");
        assert_eq!(registry.get("ru").language_code(), "ru");
    }
}
