//! Language identification and per-language tokenization (C1/C2).

pub mod detector;
pub mod tokenizer;

pub use detector::{DetectedLanguage, LanguageDetector};
pub use tokenizer::{Tokenizer, TokenizerRegistry};

/// Sentinel language code meaning "detect this", rather than a declared
/// ISO 639-1 code. Codes are plain `&str`/`String` rather than a closed
/// enum since the tokenizer registry and the store both need to
/// round-trip arbitrary codes that have no dedicated tokenizer (they
/// fall back to `DefaultTokenizer`).
pub const LANG_AUTO: &str = "auto";
pub const LANG_UKRAINIAN: &str = "uk";
pub const LANG_ENGLISH: &str = "en";
pub const LANG_RUSSIAN: &str = "ru";
