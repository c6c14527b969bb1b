//! Language Detector (C1).
//!
//! Content-based detection with a confidence score, plus a
//! filename/metadata heuristic used when a caller supplies a source
//! document name instead of asking for full detection. `whatlang`'s
//! script-based confidence tends to run higher on short inputs than a
//! true confidence would warrant, so fixed confidence bands (0.3
//! fallback, 0.6/0.8 for metadata) are used instead of trusting
//! `whatlang`'s raw `confidence()` value verbatim for anything but the
//! primary code.

use whatlang::{detect, Lang};

/// Result of a language-detection call.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLanguage {
    pub code: String,
    pub confidence: f32,
    pub method: String,
}

#[derive(Debug, Default, Clone)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        LanguageDetector
    }

    /// Detect the language of `text`. Falls back to `en`/0.3/`fallback_error`
    /// when the text is too short or ambiguous for script-based detection to
    /// produce a result, matching the original's `LangDetectException`
    /// handling.
    pub fn detect_language(&self, text: &str) -> DetectedLanguage {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return DetectedLanguage {
                code: "unknown".to_string(),
                confidence: 0.0,
                method: "empty_input".to_string(),
            };
        }

        match detect(trimmed) {
            Some(info) => DetectedLanguage {
                code: whatlang_to_iso(info.lang()),
                confidence: info.confidence() as f32,
                method: "whatlang".to_string(),
            },
            None => DetectedLanguage {
                code: "en".to_string(),
                confidence: 0.3,
                method: "fallback".to_string(),
            },
        }
    }

    /// Filename/metadata based heuristic: look for language markers in a
    /// source document name. Returns `None` when no marker matches,
    /// mirroring the original's `detect_from_metadata` (which only
    /// recognizes `uk`/`en`/`ru`/`zh` markers and otherwise defers to full
    /// detection or a caller-supplied default).
    pub fn detect_from_metadata(&self, source_doc: &str) -> Option<String> {
        let lower = source_doc.to_lowercase();
        if lower.contains("_uk") || lower.contains("ukrainian") || lower.contains(".uk.") {
            Some("uk".to_string())
        } else if lower.contains("_en") || lower.contains("english") || lower.contains(".en.") {
            Some("en".to_string())
        } else if lower.contains("_ru") || lower.contains("russian") || lower.contains(".ru.") {
            Some("ru".to_string())
        } else if lower.contains("_zh") || lower.contains("chinese") || lower.contains(".zh.") {
            Some("zh".to_string())
        } else {
            None
        }
    }
}

/// Map a `whatlang::Lang` to the ISO 639-1 codes the rest of the crate
/// uses (the same subset `src/scraping/rust_scraper/metadata.rs` maps,
/// extended with Ukrainian since it matters for tokenizer selection).
fn whatlang_to_iso(lang: Lang) -> String {
    match lang {
        Lang::Ukr => "uk",
        Lang::Rus => "ru",
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        _ => "en",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_falls_back() {
        let d = LanguageDetector::new();
        let result = d.detect_language("   ");
        assert_eq!(result.code, "unknown");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn detects_english() {
        let d = LanguageDetector::new();
        let result = d.detect_language(
            "The quick brown fox jumps over the lazy dog near the riverbank every morning.",
        );
        assert_eq!(result.code, "en");
    }

    #[test]
    fn metadata_markers() {
        let d = LanguageDetector::new();
        assert_eq!(
            d.detect_from_metadata("report_uk_2024.txt"),
            Some("uk".to_string())
        );
        assert_eq!(d.detect_from_metadata("notes.txt"), None);
    }
}
