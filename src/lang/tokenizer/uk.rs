use super::{split_sentences, Tokenizer};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const COMPOUND_TERMS: &[&str] = &[
    "загально-державний",
    "державно-приватний",
    "науково-технічний",
    "інформаційно-комунікаційний",
    "навчально-методичний",
    "організаційно-правовий",
    "адміністративно-територіальний",
    "соціально-економічний",
    "культурно-історичний",
];

const PROTECTED_NAMES: &[&str] = &[
    "Тарас Шевченко",
    "Іван Франко",
    "Леся Українка",
    "Михайло Грушевський",
    "Володимир Великий",
];

/// Any run of hyphen-like characters — en dash, em dash, and the various
/// Unicode hyphen code points a document may use in place of `-`.
const HYPHEN_VARIANTS: &str = "\u{2d}\u{2010}\u{2011}\u{2012}\u{2013}\u{2014}";

fn title_case_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[А-ЯІЇЄҐ][а-яіїєґ]+\s+[А-ЯІЇЄҐ][а-яіїєґ]+\b").expect("valid regex")
    })
}

/// Ukrainian tokenizer: protects a fixed set of hyphenated compound
/// terms and well-known proper names, plus any Title-Case two-token
/// name, from being split mid-phrase.
pub struct UkrainianTokenizer {
    compound_terms: HashSet<&'static str>,
    protected_names: HashSet<&'static str>,
    compound_patterns: Vec<(Regex, String)>,
}

impl UkrainianTokenizer {
    pub fn new() -> Self {
        let compound_patterns = COMPOUND_TERMS
            .iter()
            .map(|term| {
                let escaped_for_hyphen_class: String = term
                    .chars()
                    .map(|c| {
                        if c == '-' {
                            format!("[{}]", HYPHEN_VARIANTS)
                        } else {
                            regex::escape(&c.to_string())
                        }
                    })
                    .collect();
                let pattern = Regex::new(&format!("(?i){}", escaped_for_hyphen_class))
                    .expect("valid compound-term regex");
                (pattern, term.to_string())
            })
            .collect();

        UkrainianTokenizer {
            compound_terms: COMPOUND_TERMS.iter().copied().collect(),
            protected_names: PROTECTED_NAMES.iter().copied().collect(),
            compound_patterns,
        }
    }

    /// Replace any hyphen-variant spelling of a known compound term with
    /// its canonical ASCII-hyphen form, so downstream matching against
    /// `compound_terms` is reliable regardless of the source document's
    /// dash style.
    fn fix_compound_terms(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (pattern, canonical) in &self.compound_patterns {
            out = pattern.replace_all(&out, canonical.as_str()).into_owned();
        }
        out
    }

    fn contains_protected_phrase(&self, text: &str) -> bool {
        self.protected_names.iter().any(|n| text.contains(n))
            || self.compound_terms.iter().any(|t| text.contains(t))
            || title_case_name_re().is_match(text)
    }
}

impl Default for UkrainianTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for UkrainianTokenizer {
    fn language_code(&self) -> &str {
        "uk"
    }

    fn tokenize_sentences(&self, text: &str) -> Vec<String> {
        split_sentences(text, |s| self.contains_protected_phrase(s))
    }

    fn normalize_text(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        self.fix_compound_terms(&collapsed)
    }

    fn should_split(&self, text: &str) -> bool {
        !self.contains_protected_phrase(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protects_compound_terms() {
        let tok = UkrainianTokenizer::new();
        assert!(!tok.should_split("Це соціально-економічний розвиток."));
    }

    #[test]
    fn protects_known_names() {
        let tok = UkrainianTokenizer::new();
        assert!(!tok.should_split("Тарас Шевченко написав це."));
    }

    #[test]
    fn fixes_dash_variant_compound_terms() {
        let tok = UkrainianTokenizer::new();
        let normalized = tok.normalize_text("соціально\u{2013}економічний розвиток");
        assert!(normalized.contains("соціально-економічний"));
    }

    #[test]
    fn allows_splitting_plain_text() {
        let tok = UkrainianTokenizer::new();
        assert!(tok.should_split("просто звичайний текст"));
    }
}
