//! Text normalization: turns raw posting text into the token stream the
//! vectorizer vocabulary was fitted on.
//!
//! The step order is fixed: markup and bracketed spans are removed before
//! character filtering, and lowercasing happens before stopword and lemma lookups.

mod entities;
pub mod html;
pub mod lemmatizer;
pub mod stopwords;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use self::lemmatizer::Lemmatizer;

static BRACKETED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("bracket pattern is valid"));

static NON_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s]").expect("letter filter pattern is valid"));

#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<&'static str>,
    lemmatizer: Lemmatizer,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Lemmatizer::default())
    }
}

impl Normalizer {
    pub fn new(lemmatizer: Lemmatizer) -> Self {
        Self {
            stopwords: stopwords::english(),
            lemmatizer,
        }
    }

    pub fn lemmatizer(&self) -> &Lemmatizer {
        &self.lemmatizer
    }

    /// Normalizes arbitrary text. Never fails; empty input gives an empty string.
    pub fn normalize(&self, raw: &str) -> String {
        let visible = html::strip_html(raw);
        let unbracketed = BRACKETED_SPAN.replace_all(&visible, "");
        let letters = NON_LETTER.replace_all(&unbracketed, "").to_ascii_lowercase();

        letters
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| self.lemmatizer.lemmatize(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_clean(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_lowercase() || c == ' ')
            && !text.contains("  ")
            && !text.starts_with(' ')
            && !text.ends_with(' ')
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Normalizer::default().normalize(""), "");
        assert_eq!(Normalizer::default().normalize("   \n\t "), "");
    }

    #[test]
    fn test_full_pipeline() {
        let n = Normalizer::default();
        let out = n.normalize("<p>We are hiring [URL_abc] Developers in 2024!</p>");
        assert_eq!(out, "hiring developer");
    }

    #[test]
    fn test_bracket_removal_is_non_greedy() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("alpha [x] beta [y] gamma"), "alpha beta gamma");
    }

    #[test]
    fn test_nested_brackets_not_balanced() {
        // "[a [b]" is removed as one span; the trailing "c]" survives as "c".
        let n = Normalizer::default();
        assert_eq!(n.normalize("keep [a [b] cat] end"), "keep cat end");
    }

    #[test]
    fn test_brackets_removed_after_html_decoding() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("salary &#91;hidden&#93; offered"), "salary offered");
    }

    #[test]
    fn test_nbsp_separates_tokens() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("remote&nbsp;work"), "remote work");
    }

    #[test]
    fn test_entity_names_never_become_tokens() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("Bogot&oacute; office"), "bogot office");
        assert_eq!(n.normalize("I &hearts; remote work"), "remote work");
        assert_eq!(n.normalize("R&amp D team"), "r team");
        assert_eq!(n.normalize("Save &frac12; now"), "save");
        assert_eq!(n.normalize("&rarr; apply"), "apply");
    }

    #[test]
    fn test_tags_glue_adjacent_words() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("<li>data</li><li>entry</li>"), "dataentry");
    }

    #[test]
    fn test_digits_and_punctuation_dropped_inside_words() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("e-mail c++ k8s"), "email c ks");
    }

    #[test]
    fn test_stopwords_removed_case_insensitively() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("THE Manager AND The Team"), "manager team");
    }

    #[test]
    fn test_output_is_lowercase_letters_and_single_spaces() {
        let n = Normalizer::default();
        let inputs = [
            "<div class=\"x\">Earn $5,000/week!!!</div>\n\n\tNO experience\u{a0}needed",
            "Ünïcödé wörds — and ‘quotes’ [ref] 123",
            "<script>alert(1)</script>Apply NOW: call +1 (555) 010-9999",
            "&lt;b&gt;escaped&lt;/b&gt;",
        ];
        for input in inputs {
            let out = n.normalize(input);
            assert!(is_clean(&out), "not clean: {out:?} (from {input:?})");
        }
    }

    #[test]
    fn test_idempotent_on_fixed_point() {
        let n = Normalizer::default();
        let fixed = "remote data entry earn week experience needed company logo";
        assert_eq!(n.normalize(fixed), fixed);
        assert_eq!(n.normalize(&n.normalize(fixed)), fixed);
    }

    #[test]
    fn test_lemmatization_after_lowercasing() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("JOBS Companies"), "job company");
    }
}
