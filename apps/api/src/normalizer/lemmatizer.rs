//! Noun lemmatizer following WordNet's morphological rules.
//!
//! With a noun lexicon loaded, lookups behave like WordNet's `morphy`: the
//! exception table is consulted first, then detachment rules are applied
//! (repeatedly, if the first pass finds nothing) and only candidates present in
//! the lexicon are accepted. The shortest accepted candidate wins.
//!
//! Without a lexicon the same rule families are applied heuristically, guarded
//! against the most common false positives (`business`, `status`, `analysis`).

use std::collections::{HashMap, HashSet};

/// Longer tokens are returned as-is; no English noun comes close, and the
/// morphy passes grow with word length.
pub const MAX_WORD_LEN: usize = 64;

/// Noun detachment rules, in WordNet order.
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Lexicon-free rules, most specific suffix first; the first match wins.
const HEURISTIC_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ouses", "ouse"),
    ("auses", "ause"),
    ("uses", "us"),
    ("ies", "y"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("s", ""),
];

/// Suffixes that mark a word as already singular when no lexicon is available.
const SINGULAR_SUFFIXES: &[&str] = &["ss", "us", "is", "as"];

/// Words ending in `s` that the heuristic must leave alone.
const HEURISTIC_INVARIANTS: &[&str] = &[
    "always", "perhaps", "towards", "afterwards", "sometimes", "nowadays",
    "besides", "series", "species", "news", "physics", "mathematics",
    "economics", "analytics", "logistics", "ethics", "politics", "headquarters",
    "means", "plus",
];

/// Lemmas whose plural only adds `s` but which the suffix rules would cut
/// (`movies`, `niches`, `excuses`) or skip (`areas`).
const PLAIN_PLURAL_LEMMAS: &[&str] = &[
    // -ie
    "movie", "cookie", "rookie", "calorie", "selfie", "smoothie", "zombie",
    "hippie", "genie", "prairie", "goalie", "newbie", "freebie", "foodie",
    "techie", "brownie", "sortie", "auntie", "groupie", "junkie", "magpie",
    "necktie", "tie", "pie", "lie", "die",
    // -che
    "niche", "cache", "headache", "cliche", "quiche", "creche", "moustache",
    "mustache", "avalanche", "panache", "attache", "psyche", "microfiche",
    "tranche", "pastiche", "ache", "earache", "toothache", "backache",
    // -use after a consonant
    "abuse", "excuse", "fuse", "muse", "refuse", "ruse", "accuse", "recluse",
    "misuse",
    // -a
    "area", "idea", "visa", "quota", "agenda", "formula", "persona", "arena",
    "sofa", "drama", "schema", "replica", "era", "vista", "delta", "pizza",
    "dilemma", "antenna", "stanza", "sauna", "camera", "banana", "villa",
    "diploma", "saga", "panorama", "gala", "plaza", "mantra", "opera",
];

/// Irregular noun plurals (inflected form, lemma).
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("businessmen", "businessman"),
    ("businesswomen", "businesswoman"),
    ("salesmen", "salesman"),
    ("saleswomen", "saleswoman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    ("diagnoses", "diagnosis"),
    ("indices", "index"),
    ("appendices", "appendix"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("alumni", "alumnus"),
    ("curricula", "curriculum"),
    ("memoranda", "memorandum"),
    ("syllabi", "syllabus"),
    ("stimuli", "stimulus"),
    ("radii", "radius"),
    ("wives", "wife"),
    ("lives", "life"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
];

#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<String, Vec<String>>,
    lexicon: Option<HashSet<String>>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        let mut exceptions: HashMap<String, Vec<String>> = HashMap::new();
        for (form, lemma) in NOUN_EXCEPTIONS {
            exceptions
                .entry(form.to_string())
                .or_default()
                .push(lemma.to_string());
        }
        Self {
            exceptions,
            lexicon: None,
        }
    }
}

impl Lemmatizer {
    /// Enables lexicon-validated lookups.
    pub fn with_lexicon(mut self, lexicon: HashSet<String>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Merges extra exceptions over the built-in table. An inflected form that
    /// already exists has its lemmas replaced.
    pub fn with_exceptions(mut self, extra: HashMap<String, Vec<String>>) -> Self {
        self.exceptions.extend(extra);
        self
    }

    pub fn has_lexicon(&self) -> bool {
        self.lexicon.is_some()
    }

    pub fn lexicon_len(&self) -> usize {
        self.lexicon.as_ref().map_or(0, HashSet::len)
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// Reduces a lowercase word to its noun lemma. Unknown words, and words
    /// longer than [`MAX_WORD_LEN`], come back unchanged.
    pub fn lemmatize(&self, word: &str) -> String {
        if word.len() > MAX_WORD_LEN {
            return word.to_string();
        }
        match &self.lexicon {
            Some(lexicon) => self
                .morphy(word, lexicon)
                .into_iter()
                .min_by_key(String::len)
                .unwrap_or_else(|| word.to_string()),
            None => self.heuristic(word),
        }
    }

    fn morphy(&self, word: &str, lexicon: &HashSet<String>) -> Vec<String> {
        if let Some(lemmas) = self.exceptions.get(word) {
            let candidates = std::iter::once(word.to_string()).chain(lemmas.iter().cloned());
            return filter_known(candidates, lexicon);
        }

        let mut forms = apply_rules(std::slice::from_ref(&word.to_string()));
        let results = filter_known(
            std::iter::once(word.to_string()).chain(forms.iter().cloned()),
            lexicon,
        );
        if !results.is_empty() {
            return results;
        }

        while !forms.is_empty() {
            forms = apply_rules(&forms);
            let results = filter_known(forms.iter().cloned(), lexicon);
            if !results.is_empty() {
                return results;
            }
        }

        Vec::new()
    }

    fn heuristic(&self, word: &str) -> String {
        if let Some(lemma) = self
            .exceptions
            .get(word)
            .and_then(|lemmas| lemmas.iter().min_by_key(|l| l.len()))
        {
            return lemma.clone();
        }

        if let Some(stem) = word.strip_suffix('s') {
            if PLAIN_PLURAL_LEMMAS.contains(&stem) {
                return stem.to_string();
            }
        }

        if word.len() <= 3
            || SINGULAR_SUFFIXES.iter().any(|s| word.ends_with(s))
            || HEURISTIC_INVARIANTS.contains(&word)
        {
            return word.to_string();
        }

        HEURISTIC_RULES
            .iter()
            .find(|(suffix, _)| word.ends_with(suffix))
            .map(|(suffix, replacement)| {
                format!("{}{}", &word[..word.len() - suffix.len()], replacement)
            })
            .unwrap_or_else(|| word.to_string())
    }
}

/// Applies every matching detachment rule to every form.
fn apply_rules(forms: &[String]) -> Vec<String> {
    forms
        .iter()
        .flat_map(|form| {
            NOUN_RULES
                .iter()
                .filter(move |(suffix, _)| form.ends_with(suffix))
                .map(move |(suffix, replacement)| {
                    format!("{}{}", &form[..form.len() - suffix.len()], replacement)
                })
        })
        .collect()
}

/// Keeps candidates present in the lexicon, first occurrence only, in order.
fn filter_known(candidates: impl Iterator<Item = String>, lexicon: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .filter(|c| lexicon.contains(c) && seen.insert(c.clone()))
        .collect()
}

/// Parses a lexicon file: one lemma per line, `#` comments and blank lines ignored.
pub fn parse_lexicon(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

/// Parses an exception file: `inflected lemma [lemma...]` per line.
/// Lines with fewer than two fields are skipped.
pub fn parse_exceptions(contents: &str) -> HashMap<String, Vec<String>> {
    let mut exceptions: HashMap<String, Vec<String>> = HashMap::new();
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace().map(str::to_lowercase);
        let Some(form) = fields.next() else {
            continue;
        };
        let lemmas: Vec<String> = fields.collect();
        if lemmas.is_empty() {
            continue;
        }
        exceptions.entry(form).or_default().extend(lemmas);
    }
    exceptions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_heuristic_regular_plurals() {
        let lem = Lemmatizer::default();
        let cases = [
            ("jobs", "job"),
            ("companies", "company"),
            ("benefits", "benefit"),
            ("boxes", "box"),
            ("branches", "branch"),
            ("classes", "class"),
            ("bonuses", "bonus"),
            ("campuses", "campus"),
            ("buses", "bus"),
            ("statuses", "status"),
            ("houses", "house"),
            ("causes", "cause"),
            ("courses", "course"),
            ("niches", "niche"),
            ("caches", "cache"),
            ("approaches", "approach"),
            ("movies", "movie"),
            ("excuses", "excuse"),
            ("areas", "area"),
            ("ideas", "idea"),
        ];
        for (word, lemma) in cases {
            assert_eq!(lem.lemmatize(word), lemma, "{word}");
        }
    }

    #[test]
    fn test_heuristic_leaves_singular_forms_alone() {
        let lem = Lemmatizer::default();
        for word in [
            "business", "status", "analysis", "gas", "bus", "always", "series", "entry",
            "texas", "dallas", "canvas", "atlas", "overseas", "whereas",
        ] {
            assert_eq!(lem.lemmatize(word), word, "{word} should be unchanged");
        }
    }

    #[test]
    fn test_heuristic_uses_exceptions() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("children"), "child");
        assert_eq!(lem.lemmatize("women"), "woman");
        assert_eq!(lem.lemmatize("criteria"), "criterion");
    }

    #[test]
    fn test_heuristic_does_not_touch_non_plurals() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("running"), "running");
        assert_eq!(lem.lemmatize("remote"), "remote");
    }

    #[test]
    fn test_morphy_accepts_only_known_candidates() {
        let lem = Lemmatizer::default().with_lexicon(lexicon(&["job", "glass", "wife", "class"]));
        assert_eq!(lem.lemmatize("jobs"), "job");
        // "glass" is itself known and "glas" is not: word kept.
        assert_eq!(lem.lemmatize("glass"), "glass");
        // "ses" -> "s" gives "class"; "s" -> "" gives "classe" (unknown).
        assert_eq!(lem.lemmatize("classes"), "class");
    }

    #[test]
    fn test_overlong_tokens_returned_unchanged() {
        let long = "s".repeat(MAX_WORD_LEN + 1);
        let lem = Lemmatizer::default().with_lexicon(lexicon(&["s"]));
        assert_eq!(lem.lemmatize(&long), long);
        assert_eq!(Lemmatizer::default().lemmatize(&long), long);

        let at_limit = format!("{}s", "x".repeat(MAX_WORD_LEN - 1));
        assert_eq!(Lemmatizer::default().lemmatize(&at_limit), "x".repeat(MAX_WORD_LEN - 1));
    }

    #[test]
    fn test_morphy_unknown_word_unchanged() {
        let lem = Lemmatizer::default().with_lexicon(lexicon(&["job"]));
        assert_eq!(lem.lemmatize("zyzzyvas"), "zyzzyvas");
    }

    #[test]
    fn test_morphy_shortest_candidate_wins() {
        // Both the word and its stripped form are nouns: shortest is returned.
        let lem = Lemmatizer::default().with_lexicon(lexicon(&["sales", "sale"]));
        assert_eq!(lem.lemmatize("sales"), "sale");
    }

    #[test]
    fn test_morphy_exception_with_lexicon() {
        let lem = Lemmatizer::default().with_lexicon(lexicon(&["child", "data", "datum"]));
        assert_eq!(lem.lemmatize("children"), "child");
        assert_eq!(lem.lemmatize("data"), "data");
    }

    #[test]
    fn test_morphy_repeats_rules_when_first_pass_fails() {
        // "boxeses" -> first pass {"boxese", "boxes"} unknown -> second pass finds "box".
        let lem = Lemmatizer::default().with_lexicon(lexicon(&["box"]));
        assert_eq!(lem.lemmatize("boxeses"), "box");
    }

    #[test]
    fn test_extra_exceptions_override_builtin() {
        let extra = parse_exceptions("children kid\n# comment\nstaff\n");
        let lem = Lemmatizer::default().with_exceptions(extra);
        assert_eq!(lem.lemmatize("children"), "kid");
    }

    #[test]
    fn test_parse_lexicon_skips_comments_and_blanks() {
        let lex = parse_lexicon("# wordnet nouns\njob\n\n  Company \n");
        assert_eq!(lex.len(), 2);
        assert!(lex.contains("company"));
    }

    #[test]
    fn test_parse_exceptions_collects_multiple_lemmas() {
        let exc = parse_exceptions("bases base basis\n");
        assert_eq!(exc["bases"], vec!["base".to_string(), "basis".to_string()]);
    }
}
