use std::collections::HashSet;

/// The English stopword list the model's vocabulary was built without.
/// Entries containing apostrophes can never survive character filtering; they
/// are kept so the set matches the reference list exactly.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "having", "do", "does",
    "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because", "as",
    "until", "while", "of", "at", "by", "for", "with", "about", "against", "between",
    "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further",
    "then", "once", "here", "there", "when", "where", "why", "how", "all", "any",
    "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just",
    "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y",
    "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't",
    "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
    "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

pub fn english() -> HashSet<&'static str> {
    ENGLISH_STOPWORDS.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_has_179_unique_entries() {
        assert_eq!(ENGLISH_STOPWORDS.len(), 179);
        assert_eq!(english().len(), 179);
    }

    #[test]
    fn test_logo_phrase_words() {
        let set = english();
        assert!(set.contains("has"));
        assert!(!set.contains("company"));
        assert!(!set.contains("logo"));
        assert!(!set.contains("yes"));
    }

    #[test]
    fn test_all_lowercase() {
        assert!(ENGLISH_STOPWORDS
            .iter()
            .all(|w| w.chars().all(|c| !c.is_ascii_uppercase())));
    }
}
