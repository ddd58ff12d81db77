//! TF-IDF vectorizer restored from a fitted vocabulary and IDF table.
//!
//! Transform semantics follow the usual term-frequency / inverse-document-frequency
//! recipe the model was trained with: lowercase, tokens of two or more word
//! characters, optional n-grams, raw (or sublinear) counts scaled by IDF, then
//! row normalization.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{read_json, ArtifactError, FeatureVector, Vectorizer};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk form of a fitted vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    /// `null` disables normalization; omitted means L2.
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::try_from(read_json::<TfidfArtifact>(path)?)
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Vocabulary indices and their raw term counts in `text`.
    fn term_counts(&self, text: &str) -> HashMap<usize, f64> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&term) {
                    *counts.entry(idx).or_default() += 1.0;
                }
            }
        }
        counts
    }
}

impl TryFrom<TfidfArtifact> for TfidfVectorizer {
    type Error = ArtifactError;

    fn try_from(artifact: TfidfArtifact) -> Result<Self, Self::Error> {
        let TfidfArtifact {
            vocabulary,
            idf,
            ngram_range,
            sublinear_tf,
            norm,
        } = artifact;

        if idf.len() != vocabulary.len() {
            return Err(ArtifactError::Invalid(format!(
                "idf has {} entries but vocabulary has {} terms",
                idf.len(),
                vocabulary.len()
            )));
        }

        let mut seen = HashSet::with_capacity(vocabulary.len());
        for (term, &idx) in &vocabulary {
            if idx >= idf.len() {
                return Err(ArtifactError::Invalid(format!(
                    "term '{term}' has index {idx}, beyond {} features",
                    idf.len()
                )));
            }
            if !seen.insert(idx) {
                return Err(ArtifactError::Invalid(format!(
                    "index {idx} is assigned to more than one term"
                )));
            }
        }

        let (min_n, max_n) = ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::Invalid(format!(
                "ngram_range ({min_n}, {max_n}) must satisfy 1 <= min <= max"
            )));
        }

        Ok(Self {
            vocabulary,
            idf,
            ngram_range,
            sublinear_tf,
            norm,
        })
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn transform(&self, text: &str) -> FeatureVector {
        let mut weights = vec![0.0_f64; self.idf.len()];
        for (idx, count) in self.term_counts(text) {
            let tf = if self.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            weights[idx] = tf * self.idf[idx];
        }

        let scale = match self.norm {
            Some(Norm::L2) => weights.iter().map(|w| w * w).sum::<f64>().sqrt(),
            Some(Norm::L1) => weights.iter().map(|w| w.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 {
            weights.iter_mut().for_each(|w| *w /= scale);
        }

        FeatureVector::new(weights.into_iter().map(|w| w as f32).collect())
    }
}
