//! TF-IDF text vectorizer over unigrams and bigrams.
//!
//! The vocabulary and IDF weights are learned once with [`TfidfVectorizer::fit`]
//! and then frozen; [`TfidfVectorizer::transform`] maps any text into the same
//! feature space, ignoring out-of-vocabulary terms.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use super::stopwords::is_stop_word;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 4000;

// NOTE: expect() is acceptable here, the pattern is a compile-time constant
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid regex: token pattern"));

/// Sparse feature vector: `(index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }

    /// Dot product with a dense row.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(i, w)| dense.get(*i).map(|d| d * w))
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }
}

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// Lower-cases, tokenizes, drops stop-words and appends adjacent bigrams.
pub fn analyze(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

impl TfidfVectorizer {
    /// Learns the vocabulary and IDF weights from `corpus`.
    pub fn fit<S: AsRef<str>>(corpus: &[S], max_features: usize) -> Self {
        let n_docs = corpus.len();
        let mut term_freq: BTreeMap<String, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let terms = analyze(doc.as_ref());
            let mut seen = HashSet::new();
            for term in terms {
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term.clone()).or_default() += 1;
                }
                *term_freq.entry(term).or_default() += 1;
            }
        }

        // Highest corpus frequency first; BTreeMap order makes ties alphabetical.
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        if ranked.len() > max_features {
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.truncate(max_features);
        }
        let mut kept: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort();

        let idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
            })
            .collect();
        let vocabulary = kept.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        Self {
            max_features,
            vocabulary,
            idf,
        }
    }

    /// Maps `text` into the fitted feature space, L2 normalised.
    pub fn transform(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_default() += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }
        FeatureVector { entries }
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf_of(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|i| self.idf[i])
    }
}
