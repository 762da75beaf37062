//! Weighted term-frequency vectorization over word n-grams.

use std::collections::{HashMap, HashSet};

use crate::error::{RecomendarError, Result};
use crate::primitives::Matrix;

/// Converts documents to TF-IDF weighted vectors over a bounded
/// vocabulary of word n-grams.
///
/// Term weights discount terms common across the corpus:
///
/// ```text
/// weight(t, d) = tf(t, d) × idf(t)
/// idf(t) = ln((1 + N) / (1 + df(t))) + 1
/// ```
///
/// where `N` is the corpus size and `df(t)` the number of documents
/// containing `t`. The smoothed form keeps corpus-wide terms alive,
/// which matters for small catalogs where every item shares its
/// category tokens.
///
/// Documents are expected to be preprocessed already (see
/// [`crate::text::preprocess`]); tokenization is whitespace splitting.
///
/// # Examples
///
/// ```
/// use recomendar::text::TermVectorizer;
///
/// let docs = vec!["gaming laptop".to_string(), "gaming phone".to_string()];
/// let mut vectorizer = TermVectorizer::new().with_ngram_range(1, 2);
/// let matrix = vectorizer.fit_transform(&docs).expect("non-empty corpus");
/// assert_eq!(matrix.n_rows(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TermVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
    max_features: Option<usize>,
    min_df: usize,
    max_df: f32,
    n_docs: usize,
}

impl Default for TermVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TermVectorizer {
    /// Creates a vectorizer with unigrams only, no vocabulary bound and
    /// no document-frequency pruning.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            ngram_range: (1, 1),
            max_features: None,
            min_df: 1,
            max_df: 1.0,
            n_docs: 0,
        }
    }

    /// Sets the n-gram range (both ends inclusive, clamped to ≥ 1).
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n.max(1), max_n.max(min_n).max(1));
        self
    }

    /// Caps the vocabulary at the `max_features` most frequent terms.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Ignores terms appearing in fewer than `min_df` documents.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    /// Ignores terms appearing in more than a `max_df` fraction of
    /// documents (clamped to [0, 1]).
    #[must_use]
    pub fn with_max_df(mut self, max_df: f32) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    /// Learned vocabulary size.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// n-grams of a document, joined with `_` as in the learned keys.
    fn ngrams(&self, doc: &str) -> Vec<String> {
        let tokens: Vec<&str> = doc.split_whitespace().collect();
        let mut terms = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            for window in tokens.windows(n) {
                terms.push(window.join("_"));
            }
        }
        terms
    }

    /// Learns the vocabulary and document frequencies.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty corpus. Pruning that removes every
    /// term leaves an empty vocabulary; callers that need a non-empty
    /// one should relax `min_df`/`max_df` and refit.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(RecomendarError::from("cannot fit on an empty corpus"));
        }

        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut doc_terms: HashSet<String> = HashSet::new();
            for term in self.ngrams(doc) {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                doc_terms.insert(term);
            }
            for term in doc_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_df_count = (self.max_df * n_docs as f32).ceil() as usize;
        let mut kept: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                df >= self.min_df && df <= max_df_count
            })
            .collect();

        // Frequency-descending, term-ascending: deterministic vocabulary.
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max_features) = self.max_features {
            kept.truncate(max_features);
        }

        self.n_docs = n_docs;
        self.idf = kept
            .iter()
            .map(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                ((1.0 + n_docs as f32) / (1.0 + df as f32)).ln() + 1.0
            })
            .collect();
        self.vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        Ok(())
    }

    /// Transforms documents into a dense TF-IDF matrix
    /// (`n_documents` × `vocabulary_size`).
    ///
    /// # Errors
    ///
    /// Returns an error if called before a successful `fit`.
    pub fn transform(&self, documents: &[String]) -> Result<Matrix<f32>> {
        if self.vocabulary.is_empty() && self.n_docs == 0 {
            return Err(RecomendarError::from("vectorizer not fitted"));
        }

        let vocab_size = self.vocabulary.len();
        let mut data = vec![0.0; documents.len() * vocab_size];

        for (doc_idx, doc) in documents.iter().enumerate() {
            for term in self.ngrams(doc) {
                if let Some(&term_idx) = self.vocabulary.get(&term) {
                    data[doc_idx * vocab_size + term_idx] += self.idf[term_idx];
                }
            }
        }

        Matrix::from_vec(documents.len(), vocab_size, data)
            .map_err(|e| RecomendarError::from(e.to_string()))
    }

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty corpus.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Matrix<f32>> {
        self.fit(documents)?;
        self.transform(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let mut v = TermVectorizer::new();
        v.fit(&docs(&["cat dog", "cat bird"])).unwrap();
        assert_eq!(v.vocabulary_size(), 3);
    }

    #[test]
    fn test_fit_empty_corpus_is_error() {
        let mut v = TermVectorizer::new();
        assert!(v.fit(&[]).is_err());
    }

    #[test]
    fn test_transform_before_fit_is_error() {
        let v = TermVectorizer::new();
        assert!(v.transform(&docs(&["cat"])).is_err());
    }

    #[test]
    fn test_bigrams() {
        let mut v = TermVectorizer::new().with_ngram_range(1, 2);
        v.fit(&docs(&["gaming laptop stand"])).unwrap();
        // 3 unigrams + 2 bigrams
        assert_eq!(v.vocabulary_size(), 5);
        assert!(v.vocabulary.contains_key("gaming_laptop"));
    }

    #[test]
    fn test_min_df_prunes_rare_terms() {
        let mut v = TermVectorizer::new().with_min_df(2);
        v.fit(&docs(&["cat dog", "cat bird", "cat fish"])).unwrap();
        // only "cat" appears in ≥ 2 documents
        assert_eq!(v.vocabulary_size(), 1);
        assert!(v.vocabulary.contains_key("cat"));
    }

    #[test]
    fn test_max_df_prunes_ubiquitous_terms() {
        let mut v = TermVectorizer::new().with_max_df(0.5);
        v.fit(&docs(&["cat dog", "cat bird", "cat fish", "cat crow"]))
            .unwrap();
        // "cat" appears in every document, above the 50% ceiling
        assert!(!v.vocabulary.contains_key("cat"));
        assert_eq!(v.vocabulary_size(), 4);
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let mut v = TermVectorizer::new().with_max_features(2);
        v.fit(&docs(&["a b c d e"])).unwrap();
        assert_eq!(v.vocabulary_size(), 2);
    }

    #[test]
    fn test_shared_terms_keep_nonzero_weight() {
        // Smoothed idf: a term in every document still carries weight,
        // so identical-category catalogs keep usable vectors.
        let mut v = TermVectorizer::new();
        let m = v
            .fit_transform(&docs(&["phone alpha", "phone beta"]))
            .unwrap();
        let phone_idx = v.vocabulary["phone"];
        assert!(m.get(0, phone_idx) > 0.0);
        assert!(m.get(1, phone_idx) > 0.0);
    }

    #[test]
    fn test_rare_term_outweighs_common_term() {
        let mut v = TermVectorizer::new();
        let m = v
            .fit_transform(&docs(&["phone alpha", "phone beta", "phone gamma"]))
            .unwrap();
        let phone_idx = v.vocabulary["phone"];
        let alpha_idx = v.vocabulary["alpha"];
        assert!(m.get(0, alpha_idx) > m.get(0, phone_idx));
    }

    #[test]
    fn test_transform_counts_repeats() {
        let mut v = TermVectorizer::new();
        v.fit(&docs(&["cat cat dog"])).unwrap();
        let m = v.transform(&docs(&["cat cat cat"])).unwrap();
        let cat_idx = v.vocabulary["cat"];
        let dog_idx = v.vocabulary["dog"];
        assert!(m.get(0, cat_idx) > 0.0);
        assert_eq!(m.get(0, dog_idx), 0.0);
        // three occurrences weigh 3× one occurrence
        let one = v.transform(&docs(&["cat"])).unwrap();
        assert!((m.get(0, cat_idx) - 3.0 * one.get(0, cat_idx)).abs() < 1e-5);
    }
}
