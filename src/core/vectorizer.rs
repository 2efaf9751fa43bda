// src/core/vectorizer.rs
use crate::core::text::{Analyzer, MAX_NGRAM};
use crate::core::types::TermId;
use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A sparse row: sorted, unique term indices with their weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<TermId>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&i, &v)| dense[i] * v)
            .sum()
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// TF-IDF vectorizer over unigrams and bigrams.
///
/// The vocabulary is indexed in lexicographic n-gram order and kept in a
/// `BTreeMap`, so two fits over the same corpus serialize to the same bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    vocabulary: BTreeMap<String, TermId>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and smoothed idf weights from `documents`.
    /// Complexity: O(T log V) where T is the total n-gram count.
    pub fn fit<S: AsRef<str>>(analyzer: Analyzer, documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(TriageError::EmptyCorpus);
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique: BTreeSet<String> = analyzer.ngrams(doc.as_ref()).into_iter().collect();
            for gram in unique {
                *document_frequency.entry(gram).or_insert(0) += 1;
            }
        }
        if document_frequency.is_empty() {
            return Err(TriageError::EmptyVocabulary);
        }

        // idf = ln((1 + n) / (1 + df)) + 1
        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (gram, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(gram, index);
        }

        Ok(Self { analyzer, vocabulary, idf })
    }

    /// Maps text into the fitted space. Unknown n-grams are ignored and the
    /// vocabulary never grows. The row is L2-normalized unless it is all zero.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<TermId, f64> = HashMap::new();
        for gram in self.analyzer.ngrams(text) {
            if let Some(&id) = self.vocabulary.get(&gram) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(TermId, f64)> = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id]))
            .collect();
        entries.sort_unstable_by_key(|&(id, _)| id);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        let (indices, values) = entries
            .into_iter()
            .map(|(id, v)| (id, if norm > 0.0 { v / norm } else { v }))
            .unzip();
        SparseVector { indices, values }
    }

    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn term_id(&self, gram: &str) -> Option<TermId> {
        self.vocabulary.get(gram).copied()
    }

    pub fn idf(&self, id: TermId) -> Option<f64> {
        self.idf.get(id).copied()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Checks that a deserialized vectorizer is internally consistent.
    pub(crate) fn validate(&self) -> Result<()> {
        let Analyzer { min_n, max_n, .. } = self.analyzer;
        if min_n == 0 || min_n > max_n || max_n > MAX_NGRAM {
            return Err(TriageError::CorruptArtifact(format!(
                "unsupported n-gram range {min_n}..={max_n}"
            )));
        }
        if self.vocabulary.len() != self.idf.len() {
            return Err(TriageError::CorruptArtifact(format!(
                "vocabulary has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if self.vocabulary.values().any(|&id| id >= self.idf.len()) {
            return Err(TriageError::CorruptArtifact("term index out of range".into()));
        }
        Ok(())
    }
}
