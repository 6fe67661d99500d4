// Document-frequency Naive Bayes over binary word-presence features.
//
// Each training document contributes at most once per feature. Scores use
// add-one smoothing on both the per-class feature counts and the class
// totals:
//
//   P(w | c) = (1 + docs of c containing w) / (1 + docs of c)
//   P(c)     = (1 + docs of c) / (docs + classes)
//
// Only features present in the query and known to the model contribute to
// the likelihood. Words the model has never seen are ignored.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

const SMOOTHING: f64 = 1.0;

/// Per-class training statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Number of training documents with this label
    pub documents: u64,
    /// For each feature, how many of those documents contained it
    pub feature_documents: HashMap<String, u64>,
}

/// Score of one label for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    /// Natural log of prior × likelihood
    pub log_score: f64,
}

impl Classification {
    /// The unnormalized probability. Underflows to 0.0 for long inputs;
    /// use `log_score` for comparisons.
    pub fn value(&self) -> f64 {
        self.log_score.exp()
    }
}

/// The trained model. Serializable as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayes {
    /// Known features and how many training documents contained each one
    vocabulary: BTreeMap<String, u64>,
    classes: BTreeMap<String, ClassStats>,
    total_documents: u64,
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one labeled document. Returns false (and changes nothing) when the
    /// document has no features.
    pub fn add_document(&mut self, features: &[String], label: &str) -> bool {
        let unique: HashSet<&str> = features.iter().map(String::as_str).collect();
        if unique.is_empty() {
            return false;
        }

        let stats = self.classes.entry(label.to_string()).or_default();
        stats.documents += 1;
        for feature in &unique {
            *stats
                .feature_documents
                .entry((*feature).to_string())
                .or_insert(0) += 1;
            *self.vocabulary.entry((*feature).to_string()).or_insert(0) += 1;
        }
        self.total_documents += 1;
        true
    }

    /// Score every known label, best first.
    pub fn classify(&self, features: &[String]) -> Vec<Classification> {
        let observed: BTreeSet<&str> = features
            .iter()
            .map(String::as_str)
            .filter(|f| self.vocabulary.contains_key(*f))
            .collect();

        let denominator = self.total_documents as f64 + self.classes.len() as f64 * SMOOTHING;

        let mut scored: Vec<Classification> = self
            .classes
            .iter()
            .map(|(label, stats)| {
                let class_total = stats.documents as f64 + SMOOTHING;
                let prior = (class_total / denominator).ln();
                let likelihood: f64 = observed
                    .iter()
                    .map(|f| {
                        let count = stats.feature_documents.get(*f).copied().unwrap_or(0) as f64;
                        ((count + SMOOTHING) / class_total).ln()
                    })
                    .sum();
                Classification {
                    label: label.clone(),
                    log_score: prior + likelihood,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.log_score
                .partial_cmp(&a.log_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    pub fn knows(&self, feature: &str) -> bool {
        self.vocabulary.contains_key(feature)
    }

    pub fn feature_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Known features in sorted order, with their document frequencies.
    pub fn features(&self) -> impl Iterator<Item = (&str, u64)> {
        self.vocabulary.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, u64)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v.documents))
    }

    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }
}
