// SepitoriModel: analyzer, Bayes counts and label policy behind one type.
//
// This is what the HTTP handlers and the CLI talk to. The Bayes model only
// sees features; this layer owns the mapping from raw text to words,
// features and unseen words, and from scores to a final label.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::bayes::NaiveBayes;
use super::policy::{Evidence, FinalLabel, LabelPolicy, NON_SEPITORI, SEPITORI};
use crate::corpus::TrainingExample;
use crate::persist::write_atomic;
use crate::text::{self, Analyzer, AnalyzerOptions};

const MODEL_FORMAT_VERSION: u32 = 1;

/// On-disk form of a trained model. Borrows the counts when saving.
#[derive(Serialize, Deserialize)]
struct ModelFile<'a> {
    version: u32,
    updated_at: DateTime<Utc>,
    analyzer: AnalyzerOptions,
    bayes: Cow<'a, NaiveBayes>,
}

/// Raw scores and confidences reported with every prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probabilities {
    pub sepitori: f64,
    pub non_sepitori: f64,
    pub sepitori_confidence: f64,
    pub non_confidence: f64,
    pub unseen_words: Vec<String>,
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub text: String,
    pub final_label: FinalLabel,
    pub probabilities: Probabilities,
}

pub struct SepitoriModel {
    analyzer: Analyzer,
    bayes: NaiveBayes,
    policy: LabelPolicy,
    updated_at: DateTime<Utc>,
}

impl SepitoriModel {
    /// An untrained model. Every prediction is "not recognized" until
    /// examples are added.
    pub fn empty(options: AnalyzerOptions, policy: LabelPolicy) -> Self {
        Self {
            analyzer: Analyzer::new(options),
            bayes: NaiveBayes::new(),
            policy,
            updated_at: Utc::now(),
        }
    }

    /// Train a fresh model from a list of examples.
    pub fn from_examples(
        examples: &[TrainingExample],
        options: AnalyzerOptions,
        policy: LabelPolicy,
    ) -> Self {
        let mut model = Self::empty(options, policy);
        let skipped = examples
            .iter()
            .filter(|e| !model.learn(&e.text, &e.label))
            .count();
        if skipped > 0 {
            warn!(skipped, "Training examples without usable words were skipped");
        }
        info!(
            examples = examples.len(),
            features = model.feature_count(),
            "Trained model from examples"
        );
        model
    }

    /// Add one labeled example. Returns false if the text had no features
    /// (e.g. only stopwords or punctuation); the model is unchanged then.
    pub fn learn(&mut self, text: &str, label: &str) -> bool {
        let features = self.analyzer.features(text);
        let added = self.bayes.add_document(&features, label);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    pub fn predict(&self, text: &str) -> Prediction {
        let words = text::words(&text::normalize(text));

        let mut features = Vec::with_capacity(words.len());
        let mut unseen_words = Vec::new();
        for word in &words {
            match self.analyzer.feature(word) {
                Some(feature) if self.bayes.knows(&feature) => features.push(feature),
                _ => unseen_words.push(word.clone()),
            }
        }

        let scores = self.bayes.classify(&features);
        let sep = scores.iter().find(|c| c.label == SEPITORI);
        let non = scores.iter().find(|c| c.label == NON_SEPITORI);

        let (sepitori_confidence, non_confidence) =
            normalized_confidences(sep.map(|c| c.log_score), non.map(|c| c.log_score));

        let final_label = self.policy.decide(&Evidence {
            word_count: words.len(),
            unseen_count: unseen_words.len(),
            sepitori_confidence: sep.map(|_| sepitori_confidence),
            non_confidence: non.map(|_| non_confidence),
        });

        Prediction {
            text: text.to_string(),
            final_label,
            probabilities: Probabilities {
                sepitori: sep.map(|c| c.value()).unwrap_or(0.0),
                non_sepitori: non.map(|c| c.value()).unwrap_or(0.0),
                sepitori_confidence,
                non_confidence,
                unseen_words,
            },
        }
    }

    pub fn feature_count(&self) -> usize {
        self.bayes.feature_count()
    }

    /// The first `limit` known features, sorted.
    pub fn feature_keys(&self, limit: usize) -> Vec<String> {
        self.bayes
            .features()
            .take(limit)
            .map(|(f, _)| f.to_string())
            .collect()
    }

    /// Training document count per label.
    pub fn label_counts(&self) -> Vec<(String, u64)> {
        self.bayes
            .labels()
            .map(|(l, n)| (l.to_string(), n))
            .collect()
    }

    pub fn total_documents(&self) -> u64 {
        self.bayes.total_documents()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn analyzer_options(&self) -> AnalyzerOptions {
        self.analyzer.options()
    }

    /// Serialize the model to its JSON file form.
    pub fn to_json(&self) -> Result<String> {
        let file = ModelFile {
            version: MODEL_FORMAT_VERSION,
            updated_at: self.updated_at,
            analyzer: self.analyzer.options(),
            bayes: Cow::Borrowed(&self.bayes),
        };
        serde_json::to_string(&file).context("Failed to serialize model")
    }

    /// Parse a model from its JSON file form. The analyzer options stored in
    /// the file win over whatever the caller is configured with.
    pub fn from_json(json: &str, policy: LabelPolicy) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json).context("Model file is not valid")?;
        if file.version != MODEL_FORMAT_VERSION {
            anyhow::bail!(
                "Unsupported model format version {} (expected {})",
                file.version,
                MODEL_FORMAT_VERSION
            );
        }
        Ok(Self {
            analyzer: Analyzer::new(file.analyzer),
            bayes: file.bayes.into_owned(),
            policy,
            updated_at: file.updated_at,
        })
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        save_json(path, &json).await
    }

    pub async fn load(path: &Path, policy: LabelPolicy) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        Self::from_json(&json, policy)
            .with_context(|| format!("Failed to load model from {}", path.display()))
    }
}

/// Write an already-serialized model. Lets callers serialize under a lock
/// and do the file I/O after releasing it.
pub async fn save_json(path: &Path, json: &str) -> Result<()> {
    write_atomic(path, json)
        .await
        .with_context(|| format!("Failed to save model to {}", path.display()))
}

/// Share of each target label, computed in log space so long inputs whose
/// raw probabilities underflow still get sensible confidences.
fn normalized_confidences(sep: Option<f64>, non: Option<f64>) -> (f64, f64) {
    match (sep, non) {
        (Some(s), Some(n)) => {
            let max = s.max(n);
            let (es, en) = ((s - max).exp(), (n - max).exp());
            let total = es + en;
            (es / total, en / total)
        }
        (Some(_), None) => (1.0, 0.0),
        (None, Some(_)) => (0.0, 1.0),
        (None, None) => (0.0, 0.0),
    }
}
