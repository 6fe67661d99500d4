// Training corpus: a flat JSON file of labeled examples.
//
// The file is a pretty-printed JSON array of {text, label} objects. It is
// only ever appended to: each append reads the whole file, pushes one entry
// and rewrites the whole file. Entries are never deduplicated and
// contradictory labels for the same text are kept as-is.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::persist::write_atomic;

/// One labeled training example, stored exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: String,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Handle to the corpus file.
///
/// Appends are read-modify-write and not synchronized here; callers that
/// append concurrently must serialize through their own lock.
#[derive(Debug, Clone)]
pub struct Corpus {
    path: PathBuf,
}

impl Corpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every example. A missing file is an empty corpus.
    pub async fn load(&self) -> Result<Vec<TrainingExample>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read training corpus: {}", self.path.display())
                })
            }
        };

        if json.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&json).with_context(|| {
            format!(
                "Training corpus is not a JSON array of {{text, label}}: {}",
                self.path.display()
            )
        })
    }

    /// Append one example and rewrite the file. Returns the new entry count.
    pub async fn append(&self, example: TrainingExample) -> Result<usize> {
        let mut examples = self.load().await?;
        examples.push(example);

        let json =
            serde_json::to_string_pretty(&examples).context("Failed to serialize training corpus")?;
        write_atomic(&self.path, &json)
            .await
            .with_context(|| format!("Failed to write training corpus: {}", self.path.display()))?;

        debug!(entries = examples.len(), path = %self.path.display(), "Corpus updated");
        Ok(examples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path().join("training.json"));
        assert!(corpus.load().await.unwrap().is_empty());
        assert!(!corpus.exists());
    }

    #[tokio::test]
    async fn test_append_preserves_existing_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("training.json");
        let corpus = Corpus::new(&path);

        assert_eq!(corpus.append(TrainingExample::new("Ke sharp", "sepitori")).await.unwrap(), 1);
        assert_eq!(
            corpus.append(TrainingExample::new("Good day", "non-sepitori")).await.unwrap(),
            2
        );
        // Contradictory duplicates are stored, not rejected
        assert_eq!(corpus.append(TrainingExample::new("Ke sharp", "non-sepitori")).await.unwrap(), 3);

        let examples = corpus.load().await.unwrap();
        assert_eq!(
            examples,
            vec![
                TrainingExample::new("Ke sharp", "sepitori"),
                TrainingExample::new("Good day", "non-sepitori"),
                TrainingExample::new("Ke sharp", "non-sepitori"),
            ]
        );
    }

    #[tokio::test]
    async fn test_raw_text_is_stored_unnormalized() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path().join("training.json"));
        corpus
            .append(TrainingExample::new("Eish, BRU!!", "sepitori"))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(corpus.path()).unwrap();
        assert!(raw.contains("\"Eish, BRU!!\""));
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");
        std::fs::write(&path, "module.exports = [];").unwrap();
        assert!(Corpus::new(&path).load().await.is_err());
    }
}
