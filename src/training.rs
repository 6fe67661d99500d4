// Model lifecycle: startup load, bootstrap from the corpus, and the
// learn, save, reload, append-to-corpus flow shared by POST /train and
// the `learn` CLI command.

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::classifier::model::save_json;
use crate::classifier::SepitoriModel;
use crate::config::Config;
use crate::corpus::{Corpus, TrainingExample};

/// Load the saved model, or build one from the corpus if there is none yet.
///
/// - model file present: load it (its analyzer options win over config)
/// - otherwise, non-empty corpus: train from it and save the result
/// - otherwise: an empty model, saved on first training
pub async fn load_or_bootstrap(config: &Config) -> Result<SepitoriModel> {
    if config.model_path.exists() {
        let model = SepitoriModel::load(&config.model_path, config.policy).await?;
        if model.analyzer_options() != config.analyzer {
            warn!(
                stored = ?model.analyzer_options(),
                configured = ?config.analyzer,
                "Model was trained with different analyzer options; using the stored ones"
            );
        }
        return Ok(model);
    }

    let corpus = Corpus::new(&config.corpus_path);
    let examples = corpus.load().await?;
    if examples.is_empty() {
        warn!(
            model = %config.model_path.display(),
            corpus = %config.corpus_path.display(),
            "No model or training data found, starting with an empty model"
        );
        return Ok(SepitoriModel::empty(config.analyzer, config.policy));
    }

    info!(
        examples = examples.len(),
        corpus = %config.corpus_path.display(),
        "No saved model, training from corpus"
    );
    let model = SepitoriModel::from_examples(&examples, config.analyzer, config.policy);
    model.save(&config.model_path).await?;
    Ok(model)
}

/// What a successful training call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainOutcome {
    /// False when the text had no usable words and only the corpus grew
    pub model_updated: bool,
    /// Entries in the corpus file after the append
    pub corpus_entries: usize,
}

/// Add one example to the live model, persist the model, then append the
/// raw example to the corpus.
///
/// Returns `Ok(None)` if no model is loaded. Callers that may train
/// concurrently must serialize calls; the model lock is only held while the
/// counts are updated, not during file I/O.
///
/// The corpus append runs even when saving or reloading the model fails, so
/// an example the live model has learned is never lost on restart. The model
/// error is returned after the append.
pub async fn train_example(
    model: &RwLock<Option<SepitoriModel>>,
    config: &Config,
    corpus: &Corpus,
    example: TrainingExample,
) -> Result<Option<TrainOutcome>> {
    let snapshot = {
        let mut guard = model.write().await;
        let Some(live) = guard.as_mut() else {
            return Ok(None);
        };
        if live.learn(&example.text, &example.label) {
            Some(live.to_json()?)
        } else {
            None
        }
    };
    let model_updated = snapshot.is_some();

    let persisted = match snapshot {
        Some(json) => persist_model(model, config, &json, &example.label).await,
        None => {
            warn!(label = %example.label, "Example has no usable words, model unchanged");
            Ok(())
        }
    };

    let corpus_entries = corpus.append(example).await?;
    persisted?;

    Ok(Some(TrainOutcome {
        model_updated,
        corpus_entries,
    }))
}

async fn persist_model(
    model: &RwLock<Option<SepitoriModel>>,
    config: &Config,
    json: &str,
    label: &str,
) -> Result<()> {
    save_json(&config.model_path, json).await?;
    info!(label, path = %config.model_path.display(), "Model updated and saved");

    if config.reload_after_train {
        let reloaded = SepitoriModel::load(&config.model_path, config.policy).await?;
        *model.write().await = Some(reloaded);
    }
    Ok(())
}
