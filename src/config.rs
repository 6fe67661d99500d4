use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::classifier::LabelPolicy;
use crate::text::{AnalyzerOptions, StopWordList};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "sepitoriClassifier.json";
pub const DEFAULT_CORPUS_PATH: &str = "data/training.json";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port (SEPITORI_PORT)
    pub port: u16,
    /// Interface to bind (SEPITORI_BIND)
    pub bind: String,
    /// Serialized model file (SEPITORI_MODEL_PATH)
    pub model_path: PathBuf,
    /// Training corpus file (SEPITORI_CORPUS_PATH)
    pub corpus_path: PathBuf,
    /// Analyzer used when training a new model. A loaded model keeps the
    /// options it was trained with.
    pub analyzer: AnalyzerOptions,
    pub policy: LabelPolicy,
    /// How many feature keys GET /debug-features returns
    pub debug_feature_limit: usize,
    /// Re-read the model from disk after every successful training save
    pub reload_after_train: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: "0.0.0.0".to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            analyzer: AnalyzerOptions::default(),
            policy: LabelPolicy::default(),
            debug_feature_limit: 100,
            reload_after_train: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup. `load()` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let vars = Vars(&lookup);

        let max_unseen_ratio = match vars.get("SEPITORI_MAX_UNSEEN_RATIO").as_deref() {
            Some("off") | Some("none") => None,
            Some(raw) => Some(ratio("SEPITORI_MAX_UNSEEN_RATIO", raw)?),
            None => defaults.policy.max_unseen_ratio,
        };

        let confidence_threshold = match vars.get("SEPITORI_CONFIDENCE_THRESHOLD") {
            Some(raw) => ratio("SEPITORI_CONFIDENCE_THRESHOLD", &raw)?,
            None => defaults.policy.confidence_threshold,
        };

        let stop_words = match vars.get("SEPITORI_STOP_WORDS") {
            Some(raw) => parse_stop_words(&raw)?,
            None => defaults.analyzer.stop_words,
        };

        Ok(Self {
            port: vars.parse_or("SEPITORI_PORT", defaults.port)?,
            bind: vars.get("SEPITORI_BIND").unwrap_or(defaults.bind),
            model_path: vars
                .get("SEPITORI_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            corpus_path: vars
                .get("SEPITORI_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.corpus_path),
            analyzer: AnalyzerOptions {
                stem: vars.parse_or("SEPITORI_STEM", defaults.analyzer.stem)?,
                stop_words,
            },
            policy: LabelPolicy {
                confidence_threshold,
                max_unseen_ratio,
            },
            debug_feature_limit: vars
                .parse_or("SEPITORI_DEBUG_FEATURE_LIMIT", defaults.debug_feature_limit)?,
            reload_after_train: vars
                .parse_or("SEPITORI_RELOAD_AFTER_TRAIN", defaults.reload_after_train)?,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Read and parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => parse_value(key, &raw),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw:?}"))
}

/// A fraction in [0, 1].
fn ratio(key: &str, raw: &str) -> Result<f64> {
    let value: f64 = parse_value(key, raw)?;
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{key} must be between 0 and 1, got {value}");
    }
    Ok(value)
}

fn parse_stop_words(raw: &str) -> Result<StopWordList> {
    match raw.trim().to_lowercase().as_str() {
        "basic" | "true" | "on" => Ok(StopWordList::Basic),
        "iso" => Ok(StopWordList::Iso),
        "off" | "false" | "none" => Ok(StopWordList::Off),
        other => anyhow::bail!(
            "SEPITORI_STOP_WORDS must be one of basic, iso or off, got {other:?}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_path, PathBuf::from("sepitoriClassifier.json"));
        assert_eq!(config.policy.confidence_threshold, 0.65);
        assert_eq!(config.policy.max_unseen_ratio, Some(0.5));
        assert!(config.analyzer.stem);
        assert_eq!(config.analyzer.stop_words, StopWordList::Basic);
    }

    #[test]
    fn test_parse_value_names_the_variable() {
        let err = parse_value::<u16>("SEPITORI_PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("SEPITORI_PORT"));
        assert!(!parse_value::<bool>("SEPITORI_STEM", " false ").unwrap());
    }

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.corpus_path, PathBuf::from(DEFAULT_CORPUS_PATH));
        assert_eq!(config.policy, LabelPolicy::default());
        assert!(!config.reload_after_train);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("SEPITORI_PORT", "8080"),
            ("SEPITORI_MODEL_PATH", "/tmp/model.json"),
            ("SEPITORI_CONFIDENCE_THRESHOLD", "0.8"),
            ("SEPITORI_STEM", "false"),
            ("SEPITORI_STOP_WORDS", "iso"),
            ("SEPITORI_RELOAD_AFTER_TRAIN", "true"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, PathBuf::from("/tmp/model.json"));
        assert_eq!(config.policy.confidence_threshold, 0.8);
        assert!(!config.analyzer.stem);
        assert_eq!(config.analyzer.stop_words, StopWordList::Iso);
        assert!(config.reload_after_train);
    }

    #[test]
    fn test_unseen_ratio_can_be_switched_off() {
        let config = config_from(&[("SEPITORI_MAX_UNSEEN_RATIO", "off")]).unwrap();
        assert_eq!(config.policy.max_unseen_ratio, None);

        let config = config_from(&[("SEPITORI_MAX_UNSEEN_RATIO", "0.25")]).unwrap();
        assert_eq!(config.policy.max_unseen_ratio, Some(0.25));
    }

    #[test]
    fn test_fractions_outside_unit_range_are_rejected() {
        for (key, raw) in [
            ("SEPITORI_CONFIDENCE_THRESHOLD", "1.5"),
            ("SEPITORI_MAX_UNSEEN_RATIO", "-0.1"),
            ("SEPITORI_MAX_UNSEEN_RATIO", "2"),
        ] {
            let err = config_from(&[(key, raw)]).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={raw}: {err}");
        }
    }

    #[test]
    fn test_stop_word_list_names() {
        let list = |raw| config_from(&[("SEPITORI_STOP_WORDS", raw)]).map(|c| c.analyzer.stop_words);
        assert_eq!(list("true").unwrap(), StopWordList::Basic);
        assert_eq!(list("Basic").unwrap(), StopWordList::Basic);
        assert_eq!(list("false").unwrap(), StopWordList::Off);
        assert!(list("klingon").is_err());
    }
}
