// System status display: model file, corpus, label counts.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::classifier::SepitoriModel;
use crate::config::Config;
use crate::corpus::Corpus;

/// Display system status to the terminal.
pub async fn show(config: &Config) -> Result<()> {
    println!(
        "Model: {} ({})",
        config.model_path.display(),
        file_size(&config.model_path)
    );
    if config.model_path.exists() {
        let model = SepitoriModel::load(&config.model_path, config.policy).await?;
        println!(
            "  {} documents, {} features (updated {})",
            model.total_documents(),
            model.feature_count(),
            model.updated_at().to_rfc3339()
        );
        let options = model.analyzer_options();
        println!(
            "  Analyzer: stemming {}, stopwords {:?}",
            on_off(options.stem),
            options.stop_words
        );
    } else {
        println!("  not trained yet");
        println!("  Run `sepitori train` to build it from the corpus");
    }

    let corpus = Corpus::new(&config.corpus_path);
    println!(
        "Corpus: {} ({})",
        config.corpus_path.display(),
        file_size(&config.corpus_path)
    );
    let examples = corpus.load().await?;
    if examples.is_empty() {
        println!("  no examples yet");
    } else {
        let mut per_label: BTreeMap<&str, usize> = BTreeMap::new();
        for example in &examples {
            *per_label.entry(example.label.as_str()).or_insert(0) += 1;
        }
        println!("  {} examples", examples.len());
        for (label, count) in per_label {
            println!("    {label}: {count}");
        }
    }

    println!(
        "Policy: confidence >= {}, unseen ratio limit {}",
        config.policy.confidence_threshold,
        config
            .policy
            .max_unseen_ratio
            .map(|r| r.to_string())
            .unwrap_or_else(|| "off".to_string())
    );

    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn file_size(path: &Path) -> String {
    std::fs::metadata(path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "missing".to_string())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
