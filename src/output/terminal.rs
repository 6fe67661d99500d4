// Colored terminal output for predictions, features and training summaries.
//
// main.rs display calls delegate here so the command handlers stay short.

use colored::{ColoredString, Colorize};

use super::truncate_chars;
use crate::classifier::{FinalLabel, Prediction, SepitoriModel};

/// Color a final label the same way everywhere.
pub fn colorize_label(label: FinalLabel) -> ColoredString {
    match label {
        FinalLabel::Sepitori => label.as_str().green().bold(),
        FinalLabel::NonSepitori => label.as_str().blue().bold(),
        FinalLabel::Mixed => label.as_str().yellow().bold(),
        FinalLabel::NotRecognized => label.as_str().dimmed(),
    }
}

/// Display a single prediction.
pub fn display_prediction(prediction: &Prediction) {
    let p = &prediction.probabilities;

    println!("\n  \"{}\"", truncate_chars(&prediction.text, 100));
    println!("  Label: {}", colorize_label(prediction.final_label));
    println!();
    println!(
        "  {:<14} {:>12}  {:>10}",
        "".dimmed(),
        "Score".dimmed(),
        "Confidence".dimmed()
    );
    println!(
        "  {:<14} {:>12.3e}  {:>10.3}",
        "sepitori", p.sepitori, p.sepitori_confidence
    );
    println!(
        "  {:<14} {:>12.3e}  {:>10.3}",
        "non-sepitori", p.non_sepitori, p.non_confidence
    );

    if !p.unseen_words.is_empty() {
        println!(
            "\n  {} {}",
            "Unseen words:".dimmed(),
            p.unseen_words.join(", ")
        );
    }
}

/// Display the model's feature count and a sample of its keys.
pub fn display_features(model: &SepitoriModel, limit: usize) {
    let keys = model.feature_keys(limit);
    println!(
        "\n{}",
        format!("=== Model features ({} total) ===", model.feature_count()).bold()
    );
    if keys.is_empty() {
        println!("No features yet. Add examples with `sepitori learn` or POST /train.");
        return;
    }
    for chunk in keys.chunks(6) {
        println!("  {}", chunk.join("  "));
    }
    if model.feature_count() > keys.len() {
        println!(
            "  {}",
            format!("... and {} more", model.feature_count() - keys.len()).dimmed()
        );
    }
}

/// Display examples per label after a training run.
pub fn display_training_summary(model: &SepitoriModel) {
    println!("\n{}", "=== Training summary ===".bold());
    for (label, count) in model.label_counts() {
        println!("  {:<16} {:>6} examples", label, count);
    }
    println!("  {:<16} {:>6}", "features", model.feature_count());
}
