use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::RwLock;
use tracing::info;

use sepitori::classifier::SepitoriModel;
use sepitori::config::Config;
use sepitori::corpus::{Corpus, TrainingExample};

/// Sepitori: classify text as Sepitori, non-Sepitori or mixed.
///
/// A Naive Bayes bag-of-words model trained from a flat-file corpus, served
/// over HTTP and trainable one example at a time.
#[derive(Parser)]
#[command(name = "sepitori", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (POST /predict, POST /train, GET /debug-features)
    Serve {
        /// Port to listen on (default: SEPITORI_PORT or 5000)
        #[arg(long)]
        port: Option<u16>,

        /// Interface to bind (default: SEPITORI_BIND or 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Rebuild the model from the training corpus and save it
    Train,

    /// Classify a text with the saved model
    Classify {
        /// The text to classify
        text: String,
    },

    /// Add one labeled example to the model and the corpus
    Learn {
        /// Label for the example (e.g. sepitori, non-sepitori)
        #[arg(long)]
        label: String,

        /// The example text
        text: String,
    },

    /// List the features the model knows
    Features {
        /// How many feature keys to print (default: SEPITORI_DEBUG_FEATURE_LIMIT or 100)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show model and corpus status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sepitori=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, bind } => {
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            sepitori::web::run_server(config, port, &bind).await?;
        }

        Commands::Train => {
            let corpus = Corpus::new(&config.corpus_path);
            let examples = corpus.load().await?;
            if examples.is_empty() {
                anyhow::bail!(
                    "No training examples in {}. Add some with `sepitori learn` first.",
                    config.corpus_path.display()
                );
            }

            println!("Training classifier on {} examples...", examples.len());
            let mut model = SepitoriModel::empty(config.analyzer, config.policy);

            let pb = ProgressBar::new(examples.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Training [{bar:30}] {pos}/{len}")
                    .unwrap(),
            );
            let mut skipped = 0usize;
            for example in &examples {
                if !model.learn(&example.text, &example.label) {
                    skipped += 1;
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            model.save(&config.model_path).await?;
            info!(path = %config.model_path.display(), "Model saved");

            sepitori::output::terminal::display_training_summary(&model);
            if skipped > 0 {
                println!(
                    "  {}",
                    format!("{skipped} examples had no usable words and were skipped").yellow()
                );
            }
            println!(
                "\n{}",
                format!("Classifier trained and saved as {}", config.model_path.display()).bold()
            );
        }

        Commands::Classify { text } => {
            let model = sepitori::training::load_or_bootstrap(&config).await?;
            let prediction = model.predict(&text);
            sepitori::output::terminal::display_prediction(&prediction);
        }

        Commands::Learn { label, text } => {
            let model = RwLock::new(Some(
                sepitori::training::load_or_bootstrap(&config).await?,
            ));
            let corpus = Corpus::new(&config.corpus_path);
            let outcome = sepitori::training::train_example(
                &model,
                &config,
                &corpus,
                TrainingExample::new(text, label),
            )
            .await?;

            if let Some(outcome) = outcome {
                if outcome.model_updated {
                    println!("{}", "New sentence added and model updated!".bold());
                } else {
                    println!(
                        "{}",
                        "Sentence stored, but it has no words the model can learn from.".yellow()
                    );
                }
                println!("  Corpus now holds {} examples", outcome.corpus_entries);
            }
        }

        Commands::Features { limit } => {
            let model = sepitori::training::load_or_bootstrap(&config).await?;
            let limit = limit.unwrap_or(config.debug_feature_limit);
            sepitori::output::terminal::display_features(&model, limit);
        }

        Commands::Status => {
            sepitori::status::show(&config).await?;
        }
    }

    Ok(())
}
