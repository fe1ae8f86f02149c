use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use berta::config::Config;
use berta::dataset::Corpus;
use berta::entailment::onnx::OnnxEntailmentModel;
use berta::relevance::scorer::ScoringOptions;

/// berta: zero-shot relevance filtering for UAE education Q&A data.
///
/// Scores each question and answer against a bank of topic hypotheses with
/// a multilingual NLI model and keeps the records that entail any of them.
#[derive(Parser)]
#[command(name = "berta", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the mDeBERTa NLI model (~300 MB)
    DownloadModel,

    /// Label every row of a Q&A CSV as relevant or not
    Classify {
        /// Input CSV with Title and Answer columns
        input: PathBuf,

        /// Labeled output (default: <input>_labeled.csv)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Relevant-rows-only output (default: <input>_relevant.csv)
        #[arg(long)]
        relevant_output: Option<PathBuf>,

        /// Skip the trial run on a random sample
        #[arg(long)]
        no_trial: bool,

        /// Rows in the trial sample (default: BERTA_SAMPLE_SIZE or 200)
        #[arg(long)]
        sample_size: Option<usize>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Score one or more texts and print the result
    ScoreText {
        /// Texts to score
        #[arg(required = true)]
        texts: Vec<String>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Clean a scraped CSV: fix encoding artifacts, dedupe, drop Question Details
    Clean {
        /// Input CSV
        input: PathBuf,

        /// Cleaned output CSV
        output: PathBuf,
    },

    /// Show model files and scoring settings
    Status,
}

/// Flags shared by every command that runs the scorer.
#[derive(Args)]
struct ScoringArgs {
    /// Pairs per inference call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Entailment probability a text must exceed to count as relevant
    #[arg(long)]
    threshold: Option<f64>,

    /// Token truncation length per pair
    #[arg(long)]
    max_length: Option<usize>,

    /// Hypothesis file, one per line (default: built-in UAE education bank)
    #[arg(long)]
    hypotheses: Option<PathBuf>,

    /// Evaluate every text against every hypothesis instead of stopping at
    /// the first threshold crossing
    #[arg(long)]
    exhaustive: bool,
}

impl ScoringArgs {
    fn options(&self, config: &Config) -> ScoringOptions {
        let base = config.scoring_options();
        ScoringOptions {
            batch_size: self.batch_size.unwrap_or(base.batch_size),
            threshold: self.threshold.unwrap_or(base.threshold),
            max_length: self.max_length.unwrap_or(base.max_length),
            exhaustive: self.exhaustive,
            show_progress: true,
        }
    }

    fn hypotheses(&self, config: &Config) -> Result<Vec<String>> {
        match self.hypotheses.as_ref().or(config.hypotheses_path.as_ref()) {
            Some(path) => berta::relevance::hypotheses::load_hypotheses(path)
                .with_context(|| format!("Failed to load hypotheses from {}", path.display())),
            None => Ok(berta::relevance::hypotheses::default_hypotheses()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("berta=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading NLI model...");
            println!("  Destination: {}", model_dir.display());

            berta::entailment::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `berta classify <file.csv>`.");
        }

        Commands::Classify {
            input,
            output,
            relevant_output,
            no_trial,
            sample_size,
            scoring,
        } => {
            let config = Config::load()?;
            config.require_model()?;

            let options = scoring.options(&config);
            options.validate()?;
            let hypotheses = scoring.hypotheses(&config)?;

            let corpus = Corpus::from_path(&input)?;
            let model = OnnxEntailmentModel::load(&config.model_dir)?;
            info!(
                entailment_index = model.entailment_index(),
                hypotheses = hypotheses.len(),
                "Model loaded"
            );

            println!("{}", "=== UAE Education Classification ===".bold());
            println!("Dataset size: {} records", corpus.len());
            println!("Using {} hypotheses", hypotheses.len());

            if !no_trial {
                let sample_size = sample_size.unwrap_or(config.sample_size);
                if let Some((sampled, outcome)) = berta::pipeline::classify::run_trial(
                    &model,
                    &corpus,
                    &hypotheses,
                    &options,
                    sample_size,
                    berta::dataset::sample::DEFAULT_SEED,
                )
                .await?
                {
                    let sample_path = sibling_path(&input, "sample_results");
                    berta::pipeline::classify::write_outputs(
                        &sampled,
                        &outcome,
                        &sample_path,
                        None,
                    )?;
                    berta::output::terminal::display_summary("Sample Results", &outcome.summary);
                    println!("  Sample saved to: {}", sample_path.display());
                }
            }

            println!("\nProcessing full dataset...");
            let outcome =
                berta::pipeline::classify::run(&model, &corpus, &hypotheses, &options).await?;

            let labeled_path = output.unwrap_or_else(|| sibling_path(&input, "labeled"));
            let relevant_path = relevant_output.unwrap_or_else(|| sibling_path(&input, "relevant"));
            berta::pipeline::classify::write_outputs(
                &corpus,
                &outcome,
                &labeled_path,
                Some(&relevant_path),
            )?;

            berta::output::terminal::display_summary("Final Results", &outcome.summary);
            println!("\nResults saved to: {}", labeled_path.display());
            println!("Relevant records only saved to: {}", relevant_path.display());
        }

        Commands::ScoreText { texts, scoring } => {
            let config = Config::load()?;
            config.require_model()?;

            let options = ScoringOptions {
                show_progress: false,
                ..scoring.options(&config)
            };
            let hypotheses = scoring.hypotheses(&config)?;
            let model = OnnxEntailmentModel::load(&config.model_dir)?;

            let report =
                berta::relevance::scorer::score(&texts, &hypotheses, &model, &options).await?;
            berta::output::terminal::display_text_scores(
                &texts,
                &report.scores,
                options.threshold,
            );
        }

        Commands::Clean { input, output } => {
            let mut corpus = Corpus::from_path(&input)?;
            println!("Columns in the dataset: {}", corpus.headers.join(", "));

            let report = berta::clean::clean_corpus(&mut corpus);
            if report.duplicates_removed > 0 {
                println!("Removed {} duplicate rows", report.duplicates_removed);
            }
            if report.dropped_question_details {
                println!("Removed 'Question Details' column");
            }

            corpus.write_path(&output)?;
            info!(rows = corpus.len(), "Cleaned corpus written");
            println!("Cleaned data saved to {}", output.display());
            println!("Total rows in cleaned dataset: {}", corpus.len());
        }

        Commands::Status => {
            let config = Config::load()?;
            berta::status::show(&config)?;
        }
    }

    Ok(())
}

/// `data/qa.csv` + "labeled" -> `data/qa_labeled.csv`
fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    input.with_file_name(format!("{stem}_{suffix}.csv"))
}
