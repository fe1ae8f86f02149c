use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::relevance::scorer::ScoringOptions;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override whatever is set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the ONNX model, tokenizer, and config.json
    pub model_dir: PathBuf,
    /// Pairs per inference call
    pub batch_size: usize,
    /// Entailment probability a text must exceed to count as relevant
    pub threshold: f64,
    /// Token truncation length per (text, hypothesis) pair
    pub max_length: usize,
    /// Optional hypothesis file (one per line); built-in bank when unset
    pub hypotheses_path: Option<PathBuf>,
    /// Rows in the trial sample run before the full corpus
    pub sample_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        let scoring = ScoringOptions::default();
        Self {
            model_dir: crate::entailment::download::default_model_dir(),
            batch_size: scoring.batch_size,
            threshold: scoring.threshold,
            max_length: scoring.max_length,
            hypotheses_path: None,
            sample_size: 200,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset. Set-but-unparseable values are errors.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            model_dir: env::var("BERTA_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            batch_size: parse_var("BERTA_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
            threshold: parse_var("BERTA_THRESHOLD")?.unwrap_or(defaults.threshold),
            max_length: parse_var("BERTA_MAX_LENGTH")?.unwrap_or(defaults.max_length),
            hypotheses_path: env::var("BERTA_HYPOTHESES").ok().map(PathBuf::from),
            sample_size: parse_var("BERTA_SAMPLE_SIZE")?.unwrap_or(defaults.sample_size),
        })
    }

    /// Scoring options derived from this config.
    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            batch_size: self.batch_size,
            threshold: self.threshold,
            max_length: self.max_length,
            ..ScoringOptions::default()
        }
    }

    /// Check that the model files are present.
    /// Call this before any operation that runs inference.
    pub fn require_model(&self) -> Result<()> {
        if !crate::entailment::download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "NLI model files not found in {}\n\
                 Run `berta download-model` to download them,\n\
                 or set BERTA_MODEL_DIR to a directory containing model.onnx and tokenizer.json.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(None),
    }
}
