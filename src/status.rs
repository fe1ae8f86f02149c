// System status display — model files, label mapping, scoring settings.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::config::Config;
use crate::entailment::download::{model_file, CONFIG_FILE, TOKENIZER_FILE};
use crate::entailment::labels::LabelConfig;
use crate::relevance::hypotheses::{default_hypotheses, load_hypotheses};

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    println!("Model directory: {}", config.model_dir.display());

    match model_file(&config.model_dir) {
        Some(path) => println!("  Model: {}", describe_file(&path)),
        None => {
            println!("  Model: not downloaded");
            println!("  Run `berta download-model` to fetch it");
        }
    }

    let tokenizer = config.model_dir.join(TOKENIZER_FILE);
    if tokenizer.exists() {
        println!("  Tokenizer: {}", describe_file(&tokenizer));
    } else {
        println!("  Tokenizer: missing");
    }

    let label_config = config.model_dir.join(CONFIG_FILE);
    if label_config.exists() {
        let labels = LabelConfig::from_file(&label_config)?;
        println!(
            "  Labels: {} classes, entailment at index {}",
            labels.num_labels(),
            labels.entailment_index()
        );
    } else {
        println!("  Labels: no config.json, entailment index falls back to 2");
    }

    let (source, count) = match &config.hypotheses_path {
        Some(path) => (path.display().to_string(), load_hypotheses(path)?.len()),
        None => ("built-in UAE education bank".to_string(), default_hypotheses().len()),
    };
    println!("Hypotheses: {count} ({source})");

    println!(
        "Scoring: batch size {}, threshold {:.2}, max length {} tokens",
        config.batch_size, config.threshold, config.max_length
    );
    println!("Trial sample: {} rows", config.sample_size);

    Ok(())
}

/// "<size> (modified <local time>)"
fn describe_file(path: &Path) -> String {
    let Ok(meta) = std::fs::metadata(path) else {
        return "unreadable".to_string();
    };
    let modified = meta
        .modified()
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{} (modified {})", format_bytes(meta.len()), modified)
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
