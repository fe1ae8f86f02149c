// Model download helper for the NLI model.
//
// Fetches the multilingual mDeBERTa-v3 MNLI/XNLI ONNX export from
// HuggingFace, along with its tokenizer and label config. Files are stored
// in a platform-appropriate directory (~/.local/share/berta/models/ on
// Linux) so they persist across runs.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the NLI model.
const NLI_HF_URL: &str = "https://huggingface.co/Xenova/mDeBERTa-v3-base-mnli-xnli/resolve/main";

/// Remote path of the quantized model inside the repo.
const REMOTE_MODEL_FILE: &str = "onnx/model_quantized.onnx";

pub const QUANTIZED_MODEL_FILE: &str = "model_quantized.onnx";
pub const FULL_MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";

/// Returns the default directory for storing model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("berta")
        .join("models")
}

/// The ONNX file to load from `dir`: quantized if present, else full precision.
pub fn model_file(dir: &Path) -> Option<PathBuf> {
    [QUANTIZED_MODEL_FILE, FULL_MODEL_FILE]
        .iter()
        .map(|f| dir.join(f))
        .find(|p| p.exists())
}

/// Check whether a model file and tokenizer exist. The label config is
/// optional; without it the fallback entailment index applies.
pub fn model_files_present(dir: &Path) -> bool {
    model_file(dir).is_some() && dir.join(TOKENIZER_FILE).exists()
}

/// Download the NLI model, tokenizer, and config.
///
/// Skips files that already exist. Shows a progress bar for the model.
pub async fn download_model(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    println!("\nNLI model (mDeBERTa-v3-base-mnli-xnli):");

    for (remote, local, show_progress) in [
        (CONFIG_FILE, CONFIG_FILE, false),
        (TOKENIZER_FILE, TOKENIZER_FILE, false),
        (REMOTE_MODEL_FILE, QUANTIZED_MODEL_FILE, true),
    ] {
        let dest = dir.join(local);
        if dest.exists() {
            info!(file = local, "Already exists, skipping");
            println!("  {} (already exists)", local);
            continue;
        }
        println!("  Downloading {}...", local);
        download_file(&format!("{}/{}", NLI_HF_URL, remote), &dest, show_progress).await?;
    }

    Ok(())
}

/// Stream a single file from a URL to a local path.
///
/// Writes to `<dest>.part` and renames on completion.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        match response.content_length() {
            Some(size) => {
                let pb = ProgressBar::new(size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(ProgressStyle::default_spinner().template("    {spinner} {bytes}")?);
                pb
            }
        }
    } else {
        ProgressBar::hidden()
    };

    let partial = dest.with_extension("part");
    let mut file = std::fs::File::create(&partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;

    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        file.write_all(&chunk)
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        pb.inc(chunk.len() as u64);
    }
    file.flush()?;
    drop(file);

    std::fs::rename(&partial, dest)
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;
    pb.finish_and_clear();

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}
