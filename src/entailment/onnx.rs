// Local ONNX NLI model (mDeBERTa-v3-base fine-tuned on MNLI + XNLI).
//
// Each (premise, hypothesis) pair is encoded as a sentence pair, truncated
// to the caller's token budget, right-padded to the longest sequence in the
// batch, and run through one forward pass. Logits are softmaxed row-wise.
//
// Model: Xenova/mDeBERTa-v3-base-mnli-xnli (quantized ONNX export)
// Output: 3 logits per pair, ordered by the config's label2id.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};
use tracing::debug;

use super::download::{model_file, CONFIG_FILE, TOKENIZER_FILE};
use super::labels::LabelConfig;
use super::traits::{softmax, ClassIndices, ClassProbs, EntailmentModel};

/// Local ONNX-based NLI model. Session and tokenizer sit behind Arc<Mutex>
/// so inference can move to spawn_blocking.
pub struct OnnxEntailmentModel {
    // ort::Session::run takes &mut self.
    session: Arc<Mutex<Session>>,
    // Mutable because truncation length is set per call.
    tokenizer: Arc<Mutex<Tokenizer>>,
    indices: ClassIndices,
    pad_id: u32,
}

impl OnnxEntailmentModel {
    /// Load the ONNX model, tokenizer, and label config from `model_dir`.
    ///
    /// Call `download::download_model()` first if the files don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_file(model_dir).with_context(|| {
            format!(
                "No ONNX model found in {}\nRun `berta download-model` to download it.",
                model_dir.display()
            )
        })?;
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let config_path = model_dir.join(CONFIG_FILE);

        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nRun `berta download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let labels = if config_path.exists() {
            LabelConfig::from_file(&config_path)?
        } else {
            LabelConfig::default()
        };

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let pad_id = labels
            .pad_token_id
            .or_else(|| tokenizer.get_padding().map(|p| p.pad_id))
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0);

        let indices = labels.class_indices();
        debug!(
            model = %model_path.display(),
            entailment_index = indices.entailment,
            pad_id,
            "Loaded ONNX entailment model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(Mutex::new(tokenizer)),
            indices,
            pad_id,
        })
    }

    /// Column of the entailment class in the model output.
    pub fn entailment_index(&self) -> usize {
        self.indices.entailment
    }
}

#[async_trait]
impl EntailmentModel for OnnxEntailmentModel {
    async fn class_probs(
        &self,
        pairs: &[(String, String)],
        max_length: usize,
    ) -> Result<Vec<ClassProbs>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let pairs = pairs.to_vec();
        let indices = self.indices;
        let pad_id = self.pad_id;

        tokio::task::spawn_blocking(move || {
            let (input_ids, attention_mask, max_len) =
                encode_pairs(&tokenizer, &pairs, max_length, pad_id)?;
            let batch_size = pairs.len();
            let shape = [batch_size as i64, max_len as i64];

            let input_ids_tensor = Tensor::from_array((shape, input_ids))
                .context("Failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
                .context("Failed to create attention_mask tensor")?;

            let logits = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! {
                        "input_ids" => input_ids_tensor,
                        "attention_mask" => attention_mask_tensor
                    })
                    .context("ONNX inference failed")?;

                // Output shape: [batch_size, num_labels], raw logits
                let (_out_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;

                data.to_vec()
            };

            logits_to_probs(&logits, batch_size, &indices)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Tokenize pairs with truncation and right-pad to the batch maximum.
/// Returns flat (input_ids, attention_mask) and the padded length.
fn encode_pairs(
    tokenizer: &Mutex<Tokenizer>,
    pairs: &[(String, String)],
    max_length: usize,
    pad_id: u32,
) -> Result<(Vec<i64>, Vec<i64>, usize)> {
    let mut tokenizer = tokenizer
        .lock()
        .map_err(|e| anyhow::anyhow!("Tokenizer lock poisoned: {}", e))?;

    if tokenizer.get_truncation().map(|t| t.max_length) != Some(max_length) {
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                strategy: TruncationStrategy::LongestFirst,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to set truncation: {}", e))?;
    }

    let encodings = pairs
        .iter()
        .map(|(premise, hypothesis)| {
            tokenizer
                .encode((premise.as_str(), hypothesis.as_str()), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    let mut input_ids = Vec::with_capacity(encodings.len() * max_len);
    let mut attention_mask = Vec::with_capacity(encodings.len() * max_len);
    for enc in &encodings {
        input_ids.extend(enc.get_ids().iter().map(|&id| id as i64));
        attention_mask.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
        for _ in enc.get_ids().len()..max_len {
            input_ids.push(pad_id as i64);
            attention_mask.push(0);
        }
    }

    Ok((input_ids, attention_mask, max_len))
}

/// Split flat logits into rows, softmax each, and pick out the three classes.
fn logits_to_probs(
    logits: &[f32],
    batch_size: usize,
    indices: &ClassIndices,
) -> Result<Vec<ClassProbs>> {
    if batch_size == 0 || logits.is_empty() || logits.len() % batch_size != 0 {
        anyhow::bail!(
            "Model returned {} logits for a batch of {}",
            logits.len(),
            batch_size
        );
    }
    let width = logits.len() / batch_size;

    logits
        .chunks(width)
        .map(|row| {
            let row: Vec<f64> = row.iter().map(|&l| l as f64).collect();
            let probs = softmax(&row);
            ClassProbs::from_row(&probs, indices).ok_or_else(|| {
                anyhow::anyhow!(
                    "Model produced {} classes, label map expects index {}",
                    width,
                    indices.entailment.max(indices.neutral).max(indices.contradiction)
                )
            })
        })
        .collect()
}
