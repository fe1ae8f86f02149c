// Multi-hypothesis relevance scorer.
//
// Each text's score is the running maximum entailment probability across
// the hypotheses it was evaluated against. Once a text's score crosses the
// threshold it is confirmed relevant and drops out of later hypotheses.
// That skip never changes the relevant/irrelevant outcome, only how far
// above the threshold the final number lands.
//
// Processing is strictly sequential: hypotheses in bank order, batches in
// index order, one awaited model call at a time.

use std::collections::BTreeSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::error::ScoreError;
use crate::entailment::traits::EntailmentModel;

/// Tunables for a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOptions {
    /// Pairs per model call (>= 1).
    pub batch_size: usize,
    /// Entailment probability a text must exceed (strictly) to be relevant.
    pub threshold: f64,
    /// Token budget per (text, hypothesis) pair.
    pub max_length: usize,
    /// Keep evaluating relevant texts against every hypothesis, so scores
    /// are the true maximum over the whole bank.
    pub exhaustive: bool,
    /// Draw a progress bar over hypotheses.
    pub show_progress: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            threshold: 0.4,
            max_length: 256,
            exhaustive: false,
            show_progress: false,
        }
    }
}

impl ScoringOptions {
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.batch_size == 0 {
            return Err(ScoreError::invalid("batch_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ScoreError::invalid(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.max_length == 0 {
            return Err(ScoreError::invalid("max_length must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    /// One score per input text, in input order, each in [0, 1].
    pub scores: Vec<f64>,
    /// Indices of texts whose score exceeded the threshold, ascending.
    pub relevant: Vec<usize>,
    /// Hypotheses actually run before the bank was exhausted or every text
    /// was confirmed relevant.
    pub hypotheses_evaluated: usize,
    /// Number of model calls issued.
    pub model_calls: usize,
}

impl ScoreReport {
    pub fn relevant_count(&self) -> usize {
        self.relevant.len()
    }
}

/// Score texts that may be missing. `None` is scored as the empty string.
pub async fn score_optional(
    texts: &[Option<String>],
    hypotheses: &[String],
    model: &dyn EntailmentModel,
    options: &ScoringOptions,
) -> Result<ScoreReport, ScoreError> {
    let texts: Vec<String> = texts
        .iter()
        .map(|t| t.clone().unwrap_or_default())
        .collect();
    score(&texts, hypotheses, model, options).await
}

/// Score each text by its best entailment probability across `hypotheses`.
///
/// Empty texts are valid input and get scored like any other. A model
/// failure aborts the whole run with `ScoreError::Inference`.
pub async fn score(
    texts: &[String],
    hypotheses: &[String],
    model: &dyn EntailmentModel,
    options: &ScoringOptions,
) -> Result<ScoreReport, ScoreError> {
    options.validate()?;
    if hypotheses.is_empty() {
        return Err(ScoreError::invalid("hypothesis bank is empty"));
    }
    if let Some(pos) = hypotheses.iter().position(|h| h.trim().is_empty()) {
        return Err(ScoreError::invalid(format!("hypothesis {pos} is blank")));
    }

    let n_texts = texts.len();
    let mut scores = vec![0.0_f64; n_texts];
    let mut relevant: BTreeSet<usize> = BTreeSet::new();
    let mut hypotheses_evaluated = 0;
    let mut model_calls = 0;

    info!(
        texts = n_texts,
        hypotheses = hypotheses.len(),
        batch_size = options.batch_size,
        threshold = options.threshold,
        exhaustive = options.exhaustive,
        "Scoring texts against hypothesis bank"
    );

    let pb = progress_bar(hypotheses.len(), options.show_progress);

    for (hyp_idx, hypothesis) in hypotheses.iter().enumerate() {
        if !options.exhaustive && relevant.len() == n_texts {
            info!(
                after = hyp_idx,
                "All texts classified relevant, skipping remaining hypotheses"
            );
            break;
        }

        // Selection happens once per hypothesis, before batching, so batch
        // boundaries can't influence which texts are evaluated.
        let pending: Vec<usize> = (0..n_texts)
            .filter(|i| options.exhaustive || !relevant.contains(i))
            .collect();

        debug!(hypothesis = hyp_idx, pending = pending.len(), "Evaluating hypothesis");

        for batch in pending.chunks(options.batch_size) {
            let pairs: Vec<(String, String)> = batch
                .iter()
                .map(|&i| (texts[i].clone(), hypothesis.clone()))
                .collect();

            let probs = model
                .entailment_batch(&pairs, options.max_length)
                .await
                .map_err(|source| ScoreError::Inference {
                    hypothesis_index: hyp_idx,
                    source,
                })?;
            model_calls += 1;

            check_batch(&probs, batch.len(), hyp_idx)?;

            for (&idx, &p) in batch.iter().zip(&probs) {
                if p > scores[idx] {
                    scores[idx] = p;
                    if scores[idx] > options.threshold {
                        relevant.insert(idx);
                    }
                }
            }
        }

        hypotheses_evaluated += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        relevant = relevant.len(),
        total = n_texts,
        hypotheses_evaluated,
        model_calls,
        "Scoring complete"
    );

    Ok(ScoreReport {
        scores,
        relevant: relevant.into_iter().collect(),
        hypotheses_evaluated,
        model_calls,
    })
}

/// The model must return one finite probability in [0, 1] per pair.
fn check_batch(probs: &[f64], expected: usize, hyp_idx: usize) -> Result<(), ScoreError> {
    if probs.len() != expected {
        return Err(ScoreError::Inference {
            hypothesis_index: hyp_idx,
            source: anyhow::anyhow!(
                "model returned {} scores for a batch of {}",
                probs.len(),
                expected
            ),
        });
    }
    if let Some(bad) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ScoreError::Inference {
            hypothesis_index: hyp_idx,
            source: anyhow::anyhow!("model returned out-of-range probability {bad}"),
        });
    }
    Ok(())
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("  Hypotheses [{bar:30}] {pos}/{len} ({eta})")
    {
        pb.set_style(style);
    }
    pb
}
