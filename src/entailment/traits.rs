// Entailment model trait — the black-box NLI collaborator.
//
// An implementation maps (premise, hypothesis) pairs to a probability
// distribution over {contradiction, neutral, entailment}. Only the
// entailment column feeds relevance scoring.

use anyhow::Result;
use async_trait::async_trait;

/// Softmax output for a single (premise, hypothesis) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbs {
    pub contradiction: f64,
    pub neutral: f64,
    pub entailment: f64,
}

impl ClassProbs {
    /// Build from a probability row using the model's label indices.
    ///
    /// Returns None if any index is out of range for the row.
    pub fn from_row(row: &[f64], indices: &ClassIndices) -> Option<Self> {
        Some(Self {
            contradiction: *row.get(indices.contradiction)?,
            neutral: *row.get(indices.neutral)?,
            entailment: *row.get(indices.entailment)?,
        })
    }
}

/// Column positions of the three NLI classes in the model's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassIndices {
    pub contradiction: usize,
    pub neutral: usize,
    pub entailment: usize,
}

impl Default for ClassIndices {
    /// Fallback when the model config has no usable label map: entailment
    /// in the last column.
    fn default() -> Self {
        Self {
            contradiction: 0,
            neutral: 1,
            entailment: 2,
        }
    }
}

/// Trait for NLI backends. Async because inference is CPU-bound and gets
/// offloaded to a blocking thread.
#[async_trait]
pub trait EntailmentModel: Send + Sync {
    /// Full class distribution for each pair, in input order.
    ///
    /// `max_length` is the token budget per pair; longer inputs are truncated.
    async fn class_probs(
        &self,
        pairs: &[(String, String)],
        max_length: usize,
    ) -> Result<Vec<ClassProbs>>;

    /// Entailment probability for each pair, in input order.
    async fn entailment_batch(
        &self,
        pairs: &[(String, String)],
        max_length: usize,
    ) -> Result<Vec<f64>> {
        let probs = self.class_probs(pairs, max_length).await?;
        Ok(probs.into_iter().map(|p| p.entailment).collect())
    }
}

/// Numerically stable softmax over a row of logits.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
