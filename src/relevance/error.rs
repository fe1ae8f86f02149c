use thiserror::Error;

/// Failures of a scoring run. None of these are retried; each aborts the
/// run, since a partially scored corpus would mix texts evaluated against
/// different subsets of the hypothesis bank.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Malformed corpus, hypothesis bank, or options. Nothing was scored.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The entailment model call failed or returned unusable output.
    #[error("inference failed on hypothesis {hypothesis_index}: {source}")]
    Inference {
        hypothesis_index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Reading or writing corpus or hypothesis files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
