// Label configuration from a HuggingFace `config.json`.
//
// The entailment column is looked up once from the model's label map
// rather than assumed. Exports disagree on ordering: mDeBERTa puts
// entailment first, roberta-large-mnli puts it last.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::ClassIndices;

/// Column used for entailment when the label map doesn't name it.
pub const FALLBACK_ENTAILMENT_INDEX: usize = 2;

/// The subset of `config.json` we care about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub label2id: HashMap<String, usize>,
    /// JSON object keys are always strings, so ids arrive as "0", "1", ...
    #[serde(default)]
    pub id2label: HashMap<String, String>,
    #[serde(default)]
    pub pad_token_id: Option<u32>,
}

impl LabelConfig {
    /// Read `config.json` from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model config {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse model config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Find the output column for a label name, checking `label2id` first
    /// and `id2label` second. Matching is case-insensitive.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        let by_name = self
            .label2id
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, &id)| id);
        if by_name.is_some() {
            return by_name;
        }
        self.id2label
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(label))
            .and_then(|(id, _)| id.parse().ok())
    }

    /// Column of the entailment class, or `FALLBACK_ENTAILMENT_INDEX`.
    pub fn entailment_index(&self) -> usize {
        match self.index_of("entailment") {
            Some(idx) => idx,
            None => {
                warn!(
                    fallback = FALLBACK_ENTAILMENT_INDEX,
                    "No 'entailment' label in model config, using fallback index"
                );
                FALLBACK_ENTAILMENT_INDEX
            }
        }
    }

    /// All three class columns. Missing labels keep their default position.
    pub fn class_indices(&self) -> ClassIndices {
        let defaults = ClassIndices::default();
        let indices = ClassIndices {
            contradiction: self
                .index_of("contradiction")
                .unwrap_or(defaults.contradiction),
            neutral: self.index_of("neutral").unwrap_or(defaults.neutral),
            entailment: self.entailment_index(),
        };
        debug!(?indices, "Resolved NLI label indices");
        indices
    }

    /// Number of output classes, as declared by the label map.
    pub fn num_labels(&self) -> usize {
        self.label2id.len().max(self.id2label.len()).max(3)
    }
}
