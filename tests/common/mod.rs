// Deterministic entailment fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use berta::entailment::traits::{ClassProbs, EntailmentModel};

type ScoreFn = Box<dyn Fn(&str, &str) -> f64 + Send + Sync>;

/// Scores each pair with a closure and records every batch it was asked for.
pub struct FnModel {
    score_fn: ScoreFn,
    calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl FnModel {
    pub fn new(score_fn: impl Fn(&str, &str) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            score_fn: Box::new(score_fn),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every batch received, in call order.
    pub fn calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls.lock().unwrap().clone()
    }

    /// Premises evaluated against `hypothesis`, across all batches.
    pub fn premises_for(&self, hypothesis: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .flatten()
            .filter(|(_, h)| h == hypothesis)
            .map(|(p, _)| p)
            .collect()
    }
}

#[async_trait]
impl EntailmentModel for FnModel {
    async fn class_probs(
        &self,
        pairs: &[(String, String)],
        _max_length: usize,
    ) -> Result<Vec<ClassProbs>> {
        self.calls.lock().unwrap().push(pairs.to_vec());
        Ok(pairs
            .iter()
            .map(|(premise, hypothesis)| {
                let entailment = (self.score_fn)(premise, hypothesis);
                let rest = (1.0 - entailment) / 2.0;
                ClassProbs {
                    contradiction: rest,
                    neutral: rest,
                    entailment,
                }
            })
            .collect())
    }
}

/// Topic keywords per hypothesis: high entailment when the premise mentions
/// one of the hypothesis's keywords, low otherwise.
pub fn keyword_model() -> FnModel {
    FnModel::new(|premise, hypothesis| {
        let premise = premise.to_lowercase();
        let keywords: &[&str] = if hypothesis.contains("education") {
            &["school", "university", "tuition", "khda"]
        } else if hypothesis.contains("food") {
            &["pizza", "restaurant", "shawarma"]
        } else if hypothesis.contains("fees") {
            &["fees", "tuition"]
        } else {
            &[]
        };
        if keywords.iter().any(|k| premise.contains(k)) {
            0.92
        } else {
            0.05
        }
    })
}

/// Stable pseudo-random score in [0, 1) from the pair's bytes.
pub fn hashed_score(premise: &str, hypothesis: &str) -> f64 {
    let mut h: u64 = 1469598103934665603;
    for b in premise.bytes().chain([0u8]).chain(hypothesis.bytes()) {
        h ^= b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    (h % 10_000) as f64 / 10_000.0
}
