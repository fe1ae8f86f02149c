// Unit tests for the relevance scorer.
//
// Drives `score` with deterministic fake models and checks the properties
// the classification pipeline depends on: score range, running-max
// monotonicity, early stopping, batch-size invariance, and error handling.

mod common;

use std::collections::HashSet;

use berta::relevance::error::ScoreError;
use berta::relevance::scorer::{score, score_optional, ScoringOptions};
use common::{hashed_score, keyword_model, FnModel};

const EDUCATION: &str = "This text is about education in the UAE.";
const FOOD: &str = "This text is about food.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn corpus() -> Vec<String> {
    strings(&[
        "Dubai school fees are rising",
        "I like pizza",
        "",
        "Which university in Sharjah has the best tuition?",
        "The weather in Ajman is hot",
        "Best shawarma restaurant near KHDA offices",
        "Traffic on Sheikh Zayed Road",
        "My kids' school bus is always late",
        "Visa renewal took three weeks",
        "Looking for a pizza place with school discounts",
    ])
}

fn hypotheses() -> Vec<String> {
    strings(&[
        EDUCATION,
        FOOD,
        "This text is about school fees in Dubai.",
        "This text is about traffic.",
    ])
}

fn opts(batch_size: usize, threshold: f64) -> ScoringOptions {
    ScoringOptions {
        batch_size,
        threshold,
        ..Default::default()
    }
}

// ============================================================
// End-to-end scenario
// ============================================================

#[tokio::test]
async fn education_and_food_scenario() {
    let model = keyword_model();
    let texts = strings(&["Dubai school fees are rising", "I like pizza"]);
    let bank = strings(&[EDUCATION, FOOD]);

    let report = score(&texts, &bank, &model, &opts(32, 0.4)).await.unwrap();
    assert!(report.scores[0] > 0.4);
    assert!(report.relevant.contains(&0));

    // Against the education hypothesis alone, pizza is irrelevant
    let edu_only = strings(&[EDUCATION]);
    let report = score(&texts, &edu_only, &model, &opts(32, 0.4)).await.unwrap();
    assert!(report.scores[1] < 0.4);
    assert_eq!(report.relevant, vec![0]);
}

// ============================================================
// Score range and alignment
// ============================================================

#[tokio::test]
async fn scores_in_unit_interval_and_aligned() {
    let model = FnModel::new(hashed_score);
    let texts = corpus();
    let report = score(&texts, &hypotheses(), &model, &opts(4, 0.4))
        .await
        .unwrap();
    assert_eq!(report.scores.len(), texts.len());
    for s in &report.scores {
        assert!((0.0..=1.0).contains(s), "score {s} out of range");
    }
}

#[tokio::test]
async fn empty_corpus_makes_no_model_calls() {
    let model = keyword_model();
    let report = score(&[], &hypotheses(), &model, &opts(8, 0.4)).await.unwrap();
    assert!(report.scores.is_empty());
    assert_eq!(report.model_calls, 0);
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn empty_text_is_scored_not_skipped() {
    let model = FnModel::new(|premise, _| if premise.is_empty() { 0.2 } else { 0.1 });
    let texts = strings(&["", "something"]);
    let report = score(&texts, &strings(&[EDUCATION]), &model, &opts(8, 0.4))
        .await
        .unwrap();
    assert!((report.scores[0] - 0.2).abs() < 1e-12);
    assert_eq!(model.premises_for(EDUCATION), texts);
}

#[tokio::test]
async fn missing_texts_are_scored_as_empty() {
    let model = FnModel::new(|premise, _| if premise.is_empty() { 0.3 } else { 0.6 });
    let texts = vec![None, Some("Abu Dhabi schools".to_string())];
    let report = score_optional(&texts, &strings(&[EDUCATION]), &model, &opts(8, 0.9))
        .await
        .unwrap();
    assert_eq!(report.scores, vec![0.3, 0.6]);
    assert_eq!(model.premises_for(EDUCATION)[0], "");
}

// ============================================================
// Running maximum and early stopping
// ============================================================

#[tokio::test]
async fn score_is_running_maximum_below_threshold() {
    // Nothing crosses 0.9, so every hypothesis is evaluated for every text
    let model = FnModel::new(|_, h| match h {
        "a" => 0.3,
        "b" => 0.7,
        _ => 0.5,
    });
    let report = score(&strings(&["t"]), &strings(&["a", "b", "c"]), &model, &opts(1, 0.9))
        .await
        .unwrap();
    assert!((report.scores[0] - 0.7).abs() < 1e-12);
    assert_eq!(report.hypotheses_evaluated, 3);
    assert!(report.relevant.is_empty());
}

#[tokio::test]
async fn early_stop_keeps_first_crossing_score() {
    // "first" crosses 0.4 on hypothesis a; b would score it higher but it
    // is never evaluated against b.
    let model = FnModel::new(|p, h| match (p, h) {
        ("first", "a") => 0.6,
        ("first", "b") => 0.95,
        (_, "a") => 0.1,
        (_, "b") => 0.2,
        _ => 0.0,
    });
    let texts = strings(&["first", "second"]);
    let report = score(&texts, &strings(&["a", "b"]), &model, &opts(8, 0.4))
        .await
        .unwrap();

    assert!((report.scores[0] - 0.6).abs() < 1e-12);
    assert!((report.scores[1] - 0.2).abs() < 1e-12);
    assert_eq!(model.premises_for("b"), vec!["second".to_string()]);
    assert_eq!(report.relevant, vec![0]);
}

#[tokio::test]
async fn threshold_crossing_is_strict() {
    let model = FnModel::new(|_, h| if h == "a" { 0.4 } else { 0.0 });
    let report = score(&strings(&["t"]), &strings(&["a", "b"]), &model, &opts(8, 0.4))
        .await
        .unwrap();
    assert!(report.relevant.is_empty());
    // Still pending, so evaluated against b too
    assert_eq!(model.premises_for("b").len(), 1);
}

#[tokio::test]
async fn stops_once_every_text_is_relevant() {
    let model = FnModel::new(|_, _| 0.99);
    let texts = corpus();
    let report = score(&texts, &hypotheses(), &model, &opts(4, 0.4))
        .await
        .unwrap();
    assert_eq!(report.hypotheses_evaluated, 1);
    assert_eq!(report.relevant.len(), texts.len());
    // ceil(10 / 4) batches for the first hypothesis only
    assert_eq!(report.model_calls, 3);
    assert!(model.premises_for(FOOD).is_empty());
}

#[tokio::test]
async fn exhaustive_mode_reports_true_maximum() {
    let model = FnModel::new(|_, h| if h == "a" { 0.6 } else { 0.95 });
    let options = ScoringOptions {
        exhaustive: true,
        ..opts(8, 0.4)
    };
    let report = score(&strings(&["t"]), &strings(&["a", "b"]), &model, &options)
        .await
        .unwrap();
    assert!((report.scores[0] - 0.95).abs() < 1e-12);
    assert_eq!(report.relevant, vec![0]);
    assert_eq!(report.hypotheses_evaluated, 2);
}

#[tokio::test]
async fn exhaustive_and_early_stop_agree_on_classification() {
    let texts = corpus();
    let early = score(&texts, &hypotheses(), &FnModel::new(hashed_score), &opts(3, 0.5))
        .await
        .unwrap();
    let options = ScoringOptions {
        exhaustive: true,
        ..opts(3, 0.5)
    };
    let full = score(&texts, &hypotheses(), &FnModel::new(hashed_score), &options)
        .await
        .unwrap();
    assert_eq!(early.relevant, full.relevant);
    for (e, f) in early.scores.iter().zip(&full.scores) {
        assert!(e <= f);
    }
}

// ============================================================
// Invariance properties
// ============================================================

#[tokio::test]
async fn appending_hypothesis_never_lowers_scores() {
    let texts = corpus();
    let bank = hypotheses();
    let mut extended = bank.clone();
    extended.push("This text is about tuition.".to_string());

    let before = score(&texts, &bank, &FnModel::new(hashed_score), &opts(4, 0.6))
        .await
        .unwrap();
    let after = score(&texts, &extended, &FnModel::new(hashed_score), &opts(4, 0.6))
        .await
        .unwrap();

    for (b, a) in before.scores.iter().zip(&after.scores) {
        assert!(a >= b, "score dropped from {b} to {a}");
    }
}

#[tokio::test]
async fn classification_invariant_under_hypothesis_order() {
    let texts = corpus();
    let bank = hypotheses();
    let mut reversed = bank.clone();
    reversed.reverse();

    let forward = score(&texts, &bank, &FnModel::new(hashed_score), &opts(4, 0.5))
        .await
        .unwrap();
    let backward = score(&texts, &reversed, &FnModel::new(hashed_score), &opts(4, 0.5))
        .await
        .unwrap();

    let a: HashSet<usize> = forward.relevant.into_iter().collect();
    let b: HashSet<usize> = backward.relevant.into_iter().collect();
    assert_eq!(a, b);
}

#[tokio::test]
async fn batch_size_does_not_change_scores() {
    let texts = corpus();
    let bank = hypotheses();

    let mut results = Vec::new();
    for batch_size in [1, 3, 32] {
        let model = FnModel::new(hashed_score);
        let report = score(&texts, &bank, &model, &opts(batch_size, 0.5))
            .await
            .unwrap();
        assert!(model.calls().iter().all(|c| c.len() <= batch_size));
        results.push(report);
    }

    for r in &results[1..] {
        assert_eq!(r.scores, results[0].scores);
        assert_eq!(r.relevant, results[0].relevant);
    }
}

#[tokio::test]
async fn partial_last_batch_is_evaluated() {
    let model = FnModel::new(|_, _| 0.1);
    let texts = corpus(); // 10 texts, batch of 4 -> 4 + 4 + 2
    score(&texts, &strings(&[EDUCATION]), &model, &opts(4, 0.4))
        .await
        .unwrap();
    let sizes: Vec<usize> = model.calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(model.premises_for(EDUCATION), texts);
}

// ============================================================
// Errors
// ============================================================

#[tokio::test]
async fn empty_hypothesis_bank_is_invalid() {
    let model = keyword_model();
    let err = score(&corpus(), &[], &model, &opts(8, 0.4)).await.unwrap_err();
    assert!(matches!(err, ScoreError::InvalidInput(_)));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn blank_hypothesis_is_invalid() {
    let model = keyword_model();
    let bank = strings(&[EDUCATION, "   "]);
    let err = score(&corpus(), &bank, &model, &opts(8, 0.4)).await.unwrap_err();
    assert!(matches!(err, ScoreError::InvalidInput(_)));
}

#[tokio::test]
async fn zero_batch_size_is_invalid() {
    let err = score(&corpus(), &hypotheses(), &keyword_model(), &opts(0, 0.4))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoreError::InvalidInput(_)));
}

struct FailingModel {
    fail_on: &'static str,
}

#[async_trait::async_trait]
impl berta::entailment::traits::EntailmentModel for FailingModel {
    async fn class_probs(
        &self,
        pairs: &[(String, String)],
        _max_length: usize,
    ) -> anyhow::Result<Vec<berta::entailment::traits::ClassProbs>> {
        if pairs.iter().any(|(_, h)| h == self.fail_on) {
            anyhow::bail!("out of memory");
        }
        Ok(pairs
            .iter()
            .map(|_| berta::entailment::traits::ClassProbs {
                contradiction: 0.45,
                neutral: 0.45,
                entailment: 0.1,
            })
            .collect())
    }
}

#[tokio::test]
async fn model_failure_aborts_run() {
    let model = FailingModel { fail_on: FOOD };
    let err = score(&corpus(), &hypotheses(), &model, &opts(8, 0.4))
        .await
        .unwrap_err();
    match err {
        ScoreError::Inference {
            hypothesis_index, ..
        } => assert_eq!(hypothesis_index, 1),
        other => panic!("expected inference error, got {other:?}"),
    }
}

struct ShortModel;

#[async_trait::async_trait]
impl berta::entailment::traits::EntailmentModel for ShortModel {
    async fn class_probs(
        &self,
        _pairs: &[(String, String)],
        _max_length: usize,
    ) -> anyhow::Result<Vec<berta::entailment::traits::ClassProbs>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn short_model_output_is_inference_error() {
    let err = score(&corpus(), &hypotheses(), &ShortModel, &opts(8, 0.4))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoreError::Inference { .. }));
}
