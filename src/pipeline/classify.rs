// Classification pipeline: score titles and answers, label each row.
//
// Titles and answers are scored independently against the same hypothesis
// bank (each with its own early-stopping state), then combined per row:
// a record is relevant if either field crosses the threshold.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::dataset::records::{labeled_corpus, QaRecord, RowLabel};
use crate::dataset::sample::sample;
use crate::dataset::Corpus;
use crate::entailment::traits::EntailmentModel;
use crate::relevance::decision::decide_all;
use crate::relevance::scorer::{score_optional, ScoreReport, ScoringOptions};

/// Labels plus the per-field scoring reports for one corpus.
#[derive(Debug, Clone)]
pub struct ClassifyOutcome {
    pub labels: Vec<RowLabel>,
    pub title: ScoreReport,
    pub answer: ScoreReport,
    pub summary: Summary,
}

/// Counts shown at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub relevant: usize,
    pub title_relevant: usize,
    pub answer_relevant: usize,
    pub threshold: f64,
}

impl Summary {
    /// Share of rows labeled relevant, in percent.
    pub fn relevant_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.relevant as f64 / self.total as f64 * 100.0
        }
    }
}

/// Score the `Title` and `Answer` columns and label every row.
pub async fn run(
    model: &dyn EntailmentModel,
    corpus: &Corpus,
    hypotheses: &[String],
    options: &ScoringOptions,
) -> Result<ClassifyOutcome> {
    let records = QaRecord::from_corpus(corpus)?;
    let titles: Vec<Option<String>> = records.iter().map(|r| r.title.clone()).collect();
    let answers: Vec<Option<String>> = records.into_iter().map(|r| r.answer).collect();

    println!("\nProcessing titles...");
    let title = score_optional(&titles, hypotheses, model, options)
        .await
        .context("Scoring titles failed")?;

    println!("\nProcessing answers...");
    let answer = score_optional(&answers, hypotheses, model, options)
        .await
        .context("Scoring answers failed")?;

    let decisions = decide_all(&title.scores, &answer.scores, options.threshold)?;
    let labels: Vec<RowLabel> = title
        .scores
        .iter()
        .zip(&answer.scores)
        .zip(&decisions)
        .map(|((&title_score, &answer_score), &relevant)| RowLabel {
            title_score,
            answer_score,
            relevant,
        })
        .collect();

    let summary = Summary {
        total: labels.len(),
        relevant: decisions.iter().filter(|&&r| r).count(),
        title_relevant: title.relevant_count(),
        answer_relevant: answer.relevant_count(),
        threshold: options.threshold,
    };

    info!(
        total = summary.total,
        relevant = summary.relevant,
        title_relevant = summary.title_relevant,
        answer_relevant = summary.answer_relevant,
        "Classification complete"
    );

    Ok(ClassifyOutcome {
        labels,
        title,
        answer,
        summary,
    })
}

/// Classify a seeded random sample before committing to the full corpus.
///
/// Returns None when the corpus is no larger than the sample, since the
/// full run covers it anyway.
pub async fn run_trial(
    model: &dyn EntailmentModel,
    corpus: &Corpus,
    hypotheses: &[String],
    options: &ScoringOptions,
    sample_size: usize,
    seed: u64,
) -> Result<Option<(Corpus, ClassifyOutcome)>> {
    if corpus.len() <= sample_size {
        return Ok(None);
    }
    println!("Testing on {sample_size} samples first...");
    let sampled = sample(corpus, sample_size, seed);
    let outcome = run(model, &sampled, hypotheses, options).await?;
    Ok(Some((sampled, outcome)))
}

/// Write the fully labeled corpus and, if given, the relevant-only subset.
pub fn write_outputs(
    corpus: &Corpus,
    outcome: &ClassifyOutcome,
    labeled_path: &Path,
    relevant_path: Option<&Path>,
) -> Result<()> {
    labeled_corpus(corpus, &outcome.labels, false)?.write_path(labeled_path)?;
    info!(path = %labeled_path.display(), "Wrote labeled corpus");

    if let Some(path) = relevant_path {
        labeled_corpus(corpus, &outcome.labels, true)?.write_path(path)?;
        info!(path = %path.display(), "Wrote relevant rows");
    }
    Ok(())
}
