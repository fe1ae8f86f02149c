// Typed Q&A records and labeled output rows.

use anyhow::Result;

use super::{Corpus, ANSWER_COLUMN, TITLE_COLUMN};

/// Per-field max entailment score for the title.
pub const TITLE_SCORE_COLUMN: &str = "Title_Entailment";
/// Per-field max entailment score for the answer.
pub const ANSWER_SCORE_COLUMN: &str = "Answer_Entailment";
/// Final relevance decision.
pub const LABEL_COLUMN: &str = "Relevant_to_Education_in_UAE";

/// One scraped question/answer pair. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QaRecord {
    pub title: Option<String>,
    pub answer: Option<String>,
}

impl QaRecord {
    /// Map a corpus with `Title` and `Answer` columns into typed records.
    pub fn from_corpus(corpus: &Corpus) -> Result<Vec<Self>> {
        let titles = corpus.column(TITLE_COLUMN)?;
        let answers = corpus.column(ANSWER_COLUMN)?;
        Ok(titles
            .into_iter()
            .zip(answers)
            .map(|(title, answer)| Self { title, answer })
            .collect())
    }
}

/// Scores and decision for one corpus row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLabel {
    pub title_score: f64,
    pub answer_score: f64,
    pub relevant: bool,
}

/// The corpus with the three label columns appended.
///
/// With `only_relevant`, rows labeled irrelevant are left out.
pub fn labeled_corpus(corpus: &Corpus, labels: &[RowLabel], only_relevant: bool) -> Result<Corpus> {
    if labels.len() != corpus.len() {
        anyhow::bail!(
            "{} labels for a corpus of {} rows",
            labels.len(),
            corpus.len()
        );
    }

    let mut headers = corpus.headers.clone();
    headers.extend(
        [TITLE_SCORE_COLUMN, ANSWER_SCORE_COLUMN, LABEL_COLUMN]
            .iter()
            .map(|c| c.to_string()),
    );

    let rows = corpus
        .rows
        .iter()
        .zip(labels)
        .filter(|(_, label)| !only_relevant || label.relevant)
        .map(|(row, label)| {
            let mut row = row.clone();
            row.push(label.title_score.to_string());
            row.push(label.answer_score.to_string());
            row.push(if label.relevant { "True" } else { "False" }.to_string());
            row
        })
        .collect();

    Corpus::new(headers, rows)
}
