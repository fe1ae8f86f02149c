use super::error::ScoreError;

/// A record is relevant when either of its field scores strictly exceeds
/// the threshold.
pub fn decide(score_a: f64, score_b: f64, threshold: f64) -> bool {
    score_a > threshold || score_b > threshold
}

/// Apply `decide` across two aligned score vectors.
pub fn decide_all(
    scores_a: &[f64],
    scores_b: &[f64],
    threshold: f64,
) -> Result<Vec<bool>, ScoreError> {
    if scores_a.len() != scores_b.len() {
        return Err(ScoreError::invalid(format!(
            "score vectors are misaligned: {} vs {}",
            scores_a.len(),
            scores_b.len()
        )));
    }
    Ok(scores_a
        .iter()
        .zip(scores_b)
        .map(|(&a, &b)| decide(a, b, threshold))
        .collect())
}
