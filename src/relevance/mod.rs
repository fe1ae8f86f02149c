// Relevance scoring — zero-shot topic classification via NLI entailment.
//
// scorer: best-matching entailment probability per text across a hypothesis
//         bank, with early stopping once a text crosses the threshold
// decision: combine per-field scores into one relevant/irrelevant label
// hypotheses: the built-in UAE education bank and file loading

pub mod decision;
pub mod error;
pub mod hypotheses;
pub mod scorer;
