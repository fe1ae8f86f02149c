// berta: zero-shot relevance filtering for scraped UAE education Q&A data
//
// This is the library root. Each module corresponds to one stage of the
// filtering pipeline: cleaning, NLI scoring, labeling, and output.

pub mod clean;
pub mod config;
pub mod dataset;
pub mod entailment;
pub mod output;
pub mod pipeline;
pub mod relevance;
pub mod status;
