// Entailment scoring — trait-based abstraction over the NLI model.
//
// The EntailmentModel trait is the only thing the relevance scorer knows
// about. OnnxEntailmentModel implements it with a local mDeBERTa export;
// tests swap in deterministic fakes.

pub mod download;
pub mod labels;
pub mod onnx;
pub mod traits;
