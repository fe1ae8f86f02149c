// Seeded random sampling for trial runs on a subset of the corpus.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::Corpus;

/// Seed used when none is given, so repeated trial runs see the same rows.
pub const DEFAULT_SEED: u64 = 42;

/// Draw `n` distinct rows at random. Returns a copy of the whole corpus
/// when it has `n` rows or fewer.
pub fn sample(corpus: &Corpus, n: usize, seed: u64) -> Corpus {
    if corpus.len() <= n {
        return corpus.clone();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let indices = rand::seq::index::sample(&mut rng, corpus.len(), n).into_vec();
    corpus.select_rows(&indices)
}
