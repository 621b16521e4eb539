use std::collections::HashSet;

use crate::dataset::Example;
use crate::embedding::{cosine_similarity, WordEmbeddings};

/// Counts token pairs where a token from the first sentence equals a token
/// from the second. Every occurrence counts, so repeated tokens inflate the
/// score: two identical five-token sentences sharing a repeated "the" score
/// 7, not 5. Higher is more similar.
pub fn matching_word_pairs(a: &Example, b: &Example) -> u32 {
    let mut matches = 0;
    for token_a in &a.tokens {
        for token_b in &b.tokens {
            if token_a == token_b {
                matches += 1;
            }
        }
    }
    matches
}

/// Jaccard similarity of the two token sets: |A ∩ B| / |A ∪ B|, in [0, 1].
/// Two empty token sets score 0.0 by convention. Higher is more similar.
pub fn token_jaccard(a: &Example, b: &Example) -> f64 {
    let set_a: HashSet<&str> = a.tokens.iter().map(|t| t.as_str()).collect();
    let set_b: HashSet<&str> = b.tokens.iter().map(|t| t.as_str()).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Sums the embedding word similarity over every token pair where both
/// tokens are in vocabulary. Out-of-vocabulary tokens are skipped; if no
/// pair qualifies the score is 0.0. Higher is more similar.
pub fn embedding_word_similarity(a: &Example, b: &Example, embeddings: &WordEmbeddings) -> f64 {
    let mut cumulative = 0.0;
    for token_a in &a.tokens {
        for token_b in &b.tokens {
            if let Some(similarity) = embeddings.similarity(token_a, token_b) {
                cumulative += similarity;
            }
        }
    }
    cumulative
}

/// Cosine *distance* between the two sentences' summed token vectors, so
/// lower is more similar, unlike the other scorers. A sentence with no
/// in-vocabulary tokens contributes the zero vector, and any zero-norm sum
/// yields the maximal distance of 1.0.
pub fn sentence_cosine_distance(a: &Example, b: &Example, embeddings: &WordEmbeddings) -> f64 {
    let sum_a = embeddings.vector_sum(&a.tokens);
    let sum_b = embeddings.vector_sum(&b.tokens);
    if is_zero(&sum_a) || is_zero(&sum_b) {
        return 1.0;
    }
    1.0 - cosine_similarity(&sum_a, &sum_b)
}

fn is_zero(vector: &[f32]) -> bool {
    vector.iter().all(|v| *v == 0.0)
}
