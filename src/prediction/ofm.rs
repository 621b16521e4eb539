use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::BTreeMap;

use super::grouped::Direction;
use crate::dataset::{Example, OfmData};
use crate::embedding::WordEmbeddings;
use crate::similarity::{
    embedding_word_similarity, matching_word_pairs, sentence_cosine_distance, token_jaccard,
};

/// One-from-many prediction for a single word: the reference text and the
/// candidate text chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfmPrediction {
    pub example: String,
    pub solution: String,
}

/// One-from-many predictions keyed by word.
pub type OfmResults = BTreeMap<String, OfmPrediction>;

/// Random baseline: a uniform choice among the candidates.
pub fn random_selection(data: &OfmData, rng: &mut StdRng) -> Result<OfmResults> {
    let mut results = OfmResults::new();
    for (word, item) in data {
        let Some(choice) = item.options.choose(rng) else {
            bail!("Word '{}' has no candidate options", word);
        };
        results.insert(
            word.clone(),
            OfmPrediction {
                example: item.example.sent.clone(),
                solution: choice.sent.clone(),
            },
        );
    }
    Ok(results)
}

/// Lexical crossover selection. With `pairs` the candidates are scored by
/// matching token pairs, otherwise by token-set Jaccard; the two weight
/// repeated-token overlap differently and can diverge on the same input.
pub fn crossover_selection(data: &OfmData, pairs: bool, rng: &mut StdRng) -> Result<OfmResults> {
    select_by_score(data, Direction::Maximize, rng, |example, option| {
        if pairs {
            matching_word_pairs(example, option) as f64
        } else {
            token_jaccard(example, option)
        }
    })
}

/// Embedding selection: maximizes the summed pairwise word similarity
/// between the reference and each candidate.
pub fn embedding_word_sim_selection(
    data: &OfmData,
    embeddings: &WordEmbeddings,
    rng: &mut StdRng,
) -> Result<OfmResults> {
    select_by_score(data, Direction::Maximize, rng, |example, option| {
        embedding_word_similarity(example, option, embeddings)
    })
}

/// Embedding selection: minimizes the cosine distance between summed
/// sentence vectors.
pub fn embedding_cosine_selection(
    data: &OfmData,
    embeddings: &WordEmbeddings,
    rng: &mut StdRng,
) -> Result<OfmResults> {
    select_by_score(data, Direction::Minimize, rng, |example, option| {
        sentence_cosine_distance(example, option, embeddings)
    })
}

/// Shared shuffle-then-optimum selection.
///
/// Candidates are shuffled before scoring so that score ties are not always
/// resolved in favor of the dataset's candidate ordering; the first optimum
/// in shuffled order wins.
fn select_by_score<F>(
    data: &OfmData,
    direction: Direction,
    rng: &mut StdRng,
    mut score: F,
) -> Result<OfmResults>
where
    F: FnMut(&Example, &Example) -> f64,
{
    let mut results = OfmResults::new();
    for (word, item) in data {
        if item.options.is_empty() {
            bail!("Word '{}' has no candidate options", word);
        }
        let mut options = item.options.clone();
        options.shuffle(rng);

        let mut best_index = 0;
        let mut best_score = score(&item.example, &options[0]);
        for (index, option) in options.iter().enumerate().skip(1) {
            let candidate = score(&item.example, option);
            let better = match direction {
                Direction::Maximize => candidate > best_score,
                Direction::Minimize => candidate < best_score,
            };
            if better {
                best_index = index;
                best_score = candidate;
            }
        }

        results.insert(
            word.clone(),
            OfmPrediction {
                example: item.example.sent.clone(),
                solution: options[best_index].sent.clone(),
            },
        );
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::OfmItem;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn example(sent: &str, tokens: &[&str]) -> Example {
        Example::new(sent, tokens.iter().map(|t| t.to_string()).collect())
    }

    /// The reference fixture: the pair-count and Jaccard scorers disagree on
    /// the right answer because of the repeated "big" tokens.
    fn ofm_test_data() -> OfmData {
        let reference = example(
            "The car ran over the big cat.",
            &["The", "car", "ran", "over", "the", "big", "cat", "."],
        );
        let options = vec![
            example(
                "The man and the cat ran.",
                &["The", "man", "and", "the", "cat", "ran", "."],
            ),
            example(
                "Some people like big big big big cat's.",
                &["Some", "people", "like", "big", "big", "big", "big", "cat", "'s", "."],
            ),
            example(
                "The car ran forever.",
                &["The", "car", "ran", "forever", "."],
            ),
        ];
        let mut data = OfmData::new();
        data.insert(
            "word1".to_string(),
            OfmItem {
                example: reference,
                options,
            },
        );
        data
    }

    #[test]
    fn test_random_selection_chooses_an_option() {
        let data = ofm_test_data();
        let mut rng = StdRng::seed_from_u64(3);
        let results = random_selection(&data, &mut rng).unwrap();
        assert_eq!(results.len(), 1);
        let prediction = &results["word1"];
        assert_eq!(prediction.example, "The car ran over the big cat.");
        assert!(data["word1"]
            .options
            .iter()
            .any(|o| o.sent == prediction.solution));
    }

    #[test]
    fn test_crossover_pair_count_favors_repeated_tokens() {
        let data = ofm_test_data();
        let mut rng = StdRng::seed_from_u64(3);
        let results = crossover_selection(&data, true, &mut rng).unwrap();
        assert_eq!(
            results["word1"].solution,
            "Some people like big big big big cat's."
        );
    }

    #[test]
    fn test_crossover_jaccard_favors_shared_types() {
        let data = ofm_test_data();
        let mut rng = StdRng::seed_from_u64(3);
        let results = crossover_selection(&data, false, &mut rng).unwrap();
        assert_eq!(results["word1"].solution, "The man and the cat ran.");
    }

    #[test]
    fn test_embedding_selections_choose_among_options() {
        let mut vectors = HashMap::new();
        for (word, vector) in [
            ("car", vec![1.0, 0.0]),
            ("cat", vec![0.0, 1.0]),
            ("ran", vec![0.5, 0.5]),
            ("big", vec![0.3, 0.7]),
        ] {
            vectors.insert(word.to_string(), vector);
        }
        let embeddings = WordEmbeddings::from_vectors(vectors).unwrap();
        let data = ofm_test_data();
        let option_sents: Vec<&str> =
            data["word1"].options.iter().map(|o| o.sent.as_str()).collect();

        let mut rng = StdRng::seed_from_u64(3);
        let results = embedding_word_sim_selection(&data, &embeddings, &mut rng).unwrap();
        assert!(option_sents.contains(&results["word1"].solution.as_str()));

        let results = embedding_cosine_selection(&data, &embeddings, &mut rng).unwrap();
        assert!(option_sents.contains(&results["word1"].solution.as_str()));
    }

    #[test]
    fn test_empty_option_list_is_an_error() {
        let mut data = OfmData::new();
        data.insert(
            "word1".to_string(),
            OfmItem {
                example: example("ref", &["ref"]),
                options: Vec::new(),
            },
        );
        let mut rng = StdRng::seed_from_u64(3);
        assert!(random_selection(&data, &mut rng).is_err());
        assert!(crossover_selection(&data, true, &mut rng).is_err());
    }
}
