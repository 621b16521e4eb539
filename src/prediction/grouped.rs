use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tracing::debug;

use super::partitions::Partitions;
use crate::dataset::{Example, GroupedData};
use crate::TARGET_PREDICTION;

/// Whether the optimal grouping has the smallest or largest total score.
/// Distance-like scorers want `Minimize`; overlap-like scorers `Maximize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

/// Predicted groupings per word: each group is a list of example texts.
pub type GroupedSelections = BTreeMap<String, Vec<Vec<String>>>;

/// Builds the pairwise similarity matrix for a list of examples, including
/// the diagonal. Symmetry is up to the scorer; both orders are evaluated.
pub fn similarity_matrix<F>(examples: &[Example], mut score: F) -> Vec<Vec<f64>>
where
    F: FnMut(&Example, &Example) -> f64,
{
    examples
        .iter()
        .map(|a| examples.iter().map(|b| score(a, b)).collect())
        .collect()
}

/// Sum of similarity-matrix entries over all ordered member pairs of the
/// group, self-pairs included. Self-pairs add the same per-group offset to
/// every equal-size grouping, so they never change the ranking.
fn group_score(group: &[usize], matrix: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    for &i in group {
        for &j in group {
            total += matrix[i][j];
        }
    }
    total
}

/// Exhaustively scores every partition of the examples into equal-size
/// groups and returns the optimal one.
///
/// Ties keep the first optimum in the enumerator's canonical order.
///
/// # Arguments
/// * `examples` - The examples to group.
/// * `matrix` - Pairwise similarity scores indexed by example position.
/// * `group_size` - Number of examples per group (3 or 4 in practice).
/// * `direction` - Whether the best grouping minimizes or maximizes the
///   total score.
///
/// # Returns
/// The groups of the optimal partition, as lists of example texts.
pub fn best_grouping(
    examples: &[Example],
    matrix: &[Vec<f64>],
    group_size: usize,
    direction: Direction,
) -> Result<Vec<Vec<String>>> {
    if matrix.len() != examples.len() || matrix.iter().any(|row| row.len() != examples.len()) {
        bail!(
            "Similarity matrix must be {}x{} to match the example count",
            examples.len(),
            examples.len()
        );
    }

    let mut best: Option<(f64, Vec<Vec<usize>>)> = None;
    let mut considered = 0usize;
    for grouping in Partitions::new(examples.len(), group_size)? {
        let score: f64 = grouping.iter().map(|group| group_score(group, matrix)).sum();
        considered += 1;
        let better = match &best {
            None => true,
            Some((best_score, _)) => match direction {
                Direction::Maximize => score > *best_score,
                Direction::Minimize => score < *best_score,
            },
        };
        if better {
            best = Some((score, grouping));
        }
    }

    // Partitions::new rejects empty input, so a best grouping always exists.
    let Some((score, grouping)) = best else {
        bail!("Partition enumeration yielded no groupings");
    };
    debug!(
        target: TARGET_PREDICTION,
        "Selected grouping with score {:.4} out of {} candidates", score, considered
    );

    Ok(grouping
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|i| examples[i].sent.clone())
                .collect()
        })
        .collect())
}

/// Random grouping baseline: shuffle the examples and slice them into
/// consecutive groups.
pub fn random_grouping(
    data: &GroupedData,
    group_size: usize,
    rng: &mut StdRng,
) -> Result<GroupedSelections> {
    let mut results = GroupedSelections::new();
    for (word, examples) in data {
        if group_size == 0 || examples.len() % group_size != 0 {
            bail!(
                "Word '{}' has {} examples, not divisible into groups of {}",
                word,
                examples.len(),
                group_size
            );
        }
        let mut sents: Vec<String> = examples.iter().map(|e| e.sent.clone()).collect();
        sents.shuffle(rng);
        let groups = sents.chunks(group_size).map(|c| c.to_vec()).collect();
        results.insert(word.clone(), groups);
    }
    Ok(results)
}

/// Scores every example against every other with the supplied scorer and
/// returns the optimal grouping per word.
///
/// Examples are shuffled before the similarity matrix is built so the
/// enumerator's tie-breaking is not biased by the dataset's sense ordering.
pub fn similarity_grouping<F>(
    data: &GroupedData,
    group_size: usize,
    direction: Direction,
    rng: &mut StdRng,
    mut score: F,
) -> Result<GroupedSelections>
where
    F: FnMut(&Example, &Example) -> f64,
{
    let mut results = GroupedSelections::new();
    for (word, examples) in data {
        let mut examples = examples.clone();
        examples.shuffle(rng);
        let matrix = similarity_matrix(&examples, &mut score);
        let groups = best_grouping(&examples, &matrix, group_size, direction)?;
        results.insert(word.clone(), groups);
    }
    Ok(results)
}
