use anyhow::{bail, Result};
use std::collections::HashSet;

use super::grouped::GroupedSelections;
use super::ofm::OfmResults;
use crate::dataset::{GroupedData, OfmData};

/// One-from-many accuracy: the fraction of words whose chosen candidate is
/// the true answer. The dataset builder guarantees the true answer is
/// `options[0]`.
pub fn ofm_accuracy(results: &OfmResults, dataset: &OfmData) -> Result<f64> {
    if dataset.is_empty() {
        bail!("Cannot score accuracy over an empty dataset");
    }
    let mut correct = 0;
    for (word, item) in dataset {
        let Some(prediction) = results.get(word) else {
            bail!("No prediction for word '{}'", word);
        };
        let Some(answer) = item.options.first() else {
            bail!("Word '{}' has no candidate options", word);
        };
        if prediction.solution == answer.sent {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

/// All-or-nothing grouped accuracy: a word counts only if every predicted
/// group exactly matches (as a set) one of the truth groups. Truth groups
/// are the consecutive group-size slices of the word's original example
/// order, which the dataset builder keeps sense-by-sense.
pub fn grouped_accuracy_exact(results: &GroupedSelections, dataset: &GroupedData) -> Result<f64> {
    if dataset.is_empty() {
        bail!("Cannot score accuracy over an empty dataset");
    }
    let mut fully_correct = 0;
    for (word, examples) in dataset {
        let predicted = prediction_for(results, word, examples.len())?;
        let group_size = predicted[0].len();
        let truth: Vec<HashSet<&str>> = examples
            .chunks(group_size)
            .map(|chunk| chunk.iter().map(|e| e.sent.as_str()).collect())
            .collect();

        let all_matched = predicted.iter().all(|group| {
            let group: HashSet<&str> = group.iter().map(|s| s.as_str()).collect();
            truth.contains(&group)
        });
        if all_matched {
            fully_correct += 1;
        }
    }
    Ok(fully_correct as f64 / dataset.len() as f64)
}

/// Pairwise grouped accuracy: the fraction of truth pairs recovered,
/// averaged over words.
///
/// Pairs are the 2-combinations within each predicted group and within the
/// positionally aligned truth slice; an unordered predicted pair counts if
/// it appears anywhere among the truth pairs. For a 3x3 word a prediction
/// recovering five of the nine truth pairs scores 5/9.
pub fn grouped_accuracy_pairs(results: &GroupedSelections, dataset: &GroupedData) -> Result<f64> {
    if dataset.is_empty() {
        bail!("Cannot score accuracy over an empty dataset");
    }
    let mut total = 0.0;
    for (word, examples) in dataset {
        let predicted = prediction_for(results, word, examples.len())?;
        let group_size = predicted[0].len();

        let mut predicted_pairs = Vec::new();
        let mut truth_pairs = Vec::new();
        for (pred_group, truth_chunk) in predicted.iter().zip(examples.chunks(group_size)) {
            let truth_group: Vec<&str> = truth_chunk.iter().map(|e| e.sent.as_str()).collect();
            let pred_group: Vec<&str> = pred_group.iter().map(|s| s.as_str()).collect();
            predicted_pairs.extend(unordered_pairs(&pred_group));
            truth_pairs.extend(unordered_pairs(&truth_group));
        }
        if truth_pairs.is_empty() {
            bail!("Word '{}' yields no truth pairs; groups of at least 2 required", word);
        }

        let matched = predicted_pairs
            .iter()
            .filter(|pair| truth_pairs.contains(pair))
            .count();
        total += matched as f64 / truth_pairs.len() as f64;
    }
    Ok(total / dataset.len() as f64)
}

/// Looks up and shape-checks the predicted grouping for one word.
fn prediction_for<'a>(
    results: &'a GroupedSelections,
    word: &str,
    example_count: usize,
) -> Result<&'a Vec<Vec<String>>> {
    let Some(predicted) = results.get(word) else {
        bail!("No prediction for word '{}'", word);
    };
    let group_size = predicted.first().map(|g| g.len()).unwrap_or(0);
    if group_size == 0 {
        bail!("Prediction for word '{}' has no groups", word);
    }
    if predicted.len() * group_size != example_count
        || predicted.iter().any(|g| g.len() != group_size)
    {
        bail!(
            "Prediction for word '{}' does not partition its {} examples",
            word,
            example_count
        );
    }
    Ok(predicted)
}

/// All unordered 2-combinations of the slice, normalized so ab == ba.
fn unordered_pairs<'a>(items: &[&'a str]) -> Vec<(&'a str, &'a str)> {
    let mut pairs = Vec::new();
    for i in 0..items.len() {
        for j in i + 1..items.len() {
            let (a, b) = (items[i], items[j]);
            pairs.push(if a <= b { (a, b) } else { (b, a) });
        }
    }
    pairs
}
