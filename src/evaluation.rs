use anyhow::{bail, Context, Result};
use prettytable::{Cell, Row as PrettyRow, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{EvalConfig, GroupedAccuracy, Method, Problem};
use crate::dataset::{self, Dataset};
use crate::embedding::WordEmbeddings;
use crate::prediction::{self, Direction};
use crate::similarity::{
    embedding_word_similarity, matching_word_pairs, sentence_cosine_distance, token_jaccard,
};
use crate::TARGET_EVALUATION;

/// Aggregate accuracy statistics over all evaluation rounds.
#[derive(Debug)]
pub struct EvaluationSummary {
    pub rounds: Vec<f64>,
    /// Words actually scored per round, after any per-word skips.
    pub words: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// Runs the configured evaluation: prepares the dataset once, then runs
/// `iterations` rounds of subsample → predict → score with a seeded RNG.
///
/// A round that fails (for example a word with degenerate examples) is
/// logged and skipped so the remaining rounds still contribute statistics.
pub fn run(config: &EvalConfig) -> Result<EvaluationSummary> {
    let data = prepare_dataset(config)?;
    let embeddings = match (&config.embeddings, config.method.needs_embeddings()) {
        (Some(path), true) => Some(
            WordEmbeddings::load_word2vec_text(path).context("Failed to load embeddings")?,
        ),
        _ => None,
    };

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rounds = Vec::with_capacity(config.iterations as usize);
    let mut scored_words = 0;
    for round in 1..=config.iterations {
        let sampled = dataset::sample_senses_and_examples(
            &data,
            config.num_senses,
            config.num_examples,
            &mut rng,
        );
        let outcome = match config.problem {
            Problem::Grouped => run_grouped_round(config, &sampled, embeddings.as_ref(), &mut rng),
            Problem::OneFromMany => run_ofm_round(config, &sampled, embeddings.as_ref(), &mut rng),
        };
        match outcome {
            Ok((accuracy, words)) => {
                info!(
                    target: TARGET_EVALUATION,
                    "Round {}/{}: accuracy {:.4} over {} words", round, config.iterations, accuracy, words
                );
                scored_words = words;
                rounds.push(accuracy);
            }
            Err(err) => {
                warn!(
                    target: TARGET_EVALUATION,
                    "Round {}/{} failed and was skipped: {:#}", round, config.iterations, err
                );
            }
        }
    }

    if rounds.is_empty() {
        bail!("Every evaluation round failed; no statistics to report");
    }
    Ok(summarize(rounds, scored_words))
}

/// Loads the dataset file and runs the filtering pipeline the way the
/// config asks for it.
fn prepare_dataset(config: &EvalConfig) -> Result<Dataset> {
    let raw = dataset::load_dataset(&config.dataset)?;
    let raw = match (&config.ambiguous_words, &config.frequent_words) {
        (Some(ambiguous), Some(frequent)) => {
            let words = dataset::load_word_list(ambiguous, frequent)?;
            dataset::restrict_to_words(raw, &words)
        }
        _ => raw,
    };
    let raw = dataset::select_pos(raw, config.pos);
    let raw = dataset::filter_sparse_words(raw, config.num_senses, config.num_examples);
    let raw = dataset::lowercase_examples(raw);
    let data = dataset::tokenize_examples(raw, config.stem);
    let data = dataset::strip_stopwords_and_punct(data, config.rm_stopwords, config.rm_punct);
    if data.is_empty() {
        bail!(
            "No words survived filtering ({:?}, {} senses x {} examples)",
            config.pos,
            config.num_senses,
            config.num_examples
        );
    }
    info!(
        target: TARGET_EVALUATION,
        "Evaluating {} words with {:?}/{:?}", data.len(), config.problem, config.method
    );
    Ok(data)
}

fn run_grouped_round(
    config: &EvalConfig,
    sampled: &Dataset,
    embeddings: Option<&WordEmbeddings>,
    rng: &mut StdRng,
) -> Result<(f64, usize)> {
    let group_data = dataset::grouped_data(sampled);
    let group_size = config.num_examples;
    let selections = match config.method {
        Method::Random => prediction::random_grouping(&group_data, group_size, rng)?,
        Method::WordCrossoverPairs => prediction::similarity_grouping(
            &group_data,
            group_size,
            Direction::Maximize,
            rng,
            |a, b| matching_word_pairs(a, b) as f64,
        )?,
        Method::WordCrossoverJaccard => prediction::similarity_grouping(
            &group_data,
            group_size,
            Direction::Maximize,
            rng,
            token_jaccard,
        )?,
        Method::EmbeddingWordSim => {
            let embeddings = require_embeddings(embeddings)?;
            prediction::similarity_grouping(
                &group_data,
                group_size,
                Direction::Maximize,
                rng,
                |a, b| embedding_word_similarity(a, b, embeddings),
            )?
        }
        Method::EmbeddingCosine => {
            let embeddings = require_embeddings(embeddings)?;
            prediction::similarity_grouping(
                &group_data,
                group_size,
                Direction::Minimize,
                rng,
                |a, b| sentence_cosine_distance(a, b, embeddings),
            )?
        }
    };
    let accuracy = match config.grouped_accuracy {
        GroupedAccuracy::Exact => prediction::grouped_accuracy_exact(&selections, &group_data)?,
        GroupedAccuracy::Pairs => prediction::grouped_accuracy_pairs(&selections, &group_data)?,
    };
    Ok((accuracy, group_data.len()))
}

fn run_ofm_round(
    config: &EvalConfig,
    sampled: &Dataset,
    embeddings: Option<&WordEmbeddings>,
    rng: &mut StdRng,
) -> Result<(f64, usize)> {
    let ofm_data = dataset::ofm_data(sampled);
    let selections = match config.method {
        Method::Random => prediction::random_selection(&ofm_data, rng)?,
        Method::WordCrossoverPairs => prediction::crossover_selection(&ofm_data, true, rng)?,
        Method::WordCrossoverJaccard => prediction::crossover_selection(&ofm_data, false, rng)?,
        Method::EmbeddingWordSim => {
            prediction::embedding_word_sim_selection(&ofm_data, require_embeddings(embeddings)?, rng)?
        }
        Method::EmbeddingCosine => {
            prediction::embedding_cosine_selection(&ofm_data, require_embeddings(embeddings)?, rng)?
        }
    };
    let accuracy = prediction::ofm_accuracy(&selections, &ofm_data)?;
    Ok((accuracy, ofm_data.len()))
}

fn require_embeddings<'a>(embeddings: Option<&'a WordEmbeddings>) -> Result<&'a WordEmbeddings> {
    // Config validation enforces this before a run starts.
    embeddings.ok_or_else(|| anyhow::anyhow!("Embedding method selected but no embeddings loaded"))
}

fn summarize(rounds: Vec<f64>, words: usize) -> EvaluationSummary {
    let count = rounds.len() as f64;
    let mean = rounds.iter().sum::<f64>() / count;
    let variance = rounds.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / count;
    let min = rounds.iter().copied().fold(f64::INFINITY, f64::min);
    let max = rounds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    EvaluationSummary {
        rounds,
        words,
        mean,
        min,
        max,
        std_dev: variance.sqrt(),
    }
}

/// Prints the run summary as a table.
pub fn print_report(config: &EvalConfig, summary: &EvaluationSummary) {
    let mut table = Table::new();
    table.add_row(PrettyRow::new(vec![
        Cell::new("Problem"),
        Cell::new("Method"),
        Cell::new("Words"),
        Cell::new("Rounds"),
        Cell::new("Mean"),
        Cell::new("Min"),
        Cell::new("Max"),
        Cell::new("Std dev"),
    ]));
    table.add_row(PrettyRow::new(vec![
        Cell::new(&format!("{:?}", config.problem)),
        Cell::new(&format!("{:?}", config.method)),
        Cell::new(&summary.words.to_string()),
        Cell::new(&summary.rounds.len().to_string()),
        Cell::new(&format!("{:.4}", summary.mean)),
        Cell::new(&format!("{:.4}", summary.min)),
        Cell::new(&format!("{:.4}", summary.max)),
        Cell::new(&format!("{:.4}", summary.std_dev)),
    ]));
    table.printstd();
}
