use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::PartOfSpeech;

/// Which evaluation problem to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    Grouped,
    OneFromMany,
}

/// The closed set of baseline prediction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Random,
    WordCrossoverPairs,
    WordCrossoverJaccard,
    EmbeddingWordSim,
    EmbeddingCosine,
}

impl Method {
    /// Whether the strategy scores with pre-trained word embeddings.
    pub fn needs_embeddings(&self) -> bool {
        matches!(self, Method::EmbeddingWordSim | Method::EmbeddingCosine)
    }
}

/// Accuracy metric for the grouped problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupedAccuracy {
    Exact,
    Pairs,
}

fn default_iterations() -> u32 {
    1
}

/// One evaluation run's configuration, deserialized from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Path of the prepared dataset file.
    pub dataset: PathBuf,
    pub problem: Problem,
    pub method: Method,
    #[serde(default = "GroupedAccuracy::default_metric")]
    pub grouped_accuracy: GroupedAccuracy,
    pub pos: PartOfSpeech,
    pub num_senses: usize,
    pub num_examples: usize,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub seed: u64,
    #[serde(default)]
    pub stem: bool,
    #[serde(default)]
    pub rm_stopwords: bool,
    #[serde(default)]
    pub rm_punct: bool,
    /// Path of a word2vec text-format embeddings file; required for the
    /// embedding methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<PathBuf>,
    /// Path of a comma-separated ambiguous-word list; when set together with
    /// `frequent_words`, evaluation is restricted to the merged lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguous_words: Option<PathBuf>,
    /// Path of a one-word-per-line frequent-word list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequent_words: Option<PathBuf>,
}

impl GroupedAccuracy {
    fn default_metric() -> Self {
        GroupedAccuracy::Exact
    }
}

impl EvalConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: EvalConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation.
    ///
    /// The grouped problem only supports the 3x3 and 4x4 shapes the
    /// partition search is sized for; one-from-many needs at least two
    /// examples for the reference sense and three senses so there is more
    /// than one distractor.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            bail!("iterations must be at least 1");
        }
        match self.problem {
            Problem::Grouped => {
                let shape = (self.num_senses, self.num_examples);
                if shape != (3, 3) && shape != (4, 4) {
                    bail!(
                        "Grouped evaluation requires num_senses and num_examples to both \
                         be 3 or both be 4, got {} and {}",
                        self.num_senses,
                        self.num_examples
                    );
                }
            }
            Problem::OneFromMany => {
                if self.num_examples < 2 {
                    bail!("num_examples must be at least 2 for one-from-many evaluation");
                }
                if self.num_senses < 3 {
                    bail!("num_senses must be at least 3 for one-from-many evaluation");
                }
            }
        }
        if self.method.needs_embeddings() && self.embeddings.is_none() {
            bail!("Method {:?} requires an embeddings path", self.method);
        }
        if self.ambiguous_words.is_some() != self.frequent_words.is_some() {
            bail!("ambiguous_words and frequent_words must be set together");
        }
        Ok(())
    }
}
