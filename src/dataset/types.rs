use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Part of speech tag carried by every sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

/// One example sentence: the literal surface text plus its tokenized form.
///
/// `tokens` is empty until the tokenization stage of the pipeline has run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Example {
    pub sent: String,
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl Example {
    pub fn new(sent: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            sent: sent.into(),
            tokens,
        }
    }
}

/// A sense as stored in a prepared dataset file: examples are plain strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSense {
    pub pos: PartOfSpeech,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub examples: Vec<String>,
    // Provenance metadata, present for corpus-derived datasets. Not consumed
    // by the prediction core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A sense after the pipeline has tokenized its examples.
#[derive(Debug, Clone)]
pub struct Sense {
    pub pos: PartOfSpeech,
    pub definition: Option<String>,
    pub examples: Vec<Example>,
}

/// One-from-many evaluation unit: a reference example and the candidate
/// options. By construction the true answer is always `options[0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfmItem {
    pub example: Example,
    pub options: Vec<Example>,
}

/// A prepared dataset as loaded from disk, keyed by word.
pub type RawDataset = BTreeMap<String, Vec<RawSense>>;

/// A dataset after tokenization, keyed by word.
pub type Dataset = BTreeMap<String, Vec<Sense>>;

/// Grouped-evaluation input: every word's examples flattened sense-by-sense,
/// in sense order. The accuracy scorer relies on that ordering.
pub type GroupedData = BTreeMap<String, Vec<Example>>;

/// One-from-many evaluation input keyed by word.
pub type OfmData = BTreeMap<String, OfmItem>;
