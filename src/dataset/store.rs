use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use super::types::RawDataset;
use crate::TARGET_DATASET;

/// Loads a prepared dataset from a JSON file.
///
/// # Arguments
/// * `path` - Path of the dataset file to load.
pub fn load_dataset(path: &Path) -> Result<RawDataset> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
    let dataset: RawDataset = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse dataset file: {}", path.display()))?;
    info!(
        target: TARGET_DATASET,
        "Loaded dataset with {} words from {}", dataset.len(), path.display()
    );
    Ok(dataset)
}

/// Saves a dataset as pretty-printed JSON.
pub fn save_dataset(path: &Path, dataset: &RawDataset) -> Result<()> {
    let json = serde_json::to_string_pretty(dataset).context("Failed to serialize dataset")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write dataset file: {}", path.display()))?;
    info!(
        target: TARGET_DATASET,
        "Saved dataset with {} words to {}", dataset.len(), path.display()
    );
    Ok(())
}
