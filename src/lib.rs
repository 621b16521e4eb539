pub mod config;
pub mod dataset;
pub mod embedding;
pub mod evaluation;
pub mod logging;
pub mod prediction;
pub mod similarity;

pub const TARGET_DATASET: &str = "dataset";
pub const TARGET_PREDICTION: &str = "prediction";
pub const TARGET_EVALUATION: &str = "evaluation";
