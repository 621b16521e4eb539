// Module declarations
pub mod accuracy;
pub mod grouped;
pub mod ofm;
pub mod partitions;

// Re-export the prediction surface
pub use accuracy::{grouped_accuracy_exact, grouped_accuracy_pairs, ofm_accuracy};
pub use grouped::{
    best_grouping, random_grouping, similarity_grouping, similarity_matrix, Direction,
    GroupedSelections,
};
pub use ofm::{
    crossover_selection, embedding_cosine_selection, embedding_word_sim_selection,
    random_selection, OfmPrediction, OfmResults,
};
pub use partitions::Partitions;
