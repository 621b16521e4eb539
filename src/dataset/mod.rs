// Module declarations
pub mod pipeline;
pub mod stopwords;
pub mod store;
pub mod types;
pub mod wordlist;

// Re-export the data model for convenience
pub use types::*;

pub use pipeline::{
    filter_sparse_words, grouped_data, lowercase_examples, ofm_data, restrict_to_words,
    sample_senses_and_examples, select_pos, strip_stopwords_and_punct, tokenize_examples,
};
pub use store::{load_dataset, save_dataset};
pub use wordlist::load_word_list;
