use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use super::stopwords::{is_punctuation, ENGLISH_STOPWORDS};
use super::types::{Dataset, Example, GroupedData, OfmData, OfmItem, PartOfSpeech, RawDataset, Sense};
use crate::TARGET_DATASET;

/// Keeps only the words named by a word list, such as the merged output of
/// `wordlist::load_word_list`.
pub fn restrict_to_words(data: RawDataset, words: &[String]) -> RawDataset {
    let keep: HashSet<&str> = words.iter().map(|w| w.as_str()).collect();
    let before = data.len();
    let restricted: RawDataset = data
        .into_iter()
        .filter(|(word, _)| keep.contains(word.as_str()))
        .collect();
    debug!(
        target: TARGET_DATASET,
        "Word list kept {} of {} words", restricted.len(), before
    );
    restricted
}

/// Keeps only senses with the requested part of speech. Words left with no
/// matching sense are dropped from the dataset.
///
/// # Arguments
/// * `data` - A raw dataset keyed by word.
/// * `pos` - The part of speech to keep.
pub fn select_pos(data: RawDataset, pos: PartOfSpeech) -> RawDataset {
    data.into_iter()
        .filter_map(|(word, senses)| {
            let kept: Vec<_> = senses.into_iter().filter(|s| s.pos == pos).collect();
            if kept.is_empty() {
                None
            } else {
                Some((word, kept))
            }
        })
        .collect()
}

/// Keeps only words with sufficient senses that have sufficient examples.
///
/// A sense survives if it has at least `min_examples` examples; a word
/// survives if at least `min_senses` of its senses survive.
pub fn filter_sparse_words(
    data: RawDataset,
    min_senses: usize,
    min_examples: usize,
) -> RawDataset {
    let before = data.len();
    let filtered: RawDataset = data
        .into_iter()
        .filter_map(|(word, senses)| {
            let kept: Vec<_> = senses
                .into_iter()
                .filter(|s| s.examples.len() >= min_examples)
                .collect();
            if kept.len() >= min_senses {
                Some((word, kept))
            } else {
                None
            }
        })
        .collect();
    debug!(
        target: TARGET_DATASET,
        "Sparsity filter kept {} of {} words", filtered.len(), before
    );
    filtered
}

/// Lowercases every example sentence in the dataset.
pub fn lowercase_examples(data: RawDataset) -> RawDataset {
    data.into_iter()
        .map(|(word, mut senses)| {
            for sense in &mut senses {
                for example in &mut sense.examples {
                    *example = example.to_lowercase();
                }
            }
            (word, senses)
        })
        .collect()
}

/// Tokenizes every example, optionally stemming the tokens.
///
/// Tokenization splits on Unicode word boundaries and keeps punctuation
/// tokens so a later stage can decide whether to strip them.
pub fn tokenize_examples(data: RawDataset, stem: bool) -> Dataset {
    let stemmer = stem.then(|| Stemmer::create(Algorithm::English));
    data.into_iter()
        .map(|(word, senses)| {
            let senses = senses
                .into_iter()
                .map(|raw| Sense {
                    pos: raw.pos,
                    definition: raw.definition,
                    examples: raw
                        .examples
                        .into_iter()
                        .map(|sent| {
                            let tokens = tokenize(&sent, stemmer.as_ref());
                            Example { sent, tokens }
                        })
                        .collect(),
                })
                .collect();
            (word, senses)
        })
        .collect()
}

fn tokenize(sent: &str, stemmer: Option<&Stemmer>) -> Vec<String> {
    sent.split_word_bounds()
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| match stemmer {
            Some(stemmer) => stemmer.stem(segment).into_owned(),
            None => segment.to_string(),
        })
        .collect()
}

/// Removes stopwords and/or punctuation tokens from every tokenized example.
/// Surface text is left untouched.
pub fn strip_stopwords_and_punct(data: Dataset, rm_stopwords: bool, rm_punct: bool) -> Dataset {
    data.into_iter()
        .map(|(word, mut senses)| {
            for sense in &mut senses {
                for example in &mut sense.examples {
                    example.tokens.retain(|token| {
                        if rm_stopwords && ENGLISH_STOPWORDS.contains(token.as_str()) {
                            return false;
                        }
                        if rm_punct && is_punctuation(token) {
                            return false;
                        }
                        true
                    });
                }
            }
            (word, senses)
        })
        .collect()
}

/// Randomly subsamples each word down to `num_senses` senses with
/// `num_examples` examples each.
///
/// Assumes the sparsity filter has already run, so every word has enough
/// senses and every kept sense enough examples.
pub fn sample_senses_and_examples(
    data: &Dataset,
    num_senses: usize,
    num_examples: usize,
    rng: &mut StdRng,
) -> Dataset {
    data.iter()
        .map(|(word, senses)| {
            let mut senses = senses.clone();
            senses.shuffle(rng);
            senses.truncate(num_senses);
            for sense in &mut senses {
                sense.examples.shuffle(rng);
                sense.examples.truncate(num_examples);
            }
            (word.clone(), senses)
        })
        .collect()
}

/// Flattens each word's senses into one ordered example list, sense by
/// sense. The grouped accuracy scorer reconstructs the truth groups by
/// slicing this order, so it must not be shuffled here.
pub fn grouped_data(data: &Dataset) -> GroupedData {
    data.iter()
        .map(|(word, senses)| {
            let examples = senses
                .iter()
                .flat_map(|sense| sense.examples.iter().cloned())
                .collect();
            (word.clone(), examples)
        })
        .collect()
}

/// Builds one-from-many evaluation items: the reference is the first example
/// of the first sense, the matching answer is that sense's second example,
/// and every other sense contributes its first example as a distractor.
///
/// The true answer always lands at index 0 of the options; the accuracy
/// scorer relies on that. Words with insufficient shape are skipped with a
/// warning so one bad word cannot abort a whole round.
pub fn ofm_data(data: &Dataset) -> OfmData {
    let mut result = OfmData::new();
    for (word, senses) in data {
        let Some(first) = senses.first() else {
            warn!(target: TARGET_DATASET, "Word '{}' has no senses, skipping", word);
            continue;
        };
        if first.examples.len() < 2 || senses.len() < 2 {
            warn!(
                target: TARGET_DATASET,
                "Word '{}' has too few senses or examples for one-from-many, skipping", word
            );
            continue;
        }
        let mut options = vec![first.examples[1].clone()];
        for sense in &senses[1..] {
            match sense.examples.first() {
                Some(example) => options.push(example.clone()),
                None => {
                    warn!(
                        target: TARGET_DATASET,
                        "Word '{}' has a sense with no examples, skipping", word
                    );
                    options.clear();
                    break;
                }
            }
        }
        if options.is_empty() {
            continue;
        }
        result.insert(
            word.clone(),
            OfmItem {
                example: first.examples[0].clone(),
                options,
            },
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::RawSense;
    use rand::SeedableRng;

    fn raw_sense(pos: PartOfSpeech, examples: &[&str]) -> RawSense {
        RawSense {
            pos,
            definition: None,
            examples: examples.iter().map(|s| s.to_string()).collect(),
            frequency: None,
            source: None,
        }
    }

    fn raw_dataset() -> RawDataset {
        let mut data = RawDataset::new();
        data.insert(
            "bank".to_string(),
            vec![
                raw_sense(PartOfSpeech::Noun, &["The bank closed.", "A bank loan."]),
                raw_sense(PartOfSpeech::Noun, &["The river bank flooded."]),
                raw_sense(PartOfSpeech::Verb, &["Bank the plane left."]),
            ],
        );
        data.insert(
            "run".to_string(),
            vec![raw_sense(PartOfSpeech::Verb, &["They run fast.", "Runs daily."])],
        );
        data
    }

    #[test]
    fn test_restrict_to_words() {
        let data = restrict_to_words(raw_dataset(), &["bank".to_string(), "seal".to_string()]);
        assert_eq!(data.len(), 1);
        assert!(data.contains_key("bank"));
        assert!(restrict_to_words(raw_dataset(), &[]).is_empty());
    }

    #[test]
    fn test_select_pos_drops_words_without_matching_senses() {
        let data = select_pos(raw_dataset(), PartOfSpeech::Noun);
        assert_eq!(data.len(), 1);
        assert_eq!(data["bank"].len(), 2);
    }

    #[test]
    fn test_filter_sparse_words() {
        let data = select_pos(raw_dataset(), PartOfSpeech::Noun);
        let data = filter_sparse_words(data, 2, 1);
        assert_eq!(data.len(), 1);
        let data = filter_sparse_words(raw_dataset(), 2, 2);
        assert!(data.is_empty());
    }

    #[test]
    fn test_lowercase_examples() {
        let data = lowercase_examples(raw_dataset());
        assert_eq!(data["bank"][0].examples[0], "the bank closed.");
    }

    #[test]
    fn test_tokenize_keeps_punctuation() {
        let mut data = RawDataset::new();
        data.insert(
            "cat".to_string(),
            vec![raw_sense(PartOfSpeech::Noun, &["the big cat ran."])],
        );
        let data = tokenize_examples(data, false);
        let tokens = &data["cat"][0].examples[0].tokens;
        assert_eq!(tokens, &["the", "big", "cat", "ran", "."]);
    }

    #[test]
    fn test_tokenize_with_stemming() {
        let mut data = RawDataset::new();
        data.insert(
            "run".to_string(),
            vec![raw_sense(PartOfSpeech::Verb, &["running quickly"])],
        );
        let data = tokenize_examples(data, true);
        let tokens = &data["run"][0].examples[0].tokens;
        assert_eq!(tokens[0], "run");
    }

    #[test]
    fn test_strip_stopwords_and_punct() {
        let mut data = RawDataset::new();
        data.insert(
            "cat".to_string(),
            vec![raw_sense(PartOfSpeech::Noun, &["the big cat ran."])],
        );
        let data = tokenize_examples(data, false);
        let data = strip_stopwords_and_punct(data, true, true);
        let example = &data["cat"][0].examples[0];
        assert_eq!(example.tokens, vec!["big", "cat", "ran"]);
        // Surface text is untouched.
        assert_eq!(example.sent, "the big cat ran.");
    }

    #[test]
    fn test_sample_senses_and_examples_shapes() {
        let mut data = RawDataset::new();
        data.insert(
            "word".to_string(),
            vec![
                raw_sense(PartOfSpeech::Noun, &["a", "b", "c", "d"]),
                raw_sense(PartOfSpeech::Noun, &["e", "f", "g"]),
                raw_sense(PartOfSpeech::Noun, &["h", "i", "j"]),
                raw_sense(PartOfSpeech::Noun, &["k", "l", "m"]),
            ],
        );
        let data = tokenize_examples(data, false);
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = sample_senses_and_examples(&data, 3, 2, &mut rng);
        assert_eq!(sampled["word"].len(), 3);
        for sense in &sampled["word"] {
            assert_eq!(sense.examples.len(), 2);
        }
    }

    #[test]
    fn test_grouped_data_preserves_sense_order() {
        let mut data = RawDataset::new();
        data.insert(
            "word".to_string(),
            vec![
                raw_sense(PartOfSpeech::Noun, &["a", "b"]),
                raw_sense(PartOfSpeech::Noun, &["c", "d"]),
            ],
        );
        let data = tokenize_examples(data, false);
        let grouped = grouped_data(&data);
        let sents: Vec<_> = grouped["word"].iter().map(|e| e.sent.as_str()).collect();
        assert_eq!(sents, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_ofm_data_layout() {
        let mut data = RawDataset::new();
        data.insert(
            "word".to_string(),
            vec![
                raw_sense(PartOfSpeech::Noun, &["ref", "answer"]),
                raw_sense(PartOfSpeech::Noun, &["distractor one", "x"]),
                raw_sense(PartOfSpeech::Noun, &["distractor two", "y"]),
            ],
        );
        let data = tokenize_examples(data, false);
        let ofm = ofm_data(&data);
        let item = &ofm["word"];
        assert_eq!(item.example.sent, "ref");
        assert_eq!(item.options[0].sent, "answer");
        assert_eq!(item.options.len(), 3);
    }

    #[test]
    fn test_ofm_data_skips_malformed_words() {
        let mut data = RawDataset::new();
        data.insert(
            "thin".to_string(),
            vec![raw_sense(PartOfSpeech::Noun, &["only one"])],
        );
        let data = tokenize_examples(data, false);
        assert!(ofm_data(&data).is_empty());
    }
}
