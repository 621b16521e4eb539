use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::stopwords::ENGLISH_STOPWORDS;

/// Loads and merges the ambiguous-word and frequent-word lists.
///
/// Entries from the first list keep their order; entries from the second are
/// appended if not already present. Stopwords and multi-word entries are
/// dropped.
pub fn load_word_list(ambiguous_path: &Path, frequent_path: &Path) -> Result<Vec<String>> {
    let ambiguous = load_comma_separated(ambiguous_path)?;
    let frequent = load_one_per_line(frequent_path)?;
    Ok(clean_word_list(merge_word_lists(ambiguous, frequent)))
}

/// Loads a single-line, comma-separated word list.
fn load_comma_separated(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read word list: {}", path.display()))?;
    Ok(contents
        .split(',')
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty())
        .collect())
}

/// Loads a word list with one word per line.
fn load_one_per_line(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read word list: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|word| !word.is_empty())
        .collect())
}

/// Combines two word lists, dropping duplicates from the second.
fn merge_word_lists(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut combined = first.clone();
    let seen: std::collections::HashSet<&String> = first.iter().collect();
    for word in &second {
        if !seen.contains(word) {
            combined.push(word.clone());
        }
    }
    combined
}

/// Removes stopwords and entries containing whitespace.
fn clean_word_list(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .filter(|word| {
            !word.contains(char::is_whitespace) && !ENGLISH_STOPWORDS.contains(word.as_str())
        })
        .collect()
}
