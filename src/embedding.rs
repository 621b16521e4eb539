use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::TARGET_DATASET;

/// Pre-trained word embeddings, consumed as a black box by the scorers.
///
/// Exposes exactly the three operations the prediction core needs: a
/// vocabulary test, a vector lookup, and a pairwise word similarity.
#[derive(Debug)]
pub struct WordEmbeddings {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordEmbeddings {
    /// Loads embeddings from the textual word2vec format: a `count dim`
    /// header line followed by one `word v1 .. vdim` line per word.
    pub fn load_word2vec_text(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read embeddings file: {}", path.display()))?;
        let mut lines = contents.lines();

        let header = lines
            .next()
            .ok_or_else(|| anyhow!("Embeddings file is empty: {}", path.display()))?;
        let mut header_fields = header.split_whitespace();
        let count: usize = header_fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| anyhow!("Invalid embeddings header: {}", header))?;
        let dimensions: usize = header_fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| anyhow!("Invalid embeddings header: {}", header))?;

        let mut vectors = HashMap::with_capacity(count);
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let word = fields
                .next()
                .ok_or_else(|| anyhow!("Malformed embedding on line {}", line_no + 2))?;
            let vector: Vec<f32> = fields
                .map(|f| f.parse::<f32>())
                .collect::<Result<_, _>>()
                .with_context(|| format!("Malformed embedding for '{}'", word))?;
            if vector.len() != dimensions {
                return Err(anyhow!(
                    "Embedding for '{}' has {} dimensions, expected {}",
                    word,
                    vector.len(),
                    dimensions
                ));
            }
            vectors.insert(word.to_string(), vector);
        }

        info!(
            target: TARGET_DATASET,
            "Loaded {} embeddings with {} dimensions from {}",
            vectors.len(),
            dimensions,
            path.display()
        );
        Ok(Self {
            dimensions,
            vectors,
        })
    }

    /// Builds embeddings from in-memory vectors. All vectors must share one
    /// dimensionality.
    pub fn from_vectors(vectors: HashMap<String, Vec<f32>>) -> Result<Self> {
        let dimensions = vectors
            .values()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| anyhow!("Embedding vocabulary is empty"))?;
        if let Some((word, vector)) = vectors.iter().find(|(_, v)| v.len() != dimensions) {
            return Err(anyhow!(
                "Embedding for '{}' has {} dimensions, expected {}",
                word,
                vector.len(),
                dimensions
            ));
        }
        Ok(Self {
            dimensions,
            vectors,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(|v| v.as_slice())
    }

    /// Cosine similarity between two word vectors, or None if either word is
    /// out of vocabulary.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let va = self.vector(a)?;
        let vb = self.vector(b)?;
        Some(cosine_similarity(va, vb))
    }

    /// Sums the vectors of all in-vocabulary tokens. Out-of-vocabulary
    /// tokens are skipped; if none qualify the result is the zero vector of
    /// the embedding dimensionality.
    pub fn vector_sum(&self, tokens: &[String]) -> Vec<f32> {
        let mut total = vec![0.0; self.dimensions];
        for token in tokens {
            if let Some(vector) = self.vectors.get(token) {
                for (slot, value) in total.iter_mut().zip(vector) {
                    *slot += value;
                }
            }
        }
        total
    }
}

/// Cosine similarity of two vectors. Zero-norm vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toy_embeddings() -> WordEmbeddings {
        let mut vectors = HashMap::new();
        vectors.insert("cat".to_string(), vec![1.0, 0.0, 0.0]);
        vectors.insert("dog".to_string(), vec![0.9, 0.1, 0.0]);
        vectors.insert("car".to_string(), vec![0.0, 1.0, 0.0]);
        vectors.insert("bus".to_string(), vec![0.0, 0.9, 0.1]);
        WordEmbeddings::from_vectors(vectors).unwrap()
    }

    #[test]
    fn test_similarity_is_cosine_of_word_vectors() {
        let emb = toy_embeddings();
        let sim = emb.similarity("cat", "cat").unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
        let sim = emb.similarity("cat", "car").unwrap();
        assert!(sim.abs() < 1e-9);
        assert!(emb.similarity("cat", "unicorn").is_none());
    }

    #[test]
    fn test_vector_sum_skips_oov_tokens() {
        let emb = toy_embeddings();
        let sum = emb.vector_sum(&["cat".to_string(), "unicorn".to_string()]);
        assert_eq!(sum, vec![1.0, 0.0, 0.0]);
        // No in-vocabulary tokens at all: the zero vector.
        let sum = emb.vector_sum(&["unicorn".to_string()]);
        assert_eq!(sum, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_word2vec_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "2 3").unwrap();
        writeln!(f, "cat 1.0 0.0 0.0").unwrap();
        writeln!(f, "dog 0.5 0.5 0.0").unwrap();

        let emb = WordEmbeddings::load_word2vec_text(&path).unwrap();
        assert_eq!(emb.dimensions(), 3);
        assert!(emb.contains("cat"));
        assert_eq!(emb.vector("dog").unwrap(), &[0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_load_rejects_bad_row_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "1 3").unwrap();
        writeln!(f, "cat 1.0 0.0").unwrap();

        let err = WordEmbeddings::load_word2vec_text(&path).unwrap_err();
        assert!(err.to_string().contains("dimensions"));
    }
}
