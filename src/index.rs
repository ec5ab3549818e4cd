use crate::catalog_loader::FaqEntry;
use crate::embedding::EmbeddingModel;
use crate::encoder;
use rayon::prelude::*;

/// Parallel arrays over the catalog: `questions`, `answers` and the cached
/// sentence vectors share indices and are immutable after construction.
#[derive(Debug)]
pub struct CatalogIndex {
    questions: Vec<String>,
    answers: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl CatalogIndex {
    /// Precompute a sentence vector for every catalog entry. The token
    /// sequences must come from the same normalizer pass used for training
    /// so that cached and on-demand encodings agree.
    pub fn build(
        entries: Vec<FaqEntry>,
        token_sequences: &[Vec<String>],
        model: &EmbeddingModel,
    ) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("Cannot build an index over an empty catalog".to_string());
        }
        if entries.len() != token_sequences.len() {
            return Err(format!(
                "Catalog size mismatch: {} entries, {} token sequences",
                entries.len(),
                token_sequences.len()
            ));
        }

        let vectors: Vec<Vec<f32>> = token_sequences
            .par_iter()
            .map(|tokens| encoder::sentence_vector(tokens, model))
            .collect();

        let (questions, answers) = entries
            .into_iter()
            .map(|entry| (entry.question, entry.answer))
            .unzip();

        Ok(CatalogIndex {
            questions,
            answers,
            vectors,
        })
    }

    /// Scan every cached vector and return the best-scoring index with its
    /// cosine similarity. Ties resolve to the lowest index because the scan
    /// runs in catalog order with a strict-greater update. Thresholding is
    /// the caller's concern.
    pub fn best_match(&self, query: &[f32]) -> (usize, f32) {
        let mut best_index = 0usize;
        let mut best_score = cosine_similarity(query, &self.vectors[0]);

        for (i, vector) in self.vectors.iter().enumerate().skip(1) {
            let score = cosine_similarity(query, vector);
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }

        (best_index, best_score)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, index: usize) -> &str {
        &self.questions[index]
    }

    pub fn answer(&self, index: usize) -> &str {
        &self.answers[index]
    }

    pub fn vector(&self, index: usize) -> &[f32] {
        &self.vectors[index]
    }
}

/// Cosine similarity, defined as 0.0 when either norm is zero or the
/// lengths disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingConfig, EmbeddingModel};

    fn entry(question: &str, answer: &str) -> FaqEntry {
        FaqEntry {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    fn build_index() -> (CatalogIndex, EmbeddingModel) {
        let sequences: Vec<Vec<String>> = vec![
            vec!["atidaryti".into(), "sąskaitą".into()],
            vec!["pavedimas".into(), "kainuoja".into()],
        ];
        let model = EmbeddingModel::train(&sequences, &EmbeddingConfig::default()).unwrap();
        let entries = vec![
            entry("Kaip atidaryti sąskaitą?", "Eikite į filialą."),
            entry("Kiek kainuoja pavedimas?", "Pavedimas kainuoja 0,40 Eur."),
        ];
        let index = CatalogIndex::build(entries, &sequences, &model).unwrap();
        (index, model)
    }

    #[test]
    fn cosine_of_a_nonzero_vector_with_itself_is_one() {
        let v = vec![0.3f32, -1.2, 0.7, 2.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_zero_for_zero_norm_or_mismatched_lengths() {
        let zero = vec![0.0f32; 4];
        let v = vec![1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&v, &v[..3]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn best_match_is_deterministic() {
        let (index, _model) = build_index();
        let query = index.vector(1).to_vec();
        let first = index.best_match(&query);
        for _ in 0..5 {
            assert_eq!(index.best_match(&query), first);
        }
    }

    #[test]
    fn best_match_finds_own_entry_with_maximal_score() {
        let (index, _model) = build_index();
        for i in 0..index.len() {
            let (best, score) = index.best_match(&index.vector(i).to_vec());
            assert_eq!(best, i);
            assert!((score - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn ties_resolve_to_the_lowest_index() {
        let sequences: Vec<Vec<String>> = vec![
            vec!["pavedimas".into(), "kainuoja".into()],
            vec!["pavedimas".into(), "kainuoja".into()],
        ];
        let model = EmbeddingModel::train(&sequences, &EmbeddingConfig::default()).unwrap();
        let entries = vec![
            entry("Kiek kainuoja pavedimas?", "pirmas"),
            entry("Kiek kainuoja pavedimas?", "antras"),
        ];
        let index = CatalogIndex::build(entries, &sequences, &model).unwrap();

        let (best, _) = index.best_match(&index.vector(1).to_vec());
        assert_eq!(best, 0);
        assert_eq!(index.answer(best), "pirmas");
    }

    #[test]
    fn zero_query_scores_zero_everywhere() {
        let (index, model) = build_index();
        let zero = vec![0.0f32; model.vector_size()];
        let (best, score) = index.best_match(&zero);
        assert_eq!(best, 0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn build_rejects_mismatched_lengths_and_empty_catalogs() {
        let sequences: Vec<Vec<String>> = vec![vec!["pavedimas".into(), "kainuoja".into()]];
        let model = EmbeddingModel::train(&sequences, &EmbeddingConfig::default()).unwrap();

        assert!(CatalogIndex::build(Vec::new(), &sequences, &model).is_err());

        let entries = vec![
            entry("Kiek kainuoja pavedimas?", "a"),
            entry("Kita eilutė", "b"),
        ];
        assert!(CatalogIndex::build(entries, &sequences, &model).is_err());
    }
}
