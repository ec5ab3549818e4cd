use crate::embedding::EmbeddingModel;

/// Aggregate token vectors into one fixed-size sentence vector: the
/// element-wise mean of every token that has a representation. An empty
/// sequence, or one where no token has a vector, yields the zero vector.
pub fn sentence_vector(tokens: &[String], model: &EmbeddingModel) -> Vec<f32> {
    let mut sum = vec![0.0f32; model.vector_size()];
    let mut found = 0usize;

    for token in tokens {
        if let Some(vector) = model.vector(token) {
            for (s, v) in sum.iter_mut().zip(vector.iter()) {
                *s += v;
            }
            found += 1;
        }
    }

    if found > 0 {
        let scale = 1.0 / found as f32;
        sum.iter_mut().for_each(|s| *s *= scale);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingConfig, EmbeddingModel};

    fn model() -> EmbeddingModel {
        let corpus: Vec<Vec<String>> = vec![
            vec!["sąskaitą".into(), "atidaryti".into()],
            vec!["pavedimas".into(), "kainuoja".into()],
        ];
        EmbeddingModel::train(&corpus, &EmbeddingConfig::default()).unwrap()
    }

    #[test]
    fn empty_sequence_yields_zero_vector() {
        let m = model();
        let v = sentence_vector(&[], &m);
        assert_eq!(v.len(), m.vector_size());
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn all_unknown_tokens_yield_zero_vector() {
        let m = model();
        let tokens = vec!["temperatūra".to_string(), "rytoj".to_string()];
        let v = sentence_vector(&tokens, &m);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn output_is_the_mean_of_token_vectors() {
        let m = model();
        let a = m.vector("sąskaitą").unwrap();
        let b = m.vector("pavedimas").unwrap();
        let tokens = vec!["sąskaitą".to_string(), "pavedimas".to_string()];
        let v = sentence_vector(&tokens, &m);
        for i in 0..m.vector_size() {
            let expected = (a[i] + b[i]) / 2.0;
            assert!((v[i] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn unknown_tokens_are_excluded_from_the_mean() {
        let m = model();
        let known = vec!["kainuoja".to_string()];
        let mixed = vec!["kainuoja".to_string(), "nežinomas".to_string()];
        assert_eq!(sentence_vector(&known, &m), sentence_vector(&mixed, &m));
    }

    #[test]
    fn identical_inputs_give_identical_vectors() {
        let m = model();
        let tokens = vec!["atidaryti".to_string(), "kainuoja".to_string()];
        assert_eq!(sentence_vector(&tokens, &m), sentence_vector(&tokens, &m));
    }
}
