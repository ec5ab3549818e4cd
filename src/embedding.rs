use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Instant;

const NGRAM_MIN: usize = 3;
const NGRAM_MAX: usize = 6;
const NGRAM_BUCKETS: usize = 1 << 15;
const MIN_LEARNING_RATE: f32 = 1e-4;
const MAX_EXP: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Unknown tokens have no vector and are excluded from aggregation.
    WholeWord,
    /// Unknown tokens compose a vector from hashed character n-grams.
    SubwordAware,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub mode: EmbeddingMode,
    pub vector_size: usize,
    pub window: usize,
    pub min_count: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub negative: usize,
    pub seed: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            mode: EmbeddingMode::WholeWord,
            vector_size: 100,
            window: 5,
            min_count: 1,
            epochs: 40,
            learning_rate: 0.025,
            negative: 5,
            seed: 1,
        }
    }
}

#[derive(Debug)]
pub struct EmbeddingModel {
    mode: EmbeddingMode,
    vector_size: usize,
    vocab: HashMap<String, usize>,
    word_vectors: Vec<Vec<f32>>,
    word_ngrams: Vec<Vec<usize>>,
    ngram_table: Vec<Vec<f32>>,
}

impl EmbeddingModel {
    /// Train skip-gram vectors with negative sampling over the supplied
    /// corpus. The corpus is the full set of normalized catalog questions;
    /// training runs exactly once per chatbot instance.
    pub fn train(corpus: &[Vec<String>], config: &EmbeddingConfig) -> Result<Self, String> {
        if config.vector_size == 0 {
            return Err("Embedding vector size must be greater than zero".to_string());
        }

        let epochs = env_epochs(config.epochs).max(1);
        let started = Instant::now();

        // Vocabulary in first-occurrence order so training is reproducible.
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for sentence in corpus {
            for token in sentence {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let min_count = config.min_count.max(1);
        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut frequencies: Vec<usize> = Vec::new();
        for sentence in corpus {
            for token in sentence {
                if counts[token.as_str()] >= min_count && !vocab.contains_key(token.as_str()) {
                    vocab.insert(token.clone(), frequencies.len());
                    frequencies.push(counts[token.as_str()]);
                }
            }
        }

        if vocab.is_empty() {
            return Err(
                "Cannot train embeddings: corpus is empty after normalization".to_string(),
            );
        }

        let sentences: Vec<Vec<usize>> = corpus
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .filter_map(|token| vocab.get(token.as_str()).copied())
                    .collect::<Vec<usize>>()
            })
            .filter(|ids| !ids.is_empty())
            .collect();

        let dim = config.vector_size;
        let vocab_size = frequencies.len();
        let mut rng = StdRng::seed_from_u64(config.seed);

        let bound = 0.5 / dim as f32;
        let mut word_vectors = random_matrix(vocab_size, dim, bound, &mut rng);
        let mut output_vectors = vec![vec![0.0f32; dim]; vocab_size];

        let mut index_by_word: Vec<&str> = vec![""; vocab_size];
        for (word, &id) in &vocab {
            index_by_word[id] = word.as_str();
        }
        let word_ngrams: Vec<Vec<usize>> = match config.mode {
            EmbeddingMode::WholeWord => vec![Vec::new(); vocab_size],
            EmbeddingMode::SubwordAware => {
                index_by_word.iter().map(|word| ngram_buckets(word)).collect()
            }
        };
        let mut ngram_table = match config.mode {
            EmbeddingMode::WholeWord => Vec::new(),
            EmbeddingMode::SubwordAware => random_matrix(NGRAM_BUCKETS, dim, bound, &mut rng),
        };

        // Noise distribution: unigram frequency raised to 0.75, as a
        // cumulative table sampled by binary search.
        let mut noise_cdf: Vec<f32> = Vec::with_capacity(vocab_size);
        let mut running = 0.0f32;
        for &freq in &frequencies {
            running += (freq as f32).powf(0.75);
            noise_cdf.push(running);
        }
        let noise_total = running;

        let words_per_epoch: usize = sentences.iter().map(Vec::len).sum();
        let total_words = (words_per_epoch * epochs).max(1) as f32;
        let mut processed_words = 0usize;

        let mut hidden = vec![0.0f32; dim];
        let mut error = vec![0.0f32; dim];

        for epoch in 0..epochs {
            for sentence in &sentences {
                for (pos, &center) in sentence.iter().enumerate() {
                    let alpha = (config.learning_rate
                        * (1.0 - processed_words as f32 / total_words))
                        .max(MIN_LEARNING_RATE);
                    processed_words += 1;

                    // Symmetric window, randomly reduced per position.
                    let span = rng.gen_range(1..=config.window.max(1));
                    let start = pos.saturating_sub(span);
                    let end = (pos + span + 1).min(sentence.len());

                    for ctx_pos in start..end {
                        if ctx_pos == pos {
                            continue;
                        }
                        let target = sentence[ctx_pos];

                        compose_hidden(
                            &mut hidden,
                            center,
                            &word_vectors,
                            &word_ngrams,
                            &ngram_table,
                        );
                        error.iter_mut().for_each(|e| *e = 0.0);

                        for sample in 0..=config.negative {
                            let (label, out) = if sample == 0 {
                                (1.0f32, target)
                            } else {
                                let drawn = sample_noise(&noise_cdf, noise_total, &mut rng);
                                if drawn == target {
                                    continue;
                                }
                                (0.0f32, drawn)
                            };

                            let dot: f32 = hidden
                                .iter()
                                .zip(output_vectors[out].iter())
                                .map(|(h, o)| h * o)
                                .sum();
                            let gradient = (label - sigmoid(dot)) * alpha;
                            for ((e, o), h) in error
                                .iter_mut()
                                .zip(output_vectors[out].iter_mut())
                                .zip(hidden.iter())
                            {
                                *e += gradient * *o;
                                *o += gradient * *h;
                            }
                        }

                        apply_error(
                            &error,
                            center,
                            &mut word_vectors,
                            &word_ngrams,
                            &mut ngram_table,
                        );
                    }
                }
            }
            debug!("Embedding epoch {}/{} complete", epoch + 1, epochs);
        }

        info!(
            "Trained {:?} embeddings: {} words, dim {}, {} epochs in {:.0?}",
            config.mode,
            vocab_size,
            dim,
            epochs,
            started.elapsed()
        );

        Ok(EmbeddingModel {
            mode: config.mode,
            vector_size: dim,
            vocab,
            word_vectors,
            word_ngrams,
            ngram_table,
        })
    }

    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    /// Look up (or compose) the vector for a token. Whole-word mode returns
    /// `None` for out-of-vocabulary tokens; subword mode always produces a
    /// representation for a non-empty token.
    pub fn vector(&self, token: &str) -> Option<Vec<f32>> {
        match self.mode {
            EmbeddingMode::WholeWord => self
                .vocab
                .get(token)
                .map(|&id| self.word_vectors[id].clone()),
            EmbeddingMode::SubwordAware => {
                if token.is_empty() {
                    return None;
                }
                Some(self.compose_subword(token))
            }
        }
    }

    fn compose_subword(&self, token: &str) -> Vec<f32> {
        let mut sum = vec![0.0f32; self.vector_size];
        let mut parts = 0usize;

        if let Some(&id) = self.vocab.get(token) {
            add_assign(&mut sum, &self.word_vectors[id]);
            parts += 1;
            for &bucket in &self.word_ngrams[id] {
                add_assign(&mut sum, &self.ngram_table[bucket]);
                parts += 1;
            }
        } else {
            for bucket in ngram_buckets(token) {
                add_assign(&mut sum, &self.ngram_table[bucket]);
                parts += 1;
            }
        }

        if parts > 0 {
            let scale = 1.0 / parts as f32;
            sum.iter_mut().for_each(|v| *v *= scale);
        }
        sum
    }
}

fn compose_hidden(
    hidden: &mut [f32],
    center: usize,
    word_vectors: &[Vec<f32>],
    word_ngrams: &[Vec<usize>],
    ngram_table: &[Vec<f32>],
) {
    hidden.copy_from_slice(&word_vectors[center]);
    let buckets = &word_ngrams[center];
    if buckets.is_empty() {
        return;
    }
    for &bucket in buckets {
        for (h, v) in hidden.iter_mut().zip(ngram_table[bucket].iter()) {
            *h += v;
        }
    }
    let scale = 1.0 / (1 + buckets.len()) as f32;
    hidden.iter_mut().for_each(|h| *h *= scale);
}

fn apply_error(
    error: &[f32],
    center: usize,
    word_vectors: &mut [Vec<f32>],
    word_ngrams: &[Vec<usize>],
    ngram_table: &mut [Vec<f32>],
) {
    let buckets = &word_ngrams[center];
    let scale = 1.0 / (1 + buckets.len()) as f32;
    for (v, e) in word_vectors[center].iter_mut().zip(error.iter()) {
        *v += e * scale;
    }
    for &bucket in buckets {
        for (v, e) in ngram_table[bucket].iter_mut().zip(error.iter()) {
            *v += e * scale;
        }
    }
}

fn random_matrix(rows: usize, dim: usize, bound: f32, rng: &mut StdRng) -> Vec<Vec<f32>> {
    (0..rows)
        .map(|_| (0..dim).map(|_| rng.gen_range(-bound..bound)).collect())
        .collect()
}

fn sample_noise(cdf: &[f32], total: f32, rng: &mut StdRng) -> usize {
    let r = rng.gen::<f32>() * total;
    cdf.partition_point(|&x| x < r).min(cdf.len() - 1)
}

fn sigmoid(x: f32) -> f32 {
    if x > MAX_EXP {
        1.0
    } else if x < -MAX_EXP {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

fn add_assign(sum: &mut [f32], other: &[f32]) {
    for (s, o) in sum.iter_mut().zip(other.iter()) {
        *s += o;
    }
}

/// Character n-grams of the `<`-`>`-wrapped token, hashed into a fixed
/// bucket table so every token has a composable representation.
fn ngram_buckets(token: &str) -> Vec<usize> {
    let wrapped: Vec<char> = std::iter::once('<')
        .chain(token.chars())
        .chain(std::iter::once('>'))
        .collect();

    let mut buckets = Vec::new();
    for n in NGRAM_MIN..=NGRAM_MAX {
        if wrapped.len() < n {
            break;
        }
        for window in wrapped.windows(n) {
            let gram: String = window.iter().collect();
            buckets.push(hash_bytes(gram.as_bytes()) as usize % NGRAM_BUCKETS);
        }
    }
    buckets
}

fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut hash = 0u32;
    for &b in bytes {
        hash = hash.wrapping_mul(31).wrapping_add(b as u32);
    }
    hash
}

fn env_epochs(default: usize) -> usize {
    std::env::var("FAQBOT_TRAIN_EPOCHS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
