use crate::catalog_loader::{validate_catalog, FaqEntry};
use crate::embedding::{EmbeddingConfig, EmbeddingModel};
use crate::encoder;
use crate::index::CatalogIndex;
use crate::normalizer::Normalizer;
use crate::stopwords::StopwordSet;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Returned whenever no catalog entry clears the similarity threshold.
pub const FALLBACK_MESSAGE: &str = "Atsiprašau, bet negaliu rasti tinkamo atsakymo į jūsų klausimą. Prašome kreiptis į klientų aptarnavimo centrą telefonu 1888 arba atvykti į filialą.";

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub embedding: EmbeddingConfig,
    pub similarity_threshold: f32,
    pub stopword_dir: PathBuf,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        ChatbotConfig {
            embedding: EmbeddingConfig::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            stopword_dir: PathBuf::from("resources/stopwords"),
        }
    }
}

/// The initialized matching core. Construction performs the whole one-time
/// pipeline (stopword loading, catalog normalization, embedding training,
/// vector precomputation) so that query handling can never fail. Callers
/// build one instance and reuse it across queries.
#[derive(Debug)]
pub struct Chatbot {
    normalizer: Normalizer,
    model: EmbeddingModel,
    index: CatalogIndex,
    threshold: f32,
}

impl Chatbot {
    pub fn new(entries: Vec<FaqEntry>, config: ChatbotConfig) -> Result<Self, String> {
        validate_catalog(&entries)?;

        let stopwords = StopwordSet::load(&config.stopword_dir)?;
        let normalizer = Normalizer::new(stopwords);

        let token_sequences: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| normalizer.normalize(&entry.question))
            .collect();

        let model = EmbeddingModel::train(&token_sequences, &config.embedding)?;

        let started = Instant::now();
        let index = CatalogIndex::build(entries, &token_sequences, &model)?;
        info!(
            "Precomputed {} catalog vectors in {:.0?}",
            index.len(),
            started.elapsed()
        );

        Ok(Chatbot {
            normalizer,
            model,
            index,
            threshold: config.similarity_threshold,
        })
    }

    /// Best catalog match for a raw query, or `None` when normalization
    /// leaves nothing to encode. The threshold is not applied here.
    pub fn find_best_match(&self, query: &str) -> Option<(usize, f32)> {
        let tokens = self.normalizer.normalize(query);
        if tokens.is_empty() {
            return None;
        }
        let query_vector = encoder::sentence_vector(&tokens, &self.model);
        Some(self.index.best_match(&query_vector))
    }

    /// Resolve a query to a catalog answer or the fallback message. Never
    /// fails: degenerate inputs resolve to the fallback.
    pub fn get_response(&self, query: &str) -> String {
        match self.find_best_match(query) {
            Some((index, score)) if score >= self.threshold => {
                debug!(
                    "Matched '{}' (score {:.3}) for query '{}'",
                    self.index.question(index),
                    score,
                    query
                );
                self.index.answer(index).to_string()
            }
            Some((index, score)) => {
                debug!(
                    "Best score {:.3} ('{}') below threshold {:.2}, returning fallback",
                    score,
                    self.index.question(index),
                    self.threshold
                );
                FALLBACK_MESSAGE.to_string()
            }
            None => {
                debug!("Query '{}' normalized to nothing, returning fallback", query);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    pub fn catalog_len(&self) -> usize {
        self.index.len()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
