use crate::stopwords::StopwordSet;

/// Tokens of this length or shorter carry no matching signal and are dropped.
const MAX_DROPPED_LEN: usize = 2;

#[derive(Debug)]
pub struct Normalizer {
    stopwords: StopwordSet,
}

impl Normalizer {
    pub fn new(stopwords: StopwordSet) -> Self {
        Normalizer { stopwords }
    }

    /// Turn raw text into a canonical token sequence: lowercase, split on
    /// non-alphabetic boundaries, drop stopwords and short tokens.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphabetic())
            .filter(|word| word.chars().count() > MAX_DROPPED_LEN)
            .filter(|word| !self.stopwords.contains(word))
            .map(|word| word.to_string())
            .collect()
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }
}
