use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Short Lithuanian function words the base lists tend to miss.
const SUPPLEMENTARY_WORDS: [&str; 10] = [
    "ir", "bei", "arba", "taip", "ne", "kad", "kur", "kaip", "kokie", "kokia",
];

const LITHUANIAN_LIST: &str = "lt.txt";
const ENGLISH_LIST: &str = "en.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwordSource {
    Lithuanian,
    EnglishFallback,
}

#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
    source: StopwordSource,
}

impl StopwordSet {
    /// Load the base stopword list from `dir`, preferring the Lithuanian
    /// list and degrading to the English one when it is unavailable.
    /// The supplementary words are merged in either way.
    pub fn load(dir: &Path) -> Result<Self, String> {
        let (mut words, source) = match read_word_list(&dir.join(LITHUANIAN_LIST)) {
            Ok(words) => (words, StopwordSource::Lithuanian),
            Err(lt_err) => {
                warn!(
                    "Lithuanian stopword list unavailable ({}), falling back to English",
                    lt_err
                );
                match read_word_list(&dir.join(ENGLISH_LIST)) {
                    Ok(words) => (words, StopwordSource::EnglishFallback),
                    Err(en_err) => {
                        return Err(format!(
                            "No stopword list could be loaded from {}: {}; {}",
                            dir.display(),
                            lt_err,
                            en_err
                        ));
                    }
                }
            }
        };

        for word in SUPPLEMENTARY_WORDS {
            words.insert(word.to_string());
        }

        info!(
            "Loaded {} stopwords ({:?} base list)",
            words.len(),
            source
        );

        Ok(StopwordSet { words, source })
    }

    /// Build a set directly from an iterator of words. Used by tests and by
    /// callers that embed their own list.
    pub fn from_words<I, S>(words: I, source: StopwordSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        for word in SUPPLEMENTARY_WORDS {
            set.insert(word.to_string());
        }
        StopwordSet { words: set, source }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn source(&self) -> StopwordSource {
        self.source
    }
}

fn read_word_list(path: &Path) -> Result<HashSet<String>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read stopword list {}: {}", path.display(), e))?;

    let words: HashSet<String> = text
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if words.is_empty() {
        return Err(format!("Stopword list {} is empty", path.display()));
    }

    Ok(words)
}
