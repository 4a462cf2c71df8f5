//! Word dictionary - decides which words in a piece of text are offensive
//!
//! A dictionary is a table of `category -> words`. Words match
//! case-insensitively on word boundaries, so `.idiot-box` matches `idiot`
//! while `.idiotic` does not.

use log::info;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Category used when a matcher only reports individual words
pub const DEFAULT_CATEGORY: &str = "profanity";

/// `category -> words`
pub type WordTable = BTreeMap<String, Vec<String>>;

/// `word or category -> occurrences`
pub type MatchCounts = BTreeMap<String, usize>;

static DEFAULT_TABLE: Lazy<WordTable> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/dictionary.json"))
        .expect("embedded dictionary is valid JSON")
});

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Failed to read dictionary {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse JSON dictionary: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("Failed to parse YAML dictionary: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("Empty word in category '{0}'")]
    EmptyWord(String),
    #[error("Invalid word pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Anything that can find flagged words in text
pub trait Matcher {
    /// Occurrences of each flagged word in `text`; empty when nothing matches
    fn word_counts(&self, text: &str) -> MatchCounts;

    /// Occurrences per category. Matchers without categories report every
    /// word under [`DEFAULT_CATEGORY`].
    fn category_counts(&self, text: &str) -> MatchCounts {
        let total: usize = self.word_counts(text).values().sum();
        let mut counts = MatchCounts::new();
        if total > 0 {
            counts.insert(DEFAULT_CATEGORY.to_string(), total);
        }
        counts
    }
}

#[derive(Debug, Clone)]
struct WordPattern {
    word: String,
    categories: Vec<String>,
    regex: Regex,
}

/// A compiled word table
#[derive(Debug, Clone)]
pub struct Dictionary {
    table: WordTable,
    patterns: Vec<WordPattern>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::from_table(DEFAULT_TABLE.clone()).expect("embedded dictionary compiles")
    }
}

impl Dictionary {
    /// Build a dictionary from a `category -> words` table
    pub fn from_table(table: WordTable) -> Result<Self, DictionaryError> {
        let mut normalized = WordTable::new();
        for (category, words) in table {
            let entry = normalized.entry(category.clone()).or_default();
            for word in words {
                let word = word.trim().to_lowercase();
                if word.is_empty() {
                    return Err(DictionaryError::EmptyWord(category));
                }
                if !entry.contains(&word) {
                    entry.push(word);
                }
            }
        }
        normalized.retain(|_, words| !words.is_empty());

        let patterns = compile(&normalized)?;
        Ok(Self {
            table: normalized,
            patterns,
        })
    }

    /// Load a table from a JSON or YAML (`.yaml`/`.yml`) file
    pub fn from_file(path: &Path) -> Result<Self, DictionaryError> {
        let content = fs::read_to_string(path).map_err(|source| DictionaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table: WordTable = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        let dictionary = Self::from_table(table)?;
        info!(
            "Loaded {} words in {} categories from {}",
            dictionary.word_count(),
            dictionary.table.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Add words to a category, creating it if needed
    pub fn extend<I, S>(&mut self, category: &str, words: I) -> Result<(), DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = self.table.clone();
        table
            .entry(category.to_string())
            .or_default()
            .extend(words.into_iter().map(Into::<String>::into));
        *self = Self::from_table(table)?;
        Ok(())
    }

    /// Remove words from every category
    pub fn allow<I, S>(&mut self, words: I) -> Result<(), DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .collect();
        let mut table = self.table.clone();
        for words in table.values_mut() {
            words.retain(|w| !allowed.contains(w));
        }
        *self = Self::from_table(table)?;
        Ok(())
    }

    /// The full `category -> words` table
    pub fn categories(&self) -> &WordTable {
        &self.table
    }

    /// Number of distinct words
    pub fn word_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        self.patterns.iter().any(|p| p.word == word)
    }
}

fn compile(table: &WordTable) -> Result<Vec<WordPattern>, DictionaryError> {
    // word -> categories it is listed under
    let mut by_word: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (category, words) in table {
        for word in words {
            by_word
                .entry(word.as_str())
                .or_default()
                .push(category.clone());
        }
    }

    by_word
        .into_iter()
        .map(|(word, categories)| -> Result<WordPattern, DictionaryError> {
            let regex = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
                .case_insensitive(true)
                .build()?;
            Ok(WordPattern {
                word: word.to_string(),
                categories,
                regex,
            })
        })
        .collect()
}

impl Matcher for Dictionary {
    fn word_counts(&self, text: &str) -> MatchCounts {
        let mut counts = MatchCounts::new();
        if text.is_empty() {
            return counts;
        }
        for pattern in &self.patterns {
            let count = pattern.regex.find_iter(text).count();
            if count > 0 {
                counts.insert(pattern.word.clone(), count);
            }
        }
        counts
    }

    fn category_counts(&self, text: &str) -> MatchCounts {
        let mut counts = MatchCounts::new();
        if text.is_empty() {
            return counts;
        }
        for pattern in &self.patterns {
            let count = pattern.regex.find_iter(text).count();
            if count == 0 {
                continue;
            }
            for category in &pattern.categories {
                *counts.entry(category.clone()).or_insert(0) += count;
            }
        }
        counts
    }
}
