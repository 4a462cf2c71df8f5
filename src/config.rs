//! Configuration handling for solemn-css

use crate::dictionary::{Dictionary, DictionaryError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("Failed to parse JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("Failed to parse YAML config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] globset::Error),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
}

/// Config file names searched for, nearest directory first
pub const CONFIG_NAMES: [&str; 6] = [
    ".solemncssrc.json",
    ".solemncssrc.yaml",
    ".solemncssrc.yml",
    ".solemncssrc",
    "solemncss.json",
    "solemncss.yaml",
];

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Dictionary file replacing the built-in one
    pub dictionary_path: Option<PathBuf>,
    /// Extra words per category
    pub extra_words: BTreeMap<String, Vec<String>>,
    /// Words never flagged
    pub allowed_words: Vec<String>,
    /// Raw exclude patterns (kept for merging)
    pub exclude: Vec<String>,
    /// Compiled exclude patterns
    pub exclude_patterns: GlobSet,
    /// Number of parallel jobs (0 = auto)
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            extra_words: BTreeMap::new(),
            allowed_words: Vec::new(),
            exclude: Vec::new(),
            exclude_patterns: GlobSet::empty(),
            jobs: 0,
        }
    }
}

/// CLI options to merge into config
#[derive(Debug, Default)]
pub struct CliOptions {
    /// Dictionary file (replaces config if set)
    pub dictionary_path: Option<PathBuf>,
    /// Words to allow (adds to config)
    pub allowed_words: Vec<String>,
    /// Exclude patterns (adds to config)
    pub exclude: Vec<String>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Configuration file format (.solemncssrc.json or .solemncssrc.yaml)
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Dictionary file, relative to the config file
    #[serde(default)]
    pub dictionary: Option<PathBuf>,

    /// Extra words: {"category": ["word", ...]}
    #[serde(default)]
    pub words: BTreeMap<String, Vec<String>>,

    /// Words that are never flagged
    #[serde(default)]
    pub allow: Vec<String>,

    /// File patterns to skip
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Number of parallel jobs (0 = auto)
    #[serde(default)]
    pub jobs: usize,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config_file: ConfigFile =
            if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                serde_yaml::from_str(&content)?
            } else {
                serde_json::from_str(&content)?
            };

        // Dictionary paths are relative to the config file
        if let (Some(dictionary), Some(dir)) = (config_file.dictionary.as_mut(), path.parent()) {
            if dictionary.is_relative() {
                *dictionary = dir.join(&*dictionary);
            }
        }

        Self::from_config_file(config_file)
    }

    /// Try to find and load config from standard locations
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let mut current = start_dir.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    let config = Self::from_file(&config_path)?;
                    info!("Using config {}", config_path.display());
                    return Ok(Some((config_path, config)));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Convert a config file into runtime config
    pub fn from_config_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let exclude_patterns = build_globset(&file.exclude)?;

        Ok(Self {
            dictionary_path: file.dictionary,
            extra_words: file.words,
            allowed_words: file.allow,
            exclude: file.exclude,
            exclude_patterns,
            jobs: file.jobs,
        })
    }

    /// Merge CLI options into config
    pub fn merge_cli(&mut self, cli: CliOptions) -> Result<(), ConfigError> {
        if cli.dictionary_path.is_some() {
            self.dictionary_path = cli.dictionary_path;
        }
        self.allowed_words.extend(cli.allowed_words);
        if !cli.exclude.is_empty() {
            self.exclude.extend(cli.exclude);
            self.exclude_patterns = build_globset(&self.exclude)?;
        }
        if let Some(jobs) = cli.jobs {
            self.jobs = jobs;
        }
        Ok(())
    }

    /// Check if a file should be skipped
    pub fn is_file_excluded(&self, file_path: &Path) -> bool {
        self.exclude_patterns.is_match(file_path)
    }

    /// Build the dictionary this configuration describes
    pub fn build_dictionary(&self) -> Result<Dictionary, ConfigError> {
        let mut dictionary = match &self.dictionary_path {
            Some(path) => Dictionary::from_file(path)?,
            None => Dictionary::default(),
        };

        for (category, words) in &self.extra_words {
            dictionary.extend(category, words.iter().cloned())?;
        }
        if !self.allowed_words.is_empty() {
            dictionary.allow(&self.allowed_words)?;
        }

        Ok(dictionary)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Matcher;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "dictionary": "words.json",
            "words": {"bad": ["inappropriate"]},
            "allow": ["damn"],
            "exclude": ["**/vendor/**", "*.min.css"],
            "jobs": 2
        }"#;

        let config_file: ConfigFile = serde_json::from_str(json).unwrap();
        let config = Config::from_config_file(config_file).unwrap();

        assert_eq!(config.dictionary_path, Some(PathBuf::from("words.json")));
        assert_eq!(
            config.extra_words.get("bad"),
            Some(&vec!["inappropriate".to_string()])
        );
        assert_eq!(config.allowed_words, vec!["damn".to_string()]);
        assert_eq!(config.jobs, 2);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.dictionary_path.is_none());
        assert!(config.extra_words.is_empty());
        assert!(config.allowed_words.is_empty());
        assert_eq!(config.jobs, 0);
        assert!(!config.is_file_excluded(Path::new("style.css")));
    }

    #[test]
    fn test_config_file_default() {
        let config_file = ConfigFile::default();
        assert!(config_file.dictionary.is_none());
        assert!(config_file.words.is_empty());
        assert!(config_file.allow.is_empty());
        assert!(config_file.exclude.is_empty());
        assert_eq!(config_file.jobs, 0);
    }

    #[test]
    fn test_is_file_excluded() {
        let json = r#"{ "exclude": ["**/vendor/**", "*.min.css"] }"#;
        let config_file: ConfigFile = serde_json::from_str(json).unwrap();
        let config = Config::from_config_file(config_file).unwrap();

        assert!(config.is_file_excluded(Path::new("src/vendor/reset.css")));
        assert!(config.is_file_excluded(Path::new("app.min.css")));
        assert!(!config.is_file_excluded(Path::new("app.css")));
    }

    #[test]
    fn test_invalid_glob() {
        let json = r#"{ "exclude": ["[unclosed"] }"#;
        let config_file: ConfigFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Config::from_config_file(config_file),
            Err(ConfigError::InvalidGlob(_))
        ));
    }

    #[test]
    fn test_merge_cli() {
        let mut config = Config::default();
        config.allowed_words = vec!["existing".to_string()];

        config
            .merge_cli(CliOptions {
                dictionary_path: Some(PathBuf::from("custom.json")),
                allowed_words: vec!["cli".to_string()],
                exclude: vec!["*.min.css".to_string()],
                jobs: Some(4),
            })
            .unwrap();

        assert_eq!(config.dictionary_path, Some(PathBuf::from("custom.json")));
        assert_eq!(
            config.allowed_words,
            vec!["existing".to_string(), "cli".to_string()]
        );
        assert!(config.is_file_excluded(Path::new("a.min.css")));
        assert_eq!(config.jobs, 4);
    }

    #[test]
    fn test_merge_cli_partial() {
        let mut config = Config::default();
        config.dictionary_path = Some(PathBuf::from("original.json"));
        config.jobs = 2;

        config.merge_cli(CliOptions::default()).unwrap();

        assert_eq!(config.dictionary_path, Some(PathBuf::from("original.json")));
        assert_eq!(config.jobs, 2);
    }

    #[test]
    fn test_build_dictionary_with_words_and_allow() {
        let mut config = Config::default();
        config
            .extra_words
            .insert("bad".to_string(), vec!["inappropriate".to_string()]);
        config.allowed_words = vec!["damn".to_string()];

        let dictionary = config.build_dictionary().unwrap();
        assert!(dictionary.contains_word("inappropriate"));
        assert!(!dictionary.contains_word("damn"));
        assert!(dictionary.word_counts("damn it").is_empty());
    }

    #[test]
    fn test_find_and_load_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".solemncssrc.yaml"),
            "dictionary: words.yaml\nallow:\n  - crap\n",
        )
        .unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let (path, config) = Config::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(path, dir.path().join(".solemncssrc.yaml"));
        assert_eq!(config.dictionary_path, Some(dir.path().join("words.yaml")));
        assert_eq!(config.allowed_words, vec!["crap".to_string()]);
    }

    #[test]
    fn test_from_file_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".solemncssrc.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::ParseJson(_))
        ));
    }
}
