//! Detector - orchestrates parsing, collection and word matching

use crate::collector::{collect, CodeTexts, CollectError};
use crate::dictionary::{Dictionary, Matcher};
use crate::parser::{parse, ParseError, Position};
use crate::violation::{Violation, ViolationKind};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    MalformedTree(#[from] CollectError),
}

/// Statistics about detection results
#[derive(Debug, Default, Clone)]
pub struct ScanStatistics {
    /// Count per violation kind
    pub per_kind: HashMap<ViolationKind, usize>,
    /// Count per category, summed over all violations
    pub per_category: BTreeMap<String, usize>,
    /// Total files scanned
    pub files_scanned: usize,
    /// Files with at least one violation
    pub files_with_violations: usize,
}

impl ScanStatistics {
    /// Record a violation
    pub fn record(&mut self, violation: &Violation) {
        *self.per_kind.entry(violation.kind).or_insert(0) += 1;
        for (category, count) in &violation.issues {
            *self.per_category.entry(category.clone()).or_insert(0) += count;
        }
    }

    /// Record the outcome of one scanned file
    pub fn record_file(&mut self, violations: &[Violation]) {
        self.files_scanned += 1;
        if !violations.is_empty() {
            self.files_with_violations += 1;
        }
        for violation in violations {
            self.record(violation);
        }
    }

    /// Merge another statistics into this one
    pub fn merge(&mut self, other: &ScanStatistics) {
        for (kind, count) in &other.per_kind {
            *self.per_kind.entry(*kind).or_insert(0) += count;
        }
        for (category, count) in &other.per_category {
            *self.per_category.entry(category.clone()).or_insert(0) += count;
        }
        self.files_scanned += other.files_scanned;
        self.files_with_violations += other.files_with_violations;
    }

    /// Violations of one kind
    pub fn kind_count(&self, kind: ViolationKind) -> usize {
        *self.per_kind.get(&kind).unwrap_or(&0)
    }

    /// Total violations
    pub fn total(&self) -> usize {
        self.per_kind.values().sum()
    }
}

/// Finds flagged words in stylesheets.
///
/// The matcher is owned by the detector; replacing it needs `&mut self`, so it
/// cannot change underneath a running detection.
#[derive(Debug, Clone)]
pub struct Detector<M: Matcher = Dictionary> {
    matcher: M,
}

impl Default for Detector<Dictionary> {
    fn default() -> Self {
        Self::new(Dictionary::default())
    }
}

impl<M: Matcher> Detector<M> {
    /// Create a detector around a matcher
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    /// The active matcher
    pub fn dictionary(&self) -> &M {
        &self.matcher
    }

    /// Replace the active matcher, returning the previous one
    pub fn set_dictionary(&mut self, matcher: M) -> M {
        std::mem::replace(&mut self.matcher, matcher)
    }

    /// Read, parse and inspect a file. Violations are labelled with the path.
    pub fn detect(&self, path: &Path) -> Result<Vec<Violation>, DetectError> {
        let text = fs::read_to_string(path).map_err(|source| DetectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.detect_in_text(&text, &path.display().to_string())
    }

    /// Parse and inspect CSS source, labelling violations with `label`
    pub fn detect_in_text(&self, text: &str, label: &str) -> Result<Vec<Violation>, DetectError> {
        let stylesheet = parse(text)?;
        let texts = collect(&stylesheet)?;
        let violations = self.violations_for(label, &texts);
        debug!("{}: {} violation(s)", label, violations.len());
        Ok(violations)
    }

    /// Match collected texts and build violations.
    ///
    /// Order: each declaration's property name then value, then selectors,
    /// then comments, each group in collection order.
    pub fn violations_for(&self, file: &str, texts: &CodeTexts) -> Vec<Violation> {
        let mut violations = Vec::new();

        for declaration in &texts.declarations {
            violations.extend(self.inspect(
                ViolationKind::PropertyName,
                file,
                declaration.position,
                &declaration.property,
            ));
            violations.extend(self.inspect(
                ViolationKind::PropertyValue,
                file,
                declaration.position,
                &declaration.value,
            ));
        }

        for selector in &texts.selectors {
            violations.extend(self.inspect(
                ViolationKind::Selector,
                file,
                selector.position,
                &selector.selector_text,
            ));
        }

        for comment in &texts.comments {
            violations.extend(self.inspect(
                ViolationKind::Comment,
                file,
                comment.position,
                &comment.text,
            ));
        }

        violations
    }

    fn inspect(
        &self,
        kind: ViolationKind,
        file: &str,
        position: Position,
        text: &str,
    ) -> Option<Violation> {
        if self.matcher.word_counts(text).is_empty() {
            return None;
        }
        let issues = self.matcher.category_counts(text);
        Some(Violation::new(kind, file, position, text).with_issues(issues))
    }
}
