//! Violation types for detection results

use crate::dictionary::MatchCounts;
use crate::parser::Position;
use std::fmt;

/// Which part of the stylesheet the flagged text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViolationKind {
    PropertyName,
    PropertyValue,
    Selector,
    Comment,
}

impl ViolationKind {
    /// All kinds, in report order
    pub const ALL: [ViolationKind; 4] = [
        ViolationKind::PropertyName,
        ViolationKind::PropertyValue,
        ViolationKind::Selector,
        ViolationKind::Comment,
    ];

    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::PropertyName => "property name",
            ViolationKind::PropertyValue => "property value",
            ViolationKind::Selector => "selector",
            ViolationKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of flagged text at a source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// File label the text was read from
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// The inspected text, untrimmed
    pub text: String,
    /// Occurrences per category
    pub issues: MatchCounts,
}

impl Violation {
    /// Create a new violation without issues
    pub fn new(
        kind: ViolationKind,
        file: impl Into<String>,
        position: Position,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            file: file.into(),
            line: position.line,
            column: position.column,
            text: text.into(),
            issues: MatchCounts::new(),
        }
    }

    /// Attach issue counts
    pub fn with_issues(mut self, issues: MatchCounts) -> Self {
        self.issues = issues;
        self
    }

    /// Text as shown in reports
    pub fn display_text(&self) -> &str {
        self.text.trim()
    }

    /// Sum of all issue counts
    pub fn issue_total(&self) -> usize {
        self.issues.values().sum()
    }
}
