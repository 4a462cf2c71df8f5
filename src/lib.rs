//! solemn-css: flags offensive words in CSS
//!
//! Stylesheets are parsed, their top-level comments, selectors and
//! declarations collected, and every piece of text matched against a word
//! dictionary. Each match becomes a [`Violation`] carrying its source position.
//!
//! ```text
//! source -> parser -> Stylesheet -> collector -> CodeTexts -> Detector -> Vec<Violation>
//! ```

pub mod collector;
pub mod config;
pub mod detector;
pub mod dictionary;
pub mod output;
pub mod parser;
pub mod violation;

pub use collector::{collect, CodeTexts, CollectError};
pub use config::{CliOptions, Config, ConfigError};
pub use detector::{DetectError, Detector, ScanStatistics};
pub use dictionary::{Dictionary, DictionaryError, MatchCounts, Matcher, WordTable};
pub use output::report_violations;
pub use parser::{parse, ParseError, Position, Stylesheet};
pub use violation::{Violation, ViolationKind};
