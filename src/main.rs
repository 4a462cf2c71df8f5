//! solemn-css CLI entry point

use clap::Parser;
use log::debug;
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use solemn_css::output::{self, FileReport};
use solemn_css::{
    CliOptions, Config, DetectError, Detector, ScanStatistics, Violation, ViolationKind,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const STDIN_LABEL: &str = "<stdin>";

#[derive(Parser, Debug)]
#[command(name = "solemn-css")]
#[command(
    author,
    version,
    about = "Flags offensive words in CSS comments, selectors and declarations",
    long_about = None
)]
struct Cli {
    /// CSS files or glob patterns to scan. Use "-" for stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Config file path (default: auto-detect .solemncssrc.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dictionary file replacing the built-in word list (JSON or YAML)
    #[arg(short, long, env = "SOLEMN_CSS_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Never flag this word (can be used multiple times)
    #[arg(long = "allow", value_name = "WORD")]
    allow: Vec<String>,

    /// Skip files matching pattern (can be used multiple times)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Show statistics at the end
    #[arg(long)]
    statistics: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Sarif,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Load or create configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path).into_diagnostic()?
    } else {
        let start_dir = std::env::current_dir().into_diagnostic()?;
        match Config::find_and_load(&start_dir) {
            Ok(Some((path, cfg))) => {
                debug!("Using config: {}", path.display());
                cfg
            }
            Ok(None) => Config::default(),
            Err(e) => return Err(e).into_diagnostic(),
        }
    };

    config
        .merge_cli(CliOptions {
            dictionary_path: cli.dictionary.clone(),
            allowed_words: cli.allow.clone(),
            exclude: cli.exclude.clone(),
            jobs: cli.jobs,
        })
        .into_diagnostic()?;

    let dictionary = config.build_dictionary().into_diagnostic()?;
    debug!(
        "Dictionary has {} words in {} categories",
        dictionary.word_count(),
        dictionary.categories().len()
    );
    let detector = Detector::new(dictionary);

    // Collect files to scan
    let mut files_to_scan = Vec::new();
    for pattern in &cli.files {
        let pattern_str = pattern.to_string_lossy();

        if pattern_str == "-" {
            files_to_scan.push(PathBuf::from("-"));
            continue;
        }

        if pattern_str.contains('*') {
            for entry in glob::glob(&pattern_str).into_diagnostic()? {
                let path = entry.into_diagnostic()?;
                if !config.is_file_excluded(&path) {
                    files_to_scan.push(path);
                }
            }
        } else if !config.is_file_excluded(pattern) {
            files_to_scan.push(pattern.clone());
        }
    }

    if files_to_scan.is_empty() {
        eprintln!("No files to scan");
        return Ok(ExitCode::from(0));
    }

    let results = if config.jobs == 1 {
        files_to_scan
            .iter()
            .map(|file| scan_file(file, &detector))
            .collect::<Vec<_>>()
    } else {
        if config.jobs > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.jobs)
                .build_global()
                .ok();
        }
        files_to_scan
            .par_iter()
            .map(|file| scan_file(file, &detector))
            .collect::<Vec<_>>()
    };

    let mut stats = ScanStatistics::default();
    let mut reports: Vec<FileReport> = Vec::new();
    let mut failed = 0usize;

    for (label, result) in results {
        match result {
            Ok(violations) => {
                stats.record_file(&violations);
                reports.push((label, violations));
            }
            Err(e) => {
                eprintln!("Failed to scan {}: {}", label, e);
                failed += 1;
            }
        }
    }

    match cli.format {
        OutputFormat::Text => {
            for (label, violations) in &reports {
                output::report_violations(label, violations).into_diagnostic()?;
            }
        }
        OutputFormat::Json => output::print_json(&reports).into_diagnostic()?,
        OutputFormat::Sarif => output::print_sarif(&reports).into_diagnostic()?,
    }

    if cli.statistics {
        print_statistics(&stats);
    }

    if failed > 0 {
        Ok(ExitCode::from(2))
    } else if stats.total() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn scan_file(file: &Path, detector: &Detector) -> (String, Result<Vec<Violation>, DetectError>) {
    if file.to_string_lossy() == "-" {
        let mut content = String::new();
        let result = match io::stdin().read_to_string(&mut content) {
            Ok(_) => detector.detect_in_text(&content, STDIN_LABEL),
            Err(source) => Err(DetectError::Io {
                path: PathBuf::from(STDIN_LABEL),
                source,
            }),
        };
        return (STDIN_LABEL.to_string(), result);
    }

    debug!("Scanning: {}", file.display());
    (file.display().to_string(), detector.detect(file))
}

fn print_statistics(stats: &ScanStatistics) {
    eprintln!("\nStatistics:");
    eprintln!("  Files scanned: {}", stats.files_scanned);
    eprintln!("  Files with violations: {}", stats.files_with_violations);
    eprintln!();

    eprintln!("  By type:");
    for kind in ViolationKind::ALL {
        eprintln!("    {:16} {}", kind.as_str(), stats.kind_count(kind));
    }

    if !stats.per_category.is_empty() {
        eprintln!();
        eprintln!("  By category:");
        for (category, count) in &stats.per_category {
            eprintln!("    {:16} {}", category, count);
        }
    }
}
