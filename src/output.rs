//! Output formatters for detection results

use crate::dictionary::MatchCounts;
use crate::violation::{Violation, ViolationKind};
use serde::Serialize;
use std::io::{self, Write};

/// Results for one scanned file: its label and violations in report order
pub type FileReport = (String, Vec<Violation>);

/// Render one violation as a single report line
pub fn format_violation(violation: &Violation) -> String {
    let issues: Vec<String> = violation
        .issues
        .iter()
        .map(|(key, count)| format!("{}={}", key, count))
        .collect();

    format!(
        "VIOLATION (issues: [{}], type: {}, file: {}, line: {}, col: {}) = {}",
        issues.join(" "),
        violation.kind,
        violation.file,
        violation.line,
        violation.column,
        violation.display_text()
    )
}

/// Line printed when a file has no violations
pub fn format_success(label: &str) -> String {
    format!("SUCCESS: No issues found in {}", label)
}

/// Write the text report for one file
pub fn write_report<W: Write>(
    writer: &mut W,
    label: &str,
    violations: &[Violation],
) -> io::Result<()> {
    if violations.is_empty() {
        return writeln!(writer, "{}", format_success(label));
    }
    for violation in violations {
        writeln!(writer, "{}", format_violation(violation))?;
    }
    Ok(())
}

/// Print the text report for one file to stdout
pub fn report_violations(label: &str, violations: &[Violation]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, label, violations)
}

/// JSON output format
#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<JsonFile<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    file: &'a str,
    violations: Vec<JsonViolation<'a>>,
}

#[derive(Serialize)]
struct JsonViolation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    line: usize,
    column: usize,
    text: &'a str,
    issues: &'a MatchCounts,
}

#[derive(Serialize)]
struct JsonSummary {
    files: usize,
    violations: usize,
    files_with_violations: usize,
}

fn json_output(reports: &[FileReport]) -> JsonOutput<'_> {
    let files: Vec<JsonFile> = reports
        .iter()
        .map(|(label, violations)| JsonFile {
            file: label,
            violations: violations
                .iter()
                .map(|v| JsonViolation {
                    kind: v.kind.as_str(),
                    line: v.line,
                    column: v.column,
                    text: v.display_text(),
                    issues: &v.issues,
                })
                .collect(),
        })
        .collect();

    let summary = JsonSummary {
        files: reports.len(),
        violations: reports.iter().map(|(_, v)| v.len()).sum(),
        files_with_violations: reports.iter().filter(|(_, v)| !v.is_empty()).count(),
    };

    JsonOutput { files, summary }
}

/// Print results in JSON format
pub fn print_json(reports: &[FileReport]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &json_output(reports))?;
    writeln!(handle)?;
    Ok(())
}

/// Format results as JSON string
pub fn format_json(reports: &[FileReport]) -> String {
    serde_json::to_string_pretty(&json_output(reports)).unwrap_or_default()
}

/// SARIF (Static Analysis Results Interchange Format) output
#[derive(Serialize)]
struct SarifOutput<'a> {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun<'a>>,
}

#[derive(Serialize)]
struct SarifRun<'a> {
    tool: SarifTool,
    results: Vec<SarifResult<'a>>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct SarifResult<'a> {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation<'a>>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation<'a> {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation<'a>,
}

#[derive(Serialize)]
struct SarifPhysicalLocation<'a> {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation<'a>,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation<'a> {
    uri: &'a str,
}

#[derive(Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
}

fn sarif_rule_id(kind: ViolationKind) -> &'static str {
    match kind {
        ViolationKind::PropertyName => "flagged-property-name",
        ViolationKind::PropertyValue => "flagged-property-value",
        ViolationKind::Selector => "flagged-selector",
        ViolationKind::Comment => "flagged-comment",
    }
}

fn sarif_output(reports: &[FileReport]) -> SarifOutput<'_> {
    let results: Vec<SarifResult> = reports
        .iter()
        .flat_map(|(_, violations)| violations.iter())
        .map(|v| SarifResult {
            rule_id: sarif_rule_id(v.kind),
            level: "error",
            message: SarifMessage {
                text: format!("Flagged words in {}: {}", v.kind, v.display_text()),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation { uri: &v.file },
                    region: SarifRegion {
                        start_line: v.line,
                        start_column: v.column,
                    },
                },
            }],
        })
        .collect();

    SarifOutput {
        schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "solemn-css",
                    version: env!("CARGO_PKG_VERSION"),
                },
            },
            results,
        }],
    }
}

/// Print results in SARIF format (for CI/CD integration)
pub fn print_sarif(reports: &[FileReport]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &sarif_output(reports))?;
    writeln!(handle)?;
    Ok(())
}

/// Format results as SARIF string
pub fn format_sarif(reports: &[FileReport]) -> String {
    serde_json::to_string_pretty(&sarif_output(reports)).unwrap_or_default()
}
