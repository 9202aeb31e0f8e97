//! Shared output formatting for audit results.

use a11y_audit::{ScanReport, Severity, Violation};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::OutputFormat;

/// The report for one audited file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    #[serde(flatten)]
    pub report: ScanReport,
}

/// Print audit results in the specified format.
pub fn print(reports: &[FileReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(reports),
        OutputFormat::Json => return print_json(reports),
        OutputFormat::Compact => {
            for line in compact_lines(reports) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn print_text(reports: &[FileReport]) {
    let (mut errors, mut warnings, mut infos) = (0, 0, 0);

    for FileReport { file, report } in reports {
        for violation in &report.violations {
            let severity_indicator = match violation.severity {
                Severity::Error => "\x1b[31merror\x1b[0m",
                Severity::Warning => "\x1b[33mwarning\x1b[0m",
                Severity::Info => "\x1b[34minfo\x1b[0m",
            };

            println!("{} at {} {}", violation.rule, file.display(), violation.location.path);
            println!("  {}: {}", severity_indicator, title(violation));
            println!("  | {}", violation.location.snippet);
            if !violation.failed_checks.is_empty() {
                println!("  = failed: {}", violation.failed_checks.join(", "));
            }
            println!();
        }
        for failure in &report.check_failures {
            println!(
                "\x1b[35mcheck error\x1b[0m {}/{} at {} {}: {}",
                failure.rule,
                failure.check,
                file.display(),
                failure.path,
                failure.message
            );
        }

        let (e, w, i) = report.count_by_severity();
        errors += e;
        warnings += w;
        infos += i;
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color,
        errors,
        warnings,
        infos,
        reports.len()
    );
}

fn print_json(reports: &[FileReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    println!("{json}");
    Ok(())
}

fn title(violation: &Violation) -> &str {
    violation
        .title
        .as_deref()
        .unwrap_or("accessibility violation")
}

/// `file: severity [rule] title at path` lines.
fn compact_lines(reports: &[FileReport]) -> Vec<String> {
    reports
        .iter()
        .flat_map(|FileReport { file, report }| {
            report.violations.iter().map(move |v| {
                format!(
                    "{}: {} [{}] {} at {}",
                    file.display(),
                    v.severity,
                    v.rule,
                    title(v),
                    v.location.path
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_audit::ElementLocation;

    fn report() -> FileReport {
        FileReport {
            file: PathBuf::from("site/index.html"),
            report: ScanReport {
                violations: vec![Violation {
                    rule: "img_alt_missing".to_string(),
                    severity: Severity::Error,
                    location: ElementLocation {
                        path: "html > body > img".to_string(),
                        snippet: "<img src=\"a.png\">".to_string(),
                        node: None,
                    },
                    failed_checks: vec!["alt_present".to_string()],
                    title: Some("Image Missing Alternative Text".to_string()),
                }],
                rules_run: 1,
                ..ScanReport::default()
            },
        }
    }

    #[test]
    fn compact_line_format() {
        assert_eq!(
            compact_lines(&[report()]),
            vec![
                "site/index.html: error [img_alt_missing] Image Missing Alternative Text at html > body > img"
                    .to_string()
            ]
        );
    }

    #[test]
    fn json_carries_file_and_violations() {
        let value = serde_json::to_value([report()]).unwrap();
        assert_eq!(value[0]["file"], "site/index.html");
        assert_eq!(value[0]["violations"][0]["rule"], "img_alt_missing");
        assert_eq!(value[0]["violations"][0]["severity"], "error");
    }
}
