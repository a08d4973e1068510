//! Human-readable report rendering and the `--verbose` JSON dump.

use crate::model::{
    InstallRequest, Mode, PackageRef, ProcessReport, Severity, VerificationStatus, VulnResult,
};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Badge for a severity grade. Every grade maps to exactly one badge.
pub fn severity_badge(severity: Severity) -> ColoredString {
    let label = format!(" {} ", severity.label());
    match severity {
        Severity::Critical => label.white().on_red().bold(),
        Severity::High => label.red().bold(),
        Severity::Moderate => label.yellow().bold(),
        Severity::Low => label.cyan(),
        Severity::Unknown => label.dimmed(),
    }
}

/// Report for packages with known vulnerabilities, grouped by package in
/// oracle order.
pub fn render_vulnerabilities(flagged: &[&VulnResult]) -> String {
    let total: usize = flagged.iter().map(|r| r.vulns.len()).sum();
    let mut lines = vec![format!(
        "{} {} vulnerable package(s), {} known vulnerability(ies)",
        "⚠".yellow().bold(),
        flagged.len(),
        total
    )];
    lines.push(String::new());

    for result in flagged {
        lines.push(format!(
            "  {}@{}",
            result.package.name.bold(),
            result.package.query_version()
        ));
        for vuln in &result.vulns {
            let summary = vuln.summary.as_deref().unwrap_or("No summary available");
            lines.push(format!(
                "    {} {} {}",
                severity_badge(vuln.severity),
                summary,
                format!("({})", vuln.id).dimmed()
            ));
        }
        lines.push(String::new());
    }

    lines.push(
        "Details: https://osv.dev/vulnerability/<ID>"
            .dimmed()
            .to_string(),
    );
    lines.join("\n")
}

pub fn render_clean(checked: usize) -> String {
    format!(
        "{} No known vulnerabilities in {} package(s)",
        "✔".green().bold(),
        checked
    )
}

pub fn render_oracle_failure(reason: &str) -> String {
    format!(
        "{} Could not verify packages against the vulnerability database: {}",
        "✖".red().bold(),
        reason
    )
}

pub fn render_error(message: &str) -> String {
    format!("{} {}", "✖".red().bold(), message)
}

pub fn render_unresolved(unresolved: &[String]) -> String {
    format!(
        "{} Could not resolve: {}",
        "!".yellow().bold(),
        unresolved.join(", ")
    )
}

pub fn render_install_success(request: &InstallRequest) -> String {
    if request.is_bare() {
        return format!("{} Dependencies installed", "✔".green().bold());
    }
    let names: Vec<String> = request
        .packages
        .iter()
        .map(|p| format!("{}@{}", p.name, p.version))
        .collect();
    format!("{} Installed {}", "✔".green().bold(), names.join(", "))
}

pub fn render_uninstall_success(names: &[String]) -> String {
    format!("{} Uninstalled {}", "✔".green().bold(), names.join(", "))
}

/// Failure line for a package-manager run, naming the missing package when known.
pub fn render_process_failure(operation: &str, report: &ProcessReport) -> String {
    let mut message = format!(
        "{} {} failed (exit code {})",
        "✖".red().bold(),
        operation,
        report.exit_code
    );
    if let Some(missing) = &report.missing_package {
        message.push_str(&format!(
            "\n  Package '{}' was not found in the registry",
            missing.bold()
        ));
    }
    message
}

// ============================================================================
// JSON dump
// ============================================================================

/// Everything known after the oracle call, as written by `--verbose`.
#[derive(Debug, Serialize)]
pub struct VulnerabilityReport<'a> {
    pub mode: Mode,
    pub status: VerificationStatus,
    pub checked: &'a [PackageRef],
    #[serde(skip_serializing_if = "is_empty")]
    pub unresolved: &'a [String],
    pub results: &'a [VulnResult],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_error: Option<String>,
}

fn is_empty(list: &&[String]) -> bool {
    list.is_empty()
}

pub fn write_report(path: &Path, report: &VulnerabilityReport<'_>) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VulnRecord;
    use tempfile::TempDir;

    fn flagged_left_pad() -> VulnResult {
        VulnResult {
            package: PackageRef::new("left-pad", "^1.3.0"),
            vulns: vec![VulnRecord {
                id: "GHSA-xxxx".into(),
                summary: Some("Denial of service".into()),
                severity: Severity::High,
            }],
        }
    }

    #[test]
    fn test_render_vulnerabilities_lists_package_and_records() {
        let result = flagged_left_pad();
        let text = render_vulnerabilities(&[&result]);
        assert!(text.contains("left-pad"));
        assert!(text.contains("1.3.0"));
        assert!(text.contains("HIGH"));
        assert!(text.contains("Denial of service"));
        assert!(text.contains("GHSA-xxxx"));
    }

    #[test]
    fn test_render_groups_in_given_order() {
        let first = flagged_left_pad();
        let second = VulnResult {
            package: PackageRef::new("minimist", "1.2.0"),
            vulns: vec![VulnRecord {
                id: "GHSA-yyyy".into(),
                summary: None,
                severity: Severity::Unknown,
            }],
        };
        let text = render_vulnerabilities(&[&first, &second]);
        let a = text.find("left-pad").unwrap();
        let b = text.find("minimist").unwrap();
        assert!(a < b);
        assert!(text.contains("UNKNOWN"));
        assert!(text.contains("No summary available"));
    }

    #[test]
    fn test_every_severity_has_a_badge() {
        for severity in [
            Severity::Critical,
            Severity::High,
            Severity::Moderate,
            Severity::Low,
            Severity::Unknown,
        ] {
            assert!(severity_badge(severity).to_string().contains(severity.label()));
        }
    }

    #[test]
    fn test_process_failure_names_missing_package() {
        let report = ProcessReport {
            exit_code: 1,
            stderr: String::new(),
            missing_package: Some("left-padd".into()),
        };
        let text = render_process_failure("npm install", &report);
        assert!(text.contains("exit code 1"));
        assert!(text.contains("left-padd"));
    }

    #[test]
    fn test_install_success_lists_explicit_packages_only() {
        let explicit = InstallRequest {
            args: vec!["left-pad".into()],
            packages: vec![PackageRef::new("left-pad", "1.3.0")],
        };
        assert!(render_install_success(&explicit).contains("left-pad@1.3.0"));
        assert!(render_install_success(&InstallRequest::default()).contains("Dependencies installed"));
    }

    #[test]
    fn test_write_report_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let result = flagged_left_pad();
        let checked = vec![result.package.clone()];
        let results = vec![result];
        write_report(
            &path,
            &VulnerabilityReport {
                mode: Mode::Install,
                status: VerificationStatus::VulnsFound,
                checked: &checked,
                unresolved: &[],
                results: &results,
                oracle_error: None,
            },
        )
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["mode"], "install");
        assert_eq!(written["status"], "vulns_found");
        assert_eq!(written["results"][0]["vulns"][0]["severity"], "HIGH");
        assert!(written.get("unresolved").is_none());
        assert!(written.get("oracle_error").is_none());
    }
}
