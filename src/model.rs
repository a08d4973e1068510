use serde::{Deserialize, Serialize};

/// Ecosystem tag sent with every oracle query.
pub const ECOSYSTEM: &str = "npm";

/// A package name paired with a version string.
///
/// For manifest entries the version is the declared (possibly range-qualified)
/// string; for resolved CLI arguments it is the concrete published version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
}

impl PackageRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Version with leading `^` / `~` range qualifiers removed, as sent to the oracle.
    pub fn query_version(&self) -> &str {
        self.version.trim_start_matches(['^', '~'])
    }
}

/// Severity grade of a vulnerability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Low,
    Unknown,
}

impl Severity {
    /// Maps the oracle's severity string. Matching is exact and case-sensitive;
    /// anything unrecognised (or absent) is `Unknown`.
    pub fn from_oracle(raw: Option<&str>) -> Self {
        match raw {
            Some("CRITICAL") => Severity::Critical,
            Some("HIGH") => Severity::High,
            Some("MODERATE") => Severity::Moderate,
            Some("LOW") => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    /// Badge text shown in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Moderate => "MODERATE",
            Severity::Low => "LOW",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

/// One known vulnerability affecting a package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VulnRecord {
    pub id: String,
    pub summary: Option<String>,
    pub severity: Severity,
}

/// Oracle verdict for one candidate, positionally aligned with the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VulnResult {
    pub package: PackageRef,
    pub vulns: Vec<VulnRecord>,
}

impl VulnResult {
    pub fn is_vulnerable(&self) -> bool {
        !self.vulns.is_empty()
    }
}

/// Which workflow the invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Install,
    Scan,
}

/// Result of the vulnerability check itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Clean,
    VulnsFound,
    /// The oracle could not be consulted; never treated as clean.
    Unknown,
}

/// Action derived once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Proceed,
    Abort,
    Uninstall(Vec<String>),
    Ignore,
}

/// Operator answer when vulnerabilities are found during an install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallChoice {
    Abort,
    Ignore,
}

/// Operator answer when vulnerabilities are found during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanChoice {
    Uninstall,
    Ignore,
}

/// What the package manager should be asked to install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// Arguments forwarded verbatim after `install`.
    pub args: Vec<String>,
    /// Resolved packages, listed on success. Empty for a bare install.
    pub packages: Vec<PackageRef>,
}

impl InstallRequest {
    pub fn is_bare(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Exit status and captured stderr of a package-manager run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub exit_code: i32,
    pub stderr: String,
    /// Package the registry reported as missing, if the stderr said so.
    pub missing_package: Option<String>,
}

impl ProcessReport {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_version_strips_range_qualifiers() {
        assert_eq!(PackageRef::new("a", "^1.3.0").query_version(), "1.3.0");
        assert_eq!(PackageRef::new("a", "~2.0.1").query_version(), "2.0.1");
        assert_eq!(PackageRef::new("a", "1.0.0").query_version(), "1.0.0");
        assert_eq!(PackageRef::new("a", ">=1.0.0").query_version(), ">=1.0.0");
    }

    #[test]
    fn test_severity_mapping_is_case_sensitive() {
        assert_eq!(Severity::from_oracle(Some("CRITICAL")), Severity::Critical);
        assert_eq!(Severity::from_oracle(Some("HIGH")), Severity::High);
        assert_eq!(Severity::from_oracle(Some("MODERATE")), Severity::Moderate);
        assert_eq!(Severity::from_oracle(Some("LOW")), Severity::Low);
        assert_eq!(Severity::from_oracle(Some("high")), Severity::Unknown);
        assert_eq!(Severity::from_oracle(Some("MEDIUM")), Severity::Unknown);
        assert_eq!(Severity::from_oracle(None), Severity::Unknown);
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&Decision::Uninstall(vec!["left-pad".into()])).unwrap();
        assert_eq!(json, r#"{"uninstall":["left-pad"]}"#);
        assert_eq!(serde_json::to_string(&Decision::Abort).unwrap(), r#""abort""#);
    }
}
