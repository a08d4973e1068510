//! Runtime configuration.
//!
//! Defaults are overridden by environment variables, then by CLI flags in `main`.
//! Empty environment values count as unset.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `INSTALL_GUARD_PM` | `npm` |
//! | `OSV_API_URL` | `https://api.osv.dev` |
//! | `INSTALL_GUARD_HTTP_TIMEOUT_SECS` | `30` |
//! | `INSTALL_GUARD_RESOLVE_CONCURRENCY` | `16` |
//! | `INSTALL_GUARD_FAIL_CLOSED` | `false` |
//! | `INSTALL_GUARD_REPORT_PATH` | `vulnerability-report.json` |

use std::path::PathBuf;
use std::time::Duration;

pub mod env_keys {
    pub const PACKAGE_MANAGER: &str = "INSTALL_GUARD_PM";
    pub const OSV_API_URL: &str = "OSV_API_URL";
    pub const HTTP_TIMEOUT_SECS: &str = "INSTALL_GUARD_HTTP_TIMEOUT_SECS";
    pub const RESOLVE_CONCURRENCY: &str = "INSTALL_GUARD_RESOLVE_CONCURRENCY";
    pub const FAIL_CLOSED: &str = "INSTALL_GUARD_FAIL_CLOSED";
    pub const REPORT_PATH: &str = "INSTALL_GUARD_REPORT_PATH";
    pub const LOG: &str = "INSTALL_GUARD_LOG";
    pub const VERBOSE: &str = "INSTALL_GUARD_VERBOSE";
}

pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";
pub const DEFAULT_OSV_API_BASE: &str = "https://api.osv.dev";
pub const DEFAULT_REPORT_PATH: &str = "vulnerability-report.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESOLVE_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct GuardConfig {
    /// Package manager executable.
    pub package_manager: String,
    /// OSV-compatible API base URL, without trailing slash.
    pub osv_api_base: String,
    pub http_timeout: Duration,
    /// Upper bound on concurrent registry lookups.
    pub resolve_concurrency: usize,
    /// Abort installs when the oracle cannot be reached.
    pub fail_closed: bool,
    /// Where `--verbose` writes the JSON report.
    pub report_path: PathBuf,
    pub verbose: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
            osv_api_base: DEFAULT_OSV_API_BASE.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
            fail_closed: false,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            verbose: false,
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            package_manager: get(env_keys::PACKAGE_MANAGER).unwrap_or(defaults.package_manager),
            osv_api_base: get(env_keys::OSV_API_URL)
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.osv_api_base),
            http_timeout: get(env_keys::HTTP_TIMEOUT_SECS)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            resolve_concurrency: get(env_keys::RESOLVE_CONCURRENCY)
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.resolve_concurrency),
            fail_closed: get(env_keys::FAIL_CLOSED)
                .map(|s| parse_bool(&s))
                .unwrap_or(defaults.fail_closed),
            report_path: get(env_keys::REPORT_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.report_path),
            verbose: false,
        }
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
