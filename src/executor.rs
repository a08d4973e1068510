use crate::model::{InstallRequest, ProcessReport};
use crate::traits::{PackageManager, PackageManagerError};
use async_trait::async_trait;
use regex::Regex;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// npm: `404  'foo@*' is not in this registry.` (older releases say "the npm registry")
static NOT_IN_REGISTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(?P<reference>[^'\s]+)' is not in (?:this|the npm) registry")
        .expect("valid not-in-registry regex")
});

/// npm: `404 Not Found - GET https://registry.npmjs.org/foo - Not found`
static NOT_FOUND_GET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"404 Not Found - GET \S+?/(?P<name>(?:@[^/\s]+(?:/|%2[fF]))?[^/\s]+?)(?:\s|$)")
        .expect("valid 404 GET regex")
});

/// Runs the external package manager as a child process.
///
/// stdin and stdout are inherited so interactive output reaches the operator
/// untouched; stderr is echoed line by line and kept for inspection.
pub struct ProcessPackageManager {
    program: String,
}

impl ProcessPackageManager {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[instrument(skip(self), fields(program = %self.program))]
    async fn run(&self, subcommand: &str, args: &[String]) -> Result<ProcessReport, PackageManagerError> {
        info!("Starting {} {}", self.program, subcommand);

        let mut child = Command::new(&self.program)
            .arg(subcommand)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PackageManagerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut captured = String::new();
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        // stderr is not guaranteed to be UTF-8
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\n', '\r']);
                        eprintln!("{}", line);
                        captured.push_str(line);
                        captured.push('\n');
                    }
                    Err(e) => {
                        warn!(error = %e, "Stopped reading {} stderr", self.program);
                        break;
                    }
                }
            }
        }

        let status = child.wait().await?;
        // Killed by a signal: no code, count as failure.
        let exit_code = status.code().unwrap_or(1);
        if exit_code != 0 {
            warn!(exit_code, "{} {} failed", self.program, subcommand);
        }

        let missing_package = if exit_code == 0 {
            None
        } else {
            extract_missing_package(&captured)
        };

        Ok(ProcessReport {
            exit_code,
            stderr: captured,
            missing_package,
        })
    }
}

#[async_trait]
impl PackageManager for ProcessPackageManager {
    async fn install(&self, request: &InstallRequest) -> Result<ProcessReport, PackageManagerError> {
        self.run("install", &request.args).await
    }

    async fn uninstall(&self, names: &[String]) -> Result<ProcessReport, PackageManagerError> {
        self.run("uninstall", names).await
    }
}

/// Finds the package a failed install reported as absent from the registry.
pub fn extract_missing_package(stderr: &str) -> Option<String> {
    if let Some(caps) = NOT_IN_REGISTRY.captures(stderr) {
        return Some(strip_version(&caps["reference"]).to_string());
    }

    NOT_FOUND_GET
        .captures(stderr)
        .map(|caps| caps["name"].replace("%2f", "/").replace("%2F", "/"))
}

/// `left-pad@^1.0.0` -> `left-pad`, `@scope/pkg@*` -> `@scope/pkg`.
fn strip_version(reference: &str) -> &str {
    let search_from = usize::from(reference.starts_with('@'));
    match reference[search_from..].find('@') {
        Some(idx) => &reference[..search_from + idx],
        None => reference,
    }
}
