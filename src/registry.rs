//! Registry lookups through the package manager's `view` command.

use crate::model::PackageRef;
use crate::traits::{PackageRegistry, RegistryError};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Resolves references with `<pm> view <ref> name version --json`.
pub struct NpmRegistry {
    program: String,
}

impl NpmRegistry {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    #[instrument(skip(self))]
    async fn resolve(&self, reference: &str) -> Result<PackageRef, RegistryError> {
        let output = Command::new(&self.program)
            .args(["view", reference, "name", "version", "--json"])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = ?output.status.code(), stderr = %stderr.trim(), "view failed");
            if stderr.contains("E404") || String::from_utf8_lossy(&output.stdout).contains("E404") {
                return Err(RegistryError::NotFound(reference.to_string()));
            }
            return Err(RegistryError::Lookup(format!(
                "{} view exited with {:?}",
                self.program,
                output.status.code()
            )));
        }

        parse_view_output(reference, &String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Deserialize)]
struct ViewEntry {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ViewOutput {
    One(ViewEntry),
    // A range matching several published versions lists each, oldest first.
    Many(Vec<ViewEntry>),
}

/// Validates `view --json` output into a [`PackageRef`].
pub fn parse_view_output(reference: &str, stdout: &str) -> Result<PackageRef, RegistryError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::NotFound(reference.to_string()));
    }

    let malformed = |reason: String| RegistryError::Malformed {
        reference: reference.to_string(),
        reason,
    };

    let parsed: ViewOutput =
        serde_json::from_str(trimmed).map_err(|e| malformed(e.to_string()))?;
    let entry = match parsed {
        ViewOutput::One(entry) => entry,
        ViewOutput::Many(entries) => entries
            .into_iter()
            .last()
            .ok_or_else(|| RegistryError::NotFound(reference.to_string()))?,
    };

    match (entry.name, entry.version) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Ok(PackageRef { name, version })
        }
        _ => Err(malformed("missing name or version".to_string())),
    }
}
