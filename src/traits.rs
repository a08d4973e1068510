//! Seams for the three external collaborators and the operator.
//!
//! The decision engine only talks to these traits, so every branch of the
//! workflow can be driven by in-memory doubles in tests.

use crate::model::{InstallChoice, InstallRequest, PackageRef, ProcessReport, ScanChoice, VulnResult};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Package not found: {0}")]
    NotFound(String),
    #[error("Malformed registry response for {reference}: {reason}")]
    Malformed { reference: String, reason: String },
    #[error("Registry lookup failed: {0}")]
    Lookup(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Cannot reach vulnerability oracle: {0}")]
    Transport(String),
    #[error("Vulnerability oracle returned HTTP {0}")]
    Status(u16),
    #[error("Malformed oracle response: {0}")]
    Malformed(String),
    #[error("Oracle returned {actual} results for {expected} queries")]
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum PackageManagerError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Resolves one operator-typed reference (`name`, `name@version`, `name@tag`)
/// to the best-matching published `{name, version}`.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<PackageRef, RegistryError>;
}

/// Batched vulnerability lookup.
///
/// On success the returned vector has exactly one entry per input candidate,
/// in input order. Any failure is total: an `Err` means "status unknown".
#[async_trait]
pub trait VulnerabilityOracle: Send + Sync {
    async fn query(&self, candidates: &[PackageRef]) -> Result<Vec<VulnResult>, OracleError>;
}

/// The external package manager that actually mutates installed packages.
#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn install(&self, request: &InstallRequest) -> Result<ProcessReport, PackageManagerError>;

    async fn uninstall(&self, names: &[String]) -> Result<ProcessReport, PackageManagerError>;
}

/// Blocking operator choice. Implementations wait indefinitely for input.
pub trait Prompter: Send + Sync {
    fn confirm_install(&self) -> InstallChoice;

    fn confirm_scan(&self, flagged: &[String]) -> ScanChoice;
}
