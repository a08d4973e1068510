//! Shared test doubles for the guard workflow.

#![allow(dead_code)]

use async_trait::async_trait;
use install_guard::{
    InstallChoice, InstallRequest, OracleError, PackageManager, PackageManagerError, PackageRef,
    PackageRegistry, ProcessReport, Prompter, RegistryError, ScanChoice, Severity,
    VulnRecord, VulnResult, VulnerabilityOracle,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::ThreadId;

pub fn vuln(id: &str, severity: &str) -> VulnRecord {
    VulnRecord {
        id: id.to_string(),
        summary: Some(format!("Summary of {}", id)),
        severity: Severity::from_oracle(Some(severity)),
    }
}

/// Oracle answering from a fixed name -> vulnerabilities table, or failing.
pub struct StubOracle {
    known: HashMap<String, Vec<VulnRecord>>,
    fail: bool,
    pub calls: Mutex<Vec<Vec<PackageRef>>>,
}

impl StubOracle {
    pub fn with(entries: Vec<(&str, Vec<VulnRecord>)>) -> Self {
        Self {
            known: entries
                .into_iter()
                .map(|(name, vulns)| (name.to_string(), vulns))
                .collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn clean() -> Self {
        Self::with(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::clean()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VulnerabilityOracle for StubOracle {
    async fn query(&self, candidates: &[PackageRef]) -> Result<Vec<VulnResult>, OracleError> {
        self.calls.lock().unwrap().push(candidates.to_vec());
        if self.fail {
            return Err(OracleError::Transport("simulated network error".into()));
        }
        Ok(candidates
            .iter()
            .map(|c| VulnResult {
                package: c.clone(),
                vulns: self.known.get(&c.name).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

/// Package manager that records every call and reports a fixed exit code.
pub struct RecordingPackageManager {
    exit_code: i32,
    pub installs: Mutex<Vec<InstallRequest>>,
    pub uninstalls: Mutex<Vec<Vec<String>>>,
}

impl RecordingPackageManager {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            installs: Mutex::new(Vec::new()),
            uninstalls: Mutex::new(Vec::new()),
        }
    }

    pub fn install_count(&self) -> usize {
        self.installs.lock().unwrap().len()
    }

    pub fn uninstall_count(&self) -> usize {
        self.uninstalls.lock().unwrap().len()
    }

    fn report(&self) -> ProcessReport {
        ProcessReport {
            exit_code: self.exit_code,
            stderr: String::new(),
            missing_package: None,
        }
    }
}

#[async_trait]
impl PackageManager for RecordingPackageManager {
    async fn install(&self, request: &InstallRequest) -> Result<ProcessReport, PackageManagerError> {
        self.installs.lock().unwrap().push(request.clone());
        Ok(self.report())
    }

    async fn uninstall(&self, names: &[String]) -> Result<ProcessReport, PackageManagerError> {
        self.uninstalls.lock().unwrap().push(names.to_vec());
        Ok(self.report())
    }
}

/// Prompter returning preset answers and counting how often it was asked.
pub struct ScriptedPrompter {
    install: InstallChoice,
    scan: ScanChoice,
    asked: AtomicUsize,
    threads: Mutex<Vec<ThreadId>>,
}

impl ScriptedPrompter {
    pub fn new(install: InstallChoice, scan: ScanChoice) -> Self {
        Self {
            install,
            scan,
            asked: AtomicUsize::new(0),
            threads: Mutex::new(Vec::new()),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }

    /// Threads the questions were answered on.
    pub fn asked_on(&self) -> Vec<ThreadId> {
        self.threads.lock().unwrap().clone()
    }

    fn record(&self) {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.threads.lock().unwrap().push(std::thread::current().id());
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm_install(&self) -> InstallChoice {
        self.record();
        self.install
    }

    fn confirm_scan(&self, _flagged: &[String]) -> ScanChoice {
        self.record();
        self.scan
    }
}

/// Registry that knows a fixed set of references.
pub struct StubRegistry {
    known: HashMap<String, PackageRef>,
}

impl StubRegistry {
    pub fn new(entries: &[(&str, &str, &str)]) -> Self {
        Self {
            known: entries
                .iter()
                .map(|(reference, name, version)| {
                    (reference.to_string(), PackageRef::new(*name, *version))
                })
                .collect(),
        }
    }
}

#[async_trait]
impl PackageRegistry for StubRegistry {
    async fn resolve(&self, reference: &str) -> Result<PackageRef, RegistryError> {
        self.known
            .get(reference)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(reference.to_string()))
    }
}
