//! Vulnerability-gated install/scan workflow.
//!
//! [`GuardPipeline`] runs a single pass over its collaborators:
//! 1. **Candidates**: resolve explicit arguments, or read the manifest
//! 2. **Oracle**: one batched vulnerability query
//! 3. **Decision**: clean, vulnerable (operator prompt) or unknown (fail-open)
//! 4. **Package manager**: install or uninstall, only when the decision allows it
//!
//! The pipeline never exits the process. It returns a [`GuardOutcome`] whose
//! `exit_code` the binary hands to the OS.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::guard::report::{self, VulnerabilityReport};
use crate::manifest::read_manifest;
use crate::model::{
    Decision, InstallChoice, InstallRequest, Mode, PackageRef, ScanChoice, VerificationStatus,
    VulnResult,
};
use crate::resolver::{is_flag, Resolver};
use crate::traits::{PackageManager, Prompter, VulnerabilityOracle};

// ============================================================================
// Pipeline Types
// ============================================================================

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRequest {
    pub mode: Mode,
    /// Arguments after the subcommand: package references and package-manager flags.
    pub args: Vec<String>,
}

impl GuardRequest {
    pub fn install(args: Vec<String>) -> Self {
        Self {
            mode: Mode::Install,
            args,
        }
    }

    pub fn scan(args: Vec<String>) -> Self {
        Self {
            mode: Mode::Scan,
            args,
        }
    }

    /// True when at least one argument names a package rather than a flag.
    pub fn has_targets(&self) -> bool {
        self.args.iter().any(|a| !is_flag(a))
    }
}

/// Terminal state of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub status: VerificationStatus,
    pub decision: Decision,
    /// Names of packages with at least one known vulnerability, in oracle order.
    pub flagged: Vec<String>,
    pub exit_code: i32,
}

struct Candidates {
    packages: Vec<PackageRef>,
    unresolved: Vec<String>,
    install: InstallRequest,
}

// ============================================================================
// Pipeline Executor
// ============================================================================

pub struct GuardPipeline {
    resolver: Resolver,
    oracle: Arc<dyn VulnerabilityOracle>,
    package_manager: Arc<dyn PackageManager>,
    prompter: Arc<dyn Prompter>,

    /// Directory holding the manifest (default: current directory)
    project_dir: PathBuf,

    /// Abort installs when the oracle cannot be consulted
    fail_closed: bool,

    /// Destination of the JSON report, when requested
    report_path: Option<PathBuf>,
}

impl GuardPipeline {
    /// Creates a pipeline with fail-open behaviour, no JSON report and the
    /// current directory as project root.
    pub fn new(
        resolver: Resolver,
        oracle: Arc<dyn VulnerabilityOracle>,
        package_manager: Arc<dyn PackageManager>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            resolver,
            oracle,
            package_manager,
            prompter,
            project_dir: PathBuf::from("."),
            fail_closed: false,
            report_path: None,
        }
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    pub fn with_fail_closed(mut self, fail_closed: bool) -> Self {
        self.fail_closed = fail_closed;
        self
    }

    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    #[instrument(skip(self, request), fields(mode = ?request.mode, args = request.args.len()))]
    pub async fn execute(&self, request: GuardRequest) -> GuardOutcome {
        let candidates = self.collect_candidates(&request).await;
        if !candidates.unresolved.is_empty() {
            eprintln!("{}", report::render_unresolved(&candidates.unresolved));
        }

        if request.mode == Mode::Scan && candidates.packages.is_empty() {
            eprintln!("{}", report::render_error("No dependencies found to scan"));
            return outcome(VerificationStatus::Clean, Decision::Ignore, Vec::new(), 0);
        }

        info!(count = candidates.packages.len(), "Checking packages");
        let results = match self.oracle.query(&candidates.packages).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Vulnerability check failed");
                self.dump(&request, &candidates, VerificationStatus::Unknown, &[], Some(e.to_string()));
                eprintln!("{}", report::render_oracle_failure(&e.to_string()));
                return self.on_unknown(request.mode, candidates.install).await;
            }
        };

        let flagged: Vec<&VulnResult> = results.iter().filter(|r| r.is_vulnerable()).collect();
        let status = if flagged.is_empty() {
            VerificationStatus::Clean
        } else {
            VerificationStatus::VulnsFound
        };
        self.dump(&request, &candidates, status, &results, None);

        if flagged.is_empty() {
            println!("{}", report::render_clean(results.len()));
            return match request.mode {
                Mode::Scan => outcome(status, Decision::Proceed, Vec::new(), 0),
                Mode::Install => self.install(status, Decision::Proceed, Vec::new(), candidates.install).await,
            };
        }

        println!("{}", report::render_vulnerabilities(&flagged));
        let names: Vec<String> = flagged.iter().map(|r| r.package.name.clone()).collect();

        match request.mode {
            Mode::Scan => match self.ask_scan(&names).await {
                ScanChoice::Uninstall => self.uninstall(names).await,
                ScanChoice::Ignore => outcome(status, Decision::Ignore, names, 0),
            },
            Mode::Install => match self.ask_install().await {
                InstallChoice::Abort => {
                    eprintln!("Installation aborted.");
                    outcome(status, Decision::Abort, names, 1)
                }
                InstallChoice::Ignore => {
                    self.install(status, Decision::Ignore, names, candidates.install).await
                }
            },
        }
    }

    /// The prompter blocks on stdin, so it runs on the blocking pool.
    async fn ask_install(&self) -> InstallChoice {
        let prompter = Arc::clone(&self.prompter);
        match tokio::task::spawn_blocking(move || prompter.confirm_install()).await {
            Ok(choice) => choice,
            Err(e) => {
                warn!(error = %e, "Prompt failed, aborting");
                InstallChoice::Abort
            }
        }
    }

    async fn ask_scan(&self, names: &[String]) -> ScanChoice {
        let prompter = Arc::clone(&self.prompter);
        let names = names.to_vec();
        match tokio::task::spawn_blocking(move || prompter.confirm_scan(&names)).await {
            Ok(choice) => choice,
            Err(e) => {
                warn!(error = %e, "Prompt failed, keeping packages");
                ScanChoice::Ignore
            }
        }
    }

    async fn collect_candidates(&self, request: &GuardRequest) -> Candidates {
        if request.has_targets() {
            let resolution = self.resolver.resolve(&request.args).await;
            return Candidates {
                packages: resolution.resolved.clone(),
                unresolved: resolution.unresolved,
                install: InstallRequest {
                    args: request.args.clone(),
                    packages: resolution.resolved,
                },
            };
        }

        let packages = read_manifest(&self.project_dir);
        debug!(count = packages.len(), dir = %self.project_dir.display(), "Read manifest");
        Candidates {
            packages,
            unresolved: Vec::new(),
            install: InstallRequest {
                args: request.args.clone(),
                packages: Vec::new(),
            },
        }
    }

    async fn on_unknown(&self, mode: Mode, install: InstallRequest) -> GuardOutcome {
        let status = VerificationStatus::Unknown;
        match mode {
            Mode::Scan => outcome(status, Decision::Ignore, Vec::new(), 0),
            Mode::Install if self.fail_closed => {
                eprintln!("Installation aborted: packages could not be verified.");
                outcome(status, Decision::Abort, Vec::new(), 1)
            }
            Mode::Install => self.install(status, Decision::Proceed, Vec::new(), install).await,
        }
    }

    async fn install(
        &self,
        status: VerificationStatus,
        decision: Decision,
        flagged: Vec<String>,
        request: InstallRequest,
    ) -> GuardOutcome {
        let exit_code = match self.package_manager.install(&request).await {
            Ok(run) if run.success() => {
                println!("{}", report::render_install_success(&request));
                0
            }
            Ok(run) => {
                eprintln!("{}", report::render_process_failure("Installation", &run));
                1
            }
            Err(e) => {
                eprintln!("{}", report::render_error(&e.to_string()));
                1
            }
        };
        outcome(status, decision, flagged, exit_code)
    }

    async fn uninstall(&self, names: Vec<String>) -> GuardOutcome {
        let status = VerificationStatus::VulnsFound;
        let exit_code = match self.package_manager.uninstall(&names).await {
            Ok(run) if run.success() => {
                println!("{}", report::render_uninstall_success(&names));
                0
            }
            Ok(run) => {
                eprintln!("{}", report::render_process_failure("Uninstall", &run));
                1
            }
            Err(e) => {
                eprintln!("{}", report::render_error(&e.to_string()));
                1
            }
        };
        outcome(status, Decision::Uninstall(names.clone()), names, exit_code)
    }

    fn dump(
        &self,
        request: &GuardRequest,
        candidates: &Candidates,
        status: VerificationStatus,
        results: &[VulnResult],
        oracle_error: Option<String>,
    ) {
        let Some(path) = &self.report_path else {
            return;
        };
        let dump = VulnerabilityReport {
            mode: request.mode,
            status,
            checked: &candidates.packages,
            unresolved: &candidates.unresolved,
            results,
            oracle_error,
        };
        match report::write_report(path, &dump) {
            Ok(()) => info!(path = %path.display(), "Wrote vulnerability report"),
            Err(e) => warn!(error = %e, "Could not write vulnerability report"),
        }
    }
}

fn outcome(
    status: VerificationStatus,
    decision: Decision,
    flagged: Vec<String>,
    exit_code: i32,
) -> GuardOutcome {
    GuardOutcome {
        status,
        decision,
        flagged,
        exit_code,
    }
}
