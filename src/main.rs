//! CLI entry point for install-guard.

use clap::Parser;
use install_guard::cli::Cli;
use install_guard::config::{env_keys, GuardConfig};
use install_guard::executor::ProcessPackageManager;
use install_guard::guard::{GuardPipeline, TerminalPrompter};
use install_guard::osv::OsvClient;
use install_guard::registry::NpmRegistry;
use install_guard::resolver::Resolver;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = GuardConfig::from_env();
    config.verbose = cli.verbose;

    // Initialize logging
    let log_level = if config.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(env_keys::LOG)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| log_level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "Loaded configuration");

    let resolver = Resolver::new(
        Arc::new(NpmRegistry::new(config.package_manager.clone())),
        config.resolve_concurrency,
    );
    let pipeline = GuardPipeline::new(
        resolver,
        Arc::new(OsvClient::new(config.osv_api_base.clone(), config.http_timeout)),
        Arc::new(ProcessPackageManager::new(config.package_manager.clone())),
        Arc::new(TerminalPrompter::new()),
    )
    .with_fail_closed(config.fail_closed)
    .with_report_path(config.verbose.then(|| config.report_path.clone()));

    let outcome = pipeline.execute(cli.request()).await;
    tracing::debug!(?outcome, "Finished");

    ExitCode::from(u8::try_from(outcome.exit_code).unwrap_or(1))
}
