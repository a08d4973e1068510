//! Command-line interface.

use crate::config::env_keys;
use crate::guard::GuardRequest;
use clap::{Parser, Subcommand};

/// Checks npm packages against the OSV vulnerability database before installing them.
#[derive(Parser, Debug)]
#[command(name = "install-guard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Write the full vulnerability report to a JSON file and log debug output
    #[arg(short, long, global = true, env = env_keys::VERBOSE)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check packages for known vulnerabilities, then install them.
    /// Without packages, checks and installs everything in package.json.
    #[command(visible_alias = "i")]
    Install {
        /// Packages to install (name, name@version or name@tag)
        packages: Vec<String>,

        /// Only check for vulnerabilities, never install
        #[arg(long)]
        scan: bool,

        /// Extra arguments passed to the package manager, after `--`
        #[arg(last = true, value_name = "PM_ARGS")]
        pm_args: Vec<String>,
    },

    /// Check the dependencies declared in package.json without installing
    Scan,
}

impl Cli {
    /// Maps the parsed command line onto a workflow request. A bare
    /// invocation is an install of the declared dependencies.
    pub fn request(&self) -> GuardRequest {
        match &self.command {
            None => GuardRequest::install(Vec::new()),
            Some(Commands::Scan) => GuardRequest::scan(Vec::new()),
            Some(Commands::Install {
                packages,
                scan,
                pm_args,
            }) => {
                let args: Vec<String> = packages.iter().chain(pm_args).cloned().collect();
                if *scan {
                    GuardRequest::scan(args)
                } else {
                    GuardRequest::install(args)
                }
            }
        }
    }
}
