//! Interactive operator prompt.

use crate::model::{InstallChoice, ScanChoice};
use crate::traits::Prompter;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::info;

/// Numbered single-choice prompt on stdin/stderr.
///
/// Without a terminal on stdin nothing is read and the safe default is used:
/// abort for installs, ignore for scans.
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }

    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm_install(&self) -> InstallChoice {
        if !self.interactive {
            info!("No terminal on stdin, aborting installation by default");
            return InstallChoice::Abort;
        }
        let options = ["Abort installation (recommended)", "Ignore & install"];
        let index = choose(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            "Vulnerable packages found. What would you like to do?",
            &options,
            0,
        );
        if index == 0 {
            InstallChoice::Abort
        } else {
            InstallChoice::Ignore
        }
    }

    fn confirm_scan(&self, flagged: &[String]) -> ScanChoice {
        if !self.interactive {
            info!("No terminal on stdin, ignoring scan findings by default");
            return ScanChoice::Ignore;
        }
        let uninstall = format!("Uninstall {}", flagged.join(", "));
        let options = [uninstall.as_str(), "Ignore & exit"];
        let index = choose(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            "Vulnerable packages found. What would you like to do?",
            &options,
            1,
        );
        if index == 0 {
            ScanChoice::Uninstall
        } else {
            ScanChoice::Ignore
        }
    }
}

/// Asks until a valid option number is entered. An empty line picks `default`;
/// end of input or a read error also falls back to `default`.
fn choose<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    options: &[&str],
    default: usize,
) -> usize {
    let _ = writeln!(output, "\n  {}", question);
    for (i, option) in options.iter().enumerate() {
        let marker = if i == default { " (default)" } else { "" };
        let _ = writeln!(output, "    {}) {}{}", i + 1, option, marker);
    }

    loop {
        let _ = write!(output, "  Choice [{}]: ", default + 1);
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                let _ = writeln!(output);
                return default;
            }
            Ok(_) => {}
        }

        let answer = line.trim();
        if answer.is_empty() {
            return default;
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return n - 1,
            _ => {
                let _ = writeln!(output, "  Please enter a number from 1 to {}.", options.len());
            }
        }
    }
}
