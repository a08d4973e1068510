//! Guard module - the report and decision engine.
//!
//! - **Pipeline**: the single-pass install/scan state machine via [`GuardPipeline`]
//! - **Report**: severity badges, terminal reports and the JSON dump
//! - **Prompt**: the interactive operator choice via [`TerminalPrompter`]

pub mod pipeline;
pub mod prompt;
pub mod report;

pub use pipeline::{GuardOutcome, GuardPipeline, GuardRequest};
pub use prompt::TerminalPrompter;
pub use report::{ReportError, VulnerabilityReport};
