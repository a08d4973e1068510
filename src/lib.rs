pub mod cli;
pub mod config;
pub mod executor;
pub mod guard;
pub mod manifest;
pub mod model;
pub mod osv;
pub mod registry;
pub mod resolver;
pub mod traits;

// Re-export common types for convenience
pub use config::GuardConfig;
pub use guard::{GuardOutcome, GuardPipeline, GuardRequest};
pub use model::*;
pub use traits::*;
