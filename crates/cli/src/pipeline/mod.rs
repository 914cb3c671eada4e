//! Attempt orchestration module.

mod orchestrator;
mod source;
mod stats;

pub use orchestrator::{AttemptLoop, StopPolicy};
pub use source::{load_config, AnySource};
pub use stats::RunStats;
