pub mod orchestrator;
pub mod prompt;
pub mod report;

pub use orchestrator::{CrisisResult, handle_crisis_request};
