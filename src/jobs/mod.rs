//! Asynchronous analysis jobs over an injected key-value store

mod job;
mod orchestrator;
mod store;

pub use job::{AnalysisResult, JobRecord, JobState, JobStatus, FAILED_STAGE};
pub use orchestrator::Orchestrator;
pub use store::{result_key, status_key, JobStore, MemoryStore};
