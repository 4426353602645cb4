//! mediaqa - Automated technical quality checks for media files
//!
//! Samples video frames and decoded audio, runs defect heuristics over
//! them, and publishes the outcome through an asynchronous job lifecycle.
//!
//! ## Module Structure
//!
//! - `core` - Media sources, DSP utilities, detectors and the analysis pipeline
//! - `detection` - Issue model, timestamps and the summary classifier
//! - `jobs` - Job state machine, key-value store port and orchestrator
//! - `config` - Threshold profiles and service settings
//! - `cli` - Command-line interface
//! - `testgen` - Synthetic media for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mediaqa::config::{AnalysisConfig, ProfilePreset, ServiceConfig};
//! use mediaqa::core::FrameSequenceOpener;
//! use mediaqa::jobs::{MemoryStore, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(
//!     MemoryStore::new(),
//!     FrameSequenceOpener::new(25.0),
//!     AnalysisConfig::from_preset(ProfilePreset::Standard),
//!     ServiceConfig::default(),
//! );
//!
//! let job_id = orchestrator.submit("uploads/clip_frames").await?;
//! let status = orchestrator.get_status(&job_id).await?;
//! ```
//!
//! ## Profiles
//!
//! | Profile   | Black frame | Frozen frame      | Clipping                      |
//! |-----------|-------------|-------------------|-------------------------------|
//! | Standard  | luma < 8    | PSNR > 45 dB      | one issue per span at 0.99    |
//! | Sensitive | luma < 20   | mean diff < 2.0   | file-level percentage at 0.95 |

pub mod cli;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod jobs;
pub mod testgen;

pub use config::{AnalysisConfig, ProfileBuilder, ProfilePreset, ServiceConfig};
pub use crate::core::{AnalysisReport, MediaAnalyzer, MediaOpener, MediaSource, Metadata, Metrics};
pub use detection::{Issue, IssueKind, OverallStatus, Severity, Summary};
pub use error::{AnalysisError, JobError, StoreError};
pub use jobs::{AnalysisResult, JobState, JobStatus, JobStore, MemoryStore, Orchestrator};
