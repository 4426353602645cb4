//! Job records, the status view and stored results

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AnalysisReport, AnalysisStage, Metadata, Metrics};
use crate::detection::{Issue, Summary};
use crate::error::JobError;

pub const FAILED_STAGE: &str = "Analysis failed";

/// Lifecycle state of an analysis job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Running,
    Done,
    Error,
    /// Query-only; never stored
    NotFound,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "QUEUED",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Error => "ERROR",
            JobState::NotFound => "NOT_FOUND",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }

    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Queued, JobState::Running)
                | (JobState::Queued, JobState::Error)
                | (JobState::Running, JobState::Running)
                | (JobState::Running, JobState::Done)
                | (JobState::Running, JobState::Error)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored job record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub state: JobState,
    pub progress: u8,
    pub stage: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Full error chain, kept for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl JobRecord {
    pub fn queued(job_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            state: JobState::Queued,
            progress: 0,
            stage: "Queued".to_string(),
            created_at: now,
            updated_at: now,
            error: None,
            error_detail: None,
        }
    }

    fn transition(&mut self, next: JobState) -> Result<(), JobError> {
        if !self.state.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                job_id: self.job_id.clone(),
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), JobError> {
        self.transition(JobState::Running)?;
        self.progress = AnalysisStage::Starting.progress();
        self.stage = AnalysisStage::Starting.label().to_string();
        Ok(())
    }

    /// Record a checkpoint; progress never moves backwards
    pub fn advance(&mut self, stage: AnalysisStage) -> Result<(), JobError> {
        self.transition(JobState::Running)?;
        self.progress = self.progress.max(stage.progress());
        self.stage = stage.label().to_string();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), JobError> {
        self.transition(JobState::Done)?;
        self.progress = AnalysisStage::Complete.progress();
        self.stage = AnalysisStage::Complete.label().to_string();
        Ok(())
    }

    /// Fail the job, keeping the progress of the last checkpoint reached
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> Result<(), JobError> {
        self.transition(JobState::Error)?;
        self.stage = FAILED_STAGE.to_string();
        self.error = Some(message.into());
        self.error_detail = detail;
        Ok(())
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            job_id: self.job_id.clone(),
            state: self.state,
            progress: self.progress,
            stage: self.stage.clone(),
            timestamp: self.updated_at,
            error: self.error.clone(),
        }
    }
}

/// Snapshot returned to status readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub state: JobState,
    pub progress: u8,
    pub stage: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn not_found(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::NotFound,
            progress: 0,
            stage: String::new(),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Synthesized when a status stream outlives its bound
    pub fn timed_out(job_id: impl Into<String>, progress: u8) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Error,
            progress,
            stage: FAILED_STAGE.to_string(),
            timestamp: Utc::now(),
            error: Some("Timeout".to_string()),
        }
    }
}

/// Stored outcome of a successful job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub job_id: String,
    pub filename: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub metadata: Metadata,
    pub audio_issues: Vec<Issue>,
    pub video_issues: Vec<Issue>,
    pub metrics: Metrics,
    pub summary: Summary,
}

impl AnalysisResult {
    pub fn from_report(job_id: impl Into<String>, source: &Path, report: AnalysisReport) -> Self {
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());

        Self {
            job_id: job_id.into(),
            filename,
            analysis_timestamp: Utc::now(),
            metadata: report.metadata,
            audio_issues: report.audio_issues,
            video_issues: report.video_issues,
            metrics: report.metrics,
            summary: report.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut record = JobRecord::queued("job-1");
        record.start().unwrap();
        record.advance(AnalysisStage::Audio).unwrap();
        assert_eq!(record.progress, 30);
        assert_eq!(record.stage, "Analyzing audio...");

        // A late, lower checkpoint does not move progress back
        record.advance(AnalysisStage::Metadata).unwrap();
        assert_eq!(record.progress, 30);

        record.complete().unwrap();
        assert_eq!(record.state, JobState::Done);
        assert_eq!(record.progress, 100);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut record = JobRecord::queued("job-2");
        record.start().unwrap();
        record.advance(AnalysisStage::Video).unwrap();
        record.fail("no video stream", None).unwrap();

        assert_eq!(record.state, JobState::Error);
        assert_eq!(record.progress, 60);
        assert_eq!(record.stage, FAILED_STAGE);

        assert!(matches!(
            record.advance(AnalysisStage::Metrics),
            Err(JobError::InvalidTransition { from: "ERROR", to: "RUNNING", .. })
        ));
        assert!(record.complete().is_err());
    }

    #[test]
    fn test_queued_job_can_fail_before_start() {
        let mut record = JobRecord::queued("job-3");
        assert!(record.complete().is_err());
        record.fail("store unavailable", None).unwrap();
        assert_eq!(record.progress, 0);
    }

    #[test]
    fn test_status_view_hides_detail() {
        let mut record = JobRecord::queued("job-4");
        record.start().unwrap();
        record
            .fail("metadata failed", Some("decode error: truncated header".to_string()))
            .unwrap();

        let value = serde_json::to_value(record.status()).unwrap();
        assert_eq!(value["state"], "ERROR");
        assert_eq!(value["error"], "metadata failed");
        assert!(value.get("error_detail").is_none());
    }

    #[test]
    fn test_not_found_view() {
        let status = JobStatus::not_found("missing");
        assert_eq!(status.state, JobState::NotFound);
        assert_eq!(status.progress, 0);
        assert!(status.stage.is_empty());

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["state"], "NOT_FOUND");
        assert!(value.get("error").is_none());
    }
}
