//! Executive summary of an analysis run

use serde::{Deserialize, Serialize};
use std::fmt;

use super::result::{count_severity, Issue, IssueKind, Severity};
use crate::core::dsp::round_to;
use crate::core::metadata::Metadata;
use crate::core::metrics::Metrics;

const MAX_POINTS: usize = 6;

/// Overall verdict for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Pass,
    Warning,
    Fail,
    /// The analysis itself did not complete
    Error,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::Warning => "WARNING",
            OverallStatus::Fail => "FAIL",
            OverallStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub status: OverallStatus,
    pub total_issues: usize,
    pub high_severity_issues: usize,
    pub medium_severity_issues: usize,
    pub points: Vec<String>,
}

impl Summary {
    /// Summary for a run that ended in failure
    pub fn failed(message: impl fmt::Display) -> Self {
        Self {
            status: OverallStatus::Error,
            total_issues: 1,
            high_severity_issues: 1,
            medium_severity_issues: 0,
            points: vec![format!("Analysis failed: {}", message)],
        }
    }
}

/// Turns issue lists and metrics into a verdict with bullet points
#[derive(Debug, Clone)]
pub struct SummaryClassifier {
    loudness_min_lufs: f64,
    loudness_max_lufs: f64,
}

impl Default for SummaryClassifier {
    fn default() -> Self {
        Self {
            loudness_min_lufs: -28.0,
            loudness_max_lufs: -12.0,
        }
    }
}

impl SummaryClassifier {
    /// Loudness band used for the loudness remark
    pub fn with_loudness_band(mut self, min_lufs: f64, max_lufs: f64) -> Self {
        self.loudness_min_lufs = min_lufs;
        self.loudness_max_lufs = max_lufs;
        self
    }

    pub fn classify(
        &self,
        audio_issues: &[Issue],
        video_issues: &[Issue],
        meta: &Metadata,
        metrics: &Metrics,
    ) -> Summary {
        let total = audio_issues.len() + video_issues.len();
        let high = count_severity(audio_issues, Severity::High)
            + count_severity(video_issues, Severity::High);
        let medium = count_severity(audio_issues, Severity::Medium)
            + count_severity(video_issues, Severity::Medium);

        let status = if high > 0 {
            OverallStatus::Fail
        } else if medium > 2 || total > 5 {
            OverallStatus::Warning
        } else {
            OverallStatus::Pass
        };

        let mut points = Vec::new();

        if total == 0 {
            points.push("No significant audio or visual issues detected".to_string());
        } else {
            if !audio_issues.is_empty() {
                points.push(category_point("audio", audio_issues));
            }
            if !video_issues.is_empty() {
                points.push(category_point("video", video_issues));
            }
            if high > 0 {
                points.push(format!("{} high-severity issues require immediate attention", high));
            } else if medium > 0 {
                points.push(format!("{} medium-severity issues should be reviewed", medium));
            }
        }

        points.push(format!(
            "Technical: {}, {} @ {}fps, {}MB",
            metrics.duration_formatted,
            metrics.resolution,
            round_to(metrics.fps, 2),
            metrics.file_size_mb
        ));

        points.push(definition_tier(meta.width, meta.height).to_string());

        if let Some(lufs) = metrics.integrated_lufs {
            points.push(self.loudness_point(lufs));
        }

        points.truncate(MAX_POINTS);

        Summary {
            status,
            total_issues: total,
            high_severity_issues: high,
            medium_severity_issues: medium,
            points,
        }
    }

    fn loudness_point(&self, lufs: f64) -> String {
        if lufs < self.loudness_min_lufs {
            format!("Audio levels too quiet ({} LUFS)", lufs)
        } else if lufs > self.loudness_max_lufs {
            format!("Audio levels too loud ({} LUFS)", lufs)
        } else {
            format!("Audio levels acceptable ({} LUFS)", lufs)
        }
    }
}

/// Classify with the default loudness band
pub fn classify(
    audio_issues: &[Issue],
    video_issues: &[Issue],
    meta: &Metadata,
    metrics: &Metrics,
) -> Summary {
    SummaryClassifier::default().classify(audio_issues, video_issues, meta, metrics)
}

/// Distinct issue types in first-seen order
fn distinct_kinds(issues: &[Issue]) -> Vec<IssueKind> {
    let mut kinds = Vec::new();
    for issue in issues {
        if !kinds.contains(&issue.kind) {
            kinds.push(issue.kind);
        }
    }
    kinds
}

fn category_point(category: &str, issues: &[Issue]) -> String {
    let kinds: Vec<&str> = distinct_kinds(issues).iter().map(|k| k.as_str()).collect();
    format!("Found {} {} issues: {}", issues.len(), category, kinds.join(", "))
}

fn definition_tier(width: u32, height: u32) -> &'static str {
    if width >= 1920 && height >= 1080 {
        "High definition video (1080p+)"
    } else if width >= 1280 && height >= 720 {
        "Standard definition video (720p)"
    } else {
        "Low resolution video"
    }
}
