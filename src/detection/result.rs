//! Issue types produced by the video and audio detectors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp;

/// Severity level for a detected issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a look, rarely blocks delivery
    Low,
    /// Should be reviewed before delivery
    Medium,
    /// Definite defect
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Low => "ℹ",
            Severity::Medium => "⚠",
            Severity::High => "✗",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    BlackFrame,
    FrozenFrame,
    LowResolution,
    LowFramerate,
    FrameAnalysisError,
    LowLoudness,
    HighLoudness,
    Clipping,
    Silence,
    DcOffset,
    MonoInStereo,
    VoiceGlitch,
    NoAudio,
    AudioAnalysisError,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::BlackFrame => "black_frame",
            IssueKind::FrozenFrame => "frozen_frame",
            IssueKind::LowResolution => "low_resolution",
            IssueKind::LowFramerate => "low_framerate",
            IssueKind::FrameAnalysisError => "frame_analysis_error",
            IssueKind::LowLoudness => "low_loudness",
            IssueKind::HighLoudness => "high_loudness",
            IssueKind::Clipping => "clipping",
            IssueKind::Silence => "silence",
            IssueKind::DcOffset => "dc_offset",
            IssueKind::MonoInStereo => "mono_in_stereo",
            IssueKind::VoiceGlitch => "voice_glitch",
            IssueKind::NoAudio => "no_audio",
            IssueKind::AudioAnalysisError => "audio_analysis_error",
        }
    }

    /// Remediation hint attached to every issue of this kind
    pub fn suggested_fix(&self) -> &'static str {
        match self {
            IssueKind::BlackFrame => "Check for encoding issues or intentional black frames",
            IssueKind::FrozenFrame => "Check encoding settings or source material",
            IssueKind::LowResolution => "Consider using higher resolution source material",
            IssueKind::LowFramerate => "Consider using higher frame rate for smoother playback",
            IssueKind::FrameAnalysisError => "Check video file integrity",
            IssueKind::LowLoudness => "Increase audio levels or apply normalization",
            IssueKind::HighLoudness => "Reduce audio levels to prevent distortion",
            IssueKind::Clipping => "Reduce input gain or apply limiting",
            IssueKind::Silence => "Check for intentional silence or audio gaps",
            IssueKind::DcOffset => "Apply high-pass filter to remove DC component",
            IssueKind::MonoInStereo => "Convert to true mono or add stereo content",
            IssueKind::VoiceGlitch => "Check for audio artifacts or encoding issues",
            IssueKind::NoAudio => "Add audio track if audio is expected",
            IssueKind::AudioAnalysisError => "Check audio format compatibility",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single timestamped defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Offset from the start of the file in seconds
    #[serde(with = "timestamp::serde_hms")]
    pub timestamp: f64,
    /// Duration in seconds
    pub duration: f64,
    pub severity: Severity,
    pub description: String,
    pub suggested_fix: String,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        timestamp: f64,
        duration: f64,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            timestamp,
            duration,
            severity,
            description: description.into(),
            suggested_fix: kind.suggested_fix().to_string(),
        }
    }

}

/// Stable ascending sort by timestamp; equal timestamps keep detection order
pub fn sort_by_timestamp(issues: &mut [Issue]) {
    issues.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}

/// Count issues at the given severity
pub fn count_severity(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_issue_serialization() {
        let issue = Issue::new(
            IssueKind::Clipping,
            2.0,
            1.0,
            Severity::High,
            "Audio clipping detected for 1.000 seconds",
        );

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "clipping");
        assert_eq!(value["timestamp"], "00:00:02.000");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["suggested_fix"], "Reduce input gain or apply limiting");

        let back: Issue = serde_json::from_value(value).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut issues = vec![
            Issue::new(IssueKind::Silence, 4.0, 1.0, Severity::Low, "b"),
            Issue::new(IssueKind::LowLoudness, 0.0, 5.0, Severity::Medium, "a"),
            Issue::new(IssueKind::DcOffset, 0.0, 5.0, Severity::Low, "c"),
        ];

        sort_by_timestamp(&mut issues);

        let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![IssueKind::LowLoudness, IssueKind::DcOffset, IssueKind::Silence]
        );
    }

    #[test]
    fn test_count_severity() {
        let issues = vec![
            Issue::new(IssueKind::Clipping, 0.0, 0.1, Severity::High, "x"),
            Issue::new(IssueKind::Silence, 1.0, 1.0, Severity::Low, "y"),
            Issue::new(IssueKind::Clipping, 2.0, 0.1, Severity::High, "z"),
        ];
        assert_eq!(count_severity(&issues, Severity::High), 2);
        assert_eq!(count_severity(&issues, Severity::Medium), 0);
    }
}
