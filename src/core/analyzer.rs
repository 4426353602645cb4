// src/core/analyzer.rs
//
// Single-file analysis pipeline: metadata, audio, video, metrics, summary.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::analysis::{AudioDetector, AudioReport, VideoDetector};
use super::media::MediaSource;
use super::metadata::{extract_metadata, Metadata};
use super::metrics::{aggregate, Metrics};
use crate::config::{AnalysisConfig, ProfilePreset};
use crate::detection::{Issue, Summary, SummaryClassifier};
use crate::error::Result;

/// Pipeline checkpoints reported while a file is analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisStage {
    Starting,
    Metadata,
    Audio,
    Video,
    Metrics,
    Compiling,
    Complete,
}

impl AnalysisStage {
    pub fn progress(&self) -> u8 {
        match self {
            AnalysisStage::Starting => 0,
            AnalysisStage::Metadata => 10,
            AnalysisStage::Audio => 30,
            AnalysisStage::Video => 60,
            AnalysisStage::Metrics => 80,
            AnalysisStage::Compiling => 90,
            AnalysisStage::Complete => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::Starting => "Starting analysis...",
            AnalysisStage::Metadata => "Extracting metadata...",
            AnalysisStage::Audio => "Analyzing audio...",
            AnalysisStage::Video => "Analyzing video frames...",
            AnalysisStage::Metrics => "Computing metrics...",
            AnalysisStage::Compiling => "Compiling report...",
            AnalysisStage::Complete => "Analysis complete",
        }
    }
}

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: Metadata,
    pub audio_issues: Vec<Issue>,
    pub video_issues: Vec<Issue>,
    pub metrics: Metrics,
    pub summary: Summary,
}

pub struct MediaAnalyzer {
    config: AnalysisConfig,
}

impl MediaAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn from_preset(preset: ProfilePreset) -> Self {
        Self::new(AnalysisConfig::from_preset(preset))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, source: &mut dyn MediaSource) -> Result<AnalysisReport> {
        self.analyze_with_progress(source, &mut |_| {})
    }

    /// Run the full pipeline, calling `on_stage` as each checkpoint is entered.
    ///
    /// Metadata and video failures abort the run; an audio stream that cannot
    /// be decoded is reported as an `audio_analysis_error` issue instead.
    pub fn analyze_with_progress(
        &self,
        source: &mut dyn MediaSource,
        on_stage: &mut dyn FnMut(AnalysisStage),
    ) -> Result<AnalysisReport> {
        on_stage(AnalysisStage::Starting);

        on_stage(AnalysisStage::Metadata);
        let metadata = extract_metadata(&*source)?;
        info!(
            "Metadata: {:.2}s, {}x{} @ {:.2} fps, audio: {}",
            metadata.duration, metadata.width, metadata.height, metadata.fps, metadata.has_audio
        );

        on_stage(AnalysisStage::Audio);
        let audio = self.analyze_audio(source, &metadata);
        info!("Audio analysis found {} issue(s)", audio.issues.len());

        on_stage(AnalysisStage::Video);
        let video = VideoDetector::new(self.config.video.clone()).analyze(source, &metadata)?;
        info!("Video analysis found {} issue(s)", video.issues.len());

        on_stage(AnalysisStage::Metrics);
        let metrics = aggregate(&metadata, &audio, &video);

        on_stage(AnalysisStage::Compiling);
        let summary = SummaryClassifier::default()
            .with_loudness_band(
                self.config.audio.loudness_min_lufs,
                self.config.audio.loudness_max_lufs,
            )
            .classify(&audio.issues, &video.issues, &metadata, &metrics);

        on_stage(AnalysisStage::Complete);
        info!("Analysis complete: {}", summary.status);

        Ok(AnalysisReport {
            metadata,
            audio_issues: audio.issues,
            video_issues: video.issues,
            metrics,
            summary,
        })
    }

    fn analyze_audio(&self, source: &mut dyn MediaSource, metadata: &Metadata) -> AudioReport {
        if !metadata.has_audio {
            return AudioReport::no_audio(metadata.duration);
        }

        let detector = AudioDetector::new(&self.config.audio);
        match source.audio().and_then(|data| detector.analyze(&data)) {
            Ok(report) => report,
            Err(e) => {
                warn!("Audio analysis failed: {}", e);
                AudioReport::analysis_failed(e)
            }
        }
    }
}

impl Default for MediaAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{IssueKind, OverallStatus, Severity};
    use crate::error::AnalysisError;
    use crate::testgen::{self, SyntheticMedia};

    #[test]
    fn test_stages_in_order() {
        let mut media = SyntheticMedia::new(3.0, 25.0, 1920, 1080)
            .with_audio(testgen::sine(440.0, 0.1, 3.0, 44100));
        let mut stages = Vec::new();

        MediaAnalyzer::default()
            .analyze_with_progress(&mut media, &mut |stage| stages.push(stage))
            .unwrap();

        let progress: Vec<u8> = stages.iter().map(|s| s.progress()).collect();
        assert_eq!(progress, vec![0, 10, 30, 60, 80, 90, 100]);
    }

    #[test]
    fn test_no_audio_stream() {
        let mut media = SyntheticMedia::new(5.0, 25.0, 1920, 1080);
        let report = MediaAnalyzer::default().analyze(&mut media).unwrap();

        assert_eq!(report.audio_issues.len(), 1);
        assert_eq!(report.audio_issues[0].kind, IssueKind::NoAudio);
        assert_eq!(report.audio_issues[0].severity, Severity::Medium);
        assert!(report.metrics.integrated_lufs.is_none());
    }

    #[test]
    fn test_undecodable_audio_is_not_fatal() {
        let mut media =
            SyntheticMedia::new(5.0, 25.0, 1920, 1080).with_failing_audio("unsupported codec");
        let report = MediaAnalyzer::default().analyze(&mut media).unwrap();

        assert_eq!(report.audio_issues.len(), 1);
        assert_eq!(report.audio_issues[0].kind, IssueKind::AudioAnalysisError);
        assert_eq!(report.summary.status, OverallStatus::Fail);
        assert_eq!(report.metrics.frames_analyzed, 5);
    }

    #[test]
    fn test_metadata_failure_is_fatal() {
        let mut media = SyntheticMedia::new(5.0, 25.0, 1920, 1080).with_failing_probe("bad header");
        let mut stages = Vec::new();
        let result =
            MediaAnalyzer::default().analyze_with_progress(&mut media, &mut |s| stages.push(s));

        assert!(matches!(result, Err(AnalysisError::Decode(_))));
        assert_eq!(stages.last(), Some(&AnalysisStage::Metadata));
    }

    #[test]
    fn test_invalid_sampling_is_fatal() {
        let mut config = AnalysisConfig::default();
        config.video.sample_interval_secs = -1.0;
        let mut media = SyntheticMedia::new(5.0, 25.0, 1920, 1080);

        let result = MediaAnalyzer::new(config).analyze(&mut media);
        assert!(matches!(result, Err(AnalysisError::Video(_))));
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let mut media = SyntheticMedia::new(4.0, 30.0, 640, 360);
        let report = MediaAnalyzer::default().analyze(&mut media).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.video_issues.len(), 2);
    }
}
