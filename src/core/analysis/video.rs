// src/core/analysis/video.rs
//
// Video defect detector: samples frames at a fixed interval and applies
// brightness and consecutive-frame similarity heuristics.

use log::{debug, warn};
use rayon::prelude::*;

use crate::config::{FrozenMetric, VideoThresholds};
use crate::core::media::{MediaSource, VideoFrame};
use crate::core::metadata::Metadata;
use crate::detection::{format_timestamp, sort_by_timestamp, Issue, IssueKind, Severity};
use crate::error::{AnalysisError, Result};

/// Output of the video stage
#[derive(Debug, Clone, Default)]
pub struct VideoReport {
    pub issues: Vec<Issue>,
    /// Timestamps that were requested from the source
    pub samples_taken: usize,
    /// Frames decoded and analyzed successfully
    pub frames_analyzed: usize,
    pub black_frames: usize,
    /// Sampled frames found similar to their predecessor
    pub frozen_frames: usize,
}

/// Mean luma in 0-255
pub fn mean_brightness(luma: &[u8]) -> f64 {
    if luma.is_empty() {
        return 0.0;
    }
    luma.par_iter().map(|&v| v as u64).sum::<u64>() as f64 / luma.len() as f64
}

/// Mean squared error between two equally sized luma planes
pub fn mean_squared_error(a: &[u8], b: &[u8]) -> f64 {
    let sum: f64 = a
        .par_iter()
        .zip(b.par_iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    sum / a.len().max(1) as f64
}

/// PSNR in dB; identical planes give positive infinity
pub fn psnr(a: &[u8], b: &[u8]) -> f64 {
    let mse = mean_squared_error(a, b);
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0 * 255.0 / mse).log10()
    }
}

/// Mean absolute luma difference
pub fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    let sum: u64 = a
        .par_iter()
        .zip(b.par_iter())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();
    sum as f64 / a.len().max(1) as f64
}

fn sample_frame(source: &mut dyn MediaSource, timestamp: f64) -> Result<VideoFrame> {
    let frame = source.frame_at(timestamp)?;
    frame
        .validate()
        .map_err(|message| AnalysisError::Frame { timestamp, message })?;
    Ok(frame)
}

struct SampledFrame {
    timestamp: f64,
    width: u32,
    height: u32,
    luma: Vec<u8>,
}

/// Closed interval of consecutive similar samples
struct FrozenRun {
    start: f64,
    end: f64,
}

pub struct VideoDetector {
    config: VideoThresholds,
}

impl VideoDetector {
    pub fn new(config: VideoThresholds) -> Self {
        Self { config }
    }

    /// Sampling instants `i * interval` covering `[0, duration)`
    pub fn sample_times(&self, duration: f64) -> Result<Vec<f64>> {
        let interval = self.config.sample_interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(AnalysisError::Video(format!(
                "invalid sampling interval {}",
                interval
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnalysisError::Video(format!("invalid duration {}", duration)));
        }

        let count = (duration / interval).ceil() as usize;
        Ok((0..count)
            .map(|i| i as f64 * interval)
            .filter(|&t| t < duration)
            .collect())
    }

    /// Resolution and frame-rate checks, emitted once per file
    pub fn static_checks(&self, meta: &Metadata) -> Vec<Issue> {
        let mut issues = Vec::new();

        if meta.width < self.config.min_width || meta.height < self.config.min_height {
            issues.push(Issue::new(
                IssueKind::LowResolution,
                0.0,
                meta.duration,
                Severity::Medium,
                format!(
                    "Low resolution: {}x{} (minimum {}x{})",
                    meta.width, meta.height, self.config.min_width, self.config.min_height
                ),
            ));
        }

        if meta.fps < self.config.min_fps {
            issues.push(Issue::new(
                IssueKind::LowFramerate,
                0.0,
                meta.duration,
                Severity::Low,
                format!(
                    "Low frame rate: {:.2} fps (minimum {} fps)",
                    meta.fps, self.config.min_fps
                ),
            ));
        }

        issues
    }

    fn black_frame_issue(&self, timestamp: f64, brightness: f64) -> Option<Issue> {
        if brightness >= self.config.black_threshold {
            return None;
        }

        let severity = match self.config.black_high_threshold {
            Some(strict) if brightness < strict => Severity::High,
            _ => Severity::Medium,
        };

        Some(Issue::new(
            IssueKind::BlackFrame,
            timestamp,
            self.config.sample_interval_secs,
            severity,
            format!("Black frame detected (brightness: {:.1}/255)", brightness),
        ))
    }

    fn is_frozen(&self, prev: &SampledFrame, width: u32, height: u32, luma: &[u8]) -> bool {
        if prev.width != width || prev.height != height || prev.luma.len() != luma.len() {
            return false;
        }

        match self.config.frozen_metric {
            FrozenMetric::Psnr { min_db } => psnr(&prev.luma, luma) > min_db,
            FrozenMetric::MeanAbsDiff { max } => mean_abs_diff(&prev.luma, luma) < max,
        }
    }

    fn frozen_run_issue(&self, run: FrozenRun) -> Option<Issue> {
        let span = run.end - run.start;
        if span <= self.config.frozen_min_span_secs {
            return None;
        }

        let severity = if span > self.config.frozen_high_span_secs {
            Severity::High
        } else {
            Severity::Medium
        };

        Some(Issue::new(
            IssueKind::FrozenFrame,
            run.start,
            span,
            severity,
            format!("Frozen frames for {:.1} seconds", span),
        ))
    }

    /// Sample the source and run every video heuristic.
    ///
    /// Per-frame failures become `frame_analysis_error` issues; only an
    /// unusable sampling setup fails the whole stage.
    pub fn analyze(&self, source: &mut dyn MediaSource, meta: &Metadata) -> Result<VideoReport> {
        let times = self.sample_times(meta.duration)?;

        let mut report = VideoReport {
            issues: self.static_checks(meta),
            samples_taken: times.len(),
            ..Default::default()
        };

        let mut prev: Option<SampledFrame> = None;
        let mut run: Option<FrozenRun> = None;

        for &t in &times {
            let frame = match sample_frame(source, t) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Frame at {} could not be analyzed: {}", format_timestamp(t), e);
                    report.issues.push(Issue::new(
                        IssueKind::FrameAnalysisError,
                        t,
                        0.0,
                        Severity::Low,
                        format!("Frame analysis failed: {}", e),
                    ));
                    continue;
                }
            };

            report.frames_analyzed += 1;
            let (width, height) = (frame.width, frame.height);
            let luma = frame.to_luma();

            let brightness = mean_brightness(&luma);
            if let Some(issue) = self.black_frame_issue(t, brightness) {
                report.black_frames += 1;
                report.issues.push(issue);
            }

            let similar = prev
                .as_ref()
                .map_or(false, |p| self.is_frozen(p, width, height, &luma));

            if similar {
                report.frozen_frames += 1;
                match run.as_mut() {
                    Some(r) => r.end = t,
                    None => {
                        let start = prev.as_ref().map_or(t, |p| p.timestamp);
                        run = Some(FrozenRun { start, end: t });
                    }
                }
            } else if let Some(finished) = run.take() {
                report.issues.extend(self.frozen_run_issue(finished));
            }

            prev = Some(SampledFrame {
                timestamp: t,
                width,
                height,
                luma: luma.into_owned(),
            });
        }

        if let Some(finished) = run.take() {
            report.issues.extend(self.frozen_run_issue(finished));
        }

        sort_by_timestamp(&mut report.issues);

        debug!(
            "Video: {}/{} frames analyzed, {} black, {} frozen",
            report.frames_analyzed, report.samples_taken, report.black_frames, report.frozen_frames
        );

        Ok(report)
    }
}

impl Default for VideoDetector {
    fn default() -> Self {
        Self::new(VideoThresholds::default())
    }
}
