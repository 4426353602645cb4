// src/config/profiles.rs
//
// Detection threshold profiles for the video and audio checks

use serde::{Deserialize, Serialize};

/// Preset profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePreset {
    /// Reference thresholds for broadcast-style deliverables
    Standard,
    /// Looser cutoffs that flag more borderline content
    Sensitive,
    /// User-defined settings
    Custom,
}

impl ProfilePreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::Standard),
            "sensitive" | "strict" => Some(Self::Sensitive),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Standard, Self::Sensitive]
    }
}

/// Similarity score used to decide whether two sampled frames are frozen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum FrozenMetric {
    /// Frozen when PSNR between consecutive frames exceeds `min_db`
    Psnr { min_db: f64 },
    /// Frozen when the mean absolute luma difference stays below `max`
    MeanAbsDiff { max: f64 },
}

/// How clipped samples are turned into issues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClippingMode {
    /// One issue per contiguous run of samples at or above `threshold`
    Spans { threshold: f32 },
    /// One file-level issue scaled by the fraction of clipped samples
    Percentage {
        threshold: f32,
        /// Percent of clipped samples below which nothing is reported
        report_above_percent: f64,
        /// Percent of clipped samples above which the issue is high severity
        high_above_percent: f64,
    },
}

impl ClippingMode {
    pub fn threshold(&self) -> f32 {
        match *self {
            ClippingMode::Spans { threshold } => threshold,
            ClippingMode::Percentage { threshold, .. } => threshold,
        }
    }
}

/// Video detector thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoThresholds {
    /// Seconds between sampled frames
    pub sample_interval_secs: f64,
    /// Mean luma (0-255) below which a frame counts as black
    pub black_threshold: f64,
    /// Stricter luma cutoff that escalates a black frame to high severity
    pub black_high_threshold: Option<f64>,
    pub frozen_metric: FrozenMetric,
    /// Frozen spans must be strictly longer than this to be reported
    pub frozen_min_span_secs: f64,
    /// Frozen spans longer than this are high severity
    pub frozen_high_span_secs: f64,
    pub min_width: u32,
    pub min_height: u32,
    pub min_fps: f64,
}

impl Default for VideoThresholds {
    fn default() -> Self {
        Self {
            sample_interval_secs: 1.0,
            black_threshold: 8.0,
            black_high_threshold: None,
            frozen_metric: FrozenMetric::Psnr { min_db: 45.0 },
            frozen_min_span_secs: 2.0,
            frozen_high_span_secs: 5.0,
            min_width: 720,
            min_height: 480,
            min_fps: 24.0,
        }
    }
}

/// Audio detector thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioThresholds {
    /// Lower edge of the integrated loudness target band (LUFS)
    pub loudness_min_lufs: f64,
    /// Upper edge of the integrated loudness target band (LUFS)
    pub loudness_max_lufs: f64,
    pub clipping: ClippingMode,
    /// Samples below this level (dBFS) count as silent
    pub silence_threshold_db: f64,
    /// Minimum silent run that is reported
    pub silence_min_secs: f64,
    /// Silent runs at least this long are medium severity
    pub silence_medium_secs: f64,
    pub dc_offset_threshold: f64,
    /// Pearson correlation above which a stereo pair is treated as mono
    pub stereo_correlation_threshold: f64,
    pub glitch_frame_secs: f64,
    pub glitch_hop_secs: f64,
    /// Percentile of per-frame zero-crossing rate used as the glitch cutoff
    pub glitch_zcr_percentile: f64,
    /// Percentile of per-frame RMS used as the glitch cutoff
    pub glitch_rms_percentile: f64,
    /// Flagged frame indices closer than this are merged into one group
    pub glitch_max_gap: usize,
    pub glitch_min_secs: f64,
    /// Run the independent audio checks on the rayon pool
    pub parallel_checks: bool,
}

impl Default for AudioThresholds {
    fn default() -> Self {
        Self {
            loudness_min_lufs: -28.0,
            loudness_max_lufs: -12.0,
            clipping: ClippingMode::Spans { threshold: 0.99 },
            silence_threshold_db: -40.0,
            silence_min_secs: 1.0,
            silence_medium_secs: 3.0,
            dc_offset_threshold: 0.01,
            stereo_correlation_threshold: 0.99,
            glitch_frame_secs: 0.025,
            glitch_hop_secs: 0.010,
            glitch_zcr_percentile: 95.0,
            glitch_rms_percentile: 20.0,
            glitch_max_gap: 2,
            glitch_min_secs: 0.05,
            parallel_checks: true,
        }
    }
}

/// Complete analysis profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Profile name
    pub name: String,
    /// Base preset this was derived from
    pub base_preset: ProfilePreset,
    pub video: VideoThresholds,
    pub audio: AudioThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_preset(ProfilePreset::Standard)
    }
}

impl AnalysisConfig {
    /// Create profile from preset
    pub fn from_preset(preset: ProfilePreset) -> Self {
        match preset {
            ProfilePreset::Standard | ProfilePreset::Custom => Self::standard(),
            ProfilePreset::Sensitive => Self::sensitive(),
        }
    }

    fn standard() -> Self {
        Self {
            name: "Standard".to_string(),
            base_preset: ProfilePreset::Standard,
            video: VideoThresholds::default(),
            audio: AudioThresholds::default(),
        }
    }

    fn sensitive() -> Self {
        let video = VideoThresholds {
            // Dark scenes are flagged early, near-black ones escalate
            black_threshold: 20.0,
            black_high_threshold: Some(5.0),
            frozen_metric: FrozenMetric::MeanAbsDiff { max: 2.0 },
            ..VideoThresholds::default()
        };

        let audio = AudioThresholds {
            clipping: ClippingMode::Percentage {
                threshold: 0.95,
                report_above_percent: 0.01,
                high_above_percent: 0.5,
            },
            ..AudioThresholds::default()
        };

        Self {
            name: "Sensitive".to_string(),
            base_preset: ProfilePreset::Sensitive,
            video,
            audio,
        }
    }
}

/// Builder for custom profiles
pub struct ProfileBuilder {
    config: AnalysisConfig,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    pub fn from_preset(preset: ProfilePreset) -> Self {
        Self {
            config: AnalysisConfig::from_preset(preset),
        }
    }

    pub fn from_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn sample_interval(mut self, secs: f64) -> Self {
        self.config.video.sample_interval_secs = secs;
        self
    }

    pub fn black_threshold(mut self, luma: f64) -> Self {
        self.config.video.black_threshold = luma.clamp(0.0, 255.0);
        self
    }

    pub fn frozen_metric(mut self, metric: FrozenMetric) -> Self {
        self.config.video.frozen_metric = metric;
        self
    }

    pub fn frozen_min_span(mut self, secs: f64) -> Self {
        self.config.video.frozen_min_span_secs = secs.max(0.0);
        self
    }

    pub fn clipping(mut self, mode: ClippingMode) -> Self {
        self.config.audio.clipping = mode;
        self
    }

    pub fn silence(mut self, threshold_db: f64, min_secs: f64) -> Self {
        self.config.audio.silence_threshold_db = threshold_db;
        self.config.audio.silence_min_secs = min_secs.max(0.0);
        self
    }

    pub fn loudness_band(mut self, min_lufs: f64, max_lufs: f64) -> Self {
        self.config.audio.loudness_min_lufs = min_lufs.min(max_lufs);
        self.config.audio.loudness_max_lufs = max_lufs.max(min_lufs);
        self
    }

    pub fn glitch_percentiles(mut self, zcr: f64, rms: f64) -> Self {
        self.config.audio.glitch_zcr_percentile = zcr.clamp(0.0, 100.0);
        self.config.audio.glitch_rms_percentile = rms.clamp(0.0, 100.0);
        self
    }

    pub fn parallel_checks(mut self, enabled: bool) -> Self {
        self.config.audio.parallel_checks = enabled;
        self
    }

    pub fn build(mut self) -> AnalysisConfig {
        self.config.base_preset = ProfilePreset::Custom;
        self.config
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
