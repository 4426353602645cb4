// src/core/metrics.rs
//
// Metric aggregation: a pure summary of metadata plus the audio and video
// stage byproducts.

use serde::{Deserialize, Serialize};

use super::analysis::{AudioReport, VideoReport};
use super::dsp::{peak_amplitude, rms, round_to};
use super::metadata::Metadata;
use crate::detection::format_timestamp;

/// Technical measurements reported alongside the issue lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub duration_formatted: String,
    pub resolution: String,
    pub aspect_ratio: f64,
    pub fps: f64,
    pub file_size_mb: f64,
    pub bitrate_estimate_kbps: f64,
    /// Integrated loudness in LUFS, "N/A" when unmeasured
    #[serde(with = "measured")]
    pub integrated_lufs: Option<f64>,
    /// Peak-to-RMS ratio in dB, "N/A" when unmeasured
    #[serde(with = "measured")]
    pub dynamic_range_db: Option<f64>,
    pub audio_sample_rate: Option<u32>,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub frames_analyzed: usize,
    pub black_frames_detected: usize,
    pub frozen_frames_detected: usize,
}

/// Build the metrics for one analysis run
pub fn aggregate(meta: &Metadata, audio: &AudioReport, video: &VideoReport) -> Metrics {
    let aspect_ratio = if meta.height == 0 {
        0.0
    } else {
        round_to(meta.width as f64 / meta.height as f64, 2)
    };

    let bitrate_estimate_kbps = if meta.duration > 0.0 {
        round_to(meta.file_size as f64 * 8.0 / meta.duration / 1024.0, 2)
    } else {
        0.0
    };

    let integrated_lufs = audio
        .signal
        .as_ref()
        .and_then(|s| s.integrated_lufs())
        .filter(|l| l.is_finite())
        .map(|l| round_to(l, 2));

    let dynamic_range_db = audio
        .signal
        .as_ref()
        .and_then(|s| dynamic_range(s.mono()));

    Metrics {
        duration_formatted: format_timestamp(meta.duration),
        resolution: format!("{}x{}", meta.width, meta.height),
        aspect_ratio,
        fps: meta.fps,
        file_size_mb: round_to(meta.file_size as f64 / (1024.0 * 1024.0), 2),
        bitrate_estimate_kbps,
        integrated_lufs,
        dynamic_range_db,
        audio_sample_rate: meta.audio_sample_rate,
        video_codec: meta.video_codec.clone(),
        audio_codec: meta.audio_codec.clone(),
        frames_analyzed: video.frames_analyzed,
        black_frames_detected: video.black_frames,
        frozen_frames_detected: video.frozen_frames,
    }
}

/// `20·log10(peak / rms)`, `None` for a zero-energy signal
pub fn dynamic_range(samples: &[f32]) -> Option<f64> {
    let energy = rms(samples);
    if energy <= 0.0 {
        return None;
    }
    Some(round_to(20.0 * (peak_amplitude(samples) / energy).log10(), 2))
}

/// Serde adapter writing `None` (or a non-finite value) as `"N/A"`
mod measured {
    use serde::{Deserialize, Deserializer, Serializer};

    const UNMEASURED: &str = "N/A";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) if v.is_finite() => serializer.serialize_f64(*v),
            _ => serializer.serialize_str(UNMEASURED),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Some(v),
            Raw::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::AudioSignal;

    fn metadata() -> Metadata {
        Metadata {
            duration: 10.0,
            fps: 25.0,
            width: 1920,
            height: 1080,
            has_audio: true,
            video_codec: "png".to_string(),
            audio_codec: Some("pcm_s16le".to_string()),
            audio_sample_rate: Some(44100),
            file_size: 5 * 1024 * 1024,
        }
    }

    #[test]
    fn test_aggregate_video_metrics() {
        let video = VideoReport {
            frames_analyzed: 10,
            black_frames: 2,
            frozen_frames: 3,
            ..Default::default()
        };
        let metrics = aggregate(&metadata(), &AudioReport::no_audio(10.0), &video);

        assert_eq!(metrics.resolution, "1920x1080");
        assert_eq!(metrics.aspect_ratio, 1.78);
        assert_eq!(metrics.duration_formatted, "00:00:10.000");
        assert_eq!(metrics.file_size_mb, 5.0);
        assert_eq!(metrics.bitrate_estimate_kbps, 4096.0);
        assert_eq!(metrics.frames_analyzed, 10);
        assert_eq!(metrics.black_frames_detected, 2);
        assert_eq!(metrics.frozen_frames_detected, 3);
        assert!(metrics.integrated_lufs.is_none());
    }

    #[test]
    fn test_degenerate_geometry() {
        let mut meta = metadata();
        meta.height = 0;
        meta.duration = 0.0;
        let metrics = aggregate(&meta, &AudioReport::default(), &VideoReport::default());

        assert_eq!(metrics.aspect_ratio, 0.0);
        assert_eq!(metrics.bitrate_estimate_kbps, 0.0);
    }

    #[test]
    fn test_silent_audio_is_unmeasured() {
        let audio = AudioReport {
            issues: Vec::new(),
            signal: Some(AudioSignal::mono_only(vec![0.0; 44100], 44100)),
        };
        let metrics = aggregate(&metadata(), &audio, &VideoReport::default());

        assert!(metrics.integrated_lufs.is_none());
        assert!(metrics.dynamic_range_db.is_none());

        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value["integrated_lufs"], "N/A");
        assert_eq!(value["dynamic_range_db"], "N/A");

        let back: Metrics = serde_json::from_value(value).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn test_dynamic_range_of_square_wave() {
        let square: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert_eq!(dynamic_range(&square), Some(0.0));

        let pulse: Vec<f32> = (0..100).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect();
        // peak 1, rms 0.1
        assert_eq!(dynamic_range(&pulse), Some(20.0));
    }

    #[test]
    fn test_measured_loudness_is_rounded() {
        let tone: Vec<f32> = (0..44100 * 3)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * 1000.0 * i as f64 / 44100.0;
                (0.1 * phase.sin()) as f32
            })
            .collect();
        let audio = AudioReport {
            issues: Vec::new(),
            signal: Some(AudioSignal::mono_only(tone, 44100)),
        };
        let metrics = aggregate(&metadata(), &audio, &VideoReport::default());

        let lufs = metrics.integrated_lufs.unwrap();
        assert_eq!(lufs, round_to(lufs, 2));
        assert!(lufs < -20.0 && lufs > -26.0);
    }
}
