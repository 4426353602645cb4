// src/core/metadata.rs
//
// Metadata extraction from a decoded-media handle

use serde::{Deserialize, Serialize};

use super::media::MediaSource;
use crate::error::{AnalysisError, Result};

/// Stream-level facts about the analyzed source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Duration in seconds
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub audio_sample_rate: Option<u32>,
    /// Size in bytes
    pub file_size: u64,
}

/// Probe the source and validate what it reports.
///
/// Any probe failure or unusable value is a decode error.
pub fn extract_metadata(source: &dyn MediaSource) -> Result<Metadata> {
    let info = source.probe()?;

    if !info.duration.is_finite() || info.duration < 0.0 {
        return Err(AnalysisError::Decode(format!(
            "invalid duration {}",
            info.duration
        )));
    }
    if !info.fps.is_finite() || info.fps <= 0.0 {
        return Err(AnalysisError::Decode(format!("invalid frame rate {}", info.fps)));
    }
    if info.width == 0 || info.height == 0 {
        return Err(AnalysisError::Decode("no video stream".to_string()));
    }

    Ok(Metadata {
        duration: info.duration,
        fps: info.fps,
        width: info.width,
        height: info.height,
        has_audio: info.has_audio,
        video_codec: info.video_codec,
        audio_codec: info.audio_codec.filter(|_| info.has_audio),
        audio_sample_rate: info.audio_sample_rate.filter(|_| info.has_audio),
        file_size: info.file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen::SyntheticMedia;

    #[test]
    fn test_extract_metadata() {
        let media = SyntheticMedia::new(10.0, 30.0, 1920, 1080)
            .with_audio(crate::testgen::sine(440.0, 0.3, 10.0, 48000));

        let meta = extract_metadata(&media).unwrap();
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.fps, 30.0);
        assert!(meta.has_audio);
        assert_eq!(meta.audio_sample_rate, Some(48000));
    }

    #[test]
    fn test_invalid_probe_is_decode_error() {
        let media = SyntheticMedia::new(f64::NAN, 30.0, 640, 480);
        assert!(matches!(
            extract_metadata(&media),
            Err(AnalysisError::Decode(_))
        ));

        let media = SyntheticMedia::new(5.0, 0.0, 640, 480);
        assert!(matches!(
            extract_metadata(&media),
            Err(AnalysisError::Decode(_))
        ));
    }

    #[test]
    fn test_probe_failure_propagates() {
        let media = SyntheticMedia::new(5.0, 25.0, 640, 480).with_failing_probe("corrupt header");
        assert!(matches!(
            extract_metadata(&media),
            Err(AnalysisError::Decode(_))
        ));
    }
}
