// src/testgen/mod.rs
//
// Synthetic media for tests and demos: generated audio signals, frame
// patterns with known defects, and an in-memory MediaSource/MediaOpener.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::decoder::AudioData;
use crate::core::media::{no_audio_stream, MediaOpener, MediaSource, StreamInfo, VideoFrame};
use crate::error::AnalysisError;

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 36;

/// Mono sine tone.
///
/// Starts at a small phase offset so no sample lands exactly on a zero
/// crossing; with a frequency that divides the analysis hop every frame
/// then has an identical zero-crossing count.
pub fn sine(freq: f64, amplitude: f64, secs: f64, sample_rate: u32) -> AudioData {
    let len = (secs * sample_rate as f64).round() as usize;
    let samples = (0..len)
        .map(|i| {
            let phase = 2.0 * PI * freq * i as f64 / sample_rate as f64 + 0.3;
            (amplitude * phase.sin()) as f32
        })
        .collect();
    AudioData::new(samples, sample_rate, 1).with_codec("pcm_s16le")
}

/// Mono digital silence
pub fn silence(secs: f64, sample_rate: u32) -> AudioData {
    let len = (secs * sample_rate as f64).round() as usize;
    AudioData::new(vec![0.0; len], sample_rate, 1).with_codec("pcm_s16le")
}

/// Pin every channel to `value` between `start_secs` and `end_secs`
pub fn clip_region(audio: &mut AudioData, start_secs: f64, end_secs: f64, value: f32) {
    let channels = audio.channels.max(1);
    let rate = audio.sample_rate as f64;
    let start = ((start_secs * rate).round() as usize * channels).min(audio.samples.len());
    let end = ((end_secs * rate).round() as usize * channels).min(audio.samples.len());
    if start < end {
        audio.samples[start..end].fill(value);
    }
}

/// Write audio as a 16-bit PCM WAV file
pub fn write_wav(path: &Path, audio: &AudioData) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels as u16,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &sample in &audio.samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Frame whose brightness steps every second, so consecutive samples differ
pub fn moving_frame(t: f64) -> VideoFrame {
    let step = (t.max(0.0).round() as u64 % 10) as u8;
    VideoFrame::filled(FRAME_WIDTH, FRAME_HEIGHT, 60 + 15 * step)
}

/// Near-black frame alternating between two dark levels
pub fn dark_frame(t: f64) -> VideoFrame {
    let level = (t.max(0.0).round() as u64 % 2) as u8 * 6;
    VideoFrame::filled(FRAME_WIDTH, FRAME_HEIGHT, level)
}

/// Moving video that holds the frame shown at `start` until `end`
pub fn frozen_between(t: f64, start: f64, end: f64) -> VideoFrame {
    if t >= start && t <= end {
        moving_frame(start)
    } else {
        moving_frame(t)
    }
}

type FrameFn = Box<dyn Fn(f64) -> crate::error::Result<VideoFrame> + Send>;

enum AudioTrack {
    None,
    Decoded(AudioData),
    Undecodable(String),
}

/// In-memory media source with configurable streams and failures
pub struct SyntheticMedia {
    duration: f64,
    fps: f64,
    width: u32,
    height: u32,
    file_size: u64,
    frames: FrameFn,
    audio: AudioTrack,
    probe_error: Option<String>,
    frame_delay: Option<Duration>,
}

impl SyntheticMedia {
    /// Moving video without audio
    pub fn new(duration: f64, fps: f64, width: u32, height: u32) -> Self {
        Self {
            duration,
            fps,
            width,
            height,
            file_size: 1024 * 1024,
            frames: Box::new(|t| Ok(moving_frame(t))),
            audio: AudioTrack::None,
            probe_error: None,
            frame_delay: None,
        }
    }

    pub fn with_audio(mut self, audio: AudioData) -> Self {
        self.audio = AudioTrack::Decoded(audio);
        self
    }

    /// Audio stream that is present but cannot be decoded
    pub fn with_failing_audio(mut self, message: impl Into<String>) -> Self {
        self.audio = AudioTrack::Undecodable(message.into());
        self
    }

    pub fn with_frames<F>(self, frames: F) -> Self
    where
        F: Fn(f64) -> VideoFrame + Send + 'static,
    {
        self.with_frame_source(move |t| Ok(frames(t)))
    }

    /// Frame generator that may fail for individual timestamps
    pub fn with_frame_source<F>(mut self, frames: F) -> Self
    where
        F: Fn(f64) -> crate::error::Result<VideoFrame> + Send + 'static,
    {
        self.frames = Box::new(frames);
        self
    }

    pub fn with_failing_probe(mut self, message: impl Into<String>) -> Self {
        self.probe_error = Some(message.into());
        self
    }

    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size = bytes;
        self
    }

    /// Sleep before every decoded frame, for exercising time limits
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }
}

impl MediaSource for SyntheticMedia {
    fn probe(&self) -> crate::error::Result<StreamInfo> {
        if let Some(message) = &self.probe_error {
            return Err(AnalysisError::Decode(message.clone()));
        }

        let (has_audio, audio_codec, audio_sample_rate) = match &self.audio {
            AudioTrack::None => (false, None, None),
            AudioTrack::Decoded(data) => {
                (true, Some(data.codec_name.clone()), Some(data.sample_rate))
            }
            AudioTrack::Undecodable(_) => (true, Some("unknown".to_string()), None),
        };

        Ok(StreamInfo {
            duration: self.duration,
            fps: self.fps,
            width: self.width,
            height: self.height,
            has_audio,
            video_codec: "rawvideo".to_string(),
            audio_codec,
            audio_sample_rate,
            file_size: self.file_size,
        })
    }

    fn frame_at(&mut self, timestamp: f64) -> crate::error::Result<VideoFrame> {
        if let Some(delay) = self.frame_delay {
            std::thread::sleep(delay);
        }
        (self.frames)(timestamp)
    }

    fn audio(&mut self) -> crate::error::Result<AudioData> {
        match &self.audio {
            AudioTrack::None => Err(no_audio_stream()),
            AudioTrack::Decoded(data) => Ok(data.clone()),
            AudioTrack::Undecodable(message) => Err(AnalysisError::AudioDecode(message.clone())),
        }
    }
}

/// Hands out registered [`SyntheticMedia`] by path, once per registration
#[derive(Default)]
pub struct SyntheticOpener {
    media: Mutex<HashMap<PathBuf, SyntheticMedia>>,
}

impl SyntheticOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: impl Into<PathBuf>, media: SyntheticMedia) {
        if let Ok(mut map) = self.media.lock() {
            map.insert(path.into(), media);
        }
    }
}

impl MediaOpener for SyntheticOpener {
    fn open(&self, path: &Path) -> crate::error::Result<Box<dyn MediaSource>> {
        let media = self
            .media
            .lock()
            .map_err(|_| AnalysisError::Decode("synthetic media registry poisoned".to_string()))?
            .remove(path)
            .ok_or_else(|| {
                AnalysisError::Decode(format!("cannot open {}", path.display()))
            })?;

        Ok(Box::new(media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_region_on_stereo() {
        let mut audio = AudioData::new(vec![0.0; 20], 10, 2);
        clip_region(&mut audio, 0.2, 0.4, 1.0);

        let pinned: Vec<usize> = audio
            .samples
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == 1.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(pinned, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_frame_patterns() {
        assert_ne!(moving_frame(1.0).data, moving_frame(2.0).data);
        assert_eq!(frozen_between(4.0, 3.0, 6.0).data, moving_frame(3.0).data);
        assert_eq!(frozen_between(7.0, 3.0, 6.0).data, moving_frame(7.0).data);
        assert!(dark_frame(3.0).data.iter().all(|&v| v < 8));
    }

    #[test]
    fn test_opener_hands_out_once() {
        let opener = SyntheticOpener::new();
        opener.register("/media/a.mp4", SyntheticMedia::new(1.0, 25.0, 64, 36));

        assert!(opener.open(Path::new("/media/a.mp4")).is_ok());
        assert!(opener.open(Path::new("/media/a.mp4")).is_err());
    }
}
