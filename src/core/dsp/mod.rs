//! Digital Signal Processing utilities

pub mod filters;
pub mod loudness;
pub mod stats;

pub use filters::{Biquad, KWeighting};
pub use loudness::integrated_loudness;
pub use stats::{
    amplitude_to_db, find_runs, group_indices, mean, pearson_correlation, peak_amplitude,
    percentile, rms, round_to, zero_crossing_rate,
};

/// Fixed-size analysis frames over a signal
///
/// Frames start every `hop` samples; a trailing partial frame is dropped.
pub fn frames(samples: &[f32], frame_len: usize, hop: usize) -> impl Iterator<Item = &[f32]> {
    let count = if frame_len == 0 || hop == 0 || samples.len() < frame_len {
        0
    } else {
        1 + (samples.len() - frame_len) / hop
    };

    (0..count).map(move |i| &samples[i * hop..i * hop + frame_len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        let signal = vec![0.0f32; 100];
        assert_eq!(frames(&signal, 25, 10).count(), 8);
        assert_eq!(frames(&signal, 100, 10).count(), 1);
        assert_eq!(frames(&signal, 101, 10).count(), 0);
        assert_eq!(frames(&signal, 25, 0).count(), 0);
    }

    #[test]
    fn test_frames_are_contiguous_windows() {
        let signal: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let collected: Vec<Vec<f32>> = frames(&signal, 4, 3).map(|f| f.to_vec()).collect();
        assert_eq!(
            collected,
            vec![
                vec![0.0, 1.0, 2.0, 3.0],
                vec![3.0, 4.0, 5.0, 6.0],
                vec![6.0, 7.0, 8.0, 9.0],
            ]
        );
    }
}
