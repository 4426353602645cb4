//! Gated integrated loudness (ITU-R BS.1770 / EBU R128)

use super::filters::KWeighting;

const BLOCK_SECS: f64 = 0.4;
const ABSOLUTE_GATE_LUFS: f64 = -70.0;
const RELATIVE_GATE_LU: f64 = -10.0;

fn power_to_lufs(power: f64) -> f64 {
    if power > 0.0 {
        -0.691 + 10.0 * power.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Integrated loudness of a mono signal in LUFS.
///
/// Blocks are 400 ms with 75% overlap. Returns `None` when the signal is
/// shorter than one block, and `f64::NEG_INFINITY` when no block survives
/// the absolute gate (silence).
pub fn integrated_loudness(samples: &[f32], sample_rate: u32) -> Option<f64> {
    let block_size = (sample_rate as f64 * BLOCK_SECS) as usize;
    let hop_size = block_size / 4;

    if block_size == 0 || hop_size == 0 || samples.len() < block_size {
        return None;
    }

    let weighted = KWeighting::apply(sample_rate, samples);

    let block_powers: Vec<f64> = (0..=(weighted.len() - block_size) / hop_size)
        .map(|b| {
            let start = b * hop_size;
            let block = &weighted[start..start + block_size];
            block.iter().map(|s| s * s).sum::<f64>() / block_size as f64
        })
        .collect();

    let above_absolute: Vec<f64> = block_powers
        .into_iter()
        .filter(|&p| power_to_lufs(p) > ABSOLUTE_GATE_LUFS)
        .collect();

    if above_absolute.is_empty() {
        return Some(f64::NEG_INFINITY);
    }

    let ungated_mean = above_absolute.iter().sum::<f64>() / above_absolute.len() as f64;
    let relative_gate = power_to_lufs(ungated_mean) + RELATIVE_GATE_LU;

    let gated: Vec<f64> = above_absolute
        .into_iter()
        .filter(|&p| power_to_lufs(p) > relative_gate)
        .collect();

    if gated.is_empty() {
        return Some(f64::NEG_INFINITY);
    }

    Some(power_to_lufs(gated.iter().sum::<f64>() / gated.len() as f64))
}
