//! Statistical helpers over sample and frame buffers

/// Arithmetic mean
pub fn mean(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Compute peak amplitude
pub fn peak_amplitude(samples: &[f32]) -> f64 {
    samples.iter().map(|s| s.abs() as f64).fold(0.0f64, f64::max)
}

/// Convert amplitude to dB with an epsilon floor so that silence stays finite
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * (amplitude.abs() + 1e-10).log10()
}

/// Fraction of adjacent sample pairs whose sign differs (zero counts as positive)
pub fn zero_crossing_rate(frame: &[f32]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }

    let crossings = frame
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();

    crossings as f64 / frame.len() as f64
}

/// Percentile with linear interpolation between closest ranks
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson correlation of two equally long signals.
///
/// Returns `None` when either signal has no variance, since the coefficient
/// is undefined there.
pub fn pearson_correlation(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a < 1e-20 || var_b < 1e-20 {
        return None;
    }

    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

/// Maximal runs of `true` flags as half-open index ranges `[start, end)`
pub fn find_runs<I>(flags: I) -> Vec<(usize, usize)>
where
    I: IntoIterator<Item = bool>,
{
    let mut runs = Vec::new();
    let mut current_start: Option<usize> = None;
    let mut len = 0;

    for (i, flagged) in flags.into_iter().enumerate() {
        match (flagged, current_start) {
            (true, None) => current_start = Some(i),
            (false, Some(start)) => {
                runs.push((start, i));
                current_start = None;
            }
            _ => {}
        }
        len = i + 1;
    }

    // Handle trailing run
    if let Some(start) = current_start {
        runs.push((start, len));
    }

    runs
}

/// Merge sorted indices into `(first, last)` groups when neighbours are at most `max_gap` apart
pub fn group_indices(indices: &[usize], max_gap: usize) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut iter = indices.iter().copied();

    let Some(first) = iter.next() else {
        return groups;
    };

    let (mut start, mut end) = (first, first);
    for idx in iter {
        if idx - end <= max_gap {
            end = idx;
        } else {
            groups.push((start, end));
            start = idx;
            end = idx;
        }
    }
    groups.push((start, end));

    groups
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
