//! Centered moving average.

/// Average each value with up to `half_width` neighbors on each side.
///
/// The window is clamped at the ends of the sequence rather than padded,
/// so edge values average over fewer samples. `half_width == 0` copies.
pub fn moving_average(values: &[f64], half_width: usize) -> Vec<f64> {
    if half_width == 0 || values.len() <= 1 {
        return values.to_vec();
    }

    // Prefix sums keep wide windows (the detrend trend) linear in length.
    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    for v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v);
    }

    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half_width);
            let end = (i + half_width + 1).min(values.len());
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_width_is_identity() {
        let values = vec![1.0, 5.0, 2.0];
        assert_eq!(moving_average(&values, 0), values);
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let smoothed = moving_average(&[0.0, 3.0, 6.0, 9.0], 1);
        assert!((smoothed[0] - 1.5).abs() < 1e-9); // (0 + 3) / 2
        assert!((smoothed[1] - 3.0).abs() < 1e-9); // (0 + 3 + 6) / 3
        assert!((smoothed[3] - 7.5).abs() < 1e-9); // (6 + 9) / 2
    }

    #[test]
    fn test_single_spike_is_spread() {
        let smoothed = moving_average(&[0.0, 0.0, 10.0, 0.0, 0.0], 2);
        assert!((smoothed[2] - 2.0).abs() < 1e-9);
        assert!(smoothed.iter().all(|v| *v > 0.0));
    }
}
