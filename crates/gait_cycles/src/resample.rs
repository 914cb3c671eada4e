//! Cycle length normalization.

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Piecewise-linear upsampling of `cycle` to exactly `size` samples
///
/// Sample `i` is taken at position `i·n/size` of the input. The last sample
/// extrapolates from the final slope so the output keeps the input's span.
pub fn upsample_linear(cycle: &[f64], size: usize) -> Vec<f64> {
    let n = cycle.len();
    if n == 0 || size == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![cycle[0]; size];
    }
    if size == 1 {
        return vec![cycle[0]];
    }

    let step = n as f64 / size as f64;
    let mut out = Vec::with_capacity(size);
    out.push(cycle[0]);

    let mut slope = cycle[1] - cycle[0];
    for i in 1..size - 1 {
        let t = i as f64 * step;
        let p = (t.floor() as usize).min(n - 2);
        slope = cycle[p + 1] - cycle[p];
        out.push(cycle[p] + (t - p as f64) * slope);
    }

    let t = (size - 1) as f64 * step;
    out.push(cycle[n - 1] + (t - (n - 1) as f64) * slope);
    out
}

/// Resample `cycle` to `target` samples by splicing its spectrum
///
/// The new spectrum takes the first `ceil(target/2)` and the last
/// `floor(target/2)` bins of the source spectrum (zero-padding the middle
/// when growing). Amplitude is preserved by scaling with `target / n`.
pub fn resample(cycle: &[f64], target: usize) -> Vec<f64> {
    let n = cycle.len();
    if n == 0 || target == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();

    let mut spectrum: Vec<Complex64> = cycle.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut spectrum);

    let mut spliced = vec![Complex64::new(0.0, 0.0); target];
    let kept = target.min(n);
    let head = kept.div_ceil(2);
    let tail = kept / 2;
    spliced[..head].copy_from_slice(&spectrum[..head]);
    spliced[target - tail..].copy_from_slice(&spectrum[n - tail..]);

    planner.plan_fft_inverse(target).process(&mut spliced);

    // unnormalized inverse: 1/target for the transform, target/n for amplitude
    let scale = 1.0 / n as f64;
    spliced.iter().map(|c| c.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_upsample_linear_ramp() {
        let ramp: Vec<f64> = (0..10).map(f64::from).collect();
        let out = upsample_linear(&ramp, 40);
        assert_eq!(out.len(), 40);
        for (i, v) in out.iter().enumerate() {
            assert!((v - i as f64 * 0.25).abs() < 1e-12, "index {i}: {v}");
        }
    }

    #[test]
    fn test_upsample_degenerate_inputs() {
        assert_eq!(upsample_linear(&[2.0], 4), vec![2.0; 4]);
        assert!(upsample_linear(&[], 4).is_empty());
    }

    #[test]
    fn test_resample_same_length_round_trip() {
        let cycle: Vec<f64> = (0..53)
            .map(|i| (i as f64 * 0.37).sin() + 0.2 * (i as f64 * 1.3).cos())
            .collect();
        let out = resample(&cycle, cycle.len());
        for (a, b) in cycle.iter().zip(&out) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_resample_down_preserves_smooth_shape() {
        // two periods of a cosine sampled at 80 points, resampled to 40
        let cycle: Vec<f64> = (0..80).map(|i| (4.0 * PI * i as f64 / 80.0).cos()).collect();
        let out = resample(&cycle, 40);
        assert_eq!(out.len(), 40);
        for (i, v) in out.iter().enumerate() {
            let expected = (4.0 * PI * i as f64 / 40.0).cos();
            assert!((v - expected).abs() < 1e-9, "index {i}: {v} vs {expected}");
        }
    }

    #[test]
    fn test_resample_up_zero_pads() {
        let cycle: Vec<f64> = (0..20).map(|i| (2.0 * PI * i as f64 / 20.0).sin()).collect();
        let out = resample(&cycle, 40);
        assert_eq!(out.len(), 40);
        for (i, v) in out.iter().enumerate() {
            let expected = (2.0 * PI * i as f64 / 40.0).sin();
            assert!((v - expected).abs() < 1e-9, "index {i}: {v} vs {expected}");
        }
    }
}
