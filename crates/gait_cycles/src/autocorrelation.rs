//! Normalized autocorrelation and its local maxima.

/// Biased, variance-normalized autocorrelation for every lag in `[0, N)`
///
/// `r[k] = Σ y[i]·y[i+k] / ((N − k)·σ²)` with `y = x − mean(x)` and `σ²` the
/// population variance. Returns `None` for fewer than two samples or a signal
/// without variance.
pub fn autocorrelation(x: &[f64]) -> Option<Vec<f64>> {
    let n = x.len();
    if n < 2 {
        return None;
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = x.iter().map(|v| v - mean).collect();
    let variance = centered.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if !(variance.is_finite() && variance > 0.0) {
        return None;
    }

    let r = (0..n)
        .map(|k| {
            let sum: f64 = centered[..n - k]
                .iter()
                .zip(&centered[k..])
                .map(|(a, b)| a * b)
                .sum();
            sum / ((n - k) as f64 * variance)
        })
        .collect();
    Some(r)
}

/// Indices of local maxima within a symmetric neighbourhood of `radius`
///
/// `i` qualifies when no sample in `[i − radius, i + radius]` (clamped to the
/// slice) is strictly greater than `r[i]`. Of equal-valued maxima within the
/// same neighbourhood only the lowest index is kept.
pub fn local_maxima(r: &[f64], radius: usize) -> Vec<usize> {
    let mut maxima: Vec<usize> = Vec::new();
    for i in 0..r.len() {
        let lo = i.saturating_sub(radius);
        let hi = i.saturating_add(radius).min(r.len() - 1);
        if r[lo..=hi].iter().any(|v| *v > r[i]) {
            continue;
        }
        if let Some(&last) = maxima.last() {
            if i - last <= radius && r[last] == r[i] {
                continue;
            }
        }
        maxima.push(i);
    }
    maxima
}

/// Mean spacing of consecutive maxima (`None` with fewer than two)
pub fn mean_distance(maxima: &[usize]) -> Option<f64> {
    if maxima.len() < 2 {
        return None;
    }
    let total: usize = maxima.windows(2).map(|w| w[1] - w[0]).sum();
    Some(total as f64 / (maxima.len() - 1) as f64)
}
