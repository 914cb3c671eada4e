//! Half-cycle boundaries on the conditioned signal.

/// Locate successive minima spaced roughly `mean_distance` apart
///
/// The first window is `[0, mean_distance]`; after a minimum at `m` the next
/// window is `[m + mean_distance − radius, m + mean_distance + radius]`,
/// clamped to the signal. At most `limit` minima are collected (`None` =
/// until the signal is exhausted). The window start always advances past the
/// previous minimum.
pub fn find_minima(
    x: &[f64],
    mean_distance: usize,
    radius: usize,
    limit: Option<usize>,
) -> Vec<usize> {
    let mut minima = Vec::new();
    if x.is_empty() {
        return minima;
    }

    let mut lo = 0usize;
    let mut hi = mean_distance;
    while limit.map_or(true, |limit| minima.len() < limit) {
        if lo >= x.len() {
            break;
        }
        let end = hi.min(x.len() - 1);
        let found = lo + argmin(&x[lo..=end]);
        minima.push(found);

        let expected = found.saturating_add(mean_distance);
        lo = expected.saturating_sub(radius).max(found + 1);
        hi = expected.saturating_add(radius);
    }
    minima
}

/// Index of the first occurrence of the smallest value
fn argmin(window: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in window.iter().enumerate().skip(1) {
        if *v < window[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_minima_of_cosine() {
        // cos has minima at 10, 30, 50, ...
        let x: Vec<f64> = (0..200)
            .map(|i| (2.0 * PI * i as f64 / 20.0).cos())
            .collect();
        let minima = find_minima(&x, 20, 5, None);
        assert_eq!(&minima[..4], &[10, 30, 50, 70]);
        assert_eq!(*minima.last().unwrap(), 190);
    }

    #[test]
    fn test_limit_bounds_count() {
        let x: Vec<f64> = (0..400).map(|i| (i as f64 * 0.3).sin()).collect();
        assert_eq!(find_minima(&x, 21, 5, Some(4)).len(), 4);
        assert!(find_minima(&x, 21, 5, None).len() > 4);
    }

    #[test]
    fn test_first_lowest_wins() {
        let x = [3.0, 1.0, 2.0, 1.0, 5.0];
        assert_eq!(find_minima(&x, 4, 0, Some(1)), vec![1]);
    }

    #[test]
    fn test_huge_radius_clamps_to_signal() {
        let x: Vec<f64> = (0..200)
            .map(|i| (2.0 * PI * i as f64 / 20.0).cos())
            .collect();
        let minima = find_minima(&x, usize::MAX, usize::MAX, Some(5));
        assert!(!minima.is_empty());
        assert!(minima.windows(2).all(|w| w[0] < w[1]));
        assert!(minima.iter().all(|&m| m < x.len()));
    }

    #[test]
    fn test_window_always_advances() {
        // radius larger than the spacing would otherwise re-find the same index
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let minima = find_minima(&x, 2, 10, None);
        assert_eq!(minima, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_signal() {
        assert!(find_minima(&[], 10, 2, None).is_empty());
    }
}
