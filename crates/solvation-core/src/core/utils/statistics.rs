/// Unbiased, non-demeaned autocovariance of a series.
///
/// `acov[k] = 1/(n-k) * sum_{t < n-k} x[t] * x[t+k]` for `k` in `0..n`.
pub fn autocovariance(series: &[f64]) -> Vec<f64> {
    let points: Vec<(usize, f64)> = series
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, v)| v != 0.0)
        .collect();
    sparse_autocovariance(&points, series.len())
}

/// [`autocovariance`] of a length-`n` series given only its non-zero `(index, value)`
/// entries, sorted by index. Entries out of order or beyond `n` are ignored.
///
/// Runs in O(n + m^2) for m non-zero entries.
pub fn sparse_autocovariance(points: &[(usize, f64)], n: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n];
    for (i, &(t, x)) in points.iter().enumerate() {
        for &(u, y) in points[i..].iter().filter(|&&(u, _)| u < n) {
            if let Some(lag) = u.checked_sub(t) {
                sums[lag] += x * y;
            }
        }
    }
    sums.into_iter()
        .enumerate()
        .map(|(lag, sum)| sum / (n - lag) as f64)
        .collect()
}

/// Element-wise mean of equally long series; `None` when there are no series.
pub fn mean_series(series: &[Vec<f64>]) -> Option<Vec<f64>> {
    let first = series.first()?;
    let mut total = vec![0.0; first.len()];
    for s in series {
        for (acc, v) in total.iter_mut().zip(s) {
            *acc += v;
        }
    }
    let n = series.len() as f64;
    Some(total.into_iter().map(|v| v / n).collect())
}
