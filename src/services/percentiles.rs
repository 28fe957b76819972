/// Quantile helpers for already-sorted slices.
///
/// Uses the linear-interpolation order statistic (the "R type 7" estimator,
/// the same semantics as d3.quantile): for a slice of length `n` and a
/// fraction `p` the position is `h = (n - 1) * p`, and the result
/// interpolates between the values at `floor(h)` and `ceil(h)`.

/// Returns the `p`-quantile (`p` in `[0, 1]`, clamped) of a slice that is
/// already sorted in ascending order.
pub fn quantile_sorted(sorted_values: &[f64], p: f64) -> Option<f64> {
    if sorted_values.is_empty() {
        return None;
    }

    let p = p.clamp(0.0, 1.0);
    let position = (sorted_values.len() as f64 - 1.0) * p;
    let lower_index = position.floor() as usize;
    let upper_index = position.ceil() as usize;
    let lower = sorted_values[lower_index];
    let upper = sorted_values[upper_index];
    Some(lower + (position - lower_index as f64) * (upper - lower))
}
