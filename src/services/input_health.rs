use chrono::NaiveDate;

use crate::domain::team::ThroughputSample;

/// Advisory statistical checks on forecast inputs. Each returns `true` when
/// the input looks healthy; a `false` is a warning, never a hard failure.

/// The sample set is large enough to be meaningful and small enough to still
/// reflect the current team.
pub fn check_sample_count(samples: &[ThroughputSample], min: usize, max: usize) -> bool {
    (min..=max).contains(&samples.len())
}

/// The most recent sample is no older than `threshold_days` before `as_of`.
/// Vacuously true for zero samples.
pub fn check_sample_age(samples: &[ThroughputSample], threshold_days: i64, as_of: NaiveDate) -> bool {
    match samples.iter().map(|sample| sample.period_start).max() {
        Some(latest) => (as_of - latest).num_days() <= threshold_days,
        None => true,
    }
}

/// The two halves of the sample set (in input order) have similar means,
/// relative to the full value range. A zero range counts as stable.
pub fn check_sample_stability(samples: &[ThroughputSample], threshold_ratio: f64) -> bool {
    if samples.len() < 2 {
        return true;
    }

    let values: Vec<f64> = samples.iter().map(|sample| sample.throughput as f64).collect();
    let (first, second) = values.split_at(values.len() / 2);
    let mean = |half: &[f64]| half.iter().sum::<f64>() / half.len() as f64;

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return true;
    }

    (mean(first) - mean(second)).abs() / range <= threshold_ratio
}

/// The backlog guess range is wide enough to express real uncertainty. A
/// near-point range on a nonzero backlog suggests overconfidence.
pub fn check_backlog_guess(low: i64, high: i64, threshold_ratio: f64) -> bool {
    low == 0 || (high - low) as f64 / low as f64 >= threshold_ratio
}
