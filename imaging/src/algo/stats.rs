//! Descriptive statistics over pixel samples.
//!
//! NaN values are filtered before every computation so that masked-out or
//! invalid pixels never bias a region statistic.

use thiserror::Error;

/// Errors from statistics over an empty or fully invalid sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No finite-or-infinite values remained after dropping NaN.
    #[error("insufficient data: {total} values, 0 valid (all NaN or empty)")]
    NoValidData {
        /// Number of values supplied.
        total: usize,
    },

    /// Percentile outside of \[0, 100\].
    #[error("percentile {0} outside [0, 100]")]
    PercentileRange(f64),
}

fn valid_sorted(values: &[f64]) -> Result<Vec<f64>, StatsError> {
    let mut valid: Vec<f64> = values.iter().filter(|v| !v.is_nan()).copied().collect();
    if valid.is_empty() {
        return Err(StatsError::NoValidData {
            total: values.len(),
        });
    }
    valid.sort_by(|a, b| a.total_cmp(b));
    Ok(valid)
}

/// Calculate median of a slice of f64 values
///
/// This function computes the median while filtering out NaN values but including
/// infinite values (±inf). For even-length data, returns the average of the two
/// middle values.
///
/// # Returns
///
/// * `Ok(median)` - The median value
/// * `Err(StatsError::NoValidData)` - If no valid values remain after filtering NaN
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    let valid = valid_sorted(values)?;
    let mid = valid.len() / 2;
    let median_value = if valid.len() % 2 == 0 {
        (valid[mid - 1] + valid[mid]) / 2.0
    } else {
        valid[mid]
    };
    Ok(median_value)
}

/// Arithmetic mean of the non-NaN values.
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    let valid = valid_sorted(values)?;
    Ok(valid.iter().sum::<f64>() / valid.len() as f64)
}

/// Population standard deviation (divisor N) of the non-NaN values.
pub fn std_dev(values: &[f64]) -> Result<f64, StatsError> {
    let valid = valid_sorted(values)?;
    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok(variance.sqrt())
}

/// Percentile with linear interpolation between closest ranks.
///
/// Uses the same convention as the common numerical libraries: the value at
/// fractional rank `q/100 * (n - 1)` of the sorted sample.
///
/// # Arguments
/// * `values` - Sample; NaN entries are ignored
/// * `q` - Percentile in \[0, 100\]
pub fn percentile(values: &[f64], q: f64) -> Result<f64, StatsError> {
    if !(0.0..=100.0).contains(&q) {
        return Err(StatsError::PercentileRange(q));
    }
    let valid = valid_sorted(values)?;
    Ok(percentile_of_sorted(&valid, q))
}

/// Percentiles for several ranks, sorting the sample once.
pub fn percentiles(values: &[f64], qs: &[f64]) -> Result<Vec<f64>, StatsError> {
    if let Some(&bad) = qs.iter().find(|q| !(0.0..=100.0).contains(*q)) {
        return Err(StatsError::PercentileRange(bad));
    }
    let valid = valid_sorted(values)?;
    Ok(qs.iter().map(|&q| percentile_of_sorted(&valid, q)).collect())
}

fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
