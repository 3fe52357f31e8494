// src/stats.rs
//! Order statistics used by the robust transformers.

use crate::error::{Error, Result};

/// Quantile `q` of `values` by linear interpolation between the closest ranks.
///
/// Position in the sorted values is `h = (n - 1) * q`; the result is
/// `x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])`.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyData);
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::InvalidHyperparameter {
            param: "q".to_string(),
            value: q.to_string(),
            constraint: "0 <= q <= 1".to_string(),
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    Ok(interpolate(&sorted, q))
}

/// The 50th percentile.
pub fn median(values: &[f64]) -> Result<f64> {
    quantile(values, 0.5)
}

/// Interquartile range, the distance between the 25th and 75th percentiles.
pub fn iqr(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyData);
    }

    // one sort for both quartiles
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    Ok(interpolate(&sorted, 0.75) - interpolate(&sorted, 0.25))
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let frac = h - lower as f64;
        sorted[lower] + frac * (sorted[upper] - sorted[lower])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn median_and_iqr_resist_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];

        assert_abs_diff_eq!(median(&values).unwrap(), 3.0);
        assert_abs_diff_eq!(quantile(&values, 0.25).unwrap(), 2.0);
        assert_abs_diff_eq!(quantile(&values, 0.75).unwrap(), 4.0);
        assert_abs_diff_eq!(iqr(&values).unwrap(), 2.0);
    }

    #[test]
    fn unsorted_input_is_handled() {
        let values = [100.0, 4.0, 1.0, 3.0, 2.0];
        assert_abs_diff_eq!(median(&values).unwrap(), 3.0);
        assert_abs_diff_eq!(iqr(&values).unwrap(), 2.0);
    }

    #[test]
    fn even_length_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];

        assert_abs_diff_eq!(median(&values).unwrap(), 2.5);
        // q1 at h = 0.75, q3 at h = 2.25
        assert_abs_diff_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert_abs_diff_eq!(quantile(&values, 0.75).unwrap(), 3.25);
        assert_abs_diff_eq!(iqr(&values).unwrap(), 1.5);
    }

    #[test]
    fn degenerate_inputs_have_zero_spread() {
        assert_eq!(iqr(&[7.0]).unwrap(), 0.0);
        assert_eq!(iqr(&[5.0, 5.0, 5.0]).unwrap(), 0.0);
        assert_eq!(median(&[7.0]).unwrap(), 7.0);
    }

    #[test]
    fn extremes_are_min_and_max() {
        let values = [3.0, -1.0, 8.0];
        assert_eq!(quantile(&values, 0.0).unwrap(), -1.0);
        assert_eq!(quantile(&values, 1.0).unwrap(), 8.0);
    }

    #[test]
    fn empty_and_out_of_range_are_rejected() {
        assert_eq!(median(&[]), Err(Error::EmptyData));
        assert_eq!(iqr(&[]), Err(Error::EmptyData));
        assert!(matches!(
            quantile(&[1.0], 1.5),
            Err(Error::InvalidHyperparameter { .. })
        ));
    }
}
