//! Statistical helpers over plain `f64` slices.

use crate::error::{AnalysisError, Result};
use crate::types::HistogramBin;

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with divisor N.
pub(crate) fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard deviation with divisor N-1; zero for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Pearson correlation as the mean product of population z-scores.
pub(crate) fn pearson(x: &[f64], y: &[f64], x_name: &str, y_name: &str) -> Result<f64> {
    if x.len() != y.len() {
        return Err(AnalysisError::Domain(format!(
            "'{}' and '{}' have different lengths ({} vs {})",
            x_name,
            y_name,
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(AnalysisError::Domain(
            "correlation of an empty table is undefined".to_string(),
        ));
    }

    let (mx, sx) = (mean(x), population_std(x));
    let (my, sy) = (mean(y), population_std(y));

    for (name, std) in [(x_name, sx), (y_name, sy)] {
        if std == 0.0 || !std.is_finite() {
            return Err(AnalysisError::Domain(format!(
                "correlation undefined: column '{}' has zero variance",
                name
            )));
        }
    }

    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| ((a - mx) / sx) * ((b - my) / sy))
        .sum();
    Ok(sum / x.len() as f64)
}

/// Quantile of sorted data, linearly interpolated between closest ranks.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Equal-width bins across the value range; the last bin includes its upper edge.
pub(crate) fn equal_width_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // A constant column gets a unit-wide range centered on its value
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== std tests ====================

    #[test]
    fn test_population_vs_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&values) - 2.0).abs() < 1e-12);
        assert!((sample_std(&values) - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_sample_std_single_value() {
        assert_eq!(sample_std(&[5.0]), 0.0);
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&x, &y, "x", "y").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0];
        let y = [3.0, 2.0, 1.0];
        assert!((pearson(&x, &y, "x", "y").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_matches_textbook_formula() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        // cov / (sx * sy) with sums of squares: sxy = 8, sxx = 10, syy = 10
        let expected = 8.0 / (10.0f64.sqrt() * 10.0f64.sqrt());
        assert!((pearson(&x, &y, "x", "y").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        let err = pearson(&[1.0, 2.0], &[3.0, 3.0], "runtime", "profit").unwrap_err();
        assert!(err.to_string().contains("profit"));
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_pearson_empty() {
        assert!(pearson(&[], &[], "x", "y").is_err());
    }

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 0.25), 1.75);
        assert_eq!(quantile_sorted(&sorted, 0.5), 2.5);
        assert_eq!(quantile_sorted(&sorted, 0.75), 3.25);
        assert_eq!(quantile_sorted(&sorted, 1.0), 4.0);
    }

    // ==================== histogram tests ====================

    #[test]
    fn test_histogram_counts_and_edges() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let bins = equal_width_bins(&values, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2); // 0, 1
        assert_eq!(bins[1].count, 3); // 2, 3, 4 (last bin closed)
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[1].upper, 4.0);
    }

    #[test]
    fn test_histogram_constant_column() {
        let bins = equal_width_bins(&[7.0, 7.0, 7.0], 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(bins[0].lower, 6.5);
        assert_eq!(bins[3].upper, 7.5);
    }
}
