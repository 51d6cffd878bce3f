//! Read-only queries over a cleaned table.
//!
//! Rankings, extremum lookups, grouped sums and correlations, plus the
//! descriptive statistics used while assessing the raw data. Nothing here
//! mutates its input.

mod statistics;

pub use crate::cleaner::duplicate_count;

use crate::error::{AnalysisError, Result};
use crate::types::{
    ColumnDescription, ColumnNulls, Extremum, GroupTotal, HistogramBin, SortOrder,
};
use crate::utils::{
    complete_numeric_values, is_integer_dtype, numeric_values, require_column,
};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

fn ensure_not_empty(df: &DataFrame, operation: &str) -> Result<()> {
    if df.height() == 0 {
        return Err(AnalysisError::Domain(format!(
            "{} on an empty table is undefined",
            operation
        )));
    }
    Ok(())
}

/// Null-last comparison of two optional values in the requested direction.
fn compare(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Ascending => a.total_cmp(&b),
            SortOrder::Descending => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// Rankings
// =============================================================================

/// The `n` rows with the largest (or smallest) values of `column`.
///
/// Ties keep their original row order. Asking for more rows than the table
/// holds returns every row, ranked.
pub fn top_n_by(df: &DataFrame, column: &str, n: usize, order: SortOrder) -> Result<DataFrame> {
    ensure_not_empty(df, "top_n_by")?;
    let values = numeric_values(df, column)?;

    let mut indices: Vec<usize> = (0..values.len()).collect();
    // stable sort, so equal values stay in row order
    indices.sort_by(|&a, &b| compare(values[a], values[b], order));
    indices.truncate(n);

    debug!("top_n_by('{}', {}, {:?}) -> {} rows", column, n, order, indices.len());

    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.into_iter().map(|i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

/// Row index of the extremum of `column`; the first such row on ties.
pub fn extremum_index(df: &DataFrame, column: &str, which: Extremum) -> Result<usize> {
    ensure_not_empty(df, "extremum_row")?;
    let values = numeric_values(df, column)?;

    let mut best: Option<(usize, f64)> = None;
    for (row, value) in values.into_iter().enumerate() {
        let Some(value) = value else { continue };
        let better = match (best, which) {
            (None, _) => true,
            (Some((_, current)), Extremum::Max) => value > current,
            (Some((_, current)), Extremum::Min) => value < current,
        };
        if better {
            best = Some((row, value));
        }
    }

    best.map(|(row, _)| row).ok_or_else(|| {
        AnalysisError::Domain(format!("column '{}' has no non-null values", column))
    })
}

/// The single row holding the maximum or minimum of `column`.
pub fn extremum_row(df: &DataFrame, column: &str, which: Extremum) -> Result<DataFrame> {
    let row = extremum_index(df, column, which)?;
    Ok(df.slice(row as i64, 1))
}

// =============================================================================
// Grouping
// =============================================================================

enum Accumulator {
    Exact(BTreeMap<i64, i128>),
    Float(BTreeMap<i64, f64>),
}

/// Sum `value_column` over each distinct key of `group_column`.
///
/// Groups come back in ascending key order. When both columns are integral
/// the sums are exact before conversion to `f64`. Rows with a null key or
/// value are skipped.
pub fn sum_by_group(
    df: &DataFrame,
    group_column: &str,
    value_column: &str,
) -> Result<Vec<GroupTotal>> {
    let keys_series = require_column(df, group_column)?;
    if !is_integer_dtype(keys_series.dtype()) {
        return Err(AnalysisError::coercion(
            group_column,
            "Int64",
            format!("group keys must be integers, found {:?}", keys_series.dtype()),
        ));
    }
    let keys: Vec<Option<i64>> = keys_series
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .collect();

    let value_series = require_column(df, value_column)?;
    let acc = if is_integer_dtype(value_series.dtype()) {
        let values = value_series.cast(&DataType::Int64)?;
        let mut sums = BTreeMap::new();
        for (key, value) in keys.iter().zip(values.i64()?.into_iter()) {
            if let (Some(key), Some(value)) = (key, value) {
                *sums.entry(*key).or_insert(0i128) += value as i128;
            }
        }
        Accumulator::Exact(sums)
    } else {
        let values = numeric_values(df, value_column)?;
        let mut sums = BTreeMap::new();
        for (key, value) in keys.iter().zip(values) {
            if let (Some(key), Some(value)) = (key, value) {
                *sums.entry(*key).or_insert(0.0) += value;
            }
        }
        Accumulator::Float(sums)
    };

    let totals: Vec<GroupTotal> = match acc {
        Accumulator::Exact(sums) => sums
            .into_iter()
            .map(|(key, total)| GroupTotal {
                key,
                total: total as f64,
            })
            .collect(),
        Accumulator::Float(sums) => sums
            .into_iter()
            .map(|(key, total)| GroupTotal { key, total })
            .collect(),
    };

    debug!(
        "sum_by_group('{}', '{}') -> {} groups",
        group_column,
        value_column,
        totals.len()
    );
    Ok(totals)
}

/// The group with the largest total; the smallest key wins a tie.
pub fn best_group(totals: &[GroupTotal]) -> Option<&GroupTotal> {
    totals.iter().fold(None, |best, group| match best {
        Some(current) if current.total >= group.total => Some(current),
        _ => Some(group),
    })
}

// =============================================================================
// Correlation
// =============================================================================

/// Pearson correlation coefficient of two numeric columns.
///
/// Computed as the mean product of population z-scores, so the result is
/// symmetric and a column correlates with itself at 1 up to rounding. Fails on an
/// empty table, on nulls, and when either column is constant.
pub fn correlation(df: &DataFrame, a: &str, b: &str) -> Result<f64> {
    ensure_not_empty(df, "correlation")?;
    let x = complete_numeric_values(df, a)?;
    let y = complete_numeric_values(df, b)?;
    let r = statistics::pearson(&x, &y, a, b)?;
    debug!("correlation('{}', '{}') = {:.4}", a, b, r);
    Ok(r)
}

// =============================================================================
// Descriptive statistics
// =============================================================================

/// Count, mean, sample std, min, quartiles and max of a numeric column,
/// ignoring nulls.
pub fn describe(df: &DataFrame, column: &str) -> Result<ColumnDescription> {
    let mut values: Vec<f64> = numeric_values(df, column)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(AnalysisError::Domain(format!(
            "cannot describe column '{}' without values",
            column
        )));
    }
    values.sort_by(f64::total_cmp);

    Ok(ColumnDescription {
        column: column.to_string(),
        count: values.len(),
        mean: statistics::mean(&values),
        std: statistics::sample_std(&values),
        min: values[0],
        q25: statistics::quantile_sorted(&values, 0.25),
        median: statistics::quantile_sorted(&values, 0.5),
        q75: statistics::quantile_sorted(&values, 0.75),
        max: values[values.len() - 1],
    })
}

/// Equal-width histogram of the non-null values of `column`.
pub fn histogram(df: &DataFrame, column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(AnalysisError::Domain(
            "histogram needs at least one bin".to_string(),
        ));
    }
    let values: Vec<f64> = numeric_values(df, column)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(AnalysisError::Domain(format!(
            "cannot bin column '{}' without values",
            column
        )));
    }
    Ok(statistics::equal_width_bins(&values, bins))
}

/// Null count of every column, in column order.
pub fn null_counts(df: &DataFrame) -> Vec<ColumnNulls> {
    df.get_columns()
        .iter()
        .map(|col| ColumnNulls {
            column: col.name().to_string(),
            null_count: col.null_count(),
        })
        .collect()
}
