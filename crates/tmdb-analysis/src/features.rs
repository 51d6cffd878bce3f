//! Derived columns.

use crate::error::{AnalysisError, Result};
use crate::utils::require_column;
use polars::prelude::*;
use tracing::debug;

pub const PROFIT_COLUMN: &str = "profit";

/// Add `profit = revenue - budget` at column index `position` (clamped to the
/// table width).
///
/// An existing profit column is recomputed from the current budget and
/// revenue and replaced in place, so calling this after either input changes
/// always yields a consistent table. A row missing either input gets a null
/// profit.
///
/// # Errors
///
/// [`AnalysisError::Domain`] if a difference does not fit in `i64`.
pub fn derive_profit(df: DataFrame, position: usize) -> Result<DataFrame> {
    let mut df = df;
    let budget = integral_column(&df, "budget")?;
    let revenue = integral_column(&df, "revenue")?;

    let profit = budget
        .iter()
        .zip(revenue.iter())
        .enumerate()
        .map(|(row, (b, r))| match (b, r) {
            (Some(b), Some(r)) => r.checked_sub(*b).map(Some).ok_or_else(|| {
                AnalysisError::Domain(format!(
                    "profit of row {} overflows: revenue {} - budget {}",
                    row, r, b
                ))
            }),
            _ => Ok(None),
        })
        .collect::<Result<Vec<Option<i64>>>>()?;

    let profit = Series::new(PROFIT_COLUMN.into(), profit);

    if df.get_column_index(PROFIT_COLUMN).is_some() {
        debug!("Recomputing existing profit column");
        df.replace(PROFIT_COLUMN, profit)?;
    } else {
        let index = position.min(df.width());
        df.insert_column(index, profit)?;
        debug!("Inserted profit column at index {}", index);
    }

    Ok(df)
}

fn integral_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = require_column(df, name)?;
    if !crate::utils::is_integer_dtype(series.dtype()) {
        return Err(AnalysisError::coercion(
            name,
            "Int64",
            format!("expected an integer column, found {:?}", series.dtype()),
        ));
    }
    let ints = series.cast(&DataType::Int64)?;
    Ok(ints.i64()?.into_iter().collect())
}
