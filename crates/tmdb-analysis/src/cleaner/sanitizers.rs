//! Structural cleaning steps: column removal, de-duplication and the
//! zero-as-missing policy.

use crate::error::Result;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::debug;

/// Remove the named columns. Names absent from the table are skipped, so
/// re-running the step on a cleaned table is a no-op.
pub fn drop_columns(df: DataFrame, names: &[String]) -> Result<DataFrame> {
    let present: Vec<PlSmallStr> = names
        .iter()
        .filter(|name| df.get_column_index(name).is_some())
        .map(|name| name.as_str().into())
        .collect();

    if present.len() < names.len() {
        debug!(
            "Skipping {} drop-list column(s) not present in the table",
            names.len() - present.len()
        );
    }

    Ok(df.drop_many(present))
}

/// Remove rows whose every value equals an earlier row, keeping the first
/// occurrence and the original row order.
pub fn drop_duplicate_rows(df: DataFrame) -> Result<DataFrame> {
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}

/// Number of rows that [`drop_duplicate_rows`] would remove.
pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
    let unique = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    Ok(df.height() - unique.height())
}

/// Replace every numeric zero with null, in every numeric column.
///
/// NaN in a float column is missing too and becomes null in the same pass.
/// Text columns are left alone: the text "0" is not the number zero.
pub fn replace_zero_with_null(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut total_replacements = 0;

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series().clone();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }

        let (cleaned, count) = null_out_zeros(&series)?;
        if count > 0 {
            debug!("Column '{}': {} zero value(s) marked missing", col_name, count);
            total_replacements += count;
            df.replace(col_name, cleaned)?;
        }
    }

    debug!("Replaced {} zero values with null", total_replacements);
    Ok(df)
}

/// Null out zeros (and NaN) in a single numeric series, keeping its dtype.
fn null_out_zeros(series: &Series) -> Result<(Series, usize)> {
    let name = series.name().clone();
    let mut replaced = 0;

    match series.dtype() {
        DataType::Int64 => {
            let values: Vec<Option<i64>> = series
                .i64()?
                .into_iter()
                .map(|v| match v {
                    Some(0) => {
                        replaced += 1;
                        None
                    }
                    other => other,
                })
                .collect();
            Ok((Series::new(name, values), replaced))
        }
        DataType::Float64 => {
            let values: Vec<Option<f64>> = series
                .f64()?
                .into_iter()
                .map(|v| match v {
                    Some(x) if x == 0.0 || x.is_nan() => {
                        replaced += 1;
                        None
                    }
                    other => other,
                })
                .collect();
            Ok((Series::new(name, values), replaced))
        }
        dtype => {
            // Narrow ints and f32 round-trip through f64 losslessly.
            let original = dtype.clone();
            let widened = series.cast(&DataType::Float64)?;
            let (cleaned, count) = null_out_zeros(&widened)?;
            Ok((cleaned.cast(&original)?, count))
        }
    }
}

/// Remove every row holding a null in any column, or NaN in a float column.
pub fn drop_incomplete_rows(df: DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];

    for col in df.get_columns() {
        let series = col.as_materialized_series();

        if col.null_count() > 0 {
            for (row, is_null) in series.is_null().into_iter().enumerate() {
                if is_null == Some(true) {
                    keep[row] = false;
                }
            }
        }

        if series.dtype().is_float() {
            let values = series.cast(&DataType::Float64)?;
            for (row, v) in values.f64()?.into_iter().enumerate() {
                if v.is_some_and(f64::is_nan) {
                    keep[row] = false;
                }
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_drop_columns_removes_listed() {
        let df = df!(
            "id" => &[1i64, 2],
            "budget" => &[10i64, 20],
            "homepage" => &["a", "b"]
        )
        .unwrap();

        let df = drop_columns(df, &names(&["id", "homepage"])).unwrap();
        let remaining: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(remaining, vec!["budget"]);
    }

    #[test]
    fn test_drop_columns_ignores_absent() {
        let df = df!("budget" => &[10i64]).unwrap();
        let df = drop_columns(df, &names(&["imdb_id"])).unwrap();
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_drop_duplicate_rows_keeps_first_in_order() {
        let df = df!(
            "original_title" => &["C", "A", "C", "B", "A"],
            "budget" => &[3i64, 1, 3, 2, 1]
        )
        .unwrap();

        assert_eq!(duplicate_count(&df).unwrap(), 2);

        let df = drop_duplicate_rows(df).unwrap();
        assert_eq!(df.height(), 3);
        let titles: Vec<Option<&str>> = df
            .column("original_title")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(titles, vec![Some("C"), Some("A"), Some("B")]);
    }

    #[test]
    fn test_drop_duplicate_rows_requires_all_columns_equal() {
        let df = df!(
            "original_title" => &["A", "A"],
            "budget" => &[1i64, 2]
        )
        .unwrap();
        assert_eq!(drop_duplicate_rows(df).unwrap().height(), 2);
    }

    #[test]
    fn test_replace_zero_with_null_numeric_only() {
        let df = df!(
            "budget" => &[0i64, 100, 50],
            "popularity" => &[0.0f64, 1.5, 0.0],
            "cast" => &["0", "A", "B"]
        )
        .unwrap();

        let df = replace_zero_with_null(df).unwrap();
        assert_eq!(df.column("budget").unwrap().null_count(), 1);
        assert_eq!(df.column("popularity").unwrap().null_count(), 2);
        assert_eq!(df.column("cast").unwrap().null_count(), 0);
        assert_eq!(df.column("budget").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_replace_zero_with_null_narrow_int() {
        let df = df!("runtime" => &[0i32, 90]).unwrap();
        let df = replace_zero_with_null(df).unwrap();
        let runtime = df.column("runtime").unwrap();
        assert_eq!(runtime.dtype(), &DataType::Int32);
        assert_eq!(runtime.null_count(), 1);
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let df = df!(
            "budget" => &[Some(100i64), None, Some(50)],
            "director" => &[Some("A"), Some("B"), None]
        )
        .unwrap();

        let df = drop_incomplete_rows(df).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(
            df.column("budget").unwrap().get(0).unwrap().try_extract::<i64>().unwrap(),
            100
        );
    }

    #[test]
    fn test_replace_zero_with_null_marks_nan_missing() {
        let df = df!(
            "popularity" => &[f64::NAN, 1.5, 0.0],
            "vote_average" => &[6.5f32, f32::NAN, 7.0]
        )
        .unwrap();

        let df = replace_zero_with_null(df).unwrap();
        assert_eq!(df.column("popularity").unwrap().null_count(), 2);
        assert_eq!(df.column("vote_average").unwrap().null_count(), 1);
        assert_eq!(df.column("vote_average").unwrap().dtype(), &DataType::Float32);
    }

    #[test]
    fn test_drop_incomplete_rows_drops_nan() {
        let df = df!(
            "original_title" => &["A", "B", "C"],
            "popularity" => &[1.5f64, f64::NAN, 0.5]
        )
        .unwrap();

        let df = drop_incomplete_rows(df).unwrap();
        let titles: Vec<Option<&str>> = df
            .column("original_title")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(titles, vec![Some("A"), Some("C")]);
    }

    #[test]
    fn test_drop_incomplete_rows_on_complete_table_is_noop() {
        let df = df!("budget" => &[1i64, 2, 3]).unwrap();
        assert_eq!(drop_incomplete_rows(df).unwrap().height(), 3);
    }
}
