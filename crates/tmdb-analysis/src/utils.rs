//! Shared utilities for the analysis pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde_json::{Map, Value, json};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

// =============================================================================
// Column Access
// =============================================================================

/// Look up a column, mapping a miss to [`AnalysisError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
}

/// Read a numeric column as `f64` values, nulls preserved.
///
/// Fails with a type coercion error when the column is not numeric.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = require_column(df, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(AnalysisError::coercion(
            name,
            "Float64",
            format!("column has non-numeric type {:?}", series.dtype()),
        ));
    }
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Read a numeric column as `f64`, failing if any value is null.
pub fn complete_numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    numeric_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                AnalysisError::coercion(name, "Float64", format!("missing value at row {}", row))
            })
        })
        .collect()
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 4] = [',', '$', '_', ' '];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect()
}

/// Try to parse a string as a numeric value (f64).
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// =============================================================================
// Date Utilities
// =============================================================================

/// 1970-01-01 (chrono's `NaiveDate::default()`).
fn unix_epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Inverse of [`date_to_epoch_days`].
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(days as i64))
}

// =============================================================================
// Row Rendering
// =============================================================================

/// Convert a single cell to JSON; dates render as `YYYY-MM-DD`.
pub fn any_value_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => json!(b),
        AnyValue::String(s) => json!(s),
        AnyValue::StringOwned(s) => json!(s.as_str()),
        AnyValue::Int8(v) => json!(v),
        AnyValue::Int16(v) => json!(v),
        AnyValue::Int32(v) => json!(v),
        AnyValue::Int64(v) => json!(v),
        AnyValue::UInt8(v) => json!(v),
        AnyValue::UInt16(v) => json!(v),
        AnyValue::UInt32(v) => json!(v),
        AnyValue::UInt64(v) => json!(v),
        AnyValue::Float32(v) => json!(v),
        AnyValue::Float64(v) => json!(v),
        AnyValue::Date(days) => match epoch_days_to_date(days) {
            Some(date) => json!(date.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        },
        other => json!(other.to_string()),
    }
}

/// Render one row of a table as a `column -> value` JSON object.
pub fn row_to_json(df: &DataFrame, row: usize) -> Result<Map<String, Value>> {
    let mut object = Map::new();
    for col in df.get_columns() {
        let value = col.as_materialized_series().get(row)?;
        object.insert(col.name().to_string(), any_value_to_json(value));
    }
    Ok(object)
}

/// Render every row of a (small) table as JSON objects.
pub fn rows_to_json(df: &DataFrame) -> Result<Vec<Map<String, Value>>> {
    (0..df.height()).map(|row| row_to_json(df, row)).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Date));
    }

    #[test]
    fn test_is_integer_dtype() {
        assert!(is_integer_dtype(&DataType::Int32));
        assert!(!is_integer_dtype(&DataType::Float64));
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42  "), "42");
        assert_eq!(clean_numeric_string("1 000"), "1000");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("237,000,000"), Some(237_000_000.0));
        assert_eq!(parse_numeric_string("-10.5"), Some(-10.5));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("Avatar"), None);
    }

    #[test]
    fn test_epoch_days_round_trip() {
        let date = NaiveDate::from_ymd_opt(2009, 12, 10).unwrap();
        let days = date_to_epoch_days(date);
        assert_eq!(epoch_days_to_date(days), Some(date));
        assert_eq!(date_to_epoch_days(unix_epoch()), 0);
        assert_eq!(
            epoch_days_to_date(-1),
            NaiveDate::from_ymd_opt(1969, 12, 31)
        );
    }

    #[test]
    fn test_require_column_missing() {
        let df = df!("budget" => &[1i64, 2]).unwrap();
        assert!(require_column(&df, "budget").is_ok());
        assert!(matches!(
            require_column(&df, "revenue"),
            Err(AnalysisError::ColumnNotFound(name)) if name == "revenue"
        ));
    }

    #[test]
    fn test_numeric_values_rejects_text() {
        let df = df!("genres" => &["Action", "Drama"]).unwrap();
        assert!(matches!(
            numeric_values(&df, "genres"),
            Err(AnalysisError::TypeCoercion { .. })
        ));
    }

    #[test]
    fn test_complete_numeric_values_rejects_null() {
        let df = df!("runtime" => &[Some(90i64), None]).unwrap();
        assert!(complete_numeric_values(&df, "runtime").is_err());
    }

    #[test]
    fn test_row_to_json() {
        let df = df!(
            "original_title" => &["Avatar"],
            "budget" => &[237_000_000i64],
            "popularity" => &[9.43f64]
        )
        .unwrap();
        let row = row_to_json(&df, 0).unwrap();
        assert_eq!(row["original_title"], json!("Avatar"));
        assert_eq!(row["budget"], json!(237_000_000i64));
        assert_eq!(row["popularity"], json!(9.43));
    }
}
