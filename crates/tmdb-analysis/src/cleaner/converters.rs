//! Type conversion steps: release dates and integer currency columns.

use crate::error::{AnalysisError, Result};
use crate::utils::{
    date_to_epoch_days, is_integer_dtype, is_numeric_dtype, numeric_values, parse_numeric_string,
    require_column,
};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

// Dates written with a two-digit year, e.g. 6/9/15 or 12-25-09
static TWO_DIGIT_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{2}$").expect("Invalid regex: two-digit year date")
});

/// Parse a text date column into a polars `Date` column.
///
/// `formats` are chrono layouts tried in order. When a value carries a
/// two-digit year and `year_column` holds the full release year for the row,
/// the century is taken from that year (`1/1/66` with release year 1966 is
/// 1966, not 2066).
///
/// # Errors
///
/// Fails the whole operation with [`AnalysisError::Parse`] on the first value
/// that matches none of the formats. Nulls stay null.
pub fn parse_release_dates(
    df: DataFrame,
    column: &str,
    formats: &[String],
    year_column: Option<&str>,
) -> Result<DataFrame> {
    let mut df = df;
    let series = require_column(&df, column)?;

    match series.dtype() {
        DataType::Date => return Ok(df),
        DataType::String => {}
        other => {
            return Err(AnalysisError::Parse(format!(
                "Column '{}' has type {:?}, expected text dates",
                column, other
            )));
        }
    }

    let years = match year_column {
        Some(name) if df.get_column_index(name).is_some() => Some(numeric_values(&df, name)?),
        _ => None,
    };

    let mut days: Vec<Option<i32>> = Vec::with_capacity(series.len());
    let mut century_fixes = 0;

    for (row, value) in series.str()?.into_iter().enumerate() {
        let Some(raw) = value else {
            days.push(None);
            continue;
        };

        let mut date = parse_date(raw, formats).ok_or_else(|| {
            AnalysisError::Parse(format!(
                "Unparsable {} value '{}' at row {}",
                column, raw, row
            ))
        })?;

        if TWO_DIGIT_YEAR.is_match(raw.trim())
            && let Some(year) = years.as_ref().and_then(|y| y[row])
            && let Some(fixed) = resolve_century(date, year as i32)
        {
            date = fixed;
            century_fixes += 1;
        }

        days.push(Some(date_to_epoch_days(date)));
    }

    if century_fixes > 0 {
        debug!(
            "Resolved century of {} two-digit-year date(s) in '{}' from release year",
            century_fixes, column
        );
    }

    let date_series = Series::new(column.into(), days).cast(&DataType::Date)?;
    df.replace(column, date_series)?;
    Ok(df)
}

/// Try each layout in turn.
pub(crate) fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Move `date` by whole centuries so its year equals `year`, if it differs
/// only by a multiple of 100.
fn resolve_century(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    let diff = year - date.year();
    if diff == 0 || diff % 100 != 0 {
        return None;
    }
    date.with_year(year)
}

/// Coerce the named columns to `Int64`, truncating any fractional part.
///
/// Text columns are parsed (thousands separators and `$` are tolerated).
/// Zero-for-missing only applies to numeric columns, so a text column can
/// still carry a zero here; it is rejected rather than kept as a real amount.
///
/// # Errors
///
/// [`AnalysisError::TypeCoercion`] if any non-null value cannot be
/// represented as an integer, or a text value parses to zero. Reaching this
/// after the missing-value steps means an earlier cleaning step let bad data
/// through.
pub fn coerce_to_integer(df: DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut df = df;

    for column in columns {
        let series = require_column(&df, column)?;
        let dtype = series.dtype().clone();

        if dtype == DataType::Int64 {
            continue;
        }

        let coerced = if is_integer_dtype(&dtype) {
            series.cast(&DataType::Int64)?
        } else if is_numeric_dtype(&dtype) {
            float_to_int64(series, column)?
        } else if dtype == DataType::String {
            string_to_int64(series, column)?
        } else {
            return Err(AnalysisError::coercion(
                column.as_str(),
                "Int64",
                format!("unsupported source type {:?}", dtype),
            ));
        };

        debug!("Coerced '{}' from {:?} to Int64", column, dtype);
        df.replace(column, coerced)?;
    }

    Ok(df)
}

fn float_to_int64(series: &Series, column: &str) -> Result<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let mut values: Vec<Option<i64>> = Vec::with_capacity(floats.len());
    let mut truncated = 0;

    for (row, value) in floats.f64()?.into_iter().enumerate() {
        match value {
            Some(v) if v.is_finite() && v >= i64::MIN as f64 && v <= i64::MAX as f64 => {
                if v.fract() != 0.0 {
                    truncated += 1;
                }
                values.push(Some(v.trunc() as i64));
            }
            Some(v) => {
                return Err(AnalysisError::coercion(
                    column,
                    "Int64",
                    format!("value {} at row {} is out of range", v, row),
                ));
            }
            None => values.push(None),
        }
    }

    if truncated > 0 {
        warn!(
            "Truncated fractional part of {} value(s) in '{}'",
            truncated, column
        );
    }

    Ok(Series::new(series.name().clone(), values))
}

fn string_to_int64(series: &Series, column: &str) -> Result<Series> {
    let mut values: Vec<Option<i64>> = Vec::with_capacity(series.len());

    for (row, value) in series.str()?.into_iter().enumerate() {
        match value {
            Some(raw) => match parse_numeric_string(raw) {
                Some(v) if v.is_finite() && v.trunc() == 0.0 => {
                    return Err(AnalysisError::coercion(
                        column,
                        "Int64",
                        format!("value '{}' at row {} is zero, a missing amount", raw, row),
                    ));
                }
                Some(v) if v.is_finite() => values.push(Some(v.trunc() as i64)),
                _ => {
                    return Err(AnalysisError::coercion(
                        column,
                        "Int64",
                        format!("value '{}' at row {} is not numeric", raw, row),
                    ));
                }
            },
            None => values.push(None),
        }
    }

    Ok(Series::new(series.name().clone(), values))
}
