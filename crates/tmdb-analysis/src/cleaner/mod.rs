//! Data cleaning for the movie dataset.
//!
//! Cleaning is a fixed sequence of named steps. Each step takes a table and
//! returns a new one, so every step can be run and tested on its own:
//!
//! 1. Drop the non-analytical columns
//! 2. Remove duplicate rows (first occurrence wins)
//! 3. Mark numeric zeros as missing
//! 4. Drop rows with any missing value
//! 5. Parse release dates
//! 6. Coerce budget and revenue to integers
//!
//! Order matters: step 4 relies on step 3, and step 6 relies on step 4
//! having removed every value that cannot be coerced.

mod converters;
mod sanitizers;

pub use converters::{coerce_to_integer, parse_release_dates};
pub use sanitizers::{
    drop_columns, drop_duplicate_rows, drop_incomplete_rows, duplicate_count,
    replace_zero_with_null,
};

use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What a cleaning run did to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub duplicates_removed: usize,
    pub incomplete_rows_removed: usize,
    /// Human-readable log of each step.
    pub actions: Vec<String>,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    pub fn columns_removed(&self) -> usize {
        self.columns_before - self.columns_after
    }
}

/// Runs the cleaning steps in their required order.
pub struct DataCleaner<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DataCleaner<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Clean a freshly loaded table.
    ///
    /// Running this on an already clean table removes nothing.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport {
            rows_before: df.height(),
            columns_before: df.width(),
            ..Default::default()
        };

        info!("Cleaning dataset {:?}...", df.shape());

        // 1. Drop non-analytical columns
        let width_before = df.width();
        let df = drop_columns(df, &self.config.drop_columns)?;
        let dropped = width_before - df.width();
        report
            .actions
            .push(format!("Dropped {} non-analytical columns", dropped));
        debug!("Dropped {} columns, {} remain", dropped, df.width());

        // 2. Remove duplicate rows
        let before = df.height();
        let df = drop_duplicate_rows(df)?;
        report.duplicates_removed = before - df.height();
        if report.duplicates_removed > 0 {
            report.actions.push(format!(
                "Removed {} duplicate rows",
                report.duplicates_removed
            ));
        } else {
            report.actions.push("No duplicate rows found".to_string());
        }
        debug!("Removed {} duplicate rows", report.duplicates_removed);

        // 3. Zero means missing
        let df = replace_zero_with_null(df)?;

        // 4. Drop incomplete rows
        let before = df.height();
        let df = drop_incomplete_rows(df)?;
        report.incomplete_rows_removed = before - df.height();
        report.actions.push(format!(
            "Removed {} rows with missing or zero values",
            report.incomplete_rows_removed
        ));
        debug!(
            "Removed {} incomplete rows",
            report.incomplete_rows_removed
        );

        // 5. Release dates
        let df = if df.get_column_index(&self.config.date_column).is_some() {
            let df = parse_release_dates(
                df,
                &self.config.date_column,
                &self.config.date_formats,
                Some(self.config.year_column.as_str()),
            )
            .context("Parsing release dates")?;
            report
                .actions
                .push(format!("Parsed '{}' as dates", self.config.date_column));
            df
        } else {
            debug!(
                "No '{}' column, skipping date parsing",
                self.config.date_column
            );
            df
        };

        // 6. Integer currency columns
        let df = coerce_to_integer(df, &self.config.integer_columns)
            .context("Coercing currency columns")?;
        report.actions.push(format!(
            "Converted {} to integers",
            self.config.integer_columns.join(", ")
        ));

        report.rows_after = df.height();
        report.columns_after = df.width();

        info!(
            "Cleaning complete: {} -> {} rows, {} -> {} columns",
            report.rows_before, report.rows_after, report.columns_before, report.columns_after
        );

        Ok((df, report))
    }
}
