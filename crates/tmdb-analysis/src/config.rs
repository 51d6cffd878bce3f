//! Configuration types for the analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Columns that carry no analytical value for the research questions.
pub const DEFAULT_DROP_COLUMNS: [&str; 11] = [
    "id",
    "imdb_id",
    "homepage",
    "tagline",
    "keywords",
    "overview",
    "production_companies",
    "vote_count",
    "vote_average",
    "budget_adj",
    "revenue_adj",
];

/// Field values read as missing, in addition to the empty field.
pub const DEFAULT_NULL_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Release date layouts tried in order (chrono format strings).
pub const DEFAULT_DATE_FORMATS: [&str; 3] = ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use tmdb_analysis::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .top_n(5)
///     .token_delimiter('|')
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Columns removed before any other cleaning step.
    pub drop_columns: Vec<String>,

    /// Separator between tokens of multi-value text fields (genres, cast, director).
    /// Default: '|'
    pub token_delimiter: char,

    /// Number of rows/tokens reported per ranking.
    /// Default: 10
    pub top_n: usize,

    /// Number of equal-width bins for numeric histograms.
    /// Default: 25
    pub histogram_bins: usize,

    /// Column index where the derived profit column is inserted.
    /// Default: 3
    pub profit_position: usize,

    /// Text column parsed into a calendar date.
    pub date_column: String,

    /// Integer year column used to resolve two-digit years.
    pub year_column: String,

    /// Columns coerced to integers after cleaning.
    pub integer_columns: Vec<String>,

    /// Accepted date layouts, tried in order.
    pub date_formats: Vec<String>,

    /// Number of rows polars reads to infer column types.
    /// Default: 1000
    pub infer_schema_length: usize,

    /// Field values loaded as null.
    pub null_values: Vec<String>,

    /// Output directory for reports and the cleaned dataset.
    /// Default: "./outputs"
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|s| s.to_string()).collect(),
            token_delimiter: '|',
            top_n: 10,
            histogram_bins: 25,
            profit_position: 3,
            date_column: "release_date".to_string(),
            year_column: "release_year".to_string(),
            integer_columns: vec!["budget".to_string(), "revenue".to_string()],
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            infer_schema_length: 1000,
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if matches!(self.token_delimiter, '\n' | '\r' | '"') {
            return Err(ConfigValidationError::InvalidDelimiter(self.token_delimiter));
        }

        if self.top_n == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "top_n".to_string(),
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "histogram_bins".to_string(),
            });
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "infer_schema_length".to_string(),
            });
        }

        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid token delimiter {0:?} (must not be a line break or quote)")]
    InvalidDelimiter(char),

    #[error("Invalid value for '{field}': must be at least 1")]
    ZeroCount { field: String },

    #[error("At least one date format is required")]
    NoDateFormats,
}

impl From<ConfigValidationError> for crate::error::AnalysisError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::AnalysisError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    drop_columns: Option<Vec<String>>,
    token_delimiter: Option<char>,
    top_n: Option<usize>,
    histogram_bins: Option<usize>,
    profit_position: Option<usize>,
    date_column: Option<String>,
    year_column: Option<String>,
    integer_columns: Option<Vec<String>>,
    date_formats: Option<Vec<String>>,
    infer_schema_length: Option<usize>,
    null_values: Option<Vec<String>>,
    output_dir: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Replace the list of columns dropped before cleaning.
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the separator used by multi-value text fields.
    pub fn token_delimiter(mut self, delimiter: char) -> Self {
        self.token_delimiter = Some(delimiter);
        self
    }

    /// Set how many entries each ranking reports.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the column index of the derived profit column.
    pub fn profit_position(mut self, position: usize) -> Self {
        self.profit_position = Some(position);
        self
    }

    /// Set the release date column.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    /// Set the release year column.
    pub fn year_column(mut self, column: impl Into<String>) -> Self {
        self.year_column = Some(column.into());
        self
    }

    /// Replace the list of columns coerced to integers.
    pub fn integer_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.integer_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the accepted date layouts (chrono format strings).
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of rows used for schema inference.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Replace the field values read as missing.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the output directory for reports and the cleaned dataset.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            drop_columns: self.drop_columns.unwrap_or(defaults.drop_columns),
            token_delimiter: self.token_delimiter.unwrap_or(defaults.token_delimiter),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            profit_position: self.profit_position.unwrap_or(defaults.profit_position),
            date_column: self.date_column.unwrap_or(defaults.date_column),
            year_column: self.year_column.unwrap_or(defaults.year_column),
            integer_columns: self.integer_columns.unwrap_or(defaults.integer_columns),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

static_assertions::assert_impl_all!(AnalysisConfig: Send, Sync);
