//! TMDb Movie Dataset Analysis Library
//!
//! Cleaning and exploratory statistics for the TMDb movie dataset, built on
//! Polars.
//!
//! # Overview
//!
//! The data flows one way through a fixed set of stages:
//!
//! - **Loading**: CSV with a header row, column types inferred by Polars
//! - **Cleaning**: drop non-analytical columns, de-duplicate, treat numeric
//!   zeros as missing, drop incomplete rows, parse release dates, integer
//!   currency columns
//! - **Derivation**: `profit = revenue - budget`
//! - **Aggregation**: rankings, extremum rows, per-year sums, correlations,
//!   descriptive statistics and histograms
//! - **Counting**: token frequencies of `|`-separated columns such as genres
//! - **Reporting**: one serializable report answering every research question
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tmdb_analysis::{AnalysisConfig, DataCleaner, MovieAnalysis, derive_profit, load_csv};
//!
//! let config = AnalysisConfig::default();
//! let raw = load_csv("tmdb-movies.csv", &config)?;
//! let (clean, cleaning) = DataCleaner::new(&config).clean(raw)?;
//! let df = derive_profit(clean, config.profit_position)?;
//!
//! let report = MovieAnalysis::run(&df, &config)?.with_cleaning(cleaning);
//! println!("Best year: {:?}", report.profit_by_year.best_year);
//! ```
//!
//! # Configuration
//!
//! Use [`AnalysisConfig`] to adjust the cleaning and reporting parameters:
//!
//! ```rust,ignore
//! use tmdb_analysis::AnalysisConfig;
//!
//! let config = AnalysisConfig::builder()
//!     .top_n(20)              // rows/tokens per ranking
//!     .histogram_bins(10)
//!     .token_delimiter(';')
//!     .build()?;
//! ```

pub mod aggregator;
pub mod cleaner;
pub mod config;
pub mod counter;
pub mod error;
pub mod features;
pub mod loader;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregator::{
    best_group, correlation, describe, duplicate_count, extremum_index, extremum_row, histogram,
    null_counts, sum_by_group, top_n_by,
};
pub use cleaner::{CleaningReport, DataCleaner};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use counter::{CategoricalCounter, TokenCounts};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use features::{PROFIT_COLUMN, derive_profit};
pub use loader::{load_csv, load_csv_from_bytes};
pub use reporting::{AnalysisReport, DataAssessment, MovieAnalysis, ReportGenerator};
pub use types::{
    ColumnCorrelation, ColumnDescription, ColumnHistogram, ColumnNulls, Extremum, GroupTotal,
    HistogramBin, SortOrder, TokenCount,
};
