//! Report generation.
//!
//! [`MovieAnalysis::run`] turns a cleaned, profit-carrying table into an
//! [`AnalysisReport`]. The same report backs the CLI's human summary, the
//! `--json` output and the `--emit-report` file written by
//! [`ReportGenerator`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tmdb_analysis::reporting::{MovieAnalysis, ReportGenerator};
//!
//! let report = MovieAnalysis::run(&df, &config)?.with_input_file("tmdb-movies.csv");
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new("outputs");
//! generator.write_report_to_file(&report, "tmdb-movies")?;
//! ```

mod analysis;
mod generator;

pub use analysis::{
    AnalysisReport, CORRELATION_PAIRS, DataAssessment, ExtremePair, MovieAnalysis, RowRecord,
    YearlyProfit,
};
pub use generator::ReportGenerator;
