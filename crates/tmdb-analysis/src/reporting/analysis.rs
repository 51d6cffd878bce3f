//! The research questions asked of a cleaned table, and the report that
//! carries their answers.

use crate::aggregator::{
    best_group, correlation, describe, duplicate_count, extremum_row, histogram, null_counts,
    sum_by_group, top_n_by,
};
use crate::cleaner::CleaningReport;
use crate::config::AnalysisConfig;
use crate::counter::{CategoricalCounter, TokenCounts};
use crate::error::{Result, ResultExt};
use crate::features::PROFIT_COLUMN;
use crate::types::{
    ColumnCorrelation, ColumnDescription, ColumnHistogram, ColumnNulls, Extremum, GroupTotal,
    SortOrder, TokenCount,
};
use crate::utils::{is_numeric_dtype, row_to_json, rows_to_json};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// Column pairs whose correlation the analysis reports.
pub const CORRELATION_PAIRS: [(&str, &str); 4] = [
    ("budget", PROFIT_COLUMN),
    ("budget", "revenue"),
    ("popularity", PROFIT_COLUMN),
    ("runtime", PROFIT_COLUMN),
];

/// A table row rendered as `column -> value`.
pub type RowRecord = Map<String, Value>;

/// Shape and quality of the table as it was loaded, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAssessment {
    pub shape: (usize, usize),
    pub duplicate_count: usize,
    pub null_counts: Vec<ColumnNulls>,
}

impl DataAssessment {
    pub fn from_raw(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            shape: df.shape(),
            duplicate_count: duplicate_count(df)?,
            null_counts: null_counts(df),
        })
    }
}

/// Highest and lowest row of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremePair {
    pub column: String,
    pub highest: RowRecord,
    pub lowest: RowRecord,
}

/// Per-year profit totals and the year that earned the most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProfit {
    pub totals: Vec<GroupTotal>,
    pub best_year: Option<GroupTotal>,
}

/// Answers to the research questions, plus the context they were computed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub input_file: Option<String>,
    /// Assessment of the raw table, when the caller had it.
    pub raw_assessment: Option<DataAssessment>,
    pub cleaning: Option<CleaningReport>,
    pub analyzed_shape: (usize, usize),

    pub top_profitable: Vec<RowRecord>,
    pub budget_extremes: ExtremePair,
    pub revenue_extremes: ExtremePair,
    pub profit_by_year: YearlyProfit,
    pub correlations: Vec<ColumnCorrelation>,
    pub runtime: ColumnDescription,
    pub histograms: Vec<ColumnHistogram>,

    pub genres: Vec<TokenCount>,
    pub top_directors: Vec<TokenCount>,
    pub top_cast: Vec<TokenCount>,
}

impl AnalysisReport {
    pub fn with_input_file(mut self, path: impl Into<String>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    pub fn with_raw_assessment(mut self, assessment: DataAssessment) -> Self {
        self.raw_assessment = Some(assessment);
        self
    }

    pub fn with_cleaning(mut self, cleaning: CleaningReport) -> Self {
        self.cleaning = Some(cleaning);
        self
    }

    /// Coefficient recorded for the pair `(x, y)` in either order.
    pub fn correlation(&self, x: &str, y: &str) -> Option<f64> {
        self.correlations
            .iter()
            .find(|c| (c.x == x && c.y == y) || (c.x == y && c.y == x))
            .map(|c| c.coefficient)
    }
}

/// Runs every research query over a cleaned table that carries `profit`.
pub struct MovieAnalysis;

impl MovieAnalysis {
    pub fn run(df: &DataFrame, config: &AnalysisConfig) -> Result<AnalysisReport> {
        info!("Analyzing {} movies...", df.height());
        let top_n = config.top_n;

        // 1. Most profitable movies
        let top = top_n_by(df, PROFIT_COLUMN, top_n, SortOrder::Descending)
            .context("Ranking movies by profit")?;
        let top_profitable = rows_to_json(&top)?;

        // 2-3. Budget and revenue extremes
        let budget_extremes = extremes(df, "budget")?;
        let revenue_extremes = extremes(df, "revenue")?;

        // 4. Profit per release year
        let totals = sum_by_group(df, &config.year_column, PROFIT_COLUMN)
            .context("Summing profit per year")?;
        let best_year = best_group(&totals).cloned();
        let profit_by_year = YearlyProfit { totals, best_year };

        // 5. Correlations
        let correlations = CORRELATION_PAIRS
            .iter()
            .map(|&(x, y)| {
                let coefficient = correlation(df, x, y)
                    .context(format!("Correlating '{}' with '{}'", x, y))?;
                Ok(ColumnCorrelation {
                    x: x.to_string(),
                    y: y.to_string(),
                    coefficient,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let runtime = describe(df, "runtime")?;

        let histograms = df
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| {
                let name = col.name().as_str();
                Ok(ColumnHistogram {
                    column: name.to_string(),
                    bins: histogram(df, name, config.histogram_bins)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // 6-8. Token frequencies
        let counter = CategoricalCounter::new(config.token_delimiter);
        let genres = counter.count(df, "genres")?;
        let directors = counter.count(df, "director")?;
        let cast = counter.count(df, "cast")?;

        info!(
            "Analysis complete: {} genres, {} directors, {} cast members",
            genres.len(),
            directors.len(),
            cast.len()
        );

        Ok(AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: None,
            raw_assessment: None,
            cleaning: None,
            analyzed_shape: df.shape(),
            top_profitable,
            budget_extremes,
            revenue_extremes,
            profit_by_year,
            correlations,
            runtime,
            histograms,
            genres: genres.counts().to_vec(),
            top_directors: head(&directors, top_n),
            top_cast: head(&cast, top_n),
        })
    }
}

fn extremes(df: &DataFrame, column: &str) -> Result<ExtremePair> {
    let highest = extremum_row(df, column, Extremum::Max)?;
    let lowest = extremum_row(df, column, Extremum::Min)?;
    Ok(ExtremePair {
        column: column.to_string(),
        highest: row_to_json(&highest, 0)?,
        lowest: row_to_json(&lowest, 0)?,
    })
}

fn head(counts: &TokenCounts, n: usize) -> Vec<TokenCount> {
    counts.head(n).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_profit;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cleaned() -> DataFrame {
        let df = df!(
            "popularity" => &[9.4f64, 0.7, 4.1, 2.2],
            "budget" => &[237_000_000i64, 30_000_000, 1_000_000, 60_000_000],
            "revenue" => &[2_781_505_847i64, 10_000_000, 55_000_000, 61_000_000],
            "original_title" => &["Avatar", "Flop", "Indie Hit", "Breakeven"],
            "cast" => &["Sam Worthington|Zoe Saldana", "Zoe Saldana", "Unknown", "Sam Worthington"],
            "director" => &["James Cameron", "Jane Roe", "James Cameron", "John Doe"],
            "runtime" => &[162i64, 95, 88, 120],
            "genres" => &["Action|Adventure", "Drama", "Drama|Horror", "Action"],
            "release_year" => &[2009i64, 2010, 2009, 2011]
        )
        .unwrap();
        derive_profit(df, 3).unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig::builder()
            .top_n(2)
            .histogram_bins(5)
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_answers_questions() {
        let report = MovieAnalysis::run(&cleaned(), &config()).unwrap();

        assert_eq!(report.analyzed_shape, (4, 10));
        assert_eq!(report.top_profitable.len(), 2);
        assert_eq!(report.top_profitable[0]["original_title"], json!("Avatar"));
        assert_eq!(report.top_profitable[1]["original_title"], json!("Indie Hit"));

        assert_eq!(report.budget_extremes.highest["original_title"], json!("Avatar"));
        assert_eq!(report.budget_extremes.lowest["original_title"], json!("Indie Hit"));
        assert_eq!(report.revenue_extremes.lowest["original_title"], json!("Flop"));

        let years: Vec<i64> = report.profit_by_year.totals.iter().map(|g| g.key).collect();
        assert_eq!(years, vec![2009, 2010, 2011]);
        assert_eq!(report.profit_by_year.best_year.as_ref().map(|g| g.key), Some(2009));

        assert_eq!(report.correlations.len(), 4);
        assert!(report.correlation("profit", "popularity").is_some());
        assert_eq!(report.runtime.count, 4);
        // one histogram per numeric column, profit included
        assert_eq!(report.histograms.len(), 6);

        assert_eq!(report.genres[0], TokenCount { token: "Action".into(), count: 2 });
        assert_eq!(report.top_directors[0].token, "James Cameron");
        assert_eq!(report.top_cast.len(), 2);
        assert!(report.input_file.is_none());
    }

    #[test]
    fn test_run_requires_profit() {
        let df = df!(
            "budget" => &[1i64, 2],
            "revenue" => &[3i64, 4]
        )
        .unwrap();
        let err = MovieAnalysis::run(&df, &config()).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_report_json_round_trip() {
        let raw = cleaned();
        let report = MovieAnalysis::run(&raw, &config())
            .unwrap()
            .with_input_file("tmdb-movies.csv")
            .with_raw_assessment(DataAssessment::from_raw(&raw).unwrap())
            .with_cleaning(CleaningReport::default());

        let text = serde_json::to_string_pretty(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.input_file.as_deref(), Some("tmdb-movies.csv"));
        assert_eq!(back.raw_assessment, report.raw_assessment);
        assert_eq!(back.cleaning, report.cleaning);
        assert_eq!(back.top_profitable, report.top_profitable);
        assert_eq!(back.profit_by_year, report.profit_by_year);
        assert_eq!(back.genres, report.genres);
        assert_eq!(back.top_cast, report.top_cast);
        for (a, b) in back.correlations.iter().zip(&report.correlations) {
            assert_eq!((&a.x, &a.y), (&b.x, &b.y));
            assert!((a.coefficient - b.coefficient).abs() < 1e-12);
        }
    }

    #[test]
    fn test_data_assessment() {
        let df = df!(
            "budget" => &[Some(1i64), Some(1), None],
            "genres" => &[Some("Drama"), Some("Drama"), Some("Action")]
        )
        .unwrap();
        let assessment = DataAssessment::from_raw(&df).unwrap();
        assert_eq!(assessment.shape, (3, 2));
        assert_eq!(assessment.duplicate_count, 1);
        assert_eq!(assessment.null_counts[0].null_count, 1);
    }
}
