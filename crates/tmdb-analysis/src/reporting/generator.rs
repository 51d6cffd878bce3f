use super::AnalysisReport;
use crate::error::Result;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Writes reports and cleaned tables under one output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write a report as pretty JSON.
    ///
    /// With `stem` "tmdb-movies" the file is `tmdb-movies_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", stem));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Write the cleaned table as `<stem>_cleaned.csv`; dates are written as
    /// `YYYY-MM-DD`.
    pub fn write_cleaned_dataset(&self, df: &mut DataFrame, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let output_path = self.output_dir.join(format!("{}_cleaned.csv", stem));
        let mut file = File::create(&output_path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .with_date_format(Some("%Y-%m-%d".to_string()))
            .finish(df)?;

        info!("Cleaned dataset saved: {}", output_path.display());

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::features::derive_profit;
    use crate::loader::load_csv;
    use crate::reporting::MovieAnalysis;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tmdb-analysis-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn analyzed() -> (DataFrame, AnalysisReport) {
        let df = df!(
            "popularity" => &[1.5f64, 0.5, 2.5],
            "budget" => &[10i64, 20, 30],
            "revenue" => &[40i64, 10, 90],
            "cast" => &["A|B", "B", "C"],
            "director" => &["X", "Y", "X"],
            "runtime" => &[90i64, 100, 120],
            "genres" => &["Drama", "Comedy|Drama", "Action"],
            "release_year" => &[2001i64, 2002, 2001]
        )
        .unwrap();
        let df = derive_profit(df, 3).unwrap();
        let report = MovieAnalysis::run(&df, &AnalysisConfig::default()).unwrap();
        (df, report)
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = scratch_dir("report");
        let (_, report) = analyzed();
        let generator = ReportGenerator::new(&dir);

        let path = generator.write_report_to_file(&report, "movies").unwrap();
        assert_eq!(path, dir.join("movies_report.json"));

        let text = fs::read_to_string(&path).unwrap();
        let back: AnalysisReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.genres, report.genres);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_cleaned_dataset_reloads() {
        let dir = scratch_dir("cleaned");
        let (mut df, _) = analyzed();
        let generator = ReportGenerator::new(&dir);

        let path = generator.write_cleaned_dataset(&mut df, "movies").unwrap();
        assert!(path.ends_with("movies_cleaned.csv"));

        let reloaded = load_csv(&path, &AnalysisConfig::default()).unwrap();
        assert_eq!(reloaded.shape(), df.shape());
        assert_eq!(reloaded.get_column_names()[3].as_str(), "profit");

        fs::remove_dir_all(&dir).unwrap();
    }
}
