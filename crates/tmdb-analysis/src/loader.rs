//! CSV loading.
//!
//! The header row names the columns; polars infers each column's type from
//! the leading rows, so numeric columns arrive as `Int64`/`Float64` and
//! everything else as `String`. Empty fields and the configured missing
//! markers (`NA`, `NaN`, `null`, ...) load as null.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Load a comma-delimited file with a header row.
///
/// # Errors
///
/// - [`AnalysisError::FileNotFound`] if `path` does not exist.
/// - [`AnalysisError::Parse`] if the content is not well-formed CSV
///   (e.g. a row with more fields than the header).
pub fn load_csv(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    info!("Loading dataset from: {}", path.display());

    let df = read_options(config)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(into_parse_error)?
        .finish()
        .map_err(into_parse_error)?;

    info!("Dataset loaded successfully: {:?}", df.shape());
    debug!("Columns: {:?}", df.get_column_names());
    Ok(df)
}

/// Load CSV content that is already in memory.
pub fn load_csv_from_bytes(bytes: impl Into<Vec<u8>>, config: &AnalysisConfig) -> Result<DataFrame> {
    let cursor = Cursor::new(bytes.into());
    let df = read_options(config)
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(into_parse_error)?;

    debug!("Dataset loaded from memory: {:?}", df.shape());
    Ok(df)
}

fn read_options(config: &AnalysisConfig) -> CsvReadOptions {
    let null_values = NullValues::AllColumns(
        config
            .null_values
            .iter()
            .map(|s| PlSmallStr::from(s.as_str()))
            .collect(),
    );

    CsvReadOptions::default()
        .with_infer_schema_length(Some(config.infer_schema_length))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
}

/// IO failures stay IO failures; everything else the reader reports is a
/// problem with the content.
fn into_parse_error(e: PolarsError) -> AnalysisError {
    match e {
        PolarsError::IO { .. } => AnalysisError::Polars(e),
        other => AnalysisError::Parse(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let result = load_csv("does/not/exist.csv", &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::FileNotFound(_))));
    }

    #[test]
    fn test_load_infers_types() {
        let csv = "popularity,budget,original_title\n1.5,100,Alpha\n0.25,200,Beta\n";
        let df = load_csv_from_bytes(csv, &AnalysisConfig::default()).unwrap();

        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("popularity").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("budget").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("original_title").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_empty_field_is_null() {
        let csv = "budget,homepage\n100,\n200,http://example.com\n";
        let df = load_csv_from_bytes(csv, &AnalysisConfig::default()).unwrap();
        assert_eq!(df.column("homepage").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_missing_markers_are_null() {
        let csv = "original_title,runtime,popularity\nA,NA,0.5\nB,0,NaN\nC,120,1.25\nD,null,N/A\n";
        let df = load_csv_from_bytes(csv, &AnalysisConfig::default()).unwrap();

        let runtime = df.column("runtime").unwrap();
        assert_eq!(runtime.dtype(), &DataType::Int64);
        assert_eq!(runtime.null_count(), 2);

        let popularity = df.column("popularity").unwrap();
        assert_eq!(popularity.dtype(), &DataType::Float64);
        assert_eq!(popularity.null_count(), 2);
    }

    #[test]
    fn test_load_custom_missing_markers() {
        let config = AnalysisConfig::builder().null_values(["?"]).build().unwrap();
        let csv = "runtime\n?\n90\n";
        let df = load_csv_from_bytes(csv, &config).unwrap();
        assert_eq!(df.column("runtime").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("runtime").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_quoted_delimiters() {
        let csv = "original_title,budget\n\"Lost, Found\",10\n";
        let df = load_csv_from_bytes(csv, &AnalysisConfig::default()).unwrap();
        let title = df.column("original_title").unwrap().get(0).unwrap();
        assert_eq!(title.get_str(), Some("Lost, Found"));
    }

    #[test]
    fn test_load_row_with_extra_fields_fails() {
        let csv = "budget,revenue\n100,300\n50,40,999\n";
        let result = load_csv_from_bytes(csv, &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }
}
