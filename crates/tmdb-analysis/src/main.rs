//! CLI entry point for the TMDb movie dataset analysis.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tmdb_analysis::{
    AnalysisConfig, AnalysisReport, DataAssessment, DataCleaner, MovieAnalysis, ReportGenerator,
    derive_profit, load_csv,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleaning and exploratory statistics for the TMDb movie dataset",
    long_about = "Loads the TMDb movie CSV, cleans it, derives profit and answers the \
                  research questions: most profitable movies, budget and revenue \
                  extremes, profit per year, correlations with profit, and genre, \
                  director and cast frequencies.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  tmdb-analysis -i tmdb-movies.csv\n\n  \
                  # Machine-readable report on stdout\n  \
                  tmdb-analysis -i tmdb-movies.csv --json | jq .profit_by_year.best_year\n\n  \
                  # Save the report and the cleaned table\n  \
                  tmdb-analysis -i tmdb-movies.csv -o results/ --emit-report --save-cleaned"
)]
struct Args {
    /// Path to the TMDb movies CSV file
    #[arg(short, long, default_value = "tmdb-movies.csv")]
    input: String,

    /// Output directory for reports and the cleaned dataset
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Rows or tokens shown per ranking
    #[arg(short = 'n', long = "top", default_value = "10")]
    top: usize,

    /// Number of histogram bins per numeric column
    #[arg(long, default_value = "25")]
    bins: usize,

    /// Separator inside multi-value columns (genres, director, cast)
    #[arg(long, default_value = "|")]
    delimiter: char,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all logs; only the report is written.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write the cleaned table to the output directory as <input_name>_cleaned.csv
    #[arg(long)]
    save_cleaned: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true no subscriber is installed, so stdout carries
/// nothing but the report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    run(&args).inspect_err(|e| error!("{:#}", e))
}

fn run(args: &Args) -> Result<()> {
    let config = AnalysisConfig::builder()
        .top_n(args.top)
        .histogram_bins(args.bins)
        .token_delimiter(args.delimiter)
        .output_dir(&args.output)
        .build()
        .context("Invalid command line options")?;

    info!("Loading dataset from: {}", args.input);
    let raw = load_csv(&args.input, &config)?;
    let assessment = DataAssessment::from_raw(&raw)?;

    let (cleaned, cleaning) = DataCleaner::new(&config).clean(raw)?;
    let mut df = derive_profit(cleaned, config.profit_position)?;

    let report = MovieAnalysis::run(&df, &config)?
        .with_input_file(&args.input)
        .with_raw_assessment(assessment)
        .with_cleaning(cleaning);

    let stem = extract_file_stem(&args.input);
    let generator = ReportGenerator::new(&config.output_dir);

    if args.save_cleaned {
        let path = generator.write_cleaned_dataset(&mut df, &stem)?;
        info!("Cleaned dataset written to: {}", path.display());
    }

    if args.emit_report {
        let path = generator.write_report_to_file(&report, &stem)?;
        info!("Report written to: {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, args);
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Field of a rendered row as display text.
fn field(row: &tmdb_analysis::reporting::RowRecord, column: &str) -> String {
    match row.get(column) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

/// Print the answers as plain text.
///
/// This output uses `println!` intentionally: it is the product of the
/// command, not a log line, and must show regardless of log level.
fn print_human_readable_summary(report: &AnalysisReport, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("TMDB MOVIE ANALYSIS");
    println!("{}", "=".repeat(80));
    println!();

    if let Some(ref assessment) = report.raw_assessment {
        println!(
            "Input:    {} ({} rows x {} columns, {} duplicates)",
            args.input, assessment.shape.0, assessment.shape.1, assessment.duplicate_count
        );
    }
    println!(
        "Analyzed: {} rows x {} columns",
        report.analyzed_shape.0, report.analyzed_shape.1
    );
    println!();

    if let Some(ref cleaning) = report.cleaning {
        println!("Cleaning:");
        for action in &cleaning.actions {
            println!("  - {}", action);
        }
        println!();
    }

    println!("Top {} Most Profitable Movies:", report.top_profitable.len());
    for (rank, row) in report.top_profitable.iter().enumerate() {
        println!(
            "  {:>2}. {:<45} profit {:>15}",
            rank + 1,
            field(row, "original_title"),
            field(row, "profit")
        );
    }
    println!();

    for extremes in [&report.budget_extremes, &report.revenue_extremes] {
        println!(
            "Highest {}: {} ({})",
            extremes.column,
            field(&extremes.highest, "original_title"),
            field(&extremes.highest, &extremes.column)
        );
        println!(
            "Lowest {}:  {} ({})",
            extremes.column,
            field(&extremes.lowest, "original_title"),
            field(&extremes.lowest, &extremes.column)
        );
    }
    println!();

    if let Some(ref best) = report.profit_by_year.best_year {
        println!(
            "Most profitable year: {} (total profit {:.0}, {} years covered)",
            best.key,
            best.total,
            report.profit_by_year.totals.len()
        );
        println!();
    }

    println!("Correlations:");
    for c in &report.correlations {
        println!("  {:<10} vs {:<8} {:>7.3}", c.x, c.y, c.coefficient);
    }
    println!();

    let runtime = &report.runtime;
    println!(
        "Runtime: mean {:.1}, std {:.1}, min {}, median {}, max {}",
        runtime.mean, runtime.std, runtime.min, runtime.median, runtime.max
    );
    println!();

    for (title, counts) in [
        ("Genres", report.genres.iter().take(args.top).collect::<Vec<_>>()),
        ("Directors", report.top_directors.iter().collect()),
        ("Cast", report.top_cast.iter().collect()),
    ] {
        println!("{}:", title);
        for count in counts {
            println!("  {:<35} {:>5}", count.token, count.count);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}
