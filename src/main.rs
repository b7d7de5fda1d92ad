//! Thin CLI shell around the detection pipeline.
//!
//! Owns argument defaulting/validation, result presentation, and the process
//! exit status; the library itself never prints.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use csv_anomaly::observability::StdErrObserver;
use csv_anomaly::pipeline::{DEFAULT_THRESHOLD, PipelineOptions, detect_from_path};
use csv_anomaly::reader::ReadOptions;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to analyze
    #[arg(short, long)]
    file: PathBuf,

    /// Column to analyze (defaults to the first numeric column)
    #[arg(short, long)]
    column: Option<String>,

    /// Z-score threshold; values scoring strictly above it are flagged
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Output the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log the run outcome to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if args.threshold <= 0.0 {
        eprintln!("threshold must be positive (got {})", args.threshold);
        process::exit(2);
    }
    if !args.delimiter.is_ascii() {
        eprintln!("delimiter must be a single ASCII character");
        process::exit(2);
    }
    if let Err(e) = std::fs::metadata(&args.file) {
        eprintln!("cannot access {}: {e}", args.file.display());
        process::exit(1);
    }

    let mut opts = PipelineOptions {
        column: args.column,
        threshold: args.threshold,
        read: ReadOptions::default().with_delimiter(args.delimiter as u8),
        ..Default::default()
    };
    if args.verbose {
        opts.observer = Some(Arc::new(StdErrObserver));
    }

    let report = match detect_from_path(&args.file, &opts) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("detect: {e}");
            process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("serialize: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("column: {}", report.column);
        println!("rows: {}", report.rows);
        println!("anomalies: {:?}", report.result.anomalies);
    }
}
