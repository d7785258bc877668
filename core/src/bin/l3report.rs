use clap::Parser;
use l3extract_core::dataset::{tally_dataset, write_dataset_report, DEFAULT_DATASET_NAME};
use log::{error, info};
use std::path::PathBuf;
use std::process;

/// CLI tool for tallying a downloaded CT dataset
#[derive(Parser, Debug)]
#[command(name = "l3report")]
#[command(about = "Count patients and CT slices of a downloaded dataset")]
#[command(version)]
struct Cli {
    /// Dataset root containing one directory per patient
    #[arg(long, value_name = "DIR", default_value = "data/raw")]
    data: PathBuf,

    /// Directory receiving dataset_report.txt and dataset_report.json
    #[arg(long, value_name = "DIR", default_value = "logs")]
    logs: PathBuf,

    /// Collection name written into the report
    #[arg(long, default_value = DEFAULT_DATASET_NAME)]
    name: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if !cli.data.is_dir() {
        eprintln!("Error: {} is not a directory", cli.data.display());
        process::exit(1);
    }

    info!("Tallying dataset: {}", cli.data.display());

    let report = match tally_dataset(&cli.data, &cli.name) {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to read dataset: {}", e);
            eprintln!("Error: Failed to read dataset: {}", e);
            process::exit(1);
        }
    };

    match write_dataset_report(&report, &cli.logs) {
        Ok((txt, json)) => info!("Reports written to {} and {}", txt.display(), json.display()),
        Err(e) => {
            error!("Failed to write reports: {}", e);
            eprintln!("Error: Failed to write reports: {}", e);
            process::exit(1);
        }
    }

    println!("{}", report);
}
