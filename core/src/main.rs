use chrono::Local;
use clap::Parser;
use l3extract_core::cli::Cli;
use l3extract_core::{
    write_index, write_previews, IndexRow, RunLog, SliceExtractor, TextReport,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

/// Patients shown in preview montages
const PREVIEW_PATIENTS: usize = 3;
/// Slices per preview montage
const PREVIEW_SLICES: usize = 4;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let config = cli.extract_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if !cli.input.is_dir() {
        eprintln!("Error: {} is not a directory", cli.input.display());
        process::exit(1);
    }

    let logtxt = cli.logtxt.clone().unwrap_or_else(|| {
        PathBuf::from("outputs/logs").join(format!(
            "l3_run_{}.txt",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    let mut run_log = match RunLog::create(&logtxt) {
        Ok(run_log) => run_log,
        Err(e) => {
            error!("Failed to create run log {}: {}", logtxt.display(), e);
            eprintln!("Error: Failed to create run log: {}", e);
            process::exit(1);
        }
    };

    run_log.info(&format!("Processing dataset: {}", cli.input.display()));
    info!("Using configuration: {:?}", config);

    let extractor = SliceExtractor::new(config, &cli.output).with_progress(!cli.verbose);
    let report = match extractor.run(&cli.input, &mut run_log) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_index(&cli.logcsv, &report.rows) {
        run_log.error(&format!("Failed to write index {}: {}", cli.logcsv.display(), e));
        eprintln!("Error: Failed to write index: {}", e);
        process::exit(1);
    }
    run_log.info(&format!(
        "Done: {} ok, {} failed, {} slices indexed in {}",
        report.ok,
        report.failed,
        report.rows.len(),
        cli.logcsv.display()
    ));

    if cli.preview {
        write_preview_montages(&report.rows, &cli.figures, &mut run_log);
    }

    println!("{}", TextReport::new(&report, &cli.logcsv));
}

/// Preview montages are optional, so failures are only recorded in the run log
fn write_preview_montages(rows: &[IndexRow], figures: &Path, run_log: &mut RunLog) {
    match write_previews(rows, figures, PREVIEW_PATIENTS, PREVIEW_SLICES) {
        Ok(paths) => run_log.info(&format!(
            "Wrote {} preview montages to {}",
            paths.len(),
            figures.display()
        )),
        Err(e) => run_log.warn(&format!("Preview generation failed: {}", e)),
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
