//! `importer`: MARCXML import command line.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use mrrc_ingest::config::Config;
use mrrc_ingest::coordinator::{ImportMode, Importer};
use mrrc_ingest::sink::{self, JsonLinesSink};
use simple_logger::SimpleLogger;
use time::macros::format_description;

#[derive(Parser)]
#[command(name = "importer")]
#[command(about = "Imports MARCXML records from library providers into the document model.")]
#[command(version)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        default_value = "INFO",
        help = "Logging level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import one MARCXML file
    Import {
        #[arg(help = "Provider name, as configured (cds, snv, springer, ebl, safari)")]
        provider: String,

        #[arg(help = "MARCXML file to import")]
        path: PathBuf,

        #[arg(short, long, default_value = "create", help = "Import mode (create, delete)")]
        mode: String,

        #[arg(short, long, help = "TOML configuration file")]
        config: Option<PathBuf>,

        #[arg(
            short,
            long,
            default_value = "./import-output",
            help = "Directory receiving the JSON lines logs"
        )]
        output: PathBuf,

        #[arg(short, long, help = "Number of threads to use (0 for auto)")]
        threads: Option<usize>,

        #[arg(long, help = "Record field-level errors instead of failing the record")]
        lenient: bool,
    },
    /// Rebuild the deduplicated document index of an output directory
    Reindex {
        #[arg(short, long, default_value = "./import-output", help = "Output directory to index")]
        output: PathBuf,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        _ => {
            eprintln!("Invalid log level '{level}', defaulting to INFO.");
            LevelFilter::Info
        },
    };
    SimpleLogger::new()
        .with_level(log_level)
        .with_timestamp_format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Import {
            provider,
            path,
            mode,
            config,
            output,
            threads,
            lenient,
        } => {
            let start = Instant::now();
            let mode: ImportMode = mode.parse()?;
            let mut settings = match &config {
                Some(file) => Config::load(file)
                    .with_context(|| format!("Failed to load configuration {}", file.display()))?,
                None => Config::default(),
            };
            if let Some(threads) = threads {
                settings = settings.with_threads(threads);
            }
            if lenient {
                settings = settings.with_strict_mode(false);
            }
            if !settings.allowed_file(&path) {
                bail!("{} does not have an allowed extension", path.display());
            }

            let importer = Importer::new(settings)?;
            let mut sink = JsonLinesSink::create(&output)
                .with_context(|| format!("Failed to open output directory {}", output.display()))?;
            info!("Importing {} as {provider} ({mode})", path.display());
            let report = importer
                .import_file(&path, &provider, mode, &mut sink)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            println!(
                "{} records: {} upserted, {} deleted, {} failed, {} cancelled",
                report.total, report.succeeded, report.deleted, report.failed, report.cancelled
            );
            info!("Finished in {:.2?}", start.elapsed());
        },
        Command::Reindex { output } => {
            let count = sink::reindex(&output)
                .with_context(|| format!("Failed to index {}", output.display()))?;
            println!("{count} documents indexed");
        },
    }
    Ok(())
}
