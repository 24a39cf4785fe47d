use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ctdcast_core::day_scanner::scan_days;
use ctdcast_core::eos::Pss78;
use ctdcast_core::orchestrator::process_batch;
use ctdcast_core::sites;
use ctdcast_core::types::DEFAULT_MIN_SPAN_SAMPLES;
use ctdcast_core::{ProcessingParameters, RawSeries};

mod ingest;

/// Reduce CTD logger streams into labeled per-cast profile datasets.
#[derive(Parser, Debug)]
#[command(name = "ctdcast", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process raw channel exports into dated per-profile outputs
    Process(ProcessArgs),
    /// List the registered monitoring stations
    Stations,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Output directory for dated profile artifacts and manifest.json
    #[arg(short, long)]
    out: PathBuf,

    /// Station identifier (see `ctdcast stations`)
    #[arg(long, default_value_t = 5)]
    site_id: u32,

    /// Atmospheric pressure on the day of the casts (dbar)
    #[arg(long, default_value_t = 10.1325)]
    atmospheric_pressure: f64,

    /// Sea-pressure level that begins/ends a cast (dbar)
    #[arg(long, default_value_t = 0.45)]
    pressure_threshold: f64,

    /// Conductivity floor confirming the sensor is submerged (mS/cm)
    #[arg(long, default_value_t = 5.0)]
    conductivity_threshold: f64,

    /// Shortest in-water run accepted as a cast, in samples
    #[arg(long, default_value_t = DEFAULT_MIN_SPAN_SAMPLES)]
    min_span_samples: usize,

    /// Comma-separated channel names to retain in the tables
    #[arg(long, value_delimiter = ',')]
    channels: Option<Vec<String>>,

    /// Raw channel CSV exports (files, or directories scanned for *.csv)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => run_process(args),
        Command::Stations => {
            for station in sites::all_stations() {
                println!("{:>3}  {:<14} {:.4}", station.id, station.name, station.latitude);
            }
            Ok(())
        }
    }
}

fn run_process(args: ProcessArgs) -> Result<()> {
    let channels = args
        .channels
        .unwrap_or_else(ProcessingParameters::default_channel_subset);
    let params = ProcessingParameters::new(
        args.site_id,
        args.atmospheric_pressure,
        args.pressure_threshold,
        args.conductivity_threshold,
        channels,
    )
    .context("parameter validation failed")?
    .with_min_span_samples(args.min_span_samples)
    .context("parameter validation failed")?;

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        bail!("no input files found");
    }

    // Staging area for the raw uploads; removed on every exit path when
    // the TempDir drops.
    let staging = tempfile::tempdir().context("failed to create staging directory")?;
    let mut series: Vec<RawSeries> = Vec::with_capacity(files.len());
    for file in &files {
        let name = file
            .file_name()
            .with_context(|| format!("input {} has no file name", file.display()))?;
        let staged = staging.path().join(name);
        fs::copy(file, &staged)
            .with_context(|| format!("failed to stage {}", file.display()))?;
        series.push(ingest::read_series(&staged)?);
    }

    let units = scan_days(&series).context("day scan failed")?;
    info!(files = files.len(), days = units.len(), "scanned input stream");

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let manifest = process_batch(&units, &params, &Pss78, &args.out)?;

    let manifest_path = args.out.join("manifest.json");
    let manifest_file = File::create(&manifest_path)
        .with_context(|| format!("failed to create {}", manifest_path.display()))?;
    serde_json::to_writer_pretty(manifest_file, &manifest)
        .context("failed to serialize manifest")?;

    println!(
        "{} profile(s), {} empty day(s), {} failure(s); manifest at {}",
        manifest.profile_count(),
        manifest.empty_day_count(),
        manifest.failure_count(),
        manifest_path.display()
    );
    for failed in manifest.failures() {
        eprintln!(
            "  FAILED {} profile {:?}: {} ({})",
            failed.date, failed.index, failed.message, failed.error_kind
        );
    }

    if !units.is_empty() && manifest.profile_count() == 0 && manifest.failure_count() > 0 {
        bail!("every detected cast failed; see {}", manifest_path.display());
    }
    Ok(())
}

fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let pattern = input.join("*.csv");
            let pattern = pattern
                .to_str()
                .with_context(|| format!("non-UTF-8 path {}", input.display()))?;
            for entry in glob::glob(pattern).context("invalid glob pattern")? {
                files.push(entry.context("failed to read globbed path")?);
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
