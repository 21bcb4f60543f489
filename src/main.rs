//! findoutlie - flag corrupted frames in 4D functional runs
//!
//! A CLI tool that scans a data directory for functional images, runs the
//! metric/detector/consensus pipeline on every run and writes a report.
//!
//! Exit codes:
//!   0 - Success (or outliers found without --fail-on-outliers)
//!   1 - Runtime error (bad config, missing directory, etc.)
//!   2 - Outlier frames found and --fail-on-outliers set

use anyhow::{Context, Result};
use chrono::Utc;
use findoutlie::analysis::{self, Pipeline};
use findoutlie::cli::{Args, OutputFormat};
use findoutlie::config::{Config, CONFIG_FILE};
use findoutlie::integrity;
use findoutlie::loader::{NiftiLoader, VolumeLoader};
use findoutlie::models::{Report, ReportMetadata, ScanResult};
use findoutlie::report::{self, MarkdownOptions};
use findoutlie::scanner::{self, FileScanner, ScanConfig, ScannedFile};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("findoutlie v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .findoutlie.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize metrics, detectors, the consensus rule and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run detection over the data directory. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let data_dir = args
        .data_dir
        .clone()
        .context("A data directory is required")?;

    // Step 1: Discover runs
    let files = match (args.subject, args.run) {
        (Some(subject), Some(run)) => vec![scanner::find_run(&data_dir, subject, run)?],
        _ => FileScanner::new(data_dir.clone(), ScanConfig::from(&config.scanner)).scan()?,
    };
    info!("Found {} runs under {}", files.len(), data_dir.display());

    if args.dry_run {
        return handle_dry_run(&files);
    }

    // Step 2: Check recorded hashes before trusting the images
    if config.general.validate {
        integrity::validate_data(&data_dir).context("Data validation failed")?;
        if !args.quiet {
            println!("✅ Data files match {}", integrity::HASH_LIST);
        }
    }

    // Step 3: Build the pipeline; fail fast on misconfigured steps
    let pipeline = Pipeline::with_builtins(config.pipeline.clone());
    pipeline.validate().context("Invalid pipeline configuration")?;

    if !args.quiet {
        println!("🔬 Analysing {} runs", files.len());
        println!("   Combination: {}", config.pipeline.combination);
        for step in &config.pipeline.steps {
            println!("   Step: {}", step);
        }
        println!("   Concurrency: {}", config.general.concurrency);
    }

    // Step 4: Run every scan; failures stay per scan
    let loader: Arc<dyn VolumeLoader> = Arc::new(NiftiLoader);
    let outcomes = analysis::find_outliers(
        files.into_iter().map(|f| f.path).collect(),
        Arc::new(pipeline),
        loader,
        config.general.concurrency,
        !args.quiet,
    )
    .await;

    let scans: Vec<ScanResult> = outcomes.into_iter().map(ScanResult::from).collect();

    // Step 5: Build and save the report
    let metadata = ReportMetadata {
        data_dir: data_dir.display().to_string(),
        analysis_date: Utc::now(),
        combination: config.pipeline.combination.to_string(),
        steps: config.pipeline.steps.iter().map(|s| s.to_string()).collect(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = Report::new(metadata, scans);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, MarkdownOptions::from(&config.report))
        }
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    let summary = &report.summary;
    if summary.scans_failed > 0 {
        warn!("{} of {} scans failed", summary.scans_failed, summary.scans_total);
    }

    if !args.quiet {
        println!("\n📊 Summary:");
        println!("   Scans: {} ({} failed)", summary.scans_total, summary.scans_failed);
        println!("   Scans with outliers: {}", summary.scans_with_outliers);
        println!(
            "   Outlier frames: {} of {}",
            summary.total_outliers, summary.total_timepoints
        );
        println!("   Duration: {:.1}s", report.metadata.duration_seconds);
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    if args.fail_on_outliers && summary.total_outliers > 0 {
        eprintln!(
            "\n⛔ {} outlier frame(s) found. Failing (exit code 2).",
            summary.total_outliers
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print the runs that would be analysed.
fn handle_dry_run(files: &[ScannedFile]) -> Result<i32> {
    if files.is_empty() {
        println!("   No matching functional runs found.");
    } else {
        println!("   Found {} runs that would be analysed:\n", files.len());
        for file in files {
            println!("     🧠 {} ({} bytes)", file.path.display(), file.size);
        }
    }

    println!("\n✅ Dry run complete. No images were loaded.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
