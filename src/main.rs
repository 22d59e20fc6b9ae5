//! Doctor Harvest main entry point
//!
//! This is the command-line interface for the Doctor Harvest crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use doctor_harvest::config::{load_config_with_hash, Config};
use doctor_harvest::crawler::{backfill_images, known_links, Harvester, Orchestrator, Replayer};
use doctor_harvest::output::{
    aggregate, check_duplicates, combine, default_aggregate_path, default_combined_path,
    load_statistics, print_statistics, strip_call_now,
};
use doctor_harvest::render::HttpRenderer;
use doctor_harvest::storage::{load_catalog, read_checkpoint};
use doctor_harvest::TaskLimiter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Doctor Harvest: a checkpointed crawler for medical-directory sites
///
/// Doctor Harvest discovers the departments of each configured district,
/// harvests every doctor profile with its photo, and keeps durable queues of
/// whatever failed so it can be replayed later.
#[derive(Parser, Debug)]
#[command(name = "doctor-harvest")]
#[command(version)]
#[command(about = "Doctor directory harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover departments for every configured district and save the catalog
    Discover,

    /// Harvest every department in the saved catalog
    Crawl {
        /// Skip profiles whose link already appears in this aggregated file
        #[arg(long, value_name = "FILE")]
        unique_against: Option<PathBuf>,
    },

    /// Re-harvest the profiles in the link-error queue
    ReplayLinks,

    /// Re-acquire the photos in an image-error queue
    ReplayImages {
        /// Queue to drain (defaults to the configured image-error queue)
        #[arg(long, value_name = "FILE")]
        read: Option<PathBuf>,

        /// Queue for photos that fail again (defaults to <read>-retry.json)
        #[arg(long, value_name = "FILE")]
        write: Option<PathBuf>,
    },

    /// Concatenate every checkpoint into one dataset file
    Aggregate {
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Strip leftover "Call Now" text from appointment numbers
        #[arg(long)]
        clean_appointments: bool,
    },

    /// Merge aggregated dataset files
    Combine {
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Report profiles that share a link
    Duplicates {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Re-acquire the photo of every profile in a dataset file
    BackfillImages {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Queue for photos that still fail (defaults to the configured image-error queue)
        #[arg(long, value_name = "FILE")]
        errors: Option<PathBuf>,

        /// Fetch photos that are already stored too
        #[arg(long)]
        overwrite: bool,
    },

    /// Show dataset and queue statistics
    Stats,

    /// Validate the configuration and show what would be crawled
    DryRun,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Discover => handle_discover(&config).await,
        Command::Crawl { unique_against } => handle_crawl(&config, unique_against.as_deref()).await,
        Command::ReplayLinks => handle_replay_links(&config).await,
        Command::ReplayImages { read, write } => {
            handle_replay_images(&config, read, write.as_deref()).await
        }
        Command::Aggregate {
            out,
            clean_appointments,
        } => handle_aggregate(&config, out, clean_appointments),
        Command::Combine { files, out } => handle_combine(&files, out),
        Command::Duplicates { file } => handle_duplicates(&file),
        Command::BackfillImages {
            file,
            errors,
            overwrite,
        } => handle_backfill(&config, &file, errors, overwrite).await,
        Command::Stats => handle_stats(&config),
        Command::DryRun => handle_dry_run(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doctor_harvest=info,warn"),
            1 => EnvFilter::new("doctor_harvest=debug,info"),
            2 => EnvFilter::new("doctor_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn launch_renderer(config: &Config) -> anyhow::Result<HttpRenderer> {
    HttpRenderer::launch(&config.site, &config.crawler).context("failed to start renderer")
}

async fn handle_discover(config: &Config) -> anyhow::Result<()> {
    let renderer = launch_renderer(config)?;
    let catalog = Orchestrator::new(&renderer, config)
        .discover_departments()
        .await?;

    println!(
        "✓ {} departments across {} districts saved to {}",
        catalog.department_count(),
        catalog.district_count(),
        config.output.catalog_path.display()
    );
    Ok(())
}

async fn handle_crawl(config: &Config, unique_against: Option<&Path>) -> anyhow::Result<()> {
    let catalog = load_catalog(&config.output.catalog_path).with_context(|| {
        format!(
            "no department catalog at {}; run `discover` first",
            config.output.catalog_path.display()
        )
    })?;

    let known = match unique_against {
        Some(path) => {
            let doc = read_checkpoint(path)?;
            tracing::info!("Skipping {} already-harvested profiles", doc.doctor.len());
            Some(known_links(&doc.doctor))
        }
        None => None,
    };

    tracing::info!(
        "Crawling {} departments across {} districts",
        catalog.department_count(),
        catalog.district_count()
    );

    let renderer = launch_renderer(config)?;
    let report = Orchestrator::new(&renderer, config)
        .crawl(&catalog, known.as_ref())
        .await?;

    println!(
        "✓ {} of {} profiles harvested ({} failed, {} photos queued)",
        report.total_harvested(),
        report.total_links(),
        report.total_failed(),
        report.total_images_queued()
    );
    for failed in &report.failed_departments {
        println!(
            "✗ Department skipped: {} / {} ({})",
            failed.district, failed.department, failed.link
        );
    }
    if !report.failed_districts.is_empty() {
        println!(
            "✗ Districts skipped: {}",
            report.failed_districts.join(", ")
        );
    }
    Ok(())
}

async fn handle_replay_links(config: &Config) -> anyhow::Result<()> {
    let renderer = launch_renderer(config)?;
    let report = Replayer::new(&renderer, config).replay_links().await?;

    println!(
        "✓ {} repaired, {} already present, {} still failing",
        report.repaired, report.skipped, report.requeued
    );
    Ok(())
}

async fn handle_replay_images(
    config: &Config,
    read: Option<PathBuf>,
    write: Option<&Path>,
) -> anyhow::Result<()> {
    let read = read.unwrap_or_else(|| config.output.image_errors_path.clone());
    let renderer = launch_renderer(config)?;
    let report = Replayer::new(&renderer, config)
        .replay_images(&read, write)
        .await?;

    println!(
        "✓ {} photos saved, {} still failing",
        report.repaired, report.requeued
    );
    Ok(())
}

fn handle_aggregate(
    config: &Config,
    out: Option<PathBuf>,
    clean_appointments: bool,
) -> anyhow::Result<()> {
    let out = out.unwrap_or_else(default_aggregate_path);
    let transform: Option<doctor_harvest::output::Transform<'_>> = if clean_appointments {
        Some(&strip_call_now)
    } else {
        None
    };

    let report = aggregate(&config.output.checkpoint_root, transform, &out)?;
    println!(
        "✓ {} profiles from {} files written to {}",
        report.profiles,
        report.files,
        report.path.display()
    );
    Ok(())
}

fn handle_combine(files: &[PathBuf], out: Option<PathBuf>) -> anyhow::Result<()> {
    let out = out.unwrap_or_else(default_combined_path);
    let report = combine(files, &out)?;

    println!(
        "✓ {} profiles from {} files written to {}",
        report.profiles,
        report.files,
        report.path.display()
    );
    Ok(())
}

fn handle_duplicates(file: &Path) -> anyhow::Result<()> {
    let doc = read_checkpoint(file)?;
    let report = check_duplicates(&doc.doctor);

    println!("Profiles: {}", doc.doctor.len());
    println!("Unique links: {}", report.unique.len());
    println!("Duplicates: {}", report.duplicates.len());
    for profile in &report.duplicates {
        println!("  - {} ({})", profile.name, profile.link);
    }
    Ok(())
}

async fn handle_backfill(
    config: &Config,
    file: &Path,
    errors: Option<PathBuf>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let doc = read_checkpoint(file)?;
    let errors = errors.unwrap_or_else(|| config.output.image_errors_path.clone());

    let renderer = launch_renderer(config)?;
    let harvester = Harvester::from_config(config);
    let limiter = TaskLimiter::new(config.crawler.concurrency_limit as usize);
    let report = backfill_images(
        &renderer,
        &harvester,
        &limiter,
        &doc.doctor,
        &errors,
        overwrite,
    )
    .await?;

    println!(
        "✓ {} photos saved, {} queued to {}, {} already stored",
        report.saved,
        report.queued,
        errors.display(),
        report.skipped
    );
    Ok(())
}

/// Handles the stats command: shows dataset and queue statistics
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Checkpoints: {}\n", config.output.checkpoint_root.display());
    let stats = load_statistics(&config.output)?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the dry-run command: shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Doctor Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Headless: {}", config.crawler.headless);
    println!(
        "  Blocked on profile pages: {}",
        config.crawler.profile_blocklist()
    );

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  User agent: {}", config.site.user_agent);
    println!("  Request timeout: {}s", config.site.request_timeout_secs);

    println!("\nDistricts ({}):", config.site.districts.len());
    for district in &config.site.districts {
        println!("  - {} ({})", district, config.site.district_url(district));
    }

    println!("\nOutput:");
    println!("  Checkpoints: {}", config.output.checkpoint_root.display());
    println!("  Images: {}", config.output.images_dir.display());
    println!("  Catalog: {}", config.output.catalog_path.display());
    println!(
        "  Link errors: {}",
        config.output.link_errors_path.display()
    );
    println!(
        "  Image errors: {}",
        config.output.image_errors_path.display()
    );

    println!("\n✓ Configuration is valid");
    Ok(())
}
