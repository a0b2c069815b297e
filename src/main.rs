//! tidytree - Main entry point
//!
//! Thin CLI over the mutation engine: reads a classifier-produced
//! operations document, plans it against the discovered repositories, and
//! applies or previews it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tidytree::backup::BackupStore;
use tidytree::config::Config;
use tidytree::executor::Executor;
use tidytree::ops::{self, Operation};
use tidytree::repo::{self, ScanOptions};
use tidytree::utils;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover version-control roots under a directory
    Scan {
        /// Directory to scan
        path: PathBuf,
    },

    /// Plan an operations document and apply it
    Apply {
        /// Scan root the operations belong to
        path: PathBuf,

        /// Operations JSON document produced by a classifier
        #[arg(long, value_name = "FILE")]
        ops: PathBuf,

        /// Report what would happen without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },

    /// List backup manifests, newest first
    Backups {
        /// Scan root whose backup store to list
        path: PathBuf,
    },

    /// Restore every file recorded in a backup manifest
    Restore {
        /// Scan root whose backup store to use
        path: PathBuf,

        /// Manifest identifier, as printed by `backups`
        manifest_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    match args.command {
        Command::Scan { path } => scan(&path, &config),
        Command::Apply {
            path,
            ops,
            dry_run,
        } => apply(&path, &ops, dry_run, &config).await,
        Command::Backups { path } => list_backups(&path, &config).await,
        Command::Restore { path, manifest_id } => restore(&path, &manifest_id, &config).await,
    }
}

fn scan_options(config: &Config) -> ScanOptions {
    ScanOptions {
        exclude: config.scan.exclude.clone(),
    }
}

fn scan(path: &Path, config: &Config) -> Result<()> {
    let found = repo::discover_with_options(path, &scan_options(config))?;

    if found.repositories.is_empty() {
        println!("No repositories found under {}", path.display());
        return Ok(());
    }

    for r in &found.repositories {
        let marker = if r.is_root { " (root)" } else { "" };
        println!("{}{}", r.path.display(), marker);
    }
    if found.multiple {
        println!(
            "\n{} independent repositories; cross-boundary moves are restricted",
            found.repositories.len()
        );
    }
    Ok(())
}

async fn apply(path: &Path, ops_file: &Path, dry_run: bool, config: &Config) -> Result<()> {
    let found = repo::discover_with_options(path, &scan_options(config))?;

    let doc = std::fs::read_to_string(ops_file)
        .with_context(|| format!("Failed to read operations from {}", ops_file.display()))?;
    let raw: Vec<Operation> = serde_json::from_str(&doc)
        .with_context(|| format!("Invalid operations document {}", ops_file.display()))?;
    let proposed = raw.len();

    let plan = ops::build_plan(raw, &found.repositories);
    for warning in &plan.warnings {
        println!("warning: {warning}");
    }
    let dropped = proposed - plan.operations.len();
    if dropped > 0 {
        println!("{dropped} of {proposed} proposals dropped during planning");
    }
    if plan.operations.is_empty() {
        println!("Nothing to do");
        return Ok(());
    }
    println!(
        "Applying {} operations (~{}s){}",
        plan.operations.len(),
        plan.estimated_secs,
        if dry_run { " [dry run]" } else { "" }
    );

    let store = BackupStore::new(config.backup_dir(path));
    let result = Executor::new(&store)
        .with_dry_run(dry_run)
        .execute(&plan)
        .await?;

    println!(
        "{} completed, {} failed",
        result.completed, result.failed
    );
    if let Some(id) = &result.manifest_id {
        println!("Backup manifest: {id} (restore with `tidytree restore`)");
    }
    for error in &result.errors {
        eprintln!("error: {error}");
    }
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn list_backups(path: &Path, config: &Config) -> Result<()> {
    let store = BackupStore::new(config.backup_dir(path));
    let manifests = store.list_backups().await?;

    if manifests.is_empty() {
        println!("No backups");
        return Ok(());
    }
    for m in manifests {
        println!(
            "{}  {}  {} entries",
            m.id,
            m.created_at.to_rfc3339(),
            m.entries.len()
        );
    }
    Ok(())
}

async fn restore(path: &Path, manifest_id: &str, config: &Config) -> Result<()> {
    let store = BackupStore::new(config.backup_dir(path));
    let report = store.restore(manifest_id).await?;

    println!("{} files restored", report.restored);
    for failure in &report.failures {
        eprintln!("error: {failure}");
    }
    if !report.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
