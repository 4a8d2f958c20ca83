use crate::config::AppConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use recallscope_geo_indexer::{
    GeoCountStore, GeoIndexBuilder, IngestPhase, IngestProgress, ProgressCallback, StateBreakdown,
};
use recallscope_records::VehicleKey;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
pub struct GeoCli {
    #[command(subcommand)]
    pub command: GeoCommand,
}

#[derive(Debug, Subcommand)]
pub enum GeoCommand {
    /// Build (or add to) the offline state-count index from the flat dump
    Build(BuildArgs),

    /// Show per-state complaint counts for a vehicle from the offline index
    States(StatesArgs),

    /// List model spellings stored for a year and make
    Variants(VariantsArgs),
}

#[derive(Debug, Parser)]
pub struct BuildArgs {
    /// Tab-delimited complaint dump
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Index database to write
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Rows per chunk
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Suppress per-chunk progress lines
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Parser)]
pub struct StatesArgs {
    #[arg(value_name = "YEAR")]
    pub year: String,

    #[arg(value_name = "MAKE")]
    pub make: String,

    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Index database to read
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct VariantsArgs {
    #[arg(value_name = "YEAR")]
    pub year: String,

    #[arg(value_name = "MAKE")]
    pub make: String,

    /// Number of spellings to list
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    /// Index database to read
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl GeoCli {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        match self.command {
            GeoCommand::Build(args) => run_build(args, config),
            GeoCommand::States(args) => run_states(args, config),
            GeoCommand::Variants(args) => run_variants(args, config),
        }
    }
}

fn run_build(args: BuildArgs, config: &AppConfig) -> Result<()> {
    let mut geo = config.geo.clone();
    if let Some(input) = args.input {
        geo.input_path = input;
    }
    if let Some(db) = args.db {
        geo.db_path = db;
    }
    if let Some(chunk_size) = args.chunk_size {
        geo.chunk_size = chunk_size;
    }

    println!(
        "{} Building geo index from {}",
        "▶".bright_blue(),
        geo.input_path.display()
    );
    println!(
        "{} Index will be stored at {}",
        "▶".bright_blue(),
        geo.db_path.display()
    );

    let store = GeoCountStore::open(&geo.db_path).context("Failed to open geo index")?;
    let builder = GeoIndexBuilder::new(geo, &store).context("Invalid geo index settings")?;

    let progress: Option<ProgressCallback> = if args.quiet {
        None
    } else {
        Some(Arc::new(|p: IngestProgress| {
            if p.phase == IngestPhase::Committing {
                eprintln!("  chunk {} committed ({} rows read)", p.chunk, p.rows_read);
            }
        }))
    };

    let stats = builder.build(progress).context("Failed to build geo index")?;

    println!("\n{} Geo index build complete", "✓".bright_green());
    println!("  Chunks: {}", stats.chunks.bright_cyan());
    println!("  Rows read: {}", stats.rows_read.bright_cyan());
    println!("  Rows kept: {}", stats.rows_kept.bright_cyan());
    println!("  Rows rejected: {}", stats.rows_rejected.bright_cyan());
    println!("  Lines skipped: {}", stats.lines_skipped.bright_cyan());
    println!("  Groups upserted: {}", stats.groups_upserted.bright_cyan());

    Ok(())
}

/// Open an existing index; reading never creates one.
pub(crate) fn open_existing_index(path: &Path) -> Result<GeoCountStore> {
    if !path.is_file() {
        anyhow::bail!(
            "Geo index not found at {}. Run 'recallscope geo build' first.",
            path.display()
        );
    }
    GeoCountStore::open(path).context("Failed to open geo index")
}

fn run_states(args: StatesArgs, config: &AppConfig) -> Result<()> {
    let key = VehicleKey::parse(&args.year, &args.make, &args.model)?;
    let db = args.db.unwrap_or_else(|| config.geo.db_path.clone());
    let store = open_existing_index(&db)?;

    let breakdown = StateBreakdown::resolve(Vec::new(), Some(&store), &key)
        .context("Failed to query geo index")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    if breakdown.counts.is_empty() {
        println!("{} No indexed complaints for {key}", "✗".bright_red());
        return Ok(());
    }

    print_breakdown(&breakdown);
    Ok(())
}

pub(crate) fn print_breakdown(breakdown: &StateBreakdown) {
    let total = breakdown.total();
    println!("{:<6} {:>8} {:>7}", "State".bold(), "Count".bold(), "Share".bold());
    for row in &breakdown.counts {
        let share = row.count as f64 * 100.0 / total as f64;
        println!("{:<6} {:>8} {:>6.1}%", row.state, row.count, share);
    }
    println!("{:<6} {:>8}", "Total", total.bright_cyan());

    if let Some(peak) = breakdown.peak().filter(|_| breakdown.is_concentrated()) {
        println!(
            "\n{} Complaints are concentrated in {} ({} of {total})",
            "!".bright_yellow(),
            peak.state.bright_yellow(),
            peak.count
        );
    }
}

fn run_variants(args: VariantsArgs, config: &AppConfig) -> Result<()> {
    let (year, make) = VehicleKey::parse_make(&args.year, &args.make)?;
    let db = args.db.unwrap_or_else(|| config.geo.db_path.clone());
    let store = open_existing_index(&db)?;

    let variants = store
        .model_variants(&year.to_string(), &make, args.limit)
        .context("Failed to query geo index")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    if variants.is_empty() {
        println!("{} No indexed models for {year} {make}", "✗".bright_red());
        return Ok(());
    }

    for variant in &variants {
        println!("{:>8}  {}", variant.total.bright_cyan(), variant.model_text);
    }
    Ok(())
}
