use crate::config::AppConfig;
use crate::fetcher::DirFetcher;
use crate::geo_cmd::print_breakdown;
use anyhow::{Context, Result};
use chrono::DateTime;
use clap::Parser;
use owo_colors::OwoColorize;
use recallscope_geo_indexer::{GeoCountStore, StateBreakdown};
use recallscope_records::{VehicleKey, complaints_by_state};
use recallscope_store::{DefectStore, LookupReport, LookupStatus, VehicleLookup};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct LookupArgs {
    #[arg(value_name = "YEAR")]
    pub year: String,

    #[arg(value_name = "MAKE")]
    pub make: String,

    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Directory holding recalls.json and complaints.json
    #[arg(long, value_name = "DIR")]
    pub payload_dir: PathBuf,

    /// Ignore any cached entry and fetch again
    #[arg(long)]
    pub refresh: bool,

    /// Cache database
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Offline geo index consulted when complaints carry no state
    #[arg(long, value_name = "PATH")]
    pub geo_db: Option<PathBuf>,

    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: LookupArgs, config: &AppConfig) -> Result<()> {
    let key = VehicleKey::parse(&args.year, &args.make, &args.model)?;
    let db = args.db.unwrap_or_else(|| config.store.db_path.clone());
    let store = DefectStore::open(&db).context("Failed to open cache database")?;

    let fetcher = DirFetcher::new(args.payload_dir);
    let report = VehicleLookup::new(&store, config.store.cache_ttl())
        .run(&key, &fetcher, args.refresh)
        .with_context(|| format!("Lookup failed for {key}"))?;

    let geo_db = args.geo_db.unwrap_or_else(|| config.geo.db_path.clone());
    let geo = if geo_db.is_file() {
        Some(GeoCountStore::open(&geo_db).context("Failed to open geo index")?)
    } else {
        tracing::debug!("No geo index at {}", geo_db.display());
        None
    };
    let live = complaints_by_state(&report.complaints);
    let breakdown = StateBreakdown::resolve(live, geo.as_ref(), &key)
        .context("Failed to resolve state breakdown")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report, &breakdown))?);
    } else {
        print_report(&report, &breakdown);
    }
    Ok(())
}

fn status_json(status: &LookupStatus) -> serde_json::Value {
    match status {
        LookupStatus::Ok => json!({"kind": "ok"}),
        LookupStatus::NoData => json!({"kind": "no_data"}),
        LookupStatus::FetchFailed {
            recalls,
            complaints,
        } => json!({"kind": "fetch_failed", "recalls": recalls, "complaints": complaints}),
    }
}

fn report_json(report: &LookupReport, breakdown: &StateBreakdown) -> serde_json::Value {
    json!({
        "vehicle": report.key,
        "status": status_json(&report.status),
        "from_cache": report.from_cache,
        "fetched_at": report.fetched_at.as_ref().map(DateTime::to_rfc3339),
        "recall_count": report.recall_count,
        "complaint_count": report.complaint_count,
        "complaints_flattened": report.complaints_flattened,
        "states": breakdown,
        "concentrated": breakdown.is_concentrated(),
    })
}

fn print_report(report: &LookupReport, breakdown: &StateBreakdown) {
    match &report.status {
        LookupStatus::Ok => println!("{} {}", "✓".bright_green(), report.key.bold()),
        LookupStatus::NoData => {
            println!("{} No recalls or complaints on file for {}", "✗".bright_red(), report.key);
        }
        LookupStatus::FetchFailed {
            recalls,
            complaints,
        } => {
            println!("{} Upstream lookup failed for {}", "✗".bright_red(), report.key);
            if let Some(reason) = recalls {
                println!("  Recalls: {}", reason.bright_red());
            }
            if let Some(reason) = complaints {
                println!("  Complaints: {}", reason.bright_red());
            }
        }
    }

    let source = if report.from_cache { "cache" } else { "fetch" };
    match report.fetched_at {
        Some(at) => println!("  Source: {source} ({})", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("  Source: {source} (not cached)"),
    }
    println!("  Recalls: {}", report.recall_count.bright_cyan());
    println!("  Complaints: {}", report.complaint_count.bright_cyan());
    println!("  Flattened: {}", report.complaints_flattened.bright_cyan());

    if !breakdown.counts.is_empty() {
        println!("\nComplaints by state ({:?}):", breakdown.source);
        print_breakdown(breakdown);
    }
}
