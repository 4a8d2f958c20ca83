use crate::config::AppConfig;
use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use recallscope_records::VehicleKey;
use recallscope_store::{ComplaintFlattener, DefectStore};
use recallscope_symptom_search::{RankMode, SearchHit, SymptomRanker};
use std::path::PathBuf;

const SUMMARY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Parser)]
pub struct SearchArgs {
    #[arg(value_name = "YEAR")]
    pub year: String,

    #[arg(value_name = "MAKE")]
    pub make: String,

    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Free-text symptom query
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Cache database holding flattened complaints
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print JSON instead of a list
    #[arg(long)]
    pub json: bool,

    /// Show full narratives
    #[arg(short, long)]
    pub full: bool,
}

pub fn run(args: SearchArgs, config: &AppConfig) -> Result<()> {
    let key = VehicleKey::parse(&args.year, &args.make, &args.model)?;
    let db = args.db.unwrap_or_else(|| config.store.db_path.clone());
    let store = DefectStore::open(&db).context("Failed to open cache database")?;

    let rows = ComplaintFlattener::new(&store)
        .complaints_for(&key)
        .context("Failed to load flattened complaints")?;

    if rows.is_empty() && !args.json {
        println!(
            "{} No flattened complaints for {key}. Run 'recallscope lookup' first.",
            "✗".bright_red()
        );
        return Ok(());
    }

    let ranker = SymptomRanker::new(config.search.clone()).context("Invalid search settings")?;
    let results = match args.limit {
        Some(limit) => ranker.rank(&rows, &args.query, limit),
        None => ranker.search(&rows, &args.query),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No complaints match '{}'", "✗".bright_red(), args.query);
        return Ok(());
    }

    match results.mode {
        RankMode::Ranked => println!(
            "{} {} of {} complaints match {:?}\n",
            "✓".bright_green(),
            results.total_matches.to_string().bright_cyan(),
            rows.len(),
            results.terms
        ),
        RankMode::Unranked => println!(
            "{} Query has no searchable terms; showing {} complaints in stored order\n",
            "!".bright_yellow(),
            results.len()
        ),
    }

    for hit in &results.hits {
        print_hit(hit, args.full);
    }
    Ok(())
}

fn print_hit(hit: &SearchHit, full: bool) {
    let row = &hit.complaint;
    let filed = row
        .date_filed
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let state = row.state.as_deref().unwrap_or("--");

    let mut flags = Vec::new();
    if row.deaths > 0 {
        flags.push(format!("deaths={}", row.deaths));
    }
    if row.injuries > 0 {
        flags.push(format!("injuries={}", row.injuries));
    }
    if row.fire {
        flags.push("fire".to_string());
    }
    if row.crash {
        flags.push("crash".to_string());
    }

    println!(
        "{}. {} {} {} [score {}] {}",
        (hit.rank + 1).to_string().bright_cyan(),
        row.record_id.bold(),
        filed,
        state,
        hit.score,
        flags.join(" ").bright_red()
    );
    if !row.components.is_empty() {
        println!("   {}", row.components.dimmed());
    }

    let summary = if full || row.summary.chars().count() <= SUMMARY_PREVIEW_CHARS {
        row.summary.clone()
    } else {
        let cut: String = row.summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
        format!("{cut}...")
    };
    println!("   {summary}\n");
}
