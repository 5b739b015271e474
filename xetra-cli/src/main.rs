//! Xetra CLI — daily report runs and report inspection.
//!
//! Commands:
//! - `run`: build the daily report for a target date and write it
//! - `partitions`: print the source keys a run would read
//! - `reports list`: list report objects in the target store
//! - `reports show`: decode a report and print it as a table

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xetra_core::data::decode_report;
use xetra_core::{select_date_range, DailyReport, ObjectStore};
use xetra_runner::{dry_run, run_etl, source_partitions, Loader, RunConfig, RunSummary};

#[derive(Parser)]
#[command(
    name = "xetra",
    about = "Xetra CLI — daily per-security price reports from tick data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the daily report and write it to the target store.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Target date, overriding the config (source date format).
        #[arg(long)]
        date: Option<String>,

        /// Run extract and transform but skip the write.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Print the run summary as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the source partitions a run would read.
    Partitions {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Explicit dates instead of the look-back range. Repeatable.
        #[arg(long = "date")]
        dates: Vec<String>,
    },
    /// Report inspection commands.
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
}

#[derive(Subcommand)]
enum ReportsAction {
    /// List report objects in the target store.
    List {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Decode a report and print it as a table.
    Show {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Report key in the target store.
        key: String,

        /// Print at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            date,
            dry_run,
            json,
        } => run_report(&config, date.as_deref(), dry_run, json),
        Commands::Partitions { config, dates } => run_partitions(&config, &dates),
        Commands::Reports { action } => match action {
            ReportsAction::List { config } => run_reports_list(&config),
            ReportsAction::Show { config, key, limit } => run_reports_show(&config, &key, limit),
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path, date: Option<&str>) -> Result<RunConfig> {
    let config = RunConfig::from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    match date {
        Some(d) => Ok(config.with_target_date(d)?),
        None => Ok(config),
    }
}

fn run_report(config_path: &Path, date: Option<&str>, dry: bool, json: bool) -> Result<()> {
    let config = load_config(config_path, date)?;
    let source = config.source.open();

    let summary = if dry {
        dry_run(&config, &source)?
    } else {
        let target = config.target.open();
        let run_at = chrono::Local::now().naive_local();
        run_etl(&config, &source, &target, run_at)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn run_partitions(config_path: &Path, dates: &[String]) -> Result<()> {
    let config = load_config(config_path, None)?;
    let source = config.source.open();

    let keys = if dates.is_empty() {
        source_partitions(&config, &source)?
    } else {
        let catalog = source.list("").context("listing source store")?;
        select_date_range(dates, &config.source_date_format, &catalog)?
    };

    if keys.is_empty() {
        println!("No eligible partitions in {}", source.name());
        return Ok(());
    }
    for key in &keys {
        println!("{key}");
    }
    eprintln!("{} partition(s)", keys.len());
    Ok(())
}

fn run_reports_list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path, None)?;
    let target = config.target.open();
    let keys = Loader::new(&target, &config.report)
        .list_reports()
        .context("listing target store")?;

    if keys.is_empty() {
        println!("No reports in {}", target.name());
        return Ok(());
    }

    for key in &keys {
        println!("{key}");
    }
    println!();
    println!("Total: {} report(s)", keys.len());
    Ok(())
}

fn run_reports_show(config_path: &Path, key: &str, limit: Option<usize>) -> Result<()> {
    let config = load_config(config_path, None)?;
    let target = config.target.open();
    let bytes = target
        .get(key)
        .with_context(|| format!("reading report '{key}'"))?;
    let report = decode_report(&bytes).with_context(|| format!("decoding report '{key}'"))?;
    print_report(&report, limit);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Daily Report Run ===");
    println!("Target date:    {}", summary.target_date);
    println!("Partitions:     {}", summary.partitions);
    println!("Tick rows:      {}", summary.stats.rows_in);
    println!("Ticks kept:     {}", summary.stats.rows_in - summary.stats.rows_dropped);
    println!("Report rows:    {}", summary.stats.rows_out);
    println!("Content hash:   {}", summary.report_hash);
    match &summary.report_key {
        Some(key) => println!("Written to:     {key}"),
        None => println!("Written to:     (dry run, nothing written)"),
    }
    println!();
}

fn print_report(report: &DailyReport, limit: Option<usize>) {
    if report.is_empty() {
        println!("Empty report.");
        return;
    }

    println!(
        "{:<14} {:<10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>9}",
        "ISIN", "Date", "Open", "Close", "Min", "Max", "Volume", "Chg %"
    );
    println!("{}", "-".repeat(92));

    let shown = limit.unwrap_or(report.len()).min(report.len());
    for row in report.rows().iter().take(shown) {
        let change = row
            .change_prev_closing_pct
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<14} {:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12} {:>9}",
            row.isin,
            row.date,
            row.opening_price_eur,
            row.closing_price_eur,
            row.minimum_price_eur,
            row.maximum_price_eur,
            row.daily_traded_volume,
            change
        );
    }

    println!();
    if shown < report.len() {
        println!("Showing {shown} of {} rows", report.len());
    } else {
        println!("{} rows", report.len());
    }
    if let Some((first, last)) = report.date_range() {
        println!("Dates: {first} to {last}, {} securities", report.isins().len());
    }
}
