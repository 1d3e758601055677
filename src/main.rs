use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use txn_integrity::{
    load_csv, order_level_defaults, screen_table, InputFingerprint, Reconciler, RunEnvelope,
    Settings, Table, Validator,
};

/// Validate transaction exports and reconcile them against a second source
#[derive(Debug, Parser)]
#[command(name = "txn-integrity", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a transaction CSV row by row
    Validate {
        input: PathBuf,

        /// JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Drop flagged transactions before validating
        #[arg(long)]
        screen: bool,

        /// Input has one row per order; fill in the line-item columns
        #[arg(long)]
        order_level: bool,

        /// Where to write valid records (.json, otherwise CSV)
        #[arg(long)]
        valid_out: Option<PathBuf>,

        /// Where to write rejected rows (.json, otherwise CSV)
        #[arg(long)]
        invalid_out: Option<PathBuf>,
    },

    /// Compare two sources at order level
    Reconcile {
        left: PathBuf,
        right: PathBuf,

        /// JSON settings file with a "reconciliation" section
        #[arg(long)]
        config: PathBuf,

        /// Where to write the report; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate {
            input,
            config,
            screen,
            order_level,
            valid_out,
            invalid_out,
        } => run_validate(
            &input,
            config.as_deref(),
            screen,
            order_level,
            valid_out.as_deref(),
            invalid_out.as_deref(),
        ),
        Command::Reconcile {
            left,
            right,
            config,
            output,
        } => run_reconcile(&left, &right, &config, output.as_deref()),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => Settings::from_file(p),
        None => Ok(Settings::default()),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Write rows as pretty JSON when the path ends in `.json`, CSV otherwise
fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if is_json(path) {
        let json = serde_json::to_string_pretty(rows)?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    } else {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(())
}

fn run_validate(
    input: &Path,
    config: Option<&Path>,
    screen: bool,
    order_level: bool,
    valid_out: Option<&Path>,
    invalid_out: Option<&Path>,
) -> Result<()> {
    let mut settings = load_settings(config)?;
    if order_level {
        // Entries from the settings file take precedence
        for (column, default) in order_level_defaults() {
            settings.validation.column_defaults.entry(column).or_insert(default);
        }
    }

    println!("📂 Loading {}...", input.display());
    let mut table = load_csv(input)?;
    settings.validation.prepare(&mut table);
    println!("✓ Loaded {} rows", table.len());

    if screen {
        let screened = screen_table(&table, settings.validation.tolerance);
        println!("\n🧹 Pre-screen");
        println!("   kept: {} rows", screened.kept.len());
        println!("   excluded: {} rows", screened.excluded.len());
        for (reason, count) in screened.reason_counts() {
            println!("     - {}: {}", reason.label(), count);
        }
        table = screened.kept;
    }

    let validator = Validator::with_tolerance(settings.validation.tolerance);
    let outcome = validator.validate_table(&table);
    let summary = outcome.summary();

    println!("\n✅ Validation");
    println!("   {}", summary.summary());

    let stats = outcome.stats();
    if !stats.is_empty() {
        println!("\n📊 Errors by type");
        for stat in &stats {
            println!("   {:>6}  {}", stat.count, stat.error_type);
        }
    }

    if let Some(path) = valid_out {
        let records: Vec<_> = outcome.records().cloned().collect();
        write_rows(path, &records)?;
        println!("\n💾 Wrote {} valid records to {}", records.len(), path.display());
    }

    if let Some(path) = invalid_out {
        write_rows(path, &outcome.invalid)?;
        println!("💾 Wrote {} invalid rows to {}", outcome.invalid.len(), path.display());
    }

    Ok(())
}

fn run_reconcile(left_path: &Path, right_path: &Path, config: &Path, output: Option<&Path>) -> Result<()> {
    let settings = Settings::from_file(config)?;
    let reconciler = Reconciler::new(settings.reconciliation()?.clone())?;

    let left: Table = load_csv(left_path)?;
    let right: Table = load_csv(right_path)?;

    let report = reconciler.reconcile(&left, &right)?;

    let envelope = RunEnvelope::new(
        vec![
            InputFingerprint::of(left_path.display().to_string(), &left),
            InputFingerprint::of(right_path.display().to_string(), &right),
        ],
        &report,
    );
    let json = envelope.to_json()?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            println!("⚖️  {}", report.summary());
            for group in report.top_groups(5) {
                println!(
                    "   {:<12} {:>12.2} {:>12.2}  diff {:.2}",
                    group.group, group.left_value, group.right_value, group.absolute_difference
                );
            }
            println!("💾 Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
