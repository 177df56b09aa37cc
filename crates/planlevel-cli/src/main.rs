//! planlevel CLI - Capacity-Constrained Plan Leveling
//!
//! Command-line interface for importing, leveling, and exporting
//! production plans.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use planlevel_core::{Leveler, LevelingConfig, Renderer, SpreadMode};
use planlevel_engine::{achievement, overloaded_days, utilization, WindowLeveler};
use planlevel_import::{read_plan, SheetLayout};
use planlevel_render::{ExcelRenderer, TextRenderer};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "planlevel")]
#[command(author, version, about = "Capacity-constrained production plan leveling", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import and validate a plan file
    Check {
        /// Input file path (.xlsx or .csv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Level a plan against a daily capacity
    Level {
        /// Input file path (.xlsx or .csv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Shared daily capacity
        #[arg(short, long, default_value_t = 3300)]
        capacity: i64,

        /// Distribution strategy (even, greedy)
        #[arg(short, long, default_value = "greedy")]
        mode: String,

        /// Lookback window in days
        #[arg(short, long, default_value_t = 4)]
        window: usize,

        /// Output format (text, json, xlsx)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified; required for xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Echo the input demand table in text output
        #[arg(long)]
        show_input: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Sheet geometry overrides, defaults matching the standard plan workbook
#[derive(Args)]
struct LayoutArgs {
    /// Worksheet name (xlsx only; first sheet if omitted)
    #[arg(long)]
    sheet: Option<String>,

    /// Rows to skip before the data block
    #[arg(long, default_value_t = 11)]
    skip_rows: usize,

    /// Row index holding day labels (labels D1, D2, ... if omitted)
    #[arg(long)]
    label_row: Option<usize>,

    /// Column holding the product identifier
    #[arg(long, default_value_t = 0)]
    id_col: usize,

    /// Column holding the batch unit
    #[arg(long, default_value_t = 2)]
    unit_col: usize,

    /// First demand column (inclusive)
    #[arg(long, default_value_t = 6)]
    demand_start: usize,

    /// Last demand column (exclusive)
    #[arg(long, default_value_t = 34)]
    demand_end: usize,

    /// Keep only rows whose id contains KEYWORD (repeatable)
    #[arg(long = "filter", value_name = "KEYWORD")]
    filters: Vec<String>,

    /// Keep every row with a non-empty id
    #[arg(long)]
    no_filter: bool,
}

impl LayoutArgs {
    fn to_layout(&self) -> SheetLayout {
        let keywords = if self.no_filter {
            Vec::new()
        } else if self.filters.is_empty() {
            SheetLayout::default().keywords
        } else {
            self.filters.clone()
        };

        SheetLayout {
            sheet: self.sheet.clone(),
            skip_rows: self.skip_rows,
            label_row: self.label_row,
            id_col: self.id_col,
            unit_col: self.unit_col,
            demand_start: self.demand_start,
            demand_end: self.demand_end,
            keywords,
            ..SheetLayout::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Check { file, layout }) => check(&file, &layout),
        Some(Commands::Level {
            file,
            capacity,
            mode,
            window,
            format,
            output,
            show_input,
            layout,
        }) => level(
            &file, capacity, &mode, window, &format, output, show_input, &layout,
        ),
        None => {
            println!("planlevel - Capacity-Constrained Plan Leveling");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

fn check(file: &Path, layout: &LayoutArgs) -> Result<()> {
    let plan = read_plan(file, &layout.to_layout())
        .with_context(|| format!("failed to import {}", file.display()))?;

    let restricted = plan.days.iter().filter(|d| d.restricted).count();
    println!("Plan: {}", plan.name);
    println!("Rows: {}", plan.rows.len());
    println!("Days: {} ({} restricted)", plan.horizon(), restricted);
    println!("Total demand: {}", plan.total_demand());
    for row in &plan.rows {
        println!("  {}  unit {}  demand {}", row.id, row.effective_unit(), row.total_demand());
    }
    println!("OK");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn level(
    file: &Path,
    capacity: i64,
    mode: &str,
    window: usize,
    format: &str,
    output: Option<PathBuf>,
    show_input: bool,
    layout: &LayoutArgs,
) -> Result<()> {
    let plan = read_plan(file, &layout.to_layout())
        .with_context(|| format!("failed to import {}", file.display()))?;

    let config = LevelingConfig::new(capacity)
        .mode(parse_mode(mode)?)
        .window(window);
    let allocation = WindowLeveler::new().level(&plan, &config)?;

    for over in overloaded_days(&plan, &allocation, capacity) {
        tracing::warn!(
            day = %over.label,
            total = over.total,
            capacity = over.capacity,
            "day total exceeds capacity"
        );
    }

    match format {
        "text" => {
            let mut renderer = TextRenderer::new(capacity);
            if show_input {
                renderer = renderer.with_input();
            }
            let report = renderer.render(&plan, &allocation)?;
            emit(output, report.as_bytes())
        }
        "json" => {
            let report = serde_json::json!({
                "plan": plan.name,
                "capacity": config.daily_capacity,
                "mode": config.mode.to_string(),
                "window": config.window,
                "days": plan.days.iter().map(|d| &d.label).collect::<Vec<_>>(),
                "rows": plan.rows.iter().zip(&allocation.rows).map(|(row, alloc)| {
                    serde_json::json!({
                        "id": row.id,
                        "unit": row.effective_unit(),
                        "demand": row.demand,
                        "allocated": alloc.cells,
                    })
                }).collect::<Vec<_>>(),
                "day_totals": allocation.day_totals(),
                "utilization": utilization(&plan, &allocation, capacity),
                "achievement": achievement(&plan, &allocation),
                "overloaded_days": overloaded_days(&plan, &allocation, capacity),
            });
            let text = serde_json::to_string_pretty(&report)?;
            emit(output, text.as_bytes())
        }
        "xlsx" => {
            let Some(path) = output else {
                bail!("xlsx output is binary, pass --output FILE");
            };
            let bytes = ExcelRenderer::new(capacity).render(&plan, &allocation)?;
            std::fs::write(&path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        other => bail!("unknown format '{other}' (expected text, json, or xlsx)"),
    }
}

fn parse_mode(mode: &str) -> Result<SpreadMode> {
    match mode {
        "even" => Ok(SpreadMode::EvenSplit),
        "greedy" => Ok(SpreadMode::MostAvailable),
        other => bail!("unknown mode '{other}' (expected 'even' or 'greedy')"),
    }
}

fn emit(output: Option<PathBuf>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", String::from_utf8_lossy(bytes));
            Ok(())
        }
    }
}
