//! # planlevel-import
//!
//! The input table builder: turns a production-plan spreadsheet (or CSV
//! export of one) into a validated [`Plan`].
//!
//! The importer owns everything the engine must not care about: sheet
//! geometry, row filtering, cell normalization, and the restricted-day flag.
//! Non-numeric or missing demand cells become zero, negative quantities are
//! clamped to zero, fractional quantities are floored (they are batch
//! counts), and a day is marked restricted exactly once here, never by label
//! inspection downstream.
//!
//! ## Example
//!
//! ```rust,ignore
//! use planlevel_import::{read_plan, SheetLayout};
//!
//! let plan = read_plan("weekly_plan.xlsx", &SheetLayout::default())?;
//! ```

mod reader;

use chrono::{Datelike, NaiveDate, Weekday};
use planlevel_core::{Day, Plan, ProductRow, Qty};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Layout
// ============================================================================

/// Geometry and filtering rules of the input sheet.
///
/// The defaults mirror the plan workbook this tool was built around: eleven
/// preamble rows, product name in the first column, batch unit in the third,
/// and 28 demand columns starting at column G.
#[derive(Clone, Debug)]
pub struct SheetLayout {
    /// Sheet to read; first sheet when `None` (xlsx only)
    pub sheet: Option<String>,
    /// Rows to skip before the data block
    pub skip_rows: usize,
    /// Absolute row index holding day labels; labels are synthesized
    /// (`D1`, `D2`, ...) when `None`
    pub label_row: Option<usize>,
    /// Column with the product identifier
    pub id_col: usize,
    /// Column with the batch unit
    pub unit_col: usize,
    /// First demand column (inclusive)
    pub demand_start: usize,
    /// Last demand column (exclusive)
    pub demand_end: usize,
    /// Keep only rows whose id contains one of these; empty keeps every row
    /// with a non-empty id
    pub keywords: Vec<String>,
    /// Substrings marking a label as a non-working day, used when the label
    /// is not a parseable date
    pub weekend_markers: Vec<String>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet: None,
            skip_rows: 11,
            label_row: None,
            id_col: 0,
            unit_col: 2,
            demand_start: 6,
            demand_end: 34,
            keywords: vec!["FAN".into(), "FLANGE".into()],
            weekend_markers: vec!["SAT".into(), "SUN".into(), "토".into(), "일".into()],
        }
    }
}

impl SheetLayout {
    /// Number of demand columns, i.e. the day horizon
    pub fn horizon(&self) -> usize {
        self.demand_end.saturating_sub(self.demand_start)
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Read a plan file, dispatching on its extension (.xlsx or .csv).
pub fn read_plan(path: impl AsRef<Path>, layout: &SheetLayout) -> Result<Plan, ImportError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let grid = match ext.as_str() {
        "xlsx" | "xls" => reader::read_xlsx(path, layout.sheet.as_deref())?,
        "csv" => reader::read_csv(path)?,
        _ => return Err(ImportError::UnsupportedFormat(ext)),
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plan")
        .to_string();

    build_plan(name, &grid, layout)
}

/// Build a validated plan from a raw string grid.
pub fn build_plan(
    name: impl Into<String>,
    grid: &[Vec<String>],
    layout: &SheetLayout,
) -> Result<Plan, ImportError> {
    if layout.horizon() == 0 {
        return Err(ImportError::BadLayout(
            "demand column range is empty".into(),
        ));
    }
    if grid.len() <= layout.skip_rows {
        return Err(ImportError::EmptyInput(format!(
            "{} rows present, {} skipped by layout",
            grid.len(),
            layout.skip_rows
        )));
    }

    let mut plan = Plan::new(name);
    plan.days = build_days(grid, layout);

    for raw in &grid[layout.skip_rows..] {
        let id = cell(raw, layout.id_col);
        if id.is_empty() {
            continue;
        }
        if !layout.keywords.is_empty() && !layout.keywords.iter().any(|k| id.contains(k.as_str())) {
            continue;
        }

        let unit = parse_qty(cell(raw, layout.unit_col));
        let demand: Vec<Qty> = (layout.demand_start..layout.demand_end)
            .map(|col| parse_qty(cell(raw, col)))
            .collect();

        plan.rows.push(ProductRow {
            id: id.to_string(),
            unit,
            demand,
        });
    }

    if plan.rows.is_empty() {
        return Err(ImportError::NoMatchingRows(layout.keywords.join(", ")));
    }

    plan.validate()?;
    debug!(
        rows = plan.rows.len(),
        days = plan.horizon(),
        "plan imported"
    );
    Ok(plan)
}

// ============================================================================
// Cell normalization
// ============================================================================

fn cell<'a>(row: &'a [String], col: usize) -> &'a str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Normalize one quantity cell: non-numeric and missing become 0, negatives
/// are clamped to 0, fractional values are floored to whole batch counts.
fn parse_qty(raw: &str) -> Qty {
    let cleaned = raw.trim().replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.floor() as Qty,
        _ => 0,
    }
}

// ============================================================================
// Day construction
// ============================================================================

fn build_days(grid: &[Vec<String>], layout: &SheetLayout) -> Vec<Day> {
    let labels: Vec<String> = match layout.label_row.and_then(|r| grid.get(r)) {
        Some(row) => (layout.demand_start..layout.demand_end)
            .map(|col| cell(row, col).to_string())
            .collect(),
        None => (1..=layout.horizon()).map(|i| format!("D{i}")).collect(),
    };

    labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| day_from_label(index, label, &layout.weekend_markers))
        .collect()
}

/// Build one day, computing the restricted flag exactly once.
///
/// Labels that parse as calendar dates are restricted on weekends; other
/// labels are restricted when they contain a weekend marker substring.
fn day_from_label(index: usize, label: String, markers: &[String]) -> Day {
    if let Some(date) = parse_date(&label) {
        let mut day = Day::from_date(index, date);
        day.label = label;
        return day;
    }

    let upper = label.to_uppercase();
    let restricted = markers
        .iter()
        .any(|m| upper.contains(&m.to_uppercase()));

    let mut day = Day::new(index, label);
    if restricted {
        day = day.restricted();
    }
    day
}

fn parse_date(label: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(label.trim(), fmt).ok())
}

// ============================================================================
// Errors
// ============================================================================

/// Import error: anything that prevents building a complete plan.
///
/// Import fails fast; no partial plan is ever produced.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format '{0}' (expected .xlsx, .xls, or .csv)")]
    UnsupportedFormat(String),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is empty: {0}")]
    EmptyInput(String),

    #[error("no rows matched the filter [{0}]")]
    NoMatchingRows(String),

    #[error("bad layout: {0}")]
    BadLayout(String),

    #[error(transparent)]
    Plan(#[from] planlevel_core::PlanError),
}

// ============================================================================
// Tests
// ============================================================================
