//! # planlevel-core
//!
//! Core domain model and traits for the planlevel leveling engine.
//!
//! This crate provides:
//! - Domain types: `Plan`, `Day`, `ProductRow`, `Allocation`, `LevelingConfig`
//! - Core traits: `Leveler`, `Renderer`
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```rust
//! use planlevel_core::{Day, Plan, ProductRow};
//!
//! let mut plan = Plan::new("week 34");
//! plan.days.push(Day::new(0, "MON"));
//! plan.days.push(Day::new(1, "TUE"));
//! plan.rows.push(ProductRow::new("FAN-630").unit(10).demand(vec![80, 0]));
//! assert!(plan.validate().is_ok());
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a product row
pub type RowId = String;

/// A quantity of product.
///
/// Quantities are integral: every allocation is a whole multiple of the
/// owning row's batch unit, so fractional amounts never survive a run.
pub type Qty = i64;

// ============================================================================
// Day
// ============================================================================

/// One calendar position in the planning horizon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// 0-based position, matches the demand column order
    pub index: usize,
    /// Display label (date or weekday text)
    pub label: String,
    /// Calendar date, when the label carried one
    pub date: Option<NaiveDate>,
    /// Non-working day: excluded from allocation under `SpreadMode::MostAvailable`
    pub restricted: bool,
}

impl Day {
    /// Create a working day with the given label
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            date: None,
            restricted: false,
        }
    }

    /// Create a day from a calendar date; weekends are restricted.
    ///
    /// The restricted flag is computed here, once, so the engine never has
    /// to inspect label text.
    pub fn from_date(index: usize, date: NaiveDate) -> Self {
        let restricted = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        Self {
            index,
            label: date.format("%Y-%m-%d").to_string(),
            date: Some(date),
            restricted,
        }
    }

    /// Mark the day as non-working (builder pattern)
    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }
}

// ============================================================================
// ProductRow
// ============================================================================

/// One demand line of the plan: a product and its per-day quantities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Unique identifier (product/line name from the input sheet)
    pub id: RowId,
    /// Minimum allocation quantum; 0 means "not set" and behaves as 1
    pub unit: Qty,
    /// Demanded quantity per day, indexed like `Plan::days`
    pub demand: Vec<Qty>,
}

impl ProductRow {
    /// Create a row with no demand and an unset unit
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unit: 0,
            demand: Vec::new(),
        }
    }

    /// Set the batch unit (builder pattern)
    pub fn unit(mut self, unit: Qty) -> Self {
        self.unit = unit;
        self
    }

    /// Set the per-day demand (builder pattern)
    pub fn demand(mut self, demand: Vec<Qty>) -> Self {
        self.demand = demand;
        self
    }

    /// Batch unit with the missing/zero fallback applied.
    ///
    /// A row without a usable unit allocates in multiples of 1.
    pub fn effective_unit(&self) -> Qty {
        if self.unit > 0 {
            self.unit
        } else {
            1
        }
    }

    /// Total demanded quantity across the horizon
    pub fn total_demand(&self) -> Qty {
        self.demand.iter().sum()
    }
}

// ============================================================================
// Plan
// ============================================================================

/// A complete input plan: the day horizon plus all product rows.
///
/// Both collections are derived once from input and treated as immutable for
/// the duration of a leveling run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Human-readable name (file stem or sheet name)
    pub name: String,
    /// Ordered day horizon
    pub days: Vec<Day>,
    /// Product rows in input order (order determines allocation priority)
    pub rows: Vec<ProductRow>,
}

impl Plan {
    /// Create an empty plan with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            days: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of days in the horizon
    pub fn horizon(&self) -> usize {
        self.days.len()
    }

    /// Get a row by ID
    pub fn get_row(&self, id: &str) -> Option<&ProductRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Total demand across all rows and days
    pub fn total_demand(&self) -> Qty {
        self.rows.iter().map(ProductRow::total_demand).sum()
    }

    /// Check the plan shape: every row's demand vector must cover the
    /// horizon exactly, and the horizon must not be empty.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.days.is_empty() {
            return Err(PlanError::EmptyHorizon);
        }
        for row in &self.rows {
            if row.demand.len() != self.days.len() {
                return Err(PlanError::ShapeMismatch {
                    row: row.id.clone(),
                    expected: self.days.len(),
                    got: row.demand.len(),
                });
            }
            if row.demand.iter().any(|&q| q < 0) {
                return Err(PlanError::NegativeDemand { row: row.id.clone() });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Per-cell distribution strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadMode {
    /// Split the cell's demand evenly across its window in one pass.
    /// The window is purely positional; shortfall from capacity clipping
    /// is not redistributed.
    EvenSplit,
    /// Place the demand unit by unit on whichever window day has the most
    /// remaining capacity, then fall back to a single-day placement for any
    /// leftover. Restricted days are skipped when building the window.
    #[default]
    MostAvailable,
}

impl std::fmt::Display for SpreadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadMode::EvenSplit => write!(f, "even"),
            SpreadMode::MostAvailable => write!(f, "greedy"),
        }
    }
}

/// Run-scoped configuration for one leveling run.
///
/// Capacity and window are shared by all days and rows; there is no per-day
/// or per-product override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelingConfig {
    /// Shared per-day ceiling on total allocated quantity
    pub daily_capacity: Qty,
    /// Distribution strategy
    pub mode: SpreadMode,
    /// Maximum number of candidate days per cell (the originating day plus
    /// up to `window - 1` earlier days)
    pub window: usize,
}

impl LevelingConfig {
    /// Create a config with the given capacity and the default strategy
    pub fn new(daily_capacity: Qty) -> Self {
        Self {
            daily_capacity,
            mode: SpreadMode::default(),
            window: 4,
        }
    }

    /// Set the distribution strategy (builder pattern)
    pub fn mode(mut self, mode: SpreadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the lookback window size (builder pattern)
    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.daily_capacity <= 0 {
            return Err(LevelError::InvalidCapacity(self.daily_capacity));
        }
        if self.window == 0 {
            return Err(LevelError::ZeroWindow);
        }
        Ok(())
    }
}

// ============================================================================
// Allocation (Result)
// ============================================================================

/// Allocated quantities for one row, indexed like the plan's day horizon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAllocation {
    pub row_id: RowId,
    pub cells: Vec<Qty>,
}

impl RowAllocation {
    /// Total allocated quantity for this row
    pub fn total(&self) -> Qty {
        self.cells.iter().sum()
    }
}

/// The result of a leveling run: one allocation cell per (row, day).
///
/// Built incrementally by the engine, read-only once the run returns. The
/// per-day and per-row totals are pure projections, recomputed on demand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Per-row allocations, in plan row order
    pub rows: Vec<RowAllocation>,
    /// Horizon length the cells are indexed by
    pub horizon: usize,
}

impl Allocation {
    /// Create an all-zero allocation shaped like the plan
    pub fn zeroed(plan: &Plan) -> Self {
        let horizon = plan.horizon();
        Self {
            rows: plan
                .rows
                .iter()
                .map(|r| RowAllocation {
                    row_id: r.id.clone(),
                    cells: vec![0; horizon],
                })
                .collect(),
            horizon,
        }
    }

    /// Allocated quantity in one cell
    pub fn get(&self, row: usize, day: usize) -> Qty {
        self.rows[row].cells[day]
    }

    /// Add a quantity to one cell
    pub fn add(&mut self, row: usize, day: usize, qty: Qty) {
        self.rows[row].cells[day] += qty;
    }

    /// Sum over rows for each day
    pub fn day_totals(&self) -> Vec<Qty> {
        let mut totals = vec![0; self.horizon];
        for row in &self.rows {
            for (day, &qty) in row.cells.iter().enumerate() {
                totals[day] += qty;
            }
        }
        totals
    }

    /// Sum over days for each row, in plan row order
    pub fn row_totals(&self) -> Vec<Qty> {
        self.rows.iter().map(RowAllocation::total).collect()
    }

    /// Total allocated quantity across the whole table
    pub fn total_allocated(&self) -> Qty {
        self.rows.iter().map(RowAllocation::total).sum()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Core leveling abstraction.
///
/// A run is an atomic unit of work: the engine owns all mutable state for
/// the duration of the call and two runs share nothing.
pub trait Leveler: Send + Sync {
    /// Distribute the plan's demand under the given configuration
    fn level(&self, plan: &Plan, config: &LevelingConfig) -> Result<Allocation, LevelError>;
}

/// Output rendering.
///
/// Renderers consume the allocation and plan metadata; they must not
/// mutate either.
pub trait Renderer {
    type Output;

    /// Render an allocation to the output format
    fn render(&self, plan: &Plan, allocation: &Allocation) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Plan shape error
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan has no days")]
    EmptyHorizon,

    #[error("row '{row}': demand covers {got} days, horizon has {expected}")]
    ShapeMismatch {
        row: RowId,
        expected: usize,
        got: usize,
    },

    #[error("row '{row}': demand contains a negative quantity")]
    NegativeDemand { row: RowId },
}

/// Leveling error
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("daily capacity must be positive, got {0}")]
    InvalidCapacity(Qty),

    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_day_plan() -> Plan {
        let mut plan = Plan::new("test");
        plan.days.push(Day::new(0, "MON"));
        plan.days.push(Day::new(1, "TUE"));
        plan.rows
            .push(ProductRow::new("FAN-1").unit(10).demand(vec![80, 20]));
        plan.rows
            .push(ProductRow::new("FLANGE-2").unit(5).demand(vec![0, 45]));
        plan
    }

    #[test]
    fn row_builder() {
        let row = ProductRow::new("FAN-630").unit(10).demand(vec![80, 0, 30]);
        assert_eq!(row.id, "FAN-630");
        assert_eq!(row.unit, 10);
        assert_eq!(row.total_demand(), 110);
    }

    #[test]
    fn effective_unit_defaults_to_one() {
        assert_eq!(ProductRow::new("a").effective_unit(), 1);
        assert_eq!(ProductRow::new("a").unit(0).effective_unit(), 1);
        assert_eq!(ProductRow::new("a").unit(25).effective_unit(), 25);
    }

    #[test]
    fn day_from_date_marks_weekends() {
        // 2025-08-23 is a Saturday
        let sat = Day::from_date(0, NaiveDate::from_ymd_opt(2025, 8, 23).unwrap());
        assert!(sat.restricted);

        // 2025-08-25 is a Monday
        let mon = Day::from_date(1, NaiveDate::from_ymd_opt(2025, 8, 25).unwrap());
        assert!(!mon.restricted);
        assert_eq!(mon.label, "2025-08-25");
    }

    #[test]
    fn plan_validate_accepts_matching_shape() {
        assert!(two_day_plan().validate().is_ok());
    }

    #[test]
    fn plan_validate_rejects_empty_horizon() {
        let plan = Plan::new("empty");
        assert!(matches!(plan.validate(), Err(PlanError::EmptyHorizon)));
    }

    #[test]
    fn plan_validate_rejects_shape_mismatch() {
        let mut plan = two_day_plan();
        plan.rows.push(ProductRow::new("short").demand(vec![5]));

        match plan.validate() {
            Err(PlanError::ShapeMismatch { row, expected, got }) => {
                assert_eq!(row, "short");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn plan_validate_rejects_negative_demand() {
        let mut plan = two_day_plan();
        plan.rows[0].demand[1] = -5;
        assert!(matches!(
            plan.validate(),
            Err(PlanError::NegativeDemand { .. })
        ));
    }

    #[test]
    fn config_validation() {
        assert!(LevelingConfig::new(3300).validate().is_ok());
        assert!(matches!(
            LevelingConfig::new(0).validate(),
            Err(LevelError::InvalidCapacity(0))
        ));
        assert!(matches!(
            LevelingConfig::new(100).window(0).validate(),
            Err(LevelError::ZeroWindow)
        ));
    }

    #[test]
    fn allocation_projections() {
        let plan = two_day_plan();
        let mut alloc = Allocation::zeroed(&plan);
        alloc.add(0, 0, 80);
        alloc.add(0, 1, 20);
        alloc.add(1, 1, 40);

        assert_eq!(alloc.day_totals(), vec![80, 60]);
        assert_eq!(alloc.row_totals(), vec![100, 40]);
        assert_eq!(alloc.total_allocated(), 140);
        assert_eq!(alloc.get(1, 0), 0);
    }

    #[test]
    fn zeroed_allocation_matches_plan_shape() {
        let plan = two_day_plan();
        let alloc = Allocation::zeroed(&plan);
        assert_eq!(alloc.rows.len(), 2);
        assert_eq!(alloc.rows[0].row_id, "FAN-1");
        assert!(alloc.rows.iter().all(|r| r.cells == vec![0, 0]));
    }

    #[test]
    fn spread_mode_display() {
        assert_eq!(format!("{}", SpreadMode::EvenSplit), "even");
        assert_eq!(format!("{}", SpreadMode::MostAvailable), "greedy");
    }
}
