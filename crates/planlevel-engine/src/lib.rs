//! # planlevel-engine
//!
//! The allocation engine: spreads each row's daily demand across a bounded
//! lookback window of days so that no day's total exceeds the shared daily
//! capacity, with every placement quantized to the row's batch unit.
//!
//! The run is a single left-to-right pass. Rows are processed in input
//! order, days in chronological order, and every cell decision reads the
//! running day totals left behind by all previously processed cells, so the
//! outcome is order-dependent by design: earlier rows and earlier days win
//! contested capacity. The pass cannot be parallelized without changing
//! semantics.
//!
//! ## Example
//!
//! ```rust,ignore
//! use planlevel_core::{Leveler, LevelingConfig, SpreadMode};
//! use planlevel_engine::WindowLeveler;
//!
//! let config = LevelingConfig::new(3300).mode(SpreadMode::MostAvailable);
//! let allocation = WindowLeveler::new().level(&plan, &config)?;
//! ```

pub mod report;
mod spread;
mod window;

pub use report::{
    achievement, overloaded_days, utilization, AchievementSummary, DayUtilization, OverloadedDay,
    RowAchievement, UtilizationSummary,
};
pub use window::eligible_window;

use planlevel_core::{Allocation, LevelError, Leveler, LevelingConfig, Plan, Qty, SpreadMode};
use tracing::debug;

/// Running total of allocated quantity per day for one leveling run.
///
/// Invariant: `total(d)` equals the sum of all cells placed in column `d`
/// so far, so `available(d)` is never stale and never requires rescanning
/// the allocation table.
#[derive(Debug)]
pub(crate) struct DayLedger {
    capacity: Qty,
    totals: Vec<Qty>,
}

impl DayLedger {
    pub(crate) fn new(capacity: Qty, horizon: usize) -> Self {
        Self {
            capacity,
            totals: vec![0; horizon],
        }
    }

    /// Remaining capacity on a day
    pub(crate) fn available(&self, day: usize) -> Qty {
        self.capacity - self.totals[day]
    }

    pub(crate) fn total(&self, day: usize) -> Qty {
        self.totals[day]
    }

    pub(crate) fn add(&mut self, day: usize, qty: Qty) {
        self.totals[day] += qty;
    }
}

/// The windowed greedy leveler.
///
/// A single pass, no backtracking, no global optimum: demand that no window
/// day can absorb is dropped and shows up as an achievement gap, and a day
/// can only exceed capacity if the input already violated it (detection is
/// post-hoc, see [`report::overloaded_days`]).
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowLeveler;

impl WindowLeveler {
    pub fn new() -> Self {
        Self
    }
}

impl Leveler for WindowLeveler {
    fn level(&self, plan: &Plan, config: &LevelingConfig) -> Result<Allocation, LevelError> {
        config.validate()?;
        plan.validate()?;

        let mut allocation = Allocation::zeroed(plan);
        let mut ledger = DayLedger::new(config.daily_capacity, plan.horizon());
        let skip_restricted = config.mode == SpreadMode::MostAvailable;

        for (row_idx, row) in plan.rows.iter().enumerate() {
            let unit = row.effective_unit();

            for day in 0..plan.horizon() {
                let value = row.demand[day];
                if value == 0 {
                    continue;
                }

                let window = eligible_window(&plan.days, day, config.window, skip_restricted);
                if window.is_empty() {
                    debug!(row = %row.id, day, value, "no eligible window day, demand dropped");
                    continue;
                }

                match config.mode {
                    SpreadMode::EvenSplit => {
                        spread::even_split(&mut allocation, &mut ledger, row_idx, value, unit, &window);
                    }
                    SpreadMode::MostAvailable => {
                        let dropped = spread::most_available(
                            &mut allocation,
                            &mut ledger,
                            row_idx,
                            value,
                            unit,
                            &window,
                        );
                        if dropped > 0 {
                            debug!(row = %row.id, day, dropped, "window saturated, leftover dropped");
                        }
                    }
                }
            }
        }

        debug!(
            demand = plan.total_demand(),
            allocated = allocation.total_allocated(),
            "leveling run complete"
        );

        Ok(allocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planlevel_core::{Day, Plan, ProductRow};
    use pretty_assertions::assert_eq;

    fn plan(days: usize, rows: Vec<ProductRow>) -> Plan {
        let mut plan = Plan::new("test");
        plan.days = (0..days).map(|i| Day::new(i, format!("D{}", i + 1))).collect();
        plan.rows = rows;
        plan
    }

    #[test]
    fn ledger_tracks_running_totals() {
        let mut ledger = DayLedger::new(100, 3);
        assert_eq!(ledger.available(0), 100);

        ledger.add(0, 80);
        ledger.add(2, 30);
        assert_eq!(ledger.available(0), 20);
        assert_eq!(ledger.total(0), 80);
        assert_eq!(ledger.available(1), 100);
        assert_eq!(ledger.available(2), 70);
    }

    #[test]
    fn rejects_invalid_capacity() {
        let plan = plan(2, vec![ProductRow::new("a").demand(vec![10, 0])]);
        let result = WindowLeveler::new().level(&plan, &LevelingConfig::new(0));
        assert!(matches!(result, Err(LevelError::InvalidCapacity(0))));
    }

    #[test]
    fn rejects_malformed_plan() {
        let plan = plan(3, vec![ProductRow::new("short").demand(vec![10])]);
        let result = WindowLeveler::new().level(&plan, &LevelingConfig::new(100));
        assert!(matches!(result, Err(LevelError::Plan(_))));
    }

    #[test]
    fn zero_demand_rows_produce_zero_allocation() {
        let plan = plan(
            3,
            vec![ProductRow::new("idle").unit(10).demand(vec![0, 0, 0])],
        );
        let alloc = WindowLeveler::new()
            .level(&plan, &LevelingConfig::new(100))
            .unwrap();
        assert_eq!(alloc.total_allocated(), 0);
    }

    #[test]
    fn ledger_matches_allocation_column_sums() {
        // The incremental ledger must agree with a full rescan of the table.
        let plan = plan(
            5,
            vec![
                ProductRow::new("a").unit(10).demand(vec![0, 90, 0, 120, 0]),
                ProductRow::new("b").unit(5).demand(vec![40, 0, 0, 0, 200]),
            ],
        );
        let config = LevelingConfig::new(100);
        let alloc = WindowLeveler::new().level(&plan, &config).unwrap();

        let rescanned: Vec<_> = (0..plan.horizon())
            .map(|d| (0..plan.rows.len()).map(|r| alloc.get(r, d)).sum::<i64>())
            .collect();
        assert_eq!(alloc.day_totals(), rescanned);
    }
}
