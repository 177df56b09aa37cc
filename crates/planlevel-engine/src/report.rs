//! Post-run diagnostics
//!
//! The engine never prevents a day from exceeding capacity (a greedy pass
//! has no global lookahead) and never errors on demand it could not place.
//! Both conditions are surfaced here, after the run, by pure projections
//! over the finished allocation.

use planlevel_core::{Allocation, Plan, Qty};
use serde::Serialize;

/// A day whose total allocation exceeds the daily capacity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OverloadedDay {
    pub index: usize,
    pub label: String,
    pub total: Qty,
    pub capacity: Qty,
}

/// Days whose column sums exceed `capacity`, in chronological order.
///
/// A warning condition, not an error: the caller decides how to surface it.
pub fn overloaded_days(plan: &Plan, allocation: &Allocation, capacity: Qty) -> Vec<OverloadedDay> {
    allocation
        .day_totals()
        .into_iter()
        .enumerate()
        .filter(|&(_, total)| total > capacity)
        .map(|(index, total)| OverloadedDay {
            index,
            label: plan.days[index].label.clone(),
            total,
            capacity,
        })
        .collect()
}

/// Capacity utilization of a single day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayUtilization {
    pub index: usize,
    pub label: String,
    pub total: Qty,
    /// Percent of capacity used (0-100+, can exceed 100 when overloaded)
    pub percent: f64,
}

/// Utilization across the whole horizon.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UtilizationSummary {
    pub days: Vec<DayUtilization>,
    pub average_percent: f64,
    pub peak_percent: f64,
}

/// Per-day capacity utilization for a finished allocation.
pub fn utilization(plan: &Plan, allocation: &Allocation, capacity: Qty) -> UtilizationSummary {
    let days: Vec<DayUtilization> = allocation
        .day_totals()
        .into_iter()
        .enumerate()
        .map(|(index, total)| DayUtilization {
            index,
            label: plan.days[index].label.clone(),
            total,
            percent: total as f64 / capacity as f64 * 100.0,
        })
        .collect();

    let average_percent = if days.is_empty() {
        0.0
    } else {
        days.iter().map(|d| d.percent).sum::<f64>() / days.len() as f64
    };
    let peak_percent = days.iter().map(|d| d.percent).fold(0.0, f64::max);

    UtilizationSummary {
        days,
        average_percent,
        peak_percent,
    }
}

/// How much of one row's demand was actually placed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowAchievement {
    pub row_id: String,
    pub demand: Qty,
    pub allocated: Qty,
    /// allocated / demand, as a percentage; 100 for rows with no demand
    pub percent: f64,
}

/// Achievement rate for the whole run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AchievementSummary {
    pub rows: Vec<RowAchievement>,
    pub total_demand: Qty,
    pub total_allocated: Qty,
    pub overall_percent: f64,
}

/// Allocated-vs-demanded ratio per row and overall.
///
/// The gap between demand and allocation is exactly the quantity dropped by
/// saturation, empty windows, and rounding.
pub fn achievement(plan: &Plan, allocation: &Allocation) -> AchievementSummary {
    let rows: Vec<RowAchievement> = plan
        .rows
        .iter()
        .zip(&allocation.rows)
        .map(|(row, alloc)| {
            let demand = row.total_demand();
            let allocated = alloc.total();
            let percent = if demand == 0 {
                100.0
            } else {
                allocated as f64 / demand as f64 * 100.0
            };
            RowAchievement {
                row_id: row.id.clone(),
                demand,
                allocated,
                percent,
            }
        })
        .collect();

    let total_demand = plan.total_demand();
    let total_allocated = allocation.total_allocated();
    let overall_percent = if total_demand == 0 {
        100.0
    } else {
        total_allocated as f64 / total_demand as f64 * 100.0
    };

    AchievementSummary {
        rows,
        total_demand,
        total_allocated,
        overall_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planlevel_core::{Day, ProductRow};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Plan, Allocation) {
        let mut plan = Plan::new("test");
        plan.days = vec![Day::new(0, "MON"), Day::new(1, "TUE")];
        plan.rows = vec![
            ProductRow::new("a").unit(10).demand(vec![100, 0]),
            ProductRow::new("b").unit(10).demand(vec![50, 60]),
        ];
        let alloc = Allocation::zeroed(&plan);
        (plan, alloc)
    }

    #[test]
    fn no_overload_when_under_capacity() {
        let (plan, mut alloc) = fixture();
        alloc.add(0, 0, 60);
        alloc.add(1, 1, 40);
        assert!(overloaded_days(&plan, &alloc, 100).is_empty());
    }

    #[test]
    fn overloaded_days_reports_offenders_in_order() {
        let (plan, mut alloc) = fixture();
        alloc.add(0, 0, 90);
        alloc.add(1, 0, 30);
        alloc.add(1, 1, 110);

        let over = overloaded_days(&plan, &alloc, 100);
        assert_eq!(over.len(), 2);
        assert_eq!(over[0].index, 0);
        assert_eq!(over[0].total, 120);
        assert_eq!(over[0].label, "MON");
        assert_eq!(over[1].index, 1);
        assert_eq!(over[1].total, 110);
    }

    #[test]
    fn boundary_total_is_not_overloaded() {
        let (plan, mut alloc) = fixture();
        alloc.add(0, 0, 100);
        assert!(overloaded_days(&plan, &alloc, 100).is_empty());
    }

    #[test]
    fn utilization_percentages() {
        let (plan, mut alloc) = fixture();
        alloc.add(0, 0, 50);
        alloc.add(1, 1, 100);

        let util = utilization(&plan, &alloc, 100);
        assert_eq!(util.days[0].percent, 50.0);
        assert_eq!(util.days[1].percent, 100.0);
        assert_eq!(util.average_percent, 75.0);
        assert_eq!(util.peak_percent, 100.0);
    }

    #[test]
    fn achievement_tracks_dropped_demand() {
        let (plan, mut alloc) = fixture();
        // Row a fully placed, row b lost 30 of 110.
        alloc.add(0, 0, 100);
        alloc.add(1, 0, 50);
        alloc.add(1, 1, 30);

        let ach = achievement(&plan, &alloc);
        assert_eq!(ach.rows[0].percent, 100.0);
        assert_eq!(ach.rows[1].demand, 110);
        assert_eq!(ach.rows[1].allocated, 80);
        assert_eq!(ach.total_demand, 210);
        assert_eq!(ach.total_allocated, 180);
        assert!((ach.overall_percent - 180.0 / 210.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn achievement_full_for_zero_demand() {
        let mut plan = Plan::new("idle");
        plan.days = vec![Day::new(0, "MON")];
        plan.rows = vec![ProductRow::new("a").demand(vec![0])];
        let alloc = Allocation::zeroed(&plan);

        let ach = achievement(&plan, &alloc);
        assert_eq!(ach.rows[0].percent, 100.0);
        assert_eq!(ach.overall_percent, 100.0);
    }
}
