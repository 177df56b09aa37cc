//! Per-cell distribution strategies
//!
//! Both strategies place one cell's demand into its eligible window, reading
//! and updating the shared [`DayLedger`](crate::DayLedger). All placements
//! are floored to multiples of the row's batch unit.

use crate::DayLedger;
use planlevel_core::{Allocation, Qty};

/// Floor a quantity to a multiple of `unit`.
fn quantize(qty: Qty, unit: Qty) -> Qty {
    qty / unit * unit
}

/// Even split: one equal, pre-quantized share per window day.
///
/// `per_col = floor((value / window_len) / unit) * unit`, each placement
/// capped by the day's remaining capacity. Any amount clipped off by a full
/// day is lost for this cell; there is no redistribution.
pub(crate) fn even_split(
    allocation: &mut Allocation,
    ledger: &mut DayLedger,
    row: usize,
    value: Qty,
    unit: Qty,
    window: &[usize],
) {
    let per_col = quantize(value / window.len() as Qty, unit);

    for &day in window {
        let available = ledger.available(day);
        let add = quantize(per_col.min(available), unit);
        if add > 0 {
            allocation.add(row, day, add);
            ledger.add(day, add);
        }
    }
}

/// Most-available-first: place the demand one unit at a time on whichever
/// window day has the strictly largest remaining capacity, re-evaluating
/// after every placement. Ties keep the earliest day in window order.
///
/// A sub-unit leftover (or one stranded because no day can take a full
/// unit) goes whole onto the first window day with room for all of it.
/// Returns the quantity that could not be placed anywhere.
pub(crate) fn most_available(
    allocation: &mut Allocation,
    ledger: &mut DayLedger,
    row: usize,
    value: Qty,
    unit: Qty,
    window: &[usize],
) -> Qty {
    let mut remaining = value;

    while remaining >= unit {
        let mut best: Option<(usize, Qty)> = None;
        for &day in window {
            let available = ledger.available(day);
            if available < unit {
                continue;
            }
            match best {
                // Strict comparison: an equal candidate never displaces an
                // earlier one, so ties resolve to window order.
                Some((_, best_available)) if available <= best_available => {}
                _ => best = Some((day, available)),
            }
        }

        let Some((day, available)) = best else {
            break;
        };

        let add = quantize(unit.min(remaining).min(available), unit);
        if add == 0 {
            break;
        }
        allocation.add(row, day, add);
        ledger.add(day, add);
        remaining -= add;
    }

    if remaining > 0 {
        for &day in window {
            if ledger.available(day) >= remaining {
                allocation.add(row, day, remaining);
                ledger.add(day, remaining);
                remaining = 0;
                break;
            }
        }
    }

    remaining
}
