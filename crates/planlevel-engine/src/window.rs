//! Eligible-window selection
//!
//! For a demand cell on day `d`, the candidate days that may absorb it:
//! `d` itself plus earlier days, scanned backward toward the start of the
//! horizon, nearest-first.

use planlevel_core::Day;

/// Candidate day indices for demand originating on `origin`, nearest-first.
///
/// Positional mode (`skip_restricted == false`) takes the first
/// `min(window, origin + 1)` indices counting down from `origin`; the result
/// is never empty. With `skip_restricted` set, restricted days are passed
/// over while scanning and the result may be empty (the caller drops the
/// demand in that case).
pub fn eligible_window(
    days: &[Day],
    origin: usize,
    window: usize,
    skip_restricted: bool,
) -> Vec<usize> {
    let mut candidates = Vec::with_capacity(window);

    for day in (0..=origin).rev() {
        if candidates.len() == window {
            break;
        }
        if skip_restricted && days[day].restricted {
            continue;
        }
        candidates.push(day);
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use planlevel_core::Day;
    use pretty_assertions::assert_eq;

    fn working_days(n: usize) -> Vec<Day> {
        (0..n).map(|i| Day::new(i, format!("D{}", i + 1))).collect()
    }

    #[test]
    fn positional_window_counts_back_from_origin() {
        let days = working_days(10);
        assert_eq!(eligible_window(&days, 5, 4, false), vec![5, 4, 3, 2]);
    }

    #[test]
    fn positional_window_clips_at_horizon_start() {
        let days = working_days(10);
        assert_eq!(eligible_window(&days, 0, 4, false), vec![0]);
        assert_eq!(eligible_window(&days, 2, 4, false), vec![2, 1, 0]);
    }

    #[test]
    fn restricted_days_are_skipped() {
        let mut days = working_days(7);
        days[4].restricted = true;
        days[5].restricted = true;

        // Scanning back from day 6: skip 5 and 4, keep collecting earlier.
        assert_eq!(eligible_window(&days, 6, 4, true), vec![6, 3, 2, 1]);
    }

    #[test]
    fn restricted_days_kept_in_positional_mode() {
        let mut days = working_days(7);
        days[5].restricted = true;
        assert_eq!(eligible_window(&days, 6, 4, false), vec![6, 5, 4, 3]);
    }

    #[test]
    fn window_may_be_empty_when_all_candidates_restricted() {
        let mut days = working_days(3);
        for day in &mut days {
            day.restricted = true;
        }
        assert!(eligible_window(&days, 2, 4, true).is_empty());
    }

    #[test]
    fn short_window_when_few_candidates_remain() {
        let mut days = working_days(4);
        days[0].restricted = true;
        days[2].restricted = true;
        assert_eq!(eligible_window(&days, 3, 4, true), vec![3, 1]);
    }
}
