use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Longest run of consecutive calendar days present in `dates`.
///
/// Repeated dates count once and input order does not matter. An empty
/// slice has no streak; any single day is a streak of one.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let days: Vec<NaiveDate> = unique.into_iter().collect();

    if days.is_empty() {
        return 0;
    }

    let mut streak = 1u32;
    let mut best = 1u32;

    for pair in days.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            streak += 1;
            best = best.max(streak);
        } else {
            streak = 1;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(n - 1)
    }

    #[test]
    fn empty_input_has_no_streak() {
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn single_day_is_streak_of_one() {
        assert_eq!(longest_streak(&[day(4)]), 1);
    }

    #[test]
    fn gap_resets_run_but_keeps_best() {
        assert_eq!(longest_streak(&[day(1), day(2), day(3), day(10)]), 3);
    }

    #[test]
    fn best_run_need_not_be_last() {
        let dates = [day(1), day(2), day(3), day(4), day(8), day(9)];
        assert_eq!(longest_streak(&dates), 4);
    }

    #[test]
    fn duplicates_do_not_inflate() {
        assert_eq!(longest_streak(&[day(1), day(1), day(2)]), 2);
    }

    #[test]
    fn unsorted_input_is_handled() {
        assert_eq!(longest_streak(&[day(3), day(1), day(2), day(7)]), 3);
    }

    #[test]
    fn runs_across_month_boundaries() {
        let dates: Vec<NaiveDate> = (25..=40).map(day).collect();
        assert_eq!(longest_streak(&dates), 16);
    }
}
