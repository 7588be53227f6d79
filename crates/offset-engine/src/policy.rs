//! Weekday policy: may an event start on, or span, a given date?
//!
//! Pure functions over a [`BlackoutDays`] table. Entries are always read
//! through [`Blackout::normalized`], so an overlap blackout also blocks
//! starting even when the caller left `start` unset.

use chrono::{Datelike, Days, NaiveDate};

use crate::event::{Blackout, BlackoutDays};

fn entry(date: NaiveDate, blackout: &BlackoutDays) -> Blackout {
    blackout.for_weekday(date.weekday()).normalized()
}

/// False iff `date`'s weekday forbids starting.
pub fn can_start(date: NaiveDate, blackout: &BlackoutDays) -> bool {
    !entry(date, blackout).start
}

/// False iff `date`'s weekday forbids being spanned.
pub fn can_overlap(date: NaiveDate, blackout: &BlackoutDays) -> bool {
    !entry(date, blackout).overlap
}

/// The days of `[start, start + length)`. A length below one yields `start` only.
///
/// Stops early if the calendar runs out.
pub fn span_days(start: NaiveDate, length: i64) -> impl Iterator<Item = NaiveDate> {
    let len = length.max(1) as u64;
    (0..len).map_while(move |i| start.checked_add_days(Days::new(i)))
}

/// True iff the event may start on `start` and every day of its span may be overlapped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use offset_engine::policy::span_allowed;
/// use offset_engine::BlackoutDays;
///
/// let weekends = BlackoutDays::weekends();
/// let thursday = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
/// assert!(span_allowed(thursday, 2, &weekends));  // Thu, Fri
/// assert!(!span_allowed(thursday, 3, &weekends)); // runs into Saturday
/// ```
pub fn span_allowed(start: NaiveDate, length: i64, blackout: &BlackoutDays) -> bool {
    can_start(start, blackout) && span_days(start, length).all(|d| can_overlap(d, blackout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2020-01-04 is a Saturday, 2020-01-05 a Sunday, 2020-01-06 a Monday.

    #[test]
    fn test_can_start_respects_start_flag() {
        let table = BlackoutDays::weekend_starts();
        assert!(!can_start(d(2020, 1, 4), &table));
        assert!(!can_start(d(2020, 1, 5), &table));
        assert!(can_start(d(2020, 1, 6), &table));
    }

    #[test]
    fn test_start_only_blackout_allows_overlap() {
        let table = BlackoutDays::weekend_starts();
        assert!(can_overlap(d(2020, 1, 4), &table));
        // Friday start running through the weekend is fine.
        assert!(span_allowed(d(2020, 1, 3), 4, &table));
    }

    #[test]
    fn test_overlap_only_flag_is_normalized_to_block_start() {
        let mut table = BlackoutDays::default();
        table.set(
            Weekday::Wed,
            Blackout {
                start: false,
                overlap: true,
            },
        );
        let wednesday = d(2020, 1, 8);
        assert!(!can_start(wednesday, &table));
        assert!(!can_overlap(wednesday, &table));
        assert!(!span_allowed(wednesday, 1, &table));
    }

    #[test]
    fn test_span_allowed_checks_every_day() {
        let table = BlackoutDays::weekends();
        assert!(span_allowed(d(2020, 1, 6), 5, &table)); // Mon..Fri
        assert!(!span_allowed(d(2020, 1, 6), 6, &table)); // Mon..Sat
        assert!(!span_allowed(d(2020, 1, 5), 1, &table)); // Sunday start
    }

    #[test]
    fn test_span_days_clamps_length() {
        let days: Vec<_> = span_days(d(2020, 1, 6), 0).collect();
        assert_eq!(days, vec![d(2020, 1, 6)]);
        let days: Vec<_> = span_days(d(2020, 1, 30), 3).collect();
        assert_eq!(days, vec![d(2020, 1, 30), d(2020, 1, 31), d(2020, 2, 1)]);
    }

    #[test]
    fn test_clear_table_allows_everything() {
        let table = BlackoutDays::default();
        for offset in 0..7 {
            let day = d(2020, 1, 6) + chrono::Duration::days(offset);
            assert!(span_allowed(day, 3, &table));
        }
    }
}
