//! Anchor selection.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, ScheduleError};
use crate::event::Event;

/// The fixed reference point of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    /// Name of the anchored event.
    pub event: String,
    /// The date the anchored event is pinned to.
    pub date: NaiveDate,
    /// Whether the requested name was found. `false` means the earliest
    /// preferred date was used instead.
    pub matched: bool,
}

/// Pick the anchor among `events`.
///
/// An event named `name` wins. Otherwise the event with the earliest
/// `preferred_date` is used, ties going to the first one registered.
/// Holidays are never candidates.
///
/// # Errors
///
/// Returns [`ScheduleError::EmptySchedule`] if `events` is empty.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use offset_engine::{select_anchor, Event};
///
/// let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
/// let events = vec![Event::new("A", 1, d(5)), Event::new("B", 1, d(2))];
///
/// let anchor = select_anchor(&events, "nonexistent").unwrap();
/// assert!(!anchor.matched);
/// assert_eq!(anchor.event, "B");
/// ```
pub fn select_anchor(events: &[Event], name: &str) -> Result<Anchor> {
    let earliest = events
        .iter()
        .reduce(|best, e| {
            if e.preferred_date < best.preferred_date {
                e
            } else {
                best
            }
        })
        .ok_or(ScheduleError::EmptySchedule)?;

    let (chosen, matched) = match events.iter().find(|e| !name.is_empty() && e.name == name) {
        Some(named) => (named, true),
        None => (earliest, false),
    };

    Ok(Anchor {
        event: chosen.name.clone(),
        date: chosen.preferred_date,
        matched,
    })
}
