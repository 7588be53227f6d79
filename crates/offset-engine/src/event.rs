//! Events, holidays and their per-weekday blackout tables.
//!
//! An [`Event`] is a milestone placed relative to another event: its start
//! date is its parent's resolved start plus `parent_offset` days. With a
//! parent resolved to 2020-01-03, an offset of `1` gives 2020-01-04 and an
//! offset of `-1` gives 2020-01-02.
//!
//! Holidays use the same shape. They are pinned to their `preferred_date`
//! and block every event regardless of the event's own [`BlackoutDays`].

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// What an event may not do on one weekday.
///
/// `start` forbids the event's first day from landing on the weekday;
/// `overlap` forbids any day of the event's span from landing on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blackout {
    pub start: bool,
    pub overlap: bool,
}

impl Blackout {
    /// Cannot start, but may be spanned.
    pub const START: Blackout = Blackout {
        start: true,
        overlap: false,
    };

    /// Cannot be touched at all.
    pub const FULL: Blackout = Blackout {
        start: true,
        overlap: true,
    };

    /// A day the event cannot touch cannot be its first day either.
    pub fn normalized(self) -> Blackout {
        Blackout {
            start: self.start || self.overlap,
            overlap: self.overlap,
        }
    }

    pub fn is_clear(self) -> bool {
        !self.start && !self.overlap
    }
}

/// One [`Blackout`] per weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutDays {
    pub monday: Blackout,
    pub tuesday: Blackout,
    pub wednesday: Blackout,
    pub thursday: Blackout,
    pub friday: Blackout,
    pub saturday: Blackout,
    pub sunday: Blackout,
}

impl BlackoutDays {
    /// Saturday and Sunday fully blocked.
    pub fn weekends() -> Self {
        Self {
            saturday: Blackout::FULL,
            sunday: Blackout::FULL,
            ..Self::default()
        }
    }

    /// Saturday and Sunday blocked as start days only.
    pub fn weekend_starts() -> Self {
        Self {
            saturday: Blackout::START,
            sunday: Blackout::START,
            ..Self::default()
        }
    }

    /// The entry for `weekday`, exactly as stored.
    pub fn for_weekday(&self, weekday: Weekday) -> Blackout {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn set(&mut self, weekday: Weekday, blackout: Blackout) {
        let slot = match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = blackout;
    }

    /// True when no weekday carries any restriction.
    pub fn is_clear(&self) -> bool {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
        .iter()
        .all(|b| b.is_clear())
    }
}

/// A schedulable milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique among all events and holidays of a schedule.
    pub name: String,
    /// Duration in whole days.
    pub length: i64,
    /// Name of the event this one is offset from. Empty means no parent.
    #[serde(default)]
    pub parent_event: String,
    /// Days added to the parent's resolved start. May be negative.
    pub parent_offset: i64,
    /// The date the caller wished for. Only used to pick anchors.
    pub preferred_date: NaiveDate,
    #[serde(default)]
    pub blackout_days: BlackoutDays,
}

impl Event {
    /// A one-day-after-parent event with no parent and no blackouts.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use offset_engine::Event;
    ///
    /// let date = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
    /// let event = Event::new("Launch", 1, date);
    /// assert_eq!(event.parent_offset, 1);
    /// assert!(!event.has_parent());
    /// ```
    pub fn new(name: impl Into<String>, length: i64, preferred_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            length,
            parent_event: String::new(),
            parent_offset: 1,
            preferred_date,
            blackout_days: BlackoutDays::default(),
        }
    }

    /// An event that can neither start on nor span a weekend day.
    pub fn weekend_blackout(
        name: impl Into<String>,
        length: i64,
        preferred_date: NaiveDate,
    ) -> Self {
        Self {
            blackout_days: BlackoutDays::weekends(),
            ..Self::new(name, length, preferred_date)
        }
    }

    /// An event that cannot start on a weekend day but may run through one.
    pub fn weekend_overlap_only(
        name: impl Into<String>,
        length: i64,
        preferred_date: NaiveDate,
    ) -> Self {
        Self {
            blackout_days: BlackoutDays::weekend_starts(),
            ..Self::new(name, length, preferred_date)
        }
    }

    /// A single-day holiday.
    pub fn holiday(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            parent_offset: 0,
            ..Self::new(name, 1, date)
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>, offset: i64) -> Self {
        self.parent_event = parent.into();
        self.parent_offset = offset;
        self
    }

    pub fn with_blackout(mut self, weekday: Weekday, blackout: Blackout) -> Self {
        self.blackout_days.set(weekday, blackout);
        self
    }

    pub fn has_parent(&self) -> bool {
        !self.parent_event.is_empty()
    }

    /// Number of days the event occupies. Anything below one counts as one.
    pub fn span_len(&self) -> i64 {
        self.length.max(1)
    }
}
