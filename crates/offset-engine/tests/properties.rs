use chrono::{Days, NaiveDate, Weekday};
use offset_engine::{
    span_allowed, Blackout, BlackoutDays, Event, HolidaySpans, Schedule, ScheduleError,
};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 6).unwrap()
}

fn at(offset: i64) -> NaiveDate {
    if offset >= 0 {
        base() + Days::new(offset as u64)
    } else {
        base() - Days::new(offset.unsigned_abs())
    }
}

/// Blackouts that always leave Monday..Friday spannable from a Monday start.
fn blackout_days() -> impl Strategy<Value = BlackoutDays> {
    let weekend = prop_oneof![
        Just(Blackout::default()),
        Just(Blackout::START),
        Just(Blackout::FULL),
    ];
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        weekend.clone(),
        weekend,
    )
        .prop_map(|(tue, wed, thu, sat, sun)| {
            let start_if = |b: bool| if b { Blackout::START } else { Blackout::default() };
            let mut days = BlackoutDays::default();
            days.set(Weekday::Tue, start_if(tue));
            days.set(Weekday::Wed, start_if(wed));
            days.set(Weekday::Thu, start_if(thu));
            days.set(Weekday::Sat, sat);
            days.set(Weekday::Sun, sun);
            days
        })
}

/// A random tree rooted at `E0`, plus a few single-day holidays.
fn schedule_input() -> impl Strategy<Value = (Vec<Event>, Vec<Event>)> {
    let node = (any::<prop::sample::Index>(), -10i64..=10, 1i64..=5, blackout_days());
    let events = prop::collection::vec(node, 0..12).prop_map(|nodes| {
        let mut events = vec![Event::new("E0", 1, base())];
        for (i, (parent, offset, length, blackout)) in nodes.into_iter().enumerate() {
            let parent = parent.index(i + 1);
            let mut event = Event::new(format!("E{}", i + 1), length, at(30))
                .with_parent(format!("E{parent}"), offset);
            event.blackout_days = blackout;
            events.push(event);
        }
        events
    });
    let holidays = prop::collection::vec(-20i64..60, 0..4).prop_map(|days| {
        days.into_iter()
            .enumerate()
            .map(|(i, day)| Event::holiday(format!("H{i}"), at(day)))
            .collect::<Vec<_>>()
    });
    (events, holidays)
}

fn build(events: &[Event], holidays: &[Event]) -> Schedule {
    let mut schedule = Schedule::new();
    for event in events {
        schedule.add_event(event.clone());
    }
    for holiday in holidays {
        schedule.add_holiday(holiday.clone());
    }
    assert!(schedule.anchor_to("E0").unwrap());
    schedule.build_schedule().unwrap();
    schedule
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date + Days::new(days as u64)
    } else {
        date - Days::new(days.unsigned_abs())
    }
}

proptest! {
    #[test]
    fn prop_build_is_deterministic((events, holidays) in schedule_input()) {
        let a = build(&events, &holidays);
        let b = build(&events, &holidays);
        let left: Vec<_> = a.resolution().unwrap().iter().cloned().collect();
        let right: Vec<_> = b.resolution().unwrap().iter().cloned().collect();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_every_event_is_resolved((events, holidays) in schedule_input()) {
        let schedule = build(&events, &holidays);
        for event in &events {
            prop_assert!(schedule.resolved_date(&event.name).is_some(), "{} missing", event.name);
        }
        prop_assert!(schedule.warnings().is_empty());
    }

    #[test]
    fn prop_children_derive_from_resolved_parent((events, holidays) in schedule_input()) {
        let schedule = build(&events, &holidays);
        let resolution = schedule.resolution().unwrap();
        for event in events.iter().filter(|e| e.has_parent()) {
            let parent = resolution.date(&event.parent_event).unwrap();
            let entry = resolution.get(&event.name).unwrap();
            prop_assert_eq!(entry.naive_start, add_days(parent, event.parent_offset));
            if entry.shift_days == 0 {
                prop_assert_eq!(entry.start, add_days(parent, event.parent_offset));
            }
        }
    }

    #[test]
    fn prop_resolved_spans_respect_blackouts_and_holidays((events, holidays) in schedule_input()) {
        let schedule = build(&events, &holidays);
        let spans = HolidaySpans::new(&holidays);
        for event in events.iter().filter(|e| e.has_parent()) {
            let start = schedule.resolved_date(&event.name).unwrap();
            prop_assert!(span_allowed(start, event.length, &event.blackout_days));
            prop_assert!(!spans.overlaps(start, event.length));
        }
    }

    #[test]
    fn prop_shift_is_forward_and_minimal((events, holidays) in schedule_input()) {
        let schedule = build(&events, &holidays);
        let resolution = schedule.resolution().unwrap();
        let spans = HolidaySpans::new(&holidays);
        for event in events.iter().filter(|e| e.has_parent()) {
            let entry = resolution.get(&event.name).unwrap();
            prop_assert!(entry.start >= entry.naive_start);
            prop_assert_eq!(entry.shift_days, (entry.start - entry.naive_start).num_days());
            for skipped in 0..entry.shift_days {
                let day = add_days(entry.naive_start, skipped);
                let fits = span_allowed(day, event.length, &event.blackout_days)
                    && !spans.overlaps(day, event.length);
                prop_assert!(!fits, "{} could have started on {}", event.name, day);
            }
        }
    }

    #[test]
    fn prop_cycle_yields_no_dates(len in 1usize..6) {
        let mut schedule = Schedule::new();
        for i in 0..len {
            let parent = format!("C{}", (i + 1) % len);
            schedule.add_event(Event::new(format!("C{i}"), 1, base()).with_parent(parent, 1));
        }
        let err = schedule.build_schedule().unwrap_err();
        prop_assert!(
            matches!(err, ScheduleError::CyclicDependency { ref cycle } if cycle.len() == len),
            "unexpected {:?}",
            err
        );
        prop_assert!(schedule.resolution().is_none());
    }
}

#[test]
fn test_anchor_fallback_example() {
    let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
    let mut schedule = Schedule::new();
    schedule.add_event(Event::new("A", 1, d(5)));
    schedule.add_event(Event::new("B", 1, d(2)));
    schedule.add_event(Event::new("C", 1, d(9)));
    assert!(!schedule.anchor_to("nonexistent").unwrap());
    let anchor = schedule.anchor().unwrap();
    assert_eq!(anchor.event, "B");
    assert_eq!(anchor.date, d(2));
}

#[test]
fn test_shifted_parent_moves_whole_subtree() {
    let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
    let mut schedule = Schedule::new();
    schedule.add_event(Event::new("Launch", 1, d(3))); // Friday
    schedule.add_event(Event::weekend_blackout("Deploy", 2, d(20)).with_parent("Launch", 0));
    schedule.add_event(Event::new("Smoke", 1, d(20)).with_parent("Deploy", 2));
    schedule.add_event(Event::new("Announce", 1, d(20)).with_parent("Smoke", 1));
    schedule.anchor_to("Launch").unwrap();
    schedule.build_schedule().unwrap();

    // Friday + 2 days would cover Saturday; Deploy slips to Monday.
    assert_eq!(schedule.resolved_date("Deploy"), Some(d(6)));
    assert_eq!(schedule.resolved_date("Smoke"), Some(d(8)));
    assert_eq!(schedule.resolved_date("Announce"), Some(d(9)));
}

#[test]
fn test_resolution_json_shape() {
    let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
    let mut schedule = Schedule::new();
    schedule.add_event(Event::new("Launch", 1, d(6)));
    schedule.add_event(Event::weekend_overlap_only("Review", 1, d(20)).with_parent("Launch", -1));
    schedule.build_schedule().unwrap();

    let json = serde_json::to_value(schedule.resolution().unwrap()).unwrap();
    let review = &json["entries"][1];
    assert_eq!(review["name"], "Review");
    assert_eq!(review["naive_start"], "2020-01-05");
    assert_eq!(review["start"], "2020-01-06");
    assert_eq!(review["shift_days"], 1);
    assert_eq!(review["pinned"], false);
}
