//! # offset-engine
//!
//! Deterministic date resolution for events placed relative to each other.
//!
//! Each event names a parent and a signed day offset. One event is the
//! anchor and is fixed to a date; every other date follows from the chain
//! of offsets, slipped forward where an event would start on, or run
//! through, a blacked-out weekday or a holiday.
//!
//! ## Modules
//!
//! - [`event`] — `Event`, `Blackout`, `BlackoutDays` and their constructors
//! - [`policy`] — Weekday checks: may an event start on / span a date
//! - [`graph`] — Name index, structural validation, topological ordering
//! - [`anchor`] — Anchor selection with earliest-date fallback
//! - [`resolver`] — Forward search, cascading, holiday spans, options
//! - [`schedule`] — The `Schedule` aggregate tying it all together
//! - [`error`] — Error types

pub mod anchor;
pub mod error;
pub mod event;
pub mod graph;
pub mod policy;
pub mod resolver;
pub mod schedule;

pub use anchor::{select_anchor, Anchor};
pub use error::ScheduleError;
pub use event::{Blackout, BlackoutDays, Event};
pub use graph::{Component, EventGraph};
pub use policy::{can_overlap, can_start, span_allowed};
pub use resolver::{
    AnchorPolicy, DateResolver, HolidaySpans, Resolution, ResolveOptions, ResolvedEvent,
    ScheduleWarning, UnreachablePolicy, DEFAULT_SEARCH_WINDOW_DAYS,
};
pub use schedule::Schedule;
