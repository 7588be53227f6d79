//! Date resolution over a validated [`EventGraph`].
//!
//! Each event's naive candidate is its parent's resolved start plus its
//! offset. If the candidate breaks the event's weekday blackouts or touches
//! a holiday, it slips forward one day at a time until it fits. Children
//! derive from the date that was actually recorded, so every slip carries
//! through to all descendants.
//!
//! Pinned entries are never searched: the anchor (under
//! [`AnchorPolicy::Trusted`]), the anchor's ancestors, and holidays. The
//! anchor's ancestors are back-derived so that `anchor = parent + offset`
//! holds exactly. An ancestor that lands on one of its blackouts or a
//! holiday is reported as a [`ScheduleWarning::PinnedViolation`].

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::event::Event;
use crate::graph::{Component, EventGraph, NodeId};
use crate::policy::span_allowed;

/// Extra days searched past a naive candidate before giving up.
pub const DEFAULT_SEARCH_WINDOW_DAYS: u32 = 366;

// ── Options ─────────────────────────────────────────────────────────────────

/// Whether the anchor is subject to its own blackouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AnchorPolicy {
    /// The anchor date is taken as given. Violations are only logged.
    #[default]
    Trusted,
    /// The anchor slips forward like any other event.
    Enforce,
}

/// What to do with events not connected to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnreachablePolicy {
    /// Resolve each disconnected tree from its root's preferred date.
    #[default]
    ResolveIndependently,
    /// Leave them unresolved.
    Skip,
}

/// Options for [`Schedule::build_schedule`](crate::Schedule::build_schedule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveOptions {
    /// How many days past its naive candidate an event may slip.
    pub search_window_days: u32,
    pub anchor_policy: AnchorPolicy,
    pub unreachable: UnreachablePolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            search_window_days: DEFAULT_SEARCH_WINDOW_DAYS,
            anchor_policy: AnchorPolicy::default(),
            unreachable: UnreachablePolicy::default(),
        }
    }
}

impl ResolveOptions {
    pub fn with_search_window(mut self, days: u32) -> Self {
        self.search_window_days = days;
        self
    }

    pub fn with_anchor_policy(mut self, policy: AnchorPolicy) -> Self {
        self.anchor_policy = policy;
        self
    }

    pub fn with_unreachable(mut self, policy: UnreachablePolicy) -> Self {
        self.unreachable = policy;
        self
    }
}

// ── Holiday spans ───────────────────────────────────────────────────────────

/// Half-open day ranges blocked by holidays.
#[derive(Debug, Clone, Default)]
pub struct HolidaySpans {
    spans: Vec<(NaiveDate, NaiveDate)>,
}

impl HolidaySpans {
    pub fn new(holidays: &[Event]) -> Self {
        let spans = holidays
            .iter()
            .map(|h| {
                let end = h
                    .preferred_date
                    .checked_add_days(Days::new(h.span_len() as u64))
                    .unwrap_or(NaiveDate::MAX);
                (h.preferred_date, end)
            })
            .collect();
        Self { spans }
    }

    /// True if `[start, start + length)` touches any holiday.
    pub fn overlaps(&self, start: NaiveDate, length: i64) -> bool {
        let end = start
            .checked_add_days(Days::new(length.max(1) as u64))
            .unwrap_or(NaiveDate::MAX);
        self.spans.iter().any(|&(h_start, h_end)| start < h_end && h_start < end)
    }

}

// ── Results ─────────────────────────────────────────────────────────────────

/// Non-fatal findings of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScheduleWarning {
    /// Events with no path to or from the anchor.
    UnreachableEvents { names: Vec<String> },
    /// An ancestor of the anchor was back-derived onto a blackout day or a holiday.
    PinnedViolation { event: String, date: NaiveDate },
    /// An anchor ancestor is a holiday whose date does not match the offset chain.
    HolidayMismatch {
        holiday: String,
        event: String,
        date: NaiveDate,
    },
}

/// The outcome for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEvent {
    pub name: String,
    /// First day of the event.
    pub start: NaiveDate,
    /// Last day of the event (inclusive).
    pub end: NaiveDate,
    /// The date before any blackout or holiday slip.
    pub naive_start: NaiveDate,
    /// `start - naive_start` in days; never negative.
    pub shift_days: i64,
    /// Anchored or back-derived rather than searched.
    pub pinned: bool,
}

/// Resolved dates of a schedule, in resolution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    entries: Vec<ResolvedEvent>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Resolution {
    fn push(&mut self, entry: ResolvedEvent) {
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedEvent> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).map(|e| e.start)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Resolver ────────────────────────────────────────────────────────────────

/// Walks components of an [`EventGraph`] and assigns start dates.
pub struct DateResolver<'g, 'a> {
    graph: &'g EventGraph<'a>,
    holidays: HolidaySpans,
    options: &'g ResolveOptions,
    dates: Vec<Option<NaiveDate>>,
    resolution: Resolution,
    warnings: Vec<ScheduleWarning>,
}

impl<'g, 'a> DateResolver<'g, 'a> {
    pub fn new(graph: &'g EventGraph<'a>, holidays: &[Event], options: &'g ResolveOptions) -> Self {
        Self {
            graph,
            holidays: HolidaySpans::new(holidays),
            options,
            dates: vec![None; graph.len()],
            resolution: Resolution::default(),
            warnings: Vec::new(),
        }
    }

    pub fn date_of(&self, id: NodeId) -> Option<NaiveDate> {
        self.dates[id]
    }

    /// Resolve every entry of `component`, with `pin` fixed at `pin_date`.
    ///
    /// `pin` must belong to `component`.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::UnsatisfiableConstraint`] for the first event with
    /// no allowed start inside the search window, or
    /// [`ScheduleError::DateOutOfRange`] if date arithmetic leaves chrono's
    /// calendar.
    pub fn resolve_component(
        &mut self,
        component: &Component,
        pin: NodeId,
        pin_date: NaiveDate,
    ) -> Result<()> {
        let graph = self.graph;
        self.resolve_pin(pin, pin_date)?;
        self.resolve_ancestors(pin)?;

        for &id in &component.order {
            if self.dates[id].is_some() {
                continue;
            }
            let node = graph.node(id);
            if node.is_holiday() {
                self.record(id, node.event.preferred_date, node.event.preferred_date, true)?;
                continue;
            }
            let parent_date = node
                .parent
                .and_then(|p| self.dates[p])
                .ok_or_else(|| out_of_range(node.name()))?;
            let naive = add_days(parent_date, node.event.parent_offset)
                .ok_or_else(|| out_of_range(node.name()))?;
            let start = self.search(id, naive)?;
            self.record(id, naive, start, false)?;
        }
        Ok(())
    }

    fn resolve_pin(&mut self, pin: NodeId, pin_date: NaiveDate) -> Result<()> {
        let graph = self.graph;
        let node = graph.node(pin);
        if node.is_holiday() {
            return self.record(pin, node.event.preferred_date, node.event.preferred_date, true);
        }
        match self.options.anchor_policy {
            AnchorPolicy::Trusted => {
                self.check_pinned(pin, pin_date);
                self.record(pin, pin_date, pin_date, true)
            }
            AnchorPolicy::Enforce => {
                let start = self.search(pin, pin_date)?;
                self.record(pin, pin_date, start, true)
            }
        }
    }

    fn resolve_ancestors(&mut self, pin: NodeId) -> Result<()> {
        let graph = self.graph;
        let mut child = pin;
        for parent in graph.ancestors(pin) {
            let parent_node = graph.node(parent);
            let child_node = graph.node(child);
            let child_date = self.dates[child].ok_or_else(|| out_of_range(child_node.name()))?;

            let date = if parent_node.is_holiday() {
                let fixed = parent_node.event.preferred_date;
                if add_days(fixed, child_node.event.parent_offset) != Some(child_date) {
                    warn!(
                        "Holiday '{}' does not line up with '{}' at {}",
                        parent_node.name(),
                        child_node.name(),
                        child_date
                    );
                    self.warnings.push(ScheduleWarning::HolidayMismatch {
                        holiday: parent_node.name().to_string(),
                        event: child_node.name().to_string(),
                        date: child_date,
                    });
                }
                fixed
            } else {
                let derived = child_node
                    .event
                    .parent_offset
                    .checked_neg()
                    .and_then(|back| add_days(child_date, back))
                    .ok_or_else(|| out_of_range(parent_node.name()))?;
                if !self.check_pinned(parent, derived) {
                    self.warnings.push(ScheduleWarning::PinnedViolation {
                        event: parent_node.name().to_string(),
                        date: derived,
                    });
                }
                derived
            };
            self.record(parent, date, date, true)?;
            child = parent;
        }
        Ok(())
    }

    /// Earliest allowed start at or after `naive`, within the search window.
    fn search(&self, id: NodeId, naive: NaiveDate) -> Result<NaiveDate> {
        let graph = self.graph;
        let node = graph.node(id);
        for step in 0..=self.options.search_window_days {
            let Some(day) = naive.checked_add_days(Days::new(step as u64)) else {
                return Err(out_of_range(node.name()));
            };
            if self.allowed(node.event, day) {
                if step > 0 {
                    debug!(
                        "Shifted '{}' from {} to {} (+{} days)",
                        node.name(),
                        naive,
                        day,
                        step
                    );
                }
                return Ok(day);
            }
        }
        Err(ScheduleError::UnsatisfiableConstraint {
            event: node.name().to_string(),
        })
    }

    fn allowed(&self, event: &Event, day: NaiveDate) -> bool {
        span_allowed(day, event.span_len(), &event.blackout_days)
            && !self.holidays.overlaps(day, event.span_len())
    }

    /// Logs and returns false if a pinned date breaks the event's rules.
    fn check_pinned(&self, id: NodeId, date: NaiveDate) -> bool {
        let graph = self.graph;
        let node = graph.node(id);
        let allowed = self.allowed(node.event, date);
        if !allowed {
            warn!(
                "Pinned event '{}' at {} falls on a blackout day or holiday",
                node.name(),
                date
            );
        }
        allowed
    }

    fn record(&mut self, id: NodeId, naive: NaiveDate, start: NaiveDate, pinned: bool) -> Result<()> {
        let graph = self.graph;
        self.dates[id] = Some(start);
        let node = graph.node(id);
        if node.is_holiday() {
            return Ok(());
        }
        let end = add_days(start, node.event.span_len() - 1)
            .ok_or_else(|| out_of_range(node.name()))?;
        self.resolution.push(ResolvedEvent {
            name: node.name().to_string(),
            start,
            end,
            naive_start: naive,
            shift_days: (start - naive).num_days(),
            pinned,
        });
        Ok(())
    }

    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }

    pub fn finish(self) -> Resolution {
        self.resolution
    }

    pub fn into_parts(self) -> (Resolution, Vec<ScheduleWarning>) {
        (self.resolution, self.warnings)
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn out_of_range(name: &str) -> ScheduleError {
    ScheduleError::DateOutOfRange {
        event: name.to_string(),
    }
}
