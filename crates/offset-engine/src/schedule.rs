//! The [`Schedule`] aggregate: registration, anchoring and resolution.
//!
//! A schedule collects events and holidays, then [`Schedule::build_schedule`]
//! resolves every event's start date in one pass. Until the next successful
//! build the resolved dates do not change; registering another event or
//! holiday discards them.
//!
//! A failed build leaves no resolved dates behind.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::anchor::{select_anchor, Anchor};
use crate::error::{Result, ScheduleError};
use crate::event::Event;
use crate::graph::EventGraph;
use crate::resolver::{
    DateResolver, Resolution, ResolveOptions, ScheduleWarning, UnreachablePolicy,
};

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    events: Vec<Event>,
    holidays: Vec<Event>,
    anchor: Option<Anchor>,
    options: ResolveOptions,
    resolution: Option<Resolution>,
    warnings: Vec<ScheduleWarning>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ResolveOptions) {
        self.options = options;
        self.invalidate();
    }

    /// Register an event. Validation is deferred to [`Schedule::build_schedule`].
    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
        self.invalidate();
    }

    /// Register a holiday. No event may overlap it.
    pub fn add_holiday(&mut self, holiday: Event) {
        self.holidays.push(holiday);
        self.invalidate();
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn holidays(&self) -> &[Event] {
        &self.holidays
    }

    /// Anchor the schedule to the event called `name`.
    ///
    /// Returns `Ok(true)` if such an event exists. Otherwise the event with
    /// the earliest preferred date becomes the anchor and `Ok(false)` is
    /// returned; check the flag to know whether the request was honored.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EmptySchedule`] if no events are registered.
    pub fn anchor_to(&mut self, name: &str) -> Result<bool> {
        let anchor = select_anchor(&self.events, name)?;
        let matched = anchor.matched;
        debug!(
            "Anchored to '{}' at {} (requested '{}')",
            anchor.event, anchor.date, name
        );
        if self.anchor.as_ref() != Some(&anchor) {
            self.resolution = None;
            self.warnings.clear();
        }
        self.anchor = Some(anchor);
        Ok(matched)
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Resolve a start date for every event.
    ///
    /// Re-selects the anchor (by the stored anchor name, or the earliest
    /// preferred date if none was ever set), validates the event graph, then
    /// walks it from the anchor. Trees not connected to the anchor are
    /// reported through [`Schedule::warnings`] and handled according to
    /// [`ResolveOptions::unreachable`].
    ///
    /// # Errors
    ///
    /// The first of [`ScheduleError::EmptySchedule`], a structural error from
    /// [`EventGraph::build`], or a resolution error
    /// ([`ScheduleError::UnsatisfiableConstraint`],
    /// [`ScheduleError::DateOutOfRange`]). On error no dates are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use offset_engine::{Event, Schedule};
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
    /// let mut schedule = Schedule::new();
    /// schedule.add_event(Event::new("Launch", 1, d(3))); // Friday
    /// schedule.add_event(Event::weekend_blackout("Deploy", 1, d(1)).with_parent("Launch", 1));
    /// assert!(schedule.anchor_to("Launch").unwrap());
    ///
    /// schedule.build_schedule().unwrap();
    /// assert_eq!(schedule.resolved_date("Deploy"), Some(d(6))); // Monday
    /// ```
    pub fn build_schedule(&mut self) -> Result<()> {
        self.invalidate();
        match self.resolve() {
            Ok((resolution, warnings)) => {
                self.resolution = Some(resolution);
                self.warnings = warnings;
                Ok(())
            }
            Err(err) => {
                warn!("Schedule build failed: {}", err);
                Err(err)
            }
        }
    }

    fn resolve(&mut self) -> Result<(Resolution, Vec<ScheduleWarning>)> {
        if self.events.is_empty() {
            return Err(ScheduleError::EmptySchedule);
        }
        let requested = self
            .anchor
            .as_ref()
            .map(|a| a.event.clone())
            .unwrap_or_default();
        let anchor = select_anchor(&self.events, &requested)?;
        debug!("Building schedule from anchor '{}' at {}", anchor.event, anchor.date);
        self.anchor = Some(anchor.clone());

        let graph = EventGraph::build(&self.events, &self.holidays)?;
        let anchor_id = graph
            .get(&anchor.event)
            .ok_or_else(|| ScheduleError::UnknownAnchor {
                name: anchor.event.clone(),
            })?;
        let mut resolver = DateResolver::new(&graph, &self.holidays, &self.options);

        let anchored = graph.component_of(anchor_id);
        resolver.resolve_component(&anchored, anchor_id, anchor.date)?;

        let mut unreachable = Vec::new();
        for component in graph.components() {
            if component.root == anchored.root {
                continue;
            }
            let names: Vec<String> = component
                .order
                .iter()
                .map(|&id| graph.node(id))
                .filter(|node| !node.is_holiday())
                .map(|node| node.name().to_string())
                .collect();
            if names.is_empty() {
                continue;
            }
            unreachable.extend(names);

            if self.options.unreachable == UnreachablePolicy::ResolveIndependently {
                let root = graph.node(component.root);
                debug!(
                    "Resolving '{}' independently from {}",
                    root.name(),
                    root.event.preferred_date
                );
                resolver.resolve_component(
                    &component,
                    component.root,
                    root.event.preferred_date,
                )?;
            }
        }

        let (resolution, mut warnings) = resolver.into_parts();
        if !unreachable.is_empty() {
            warn!(
                "{} event(s) not connected to anchor '{}': {}",
                unreachable.len(),
                anchor.event,
                unreachable.join(", ")
            );
            warnings.push(ScheduleWarning::UnreachableEvents { names: unreachable });
        }

        Ok((resolution, warnings))
    }

    fn invalidate(&mut self) {
        self.resolution = None;
        self.warnings.clear();
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// The resolved start date of event `name`, once built.
    pub fn resolved_date(&self, name: &str) -> Option<NaiveDate> {
        self.resolution.as_ref()?.date(name)
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Warnings from the last successful build.
    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }
}
