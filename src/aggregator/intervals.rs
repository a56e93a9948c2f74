//! Reconstruct active/inactive intervals from scheduling events.
//!
//! Active intervals run from a subject's switch-to (or machine run) to its
//! next switch-from. Inactive intervals run from its switch-from (or its
//! creation) to its next switch-to/run. Time is counted in single-tick events;
//! timestamps carried by the switch events themselves are not used.

use super::subjects::SubjectArena;
use crate::event::{Category, Event, Interval, IntervalKind, SubjectId, Tick};
use crate::pipeline::Record;
use log::trace;

/// Where a subject's current inactive period began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InactiveOrigin {
    Created,
    SwitchedOut,
}

#[derive(Debug, Default)]
struct SubjectState {
    inactive_since: Option<(Tick, InactiveOrigin)>,
    active_since: Option<Tick>,
    exited: bool,
}

impl SubjectState {
    fn close_active(&mut self, subject: SubjectId, now: Tick) -> Option<Interval> {
        let start = self.active_since.take()?;
        Some(Interval::new(subject, IntervalKind::Active, start, now))
    }

    fn close_inactive(&mut self, subject: SubjectId, now: Tick) -> Option<Interval> {
        let (start, origin) = self.inactive_since.take()?;
        if self.exited {
            return None;
        }
        // Dispatched on the tick it was created: it never waited
        if origin == InactiveOrigin::Created && start == now {
            return None;
        }
        Some(Interval::new(subject, IntervalKind::Inactive, start, now))
    }
}

/// Per-subject state machine turning raw events into interval records
///
/// Every event except single ticks is forwarded after any interval it
/// closes, so downstream consumers see one ordered stream.
#[derive(Debug, Default)]
pub struct IntervalExtractor {
    now: Tick,
    subjects: SubjectArena<SubjectState>,
}

impl IntervalExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical clock
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Whether `subject` has reached its exit event
    pub fn has_exited(&self, subject: SubjectId) -> bool {
        self.subjects.get(subject).is_some_and(|s| s.exited)
    }

    /// Subjects seen so far
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Consume one event, returning the records it produces in order
    pub fn feed(&mut self, mut event: Event) -> Vec<Record> {
        let now = self.now;
        let subject = event.subject;
        let mut records = Vec::with_capacity(2);

        match event.category {
            Category::SingleTick => {
                self.now += 1;
                return records;
            }

            Category::SwitchTo | Category::Run => {
                let state = self.subjects.ensure(subject);
                state.active_since = Some(now);
                if let Some(interval) = state.close_inactive(subject, now) {
                    records.push(Record::Interval(interval));
                }
            }

            Category::SwitchFrom => {
                let state = self.subjects.ensure(subject);
                state.inactive_since = Some((now, InactiveOrigin::SwitchedOut));
                if let Some(interval) = state.close_active(subject, now) {
                    records.push(Record::Interval(interval));
                }
            }

            Category::SubjectCreated => {
                let state = self.subjects.ensure(subject);
                state.inactive_since = Some((now, InactiveOrigin::Created));
            }

            Category::SubjectExited => {
                self.subjects.ensure(subject).exited = true;
                event.tag = now;
            }

            Category::Other(_) => {}
        }

        for record in &records {
            trace!("t={} emit {:?}", now, record);
        }
        records.push(Record::Event(event));
        records
    }
}
