use super::{GroupBy, GroupKey};
use crate::log::EventRecord;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Records grouped by key. Groups iterate in discovery order and keep arrival order
/// inside each group.
pub type Groups<'a> = IndexMap<GroupKey, Vec<&'a EventRecord>>;

/// Groupings built in a single pass over a record sequence
#[derive(Debug, Default)]
pub struct Aggregation<'a> {
    pub by_event: Groups<'a>,
    pub by_session: Groups<'a>,
    pub by_thread: Groups<'a>,
    /// Distinct thread ids, sorted
    pub thread_ids: BTreeSet<&'a str>,
}

pub fn aggregate<'a, I>(records: I) -> Aggregation<'a>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut aggregation = Aggregation::default();

    for record in records {
        aggregation
            .by_event
            .entry(GroupKey::Event(record.event_type.clone()))
            .or_default()
            .push(record);
        aggregation
            .by_session
            .entry(GroupKey::Session(record.session_id))
            .or_default()
            .push(record);
        aggregation
            .by_thread
            .entry(GroupKey::Thread(record.thread_id.clone()))
            .or_default()
            .push(record);
        aggregation.thread_ids.insert(record.thread_id.as_str());
    }

    aggregation
}

/// Sum of durations in a group. Widened so that any number of `u64` durations fits.
pub fn total(group: &[&EventRecord]) -> u128 {
    group.iter().map(|r| u128::from(r.duration_ms)).sum()
}

/// Mean duration of a group. The group must not be empty.
pub fn mean(group: &[&EventRecord]) -> f64 {
    debug_assert!(!group.is_empty(), "mean of an empty group");
    total(group) as f64 / group.len() as f64
}

/// The records of a single thread with their groupings and per-event averages.
///
/// Everything downstream (summaries, rankings, anomaly flags, chart series) is
/// computed from a view, never from the unfiltered log.
#[derive(Debug)]
pub struct ThreadView<'a> {
    pub thread_id: String,
    pub records: Vec<&'a EventRecord>,
    pub by_event: Groups<'a>,
    pub by_session: Groups<'a>,
    event_averages: IndexMap<&'a str, f64>,
}

impl<'a> ThreadView<'a> {
    /// Restrict `records` to `thread_id`. Fails when the thread has no records.
    pub fn new(records: &'a [EventRecord], thread_id: &str) -> Result<Self> {
        let filtered: Vec<&EventRecord> = records
            .iter()
            .filter(|r| r.thread_id == thread_id)
            .collect();

        if filtered.is_empty() {
            return Err(Error::UnknownThread(thread_id.to_string()));
        }

        let Aggregation {
            by_event,
            by_session,
            ..
        } = aggregate(filtered.iter().copied());

        let event_averages = by_event
            .values()
            .map(|group| (group[0].event_type.as_str(), mean(group)))
            .collect();

        tracing::debug!(
            "Thread {}: {} records, {} event types, {} sessions",
            thread_id,
            filtered.len(),
            by_event.len(),
            by_session.len()
        );

        Ok(Self {
            thread_id: thread_id.to_string(),
            records: filtered,
            by_event,
            by_session,
            event_averages,
        })
    }

    pub fn groups(&self, group_by: GroupBy) -> &Groups<'a> {
        match group_by {
            GroupBy::EventType => &self.by_event,
            GroupBy::Session => &self.by_session,
        }
    }

    /// Mean duration of an event type within this thread
    pub fn event_average(&self, event_type: &str) -> Option<f64> {
        self.event_averages.get(event_type).copied()
    }
}
