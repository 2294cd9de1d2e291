//! Run trace for replay and auditing.
//!
//! Every event the scheduler pops produces one [`TraceEntry`], whether its
//! action ran or it had been deactivated. A [`Trace`] collects them in
//! execution order.

use crate::models::context::Context;

/// Outcome of executing one event: `(time, result, context)`
///
/// `result` is `None` for deactivated events and for events without an action.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry<R> {
    pub time: f64,
    pub result: Option<R>,
    pub context: Context,
}

impl<R> TraceEntry<R> {
    /// Returns `true` if an action actually ran for this entry
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Split into the `(time, result, context)` triple
    pub fn into_parts(self) -> (f64, Option<R>, Context) {
        (self.time, self.result, self.context)
    }
}

/// Ordered log of trace entries.
///
/// This is a simple wrapper around `Vec<TraceEntry<R>>` with query helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<R> {
    entries: Vec<TraceEntry<R>>,
}

impl<R> Trace<R> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn push(&mut self, entry: TraceEntry<R>) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in execution order
    pub fn entries(&self) -> &[TraceEntry<R>] {
        &self.entries
    }

    /// Entries recorded at exactly `time`
    pub fn entries_at(&self, time: f64) -> Vec<&TraceEntry<R>> {
        self.entries.iter().filter(|e| e.time == time).collect()
    }

    /// Results in execution order, `None` where no action ran
    pub fn results(&self) -> impl Iterator<Item = Option<&R>> + '_ {
        self.entries.iter().map(|e| e.result.as_ref())
    }

    /// Number of entries whose action actually ran
    pub fn executed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_result()).count()
    }

    /// Time of the last entry
    pub fn last_time(&self) -> Option<f64> {
        self.entries.last().map(|e| e.time)
    }

    pub fn into_entries(self) -> Vec<TraceEntry<R>> {
        self.entries
    }
}

impl<R> Default for Trace<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<TraceEntry<R>> for Trace<R> {
    fn from_iter<I: IntoIterator<Item = TraceEntry<R>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<R> IntoIterator for Trace<R> {
    type Item = TraceEntry<R>;
    type IntoIter = std::vec::IntoIter<TraceEntry<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
