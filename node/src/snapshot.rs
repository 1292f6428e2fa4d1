use crate::time::LogicalTimeProvider;
use network::types::{ProcessId, Timestamp};
use std::collections::BTreeMap;
use std::fmt;

/// Clock values of every process at one instant. Never changes once captured.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Snapshot {
    sequence: usize,
    clocks: BTreeMap<ProcessId, Timestamp>,
}

impl Snapshot {
    pub(crate) fn capture<'a, LT: LogicalTimeProvider + 'a>(
        sequence: usize,
        processes: impl IntoIterator<Item = &'a LT>,
    ) -> Self {
        Self {
            sequence,
            clocks: processes
                .into_iter()
                .map(|clock| (clock.id(), clock.now()))
                .collect(),
        }
    }

    /// Position of this snapshot in the history.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn get(&self, process: ProcessId) -> Option<Timestamp> {
        self.clocks.get(&process).copied()
    }

    pub fn clocks(&self) -> &BTreeMap<ProcessId, Timestamp> {
        &self.clocks
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProcessId, Timestamp)> + '_ {
        self.clocks.iter().map(|(id, ts)| (*id, *ts))
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot {}:", self.sequence)?;
        for (id, ts) in self.iter() {
            write!(f, " {id}={ts}")?;
        }
        Ok(())
    }
}

/// Append-only log of snapshots in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
}

impl SnapshotHistory {
    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn get(&self, sequence: usize) -> Option<&Snapshot> {
        self.snapshots.get(sequence)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl<'a> IntoIterator for &'a SnapshotHistory {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
