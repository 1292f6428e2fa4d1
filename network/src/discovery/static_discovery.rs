use crate::discovery::Discovery;
use crate::types::ProcessId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Fixed set of peers known to one process.
///
/// Kept ordered so that the same entropy source always picks the same peers.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    known_nodes: BTreeSet<ProcessId>,
}

impl StaticDiscovery {
    pub fn new(known_nodes: impl IntoIterator<Item = ProcessId>) -> Self {
        Self {
            known_nodes: known_nodes.into_iter().collect(),
        }
    }

    /// Every process of a `count`-sized simulation except `me`.
    pub fn peers_of(me: ProcessId, count: usize) -> Self {
        Self::new(
            (0..count)
                .filter_map(ProcessId::from_index)
                .filter(|id| *id != me),
        )
    }

    pub fn add_node(&mut self, node: ProcessId) {
        self.known_nodes.insert(node);
    }

    pub fn len(&self) -> usize {
        self.known_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_nodes.is_empty()
    }
}

impl Discovery for StaticDiscovery {
    fn list_known_nodes(&self) -> impl IntoIterator<Item = ProcessId> {
        self.known_nodes.iter().copied().collect::<Vec<_>>()
    }

    fn get_random_nodes(
        &self,
        cnt: usize,
        mut entropy: impl Rng,
    ) -> impl IntoIterator<Item = ProcessId> {
        let mut list = self.known_nodes.iter().copied().collect::<Vec<_>>();
        list.shuffle(&mut entropy);
        list.truncate(cnt);
        list
    }
}
