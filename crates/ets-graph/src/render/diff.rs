//! Keyed enter/update/exit reconciliation.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{Link, NodeId, RenderId};

/// Keys split by what happened to them between two passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff<K> {
    /// Present now, absent before. Current order.
    pub enter: Vec<K>,
    /// Present in both. Current order.
    pub update: Vec<K>,
    /// Present before, absent now. Previous order.
    pub exit: Vec<K>,
}

impl<K> Default for Diff<K> {
    fn default() -> Self {
        Self {
            enter: Vec::new(),
            update: Vec::new(),
            exit: Vec::new(),
        }
    }
}

impl<K> Diff<K> {
    /// Total number of keys touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enter.len() + self.update.len() + self.exit.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits `current` against `previous` by key.
pub fn diff_keys<K, V, W>(previous: &IndexMap<K, V>, current: &IndexMap<K, W>) -> Diff<K>
where
    K: Copy + Eq + Hash,
{
    let (update, enter): (Vec<K>, Vec<K>) = current
        .keys()
        .copied()
        .partition(|key| previous.contains_key(key));
    let exit = previous
        .keys()
        .copied()
        .filter(|key| !current.contains_key(key))
        .collect();

    Diff {
        enter,
        update,
        exit,
    }
}

/// What was on screen after the last pass, keyed by render id.
///
/// Links are keyed by their target's render id; every node has at most one
/// parent, so this is unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub nodes: IndexMap<RenderId, NodeId>,
    pub links: IndexMap<RenderId, Link>,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[u64]) -> IndexMap<RenderId, ()> {
        values.iter().map(|v| (RenderId::new(*v), ())).collect()
    }

    fn ids(values: &[u64]) -> Vec<RenderId> {
        values.iter().copied().map(RenderId::new).collect()
    }

    #[test]
    fn test_diff_partitions_keys() {
        let diff = diff_keys(&keys(&[1, 2, 3, 4]), &keys(&[1, 3, 5, 6]));

        assert_eq!(diff.enter, ids(&[5, 6]));
        assert_eq!(diff.update, ids(&[1, 3]));
        assert_eq!(diff.exit, ids(&[2, 4]));
        assert_eq!(diff.len(), 6);
    }

    #[test]
    fn test_first_pass_all_enter() {
        let diff = diff_keys(&keys(&[]), &keys(&[1, 2]));
        assert_eq!(diff.enter, ids(&[1, 2]));
        assert!(diff.update.is_empty());
        assert!(diff.exit.is_empty());
    }

    #[test]
    fn test_unchanged_all_update() {
        let diff = diff_keys(&keys(&[3, 1, 2]), &keys(&[1, 2, 3]));
        assert_eq!(diff.update, ids(&[1, 2, 3]));
        assert!(diff.enter.is_empty() && diff.exit.is_empty());
    }

    #[test]
    fn test_empty_diff() {
        let diff: Diff<RenderId> = diff_keys(&keys(&[]), &keys(&[]));
        assert!(diff.is_empty());
        assert!(ViewState::new().is_empty());
    }
}
