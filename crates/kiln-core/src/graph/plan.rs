//! Ordered, deduplicated accumulation of rebuild entries.
//!
//! A plan keeps one entry per node and a node-to-position index in lockstep
//! with the entry list, so membership checks during merges stay O(1).

use std::collections::HashMap;

#[derive(Debug)]
pub(super) struct PlanEntry {
    pub(super) node: usize,
    pub(super) reasons: Vec<String>,
}

#[derive(Debug, Default)]
pub(super) struct RebuildPlan {
    entries: Vec<PlanEntry>,
    positions: HashMap<usize, usize>,
}

impl RebuildPlan {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add `node` with `reason`, or append the reason if it is already planned.
    pub(super) fn record(&mut self, node: usize, reason: String) {
        match self.positions.get(&node) {
            Some(&pos) => self.entries[pos].reasons.push(reason),
            None => self.push(PlanEntry {
                node,
                reasons: vec![reason],
            }),
        }
    }

    /// Merge `other` entry by entry, in its order.
    ///
    /// An entry already present only contributes its reasons. A new entry is
    /// placed right before the first planned node that comes after it in
    /// `other` (something it caused), or at the end when there is none.
    /// Positions below `floor` are never used as insertion points: they hold
    /// nodes that caused the whole of `other`, which a dependency cycle can
    /// make reappear among its entries.
    pub(super) fn merge(&mut self, other: RebuildPlan, floor: usize) {
        let order: Vec<usize> = other.entries.iter().map(|e| e.node).collect();

        for (i, entry) in other.entries.into_iter().enumerate() {
            if let Some(&pos) = self.positions.get(&entry.node) {
                self.entries[pos].reasons.extend(entry.reasons);
                continue;
            }

            let caused = order[i + 1..]
                .iter()
                .filter_map(|node| self.positions.get(node).copied())
                .filter(|&pos| pos >= floor)
                .min();

            match caused {
                Some(pos) => self.insert(pos, entry),
                None => self.push(entry),
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn into_entries(self) -> Vec<PlanEntry> {
        self.entries
    }

    fn push(&mut self, entry: PlanEntry) {
        self.positions.insert(entry.node, self.entries.len());
        self.entries.push(entry);
    }

    fn insert(&mut self, pos: usize, entry: PlanEntry) {
        for p in self.positions.values_mut() {
            if *p >= pos {
                *p += 1;
            }
        }
        self.positions.insert(entry.node, pos);
        self.entries.insert(pos, entry);
    }
}
