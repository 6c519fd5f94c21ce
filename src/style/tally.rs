//! Insertion-ordered weighted counting.

use std::collections::HashMap;
use std::hash::Hash;

/// Accumulates weight per key and ranks keys by total weight.
///
/// Ties are broken by first insertion, so the ranking never depends on hash
/// order.
#[derive(Debug, Clone)]
pub struct WeightedTally<K> {
    entries: Vec<(K, f64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for WeightedTally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> WeightedTally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `key`. Non-finite or negative weights are ignored.
    pub fn add(&mut self, key: K, weight: f64) {
        if !weight.is_finite() || weight < 0.0 {
            return;
        }
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += weight,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, weight));
            },
        }
    }

    /// Merge another tally; keys new to `self` keep `other`'s relative order.
    pub fn merge(&mut self, other: &WeightedTally<K>) {
        for (key, weight) in &other.entries {
            self.add(key.clone(), *weight);
        }
    }

    pub fn weight(&self, key: &K) -> f64 {
        self.index.get(key).map_or(0.0, |&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys by weight descending, then first-seen ascending.
    pub fn ranked(&self) -> Vec<&K> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        // Stable sort keeps insertion order among equal weights
        order.sort_by(|&a, &b| self.entries[b].1.total_cmp(&self.entries[a].1));
        order.into_iter().map(|i| &self.entries[i].0).collect()
    }

    /// Highest-ranked key.
    pub fn top(&self) -> Option<&K> {
        self.top_where(|_| true)
    }

    /// Highest-ranked key satisfying `pred`.
    pub fn top_where(&self, mut pred: impl FnMut(&K) -> bool) -> Option<&K> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (key, weight)) in self.entries.iter().enumerate() {
            if !pred(key) {
                continue;
            }
            if best.is_none_or(|(_, w)| *weight > w) {
                best = Some((i, *weight));
            }
        }
        best.map(|(i, _)| &self.entries[i].0)
    }
}
