//! Small reducers used by analytics: first-seen ordered tallies, sorted
//! bucket counts and stable top-N selection.

use ahash::AHashMap;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Counter that remembers the order in which keys were first seen, so equal
/// counts can be broken by discovery order.
#[derive(Clone, Debug)]
pub struct OrderedCounts<K> {
    index: AHashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for OrderedCounts<K> {
    fn default() -> Self {
        Self { index: AHashMap::new(), entries: Vec::new() }
    }
}

impl<K: Hash + Eq + Clone> OrderedCounts<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// The `n` largest counts; ties keep first-seen order.
    pub fn most_common(self, n: usize) -> Vec<(K, usize)> {
        top_n_by_key(self.entries, n, |(_, c)| *c as i64)
    }
}

impl<K: Hash + Eq + Clone> FromIterator<K> for OrderedCounts<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut c = Self::new();
        for k in iter {
            c.ingest(k);
        }
        c
    }
}

/// Count occurrences per key, ascending by key. Keys that never occur are absent.
pub fn bucket_counts<K: Ord>(keys: impl IntoIterator<Item = K>) -> BTreeMap<K, usize> {
    let mut m = BTreeMap::new();
    for k in keys {
        *m.entry(k).or_insert(0) += 1;
    }
    m
}

/// Largest `n` items by `key`, descending. The sort is stable, so items with
/// equal keys keep their input order.
pub fn top_n_by_key<T>(mut items: Vec<T>, n: usize, key: impl Fn(&T) -> i64) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(n);
    items
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Round half away from zero to two decimals.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
