//! Sorting and de-duplication.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::sorter::Sorter;
use crate::types::Frame;

impl<T: Clone> Frame<T> {
    /// Stable sort by a [`Sorter`].
    pub fn sort(&self, sorter: &Sorter<'_, T>) -> Frame<T> {
        let mut rows = self.rows().to_vec();
        sorter.sort(&mut rows);
        self.derive(rows)
    }

    /// Stable ascending sort by one derived key.
    pub fn sort_asc<V, F>(&self, key: F) -> Frame<T>
    where
        V: Ord,
        F: Fn(&T) -> V,
    {
        let mut rows = self.rows().to_vec();
        rows.sort_by_key(|r| key(r));
        self.derive(rows)
    }

    /// Stable descending sort by one derived key.
    pub fn sort_desc<V, F>(&self, key: F) -> Frame<T>
    where
        V: Ord,
        F: Fn(&T) -> V,
    {
        let mut rows = self.rows().to_vec();
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
        self.derive(rows)
    }

    /// Drop repeated rows, keeping the first occurrence.
    pub fn distinct(&self) -> Frame<T>
    where
        T: Eq + Hash,
    {
        let mut seen = HashSet::with_capacity(self.len());
        let rows = self.iter().filter(|r| seen.insert(*r)).cloned().collect();
        self.derive(rows)
    }

    /// Drop rows whose derived key was already seen, keeping the first occurrence.
    pub fn distinct_by<K, F>(&self, key: F) -> Frame<T>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut seen = HashSet::with_capacity(self.len());
        let rows = self.iter().filter(|r| seen.insert(key(r))).cloned().collect();
        self.derive(rows)
    }

    /// De-duplicate by key, letting `pick` choose the survivor among rows sharing a key.
    ///
    /// Survivors appear in first-seen key order.
    pub fn distinct_by_select<K, F, P>(&self, key: F, mut pick: P) -> Frame<T>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
        P: FnMut(&[T]) -> T,
    {
        let mut buckets: IndexMap<K, Vec<T>> = IndexMap::new();
        for r in self.iter() {
            buckets.entry(key(r)).or_default().push(r.clone());
        }
        let rows = buckets
            .into_values()
            .map(|bucket| match <[T; 1]>::try_from(bucket) {
                Ok([only]) => only,
                Err(many) => pick(&many),
            })
            .collect();
        self.derive(rows)
    }

    /// Drop rows that compare equal under `sorter` to an earlier row, keeping the first one.
    pub fn distinct_by_sorter(&self, sorter: &Sorter<'_, T>) -> Frame<T> {
        self.distinct_by_sorter_select(sorter, |bucket| bucket[0].clone())
    }

    /// De-duplicate rows that compare equal under `sorter`, letting `pick` choose the survivor.
    ///
    /// Survivors appear in the order their first row was seen.
    pub fn distinct_by_sorter_select<P>(&self, sorter: &Sorter<'_, T>, mut pick: P) -> Frame<T>
    where
        P: FnMut(&[T]) -> T,
    {
        let mut buckets: Vec<Vec<T>> = Vec::new();
        for r in self.iter() {
            match buckets
                .iter_mut()
                .find(|b| sorter.compare(&b[0], r) == Ordering::Equal)
            {
                Some(bucket) => bucket.push(r.clone()),
                None => buckets.push(vec![r.clone()]),
            }
        }
        let rows = buckets.iter().map(|bucket| pick(bucket)).collect();
        self.derive(rows)
    }
}
