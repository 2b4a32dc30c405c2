//! Core data model types.
//!
//! A [`Frame`] is an ordered, immutable sequence of typed records. Every transformation borrows
//! its input and returns a freshly allocated frame; nothing is mutated in place.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::number::{NumberFormat, RoundingMode};

/// Two-column tuple row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FI2<C1, C2> {
    pub c1: C1,
    pub c2: C2,
}

impl<C1, C2> FI2<C1, C2> {
    pub fn new(c1: C1, c2: C2) -> Self {
        Self { c1, c2 }
    }
}

/// Three-column tuple row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FI3<C1, C2, C3> {
    pub c1: C1,
    pub c2: C2,
    pub c3: C3,
}

impl<C1, C2, C3> FI3<C1, C2, C3> {
    pub fn new(c1: C1, c2: C2, c3: C3) -> Self {
        Self { c1, c2, c3 }
    }
}

/// Four-column tuple row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FI4<C1, C2, C3, C4> {
    pub c1: C1,
    pub c2: C2,
    pub c3: C3,
    pub c4: C4,
}

impl<C1, C2, C3, C4> FI4<C1, C2, C3, C4> {
    pub fn new(c1: C1, c2: C2, c3: C3, c4: C4) -> Self {
        Self { c1, c2, c3, c4 }
    }
}

/// Maximum and minimum over one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaxMin<T> {
    pub max: T,
    pub min: T,
}

impl<T> MaxMin<T> {
    pub fn new(max: T, min: T) -> Self {
        Self { max, min }
    }
}

/// Ordered, immutable sequence of records.
///
/// The frame also carries a [`NumberFormat`] that decimal-producing operations (averages,
/// percentages) fall back on when no explicit scale is given. Frames derived from this one
/// inherit it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    rows: Vec<T>,
    format: NumberFormat,
}

impl<T> Default for Frame<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Frame<T> {
    /// Create a frame over `rows` with the default number format.
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            format: NumberFormat::default(),
        }
    }

    /// Build a frame of another row type that keeps this frame's number format.
    pub(crate) fn derive<R>(&self, rows: Vec<R>) -> Frame<R> {
        Frame {
            rows,
            format: self.format,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `true` when the frame has at least one row.
    pub fn is_not_empty(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Borrow the rows in order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Iterate rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Consume the frame, returning its rows.
    pub fn into_vec(self) -> Vec<T> {
        self.rows
    }

    /// The decimal settings used by this frame.
    pub fn number_format(&self) -> NumberFormat {
        self.format
    }

    /// Replace the decimal settings.
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the default number of decimal places, keeping the rounding mode.
    pub fn default_scale(self, scale: u32) -> Self {
        let rounding = self.format.rounding;
        self.default_scale_with(scale, rounding)
    }

    /// Set the default number of decimal places and rounding mode.
    pub fn default_scale_with(mut self, scale: u32, rounding: RoundingMode) -> Self {
        self.format.scale = scale;
        self.format.rounding = rounding;
        self
    }

    /// Make averages over zero values fail with [`crate::FrameError::DivideByZero`].
    pub fn strict_average(mut self) -> Self {
        self.format = self.format.strict();
        self
    }

    /// Collect one derived value per row, in order.
    pub fn col<R, F>(&self, f: F) -> Vec<R>
    where
        F: FnMut(&T) -> R,
    {
        self.rows.iter().map(f).collect()
    }

    /// Collect the distinct derived values.
    pub fn col_set<R, F>(&self, f: F) -> HashSet<R>
    where
        R: Eq + Hash,
        F: FnMut(&T) -> R,
    {
        self.rows.iter().map(f).collect()
    }

    /// Build a map from derived keys to derived values; later rows overwrite earlier ones.
    pub fn to_map<K, V, FK, FV>(&self, mut key: FK, mut value: FV) -> HashMap<K, V>
    where
        K: Eq + Hash,
        FK: FnMut(&T) -> K,
        FV: FnMut(&T) -> V,
    {
        self.rows.iter().map(|r| (key(r), value(r))).collect()
    }

    /// Two-level variant of [`Self::to_map`].
    pub fn to_multi2_map<K, K2, V, FK, FK2, FV>(
        &self,
        mut key: FK,
        mut key2: FK2,
        mut value: FV,
    ) -> HashMap<K, HashMap<K2, V>>
    where
        K: Eq + Hash,
        K2: Eq + Hash,
        FK: FnMut(&T) -> K,
        FK2: FnMut(&T) -> K2,
        FV: FnMut(&T) -> V,
    {
        let mut out: HashMap<K, HashMap<K2, V>> = HashMap::new();
        for r in &self.rows {
            out.entry(key(r)).or_default().insert(key2(r), value(r));
        }
        out
    }

    /// Three-level variant of [`Self::to_map`].
    pub fn to_multi3_map<K, K2, K3, V, FK, FK2, FK3, FV>(
        &self,
        mut key: FK,
        mut key2: FK2,
        mut key3: FK3,
        mut value: FV,
    ) -> HashMap<K, HashMap<K2, HashMap<K3, V>>>
    where
        K: Eq + Hash,
        K2: Eq + Hash,
        K3: Eq + Hash,
        FK: FnMut(&T) -> K,
        FK2: FnMut(&T) -> K2,
        FK3: FnMut(&T) -> K3,
        FV: FnMut(&T) -> V,
    {
        let mut out: HashMap<K, HashMap<K2, HashMap<K3, V>>> = HashMap::new();
        for r in &self.rows {
            out.entry(key(r))
                .or_default()
                .entry(key2(r))
                .or_default()
                .insert(key3(r), value(r));
        }
        out
    }

    /// Run `action` for every row, returning the frame for further chaining.
    pub fn for_each_do<F>(&self, action: F) -> &Self
    where
        F: FnMut(&T),
    {
        self.rows.iter().for_each(action);
        self
    }

    /// Like [`Self::for_each_do`], with the zero-based row index.
    pub fn for_each_index_do<F>(&self, mut action: F) -> &Self
    where
        F: FnMut(usize, &T),
    {
        for (i, r) in self.rows.iter().enumerate() {
            action(i, r);
        }
        self
    }

    /// Visit each row with its predecessor (`None` for the first row).
    pub fn for_each_pre_do<F>(&self, mut action: F) -> &Self
    where
        F: FnMut(&T, Option<&T>),
    {
        for (i, r) in self.rows.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| &self.rows[p]);
            action(r, prev);
        }
        self
    }

    /// Visit each row with its successor (`None` for the last row).
    pub fn for_each_next_do<F>(&self, mut action: F) -> &Self
    where
        F: FnMut(&T, Option<&T>),
    {
        for (i, r) in self.rows.iter().enumerate() {
            action(r, self.rows.get(i + 1));
        }
        self
    }

    /// `true` if any row satisfies `predicate`.
    pub fn any_match<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.rows.iter().any(predicate)
    }

    /// `true` if every row satisfies `predicate` (vacuously true when empty).
    pub fn all_match<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.rows.iter().all(predicate)
    }

    /// `true` if no row satisfies `predicate`.
    pub fn none_match<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        !self.rows.iter().any(predicate)
    }

    /// `true` if some row's derived value equals `value`.
    pub fn any_match_value<U, F>(&self, mut f: F, value: &U) -> bool
    where
        U: PartialEq,
        F: FnMut(&T) -> U,
    {
        self.rows.iter().any(|r| f(r) == *value)
    }

    /// `true` if every row's derived value equals `value` (vacuously true when empty).
    pub fn all_match_value<U, F>(&self, mut f: F, value: &U) -> bool
    where
        U: PartialEq,
        F: FnMut(&T) -> U,
    {
        self.rows.iter().all(|r| f(r) == *value)
    }

    /// `true` if no row's derived value equals `value`.
    pub fn none_match_value<U, F>(&self, f: F, value: &U) -> bool
    where
        U: PartialEq,
        F: FnMut(&T) -> U,
    {
        !self.any_match_value(f, value)
    }

    /// Same as [`Self::any_match_value`].
    pub fn is_contain_value<U, F>(&self, f: F, value: &U) -> bool
    where
        U: PartialEq,
        F: FnMut(&T) -> U,
    {
        self.any_match_value(f, value)
    }

    /// `true` if no row's derived value equals `value`.
    pub fn is_not_contain_value<U, F>(&self, f: F, value: &U) -> bool
    where
        U: PartialEq,
        F: FnMut(&T) -> U,
    {
        !self.is_contain_value(f, value)
    }

    /// `true` if some row equals `other`.
    pub fn is_contains(&self, other: &T) -> bool
    where
        T: PartialEq,
    {
        self.rows.contains(other)
    }

    /// Concatenate derived values with `delimiter`.
    pub fn joining<U, F>(&self, f: F, delimiter: &str) -> String
    where
        U: ToString,
        F: FnMut(&T) -> U,
    {
        self.joining_with(f, delimiter, "", "")
    }

    /// Concatenate derived values with `delimiter`, wrapped in `prefix` and `suffix`.
    pub fn joining_with<U, F>(&self, mut f: F, delimiter: &str, prefix: &str, suffix: &str) -> String
    where
        U: ToString,
        F: FnMut(&T) -> U,
    {
        let body = self
            .rows
            .iter()
            .map(|r| f(r).to_string())
            .collect::<Vec<_>>()
            .join(delimiter);
        format!("{prefix}{body}{suffix}")
    }

    /// Fold all rows into an accumulator.
    pub fn reduce_rows<A, F>(&self, init: A, reducer: F) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        self.rows.iter().fold(init, reducer)
    }
}

impl<T> From<Vec<T>> for Frame<T> {
    fn from(rows: Vec<T>) -> Self {
        Self::new(rows)
    }
}

impl<T> FromIterator<T> for Frame<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Frame<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Frame<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
