//! Grouping and per-group aggregation.
//!
//! [`Frame::group_by`] (and the two- and three-key variants) partitions rows into buckets in a
//! single pass. Buckets keep the order in which their key was first seen, and rows inside a bucket
//! keep input order, so every aggregate below is deterministic.
//!
//! Aggregates produce one tuple row per group: the key components followed by the aggregate,
//! i.e. [`FI2`] for one key, [`FI3`] for two and [`FI4`] for three.
//!
//! ```rust
//! use rust_data_frame::{Frame, FI2};
//! use rust_decimal::Decimal;
//!
//! struct Sale { k: &'static str, v: i64 }
//!
//! let frame = Frame::new(vec![
//!     Sale { k: "A", v: 1 },
//!     Sale { k: "A", v: 3 },
//!     Sale { k: "B", v: 2 },
//! ]);
//! let out = frame.group_by_sum(|s| s.k, |s| s.v).unwrap();
//! assert_eq!(
//!     out.rows(),
//!     &[FI2::new("A", Decimal::from(4)), FI2::new("B", Decimal::from(2))]
//! );
//! ```

use std::hash::Hash;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::error::FrameResult;
use crate::number::{DecimalAcc, NumberFormat, ToDecimal};
use crate::processing::reduce::extremes;
use crate::types::{FI2, FI3, FI4, Frame, MaxMin};

/// A group key that knows how to lay itself out in front of an aggregate value.
pub trait GroupKey: Eq + Hash + Clone {
    /// Output row: key components followed by the aggregate.
    type Row<V>;

    fn into_row<V>(self, value: V) -> Self::Row<V>;
}

/// Single-component group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key1<K>(pub K);

/// Two-component group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key2<K1, K2>(pub K1, pub K2);

/// Three-component group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key3<K1, K2, K3>(pub K1, pub K2, pub K3);

impl<K: Eq + Hash + Clone> GroupKey for Key1<K> {
    type Row<V> = FI2<K, V>;

    fn into_row<V>(self, value: V) -> FI2<K, V> {
        FI2::new(self.0, value)
    }
}

impl<K1, K2> GroupKey for Key2<K1, K2>
where
    K1: Eq + Hash + Clone,
    K2: Eq + Hash + Clone,
{
    type Row<V> = FI3<K1, K2, V>;

    fn into_row<V>(self, value: V) -> FI3<K1, K2, V> {
        FI3::new(self.0, self.1, value)
    }
}

impl<K1, K2, K3> GroupKey for Key3<K1, K2, K3>
where
    K1: Eq + Hash + Clone,
    K2: Eq + Hash + Clone,
    K3: Eq + Hash + Clone,
{
    type Row<V> = FI4<K1, K2, K3, V>;

    fn into_row<V>(self, value: V) -> FI4<K1, K2, K3, V> {
        FI4::new(self.0, self.1, self.2, value)
    }
}

/// Rows of a [`Frame`] partitioned by a [`GroupKey`], ready for aggregation.
#[derive(Debug)]
pub struct GroupedFrame<'a, T, K> {
    source: &'a Frame<T>,
    buckets: IndexMap<K, Vec<&'a T>>,
}

impl<'a, T, K: GroupKey> GroupedFrame<'a, T, K> {
    fn new<F>(source: &'a Frame<T>, key: F) -> Self
    where
        F: Fn(&T) -> K,
    {
        let mut buckets: IndexMap<K, Vec<&'a T>> = IndexMap::new();
        for r in source.iter() {
            buckets.entry(key(r)).or_default().push(r);
        }
        Self { source, buckets }
    }

    /// Number of distinct keys.
    pub fn group_count(&self) -> usize {
        self.buckets.len()
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    /// One output row per group, computed by `f` from the group's rows.
    pub fn aggregate<R, F>(&self, mut f: F) -> Frame<K::Row<R>>
    where
        F: FnMut(&[&T]) -> R,
    {
        let rows = self
            .buckets
            .iter()
            .map(|(k, bucket)| k.clone().into_row(f(bucket)))
            .collect();
        self.source.derive(rows)
    }

    fn try_aggregate<R, F>(&self, op: &'static str, mut f: F) -> FrameResult<Frame<K::Row<R>>>
    where
        F: FnMut(&[&T]) -> FrameResult<R>,
    {
        let mut rows = Vec::with_capacity(self.buckets.len());
        for (k, bucket) in &self.buckets {
            rows.push(k.clone().into_row(f(bucket)?));
        }
        tracing::debug!(
            op,
            input_rows = self.source.len(),
            groups = rows.len(),
            "grouped aggregate finished"
        );
        Ok(self.source.derive(rows))
    }

    /// Rows of each group, cloned, in input order.
    pub fn list(&self) -> Frame<K::Row<Vec<T>>>
    where
        T: Clone,
    {
        self.aggregate(|bucket| bucket.iter().map(|r| (*r).clone()).collect())
    }

    /// Rows per group.
    pub fn count(&self) -> Frame<K::Row<usize>> {
        self.aggregate(|bucket| bucket.len())
    }

    /// Decimal sum per group; absent values are skipped.
    pub fn sum<V, F>(&self, value: F) -> FrameResult<Frame<K::Row<Decimal>>>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        self.try_aggregate("sum", |bucket| Ok(accumulate(bucket, &value, "sum")?.sum))
    }

    /// Decimal sum and row count per group, from one pass.
    pub fn sum_count<V, F>(&self, value: F) -> FrameResult<Frame<K::Row<FI2<Decimal, usize>>>>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        self.try_aggregate("sum_count", |bucket| {
            let acc = accumulate(bucket, &value, "sum_count")?;
            Ok(FI2::new(acc.sum, bucket.len()))
        })
    }

    /// Average per group with the frame's default scale and rounding.
    pub fn avg<V, F>(&self, value: F) -> FrameResult<Frame<K::Row<Decimal>>>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        self.avg_with(value, self.source.number_format())
    }

    /// Average per group rounded with `format`.
    ///
    /// A group whose values are all absent averages to `format.empty_average`, or fails with
    /// [`crate::FrameError::DivideByZero`] when that is unset.
    pub fn avg_with<V, F>(&self, value: F, format: NumberFormat) -> FrameResult<Frame<K::Row<Decimal>>>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        self.try_aggregate("avg", |bucket| {
            let acc = accumulate(bucket, &value, "avg")?;
            format.average(acc.sum, acc.count, "avg")
        })
    }

    /// Row with the largest key per group (first wins ties).
    pub fn max<V, F>(&self, key: F) -> Frame<K::Row<T>>
    where
        T: Clone,
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        self.extremes_by(key, |mm| mm.max.0.clone())
    }

    /// Row with the smallest key per group (first wins ties).
    pub fn min<V, F>(&self, key: F) -> Frame<K::Row<T>>
    where
        T: Clone,
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        self.extremes_by(key, |mm| mm.min.0.clone())
    }

    /// Largest derived value per group.
    pub fn max_value<V, F>(&self, key: F) -> Frame<K::Row<V>>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        self.extremes_by(key, |mm| mm.max.1)
    }

    /// Smallest derived value per group.
    pub fn min_value<V, F>(&self, key: F) -> Frame<K::Row<V>>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        self.extremes_by(key, |mm| mm.min.1)
    }

    /// Rows with the largest and smallest key per group, from one pass.
    pub fn max_min<V, F>(&self, key: F) -> Frame<K::Row<MaxMin<T>>>
    where
        T: Clone,
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        self.extremes_by(key, |mm| MaxMin::new(mm.max.0.clone(), mm.min.0.clone()))
    }

    /// Largest and smallest derived value per group, from one pass.
    pub fn max_min_value<V, F>(&self, key: F) -> Frame<K::Row<MaxMin<V>>>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        self.extremes_by(key, |mm| MaxMin::new(mm.max.1, mm.min.1))
    }

    fn extremes_by<V, R, F, P>(&self, key: F, mut pick: P) -> Frame<K::Row<R>>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
        P: FnMut(MaxMin<(&T, V)>) -> R,
    {
        let mut rows = Vec::with_capacity(self.buckets.len());
        for (k, bucket) in &self.buckets {
            // Buckets always hold at least one row.
            if let Some(mm) = extremes(bucket.iter().copied(), &key) {
                rows.push(k.clone().into_row(pick(mm)));
            }
        }
        self.source.derive(rows)
    }
}

fn accumulate<T, V, F>(bucket: &[&T], value: &F, op: &'static str) -> FrameResult<DecimalAcc>
where
    V: ToDecimal,
    F: Fn(&T) -> V,
{
    let mut acc = DecimalAcc::default();
    for r in bucket {
        acc.push(&value(r), op)?;
    }
    Ok(acc)
}

impl<T> Frame<T> {
    /// Partition rows by one derived key.
    pub fn group_by<K, F>(&self, key: F) -> GroupedFrame<'_, T, Key1<K>>
    where
        K: Eq + Hash + Clone,
        F: Fn(&T) -> K,
    {
        GroupedFrame::new(self, |r| Key1(key(r)))
    }

    /// Partition rows by two derived keys.
    pub fn group_by2<K1, K2, F1, F2>(&self, key1: F1, key2: F2) -> GroupedFrame<'_, T, Key2<K1, K2>>
    where
        K1: Eq + Hash + Clone,
        K2: Eq + Hash + Clone,
        F1: Fn(&T) -> K1,
        F2: Fn(&T) -> K2,
    {
        GroupedFrame::new(self, |r| Key2(key1(r), key2(r)))
    }

    /// Partition rows by three derived keys.
    pub fn group_by3<K1, K2, K3, F1, F2, F3>(
        &self,
        key1: F1,
        key2: F2,
        key3: F3,
    ) -> GroupedFrame<'_, T, Key3<K1, K2, K3>>
    where
        K1: Eq + Hash + Clone,
        K2: Eq + Hash + Clone,
        K3: Eq + Hash + Clone,
        F1: Fn(&T) -> K1,
        F2: Fn(&T) -> K2,
        F3: Fn(&T) -> K3,
    {
        GroupedFrame::new(self, |r| Key3(key1(r), key2(r), key3(r)))
    }

    /// Shorthand for `group_by(key).sum(value)`.
    pub fn group_by_sum<K, V, FK, FV>(&self, key: FK, value: FV) -> FrameResult<Frame<FI2<K, Decimal>>>
    where
        K: Eq + Hash + Clone,
        V: ToDecimal,
        FK: Fn(&T) -> K,
        FV: Fn(&T) -> V,
    {
        self.group_by(key).sum(value)
    }

    /// Shorthand for `group_by(key).avg(value)`.
    pub fn group_by_avg<K, V, FK, FV>(&self, key: FK, value: FV) -> FrameResult<Frame<FI2<K, Decimal>>>
    where
        K: Eq + Hash + Clone,
        V: ToDecimal,
        FK: Fn(&T) -> K,
        FV: Fn(&T) -> V,
    {
        self.group_by(key).avg(value)
    }

    /// Shorthand for `group_by(key).count()`.
    pub fn group_by_count<K, FK>(&self, key: FK) -> Frame<FI2<K, usize>>
    where
        K: Eq + Hash + Clone,
        FK: Fn(&T) -> K,
    {
        self.group_by(key).count()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::FrameError;
    use crate::types::{FI2, FI3, FI4, Frame, MaxMin};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Debug, Clone, PartialEq)]
    struct Emp {
        name: &'static str,
        dept: &'static str,
        level: u8,
        salary: Option<i64>,
    }

    fn emp(name: &'static str, dept: &'static str, level: u8, salary: Option<i64>) -> Emp {
        Emp { name, dept, level, salary }
    }

    fn staff() -> Frame<Emp> {
        Frame::new(vec![
            emp("ann", "eng", 1, Some(100)),
            emp("bob", "ops", 1, Some(80)),
            emp("cid", "eng", 2, Some(150)),
            emp("dan", "eng", 1, Some(100)),
            emp("eve", "ops", 2, None),
        ])
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let out = staff().group_by_sum(|e| e.dept, |e| e.salary).unwrap();
        assert_eq!(
            out.rows(),
            &[FI2::new("eng", dec("350")), FI2::new("ops", dec("80"))]
        );
    }

    #[test]
    fn count_and_sum_count_count_rows_not_values() {
        let frame = staff();
        assert_eq!(frame.group_by_count(|e| e.dept).col(|r| r.c2), vec![3, 2]);
        let sc = frame.group_by(|e| e.dept).sum_count(|e| e.salary).unwrap();
        assert_eq!(sc.rows()[1], FI2::new("ops", FI2::new(dec("80"), 2)));
    }

    #[test]
    fn avg_uses_present_values_and_frame_scale() {
        let frame = staff();
        let out = frame.group_by_avg(|e| e.dept, |e| e.salary).unwrap();
        assert_eq!(out.rows()[0].c2, dec("116.67"));
        assert_eq!(out.rows()[1].c2, dec("80.00"));
        let coarse = frame.default_scale(0).group_by_avg(|e| e.dept, |e| e.salary).unwrap();
        assert_eq!(coarse.rows()[0].c2, dec("117"));
    }

    #[test]
    fn avg_over_all_absent_group_is_configurable() {
        let frame = Frame::new(vec![emp("x", "void", 1, None)]);
        let lenient = frame.group_by_avg(|e| e.dept, |e| e.salary).unwrap();
        assert_eq!(lenient.rows()[0].c2, Decimal::ZERO);
        let strict = frame.strict_average().group_by_avg(|e| e.dept, |e| e.salary);
        assert!(matches!(strict, Err(FrameError::DivideByZero { .. })));
    }

    #[test]
    fn two_and_three_key_groups_emit_wider_tuples() {
        let frame = staff();
        let two = frame.group_by2(|e| e.dept, |e| e.level).count();
        assert_eq!(
            two.rows(),
            &[
                FI3::new("eng", 1, 2),
                FI3::new("ops", 1, 1),
                FI3::new("eng", 2, 1),
                FI3::new("ops", 2, 1),
            ]
        );
        let three = frame
            .group_by3(|e| e.dept, |e| e.level, |e| e.salary.is_some())
            .sum(|e| e.salary)
            .unwrap();
        assert_eq!(three.rows()[0], FI4::new("eng", 1, true, dec("200")));
        assert_eq!(three.rows()[3], FI4::new("ops", 2, false, Decimal::ZERO));
    }

    #[test]
    fn max_min_ties_resolve_to_first_row() {
        let frame = staff();
        let grouped = frame.group_by(|e| e.dept);
        let max = grouped.max(|e| e.salary.unwrap_or(0));
        assert_eq!(max.col(|r| r.c2.name), vec!["cid", "bob"]);
        let min = grouped.min(|e| e.salary.unwrap_or(0));
        assert_eq!(min.col(|r| r.c2.name), vec!["ann", "eve"]);
        let mm = grouped.max_min_value(|e| e.level);
        assert_eq!(mm.rows()[0].c2, MaxMin::new(2, 1));
        let mm_rows = grouped.max_min(|e| e.level);
        assert_eq!(mm_rows.rows()[1].c2.max.name, "eve");
        assert_eq!(grouped.max_value(|e| e.level).col(|r| r.c2), vec![2, 2]);
        assert_eq!(grouped.min_value(|e| e.level).col(|r| r.c2), vec![1, 1]);
    }

    #[test]
    fn list_and_custom_aggregate() {
        let frame = staff();
        let grouped = frame.group_by(|e| e.dept);
        assert_eq!(grouped.group_count(), 2);
        assert_eq!(grouped.keys().map(|k| k.0).collect::<Vec<_>>(), vec!["eng", "ops"]);
        let lists = grouped.list();
        assert_eq!(lists.rows()[0].c2.len(), 3);
        let names = grouped.aggregate(|rows| rows.iter().map(|e| e.name).collect::<Vec<_>>().join("+"));
        assert_eq!(names.rows()[1], FI2::new("ops", "bob+eve".to_string()));
    }

    #[test]
    fn sum_reports_conversion_errors() {
        let frame = Frame::new(vec![("a", "1.5"), ("a", "oops")]);
        let err = frame.group_by_sum(|r| r.0, |r| r.1).unwrap_err();
        assert!(matches!(err, FrameError::TypeConversion { .. }));
    }

    #[test]
    fn sum_reports_decimal_overflow() {
        let frame = Frame::new(vec![("a", Decimal::MAX), ("a", Decimal::MAX)]);
        let err = frame.group_by_sum(|r| r.0, |r| r.1).unwrap_err();
        assert!(matches!(err, FrameError::NumericOverflow { .. }));
        assert_eq!(err.to_string(), "sum overflowed the decimal range");
    }
}
