//! Whole-frame reductions for [`crate::types::Frame`].
//!
//! Numeric reductions accumulate in [`Decimal`]; absent values (`None`, empty strings) are
//! skipped by `sum`/`avg` and do not count towards the average's divisor.

use rust_decimal::Decimal;

use crate::error::{FrameError, FrameResult};
use crate::number::{DecimalAcc, NumberFormat, ToDecimal};
use crate::types::{Frame, MaxMin};

/// Built-in reductions over a single derived value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including absent values).
    Count,
    /// Sum values, ignoring absent ones.
    Sum,
    /// Average of present values, rounded with the frame's [`NumberFormat`].
    Avg,
}

impl ReduceOp {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Avg => "avg",
        }
    }

    /// Turn an accumulated sum into this reduction's result.
    pub(crate) fn finish(
        self,
        acc: DecimalAcc,
        row_count: usize,
        format: &NumberFormat,
    ) -> FrameResult<Decimal> {
        match self {
            Self::Count => Ok(Decimal::from(row_count)),
            Self::Sum => Ok(acc.sum),
            Self::Avg => format.average(acc.sum, acc.count, "avg"),
        }
    }
}

/// Reduce a derived value using a built-in [`ReduceOp`].
pub fn reduce<T, V, F>(frame: &Frame<T>, value: F, op: ReduceOp) -> FrameResult<Decimal>
where
    V: ToDecimal,
    F: Fn(&T) -> V,
{
    let mut acc = DecimalAcc::default();
    if op != ReduceOp::Count {
        for r in frame.iter() {
            acc.push(&value(r), op.name())?;
        }
    }
    op.finish(acc, frame.len(), &frame.number_format())
}

/// Single pass over `rows` tracking the first maximum and first minimum of `key`.
pub(crate) fn extremes<'a, T, V, I, F>(rows: I, key: F) -> Option<MaxMin<(&'a T, V)>>
where
    T: 'a,
    V: PartialOrd + Clone,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> V,
{
    let mut iter = rows.into_iter();
    let first = iter.next()?;
    let v = key(first);
    let mut out = MaxMin::new((first, v.clone()), (first, v));
    for r in iter {
        let v = key(r);
        if v > out.max.1 {
            out.max = (r, v.clone());
        }
        if v < out.min.1 {
            out.min = (r, v);
        }
    }
    Some(out)
}

impl<T> Frame<T> {
    /// Decimal sum of a derived value.
    pub fn sum<V, F>(&self, value: F) -> FrameResult<Decimal>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        reduce(self, value, ReduceOp::Sum)
    }

    /// Average of a derived value using the frame's default scale and rounding.
    pub fn avg<V, F>(&self, value: F) -> FrameResult<Decimal>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        reduce(self, value, ReduceOp::Avg)
    }

    /// Average rounded to an explicit format.
    pub fn avg_with<V, F>(&self, value: F, format: NumberFormat) -> FrameResult<Decimal>
    where
        V: ToDecimal,
        F: Fn(&T) -> V,
    {
        let mut acc = DecimalAcc::default();
        for r in self.iter() {
            acc.push(&value(r), "avg")?;
        }
        format.average(acc.sum, acc.count, "avg")
    }

    /// Number of rows.
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Row with the largest key; the first one wins ties.
    pub fn max<V, F>(&self, key: F) -> FrameResult<T>
    where
        T: Clone,
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        extremes(self.iter(), key)
            .map(|mm| mm.max.0.clone())
            .ok_or(FrameError::EmptySource { operation: "max" })
    }

    /// Row with the smallest key; the first one wins ties.
    pub fn min<V, F>(&self, key: F) -> FrameResult<T>
    where
        T: Clone,
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        extremes(self.iter(), key)
            .map(|mm| mm.min.0.clone())
            .ok_or(FrameError::EmptySource { operation: "min" })
    }

    /// Largest derived value.
    pub fn max_value<V, F>(&self, key: F) -> FrameResult<V>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        extremes(self.iter(), key)
            .map(|mm| mm.max.1)
            .ok_or(FrameError::EmptySource { operation: "max_value" })
    }

    /// Smallest derived value.
    pub fn min_value<V, F>(&self, key: F) -> FrameResult<V>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        extremes(self.iter(), key)
            .map(|mm| mm.min.1)
            .ok_or(FrameError::EmptySource { operation: "min_value" })
    }

    /// Rows with the largest and smallest key, found in one pass.
    ///
    /// Both fields are `None` only when the frame is empty.
    pub fn max_min<V, F>(&self, key: F) -> MaxMin<Option<T>>
    where
        T: Clone,
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        match extremes(self.iter(), key) {
            Some(mm) => MaxMin::new(Some(mm.max.0.clone()), Some(mm.min.0.clone())),
            None => MaxMin::new(None, None),
        }
    }

    /// Largest and smallest derived value, found in one pass.
    pub fn max_min_value<V, F>(&self, key: F) -> MaxMin<Option<V>>
    where
        V: PartialOrd + Clone,
        F: Fn(&T) -> V,
    {
        match extremes(self.iter(), key) {
            Some(mm) => MaxMin::new(Some(mm.max.1), Some(mm.min.1)),
            None => MaxMin::new(None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, ReduceOp};
    use crate::error::FrameError;
    use crate::number::{NumberFormat, RoundingMode};
    use crate::types::{Frame, MaxMin};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        id: i64,
        score: Option<f64>,
    }

    fn readings() -> Frame<Reading> {
        Frame::new(vec![
            Reading { id: 1, score: Some(10.0) },
            Reading { id: 2, score: None },
            Reading { id: 3, score: Some(5.5) },
            Reading { id: 4, score: Some(10.0) },
        ])
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn reduce_count_counts_rows() {
        assert_eq!(reduce(&readings(), |r| r.score, ReduceOp::Count).unwrap(), Decimal::from(4));
    }

    #[test]
    fn sum_and_avg_ignore_absent_values() {
        let frame = readings();
        assert_eq!(frame.sum(|r| r.score).unwrap(), dec("25.5"));
        assert_eq!(frame.avg(|r| r.score).unwrap(), dec("8.50"));
        assert_eq!(frame.default_scale(0).avg(|r| r.score).unwrap(), dec("9"));
    }

    #[test]
    fn sum_avoids_float_drift() {
        let frame: Frame<f64> = vec![0.1; 10].into();
        assert_eq!(frame.sum(|v| *v).unwrap(), Decimal::ONE);
    }

    #[test]
    fn avg_of_empty_frame_is_zero_unless_strict() {
        let empty: Frame<i32> = Frame::default();
        assert_eq!(empty.avg(|v| *v).unwrap(), Decimal::ZERO);
        assert!(matches!(
            empty.strict_average().avg(|v| *v),
            Err(FrameError::DivideByZero { .. })
        ));
    }

    #[test]
    fn avg_with_overrides_the_frame_format() {
        let frame = readings();
        let floor = NumberFormat {
            scale: 0,
            rounding: RoundingMode::Floor,
            ..NumberFormat::default()
        };
        assert_eq!(frame.avg_with(|r| r.score, floor).unwrap(), dec("8"));
        assert_eq!(frame.default_scale(0).avg(|r| r.score).unwrap(), dec("9"));

        let strict = NumberFormat {
            empty_average: None,
            ..NumberFormat::default()
        };
        let empty: Frame<Reading> = Frame::default();
        assert!(matches!(
            empty.avg_with(|r| r.score, strict),
            Err(FrameError::DivideByZero { .. })
        ));
    }

    #[test]
    fn max_and_min_keep_first_of_ties() {
        let frame = readings().where_not_null(|r| r.score.map(|_| 0));
        assert_eq!(frame.max(|r| r.score).unwrap().id, 1);
        assert_eq!(frame.min(|r| r.score).unwrap().id, 3);
        assert_eq!(frame.max_value(|r| r.score).unwrap(), Some(10.0));
    }

    #[test]
    fn empty_frames_signal_empty_source() {
        let empty: Frame<i32> = Frame::default();
        assert!(matches!(empty.max(|v| *v), Err(FrameError::EmptySource { operation: "max" })));
        assert!(matches!(empty.min_value(|v| *v), Err(FrameError::EmptySource { .. })));
        assert_eq!(empty.max_min(|v| *v), MaxMin::new(None, None));
    }

    #[test]
    fn max_min_in_one_pass() {
        let frame: Frame<i32> = vec![3, 9, 1, 9, 1].into();
        assert_eq!(frame.max_min_value(|v| *v), MaxMin::new(Some(9), Some(1)));
    }
}
