//! Row filtering for [`crate::types::Frame`].
//!
//! Besides the plain predicate filter, this module provides the `where_*` family. Null checks go
//! through [`Absent`], so an empty string counts as missing the same way `None` does.

use std::collections::HashSet;
use std::hash::Hash;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::FrameResult;
use crate::types::Frame;

/// Whether a field value counts as missing.
///
/// `None`, empty strings and empty collections are absent; numbers and booleans never are.
pub trait Absent {
    fn is_absent(&self) -> bool;
}

impl<V: Absent> Absent for Option<V> {
    fn is_absent(&self) -> bool {
        self.as_ref().is_none_or(Absent::is_absent)
    }
}

impl Absent for str {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Absent for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl<E> Absent for Vec<E> {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl<V: Absent + ?Sized> Absent for &V {
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

macro_rules! never_absent {
    ($($t:ty),*) => {
        $(
            impl Absent for $t {
                fn is_absent(&self) -> bool {
                    false
                }
            }
        )*
    };
}

never_absent!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, Decimal);

/// Returns a new [`Frame`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`Frame::filter`].
pub fn filter<T, F>(frame: &Frame<T>, predicate: F) -> Frame<T>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    frame.filter(predicate)
}

impl<T: Clone> Frame<T> {
    /// Keep rows matching `predicate`, in input order.
    pub fn filter<F>(&self, mut predicate: F) -> Frame<T>
    where
        F: FnMut(&T) -> bool,
    {
        let rows = self.iter().filter(|r| predicate(r)).cloned().collect();
        self.derive(rows)
    }

    /// Keep rows whose field is absent (`None` or empty string).
    pub fn where_null<V, F>(&self, f: F) -> Frame<T>
    where
        V: Absent,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r).is_absent())
    }

    /// Keep rows whose field is present.
    pub fn where_not_null<V, F>(&self, f: F) -> Frame<T>
    where
        V: Absent,
        F: Fn(&T) -> V,
    {
        self.filter(|r| !f(r).is_absent())
    }

    pub fn where_eq<V, F>(&self, f: F, value: V) -> Frame<T>
    where
        V: PartialEq,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r) == value)
    }

    pub fn where_not_eq<V, F>(&self, f: F, value: V) -> Frame<T>
    where
        V: PartialEq,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r) != value)
    }

    pub fn where_gt<V, F>(&self, f: F, value: V) -> Frame<T>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r) > value)
    }

    pub fn where_ge<V, F>(&self, f: F, value: V) -> Frame<T>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r) >= value)
    }

    pub fn where_lt<V, F>(&self, f: F, value: V) -> Frame<T>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r) < value)
    }

    pub fn where_le<V, F>(&self, f: F, value: V) -> Frame<T>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        self.filter(|r| f(r) <= value)
    }

    /// Keep rows with `start <= f(row) <= end`.
    pub fn where_between<V, F>(&self, f: F, start: V, end: V) -> Frame<T>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        self.filter(|r| {
            let v = f(r);
            v >= start && v <= end
        })
    }

    /// Keep rows outside the inclusive range `[start, end]`.
    pub fn where_not_between<V, F>(&self, f: F, start: V, end: V) -> Frame<T>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        self.filter(|r| {
            let v = f(r);
            v < start || v > end
        })
    }

    pub fn where_in<V, F>(&self, f: F, values: &[V]) -> Frame<T>
    where
        V: Eq + Hash,
        F: Fn(&T) -> V,
    {
        let set: HashSet<&V> = values.iter().collect();
        self.filter(|r| set.contains(&f(r)))
    }

    pub fn where_not_in<V, F>(&self, f: F, values: &[V]) -> Frame<T>
    where
        V: Eq + Hash,
        F: Fn(&T) -> V,
    {
        let set: HashSet<&V> = values.iter().collect();
        self.filter(|r| !set.contains(&f(r)))
    }

    pub fn where_true<F>(&self, f: F) -> Frame<T>
    where
        F: Fn(&T) -> bool,
    {
        self.filter(|r| f(r))
    }

    pub fn where_false<F>(&self, f: F) -> Frame<T>
    where
        F: Fn(&T) -> bool,
    {
        self.filter(|r| !f(r))
    }

    /// Keep rows whose text field matches the regular expression `pattern`.
    ///
    /// Absent text never matches.
    pub fn where_like<S, F>(&self, f: F, pattern: &str) -> FrameResult<Frame<T>>
    where
        S: AsRef<str>,
        F: Fn(&T) -> Option<S>,
    {
        let re = Regex::new(pattern)?;
        Ok(self.filter(|r| f(r).is_some_and(|s| re.is_match(s.as_ref()))))
    }

    /// `true` if any row's field is absent.
    pub fn has_null_value<V, F>(&self, f: F) -> bool
    where
        V: Absent,
        F: Fn(&T) -> V,
    {
        self.iter().any(|r| f(r).is_absent())
    }
}

#[cfg(test)]
mod tests {
    use super::{Absent, filter};
    use crate::types::Frame;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: i64,
        active: bool,
        email: Option<String>,
        nick: String,
    }

    fn sample() -> Frame<User> {
        Frame::new(vec![
            User { id: 1, active: true, email: Some("a@x".into()), nick: "a".into() },
            User { id: 2, active: false, email: None, nick: String::new() },
            User { id: 3, active: true, email: Some(String::new()), nick: "c".into() },
        ])
    }

    #[test]
    fn filter_preserves_order_and_leaves_source_untouched() {
        let frame = sample();
        let out = filter(&frame, |u| u.id != 2);
        assert_eq!(out.col(|u| u.id), vec![1, 3]);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn empty_string_counts_as_null() {
        let frame = sample();
        assert_eq!(frame.where_null(|u| u.email.clone()).col(|u| u.id), vec![2, 3]);
        assert_eq!(frame.where_not_null(|u| u.email.clone()).col(|u| u.id), vec![1]);
        assert_eq!(frame.where_null(|u| u.nick.clone()).col(|u| u.id), vec![2]);
        assert!(frame.has_null_value(|u| u.email.clone()));
        assert!(!frame.has_null_value(|u| u.id));
    }

    #[test]
    fn absent_covers_value_kinds() {
        assert!(Option::<i32>::None.is_absent());
        assert!(!Some(0).is_absent());
        assert!("".is_absent());
        assert!(Some(String::new()).is_absent());
        assert!(!false.is_absent());
    }

    #[test]
    fn comparisons_ranges_and_sets() {
        let frame = sample();
        assert_eq!(frame.where_gt(|u| u.id, 1).len(), 2);
        assert_eq!(frame.where_le(|u| u.id, 1).len(), 1);
        assert_eq!(frame.where_lt(|u| u.id, 3).col(|u| u.id), vec![1, 2]);
        assert!(frame.where_lt(|u| u.id, 1).is_empty());
        assert_eq!(frame.where_between(|u| u.id, 2, 3).col(|u| u.id), vec![2, 3]);
        assert_eq!(frame.where_not_between(|u| u.id, 2, 3).col(|u| u.id), vec![1]);
        assert_eq!(frame.where_in(|u| u.id, &[1, 3]).col(|u| u.id), vec![1, 3]);
        assert_eq!(frame.where_not_in(|u| u.id, &[1, 3]).col(|u| u.id), vec![2]);
        assert_eq!(frame.where_true(|u| u.active).len(), 2);
        assert_eq!(frame.where_false(|u| u.active).col(|u| u.id), vec![2]);
        assert_eq!(frame.where_eq(|u| u.active, false).col(|u| u.id), vec![2]);
    }

    #[test]
    fn like_uses_regex_and_rejects_bad_patterns() {
        let frame = sample();
        let out = frame.where_like(|u| u.email.clone(), "@x$").unwrap();
        assert_eq!(out.col(|u| u.id), vec![1]);
        assert!(frame.where_like(|u| u.email.clone(), "(").is_err());
    }
}
