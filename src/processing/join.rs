//! Predicate joins between two frames.
//!
//! The `on` predicate is an arbitrary function, so matching is a nested scan: every left row is
//! tested against every right row (`O(|left| * |right|)` predicate calls). Matches for one outer
//! row are emitted contiguously, in the scan order of the other side:
//!
//! - inner and left joins scan right rows for each left row, in left order;
//! - right joins scan left rows for each right row, in right order.
//!
//! `*_once` variants stop scanning after the first match of each outer row, so they emit at most
//! one row per outer row. `*_link` variants merge the match into a copy of the outer record
//! instead of building a new type.

use crate::types::{FI2, Frame};

/// Which side's unmatched rows are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Only matched pairs.
    Inner,
    /// Every left row; unmatched ones pair with no right row.
    Left,
    /// Every right row; unmatched ones pair with no left row.
    Right,
}

/// One output row of a join, as positions into the input frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMatch {
    /// `on(left[l], right[r])` held.
    Both(usize, usize),
    /// Left row with no match (left joins only).
    LeftOnly(usize),
    /// Right row with no match (right joins only).
    RightOnly(usize),
}

/// Compute join output positions without materializing rows.
pub fn match_rows<T, K, F>(left: &[T], right: &[K], on: F, kind: JoinKind, once: bool) -> Vec<JoinMatch>
where
    F: Fn(&T, &K) -> bool,
{
    let mut out = Vec::new();
    match kind {
        JoinKind::Inner | JoinKind::Left => {
            for (l, t) in left.iter().enumerate() {
                let before = out.len();
                for (r, k) in right.iter().enumerate() {
                    if on(t, k) {
                        out.push(JoinMatch::Both(l, r));
                        if once {
                            break;
                        }
                    }
                }
                if kind == JoinKind::Left && out.len() == before {
                    out.push(JoinMatch::LeftOnly(l));
                }
            }
        }
        JoinKind::Right => {
            for (r, k) in right.iter().enumerate() {
                let before = out.len();
                for (l, t) in left.iter().enumerate() {
                    if on(t, k) {
                        out.push(JoinMatch::Both(l, r));
                        if once {
                            break;
                        }
                    }
                }
                if out.len() == before {
                    out.push(JoinMatch::RightOnly(r));
                }
            }
        }
    }
    tracing::debug!(
        ?kind,
        once,
        left_rows = left.len(),
        right_rows = right.len(),
        output_rows = out.len(),
        "join matched"
    );
    out
}

/// Build a joined row from an optional left and right record.
///
/// This is the compile-time replacement for copying fields by name: implement it once per output
/// type, mapping the fields explicitly, and use [`Frame::join_into`].
pub trait FromJoined<T, K>: Sized {
    fn from_joined(left: Option<&T>, right: Option<&K>) -> Self;
}

impl<T: Clone, K: Clone> FromJoined<T, K> for FI2<Option<T>, Option<K>> {
    fn from_joined(left: Option<&T>, right: Option<&K>) -> Self {
        FI2::new(left.cloned(), right.cloned())
    }
}

impl<T> Frame<T> {
    fn matched<K, F>(&self, other: &Frame<K>, on: F, kind: JoinKind, once: bool) -> Vec<JoinMatch>
    where
        F: Fn(&T, &K) -> bool,
    {
        match_rows(self.rows(), other.rows(), on, kind, once)
    }

    fn inner_rows<K, R, F, J>(&self, other: &Frame<K>, on: F, once: bool, mut join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&T, &K) -> R,
    {
        let (left, right) = (self.rows(), other.rows());
        let rows = self
            .matched(other, on, JoinKind::Inner, once)
            .into_iter()
            .filter_map(|m| match m {
                JoinMatch::Both(l, r) => Some(join(&left[l], &right[r])),
                _ => None,
            })
            .collect();
        self.derive(rows)
    }

    fn left_rows<K, R, F, J>(&self, other: &Frame<K>, on: F, once: bool, mut join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&T, Option<&K>) -> R,
    {
        let (left, right) = (self.rows(), other.rows());
        let rows = self
            .matched(other, on, JoinKind::Left, once)
            .into_iter()
            .filter_map(|m| match m {
                JoinMatch::Both(l, r) => Some(join(&left[l], Some(&right[r]))),
                JoinMatch::LeftOnly(l) => Some(join(&left[l], None)),
                JoinMatch::RightOnly(_) => None,
            })
            .collect();
        self.derive(rows)
    }

    fn right_rows<K, R, F, J>(&self, other: &Frame<K>, on: F, once: bool, mut join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(Option<&T>, &K) -> R,
    {
        let (left, right) = (self.rows(), other.rows());
        let rows = self
            .matched(other, on, JoinKind::Right, once)
            .into_iter()
            .filter_map(|m| match m {
                JoinMatch::Both(l, r) => Some(join(Some(&left[l]), &right[r])),
                JoinMatch::RightOnly(r) => Some(join(None, &right[r])),
                JoinMatch::LeftOnly(_) => None,
            })
            .collect();
        self.derive(rows)
    }

    /// Inner join: one output per matching pair.
    pub fn join<K, R, F, J>(&self, other: &Frame<K>, on: F, join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&T, &K) -> R,
    {
        self.inner_rows(other, on, false, join)
    }

    /// Inner join keeping only the first match of each left row.
    pub fn join_once<K, R, F, J>(&self, other: &Frame<K>, on: F, join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&T, &K) -> R,
    {
        self.inner_rows(other, on, true, join)
    }

    /// Left join: unmatched left rows are joined once with `None`.
    pub fn left_join<K, R, F, J>(&self, other: &Frame<K>, on: F, join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&T, Option<&K>) -> R,
    {
        self.left_rows(other, on, false, join)
    }

    /// Left join keeping only the first match of each left row.
    pub fn left_join_once<K, R, F, J>(&self, other: &Frame<K>, on: F, join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&T, Option<&K>) -> R,
    {
        self.left_rows(other, on, true, join)
    }

    /// Right join: unmatched right rows are joined once with `None`.
    pub fn right_join<K, R, F, J>(&self, other: &Frame<K>, on: F, join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(Option<&T>, &K) -> R,
    {
        self.right_rows(other, on, false, join)
    }

    /// Right join keeping only the first match of each right row.
    pub fn right_join_once<K, R, F, J>(&self, other: &Frame<K>, on: F, join: J) -> Frame<R>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(Option<&T>, &K) -> R,
    {
        self.right_rows(other, on, true, join)
    }

    /// Join into a type that maps its own fields via [`FromJoined`].
    pub fn join_into<K, R, F>(&self, other: &Frame<K>, on: F, kind: JoinKind) -> Frame<R>
    where
        R: FromJoined<T, K>,
        F: Fn(&T, &K) -> bool,
    {
        match kind {
            JoinKind::Inner => self.join(other, on, |t, k| R::from_joined(Some(t), Some(k))),
            JoinKind::Left => self.left_join(other, on, |t, k| R::from_joined(Some(t), k)),
            JoinKind::Right => self.right_join(other, on, |t, k| R::from_joined(t, Some(k))),
        }
    }

    /// Right join merging into a copy of the right row; the result has the right row type.
    pub fn right_join_link<K, F, J>(&self, other: &Frame<K>, on: F, mut link: J) -> Frame<K>
    where
        K: Clone,
        F: Fn(&T, &K) -> bool,
        J: FnMut(Option<&T>, &mut K),
    {
        self.right_rows(other, on, false, |t, k| {
            let mut out = k.clone();
            link(t, &mut out);
            out
        })
    }

    /// [`Self::right_join_link`] keeping only the first match of each right row.
    pub fn right_join_link_once<K, F, J>(&self, other: &Frame<K>, on: F, mut link: J) -> Frame<K>
    where
        K: Clone,
        F: Fn(&T, &K) -> bool,
        J: FnMut(Option<&T>, &mut K),
    {
        self.right_rows(other, on, true, |t, k| {
            let mut out = k.clone();
            link(t, &mut out);
            out
        })
    }
}

impl<T: Clone> Frame<T> {
    /// Inner join merging each match into a copy of the left row.
    ///
    /// A left row with several matches yields one merged copy per match.
    pub fn join_link<K, F, J>(&self, other: &Frame<K>, on: F, mut link: J) -> Frame<T>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&mut T, &K),
    {
        self.inner_rows(other, on, false, |t, k| {
            let mut out = t.clone();
            link(&mut out, k);
            out
        })
    }

    /// [`Self::join_link`] keeping only the first match of each left row.
    pub fn join_link_once<K, F, J>(&self, other: &Frame<K>, on: F, mut link: J) -> Frame<T>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&mut T, &K),
    {
        self.inner_rows(other, on, true, |t, k| {
            let mut out = t.clone();
            link(&mut out, k);
            out
        })
    }

    /// Left join merging into a copy of the left row (`None` for unmatched rows).
    pub fn left_join_link<K, F, J>(&self, other: &Frame<K>, on: F, mut link: J) -> Frame<T>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&mut T, Option<&K>),
    {
        self.left_rows(other, on, false, |t, k| {
            let mut out = t.clone();
            link(&mut out, k);
            out
        })
    }

    /// [`Self::left_join_link`] keeping only the first match of each left row.
    pub fn left_join_link_once<K, F, J>(&self, other: &Frame<K>, on: F, mut link: J) -> Frame<T>
    where
        F: Fn(&T, &K) -> bool,
        J: FnMut(&mut T, Option<&K>),
    {
        self.left_rows(other, on, true, |t, k| {
            let mut out = t.clone();
            link(&mut out, k);
            out
        })
    }
}
