//! Multi-key comparator used by sorting, ranking and grouped max/min.

use std::cmp::Ordering;
use std::fmt;

type Compare<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

/// An ordered list of (key extractor, direction) pairs.
///
/// Keys are compared left to right and the first non-equal key decides. Sorting with a `Sorter`
/// is always stable, so rows equal under every key keep their input order.
///
/// Extractors return owned keys (`Copy` fields, or clones); borrowed keys need [`Sorter::by`].
///
/// ```rust
/// use rust_data_frame::Sorter;
///
/// struct Row { dept: &'static str, salary: u32 }
///
/// let sorter = Sorter::asc(|r: &Row| r.dept).then_desc(|r: &Row| r.salary);
/// let a = Row { dept: "eng", salary: 10 };
/// let b = Row { dept: "eng", salary: 20 };
/// assert_eq!(sorter.compare(&a, &b), std::cmp::Ordering::Greater);
/// ```
pub struct Sorter<'a, T> {
    keys: Vec<Compare<'a, T>>,
}

impl<'a, T> Sorter<'a, T> {
    /// Sort ascending by a derived key.
    pub fn asc<V, F>(key: F) -> Self
    where
        V: Ord,
        F: Fn(&T) -> V + 'a,
    {
        Self { keys: Vec::new() }.then_asc(key)
    }

    /// Sort descending by a derived key.
    pub fn desc<V, F>(key: F) -> Self
    where
        V: Ord,
        F: Fn(&T) -> V + 'a,
    {
        Self { keys: Vec::new() }.then_desc(key)
    }

    /// Sort with a raw comparator (useful for keys that are only `PartialOrd`).
    pub fn by<F>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'a,
    {
        Self { keys: Vec::new() }.then_by(cmp)
    }

    /// Append an ascending key.
    pub fn then_asc<V, F>(mut self, key: F) -> Self
    where
        V: Ord,
        F: Fn(&T) -> V + 'a,
    {
        self.keys.push(Box::new(move |a, b| key(a).cmp(&key(b))));
        self
    }

    /// Append a descending key.
    pub fn then_desc<V, F>(mut self, key: F) -> Self
    where
        V: Ord,
        F: Fn(&T) -> V + 'a,
    {
        self.keys.push(Box::new(move |a, b| key(b).cmp(&key(a))));
        self
    }

    /// Append a raw comparator.
    pub fn then_by<F>(mut self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'a,
    {
        self.keys.push(Box::new(cmp));
        self
    }

    /// Compare two rows key by key.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.keys
            .iter()
            .map(|cmp| cmp(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort in place.
    pub(crate) fn sort(&self, rows: &mut [T]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T> fmt::Debug for Sorter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sorter")
            .field("keys_len", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Sorter;
    use std::cmp::Ordering;

    #[derive(Debug, Clone, PartialEq)]
    struct Emp {
        dept: &'static str,
        age: u32,
        score: f64,
    }

    #[test]
    fn keys_short_circuit_left_to_right() {
        let sorter = Sorter::asc(|e: &Emp| e.dept).then_desc(|e: &Emp| e.age);
        let a = Emp { dept: "a", age: 10, score: 0.0 };
        let b = Emp { dept: "b", age: 50, score: 0.0 };
        let c = Emp { dept: "a", age: 30, score: 0.0 };
        assert_eq!(sorter.compare(&a, &b), Ordering::Less);
        assert_eq!(sorter.compare(&a, &c), Ordering::Greater);
        assert_eq!(sorter.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn raw_comparator_handles_floats() {
        let sorter = Sorter::by(|a: &Emp, b: &Emp| a.score.total_cmp(&b.score));
        let lo = Emp { dept: "x", age: 1, score: 1.5 };
        let hi = Emp { dept: "x", age: 1, score: 2.5 };
        assert_eq!(sorter.compare(&lo, &hi), Ordering::Less);
    }
}
