//! Dimension gap-filling ("replenish").
//!
//! Given a dimension extracted from every row and a required domain of values, synthesize one
//! filler row per domain value that no row carries. The grouped form does this per group.
//!
//! Originals are always kept in input order and fillers come after them, in domain order. A
//! value listed twice in the domain is synthesized at most once.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::types::Frame;

/// Domain values not present in `observed`, deduplicated, in domain order.
fn missing_values<'d, C>(observed: &IndexSet<C>, domain: impl IntoIterator<Item = &'d C>) -> Vec<&'d C>
where
    C: Eq + Hash + 'd,
{
    domain
        .into_iter()
        .filter(|c| !observed.contains(*c))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

impl<T: Clone> Frame<T> {
    /// Append a filler row for every `all_dim` value that no row carries.
    pub fn replenish<C, F, W>(&self, collect_dim: F, all_dim: &[C], factory: W) -> Frame<T>
    where
        C: Eq + Hash,
        F: Fn(&T) -> C,
        W: FnMut(&C) -> T,
    {
        let mut rows = self.rows().to_vec();
        rows.extend(self.replenish_list(collect_dim, all_dim, factory));
        self.derive(rows)
    }

    /// Only the filler rows [`Self::replenish`] would append.
    pub fn replenish_list<C, F, W>(&self, collect_dim: F, all_dim: &[C], factory: W) -> Vec<T>
    where
        C: Eq + Hash,
        F: Fn(&T) -> C,
        W: FnMut(&C) -> T,
    {
        let observed: IndexSet<C> = self.iter().map(collect_dim).collect();
        let fillers: Vec<T> = missing_values(&observed, all_dim)
            .into_iter()
            .map(factory)
            .collect();
        tracing::debug!(
            input_rows = self.len(),
            observed = observed.len(),
            fillers = fillers.len(),
            "replenish"
        );
        fillers
    }

    /// Per-group replenish.
    ///
    /// Rows are partitioned by `group_dim` (groups in first-seen order). Each group's domain is
    /// `all_dim` when given, otherwise the union of `collect_dim` values over the whole frame in
    /// first-seen order. The output is each group's originals followed by its fillers.
    pub fn replenish_group<G, C, GF, CF, W>(
        &self,
        group_dim: GF,
        collect_dim: CF,
        all_dim: Option<&[C]>,
        mut factory: W,
    ) -> Frame<T>
    where
        G: Eq + Hash,
        C: Eq + Hash + Clone,
        GF: Fn(&T) -> G,
        CF: Fn(&T) -> C,
        W: FnMut(&G, &C) -> T,
    {
        let mut groups: IndexMap<G, (Vec<&T>, IndexSet<C>)> = IndexMap::new();
        let mut union: IndexSet<C> = IndexSet::new();
        for r in self.iter() {
            let (members, seen) = groups.entry(group_dim(r)).or_default();
            members.push(r);
            let value = collect_dim(r);
            if all_dim.is_none() {
                union.insert(value.clone());
            }
            seen.insert(value);
        }

        let mut rows = Vec::with_capacity(self.len());
        let mut filled = 0usize;
        for (key, (members, seen)) in &groups {
            rows.extend(members.iter().map(|r| (*r).clone()));
            let missing = match all_dim {
                Some(domain) => missing_values(seen, domain),
                None => missing_values(seen, &union),
            };
            filled += missing.len();
            rows.extend(missing.into_iter().map(|c| factory(key, c)));
        }
        tracing::debug!(
            input_rows = self.len(),
            groups = groups.len(),
            fillers = filled,
            "replenish_group"
        );
        self.derive(rows)
    }
}
