//! Row-number and rank columns.
//!
//! Both operations optionally sort first (stable), then number rows from 1. Row numbers are
//! strictly increasing. Ranks are shared within a tie group (rows comparing equal under the
//! sorter) and equal the 1-based position of the group's first row, so ties leave gaps:
//! `1, 1, 3`.

use crate::sorter::Sorter;
use crate::types::{FI2, Frame};

/// Assign competition ranks to rows that are already sorted by `sorter`.
pub fn assign_ranks<T>(sorted: &[T], sorter: &Sorter<'_, T>) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(sorted.len());
    for (i, row) in sorted.iter().enumerate() {
        let rank = match (i.checked_sub(1), ranks.last()) {
            (Some(prev), Some(&prev_rank)) if sorter.compare(&sorted[prev], row).is_eq() => prev_rank,
            _ => i + 1,
        };
        ranks.push(rank);
    }
    ranks
}

impl<T: Clone> Frame<T> {
    fn sorted_rows(&self, sorter: Option<&Sorter<'_, T>>) -> Vec<T> {
        let mut rows = self.rows().to_vec();
        if let Some(sorter) = sorter {
            sorter.sort(&mut rows);
        }
        rows
    }

    /// Pair each row with its 1-based position in current frame order.
    pub fn add_row_number_col(&self) -> Frame<FI2<T, usize>> {
        self.row_numbers(None)
    }

    /// Sort by `sorter`, then pair each row with its 1-based position.
    pub fn add_row_number_col_sorted(&self, sorter: &Sorter<'_, T>) -> Frame<FI2<T, usize>> {
        self.row_numbers(Some(sorter))
    }

    fn row_numbers(&self, sorter: Option<&Sorter<'_, T>>) -> Frame<FI2<T, usize>> {
        let rows = self
            .sorted_rows(sorter)
            .into_iter()
            .enumerate()
            .map(|(i, r)| FI2::new(r, i + 1))
            .collect();
        self.derive(rows)
    }

    /// Write row numbers into each row through `set`, optionally sorting first.
    pub fn add_row_number_col_with<S>(&self, sorter: Option<&Sorter<'_, T>>, mut set: S) -> Frame<T>
    where
        S: FnMut(&mut T, usize),
    {
        let mut rows = self.sorted_rows(sorter);
        for (i, r) in rows.iter_mut().enumerate() {
            set(r, i + 1);
        }
        self.derive(rows)
    }

    /// Sort by `sorter` and pair each row with its rank.
    pub fn add_rank_col(&self, sorter: &Sorter<'_, T>) -> Frame<FI2<T, usize>> {
        let rows = self.sorted_rows(Some(sorter));
        let ranks = assign_ranks(&rows, sorter);
        let out = rows
            .into_iter()
            .zip(ranks)
            .map(|(r, rank)| FI2::new(r, rank))
            .collect();
        self.derive(out)
    }

    /// Sort by `sorter` and write each row's rank through `set`.
    pub fn add_rank_col_with<S>(&self, sorter: &Sorter<'_, T>, mut set: S) -> Frame<T>
    where
        S: FnMut(&mut T, usize),
    {
        let mut rows = self.sorted_rows(Some(sorter));
        let ranks = assign_ranks(&rows, sorter);
        for (r, rank) in rows.iter_mut().zip(ranks) {
            set(r, rank);
        }
        self.derive(rows)
    }

    /// Keep rows ranked within the top `n`.
    ///
    /// A tie group straddling position `n` is kept whole, so more than `n` rows may remain.
    pub fn cut_first_rank(&self, sorter: &Sorter<'_, T>, n: usize) -> Frame<T> {
        let rows = self.sorted_rows(Some(sorter));
        let ranks = assign_ranks(&rows, sorter);
        let kept: Vec<T> = rows
            .into_iter()
            .zip(ranks)
            .take_while(|(_, rank)| *rank <= n)
            .map(|(r, _)| r)
            .collect();
        tracing::trace!(input_rows = self.len(), kept = kept.len(), n, "cut_first_rank");
        self.derive(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::assign_ranks;
    use crate::sorter::Sorter;
    use crate::types::Frame;

    #[derive(Debug, Clone, PartialEq)]
    struct Player {
        name: &'static str,
        score: u32,
        rank: usize,
    }

    fn players() -> Frame<Player> {
        [("a", 70), ("b", 90), ("c", 80), ("d", 90), ("e", 80), ("f", 60)]
            .into_iter()
            .map(|(name, score)| Player { name, score, rank: 0 })
            .collect()
    }

    fn by_score_desc<'a>() -> Sorter<'a, Player> {
        Sorter::desc(|p: &Player| p.score)
    }

    #[test]
    fn row_numbers_follow_current_or_sorted_order() {
        let plain = players().add_row_number_col();
        assert_eq!(plain.col(|r| (r.c1.name, r.c2)), vec![
            ("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6)
        ]);
        let sorted = players().add_row_number_col_sorted(&by_score_desc());
        assert_eq!(sorted.col(|r| r.c1.name), vec!["b", "d", "c", "e", "a", "f"]);
        assert_eq!(sorted.col(|r| r.c2), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn ties_share_rank_of_first_member() {
        let ranked = players().add_rank_col(&by_score_desc());
        assert_eq!(
            ranked.col(|r| (r.c1.name, r.c2)),
            vec![("b", 1), ("d", 1), ("c", 3), ("e", 3), ("a", 5), ("f", 6)]
        );
    }

    #[test]
    fn rank_tie_law_holds() {
        let sorter = by_score_desc();
        let ranked = players().add_rank_col(&sorter);
        for x in ranked.iter() {
            for y in ranked.iter() {
                if sorter.compare(&x.c1, &y.c1).is_eq() {
                    assert_eq!(x.c2, y.c2);
                }
            }
        }
    }

    #[test]
    fn setter_variants_write_into_rows() {
        let ranked = players().add_rank_col_with(&by_score_desc(), |p, r| p.rank = r);
        assert_eq!(ranked.col(|p| p.rank), vec![1, 1, 3, 3, 5, 6]);
        let numbered = players().add_row_number_col_with(None, |p, n| p.rank = n);
        assert_eq!(numbered.col(|p| p.rank), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn cut_first_rank_keeps_whole_tie_groups() {
        let top = players().cut_first_rank(&by_score_desc(), 3);
        assert_eq!(top.col(|p| p.name), vec!["b", "d", "c", "e"]);
        let top2 = players().cut_first_rank(&by_score_desc(), 2);
        assert_eq!(top2.col(|p| p.name), vec!["b", "d"]);
        assert!(players().cut_first_rank(&by_score_desc(), 0).is_empty());
    }

    #[test]
    fn ranks_of_empty_and_single() {
        let sorter = Sorter::asc(|v: &i32| *v);
        assert!(assign_ranks(&[], &sorter).is_empty());
        assert_eq!(assign_ranks(&[5], &sorter), vec![1]);
        assert_eq!(assign_ranks(&[1, 1, 1, 2], &sorter), vec![1, 1, 1, 4]);
    }
}
