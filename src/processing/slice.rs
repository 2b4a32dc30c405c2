//! Slicing, paging and single-row views.

use crate::error::{FrameError, FrameResult};
use crate::types::Frame;

fn page_bounds(len: usize, page: usize, page_size: usize) -> FrameResult<std::ops::Range<usize>> {
    if page_size == 0 {
        return Err(FrameError::invalid_argument("page size must be > 0"));
    }
    // Pages are 1-based; page 0 is treated as the first page.
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    Ok(start..end)
}

impl<T: Clone> Frame<T> {
    /// First `n` rows (all rows if fewer).
    pub fn cut_first(&self, n: usize) -> Frame<T> {
        self.derive(self.head_n(n))
    }

    /// Last `n` rows (all rows if fewer).
    pub fn cut_last(&self, n: usize) -> Frame<T> {
        self.derive(self.tail_n(n))
    }

    /// Rows in the half-open range `[start, end)`; `end` is clamped to the frame length.
    pub fn cut(&self, start: usize, end: usize) -> FrameResult<Frame<T>> {
        Ok(self.derive(self.get_list(start, end)?))
    }

    /// One page of rows as a frame. See [`Self::page`].
    pub fn cut_page(&self, page: usize, page_size: usize) -> FrameResult<Frame<T>> {
        Ok(self.derive(self.page(page, page_size)?))
    }

    /// One page of rows; pages are 1-based and page `0` is the first page.
    pub fn page(&self, page: usize, page_size: usize) -> FrameResult<Vec<T>> {
        let range = page_bounds(self.len(), page, page_size)?;
        Ok(self.rows()[range].to_vec())
    }

    /// Rows in the half-open range `[start, end)`.
    pub fn get_list(&self, start: usize, end: usize) -> FrameResult<Vec<T>> {
        if start > end {
            return Err(FrameError::invalid_argument(format!(
                "start index {start} is greater than end index {end}"
            )));
        }
        let end = end.min(self.len());
        let start = start.min(end);
        Ok(self.rows()[start..end].to_vec())
    }

    /// The first row.
    pub fn head(&self) -> FrameResult<T> {
        self.rows()
            .first()
            .cloned()
            .ok_or(FrameError::EmptySource { operation: "head" })
    }

    /// The first `n` rows.
    pub fn head_n(&self, n: usize) -> Vec<T> {
        self.rows()[..n.min(self.len())].to_vec()
    }

    /// The last row.
    pub fn tail(&self) -> FrameResult<T> {
        self.rows()
            .last()
            .cloned()
            .ok_or(FrameError::EmptySource { operation: "tail" })
    }

    /// The last `n` rows, in frame order.
    pub fn tail_n(&self, n: usize) -> Vec<T> {
        self.rows()[self.len().saturating_sub(n)..].to_vec()
    }
}
