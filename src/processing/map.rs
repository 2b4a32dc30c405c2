//! Row mapping for [`crate::types::Frame`].

use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::error::{FrameError, FrameResult};
use crate::number::{DecimalAcc, ToDecimal};
use crate::types::Frame;

/// Returns a new [`Frame`] by applying `mapper` to every row.
///
/// This is a convenience wrapper around [`Frame::map`].
pub fn map<T, R, F>(frame: &Frame<T>, mapper: F) -> Frame<R>
where
    F: FnMut(&T) -> R,
{
    frame.map(mapper)
}

impl<T> Frame<T> {
    /// Convert every row, keeping order.
    pub fn map<R, F>(&self, mapper: F) -> Frame<R>
    where
        F: FnMut(&T) -> R,
    {
        self.derive(self.iter().map(mapper).collect())
    }

    /// Convert every row on the global rayon pool.
    ///
    /// `mapper` runs in no particular order, but the output keeps input order.
    pub fn map_parallel<R, F>(&self, mapper: F) -> Frame<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        self.derive(self.rows().par_iter().map(mapper).collect())
    }

    /// Fallible [`Self::map_parallel`].
    ///
    /// If any row fails, the whole operation fails with the error of the lowest-positioned failing
    /// row; no partial frame is produced.
    pub fn try_map_parallel<R, E, F>(&self, mapper: F) -> Result<Frame<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Send + Sync,
    {
        let results: Vec<Result<R, E>> = self.rows().par_iter().map(mapper).collect();
        let rows = results.into_iter().collect::<Result<Vec<_>, E>>()?;
        Ok(self.derive(rows))
    }

    /// Run `action` for every row on the global rayon pool.
    pub fn for_each_parallel<F>(&self, action: F) -> &Self
    where
        T: Sync,
        F: Fn(&T) + Send + Sync,
    {
        self.rows().par_iter().for_each(action);
        self
    }

    /// Split into consecutive chunks of `n` rows (the last chunk may be shorter).
    pub fn partition(&self, n: usize) -> FrameResult<Frame<Vec<T>>>
    where
        T: Clone,
    {
        if n == 0 {
            return Err(FrameError::invalid_argument("partition size must be > 0"));
        }
        Ok(self.derive(self.rows().chunks(n).map(<[T]>::to_vec).collect()))
    }
}

impl<T: Clone> Frame<T> {
    /// Write each row's share of the column total, as a percentage, through `set`.
    ///
    /// Uses the frame's default scale.
    pub fn map_percent<V, G, S>(&self, get: G, set: S) -> FrameResult<Frame<T>>
    where
        V: ToDecimal,
        G: Fn(&T) -> V,
        S: FnMut(&mut T, Decimal),
    {
        self.map_percent_scaled(get, set, self.number_format().scale)
    }

    /// Like [`Self::map_percent`], with `scale` decimal places.
    ///
    /// Rows whose value is absent are left untouched.
    pub fn map_percent_scaled<V, G, S>(&self, get: G, mut set: S, scale: u32) -> FrameResult<Frame<T>>
    where
        V: ToDecimal,
        G: Fn(&T) -> V,
        S: FnMut(&mut T, Decimal),
    {
        let mut total = DecimalAcc::default();
        for r in self.iter() {
            total.push(&get(r), "map_percent")?;
        }
        let format = self.number_format();
        let mut rows = Vec::with_capacity(self.len());
        for r in self.iter() {
            let mut out = r.clone();
            if let Some(v) = get(r).to_decimal()? {
                set(&mut out, format.percent(v, total.sum, scale)?);
            }
            rows.push(out);
        }
        Ok(self.derive(rows))
    }
}
