//! `rust-data-frame` is a small library of typed, in-memory tabular transformations.
//!
//! A [`Frame<T>`] wraps an ordered `Vec<T>` of your own record type. Every operation borrows the
//! frame and returns a new one, so pipelines read as a chain of method calls and inputs are
//! never mutated. Columns are plain closures over `&T`; there is no schema and no reflection.
//!
//! ## What you can do
//!
//! - filter, map, sort, distinct, slice and page rows ([`processing`])
//! - group by one to three keys and aggregate per group with [`rust_decimal::Decimal`] arithmetic
//!   ([`processing::group`])
//! - inner/left/right joins, with "once" variants that consume each matched row at most once
//!   ([`processing::join`])
//! - row-number and tie-aware rank columns ([`processing::rank`])
//! - explode delimited text, JSON arrays or collections into rows ([`processing::explode`])
//! - replenish missing dimension values globally or per group ([`processing::replenish`])
//! - run maps and aggregates on a throttled worker pool ([`execution`])
//! - print a frame as a text table ([`display`])
//!
//! ## Quick example
//!
//! ```rust
//! use rust_data_frame::{Frame, Sorter, FI2};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Student { name: &'static str, class: u32, score: u32 }
//!
//! let students = Frame::new(vec![
//!     Student { name: "ann", class: 1, score: 90 },
//!     Student { name: "bob", class: 2, score: 75 },
//!     Student { name: "cid", class: 1, score: 90 },
//!     Student { name: "dee", class: 2, score: 60 },
//! ]);
//!
//! // Ties share a rank and leave a gap after them.
//! let ranked = students.add_rank_col(&Sorter::desc(|s: &Student| s.score));
//! assert_eq!(ranked.col(|r| (r.c1.name, r.c2)), vec![("ann", 1), ("cid", 1), ("bob", 3), ("dee", 4)]);
//!
//! let per_class = students.group_by_count(|s| s.class);
//! assert_eq!(per_class.rows(), &[FI2::new(1, 2), FI2::new(2, 2)]);
//! ```
//!
//! ## Numbers
//!
//! Sums and averages are computed in [`rust_decimal::Decimal`]. Averages and percentages are
//! rounded with the frame's [`NumberFormat`] (scale 2, half-up by default), which derived frames
//! inherit; see [`Frame::default_scale`] and [`Frame::strict_average`].
//!
//! ## Modules
//!
//! - [`types`]: [`Frame`] and the tuple rows [`FI2`], [`FI3`], [`FI4`], [`MaxMin`]
//! - [`processing`]: every row transformation
//! - [`sorter`]: composable comparators
//! - [`number`]: decimal conversion and rounding
//! - [`execution`]: chunked parallel engine with metrics and observers
//! - [`display`]: text table rendering
//! - [`error`]: [`FrameError`] and [`FrameResult`]

pub mod display;
pub mod error;
pub mod execution;
pub mod number;
pub mod processing;
pub mod sorter;
pub mod types;

pub use error::{FrameError, FrameResult};
pub use number::{NumberFormat, RoundingMode, ToDecimal};
pub use sorter::Sorter;
pub use types::{FI2, FI3, FI4, Frame, MaxMin};
