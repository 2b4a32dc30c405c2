//! In-memory transformations over [`crate::types::Frame`].
//!
//! Every operation borrows its input frame(s) and returns a new frame; inputs are never mutated.
//! Order-preserving operations keep the relative input order of the rows they emit.
//!
//! - [`filter()`] / `where_*`: row filtering by predicate or derived value
//! - [`map()`] / `map_parallel`: row mapping, optionally on the rayon pool
//! - [`reduce()`]: whole-frame count/sum/avg in [`rust_decimal::Decimal`]
//! - [`group`]: one to three key grouping with per-group aggregates
//! - [`join`]: inner/left/right joins, optionally consuming at most one match per outer row
//! - [`rank`]: row-number and rank columns
//! - [`explode`]: one row per element of a delimited, JSON or collection field
//! - [`replenish`]: synthesize rows for missing dimension values
//!
//! ## Example: filter → group → sum
//!
//! ```rust
//! use rust_data_frame::processing::{filter, reduce, ReduceOp};
//! use rust_data_frame::{Frame, FI2};
//! use rust_decimal::Decimal;
//!
//! #[derive(Clone)]
//! struct Order { region: &'static str, active: bool, amount: f64 }
//!
//! let orders = Frame::new(vec![
//!     Order { region: "north", active: true, amount: 10.5 },
//!     Order { region: "south", active: false, amount: 20.0 },
//!     Order { region: "north", active: true, amount: 4.5 },
//!     Order { region: "south", active: true, amount: 1.0 },
//! ]);
//!
//! let active = filter(&orders, |o| o.active);
//! let by_region = active.group_by_sum(|o| o.region, |o| o.amount).unwrap();
//! assert_eq!(
//!     by_region.rows(),
//!     &[FI2::new("north", Decimal::from(15)), FI2::new("south", Decimal::from(1))]
//! );
//!
//! let total = reduce(&active, |o| o.amount, ReduceOp::Sum).unwrap();
//! assert_eq!(total, Decimal::from(16));
//! ```

pub mod explode;
pub mod filter;
pub mod group;
pub mod join;
pub mod map;
pub mod rank;
pub mod reduce;
pub mod replenish;
pub mod slice;
pub mod sort;

pub use filter::{filter, Absent};
pub use group::{GroupKey, GroupedFrame, Key1, Key2, Key3};
pub use join::{match_rows, FromJoined, JoinKind, JoinMatch};
pub use map::map;
pub use rank::assign_ranks;
pub use reduce::{reduce, ReduceOp};
