//! IPv4 deny-list filtering.
//!
//! `addr` holds the integer arithmetic, `range` a single CIDR block,
//! `set` the disjoint range set and its builder, and `engine` the shared,
//! atomically swapped deny list that request handlers query.

pub mod addr;
pub mod engine;
pub mod range;
pub mod set;

pub use engine::{DenyList, FilterEngine};
pub use range::DenyRange;
pub use set::{BuildReport, RangeSet, RangeSetBuilder};
