//! Range math and segment planning.
//!
//! Splits a resource of known size into N contiguous segments and computes
//! the HTTP Range header bounds for each of them.

mod range;

pub use range::{plan_segments, Segment};
