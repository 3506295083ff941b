//! Boundary and range algebra over an ordered byte-string keyspace.
//!
//! Keys are ordered lexicographically by unsigned byte value, with a strict
//! prefix sorting before any key that extends it. This is the order the
//! storage engine uses for raw byte keys, so a [`Range`] built here selects
//! exactly the records a bounded cursor scan visits.
//!
//! # Building ranges
//!
//! ```
//! use tigerbind_range::Range;
//!
//! let keys = Range::segment(vec![0, 3], vec![0, 6]);
//! assert!(keys.contains(&[0, 4]));
//! assert!(!keys.contains(&[0, 7]));
//!
//! // Every key beginning with `0x01`.
//! let scoped = Range::prefix(vec![1]);
//! assert!(scoped.contains(&[1, 0xFF, 0xFF]));
//! assert!(!scoped.contains(&[2]));
//!
//! // Intersections may be empty; the caller checks.
//! let none = Range::segment(vec![1], vec![2]).intersect_with(&Range::interval(vec![2], vec![3]));
//! assert!(none.is_empty());
//! ```
//!
//! A missing side is `None`, never an empty byte string: `Range::line()`
//! is unbounded on both sides, while `Range::positive_ray(vec![])` is a
//! lower-bounded range that happens to admit every key.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod boundary;
pub use boundary::{Boundary, compare_left, compare_right, max_left, min_right};

mod keys;
pub use keys::{HexDisplay, compare_bytes, decrement_bytes, increment_bytes};

mod range;
pub use range::Range;
