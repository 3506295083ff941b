//! Bounded, directional range scans over a storage engine's record cursor.
//!
//! A storage engine exposes a primitive cursor that can step forward and
//! back and position itself near a key, but knows nothing of ranges. This
//! crate wraps one such cursor in a [`BoundedCursor`] that scans exactly
//! the records of a [`Range`], in either direction, and counts them.
//!
//! # Quick Start
//!
//! ```
//! # #[cfg(feature = "in-memory")]
//! # fn main() -> Result<(), tigerbind_cursor::CursorError> {
//! use tigerbind_cursor::{BoundedCursor, Direction, Range, mem::MemEngine};
//!
//! let engine = MemEngine::new();
//! engine.create("table:numbers", "key_format=u,value_format=u")?;
//!
//! let mut cursor = BoundedCursor::open(engine.open_cursor("table:numbers", "")?)?;
//! for i in 0u32..10 {
//!     cursor.insert(&i.to_be_bytes(), &[i as u8])?;
//! }
//!
//! let range = Range::segment(3u32.to_be_bytes().to_vec(), 6u32.to_be_bytes().to_vec());
//! assert_eq!(cursor.total_count(&range)?, 4);
//!
//! let mut more = cursor.iteration_begin(&range, Direction::Descending)?;
//! while more {
//!     println!("{:?}", cursor.key()?);
//!     more = cursor.iteration_move()?;
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "in-memory"))]
//! # fn main() {}
//! ```
//!
//! # Model
//!
//! - [`NativeCursor`]: the engine's primitive cursor. "Not found" is the
//!   normal out-of-data signal and never surfaces as an error from this
//!   crate; every other failure becomes a [`CursorError::Engine`] naming
//!   the failing call.
//! - [`Schema`]: the table's key and value encodings. Raw-byte or string
//!   keys, with raw-byte values or no value at all.
//! - [`BoundedCursor`]: owns one native cursor and closes it on drop.
//!
//! An iteration ends at the first record past the far boundary. Tables are
//! ordered by key, so no in-range record can follow it.
//!
//! # Feature Flags
//!
//! - `in-memory`: the [`mem`] engine, a `BTreeMap`-backed [`NativeCursor`].
//! - `test-utils`: the [`conformance`] suite (implies `in-memory`).

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

pub mod config;
pub use config::{ConfigError, ConfigString};

mod cursor;
pub use cursor::{ActiveBoundary, BoundedCursor, Direction};

mod error;
pub use error::{CursorError, CursorResult, ErrorCode};

mod native;
pub use native::NativeCursor;

mod scan;
pub use scan::{RawEntry, Scan};

pub mod schema;
pub use schema::{KeyFormat, Schema, ValueFormat};

#[cfg(any(test, feature = "in-memory"))]
pub mod mem;

#[cfg(any(test, feature = "test-utils"))]
pub mod conformance;

pub use tigerbind_range::{Boundary, Range};

#[cfg(test)]
mod tests {
    use crate::{conformance::conformance, mem::MemEngine};

    #[test]
    fn mem_conformance() {
        conformance(&MemEngine::new());
    }
}
