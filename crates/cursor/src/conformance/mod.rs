//! Behavioural tests runnable against any [`NativeCursor`] backend.
//!
//! Each `test_*` function creates its own tables through a [`TestBackend`]
//! and panics on failure.

mod iteration;
mod point;

pub use iteration::*;
pub use point::*;

use crate::{BoundedCursor, Direction, NativeCursor, mem::MemEngine};
use tigerbind_range::Range;

/// A backend the conformance suite can create tables in.
pub trait TestBackend {
    /// The backend's cursor type.
    type Cursor: NativeCursor;

    /// Create a fresh table from `config`, fill it with `rows`, and open a
    /// cursor on it. Values are ignored for key-only tables.
    fn table(&self, config: &str, rows: &[(&[u8], &[u8])]) -> Self::Cursor;
}

impl TestBackend for MemEngine {
    type Cursor = crate::mem::MemCursor;

    fn table(&self, config: &str, rows: &[(&[u8], &[u8])]) -> Self::Cursor {
        let uri = format!("table:conformance-{}", table_seq());
        self.create(&uri, config).unwrap();
        let mut c = self.open_cursor(&uri, "").unwrap();
        let key_only = c.value_format().is_empty();
        for (k, v) in rows {
            c.set_key(k);
            if !key_only {
                c.set_value(v);
            }
            c.insert().unwrap();
        }
        c.reset().unwrap();
        c
    }
}

fn table_seq() -> usize {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Run all conformance tests against a [`TestBackend`].
pub fn conformance<B: TestBackend>(backend: &B) {
    test_empty_table(backend);
    test_numbered_scenario(backend);
    test_iteration_completeness(backend);
    test_direction_symmetry(backend);
    test_boundary_exactness(backend);
    test_count_cap(backend);
    test_rays_and_line(backend);
    test_finished_iteration_stays_finished(backend);
    test_index_prefix_scan(backend);
    test_point_operations(backend);
    test_key_only_misuse(backend);
    test_string_keys(backend);
}

/// Big-endian 4-byte key for `n`.
pub(crate) fn be(n: u32) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

/// A raw-byte table with keys `be(0)..be(n)` and one-byte values.
pub(crate) fn numbered<'b, B: TestBackend>(backend: &B, n: u32) -> BoundedCursor<'b, B::Cursor> {
    let keys: Vec<_> = (0..n).map(be).collect();
    let values: Vec<_> = (0..n).map(|i| vec![i as u8]).collect();
    let rows: Vec<(&[u8], &[u8])> =
        keys.iter().zip(&values).map(|(k, v)| (k.as_slice(), v.as_slice())).collect();
    BoundedCursor::open(backend.table("key_format=u,value_format=u", &rows)).unwrap()
}

/// Run one iteration to completion and decode the keys as integers.
pub(crate) fn visit<C: NativeCursor>(
    c: &mut BoundedCursor<'_, C>,
    range: &Range,
    direction: Direction,
) -> Vec<u32> {
    let mut out = vec![];
    let mut ok = c.iteration_begin(range, direction).unwrap();
    while ok {
        let key: [u8; 4] = c.key().unwrap().try_into().unwrap();
        out.push(u32::from_be_bytes(key));
        ok = c.iteration_move().unwrap();
    }
    out
}
