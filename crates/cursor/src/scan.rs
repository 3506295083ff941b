//! Owned-entry iteration over a bounded range.

use crate::{
    cursor::{BoundedCursor, Direction},
    error::{CursorError, CursorResult},
    native::NativeCursor,
};
use core::iter::FusedIterator;
use tigerbind_range::Range;

/// An owned key and, unless the table is key-only, its value.
pub type RawEntry = (Vec<u8>, Option<Vec<u8>>);

/// Iterator over the records of a range, created by
/// [`BoundedCursor::scan`].
///
/// Yields at most one error, after which it is exhausted.
pub struct Scan<'c, 'b, C: NativeCursor> {
    cursor: &'c mut BoundedCursor<'b, C>,
    /// Result of `iteration_begin`, consumed by the first call to `next`.
    first: Option<bool>,
    done: bool,
}

impl<C: NativeCursor> core::fmt::Debug for Scan<'_, '_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scan").field("cursor", &self.cursor).field("done", &self.done).finish()
    }
}

impl<'c, 'b, C: NativeCursor> Scan<'c, 'b, C> {
    pub(crate) fn new(
        cursor: &'c mut BoundedCursor<'b, C>,
        range: &Range,
        direction: Direction,
    ) -> CursorResult<Self> {
        let first = cursor.iteration_begin(range, direction)?;
        Ok(Self { cursor, first: Some(first), done: false })
    }

    fn advance(&mut self) -> CursorResult<Option<RawEntry>> {
        let in_range = match self.first.take() {
            Some(first) => first,
            None => self.cursor.iteration_move()?,
        };
        if in_range { self.cursor.entry().map(Some) } else { Ok(None) }
    }
}

impl<C: NativeCursor> Iterator for Scan<'_, '_, C> {
    type Item = Result<RawEntry, CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<C: NativeCursor> FusedIterator for Scan<'_, '_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCode,
        mem::{MemEngine, MemOp},
    };

    fn engine_with(keys: &[&[u8]]) -> MemEngine {
        let engine = MemEngine::new();
        engine.create("table:s", "").unwrap();
        let mut c = BoundedCursor::open(engine.open_cursor("table:s", "").unwrap()).unwrap();
        for k in keys {
            c.insert(k, b"v").unwrap();
        }
        engine
    }

    #[test]
    fn scan_both_directions() {
        let engine = engine_with(&[b"a", b"b", b"c", b"d"]);
        let mut c = BoundedCursor::open(engine.open_cursor("table:s", "").unwrap()).unwrap();
        let range = Range::segment(&b"b"[..], &b"c"[..]);

        let up: Vec<_> = c.scan(&range, Direction::Ascending).unwrap().map(Result::unwrap).collect();
        assert_eq!(up, vec![(b"b".to_vec(), Some(b"v".to_vec())), (b"c".to_vec(), Some(b"v".to_vec()))]);

        let down: Vec<_> =
            c.scan(&range, Direction::Descending).unwrap().map(|e| e.unwrap().0).collect();
        assert_eq!(down, vec![b"c".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn scan_empty_range() {
        let engine = engine_with(&[b"a"]);
        let mut c = BoundedCursor::open(engine.open_cursor("table:s", "").unwrap()).unwrap();
        let mut scan = c.scan(&Range::positive_open_ray(&b"a"[..]), Direction::Ascending).unwrap();
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
    }

    #[test]
    fn scan_yields_one_error_then_stops() {
        let engine = engine_with(&[b"a", b"b", b"c"]);
        let mut native = engine.open_cursor("table:s", "").unwrap();
        native.fail_on(MemOp::Next, ErrorCode::ROLLBACK);
        let mut c = BoundedCursor::open(native).unwrap();

        let mut scan = c.scan(&Range::positive_ray(&b"a"[..]), Direction::Ascending).unwrap();
        assert_eq!(scan.next().unwrap().unwrap().0, b"a".to_vec());
        let err = scan.next().unwrap().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ROLLBACK));
        assert!(scan.next().is_none());
    }
}
