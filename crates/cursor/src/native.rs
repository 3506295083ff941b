//! The primitive record cursor wrapped by [`BoundedCursor`].
//!
//! [`BoundedCursor`]: crate::BoundedCursor

use crate::error::ErrorCode;
use core::cmp::Ordering;

/// A storage engine's primitive record cursor.
///
/// The cursor holds a pending key and value, set with [`set_key`] and
/// [`set_value`], which the search and mutation calls consume. A cursor is
/// either positioned on a record or unpositioned; [`next`] and [`prev`]
/// from an unpositioned cursor move to the first and last record.
///
/// "Not found" is reported as [`ErrorCode::NOT_FOUND`]. It is the normal
/// out-of-data signal and callers are expected to absorb it.
///
/// Implementations are used by exactly one owner at a time and need not
/// be thread safe.
///
/// [`set_key`]: NativeCursor::set_key
/// [`set_value`]: NativeCursor::set_value
/// [`next`]: NativeCursor::next
/// [`prev`]: NativeCursor::prev
pub trait NativeCursor {
    /// The table this cursor was opened on.
    fn uri(&self) -> &str;

    /// The table's key format, e.g. `u` or `S`.
    fn key_format(&self) -> &str;

    /// The table's value format, e.g. `u`, or empty for key-only tables.
    fn value_format(&self) -> &str;

    /// Move to the next record.
    fn next(&mut self) -> Result<(), ErrorCode>;

    /// Move to the previous record.
    fn prev(&mut self) -> Result<(), ErrorCode>;

    /// Position on the record whose key equals the pending key.
    fn search(&mut self) -> Result<(), ErrorCode>;

    /// Position on the record nearest the pending key.
    ///
    /// The returned ordering compares the landed-on key with the pending
    /// key: `Equal` for an exact match, `Greater` if the cursor is on a
    /// larger key, `Less` if it is on a smaller key.
    fn search_near(&mut self) -> Result<Ordering, ErrorCode>;

    /// The key of the current record.
    ///
    /// For string-keyed tables the buffer is NUL-terminated and may extend
    /// past the terminator. Callers must find the terminator rather than
    /// trust the slice length.
    fn get_key(&self) -> Result<&[u8], ErrorCode>;

    /// The value of the current record.
    fn get_value(&self) -> Result<&[u8], ErrorCode>;

    /// Set the pending key. String keys are passed with their terminator.
    fn set_key(&mut self, key: &[u8]);

    /// Set the pending value.
    fn set_value(&mut self, value: &[u8]);

    /// Insert the pending key and value.
    fn insert(&mut self) -> Result<(), ErrorCode>;

    /// Overwrite the value of an existing record at the pending key.
    fn update(&mut self) -> Result<(), ErrorCode>;

    /// Remove the record at the pending key.
    fn remove(&mut self) -> Result<(), ErrorCode>;

    /// Release the cursor's position and pending key and value.
    fn reset(&mut self) -> Result<(), ErrorCode>;

    /// Close the cursor, releasing engine-side resources. Every later call
    /// fails.
    fn close(&mut self) -> Result<(), ErrorCode>;
}

impl<C: NativeCursor + ?Sized> NativeCursor for Box<C> {
    fn uri(&self) -> &str {
        (**self).uri()
    }

    fn key_format(&self) -> &str {
        (**self).key_format()
    }

    fn value_format(&self) -> &str {
        (**self).value_format()
    }

    fn next(&mut self) -> Result<(), ErrorCode> {
        (**self).next()
    }

    fn prev(&mut self) -> Result<(), ErrorCode> {
        (**self).prev()
    }

    fn search(&mut self) -> Result<(), ErrorCode> {
        (**self).search()
    }

    fn search_near(&mut self) -> Result<Ordering, ErrorCode> {
        (**self).search_near()
    }

    fn get_key(&self) -> Result<&[u8], ErrorCode> {
        (**self).get_key()
    }

    fn get_value(&self) -> Result<&[u8], ErrorCode> {
        (**self).get_value()
    }

    fn set_key(&mut self, key: &[u8]) {
        (**self).set_key(key)
    }

    fn set_value(&mut self, value: &[u8]) {
        (**self).set_value(value)
    }

    fn insert(&mut self) -> Result<(), ErrorCode> {
        (**self).insert()
    }

    fn update(&mut self) -> Result<(), ErrorCode> {
        (**self).update()
    }

    fn remove(&mut self) -> Result<(), ErrorCode> {
        (**self).remove()
    }

    fn reset(&mut self) -> Result<(), ErrorCode> {
        (**self).reset()
    }

    fn close(&mut self) -> Result<(), ErrorCode> {
        (**self).close()
    }
}
