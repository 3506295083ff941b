//! Directional, boundary-aware iteration over a native cursor.

use crate::{
    error::{CursorError, CursorResult, NativeResultExt},
    native::NativeCursor,
    scan::Scan,
    schema::{KeyFormat, Schema},
};
use bytes::Bytes;
use core::{cmp::Ordering, fmt};
use std::ffi::CString;
use tigerbind_range::{Boundary, HexDisplay, Range, compare_bytes};
use tracing::{debug, trace, warn};

/// Direction of a range scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the left boundary towards the right, visiting keys in
    /// increasing order.
    #[default]
    Ascending,
    /// From the right boundary towards the left, visiting keys in
    /// decreasing order.
    Descending,
}

impl Direction {
    /// The opposite direction.
    pub const fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The boundary bytes an iteration stops at.
///
/// `Owned` keeps its own handle to the bytes and is valid for as long as
/// the iteration runs. `Borrowed` refers to the caller's [`Range`], which
/// must outlive the cursor.
#[derive(Clone, PartialEq, Eq)]
pub enum ActiveBoundary<'b> {
    /// The cursor holds its own reference to the bytes.
    Owned(Bytes),
    /// The cursor borrows the bytes from the caller's range.
    Borrowed(&'b [u8]),
}

impl ActiveBoundary<'_> {
    /// The boundary bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Borrowed(bytes) => bytes,
        }
    }

    /// True if the cursor holds its own reference to the bytes.
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl fmt::Debug for ActiveBoundary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_owned() { "Owned" } else { "Borrowed" };
        f.debug_tuple(kind).field(&format_args!("{}", HexDisplay(self.as_slice()))).finish()
    }
}

/// The far boundary of the running iteration.
#[derive(Debug, Clone)]
struct Stop<'b> {
    bytes: ActiveBoundary<'b>,
    inclusive: bool,
}

/// A range-scanning wrapper around exactly one native cursor.
///
/// An iteration is started with [`iteration_begin`] and advanced with
/// [`iteration_move`]. Both return `Ok(false)` once the cursor leaves the
/// range. The first record past the far boundary ends the iteration; no
/// attempt is made to skip ahead to later in-range records. Once ended,
/// [`iteration_move`] keeps returning `Ok(false)` until a new iteration
/// begins.
///
/// The native cursor is closed by [`close`], or on drop.
///
/// [`iteration_begin`]: BoundedCursor::iteration_begin
/// [`iteration_move`]: BoundedCursor::iteration_move
/// [`close`]: BoundedCursor::close
pub struct BoundedCursor<'b, C: NativeCursor> {
    native: C,
    schema: Schema,
    direction: Direction,
    stop: Option<Stop<'b>>,
    /// The running iteration has returned `false`.
    finished: bool,
    closed: bool,
}

impl<C: NativeCursor> fmt::Debug for BoundedCursor<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCursor")
            .field("uri", &self.native.uri())
            .field("schema", &self.schema)
            .field("direction", &self.direction)
            .field("stop", &self.stop)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'b, C: NativeCursor> BoundedCursor<'b, C> {
    /// Wrap `native`, checking that its table uses a supported schema.
    ///
    /// On a schema mismatch the native cursor is closed before the error is
    /// returned.
    pub fn open(mut native: C) -> CursorResult<Self> {
        let schema =
            match Schema::from_formats(native.uri(), native.key_format(), native.value_format()) {
                Ok(schema) => schema,
                Err(err) => {
                    if let Err(code) = native.close() {
                        warn!(
                            target: "tigerbind::cursor",
                            uri = native.uri(),
                            %code,
                            "failed to close rejected cursor"
                        );
                    }
                    return Err(err);
                }
            };
        debug!(target: "tigerbind::cursor", uri = native.uri(), ?schema, "opened bounded cursor");
        Ok(Self {
            native,
            schema,
            direction: Direction::Ascending,
            stop: None,
            finished: false,
            closed: false,
        })
    }

    /// The table schema.
    pub const fn schema(&self) -> Schema {
        self.schema
    }

    /// The table this cursor was opened on.
    pub fn uri(&self) -> &str {
        self.native.uri()
    }

    /// Direction of the current or most recent iteration.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// The far boundary of the running iteration, if it has one.
    pub fn active_boundary(&self) -> Option<&ActiveBoundary<'b>> {
        self.stop.as_ref().map(|stop| &stop.bytes)
    }

    /// Position on the first record of `range` in `direction`.
    ///
    /// Returns `Ok(true)` if the cursor is on a record within the range.
    /// The cursor keeps its own handle to the far boundary, so `range` may
    /// be dropped once this returns.
    pub fn iteration_begin(&mut self, range: &Range, direction: Direction) -> CursorResult<bool> {
        let stop = far_side(range, direction)
            .map(|b| Stop { bytes: ActiveBoundary::Owned(b.bytes().clone()), inclusive: b.is_inclusive() });
        self.begin(range, direction, stop)
    }

    /// As [`iteration_begin`], but the cursor borrows the far boundary from
    /// `range` instead of holding its own handle. `range` must outlive the
    /// cursor.
    ///
    /// [`iteration_begin`]: BoundedCursor::iteration_begin
    pub fn iteration_begin_borrowed(
        &mut self,
        range: &'b Range,
        direction: Direction,
    ) -> CursorResult<bool> {
        let stop = far_side(range, direction)
            .map(|b| Stop { bytes: ActiveBoundary::Borrowed(b.as_slice()), inclusive: b.is_inclusive() });
        self.begin(range, direction, stop)
    }

    fn begin(
        &mut self,
        range: &Range,
        direction: Direction,
        stop: Option<Stop<'b>>,
    ) -> CursorResult<bool> {
        self.stop = None;
        self.finished = false;
        self.direction = direction;

        let near = match direction {
            Direction::Ascending => range.left(),
            Direction::Descending => range.right(),
        };
        if !self.position(near)? {
            trace!(target: "tigerbind::cursor", %range, ?direction, "no records at range start");
            self.finished = true;
            return Ok(false);
        }

        self.stop = stop;
        let within = self.within()?;
        self.finished = !within;
        trace!(target: "tigerbind::cursor", %range, ?direction, within, "began iteration");
        Ok(within)
    }

    /// Move the native cursor onto the first record at or past `near`.
    fn position(&mut self, near: Option<&Boundary>) -> CursorResult<bool> {
        let Some(near) = near else {
            self.native.reset().or_engine("cursor.reset")?;
            return self.step();
        };

        self.set_native_key(near.as_slice())?;
        let Some(exact) = self.native.search_near().found("cursor.search_near")? else {
            return Ok(false);
        };

        // landed before the range start in scan order
        let short = match self.direction {
            Direction::Ascending => Ordering::Less,
            Direction::Descending => Ordering::Greater,
        };
        if exact == short || (exact == Ordering::Equal && !near.is_inclusive()) {
            return self.step();
        }
        Ok(true)
    }

    /// Advance to the next record in the iteration direction.
    ///
    /// Returns `Ok(false)` when the cursor runs off the table or leaves the
    /// range. Either ends the iteration, and later calls return `Ok(false)`
    /// without moving the native cursor.
    pub fn iteration_move(&mut self) -> CursorResult<bool> {
        if self.finished {
            return Ok(false);
        }
        let within = self.step()? && self.within()?;
        self.finished = !within;
        Ok(within)
    }

    fn step(&mut self) -> CursorResult<bool> {
        let stepped = match self.direction {
            Direction::Ascending => self.native.next().found("cursor.next")?,
            Direction::Descending => self.native.prev().found("cursor.prev")?,
        };
        Ok(stepped.is_some())
    }

    /// Whether the current key lies on the near side of the far boundary.
    fn within(&self) -> CursorResult<bool> {
        let Some(stop) = &self.stop else { return Ok(true) };
        let key = self.key()?;
        Ok(match (compare_bytes(key, stop.bytes.as_slice()), self.direction) {
            (Ordering::Equal, _) => stop.inclusive,
            (Ordering::Less, Direction::Ascending) | (Ordering::Greater, Direction::Descending) => {
                true
            }
            _ => false,
        })
    }

    /// Count the records in `range`.
    ///
    /// Leaves the cursor at an unspecified position. Call [`reset`] or begin
    /// a new iteration before using it again.
    ///
    /// [`reset`]: BoundedCursor::reset
    pub fn total_count(&mut self, range: &Range) -> CursorResult<u64> {
        self.total_count_max(range, u64::MAX)
    }

    /// Count the records in `range`, stopping once `max` have been seen.
    ///
    /// Returns `min(max, count)`. Leaves the cursor at an unspecified
    /// position, like [`total_count`].
    ///
    /// [`total_count`]: BoundedCursor::total_count
    pub fn total_count_max(&mut self, range: &Range, max: u64) -> CursorResult<u64> {
        let mut count = 0;
        if max > 0 && self.iteration_begin(range, Direction::Ascending)? {
            count = 1;
            while count < max && self.iteration_move()? {
                count += 1;
            }
        }
        debug!(target: "tigerbind::cursor", %range, count, max, "counted range");
        Ok(count)
    }

    /// Release the native cursor's position and drop the active boundary.
    pub fn reset(&mut self) -> CursorResult<()> {
        self.native.reset().or_engine("cursor.reset")?;
        self.stop = None;
        self.finished = false;
        trace!(target: "tigerbind::cursor", uri = self.native.uri(), "reset cursor");
        Ok(())
    }

    /// Scan `range` in `direction`, yielding owned key/value pairs.
    ///
    /// Values are `None` on key-only tables.
    pub fn scan(&mut self, range: &Range, direction: Direction) -> CursorResult<Scan<'_, 'b, C>> {
        Scan::new(self, range, direction)
    }

    /// Position on `key`. Returns `Ok(false)` if it does not exist.
    pub fn search(&mut self, key: &[u8]) -> CursorResult<bool> {
        self.set_native_key(key)?;
        Ok(self.native.search().found("cursor.search")?.is_some())
    }

    /// Position on the record nearest `key`.
    ///
    /// Returns how the landed-on key compares to `key`, or `None` if the
    /// table is empty.
    pub fn search_near(&mut self, key: &[u8]) -> CursorResult<Option<Ordering>> {
        self.set_native_key(key)?;
        self.native.search_near().found("cursor.search_near")
    }

    /// Insert a record. Fails with a duplicate-key engine error if the key
    /// exists and the cursor does not overwrite.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> CursorResult<()> {
        self.require_values("insert")?;
        self.set_native_key(key)?;
        self.native.set_value(value);
        self.native.insert().or_engine("cursor.insert")
    }

    /// Insert a key into a key-only table.
    pub fn insert_key(&mut self, key: &[u8]) -> CursorResult<()> {
        self.require_key_only("insert_key")?;
        self.set_native_key(key)?;
        self.native.insert().or_engine("cursor.insert")
    }

    /// Insert an index entry into a key-only table.
    ///
    /// The stored key is `index_key ++ primary_key`, so every primary key
    /// filed under `index_key` is found by scanning
    /// [`Range::prefix(index_key)`](Range::prefix).
    pub fn insert_index(&mut self, index_key: &[u8], primary_key: &[u8]) -> CursorResult<()> {
        self.require_key_only("insert_index")?;
        let mut key = Vec::with_capacity(index_key.len() + primary_key.len());
        key.extend_from_slice(index_key);
        key.extend_from_slice(primary_key);
        self.set_native_key(&key)?;
        self.native.insert().or_engine("cursor.insert")
    }

    /// Overwrite the value at `key`. Returns `Ok(false)` if it does not
    /// exist.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> CursorResult<bool> {
        self.require_values("update")?;
        self.set_native_key(key)?;
        self.native.set_value(value);
        Ok(self.native.update().found("cursor.update")?.is_some())
    }

    /// Remove the record at `key`. Returns `Ok(false)` if it does not exist.
    pub fn remove(&mut self, key: &[u8]) -> CursorResult<bool> {
        self.set_native_key(key)?;
        Ok(self.native.remove().found("cursor.remove")?.is_some())
    }

    /// The current key. String keys are returned without their terminator.
    pub fn key(&self) -> CursorResult<&[u8]> {
        let raw = self.native.get_key().or_engine("cursor.get_key")?;
        Ok(match self.schema.key() {
            KeyFormat::Bytes => raw,
            KeyFormat::String => raw.iter().position(|&b| b == 0).map_or(raw, |end| &raw[..end]),
        })
    }

    /// The current value.
    pub fn value(&self) -> CursorResult<&[u8]> {
        self.require_values("value")?;
        self.native.get_value().or_engine("cursor.get_value")
    }

    /// The current key and, unless the table is key-only, value, copied out
    /// of the cursor.
    pub fn entry(&self) -> CursorResult<(Vec<u8>, Option<Vec<u8>>)> {
        let key = self.key()?.to_vec();
        let value =
            if self.schema.is_key_only() { None } else { Some(self.value()?.to_vec()) };
        Ok((key, value))
    }

    /// Step the native cursor forward, ignoring any range.
    pub fn next(&mut self) -> CursorResult<bool> {
        Ok(self.native.next().found("cursor.next")?.is_some())
    }

    /// Step the native cursor backward, ignoring any range.
    pub fn prev(&mut self) -> CursorResult<bool> {
        Ok(self.native.prev().found("cursor.prev")?.is_some())
    }

    /// Close the native cursor, reporting failure.
    pub fn close(mut self) -> CursorResult<()> {
        self.closed = true;
        self.native.close().or_engine("cursor.close")
    }

    fn set_native_key(&mut self, key: &[u8]) -> CursorResult<()> {
        match self.schema.key() {
            KeyFormat::Bytes => self.native.set_key(key),
            KeyFormat::String => {
                let key = CString::new(key)?;
                self.native.set_key(key.as_bytes_with_nul());
            }
        }
        Ok(())
    }

    const fn require_values(&self, op: &'static str) -> CursorResult<()> {
        if self.schema.is_key_only() { Err(CursorError::KeyOnly { op }) } else { Ok(()) }
    }

    const fn require_key_only(&self, op: &'static str) -> CursorResult<()> {
        if self.schema.is_key_only() { Ok(()) } else { Err(CursorError::ValueRequired { op }) }
    }
}

impl<C: NativeCursor> Drop for BoundedCursor<'_, C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(code) = self.native.close() {
            warn!(
                target: "tigerbind::cursor",
                uri = self.native.uri(),
                %code,
                "failed to close native cursor on drop"
            );
        }
    }
}

const fn far_side(range: &Range, direction: Direction) -> Option<&Boundary> {
    match direction {
        Direction::Ascending => range.right(),
        Direction::Descending => range.left(),
    }
}
