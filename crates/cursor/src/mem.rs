//! In-memory storage engine.
//!
//! This is not a good implementation for production use, but is useful for
//! testing. It follows the engine's cursor contract closely enough that
//! [`BoundedCursor`] behaves the same against it as against a real table.
//!
//! [`BoundedCursor`]: crate::BoundedCursor

use crate::{
    config::ConfigString,
    error::{CursorError, CursorResult, ErrorCode},
    native::NativeCursor,
    schema::formats_from_config,
};
use bytes::Bytes;
use core::{cmp::Ordering, ops::Bound};
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
    },
};

type Rows = BTreeMap<Vec<u8>, Bytes>;

struct MemTable {
    key_format: String,
    value_format: String,
    rows: RwLock<Rows>,
}

impl MemTable {
    fn string_keys(&self) -> bool {
        self.key_format == "S"
    }

    fn key_only(&self) -> bool {
        self.value_format.is_empty()
    }
}

/// A set of in-memory tables, keyed by URI.
///
/// Cloning is cheap and clones share tables. Each table is guarded by its
/// own [`RwLock`], so cursors on the same table see each other's writes
/// immediately. There are no transactions.
#[derive(Clone, Default)]
pub struct MemEngine {
    tables: Arc<RwLock<HashMap<String, Arc<MemTable>>>>,
    open: Arc<AtomicUsize>,
}

impl core::fmt::Debug for MemEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemEngine")
            .field("tables", &self.tables.read().len())
            .field("open_cursors", &self.open_cursor_count())
            .finish()
    }
}

impl MemEngine {
    /// Create an engine with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the table `uri` from a configuration string such as
    /// `key_format=u,value_format=u`.
    ///
    /// Missing formats default to `u`. Formats are stored as given, so a
    /// table may use a schema that [`BoundedCursor::open`] later rejects.
    /// Creating a table that already exists leaves it unchanged.
    ///
    /// [`BoundedCursor::open`]: crate::BoundedCursor::open
    pub fn create(&self, uri: &str, config: &str) -> CursorResult<()> {
        let (key_format, value_format) = formats_from_config(config)?;
        self.tables.write().entry(uri.to_owned()).or_insert_with(|| {
            Arc::new(MemTable {
                key_format: key_format.to_owned(),
                value_format: value_format.to_owned(),
                rows: RwLock::new(Rows::new()),
            })
        });
        Ok(())
    }

    /// Open a cursor on the table `uri`.
    ///
    /// The only recognised option is `overwrite` (default `true`). Without
    /// it, inserting an existing key fails with
    /// [`ErrorCode::DUPLICATE_KEY`].
    pub fn open_cursor(&self, uri: &str, config: &str) -> CursorResult<MemCursor> {
        let table = self
            .tables
            .read()
            .get(uri)
            .cloned()
            .ok_or(CursorError::engine(ErrorCode::ENOENT, "session.open_cursor"))?;
        let overwrite = ConfigString::new(config).get_bool("overwrite")?.unwrap_or(true);

        self.open.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(MemCursor {
            uri: uri.to_owned(),
            table,
            overwrite,
            pending_key: None,
            pending_value: None,
            position: None,
            failures: HashMap::new(),
            key_padding: Vec::new(),
            open: Some(self.open.clone()),
        })
    }

    /// Number of records in `uri`, or `None` if there is no such table.
    pub fn len(&self, uri: &str) -> Option<usize> {
        self.tables.read().get(uri).map(|t| t.rows.read().len())
    }

    /// Number of cursors opened and not yet closed.
    pub fn open_cursor_count(&self) -> usize {
        self.open.load(AtomicOrdering::Relaxed)
    }
}

/// A native cursor operation, for [`MemCursor::fail_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemOp {
    /// [`NativeCursor::next`].
    Next,
    /// [`NativeCursor::prev`].
    Prev,
    /// [`NativeCursor::search`].
    Search,
    /// [`NativeCursor::search_near`].
    SearchNear,
    /// [`NativeCursor::get_key`].
    GetKey,
    /// [`NativeCursor::get_value`].
    GetValue,
    /// [`NativeCursor::insert`].
    Insert,
    /// [`NativeCursor::update`].
    Update,
    /// [`NativeCursor::remove`].
    Remove,
    /// [`NativeCursor::reset`].
    Reset,
    /// [`NativeCursor::close`].
    Close,
}

/// The record a cursor is on.
struct Position {
    /// The key as returned by `get_key`: NUL-terminated on string tables,
    /// followed by any key padding.
    key_buf: Vec<u8>,
    value: Bytes,
}

/// A cursor on a [`MemEngine`] table.
pub struct MemCursor {
    uri: String,
    table: Arc<MemTable>,
    overwrite: bool,
    pending_key: Option<Vec<u8>>,
    pending_value: Option<Bytes>,
    position: Option<Position>,
    failures: HashMap<MemOp, ErrorCode>,
    /// Bytes returned after the terminator of string keys.
    key_padding: Vec<u8>,
    /// `None` once closed.
    open: Option<Arc<AtomicUsize>>,
}

impl core::fmt::Debug for MemCursor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemCursor")
            .field("uri", &self.uri)
            .field("overwrite", &self.overwrite)
            .field("positioned", &self.position.is_some())
            .field("closed", &self.open.is_none())
            .finish_non_exhaustive()
    }
}

impl MemCursor {
    /// Make every later call of `op` fail with `code`, until
    /// [`clear_failures`](MemCursor::clear_failures) is called.
    pub fn fail_on(&mut self, op: MemOp, code: ErrorCode) {
        self.failures.insert(op, code);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    /// Return `padding` after the terminator of every string key read
    /// through `get_key`, as engines that report a key's buffer length
    /// rather than its string length do. Ignored on raw-byte tables.
    pub fn pad_string_keys(&mut self, padding: &[u8]) {
        self.key_padding = padding.to_vec();
    }

    /// Whether the cursor is on a record.
    pub const fn is_positioned(&self) -> bool {
        self.position.is_some()
    }

    fn check(&self, op: MemOp) -> Result<(), ErrorCode> {
        if self.open.is_none() {
            return Err(ErrorCode::EINVAL);
        }
        self.failures.get(&op).map_or(Ok(()), |code| Err(*code))
    }

    /// The key of the current record as stored, without a terminator.
    fn current_key(&self) -> Option<&[u8]> {
        let key = self.position.as_ref()?.key_buf.as_slice();
        if self.table.string_keys() {
            key.iter().position(|&b| b == 0).map(|end| &key[..end])
        } else {
            Some(key)
        }
    }

    fn pending_key(&self) -> Result<&[u8], ErrorCode> {
        self.pending_key.as_deref().ok_or(ErrorCode::EINVAL)
    }

    fn land(&mut self, found: Option<(&Vec<u8>, &Bytes)>) -> Result<(), ErrorCode> {
        let string_keys = self.table.string_keys();
        let padding = &self.key_padding;
        self.position = found.map(|(key, value)| {
            let mut key_buf = key.clone();
            if string_keys {
                key_buf.push(0);
                key_buf.extend_from_slice(padding);
            }
            Position { key_buf, value: value.clone() }
        });
        if self.position.is_some() { Ok(()) } else { Err(ErrorCode::NOT_FOUND) }
    }

    fn step(&mut self, forward: bool) -> Result<(), ErrorCode> {
        let table = self.table.clone();
        let rows = table.rows.read();
        let found = match (self.current_key(), forward) {
            (None, true) => rows.iter().next(),
            (None, false) => rows.iter().next_back(),
            (Some(key), true) => rows.range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded)).next(),
            (Some(key), false) => {
                rows.range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key))).next_back()
            }
        };
        self.land(found)
    }

    fn finish_write(&mut self) {
        self.pending_key = None;
        self.pending_value = None;
        self.position = None;
    }
}

impl NativeCursor for MemCursor {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn key_format(&self) -> &str {
        &self.table.key_format
    }

    fn value_format(&self) -> &str {
        &self.table.value_format
    }

    fn next(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Next)?;
        self.step(true)
    }

    fn prev(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Prev)?;
        self.step(false)
    }

    fn search(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Search)?;
        let table = self.table.clone();
        let rows = table.rows.read();
        let found = rows.get_key_value(self.pending_key()?);
        self.land(found)
    }

    fn search_near(&mut self) -> Result<Ordering, ErrorCode> {
        self.check(MemOp::SearchNear)?;
        let table = self.table.clone();
        let rows = table.rows.read();
        let target = self.pending_key()?;

        if let Some(found) = rows.get_key_value(target) {
            self.land(Some(found))?;
            return Ok(Ordering::Equal);
        }
        if let Some(found) =
            rows.range::<[u8], _>((Bound::Excluded(target), Bound::Unbounded)).next()
        {
            self.land(Some(found))?;
            return Ok(Ordering::Greater);
        }
        let found = rows.range::<[u8], _>((Bound::Unbounded, Bound::Excluded(target))).next_back();
        self.land(found)?;
        Ok(Ordering::Less)
    }

    fn get_key(&self) -> Result<&[u8], ErrorCode> {
        self.check(MemOp::GetKey)?;
        self.position.as_ref().map(|pos| pos.key_buf.as_slice()).ok_or(ErrorCode::EINVAL)
    }

    fn get_value(&self) -> Result<&[u8], ErrorCode> {
        self.check(MemOp::GetValue)?;
        self.position.as_ref().map(|pos| pos.value.as_ref()).ok_or(ErrorCode::EINVAL)
    }

    fn set_key(&mut self, key: &[u8]) {
        let key = if self.table.string_keys() {
            key.iter().position(|&b| b == 0).map_or(key, |end| &key[..end])
        } else {
            key
        };
        self.pending_key = Some(key.to_vec());
    }

    fn set_value(&mut self, value: &[u8]) {
        self.pending_value = Some(Bytes::copy_from_slice(value));
    }

    fn insert(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Insert)?;
        let key = self.pending_key()?.to_vec();
        let value = if self.table.key_only() {
            Bytes::new()
        } else {
            self.pending_value.clone().ok_or(ErrorCode::EINVAL)?
        };

        let mut rows = self.table.rows.write();
        if !self.overwrite && rows.contains_key(&key) {
            return Err(ErrorCode::DUPLICATE_KEY);
        }
        rows.insert(key, value);
        drop(rows);
        self.finish_write();
        Ok(())
    }

    fn update(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Update)?;
        let value = self.pending_value.clone().ok_or(ErrorCode::EINVAL)?;
        let key = self.pending_key()?;

        let mut rows = self.table.rows.write();
        let slot = rows.get_mut(key).ok_or(ErrorCode::NOT_FOUND)?;
        *slot = value;
        drop(rows);
        self.finish_write();
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Remove)?;
        let key = self.pending_key()?;

        let removed = self.table.rows.write().remove(key);
        removed.ok_or(ErrorCode::NOT_FOUND)?;
        self.finish_write();
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Reset)?;
        self.finish_write();
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorCode> {
        self.check(MemOp::Close)?;
        self.finish_write();
        if let Some(open) = self.open.take() {
            open.fetch_sub(1, AtomicOrdering::Relaxed);
        }
        Ok(())
    }
}
