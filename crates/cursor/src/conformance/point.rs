//! Point operations and schema handling.

use super::{TestBackend, be, numbered};
use crate::{BoundedCursor, CursorError, Direction, KeyFormat};
use core::cmp::Ordering;
use tigerbind_range::Range;

/// Search, insert, update and remove pass through to the native cursor.
pub fn test_point_operations<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 5);

    assert!(c.search(&be(3)).unwrap());
    assert_eq!(c.key().unwrap(), be(3).as_slice());
    assert_eq!(c.value().unwrap(), &[3]);
    assert!(!c.search(&be(42)).unwrap());

    assert_eq!(c.search_near(&be(3)).unwrap(), Some(Ordering::Equal));
    assert_eq!(c.search_near(&[0, 0, 0, 2, 0]).unwrap(), Some(Ordering::Greater));
    assert_eq!(c.key().unwrap(), be(3).as_slice());
    assert_eq!(c.search_near(&be(42)).unwrap(), Some(Ordering::Less));
    assert_eq!(c.key().unwrap(), be(4).as_slice());

    // raw steps ignore any range
    c.reset().unwrap();
    assert!(c.next().unwrap());
    assert_eq!(c.key().unwrap(), be(0).as_slice());
    assert!(c.prev().is_ok());

    c.insert(&be(7), b"seven").unwrap();
    assert!(c.search(&be(7)).unwrap());
    assert_eq!(c.value().unwrap(), b"seven");

    assert!(c.update(&be(7), b"SEVEN").unwrap());
    assert!(c.search(&be(7)).unwrap());
    assert_eq!(c.entry().unwrap(), (be(7), Some(b"SEVEN".to_vec())));
    assert!(!c.update(&be(8), b"eight").unwrap());

    assert!(c.remove(&be(7)).unwrap());
    assert!(!c.remove(&be(7)).unwrap());
    assert!(!c.search(&be(7)).unwrap());
    assert_eq!(c.total_count(&Range::line()).unwrap(), 5);
}

/// Value operations fail on key-only tables and key-only operations fail
/// on tables with values.
pub fn test_key_only_misuse<B: TestBackend>(backend: &B) {
    let rows: [(&[u8], &[u8]); 1] = [(b"k", b"")];
    let mut keys = BoundedCursor::open(backend.table("key_format=u,value_format=", &rows)).unwrap();
    assert!(keys.schema().is_key_only());
    assert!(keys.search(b"k").unwrap());
    assert!(matches!(keys.value(), Err(CursorError::KeyOnly { op: "value" })));
    assert!(matches!(keys.insert(b"x", b"y"), Err(CursorError::KeyOnly { op: "insert" })));
    assert!(matches!(keys.update(b"k", b"y"), Err(CursorError::KeyOnly { op: "update" })));
    keys.insert_key(b"x").unwrap();
    assert!(keys.remove(b"k").unwrap());
    assert_eq!(keys.total_count(&Range::line()).unwrap(), 1);

    let mut rows = numbered(backend, 1);
    assert!(matches!(rows.insert_key(b"x"), Err(CursorError::ValueRequired { op: "insert_key" })));
    assert!(matches!(
        rows.insert_index(b"x", b"y"),
        Err(CursorError::ValueRequired { op: "insert_index" })
    ));
}

/// String keys compare without their terminator and cannot contain NUL.
pub fn test_string_keys<B: TestBackend>(backend: &B) {
    let rows: [(&[u8], &[u8]); 4] =
        [(b"apple", b"1"), (b"apricot", b"2"), (b"banana", b"3"), (b"ap", b"4")];
    let mut c = BoundedCursor::open(backend.table("key_format=S,value_format=u", &rows)).unwrap();
    assert_eq!(c.schema().key(), KeyFormat::String);

    let keys: Vec<_> = c
        .scan(&Range::prefix(&b"ap"[..]), Direction::Ascending)
        .unwrap()
        .map(|e| e.unwrap().0)
        .collect();
    assert_eq!(keys, vec![b"ap".to_vec(), b"apple".to_vec(), b"apricot".to_vec()]);

    assert!(c.search(b"banana").unwrap());
    assert_eq!(c.key().unwrap(), b"banana");
    assert_eq!(c.value().unwrap(), b"3");

    assert_eq!(c.total_count(&Range::segment(&b"apple"[..], &b"banana"[..])).unwrap(), 3);
    assert_eq!(c.total_count(&Range::interval(&b"ap"[..], &b"banana"[..])).unwrap(), 2);

    c.insert(b"cherry", b"5").unwrap();
    assert!(c.search(b"cherry").unwrap());
    assert!(matches!(c.insert(b"bad\0key", b"6"), Err(CursorError::InteriorNul(_))));
    assert!(matches!(c.search(b"bad\0key"), Err(CursorError::InteriorNul(_))));
}
