//! Byte-string key utilities.
//!
//! Keys are compared the way the storage engine orders raw byte keys:
//! lexicographically by unsigned byte value, with a strict prefix sorting
//! before any longer key that extends it.

use core::cmp::Ordering;

/// Compare two byte strings in engine key order.
///
/// The empty sequence is the minimum of the order.
#[inline]
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    let common = a.len().min(b.len());
    match a[..common].cmp(&b[..common]) {
        Ordering::Equal => a.len().cmp(&b.len()),
        other => other,
    }
}

/// Treat `source` as a fixed-width big-endian unsigned integer and add one.
///
/// Returns `None` on overflow, i.e. when every byte is `0xFF`. The empty
/// sequence has no successor of the same width and also returns `None`.
pub fn increment_bytes(source: &[u8]) -> Option<Vec<u8>> {
    let pos = source.iter().rposition(|&b| b != u8::MAX)?;
    let mut out = source.to_vec();
    out[pos] += 1;
    out[pos + 1..].fill(0);
    Some(out)
}

/// Treat `source` as a fixed-width big-endian unsigned integer and subtract
/// one.
///
/// Returns `None` on underflow, i.e. when every byte is zero.
pub fn decrement_bytes(source: &[u8]) -> Option<Vec<u8>> {
    let pos = source.iter().rposition(|&b| b != 0)?;
    let mut out = source.to_vec();
    out[pos] -= 1;
    out[pos + 1..].fill(u8::MAX);
    Some(out)
}

/// The smallest key greater than every key starting with `prefix`.
///
/// Increments the last non-`0xFF` byte and drops the bytes after it.
/// Returns `None` when no such key exists (the prefix is empty or all
/// `0xFF`).
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let pos = prefix.iter().rposition(|&b| b != u8::MAX)?;
    let mut out = prefix[..=pos].to_vec();
    out[pos] += 1;
    Some(out)
}

/// Lowercase hex rendering of key bytes.
#[derive(Debug, Clone, Copy)]
pub struct HexDisplay<'a>(pub &'a [u8]);

impl core::fmt::Display for HexDisplay<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn compare_prefix_sorts_first() {
        assert_eq!(compare_bytes(&[1, 2], &[1, 2, 0]), Ordering::Less);
        assert_eq!(compare_bytes(&[1, 2, 0], &[1, 2]), Ordering::Greater);
        assert_eq!(compare_bytes(&[1, 3], &[1, 2, 0xFF]), Ordering::Greater);
    }

    #[test]
    fn compare_is_unsigned() {
        assert_eq!(compare_bytes(&[0x7F], &[0x80]), Ordering::Less);
        assert_eq!(compare_bytes(&[0xFF], &[0x00, 0x00]), Ordering::Greater);
    }

    #[test]
    fn empty_is_minimal() {
        assert_eq!(compare_bytes(&[], &[]), Ordering::Equal);
        assert_eq!(compare_bytes(&[], &[0]), Ordering::Less);
        assert_eq!(compare_bytes(&[0], &[]), Ordering::Greater);
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(HexDisplay(&[0x0a, 0xff, 0]).to_string(), "0aff00");
        assert_eq!(HexDisplay(&[]).to_string(), "");
    }

    #[test]
    fn increment_carries() {
        assert_eq!(increment_bytes(&[1]), Some(vec![2]));
        assert_eq!(increment_bytes(&[1, 0xFF]), Some(vec![2, 0]));
        assert_eq!(increment_bytes(&[0, 0xFF, 0xFF]), Some(vec![1, 0, 0]));
        assert_eq!(increment_bytes(&[0xFF, 0xFF]), None);
        assert_eq!(increment_bytes(&[]), None);
    }

    #[test]
    fn decrement_borrows() {
        assert_eq!(decrement_bytes(&[2]), Some(vec![1]));
        assert_eq!(decrement_bytes(&[2, 0]), Some(vec![1, 0xFF]));
        assert_eq!(decrement_bytes(&[1, 0, 0]), Some(vec![0, 0xFF, 0xFF]));
        assert_eq!(decrement_bytes(&[0, 0]), None);
        assert_eq!(decrement_bytes(&[]), None);
    }

    #[test]
    fn prefix_successor_truncates() {
        assert_eq!(prefix_successor(&[1]), Some(vec![2]));
        assert_eq!(prefix_successor(&[1, 0xFF]), Some(vec![2]));
        assert_eq!(prefix_successor(&[1, 2, 0xFF, 0xFF]), Some(vec![1, 3]));
        assert_eq!(prefix_successor(&[0xFF]), None);
        assert_eq!(prefix_successor(&[]), None);
    }

    proptest! {
        #[test]
        fn compare_matches_slice_order(a in prop::collection::vec(any::<u8>(), 0..8),
                                       b in prop::collection::vec(any::<u8>(), 0..8)) {
            prop_assert_eq!(compare_bytes(&a, &b), a.as_slice().cmp(b.as_slice()));
            prop_assert_eq!(compare_bytes(&a, &b), compare_bytes(&b, &a).reverse());
        }

        #[test]
        fn compare_is_transitive(a in prop::collection::vec(any::<u8>(), 0..4),
                                 b in prop::collection::vec(any::<u8>(), 0..4),
                                 c in prop::collection::vec(any::<u8>(), 0..4)) {
            if compare_bytes(&a, &b) != Ordering::Greater
                && compare_bytes(&b, &c) != Ordering::Greater
            {
                prop_assert_ne!(compare_bytes(&a, &c), Ordering::Greater);
            }
        }

        #[test]
        fn decrement_inverts_increment(s in prop::collection::vec(any::<u8>(), 1..8)) {
            match increment_bytes(&s) {
                Some(next) => {
                    prop_assert_eq!(next.len(), s.len());
                    prop_assert_eq!(compare_bytes(&s, &next), Ordering::Less);
                    prop_assert_eq!(decrement_bytes(&next), Some(s));
                }
                None => prop_assert!(s.iter().all(|&b| b == u8::MAX)),
            }
        }

        #[test]
        fn increment_inverts_decrement(s in prop::collection::vec(any::<u8>(), 1..8)) {
            match decrement_bytes(&s) {
                Some(prev) => prop_assert_eq!(increment_bytes(&prev), Some(s)),
                None => prop_assert!(s.iter().all(|&b| b == 0)),
            }
        }
    }

    #[test]
    fn overflow_at_every_width() {
        for n in 1..6 {
            assert_eq!(increment_bytes(&vec![u8::MAX; n]), None);
            assert_eq!(decrement_bytes(&vec![0; n]), None);
        }
    }
}
