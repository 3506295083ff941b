//! Ranges over the ordered byte-string keyspace.

use crate::{
    boundary::{Boundary, max_left, min_right},
    keys::{HexDisplay, compare_bytes, prefix_successor},
};
use bytes::Bytes;
use core::{
    cmp::Ordering,
    fmt,
    ops::{Bound, RangeBounds},
};

/// A contiguous set of keys between two optional [`Boundary`] values.
///
/// `left == None` is unbounded below and `right == None` is unbounded
/// above. A range with both sides present may be empty, see
/// [`Range::is_empty`].
///
/// Ranges are cheap to clone: boundary bytes are reference counted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Range {
    left: Option<Boundary>,
    right: Option<Boundary>,
}

impl Range {
    /// Create a range from its two sides.
    pub const fn new(left: Option<Boundary>, right: Option<Boundary>) -> Self {
        Self { left, right }
    }

    /// `[left, right]`
    pub fn segment(left: impl Into<Bytes>, right: impl Into<Bytes>) -> Self {
        Self::new(Some(Boundary::inclusive(left)), Some(Boundary::inclusive(right)))
    }

    /// `(left, right)`
    pub fn interval(left: impl Into<Bytes>, right: impl Into<Bytes>) -> Self {
        Self::new(Some(Boundary::exclusive(left)), Some(Boundary::exclusive(right)))
    }

    /// `(left, right]`
    pub fn left_open_segment(left: impl Into<Bytes>, right: impl Into<Bytes>) -> Self {
        Self::new(Some(Boundary::exclusive(left)), Some(Boundary::inclusive(right)))
    }

    /// `[left, right)`
    pub fn right_open_segment(left: impl Into<Bytes>, right: impl Into<Bytes>) -> Self {
        Self::new(Some(Boundary::inclusive(left)), Some(Boundary::exclusive(right)))
    }

    /// `[left, +inf)`
    pub fn positive_ray(left: impl Into<Bytes>) -> Self {
        Self::new(Some(Boundary::inclusive(left)), None)
    }

    /// `(left, +inf)`
    pub fn positive_open_ray(left: impl Into<Bytes>) -> Self {
        Self::new(Some(Boundary::exclusive(left)), None)
    }

    /// `(-inf, right]`
    pub fn negative_ray(right: impl Into<Bytes>) -> Self {
        Self::new(None, Some(Boundary::inclusive(right)))
    }

    /// `(-inf, right)`
    pub fn negative_open_ray(right: impl Into<Bytes>) -> Self {
        Self::new(None, Some(Boundary::exclusive(right)))
    }

    /// The whole keyspace.
    pub const fn line() -> Self {
        Self::new(None, None)
    }

    /// The canonical empty range, `(ε, ε)`.
    pub fn empty() -> Self {
        Self::interval(Bytes::new(), Bytes::new())
    }

    /// All keys that start with `prefix`.
    ///
    /// The right side is the smallest key greater than every key with the
    /// prefix, or unbounded when the prefix is empty or consists only of
    /// `0xFF` bytes.
    pub fn prefix(prefix: impl Into<Bytes>) -> Self {
        let prefix = prefix.into();
        let right = prefix_successor(&prefix).map(Boundary::exclusive);
        Self::new(Some(Boundary::inclusive(prefix)), right)
    }

    /// Build a range from standard range syntax, e.g. `a..=b` or `..b`.
    pub fn from_bounds<K, R>(bounds: R) -> Self
    where
        K: AsRef<[u8]>,
        R: RangeBounds<K>,
    {
        fn side<K: AsRef<[u8]>>(bound: Bound<&K>) -> Option<Boundary> {
            match bound {
                Bound::Included(k) => Some(Boundary::inclusive(Bytes::copy_from_slice(k.as_ref()))),
                Bound::Excluded(k) => Some(Boundary::exclusive(Bytes::copy_from_slice(k.as_ref()))),
                Bound::Unbounded => None,
            }
        }
        Self::new(side(bounds.start_bound()), side(bounds.end_bound()))
    }

    /// The lower side, `None` when unbounded below.
    pub const fn left(&self) -> Option<&Boundary> {
        self.left.as_ref()
    }

    /// The upper side, `None` when unbounded above.
    pub const fn right(&self) -> Option<&Boundary> {
        self.right.as_ref()
    }

    /// True when no key can be in the range.
    ///
    /// A range with either side unbounded is never empty.
    pub fn is_empty(&self) -> bool {
        let (Some(left), Some(right)) = (&self.left, &self.right) else {
            return false;
        };
        match compare_bytes(left.as_slice(), right.as_slice()) {
            Ordering::Greater => true,
            Ordering::Equal => !(left.is_inclusive() && right.is_inclusive()),
            Ordering::Less => false,
        }
    }

    /// True when `key` is in the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.left.as_ref().is_none_or(|b| b.admits_as_lower(key))
            && self.right.as_ref().is_none_or(|b| b.admits_as_upper(key))
    }

    /// The intersection of two ranges.
    ///
    /// The result may be empty; check [`Range::is_empty`].
    pub fn intersect_with(&self, other: &Self) -> Self {
        Self::new(
            max_left(self.left(), other.left()).cloned(),
            min_right(self.right(), other.right()).cloned(),
        )
    }

    /// Widen both sides to closed boundaries at the same positions.
    pub fn inclusive(self) -> Self {
        Self::new(self.left.map(Boundary::into_inclusive), self.right.map(Boundary::into_inclusive))
    }

    /// Scope both present sides under `prefix`.
    ///
    /// Unbounded sides stay unbounded.
    pub fn prepend(&self, prefix: &[u8]) -> Self {
        Self::new(
            self.left.as_ref().map(|b| b.prepend(prefix)),
            self.right.as_ref().map(|b| b.prepend(prefix)),
        )
    }
}

impl RangeBounds<[u8]> for Range {
    fn start_bound(&self) -> Bound<&[u8]> {
        match &self.left {
            Some(b) if b.is_inclusive() => Bound::Included(b.as_slice()),
            Some(b) => Bound::Excluded(b.as_slice()),
            None => Bound::Unbounded,
        }
    }

    fn end_bound(&self) -> Bound<&[u8]> {
        match &self.right {
            Some(b) if b.is_inclusive() => Bound::Included(b.as_slice()),
            Some(b) => Bound::Excluded(b.as_slice()),
            None => Bound::Unbounded,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.left {
            Some(b) => {
                f.write_str(if b.is_inclusive() { "[" } else { "(" })?;
                write!(f, "{}", HexDisplay(b.as_slice()))?;
            }
            None => f.write_str("(-inf")?,
        }
        f.write_str(", ")?;
        match &self.right {
            Some(b) => {
                write!(f, "{}", HexDisplay(b.as_slice()))?;
                f.write_str(if b.is_inclusive() { "]" } else { ")" })
            }
            None => f.write_str("+inf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn b(v: u8) -> Vec<u8> {
        vec![v]
    }

    #[test]
    fn prefix_of_empty_is_unbounded_above() {
        let range = Range::prefix(Vec::<u8>::new());
        assert!(range.right().is_none());
        assert!(range.contains(&[]));
        assert!(range.contains(&[0xFF, 0xFF]));
    }

    #[test]
    fn prefix_simple() {
        let range = Range::prefix(b(1));
        assert_eq!(range.left().unwrap().as_slice(), &[1]);
        assert!(range.left().unwrap().is_inclusive());
        assert_eq!(range.right().unwrap().as_slice(), &[2]);
        assert!(!range.right().unwrap().is_inclusive());
    }

    #[test]
    fn prefix_carries_past_max_byte() {
        let range = Range::prefix(vec![1, u8::MAX]);
        assert_eq!(range.right().unwrap().as_slice(), &[2]);
        assert!(range.contains(&[1, 0xFF]));
        assert!(range.contains(&[1, 0xFF, 0]));
        assert!(!range.contains(&[2]));
        assert!(!range.contains(&[1, 0xFE, 0xFF]));
    }

    #[test]
    fn prefix_of_all_max_is_unbounded() {
        let range = Range::prefix(vec![u8::MAX, u8::MAX]);
        assert_eq!(range.left().unwrap().as_slice(), &[0xFF, 0xFF]);
        assert!(range.right().is_none());
    }

    #[test]
    fn prepend_bounded() {
        let range = Range::segment(b(1), b(2)).prepend(&[100]);
        assert_eq!(range.left().unwrap().as_slice(), &[100, 1]);
        assert_eq!(range.right().unwrap().as_slice(), &[100, 2]);
    }

    #[test]
    fn prepend_keeps_open_sides() {
        let range = Range::left_open_segment(b(1), b(2)).prepend(&[100]);
        assert!(!range.left().unwrap().is_inclusive());
        assert!(range.right().unwrap().is_inclusive());
    }

    #[test]
    fn prepend_unbounded() {
        let range = Range::negative_ray(b(1)).prepend(&[100]);
        assert!(range.left().is_none());
        assert_eq!(range.right().unwrap().as_slice(), &[100, 1]);
    }

    #[test]
    fn intersect_touching_segments() {
        let range = Range::segment(b(1), b(2)).intersect_with(&Range::segment(b(2), b(3)));
        assert_eq!(range, Range::segment(b(2), b(2)));
        assert!(!range.is_empty());
    }

    #[test]
    fn intersect_open_side_wins() {
        let a = Range::left_open_segment(b(1), b(2));
        let range = a.intersect_with(&Range::segment(b(1), b(3)));
        assert_eq!(range, Range::left_open_segment(b(1), b(2)));
    }

    #[test]
    fn intersect_nested_shares_inner_bytes() {
        let inner = Range::segment(b(3), b(4));
        let outer = Range::segment(b(1), b(5));
        for result in [inner.intersect_with(&outer), outer.intersect_with(&inner)] {
            assert_eq!(result, inner);
            assert_eq!(
                result.left().unwrap().bytes().as_ptr(),
                inner.left().unwrap().bytes().as_ptr()
            );
            assert_eq!(
                result.right().unwrap().bytes().as_ptr(),
                inner.right().unwrap().bytes().as_ptr()
            );
        }
    }

    #[test]
    fn intersect_bounded_side_beats_unbounded() {
        let range = Range::positive_open_ray(b(1)).intersect_with(&Range::negative_ray(b(2)));
        assert_eq!(range, Range::left_open_segment(b(1), b(2)));
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let range = Range::segment(b(1), b(2)).intersect_with(&Range::segment(b(3), b(4)));
        assert!(range.is_empty());
    }

    #[test]
    fn emptiness() {
        assert!(!Range::segment(b(1), b(2)).is_empty());
        assert!(Range::segment(b(2), b(1)).is_empty());
        assert!(!Range::positive_ray(b(1)).is_empty());
        assert!(!Range::line().is_empty());
        assert!(!Range::negative_ray(b(2)).is_empty());
        assert!(!Range::segment(b(1), b(1)).is_empty());
        assert!(Range::interval(b(1), b(1)).is_empty());
        assert!(Range::left_open_segment(b(1), b(1)).is_empty());
        assert!(Range::right_open_segment(b(1), b(1)).is_empty());
        assert!(Range::empty().is_empty());
    }

    #[test]
    fn inclusive_widens_both_sides() {
        let range = Range::interval(b(1), b(1)).inclusive();
        assert_eq!(range, Range::segment(b(1), b(1)));
        assert!(!range.is_empty());
        assert_eq!(Range::line().inclusive(), Range::line());
    }

    #[test]
    fn from_bounds_matches_constructors() {
        let (one, two) = (b(1), b(2));
        assert_eq!(Range::from_bounds(one.clone()..=two.clone()), Range::segment(b(1), b(2)));
        assert_eq!(
            Range::from_bounds(one.clone()..two.clone()),
            Range::right_open_segment(b(1), b(2))
        );
        assert_eq!(Range::from_bounds(one..), Range::positive_ray(b(1)));
        assert_eq!(Range::from_bounds(..two), Range::negative_open_ray(b(2)));
        assert_eq!(Range::from_bounds::<Vec<u8>, _>(..), Range::line());
    }

    #[test]
    fn range_bounds_roundtrip() {
        let range = Range::left_open_segment(b(1), b(2));
        assert_eq!(range.start_bound(), Bound::Excluded(&[1u8][..]));
        assert_eq!(range.end_bound(), Bound::Included(&[2u8][..]));
        assert_eq!(Range::line().start_bound(), Bound::Unbounded);
    }

    #[test]
    fn display() {
        assert_eq!(Range::right_open_segment(b(1), vec![0xAB, 0]).to_string(), "[01, ab00)");
        assert_eq!(Range::line().to_string(), "(-inf, +inf)");
        assert_eq!(Range::positive_open_ray(b(0x10)).to_string(), "(10, +inf)");
    }

    #[test]
    fn singleton_membership() {
        assert!(Range::segment(b(4), b(4)).contains(&[4]));
        assert!(!Range::interval(b(4), b(4)).contains(&[4]));
        assert!(!Range::empty().contains(&[]));
    }

    fn arb_key() -> impl Strategy<Value = Vec<u8>> {
        let byte = prop_oneof![Just(0u8), Just(1u8), Just(0xFEu8), Just(0xFFu8), any::<u8>()];
        prop::collection::vec(byte, 0..5)
    }

    fn arb_side() -> impl Strategy<Value = Option<Boundary>> {
        prop::option::of((arb_key(), any::<bool>()).prop_map(|(k, i)| Boundary::new(k, i)))
    }

    fn arb_range() -> impl Strategy<Value = Range> {
        (arb_side(), arb_side()).prop_map(|(l, r)| Range::new(l, r))
    }

    proptest! {
        #[test]
        fn prefix_membership_is_starts_with(prefix in arb_key(), key in arb_key()) {
            prop_assert_eq!(Range::prefix(prefix.clone()).contains(&key), key.starts_with(&prefix));
        }

        #[test]
        fn prefix_membership_at_neighbour_lengths(prefix in arb_key(), extra in any::<u8>()) {
            let range = Range::prefix(prefix.clone());
            prop_assert!(range.contains(&prefix));
            let mut longer = prefix.clone();
            longer.push(extra);
            prop_assert!(range.contains(&longer));
            if let Some((_, shorter)) = prefix.split_last() {
                prop_assert!(!range.contains(shorter));
            }
        }

        #[test]
        fn intersection_is_conjunction(a in arb_range(), b in arb_range(), key in arb_key()) {
            let both = a.intersect_with(&b);
            prop_assert_eq!(both.contains(&key), a.contains(&key) && b.contains(&key));
        }

        #[test]
        fn empty_ranges_contain_nothing(range in arb_range(), key in arb_key()) {
            if range.is_empty() {
                prop_assert!(!range.contains(&key));
            }
        }

        #[test]
        fn prepend_scopes_membership(range in arb_range(), prefix in arb_key(), key in arb_key()) {
            let scoped = range.prepend(&prefix);
            let mut full = prefix.clone();
            full.extend_from_slice(&key);
            if range.left().is_some() && range.right().is_some() {
                prop_assert_eq!(scoped.contains(&full), range.contains(&key));
            }
        }
    }
}
