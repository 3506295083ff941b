//! Range endpoints and the orders used to combine them.

use crate::keys::{HexDisplay, compare_bytes};
use bytes::{BufMut, Bytes, BytesMut};
use core::{cmp::Ordering, fmt};

/// One endpoint of a [`Range`](crate::Range).
///
/// An absent endpoint (unbounded side) is modelled as `None` at the
/// [`Range`](crate::Range) level, never as an empty byte string. A present
/// boundary with `inclusive == false` excludes exactly the key equal to its
/// bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Boundary {
    bytes: Bytes,
    inclusive: bool,
}

impl Boundary {
    /// Create a boundary at `bytes`.
    pub fn new(bytes: impl Into<Bytes>, inclusive: bool) -> Self {
        Self { bytes: bytes.into(), inclusive }
    }

    /// Create a closed boundary that admits `bytes` itself.
    pub fn inclusive(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, true)
    }

    /// Create an open boundary that excludes `bytes` itself.
    pub fn exclusive(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, false)
    }

    /// The boundary key.
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The boundary key as a slice.
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Whether the boundary key itself is part of the range.
    pub const fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// Widen to a closed boundary at the same position.
    pub fn into_inclusive(self) -> Self {
        Self { inclusive: true, ..self }
    }

    /// Scope the boundary under `prefix` by concatenating `prefix ++ bytes`.
    ///
    /// Inclusivity is preserved.
    pub fn prepend(&self, prefix: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(prefix.len() + self.bytes.len());
        buf.put_slice(prefix);
        buf.put_slice(&self.bytes);
        Self { bytes: buf.freeze(), inclusive: self.inclusive }
    }

    /// True if `key` lies on the admitted side of this boundary used as a
    /// lower bound.
    pub fn admits_as_lower(&self, key: &[u8]) -> bool {
        match compare_bytes(key, &self.bytes) {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive,
            Ordering::Less => false,
        }
    }

    /// True if `key` lies on the admitted side of this boundary used as an
    /// upper bound.
    pub fn admits_as_upper(&self, key: &[u8]) -> bool {
        match compare_bytes(key, &self.bytes) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => false,
        }
    }
}

impl fmt::Debug for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boundary")
            .field("bytes", &format_args!("{}", HexDisplay(&self.bytes)))
            .field("inclusive", &self.inclusive)
            .finish()
    }
}

/// Order two lower bounds by position in the keyspace.
///
/// `Less` means `a` admits more keys than `b`. An absent lower bound sorts
/// before every present one, and at equal bytes an inclusive bound sorts
/// before an exclusive one.
pub fn compare_left(a: Option<&Boundary>, b: Option<&Boundary>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_bytes(&a.bytes, &b.bytes)
            // inclusive (true) sorts first
            .then_with(|| b.inclusive.cmp(&a.inclusive)),
    }
}

/// Order two upper bounds by position in the keyspace.
///
/// `Greater` means `a` admits more keys than `b`. An absent upper bound
/// sorts after every present one, and at equal bytes an inclusive bound
/// sorts after an exclusive one.
pub fn compare_right(a: Option<&Boundary>, b: Option<&Boundary>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            compare_bytes(&a.bytes, &b.bytes).then_with(|| a.inclusive.cmp(&b.inclusive))
        }
    }
}

/// The more restrictive of two lower bounds. Ties return `a`.
pub fn max_left<'a>(a: Option<&'a Boundary>, b: Option<&'a Boundary>) -> Option<&'a Boundary> {
    if compare_left(a, b) == Ordering::Less { b } else { a }
}

/// The more restrictive of two upper bounds. Ties return `a`.
pub fn min_right<'a>(a: Option<&'a Boundary>, b: Option<&'a Boundary>) -> Option<&'a Boundary> {
    if compare_right(a, b) == Ordering::Greater { b } else { a }
}
