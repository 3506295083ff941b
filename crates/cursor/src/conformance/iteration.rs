//! Bounded iteration and counting.

use super::{TestBackend, be, numbered, visit};
use crate::{BoundedCursor, Direction, NativeCursor};
use tigerbind_range::Range;

/// An empty table has nothing in any range, in either direction.
pub fn test_empty_table<B: TestBackend>(backend: &B) {
    let mut c = BoundedCursor::open(backend.table("key_format=u,value_format=u", &[])).unwrap();

    assert!(!c.iteration_begin(&Range::line(), Direction::Ascending).unwrap());
    assert!(!c.iteration_begin(&Range::line(), Direction::Descending).unwrap());
    assert!(!c.iteration_begin(&Range::segment(be(1), be(5)), Direction::Ascending).unwrap());
    assert!(!c.iteration_begin(&Range::segment(be(1), be(5)), Direction::Descending).unwrap());
    assert_eq!(c.total_count(&Range::line()).unwrap(), 0);
    assert_eq!(c.total_count_max(&Range::line(), 10).unwrap(), 0);
}

/// Keys 0..=9: a closed segment counts both ends, an open ray skips its
/// start.
pub fn test_numbered_scenario<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 10);

    assert_eq!(c.total_count(&Range::segment(be(3), be(6))).unwrap(), 4);
    assert_eq!(visit(&mut c, &Range::segment(be(3), be(6)), Direction::Ascending), vec![3, 4, 5, 6]);
    assert_eq!(visit(&mut c, &Range::positive_open_ray(be(7)), Direction::Ascending), vec![8, 9]);
}

/// Every closed segment over the table visits exactly the keys it spans,
/// in order, and its count agrees.
pub fn test_iteration_completeness<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 8);
    for i in 0..8 {
        for j in i..8 {
            let range = Range::segment(be(i), be(j));
            let expected: Vec<u32> = (i..=j).collect();
            assert_eq!(visit(&mut c, &range, Direction::Ascending), expected, "[{i}, {j}]");
            assert_eq!(c.total_count(&range).unwrap(), u64::from(j - i + 1), "[{i}, {j}]");
        }
    }
}

/// Descending visits the reverse of ascending.
pub fn test_direction_symmetry<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 10);
    let ranges = [
        Range::segment(be(2), be(7)),
        Range::interval(be(2), be(7)),
        Range::left_open_segment(be(0), be(9)),
        Range::right_open_segment(be(0), be(9)),
        Range::positive_open_ray(be(4)),
        Range::negative_ray(be(4)),
        Range::line(),
        Range::segment(vec![0, 0, 0, 2, 0], vec![0, 0, 0, 6, 0]),
    ];
    for range in &ranges {
        let mut up = visit(&mut c, range, Direction::Ascending);
        let down = visit(&mut c, range, Direction::Descending);
        up.reverse();
        assert_eq!(up, down, "{range}");
    }
}

/// Open sides exclude their key, closed sides include it, in both
/// directions.
pub fn test_boundary_exactness<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 10);
    for d in [Direction::Ascending, Direction::Descending] {
        let mut check = |range: Range, mut expected: Vec<u32>| {
            if d == Direction::Descending {
                expected.reverse();
            }
            assert_eq!(visit(&mut c, &range, d), expected, "{range} {d:?}");
        };
        check(Range::left_open_segment(be(3), be(6)), vec![4, 5, 6]);
        check(Range::right_open_segment(be(3), be(6)), vec![3, 4, 5]);
        check(Range::interval(be(3), be(6)), vec![4, 5]);
        check(Range::interval(be(3), be(4)), vec![]);
        check(Range::segment(be(5), be(5)), vec![5]);
        check(Range::interval(be(5), be(5)), vec![]);
        check(Range::segment(be(6), be(3)), vec![]);
        // boundaries between stored keys
        check(Range::segment(vec![0, 0, 0, 3, 0], vec![0, 0, 0, 6, 0]), vec![4, 5, 6]);
        check(Range::interval(vec![0, 0, 0, 3, 0], vec![0, 0, 0, 6, 0]), vec![4, 5, 6]);
        // boundaries beyond the table
        check(Range::segment(be(8), be(100)), vec![8, 9]);
        check(Range::negative_open_ray(be(0)), vec![]);
        check(Range::positive_open_ray(be(9)), vec![]);
    }
}

/// The capped count stops at the cap, or returns the exact count below it.
pub fn test_count_cap<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 10);
    let range = Range::positive_ray(be(2));
    assert_eq!(c.total_count(&range).unwrap(), 8);
    assert_eq!(c.total_count_max(&range, 3).unwrap(), 3);
    assert_eq!(c.total_count_max(&range, 8).unwrap(), 8);
    assert_eq!(c.total_count_max(&range, 100).unwrap(), 8);
    assert_eq!(c.total_count_max(&Range::segment(be(4), be(4)), 5).unwrap(), 1);
}

/// Unbounded sides reach the ends of the table.
pub fn test_rays_and_line<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 5);
    assert_eq!(visit(&mut c, &Range::line(), Direction::Ascending), vec![0, 1, 2, 3, 4]);
    assert_eq!(visit(&mut c, &Range::line(), Direction::Descending), vec![4, 3, 2, 1, 0]);
    assert_eq!(visit(&mut c, &Range::positive_ray(be(3)), Direction::Descending), vec![4, 3]);
    assert_eq!(visit(&mut c, &Range::negative_ray(be(1)), Direction::Ascending), vec![0, 1]);
    assert_eq!(visit(&mut c, &Range::negative_open_ray(be(1)), Direction::Descending), vec![0]);
    assert_eq!(c.total_count(&Range::positive_ray(Vec::<u8>::new())).unwrap(), 5);
}

/// Once an iteration returns `false`, further moves return `false` too,
/// whether it ended at the start, at a boundary, or off the table.
pub fn test_finished_iteration_stays_finished<B: TestBackend>(backend: &B) {
    let mut c = numbered(backend, 10);

    // nothing at the start
    assert!(!c.iteration_begin(&Range::positive_open_ray(be(9)), Direction::Ascending).unwrap());
    assert!(!c.iteration_move().unwrap());
    assert!(!c.iteration_move().unwrap());
    assert!(!c.iteration_begin(&Range::negative_open_ray(be(0)), Direction::Descending).unwrap());
    assert!(!c.iteration_move().unwrap());

    // off either end of the table
    for (range, d, first) in [
        (Range::segment(be(7), be(20)), Direction::Ascending, 7),
        (Range::negative_ray(be(2)), Direction::Descending, 2),
    ] {
        assert!(c.iteration_begin(&range, d).unwrap());
        assert_eq!(c.direction(), d);
        assert_eq!(c.key().unwrap(), be(first).as_slice());
        while c.iteration_move().unwrap() {}
        assert!(!c.iteration_move().unwrap(), "{range} {d:?}");
        assert!(!c.iteration_move().unwrap(), "{range} {d:?}");
    }

    // past the far boundary, the cursor stays on the first record outside
    assert!(c.iteration_begin(&Range::segment(be(3), be(4)), Direction::Ascending).unwrap());
    assert!(c.iteration_move().unwrap());
    assert!(!c.iteration_move().unwrap());
    assert!(!c.iteration_move().unwrap());
    assert_eq!(c.key().unwrap(), be(5).as_slice());

    // a new iteration starts afresh, in the other direction too
    let d = c.direction().reverse();
    assert_eq!(d, Direction::Descending);
    assert_eq!(visit(&mut c, &Range::segment(be(3), be(4)), d), vec![4, 3]);
    c.reset().unwrap();
    assert_eq!(visit(&mut c, &Range::segment(be(3), be(4)), d.reverse()), vec![3, 4]);
}

/// Index entries filed under one index key are found by a prefix scan,
/// including when the index key ends in `0xFF`.
pub fn test_index_prefix_scan<B: TestBackend>(backend: &B) {
    let mut c = BoundedCursor::open(backend.table("key_format=u,value_format=", &[])).unwrap();
    let index_keys: [&[u8]; 4] = [&[0x01], &[0x01, 0xFF], &[0x02], &[0x01, 0xFF, 0x00]];
    for (i, index_key) in index_keys.iter().enumerate() {
        for pk in 0..3u8 {
            c.insert_index(index_key, &[0xA0 + i as u8, pk]).unwrap();
        }
    }

    let found = under(&mut c, &[0x01, 0xFF]);
    // [01 ff] itself has three entries, [01 ff 00] three more
    assert_eq!(found.len(), 6);
    assert!(found.iter().all(|k| k.starts_with(&[0x01, 0xFF])));
    assert_eq!(under(&mut c, &[0x01]).len(), 9);
    assert_eq!(under(&mut c, &[0x02]), vec![
        vec![0x02, 0xA2, 0],
        vec![0x02, 0xA2, 1],
        vec![0x02, 0xA2, 2]
    ]);
    assert!(under(&mut c, &[0x03]).is_empty());
}

fn under<C: NativeCursor>(c: &mut BoundedCursor<'_, C>, prefix: &[u8]) -> Vec<Vec<u8>> {
    c.scan(&Range::prefix(prefix.to_vec()), Direction::Ascending)
        .unwrap()
        .map(|entry| {
            let (key, value) = entry.unwrap();
            assert_eq!(value, None);
            key
        })
        .collect()
}
