//! Binary and galloping search primitives (spec.md §4.2), ported from `BinaryFirst`/
//! `BinaryLast`/`FindFirstForward`/`FindLastForward`/`FindFirstBackward`/`FindLastBackward` in
//! `original_source/WikiSort.c`.

use core::ops::Range;

use crate::util::Less;

/// Smallest `i` in `range` such that `*s.add(i) >= *val` (stable lower-bound for `*val`).
///
/// On an empty range, returns `range.start`.
pub unsafe fn binary_first<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range<usize>,
    less: &mut F,
) -> usize {
    if range.start >= range.end {
        return range.start;
    }

    let mut start = range.start;
    let mut end = range.end - 1;

    while start < end {
        let mid = start + (end - start) / 2;

        if less(&*s.add(mid), &*val) {
            start = mid + 1;
        } else {
            end = mid;
        }
    }

    if start == range.end - 1 && less(&*s.add(start), &*val) {
        start += 1;
    }

    start
}

/// Smallest `i` in `range` such that `*s.add(i) > *val` (stable upper-bound for `*val`).
///
/// On an empty range, returns `range.end`.
pub unsafe fn binary_last<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range<usize>,
    less: &mut F,
) -> usize {
    if range.start >= range.end {
        return range.end;
    }

    let mut start = range.start;
    let mut end = range.end - 1;

    while start < end {
        let mid = start + (end - start) / 2;

        if !less(&*val, &*s.add(mid)) {
            start = mid + 1;
        } else {
            end = mid;
        }
    }

    if start == range.end - 1 && !less(&*val, &*s.add(start)) {
        start += 1;
    }

    start
}

/// Combine a linear (exponential-step) search with a final binary search to locate
/// [`binary_first`]'s answer faster when `unique` estimates how many distinct values lie in
/// `range`.
pub unsafe fn find_first_forward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range<usize>,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.start == range.end {
        return range.start;
    }

    let skip = usize::max((range.end - range.start) / unique, 1);
    let mut index = range.start + skip;

    while less(&*s.add(index - 1), &*val) {
        if index >= range.end - skip {
            return binary_first(s, val, index..range.end, less);
        }

        index += skip;
    }

    binary_first(s, val, index - skip..index, less)
}

/// Galloping variant of [`binary_last`], searching forward from `range.start`.
pub unsafe fn find_last_forward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range<usize>,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.start == range.end {
        return range.start;
    }

    let skip = usize::max((range.end - range.start) / unique, 1);
    let mut index = range.start + skip;

    while !less(&*val, &*s.add(index - 1)) {
        if index >= range.end - skip {
            return binary_last(s, val, index..range.end, less);
        }

        index += skip;
    }

    binary_last(s, val, index - skip..index, less)
}

/// Galloping variant of [`binary_first`], searching backward from `range.end`.
pub unsafe fn find_first_backward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range<usize>,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.start == range.end {
        return range.start;
    }

    let skip = usize::max((range.end - range.start) / unique, 1);
    let mut index = range.end - skip;

    while index > range.start && !less(&*s.add(index - 1), &*val) {
        if index < range.start + skip {
            return binary_first(s, val, range.start..index, less);
        }

        index -= skip;
    }

    binary_first(s, val, index..index + skip, less)
}

/// Galloping variant of [`binary_last`], searching backward from `range.end`.
pub unsafe fn find_last_backward<T, F: Less<T>>(
    s: *const T,
    val: *const T,
    range: Range<usize>,
    less: &mut F,
    unique: usize,
) -> usize {
    if range.start == range.end {
        return range.start;
    }

    let skip = usize::max((range.end - range.start) / unique, 1);
    let mut index = range.end - skip;

    while index > range.start && less(&*val, &*s.add(index - 1)) {
        if index < range.start + skip {
            return binary_last(s, val, range.start..index, less);
        }

        index -= skip;
    }

    binary_last(s, val, index..index + skip, less)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    unsafe fn lt(a: &i32, b: &i32) -> bool {
        a < b
    }

    #[test]
    fn binary_first_matches_partition_point() {
        let v = [1, 1, 2, 2, 2, 5, 5, 9];
        for &target in &[0, 1, 2, 3, 5, 6, 9, 10] {
            let expected = v.partition_point(|&x| x < target);
            let got = unsafe { binary_first(v.as_ptr(), &target, 0..v.len(), &mut lt) };
            assert_eq!(got, expected, "target={target}");
        }
    }

    #[test]
    fn binary_last_matches_partition_point() {
        let v = [1, 1, 2, 2, 2, 5, 5, 9];
        for &target in &[0, 1, 2, 3, 5, 6, 9, 10] {
            let expected = v.partition_point(|&x| x <= target);
            let got = unsafe { binary_last(v.as_ptr(), &target, 0..v.len(), &mut lt) };
            assert_eq!(got, expected, "target={target}");
        }
    }

    #[test]
    fn galloping_matches_binary_counterparts() {
        let v: Vec<i32> = (0..500).map(|x| x / 3).collect();

        for &target in &[0, 10, 166, 499] {
            for unique in [1usize, 5, 50, 200] {
                let a = unsafe { binary_first(v.as_ptr(), &target, 0..v.len(), &mut lt) };
                let b =
                    unsafe { find_first_forward(v.as_ptr(), &target, 0..v.len(), &mut lt, unique) };
                assert_eq!(a, b, "find_first_forward target={target} unique={unique}");

                let a = unsafe { binary_last(v.as_ptr(), &target, 0..v.len(), &mut lt) };
                let b =
                    unsafe { find_last_forward(v.as_ptr(), &target, 0..v.len(), &mut lt, unique) };
                assert_eq!(a, b, "find_last_forward target={target} unique={unique}");

                let a = unsafe { binary_first(v.as_ptr(), &target, 0..v.len(), &mut lt) };
                let b = unsafe {
                    find_first_backward(v.as_ptr(), &target, 0..v.len(), &mut lt, unique)
                };
                assert_eq!(a, b, "find_first_backward target={target} unique={unique}");

                let a = unsafe { binary_last(v.as_ptr(), &target, 0..v.len(), &mut lt) };
                let b =
                    unsafe { find_last_backward(v.as_ptr(), &target, 0..v.len(), &mut lt, unique) };
                assert_eq!(a, b, "find_last_backward target={target} unique={unique}");
            }
        }
    }
}
