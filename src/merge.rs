//! The four merge variants of spec.md §4.3, ported from `MergeInto`/`MergeExternal`/
//! `MergeInternal`/`MergeInPlace` in `original_source/WikiSort.c`.
//!
//! Every variant merges two adjacent sorted runs `a` (ending where `b` begins) into one stable
//! run. Stability convention: when `a`'s and `b`'s heads compare equal, `a`'s head is taken first
//! -- every comparison below is written so that ties resolve to `a`.

use core::ops::Range;
use core::ptr;

use crate::cache::Cache;
use crate::search::{binary_first, binary_last};
use crate::util::{block_swap, rotate, Less};

/// `true` iff `a` and `b` are already in sorted order and the merge would be a no-op.
#[inline]
pub unsafe fn already_ordered<T, F: Less<T>>(arr: *const T, a: &Range<usize>, b: &Range<usize>, less: &mut F) -> bool {
    !less(&*arr.add(b.start), &*arr.add(a.end - 1))
}

/// `true` iff every element of `b` sorts strictly before every element of `a` -- the merge
/// degenerates to a rotation.
#[inline]
pub unsafe fn reverse_ordered<T, F: Less<T>>(arr: *const T, a: &Range<usize>, b: &Range<usize>, less: &mut F) -> bool {
    less(&*arr.add(b.end - 1), &*arr.add(a.start))
}

/// Merge the disjoint sorted runs `a` and `b` of `from` into `dst`, which has capacity
/// `|a| + |b|` and does not overlap either.
pub unsafe fn merge_into<T, F: Less<T>>(
    from: *const T,
    a: Range<usize>,
    b: Range<usize>,
    dst: *mut T,
    less: &mut F,
) {
    let mut a_ptr = from.add(a.start);
    let mut b_ptr = from.add(b.start);
    let a_last = from.add(a.end);
    let b_last = from.add(b.end);
    let mut out = dst;

    loop {
        if !less(&*b_ptr, &*a_ptr) {
            out.write(a_ptr.read());
            a_ptr = a_ptr.add(1);
            out = out.add(1);

            if a_ptr == a_last {
                ptr::copy_nonoverlapping(b_ptr, out, crate::util::ptr_sub(b_last, b_ptr));
                return;
            }
        } else {
            out.write(b_ptr.read());
            b_ptr = b_ptr.add(1);
            out = out.add(1);

            if b_ptr == b_last {
                ptr::copy_nonoverlapping(a_ptr, out, crate::util::ptr_sub(a_last, a_ptr));
                return;
            }
        }
    }
}

/// Merge `a` (which must satisfy `|a| <= cache.capacity()`) and `b` (which must immediately
/// follow `a` in `arr`) back over `a ∪ b`, using `cache` as `a`'s external copy.
///
/// Unlike [`merge_into`], this does **not** copy `a` into `cache` itself: the caller must have
/// already placed a copy of `arr[a]` at `cache[0..|a|)` before calling. This mirrors
/// `MergeExternal` in `original_source/WikiSort.c`, which always merges from a cache its caller
/// populated -- sometimes several steps earlier, as `blocks::merge_blocks` does when it stages
/// the *next* block to merge into the cache before clobbering `arr[a]`'s current contents with
/// the roll's block-swap bookkeeping. A self-copying `merge_external` would silently merge stale
/// data in that case.
pub unsafe fn merge_external<T, F: Less<T>>(
    arr: *mut T,
    a: Range<usize>,
    b: Range<usize>,
    cache: &Cache<T>,
    less: &mut F,
) {
    let a_len = a.end - a.start;
    let b_len = b.end - b.start;

    let mut a_ptr = cache.as_mut_ptr() as *const T;
    let mut b_ptr = arr.add(b.start) as *const T;
    let a_last = cache.as_mut_ptr().add(a_len) as *const T;
    let b_last = arr.add(b.end) as *const T;
    let mut out = arr.add(a.start);

    if a_len > 0 && b_len > 0 {
        loop {
            if !less(&*b_ptr, &*a_ptr) {
                out.write(a_ptr.read());
                a_ptr = a_ptr.add(1);
                out = out.add(1);

                if a_ptr == a_last {
                    break;
                }
            } else {
                out.write(b_ptr.read());
                b_ptr = b_ptr.add(1);
                out = out.add(1);

                if b_ptr == b_last {
                    break;
                }
            }
        }
    }

    ptr::copy_nonoverlapping(a_ptr, out, crate::util::ptr_sub(a_last, a_ptr));
}

/// Merge `a` and `b` (`b` immediately following `a` in `arr`) given that `a`'s sorted content has
/// already been swapped into `buf` (so `arr[a]` currently holds whatever was previously in
/// `buf`, of no further interest here). `buf` ends up holding that displaced content again, now
/// in arbitrary order, ready to be sorted and redistributed by the caller.
pub unsafe fn merge_internal<T, F: Less<T>>(
    arr: *mut T,
    a: Range<usize>,
    b: Range<usize>,
    buf: Range<usize>,
    less: &mut F,
) {
    let a_len = a.end - a.start;
    let b_len = b.end - b.start;

    let a_dst = arr.add(a.start);
    let b_src = arr.add(b.start);
    let buf_src = arr.add(buf.start);

    let mut a_count = 0;
    let mut b_count = 0;
    let mut insert = 0;

    if a_len > 0 && b_len > 0 {
        loop {
            if !less(&*b_src.add(b_count), &*buf_src.add(a_count)) {
                ptr::swap(a_dst.add(insert), buf_src.add(a_count));
                a_count += 1;
                insert += 1;

                if a_count >= a_len {
                    break;
                }
            } else {
                ptr::swap(a_dst.add(insert), b_src.add(b_count));
                b_count += 1;
                insert += 1;

                if b_count >= b_len {
                    break;
                }
            }
        }
    }

    block_swap(buf_src.add(a_count), a_dst.add(insert), a_len - a_count);
}

/// Merge `a` and `b` with no buffer at all: repeatedly binary-search `a`'s head into `b` and
/// rotate `a` past the matching prefix.
pub unsafe fn merge_in_place<T, F: Less<T>>(
    arr: *mut T,
    mut a: Range<usize>,
    mut b: Range<usize>,
    cache: &Cache<T>,
    less: &mut F,
) {
    if a.is_empty() || b.is_empty() {
        return;
    }

    loop {
        let mid = binary_first(arr as *const T, arr.add(a.start), b.clone(), less);
        let amount = mid - a.end;

        rotate(arr.add(a.start), a.end - a.start, amount, cache);

        if b.end == mid {
            return;
        }

        b.start = mid;
        a = a.start + amount..b.start;
        a.start = binary_last(arr as *const T, arr.add(a.start), a.clone(), less);

        if a.is_empty() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    unsafe fn lt(a: &i32, b: &i32) -> bool {
        a < b
    }

    fn check_merge_into(a: Vec<i32>, b: Vec<i32>) {
        let mut from = a.clone();
        from.extend_from_slice(&b);

        let mut dst = vec![0; from.len()];

        unsafe {
            merge_into(from.as_ptr(), 0..a.len(), a.len()..from.len(), dst.as_mut_ptr(), &mut lt);
        }

        let mut expected = from.clone();
        expected.sort();
        assert_eq!(dst, expected);
    }

    #[test]
    fn merge_into_interleaved() {
        check_merge_into(vec![1, 3, 5, 7], vec![2, 4, 6, 8]);
        check_merge_into(vec![], vec![1, 2, 3]);
        check_merge_into(vec![1, 2, 3], vec![]);
        check_merge_into(vec![5], vec![1, 2, 3, 4]);
    }

    #[test]
    fn merge_external_matches_sort() {
        let mut v = vec![1, 3, 5, 7, 2, 4, 6, 8];
        let a = 0..4;
        let b = 4..8;
        let cache: Cache<i32> = Cache::with_capacity_for_test(4);

        unsafe {
            ptr::copy_nonoverlapping(v.as_ptr().add(a.start), cache.as_mut_ptr(), a.end - a.start);
            merge_external(v.as_mut_ptr(), a, b, &cache, &mut lt);
        }

        assert_eq!(v, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn merge_in_place_matches_sort() {
        let mut v = vec![1, 3, 5, 7, 2, 4, 6, 8];
        let cache: Cache<i32> = Cache::empty();

        unsafe {
            merge_in_place(v.as_mut_ptr(), 0..4, 4..8, &cache, &mut lt);
        }

        assert_eq!(v, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn merge_internal_preserves_multiset() {
        // arr: [A(2,4,6) junk(9,9,9) B(1,3,5,7)] with buf holding A's real sorted content
        let mut v = vec![0, 0, 0, 0, 0, 0, 1, 3, 5, 7];
        let buf = vec![2, 4, 6];

        // place buf's content at the tail (acting as the internal buffer) and leave `a` as
        // "junk" (simulating the pre-swap the caller performs before calling merge_internal)
        v[6 - 3..6].copy_from_slice(&buf);
        let a = 0..3;
        let b = 6..10;
        let buf_range = 3..6;

        unsafe {
            merge_internal(v.as_mut_ptr(), a, b, buf_range, &mut lt);
        }

        assert_eq!(&v[0..7], &[1, 2, 3, 4, 5, 6, 7]);
    }
}
