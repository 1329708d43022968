//! The top-level driver (spec.md §4.5): base pass, then repeated merge levels -- each either a
//! cache-backed merge (plain, or the four-way fast path when the cache is large relative to the
//! level) or the fully in-place block merge -- until one level spans the whole array. Ported from
//! `new_WikiSort` in `original_source/WikiSort.c`.

use core::ops::Range;
use core::ptr;

use crate::blocks::merge_blocks;
use crate::cache::{isqrt, Cache};
use crate::iterator::WikiIterator;
use crate::merge::{merge_external, merge_into};
use crate::network::{insertion_sort, sort_small};
use crate::pull;
use crate::util::{rotate, Less};

/// Minimum run length the base pass sorts directly with [`sort_small`]/a network, matching
/// `WikiIterator_new`'s `min_level` argument in the original source.
const MIN_LEVEL: usize = 4;

fn len(r: &Range<usize>) -> usize {
    r.end - r.start
}

/// Sort `arr[0..n]` in place.
pub unsafe fn sort_core<T, F: Less<T>>(arr: *mut T, n: usize, less: &mut F) {
    sort_with_cache(arr, n, less, Cache::for_len(n));
}

/// As [`sort_core`], but with the external cache supplied by the caller instead of sized via
/// [`Cache::for_len`]. Exists so tests can exercise every merge path (cache, four-way, in-place)
/// at a fixed `C`, to check spec.md §8 invariant 6 (identical output regardless of cache size).
#[cfg(test)]
pub(crate) unsafe fn sort_core_with_cache<T, F: Less<T>>(arr: *mut T, n: usize, less: &mut F, cache: Cache<T>) {
    sort_with_cache(arr, n, less, cache);
}

unsafe fn sort_with_cache<T, F: Less<T>>(arr: *mut T, n: usize, less: &mut F, cache: Cache<T>) {
    if n < 4 {
        sort_small(arr, n, less);
        return;
    }

    let mut iterator = WikiIterator::new(n, MIN_LEVEL);

    iterator.begin();
    while !iterator.finished() {
        let range = iterator.next_range();
        sort_small(arr.add(range.start), len(&range), less);
    }

    if n < 8 {
        return;
    }

    loop {
        if iterator.length() < cache.capacity() {
            if (iterator.length() + 1) * 4 <= cache.capacity() && iterator.length() * 4 <= n {
                four_way_cache_merge(arr, &mut iterator, &cache, less);
                iterator.next_level();
            } else {
                two_way_cache_merge(arr, &mut iterator, &cache, less);
            }
        } else {
            in_place_merge(arr, &mut iterator, &cache, less);
        }

        if !iterator.next_level() {
            break;
        }
    }
}

/// The ordinary cache path: merge every `(A, B)` pair at this level through `cache`, or rotate
/// them past each other directly when `B` is entirely less than `A`.
unsafe fn two_way_cache_merge<T, F: Less<T>>(
    arr: *mut T,
    iterator: &mut WikiIterator,
    cache: &Cache<T>,
    less: &mut F,
) {
    iterator.begin();
    while !iterator.finished() {
        let a = iterator.next_range();
        let b = iterator.next_range();

        if less(&*arr.add(b.end - 1), &*arr.add(a.start)) {
            rotate(arr.add(a.start), len(&a), len(&b), cache);
        } else if less(&*arr.add(b.start), &*arr.add(a.end - 1)) {
            ptr::copy_nonoverlapping(arr.add(a.start), cache.as_mut_ptr(), len(&a));
            merge_external(arr, a, b, cache, less);
        }
    }
}

/// The four-way fast path: when the cache can hold four adjacent runs at once, merge `A1|B1` and
/// `A2|B2` into the cache, then merge those two halves straight back into the array -- one level
/// of merging collapsed into a single cache-backed pass, consuming two levels of the iterator at
/// once.
unsafe fn four_way_cache_merge<T, F: Less<T>>(
    arr: *mut T,
    iterator: &mut WikiIterator,
    cache: &Cache<T>,
    less: &mut F,
) {
    let cache0 = cache.as_mut_ptr();

    iterator.begin();
    while !iterator.finished() {
        let a1 = iterator.next_range();
        let b1 = iterator.next_range();
        let a2 = iterator.next_range();
        let b2 = iterator.next_range();

        let a1_len = len(&a1);
        let b1_len = len(&b1);

        if less(&*arr.add(b1.end - 1), &*arr.add(a1.start)) {
            ptr::copy_nonoverlapping(arr.add(a1.start), cache0.add(b1_len), a1_len);
            ptr::copy_nonoverlapping(arr.add(b1.start), cache0, b1_len);
        } else if less(&*arr.add(b1.start), &*arr.add(a1.end - 1)) {
            merge_into(arr as *const T, a1.clone(), b1.clone(), cache0, less);
        } else {
            // if A1, B1, A2, B2 are already fully in order end to end, there's nothing to do
            if !less(&*arr.add(b2.start), &*arr.add(a2.end - 1)) && !less(&*arr.add(a2.start), &*arr.add(b1.end - 1)) {
                continue;
            }

            ptr::copy_nonoverlapping(arr.add(a1.start), cache0, a1_len);
            ptr::copy_nonoverlapping(arr.add(b1.start), cache0.add(a1_len), b1_len);
        }

        let a1 = a1.start..b1.end;
        let off2 = len(&a1);
        let cache2 = cache0.add(off2);

        let a2_len = len(&a2);
        let b2_len = len(&b2);

        if less(&*arr.add(b2.end - 1), &*arr.add(a2.start)) {
            ptr::copy_nonoverlapping(arr.add(a2.start), cache2.add(b2_len), a2_len);
            ptr::copy_nonoverlapping(arr.add(b2.start), cache2, b2_len);
        } else if less(&*arr.add(b2.start), &*arr.add(a2.end - 1)) {
            merge_into(arr as *const T, a2.clone(), b2.clone(), cache2, less);
        } else {
            ptr::copy_nonoverlapping(arr.add(a2.start), cache2, a2_len);
            ptr::copy_nonoverlapping(arr.add(b2.start), cache2.add(a2_len), b2_len);
        }

        let a2 = a2.start..b2.end;

        // merge the two cache halves (A3, B3) straight back into the array at A1.start
        let a3 = 0..off2;
        let b3 = off2..(off2 + len(&a2));
        let dst = arr.add(a1.start);

        if less(&*cache0.add(b3.end - 1), &*cache0.add(a3.start)) {
            ptr::copy_nonoverlapping(cache0.add(a3.start), dst.add(len(&b3)), len(&a3));
            ptr::copy_nonoverlapping(cache0.add(b3.start), dst, len(&b3));
        } else if less(&*cache0.add(b3.start), &*cache0.add(a3.end - 1)) {
            merge_into(cache0 as *const T, a3, b3, dst, less);
        } else {
            ptr::copy_nonoverlapping(cache0.add(a3.start), dst, len(&a3));
            ptr::copy_nonoverlapping(cache0.add(b3.start), dst.add(len(&a3)), len(&b3));
        }
    }
}

/// The fully in-place path (spec.md §4.5 steps 0-8): pull two internal buffers out once for the
/// whole level, block-merge every `(A, B)` pair using them, then put them back.
unsafe fn in_place_merge<T, F: Less<T>>(arr: *mut T, iterator: &mut WikiIterator, cache: &Cache<T>, less: &mut F) {
    let mut block_size = isqrt(iterator.length());
    let buffer_size = iterator.length() / block_size + 1;

    let (buffer1, buffer2, mut pulls) =
        pull::find_buffers(arr as *const T, iterator, block_size, buffer_size, cache.capacity(), less);

    pull::extract(arr, &mut pulls, cache, less);

    let buffer_size = len(&buffer1);
    block_size = iterator.length() / buffer_size.max(1) + 1;

    iterator.begin();
    while !iterator.finished() {
        let mut a = iterator.next_range();
        let mut b = iterator.next_range();

        let start = a.start;

        if start == pulls[0].range.start {
            if pulls[0].from > pulls[0].to {
                a.start += pulls[0].count;
                if a.is_empty() {
                    continue;
                }
            } else if pulls[0].from < pulls[0].to {
                b.end -= pulls[0].count;
                if b.is_empty() {
                    continue;
                }
            }
        }

        if start == pulls[1].range.start {
            if pulls[1].from > pulls[1].to {
                a.start += pulls[1].count;
                if a.is_empty() {
                    continue;
                }
            } else if pulls[1].from < pulls[1].to {
                b.end -= pulls[1].count;
                if b.is_empty() {
                    continue;
                }
            }
        }

        if less(&*arr.add(b.end - 1), &*arr.add(a.start)) {
            rotate(arr.add(a.start), len(&a), len(&b), cache);
        } else if less(&*arr.add(a.end), &*arr.add(a.end - 1)) {
            merge_blocks(arr, a.clone(), b.clone(), buffer1.clone(), buffer2.clone(), block_size, cache, less);
        }
    }

    insertion_sort(arr, buffer2.clone(), less);
    pull::redistribute(arr, &pulls, cache, less);
}
