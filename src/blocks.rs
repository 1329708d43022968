//! Step 3 of spec.md §4.5's in-place merge: block-tag `a`, roll its blocks through `b`, and
//! locally merge each dropped block's preceding run as it is settled. Ported from the
//! block-tagging-and-rolling loop inside `new_WikiSort`'s in-place branch in
//! `original_source/WikiSort.c`.
//!
//! Every full `block_size`-sized block of `a` is tagged by swapping its first element into
//! `buffer1` (so comparing blocks reduces to comparing their buffer1 tags, without touching the
//! blocks themselves). The blocks are then rolled forward past `b` one at a time, always picking
//! whichever untouched block has the smallest tag, until every block has been placed and merged.

use core::ops::Range;
use core::ptr;

use crate::cache::Cache;
use crate::merge::{merge_external, merge_in_place, merge_internal};
use crate::search::binary_first;
use crate::util::{block_swap, rotate, Less};

fn len(r: &Range<usize>) -> usize {
    r.end - r.start
}

/// Merge `a` and `b` (`b` immediately following `a`), given that neither is empty and they are
/// known to be neither already-ordered nor reverse-ordered. `buffer1` holds `len(a) / block_size`
/// (rounded, per spec.md §4.4 step 1) distinct tag values pulled from this level; `buffer2`, if
/// non-empty, is a second such buffer usable as an internal-merge scratch area.
pub unsafe fn merge_blocks<T, F: Less<T>>(
    arr: *mut T,
    a: Range<usize>,
    b: Range<usize>,
    buffer1: Range<usize>,
    buffer2: Range<usize>,
    block_size: usize,
    cache: &Cache<T>,
    less: &mut F,
) {
    let mut block_a = a.start..a.end;
    let first_a = a.start..(a.start + len(&block_a) % block_size);

    // Tag every full block of `a` by swapping its first element with the next buffer1 slot.
    let mut index_a = buffer1.start;
    let mut index = first_a.end;
    while index < block_a.end {
        ptr::swap(arr.add(index_a), arr.add(index));
        index_a += 1;
        index += block_size;
    }

    let mut last_a = first_a.clone();
    let mut last_b = 0..0usize;
    let mut block_b = b.start..(b.start + block_size.min(len(&b)));
    block_a.start += len(&first_a);
    index_a = buffer1.start;

    // Stage `firstA` for the first local merge below, either in the cache or in buffer2.
    if len(&last_a) <= cache.capacity() {
        ptr::copy_nonoverlapping(arr.add(last_a.start), cache.as_mut_ptr(), len(&last_a));
    } else if !buffer2.is_empty() {
        block_swap(arr.add(last_a.start), arr.add(buffer2.start), len(&last_a));
    }

    if len(&block_a) > 0 {
        loop {
            let drop_a_block = (!last_b.is_empty() && !less(&*arr.add(index_a), &*arr.add(last_b.end - 1)))
                || block_b.is_empty();

            if drop_a_block {
                let b_split = binary_first(arr as *const T, arr.add(index_a), last_b.clone(), less);
                let b_remaining = last_b.end - b_split;

                // Find the untouched block with the smallest tag and bring it to the front.
                let mut min_a = block_a.start;
                let mut find_a = min_a + block_size;
                while find_a < block_a.end {
                    if less(&*arr.add(find_a), &*arr.add(min_a)) {
                        min_a = find_a;
                    }
                    find_a += block_size;
                }
                block_swap(arr.add(block_a.start), arr.add(min_a), block_size);

                // Restore the block's real first element, and advance the tag cursor.
                ptr::swap(arr.add(block_a.start), arr.add(index_a));
                index_a += 1;

                if len(&last_a) <= cache.capacity() {
                    merge_external(arr, last_a.clone(), last_a.end..b_split, cache, less);
                } else if !buffer2.is_empty() {
                    merge_internal(arr, last_a.clone(), last_a.end..b_split, buffer2.clone(), less);
                } else {
                    merge_in_place(arr, last_a.clone(), last_a.end..b_split, cache, less);
                }

                if !buffer2.is_empty() || block_size <= cache.capacity() {
                    // Stage the new block aside (so it's safe to clobber its old position), then
                    // shift the retained tail of `lastB` into the gap this leaves behind.
                    if block_size <= cache.capacity() {
                        ptr::copy_nonoverlapping(arr.add(block_a.start), cache.as_mut_ptr(), block_size);
                    } else {
                        block_swap(arr.add(block_a.start), arr.add(buffer2.start), block_size);
                    }

                    block_swap(arr.add(b_split), arr.add(block_a.start + block_size - b_remaining), b_remaining);
                } else {
                    rotate(arr.add(b_split), block_a.start - b_split, block_size, cache);
                }

                last_a = (block_a.start - b_remaining)..(block_a.start - b_remaining + block_size);
                last_b = last_a.end..(last_a.end + b_remaining);

                block_a.start += block_size;
                if block_a.is_empty() {
                    break;
                }
            } else if len(&block_b) < block_size {
                // `cache` may be holding a staged block destined for the next merge call above --
                // force the cache out of this rotation so it isn't clobbered.
                rotate(arr.add(block_a.start), block_b.start - block_a.start, len(&block_b), &Cache::empty());
                last_b = block_a.start..(block_a.start + len(&block_b));
                block_a.start += len(&block_b);
                block_a.end += len(&block_b);
                block_b.end = block_b.start;
            } else {
                block_swap(arr.add(block_a.start), arr.add(block_b.start), block_size);
                last_b = block_a.start..(block_a.start + block_size);
                block_a.start += block_size;
                block_a.end += block_size;
                block_b.start += block_size;

                if block_b.end > b.end - block_size {
                    block_b.end = b.end;
                } else {
                    block_b.end += block_size;
                }
            }
        }
    }

    if len(&last_a) <= cache.capacity() {
        merge_external(arr, last_a.clone(), last_a.end..b.end, cache, less);
    } else if !buffer2.is_empty() {
        merge_internal(arr, last_a.clone(), last_a.end..b.end, buffer2, less);
    } else {
        merge_in_place(arr, last_a, last_a.end..b.end, cache, less);
    }
}

