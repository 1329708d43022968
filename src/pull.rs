//! Internal-buffer bookkeeping for the in-place merge path (spec.md §4.4 steps 1, 2 and 8),
//! ported from the inline `pull[2]` struct and the buffer-discovery / extraction / redistribution
//! loops inside `new_WikiSort` in `original_source/WikiSort.c`.
//!
//! A "pull" records where a run of `count` distinct values was found (`range`, bounding the A/B
//! pair it was found in) and which direction it was rotated to reach an edge (`from` towards
//! `to`): `from > to` means it was walked to the left edge of an A run, `from < to` to the right
//! edge of a B run. [`redistribute`] later walks the same direction in reverse to put the values
//! back in their proper sorted position.

use core::ops::Range;

use crate::cache::Cache;
use crate::iterator::WikiIterator;
use crate::search::{find_first_backward, find_first_forward, find_last_backward, find_last_forward};
use crate::util::{rotate, Less};

#[derive(Clone, Copy)]
pub struct PullRecord {
    pub range: Range<usize>,
    pub count: usize,
    pub from: usize,
    pub to: usize,
}

impl PullRecord {
    fn none() -> Self {
        PullRecord { range: 0..0, from: 0, to: 0 }
    }
}

fn len(r: &Range<usize>) -> usize {
    r.end - r.start
}

/// Scan `a` from its start for up to `find` distinct values, pulled towards `a.start`.
/// Returns `(count, index)`: the number of distinct values found and the position of the last
/// one, which is where the run `a.start..=index` (actually `a.start..index+1`, inclusive of
/// `index`) should be rotated from.
unsafe fn scan_a<T, F: Less<T>>(arr: *const T, a: &Range<usize>, find: usize, less: &mut F) -> (usize, usize) {
    let mut last = a.start;
    let mut count = 1usize;
    let mut index;
    loop {
        if count >= find {
            break;
        }
        index = find_last_forward(arr, arr.add(last), (last + 1)..a.end, less, find - count);
        if index == a.end {
            break;
        }
        last = index;
        count += 1;
    }
    (count, last)
}

/// Mirror of [`scan_a`], scanning `b` from its end towards `b.start`.
unsafe fn scan_b<T, F: Less<T>>(arr: *const T, b: &Range<usize>, find: usize, less: &mut F) -> (usize, usize) {
    let mut last = b.end - 1;
    let mut count = 1usize;
    let mut index;
    loop {
        if count >= find {
            break;
        }
        index = find_first_backward(arr, arr.add(last), b.start..last, less, find - count);
        if index == b.start {
            break;
        }
        last = index - 1;
        count += 1;
    }
    (count, last)
}

/// Step 1: scan every `(A, B)` pair at this level for two internal buffers of `buffer_size`
/// distinct values each, recording where to pull them from in `pulls`. Returns the (possibly
/// empty) ranges the two buffers will occupy once [`extract`] has physically moved them there.
pub unsafe fn find_buffers<T, F: Less<T>>(
    arr: *const T,
    iterator: &mut WikiIterator,
    block_size: usize,
    buffer_size: usize,
    cache_capacity: usize,
    less: &mut F,
) -> (Range<usize>, Range<usize>, [PullRecord; 2]) {
    let mut pulls = [PullRecord::none(), PullRecord::none()];
    let mut pull_index = 0usize;

    let mut buffer1 = 0..0usize;
    let mut buffer2 = 0..0usize;

    let mut find = buffer_size + buffer_size;
    let mut find_separately = false;

    if block_size <= cache_capacity {
        find = buffer_size;
    } else if find > iterator.length() {
        find = buffer_size;
        find_separately = true;
    }

    iterator.begin();
    'search: while !iterator.finished() {
        let a = iterator.next_range();
        let b = iterator.next_range();

        let (count, index) = scan_a(arr, &a, find, less);
        if count >= buffer_size {
            pulls[pull_index] = PullRecord { range: a.start..b.end, count, from: index, to: a.start };
            pull_index = 1;

            if count == buffer_size + buffer_size {
                buffer1 = a.start..(a.start + buffer_size);
                buffer2 = (a.start + buffer_size)..(a.start + count);
                break 'search;
            } else if find == buffer_size + buffer_size {
                buffer1 = a.start..(a.start + count);
                find = buffer_size;
            } else if block_size <= cache_capacity {
                buffer1 = a.start..(a.start + count);
                break 'search;
            } else if find_separately {
                buffer1 = a.start..(a.start + count);
                find_separately = false;
            } else {
                buffer2 = a.start..(a.start + count);
                break 'search;
            }
        } else if pull_index == 0 && count > len(&buffer1) {
            buffer1 = a.start..(a.start + count);
            pulls[0] = PullRecord { range: a.start..b.end, count, from: index, to: a.start };
        }

        let (count, index) = scan_b(arr, &b, find, less);
        if count >= buffer_size {
            pulls[pull_index] = PullRecord { range: a.start..b.end, count, from: index, to: b.end };
            pull_index = 1;

            if count == buffer_size + buffer_size {
                buffer1 = (b.end - count)..(b.end - buffer_size);
                buffer2 = (b.end - buffer_size)..b.end;
                break 'search;
            } else if find == buffer_size + buffer_size {
                buffer1 = (b.end - count)..b.end;
                find = buffer_size;
            } else if block_size <= cache_capacity {
                buffer1 = (b.end - count)..b.end;
                break 'search;
            } else if find_separately {
                buffer1 = (b.end - count)..b.end;
                find_separately = false;
            } else {
                if pulls[0].range.start == a.start {
                    pulls[0].range.end -= pulls[1].count;
                }
                buffer2 = (b.end - count)..b.end;
                break 'search;
            }
        } else if pull_index == 0 && count > len(&buffer1) {
            buffer1 = (b.end - count)..b.end;
            pulls[0] = PullRecord { range: a.start..b.end, count, from: index, to: b.end };
        }
    }

    (buffer1, buffer2, pulls)
}

/// Step 2: physically rotate the two buffers recorded in `pulls` to the edges [`find_buffers`]
/// chose for them.
pub unsafe fn extract<T, F: Less<T>>(arr: *mut T, pulls: &mut [PullRecord; 2], cache: &Cache<T>, less: &mut F) {
    for pull_index in 0..2 {
        let length = pulls[pull_index].count;

        if pulls[pull_index].to < pulls[pull_index].from {
            let mut index = pulls[pull_index].from;
            let mut count = 1usize;
            while count < length {
                index = find_first_backward(
                    arr as *const T,
                    arr.add(index - 1),
                    pulls[pull_index].to..(pulls[pull_index].from - (count - 1)),
                    less,
                    length - count,
                );
                let range = (index + 1)..(pulls[pull_index].from + 1);
                rotate(arr.add(range.start), len(&range) - count, count, cache);
                pulls[pull_index].from = index + count;
                count += 1;
            }
        } else if pulls[pull_index].to > pulls[pull_index].from {
            let mut index = pulls[pull_index].from + 1;
            let mut count = 1usize;
            while count < length {
                index = find_last_forward(arr as *const T, arr.add(index), index..pulls[pull_index].to, less, length - count);
                let range = pulls[pull_index].from..(index - 1);
                rotate(arr.add(range.start), count, len(&range) - count, cache);
                pulls[pull_index].from = index - 1 - count;
                count += 1;
            }
        }
    }
}

/// Step 8: the inverse of [`extract`] -- walk each buffer's values back out to their sorted
/// position, now that the rest of the level has been merged around them.
pub unsafe fn redistribute<T, F: Less<T>>(arr: *mut T, pulls: &[PullRecord; 2], cache: &Cache<T>, less: &mut F) {
    for pull_index in 0..2 {
        let mut unique = pulls[pull_index].count * 2;

        if pulls[pull_index].from > pulls[pull_index].to {
            let mut buffer = pulls[pull_index].range.start..(pulls[pull_index].range.start + pulls[pull_index].count);
            while len(&buffer) > 0 {
                let index = find_first_forward(
                    arr as *const T,
                    arr.add(buffer.start),
                    buffer.end..pulls[pull_index].range.end,
                    less,
                    unique,
                );
                let shift = index - buffer.end;
                rotate(arr.add(buffer.start), len(&buffer), shift, cache);
                buffer.start += shift + 1;
                buffer.end += shift;
                unique -= 2;
            }
        } else if pulls[pull_index].from < pulls[pull_index].to {
            let mut buffer = (pulls[pull_index].range.end - pulls[pull_index].count)..pulls[pull_index].range.end;
            while len(&buffer) > 0 {
                let index = find_last_backward(
                    arr as *const T,
                    arr.add(buffer.end - 1),
                    pulls[pull_index].range.start..buffer.start,
                    less,
                    unique,
                );
                let shift = buffer.start - index;
                rotate(arr.add(index), shift, len(&buffer), cache);
                buffer.start -= shift;
                buffer.end -= shift + 1;
                unique -= 2;
            }
        }
    }
}
