//! The fixed-size external scratch buffer used by [`crate::merge::merge_external`] and by
//! [`crate::util::rotate`].
//!
//! Unlike the teacher crate (which carves its internal buffer straight out of the tail of the
//! slice being sorted and never allocates), this sort needs a real external cache: a small
//! heap-backed region of up to `C` elements, where `C` is chosen once per call and does not grow
//! with `N`. Allocation failure at any rung of the fallback chain below just drops to the next,
//! smaller rung -- `C = 0` is always a legal, correct outcome.

use core::alloc::Layout;
use core::ptr::NonNull;

extern crate alloc;
use alloc::alloc::{alloc, dealloc};

/// Good choices for the cache size, tried in order until one succeeds:
/// `⌈(N+1)/2⌉` (turns every merge into a full-speed external merge), then
/// `⌈√((N+1)/2)⌉+1` (big enough to hold one A-block at the largest in-place level), then a
/// fixed `512`, then `0`.
fn candidates(n: usize) -> [usize; 3] {
    let half = n.div_ceil(2);
    let root = isqrt(half) + 1;
    [half, root, 512]
}

/// Integer square root via Newton's method. `no_std`-friendly (no `libm`/`std::f64::sqrt`).
///
/// Also used by `drive.rs` to size the in-place path's block length (spec.md §4.5 step 0).
pub(crate) fn isqrt(n: usize) -> usize {
    if n < 2 {
        return n;
    }

    let mut x = n;
    let mut y = (x + 1) / 2;

    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }

    x
}

/// A fixed-capacity, uninitialized scratch region of up to `cap` elements of `T`.
///
/// `Cache` never treats its contents as live `T` values -- callers `read`/`write` raw pointers
/// into it exactly as they would a caller-owned `char *cache` buffer in the original source. It
/// carries no elements across calls and has no drop glue for `T`; on `Drop` it only frees the
/// underlying allocation.
pub struct Cache<T> {
    ptr: NonNull<T>,
    cap: usize,
}

impl<T> Cache<T> {
    /// Build the cache for sorting `n` elements, following the §5 fallback policy. Never fails;
    /// degrades to an empty (zero-capacity) cache if every allocation attempt fails.
    pub fn for_len(n: usize) -> Self {
        if core::mem::size_of::<T>() == 0 {
            // A cache of ZSTs is meaningless; treat it as always-empty so the rest of the sort
            // takes the in-place paths unconditionally.
            return Self::empty();
        }

        for cap in candidates(n) {
            if let Some(cache) = Self::try_with_capacity(cap) {
                return cache;
            }
        }

        Self::empty()
    }

    /// An always-valid, zero-capacity cache. Every merge/rotate routine must behave correctly
    /// when handed this (it is exactly `C = 0` from spec.md §5).
    pub fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    fn try_with_capacity(cap: usize) -> Option<Self> {
        if cap == 0 {
            return Some(Self::empty());
        }

        let layout = Layout::array::<T>(cap).ok()?;

        // SAFETY: `layout` has non-zero size since `cap > 0` and `T` is not a ZST.
        let raw = unsafe { alloc(layout) };
        let ptr = NonNull::new(raw as *mut T)?;

        Some(Self { ptr, cap })
    }

    /// For tests only: force a specific cache capacity, to check that the sort produces
    /// identical output regardless of `C` (spec.md §8, invariant 6).
    #[cfg(test)]
    pub fn with_capacity_for_test(cap: usize) -> Self {
        Self::try_with_capacity(cap).unwrap_or_else(Self::empty)
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for Cache<T> {
    fn drop(&mut self) {
        if self.cap == 0 || core::mem::size_of::<T>() == 0 {
            return;
        }

        // SAFETY: `self.ptr` was allocated with this exact layout in `try_with_capacity`, and a
        // non-zero `cap` with a non-ZST `T` is only ever reached through that path.
        unsafe {
            let layout = Layout::array::<T>(self.cap).unwrap();
            dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_has_zero_capacity() {
        let cache: Cache<u64> = Cache::empty();
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn for_len_never_exceeds_half_plus_one() {
        for n in [0usize, 1, 2, 3, 10, 1000, 1_000_000] {
            let cache: Cache<u64> = Cache::for_len(n);
            assert!(cache.capacity() <= n.div_ceil(2) + 1);
        }
    }

    #[test]
    fn isqrt_matches_definition() {
        for n in 0usize..2000 {
            let r = isqrt(n);
            assert!(r * r <= n);
            assert!((r + 1) * (r + 1) > n);
        }
    }

    #[test]
    fn zst_cache_is_always_empty() {
        let cache: Cache<()> = Cache::for_len(1_000_000);
        assert_eq!(cache.capacity(), 0);
    }
}
