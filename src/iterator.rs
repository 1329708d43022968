//! Exact, allocation-free level decomposition (spec.md §4.4's "run length doubles each level"
//! traversal), ported from `WikiIterator_*` in `original_source/WikiSort.c`.
//!
//! Splitting `size` elements into `size / level` runs of exactly `level` length only works when
//! `level` divides `size`; in general it doesn't, so the iterator tracks a fractional remainder
//! (`numerator / denominator`) and lets `decimal` -- the running boundary -- absorb an extra unit
//! whenever the fractional part would otherwise overflow. Every run handed out by one level, laid
//! end to end, covers `0..size` exactly, with no off-by-one drift accumulating across levels.

/// Largest power of two `<= n` (0 for `n == 0`).
fn floor_power_of_two(n: usize) -> usize {
    if n == 0 {
        return 0;
    }

    1usize << (usize::BITS - 1 - n.leading_zeros())
}

/// Walks `0..size` in runs of (approximately, and on average exactly) `min_level` elements,
/// doubling the run length each time [`WikiIterator::next_level`] is called.
pub struct WikiIterator {
    size: usize,
    decimal: usize,
    numerator: usize,
    denominator: usize,
    decimal_step: usize,
    numerator_step: usize,
}

impl WikiIterator {
    /// Build an iterator over `0..size` whose first level hands out runs of length `min_level`
    /// (the base-case run length chosen by the caller, spec.md's `min_run`).
    pub fn new(size: usize, min_level: usize) -> Self {
        let power_of_two = floor_power_of_two(size);
        let denominator = power_of_two / min_level;
        let numerator_step = size % denominator;
        let decimal_step = size / denominator;

        let mut it = WikiIterator {
            size,
            decimal: 0,
            numerator: 0,
            denominator,
            decimal_step,
            numerator_step,
        };
        it.begin();
        it
    }

    /// Reset to the start of the current level.
    pub fn begin(&mut self) {
        self.numerator = 0;
        self.decimal = 0;
    }

    /// Return the next run at the current level, as `start..end` within `0..size`.
    pub fn next_range(&mut self) -> core::ops::Range<usize> {
        let start = self.decimal;

        self.decimal += self.decimal_step;
        self.numerator += self.numerator_step;
        if self.numerator >= self.denominator {
            self.numerator -= self.denominator;
            self.decimal += 1;
        }

        start..self.decimal
    }

    /// `true` once every run at the current level has been handed out by [`next_range`].
    pub fn finished(&self) -> bool {
        self.decimal >= self.size
    }

    /// Double the run length for the next level. Returns `false` (and leaves the iterator
    /// otherwise usable) once the run length would reach or exceed `size` -- i.e. once the whole
    /// array is a single run and no further levels exist.
    pub fn next_level(&mut self) -> bool {
        self.decimal_step += self.decimal_step;
        self.numerator_step += self.numerator_step;
        if self.numerator_step >= self.denominator {
            self.numerator_step -= self.denominator;
            self.decimal_step += 1;
        }

        self.decimal_step < self.size
    }

    /// The (approximate, pre-fractional-adjustment) run length at the current level.
    pub fn length(&self) -> usize {
        self.decimal_step
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    #[test]
    fn floor_power_of_two_matches_definition() {
        assert_eq!(floor_power_of_two(0), 0);
        assert_eq!(floor_power_of_two(1), 1);
        assert_eq!(floor_power_of_two(2), 2);
        assert_eq!(floor_power_of_two(3), 2);
        assert_eq!(floor_power_of_two(1023), 512);
        assert_eq!(floor_power_of_two(1024), 1024);
    }

    fn runs_at_first_level(size: usize, min_level: usize) -> Vec<core::ops::Range<usize>> {
        let mut it = WikiIterator::new(size, min_level);
        let mut runs = Vec::new();
        while !it.finished() {
            runs.push(it.next_range());
        }
        runs
    }

    #[test]
    fn first_level_covers_the_whole_range_exactly() {
        for &size in &[0usize, 1, 2, 3, 4, 7, 8, 15, 16, 63, 64, 1023, 1024] {
            let min_level = 4.min(size.max(1));
            let runs = runs_at_first_level(size, min_level);

            let mut cursor = 0;
            for r in &runs {
                assert_eq!(r.start, cursor);
                assert!(r.end > r.start || size == 0);
                cursor = r.end;
            }
            assert_eq!(cursor, size);
        }
    }

    #[test]
    fn levels_double_and_eventually_cover_everything_in_one_run() {
        let size = 100usize;
        let mut it = WikiIterator::new(size, 4);
        let mut prev_len = it.length();

        let mut levels = 0;
        loop {
            let runs = {
                it.begin();
                let mut rs = Vec::new();
                while !it.finished() {
                    rs.push(it.next_range());
                }
                rs
            };
            let total: usize = runs.iter().map(|r| r.end - r.start).sum();
            assert_eq!(total, size);

            levels += 1;
            assert!(levels < 64, "iterator failed to converge");

            if !it.next_level() {
                break;
            }
            assert!(it.length() >= prev_len);
            prev_len = it.length();
        }
    }
}
