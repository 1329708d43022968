//! The six named end-to-end scenarios of spec.md §8, verbatim.

/// Scenario 1: `N=8`, `[3,1,4,1,5,9,2,6]` sorts to `[1,1,2,3,4,5,6,9]`, and the two `1`s keep
/// their original relative order (index 1 before index 3).
#[test]
fn n8_duplicate_ones_keep_original_order() {
    let input = [3, 1, 4, 1, 5, 9, 2, 6];
    let mut tagged: Vec<(i32, usize)> = input.iter().copied().zip(0..).collect();

    dustsort::sort_by_key(&mut tagged, |&(v, _)| v);

    let values: Vec<i32> = tagged.iter().map(|&(v, _)| v).collect();
    assert_eq!(values, [1, 1, 2, 3, 4, 5, 6, 9]);

    let one_tags: Vec<usize> = tagged.iter().filter(|&&(v, _)| v == 1).map(|&(_, t)| t).collect();
    assert_eq!(one_tags, [1, 3]);
}

/// Scenario 2: `N=12` reverse-sorted input sorts to ascending order -- exercises the
/// already-reverse-ordered rotate short-circuit at every level.
#[test]
fn n12_reverse_sorted_becomes_ascending() {
    let mut v: Vec<i32> = (1..=12).rev().collect();
    dustsort::sort(&mut v);
    assert_eq!(v, (1..=12).collect::<Vec<i32>>());
}

/// Scenario 3: `N=12` pre-sorted input is unchanged -- exercises the already-ordered no-op
/// short-circuit at every level.
#[test]
fn n12_pre_sorted_is_unchanged() {
    let mut v: Vec<i32> = (1..=12).collect();
    let expected = v.clone();
    dustsort::sort(&mut v);
    assert_eq!(v, expected);
}

/// Scenario 4: `N=16` all-equal values are unchanged (stability guarantees original order, and
/// with one distinct value there is nothing to reorder regardless).
#[test]
fn n16_all_equal_is_unchanged() {
    let mut tagged: Vec<(i32, usize)> = (0..16).map(|i| (5, i)).collect();
    let expected = tagged.clone();

    dustsort::sort_by_key(&mut tagged, |&(v, _)| v);

    assert_eq!(tagged, expected);
}

/// Scenario 5: `N=1024` all-equal values. Every merge's buffer-extraction scan can find no
/// second distinct value in `A` or `B`, forcing every merge at the in-place level through
/// `merge_in_place`. Output remains `[5; 1024]` with tags `0..1023` in order.
#[test]
fn n1024_all_equal_forces_merge_in_place() {
    let mut tagged: Vec<(i32, usize)> = (0..1024).map(|i| (5, i)).collect();
    let expected = tagged.clone();

    dustsort::sort_by_key(&mut tagged, |&(v, _)| v);

    assert_eq!(tagged, expected);
}

/// Scenario 6: `N=4096`, values `= i mod 100` -- repeated equal-value runs exercise block-merge
/// tagging; output must be stable within each value class.
#[test]
fn n4096_mod_100_is_stable_within_each_value_class() {
    let mut tagged: Vec<(i32, usize)> = (0..4096).map(|i| (i % 100, i)).collect();

    dustsort::sort_by_key(&mut tagged, |&(v, _)| v);

    // ordering holds
    for w in tagged.windows(2) {
        assert!(w[0].0 <= w[1].0);
    }

    // every value class's tags are ascending (original order preserved)
    for value in 0..100 {
        let tags: Vec<usize> = tagged.iter().filter(|&&(v, _)| v == value).map(|&(_, t)| t).collect();
        let mut sorted_tags = tags.clone();
        sorted_tags.sort_unstable();
        assert_eq!(tags, sorted_tags, "value class {value} is not stable");
    }

    // and it's a permutation of the expected reference sort
    let mut expected: Vec<(i32, usize)> = (0..4096).map(|i| (i % 100, i)).collect();
    expected.sort_by_key(|&(v, _)| v);
    assert_eq!(tagged, expected);
}
