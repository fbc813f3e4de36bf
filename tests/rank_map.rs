mod common;

use common::{LinearModel, Record, classified};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rank_rbtree::{AllocationMode, Error, NaturalOrder, Rank, RankMap};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys from a small range, so that operations collide often.
fn key_strategy() -> impl Strategy<Value = i64> {
    -150i64..150i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

fn mode_strategy() -> impl Strategy<Value = AllocationMode> {
    prop_oneof![
        Just(AllocationMode::DynamicDiscard),
        Just(AllocationMode::DynamicRetain),
        Just(AllocationMode::Fixed),
    ]
}

fn snapshot(map: &RankMap<i64, i64>) -> Vec<Record> {
    map.iter().map(|(k, v, rank)| (*k, *v, rank, 1)).collect()
}

fn scenario() -> RankMap<i64, i64> {
    let mut map = RankMap::new();
    for key in [5, 3, 8, 1, 4, 7, 9] {
        map.add(key, key * 100).unwrap();
    }
    map
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn insertion_order_does_not_leak_into_enumeration() {
    let map = scenario();
    assert_eq!(map.least(), Some((&1, &100)));
    assert_eq!(map.greatest(), Some((&9, &900)));

    let mut cursor = map.fast_cursor();
    let mut keys = Vec::new();
    while let Some(step) = cursor.next(&map) {
        keys.push(*step.unwrap().0);
    }
    assert_eq!(keys, [1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn key_by_rank_is_zero_based() {
    let map = scenario();
    assert_eq!(map.get_key_by_rank(3), Ok(&5));
    assert_eq!(map.get_key_by_rank(0), Ok(&1));
    assert_eq!(map.get_key_by_rank(6), Ok(&9));
}

#[test]
fn adjust_count_down_removes_the_key() {
    let mut map = scenario();
    let extent = map.extent();
    assert_eq!(map.adjust_count(5, -1), Ok(0));
    assert!(!map.contains_key(&5));
    assert_eq!(map.extent(), extent - 1);
    map.inspect().validate().unwrap();
}

#[test]
fn duplicate_try_add_leaves_count_unchanged() {
    let mut map = scenario();
    assert_eq!(map.try_add(8, 0), Ok(false));
    assert_eq!(map.len(), 7);
    assert_eq!(map.get(&8), Ok(&800));
}

#[test]
fn rank_out_of_range() {
    let map = scenario();
    assert!(matches!(map.try_get_key_by_rank(-1), Err(Error::InvalidArgument(_))));
    assert_eq!(map.try_get_key_by_rank(7), Ok(None));
}

#[test]
fn fast_cursor_fails_after_insert_while_robust_cursor_continues() {
    let mut map = scenario();
    let mut fast = map.fast_cursor();
    let mut robust = map.robust_cursor();

    assert_eq!(fast.next(&map), Some(Ok((&1, &100, 0))));
    assert_eq!(robust.next(&map), Some((&1, &100, 0)));
    assert_eq!(robust.next(&map), Some((&3, &300, 1)));

    map.add(2, 200).unwrap(); // behind the robust cursor
    map.add(6, 600).unwrap(); // ahead of it
    map.remove(&4).unwrap(); // ahead of it

    assert_eq!(fast.next(&map), Some(Err(Error::ConcurrentModification)));

    let mut rest = Vec::new();
    while let Some((key, _, rank)) = robust.next(&map) {
        rest.push((*key, rank));
    }
    assert_eq!(rest, [(5, 3), (6, 4), (7, 5), (8, 6), (9, 7)]);
}

// ─── Round trips and idempotence ─────────────────────────────────────────────

#[test]
fn clone_is_a_deep_copy() {
    let mut map = scenario();
    let copy = map.clone();
    copy.inspect().validate().unwrap();
    assert_eq!(snapshot(&copy), snapshot(&map));

    map.remove(&5).unwrap();
    assert!(copy.contains_key(&5));
    assert_eq!(copy.len(), 7);
}

#[test]
fn clone_keeps_store_configuration() {
    let mut map: RankMap<i64, i64> = RankMap::with_options(NaturalOrder, 16, AllocationMode::DynamicRetain);
    map.extend((0..10).map(|k| (k, k)));
    for key in 0..4 {
        map.remove(&key).unwrap();
    }
    let copy = map.clone();
    assert_eq!(copy.allocation_mode(), AllocationMode::DynamicRetain);
    assert_eq!(copy.free_nodes(), map.free_nodes());
    assert_eq!(copy.free_nodes(), 10);
}

#[test]
fn clearing_twice_changes_nothing() {
    let mut map = scenario();
    map.clear();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.extent(), 0);
    assert_eq!(map.least(), None);
    map.inspect().validate().unwrap();
}

#[test]
fn removing_an_absent_key_changes_nothing() {
    let mut map = scenario();
    let before = snapshot(&map);
    assert_eq!(map.try_remove(&42), None);
    assert_eq!(map.try_remove(&42), None);
    assert_eq!(map.remove(&42), Err(Error::NotFound));
    assert_eq!(snapshot(&map), before);
}

// ─── Node store policies ─────────────────────────────────────────────────────

#[test]
fn fixed_capacity_is_a_hard_limit() {
    let mut map = RankMap::with_options(NaturalOrder, 4, AllocationMode::Fixed);
    for key in 0..4 {
        map.add(key, key).unwrap();
    }
    let before = snapshot(&map);
    assert_eq!(map.try_add(10, 10), Err(Error::CapacityExhausted { capacity: 4 }));
    assert_eq!(snapshot(&map), before);
    assert!(map.reserve(1).is_err());

    map.remove(&0).unwrap();
    assert_eq!(map.free_nodes(), 1);
    map.add(10, 10).unwrap();
    assert_eq!(map.capacity(), 4);
    map.inspect().validate().unwrap();
}

#[test]
fn retaining_store_reuses_nodes() {
    let mut map = RankMap::with_options(NaturalOrder, 0, AllocationMode::DynamicRetain);
    map.extend((0..32).map(|k| (k, k)));
    for key in 0..32 {
        map.remove(&key).unwrap();
    }
    assert_eq!(map.free_nodes(), 32);
    map.extend((100..120).map(|k| (k, k)));
    assert_eq!(map.free_nodes(), 12);
    assert_eq!(map.inspect().live_nodes(), 20);
    map.clear();
    assert_eq!(map.free_nodes(), 32);
}

#[test]
fn discarding_store_keeps_no_free_nodes() {
    let mut map = RankMap::with_options(NaturalOrder, 0, AllocationMode::DynamicDiscard);
    map.extend((0..32).map(|k| (k, k)));
    for key in (0..32).step_by(2) {
        map.remove(&key).unwrap();
        map.inspect().validate().unwrap();
    }
    assert_eq!(map.free_nodes(), 0);
    assert_eq!(map.inspect().live_nodes(), 16);
    assert_eq!(map.try_get_rank(&31), Some(15));
}

// ─── Inspection ──────────────────────────────────────────────────────────────

#[test]
fn inspector_exposes_the_node_graph() {
    let map: RankMap<i64, i64> = (0..3).map(|k| (k, -k)).collect();
    let inspector = map.inspect();
    let root = inspector.root().unwrap();
    assert_eq!((*root.key(), root.is_red(), root.offset()), (1, false, 1));

    let left = root.left().unwrap();
    let right = root.right().unwrap();
    assert_eq!((*left.key(), *left.value(), left.offset()), (0, 0, -1));
    assert_eq!((*right.key(), *right.value(), right.offset()), (2, -2, 1));
    assert!(left.is_red() && right.is_red());
    assert_eq!(inspector.height(), 2);
    assert_eq!(inspector.rank_dump(), [(&0, &0, 0, 1), (&1, &-1, 1, 1), (&2, &-2, 2, 1)]);
}

// ─── Randomized differential tests ───────────────────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    TryAdd(i64, i64),
    TryRemove(i64),
    TryGet(i64),
    TrySet(i64, i64),
    GetRank(i64),
    KeyByRank(isize),
    NearestLess(i64, bool),
    NearestGreater(i64, bool),
    AdjustCount(i64, isize),
    Clear,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        8 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::TryAdd(k, v)),
        5 => key_strategy().prop_map(MapOp::TryRemove),
        2 => key_strategy().prop_map(MapOp::TryGet),
        1 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::TrySet(k, v)),
        2 => key_strategy().prop_map(MapOp::GetRank),
        2 => (-5isize..320).prop_map(MapOp::KeyByRank),
        1 => (key_strategy(), any::<bool>()).prop_map(|(k, e)| MapOp::NearestLess(k, e)),
        1 => (key_strategy(), any::<bool>()).prop_map(|(k, e)| MapOp::NearestGreater(k, e)),
        3 => (key_strategy(), -2isize..3).prop_map(|(k, d)| MapOp::AdjustCount(k, d)),
        1 => Just(MapOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence against a `RankMap` and the linear
    /// model, comparing results, error kinds and full snapshots at every step.
    #[test]
    fn map_ops_match_linear_model(
        mode in mode_strategy(),
        ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE),
    ) {
        let capacity = 200;
        let mut map: RankMap<i64, i64> = RankMap::with_options(NaturalOrder, capacity, mode);
        let mut model = LinearModel::new(true, (mode == AllocationMode::Fixed).then_some(capacity));

        for op in &ops {
            match *op {
                MapOp::TryAdd(k, v) => {
                    prop_assert_eq!(classified(map.try_add(k, v)), model.try_add(k, v, 1), "try_add({})", k);
                }
                MapOp::TryRemove(k) => {
                    prop_assert_eq!(map.try_remove(&k), model.try_remove(k), "try_remove({})", k);
                }
                MapOp::TryGet(k) => {
                    prop_assert_eq!(map.try_get(&k).copied(), model.try_get(k), "try_get({})", k);
                }
                MapOp::TrySet(k, v) => {
                    prop_assert_eq!(map.try_set(&k, v), model.try_set(k, v), "try_set({})", k);
                }
                MapOp::GetRank(k) => {
                    prop_assert_eq!(map.try_get_rank(&k), model.try_get_rank(k), "try_get_rank({})", k);
                }
                MapOp::KeyByRank(r) => {
                    let result = classified(map.try_get_key_by_rank(r)).map(Option::<&i64>::copied);
                    prop_assert_eq!(result, model.try_get_key_by_rank(r), "try_get_key_by_rank({})", r);
                }
                MapOp::NearestLess(k, or_equal) => {
                    let found = if or_equal { map.nearest_less_or_equal(&k) } else { map.nearest_less(&k) };
                    let found = (found.key_value().map(|(k, v)| (*k, *v)), found.rank());
                    prop_assert_eq!(found, model.nearest_less(k, or_equal), "nearest_less({}, {})", k, or_equal);
                }
                MapOp::NearestGreater(k, or_equal) => {
                    let found = if or_equal { map.nearest_greater_or_equal(&k) } else { map.nearest_greater(&k) };
                    let found = (found.key_value().map(|(k, v)| (*k, *v)), found.rank());
                    prop_assert_eq!(found, model.nearest_greater(k, or_equal), "nearest_greater({}, {})", k, or_equal);
                }
                MapOp::AdjustCount(k, d) => {
                    prop_assert_eq!(classified(map.adjust_count(k, d)), model.adjust_count(k, d), "adjust_count({}, {})", k, d);
                }
                MapOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(map.len(), model.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(map.extent(), model.extent(), "extent mismatch after {:?}", op);
            prop_assert_eq!(snapshot(&map), model.snapshot(), "snapshot mismatch after {:?}", op);
            prop_assert!(map.inspect().validate().is_ok(), "invalid tree after {:?}", op);
        }
    }

    /// Every present key sits at its rank, and both inclusive nearest queries
    /// land on it.
    #[test]
    fn ranks_and_positions_agree(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..300),
        removals in proptest::collection::vec(key_strategy(), 0..100),
    ) {
        let mut map: RankMap<i64, i64> = entries.into_iter().collect();
        for k in &removals {
            map.try_remove(k);
        }
        let keys: Vec<i64> = map.iter().map(|(k, _, _)| *k).collect();
        for key in keys {
            let rank = map.get_rank(&key).unwrap();
            prop_assert_eq!(map.get_key_by_rank(rank), Ok(&key));
            prop_assert_eq!(map[Rank(rank)], *map.get(&key).unwrap());
            let below = map.nearest_less_or_equal(&key);
            let above = map.nearest_greater_or_equal(&key);
            prop_assert_eq!((below.key(), below.rank()), (Some(&key), rank));
            prop_assert_eq!((above.key(), above.rank()), (Some(&key), rank));
        }
    }

    /// A robust cursor driven through random mutations yields strictly
    /// increasing keys, each present at the moment it is yielded.
    #[test]
    fn robust_cursor_survives_mutation(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..200),
        ops in proptest::collection::vec(map_op_strategy(), 0..400),
    ) {
        let mut map: RankMap<i64, i64> = entries.into_iter().collect();
        let mut cursor = map.robust_cursor();
        let mut last: Option<i64> = None;

        for op in &ops {
            match *op {
                MapOp::TryAdd(k, v) => { let _ = map.try_add(k, v); }
                MapOp::TryRemove(k) => { map.try_remove(&k); }
                MapOp::Clear => map.clear(),
                _ => {
                    let Some((&key, _, rank)) = cursor.next(&map) else { break };
                    prop_assert!(last.is_none_or(|last| last < key));
                    prop_assert_eq!(map.try_get_rank(&key), Some(rank));
                    last = Some(key);
                }
            }
        }
    }

    /// The iterator and both cursors agree on an unmodified map.
    #[test]
    fn enumerations_agree(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..300)) {
        let map: RankMap<i64, i64> = entries.into_iter().collect();
        let iterated: Vec<_> = map.iter().collect();

        let mut fast = map.fast_cursor();
        let mut fast_steps = Vec::new();
        while let Some(step) = fast.next(&map) {
            fast_steps.push(step.unwrap());
        }

        let mut robust = map.robust_cursor();
        let mut robust_steps = Vec::new();
        while let Some(step) = robust.next(&map) {
            robust_steps.push(step);
        }

        prop_assert_eq!(map.iter().len(), map.len());
        prop_assert_eq!(&iterated, &fast_steps);
        prop_assert_eq!(&iterated, &robust_steps);
    }
}
