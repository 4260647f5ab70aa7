//! Push/pop scenarios and the capacity they leave behind.

use super::common::{container_with, filled, guarded_registry, registry_with};
use guardstack::{ErrorFlags, ShrinkPolicy, StackError};

#[test]
fn test_create_push_three_pop_four() {
    let mut registry = guarded_registry();
    let h = registry.create(2).unwrap();
    assert_eq!((registry.len(h).unwrap(), registry.capacity(h).unwrap()), (0, 2));

    let mut seen = Vec::new();
    for v in [10, 20, 30] {
        registry.push(h, v).unwrap();
        seen.push((registry.len(h).unwrap(), registry.capacity(h).unwrap()));
    }
    assert_eq!(seen, vec![(1, 2), (2, 2), (3, 4)]);

    let mut popped = Vec::new();
    for _ in 0..3 {
        popped.push(registry.pop(h).unwrap());
    }
    assert_eq!(popped, vec![30, 20, 10]);
    assert_eq!(registry.len(h).unwrap(), 0);
    assert!(registry.capacity(h).unwrap() >= 1);

    assert_eq!(registry.pop(h), Err(StackError::Underflow));
    assert_eq!(registry.len(h).unwrap(), 0);
}

#[test]
fn test_exact_shrink_halves_at_quarter() {
    let mut registry = registry_with(ShrinkPolicy::Exact, 1);
    let h = filled(&mut registry, 2, &[10, 20, 30]);
    assert_eq!(registry.capacity(h).unwrap(), 4);

    registry.pop(h).unwrap(); // size 2, 8 != 4
    assert_eq!(registry.capacity(h).unwrap(), 4);
    registry.pop(h).unwrap(); // size 1, 4 == 4
    assert_eq!(registry.capacity(h).unwrap(), 2);
    registry.pop(h).unwrap(); // size 0, 0 != 2
    assert_eq!(registry.capacity(h).unwrap(), 2);
}

#[test]
fn test_threshold_shrink_keeps_halving() {
    let mut registry = registry_with(ShrinkPolicy::Threshold, 1);
    let h = filled(&mut registry, 2, &[10, 20, 30]);

    registry.pop(h).unwrap();
    registry.pop(h).unwrap();
    assert_eq!(registry.capacity(h).unwrap(), 2);
    registry.pop(h).unwrap();
    assert_eq!(registry.capacity(h).unwrap(), 1);
}

#[test]
fn test_min_capacity_floor_blocks_shrink() {
    let mut registry = registry_with(ShrinkPolicy::Threshold, 4);
    let h = filled(&mut registry, 4, &[1, 2, 3, 4, 5]);
    assert_eq!(registry.capacity(h).unwrap(), 8);

    while registry.len(h).unwrap() > 0 {
        registry.pop(h).unwrap();
    }
    assert_eq!(registry.capacity(h).unwrap(), 4);
}

#[test]
fn test_capacity_one_grows_on_each_power_of_two() {
    let mut c = container_with(1, ShrinkPolicy::Exact);
    let mut caps = Vec::new();
    for v in 0..9 {
        c.push(v).unwrap();
        caps.push(c.capacity());
    }
    assert_eq!(caps, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
}

#[test]
fn test_extreme_values_round_trip() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 1, &[i64::MIN, 0, -1, i64::MAX]);
    assert_eq!(registry.pop(h).unwrap(), i64::MAX);
    assert_eq!(registry.pop(h).unwrap(), -1);
    assert_eq!(registry.pop(h).unwrap(), 0);
    assert_eq!(registry.pop(h).unwrap(), i64::MIN);
}

#[test]
fn test_underflow_is_sticky() {
    let mut registry = guarded_registry();
    let h = registry.create(1).unwrap();
    assert_eq!(registry.pop(h), Err(StackError::Underflow));

    let flags = registry.flags(h).unwrap();
    assert!(flags.contains(ErrorFlags::UNDERFLOW | ErrorFlags::INVALID));
    assert!(matches!(registry.push(h, 1), Err(StackError::Invalid { .. })));

    // Still destroyable.
    registry.destroy(h).unwrap();
}

#[test]
fn test_peek_does_not_remove() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 2, &[5, 6]);
    assert_eq!(registry.peek(h).unwrap(), Some(6));
    assert_eq!(registry.len(h).unwrap(), 2);
    registry.pop(h).unwrap();
    registry.pop(h).unwrap();
    assert_eq!(registry.peek(h).unwrap(), None);
}

#[test]
fn test_zero_capacity_rejected() {
    let mut registry = guarded_registry();
    assert_eq!(registry.create(0), Err(StackError::InvalidCapacity));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn test_out_of_memory_leaves_no_container() {
    let mut registry = guarded_registry();
    let err = registry.create(usize::MAX / 2).unwrap_err();
    assert!(matches!(err, StackError::OutOfMemory { .. }));
    assert_eq!(err.errno(), 12);
    assert_eq!(registry.live_count(), 0);
}
