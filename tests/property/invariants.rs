//! Invariants that hold after every operation of any sequence.

use super::common::{assert_container_well_formed, assert_invalid, container_with, guarded_registry};
use guardstack::testing::Target;
use guardstack::{ShrinkPolicy, StackError};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
}

fn value_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(i64::MIN),
        Just(i64::MAX),
        Just(0),
        Just(-1),
        any::<i64>(),
    ]
}

/// Pushes outnumber pops so sequences climb through several resizes.
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => value_strategy().prop_map(Op::Push),
        2 => Just(Op::Pop),
    ]
}

fn shrink_strategy() -> impl Strategy<Value = ShrinkPolicy> {
    prop_oneof![Just(ShrinkPolicy::Exact), Just(ShrinkPolicy::Threshold)]
}

fn target_strategy() -> impl Strategy<Value = Target> {
    prop::sample::select(Target::ALL.to_vec())
}

// ============================================================================
// MODEL-BASED PROPERTIES
// ============================================================================

proptest! {
    /// Contents match a Vec model and every invariant holds after each op.
    #[test]
    fn prop_matches_vec_model(
        capacity in 1usize..16,
        shrink in shrink_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let mut c = container_with(capacity, shrink);
        let mut model: Vec<i64> = Vec::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    c.push(v).unwrap();
                    model.push(v);
                }
                Op::Pop => {
                    // Underflow poisons the container; the model stops at empty.
                    if model.is_empty() {
                        continue;
                    }
                    prop_assert_eq!(c.pop().unwrap(), model.pop().unwrap());
                }
            }
            prop_assert_eq!(c.as_slice(), model.as_slice());
            prop_assert!(c.verify().is_ok());
            assert_container_well_formed(&c);
        }
    }

    /// size == pushes - pops for any sequence that never underflows.
    #[test]
    fn prop_size_counts_pushes_minus_pops(
        pushes in 0usize..100,
        pops_fraction in 0.0f64..=1.0,
    ) {
        let mut registry = guarded_registry();
        let h = registry.create(1).unwrap();
        for i in 0..pushes {
            registry.push(h, i as i64).unwrap();
        }
        let pops = (pushes as f64 * pops_fraction) as usize;
        for _ in 0..pops {
            registry.pop(h).unwrap();
        }
        prop_assert_eq!(registry.len(h).unwrap(), pushes - pops);
        prop_assert!(registry.capacity(h).unwrap() >= registry.len(h).unwrap());
    }

    /// Push then pop returns the pushed value, including the extremes.
    #[test]
    fn prop_push_pop_round_trip(
        prefix in prop::collection::vec(value_strategy(), 0..20),
        value in value_strategy(),
    ) {
        let mut registry = guarded_registry();
        let h = registry.create(1).unwrap();
        for v in &prefix {
            registry.push(h, *v).unwrap();
        }
        let before = registry.len(h).unwrap();
        registry.push(h, value).unwrap();
        prop_assert_eq!(registry.pop(h).unwrap(), value);
        prop_assert_eq!(registry.len(h).unwrap(), before);
    }

    /// Popping more than was pushed always ends in Underflow, never a value.
    #[test]
    fn prop_extra_pop_underflows(pushes in 0usize..20) {
        let mut registry = guarded_registry();
        let h = registry.create(2).unwrap();
        for i in 0..pushes {
            registry.push(h, i as i64).unwrap();
        }
        for _ in 0..pushes {
            registry.pop(h).unwrap();
        }
        prop_assert_eq!(registry.pop(h), Err(StackError::Underflow));
        prop_assert_eq!(registry.len(h).unwrap(), 0);
    }

    /// Any out-of-band corruption is caught within one operation.
    #[test]
    fn prop_corruption_caught_within_one_op(
        target in target_strategy(),
        values in prop::collection::vec(any::<i64>(), 2..12),
        next_is_push in any::<bool>(),
    ) {
        let mut registry = guarded_registry();
        let h = registry.create(2).unwrap();
        for v in &values {
            registry.push(h, *v).unwrap();
        }
        target.apply(&mut registry.tamper(h).unwrap());

        if next_is_push {
            assert_invalid(registry.push(h, 0));
        } else {
            assert_invalid(registry.pop(h));
        }
    }
}
