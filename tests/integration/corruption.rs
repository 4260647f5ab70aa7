//! Out-of-band corruption: every kind is caught by the next operation.

use super::common::{assert_invalid, filled, guarded_registry};
use guardstack::testing::Target;
use guardstack::{dump, ErrorFlags, Registry, StackError, Unguarded};

#[test]
fn test_every_target_detected_on_next_push() {
    for target in Target::ALL {
        let mut registry = guarded_registry();
        let h = filled(&mut registry, 4, &[11, 22]);

        target.apply(&mut registry.tamper(h).unwrap());
        let flags = assert_invalid(registry.push(h, 33));
        assert!(flags.is_invalid(), "{:?} not flagged", target);
        assert_eq!(registry.flags(h).unwrap(), flags);
    }
}

#[test]
fn test_every_target_detected_on_next_pop() {
    for target in Target::ALL {
        let mut registry = guarded_registry();
        let h = filled(&mut registry, 4, &[11, 22]);

        target.apply(&mut registry.tamper(h).unwrap());
        assert_invalid(registry.pop(h));
    }
}

#[test]
fn test_corruption_is_sticky_after_repair() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 4, &[1]);

    registry.tamper(h).unwrap().right_guard(0);
    assert_invalid(registry.push(h, 2));

    // Putting the sentinel back does not clear the verdict.
    registry
        .tamper(h)
        .unwrap()
        .right_guard(guardstack::GUARD_SENTINEL);
    assert_invalid(registry.push(h, 2));
    assert_invalid(registry.verify(h));
}

#[test]
fn test_size_beyond_capacity_sets_overflow() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 2, &[1]);

    registry.tamper(h).unwrap().size(99);
    let flags = assert_invalid(registry.pop(h));
    assert!(flags.has_overflow());
}

#[test]
fn test_zero_capacity_sets_flag() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 2, &[]);

    registry.tamper(h).unwrap().capacity(0);
    let flags = assert_invalid(registry.push(h, 1));
    assert!(flags.has_zero_capacity());
}

#[test]
fn test_checksum_field_tamper_detected() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 2, &[7]);

    registry.tamper(h).unwrap().content_checksum(0x1234);
    assert_invalid(registry.verify(h));
}

#[test]
fn test_dump_still_works_on_corrupted_stack() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 2, &[7, 8]);
    registry.tamper(h).unwrap().left_guard(0);
    assert_invalid(registry.push(h, 9));

    let snap = dump!(registry, h).unwrap();
    assert_eq!(snap.left_guard, Some(0));
    assert!(snap.flags.contains(ErrorFlags::INVALID));
    assert!(snap.to_string().contains("GUARD_LEFT  = 0x0;"));
}

#[test]
fn test_unguarded_engine_never_reports_corruption() {
    let mut registry: Registry<Unguarded> = Registry::default();
    let h = registry.create(4).unwrap();
    registry.push(h, 1).unwrap();

    registry.tamper(h).unwrap().right_guard(0).left_guard(0);
    registry.push(h, 2).unwrap();
    assert_eq!(registry.pop(h).unwrap(), 2);
    assert_eq!(registry.flags(h).unwrap(), ErrorFlags::empty());
}

#[test]
fn test_unguarded_still_reports_underflow() {
    let mut registry: Registry<Unguarded> = Registry::default();
    let h = registry.create(1).unwrap();
    assert_eq!(registry.pop(h), Err(StackError::Underflow));
}
