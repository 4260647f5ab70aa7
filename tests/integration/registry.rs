//! Handle lifecycle through the registry.

use super::common::{filled, guarded_registry};
use guardstack::{Config, Guarded, Handle, Registry, StackError};

#[test]
fn test_handles_are_distinct_and_independent() {
    let mut registry = guarded_registry();
    let a = filled(&mut registry, 2, &[1, 2, 3]);
    let b = filled(&mut registry, 2, &[100]);
    assert_ne!(a, b);
    assert!(!a.is_none() && !b.is_none());

    assert_eq!(registry.pop(b).unwrap(), 100);
    assert_eq!(registry.len(a).unwrap(), 3);
    assert_eq!(registry.pop(a).unwrap(), 3);
}

#[test]
fn test_none_handle_never_resolves() {
    let mut registry = guarded_registry();
    let _ = registry.create(1).unwrap();
    assert_eq!(
        registry.push(Handle::NONE, 1),
        Err(StackError::InvalidHandle(Handle::NONE))
    );
    assert_eq!(registry.destroy(Handle::NONE), Err(StackError::InvalidHandle(Handle::NONE)));
}

#[test]
fn test_forged_handles_rejected() {
    let mut registry = guarded_registry();
    let h = registry.create(1).unwrap();
    for raw in [h.raw() + 1, h.raw() | (7 << 32), u64::MAX, 12_345] {
        let forged = Handle::from_raw(raw);
        assert!(matches!(registry.pop(forged), Err(StackError::InvalidHandle(_))));
    }
}

#[test]
fn test_destroyed_handle_stays_dead_after_reuse() {
    let mut registry = guarded_registry();
    let old = filled(&mut registry, 2, &[1]);
    registry.destroy(old).unwrap();

    let new = registry.create(2).unwrap();
    assert_ne!(old, new);
    assert_eq!(registry.push(old, 5), Err(StackError::InvalidHandle(old)));
    assert_eq!(registry.destroy(old), Err(StackError::InvalidHandle(old)));

    registry.push(new, 5).unwrap();
    assert_eq!(registry.pop(new).unwrap(), 5);
}

#[test]
fn test_double_destroy_is_invalid_handle() {
    let mut registry = guarded_registry();
    let h = registry.create(3).unwrap();
    registry.destroy(h).unwrap();
    let err = registry.destroy(h).unwrap_err();
    assert_eq!(err, StackError::InvalidHandle(h));
    assert_eq!(err.errno(), 22);
}

#[test]
fn test_container_limit() {
    let mut registry: Registry<Guarded> = Registry::new(Config {
        max_containers: 3,
        ..Config::default()
    });
    let handles: Vec<_> = (0..3).map(|_| registry.create(1).unwrap()).collect();

    let err = registry.create(1).unwrap_err();
    assert_eq!(err, StackError::TooManyContainers { limit: 3 });
    assert_eq!(err.errno(), 24);

    registry.destroy(handles[1]).unwrap();
    registry.create(1).unwrap();
    assert_eq!(registry.live_count(), 3);
}

#[test]
fn test_many_create_destroy_cycles_do_not_grow_table() {
    let mut registry = guarded_registry();
    let keep = registry.create(1).unwrap();
    let h = registry.create(1).unwrap();
    registry.destroy(h).unwrap();
    let table = registry.slot_count();

    for _ in 0..1000 {
        let h = registry.create(4).unwrap();
        registry.push(h, 1).unwrap();
        registry.destroy(h).unwrap();
    }
    assert_eq!(registry.slot_count(), table);
    assert_eq!(registry.handles().collect::<Vec<_>>(), vec![keep]);
}

#[test]
fn test_slot_table_grows_past_initial_size() {
    let mut registry = guarded_registry();
    let handles: Vec<_> = (0..100).map(|i| filled(&mut registry, 1, &[i])).collect();
    assert_eq!(registry.live_count(), 100);
    assert!(registry.slot_count() > 100);

    for (i, h) in handles.iter().enumerate() {
        assert_eq!(registry.pop(*h).unwrap(), i as i64);
    }
}

#[test]
fn test_destroy_with_live_elements() {
    let mut registry = guarded_registry();
    let h = filled(&mut registry, 4, &[1, 2, 3]);
    registry.destroy(h).unwrap();
    assert_eq!(registry.live_count(), 0);
    assert!(matches!(registry.len(h), Err(StackError::InvalidHandle(_))));
}
