// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for random operation sequences through the registry.
//!
//! Any mix of create/push/pop/destroy on any handle, live or stale, must come
//! back as Ok or a typed error. Healthy stacks must always agree with a Vec
//! model; tampered stacks must fail on their next operation.

#![no_main]

use arbitrary::Arbitrary;
use guardstack::{Guarded, Handle, Registry, StackError};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Create { capacity: u8 },
    Push { slot: u8, value: i64 },
    Pop { slot: u8 },
    Destroy { slot: u8 },
    Tamper { slot: u8, byte: u16 },
}

struct Tracked {
    handle: Handle,
    model: Vec<i64>,
    tampered: bool,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut registry: Registry<Guarded> = Registry::default();
    let mut live: Vec<Tracked> = Vec::new();
    let mut dead: Vec<Handle> = Vec::new();

    for op in ops.into_iter().take(512) {
        match op {
            Op::Create { capacity } => match registry.create(capacity as usize) {
                Ok(handle) => live.push(Tracked {
                    handle,
                    model: Vec::new(),
                    tampered: false,
                }),
                Err(err) => assert_eq!(err, StackError::InvalidCapacity),
            },
            Op::Push { slot, value } => {
                let Some(t) = pick(&mut live, slot) else { continue };
                let result = registry.push(t.handle, value);
                if t.tampered {
                    assert!(matches!(result, Err(StackError::Invalid { .. })));
                } else {
                    result.unwrap();
                    t.model.push(value);
                }
            }
            Op::Pop { slot } => {
                let Some(t) = pick(&mut live, slot) else { continue };
                let result = registry.pop(t.handle);
                if t.tampered {
                    assert!(result.is_err());
                } else if let Some(expected) = t.model.pop() {
                    assert_eq!(result.unwrap(), expected);
                } else {
                    assert_eq!(result, Err(StackError::Underflow));
                    t.tampered = true; // underflow is sticky
                }
            }
            Op::Destroy { slot } => {
                if live.is_empty() {
                    continue;
                }
                let t = live.swap_remove(slot as usize % live.len());
                registry.destroy(t.handle).unwrap();
                dead.push(t.handle);
            }
            Op::Tamper { slot, byte } => {
                let Some(t) = pick(&mut live, slot) else { continue };
                let capacity = registry.capacity(t.handle).unwrap();
                let byte = byte as usize % (capacity * 8);
                registry.tamper(t.handle).unwrap().flip_payload_byte(byte);
                t.tampered = true;
            }
        }
    }

    for handle in dead {
        assert!(matches!(registry.pop(handle), Err(StackError::InvalidHandle(_))));
    }
});

fn pick(live: &mut [Tracked], slot: u8) -> Option<&mut Tracked> {
    if live.is_empty() {
        return None;
    }
    let index = slot as usize % live.len();
    live.get_mut(index)
}
