// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for container invariants.
//!
//! These are debug-mode assertions run after every mutation that passed
//! validation. They:
//!
//! 1. Are **zero-cost in release builds** (use `debug_assert!`)
//! 2. Catch bugs in this crate, not corruption from outside: the integrity
//!    engine already reported that as `Invalid` before we get here
//!
//! # INVARIANTS (DO NOT REMOVE THESE CHECKS)
//!
//! | Contract                     | Invariant                               |
//! |------------------------------|-----------------------------------------|
//! | `check_block_well_formed`    | `size ≤ capacity`, `capacity > 0`       |
//! |                              | buffer holds exactly `capacity` slots   |
//! |                              | guard words hold the sentinel           |
//! | `check_vacated_slots_zeroed` | every slot at or past `size` is zero    |

// ============================================================================
// COMPILE-TIME ASSERTIONS (evaluated at build time)
// ============================================================================

const _: () = {
    // Guard words share the element width, so the sentinel must fit in one.
    assert!(crate::types::GUARD_SENTINEL <= i64::MAX as u64);
    // The poison value must never be mistaken for an intact canary.
    assert!(crate::types::POISON != crate::types::GUARD_SENTINEL);
};

use crate::container::ControlBlock;

/// Check the structural invariants of a validated block.
///
/// # Panics (debug builds only)
/// Panics if any invariant in the table above is violated.
#[inline]
pub fn check_block_well_formed(block: &ControlBlock) {
    debug_assert!(
        block.size() <= block.capacity(),
        "Contract violation: size {} > capacity {}",
        block.size(),
        block.capacity()
    );
    debug_assert!(
        block.capacity() > 0,
        "Contract violation: capacity is zero on a live container"
    );
    debug_assert_eq!(
        block.buffer().capacity(),
        block.capacity(),
        "Contract violation: buffer slots != capacity"
    );
    debug_assert!(
        block.buffer().guards_intact(),
        "Contract violation: guard words overwritten on a validated block"
    );
    check_vacated_slots_zeroed(block);
}

/// Slots past the top are zero: pops clear what they vacate, growth
/// zero-fills.
#[inline]
pub fn check_vacated_slots_zeroed(block: &ControlBlock) {
    if cfg!(debug_assertions) {
        let slots = block.buffer().slots();
        for (i, &value) in slots.iter().enumerate().skip(block.size()) {
            debug_assert!(
                value == 0,
                "Contract violation: unused slot [{}] holds {}",
                i,
                value
            );
        }
    }
}
