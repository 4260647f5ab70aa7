// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Capacity management: when to resize, and how.
//!
//! Growth doubles when a push finds the buffer full. Shrinking halves when the
//! load factor drops to 25%. The gap between the two triggers (full vs. a
//! quarter) is what keeps a push/pop pair at the boundary from reallocating
//! every time, and it makes both operations amortized O(1).
//!
//! Resizing never happens in place. A new buffer is allocated, the slots are
//! copied, and only then is the old buffer released. If the allocation fails
//! the container is exactly as it was.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::container::ControlBlock;
use crate::error::{Result, StackError};
use crate::integrity::IntegrityEngine;

/// When a pop may halve the capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShrinkPolicy {
    /// Only at exactly 25% load: `size * 4 == capacity`.
    #[default]
    Exact,
    /// At or below 25% load: `size * 4 <= capacity`.
    Threshold,
}

impl ShrinkPolicy {
    pub fn triggers(self, size: usize, capacity: usize) -> bool {
        let Some(scaled) = size.checked_mul(4) else {
            return false;
        };
        match self {
            ShrinkPolicy::Exact => scaled == capacity,
            ShrinkPolicy::Threshold => scaled <= capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    /// Floor for shrinking. Always at least 1.
    pub min_capacity: usize,
    pub shrink: ShrinkPolicy,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            min_capacity: 1,
            shrink: ShrinkPolicy::Exact,
        }
    }
}

impl CapacityPolicy {
    pub fn new(min_capacity: usize, shrink: ShrinkPolicy) -> Self {
        Self {
            min_capacity: min_capacity.max(1),
            shrink,
        }
    }

    pub fn should_grow(&self, size: usize, capacity: usize) -> bool {
        size == capacity
    }

    pub fn should_shrink(&self, size: usize, capacity: usize) -> bool {
        self.shrink.triggers(size, capacity) && capacity / 2 >= self.min_capacity.max(1)
    }
}

/// Double the capacity of a full block.
///
/// Returns `Ok(false)` without touching anything if the block is not full.
pub fn grow<E: IntegrityEngine>(
    block: &mut ControlBlock,
    policy: &CapacityPolicy,
    engine: &E,
) -> Result<bool> {
    if !policy.should_grow(block.size, block.capacity) {
        return Ok(false);
    }
    let new_capacity = block
        .capacity
        .checked_mul(2)
        .ok_or(StackError::OutOfMemory {
            requested: usize::MAX,
        })?;
    replace_buffer(block, new_capacity, engine)?;
    debug!("grew stack to capacity {}", new_capacity);
    Ok(true)
}

/// Halve the capacity if the shrink policy fires and the floor allows it.
pub fn shrink<E: IntegrityEngine>(
    block: &mut ControlBlock,
    policy: &CapacityPolicy,
    engine: &E,
) -> Result<bool> {
    if !policy.should_shrink(block.size, block.capacity) {
        return Ok(false);
    }
    let new_capacity = block.capacity / 2;
    replace_buffer(block, new_capacity, engine)?;
    debug!("shrank stack to capacity {}", new_capacity);
    Ok(true)
}

fn replace_buffer<E: IntegrityEngine>(
    block: &mut ControlBlock,
    new_capacity: usize,
    engine: &E,
) -> Result<()> {
    let next = block.buffer.try_resized(new_capacity)?;
    block.buffer = next;
    block.capacity = new_capacity;
    engine.seal(block);
    Ok(())
}
