// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The self-verifying stack.
//!
//! A `Container` is a LIFO buffer of `i64` that checks itself on the way in
//! and on the way out of every mutation. If something scribbled over its
//! payload or its bookkeeping since the last operation, the next operation
//! notices and fails with `Invalid`, so the blame lands on whatever ran in
//! between rather than on some later, innocent caller.
//!
//! Once a container has seen corruption it stays invalid. There is no repair
//! path: destroy it and make a new one.

use log::warn;

use crate::buffer::GuardedBuffer;
use crate::capacity::{self, CapacityPolicy};
use crate::contracts;
use crate::error::{Result, StackError};
use crate::integrity::{DefaultEngine, IntegrityEngine};
use crate::testing::Tamper;
use crate::types::{Element, ErrorFlags, GUARD_SENTINEL, POISON};

// ============================================================================
// CONTROL BLOCK
// ============================================================================

/// Bookkeeping for one container, bracketed by its own canaries.
///
/// Field order mirrors the order the structure checksum walks them.
#[derive(Debug)]
pub struct ControlBlock {
    pub(crate) canary_left: u64,
    pub(crate) size: usize,
    pub(crate) capacity: usize,
    pub(crate) buffer: GuardedBuffer,
    pub(crate) content_checksum: u64,
    pub(crate) structure_checksum: u64,
    pub(crate) flags: ErrorFlags,
    pub(crate) canary_right: u64,
}

impl ControlBlock {
    /// Empty, unsealed block around `buffer`.
    pub(crate) fn new(buffer: GuardedBuffer) -> Self {
        Self {
            canary_left: GUARD_SENTINEL,
            size: 0,
            capacity: buffer.capacity(),
            buffer,
            content_checksum: 0,
            structure_checksum: 0,
            flags: ErrorFlags::empty(),
            canary_right: GUARD_SENTINEL,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn buffer(&self) -> &GuardedBuffer {
        &self.buffer
    }

    pub fn canaries(&self) -> (u64, u64) {
        (self.canary_left, self.canary_right)
    }

    pub fn checksums(&self) -> (u64, u64) {
        (self.content_checksum, self.structure_checksum)
    }

    pub fn flags(&self) -> ErrorFlags {
        self.flags
    }
}

// ============================================================================
// CONTAINER
// ============================================================================

#[derive(Debug)]
pub struct Container<E: IntegrityEngine = DefaultEngine> {
    block: ControlBlock,
    policy: CapacityPolicy,
    engine: E,
}

impl<E: IntegrityEngine + Default> Container<E> {
    /// Container with the default capacity policy and engine settings.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_engine(capacity, CapacityPolicy::default(), E::default())
    }
}

impl<E: IntegrityEngine> Container<E> {
    /// Allocate `capacity` slots plus guards and seal the empty stack.
    pub fn with_engine(capacity: usize, policy: CapacityPolicy, engine: E) -> Result<Self> {
        if capacity == 0 {
            return Err(StackError::InvalidCapacity);
        }
        let buffer = GuardedBuffer::try_with_capacity(capacity)?;
        let mut block = ControlBlock::new(buffer);
        engine.seal(&mut block);

        let mut container = Self {
            block,
            policy,
            engine,
        };
        container.check("construct")?;
        Ok(container)
    }

    pub fn push(&mut self, value: Element) -> Result<()> {
        self.check("push")?;

        capacity::grow(&mut self.block, &self.policy, &self.engine)?;

        let size = self.block.size;
        let Some(slot) = self.block.buffer.slots_mut().get_mut(size) else {
            return Err(self.mark_overflow("push"));
        };
        *slot = value;
        self.block.size = size + 1;
        self.engine.seal(&mut self.block);

        self.check("push")?;
        self.assert_contracts();
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Element> {
        self.check("pop")?;

        if self.block.size == 0 {
            self.block.flags |= ErrorFlags::UNDERFLOW | ErrorFlags::INVALID;
            warn!("pop on empty stack");
            return Err(StackError::Underflow);
        }

        let top = self.block.size - 1;
        let Some(slot) = self.block.buffer.slots_mut().get_mut(top) else {
            return Err(self.mark_overflow("pop"));
        };
        let value = std::mem::take(slot);
        self.block.size = top;
        self.engine.seal(&mut self.block);

        // A refused shrink only costs memory; the pop itself already happened.
        if let Err(err) = capacity::shrink(&mut self.block, &self.policy, &self.engine) {
            warn!("shrink skipped: {}", err);
        }

        self.check("pop")?;
        self.assert_contracts();
        Ok(value)
    }

    /// Top element without removing it.
    pub fn peek(&mut self) -> Result<Option<Element>> {
        self.check("peek")?;
        Ok(self.as_slice().last().copied())
    }

    /// Run both validation passes without mutating anything else.
    pub fn verify(&mut self) -> Result<()> {
        self.check("verify")
    }

    /// Release the buffer and poison the control block.
    ///
    /// Any later push or pop fails with `Invalid`.
    pub fn destruct(&mut self) {
        let block = &mut self.block;
        block.size = 0;
        block.capacity = 0;
        block.buffer = GuardedBuffer::empty();
        block.canary_left = POISON;
        block.canary_right = POISON;
        block.content_checksum = 0;
        block.structure_checksum = 0;
        block.flags = ErrorFlags::DESTROYED
            | ErrorFlags::INVALID
            | ErrorFlags::EMPTY_DATA
            | ErrorFlags::ZERO_CAPACITY;
    }

    pub fn len(&self) -> usize {
        self.block.size
    }

    pub fn is_empty(&self) -> bool {
        self.block.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.block.capacity
    }

    pub fn flags(&self) -> ErrorFlags {
        self.block.flags
    }

    /// Live elements, bottom first.
    pub fn as_slice(&self) -> &[Element] {
        let slots = self.block.buffer.slots();
        &slots[..self.block.size.min(slots.len())]
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn control_block(&self) -> &ControlBlock {
        &self.block
    }

    /// Raw write access that bypasses sealing. See [`crate::testing`].
    #[doc(hidden)]
    pub fn tamper(&mut self) -> Tamper<'_> {
        Tamper::new(&mut self.block)
    }

    /// Sticky check first, then structure, then content.
    fn check(&mut self, op: &'static str) -> Result<()> {
        if self.block.flags.is_invalid() {
            return Err(StackError::Invalid {
                flags: self.block.flags,
            });
        }
        if !self.engine.validate(&mut self.block) {
            warn!("{}: corrupted stack detected ({})", op, self.block.flags);
            return Err(StackError::Invalid {
                flags: self.block.flags,
            });
        }
        Ok(())
    }

    fn mark_overflow(&mut self, op: &'static str) -> StackError {
        self.block.flags |= ErrorFlags::OVERFLOW | ErrorFlags::INVALID;
        warn!("{}: size {} outside buffer", op, self.block.size);
        StackError::Invalid {
            flags: self.block.flags,
        }
    }

    fn assert_contracts(&self) {
        if E::VERIFIES {
            contracts::check_block_well_formed(&self.block);
        }
    }
}
