// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Out-of-band corruption for tests, fuzzing and the `corrupt` demo.
//!
//! This module is always compiled but hidden from documentation. Every
//! method here writes straight into a container's memory without resealing,
//! which is exactly what a stray pointer would do. The next validated
//! operation on that container is expected to fail with `Invalid` (under the
//! guarded engine).

#![doc(hidden)]

use crate::container::ControlBlock;

/// Mutable access to the raw state of one container.
pub struct Tamper<'a> {
    block: &'a mut ControlBlock,
}

impl<'a> Tamper<'a> {
    pub(crate) fn new(block: &'a mut ControlBlock) -> Self {
        Self { block }
    }

    pub fn left_guard(&mut self, value: u64) -> &mut Self {
        self.block.buffer.overwrite_left_guard(value);
        self
    }

    pub fn right_guard(&mut self, value: u64) -> &mut Self {
        self.block.buffer.overwrite_right_guard(value);
        self
    }

    /// Overwrite one byte of the slot region (live or unused).
    pub fn payload_byte(&mut self, byte_index: usize, value: u8) -> &mut Self {
        self.block.buffer.overwrite_slot_byte(byte_index, value);
        self
    }

    /// Invert every bit of one slot-region byte, so the value always changes.
    pub fn flip_payload_byte(&mut self, byte_index: usize) -> &mut Self {
        let current = self.block.buffer.slot_bytes().nth(byte_index);
        if let Some(byte) = current {
            self.block.buffer.overwrite_slot_byte(byte_index, !byte);
        }
        self
    }

    pub fn size(&mut self, size: usize) -> &mut Self {
        self.block.size = size;
        self
    }

    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.block.capacity = capacity;
        self
    }

    pub fn canary_left(&mut self, value: u64) -> &mut Self {
        self.block.canary_left = value;
        self
    }

    pub fn canary_right(&mut self, value: u64) -> &mut Self {
        self.block.canary_right = value;
        self
    }

    pub fn content_checksum(&mut self, value: u64) -> &mut Self {
        self.block.content_checksum = value;
        self
    }
}

/// The corruption targets the CLI and tests iterate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    LeftGuard,
    RightGuard,
    Payload,
    Size,
    Capacity,
    Canary,
}

impl Target {
    pub const ALL: [Target; 6] = [
        Target::LeftGuard,
        Target::RightGuard,
        Target::Payload,
        Target::Size,
        Target::Capacity,
        Target::Canary,
    ];

    /// Apply a representative corruption of this kind.
    pub fn apply(self, tamper: &mut Tamper<'_>) {
        match self {
            Target::LeftGuard => tamper.left_guard(0),
            Target::RightGuard => tamper.right_guard(0x0BAD_F00D),
            Target::Payload => tamper.flip_payload_byte(0),
            Target::Size => tamper.size(1),
            Target::Capacity => tamper.capacity(3),
            Target::Canary => tamper.canary_right(0),
        };
    }
}
