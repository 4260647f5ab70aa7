// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The integrity engine: guard words and checksums.
//!
//! Two engines sit behind one trait:
//!
//! 1. **`Guarded`** seals every mutation with a content checksum and a
//!    structure checksum, and on validation compares them, the guard words
//!    around the payload, and the canaries around the control block.
//!
//! 2. **`Unguarded`** does nothing. Guard words are still physically written
//!    (the buffer always has them), but nobody looks at them.
//!
//! Containers are generic over the engine, so the unguarded build pays for
//! none of the hashing. The cargo feature `unguarded` flips [`DefaultEngine`].
//!
//! # What each check catches
//!
//! | Check                        | Catches                                  |
//! |------------------------------|------------------------------------------|
//! | guard words                  | writes running off either end of slots   |
//! | control-block canaries       | writes running over the control block    |
//! | content checksum             | stray writes inside the payload          |
//! | structure checksum           | corrupted size, capacity, buffer swap    |

pub mod checksum;

use std::fmt;

use crate::config::Config;
use crate::container::ControlBlock;
use crate::types::{ErrorFlags, GUARD_SENTINEL};

pub use checksum::{poly_hash, ChecksumKind, POLY_BASE};

/// Seals and validates a container's control block.
///
/// `validate_*` return `true` when the block is sound. On failure they record
/// what they found in `block.flags`, always including `INVALID`.
pub trait IntegrityEngine: fmt::Debug {
    /// Short name shown in diagnostic reports.
    const NAME: &'static str;

    /// Whether a successful validation actually proves anything.
    const VERIFIES: bool;

    fn from_config(config: &Config) -> Self
    where
        Self: Sized;

    /// Checksum algorithm behind the digests, if the engine computes any.
    fn checksum(&self) -> Option<ChecksumKind> {
        None
    }

    /// Recompute and store both checksums after a mutation.
    fn seal(&self, block: &mut ControlBlock);

    fn validate_structure(&self, block: &mut ControlBlock) -> bool;

    fn validate_content(&self, block: &mut ControlBlock) -> bool;

    /// Structure first; content only if the structure is sound.
    fn validate(&self, block: &mut ControlBlock) -> bool {
        self.validate_structure(block) && self.validate_content(block)
    }
}

#[cfg(not(feature = "unguarded"))]
pub type DefaultEngine = Guarded;

#[cfg(feature = "unguarded")]
pub type DefaultEngine = Unguarded;

// ============================================================================
// GUARDED
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Guarded {
    checksum: ChecksumKind,
}

impl Guarded {
    pub fn new(checksum: ChecksumKind) -> Self {
        Self { checksum }
    }

    pub fn checksum_kind(&self) -> ChecksumKind {
        self.checksum
    }

    pub fn content_digest(&self, block: &ControlBlock) -> u64 {
        self.checksum.digest(block.buffer.slot_bytes())
    }

    /// Digest of every control field except `structure_checksum` itself and
    /// the flags, which validation is allowed to change.
    pub fn structure_digest(&self, block: &ControlBlock) -> u64 {
        let words = [
            block.canary_left,
            block.size as u64,
            block.capacity as u64,
            block.buffer.address() as u64,
            block.buffer.capacity() as u64,
            block.content_checksum,
            block.canary_right,
        ];
        self.checksum
            .digest(words.iter().flat_map(|w| w.to_ne_bytes()))
    }
}

impl IntegrityEngine for Guarded {
    const NAME: &'static str = "guarded";
    const VERIFIES: bool = true;

    fn from_config(config: &Config) -> Self {
        Self::new(config.checksum)
    }

    fn checksum(&self) -> Option<ChecksumKind> {
        Some(self.checksum_kind())
    }

    fn seal(&self, block: &mut ControlBlock) {
        block.content_checksum = self.content_digest(block);
        block.structure_checksum = self.structure_digest(block);
    }

    fn validate_structure(&self, block: &mut ControlBlock) -> bool {
        let mut found = ErrorFlags::empty();
        if block.buffer.is_empty_storage() {
            found |= ErrorFlags::EMPTY_DATA;
        }
        if block.capacity == 0 {
            found |= ErrorFlags::ZERO_CAPACITY;
        }
        if block.size > block.capacity {
            found |= ErrorFlags::OVERFLOW;
        }

        let sound = found.is_empty()
            && block.canary_left == GUARD_SENTINEL
            && block.canary_right == GUARD_SENTINEL
            && block.buffer.capacity() == block.capacity
            && block.buffer.guards_intact()
            && self.structure_digest(block) == block.structure_checksum;

        if !sound {
            block.flags |= found | ErrorFlags::INVALID;
        }
        sound
    }

    fn validate_content(&self, block: &mut ControlBlock) -> bool {
        let sound =
            block.buffer.guards_intact() && self.content_digest(block) == block.content_checksum;
        if !sound {
            block.flags |= ErrorFlags::INVALID;
        }
        sound
    }
}

// ============================================================================
// UNGUARDED
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unguarded;

impl IntegrityEngine for Unguarded {
    const NAME: &'static str = "unguarded";
    const VERIFIES: bool = false;

    fn from_config(_config: &Config) -> Self {
        Unguarded
    }

    fn seal(&self, _block: &mut ControlBlock) {}

    fn validate_structure(&self, _block: &mut ControlBlock) -> bool {
        true
    }

    fn validate_content(&self, _block: &mut ControlBlock) -> bool {
        true
    }
}
