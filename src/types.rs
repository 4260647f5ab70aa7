// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Core value types shared by every layer.
//!
//! Nothing in here owns memory. `Handle` is the opaque integer callers pass
//! around instead of references, `ErrorFlags` is the diagnosis a container
//! carries, and the sentinel constants are the values the guard words must
//! hold for a container to count as intact.

use std::fmt;

use bitflags::bitflags;
use serde::{Serialize, Serializer};

/// The one element type every container stores.
pub type Element = i64;

/// Value written into every guard word and control-block canary.
pub const GUARD_SENTINEL: u64 = 0xB1BA_B0BA;

/// Value a destroyed container's canaries are overwritten with.
pub const POISON: u64 = 0xDEAD_DEAD;

// ============================================================================
// HANDLE
// ============================================================================

/// Opaque reference to a container owned by a [`Registry`](crate::Registry).
///
/// The low 32 bits hold the slot index, the high 32 bits the slot generation.
/// Slot 0 is never handed out, so the raw value 0 always means "no container".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The reserved "invalid / none" handle.
    pub const NONE: Handle = Handle(0);

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Handle((u64::from(generation) << 32) | u64::from(index))
    }

    /// Rebuild a handle from its integer form.
    pub fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    /// Integer form, suitable for passing across an API boundary.
    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn index(self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    pub(crate) fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "#none");
        }
        write!(f, "#{}g{}", self.index(), self.generation())
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

// ============================================================================
// ERROR FLAGS
// ============================================================================

bitflags! {
    /// Independent diagnoses recorded on a container.
    ///
    /// `INVALID` is the summary bit: it is set alongside any of the others and
    /// stays set until the container is destroyed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ErrorFlags: u8 {
        const INVALID       = 1 << 0;
        const EMPTY_DATA    = 1 << 1;
        const ZERO_CAPACITY = 1 << 2;
        const OVERFLOW      = 1 << 3;
        const UNDERFLOW     = 1 << 4;
        const DESTROYED     = 1 << 5;
    }
}

impl ErrorFlags {
    pub fn is_invalid(self) -> bool {
        self.contains(Self::INVALID)
    }

    pub fn has_empty_data(self) -> bool {
        self.contains(Self::EMPTY_DATA)
    }

    pub fn has_zero_capacity(self) -> bool {
        self.contains(Self::ZERO_CAPACITY)
    }

    pub fn has_overflow(self) -> bool {
        self.contains(Self::OVERFLOW)
    }

    pub fn has_underflow(self) -> bool {
        self.contains(Self::UNDERFLOW)
    }

    pub fn is_destroyed(self) -> bool {
        self.contains(Self::DESTROYED)
    }

    /// Lower-case names of every set flag, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "INVALID" => "invalid",
                "EMPTY_DATA" => "empty-data",
                "ZERO_CAPACITY" => "zero-capacity",
                "OVERFLOW" => "overflow",
                "UNDERFLOW" => "underflow",
                _ => "destroyed",
            })
            .collect()
    }
}

impl fmt::Display for ErrorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "ok");
        }
        write!(f, "{}", self.names().join("|"))
    }
}

impl Serialize for ErrorFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}
