// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for container and registry operations.
//!
//! Every operation returns one of these to its immediate caller. Nothing is
//! swallowed and nothing unwinds. `Invalid` is special: it reports a guard or
//! checksum mismatch, and the container that produced it keeps refusing
//! mutation until it is destroyed.

use thiserror::Error;

use crate::types::{ErrorFlags, Handle};

/// Result alias used throughout the crate.
pub type Result<T, E = StackError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// A container was requested with zero capacity.
    #[error("capacity must be greater than zero")]
    InvalidCapacity,

    /// Allocation or reallocation failed. `requested` is in elements.
    #[error("unable to allocate memory for {requested} elements")]
    OutOfMemory { requested: usize },

    /// The registry already holds as many containers as it may.
    #[error("container limit of {limit} reached")]
    TooManyContainers { limit: usize },

    /// The handle is 0, out of range, vacant, or from an older generation.
    #[error("invalid container handle {0}")]
    InvalidHandle(Handle),

    /// Pop on an empty container.
    #[error("stack underflow")]
    Underflow,

    /// The integrity engine found corruption, or the container was already
    /// marked invalid.
    #[error("corrupted container ({flags})")]
    Invalid { flags: ErrorFlags },
}

impl StackError {
    /// Closest errno-style code, for callers bridging to C conventions.
    pub fn errno(&self) -> i32 {
        const EINVAL: i32 = 22;
        const ENOMEM: i32 = 12;
        const EMFILE: i32 = 24;
        match self {
            StackError::OutOfMemory { .. } => ENOMEM,
            StackError::TooManyContainers { .. } => EMFILE,
            _ => EINVAL,
        }
    }
}
