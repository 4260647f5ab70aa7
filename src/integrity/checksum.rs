// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Checksums over raw byte sequences.
//!
//! The default is a polynomial hash, `Σ byte[i] · 257^i` in wrapping `u64`
//! arithmetic. It is order-sensitive and cheap, and it is not meant to stop
//! anyone who is trying: it catches stray writes, not tampering. CRC-32 is
//! available for callers who want a better-studied code at a similar cost.

use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};

/// Base of the polynomial hash. Odd, so every power is invertible mod 2^64.
pub const POLY_BASE: u64 = 257;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumKind {
    #[default]
    Polynomial,
    Crc32,
}

impl ChecksumKind {
    pub fn digest<I>(self, bytes: I) -> u64
    where
        I: IntoIterator<Item = u8>,
    {
        match self {
            ChecksumKind::Polynomial => poly_hash(bytes),
            ChecksumKind::Crc32 => {
                let mut hasher = Crc32Hasher::new();
                for byte in bytes {
                    hasher.update(&[byte]);
                }
                u64::from(hasher.finalize())
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChecksumKind::Polynomial => "polynomial",
            ChecksumKind::Crc32 => "crc32",
        }
    }
}

/// Polynomial hash with base [`POLY_BASE`].
pub fn poly_hash<I>(bytes: I) -> u64
where
    I: IntoIterator<Item = u8>,
{
    let (hash, _) = bytes
        .into_iter()
        .fold((0u64, 1u64), |(hash, power), byte| {
            (
                hash.wrapping_add(u64::from(byte).wrapping_mul(power)),
                power.wrapping_mul(POLY_BASE),
            )
        });
    hash
}
