// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Guarded element storage.
//!
//! One allocation, three regions:
//!
//! ```text
//! ┌─────────────┬──────────────────────────────┬──────────────┐
//! │ left guard  │  slot[0] … slot[capacity-1]  │ right guard  │
//! └─────────────┴──────────────────────────────┴──────────────┘
//!   word 0          words 1..=capacity            word capacity+1
//! ```
//!
//! The guard words sit directly next to the payload so a write that runs off
//! either end of the slots lands on a sentinel instead of on something else.
//! All offset math lives in this file; callers only see `slots()` and the two
//! guard accessors.

use crate::error::{Result, StackError};
use crate::types::{Element, GUARD_SENTINEL};

const ELEMENT_BYTES: usize = std::mem::size_of::<Element>();

#[cfg(test)]
thread_local! {
    static FAIL_NEXT_RESIZE: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

/// Make the next `try_resized` on this thread fail as if out of memory.
#[cfg(test)]
pub(crate) fn fail_next_resize() {
    FAIL_NEXT_RESIZE.with(|fail| fail.set(true));
}

#[derive(Debug)]
pub struct GuardedBuffer {
    words: Box<[Element]>,
}

impl GuardedBuffer {
    /// Allocate `capacity` zeroed slots bracketed by sentinel guards.
    ///
    /// Uses `try_reserve_exact`, so an impossible or refused allocation comes
    /// back as `OutOfMemory` instead of aborting the process.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let oom = StackError::OutOfMemory {
            requested: capacity,
        };
        let total = capacity.checked_add(2).ok_or(oom.clone())?;

        let mut words: Vec<Element> = Vec::new();
        words.try_reserve_exact(total).map_err(|_| oom)?;
        words.resize(total, 0);
        words[0] = GUARD_SENTINEL as Element;
        words[total - 1] = GUARD_SENTINEL as Element;

        Ok(Self {
            words: words.into_boxed_slice(),
        })
    }

    /// A buffer with no storage at all, used after destruction.
    pub fn empty() -> Self {
        Self {
            words: Box::default(),
        }
    }

    /// Copy into a freshly allocated buffer of `new_capacity` slots.
    ///
    /// Slots beyond the old capacity are zero. Slots beyond the new capacity
    /// are dropped. `self` is untouched whether this succeeds or not.
    pub fn try_resized(&self, new_capacity: usize) -> Result<Self> {
        #[cfg(test)]
        if FAIL_NEXT_RESIZE.with(|fail| fail.replace(false)) {
            return Err(StackError::OutOfMemory {
                requested: new_capacity,
            });
        }
        let mut next = Self::try_with_capacity(new_capacity)?;
        let keep = self.slots().len().min(new_capacity);
        next.slots_mut()[..keep].copy_from_slice(&self.slots()[..keep]);
        Ok(next)
    }

    pub fn is_empty_storage(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of element slots between the guards.
    pub fn capacity(&self) -> usize {
        self.words.len().saturating_sub(2)
    }

    pub fn slots(&self) -> &[Element] {
        match self.words.len() {
            0 | 1 => &[],
            n => &self.words[1..n - 1],
        }
    }

    pub fn slots_mut(&mut self) -> &mut [Element] {
        match self.words.len() {
            0 | 1 => &mut [],
            n => &mut self.words[1..n - 1],
        }
    }

    pub fn left_guard(&self) -> Option<u64> {
        self.words.first().map(|&w| w as u64)
    }

    pub fn right_guard(&self) -> Option<u64> {
        if self.words.len() < 2 {
            return None;
        }
        self.words.last().map(|&w| w as u64)
    }

    /// Both guard words present and holding the sentinel.
    pub fn guards_intact(&self) -> bool {
        self.left_guard() == Some(GUARD_SENTINEL) && self.right_guard() == Some(GUARD_SENTINEL)
    }

    /// Raw bytes of the slot region, in native byte order.
    pub fn slot_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots().iter().flat_map(|v| v.to_ne_bytes())
    }

    /// Address of the allocation, folded into the structure checksum so a
    /// swapped-out buffer is noticed.
    pub fn address(&self) -> usize {
        self.words.as_ptr() as usize
    }

    // Out-of-band writes, only reachable through `testing::Tamper`.

    pub(crate) fn overwrite_left_guard(&mut self, value: u64) {
        if let Some(w) = self.words.first_mut() {
            *w = value as Element;
        }
    }

    pub(crate) fn overwrite_right_guard(&mut self, value: u64) {
        if self.words.len() >= 2 {
            if let Some(w) = self.words.last_mut() {
                *w = value as Element;
            }
        }
    }

    pub(crate) fn overwrite_slot_byte(&mut self, byte_index: usize, value: u8) {
        let slot = byte_index / ELEMENT_BYTES;
        let offset = byte_index % ELEMENT_BYTES;
        if let Some(word) = self.slots_mut().get_mut(slot) {
            let mut bytes = word.to_ne_bytes();
            bytes[offset] = value;
            *word = Element::from_ne_bytes(bytes);
        }
    }
}
