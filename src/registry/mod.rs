// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Handle registry: the arena that owns every container.
//!
//! Callers never hold a reference to a container. They hold a `Handle`, and
//! every operation goes through `resolve` first. That indirection is what
//! lets the registry reject a handle after its container is gone instead of
//! handing out a dangling view of it.
//!
//! # Slot lifecycle
//!
//! ```text
//!   Reserved (slot 0, forever)
//!
//!   create ──▶ Occupied{gen g} ──destroy──▶ Vacant ──create──▶ Occupied{gen g+1}
//!                                              │
//!                                   (g == u32::MAX) ──▶ Retired
//! ```
//!
//! A destroyed slot is reused, but with the next generation, so the old handle
//! no longer matches and resolves to `InvalidHandle`. The slot table grows by
//! doubling and never shrinks.

pub mod global;

use log::debug;

use crate::config::Config;
use crate::container::Container;
use crate::error::{Result, StackError};
use crate::integrity::{DefaultEngine, IntegrityEngine};
use crate::report::{Provenance, Snapshot};
use crate::testing::Tamper;
use crate::types::{Element, ErrorFlags, Handle};

/// Slot table size on first growth.
const MIN_SLOTS: usize = 8;

#[derive(Debug)]
enum Slot<E: IntegrityEngine> {
    Reserved,
    Occupied {
        generation: u32,
        container: Container<E>,
    },
    Vacant,
    Retired,
}

#[derive(Debug)]
pub struct Registry<E: IntegrityEngine = DefaultEngine> {
    slots: Vec<Slot<E>>,
    /// Next handle to issue for each vacant slot.
    free: Vec<Handle>,
    live: usize,
    config: Config,
    /// Generation given to every newly appended slot.
    first_generation: u32,
}

impl<E: IntegrityEngine> Default for Registry<E> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<E: IntegrityEngine> Registry<E> {
    pub fn new(config: Config) -> Self {
        Self::with_first_generation(config, 0)
    }

    /// A registry whose handles all carry generation `first_generation` or
    /// later, so none of them can equal a handle issued below that floor.
    pub fn with_first_generation(config: Config, first_generation: u32) -> Self {
        Self {
            slots: vec![Slot::Reserved],
            free: Vec::new(),
            live: 0,
            config,
            first_generation,
        }
    }

    /// Lowest generation this registry has never issued and never will on its
    /// current slots. A successor started at this floor cannot collide.
    pub fn generation_ceiling(&self) -> u32 {
        let issued = self.slots.iter().map(|slot| match slot {
            Slot::Occupied { generation, .. } => generation.saturating_add(1),
            Slot::Retired => u32::MAX,
            Slot::Reserved | Slot::Vacant => 0,
        });
        let pending = self.free.iter().map(|handle| handle.generation());
        issued
            .chain(pending)
            .fold(self.first_generation, u32::max)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a container and return its handle.
    pub fn create(&mut self, capacity: usize) -> Result<Handle> {
        if capacity == 0 {
            return Err(StackError::InvalidCapacity);
        }
        let limit = self.config.max_containers;
        if self.live >= limit {
            return Err(StackError::TooManyContainers { limit });
        }

        let handle = match self.free.last() {
            Some(&handle) => handle,
            None => self.append_slot()?,
        };

        let container = Container::with_engine(
            capacity,
            self.config.capacity_policy(),
            E::from_config(&self.config),
        )?;

        if self.free.last() == Some(&handle) {
            self.free.pop();
        }
        self.slots[handle.index()] = Slot::Occupied {
            generation: handle.generation(),
            container,
        };
        self.live += 1;
        debug!("created stack {} with capacity {}", handle, capacity);
        Ok(handle)
    }

    /// Destroy a container. Its handle, and every copy of it, stops resolving.
    pub fn destroy(&mut self, handle: Handle) -> Result<()> {
        self.resolve_mut(handle)?.destruct();

        let next = handle
            .generation()
            .checked_add(1)
            .map(|generation| Handle::new(handle.index() as u32, generation));
        match next {
            Some(next) => {
                self.slots[handle.index()] = Slot::Vacant;
                self.free.push(next);
            }
            None => self.slots[handle.index()] = Slot::Retired,
        }
        self.live -= 1;
        debug!("destroyed stack {}", handle);
        Ok(())
    }

    pub fn resolve(&self, handle: Handle) -> Result<&Container<E>> {
        match self.slots.get(handle.index()) {
            Some(Slot::Occupied {
                generation,
                container,
            }) if *generation == handle.generation() && !handle.is_none() => Ok(container),
            _ => Err(StackError::InvalidHandle(handle)),
        }
    }

    pub fn resolve_mut(&mut self, handle: Handle) -> Result<&mut Container<E>> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Occupied {
                generation,
                container,
            }) if *generation == handle.generation() && !handle.is_none() => Ok(container),
            _ => Err(StackError::InvalidHandle(handle)),
        }
    }

    pub fn push(&mut self, handle: Handle, value: Element) -> Result<()> {
        self.resolve_mut(handle)?.push(value)
    }

    pub fn pop(&mut self, handle: Handle) -> Result<Element> {
        self.resolve_mut(handle)?.pop()
    }

    pub fn peek(&mut self, handle: Handle) -> Result<Option<Element>> {
        self.resolve_mut(handle)?.peek()
    }

    pub fn verify(&mut self, handle: Handle) -> Result<()> {
        self.resolve_mut(handle)?.verify()
    }

    pub fn len(&self, handle: Handle) -> Result<usize> {
        Ok(self.resolve(handle)?.len())
    }

    pub fn capacity(&self, handle: Handle) -> Result<usize> {
        Ok(self.resolve(handle)?.capacity())
    }

    pub fn flags(&self, handle: Handle) -> Result<ErrorFlags> {
        Ok(self.resolve(handle)?.flags())
    }

    /// Snapshot a container for diagnostics. Does not validate.
    pub fn dump(&self, handle: Handle, provenance: Provenance) -> Result<Snapshot> {
        let container = self.resolve(handle)?;
        Ok(Snapshot::capture(container, handle, provenance))
    }

    /// Raw write access to a container. See [`crate::testing`].
    #[doc(hidden)]
    pub fn tamper(&mut self, handle: Handle) -> Result<Tamper<'_>> {
        Ok(self.resolve_mut(handle)?.tamper())
    }

    /// Number of containers currently alive.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Length of the slot table, including the reserved slot 0.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Handles of every live container, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, .. } => Some(Handle::new(index as u32, *generation)),
                _ => None,
            })
    }

    /// Push a vacant slot on the end of the table and return its first handle.
    fn append_slot(&mut self) -> Result<Handle> {
        let index = self.slots.len();
        let Ok(index32) = u32::try_from(index) else {
            return Err(StackError::TooManyContainers {
                limit: u32::MAX as usize,
            });
        };

        if self.slots.len() == self.slots.capacity() {
            let additional = self.slots.capacity().max(MIN_SLOTS);
            self.slots
                .try_reserve_exact(additional)
                .map_err(|_| StackError::OutOfMemory {
                    requested: index + additional,
                })?;
        }
        self.slots.push(Slot::Vacant);

        let handle = Handle::new(index32, self.first_generation);
        self.free.push(handle);
        Ok(handle)
    }
}
