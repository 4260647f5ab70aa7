// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Process-wide registry.
//!
//! The plain-value API: integers in, integers out, no references cross the
//! boundary. One `Registry<DefaultEngine>` lives behind a mutex, created on
//! first use (or by `init`) and torn down by `shutdown`, which also flushes
//! and closes the log sink.
//!
//! ```ignore
//! use guardstack::{dump, global};
//!
//! let stk = global::create(8)?;
//! global::push(stk, 42)?;
//! let report = dump!(stk)?;
//! assert_eq!(global::pop(stk)?, 42);
//! global::destroy(stk)?;
//! global::shutdown();
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, warn};
use parking_lot::Mutex;

use super::Registry;
use crate::config::Config;
use crate::error::Result;
use crate::report::Provenance;
use crate::sink;
use crate::types::{Element, Handle};

static REGISTRY: Mutex<Option<Registry>> = parking_lot::const_mutex(None);

/// First generation for the next registry. Raised at every shutdown so that
/// handles from a torn-down registry never resolve in its successor.
static GENERATION_FLOOR: AtomicU32 = AtomicU32::new(0);

fn fresh_registry(config: Config) -> Registry {
    Registry::with_first_generation(config, GENERATION_FLOOR.load(Ordering::Acquire))
}

/// Install a configured registry.
///
/// Returns `false` and changes nothing if a registry already exists, since
/// replacing it would orphan every handle issued so far.
pub fn init(config: Config) -> bool {
    let mut slot = REGISTRY.lock();
    if slot.is_some() {
        warn!("registry already initialized; ignoring new config");
        return false;
    }
    sink::configure(&config.log_path);
    *slot = Some(fresh_registry(config));
    true
}

/// Run `f` against the process-wide registry, creating it if needed.
pub fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    let mut slot = REGISTRY.lock();
    let registry = slot.get_or_insert_with(|| {
        debug!("creating process-wide registry with default config");
        fresh_registry(Config::default())
    });
    f(registry)
}

pub fn create(capacity: usize) -> Result<Handle> {
    with_registry(|r| r.create(capacity))
}

pub fn destroy(handle: Handle) -> Result<()> {
    with_registry(|r| r.destroy(handle))
}

pub fn push(handle: Handle, value: Element) -> Result<()> {
    with_registry(|r| r.push(handle, value))
}

pub fn pop(handle: Handle) -> Result<Element> {
    with_registry(|r| r.pop(handle))
}

/// Render a container's report, write it to the log sink, and return it.
///
/// A sink write failure is logged, not returned: the caller still gets the
/// report text.
pub fn dump(handle: Handle, provenance: Provenance) -> Result<String> {
    let report = with_registry(|r| r.dump(handle, provenance))?.to_string();
    if let Err(err) = sink::write(&report) {
        warn!("could not write dump of {} to log sink: {}", handle, err);
    }
    Ok(report)
}

/// Tear down the registry and close the log sink.
///
/// Every outstanding handle becomes invalid. A later call to any operation
/// starts over with a fresh default registry whose handles cannot match any
/// issued before.
pub fn shutdown() {
    let registry = {
        let mut slot = REGISTRY.lock();
        let registry = slot.take();
        // Raised under the lock so no successor can start below it.
        if let Some(registry) = &registry {
            GENERATION_FLOOR.fetch_max(registry.generation_ceiling(), Ordering::AcqRel);
        }
        registry
    };
    if let Some(registry) = registry {
        if registry.live_count() > 0 {
            debug!(
                "shutting down with {} live stacks",
                registry.live_count()
            );
        }
    }
    if let Err(err) = sink::close() {
        warn!("log sink did not close cleanly: {}", err);
    }
}
