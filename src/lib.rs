// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Self-verifying stacks behind integer handles.
//!
//! Each container is a growable LIFO buffer of `i64` that guards its payload
//! with sentinel words and fingerprints both its payload and its own control
//! fields. Every push and pop re-checks all of it on entry and on exit, so
//! corruption is reported by the first operation after it happens. Callers
//! reach containers only through a registry handle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  registry    │────▶│  container   │────▶│  capacity    │
//! │ (Handle →    │     │ (push, pop,  │     │ (grow ×2,    │
//! │  Container)  │     │  destruct)   │     │  shrink ÷2)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//! ┌──────────────┐     ┌─────────────────────────────────────┐
//! │   report     │     │             integrity               │
//! │  (Snapshot)  │     │ (guard words, checksums, Guarded /  │
//! └──────────────┘     │  Unguarded engines)                 │
//!        │             └─────────────────────────────────────┘
//!        ▼                            │
//! ┌──────────────┐             ┌──────────────┐
//! │    sink      │             │    buffer    │
//! │ (stack.log)  │             │ (guard|slots │
//! └──────────────┘             │  |guard)     │
//!                              └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use guardstack::{dump, Registry};
//!
//! let mut registry: Registry = Registry::default();
//! let stk = registry.create(2)?;
//! registry.push(stk, 10)?;
//! registry.push(stk, 20)?;
//! registry.push(stk, 30)?;           // grows to capacity 4
//! println!("{}", dump!(registry, stk)?);
//! assert_eq!(registry.pop(stk)?, 30);
//! registry.destroy(stk)?;
//! ```

pub mod buffer;
pub mod capacity;
pub mod config;
pub mod container;
pub mod contracts;
pub mod error;
pub mod integrity;
pub mod registry;
pub mod report;
pub mod sink;
pub mod testing;
mod types;

pub use capacity::{CapacityPolicy, ShrinkPolicy};
pub use config::{Config, ConfigError};
pub use container::{Container, ControlBlock};
pub use error::{Result, StackError};
pub use integrity::{ChecksumKind, DefaultEngine, Guarded, IntegrityEngine, Unguarded};
pub use registry::{global, Registry};
pub use report::{Provenance, SlotView, Snapshot};
pub use sink::LogSink;
pub use types::{Element, ErrorFlags, Handle, GUARD_SENTINEL, POISON};

/// Snapshot a container, recording the handle expression and call site.
///
/// `dump!(registry, handle)` returns `Result<Snapshot>` from that registry.
/// `dump!(handle)` goes through the process-wide registry, writes the report
/// to the log sink, and returns `Result<String>`.
#[macro_export]
macro_rules! dump {
    ($registry:expr, $handle:expr $(,)?) => {
        $registry.dump(
            $handle,
            $crate::Provenance::new(stringify!($handle), file!(), module_path!(), line!()),
        )
    };
    ($handle:expr $(,)?) => {
        $crate::global::dump(
            $handle,
            $crate::Provenance::new(stringify!($handle), file!(), module_path!(), line!()),
        )
    };
}
