// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic snapshots of a container.
//!
//! A `Snapshot` is a read-only copy of everything worth knowing about a
//! container at one moment: who asked for it, the control fields, both guard
//! pairs, both checksums, the flags, and every slot with whether it is live.
//! `Display` renders it as the text that goes to the log sink; `Serialize`
//! gives the same content as JSON.
//!
//! Capturing never validates and never mutates, so a corrupted container can
//! still be dumped; that is usually when you want to look at it.

use std::fmt;

use serde::Serialize;

use crate::container::Container;
use crate::integrity::{ChecksumKind, IntegrityEngine};
use crate::types::{Element, ErrorFlags, Handle};

/// Where a dump was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Source text of the handle expression, if known.
    pub name: &'static str,
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

impl Provenance {
    pub const fn new(
        name: &'static str,
        file: &'static str,
        function: &'static str,
        line: u32,
    ) -> Self {
        Self {
            name,
            file,
            function,
            line,
        }
    }

    /// Location of whoever called this, minus the parts `#[track_caller]`
    /// cannot see. Prefer the `dump!` macro, which fills those in.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            name: "",
            file: location.file(),
            function: "?",
            line: location.line(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub live: bool,
    pub value: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub handle: Handle,
    pub provenance: Provenance,
    pub engine: &'static str,
    /// `None` for engines that keep no checksums.
    pub checksum: Option<&'static str>,
    pub size: usize,
    pub capacity: usize,
    pub canary_left: u64,
    pub canary_right: u64,
    pub left_guard: Option<u64>,
    pub right_guard: Option<u64>,
    pub content_checksum: u64,
    pub structure_checksum: u64,
    pub flags: ErrorFlags,
    pub slots: Vec<SlotView>,
}

impl Snapshot {
    pub fn capture<E: IntegrityEngine>(
        container: &Container<E>,
        handle: Handle,
        provenance: Provenance,
    ) -> Self {
        let block = container.control_block();
        let (canary_left, canary_right) = block.canaries();
        let (content_checksum, structure_checksum) = block.checksums();
        let buffer = block.buffer();

        let slots = buffer
            .slots()
            .iter()
            .enumerate()
            .map(|(index, &value)| SlotView {
                index,
                live: index < block.size(),
                value,
            })
            .collect();

        Self {
            handle,
            provenance,
            engine: E::NAME,
            checksum: container.engine().checksum().map(ChecksumKind::name),
            size: block.size(),
            capacity: block.capacity(),
            canary_left,
            canary_right,
            left_guard: buffer.left_guard(),
            right_guard: buffer.right_guard(),
            content_checksum,
            structure_checksum,
            flags: block.flags(),
            slots,
        }
    }

    pub fn live_values(&self) -> Vec<Element> {
        self.slots
            .iter()
            .filter(|s| s.live)
            .map(|s| s.value)
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn guard(f: &mut fmt::Formatter<'_>, label: &str, value: Option<u64>) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "\t\t {:<11} = {:#x};", label, v),
        None => writeln!(f, "\t\t {:<11} = <missing>;", label),
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.provenance;
        writeln!(f, "Stack[{}] \"{}\" from {}", self.handle, p.name, p.file)?;
        writeln!(f, "In function {}:{}", p.function, p.line)?;
        writeln!(f, "{{")?;
        writeln!(f, "\tengine       = {};", self.engine)?;
        writeln!(f, "\tchecksum     = {};", self.checksum.unwrap_or("none"))?;
        writeln!(f, "\tcanary_left  = {:#x};", self.canary_left)?;
        writeln!(f, "\tflags        = {};", self.flags)?;
        writeln!(f, "\tsize         = {};", self.size)?;
        writeln!(f, "\tcapacity     = {};", self.capacity)?;
        writeln!(f, "\tcontent_hash = {:#018x};", self.content_checksum)?;
        writeln!(f, "\tstruct_hash  = {:#018x};", self.structure_checksum)?;

        if self.left_guard.is_none() && self.slots.is_empty() {
            writeln!(f, "\tdata         = <released>;")?;
        } else {
            writeln!(f, "\tdata")?;
            writeln!(f, "\t{{")?;
            guard(f, "GUARD_LEFT", self.left_guard)?;
            for slot in &self.slots {
                let marker = if slot.live { '*' } else { ' ' };
                writeln!(f, "\t\t{}[{:3}] = {},", marker, slot.index, slot.value)?;
            }
            guard(f, "GUARD_RIGHT", self.right_guard)?;
            writeln!(f, "\t}};")?;
        }

        writeln!(f, "\tcanary_right = {:#x};", self.canary_right)?;
        writeln!(f, "}}")
    }
}
