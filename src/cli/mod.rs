// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the guardstack command-line interface.
//!
//! Three subcommands, all demonstrations of the library: `demo` fills and
//! drains a stack, `scenario` walks through grow/shrink/underflow one step at
//! a time, and `corrupt` scribbles over a stack behind its back to show the
//! next operation catching it.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use guardstack::testing::Target;
use guardstack::{ChecksumKind, ShrinkPolicy};

#[derive(Parser)]
#[command(
    name = "guardstack",
    about = "Self-verifying stacks with guard words and checksums",
    version
)]
pub struct Cli {
    /// JSON config file (flags below override it)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where dumps are written (default: stack.log)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Run on the no-op integrity engine
    #[arg(long, global = true)]
    pub unguarded: bool,

    /// Shrink trigger
    #[arg(long, global = true, value_enum)]
    pub shrink: Option<ShrinkPolicy>,

    /// Checksum algorithm
    #[arg(long, global = true, value_enum)]
    pub checksum: Option<ChecksumKind>,

    /// Print dumps as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Push COUNT values, pop them all, then dump and destroy the stack
    Demo {
        /// Initial capacity
        #[arg(short, long, default_value = "10")]
        capacity: usize,

        /// Number of values to push and pop
        #[arg(short = 'n', long, default_value = "1000")]
        count: usize,
    },

    /// Step through create(2), three pushes, four pops
    Scenario,

    /// Corrupt a stack out-of-band and show the next push failing
    Corrupt {
        /// What to overwrite
        #[arg(short, long, value_enum, default_value = "right-guard")]
        target: Target,
    },
}
