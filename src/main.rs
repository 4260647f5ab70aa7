// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use guardstack::testing::Target;
use guardstack::{
    dump, global, sink, Config, Handle, IntegrityEngine, Registry, Unguarded,
};

mod cli;
use cli::display::{self, row, section_bot, section_top};
use cli::{Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", display::themed(display::RED, &[display::BOLD], "error:"), err);
        global::shutdown();
        std::process::exit(1);
    }
    global::shutdown();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = &cli.log_file {
        config.log_path = path.clone();
    }
    if let Some(shrink) = cli.shrink {
        config.shrink_policy = shrink;
    }
    if let Some(checksum) = cli.checksum {
        config.checksum = checksum;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    debug!("effective config: {:?}", config);

    if cli.unguarded {
        sink::configure(&config.log_path);
        let mut registry: Registry<Unguarded> = Registry::new(config);
        dispatch(&mut registry, &cli)
    } else {
        global::init(config);
        global::with_registry(|registry| dispatch(registry, &cli))
    }
}

fn dispatch<E: IntegrityEngine>(registry: &mut Registry<E>, cli: &Cli) -> Result<()> {
    match cli.command {
        Commands::Demo { capacity, count } => run_demo(registry, cli.json, capacity, count),
        Commands::Scenario => run_scenario(registry, cli.json),
        Commands::Corrupt { target } => run_corrupt(registry, cli.json, target),
    }
}

/// Render a dump, send it to the log sink, and echo it to stdout.
fn emit<E: IntegrityEngine>(registry: &Registry<E>, stk: Handle, json: bool) -> Result<()> {
    let snapshot = dump!(registry, stk)?;
    let text = snapshot.to_string();
    if let Err(err) = sink::write(&text) {
        log::warn!("log sink write failed: {}", err);
    }
    if json {
        println!("{}", snapshot.to_json()?);
    } else {
        print!("{}", display::colorize_report(&text));
    }
    Ok(())
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_demo<E: IntegrityEngine>(
    registry: &mut Registry<E>,
    json: bool,
    capacity: usize,
    count: usize,
) -> Result<()> {
    let stk = registry.create(capacity)?;
    let mut peak = registry.capacity(stk)?;

    for i in 0..count {
        registry.push(stk, i as i64)?;
        peak = peak.max(registry.capacity(stk)?);
    }
    for i in (0..count).rev() {
        let value = registry.pop(stk)?;
        if value != i as i64 {
            anyhow::bail!("popped {} where {} was pushed", value, i);
        }
    }

    section_top(&format!("DEMO  {} engine", E::NAME));
    row(&format!("pushed and popped {} values", count));
    row(&format!("capacity {} → peak {} → {}", capacity, peak, registry.capacity(stk)?));
    row(&format!("flags {}", display::flags_label(registry.flags(stk)?)));
    section_bot();

    emit(registry, stk, json)?;
    registry.destroy(stk)?;
    Ok(())
}

fn run_scenario<E: IntegrityEngine>(registry: &mut Registry<E>, json: bool) -> Result<()> {
    let stk = registry.create(2)?;
    section_top(&format!("SCENARIO  {} engine", E::NAME));
    row(&format!(
        "create(2)      → {}  size {} cap {}",
        stk,
        registry.len(stk)?,
        registry.capacity(stk)?
    ));

    for value in [10, 20, 30] {
        let result = registry.push(stk, value);
        row(&format!(
            "push({:>2})       → {}  size {} cap {}",
            value,
            display::outcome(&result),
            registry.len(stk)?,
            registry.capacity(stk)?
        ));
    }
    for _ in 0..4 {
        let result = registry.pop(stk);
        let shown = match &result {
            Ok(value) => format!("{:<4}", value),
            Err(_) => display::outcome(&result),
        };
        row(&format!(
            "pop()          → {}  size {} cap {}",
            shown,
            registry.len(stk)?,
            registry.capacity(stk)?
        ));
    }
    row(&format!("flags {}", display::flags_label(registry.flags(stk)?)));
    section_bot();

    emit(registry, stk, json)?;
    registry.destroy(stk)?;
    Ok(())
}

fn run_corrupt<E: IntegrityEngine>(
    registry: &mut Registry<E>,
    json: bool,
    target: Target,
) -> Result<()> {
    let stk = registry.create(4)?;
    for value in [11, 22] {
        registry.push(stk, value)?;
    }

    target.apply(&mut registry.tamper(stk)?);
    let result = registry.push(stk, 33);

    section_top(&format!("CORRUPT  {:?}  {} engine", target, E::NAME));
    row(&format!("push(33) after tampering → {}", display::outcome(&result)));
    row(&format!("flags {}", display::flags_label(registry.flags(stk)?)));
    section_bot();

    emit(registry, stk, json)?;
    registry.destroy(stk)?;
    Ok(())
}
