mod error;

use clap::{Parser, Subcommand};
use df_core::{PartId, s};
use df_graph::{PartGraph, Side, partition_pair};
use df_project::CompiledScenario;
use df_pump::{PumpEvent, StartOutcome};
use df_transfer::{Direction, identify};
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "df-cli")]
#[command(about = "DockFlow CLI - docking port resource pump simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Show both sides of a connector and the resources it would move
    Sides {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Part ID of the connector
        connector: String,
    },
    /// Run one pump until it stops
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Part ID of the connector to start
        connector: String,
        /// Tick length in seconds
        #[arg(long, default_value_t = 0.02)]
        dt: f64,
        /// Give up after this many ticks
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u32,
        /// Print a status line every N ticks
        #[arg(long, default_value_t = 50)]
        status_every: u32,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Sides {
            scenario_path,
            connector,
        } => cmd_sides(&scenario_path, &connector),
        Commands::Run {
            scenario_path,
            connector,
            dt,
            max_ticks,
            status_every,
        } => cmd_run(&scenario_path, &connector, dt, max_ticks, status_every),
    }
}

fn load(scenario_path: &Path) -> CliResult<CompiledScenario> {
    let def = df_project::load(scenario_path)?;
    Ok(df_project::compile(&def)?)
}

fn resolve(compiled: &CompiledScenario, id: &str) -> CliResult<PartId> {
    compiled
        .part(id)
        .ok_or_else(|| CliError::UnknownPart(id.to_string()))
}

fn part_label(compiled: &CompiledScenario, part: PartId) -> String {
    let key = compiled.part_key(part).unwrap_or("?");
    match compiled.vessel.part(part) {
        Some(p) if p.name != key => format!("{} ({})", key, p.name),
        _ => key.to_string(),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let compiled = load(scenario_path)?;
    println!("✓ Scenario is valid: {}", compiled.name);
    println!(
        "  {} parts, {} pools, {} connectors",
        compiled.vessel.parts().len(),
        compiled.vessel.pools().len(),
        compiled.connectors.len()
    );
    Ok(())
}

fn print_side(compiled: &CompiledScenario, title: &str, side: &Side) {
    println!("{} side ({} parts):", title, side.len());
    for part in side.parts() {
        println!("  {}", part_label(compiled, part));
    }
    if let Some(overrun) = side.overrun() {
        println!(
            "  ! traversal stopped after {} iterations",
            overrun.iterations
        );
    }
}

fn cmd_sides(scenario_path: &Path, connector: &str) -> CliResult<()> {
    let compiled = load(scenario_path)?;
    let part = resolve(&compiled, connector)?;
    let opposite = compiled
        .vessel
        .linked_part(part)
        .ok_or_else(|| CliError::NotLinked(connector.to_string()))?;

    let (near, far) = partition_pair(&compiled.vessel, part, opposite);
    print_side(&compiled, "Near", &near);
    print_side(&compiled, "Far", &far);

    let eligible = identify(
        &compiled.vessel,
        &near,
        &far,
        &compiled.settings.match_rules(),
    );
    if eligible.is_empty() {
        println!("No resources to transfer");
    } else {
        println!("Resources:");
        for entry in eligible.iter() {
            let arrow = match entry.direction {
                Direction::NearToFar => "near -> far",
                Direction::FarToNear => "far -> near",
            };
            println!(
                "  {:<16} {} ({} source pools, {} sink pools)",
                entry.resource.as_str(),
                arrow,
                entry.available.len(),
                entry.required.len()
            );
        }
    }
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    connector: &str,
    dt: f64,
    max_ticks: u32,
    status_every: u32,
) -> CliResult<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(CliError::InvalidArg(format!("dt must be positive, got {}", dt)));
    }
    let mut compiled = load(scenario_path)?;
    let part = resolve(&compiled, connector)?;
    let mut bank = compiled.build_bank()?;
    if bank.get(part).is_none() {
        return Err(CliError::InvalidArg(format!(
            "{} is not listed as a connector",
            connector
        )));
    }

    // Let the link state settle before offering a start
    let mut settle = 0;
    while !bank.get(part).is_some_and(|c| c.can_start()) {
        if settle > compiled.settings.debounce_ticks + 1 {
            return Err(CliError::NotLinked(connector.to_string()));
        }
        bank.tick(&mut compiled.vessel, &compiled.settings, s(dt))?;
        settle += 1;
    }
    bank.drain_events();

    println!("Running pump on {}", part_label(&compiled, part));
    if bank.start(&compiled.vessel, part, &compiled.settings)? != StartOutcome::Started {
        return Err(CliError::NotLinked(connector.to_string()));
    }

    let mut ticks = 0;
    let mut moved = 0.0;
    while bank.is_running(part) && ticks < max_ticks {
        let reports = bank.tick(&mut compiled.vessel, &compiled.settings, s(dt))?;
        ticks += 1;
        moved += reports
            .iter()
            .filter(|(p, _)| *p == part)
            .map(|(_, r)| r.transfer.total)
            .sum::<f64>();

        if status_every > 0 && ticks % status_every == 0 {
            if let Some(c) = bank.get(part) {
                println!(
                    "  t={:>8.2}s  {}  {}",
                    ticks as f64 * dt,
                    c.status_text(),
                    c.info_text()
                );
            }
        }
        bank.dispatch(&mut |event: &PumpEvent| report_event(&compiled, event));
    }

    if bank.is_running(part) {
        println!("Stopped by tick limit after {} ticks", ticks);
    } else {
        println!("Pump idle after {} ticks", ticks);
    }
    println!("Total moved: {:.3}", moved);
    print_pools(&compiled);
    Ok(())
}

fn report_event(compiled: &CompiledScenario, event: &PumpEvent) {
    match event {
        PumpEvent::Stopped { part, reason } => {
            println!("  {} stopped: {}", part_label(compiled, *part), reason.label());
        }
        PumpEvent::MutualOverheat { part, opposite } => println!(
            "  ! {} and {} are both pumping",
            part_label(compiled, *part),
            part_label(compiled, *opposite)
        ),
        PumpEvent::TraversalOverrun { overrun, .. } => println!(
            "  ! side traversal from {} stopped early",
            part_label(compiled, overrun.focal)
        ),
        PumpEvent::Repartitioned { part, resources } => println!(
            "  {} sides rebuilt, {} resources",
            part_label(compiled, *part),
            resources.len()
        ),
        _ => {}
    }
}

fn print_pools(compiled: &CompiledScenario) {
    println!("Final pool amounts:");
    for pool in compiled.vessel.pools() {
        println!(
            "  {:<24} {:<16} {:>10.3} / {:<10.3}",
            part_label(compiled, pool.part),
            pool.resource.as_str(),
            pool.amount,
            pool.capacity
        );
    }
}
