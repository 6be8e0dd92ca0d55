use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dominion::{
    engine::{EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
    systems::{BookkeepingSystem, EconomySystem, WarSystem},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "dominion simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/heartland.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let mut world = scenario.build_world();
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_system(EconomySystem::new())
        .with_system(WarSystem::new())
        .with_system(BookkeepingSystem::new())
        .build();

    engine.run(&mut world, ticks)?;

    println!(
        "Scenario '{}' completed for {} ticks. Total population: {}",
        scenario.name,
        ticks,
        world.total_population()
    );
    if let Some(leader) = world.factions.iter().max_by_key(|f| f.score) {
        println!(
            "Leading faction: {} (score {}, population {}, army {})",
            leader.name, leader.score, leader.population, leader.army
        );
    }
    Ok(())
}
