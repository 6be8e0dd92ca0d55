use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::faction::seed_factions;
use crate::terrain::{self, BiomeMode};
use crate::world::World;

fn default_world_size() -> WorldSize {
    WorldSize::Medium
}

fn default_biome_mode() -> BiomeMode {
    BiomeMode::Normal
}

fn default_faction_count() -> u32 {
    8
}

fn default_border_radius() -> u32 {
    1
}

fn default_snapshot_interval_ticks() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldSize {
    Small,
    Medium,
    Large,
}

impl WorldSize {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            WorldSize::Small => (32, 32),
            WorldSize::Medium => (48, 48),
            WorldSize::Large => (64, 64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_world_size")]
    pub world_size: WorldSize,
    #[serde(default = "default_biome_mode")]
    pub biome_mode: BiomeMode,
    #[serde(default = "default_faction_count")]
    pub faction_count: u32,
    #[serde(default = "default_border_radius")]
    pub border_radius: u32,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Generate terrain and seed the faction roster from the scenario seed.
    pub fn build_world(&self) -> World {
        let (width, height) = self.world_size.dimensions();
        let mut world = terrain::generate(width, height, self.biome_mode, self.seed);
        seed_factions(&mut world, self.faction_count, self.border_radius);
        world
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}
