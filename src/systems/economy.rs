//! Per-tick tile economy: employment, production, consumption, taxation,
//! crafting, and population growth/decline, aggregated per faction.

use anyhow::Result;

use crate::engine::{System, SystemContext};
use crate::faction::FactionId;
use crate::rng::SystemRng;
use crate::world::{Biome, Building, Settlement, World, BUILDING_ORDER};

/// A building employs at most this many workers from its tile's pool.
pub const WORKERS_PER_BUILDING: u64 = 10;

/// Flat per-worker output of the unemployed, in each of food, goods, wood,
/// and stone.
pub const SUBSISTENCE_RATE: f64 = 0.05;

/// Gold per luxury unit when the accumulated luxury stock is auto-sold.
pub const LUXURY_SALE_RATE: u64 = 3;

/// Uniform per-tile decline rate while the owning faction is short on food
/// or goods.
pub const SHORTAGE_DECLINE: f64 = -0.005;

/// Per-worker output rates by building level (levels 1..=3). Alternate-biome
/// sites run at half these rates.
const FISHERY_RATES: [f64; 3] = [0.8, 1.2, 1.6];
const STONE_MINE_RATES: [f64; 3] = [0.6, 0.9, 1.2];
const LUMBER_CAMP_RATES: [f64; 3] = [0.7, 1.05, 1.4];
const FARM_RATES: [f64; 3] = [1.0, 1.5, 2.0];
const WORKSHOP_RATES: [f64; 3] = [0.5, 0.8, 1.1];
const MARKET_RATES: [f64; 3] = [0.3, 0.45, 0.6];

fn rate_table(building: Building) -> &'static [f64; 3] {
    match building {
        Building::Fishery => &FISHERY_RATES,
        Building::StoneMine => &STONE_MINE_RATES,
        Building::LumberCamp => &LUMBER_CAMP_RATES,
        Building::Farm => &FARM_RATES,
        Building::Workshop => &WORKSHOP_RATES,
        Building::Market => &MARKET_RATES,
    }
}

/// Terrain/settlement precondition for working a building on a tile:
/// `None` means the site does not operate; `Some(multiplier)` is 1.0 on the
/// building's native terrain and 0.5 on an admissible alternate.
fn site_multiplier(building: Building, biome: Biome, settlement: Settlement) -> Option<f64> {
    match building {
        Building::Fishery => matches!(biome, Biome::Lake | Biome::River).then_some(1.0),
        Building::StoneMine => match biome {
            Biome::Mountain => Some(1.0),
            Biome::Grass | Biome::Forest => Some(0.5),
            _ => None,
        },
        Building::LumberCamp => match biome {
            Biome::Forest => Some(1.0),
            Biome::Grass | Biome::Mountain => Some(0.5),
            _ => None,
        },
        Building::Farm => match biome {
            Biome::Grass => Some(1.0),
            Biome::Forest | Biome::Mountain => Some(0.5),
            _ => None,
        },
        Building::Workshop => (settlement != Settlement::None).then_some(1.0),
        Building::Market => Some(1.0),
    }
}

pub fn tax_rate(settlement: Settlement) -> f64 {
    match settlement {
        Settlement::None => 0.1,
        Settlement::Village => 0.2,
        Settlement::Town => 0.3,
        Settlement::City => 0.4,
    }
}

/// Base growth rate by settlement tier, falling back to biome when
/// unsettled.
pub fn growth_rate(settlement: Settlement, biome: Biome) -> f64 {
    match settlement {
        Settlement::City => 0.012,
        Settlement::Town => 0.01,
        Settlement::Village => 0.008,
        Settlement::None => match biome {
            Biome::Grass => 0.006,
            Biome::Forest => 0.004,
            Biome::Mountain => 0.002,
            _ => 0.0,
        },
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    gold: f64,
    food: f64,
    wood: f64,
    stone: f64,
    goods: f64,
    iron: f64,
    luxury: f64,
    food_consumed: f64,
    goods_consumed: f64,
}

/// Advance the economy one tick in place.
pub fn economy_tick(world: &mut World) {
    let faction_count = world.factions.len();
    let mut accumulators = vec![Accumulator::default(); faction_count];

    // Tile pass: employment, production, and market consumption/taxation.
    for k in 0..world.tile_count() {
        let Some(owner) = world.owner[k] else { continue };
        let acc = &mut accumulators[owner.index()];
        let biome = world.biome[k];
        let settlement = world.settlement[k];
        let levels = world.buildings[k];
        let population = world.population[k];

        // Explicit worker budget, drained by each employment attempt in the
        // fixed priority order; nobody works two jobs.
        let mut workers = population;
        for building in BUILDING_ORDER {
            let level = levels.level(building);
            if level == 0 {
                continue;
            }
            let Some(multiplier) = site_multiplier(building, biome, settlement) else {
                continue;
            };
            let employed = workers.min(WORKERS_PER_BUILDING);
            workers -= employed;
            let table = rate_table(building);
            let rate = table[(level.min(3) - 1) as usize] * multiplier;
            let output = employed as f64 * rate;
            match building {
                Building::Fishery | Building::Farm => acc.food += output,
                Building::StoneMine => acc.stone += output,
                Building::LumberCamp => acc.wood += output,
                Building::Workshop => acc.goods += output,
                Building::Market => acc.gold += output,
            }
        }

        // Unemployed subsistence.
        let idle = workers as f64;
        acc.food += idle * SUBSISTENCE_RATE;
        acc.goods += idle * SUBSISTENCE_RATE;
        acc.wood += idle * SUBSISTENCE_RATE;
        acc.stone += idle * SUBSISTENCE_RATE;

        // Wild-biome yields for terrain the building model does not cover;
        // mountains are the sole iron source.
        match biome {
            Biome::Berry => {
                acc.food += 2.0;
                acc.luxury += 1.0;
            }
            Biome::River => {
                acc.gold += 1.0;
                acc.luxury += 1.0;
            }
            Biome::Lake => {
                acc.food += 1.0;
                acc.gold += 1.0;
            }
            Biome::Mountain => acc.iron += 1.0,
            _ => {}
        }

        if levels.level(Building::Market) > 0 {
            let pop = population as f64;
            acc.food_consumed += 0.1 * pop;
            acc.goods_consumed += 0.1 * pop;
            acc.gold += pop * tax_rate(settlement);
        }
    }

    // Faction settlement: credit floored production, debit floored
    // consumption (flooring stocks at zero and flagging shortages), sell
    // luxury, craft tools.
    let mut shortage = vec![false; faction_count];
    world.shortages.clear();
    for (i, acc) in accumulators.iter().enumerate() {
        let faction = &mut world.factions[i];
        let res = &mut faction.resources;
        res.gold += acc.gold.floor() as u64;
        res.food += acc.food.floor() as u64;
        res.wood += acc.wood.floor() as u64;
        res.stone += acc.stone.floor() as u64;
        res.goods += acc.goods.floor() as u64;
        res.iron += acc.iron.floor() as u64;
        res.luxury += acc.luxury.floor() as u64;

        let food_needed = acc.food_consumed.floor() as u64;
        if res.food < food_needed {
            res.food = 0;
            shortage[i] = true;
        } else {
            res.food -= food_needed;
        }
        let goods_needed = acc.goods_consumed.floor() as u64;
        if res.goods < goods_needed {
            res.goods = 0;
            shortage[i] = true;
        } else {
            res.goods -= goods_needed;
        }
        if shortage[i] {
            world.shortages.push(FactionId::new(i as u32));
        }

        res.gold += res.luxury * LUXURY_SALE_RATE;
        res.luxury = 0;

        let crafted = (res.wood / 2).min(res.iron / 2);
        res.wood -= crafted * 2;
        res.iron -= crafted * 2;
        res.tools += crafted;
    }

    // Growth pass over owned tiles, then resum faction totals and scores.
    let mut totals = vec![0u64; faction_count];
    for k in 0..world.tile_count() {
        let Some(owner) = world.owner[k] else { continue };
        let rate = if shortage[owner.index()] {
            SHORTAGE_DECLINE
        } else {
            growth_rate(world.settlement[k], world.biome[k])
        };
        world.population[k] = (world.population[k] as f64 * (1.0 + rate)).floor() as u64;
        totals[owner.index()] += world.population[k];
    }
    for (i, faction) in world.factions.iter_mut().enumerate() {
        faction.population = totals[i];
        let res = &faction.resources;
        faction.score = faction.population
            + res.gold
            + res.food
            + res.wood
            + res.stone
            + res.goods
            + res.iron
            + res.tools
            + faction.army;
    }
}

pub struct EconomySystem;

impl EconomySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EconomySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EconomySystem {
    fn name(&self) -> &str {
        "economy"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        economy_tick(world);
        Ok(())
    }
}
