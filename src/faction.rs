use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::{Biome, Settlement, TilePos, World};

/// Index into the world's faction roster. Factions are created once by the
/// seeder and never destroyed mid-game, so the raw index is stable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FactionId(u32);

impl FactionId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub gold: u64,
    pub food: u64,
    pub wood: u64,
    pub stone: u64,
    pub iron: u64,
    pub tools: u64,
    pub luxury: u64,
    pub goods: u64,
}

impl Resources {
    pub fn total(&self) -> u64 {
        self.gold
            + self.food
            + self.wood
            + self.stone
            + self.iron
            + self.tools
            + self.luxury
            + self.goods
    }
}

#[derive(Debug, Clone)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub color: u32,
    pub capital: TilePos,
    pub resources: Resources,
    /// Sum of owned tiles' population, resummed after every economy tick.
    pub population: u64,
    pub army: u64,
    pub morale: f64,
    pub stability: f64,
    pub prestige: f64,
    pub score: u64,
}

impl Faction {
    pub fn new(id: FactionId, name: String, color: u32, capital: TilePos) -> Self {
        Self {
            id,
            name,
            color,
            capital,
            resources: Resources {
                gold: 100,
                food: 10,
                wood: 10,
                stone: 10,
                ..Resources::default()
            },
            population: 0,
            army: 0,
            morale: 100.0,
            stability: 50.0,
            prestige: 0.0,
            score: 0,
        }
    }

    pub fn at_war(&self, world: &World) -> bool {
        world.wars.iter().any(|w| w.involves(self.id))
    }
}

const PALETTE: [u32; 8] = [
    0x4be4e2, 0xff6b6b, 0xffd93d, 0x6ee7b7, 0xa78bfa, 0xf9a8d4, 0xf472b6, 0x60a5fa,
];

/// Population seeded on a capital's surrounding tiles, by biome.
fn ring_population(biome: Biome) -> u64 {
    match biome {
        Biome::Grass => 100,
        Biome::Forest => 75,
        Biome::Mountain => 50,
        _ => 0,
    }
}

/// The eight capital anchors: four corners, four edge midpoints, each
/// jittered. Corner anchors wander by up to a tile, midpoints by up to
/// three along their edge.
pub fn seed_points_for(w: u32, h: u32, rng: &mut impl Rng) -> Vec<TilePos> {
    let mut jit = |n: i64| rng.gen_range(0..n.max(1)) - n / 2;
    let anchors: [(i64, i64, i64, i64); 8] = [
        (2, 2, 2, 2),
        (w as i64 - 3, 2, 2, 2),
        (2, h as i64 - 3, 2, 2),
        (w as i64 - 3, h as i64 - 3, 2, 2),
        (w as i64 / 2, 2, 6, 2),
        (w as i64 - 3, h as i64 / 2, 2, 6),
        (w as i64 / 2, h as i64 - 3, 6, 2),
        (2, h as i64 / 2, 2, 6),
    ];
    anchors
        .iter()
        .map(|&(ax, ay, jx, jy)| {
            let x = (ax + jit(jx)).clamp(2, (w as i64 - 3).max(2));
            let y = (ay + jit(jy)).clamp(2, (h as i64 - 3).max(2));
            TilePos::new(x as u32, y as u32)
        })
        .collect()
}

/// Build one faction per capital site and claim its initial territory.
///
/// The capital tile is forced to grass, tiered as a town, and seeded with
/// 1000 people; surrounding unclaimed tiles within the Chebyshev border
/// radius are claimed and populated by biome. Degrades silently when fewer
/// sites than requested factions are available.
pub fn seed_factions(world: &mut World, faction_count: u32, border_radius: u32) {
    let count = (faction_count as usize).min(world.capital_sites.len());
    let sites: Vec<TilePos> = world.capital_sites[..count].to_vec();

    world.factions.clear();
    for (i, site) in sites.iter().enumerate() {
        let cx = site.x.clamp(2, world.width().saturating_sub(3).max(2));
        let cy = site.y.clamp(2, world.height().saturating_sub(3).max(2));
        let id = FactionId::new(i as u32);
        world.factions.push(Faction::new(
            id,
            format!("Faction {}", i + 1),
            PALETTE[i % PALETTE.len()],
            TilePos::new(cx, cy),
        ));
    }

    for i in 0..world.factions.len() {
        let id = FactionId::new(i as u32);
        let cap = world.factions[i].capital;
        let k = world.idx(cap.x, cap.y);
        world.biome[k] = Biome::Grass;
        world.settlement[k] = Settlement::Town;
        world.population[k] = 1000;
        world.owner[k] = Some(id);

        let r = border_radius as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = cap.x as i64 + dx;
                let y = cap.y as i64 + dy;
                if !world.in_bounds(x, y) {
                    continue;
                }
                let t = world.idx(x as u32, y as u32);
                if world.owner[t].is_none() {
                    world.owner[t] = Some(id);
                    world.population[t] = ring_population(world.biome[t]);
                }
            }
        }
    }

    for i in 0..world.factions.len() {
        let id = FactionId::new(i as u32);
        world.factions[i].population = world.sum_owned_population(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world_with_sites(sites: Vec<TilePos>) -> World {
        let mut world = World::new(16, 16);
        world.capital_sites = sites;
        world
    }

    #[test]
    fn seed_points_stay_in_interior() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            for p in seed_points_for(24, 24, &mut rng) {
                assert!(p.x >= 2 && p.x <= 21, "x out of interior: {}", p.x);
                assert!(p.y >= 2 && p.y <= 21, "y out of interior: {}", p.y);
            }
        }
    }

    #[test]
    fn capital_becomes_grass_town_with_claimed_ring() {
        let mut world = world_with_sites(vec![TilePos::new(5, 5)]);
        let k = world.idx(5, 5);
        world.biome[k] = Biome::Lake;
        seed_factions(&mut world, 1, 1);

        assert_eq!(world.biome[k], Biome::Grass);
        assert_eq!(world.settlement[k], Settlement::Town);
        assert_eq!(world.population[k], 1000);
        let id = FactionId::new(0);
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let t = world.idx((5 + dx) as u32, (5 + dy) as u32);
                assert_eq!(world.owner[t], Some(id));
            }
        }
        assert_eq!(world.factions[0].population, world.sum_owned_population(id));
    }

    #[test]
    fn claimed_ring_never_overlaps_existing_territory() {
        let mut world = world_with_sites(vec![TilePos::new(4, 4), TilePos::new(6, 4)]);
        seed_factions(&mut world, 2, 1);
        // Tiles between the two capitals went to whoever claimed them first.
        let k = world.idx(5, 4);
        assert_eq!(world.owner[k], Some(FactionId::new(0)));
        // Both capitals kept their own tile.
        assert_eq!(world.owner[world.idx(4, 4)], Some(FactionId::new(0)));
        assert_eq!(world.owner[world.idx(6, 4)], Some(FactionId::new(1)));
    }

    #[test]
    fn seeder_degrades_when_sites_are_short() {
        let mut world = world_with_sites(vec![TilePos::new(4, 4)]);
        seed_factions(&mut world, 8, 1);
        assert_eq!(world.factions.len(), 1);
    }
}
