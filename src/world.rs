use serde::{Deserialize, Serialize};

use crate::faction::{Faction, FactionId};

/// Terrain category of a tile. Immutable after generation except for the
/// capital-tile override applied by the faction seeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Grass,
    Forest,
    River,
    Mountain,
    Lake,
    Berry,
}

impl Biome {
    pub fn is_water(self) -> bool {
        matches!(self, Biome::Lake | Biome::River)
    }
}

/// Settlement tier of a tile; drives tax rate and growth rate independent
/// of biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    None,
    Village,
    Town,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Building {
    Fishery,
    StoneMine,
    LumberCamp,
    Farm,
    Workshop,
    Market,
}

/// Employment priority order for the per-tile worker pass.
pub const BUILDING_ORDER: [Building; 6] = [
    Building::Fishery,
    Building::StoneMine,
    Building::LumberCamp,
    Building::Farm,
    Building::Workshop,
    Building::Market,
];

/// Per-tile building levels, indexed by `Building` ordinal. Level 0 means
/// the building is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildingLevels([u8; 6]);

impl BuildingLevels {
    pub fn level(&self, building: Building) -> u8 {
        self.0[building as usize]
    }

    pub fn set_level(&mut self, building: Building, level: u8) {
        self.0[building as usize] = level;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl TilePos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One battle resolved during a war tick.
#[derive(Debug, Clone, Serialize)]
pub struct BattleRecord {
    pub tick: u64,
    pub event: &'static str,
    pub a_loss: u64,
    pub b_loss: u64,
}

/// An active war between an unordered pair of factions. Dissolved by the war
/// system when either side's army or morale collapses.
#[derive(Debug, Clone)]
pub struct War {
    pub a: FactionId,
    pub b: FactionId,
    pub a_score: u64,
    pub b_score: u64,
    pub started_tick: u64,
    pub history: Vec<BattleRecord>,
}

impl War {
    pub fn involves(&self, id: FactionId) -> bool {
        self.a == id || self.b == id
    }

    pub fn matches_pair(&self, a: FactionId, b: FactionId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

/// A battle event as returned from a war tick, tagged with the pair that
/// fought it.
#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    pub a: FactionId,
    pub b: FactionId,
    #[serde(flatten)]
    pub record: BattleRecord,
}

/// The explicit simulation context: the tile grid, the faction roster, and
/// the active wars. Every engine call takes this by reference; there is no
/// global registry.
pub struct World {
    width: u32,
    height: u32,
    tick: u64,
    pub biome: Vec<Biome>,
    pub elevation: Vec<f64>,
    pub moisture: Vec<f64>,
    pub owner: Vec<Option<FactionId>>,
    pub population: Vec<u64>,
    pub settlement: Vec<Settlement>,
    pub buildings: Vec<BuildingLevels>,
    /// Capital sites chosen during generation; consumed by the seeder.
    pub capital_sites: Vec<TilePos>,
    pub factions: Vec<Faction>,
    pub wars: Vec<War>,
    /// Factions that hit a food or goods shortage on the last economy tick.
    pub shortages: Vec<FactionId>,
    /// Battles resolved on the last war tick.
    pub battle_log: Vec<BattleReport>,
}

impl World {
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width * height) as usize;
        Self {
            width,
            height,
            tick: 0,
            biome: vec![Biome::Grass; n],
            elevation: vec![0.0; n],
            moisture: vec![0.0; n],
            owner: vec![None; n],
            population: vec![0; n],
            settlement: vec![Settlement::None; n],
            buildings: vec![BuildingLevels::default(); n],
            capital_sites: Vec::new(),
            factions: Vec::new(),
            wars: Vec::new(),
            shortages: Vec::new(),
            battle_log: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn idx(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.index())
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(id.index())
    }

    pub fn total_population(&self) -> u64 {
        self.factions.iter().map(|f| f.population).sum()
    }

    /// Orthogonal neighbors of a tile, clipped to the grid.
    pub fn neighbors4(&self, x: u32, y: u32) -> impl Iterator<Item = TilePos> + '_ {
        const OFFSETS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            self.in_bounds(nx, ny)
                .then(|| TilePos::new(nx as u32, ny as u32))
        })
    }

    /// True when the tile is unowned and orthogonally adjacent to territory
    /// of the given faction -- the legality query backing `annex`.
    pub fn is_border_tile(&self, id: FactionId, x: u32, y: u32) -> bool {
        if !self.in_bounds(x as i64, y as i64) || self.owner[self.idx(x, y)].is_some() {
            return false;
        }
        self.neighbors4(x, y)
            .any(|p| self.owner[self.idx(p.x, p.y)] == Some(id))
    }

    /// Claim one adjacent unowned tile for a faction. Invalid targets are a
    /// no-op per the clamping error policy.
    pub fn annex(&mut self, id: FactionId, x: u32, y: u32) {
        if self.faction(id).is_none() || !self.is_border_tile(id, x, y) {
            return;
        }
        let k = self.idx(x, y);
        self.owner[k] = Some(id);
    }

    /// Owned-tile population resum for one faction; the authoritative total
    /// after every economy tick.
    pub fn sum_owned_population(&self, id: FactionId) -> u64 {
        self.owner
            .iter()
            .zip(&self.population)
            .filter(|(owner, _)| **owner == Some(id))
            .map(|(_, pop)| *pop)
            .sum()
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        WorldSnapshot {
            scenario: scenario.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            tick: self.tick,
            width: self.width,
            height: self.height,
            total_population: self.total_population(),
            active_wars: self.wars.len(),
            shortages: self.shortages.iter().map(|id| id.raw()).collect(),
            factions: self.factions.iter().map(FactionSnapshot::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FactionSnapshot {
    pub id: u32,
    pub name: String,
    pub population: u64,
    pub army: u64,
    pub morale: f64,
    pub score: u64,
    pub gold: u64,
    pub food: u64,
    pub wood: u64,
    pub stone: u64,
    pub iron: u64,
    pub tools: u64,
    pub goods: u64,
}

impl From<&Faction> for FactionSnapshot {
    fn from(f: &Faction) -> Self {
        Self {
            id: f.id.raw(),
            name: f.name.clone(),
            population: f.population,
            army: f.army,
            morale: f.morale,
            score: f.score,
            gold: f.resources.gold,
            food: f.resources.food,
            wood: f.resources.wood,
            stone: f.resources.stone,
            iron: f.resources.iron,
            tools: f.resources.tools,
            goods: f.resources.goods,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub generated_at: String,
    pub tick: u64,
    pub width: u32,
    pub height: u32,
    pub total_population: u64,
    pub active_wars: usize,
    pub shortages: Vec<u32>,
    pub factions: Vec<FactionSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        let world = World::new(7, 5);
        assert_eq!(world.idx(0, 0), 0);
        assert_eq!(world.idx(6, 4), world.tile_count() - 1);
        assert_eq!(world.idx(3, 2), (2 * 7 + 3) as usize);
    }

    #[test]
    fn neighbors_clip_to_grid() {
        let world = World::new(4, 4);
        assert_eq!(world.neighbors4(0, 0).count(), 2);
        assert_eq!(world.neighbors4(1, 0).count(), 3);
        assert_eq!(world.neighbors4(2, 2).count(), 4);
    }

    #[test]
    fn annex_requires_adjacency_and_vacancy() {
        let mut world = World::new(4, 4);
        world.factions.push(Faction::new(
            FactionId::new(0),
            "Faction 1".into(),
            0xffffff,
            TilePos::new(1, 1),
        ));
        let k = world.idx(1, 1);
        world.owner[k] = Some(FactionId::new(0));

        // Not adjacent: no-op.
        world.annex(FactionId::new(0), 3, 3);
        assert_eq!(world.owner[world.idx(3, 3)], None);

        world.annex(FactionId::new(0), 2, 1);
        assert_eq!(world.owner[world.idx(2, 1)], Some(FactionId::new(0)));

        // Already owned: no-op keeps the existing owner.
        world.factions.push(Faction::new(
            FactionId::new(1),
            "Faction 2".into(),
            0xffffff,
            TilePos::new(2, 2),
        ));
        let k2 = world.idx(2, 2);
        world.owner[k2] = Some(FactionId::new(1));
        world.annex(FactionId::new(0), 2, 2);
        assert_eq!(world.owner[k2], Some(FactionId::new(1)));
    }
}
