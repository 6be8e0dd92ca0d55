use anyhow::Result;

use crate::engine::{System, SystemContext};
use crate::rng::SystemRng;
use crate::world::World;

/// End-of-tick invariant sweep: clamp every bounded faction quantity and
/// tidy the shortage list. The other systems already clamp at assignment;
/// this keeps the committed tick state consistent no matter what ran.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for faction in &mut world.factions {
            faction.morale = faction.morale.clamp(0.0, 100.0);
            faction.stability = faction.stability.clamp(0.0, 100.0);
            faction.prestige = faction.prestige.max(0.0);
        }
        let roster = world.factions.len();
        world
            .wars
            .retain(|w| w.a != w.b && w.a.index() < roster && w.b.index() < roster);
        world.shortages.sort();
        world.shortages.dedup();
        Ok(())
    }
}
