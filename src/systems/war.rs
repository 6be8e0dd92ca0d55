//! War resolution: army recruitment, morale, and per-tick battle events
//! between declared war pairs.

use anyhow::Result;
use rand::Rng;

use crate::engine::{System, SystemContext};
use crate::faction::{Faction, FactionId};
use crate::rng::SystemRng;
use crate::world::{BattleRecord, BattleReport, War, World};

pub const RECRUIT_GOLD_COST: u64 = 5;
pub const RECRUIT_POP_COST: u64 = 10;

/// A war dissolves when either side's army is spent or morale drops to or
/// below this floor.
pub const MORALE_COLLAPSE: f64 = 25.0;

#[derive(Debug, Clone, Copy)]
pub struct BattleEventSpec {
    pub name: &'static str,
    pub a_mod: f64,
    pub b_mod: f64,
}

/// Fixed battle-event table; the two Ambush rows cover either side springing
/// it.
pub const BATTLE_EVENTS: [BattleEventSpec; 5] = [
    BattleEventSpec {
        name: "Skirmish",
        a_mod: 1.0,
        b_mod: 1.0,
    },
    BattleEventSpec {
        name: "Ambush",
        a_mod: 1.5,
        b_mod: 0.7,
    },
    BattleEventSpec {
        name: "Ambush",
        a_mod: 0.7,
        b_mod: 1.5,
    },
    BattleEventSpec {
        name: "Charge",
        a_mod: 1.2,
        b_mod: 1.2,
    },
    BattleEventSpec {
        name: "Siege",
        a_mod: 0.6,
        b_mod: 0.6,
    },
];

/// Open a war between two factions. Idempotent: self-pairs and pairs with
/// an active war are no-ops.
pub fn declare_war(world: &mut World, a: FactionId, b: FactionId) {
    if a == b || world.faction(a).is_none() || world.faction(b).is_none() {
        return;
    }
    if world.wars.iter().any(|w| w.matches_pair(a, b)) {
        return;
    }
    let started_tick = world.tick();
    world.wars.push(War {
        a,
        b,
        a_score: 0,
        b_score: 0,
        started_tick,
        history: Vec::new(),
    });
}

fn collapsed(f: &Faction) -> bool {
    f.army == 0 || f.morale <= MORALE_COLLAPSE
}

fn pair_mut(factions: &mut [Faction], a: usize, b: usize) -> (&mut Faction, &mut Faction) {
    if a < b {
        let (left, right) = factions.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = factions.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Advance hostilities one tick: recruit, regenerate morale for factions at
/// peace, then resolve one battle event per active war. Returns this tick's
/// battle reports; dissolved wars are removed.
pub fn war_tick(world: &mut World, rng: &mut impl Rng) -> Vec<BattleReport> {
    let tick = world.tick();

    for i in 0..world.factions.len() {
        let at_peace = !world
            .wars
            .iter()
            .any(|w| w.involves(FactionId::new(i as u32)));
        let faction = &mut world.factions[i];
        if faction.resources.gold >= RECRUIT_GOLD_COST && faction.population > RECRUIT_POP_COST {
            let recruits = (faction.resources.gold / RECRUIT_GOLD_COST)
                .min(faction.population / RECRUIT_POP_COST);
            if recruits > 0 {
                faction.resources.gold -= recruits * RECRUIT_GOLD_COST;
                faction.population -= recruits * RECRUIT_POP_COST;
                faction.army += recruits;
            }
        }
        if at_peace {
            faction.morale = (faction.morale + 1.0).min(100.0);
        }
    }

    let wars = &mut world.wars;
    let factions = &mut world.factions;
    let mut reports = Vec::new();
    let mut i = 0;
    while i < wars.len() {
        let (ai, bi) = (wars[i].a.index(), wars[i].b.index());
        {
            let (fa, fb) = pair_mut(factions, ai, bi);
            if collapsed(fa) || collapsed(fb) {
                wars.remove(i);
                continue;
            }

            let event = &BATTLE_EVENTS[rng.gen_range(0..BATTLE_EVENTS.len())];
            let a_strength =
                fa.army as f64 * (fa.morale / 100.0) * event.a_mod * rng.gen_range(0.8..1.2);
            let b_strength =
                fb.army as f64 * (fb.morale / 100.0) * event.b_mod * rng.gen_range(0.8..1.2);
            let total = a_strength + b_strength;
            if total <= 0.0 {
                // Degenerate strengths: no combat this tick.
                i += 1;
                continue;
            }

            let a_loss = (((b_strength / total) * fa.army as f64 * 0.5).floor() as u64).max(1);
            let b_loss = (((a_strength / total) * fb.army as f64 * 0.5).floor() as u64).max(1);
            fa.army -= a_loss.min(fa.army);
            fb.army -= b_loss.min(fb.army);
            fa.population = fa.population.saturating_sub(a_loss);
            fb.population = fb.population.saturating_sub(b_loss);
            fa.morale = (fa.morale - (5.0 + 0.1 * b_loss as f64).floor()).max(0.0);
            fb.morale = (fb.morale - (5.0 + 0.1 * a_loss as f64).floor()).max(0.0);

            let war = &mut wars[i];
            war.a_score += b_loss;
            war.b_score += a_loss;
            let record = BattleRecord {
                tick,
                event: event.name,
                a_loss,
                b_loss,
            };
            war.history.push(record.clone());
            reports.push(BattleReport {
                a: war.a,
                b: war.b,
                record,
            });
        }

        let (fa, fb) = pair_mut(factions, ai, bi);
        if collapsed(fa) || collapsed(fb) {
            wars.remove(i);
        } else {
            i += 1;
        }
    }
    reports
}

/// Per-war view for one faction: the standing the UI layer reports.
#[derive(Debug, Clone)]
pub struct WarReport {
    pub enemy: String,
    pub our_score: u64,
    pub their_score: u64,
    pub last: Option<BattleRecord>,
}

pub fn war_report(world: &World, id: FactionId) -> Vec<WarReport> {
    world
        .wars
        .iter()
        .filter(|w| w.involves(id))
        .filter_map(|w| {
            let (enemy_id, our_score, their_score) = if w.a == id {
                (w.b, w.a_score, w.b_score)
            } else {
                (w.a, w.b_score, w.a_score)
            };
            let enemy = world.faction(enemy_id)?;
            Some(WarReport {
                enemy: enemy.name.clone(),
                our_score,
                their_score,
                last: w.history.last().cloned(),
            })
        })
        .collect()
}

pub struct WarSystem;

impl WarSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for WarSystem {
    fn name(&self) -> &str {
        "war"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world.battle_log = war_tick(world, rng);
        Ok(())
    }
}
