use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dominion::faction::{Faction, FactionId};
use dominion::systems::{declare_war, war_report, war_tick};
use dominion::world::{TilePos, World};

fn world_with_factions(count: u32) -> World {
    let mut world = World::new(8, 8);
    for i in 0..count {
        let id = FactionId::new(i);
        let mut faction = Faction::new(
            id,
            format!("Faction {}", i + 1),
            0xffffff,
            TilePos::new(2 + i, 2),
        );
        faction.resources.gold = 0;
        world.factions.push(faction);
    }
    world
}

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[test]
fn declare_war_is_idempotent_and_rejects_self_pairs() {
    let mut world = world_with_factions(3);
    let (a, b) = (FactionId::new(0), FactionId::new(1));

    declare_war(&mut world, a, a);
    assert!(world.wars.is_empty());

    declare_war(&mut world, a, b);
    declare_war(&mut world, a, b);
    declare_war(&mut world, b, a);
    assert_eq!(world.wars.len(), 1);

    declare_war(&mut world, a, FactionId::new(7));
    assert_eq!(world.wars.len(), 1, "unknown faction must be a no-op");
}

#[test]
fn recruitment_spends_gold_and_population() {
    let mut world = world_with_factions(1);
    {
        let f = &mut world.factions[0];
        f.resources.gold = 100;
        f.population = 1000;
    }

    war_tick(&mut world, &mut rng(1));

    let f = &world.factions[0];
    // min(100/5, 1000/10) = 20 recruits at 5 gold and 10 people each.
    assert_eq!(f.army, 20);
    assert_eq!(f.resources.gold, 0);
    assert_eq!(f.population, 800);
}

#[test]
fn poor_or_tiny_factions_recruit_nobody() {
    let mut world = world_with_factions(2);
    world.factions[0].resources.gold = 4;
    world.factions[0].population = 1000;
    world.factions[1].resources.gold = 100;
    world.factions[1].population = 10;

    war_tick(&mut world, &mut rng(2));

    assert_eq!(world.factions[0].army, 0);
    assert_eq!(world.factions[1].army, 0);
}

#[test]
fn peacetime_morale_regenerates_to_the_cap() {
    let mut world = world_with_factions(2);
    world.factions[0].morale = 40.0;
    world.factions[1].morale = 99.5;

    war_tick(&mut world, &mut rng(3));

    assert_eq!(world.factions[0].morale, 41.0);
    assert_eq!(world.factions[1].morale, 100.0);
}

#[test]
fn battles_inflict_at_least_one_loss_per_side() {
    let mut world = world_with_factions(2);
    for f in &mut world.factions {
        f.army = 100;
        f.population = 1000;
    }
    declare_war(&mut world, FactionId::new(0), FactionId::new(1));

    let reports = war_tick(&mut world, &mut rng(4));

    assert_eq!(reports.len(), 1);
    let record = &reports[0].record;
    assert!(record.a_loss >= 1);
    assert!(record.b_loss >= 1);
    assert_eq!(world.factions[0].army, 100 - record.a_loss);
    assert_eq!(world.factions[1].army, 100 - record.b_loss);
    assert_eq!(world.factions[0].population, 1000 - record.a_loss);
    assert!(world.factions[0].morale < 100.0);
    assert_eq!(world.wars[0].a_score, record.b_loss);
    assert_eq!(world.wars[0].b_score, record.a_loss);
    assert_eq!(world.wars[0].history.len(), 1);
}

#[test]
fn war_dissolves_when_an_army_is_spent() {
    let mut world = world_with_factions(2);
    world.factions[0].army = 0;
    world.factions[0].population = 5; // too small to re-recruit
    world.factions[1].army = 50;
    world.factions[1].population = 5;
    declare_war(&mut world, FactionId::new(0), FactionId::new(1));

    let reports = war_tick(&mut world, &mut rng(5));

    assert!(reports.is_empty());
    assert!(world.wars.is_empty());
}

#[test]
fn war_dissolves_on_morale_collapse() {
    let mut world = world_with_factions(2);
    for f in &mut world.factions {
        f.army = 50;
        f.population = 5;
    }
    world.factions[1].morale = 20.0;
    declare_war(&mut world, FactionId::new(0), FactionId::new(1));

    war_tick(&mut world, &mut rng(6));

    assert!(world.wars.is_empty());
}

#[test]
fn wars_grind_to_dissolution_within_bounded_ticks() {
    let mut world = world_with_factions(2);
    for f in &mut world.factions {
        f.army = 40;
        f.population = 5;
    }
    declare_war(&mut world, FactionId::new(0), FactionId::new(1));

    let mut rng = rng(7);
    let mut ticks = 0;
    while !world.wars.is_empty() {
        world.advance_tick();
        war_tick(&mut world, &mut rng);
        ticks += 1;
        assert!(ticks < 200, "war failed to terminate");
    }
    // Morale drops at least 5 per battle, so collapse is inevitable.
    assert!(world.factions[0].morale <= 25.0 || world.factions[1].morale <= 25.0
        || world.factions[0].army == 0
        || world.factions[1].army == 0);
}

#[test]
fn war_reports_are_oriented_per_faction() {
    let mut world = world_with_factions(2);
    for f in &mut world.factions {
        f.army = 100;
        f.population = 1000;
    }
    declare_war(&mut world, FactionId::new(0), FactionId::new(1));
    war_tick(&mut world, &mut rng(8));

    let our = war_report(&world, FactionId::new(0));
    let theirs = war_report(&world, FactionId::new(1));
    assert_eq!(our.len(), 1);
    assert_eq!(our[0].enemy, "Faction 2");
    assert_eq!(theirs[0].enemy, "Faction 1");
    assert_eq!(our[0].our_score, theirs[0].their_score);
    assert!(our[0].last.is_some());
}
