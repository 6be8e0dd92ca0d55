mod bookkeeping;
mod economy;
mod war;

pub use bookkeeping::BookkeepingSystem;
pub use economy::{
    economy_tick, growth_rate, tax_rate, EconomySystem, LUXURY_SALE_RATE, SHORTAGE_DECLINE,
    SUBSISTENCE_RATE, WORKERS_PER_BUILDING,
};
pub use war::{
    declare_war, war_report, war_tick, BattleEventSpec, WarReport, WarSystem, BATTLE_EVENTS,
    MORALE_COLLAPSE, RECRUIT_GOLD_COST, RECRUIT_POP_COST,
};
