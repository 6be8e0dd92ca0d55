pub mod border;
pub mod engine;
pub mod faction;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod terrain;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use scenario::{Scenario, ScenarioLoader, WorldSize};
