//! Starhold simulation core: a deterministic tick-driven space-conquest
//! strategy game. Orbiting planets produce ships that travel between
//! planets, fight at range, and capture territory until one operator
//! controls everything.
//!
//! The crate is headless. Presentation reads [`Snapshot`]s; input handling
//! pushes [`Intent`]s; the [`engine_core::Engine`] drives [`Game::tick`] at
//! a fixed rate.

mod abilities;
mod combat;
mod config;
mod effects;
mod game;
mod nav;
mod operator;
mod planet;
mod progression;
mod projectile;
mod ship;
mod snapshot;

pub use abilities::{AbilityKind, AbilityManager, AbilityRuntimeState, BlackHole};
pub use combat::CombatManager;
pub use config::SimConfig;
pub use game::{CommandError, Difficulty, Game, Intent, Outcome};
pub use operator::{AiState, Operator, OperatorId, OperatorKind};
pub use planet::Planet;
pub use progression::{OperatorLoadout, Progression};
pub use projectile::Projectile;
pub use ship::{Ship, Tactic};
pub use snapshot::{
    BlackHoleView, ExplosionView, OperatorView, PlanetView, ProjectileView, ShipView, Snapshot,
};

// Re-export the layer below so hosts only need this crate.
pub use engine_core::{Engine, Simulation};
pub use mapgen::{MapLayout, MapSpec, PlanetSeed, ShipClass};

/// Build a scheduler around a game, using the tick rates from its config.
pub fn engine_for(game: Game) -> Engine<Game> {
    let (tick_hz, slow_hz) = (game.config().tick_hz, game.config().slow_tick_hz);
    Engine::new(game, tick_hz, slow_hz)
}
