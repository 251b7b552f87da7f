//! Defensive snapshot of simulation state for presentation.
//!
//! Rendering reads these copies outside the tick boundary and never touches
//! live collections; a contended lock means the frame is simply skipped
//! (see [`engine_core::Engine::try_with_sim`]).

use engine_core::{Health, Lifetime, Transform};
use glam::Vec2;
use hecs::Entity;

use crate::effects::Explosion;
use crate::game::Game;
use crate::operator::OperatorId;
use crate::planet::Planet;
use crate::projectile::Projectile;
use crate::ship::Ship;

#[derive(Debug, Clone)]
pub struct PlanetView {
    pub id: Entity,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub owner: Option<OperatorId>,
    pub health: f32,
    pub max_health: f32,
    pub rotation: f32,
    pub depth: u8,
    /// Production progress, 0..1.
    pub production: f32,
    pub targets: Vec<Entity>,
    pub infected: bool,
    pub cursed: bool,
    pub frozen: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ShipView {
    pub id: Entity,
    pub owner: OperatorId,
    pub class: mapgen::ShipClass,
    pub position: Vec2,
    /// Facing angle in radians.
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub is_missile: bool,
    pub engaged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectileView {
    pub position: Vec2,
    pub rotation: f32,
    pub owner: OperatorId,
}

#[derive(Debug, Clone, Copy)]
pub struct ExplosionView {
    pub position: Vec2,
    pub radius: f32,
    /// 0 at spawn, 1 at burn-out.
    pub progress: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct BlackHoleView {
    pub position: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub owner: OperatorId,
}

#[derive(Debug, Clone)]
pub struct OperatorView {
    pub id: OperatorId,
    pub name: String,
    pub color: [f32; 3],
    pub is_human: bool,
    pub planets: usize,
    pub ships: usize,
    /// Structurally eliminated: zero planets and zero ships.
    pub eliminated: bool,
}

/// One frame's worth of read-only state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub time: f64,
    pub tick: u64,
    /// Visual radius of the central star.
    pub star_radius: f32,
    /// Half extent of the square play field.
    pub world_half_extent: f32,
    pub planets: Vec<PlanetView>,
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    pub explosions: Vec<ExplosionView>,
    pub black_holes: Vec<BlackHoleView>,
    pub operators: Vec<OperatorView>,
    pub winner: Option<OperatorId>,
}

impl Game {
    /// Clone everything presentation needs for one frame.
    pub fn snapshot(&self) -> Snapshot {
        let now = self.time;

        let planets = self
            .world
            .query::<(&Planet, &Transform, &Health)>()
            .iter()
            .map(|(e, (p, t, h))| PlanetView {
                id: e,
                name: p.name.clone(),
                position: t.position,
                radius: p.radius,
                owner: p.owner,
                health: h.current,
                max_health: h.max,
                rotation: p.rotation,
                depth: p.orbit.depth,
                production: p.production,
                targets: p.targets.clone(),
                infected: self.abilities.is_infected(e),
                cursed: self.abilities.is_cursed(e, now),
                frozen: self.abilities.is_frozen(e, now),
            })
            .collect();

        let ships = self
            .world
            .query::<(&Ship, &Transform, &Health)>()
            .iter()
            .map(|(e, (s, t, h))| ShipView {
                id: e,
                owner: s.owner,
                class: s.class,
                position: t.position,
                rotation: t.rotation,
                health: h.current,
                max_health: h.max,
                is_missile: s.is_missile,
                engaged: self.combat.is_engaged(e),
            })
            .collect();

        let projectiles = self
            .world
            .query::<(&Projectile, &Transform)>()
            .iter()
            .map(|(_, (p, t))| ProjectileView {
                position: t.position,
                rotation: t.rotation,
                owner: p.owner,
            })
            .collect();

        let explosions = self
            .world
            .query::<(&Explosion, &Transform, &Lifetime)>()
            .iter()
            .map(|(_, (x, t, l))| ExplosionView {
                position: t.position,
                radius: x.radius,
                progress: l.progress(),
            })
            .collect();

        let black_holes = self
            .abilities
            .black_holes()
            .map(|b| BlackHoleView {
                position: b.pos,
                radius: b.radius,
                rotation: b.rotation,
                owner: b.owner,
            })
            .collect();

        let operators = self
            .operators
            .iter()
            .map(|o| {
                let planets = self.planet_count_of(o.id);
                let ships = self.ship_count_of(o.id);
                OperatorView {
                    id: o.id,
                    name: o.name.clone(),
                    color: o.color,
                    is_human: o.is_human(),
                    planets,
                    ships,
                    eliminated: planets == 0 && ships == 0,
                }
            })
            .collect();

        Snapshot {
            time: now,
            tick: self.tick_count,
            star_radius: self.config.star_radius,
            world_half_extent: self.config.world_half_extent,
            planets,
            ships,
            projectiles,
            explosions,
            black_holes,
            operators,
            winner: self.winner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::conquest_game;
    use mapgen::ShipClass;

    #[test]
    fn snapshot_reflects_registry_counts() {
        let mut game = conquest_game();
        let dest = game.planet_entities()[1];
        game.spawn_ship_at(
            Vec2::new(400.0, 300.0),
            ShipClass::Fighter,
            OperatorId(0),
            None,
            dest,
        );
        let snap = game.snapshot();
        assert_eq!(snap.planets.len(), 4);
        assert_eq!(snap.ships.len(), 1);
        assert_eq!(snap.operators.len(), 2);
        assert!(snap.winner.is_none());
        let human = &snap.operators[0];
        assert!(human.is_human);
        assert_eq!(human.planets, 1);
        assert_eq!(human.ships, 1);
    }

    #[test]
    fn snapshot_operator_elimination_is_structural() {
        let mut game = conquest_game();
        for e in game.planet_entities() {
            game.world.get::<&mut Planet>(e).unwrap().owner = Some(OperatorId(0));
        }
        let snap = game.snapshot();
        assert!(snap.operators[1].eliminated);
        assert!(!snap.operators[0].eliminated);
    }
}
