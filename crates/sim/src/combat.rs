//! Combat state machine: decides which ship pairs are engaged, holds them
//! in place, and fires projectiles at a fixed rate.
//!
//! Engagement starts inside the engage distance and ends only beyond the
//! larger disengage distance; the gap between the two is hysteresis that
//! keeps pairs from flapping in and out of combat at the boundary.

use std::collections::HashMap;

use engine_core::Transform;
use glam::Vec2;
use hecs::Entity;

use crate::game::Game;
use crate::projectile::Projectile;
use crate::ship::Ship;

/// Clamp on how far ahead of a moving target shots are led, seconds.
const MAX_LEAD_TIME: f32 = 0.35;
/// Fraction of transit speed an engaged (combat-maneuvering) ship makes
/// good, used when predicting its near-future position.
const ENGAGED_DRIFT: f32 = 0.4;
/// Muzzle offset so a projectile doesn't spawn inside its shooter.
const MUZZLE_OFFSET: f32 = 14.0;

/// One ship's side of an engagement.
#[derive(Debug, Clone, Copy)]
pub struct Engagement {
    pub target: Entity,
    pub last_shot: f64,
}

/// Tracks which ships are in combat and with whom.
#[derive(Debug, Default)]
pub struct CombatManager {
    pub(crate) engaged: HashMap<Entity, Engagement>,
}

impl CombatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self, ship: Entity) -> bool {
        self.engaged.contains_key(&ship)
    }

    pub fn target_of(&self, ship: Entity) -> Option<Entity> {
        self.engaged.get(&ship).map(|e| e.target)
    }

    pub fn engaged_count(&self) -> usize {
        self.engaged.len()
    }

    /// Drop all combat records for a ship (on destruction).
    pub(crate) fn forget(&mut self, ship: Entity) {
        self.engaged.remove(&ship);
    }

    pub(crate) fn clear(&mut self) {
        self.engaged.clear();
    }
}

struct ShipSnap {
    e: Entity,
    owner: crate::operator::OperatorId,
    pos: Vec2,
    vel: Vec2,
}

/// Per-tick combat update: maintain engagements, set stationary holds, and
/// fire at engaged targets in range.
pub(crate) fn update_combat(game: &mut Game, _dt: f32) {
    let now = game.time;
    let engage = game.config.engage_distance;
    let disengage = game.config.disengage_distance;
    let range = game.config.projectile_range;
    let interval = game.config.fire_interval as f64;

    let ships: Vec<ShipSnap> = game
        .world
        .query::<(&Ship, &Transform)>()
        .iter()
        .filter(|(_, (s, _))| !s.is_missile)
        .map(|(e, (s, t))| ShipSnap {
            e,
            owner: s.owner,
            pos: t.position,
            vel: s.heading * s.speed * if s.stationary { ENGAGED_DRIFT } else { 1.0 },
        })
        .collect();
    let index: HashMap<Entity, usize> = ships.iter().enumerate().map(|(i, s)| (s.e, i)).collect();

    // Release engagements whose target died or slipped past the
    // disengage distance. Inside the 80-120 band nothing changes.
    let released: Vec<Entity> = game
        .combat
        .engaged
        .iter()
        .filter_map(|(&e, eng)| match (index.get(&e), index.get(&eng.target)) {
            (Some(&i), Some(&j)) => {
                (ships[i].pos.distance(ships[j].pos) > disengage).then_some(e)
            }
            _ => Some(e),
        })
        .collect();
    for e in released {
        game.combat.engaged.remove(&e);
    }

    // New engagements: nearest enemy inside the engage distance. The
    // partner is locked back onto us unless it is already fighting.
    for i in 0..ships.len() {
        if game.combat.engaged.contains_key(&ships[i].e) {
            continue;
        }
        let mut best: Option<(usize, f32)> = None;
        for (j, other) in ships.iter().enumerate() {
            if j == i || other.owner == ships[i].owner {
                continue;
            }
            let d = ships[i].pos.distance(other.pos);
            if d <= engage && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        if let Some((j, _)) = best {
            // Backdate last_shot so the opening shot fires this tick.
            game.combat.engaged.insert(
                ships[i].e,
                Engagement {
                    target: ships[j].e,
                    last_shot: now - interval,
                },
            );
            game.combat.engaged.entry(ships[j].e).or_insert(Engagement {
                target: ships[i].e,
                last_shot: now - interval,
            });
        }
    }

    // Stationary hold follows engagement exactly.
    for (e, ship) in game.world.query_mut::<&mut Ship>() {
        if !ship.is_missile {
            ship.stationary = game.combat.engaged.contains_key(&e);
        }
    }

    // Fire: one shot per elapsed interval while the target is in range,
    // aimed at a slightly future-predicted position.
    let mut shots: Vec<(usize, usize)> = Vec::new();
    for (e, eng) in game.combat.engaged.iter_mut() {
        let (Some(&i), Some(&j)) = (index.get(e), index.get(&eng.target)) else {
            continue;
        };
        if ships[i].pos.distance(ships[j].pos) > range {
            continue;
        }
        if now - eng.last_shot >= interval {
            eng.last_shot = now;
            shots.push((i, j));
        }
    }

    for (i, j) in shots {
        let shooter = &ships[i];
        let target = &ships[j];
        let dist = shooter.pos.distance(target.pos);
        let lead = (dist / game.config.projectile_speed).min(MAX_LEAD_TIME);
        let aim = target.pos + target.vel * lead;
        let dir = (aim - shooter.pos).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let damage = game
            .world
            .get::<&Ship>(shooter.e)
            .map(|s| s.damage)
            .unwrap_or(0.0)
            * game.abilities.ship_damage_mult(shooter.owner, now);
        let mut tf = Transform::from_position(shooter.pos + dir * MUZZLE_OFFSET);
        tf.face_along(dir);
        game.world.spawn((
            Projectile::new(
                shooter.owner,
                shooter.e,
                Some(target.e),
                dir,
                game.config.projectile_speed,
                damage,
                game.config.projectile_range,
            ),
            tf,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::two_ship_game;

    #[test]
    fn combat_engages_inside_engage_distance_only() {
        let (mut game, a, _b) = two_ship_game(100.0);
        update_combat(&mut game, 1.0 / 60.0);
        assert!(!game.combat.is_engaged(a), "100 units apart must not engage");

        let (mut game, a, b) = two_ship_game(70.0);
        update_combat(&mut game, 1.0 / 60.0);
        assert_eq!(game.combat.target_of(a), Some(b));
        assert_eq!(game.combat.target_of(b), Some(a));
    }

    #[test]
    fn combat_hysteresis_holds_through_the_band() {
        let (mut game, a, b) = two_ship_game(70.0);
        update_combat(&mut game, 1.0 / 60.0);
        assert!(game.combat.is_engaged(a));

        // Drift into the 80-120 band: still locked. Ship `a` sits at
        // (400, 300) in the fixture.
        game.set_position_for_test(b, glam::Vec2::new(510.0, 300.0));
        update_combat(&mut game, 1.0 / 60.0);
        assert!(game.combat.is_engaged(a));
        assert!(game.combat.is_engaged(b));

        // Past the disengage distance: released.
        game.set_position_for_test(b, glam::Vec2::new(530.0, 300.0));
        update_combat(&mut game, 1.0 / 60.0);
        assert!(!game.combat.is_engaged(a));
        assert!(!game.combat.is_engaged(b));
    }

    #[test]
    fn combat_marks_engaged_ships_stationary() {
        let (mut game, a, b) = two_ship_game(60.0);
        update_combat(&mut game, 1.0 / 60.0);
        let held = game.world.get::<&Ship>(a).unwrap().stationary;
        assert!(held);
        let held = game.world.get::<&Ship>(b).unwrap().stationary;
        assert!(held);
    }

    #[test]
    fn combat_fires_at_fixed_interval() {
        let (mut game, a, _b) = two_ship_game(60.0);
        update_combat(&mut game, 1.0 / 60.0);
        let count = |game: &Game| {
            game.world
                .query::<&Projectile>()
                .iter()
                .filter(|(_, p)| p.owner == game.world.get::<&Ship>(a).unwrap().owner)
                .count()
        };
        assert_eq!(count(&game), 1, "opening shot should fire on engage");

        // A tick later: interval not yet elapsed, no second shot.
        game.time += 1.0 / 60.0;
        update_combat(&mut game, 1.0 / 60.0);
        assert_eq!(count(&game), 1);

        // After the full interval the next shot fires.
        game.time += game.config.fire_interval as f64;
        update_combat(&mut game, 1.0 / 60.0);
        assert_eq!(count(&game), 2);
    }
}
