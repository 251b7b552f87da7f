//! Projectiles: fired by engaged ships, flying a fixed direction until they
//! hit, run out of range, or leave the play field.

use engine_core::Transform;
use glam::Vec2;
use hecs::Entity;

use crate::game::Game;
use crate::operator::OperatorId;
use crate::ship::Ship;

/// A projectile in flight. Direction is fixed at spawn (aimed at a slightly
/// future-predicted target position); the `active` flag flips exactly once.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub owner: OperatorId,
    /// Ship that fired this projectile.
    pub source: Entity,
    /// Ship it was aimed at, if any. Collision checks hit whatever is in
    /// the way, not just this ship.
    pub target: Option<Entity>,
    pub dir: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub traveled: f32,
    pub max_range: f32,
    pub active: bool,
}

impl Projectile {
    pub fn new(
        owner: OperatorId,
        source: Entity,
        target: Option<Entity>,
        dir: Vec2,
        speed: f32,
        damage: f32,
        max_range: f32,
    ) -> Self {
        Self {
            owner,
            source,
            target,
            dir,
            speed,
            damage,
            traveled: 0.0,
            max_range,
            active: true,
        }
    }
}

/// Advance projectiles, resolve projectile-vs-ship hits, and purge
/// everything that went inactive this tick.
pub(crate) fn update_projectiles(game: &mut Game, dt: f32) {
    let bound = game.config.world_half_extent;

    for (_, (proj, tf)) in game.world.query_mut::<(&mut Projectile, &mut Transform)>() {
        if !proj.active {
            continue;
        }
        let step = proj.dir * proj.speed * dt;
        tf.position += step;
        proj.traveled += step.length();
        if proj.traveled >= proj.max_range
            || tf.position.x.abs() > bound
            || tf.position.y.abs() > bound
        {
            proj.active = false;
        }
    }

    // Hit scan against current ship positions. Missiles are exempt.
    let ships: Vec<(Entity, OperatorId, Vec2)> = game
        .world
        .query::<(&Ship, &Transform)>()
        .iter()
        .filter(|(_, (s, _))| !s.is_missile)
        .map(|(e, (s, t))| (e, s.owner, t.position))
        .collect();
    let hit_radius = game.config.ship_hit_radius;

    let mut hits: Vec<(Entity, Entity, f32)> = Vec::new();
    for (pe, (proj, tf)) in game.world.query::<(&Projectile, &Transform)>().iter() {
        if !proj.active {
            continue;
        }
        let mut best: Option<(Entity, f32)> = None;
        for &(se, owner, pos) in &ships {
            if owner == proj.owner {
                continue;
            }
            let d = (pos - tf.position).length();
            if d <= hit_radius && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((se, d));
            }
        }
        if let Some((se, _)) = best {
            hits.push((pe, se, proj.damage));
        }
    }

    for (pe, se, damage) in hits {
        let already_spent = match game.world.get::<&mut Projectile>(pe) {
            Ok(mut p) => {
                if p.active {
                    p.active = false;
                    false
                } else {
                    true
                }
            }
            Err(_) => true,
        };
        if !already_spent {
            game.damage_ship(se, damage);
        }
    }

    let spent: Vec<Entity> = game
        .world
        .query::<&Projectile>()
        .iter()
        .filter(|(_, p)| !p.active)
        .map(|(e, _)| e)
        .collect();
    for e in spent {
        let _ = game.world.despawn(e);
    }
}
