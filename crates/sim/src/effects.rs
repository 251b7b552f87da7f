//! Transient visual artifacts the registry owns: explosions.

use engine_core::{Lifetime, Transform, World};
use glam::Vec2;
use hecs::Entity;

use crate::game::Game;

/// How long an explosion lingers for presentation.
const EXPLOSION_SECONDS: f32 = 0.8;

/// Marker + sizing for one explosion. Progress comes from the paired
/// [`Lifetime`] component.
#[derive(Debug, Clone, Copy)]
pub struct Explosion {
    pub radius: f32,
}

/// Emit one explosion artifact at a position.
pub(crate) fn spawn_explosion(world: &mut World, pos: Vec2, radius: f32) {
    world.spawn((
        Explosion { radius },
        Transform::from_position(pos),
        Lifetime::new(EXPLOSION_SECONDS),
    ));
}

/// Age explosions and drop the ones that finished.
pub(crate) fn update_explosions(game: &mut Game, dt: f32) {
    let mut expired: Vec<Entity> = Vec::new();
    for (e, (_, lifetime)) in game.world.query_mut::<(&Explosion, &mut Lifetime)>() {
        if lifetime.update(dt) {
            expired.push(e);
        }
    }
    for e in expired {
        let _ = game.world.despawn(e);
    }
}
