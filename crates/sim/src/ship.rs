//! Ship component: per-ship identity, stats, and tactical sub-state.

use glam::Vec2;
use hecs::Entity;
use mapgen::ShipClass;
use rand::Rng;

use crate::operator::OperatorId;
use crate::progression::OperatorLoadout;

/// Transient tactical sub-state layered on top of combat engagement. Both
/// non-normal states are sticky: entered on a threshold, left only on an
/// explicit exit condition, so a ship does not flip between fighting and
/// fleeing every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    Normal,
    Fleeing,
    Chasing(Entity),
}

/// A ship in flight. Position/facing live in [`engine_core::Transform`],
/// health in [`engine_core::Health`].
#[derive(Debug, Clone)]
pub struct Ship {
    pub owner: OperatorId,
    pub class: ShipClass,
    /// Planet this ship launched from. `None` for ability-spawned missiles.
    pub origin: Option<Entity>,
    /// Planet this ship is flying to.
    pub dest: Entity,
    pub speed: f32,
    pub damage: f32,
    /// Smoothed steering heading (unit vector).
    pub heading: Vec2,
    /// Combat hold: suppresses straight-line transit movement.
    pub stationary: bool,
    /// Missiles skip collision, combat, and avoidance entirely.
    pub is_missile: bool,
    /// Sim time of spawn.
    pub spawned_at: f64,
    /// Seconds this ship may live before auto-expiring with an explosion.
    pub max_lifetime: f32,
    pub tactic: Tactic,
}

impl Ship {
    /// Build a ship of `class` with the operator's progression multipliers
    /// applied. Returns the ship and its max health (for the Health
    /// component).
    pub fn spawn_stats(
        class: ShipClass,
        owner: OperatorId,
        origin: Option<Entity>,
        dest: Entity,
        loadout: &OperatorLoadout,
        now: f64,
        lifetime_range: (f32, f32),
    ) -> (Self, f32) {
        let (hp, damage, speed, _) = class.base_stats();
        let mut rng = rand::thread_rng();
        let (lo, hi) = lifetime_range;
        let ship = Self {
            owner,
            class,
            origin,
            dest,
            speed: speed * loadout.speed_mult,
            damage: damage * loadout.damage_mult,
            heading: Vec2::X,
            stationary: false,
            is_missile: false,
            spawned_at: now,
            max_lifetime: lo + rng.gen::<f32>() * (hi - lo).max(0.0),
            tactic: Tactic::Normal,
        };
        (ship, hp * loadout.health_mult)
    }

    /// Seconds this ship has existed.
    pub fn age(&self, now: f64) -> f32 {
        (now - self.spawned_at) as f32
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) > self.max_lifetime
    }
}
