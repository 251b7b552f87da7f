//! Planet component: ownership, orbit state, production, attack targeting.

use engine_core::OrbitParams;
use hecs::Entity;
use mapgen::{PlanetSeed, ShipClass};

use crate::operator::OperatorId;

/// Visual spin rate, radians per second. Presentation only.
const ROTATION_RATE: f32 = 0.35;

/// A planet. Health lives in the shared [`engine_core::Health`] component;
/// position in [`engine_core::Transform`], recomputed from the orbit each
/// tick.
#[derive(Debug, Clone)]
pub struct Planet {
    pub name: String,
    pub owner: Option<OperatorId>,
    /// Ship archetype this planet produces.
    pub class: ShipClass,
    pub orbit: OrbitParams,
    /// Seconds of orbital motion accumulated. Held still while the planet
    /// is orbitally frozen, which is why it is per-planet rather than the
    /// global sim time.
    pub orbit_time: f64,
    pub radius: f32,
    /// Visual rotation angle.
    pub rotation: f32,
    /// Planets this one is currently attacking, bounded by the config's
    /// max-targets count.
    pub targets: Vec<Entity>,
    /// Round-robin cursor into `targets`.
    next_target: usize,
    /// Production progress, 0..1. Completed production waits at 1.0 until a
    /// target exists to send the ship at.
    pub production: f32,
}

impl Planet {
    pub fn from_seed(seed: &PlanetSeed) -> Self {
        Self {
            name: seed.name.clone(),
            owner: seed.owner.map(OperatorId),
            class: seed.class,
            orbit: seed.orbit,
            orbit_time: 0.0,
            radius: seed.radius,
            rotation: 0.0,
            targets: Vec::new(),
            next_target: 0,
            production: 0.0,
        }
    }

    /// Advance orbital time and visual spin. Frozen planets skip this.
    pub fn advance_orbit(&mut self, dt: f32) {
        self.orbit_time += dt as f64;
        self.rotation = (self.rotation + ROTATION_RATE * dt) % std::f32::consts::TAU;
    }

    /// Add an attack target. Returns `false` when the target is already
    /// present or the bound is hit.
    pub fn add_target(&mut self, target: Entity, max_targets: usize) -> bool {
        if self.targets.contains(&target) || self.targets.len() >= max_targets {
            return false;
        }
        self.targets.push(target);
        true
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
        self.next_target = 0;
    }

    pub fn remove_target(&mut self, target: Entity) {
        self.targets.retain(|&t| t != target);
        if self.next_target >= self.targets.len() {
            self.next_target = 0;
        }
    }

    /// Advance production by `dt` scaled by `mult`. Returns the destination
    /// for a newly completed ship, if one launched this tick.
    pub fn step_production(&mut self, dt: f32, mult: f32) -> Option<Entity> {
        if self.owner.is_none() {
            // Neutral worlds do not build fleets.
            self.production = 0.0;
            return None;
        }
        let (_, _, _, secs) = self.class.base_stats();
        self.production = (self.production + dt * mult / secs).min(1.0);
        if self.production >= 1.0 && !self.targets.is_empty() {
            self.production = 0.0;
            let dest = self.targets[self.next_target % self.targets.len()];
            self.next_target = (self.next_target + 1) % self.targets.len();
            return Some(dest);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::OrbitParams;

    fn seed() -> PlanetSeed {
        PlanetSeed {
            name: "Koria".into(),
            orbit: OrbitParams::circular(300.0, 0.0, 0.1),
            radius: 24.0,
            class: ShipClass::Fighter,
            owner: Some(0),
            start_health_frac: 0.6,
        }
    }

    #[test]
    fn planet_target_bound_enforced() {
        let mut p = Planet::from_seed(&seed());
        let world = &mut hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let c = world.spawn(());
        assert!(p.add_target(a, 2));
        assert!(!p.add_target(a, 2), "duplicate target accepted");
        assert!(p.add_target(b, 2));
        assert!(!p.add_target(c, 2), "target bound ignored");
    }

    #[test]
    fn planet_production_waits_for_targets() {
        let mut p = Planet::from_seed(&seed());
        for _ in 0..600 {
            assert!(p.step_production(1.0 / 60.0, 1.0).is_none());
        }
        assert_eq!(p.production, 1.0, "completed production should hold at 1");

        let world = &mut hecs::World::new();
        let t = world.spawn(());
        p.add_target(t, 3);
        assert_eq!(p.step_production(1.0 / 60.0, 1.0), Some(t));
        assert_eq!(p.production, 0.0);
    }

    #[test]
    fn planet_neutral_does_not_produce() {
        let mut s = seed();
        s.owner = None;
        let mut p = Planet::from_seed(&s);
        let world = &mut hecs::World::new();
        let t = world.spawn(());
        p.add_target(t, 3);
        for _ in 0..1200 {
            assert!(p.step_production(1.0 / 60.0, 1.0).is_none());
        }
    }
}
