//! Planet layout generation: orbit slots, production classes, operator
//! home worlds, and planet names.
//!
//! Orbital speeds use Kepler's ω = √(μ/a³) so inner planets circle faster;
//! slots are spread across the radius band with per-slot jitter so the ring
//! spacing never looks gridded.

use engine_core::{angular_speed_for_radius, OrbitParams};
use rand::prelude::*;

/// Ship archetype a planet produces. Chosen at map generation and fixed for
/// the life of the planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipClass {
    /// Balanced line ship - the bulk of every fleet.
    Fighter,
    /// Slow, durable, hits hard. Produced less often.
    Cruiser,
    /// Fragile glass cannon for sieges.
    Bomber,
}

impl ShipClass {
    /// Base stats before operator multipliers:
    /// (max health, damage, speed, production seconds).
    pub fn base_stats(self) -> (f32, f32, f32, f32) {
        match self {
            ShipClass::Fighter => (100.0, 35.0, 95.0, 5.0),
            ShipClass::Cruiser => (180.0, 55.0, 68.0, 8.0),
            ShipClass::Bomber => (80.0, 95.0, 60.0, 9.5),
        }
    }
}

/// Parameters for generating one map.
#[derive(Debug, Clone)]
pub struct MapSpec {
    /// Total planets, home worlds included.
    pub planet_count: usize,
    /// Autonomous operators; the human operator is always present on top.
    pub autonomous_operators: usize,
    /// Inner bound of the orbit band (semi-major axis).
    pub orbit_min: f32,
    /// Outer bound of the orbit band (semi-major axis).
    pub orbit_max: f32,
    /// Optional seed for reproducible layouts (debug maps). `None` draws
    /// from entropy.
    pub seed: Option<u64>,
}

impl Default for MapSpec {
    fn default() -> Self {
        Self {
            planet_count: 12,
            autonomous_operators: 2,
            orbit_min: 180.0,
            orbit_max: 1050.0,
            seed: None,
        }
    }
}

/// One planet to be spawned into the registry.
#[derive(Debug, Clone)]
pub struct PlanetSeed {
    pub name: String,
    pub orbit: OrbitParams,
    pub radius: f32,
    pub class: ShipClass,
    /// Operator index (0 = human) or `None` for neutral.
    pub owner: Option<usize>,
    /// Fraction of max health the planet starts with; regen fills the rest.
    pub start_health_frac: f32,
}

/// A generated map: planets plus the operator roster size.
#[derive(Debug, Clone)]
pub struct MapLayout {
    pub planets: Vec<PlanetSeed>,
    /// Human + autonomous operators.
    pub operator_count: usize,
}

/// Fraction of max health a home world starts with.
const HOME_START_FRAC: f32 = 0.6;
/// Fraction of max health a neutral planet starts with.
const NEUTRAL_START_FRAC: f32 = 0.35;

/// Generate a complete layout from a spec.
pub fn generate(spec: &MapSpec) -> MapLayout {
    let operator_count = spec.autonomous_operators + 1;
    let planet_count = spec.planet_count.max(operator_count);
    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Build orbit slots with per-slot jitter so spacing isn't gridded.
    let mut slot_factors: Vec<f32> = (0..planet_count)
        .map(|i| {
            let t = (i as f32 + 1.0) / (planet_count as f32 + 1.0);
            t * (0.75 + rng.gen::<f32>() * 0.5)
        })
        .collect();
    slot_factors.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Home worlds spread evenly across the slot order so no operator starts
    // boxed into the inner ring.
    let home_stride = planet_count / operator_count;
    let home_slots: Vec<usize> = (0..operator_count).map(|k| k * home_stride).collect();

    let mut planets = Vec::with_capacity(planet_count);
    for i in 0..planet_count {
        let slot = slot_factors[i];
        let semi_major =
            (spec.orbit_min + (spec.orbit_max - spec.orbit_min) * slot).min(spec.orbit_max);
        let semi_minor = semi_major * (0.82 + rng.gen::<f32>() * 0.18);

        // Kepler speed with jitter; a quarter of the planets orbit retrograde.
        let speed = angular_speed_for_radius(semi_major) * (0.9 + rng.gen::<f32>() * 0.2);
        let angular_speed = if rng.gen::<f32>() < 0.25 { -speed } else { speed };

        let orbit = OrbitParams {
            semi_major,
            semi_minor,
            phase: rng.gen::<f32>() * std::f32::consts::TAU,
            angular_speed,
            swap_axes: rng.gen_bool(0.5),
            depth: i as u8,
        };

        let owner = home_slots.iter().position(|&s| s == i);
        let class = if owner.is_some() {
            // Home worlds always field the workhorse class.
            ShipClass::Fighter
        } else {
            match rng.gen_range(0..100) {
                0..=59 => ShipClass::Fighter,
                60..=84 => ShipClass::Cruiser,
                _ => ShipClass::Bomber,
            }
        };

        planets.push(PlanetSeed {
            name: planet_name(&mut rng),
            orbit,
            radius: 20.0 + rng.gen::<f32>() * 12.0,
            class,
            owner,
            start_health_frac: if owner.is_some() {
                HOME_START_FRAC
            } else {
                NEUTRAL_START_FRAC
            },
        });
    }

    log::debug!(
        "mapgen: {} planets, {} operators, orbits {:.0}-{:.0}",
        planets.len(),
        operator_count,
        spec.orbit_min,
        spec.orbit_max
    );

    MapLayout {
        planets,
        operator_count,
    }
}

/// Generate a planet name from syllables.
fn planet_name(rng: &mut StdRng) -> String {
    let syllables = [
        "Kor", "Vel", "Tha", "Mir", "Zan", "Oru", "Ceti", "Dra", "Hel", "Nyx", "Pra", "Sel",
        "Tor", "Ulm", "Vor", "Xel",
    ];
    let suffixes = ["ia", "os", "ar", "eth", "un", "is", "ul", "ae"];
    let mut name = format!(
        "{}{}",
        syllables[rng.gen_range(0..syllables.len())],
        suffixes[rng.gen_range(0..suffixes.len())]
    );
    if rng.gen_bool(0.3) {
        name.push_str(&format!(" {}", ["I", "II", "III", "IV"][rng.gen_range(0..4)]));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_same_seed_same_layout() {
        let spec = MapSpec {
            seed: Some(4242),
            ..Default::default()
        };
        let a = generate(&spec);
        let b = generate(&spec);
        assert_eq!(a.planets.len(), b.planets.len());
        assert_eq!(a.planets[0].name, b.planets[0].name);
        assert_eq!(a.planets[0].orbit, b.planets[0].orbit);
    }

    #[test]
    fn generate_one_home_world_per_operator() {
        let layout = generate(&MapSpec {
            planet_count: 14,
            autonomous_operators: 3,
            seed: Some(7),
            ..Default::default()
        });
        assert_eq!(layout.operator_count, 4);
        for op in 0..4 {
            let homes = layout
                .planets
                .iter()
                .filter(|p| p.owner == Some(op))
                .count();
            assert_eq!(homes, 1, "operator {op} should start with one planet");
        }
    }

    #[test]
    fn generate_orbits_within_band() {
        let spec = MapSpec {
            planet_count: 20,
            orbit_min: 200.0,
            orbit_max: 900.0,
            seed: Some(99),
            ..Default::default()
        };
        for p in &generate(&spec).planets {
            assert!(p.orbit.semi_major >= 200.0 && p.orbit.semi_major <= 900.0);
            assert!(p.orbit.semi_minor <= p.orbit.semi_major);
            assert!(p.orbit.angular_speed != 0.0);
        }
    }

    #[test]
    fn generate_never_fewer_planets_than_operators() {
        let layout = generate(&MapSpec {
            planet_count: 2,
            autonomous_operators: 4,
            seed: Some(1),
            ..Default::default()
        });
        assert!(layout.planets.len() >= layout.operator_count);
    }
}
