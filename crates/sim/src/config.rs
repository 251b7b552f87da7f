//! Simulation tunables. Loaded from sim.ron by the host at startup and
//! treated as read-only constants for the duration of a game session.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric tunables for one game session. Every field has a default so a
/// partial config file still loads; hot-reload is the host's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Tick rate in Hz.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64,
    /// Tick rate while the precision-targeting slow mode is active.
    #[serde(default = "default_slow_tick_hz")]
    pub slow_tick_hz: f64,
    /// Half extent of the square play field, centered on the star.
    #[serde(default = "default_world_half_extent")]
    pub world_half_extent: f32,
    /// Visual radius of the central star.
    #[serde(default = "default_star_radius")]
    pub star_radius: f32,
    /// Ships inside this radius of the star are destroyed outright.
    #[serde(default = "default_star_kill_radius")]
    pub star_kill_radius: f32,
    /// Planets on a generated map.
    #[serde(default = "default_planet_count")]
    pub planet_count: usize,
    /// Inner bound of the orbit band.
    #[serde(default = "default_orbit_min")]
    pub orbit_min: f32,
    /// Outer bound of the orbit band.
    #[serde(default = "default_orbit_max")]
    pub orbit_max: f32,
    /// Maximum planet health.
    #[serde(default = "default_planet_max_health")]
    pub planet_max_health: f32,
    /// Planet health regenerated per second.
    #[serde(default = "default_planet_regen_per_sec")]
    pub planet_regen_per_sec: f32,
    /// How many planets one planet may attack at once.
    #[serde(default = "default_planet_max_targets")]
    pub planet_max_targets: usize,
    /// Fraction of max health a captured planet restarts with.
    #[serde(default = "default_capture_health_frac")]
    pub capture_health_frac: f32,
    /// Separation at which two enemy ships lock into combat.
    #[serde(default = "default_engage_distance")]
    pub engage_distance: f32,
    /// Separation a locked pair must exceed to break combat. The gap above
    /// `engage_distance` is the anti-flapping hysteresis band.
    #[serde(default = "default_disengage_distance")]
    pub disengage_distance: f32,
    /// Seconds between shots while engaged.
    #[serde(default = "default_fire_interval")]
    pub fire_interval: f32,
    /// Projectile speed in units per second.
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: f32,
    /// Projectile maximum range.
    #[serde(default = "default_projectile_range")]
    pub projectile_range: f32,
    /// Radius used when testing projectiles against ships.
    #[serde(default = "default_ship_hit_radius")]
    pub ship_hit_radius: f32,
    /// Two enemy ships closer than this ram each other.
    #[serde(default = "default_ship_collision_radius")]
    pub ship_collision_radius: f32,
    /// Radius around the origin planet in which departing ships blend away
    /// from it instead of beelining to the target.
    #[serde(default = "default_launch_radius")]
    pub launch_radius: f32,
    /// Shortest randomized ship lifetime, seconds.
    #[serde(default = "default_ship_lifetime_min")]
    pub ship_lifetime_min: f32,
    /// Longest randomized ship lifetime, seconds.
    #[serde(default = "default_ship_lifetime_max")]
    pub ship_lifetime_max: f32,
    /// Base seconds between autonomous operator decisions.
    #[serde(default = "default_ai_decision_interval")]
    pub ai_decision_interval: f32,
    /// Base seconds between autonomous operator ability considerations.
    #[serde(default = "default_ai_ability_interval")]
    pub ai_ability_interval: f32,
    /// Seconds an infection lives on a planet.
    #[serde(default = "default_infection_duration")]
    pub infection_duration: f32,
    /// Global scale on ability effect strength.
    #[serde(default = "default_ability_power")]
    pub ability_power: f32,
}

fn default_tick_hz() -> f64 {
    60.0
}
fn default_slow_tick_hz() -> f64 {
    20.0
}
fn default_world_half_extent() -> f32 {
    1200.0
}
fn default_star_radius() -> f32 {
    40.0
}
fn default_star_kill_radius() -> f32 {
    45.0
}
fn default_planet_count() -> usize {
    12
}
fn default_orbit_min() -> f32 {
    180.0
}
fn default_orbit_max() -> f32 {
    1050.0
}
fn default_planet_max_health() -> f32 {
    7500.0
}
fn default_planet_regen_per_sec() -> f32 {
    25.0
}
fn default_planet_max_targets() -> usize {
    3
}
fn default_capture_health_frac() -> f32 {
    0.15
}
fn default_engage_distance() -> f32 {
    80.0
}
fn default_disengage_distance() -> f32 {
    120.0
}
fn default_fire_interval() -> f32 {
    0.5
}
fn default_projectile_speed() -> f32 {
    320.0
}
fn default_projectile_range() -> f32 {
    225.0
}
fn default_ship_hit_radius() -> f32 {
    12.0
}
fn default_ship_collision_radius() -> f32 {
    10.0
}
fn default_launch_radius() -> f32 {
    80.0
}
fn default_ship_lifetime_min() -> f32 {
    70.0
}
fn default_ship_lifetime_max() -> f32 {
    110.0
}
fn default_ai_decision_interval() -> f32 {
    3.5
}
fn default_ai_ability_interval() -> f32 {
    14.0
}
fn default_infection_duration() -> f32 {
    10.0
}
fn default_ability_power() -> f32 {
    1.0
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            slow_tick_hz: default_slow_tick_hz(),
            world_half_extent: default_world_half_extent(),
            star_radius: default_star_radius(),
            star_kill_radius: default_star_kill_radius(),
            planet_count: default_planet_count(),
            orbit_min: default_orbit_min(),
            orbit_max: default_orbit_max(),
            planet_max_health: default_planet_max_health(),
            planet_regen_per_sec: default_planet_regen_per_sec(),
            planet_max_targets: default_planet_max_targets(),
            capture_health_frac: default_capture_health_frac(),
            engage_distance: default_engage_distance(),
            disengage_distance: default_disengage_distance(),
            fire_interval: default_fire_interval(),
            projectile_speed: default_projectile_speed(),
            projectile_range: default_projectile_range(),
            ship_hit_radius: default_ship_hit_radius(),
            ship_collision_radius: default_ship_collision_radius(),
            launch_radius: default_launch_radius(),
            ship_lifetime_min: default_ship_lifetime_min(),
            ship_lifetime_max: default_ship_lifetime_max(),
            ai_decision_interval: default_ai_decision_interval(),
            ai_ability_interval: default_ai_ability_interval(),
            infection_duration: default_infection_duration(),
            ability_power: default_ability_power(),
        }
    }
}

impl SimConfig {
    /// Load config from a file. Missing or invalid files fall back to
    /// defaults with a warning; a bad config must not stop a game.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("Invalid sim config at {:?}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Strict load for tooling that wants the error.
    pub fn load_strict(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(ron::from_str(&data)?)
    }
}
