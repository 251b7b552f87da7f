//! Ship navigation and combat AI.
//!
//! Layered state machine per ship: transit, combat maneuvering, fleeing,
//! chasing, with emergency avoidance preempting everything when a ship
//! strays too close to the star or a planet it is not flying to. Steering
//! is a blend of a desired direction with repulsive hazard terms, smoothed
//! against the current heading so ships do not twitch.

use std::collections::HashSet;

use engine_core::{Health, OrbitParams, Transform};
use glam::Vec2;
use hecs::Entity;

use crate::game::Game;
use crate::operator::OperatorId;
use crate::planet::Planet;
use crate::ship::{Ship, Tactic};

// ── Steering tunables ───────────────────────────────────────────────────

/// Weight of the away-from-origin direction while inside the launch radius.
const LAUNCH_AWAY_BLEND: f32 = 0.7;
/// Exponential smoothing weight applied to the heading each tick.
const HEADING_SMOOTHING: f32 = 0.15;
/// Inside this distance of the destination surface, steer raw at it so
/// ships do not circle their target.
const FINAL_APPROACH: f32 = 55.0;
/// Added to a planet's radius to get its emergency radius.
const PLANET_EMERGENCY_PAD: f32 = 28.0;
/// Reach of the gentle per-planet repulsion beyond the emergency radius.
const PLANET_AVOID_RANGE: f32 = 110.0;
/// Reach of the star's repulsive term.
const STAR_REPULSION_RANGE: f32 = 260.0;
/// Added to the star kill radius to get its emergency radius.
const STAR_EMERGENCY_PAD: f32 = 60.0;
/// Gentle repulsion range from other ships.
const SHIP_AVOID_RANGE: f32 = 34.0;
/// Distance from the world edge at which ships start steering inward.
const EDGE_AVOID_RANGE: f32 = 80.0;
/// Seconds of linear prediction when judging convergence with a moving
/// planet.
const CONVERGENCE_HORIZON: f32 = 1.4;
/// Length of the forward cone scanned for pinch points.
const LOOKAHEAD: f32 = 140.0;
/// Escape directions sampled when a pinch point is detected.
const PINCH_SAMPLES: usize = 8;
/// Obstacles crowding the lookahead cone before pinch correction kicks in.
const PINCH_MIN_OBSTACLES: usize = 3;
/// Weight of the pinch correction against the main steering vector.
const PINCH_WEIGHT: f32 = 0.35;
/// Pinch correction is skipped above this avoidance level.
const PINCH_SKIP_THREAT: f32 = 0.6;
/// Total avoidance above this skips heading smoothing for responsiveness.
const HEAVY_AVOIDANCE: f32 = 1.25;
/// Avoidance above this overrides combat maneuvering entirely.
const MANEUVER_OVERRIDE: f32 = 1.6;
/// Speed factor while combat-maneuvering.
const COMBAT_SPEED: f32 = 0.65;
/// Seconds each pseudo-random maneuver pattern persists before rehashing.
const MANEUVER_WINDOW: f64 = 3.0;
/// Radius that counts as "nearby" for tactical decisions.
const NEARBY_RADIUS: f32 = 150.0;
/// Chasing is abandoned beyond this separation.
const CHASE_GIVE_UP: f32 = 260.0;
/// cos(60°): a target heading within ~120° of directly away from us counts
/// as running.
const AWAY_CONE_COS: f32 = 0.5;
/// Candidate travel times sampled when leading a moving destination.
const INTERCEPT_SAMPLES: [f32; 7] = [0.25, 0.75, 1.5, 3.0, 6.0, 10.0, 16.0];
/// Arrival pad beyond the destination's radius.
const ARRIVAL_PAD: f32 = 6.0;
/// How far ahead missiles lead their destination, seconds, clamped.
const MISSILE_LEAD: f32 = 2.0;

struct PlanetSnap {
    e: Entity,
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    owner: Option<OperatorId>,
    health_frac: f32,
    orbit: OrbitParams,
    orbit_time: f64,
    frozen: bool,
    targets: Vec<Entity>,
}

impl PlanetSnap {
    /// Predicted position `ahead` seconds from now along the orbit.
    fn pos_at(&self, ahead: f32) -> Vec2 {
        if self.frozen {
            self.pos
        } else {
            self.orbit.position_at(Vec2::ZERO, self.orbit_time + ahead as f64)
        }
    }
}

struct ShipSnap {
    e: Entity,
    owner: OperatorId,
    pos: Vec2,
    heading: Vec2,
    /// Effective speed including ability multipliers.
    speed: f32,
    health: f32,
    max_health: f32,
    missile: bool,
    origin: Option<Entity>,
    dest: Entity,
    tactic: Tactic,
    spawned_at: f64,
    max_lifetime: f32,
    human: bool,
}

struct HazardField {
    avoid: Vec2,
    threat: f32,
    emergency: Vec2,
    emergency_active: bool,
}

struct ShipWrite {
    e: Entity,
    pos: Vec2,
    heading: Vec2,
    face: Vec2,
    tactic: Tactic,
}

enum Arrival {
    Reinforce,
    Strike,
}

/// Per-tick ship update: steering, movement, arrivals, lifetimes, star
/// destruction, and ship-vs-ship collisions.
pub(crate) fn update_ships(game: &mut Game, dt: f32) {
    let now = game.time;
    let star_kill = game.config.star_kill_radius;
    let launch_radius = game.config.launch_radius;
    let world_half = game.config.world_half_extent;

    let planets: Vec<PlanetSnap> = game
        .world
        .query::<(&Planet, &Transform, &Health)>()
        .iter()
        .map(|(e, (p, t, h))| PlanetSnap {
            e,
            pos: t.position,
            vel: if game.abilities.is_frozen(e, now) {
                Vec2::ZERO
            } else {
                p.orbit.velocity_at(p.orbit_time)
            },
            radius: p.radius,
            owner: p.owner,
            health_frac: h.percentage(),
            orbit: p.orbit,
            orbit_time: p.orbit_time,
            frozen: game.abilities.is_frozen(e, now),
            targets: p.targets.clone(),
        })
        .collect();

    let ships: Vec<ShipSnap> = game
        .world
        .query::<(&Ship, &Transform, &Health)>()
        .iter()
        .map(|(e, (s, t, h))| ShipSnap {
            e,
            owner: s.owner,
            pos: t.position,
            heading: s.heading,
            speed: s.speed * game.abilities.ship_speed_mult(s.owner, now),
            health: h.current,
            max_health: h.max,
            missile: s.is_missile,
            origin: s.origin,
            dest: s.dest,
            tactic: s.tactic,
            spawned_at: s.spawned_at,
            max_lifetime: s.max_lifetime,
            human: game.operators[s.owner.0].is_human(),
        })
        .collect();

    let mut writes: Vec<ShipWrite> = Vec::with_capacity(ships.len());
    let mut expired: Vec<Entity> = Vec::new();
    let mut sun_killed: Vec<Entity> = Vec::new();
    let mut arrivals: Vec<(Entity, Entity, Arrival)> = Vec::new();

    for s in &ships {
        if now - s.spawned_at > s.max_lifetime as f64 {
            expired.push(s.e);
            continue;
        }

        let dest = planets.iter().find(|p| p.e == s.dest);

        if s.missile {
            let Some(d) = dest else {
                expired.push(s.e);
                continue;
            };
            let lead = (s.pos.distance(d.pos) / s.speed.max(1.0)).min(MISSILE_LEAD);
            let dir = (d.pos_at(lead) - s.pos).normalize_or_zero();
            let mut pos = s.pos + dir * s.speed * dt;
            if !pos.is_finite() {
                pos = s.pos;
            }
            if pos.distance(d.pos) <= d.radius + ARRIVAL_PAD {
                arrivals.push((s.e, d.e, Arrival::Strike));
            }
            writes.push(ShipWrite {
                e: s.e,
                pos,
                heading: dir,
                face: dir,
                tactic: Tactic::Normal,
            });
            continue;
        }

        if s.pos.length() <= star_kill {
            sun_killed.push(s.e);
            continue;
        }

        let hz = hazards(s, &planets, &ships, star_kill, launch_radius, world_half);
        let engaged_target = game.combat.target_of(s.e);
        let target_snap = engaged_target.and_then(|t| ships.iter().find(|o| o.e == t));
        let tactic = next_tactic(s, target_snap, dest, &ships, &planets);

        let mut raw_final_approach = false;
        let dir = if hz.emergency_active {
            // Emergency avoidance preempts every other state.
            hz.emergency.normalize_or_zero()
        } else {
            match tactic {
                Tactic::Fleeing => (flee_dir(s, &ships, &planets) + hz.avoid).normalize_or_zero(),
                Tactic::Chasing(t) => match ships.iter().find(|o| o.e == t) {
                    Some(tgt) => (chase_dir(s, tgt) + hz.avoid * 0.5).normalize_or_zero(),
                    None => transit_steer(s, dest, &planets, &ships, &hz, launch_radius, &mut raw_final_approach),
                },
                Tactic::Normal => {
                    if let Some(tgt) = target_snap {
                        let maneuver = maneuver_dir(s, tgt, now);
                        if hz.threat > MANEUVER_OVERRIDE {
                            hz.avoid.normalize_or_zero()
                        } else {
                            (maneuver + hz.avoid).normalize_or_zero()
                        }
                    } else {
                        transit_steer(s, dest, &planets, &ships, &hz, launch_radius, &mut raw_final_approach)
                    }
                }
            }
        };

        let speed_factor = if target_snap.is_some() && tactic == Tactic::Normal && !hz.emergency_active
        {
            COMBAT_SPEED
        } else {
            1.0
        };

        // Exponential smoothing against the current heading, skipped when
        // avoidance is heavy (responsiveness beats smoothness) and on final
        // approach (raw aim, no circling).
        let heading = if hz.threat > HEAVY_AVOIDANCE || raw_final_approach || dir == Vec2::ZERO {
            if dir == Vec2::ZERO {
                s.heading
            } else {
                dir
            }
        } else {
            let blended = s.heading * (1.0 - HEADING_SMOOTHING) + dir * HEADING_SMOOTHING;
            let n = blended.normalize_or_zero();
            if n == Vec2::ZERO {
                dir
            } else {
                n
            }
        };

        let mut pos = s.pos + heading * s.speed * speed_factor * dt;
        if !pos.is_finite() {
            // A single bad frame must not corrupt the trajectory.
            pos = s.pos;
        }

        // Keep facing the combat target so shooting stays viable even while
        // the steering points elsewhere.
        let face = match target_snap {
            Some(tgt) => (tgt.pos - pos).normalize_or_zero(),
            None => heading,
        };

        if let Some(d) = dest {
            if pos.distance(d.pos) <= d.radius + ARRIVAL_PAD {
                let kind = if d.owner == Some(s.owner) {
                    Arrival::Reinforce
                } else {
                    Arrival::Strike
                };
                arrivals.push((s.e, d.e, kind));
            }
        }

        writes.push(ShipWrite {
            e: s.e,
            pos,
            heading,
            face,
            tactic,
        });
    }

    for w in writes {
        if let Ok((ship, tf)) = game.world.query_one_mut::<(&mut Ship, &mut Transform)>(w.e) {
            ship.heading = w.heading;
            ship.tactic = w.tactic;
            tf.position = w.pos;
            tf.face_along(w.face);
        }
    }

    resolve_ship_collisions(game);

    for e in expired {
        game.destroy_ship(e);
    }
    for e in sun_killed {
        game.destroy_ship(e);
    }
    for (ship, planet, kind) in arrivals {
        let Ok(snap) = game.world.query_one_mut::<(&Ship, &Health)>(ship) else {
            continue;
        };
        let (damage, owner, remaining) = (snap.0.damage, snap.0.owner, snap.1.current);
        game.destroy_ship(ship);
        match kind {
            Arrival::Reinforce => {
                if let Ok(mut h) = game.world.get::<&mut Health>(planet) {
                    h.heal(remaining);
                }
            }
            Arrival::Strike => game.damage_planet(planet, damage, Some(owner)),
        }
    }
}

/// Accumulate repulsive terms from the star, non-destination planets, other
/// ships, and the world edges. Emergency terms are collected separately and
/// normalized over all active hazards.
fn hazards(
    s: &ShipSnap,
    planets: &[PlanetSnap],
    ships: &[ShipSnap],
    star_kill: f32,
    launch_radius: f32,
    world_half: f32,
) -> HazardField {
    let mut avoid = Vec2::ZERO;
    let mut threat = 0.0f32;
    let mut emergency = Vec2::ZERO;
    let mut emergency_active = false;

    // Whether the ship is still in its launch window around the origin; the
    // origin is not treated as a hazard until the ship has cleared it.
    let in_launch = s
        .origin
        .and_then(|o| planets.iter().find(|p| p.e == o))
        .is_some_and(|o| s.pos.distance(o.pos) < launch_radius);

    // Central star: repulsion grows toward the star and saturates near it.
    let d_star = s.pos.length().max(1.0);
    let away_star = s.pos / d_star;
    if d_star < star_kill + STAR_EMERGENCY_PAD {
        emergency += away_star * (1.5 - d_star / (star_kill + STAR_EMERGENCY_PAD));
        emergency_active = true;
    }
    if d_star < STAR_REPULSION_RANGE {
        let strength = ((STAR_REPULSION_RANGE - d_star) / STAR_REPULSION_RANGE).min(1.0) * 1.6;
        avoid += away_star * strength;
        threat += strength;
    }

    for p in planets {
        if p.e == s.dest || (Some(p.e) == s.origin && in_launch) {
            continue;
        }
        let rel = s.pos - p.pos;
        let d = rel.length().max(1.0);
        let away = rel / d;
        let emergency_radius = p.radius + PLANET_EMERGENCY_PAD;
        if Some(p.e) != s.origin && d < emergency_radius {
            emergency += away * (1.5 - d / emergency_radius);
            emergency_active = true;
            avoid += away * 2.2;
            threat += 2.2;
        } else if d < emergency_radius + PLANET_AVOID_RANGE {
            let mut strength = (1.0 - (d - emergency_radius).max(0.0) / PLANET_AVOID_RANGE) * 0.7;
            // Short-horizon convergence check against the moving planet.
            let future = (s.pos + s.heading * s.speed * CONVERGENCE_HORIZON)
                .distance(p.pos + p.vel * CONVERGENCE_HORIZON);
            if future < d && future < emergency_radius + 20.0 {
                strength *= 2.5;
            }
            avoid += away * strength;
            threat += strength;
        }
    }

    for o in ships {
        if o.e == s.e || o.missile {
            continue;
        }
        let rel = s.pos - o.pos;
        let d = rel.length();
        if d > 0.5 && d < SHIP_AVOID_RANGE {
            let strength = (1.0 - d / SHIP_AVOID_RANGE) * 0.35;
            avoid += (rel / d) * strength;
            threat += strength;
        }
    }

    // World edges push inward.
    let margin = world_half - EDGE_AVOID_RANGE;
    if s.pos.x > margin {
        let f = ((s.pos.x - margin) / EDGE_AVOID_RANGE).min(1.0) * 0.8;
        avoid.x -= f;
        threat += f;
    } else if s.pos.x < -margin {
        let f = ((-margin - s.pos.x) / EDGE_AVOID_RANGE).min(1.0) * 0.8;
        avoid.x += f;
        threat += f;
    }
    if s.pos.y > margin {
        let f = ((s.pos.y - margin) / EDGE_AVOID_RANGE).min(1.0) * 0.8;
        avoid.y -= f;
        threat += f;
    } else if s.pos.y < -margin {
        let f = ((-margin - s.pos.y) / EDGE_AVOID_RANGE).min(1.0) * 0.8;
        avoid.y += f;
        threat += f;
    }

    HazardField {
        avoid,
        threat,
        emergency,
        emergency_active,
    }
}

/// Transit steering: launch blend near the origin, then desired direction
/// plus hazard repulsion plus (when the path ahead is crowded but calm) a
/// weak pinch-point correction.
fn transit_steer(
    s: &ShipSnap,
    dest: Option<&PlanetSnap>,
    planets: &[PlanetSnap],
    ships: &[ShipSnap],
    hz: &HazardField,
    launch_radius: f32,
    raw_final_approach: &mut bool,
) -> Vec2 {
    let Some(d) = dest else {
        return s.heading;
    };

    if let Some(origin) = s.origin.and_then(|o| planets.iter().find(|p| p.e == o)) {
        let from_origin = s.pos - origin.pos;
        if from_origin.length() < launch_radius {
            // Launch phase: clear the planet we just left before beelining.
            let away = from_origin.normalize_or_zero();
            let toward = (d.pos - s.pos).normalize_or_zero();
            return (away * LAUNCH_AWAY_BLEND + toward * (1.0 - LAUNCH_AWAY_BLEND))
                .normalize_or_zero();
        }
    }

    let desired = intercept_dir(s, d);
    if s.pos.distance(d.pos) < d.radius + FINAL_APPROACH {
        *raw_final_approach = true;
        return desired;
    }

    // Mutual targeting: if the destination is firing ships back down this
    // same lane, peel off and intercept the nearest one instead.
    if d.owner.is_some() && d.owner != Some(s.owner) {
        if let Some(origin) = s.origin {
            if d.targets.contains(&origin) {
                let opposing = ships
                    .iter()
                    .filter(|o| {
                        o.owner != s.owner
                            && !o.missile
                            && o.origin == Some(s.dest)
                            && o.dest == origin
                    })
                    .min_by(|a, b| {
                        s.pos
                            .distance(a.pos)
                            .partial_cmp(&s.pos.distance(b.pos))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                if let Some(o) = opposing {
                    let lead = (s.pos.distance(o.pos) / s.speed.max(1.0)).min(1.0);
                    return ((o.pos + o.heading * o.speed * lead) - s.pos).normalize_or_zero();
                }
            }
        }
    }

    let mut steer = desired + hz.avoid;
    if hz.threat < PINCH_SKIP_THREAT {
        if let Some(correction) = pinch_correction(s, desired, planets, ships) {
            steer += correction * PINCH_WEIGHT;
        }
    }
    steer.normalize_or_zero()
}

/// Lead a moving destination: sample candidate travel times and aim at the
/// future position where our travel distance best matches the planet's.
fn intercept_dir(s: &ShipSnap, d: &PlanetSnap) -> Vec2 {
    let mut best = d.pos;
    let mut best_err = f32::MAX;
    for &t in &INTERCEPT_SAMPLES {
        let future = d.pos_at(t);
        let err = (s.pos.distance(future) - s.speed * t).abs();
        if err < best_err {
            best_err = err;
            best = future;
        }
    }
    (best - s.pos).normalize_or_zero()
}

/// When three or more obstacles crowd the lookahead cone, pick the most
/// open of eight sampled directions as a mild corrective steer.
fn pinch_correction(
    s: &ShipSnap,
    desired: Vec2,
    planets: &[PlanetSnap],
    ships: &[ShipSnap],
) -> Option<Vec2> {
    let mut obstacles: Vec<Vec2> = Vec::new();
    for p in planets {
        if p.e == s.dest || Some(p.e) == s.origin {
            continue;
        }
        obstacles.push(p.pos);
    }
    for o in ships {
        if o.e != s.e && !o.missile {
            obstacles.push(o.pos);
        }
    }

    let crowding = obstacles
        .iter()
        .filter(|&&pos| {
            let rel = pos - s.pos;
            let d = rel.length();
            d < LOOKAHEAD && d > 1.0 && (rel / d).dot(desired) > std::f32::consts::FRAC_1_SQRT_2
        })
        .count();
    if crowding < PINCH_MIN_OBSTACLES {
        return None;
    }

    let mut best_dir = desired;
    let mut best_score = f32::MAX;
    for k in 0..PINCH_SAMPLES {
        let angle = k as f32 * std::f32::consts::TAU / PINCH_SAMPLES as f32;
        let dir = Vec2::new(angle.cos(), angle.sin());
        let probe = s.pos + dir * (LOOKAHEAD * 0.6);
        let crowd: f32 = obstacles
            .iter()
            .map(|&pos| (1.0 - pos.distance(probe) / LOOKAHEAD).max(0.0))
            .sum();
        // Prefer open directions that still point roughly forward.
        let score = crowd - dir.dot(desired) * 0.5;
        if score < best_score {
            best_score = score;
            best_dir = dir;
        }
    }
    Some(best_dir)
}

/// The six engaged-maneuver patterns. Selection rehashes every
/// [`MANEUVER_WINDOW`] seconds so engaged ships do not visually
/// synchronize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Maneuver {
    Circling,
    Strafing,
    Weaving,
    Spiral,
    HitAndRun,
    Zigzag,
}

fn maneuver_for(ship: Entity, now: f64) -> Maneuver {
    let window = (now / MANEUVER_WINDOW) as u64;
    let mut h = ship.to_bits().get() ^ window.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    match h % 6 {
        0 => Maneuver::Circling,
        1 => Maneuver::Strafing,
        2 => Maneuver::Weaving,
        3 => Maneuver::Spiral,
        4 => Maneuver::HitAndRun,
        _ => Maneuver::Zigzag,
    }
}

fn maneuver_dir(s: &ShipSnap, target: &ShipSnap, now: f64) -> Vec2 {
    let to_target = target.pos - s.pos;
    let dist = to_target.length();
    let fwd = if dist > 1.0 { to_target / dist } else { Vec2::X };
    let side = Vec2::new(-fwd.y, fwd.x);
    // Per-ship phase offset keeps same-pattern ships out of lockstep.
    let phase = (s.e.to_bits().get() % 1024) as f32 * 0.37;
    let t = now as f32 + phase;

    match maneuver_for(s.e, now) {
        Maneuver::Circling => side,
        Maneuver::Strafing => {
            if ((t / 2.0) as i64) % 2 == 0 {
                side
            } else {
                -side
            }
        }
        Maneuver::Weaving => (fwd + side * (t * 2.2).sin() * 0.9).normalize_or_zero(),
        Maneuver::Spiral => (fwd * 0.45 + side * 0.9).normalize_or_zero(),
        Maneuver::HitAndRun => {
            if dist > 90.0 {
                fwd
            } else if dist < 50.0 {
                -fwd
            } else {
                side
            }
        }
        Maneuver::Zigzag => {
            let sign = if (t * 1.6).sin() >= 0.0 { 1.0 } else { -1.0 };
            (fwd + side * sign * 0.8).normalize_or_zero()
        }
    }
}

/// Tactical sub-state transitions. Fleeing and chasing are sticky: entered
/// on a threshold, exited only on an explicit condition.
fn next_tactic(
    s: &ShipSnap,
    engaged: Option<&ShipSnap>,
    dest: Option<&PlanetSnap>,
    ships: &[ShipSnap],
    planets: &[PlanetSnap],
) -> Tactic {
    let mut enemies = 0usize;
    let mut allies = 0usize;
    for o in ships {
        if o.e == s.e || o.missile {
            continue;
        }
        if s.pos.distance(o.pos) <= NEARBY_RADIUS {
            if o.owner == s.owner {
                allies += 1;
            } else {
                enemies += 1;
            }
        }
    }

    match s.tactic {
        Tactic::Fleeing => {
            let near_home = planets.iter().any(|p| {
                p.owner == Some(s.owner) && s.pos.distance(p.pos) < p.radius + 80.0
            });
            if enemies == 0 || near_home {
                Tactic::Normal
            } else {
                Tactic::Fleeing
            }
        }
        Tactic::Chasing(t) => match ships.iter().find(|o| o.e == t) {
            Some(tgt) if s.pos.distance(tgt.pos) <= CHASE_GIVE_UP => Tactic::Chasing(t),
            _ => Tactic::Normal,
        },
        Tactic::Normal => {
            let health_frac = s.health / s.max_health.max(1.0);
            let should_flee = if s.human {
                // Human ships hold the line longer.
                (health_frac < 0.25 && enemies >= 2)
                    || enemies > allies + 2
                    || (allies == 0 && enemies >= 3)
            } else {
                (health_frac < 0.4 && enemies >= 1)
                    || enemies > allies + 1
                    || (allies == 0 && enemies >= 2)
            };
            if should_flee && (engaged.is_some() || enemies > 0) {
                return Tactic::Fleeing;
            }

            if let Some(tgt) = engaged {
                let away = (tgt.pos - s.pos).normalize_or_zero();
                let moving_away = tgt.speed > 1.0 && tgt.heading.dot(away) > AWAY_CONE_COS;
                let escaping = tgt.speed > s.speed * 1.15;
                let nearly_dead = tgt.health < tgt.max_health * 0.2;
                // A siege about to land beats a chase: if the destination is
                // an enemy world already close to cracking, keep flying at it.
                let dest_priority = dest.is_some_and(|d| {
                    d.owner.is_some()
                        && d.owner != Some(s.owner)
                        && d.health_frac < 0.5
                        && s.pos.distance(d.pos) < NEARBY_RADIUS * 2.0
                });
                if moving_away && !escaping && !nearly_dead && !dest_priority {
                    return Tactic::Chasing(tgt.e);
                }
            }
            Tactic::Normal
        }
    }
}

/// Run from the local enemy centroid, biased toward the nearest friendly
/// planet.
fn flee_dir(s: &ShipSnap, ships: &[ShipSnap], planets: &[PlanetSnap]) -> Vec2 {
    let mut center = Vec2::ZERO;
    let mut n = 0u32;
    for o in ships {
        if o.owner != s.owner && !o.missile && s.pos.distance(o.pos) <= NEARBY_RADIUS {
            center += o.pos;
            n += 1;
        }
    }
    let away = if n > 0 {
        (s.pos - center / n as f32).normalize_or_zero()
    } else {
        s.heading
    };

    let home = planets
        .iter()
        .filter(|p| p.owner == Some(s.owner))
        .min_by(|a, b| {
            s.pos
                .distance(a.pos)
                .partial_cmp(&s.pos.distance(b.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    match home {
        Some(h) => (away * 0.55 + (h.pos - s.pos).normalize_or_zero() * 0.45).normalize_or_zero(),
        None => away,
    }
}

/// Pursue a running target at its predicted position.
fn chase_dir(s: &ShipSnap, target: &ShipSnap) -> Vec2 {
    let lead = (s.pos.distance(target.pos) / s.speed.max(1.0)).min(1.0);
    ((target.pos + target.heading * target.speed * lead) - s.pos).normalize_or_zero()
}

/// Ship-vs-ship ramming. Equal health kills both; otherwise the weaker ship
/// dies and the survivor loses the loser's pre-collision health. Ships of
/// one operator pass through each other.
fn resolve_ship_collisions(game: &mut Game) {
    let radius = game.config.ship_collision_radius;
    let snaps: Vec<(Entity, OperatorId, Vec2, f32)> = game
        .world
        .query::<(&Ship, &Transform, &Health)>()
        .iter()
        .filter(|(_, (s, _, _))| !s.is_missile)
        .map(|(e, (s, t, h))| (e, s.owner, t.position, h.current))
        .collect();

    let mut dead: HashSet<Entity> = HashSet::new();
    let mut hurt: Vec<(Entity, f32)> = Vec::new();

    for i in 0..snaps.len() {
        for j in (i + 1)..snaps.len() {
            let (ea, oa, pa, ha) = snaps[i];
            let (eb, ob, pb, hb) = snaps[j];
            if oa == ob || dead.contains(&ea) || dead.contains(&eb) {
                continue;
            }
            if pa.distance(pb) > radius {
                continue;
            }
            if (ha - hb).abs() < f32::EPSILON {
                dead.insert(ea);
                dead.insert(eb);
            } else if ha < hb {
                dead.insert(ea);
                hurt.push((eb, ha));
            } else {
                dead.insert(eb);
                hurt.push((ea, hb));
            }
        }
    }

    for (e, amount) in hurt {
        if dead.contains(&e) {
            continue;
        }
        let died = match game.world.get::<&mut Health>(e) {
            Ok(mut h) => {
                h.take_damage(amount);
                h.is_dead()
            }
            Err(_) => false,
        };
        if died {
            dead.insert(e);
        }
    }
    for e in dead {
        game.destroy_ship(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::{ship_pair_at, two_ship_game};

    #[test]
    fn collision_equal_health_destroys_both() {
        let (mut game, a, b) = two_ship_game(5.0);
        let before = game.explosion_count();
        resolve_ship_collisions(&mut game);
        assert!(!game.world.contains(a));
        assert!(!game.world.contains(b));
        assert_eq!(game.explosion_count(), before + 2);
    }

    #[test]
    fn collision_unequal_health_leaves_one_survivor() {
        let (mut game, a, b) = two_ship_game(5.0);
        let (ha, hb) = (60.0, 100.0);
        game.world.get::<&mut Health>(a).unwrap().current = ha;
        game.world.get::<&mut Health>(b).unwrap().current = hb;
        resolve_ship_collisions(&mut game);
        assert!(!game.world.contains(a), "weaker ship must die");
        assert!(game.world.contains(b));
        let survivor = game.world.get::<&Health>(b).unwrap().current;
        assert!((survivor - (hb - ha)).abs() < 1e-3);
    }

    #[test]
    fn collision_same_operator_ships_pass_through() {
        let (mut game, a, b) = ship_pair_at(5.0, OperatorId(1), OperatorId(1));
        resolve_ship_collisions(&mut game);
        assert!(game.world.contains(a));
        assert!(game.world.contains(b));
    }

    #[test]
    fn ship_outliving_its_lifetime_explodes_once() {
        let (mut game, a, _b) = two_ship_game(400.0);
        game.world.get::<&mut Ship>(a).unwrap().max_lifetime = 1.0;
        game.time = 5.0;
        let before = game.explosion_count();
        update_ships(&mut game, 1.0 / 60.0);
        assert!(!game.world.contains(a));
        assert_eq!(game.explosion_count(), before + 1);
    }

    #[test]
    fn ship_inside_star_kill_radius_is_destroyed() {
        let (mut game, a, _b) = two_ship_game(400.0);
        game.set_position_for_test(a, Vec2::new(10.0, 0.0));
        update_ships(&mut game, 1.0 / 60.0);
        assert!(!game.world.contains(a));
    }

    #[test]
    fn non_finite_steering_clamps_to_last_position() {
        let (mut game, a, _b) = two_ship_game(400.0);
        let before = game.position_of(a).unwrap();
        game.world.get::<&mut Ship>(a).unwrap().heading = Vec2::new(f32::NAN, f32::NAN);
        update_ships(&mut game, 1.0 / 60.0);
        let after = game.position_of(a).unwrap();
        assert!(after.is_finite());
        // Either clamped exactly or recovered onto a finite steering vector.
        assert!(before.distance(after) < 10.0);
    }

    #[test]
    fn maneuver_pattern_varies_over_time_windows() {
        let (game, a, _b) = two_ship_game(60.0);
        let _ = &game;
        let mut seen = HashSet::new();
        for w in 0..24 {
            seen.insert(maneuver_for(a, 1.0 + w as f64 * MANEUVER_WINDOW));
        }
        assert!(seen.len() > 1, "one ship should cycle through patterns");
    }
}
