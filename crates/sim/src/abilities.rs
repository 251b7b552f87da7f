//! Ability orchestrator: cooldown/duration bookkeeping plus the side
//! effects of each ability applied against the entity registry.
//!
//! All state is kept per operator in one [`AbilityRuntimeState`], so
//! autonomous operators use the same catalogue symmetrically against the
//! human operator and each other.

use std::collections::HashMap;

use engine_core::{Health, Transform};
use glam::Vec2;
use hecs::Entity;
use rand::Rng;

use crate::game::Game;
use crate::operator::OperatorId;
use crate::planet::Planet;
use crate::progression::OperatorLoadout;
use crate::ship::Ship;

/// Health restored to every owned planet by Heal.
const HEAL_AMOUNT: f32 = 1500.0;
/// Seconds a curse stays on a planet.
const CURSE_SECONDS: f32 = 20.0;
/// Curse damage per second.
const CURSE_DPS: f32 = 30.0;
/// Strongest enemy planets cursed per cast.
const CURSE_PLANETS: usize = 3;
/// Infection damage per second on each infected planet.
const INFECTION_DPS: f32 = 45.0;
/// Event-horizon radius of a spawned black hole.
const BLACK_HOLE_RADIUS: f32 = 90.0;
/// Seconds a black hole persists.
const BLACK_HOLE_SECONDS: f32 = 8.0;
const BLACK_HOLE_SHIP_DPS: f32 = 60.0;
const BLACK_HOLE_PLANET_DPS: f32 = 150.0;
/// Visual rotation of the event horizon, radians per second.
const BLACK_HOLE_SPIN: f32 = 1.8;
/// Flame aura reach around each owned ship.
const FLAME_RADIUS: f32 = 60.0;
const FLAME_DPS: f32 = 25.0;
const MISSILE_SPEED: f32 = 170.0;
const MISSILE_DAMAGE: f32 = 120.0;
/// Missiles self-destruct after this long even if they never arrive.
const MISSILE_LIFETIME: f32 = 30.0;
/// Damage intake factor while Shield is up.
const SHIELD_INTAKE: f32 = 0.5;
/// Stat factor while Overdrive is up (damage and speed).
const OVERDRIVE_MULT: f32 = 2.0;
/// Production factor while ProductionBoost is up.
const BOOST_MULT: f32 = 2.0;
/// Production factor on cursed planets.
const CURSE_PRODUCTION: f32 = 0.5;

/// Every ability in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    /// Instantly heal all owned planets.
    Heal,
    /// Fire a missile from every owned planet at the nearest enemy planet.
    MissileSalvo,
    /// Curse the strongest enemy planets: damage over time, halved
    /// production.
    Curse,
    /// Seed an infection on the strongest enemy planet; it spreads to
    /// touching enemy planets.
    Infect,
    /// Spawn a black hole hazard that damages everything not owned by its
    /// creator.
    BlackHole,
    /// Halt the orbital motion of every enemy planet.
    Freeze,
    /// Halve damage taken by owned ships.
    Shield,
    /// Double production on owned planets.
    ProductionBoost,
    /// Double owned ships' damage and speed.
    Overdrive,
    /// Owned ships burn nearby enemy ships each tick.
    FlameAura,
    /// Owned ships take no damage.
    Invulnerability,
    /// Halt production on every enemy planet.
    Lockdown,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 12] = [
        AbilityKind::Heal,
        AbilityKind::MissileSalvo,
        AbilityKind::Curse,
        AbilityKind::Infect,
        AbilityKind::BlackHole,
        AbilityKind::Freeze,
        AbilityKind::Shield,
        AbilityKind::ProductionBoost,
        AbilityKind::Overdrive,
        AbilityKind::FlameAura,
        AbilityKind::Invulnerability,
        AbilityKind::Lockdown,
    ];

    /// (base cooldown seconds, active-effect duration seconds). Instant
    /// abilities have zero duration; artifact lifetimes (curse, infection,
    /// black hole) are tracked per artifact instead.
    pub fn stats(self) -> (f32, f32) {
        match self {
            AbilityKind::Heal => (25.0, 0.0),
            AbilityKind::MissileSalvo => (30.0, 0.0),
            AbilityKind::Curse => (35.0, 0.0),
            AbilityKind::Infect => (40.0, 0.0),
            AbilityKind::BlackHole => (45.0, 0.0),
            AbilityKind::Freeze => (30.0, 6.0),
            AbilityKind::Shield => (28.0, 8.0),
            AbilityKind::ProductionBoost => (25.0, 10.0),
            AbilityKind::Overdrive => (35.0, 8.0),
            AbilityKind::FlameAura => (30.0, 8.0),
            AbilityKind::Invulnerability => (50.0, 4.0),
            AbilityKind::Lockdown => (40.0, 6.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AbilityKind::Heal => "Heal",
            AbilityKind::MissileSalvo => "Missile Salvo",
            AbilityKind::Curse => "Curse",
            AbilityKind::Infect => "Infect",
            AbilityKind::BlackHole => "Black Hole",
            AbilityKind::Freeze => "Freeze",
            AbilityKind::Shield => "Shield",
            AbilityKind::ProductionBoost => "Production Boost",
            AbilityKind::Overdrive => "Overdrive",
            AbilityKind::FlameAura => "Flame Aura",
            AbilityKind::Invulnerability => "Invulnerability",
            AbilityKind::Lockdown => "Lockdown",
        }
    }
}

/// A black hole hazard. Not an entity: it lives in its creator's runtime
/// state and damages anything the creator does not own.
#[derive(Debug, Clone)]
pub struct BlackHole {
    pub pos: Vec2,
    pub radius: f32,
    pub expires_at: f64,
    pub owner: OperatorId,
    pub rotation: f32,
}

/// Per-operator ability bookkeeping.
#[derive(Debug, Default)]
pub struct AbilityRuntimeState {
    /// Per kind, sim time the cooldown ends.
    cooldown_until: HashMap<AbilityKind, f64>,
    /// Per kind, sim time the active effect ends.
    active_until: HashMap<AbilityKind, f64>,
    /// Cursed planet -> curse expiry.
    pub cursed: HashMap<Entity, f64>,
    /// Infected planet -> infection start time.
    pub infected: HashMap<Entity, f64>,
    /// Orbitally frozen planet -> freeze expiry.
    pub frozen: HashMap<Entity, f64>,
    pub black_holes: Vec<BlackHole>,
}

impl AbilityRuntimeState {
    pub fn on_cooldown(&self, kind: AbilityKind, now: f64) -> bool {
        self.cooldown_until.get(&kind).is_some_and(|&t| t > now)
    }

    pub fn cooldown_remaining(&self, kind: AbilityKind, now: f64) -> f32 {
        self.cooldown_until
            .get(&kind)
            .map_or(0.0, |&t| ((t - now).max(0.0)) as f32)
    }

    pub fn is_active(&self, kind: AbilityKind, now: f64) -> bool {
        self.active_until.get(&kind).is_some_and(|&t| t > now)
    }
}

/// All operators' ability state, keyed by operator handle.
#[derive(Debug, Default)]
pub struct AbilityManager {
    states: HashMap<OperatorId, AbilityRuntimeState>,
}

impl AbilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, op: OperatorId) -> Option<&AbilityRuntimeState> {
        self.states.get(&op)
    }

    pub(crate) fn state_mut(&mut self, op: OperatorId) -> &mut AbilityRuntimeState {
        self.states.entry(op).or_default()
    }

    /// Whether `activate` would succeed right now. Callers check this
    /// before activation; activation itself stays a silent no-op on
    /// failure.
    pub fn can_use(
        &self,
        op: OperatorId,
        kind: AbilityKind,
        loadout: &OperatorLoadout,
        now: f64,
    ) -> bool {
        loadout.is_unlocked(kind)
            && !self.states.get(&op).is_some_and(|s| s.on_cooldown(kind, now))
    }

    pub fn cooldown_remaining(&self, op: OperatorId, kind: AbilityKind, now: f64) -> f32 {
        self.states
            .get(&op)
            .map_or(0.0, |s| s.cooldown_remaining(kind, now))
    }

    pub fn is_active(&self, op: OperatorId, kind: AbilityKind, now: f64) -> bool {
        self.states.get(&op).is_some_and(|s| s.is_active(kind, now))
    }

    /// Factor applied to damage taken by ships of `op`.
    pub fn damage_intake_mult(&self, op: OperatorId, now: f64) -> f32 {
        if self.is_active(op, AbilityKind::Invulnerability, now) {
            0.0
        } else if self.is_active(op, AbilityKind::Shield, now) {
            SHIELD_INTAKE
        } else {
            1.0
        }
    }

    /// Factor applied to damage dealt by ships of `op`.
    pub fn ship_damage_mult(&self, op: OperatorId, now: f64) -> f32 {
        if self.is_active(op, AbilityKind::Overdrive, now) {
            OVERDRIVE_MULT
        } else {
            1.0
        }
    }

    /// Factor applied to speed of ships of `op`.
    pub fn ship_speed_mult(&self, op: OperatorId, now: f64) -> f32 {
        if self.is_active(op, AbilityKind::Overdrive, now) {
            OVERDRIVE_MULT
        } else {
            1.0
        }
    }

    /// Production factor for a planet owned by `owner`: boosts from the
    /// owner, lockdowns from everyone else, curses on the planet itself.
    pub fn production_mult(&self, owner: OperatorId, planet: Entity, now: f64) -> f32 {
        let mut mult = 1.0;
        for (&op, state) in &self.states {
            if op == owner {
                if state.is_active(AbilityKind::ProductionBoost, now) {
                    mult *= BOOST_MULT;
                }
            } else if state.is_active(AbilityKind::Lockdown, now) {
                mult = 0.0;
            }
            if state.cursed.get(&planet).is_some_and(|&t| t > now) {
                mult *= CURSE_PRODUCTION;
            }
        }
        mult
    }

    /// Whether any operator holds this planet orbitally frozen.
    pub fn is_frozen(&self, planet: Entity, now: f64) -> bool {
        self.states
            .values()
            .any(|s| s.frozen.get(&planet).is_some_and(|&t| t > now))
    }

    pub fn is_infected(&self, planet: Entity) -> bool {
        self.states.values().any(|s| s.infected.contains_key(&planet))
    }

    pub fn is_cursed(&self, planet: Entity, now: f64) -> bool {
        self.states
            .values()
            .any(|s| s.cursed.get(&planet).is_some_and(|&t| t > now))
    }

    pub fn black_holes(&self) -> impl Iterator<Item = &BlackHole> {
        self.states.values().flat_map(|s| s.black_holes.iter())
    }

    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }
}

/// Activate `kind` for `op`. Returns `false` (and changes nothing, not even
/// the running cooldown) when the ability is locked or still cooling down.
pub(crate) fn activate(game: &mut Game, op: OperatorId, kind: AbilityKind) -> bool {
    let now = game.time;
    let loadout = game.progression.loadout(op).clone();
    if !game.abilities.can_use(op, kind, &loadout, now) {
        return false;
    }

    let (base_cooldown, duration) = kind.stats();
    let scaled_duration = duration * loadout.duration_mult;
    {
        let state = game.abilities.state_mut(op);
        state.cooldown_until.insert(
            kind,
            now + ((base_cooldown + duration) * loadout.cooldown_mult) as f64,
        );
        if duration > 0.0 {
            state.active_until.insert(kind, now + scaled_duration as f64);
        }
    }

    let power = game.config.ability_power * loadout.power_mult;
    match kind {
        AbilityKind::Heal => apply_heal(game, op, power),
        AbilityKind::MissileSalvo => apply_missile_salvo(game, op, power),
        AbilityKind::Curse => apply_curse(game, op, &loadout, now),
        AbilityKind::Infect => apply_infect(game, op, now),
        AbilityKind::BlackHole => apply_black_hole(game, op, &loadout, now),
        AbilityKind::Freeze => apply_freeze(game, op, &loadout, now),
        // Pure duration flags: consulted at damage intake, production, and
        // ship stat lookups. Nothing to mutate here.
        AbilityKind::Shield
        | AbilityKind::ProductionBoost
        | AbilityKind::Overdrive
        | AbilityKind::FlameAura
        | AbilityKind::Invulnerability
        | AbilityKind::Lockdown => {}
    }

    log::info!(
        "ability: {} activates {}",
        game.operators[op.0].name,
        kind.name()
    );
    true
}

fn apply_heal(game: &mut Game, op: OperatorId, power: f32) {
    for (_, (planet, health)) in game.world.query_mut::<(&Planet, &mut Health)>() {
        if planet.owner == Some(op) {
            health.heal(HEAL_AMOUNT * power);
        }
    }
}

fn apply_missile_salvo(game: &mut Game, op: OperatorId, power: f32) {
    let mut own: Vec<Vec2> = Vec::new();
    let mut enemy: Vec<(Entity, Vec2)> = Vec::new();
    for (e, (planet, tf)) in game.world.query::<(&Planet, &Transform)>().iter() {
        match planet.owner {
            Some(o) if o == op => own.push(tf.position),
            Some(_) => enemy.push((e, tf.position)),
            None => {}
        }
    }
    if enemy.is_empty() {
        return;
    }
    for from in own {
        let Some((dest, _)) = enemy
            .iter()
            .map(|&(e, p)| (e, (p - from).length()))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        else {
            continue;
        };
        game.spawn_missile(op, from, dest, MISSILE_DAMAGE * power, MISSILE_SPEED, MISSILE_LIFETIME);
    }
}

fn apply_curse(game: &mut Game, op: OperatorId, loadout: &OperatorLoadout, now: f64) {
    let mut enemy: Vec<(Entity, f32)> = game
        .world
        .query::<(&Planet, &Health)>()
        .iter()
        .filter(|(_, (p, _))| p.owner.is_some() && p.owner != Some(op))
        .map(|(e, (_, h))| (e, h.current))
        .collect();
    enemy.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let expiry = now + (CURSE_SECONDS * loadout.duration_mult) as f64;
    let state = game.abilities.state_mut(op);
    for (e, _) in enemy.into_iter().take(CURSE_PLANETS) {
        state.cursed.insert(e, expiry);
    }
}

fn apply_infect(game: &mut Game, op: OperatorId, now: f64) {
    let seed = game
        .world
        .query::<(&Planet, &Health)>()
        .iter()
        .filter(|(_, (p, _))| p.owner.is_some() && p.owner != Some(op))
        .max_by(|a, b| {
            (a.1 .1.current)
                .partial_cmp(&b.1 .1.current)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(e, _)| e);
    if let Some(planet) = seed {
        game.abilities.state_mut(op).infected.insert(planet, now);
    }
}

fn apply_black_hole(game: &mut Game, op: OperatorId, loadout: &OperatorLoadout, now: f64) {
    let mut rng = rand::thread_rng();
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let band = game.config.orbit_min
        + (game.config.orbit_max - game.config.orbit_min) * (0.25 + rng.gen::<f32>() * 0.5);
    game.abilities.state_mut(op).black_holes.push(BlackHole {
        pos: Vec2::new(angle.cos(), angle.sin()) * band,
        radius: BLACK_HOLE_RADIUS,
        expires_at: now + (BLACK_HOLE_SECONDS * loadout.duration_mult) as f64,
        owner: op,
        rotation: 0.0,
    });
}

fn apply_freeze(game: &mut Game, op: OperatorId, loadout: &OperatorLoadout, now: f64) {
    let (_, duration) = AbilityKind::Freeze.stats();
    let expiry = now + (duration * loadout.duration_mult) as f64;
    let enemy: Vec<Entity> = game
        .world
        .query::<&Planet>()
        .iter()
        .filter(|(_, p)| p.owner.is_some() && p.owner != Some(op))
        .map(|(e, _)| e)
        .collect();
    let state = game.abilities.state_mut(op);
    for e in enemy {
        state.frozen.insert(e, expiry);
    }
}

/// Per-tick ability housekeeping: expire finished effects, advance black
/// holes, spread and damage infections, burn flame auras.
pub(crate) fn update_abilities(game: &mut Game, dt: f32) {
    let now = game.time;
    let infection_duration = game.config.infection_duration as f64;

    let planets: Vec<(Entity, Vec2, f32, Option<OperatorId>)> = game
        .world
        .query::<(&Planet, &Transform)>()
        .iter()
        .map(|(e, (p, t))| (e, t.position, p.radius, p.owner))
        .collect();
    let ships: Vec<(Entity, OperatorId, Vec2)> = game
        .world
        .query::<(&Ship, &Transform)>()
        .iter()
        .map(|(e, (s, t))| (e, s.owner, t.position))
        .collect();

    let mut planet_damage: Vec<(Entity, f32)> = Vec::new();
    let mut ship_damage: Vec<(Entity, f32)> = Vec::new();
    let mut flame_ops: Vec<OperatorId> = Vec::new();

    for (&op, state) in game.abilities.states.iter_mut() {
        state.cursed.retain(|_, expiry| *expiry > now);
        state.frozen.retain(|_, expiry| *expiry > now);
        state
            .infected
            .retain(|_, start| now - *start < infection_duration);

        for &planet in state.cursed.keys() {
            planet_damage.push((planet, CURSE_DPS * dt));
        }

        // Infection: periodic damage plus spread to touching enemy planets.
        let mut caught: Vec<Entity> = Vec::new();
        for &infected in state.infected.keys() {
            planet_damage.push((infected, INFECTION_DPS * dt));
            let Some(&(_, ipos, iradius, _)) = planets.iter().find(|p| p.0 == infected) else {
                continue;
            };
            for &(other, opos, oradius, owner) in &planets {
                if other == infected
                    || state.infected.contains_key(&other)
                    || owner.is_none()
                    || owner == Some(op)
                {
                    continue;
                }
                if ipos.distance(opos) <= iradius + oradius {
                    caught.push(other);
                }
            }
        }
        for planet in caught {
            state.infected.entry(planet).or_insert(now);
        }

        state.black_holes.retain(|b| b.expires_at > now);
        for hole in state.black_holes.iter_mut() {
            hole.rotation = (hole.rotation + BLACK_HOLE_SPIN * dt) % std::f32::consts::TAU;
            for &(planet, pos, _, owner) in &planets {
                if owner != Some(op) && pos.distance(hole.pos) <= hole.radius {
                    planet_damage.push((planet, BLACK_HOLE_PLANET_DPS * dt));
                }
            }
            for &(ship, owner, pos) in &ships {
                if owner != op && pos.distance(hole.pos) <= hole.radius {
                    ship_damage.push((ship, BLACK_HOLE_SHIP_DPS * dt));
                }
            }
        }

        if state.is_active(AbilityKind::FlameAura, now) {
            flame_ops.push(op);
        }
    }

    for op in flame_ops {
        let power = game.config.ability_power * game.progression.loadout(op).power_mult;
        for &(_, owner, pos) in &ships {
            if owner != op {
                continue;
            }
            for &(enemy, eowner, epos) in &ships {
                if eowner != op && pos.distance(epos) <= FLAME_RADIUS {
                    ship_damage.push((enemy, FLAME_DPS * power * dt));
                }
            }
        }
    }

    for (planet, amount) in planet_damage {
        game.damage_planet(planet, amount, None);
    }
    for (ship, amount) in ship_damage {
        game.damage_ship(ship, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::conquest_game;

    #[test]
    fn ability_on_cooldown_is_silent_noop() {
        let mut game = conquest_game();
        let op = OperatorId::HUMAN;
        assert!(activate(&mut game, op, AbilityKind::Heal));
        let remaining = game.abilities.cooldown_remaining(op, AbilityKind::Heal, game.time);
        assert!(remaining > 0.0);

        assert!(!activate(&mut game, op, AbilityKind::Heal));
        let after = game.abilities.cooldown_remaining(op, AbilityKind::Heal, game.time);
        assert_eq!(after, remaining, "failed activation must not touch the cooldown");
    }

    #[test]
    fn ability_locked_is_refused() {
        let mut game = conquest_game();
        let op = OperatorId(1);
        game.progression.loadout_mut(op).unwrap().unlocked = vec![AbilityKind::Heal];
        assert!(!game.can_use_ability(op, AbilityKind::BlackHole));
        assert!(!activate(&mut game, op, AbilityKind::BlackHole));
    }

    #[test]
    fn heal_respects_max_health() {
        let mut game = conquest_game();
        assert!(activate(&mut game, OperatorId::HUMAN, AbilityKind::Heal));
        for (_, (planet, health)) in game.world.query::<(&Planet, &Health)>().iter() {
            if planet.owner == Some(OperatorId::HUMAN) {
                assert!(health.current <= health.max);
            }
        }
    }

    #[test]
    fn freeze_marks_enemy_planets_only() {
        let mut game = conquest_game();
        assert!(activate(&mut game, OperatorId::HUMAN, AbilityKind::Freeze));
        let now = game.time;
        for (e, planet) in game.world.query::<&Planet>().iter() {
            let frozen = game.abilities.is_frozen(e, now);
            match planet.owner {
                Some(o) if o != OperatorId::HUMAN => assert!(frozen),
                _ => assert!(!frozen, "own/neutral planets must not freeze"),
            }
        }
    }

    #[test]
    fn shield_halves_and_invulnerability_zeroes_intake() {
        let mut game = conquest_game();
        let op = OperatorId::HUMAN;
        assert!(activate(&mut game, op, AbilityKind::Shield));
        let now = game.time;
        assert_eq!(game.abilities.damage_intake_mult(op, now), 0.5);

        assert!(activate(&mut game, op, AbilityKind::Invulnerability));
        assert_eq!(game.abilities.damage_intake_mult(op, now), 0.0);
    }

    #[test]
    fn duration_effects_expire() {
        let mut game = conquest_game();
        let op = OperatorId::HUMAN;
        assert!(activate(&mut game, op, AbilityKind::Overdrive));
        assert_eq!(game.abilities.ship_damage_mult(op, game.time), 2.0);

        let (_, duration) = AbilityKind::Overdrive.stats();
        game.time += duration as f64 + 0.1;
        assert_eq!(game.abilities.ship_damage_mult(op, game.time), 1.0);
    }
}
