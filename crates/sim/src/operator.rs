//! Operators: the planet/ship-owning factions. One human-controlled, the
//! rest autonomous. Elimination is structural (zero planets and zero ships),
//! operators are never removed mid-game.

use engine_core::{Health, Transform};
use glam::Vec2;
use hecs::Entity;
use rand::Rng;

use crate::abilities::AbilityKind;
use crate::game::Game;
use crate::planet::Planet;

/// Stable operator handle. Index 0 is always the human operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(pub usize);

impl OperatorId {
    pub const HUMAN: OperatorId = OperatorId(0);
}

/// Decision state for an autonomous operator.
#[derive(Debug, Clone)]
pub struct AiState {
    /// Sim time of the next targeting decision.
    pub next_decision: f64,
    /// Sim time of the next ability consideration.
    pub next_ability: f64,
    /// Scales decision cadence; below 1.0 decides faster (harder).
    pub tempo: f32,
    /// 0..1, how strongly enemy planets are preferred over neutral ones.
    pub aggression: f32,
}

impl AiState {
    pub fn new(tempo: f32, aggression: f32) -> Self {
        Self {
            next_decision: 0.0,
            next_ability: 0.0,
            tempo,
            aggression,
        }
    }
}

/// What kind of operator this is, with the data each variant needs.
#[derive(Debug, Clone)]
pub enum OperatorKind {
    Human,
    Autonomous(AiState),
}

/// One faction in the game.
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub color: [f32; 3],
    pub kind: OperatorKind,
}

impl Operator {
    pub fn is_human(&self) -> bool {
        matches!(self.kind, OperatorKind::Human)
    }
}

const AI_NAMES: [&str; 5] = [
    "Vex Dominion",
    "Halcyon Swarm",
    "Umbral Court",
    "Iron Accord",
    "Cinder Pact",
];

const COLORS: [[f32; 3]; 6] = [
    [0.35, 0.75, 1.0],  // human blue
    [1.0, 0.35, 0.3],   // red
    [0.55, 1.0, 0.4],   // green
    [1.0, 0.8, 0.25],   // amber
    [0.85, 0.45, 1.0],  // violet
    [0.45, 1.0, 0.9],   // teal
];

/// Build the operator roster for a new game. `tempo` scales autonomous
/// decision cadence (difficulty).
pub(crate) fn roster(count: usize, tempo: f32) -> Vec<Operator> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| Operator {
            id: OperatorId(i),
            name: if i == 0 {
                "Player".to_string()
            } else {
                AI_NAMES[(i - 1) % AI_NAMES.len()].to_string()
            },
            color: COLORS[i % COLORS.len()],
            kind: if i == 0 {
                OperatorKind::Human
            } else {
                OperatorKind::Autonomous(AiState::new(
                    tempo * (0.9 + rng.gen::<f32>() * 0.2),
                    0.4 + rng.gen::<f32>() * 0.5,
                ))
            },
        })
        .collect()
}

/// Per-tick decision step for every autonomous operator: pick a source
/// planet and a target planet, and occasionally spend an ability.
pub(crate) fn run_decisions(game: &mut Game, _dt: f32) {
    let now = game.time;
    let due: Vec<(usize, bool, bool)> = game
        .operators
        .iter()
        .enumerate()
        .filter_map(|(i, o)| match &o.kind {
            OperatorKind::Autonomous(ai) => {
                let decide = now >= ai.next_decision;
                let ability = now >= ai.next_ability;
                (decide || ability).then_some((i, decide, ability))
            }
            OperatorKind::Human => None,
        })
        .collect();

    for (idx, decide, ability) in due {
        let op = OperatorId(idx);
        if decide {
            if let Some((from, to)) = plan_targeting(game, op) {
                // Failures (planet lost this tick, target cap) just wait for
                // the next decision window.
                let _ = game.set_targets(op, from, to);
            }
            let base = game.config.ai_decision_interval;
            if let OperatorKind::Autonomous(ai) = &mut game.operators[idx].kind {
                let jitter = 0.7 + rand::thread_rng().gen::<f32>() * 0.6;
                ai.next_decision = now + (base * ai.tempo * jitter) as f64;
            }
        }
        if ability {
            if let Some(kind) = plan_ability(game, op) {
                crate::abilities::activate(game, op, kind);
            }
            let base = game.config.ai_ability_interval;
            if let OperatorKind::Autonomous(ai) = &mut game.operators[idx].kind {
                let jitter = 0.6 + rand::thread_rng().gen::<f32>() * 0.8;
                ai.next_ability = now + (base * jitter) as f64;
            }
        }
    }
}

/// Choose (source, target) planets for a targeting order, or `None` when
/// the operator has nothing useful to do.
fn plan_targeting(game: &Game, op: OperatorId) -> Option<(Entity, Entity)> {
    let aggression = match &game.operators[op.0].kind {
        OperatorKind::Autonomous(ai) => ai.aggression,
        OperatorKind::Human => return None,
    };
    let max_targets = game.config.planet_max_targets;

    let mut source: Option<(Entity, f32, Vec2)> = None;
    let mut candidates: Vec<(Entity, Vec2, f32, bool)> = Vec::new();
    for (e, (planet, health, tf)) in game
        .world
        .query::<(&Planet, &Health, &Transform)>()
        .iter()
    {
        if planet.owner == Some(op) {
            if planet.targets.len() < max_targets {
                let strength = health.current;
                if source.map_or(true, |(_, s, _)| strength > s) {
                    source = Some((e, strength, tf.position));
                }
            }
        } else {
            candidates.push((e, tf.position, health.percentage(), planet.owner.is_some()));
        }
    }

    let (src, _, src_pos) = source?;
    // Prefer close, weak planets; aggression discounts enemy worlds so
    // hostile operators push into each other instead of farming neutrals.
    let target = candidates
        .into_iter()
        .map(|(e, pos, frac, enemy)| {
            let dist = (pos - src_pos).length().max(1.0);
            let bias = if enemy { 1.1 - aggression * 0.4 } else { 1.0 };
            (e, dist * (0.4 + frac) * bias)
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(e, _)| e)?;
    Some((src, target))
}

/// Pick an ability worth spending, or `None` to hold.
fn plan_ability(game: &Game, op: OperatorId) -> Option<AbilityKind> {
    let mut own_planets = 0usize;
    let mut own_health = 0.0f32;
    let mut enemy_planets = 0usize;
    for (_, (planet, health)) in game.world.query::<(&Planet, &Health)>().iter() {
        match planet.owner {
            Some(o) if o == op => {
                own_planets += 1;
                own_health += health.percentage();
            }
            Some(_) => enemy_planets += 1,
            None => {}
        }
    }
    if own_planets == 0 {
        return None;
    }

    let avg_health = own_health / own_planets as f32;
    if avg_health < 0.55 && game.can_use_ability(op, AbilityKind::Heal) {
        return Some(AbilityKind::Heal);
    }
    if enemy_planets >= own_planets * 2 && game.can_use_ability(op, AbilityKind::Freeze) {
        return Some(AbilityKind::Freeze);
    }

    let offense = [
        AbilityKind::MissileSalvo,
        AbilityKind::Curse,
        AbilityKind::Infect,
        AbilityKind::BlackHole,
        AbilityKind::Overdrive,
        AbilityKind::FlameAura,
        AbilityKind::ProductionBoost,
        AbilityKind::Shield,
        AbilityKind::Lockdown,
        AbilityKind::Invulnerability,
    ];
    let usable: Vec<AbilityKind> = offense
        .into_iter()
        .filter(|&k| game.can_use_ability(op, k))
        .collect();
    if usable.is_empty() {
        None
    } else {
        Some(usable[rand::thread_rng().gen_range(0..usable.len())])
    }
}
