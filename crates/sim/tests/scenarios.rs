//! End-to-end simulation scenarios driven through the public API only.

use engine_core::OrbitParams;
use glam::Vec2;
use sim::{
    AbilityKind, Difficulty, Game, MapLayout, MapSpec, OperatorId, PlanetSeed, Progression,
    ShipClass, SimConfig,
};

const DT: f32 = 1.0 / 60.0;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Config with autonomous operators effectively asleep so the scenario
/// controls every action.
fn passive_config() -> SimConfig {
    SimConfig {
        ai_decision_interval: 1e9,
        ai_ability_interval: 1e9,
        ..Default::default()
    }
}

fn planet(orbit_radius: f32, phase: f32, owner: Option<usize>, start_frac: f32) -> PlanetSeed {
    PlanetSeed {
        name: format!("P-{orbit_radius:.0}-{phase:.2}"),
        orbit: OrbitParams::circular(orbit_radius, phase, 0.0),
        radius: 24.0,
        class: ShipClass::Fighter,
        owner,
        start_health_frac: start_frac,
    }
}

fn game_with(config: SimConfig, planets: Vec<PlanetSeed>, operators: usize) -> Game {
    let layout = MapLayout {
        planets,
        operator_count: operators,
    };
    let spec = MapSpec {
        planet_count: layout.planets.len(),
        autonomous_operators: operators.saturating_sub(1),
        seed: Some(7),
        ..Default::default()
    };
    Game::from_layout(config, Progression::uniform(operators), Difficulty::Normal, spec, &layout)
}

fn human_planet(game: &Game) -> sim::PlanetView {
    game.snapshot()
        .planets
        .into_iter()
        .find(|p| p.owner == Some(OperatorId::HUMAN))
        .expect("human planet present")
}

#[test]
fn idle_planet_regenerates_and_caps_at_max() {
    init_logs();
    let mut game = game_with(
        passive_config(),
        vec![
            planet(400.0, 0.0, Some(0), 0.6),
            planet(400.0, std::f32::consts::PI, Some(1), 0.6),
        ],
        2,
    );
    let start = human_planet(&game).health;
    let regen = game.config().planet_regen_per_sec;

    let mut last = start;
    for _ in 0..600 {
        game.tick(DT);
        let p = human_planet(&game);
        assert!(p.health + 1e-3 >= last, "health must not drop while idle");
        assert!(p.health <= p.max_health, "health must never exceed max");
        last = p.health;
    }
    let expected = start + regen * 10.0;
    assert!(
        (last - expected.min(human_planet(&game).max_health)).abs() < 1.5,
        "regen rate off: got {last}, expected about {expected}"
    );
}

#[test]
fn produced_ship_travels_and_captures_weak_planet() {
    init_logs();
    let mut config = passive_config();
    config.planet_max_health = 60.0;
    config.planet_regen_per_sec = 0.0;
    let mut game = game_with(
        config,
        vec![
            planet(400.0, 0.0, Some(0), 0.6),
            // Weak enough that one arrival strike captures it.
            planet(400.0, 0.8, Some(1), 0.5),
        ],
        2,
    );
    let planets = game.planet_entities();
    let (a, b) = (planets[0], planets[1]);
    game.set_targets(OperatorId::HUMAN, a, b).unwrap();

    for _ in 0..(30.0 / DT) as usize {
        game.tick(DT);
        if game.is_ended() {
            break;
        }
    }

    let snap = game.snapshot();
    let captured = snap.planets.iter().find(|p| p.id == b).unwrap();
    assert_eq!(
        captured.owner,
        Some(OperatorId::HUMAN),
        "arrival strike on a dying planet must capture it"
    );
    assert!(captured.health > 0.0);
    assert_eq!(snap.winner, Some(OperatorId::HUMAN));
}

#[test]
fn ability_on_cooldown_does_not_reset_or_extend_it() {
    let mut game = game_with(
        passive_config(),
        vec![
            planet(400.0, 0.0, Some(0), 0.6),
            planet(400.0, std::f32::consts::PI, Some(1), 0.6),
        ],
        2,
    );
    assert!(game.activate_ability(OperatorId::HUMAN, AbilityKind::Heal));
    let r1 = game.ability_cooldown_remaining(OperatorId::HUMAN, AbilityKind::Heal);
    assert!(r1 > 0.0);

    for _ in 0..60 {
        game.tick(DT);
    }
    let r2 = game.ability_cooldown_remaining(OperatorId::HUMAN, AbilityKind::Heal);
    assert!(r2 < r1, "cooldown should tick down");

    assert!(!game.can_use_ability(OperatorId::HUMAN, AbilityKind::Heal));
    assert!(!game.activate_ability(OperatorId::HUMAN, AbilityKind::Heal));
    let r3 = game.ability_cooldown_remaining(OperatorId::HUMAN, AbilityKind::Heal);
    assert_eq!(r3, r2, "failed activation must leave the running cooldown alone");
}

#[test]
fn ships_inside_star_kill_radius_die_independently() {
    let mut game = game_with(
        passive_config(),
        vec![
            planet(400.0, 0.0, Some(0), 0.6),
            planet(400.0, std::f32::consts::PI, Some(1), 0.6),
        ],
        2,
    );
    let dest = game.planet_entities()[0];
    let kill = game.config().star_kill_radius;
    // Inside the kill radius but farther apart than the ram radius, so no
    // ship-to-ship interaction is possible.
    let a = game.spawn_ship_at(Vec2::new(kill * 0.45, 0.0), ShipClass::Fighter, OperatorId(0), None, dest);
    let b = game.spawn_ship_at(Vec2::new(-kill * 0.45, 0.0), ShipClass::Fighter, OperatorId(1), None, dest);

    game.tick(DT);

    let snap = game.snapshot();
    assert!(!snap.ships.iter().any(|s| s.id == a || s.id == b));
    assert_eq!(snap.explosions.len(), 2, "one explosion per destroyed ship");
}

#[test]
fn infection_spreads_to_touching_planet_and_expires() {
    let mut config = passive_config();
    config.planet_regen_per_sec = 0.0;
    let mut game = game_with(
        config,
        vec![
            planet(400.0, std::f32::consts::PI, Some(0), 0.6),
            // Two enemy planets whose radii overlap (chord ~40 < 24 + 24).
            planet(400.0, 0.0, Some(1), 0.6),
            planet(400.0, 0.1, Some(1), 0.6),
        ],
        2,
    );
    let start_health: Vec<f32> = game
        .snapshot()
        .planets
        .iter()
        .filter(|p| p.owner == Some(OperatorId(1)))
        .map(|p| p.health)
        .collect();

    assert!(game.activate_ability(OperatorId::HUMAN, AbilityKind::Infect));

    // One second in: seeded infection has spread across the overlap.
    for _ in 0..60 {
        game.tick(DT);
    }
    let snap = game.snapshot();
    let infected: Vec<_> = snap.planets.iter().filter(|p| p.infected).collect();
    assert_eq!(infected.len(), 2, "infection should cover both touching planets");
    assert!(infected.iter().all(|p| p.owner == Some(OperatorId(1))));

    // Past the infection duration: entries removed, damage was dealt.
    let duration = game.config().infection_duration;
    for _ in 0..((duration + 1.5) / DT) as usize {
        game.tick(DT);
    }
    let snap = game.snapshot();
    assert!(snap.planets.iter().all(|p| !p.infected), "infection must expire");
    let end_health: Vec<f32> = snap
        .planets
        .iter()
        .filter(|p| p.owner == Some(OperatorId(1)))
        .map(|p| p.health)
        .collect();
    assert_eq!(end_health.len(), start_health.len());
    for (end, start) in end_health.iter().zip(&start_health) {
        assert!(end < start, "infected planets must have taken periodic damage");
    }
}

#[test]
fn engine_drives_the_game_and_snapshots_concurrently() {
    let game = game_with(
        passive_config(),
        vec![
            planet(400.0, 0.0, Some(0), 0.6),
            planet(400.0, std::f32::consts::PI, Some(1), 0.6),
        ],
        2,
    );
    let mut engine = sim::Engine::new(game, 120.0, 20.0);
    engine.start();
    std::thread::sleep(std::time::Duration::from_millis(150));

    let snap = engine
        .try_with_sim(|g| g.snapshot())
        .or_else(|| engine.try_with_sim(|g| g.snapshot()))
        .or_else(|| engine.with_sim(|g| Some(g.snapshot())))
        .expect("a snapshot attempt succeeds");
    assert!(snap.tick > 0, "engine should have driven ticks");

    engine.pause();
    // Let any in-flight iteration settle before sampling.
    std::thread::sleep(std::time::Duration::from_millis(50));
    let paused_tick = engine.with_sim(|g| g.tick_count());
    std::thread::sleep(std::time::Duration::from_millis(100));
    let still = engine.with_sim(|g| g.tick_count());
    assert_eq!(still, paused_tick, "paused engine must stop ticking");

    engine.stop();
}
