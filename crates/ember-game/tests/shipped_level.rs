//! The level shipped with the binary loads and plays.

use ember_core::{TimeConfig, WorldBounds};
use ember_game::{Game, Health, Level};

const LEVEL_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/levels/level1.toml");

#[test]
fn shipped_level_loads() {
    let level = Level::load(LEVEL_PATH).unwrap();
    let mut game = Game::new(TimeConfig::default()).unwrap();
    game.load_level(&level).unwrap();

    assert_eq!(game.bounds(), WorldBounds::new(1600.0, 1280.0));
    let registry = game.registry();
    assert_eq!(registry.entities_by_group("tiles").len(), 25 * 20);
    assert_eq!(registry.entities_by_group("enemies").len(), 2);
    assert_eq!(registry.entities_by_group("obstacles").len(), 2);
    assert!(registry.has_tag("player"));
}

#[test]
fn truck_shoots_the_player() {
    let level = Level::load(LEVEL_PATH).unwrap();
    let mut game = Game::new(TimeConfig::default()).unwrap();
    game.load_level(&level).unwrap();
    let player = game.registry().entity_by_tag("player").unwrap();

    // Five seconds: the truck fires twice and both shots drop onto the player.
    for _ in 0..300 {
        game.step(&[], 1.0 / 60.0).unwrap();
    }

    let health = game.registry().get_component::<Health>(player).unwrap();
    assert_eq!(health.health_percentage, 80);
    assert!(game.registry().is_alive(player));
}
