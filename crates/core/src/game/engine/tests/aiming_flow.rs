//! Target acquisition, firing and death cleanup.

use super::support::*;

/// Shooter at (5,5) facing north with a target three cells ahead.
fn duel_fixture(rolls: Vec<f64>) -> (Game, EntityId, EntityId) {
    let mut game = game_with_rolls(rolls);
    let shooter = spawn(&mut game, 5, 5, Direction::N);
    let target = spawn(&mut game, 5, 2, Direction::S);
    select(&mut game, shooter);
    (game, shooter, target)
}

#[test]
fn entering_aim_mode_collects_visible_tiles_in_range() {
    let (mut game, shooter, target) = duel_fixture(vec![0.0]);
    assert_eq!(game.dispatch(Command::ToggleAim), CommandOutcome::Applied);
    assert_eq!(game.mode().path(), "selected.aiming.selecting");

    let in_range = &game.cursor().in_range;
    assert!(in_range.contains(&tile(&game, 5, 2)));
    assert!(!in_range.contains(&tile(&game, 5, 5)), "own tile is never in range");
    let origin = game.state.entities[shooter].pos;
    for id in in_range {
        let pos = game.state.map.tile_by_id(*id).expect("tile").pos;
        assert!(origin.distance(pos) < 6.0);
    }
    assert!(game.state.entities[shooter].vision.entities.contains(&target));
}

#[test]
fn hovering_a_valid_target_locks_it() {
    let (mut game, shooter, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });
    assert_eq!(
        game.mode(),
        Mode::Selected {
            entity: shooter,
            sub: SelectedMode::Aiming(AimMode::Locked { target })
        }
    );
    assert_eq!(game.targeted(), Some(target));
}

#[test]
fn hovered_entity_is_locked_on_entry() {
    let (mut game, _, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::HoverEntity { entity: target });
    game.dispatch(Command::ToggleAim);
    assert_eq!(game.targeted(), Some(target));
}

#[test]
fn self_and_distant_entities_are_not_targets() {
    let mut game = game_with_rolls(vec![0.0]);
    let shooter = spawn(&mut game, 5, 9, Direction::N);
    let far = spawn(&mut game, 5, 1, Direction::S);
    select(&mut game, shooter);
    game.dispatch(Command::ToggleAim);
    assert!(game.state.entities[shooter].vision.entities.contains(&far));

    game.dispatch(Command::HoverEntity { entity: far });
    assert_eq!(game.targeted(), None);
    game.dispatch(Command::HoverEntity { entity: shooter });
    assert_eq!(game.targeted(), None);
    assert_eq!(game.mode().path(), "selected.aiming.selecting");
}

#[test]
fn hovering_a_tile_drops_the_lock() {
    let (mut game, _, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });
    game.dispatch(Command::HoverTile { tile: tile(&game, 3, 3) });
    assert_eq!(game.mode().path(), "selected.aiming.selecting");
    assert_eq!(game.targeted(), None);
}

#[test]
fn firing_a_hit_damages_and_queues_a_shot() {
    let (mut game, shooter, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });

    assert_eq!(game.dispatch(Command::ClickEntity { entity: target }), CommandOutcome::Applied);
    assert_eq!(game.state.entities[target].health.current, 7);
    let shot = game.shots()[0];
    assert_eq!((shot.from, shot.to, shot.hit, shot.done), (Pos::new(5, 5, 0), Pos::new(5, 2, 0), true, false));
    assert!(game.log().contains(&LogEvent::ShotFired {
        shot: shot.id,
        attacker: shooter,
        defender: target,
        hit: true
    }));

    assert_eq!(game.dispatch(Command::ShotLanded { shot: shot.id }), CommandOutcome::Applied);
    assert!(game.shots()[0].done);

    game.dispatch(Command::ClickEntity { entity: target });
    assert_eq!(game.shots().len(), 1, "landed shots are pruned when the next one fires");
    assert_ne!(game.shots()[0].id, shot.id);
}

#[test]
fn a_miss_leaves_health_untouched() {
    let (mut game, _, target) = duel_fixture(vec![0.99]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });
    game.dispatch(Command::ClickEntity { entity: target });

    assert_eq!(game.state.entities[target].health.current, 10);
    assert!(!game.shots()[0].hit);
}

#[test]
fn killing_the_target_clears_lock_occupancy_and_sight() {
    let (mut game, shooter, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });
    for _ in 0..4 {
        game.dispatch(Command::ClickEntity { entity: target });
    }

    let health = game.state.entities[target].health;
    assert!(health.dead && health.current <= 0);
    assert_eq!(game.mode().path(), "selected.aiming.selecting");
    assert_eq!(game.targeted(), None);
    let body = game.state.map.tile(Pos::new(5, 2, 0)).expect("tile");
    assert_eq!(body.occupant, None);
    assert_eq!(body.remains, vec![target]);
    assert!(!game.state.entities[shooter].vision.entities.contains(&target));
    assert!(game.state.entities[shooter].vision.positions.contains(&tile(&game, 5, 0)));
    assert!(game.log().contains(&LogEvent::EntityKilled { entity: target }));

    assert_eq!(game.dispatch(Command::ClickEntity { entity: target }), CommandOutcome::Ignored);
    game.dispatch(Command::HoverEntity { entity: target });
    assert_eq!(game.targeted(), None);
    assert!(game.check_invariants().is_ok());
}

#[test]
fn clicking_a_non_target_does_not_fire() {
    let (mut game, shooter, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });
    assert_eq!(game.dispatch(Command::ClickEntity { entity: shooter }), CommandOutcome::Ignored);
    assert!(game.shots().is_empty());
}

#[test]
fn leaving_aim_mode_clears_range_and_lock() {
    let (mut game, _, target) = duel_fixture(vec![0.0]);
    game.dispatch(Command::ToggleAim);
    game.dispatch(Command::HoverEntity { entity: target });
    game.dispatch(Command::Cancel);
    assert_eq!(game.mode().path(), "selected.idle");
    assert!(game.cursor().in_range.is_empty());
    assert_eq!(game.targeted(), None);
}
