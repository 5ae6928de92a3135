use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestRunner};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use skirmish_core::game::{PathGrid, PathOptions, find_path};
use skirmish_core::{
    Command, CommandOutcome, Direction, EntityId, Game, GridTopology, MapConfig, Pos, ShotId,
    SimConfig, TileId,
};

fn visible_positions(game: &Game, observer: EntityId) -> BTreeSet<Pos> {
    let entity = game.entity(observer).expect("observer");
    entity
        .vision
        .positions
        .iter()
        .filter_map(|id| game.state().map.tile_by_id(*id))
        .map(|tile| tile.pos)
        .collect()
}

fn arena(size: i32) -> Game {
    let config = SimConfig {
        map: MapConfig { width: size, height: size, depth: 1 },
        ..SimConfig::default()
    };
    Game::new(5, config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn path_to_self_is_the_start_cell(x in 0_i32..10, y in 0_i32..10) {
        let grid = PathGrid::new(10, 10, GridTopology::Intercardinal);
        let start = Pos::new(x, y, 0);
        prop_assert_eq!(find_path(&grid, start, start, PathOptions::default()), vec![start]);
    }

    #[test]
    fn open_grid_paths_are_king_move_optimal(
        sx in 0_i32..10, sy in 0_i32..10, ex in 0_i32..10, ey in 0_i32..10
    ) {
        let grid = PathGrid::new(10, 10, GridTopology::Intercardinal);
        let (start, end) = (Pos::new(sx, sy, 0), Pos::new(ex, ey, 0));
        let path = find_path(&grid, start, end, PathOptions::default());
        prop_assert_eq!(path.len(), start.chebyshev(end) as usize + 1);
        prop_assert_eq!(path.first(), Some(&start));
        prop_assert_eq!(path.last(), Some(&end));
        for pair in path.windows(2) {
            prop_assert_eq!(pair[0].chebyshev(pair[1]), 1);
        }
    }

    #[test]
    fn blocked_goal_has_no_path(
        sx in 0_i32..10, sy in 0_i32..10, ex in 0_i32..10, ey in 0_i32..10
    ) {
        prop_assume!((sx, sy) != (ex, ey));
        let mut grid = PathGrid::new(10, 10, GridTopology::Intercardinal);
        let end = Pos::new(ex, ey, 0);
        grid.add_unwalkable(end);
        prop_assert!(find_path(&grid, Pos::new(sx, sy, 0), end, PathOptions::default()).is_empty());
    }

    #[test]
    fn half_turn_mirrors_the_field_of_view(
        facing in 0_i32..8,
        walls in proptest::collection::btree_set((0_i32..21, 0_i32..21), 0..40)
    ) {
        let facing = Direction::from_index(facing);
        let center = Pos::new(10, 10, 0);
        let mirror = |pos: Pos| Pos::new(20 - pos.x, 20 - pos.y, 0);

        let mut original = arena(21);
        let mut rotated = arena(21);
        let a = original.spawn(center, facing).expect("spawn");
        let b = rotated.spawn(center, facing.opposite()).expect("spawn");
        for (x, y) in walls.into_iter().filter(|wall| *wall != (10, 10)) {
            let pos = Pos::new(x, y, 0);
            let here = original.tile_id(pos).expect("tile");
            let there = rotated.tile_id(mirror(pos)).expect("tile");
            let placed = original.dispatch(Command::AddWall { tile: here });
            let mirrored = rotated.dispatch(Command::AddWall { tile: there });
            prop_assert!(placed.is_applied());
            prop_assert!(mirrored.is_applied());
        }

        let seen: BTreeSet<Pos> = visible_positions(&original, a).into_iter().map(mirror).collect();
        prop_assert_eq!(seen, visible_positions(&rotated, b));
    }

    #[test]
    fn stale_ids_never_mutate_state(tile in 100_u32..10_000, shot in any::<u64>()) {
        let mut game = arena(10);
        let id = game.spawn(Pos::new(4, 4, 0), Direction::E).expect("spawn");
        game.dispatch(Command::SelectEntity { entity: id });
        let before = game.snapshot_hash();

        for command in [
            Command::HoverTile { tile: TileId(tile) },
            Command::ClickTile { tile: TileId(tile) },
            Command::AddWall { tile: TileId(tile) },
            Command::ShotLanded { shot: ShotId(shot) },
            Command::HoverEntity { entity: EntityId::default() },
        ] {
            prop_assert!(matches!(game.dispatch(command), CommandOutcome::Rejected(_)));
        }
        prop_assert_eq!(game.snapshot_hash(), before);
    }
}

fn pick<T: Copy>(rng: &mut ChaCha8Rng, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.next_u64() as usize % items.len()])
}

fn random_command(rng: &mut ChaCha8Rng, game: &Game) -> Command {
    let map = &game.state().map;
    let pos = Pos::new(
        (rng.next_u64() % map.width as u64) as i32,
        (rng.next_u64() % map.height as u64) as i32,
        0,
    );
    let tile = map.tile_id(pos).unwrap_or(TileId(0));
    let entities: Vec<EntityId> = game.state().entities.keys().collect();
    let entity = pick(rng, &entities).unwrap_or_default();
    let facing = Direction::from_index((rng.next_u64() % 8) as i32);

    match rng.next_u64() % 18 {
        0 => Command::SpawnEntity { pos, facing },
        1 => Command::SelectEntity { entity },
        2 | 3 => Command::HoverTile { tile },
        4 => Command::HoverEntity { entity },
        5 => Command::UnhoverEntity,
        6 => Command::ClickTile { tile },
        7 | 8 => Command::ClickEntity { entity },
        9 => Command::ClickBoard,
        10 => Command::ToggleMove,
        11 => Command::ToggleTurn,
        12 => Command::ToggleAim,
        13 => Command::Cancel,
        14 | 15 => Command::StepCompleted,
        16 => Command::AddWall { tile },
        _ => match pick(rng, &game.shots().iter().map(|shot| shot.id).collect::<Vec<_>>()) {
            Some(shot) if rng.next_u64() % 2 == 0 => Command::ShotLanded { shot },
            _ => Command::AdvanceTurn,
        },
    }
}

#[test]
fn random_command_streams_preserve_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    runner
        .run(&(any::<u64>(), any::<u64>()), |(seed, command_seed)| {
            let mut game = Game::new(seed, SimConfig::default());
            let mut rng = ChaCha8Rng::seed_from_u64(command_seed);
            for step in 0..300 {
                let command = random_command(&mut rng, &game);
                let outcome = game.dispatch(command);
                if let CommandOutcome::Faulted(violation) = &outcome {
                    return Err(TestCaseError::fail(format!(
                        "step {step}: {command:?} faulted with {violation}"
                    )));
                }
                if let Err(violation) = game.check_invariants() {
                    return Err(TestCaseError::fail(format!(
                        "step {step}: invariants broken after {command:?}: {violation}"
                    )));
                }
            }
            Ok(())
        })
        .expect("random command streams must keep the board consistent");
}
