//! Shared test fixtures for the `game` submodule test suites.
//! This module exists to avoid repeating map and entity setup across many tests.
//! It does not own production gameplay logic.

use super::*;
use crate::config::{EntityTemplate, GridTopology, VisionConfig};

/// Default 10x10 single-layer state holding one entity at `pos`.
pub(crate) fn lone_observer_fixture(pos: Pos, facing: Direction) -> (GameState, EntityId) {
    let map = Map::new(10, 10, 1);
    let mut state = GameState::new(map, GridTopology::Intercardinal, EntityTemplate::default());
    let id = place_entity(&mut state, pos, facing);
    (state, id)
}

pub(crate) fn place_entity(state: &mut GameState, pos: Pos, facing: Direction) -> EntityId {
    let template = state.template;
    let id = state.entities.insert_with_key(|id| Entity {
        id,
        pos,
        health: Health::full(template.health),
        attack: template.attack,
        vision: Vision::facing(facing),
        behavior: Behavior::Advancing,
    });
    if let Some(tile) = state.map.tile_mut(pos) {
        tile.occupant = Some(id);
    }
    id
}

/// Marks an entity dead and leaves its body on its tile.
pub(crate) fn kill_in_place(state: &mut GameState, id: EntityId) {
    let entity = &mut state.entities[id];
    entity.health.current = 0;
    entity.health.dead = true;
    let pos = entity.pos;
    if let Some(tile) = state.map.tile_mut(pos) {
        tile.occupant = None;
        tile.remains.push(id);
    }
}

pub(crate) fn vision_of(state: &GameState, id: EntityId) -> VisionResult {
    compute_visibility(&state.map, &state.entities, &state.entities[id], &VisionConfig::default())
}

/// Game on the default 10x10 map whose hit rolls come from `rolls`, cycling.
pub(crate) fn game_with_rolls(rolls: Vec<f64>) -> Game {
    Game::with_rolls(7, SimConfig::default(), Box::new(ScriptedRolls::new(rolls)))
}

pub(crate) fn spawn(game: &mut Game, x: i32, y: i32, facing: Direction) -> EntityId {
    game.spawn(Pos::new(x, y, 0), facing).expect("spawn fixture entity")
}

pub(crate) fn tile(game: &Game, x: i32, y: i32) -> TileId {
    game.state().map.tile_id(Pos::new(x, y, 0)).expect("fixture tile in bounds")
}

/// Selects `entity` from the neutral mode.
pub(crate) fn select(game: &mut Game, entity: EntityId) {
    assert_eq!(game.dispatch(Command::SelectEntity { entity }), CommandOutcome::Applied);
}

/// Dispatches `StepCompleted` until the entity stops animating, bounded by `limit`.
pub(crate) fn run_animation(game: &mut Game, limit: usize) -> usize {
    let mut steps = 0;
    while game.mode().path() == "selected.moving.animating" && steps < limit {
        game.dispatch(Command::StepCompleted);
        steps += 1;
    }
    steps
}
