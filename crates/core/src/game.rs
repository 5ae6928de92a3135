use std::collections::BTreeSet;

use crate::config::SimConfig;
use crate::error::{CommandError, CommandOutcome, HandlerError, InvariantViolation};
use crate::state::{Behavior, Entity, GameState, Map, Tile, Vision};
use crate::types::*;

pub mod combat;
mod engine;
pub mod grid;
mod hash;
pub mod interaction;
mod invariants;
pub mod pathfinding;
mod snapshot;
pub mod visibility;

#[cfg(test)]
mod test_support;

use combat::{resolve_fire, resolve_melee};

pub use combat::{AttackOutcome, RollSource, ScriptedRolls, SeededRolls};
pub use grid::PathGrid;
pub use interaction::{AimMode, Cursor, Mode, MoveMode, SelectedMode};
pub use pathfinding::{PathOptions, find_path, reachable_within};
pub use snapshot::{EntitySnapshot, Snapshot};
pub use visibility::{VisionResult, compute_visibility};

pub struct Game {
    seed: u64,
    config: SimConfig,
    state: GameState,
    mode: Mode,
    cursor: Cursor,
    rolls: Box<dyn RollSource>,
    /// Fired shots awaiting `ShotLanded`; finished ones are pruned on the next shot.
    shots: Vec<ShotEvent>,
    next_shot: u64,
    round: u64,
    log: Vec<LogEvent>,
}

impl Game {
    /// Empty board built from `config`, with hit rolls seeded from `seed`.
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self::with_rolls(seed, config, Box::new(SeededRolls::new(seed)))
    }

    pub fn with_rolls(seed: u64, config: SimConfig, rolls: Box<dyn RollSource>) -> Self {
        let map = Map::from_config(&config.map);
        let state = GameState::new(map, config.topology, config.entity);
        Self {
            seed,
            config,
            state,
            mode: Mode::Selecting,
            cursor: Cursor::default(),
            rolls,
            shots: Vec::new(),
            next_shot: 0,
            round: 0,
            log: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.mode.selected()
    }

    pub fn targeted(&self) -> Option<EntityId> {
        self.mode.targeted()
    }

    pub fn shots(&self) -> &[ShotEvent] {
        &self.shots
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.state.entity(id)
    }

    pub fn tile_id(&self, pos: Pos) -> Option<TileId> {
        self.state.map.tile_id(pos)
    }

    /// Living entity standing at `pos`, if any.
    pub fn entity_at(&self, pos: Pos) -> Option<EntityId> {
        self.state.map.occupant_at(pos)
    }

    /// Grid for layer `z`, for adjusting costs and the unstoppable overlay.
    /// Terrain classes and occupancy are rebuilt before every query.
    pub fn path_grid_mut(&mut self, z: i32) -> Option<&mut PathGrid> {
        self.state.path_grids.get_mut(usize::try_from(z).ok()?)
    }

    /// Cells the entity could reach spending at most `budget` movement cost.
    pub fn movement_range(
        &mut self,
        entity: EntityId,
        budget: u32,
    ) -> Result<BTreeSet<Pos>, CommandError> {
        let pos = self
            .state
            .living_entity(entity)
            .map(|entity| entity.pos)
            .ok_or(CommandError::UnknownEntity(entity))?;
        let Some(grid) = self.state.sync_path_grid(pos.z) else {
            return Ok(BTreeSet::new());
        };
        Ok(reachable_within(grid, pos, budget))
    }
}
