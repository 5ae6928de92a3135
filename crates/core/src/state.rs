use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::config::{EntityTemplate, GridTopology, MAX_MAP_DEPTH, MAX_MAP_SIDE, MapConfig};
use crate::game::grid::PathGrid;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub pos: Pos,
    pub terrain: Terrain,
    /// Living entity standing on this tile.
    pub occupant: Option<EntityId>,
    /// Dead entities left on this tile, oldest first.
    pub remains: Vec<EntityId>,
}

impl Tile {
    pub fn is_open(&self) -> bool {
        self.terrain != Terrain::Wall && self.occupant.is_none()
    }
}

/// Rectangular, layered tile store. Tiles are created once and never removed.
#[derive(Clone, Debug)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    tiles: Vec<Tile>,
}

impl Map {
    /// Builds a full grid of floor tiles. Extents are clamped to the supported range.
    pub fn new(width: i32, height: i32, depth: i32) -> Self {
        let width = width.clamp(1, MAX_MAP_SIDE);
        let height = height.clamp(1, MAX_MAP_SIDE);
        let depth = depth.clamp(1, MAX_MAP_DEPTH);
        let mut tiles = Vec::with_capacity((width * height * depth) as usize);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    let id = TileId(tiles.len() as u32);
                    tiles.push(Tile {
                        id,
                        pos: Pos { x, y, z },
                        terrain: Terrain::None,
                        occupant: None,
                        remains: Vec::new(),
                    });
                }
            }
        }
        Self { width, height, depth, tiles }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.width, config.height, config.depth)
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && pos.x < self.width
            && pos.y < self.height
            && pos.z < self.depth
    }

    pub fn tile_id(&self, pos: Pos) -> Option<TileId> {
        self.in_bounds(pos).then(|| TileId(self.index(pos) as u32))
    }

    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles.get(self.index(pos))
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        self.tiles.get_mut(idx)
    }

    pub fn tile_by_id(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn terrain_at(&self, pos: Pos) -> Option<Terrain> {
        self.tile(pos).map(|tile| tile.terrain)
    }

    pub fn set_terrain(&mut self, pos: Pos, terrain: Terrain) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.terrain = terrain;
        }
    }

    pub fn occupant_at(&self, pos: Pos) -> Option<EntityId> {
        self.tile(pos).and_then(|tile| tile.occupant)
    }

    fn index(&self, pos: Pos) -> usize {
        ((pos.z * self.height + pos.y) * self.width + pos.x) as usize
    }
}

/// Samples gathered by one vision ray.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleSample {
    pub blocking: Option<TileInView>,
    /// First non-blocking sample of each kind along the ray.
    pub items: Vec<TileInView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vision {
    pub facing: Direction,
    pub positions: BTreeSet<TileId>,
    pub entities: BTreeSet<EntityId>,
    pub angles: Vec<AngleSample>,
}

impl Vision {
    pub fn facing(facing: Direction) -> Self {
        Self { facing, positions: BTreeSet::new(), entities: BTreeSet::new(), angles: Vec::new() }
    }
}

/// Stub turn behaviour used when the round advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Behavior {
    #[default]
    Advancing,
    Fighting,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Pos,
    pub health: Health,
    pub attack: AttackStats,
    pub vision: Vision,
    pub behavior: Behavior,
}

impl Entity {
    pub fn is_alive(&self) -> bool {
        !self.health.dead
    }
}

pub struct GameState {
    pub map: Map,
    pub entities: SlotMap<EntityId, Entity>,
    /// One pathfinding grid per map layer, synced from the registry before each query.
    pub path_grids: Vec<PathGrid>,
    pub template: EntityTemplate,
}

impl GameState {
    pub fn new(map: Map, topology: GridTopology, template: EntityTemplate) -> Self {
        let path_grids =
            (0..map.depth).map(|_| PathGrid::new(map.width, map.height, topology)).collect();
        Self { map, entities: SlotMap::with_key(), path_grids, template }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn living_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id).filter(|entity| entity.is_alive())
    }

    pub fn living_ids(&self) -> Vec<EntityId> {
        self.entities.iter().filter(|(_, e)| e.is_alive()).map(|(id, _)| id).collect()
    }

    /// Rebuilds the walkability overlay for `z` from terrain and living occupants.
    pub fn sync_path_grid(&mut self, z: i32) -> Option<&PathGrid> {
        let grid = self.path_grids.get_mut(usize::try_from(z).ok()?)?;
        grid.sync_with(&self.map, &self.entities, z);
        Some(grid)
    }
}
