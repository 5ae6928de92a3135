//! Walkability and cost grid consumed by the pathfinder.
//! This module exists so search code never reads map terrain or the entity registry directly.
//! It does not own occupancy; `sync_with` rebuilds its overlay from the registry on demand.

use std::collections::{BTreeMap, BTreeSet};

use slotmap::SlotMap;

use crate::config::{GridTopology, MAX_MAP_SIDE};
use crate::state::{Entity, Map};
use crate::types::{EntityId, Pos, Terrain};

pub const WALL_CLASS: u8 = 0;
pub const FLOOR_CLASS: u8 = 1;

#[derive(Clone, Debug)]
pub struct PathGrid {
    width: i32,
    height: i32,
    topology: GridTopology,
    classes: Vec<u8>,
    walkable_classes: BTreeSet<u8>,
    class_costs: BTreeMap<u8, u32>,
    extra_costs: BTreeMap<(i32, i32), u32>,
    unwalkable: BTreeSet<(i32, i32)>,
    unstoppable: BTreeSet<(i32, i32)>,
}

impl PathGrid {
    pub fn new(width: i32, height: i32, topology: GridTopology) -> Self {
        let width = width.clamp(0, MAX_MAP_SIDE);
        let height = height.clamp(0, MAX_MAP_SIDE);
        Self {
            width,
            height,
            topology,
            classes: vec![FLOOR_CLASS; (width * height) as usize],
            walkable_classes: BTreeSet::from([FLOOR_CLASS]),
            class_costs: BTreeMap::from([(WALL_CLASS, 1), (FLOOR_CLASS, 1)]),
            extra_costs: BTreeMap::new(),
            unwalkable: BTreeSet::new(),
            unstoppable: BTreeSet::new(),
        }
    }

    pub fn topology(&self) -> GridTopology {
        self.topology
    }

    pub fn in_grid(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.in_grid(pos)
            && !self.unwalkable.contains(&(pos.x, pos.y))
            && self.walkable_classes.contains(&self.classes[self.index(pos)])
    }

    pub fn is_stoppable(&self, pos: Pos) -> bool {
        !self.unstoppable.contains(&(pos.x, pos.y)) && self.is_walkable(pos)
    }

    /// Cost of stepping onto `pos`; a per-coordinate override wins over the class cost.
    pub fn cost(&self, pos: Pos) -> u32 {
        if let Some(extra) = self.extra_costs.get(&(pos.x, pos.y)) {
            return *extra;
        }
        if !self.in_grid(pos) {
            return 1;
        }
        self.class_costs.get(&self.classes[self.index(pos)]).copied().unwrap_or(1)
    }

    pub fn set_class(&mut self, pos: Pos, class: u8) {
        if self.in_grid(pos) {
            let idx = self.index(pos);
            self.classes[idx] = class;
            self.class_costs.entry(class).or_insert(1);
        }
    }

    pub fn set_walkable_class(&mut self, class: u8, walkable: bool) {
        if walkable {
            self.walkable_classes.insert(class);
        } else {
            self.walkable_classes.remove(&class);
        }
    }

    pub fn set_class_cost(&mut self, class: u8, cost: u32) {
        self.class_costs.insert(class, cost);
    }

    pub fn add_extra_cost(&mut self, pos: Pos, cost: u32) {
        self.extra_costs.insert((pos.x, pos.y), cost);
    }

    pub fn remove_extra_cost(&mut self, pos: Pos) {
        self.extra_costs.remove(&(pos.x, pos.y));
    }

    pub fn clear_extra_costs(&mut self) {
        self.extra_costs.clear();
    }

    pub fn add_unwalkable(&mut self, pos: Pos) {
        self.unwalkable.insert((pos.x, pos.y));
    }

    pub fn remove_unwalkable(&mut self, pos: Pos) {
        self.unwalkable.remove(&(pos.x, pos.y));
    }

    pub fn clear_unwalkable(&mut self) {
        self.unwalkable.clear();
    }

    pub fn add_unstoppable(&mut self, pos: Pos) {
        self.unstoppable.insert((pos.x, pos.y));
    }

    pub fn remove_unstoppable(&mut self, pos: Pos) {
        self.unstoppable.remove(&(pos.x, pos.y));
    }

    pub fn clear_unstoppable(&mut self) {
        self.unstoppable.clear();
    }

    /// Rebuilds terrain classes and the unwalkable overlay for layer `z`.
    /// Costs and the unstoppable overlay are caller-owned and left untouched.
    pub fn sync_with(&mut self, map: &Map, entities: &SlotMap<EntityId, Entity>, z: i32) {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { x, y, z };
                let class = match map.terrain_at(pos) {
                    Some(Terrain::Wall) | None => WALL_CLASS,
                    Some(Terrain::None) => FLOOR_CLASS,
                };
                let idx = self.index(pos);
                self.classes[idx] = class;
            }
        }
        self.unwalkable.clear();
        for (_, entity) in entities.iter() {
            if entity.is_alive() && entity.pos.z == z {
                self.unwalkable.insert((entity.pos.x, entity.pos.y));
            }
        }
    }

    /// Neighbour offsets in expansion order for the grid topology.
    pub fn neighbor_offsets(&self) -> &'static [(i32, i32)] {
        match self.topology {
            GridTopology::Cardinal => &[(0, -1), (1, 0), (0, 1), (-1, 0)],
            GridTopology::Hex => &[(0, -1), (1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0)],
            GridTopology::Intercardinal => {
                &[(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)]
            }
        }
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}
