//! Serializable read model of the whole simulation.
//! This module exists so hosts and replays can observe state without borrowing engine internals.
//! It does not feed back into the simulation.

use serde::{Deserialize, Serialize};

use super::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub pos: Pos,
    pub facing: Direction,
    pub health: Health,
    pub visible_tiles: Vec<TileId>,
    pub visible_entities: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub round: u64,
    pub mode: String,
    pub selected: Option<EntityId>,
    pub targeted: Option<EntityId>,
    pub cursor: Cursor,
    pub walls: Vec<Pos>,
    pub entities: Vec<EntitySnapshot>,
    pub shots: Vec<ShotEvent>,
}

impl Game {
    pub fn snapshot(&self) -> Snapshot {
        let walls = self
            .state
            .map
            .tiles()
            .filter(|tile| tile.terrain == Terrain::Wall)
            .map(|tile| tile.pos)
            .collect();
        let entities = self
            .state
            .entities
            .values()
            .map(|entity| EntitySnapshot {
                id: entity.id,
                pos: entity.pos,
                facing: entity.vision.facing,
                health: entity.health,
                visible_tiles: entity.vision.positions.iter().copied().collect(),
                visible_entities: entity.vision.entities.iter().copied().collect(),
            })
            .collect();
        Snapshot {
            round: self.round,
            mode: self.mode.path().to_string(),
            selected: self.mode.selected(),
            targeted: self.mode.targeted(),
            cursor: self.cursor.clone(),
            walls,
            entities,
            shots: self.shots.clone(),
        }
    }
}
