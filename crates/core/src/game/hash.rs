//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own replay execution.

use std::hash::Hasher;

use super::*;
use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.round);
        hasher.write_u64(self.next_shot);
        hasher.write(self.mode.path().as_bytes());
        for id in [self.mode.selected(), self.mode.targeted()] {
            write_entity_ref(&mut hasher, id);
        }

        for tile in self.state.map.tiles() {
            if tile.terrain == Terrain::Wall {
                hasher.write_u32(tile.id.0);
            }
        }
        for entity in self.state.entities.values() {
            write_pos(&mut hasher, entity.pos);
            hasher.write_u8(entity.vision.facing as u8);
            hasher.write_i32(entity.health.current);
            hasher.write_u8(u8::from(entity.health.dead));
            hasher.write_u8(entity.behavior as u8);
            hasher.write_usize(entity.vision.positions.len());
            hasher.write_usize(entity.vision.entities.len());
        }

        hasher.write_usize(self.cursor.path.len());
        for pos in &self.cursor.path {
            write_pos(&mut hasher, *pos);
        }
        hasher.write_usize(self.cursor.in_range.len());
        for shot in &self.shots {
            hasher.write_u64(shot.id.0);
            hasher.write_u8(u8::from(shot.hit));
            hasher.write_u8(u8::from(shot.done));
        }
        hasher.finish()
    }
}

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
    hasher.write_i32(pos.z);
}

fn write_entity_ref(hasher: &mut Xxh3, id: Option<EntityId>) {
    match id {
        Some(id) => {
            hasher.write_u8(1);
            hasher.write_u64(id.data().as_ffi());
        }
        None => hasher.write_u8(0),
    }
}
