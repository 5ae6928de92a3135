//! Whole-state consistency checks.
//! This module exists so tests, fuzzing and hosts can assert registry, tile and cursor agreement.
//! It does not repair anything; the first violation found is returned.

use super::*;

impl Game {
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (id, entity) in &self.state.entities {
            let health = entity.health;
            if health.current > health.max || health.dead != (health.current <= 0) {
                return Err(InvariantViolation::HealthInconsistent(id));
            }
            let pos = entity.pos;
            let tile = self.state.map.tile(pos).ok_or(InvariantViolation::UnresolvedTile(pos))?;
            let placed = if entity.is_alive() {
                tile.occupant == Some(id)
            } else {
                tile.remains.contains(&id)
            };
            if !placed {
                return Err(InvariantViolation::OccupancyDesync {
                    pos,
                    recorded: tile.occupant,
                    actual: entity.is_alive().then_some(id),
                });
            }
        }

        for tile in self.state.map.tiles() {
            let Some(occupant) = tile.occupant else {
                continue;
            };
            if tile.terrain == Terrain::Wall {
                return Err(InvariantViolation::EntityInWall(tile.pos));
            }
            let entity =
                self.state.entity(occupant).ok_or(InvariantViolation::MissingEntity(occupant))?;
            if !entity.is_alive() || entity.pos != tile.pos {
                return Err(InvariantViolation::OccupancyDesync {
                    pos: tile.pos,
                    recorded: Some(occupant),
                    actual: self.state.living_entity(occupant).map(|_| occupant),
                });
            }
        }

        for referenced in [self.mode.selected(), self.mode.targeted()].into_iter().flatten() {
            if self.state.living_entity(referenced).is_none() {
                return Err(InvariantViolation::DeadEntityInCursor(referenced));
            }
        }
        Ok(())
    }
}
