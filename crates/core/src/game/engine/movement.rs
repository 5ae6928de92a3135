//! Step-by-step movement along the committed path.

use super::*;

impl Game {
    /// One animation tick: turn toward the next cell, or step onto it when the
    /// entity already faces within one eighth-turn of it.
    pub(super) fn advance_along_path(&mut self, entity: EntityId) -> Result<(), HandlerError> {
        let Some(next) = self.cursor.path.first().copied() else {
            return Err(InvariantViolation::EmptyPathAdvance.into());
        };
        let pos = self.living_pos(entity)?;
        let facing = self.state.entities[entity].vision.facing;
        if pos.z != next.z || pos.chebyshev(next) != 1 {
            return Err(InvariantViolation::NonAdjacentStep { from: pos, to: next }.into());
        }
        let Some(wanted) = Direction::toward(pos, next) else {
            return Err(InvariantViolation::NonAdjacentStep { from: pos, to: next }.into());
        };

        let turn = facing.turn_distance(wanted);
        if turn.abs() <= 1 {
            self.relocate(entity, next)?;
            self.cursor.path.remove(0);
            self.set_facing(entity, wanted);
        } else {
            self.set_facing(entity, facing.rotated(turn.signum()));
        }
        self.refresh_all_vision();
        Ok(())
    }

    /// Moves a living entity onto an open tile, updating both tiles and the registry together.
    pub(super) fn relocate(&mut self, entity: EntityId, to: Pos) -> Result<(), InvariantViolation> {
        let from = self.living_pos(entity)?;
        let dest = self.state.map.tile(to).ok_or(InvariantViolation::UnresolvedTile(to))?;
        if !dest.is_open() {
            return Err(InvariantViolation::StepIntoBlockedTile(to));
        }
        let recorded = self.state.map.occupant_at(from);
        if recorded != Some(entity) {
            return Err(InvariantViolation::OccupancyDesync {
                pos: from,
                recorded,
                actual: Some(entity),
            });
        }

        if let Some(tile) = self.state.map.tile_mut(from) {
            tile.occupant = None;
        }
        if let Some(tile) = self.state.map.tile_mut(to) {
            tile.occupant = Some(entity);
        }
        self.state.entities[entity].pos = to;
        self.log.push(LogEvent::EntityMoved { entity, from, to });
        Ok(())
    }

    pub(super) fn set_facing(&mut self, entity: EntityId, facing: Direction) {
        let vision = &mut self.state.entities[entity].vision;
        if vision.facing != facing {
            vision.facing = facing;
            self.log.push(LogEvent::EntityTurned { entity, facing });
        }
    }

    /// Re-plans the queued path toward its last cell when a cell on it stopped being open.
    pub(super) fn revalidate_path(&mut self) {
        let Mode::Selected { entity, sub: SelectedMode::Moving(_) } = self.mode else {
            return;
        };
        let blocked = self
            .cursor
            .path
            .iter()
            .any(|pos| !self.state.map.tile(*pos).is_some_and(Tile::is_open));
        if !blocked {
            return;
        }
        let (Some(goal), Some(start)) =
            (self.cursor.path.last().copied(), self.state.living_entity(entity).map(|e| e.pos))
        else {
            self.cursor.path.clear();
            return;
        };
        debug!(?goal, "queued path blocked; re-planning");
        self.cursor.path = self.route(start, goal);
    }
}
