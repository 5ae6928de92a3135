//! Round advancement with the placeholder per-entity behaviour.

use super::*;

/// What an entity finds on the cell it faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ahead {
    Open,
    Obstacle,
    Occupied(EntityId),
}

impl Game {
    /// Gives every living entity one action, in spawn order, then bumps the round counter.
    pub(super) fn advance_round(&mut self) -> Result<(), HandlerError> {
        for id in self.state.living_ids() {
            if self.state.living_entity(id).is_none() {
                continue;
            }
            self.take_stub_turn(id)?;
            self.refresh_all_vision();
        }
        self.round += 1;
        self.log.push(LogEvent::RoundAdvanced { round: self.round });
        debug!(round = self.round, "round advanced");
        Ok(())
    }

    fn take_stub_turn(&mut self, id: EntityId) -> Result<(), HandlerError> {
        let entity = &self.state.entities[id];
        let facing = entity.vision.facing;
        let behavior = entity.behavior;
        let ahead = entity.pos.step(facing);

        match (behavior, self.look_ahead(ahead)) {
            (_, Ahead::Occupied(target)) => {
                self.state.entities[id].behavior = Behavior::Fighting;
                self.melee_strike(id, target)?;
            }
            (Behavior::Advancing, Ahead::Open) => self.relocate(id, ahead)?,
            (Behavior::Advancing, Ahead::Obstacle) => self.set_facing(id, facing.opposite()),
            (Behavior::Fighting, _) => self.state.entities[id].behavior = Behavior::Advancing,
        }
        Ok(())
    }

    fn look_ahead(&self, pos: Pos) -> Ahead {
        match self.state.map.tile(pos) {
            None => Ahead::Obstacle,
            Some(tile) if tile.terrain == Terrain::Wall => Ahead::Obstacle,
            Some(tile) => tile.occupant.map_or(Ahead::Open, Ahead::Occupied),
        }
    }
}
