//! Vision upkeep after anything that changes what entities can see.

use super::*;

impl Game {
    pub(super) fn refresh_vision(&mut self, entity: EntityId) -> Result<(), InvariantViolation> {
        let observer = self.state.entity(entity).ok_or(InvariantViolation::MissingEntity(entity))?;
        let result = compute_visibility(
            &self.state.map,
            &self.state.entities,
            observer,
            &self.config.vision,
        );
        self.store_vision(entity, result);
        Ok(())
    }

    /// Recomputes every living entity's field of view, in registry order.
    pub(super) fn refresh_all_vision(&mut self) {
        for id in self.state.living_ids() {
            let result = compute_visibility(
                &self.state.map,
                &self.state.entities,
                &self.state.entities[id],
                &self.config.vision,
            );
            self.store_vision(id, result);
        }
    }

    fn store_vision(&mut self, entity: EntityId, result: VisionResult) {
        if self.mode.selected() == Some(entity) {
            self.cursor.in_view = result.blockers();
        }
        let vision = &mut self.state.entities[entity].vision;
        vision.positions = result.positions;
        vision.entities = result.entities;
        vision.angles = result.angles;
    }

    /// Follow-up after terrain, occupancy or health changes: vision for everyone,
    /// then the cursor data that depends on it.
    pub(super) fn after_board_change(&mut self) {
        self.refresh_all_vision();
        self.revalidate_path();
        if let Mode::Selected { entity, sub: SelectedMode::Aiming(aim) } = self.mode {
            self.compute_in_range(entity);
            if let AimMode::Locked { target } = aim
                && !self.is_valid_target(entity, target)
            {
                self.set_aim(entity, AimMode::Acquiring);
            }
        }
    }
}
