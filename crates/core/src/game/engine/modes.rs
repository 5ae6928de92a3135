//! Mode changes with their entry and exit actions, plus per-mode helpers.

use super::*;

impl Game {
    /// Switches to `next`, running exit actions of every branch being left and
    /// entry actions of every branch being entered.
    pub(super) fn change_mode(&mut self, next: Mode) -> Result<(), HandlerError> {
        let prev = self.mode;
        if prev == next {
            return Ok(());
        }
        let same_selection = prev.selected().is_some() && prev.selected() == next.selected();
        let kept_sub = if same_selection { next.sub() } else { None };
        let prev_sub = if same_selection { prev.sub() } else { None };

        if let Some(old) = prev.sub() {
            if old.is_moving() && !kept_sub.is_some_and(SelectedMode::is_moving) {
                self.cursor.path.clear();
            }
            if old.is_aiming() && !kept_sub.is_some_and(SelectedMode::is_aiming) {
                self.cursor.in_range.clear();
            }
            if !same_selection {
                self.cursor.in_view.clear();
            }
        }

        self.mode = next;
        self.record_transition(prev, next);

        let Mode::Selected { entity, sub } = next else {
            return Ok(());
        };
        if !same_selection {
            self.refresh_vision(entity)?;
        }
        match sub {
            SelectedMode::Moving(leaf) => {
                if !prev_sub.is_some_and(SelectedMode::is_moving) {
                    self.preview_hovered(entity)?;
                }
                if leaf == MoveMode::Animating && prev_sub != Some(sub) {
                    self.advance_along_path(entity)?;
                }
            }
            SelectedMode::Aiming(_) if !prev_sub.is_some_and(SelectedMode::is_aiming) => {
                self.compute_in_range(entity);
                if let Some(hovered) = self.cursor.hovered_entity
                    && self.is_valid_target(entity, hovered)
                {
                    self.set_aim(entity, AimMode::Locked { target: hovered });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Leaf change inside the aiming branch; no entry or exit actions apply.
    pub(super) fn set_aim(&mut self, entity: EntityId, aim: AimMode) {
        let next = Mode::Selected { entity, sub: SelectedMode::Aiming(aim) };
        if self.mode != next {
            let prev = self.mode;
            self.mode = next;
            self.record_transition(prev, next);
        }
    }

    /// Sets `next` without entry actions and wipes all derived cursor data.
    pub(super) fn force_mode(&mut self, next: Mode) {
        let prev = self.mode;
        self.mode = next;
        self.cursor.path.clear();
        self.cursor.in_range.clear();
        self.cursor.in_view.clear();
        self.record_transition(prev, next);
    }

    fn record_transition(&mut self, prev: Mode, next: Mode) {
        debug!(from = prev.path(), to = next.path(), "interaction mode changed");
        self.log.push(LogEvent::ModeChanged { from: prev.path().into(), to: next.path().into() });
    }

    /// Position of an entity the engine is about to act on; it must be alive.
    pub(super) fn living_pos(&self, entity: EntityId) -> Result<Pos, InvariantViolation> {
        let found = self.state.entity(entity).ok_or(InvariantViolation::MissingEntity(entity))?;
        if !found.is_alive() {
            return Err(InvariantViolation::DeadEntityInCursor(entity));
        }
        Ok(found.pos)
    }

    pub(super) fn preview_path(
        &mut self,
        entity: EntityId,
        target: Pos,
    ) -> Result<(), HandlerError> {
        let start = self.living_pos(entity)?;
        self.cursor.path = self.route(start, target);
        Ok(())
    }

    fn preview_hovered(&mut self, entity: EntityId) -> Result<(), HandlerError> {
        let hovered = self.cursor.hovered_tile.and_then(|tile| self.state.map.tile_by_id(tile));
        match hovered.map(|tile| tile.pos) {
            Some(pos) => self.preview_path(entity, pos),
            None => {
                self.cursor.path.clear();
                Ok(())
            }
        }
    }

    /// Route from `start` to `target`, excluding `start`. Empty when unreachable.
    pub(super) fn route(&mut self, start: Pos, target: Pos) -> Vec<Pos> {
        if start.z != target.z {
            return Vec::new();
        }
        let Some(grid) = self.state.sync_path_grid(start.z) else {
            return Vec::new();
        };
        let mut path = find_path(grid, start, target, PathOptions::default());
        if !path.is_empty() {
            path.remove(0);
        }
        path
    }

    /// Re-plans toward `target` and starts walking when a route exists.
    pub(super) fn commit_path(
        &mut self,
        entity: EntityId,
        target: Pos,
    ) -> Result<bool, HandlerError> {
        self.preview_path(entity, target)?;
        if self.cursor.path.is_empty() {
            return Ok(false);
        }
        let sub = SelectedMode::Moving(MoveMode::Animating);
        self.change_mode(Mode::Selected { entity, sub })?;
        Ok(true)
    }

    pub(super) fn turn_toward(
        &mut self,
        entity: EntityId,
        target: Pos,
    ) -> Result<(), HandlerError> {
        let from = self.living_pos(entity)?;
        let Some(facing) = Direction::toward(from, target) else {
            return Ok(());
        };
        self.set_facing(entity, facing);
        self.refresh_vision(entity)?;
        Ok(())
    }

    /// A target is another living entity the shooter currently sees, within ranged reach.
    pub(super) fn is_valid_target(&self, shooter: EntityId, target: EntityId) -> bool {
        if shooter == target {
            return false;
        }
        let (Some(shooter), Some(target)) =
            (self.state.living_entity(shooter), self.state.living_entity(target))
        else {
            return false;
        };
        shooter.vision.entities.contains(&target.id)
            && shooter.pos.distance(target.pos) < shooter.attack.ranged.range
    }

    pub(super) fn compute_in_range(&mut self, entity: EntityId) {
        let Some(shooter) = self.state.living_entity(entity) else {
            self.cursor.in_range.clear();
            return;
        };
        let own = self.state.map.tile_id(shooter.pos);
        let range = shooter.attack.ranged.range;
        self.cursor.in_range = shooter
            .vision
            .positions
            .iter()
            .copied()
            .filter(|tile| Some(*tile) != own)
            .filter(|tile| {
                self.state
                    .map
                    .tile_by_id(*tile)
                    .is_some_and(|found| shooter.pos.distance(found.pos) < range)
            })
            .collect();
    }
}
