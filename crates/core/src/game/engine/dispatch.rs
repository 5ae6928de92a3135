//! Command validation and routing into the active interaction mode.

use super::*;

impl Game {
    /// Applies one host command.
    ///
    /// Stale ids and failed preconditions come back as `Rejected` and leave the
    /// state untouched. An engine defect comes back as `Faulted`, after the
    /// interaction mode has been pulled back to a safe resting state.
    pub fn dispatch(&mut self, command: Command) -> CommandOutcome {
        match self.handle(command) {
            Ok(true) => CommandOutcome::Applied,
            Ok(false) => {
                debug!(?command, mode = self.mode.path(), "command ignored in current mode");
                CommandOutcome::Ignored
            }
            Err(HandlerError::Command(err)) => {
                warn!(?command, %err, "command rejected");
                CommandOutcome::Rejected(err)
            }
            Err(HandlerError::Invariant(violation)) => {
                error!(?command, %violation, "invariant violated while handling command");
                self.log.push(LogEvent::Fault { detail: violation.to_string() });
                self.recover_from_fault();
                CommandOutcome::Faulted(violation)
            }
        }
    }

    /// Places a new entity built from the configured template.
    pub fn spawn(&mut self, pos: Pos, facing: Direction) -> Result<EntityId, CommandError> {
        let tile = self.state.map.tile(pos).ok_or(CommandError::OutOfBounds(pos))?;
        if tile.terrain == Terrain::Wall {
            return Err(CommandError::WallTile(pos));
        }
        if tile.occupant.is_some() {
            return Err(CommandError::TileOccupied(pos));
        }
        let template = self.state.template;
        if template.health <= 0 {
            return Err(CommandError::InvalidTemplateHealth(template.health));
        }

        let id = self.state.entities.insert_with_key(|id| Entity {
            id,
            pos,
            health: Health::full(template.health),
            attack: template.attack,
            vision: Vision::facing(facing),
            behavior: Behavior::Advancing,
        });
        if let Some(tile) = self.state.map.tile_mut(pos) {
            tile.occupant = Some(id);
        }
        self.log.push(LogEvent::EntitySpawned { entity: id, pos });
        self.after_board_change();
        Ok(id)
    }

    fn handle(&mut self, command: Command) -> Result<bool, HandlerError> {
        match command {
            Command::SpawnEntity { pos, facing } => {
                self.spawn(pos, facing)?;
                Ok(true)
            }
            Command::AddWall { tile } => {
                self.add_wall(tile)?;
                Ok(true)
            }
            Command::ShotLanded { shot } => {
                self.land_shot(shot)?;
                Ok(true)
            }
            Command::HoverTile { tile } => {
                let pos = self.resolve_tile(tile)?;
                self.cursor.hovered_tile = Some(tile);
                self.on_hover_tile(pos)?;
                Ok(true)
            }
            Command::HoverEntity { entity } => {
                let pos = self.resolve_entity(entity)?;
                self.cursor.hovered_entity = Some(entity);
                self.cursor.hovered_tile = self.state.map.tile_id(pos);
                self.on_hover_entity(entity)?;
                Ok(true)
            }
            Command::UnhoverEntity => {
                self.cursor.hovered_entity = None;
                Ok(true)
            }
            Command::SelectEntity { entity } => self.on_select_entity(entity),
            Command::ClickTile { tile } => {
                let pos = self.resolve_tile(tile)?;
                self.on_click_tile(pos)
            }
            Command::ClickEntity { entity } => {
                self.resolve_entity(entity)?;
                self.on_click_entity(entity)
            }
            Command::ClickBoard => self.on_click_board(),
            Command::ToggleMove => self.toggle(SelectedMode::Moving(MoveMode::Previewing)),
            Command::ToggleTurn => self.toggle(SelectedMode::Turning),
            Command::ToggleAim => self.toggle(SelectedMode::Aiming(AimMode::Acquiring)),
            Command::Cancel => self.on_cancel(),
            Command::StepCompleted => self.on_step_completed(),
            Command::AdvanceTurn => self.on_advance_turn(),
        }
    }

    fn resolve_tile(&self, tile: TileId) -> Result<Pos, CommandError> {
        self.state.map.tile_by_id(tile).map(|tile| tile.pos).ok_or(CommandError::UnknownTile(tile))
    }

    fn resolve_entity(&self, entity: EntityId) -> Result<Pos, CommandError> {
        self.state
            .entity(entity)
            .map(|entity| entity.pos)
            .ok_or(CommandError::UnknownEntity(entity))
    }

    fn on_hover_tile(&mut self, pos: Pos) -> Result<(), HandlerError> {
        let Mode::Selected { entity, sub } = self.mode else {
            return Ok(());
        };
        match sub {
            SelectedMode::Moving(MoveMode::Previewing) => self.preview_path(entity, pos)?,
            SelectedMode::Turning => self.turn_toward(entity, pos)?,
            SelectedMode::Aiming(AimMode::Locked { .. }) => {
                self.set_aim(entity, AimMode::Acquiring);
            }
            _ => {}
        }
        Ok(())
    }

    fn on_hover_entity(&mut self, hovered: EntityId) -> Result<(), HandlerError> {
        let Mode::Selected { entity, sub } = self.mode else {
            return Ok(());
        };
        match sub {
            SelectedMode::Moving(MoveMode::Previewing) => {
                if hovered == entity {
                    self.cursor.path.clear();
                } else {
                    let pos = self.resolve_entity(hovered)?;
                    self.preview_path(entity, pos)?;
                }
            }
            SelectedMode::Aiming(AimMode::Acquiring) => {
                if self.is_valid_target(entity, hovered) {
                    self.set_aim(entity, AimMode::Locked { target: hovered });
                }
            }
            SelectedMode::Aiming(AimMode::Locked { target }) if target != hovered => {
                let aim = if self.is_valid_target(entity, hovered) {
                    AimMode::Locked { target: hovered }
                } else {
                    AimMode::Acquiring
                };
                self.set_aim(entity, aim);
            }
            _ => {}
        }
        Ok(())
    }

    fn on_select_entity(&mut self, target: EntityId) -> Result<bool, HandlerError> {
        let alive = self
            .state
            .entity(target)
            .ok_or(CommandError::UnknownEntity(target))?
            .is_alive();
        if !alive {
            return Err(CommandError::EntityDead(target).into());
        }
        match self.mode {
            Mode::Selecting | Mode::Selected { sub: SelectedMode::Idle, .. } => {
                if self.mode.selected() != Some(target) {
                    self.change_mode(Mode::Selected { entity: target, sub: SelectedMode::Idle })?;
                }
                Ok(true)
            }
            Mode::Selected { .. } => Ok(false),
        }
    }

    fn on_click_tile(&mut self, pos: Pos) -> Result<bool, HandlerError> {
        match self.mode {
            Mode::Selected { entity, sub: SelectedMode::Moving(MoveMode::Previewing) } => {
                self.commit_path(entity, pos)
            }
            _ => Ok(false),
        }
    }

    fn on_click_entity(&mut self, clicked: EntityId) -> Result<bool, HandlerError> {
        let clicked_alive = self.state.living_entity(clicked).is_some();
        match self.mode {
            Mode::Selecting => {
                if !clicked_alive {
                    return Ok(false);
                }
                self.change_mode(Mode::Selected { entity: clicked, sub: SelectedMode::Idle })?;
                Ok(true)
            }
            Mode::Selected { entity, sub } => match sub {
                SelectedMode::Idle if clicked == entity => {
                    self.change_mode(Mode::Selecting)?;
                    Ok(true)
                }
                SelectedMode::Idle if clicked_alive => {
                    self.change_mode(Mode::Selected { entity: clicked, sub: SelectedMode::Idle })?;
                    Ok(true)
                }
                SelectedMode::Moving(MoveMode::Previewing) if clicked == entity => {
                    self.change_mode(Mode::Selected { entity, sub: SelectedMode::Idle })?;
                    Ok(true)
                }
                SelectedMode::Moving(MoveMode::Previewing) => {
                    let pos = self.resolve_entity(clicked)?;
                    self.commit_path(entity, pos)
                }
                SelectedMode::Aiming(AimMode::Locked { target }) if target == clicked => {
                    self.fire_at_target(entity, target)?;
                    Ok(true)
                }
                _ => Ok(false),
            },
        }
    }

    fn on_click_board(&mut self) -> Result<bool, HandlerError> {
        match self.mode {
            Mode::Selected { entity, sub: SelectedMode::Turning } => {
                self.change_mode(Mode::Selected { entity, sub: SelectedMode::Idle })?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Enters `branch`, or returns to idle when `branch` is already active.
    fn toggle(&mut self, branch: SelectedMode) -> Result<bool, HandlerError> {
        let Mode::Selected { entity, sub } = self.mode else {
            return Ok(false);
        };
        let next = if sub.same_branch(branch) { SelectedMode::Idle } else { branch };
        self.change_mode(Mode::Selected { entity, sub: next })?;
        Ok(true)
    }

    fn on_cancel(&mut self) -> Result<bool, HandlerError> {
        let Mode::Selected { entity, sub } = self.mode else {
            return Ok(false);
        };
        let next = match sub {
            SelectedMode::Idle => Mode::Selecting,
            SelectedMode::Moving(MoveMode::Animating) => {
                Mode::Selected { entity, sub: SelectedMode::Moving(MoveMode::Previewing) }
            }
            _ => Mode::Selected { entity, sub: SelectedMode::Idle },
        };
        self.change_mode(next)?;
        Ok(true)
    }

    fn on_step_completed(&mut self) -> Result<bool, HandlerError> {
        let Mode::Selected { entity, sub: SelectedMode::Moving(MoveMode::Animating) } = self.mode
        else {
            return Ok(false);
        };
        if self.cursor.path.is_empty() {
            self.change_mode(Mode::Selected {
                entity,
                sub: SelectedMode::Moving(MoveMode::Previewing),
            })?;
        } else {
            self.advance_along_path(entity)?;
        }
        Ok(true)
    }

    fn on_advance_turn(&mut self) -> Result<bool, HandlerError> {
        match self.mode {
            Mode::Selecting | Mode::Selected { sub: SelectedMode::Idle, .. } => {
                self.advance_round()?;
                Ok(true)
            }
            Mode::Selected { .. } => Ok(false),
        }
    }

    fn add_wall(&mut self, tile: TileId) -> Result<(), HandlerError> {
        let pos = self.resolve_tile(tile)?;
        let Some(target) = self.state.map.tile_mut(pos) else {
            return Err(InvariantViolation::UnresolvedTile(pos).into());
        };
        if target.terrain == Terrain::Wall {
            return Err(CommandError::WallTile(pos).into());
        }
        if target.occupant.is_some() || !target.remains.is_empty() {
            return Err(CommandError::TileOccupied(pos).into());
        }
        target.terrain = Terrain::Wall;
        self.log.push(LogEvent::WallAdded { tile });
        self.after_board_change();
        Ok(())
    }

    fn land_shot(&mut self, shot: ShotId) -> Result<(), CommandError> {
        let event = self
            .shots
            .iter_mut()
            .find(|event| event.id == shot)
            .ok_or(CommandError::UnknownShot(shot))?;
        event.done = true;
        Ok(())
    }

    /// Pulls the interaction mode back to a resting state after a defect.
    fn recover_from_fault(&mut self) {
        let next = match self.mode {
            Mode::Selected { entity, .. } if self.state.living_entity(entity).is_none() => {
                Mode::Selecting
            }
            Mode::Selected { entity, sub: SelectedMode::Moving(MoveMode::Animating) } => {
                Mode::Selected { entity, sub: SelectedMode::Moving(MoveMode::Previewing) }
            }
            other => other,
        };
        if matches!(next, Mode::Selected { sub: SelectedMode::Moving(_), .. }) {
            self.cursor.path.clear();
        }
        if next != self.mode && self.change_mode(next).is_err() {
            self.force_mode(Mode::Selecting);
        }
    }
}
