//! Deterministic execution of recorded command scripts.

use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;
use crate::error::CommandOutcome;
use crate::game::{Game, Snapshot};
use crate::script::{CommandScript, SCRIPT_FORMAT_VERSION, ScriptStep};
use crate::types::{Command, EntityId, Pos, TileId};

/// Upper bound on ticks a single `FinishAnimation` step may consume.
const MAX_ANIMATION_TICKS: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("unsupported script format version {0}")]
    UnsupportedVersion(u16),
    #[error("step {step}: no entity at {pos:?}")]
    UnresolvedEntity { step: usize, pos: Pos },
    #[error("step {step}: {pos:?} is outside the map")]
    UnresolvedTile { step: usize, pos: Pos },
    #[error("invalid script config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReplayResult {
    /// One outcome per dispatched command, in order.
    pub outcomes: Vec<CommandOutcome>,
    pub final_hash: u64,
    pub snapshot: Snapshot,
}

pub fn run_script(script: &CommandScript) -> Result<ReplayResult, ReplayError> {
    if script.format_version != SCRIPT_FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion(script.format_version));
    }
    script.config.validate()?;
    let mut game = Game::new(script.seed, script.config.clone());
    let outcomes = apply_steps(&mut game, &script.steps)?;
    Ok(ReplayResult { outcomes, final_hash: game.snapshot_hash(), snapshot: game.snapshot() })
}

/// Applies `steps` to an existing game, returning each dispatched command's outcome.
pub fn apply_steps(
    game: &mut Game,
    steps: &[ScriptStep],
) -> Result<Vec<CommandOutcome>, ReplayError> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        if let Some(command) = resolve_step(game, index, *step)? {
            outcomes.push(game.dispatch(command));
            continue;
        }
        match step {
            ScriptStep::FinishAnimation => {
                let mut ticks = 0;
                while ticks < MAX_ANIMATION_TICKS
                    && game.mode().path() == "selected.moving.animating"
                {
                    outcomes.push(game.dispatch(Command::StepCompleted));
                    ticks += 1;
                }
                debug!(step = index, ticks, "animation finished");
            }
            ScriptStep::LandShots => {
                let pending: Vec<_> =
                    game.shots().iter().filter(|shot| !shot.done).map(|shot| shot.id).collect();
                for shot in pending {
                    outcomes.push(game.dispatch(Command::ShotLanded { shot }));
                }
            }
            _ => {}
        }
    }
    Ok(outcomes)
}

/// Single command for `script_step`, or `None` for steps that expand into several.
fn resolve_step(
    game: &Game,
    step: usize,
    script_step: ScriptStep,
) -> Result<Option<Command>, ReplayError> {
    let tile = |pos: Pos| -> Result<TileId, ReplayError> {
        game.tile_id(pos).ok_or(ReplayError::UnresolvedTile { step, pos })
    };
    let entity = |pos: Pos| -> Result<EntityId, ReplayError> {
        entity_at(game, pos).ok_or(ReplayError::UnresolvedEntity { step, pos })
    };
    let command = match script_step {
        ScriptStep::Spawn { at, facing } => Command::SpawnEntity { pos: at, facing },
        ScriptStep::Select { at } => Command::SelectEntity { entity: entity(at)? },
        ScriptStep::HoverTile { at } => Command::HoverTile { tile: tile(at)? },
        ScriptStep::HoverEntity { at } => Command::HoverEntity { entity: entity(at)? },
        ScriptStep::Unhover => Command::UnhoverEntity,
        ScriptStep::ClickTile { at } => Command::ClickTile { tile: tile(at)? },
        ScriptStep::ClickEntity { at } => Command::ClickEntity { entity: entity(at)? },
        ScriptStep::ClickBoard => Command::ClickBoard,
        ScriptStep::ToggleMove => Command::ToggleMove,
        ScriptStep::ToggleTurn => Command::ToggleTurn,
        ScriptStep::ToggleAim => Command::ToggleAim,
        ScriptStep::Cancel => Command::Cancel,
        ScriptStep::StepCompleted => Command::StepCompleted,
        ScriptStep::AddWall { at } => Command::AddWall { tile: tile(at)? },
        ScriptStep::AdvanceTurn => Command::AdvanceTurn,
        ScriptStep::FinishAnimation | ScriptStep::LandShots => return Ok(None),
    };
    Ok(Some(command))
}

/// Living occupant at `pos`, falling back to the most recent body left there.
fn entity_at(game: &Game, pos: Pos) -> Option<EntityId> {
    let tile = game.state().map.tile(pos)?;
    tile.occupant.or_else(|| tile.remains.last().copied())
}
