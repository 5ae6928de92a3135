//! Error taxonomy for command handling.
//!
//! Commands the active mode does not accept are plain `CommandOutcome::Ignored`.
//! Failed preconditions and references that went stale are `CommandError`s, logged
//! and otherwise treated as no-ops. `InvariantViolation` marks a defect in the
//! engine itself; it is caught at the dispatch boundary and never unwinds into the host.

use thiserror::Error;

use crate::types::{EntityId, Pos, ShotId, TileId};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("entity {0:?} does not exist")]
    UnknownEntity(EntityId),
    #[error("tile {0:?} does not exist")]
    UnknownTile(TileId),
    #[error("shot {0:?} does not exist")]
    UnknownShot(ShotId),
    #[error("position {0:?} is outside the map")]
    OutOfBounds(Pos),
    #[error("tile at {0:?} is already occupied")]
    TileOccupied(Pos),
    #[error("tile at {0:?} is a wall")]
    WallTile(Pos),
    #[error("entity {0:?} is dead")]
    EntityDead(EntityId),
    #[error("no entity is selected")]
    NothingSelected,
    #[error("entity template health {0} would spawn a dead entity")]
    InvalidTemplateHealth(i32),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("attempted to advance along an empty path")]
    EmptyPathAdvance,
    #[error("path step from {from:?} to {to:?} is not adjacent")]
    NonAdjacentStep { from: Pos, to: Pos },
    #[error("path step into blocked tile {0:?}")]
    StepIntoBlockedTile(Pos),
    #[error("tile for {0:?} cannot be resolved")]
    UnresolvedTile(Pos),
    #[error("entity {0:?} is referenced but missing from the registry")]
    MissingEntity(EntityId),
    #[error("tile {pos:?} records occupant {recorded:?} but registry places {actual:?} there")]
    OccupancyDesync { pos: Pos, recorded: Option<EntityId>, actual: Option<EntityId> },
    #[error("wall tile {0:?} holds an entity")]
    EntityInWall(Pos),
    #[error("entity {0:?} has inconsistent health")]
    HealthInconsistent(EntityId),
    #[error("interaction mode references dead entity {0:?}")]
    DeadEntityInCursor(EntityId),
}

/// Result of dispatching one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// The active interaction mode does not accept this command.
    Ignored,
    Rejected(CommandError),
    Faulted(InvariantViolation),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Internal handler failure, split at the dispatch boundary into `Rejected` or `Faulted`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum HandlerError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
