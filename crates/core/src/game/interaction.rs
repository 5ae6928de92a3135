//! Interaction modes and the cursor state they drive.
//! This module exists so the nested mode hierarchy is a plain value that can be matched
//! exhaustively.
//! It does not run entry or exit actions; the engine applies those when a mode changes.

use std::collections::BTreeSet;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Pos, TileId, TileInView};

/// Top-level interaction mode. The selected entity lives inside the variant,
/// so it cannot be present while nothing is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Selecting,
    Selected { entity: EntityId, sub: SelectedMode },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectedMode {
    #[default]
    Idle,
    Moving(MoveMode),
    Turning,
    Aiming(AimMode),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveMode {
    /// Path preview follows the hovered tile.
    #[default]
    Previewing,
    /// Entity walks the committed path one tick per `StepCompleted`.
    Animating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimMode {
    #[default]
    Acquiring,
    Locked { target: EntityId },
}

impl Mode {
    pub fn selected(self) -> Option<EntityId> {
        match self {
            Mode::Selecting => None,
            Mode::Selected { entity, .. } => Some(entity),
        }
    }

    pub fn targeted(self) -> Option<EntityId> {
        match self {
            Mode::Selected { sub: SelectedMode::Aiming(AimMode::Locked { target }), .. } => {
                Some(target)
            }
            _ => None,
        }
    }

    pub fn sub(self) -> Option<SelectedMode> {
        match self {
            Mode::Selecting => None,
            Mode::Selected { sub, .. } => Some(sub),
        }
    }

    /// Dotted name of the active leaf, e.g. `selected.moving.animating`.
    pub fn path(self) -> &'static str {
        match self {
            Mode::Selecting => "selecting",
            Mode::Selected { sub, .. } => match sub {
                SelectedMode::Idle => "selected.idle",
                SelectedMode::Moving(MoveMode::Previewing) => "selected.moving.selecting",
                SelectedMode::Moving(MoveMode::Animating) => "selected.moving.animating",
                SelectedMode::Turning => "selected.turning",
                SelectedMode::Aiming(AimMode::Acquiring) => "selected.aiming.selecting",
                SelectedMode::Aiming(AimMode::Locked { .. }) => "selected.aiming.selected",
            },
        }
    }
}

impl SelectedMode {
    pub fn is_moving(self) -> bool {
        matches!(self, SelectedMode::Moving(_))
    }

    pub fn is_aiming(self) -> bool {
        matches!(self, SelectedMode::Aiming(_))
    }

    /// Same top-level branch (idle, moving, turning, aiming), ignoring leaf state.
    pub fn same_branch(self, other: SelectedMode) -> bool {
        mem::discriminant(&self) == mem::discriminant(&other)
    }
}

/// Transient pointer-driven data owned by the interaction machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub hovered_tile: Option<TileId>,
    pub hovered_entity: Option<EntityId>,
    /// Queued or previewed route, excluding the entity's own cell.
    pub path: Vec<Pos>,
    /// Visible tiles within ranged reach while aiming.
    pub in_range: BTreeSet<TileId>,
    /// Blocking samples of the selected entity's field of view.
    pub in_view: Vec<TileInView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn selection_and_target_are_derived_from_the_mode() {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        let shooter = keys.insert(());
        let target = keys.insert(());

        let locked = Mode::Selected {
            entity: shooter,
            sub: SelectedMode::Aiming(AimMode::Locked { target }),
        };
        assert_eq!(locked.selected(), Some(shooter));
        assert_eq!(locked.targeted(), Some(target));
        assert_eq!(locked.path(), "selected.aiming.selected");

        let idle = Mode::Selected { entity: shooter, sub: SelectedMode::Idle };
        assert_eq!(idle.targeted(), None);
        assert_eq!(Mode::Selecting.selected(), None);
        assert_eq!(Mode::Selecting.path(), "selecting");
    }

    #[test]
    fn branches_ignore_leaf_state() {
        let preview = SelectedMode::Moving(MoveMode::Previewing);
        let animate = SelectedMode::Moving(MoveMode::Animating);
        assert!(preview.same_branch(animate));
        assert!(!preview.same_branch(SelectedMode::Turning));
        assert!(SelectedMode::Aiming(AimMode::Acquiring).is_aiming());
    }
}
