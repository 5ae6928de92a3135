use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::types::{Direction, Pos};

pub const SCRIPT_FORMAT_VERSION: u16 = 1;

/// Recorded command sequence. Steps address entities and tiles by board
/// position so a script stays valid across runs that allocate different ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandScript {
    pub format_version: u16,
    pub seed: u64,
    #[serde(default)]
    pub config: SimConfig,
    pub steps: Vec<ScriptStep>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Spawn { at: Pos, facing: Direction },
    Select { at: Pos },
    HoverTile { at: Pos },
    HoverEntity { at: Pos },
    Unhover,
    ClickTile { at: Pos },
    ClickEntity { at: Pos },
    ClickBoard,
    ToggleMove,
    ToggleTurn,
    ToggleAim,
    Cancel,
    StepCompleted,
    /// `StepCompleted` until the selected entity stops animating.
    FinishAnimation,
    AddWall { at: Pos },
    AdvanceTurn,
    /// `ShotLanded` for every shot still in flight.
    LandShots,
}

impl CommandScript {
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self { format_version: SCRIPT_FORMAT_VERSION, seed, config, steps: Vec::new() }
    }

    pub fn push(&mut self, step: ScriptStep) -> &mut Self {
        self.steps.push(step);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_use_tagged_snake_case() {
        let json = serde_json::to_string(&ScriptStep::HoverTile { at: Pos::new(1, 2, 0) })
            .expect("serialize");
        assert_eq!(json, r#"{"op":"hover_tile","at":{"x":1,"y":2,"z":0}}"#);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let script: CommandScript =
            serde_json::from_str(r#"{"format_version":1,"seed":3,"steps":[{"op":"advance_turn"}]}"#)
                .expect("parse");
        assert_eq!(script.config, SimConfig::default());
        assert_eq!(script.steps, vec![ScriptStep::AdvanceTurn]);
    }
}
