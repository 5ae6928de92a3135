pub mod config;
pub mod error;
pub mod game;
pub mod replay;
pub mod script;
pub mod state;
pub mod types;

pub use config::{ConfigError, EntityTemplate, GridTopology, MapConfig, SimConfig, VisionConfig};
pub use error::{CommandError, CommandOutcome, InvariantViolation};
pub use game::{
    AimMode, Cursor, EntitySnapshot, Game, Mode, MoveMode, RollSource, ScriptedRolls, SeededRolls,
    SelectedMode, Snapshot,
};
pub use replay::*;
pub use script::{CommandScript, SCRIPT_FORMAT_VERSION, ScriptStep};
pub use state::{Entity, GameState, Map, Tile};
pub use types::*;
