//! Tunable simulation parameters.
//! Every field has a default so partial config files deserialize cleanly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AttackStats, MeleeAttack, RangedAttack};

/// Largest accepted map width or height.
pub const MAX_MAP_SIDE: i32 = 1024;
pub const MAX_MAP_DEPTH: i32 = 16;
/// Smallest accepted distance between vision samples.
pub const MIN_RAY_STEP: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("entity health must be positive, got {0}")]
    NonPositiveHealth(i32),
    #[error("map {width}x{height}x{depth} is outside the supported extent")]
    MapOutOfRange { width: i32, height: i32, depth: i32 },
    #[error("vision half angle must be within 0..=180, got {0}")]
    HalfAngleOutOfRange(i32),
    #[error("vision range must be finite and non-negative")]
    InvalidVisionRange,
    #[error("ray step must be finite and at least {}", MIN_RAY_STEP)]
    InvalidRayStep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridTopology {
    Cardinal,
    Hex,
    #[default]
    Intercardinal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub map: MapConfig,
    pub topology: GridTopology,
    pub vision: VisionConfig,
    pub entity: EntityTemplate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { width: 10, height: 10, depth: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Half-width of the vision cone; one ray is cast per integer degree.
    pub half_angle: i32,
    pub range: f64,
    pub ray_step: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self { half_angle: 64, range: 20.0, ray_step: 0.1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTemplate {
    pub health: i32,
    pub attack: AttackStats,
}

impl Default for EntityTemplate {
    fn default() -> Self {
        Self {
            health: 10,
            attack: AttackStats {
                melee: MeleeAttack { damage: 3, accuracy: 0.85 },
                ranged: RangedAttack { damage: 3, range: 6.0, accuracy: 0.85 },
            },
        }
    }
}

impl SimConfig {
    /// Rejects values the simulation cannot represent. Loaders call this before
    /// building a game; the engine itself clamps anything that slips through.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let MapConfig { width, height, depth } = self.map;
        let side = 1..=MAX_MAP_SIDE;
        let layers = 1..=MAX_MAP_DEPTH;
        if !side.contains(&width) || !side.contains(&height) || !layers.contains(&depth) {
            return Err(ConfigError::MapOutOfRange { width, height, depth });
        }
        if !(0..=180).contains(&self.vision.half_angle) {
            return Err(ConfigError::HalfAngleOutOfRange(self.vision.half_angle));
        }
        if !self.vision.range.is_finite() || self.vision.range < 0.0 {
            return Err(ConfigError::InvalidVisionRange);
        }
        if !self.vision.ray_step.is_finite() || self.vision.ray_step < MIN_RAY_STEP {
            return Err(ConfigError::InvalidRayStep);
        }
        if self.entity.health <= 0 {
            return Err(ConfigError::NonPositiveHealth(self.entity.health));
        }
        Ok(())
    }
}
