use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EntityId;
}

/// Stable identifier of a map tile, derived from its position and the map extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShotId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, z: self.z }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    pub fn distance(self, other: Pos) -> f64 {
        f64::from(other.x - self.x).hypot(f64::from(other.y - self.y))
    }

    /// Number of king moves between two cells on the same layer.
    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Compass facing. Angles run clockwise from north with `y` growing southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub const fn index(self) -> i32 {
        self as i32
    }

    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(8) as usize]
    }

    pub const fn angle_degrees(self) -> i32 {
        self.index() * 45
    }

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
        }
    }

    /// Rotates by `steps` eighth-turns; positive is clockwise.
    pub fn rotated(self, steps: i32) -> Self {
        Self::from_index(self.index() + steps)
    }

    pub fn opposite(self) -> Self {
        self.rotated(4)
    }

    /// Signed number of eighth-turns from `self` to `target`, in `-3..=4`.
    pub fn turn_distance(self, target: Direction) -> i32 {
        let diff = (target.index() - self.index()).rem_euclid(8);
        if diff > 4 { diff - 8 } else { diff }
    }

    /// Facing that points from `from` toward `to`, quantized to the nearest 45°.
    /// Returns `None` when both cells coincide.
    pub fn toward(from: Pos, to: Pos) -> Option<Self> {
        if from.x == to.x && from.y == to.y {
            return None;
        }
        let dx = f64::from(to.x - from.x);
        let dy = f64::from(to.y - from.y);
        let angle = (dy.atan2(dx).to_degrees() + 90.0).rem_euclid(360.0);
        Some(Self::from_index((angle / 45.0).round() as i32))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    None,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub dead: bool,
}

impl Health {
    pub fn full(max: i32) -> Self {
        Self { current: max, max, dead: max <= 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeleeAttack {
    pub damage: i32,
    pub accuracy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangedAttack {
    pub damage: i32,
    pub range: f64,
    pub accuracy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackStats {
    pub melee: MeleeAttack,
    pub ranged: RangedAttack,
}

/// What a vision ray found in a sampled tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SightKind {
    Floor,
    Corpse,
    Entity,
    Wall,
}

impl SightKind {
    pub fn is_blocking(self) -> bool {
        matches!(self, SightKind::Entity | SightKind::Wall)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileInView {
    pub tile: TileId,
    pub distance: f64,
    /// Ray angle relative to the observer's facing, in degrees.
    pub angle: i32,
    pub kind: SightKind,
}

/// Fired-shot notification for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotEvent {
    pub id: ShotId,
    pub from: Pos,
    pub to: Pos,
    pub hit: bool,
    pub done: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LogEvent {
    EntitySpawned { entity: EntityId, pos: Pos },
    EntityMoved { entity: EntityId, from: Pos, to: Pos },
    EntityTurned { entity: EntityId, facing: Direction },
    ShotFired { shot: ShotId, attacker: EntityId, defender: EntityId, hit: bool },
    MeleeStrike { attacker: EntityId, defender: EntityId, hit: bool },
    EntityDamaged { entity: EntityId, amount: i32, remaining: i32 },
    EntityKilled { entity: EntityId },
    WallAdded { tile: TileId },
    ModeChanged { from: String, to: String },
    RoundAdvanced { round: u64 },
    Fault { detail: String },
}

/// Host input. Entities and tiles are addressed by id; ids that no longer resolve
/// are rejected rather than trusted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    SpawnEntity { pos: Pos, facing: Direction },
    SelectEntity { entity: EntityId },
    HoverTile { tile: TileId },
    HoverEntity { entity: EntityId },
    UnhoverEntity,
    ClickTile { tile: TileId },
    ClickEntity { entity: EntityId },
    /// Click on empty board space outside any tile or entity.
    ClickBoard,
    ToggleMove,
    ToggleTurn,
    ToggleAim,
    Cancel,
    /// Host finished animating the last movement tick.
    StepCompleted,
    AddWall { tile: TileId },
    AdvanceTurn,
    ShotLanded { shot: ShotId },
}
