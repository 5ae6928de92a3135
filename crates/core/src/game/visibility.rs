//! Angular raycasting for per-entity field of view.
//! This module exists to keep sight rules deterministic and isolated from command handling.
//! It does not write to the registry; callers store the returned `VisionResult`.

use std::collections::BTreeSet;

use slotmap::SlotMap;

use crate::config::{MIN_RAY_STEP, VisionConfig};
use crate::state::{AngleSample, Entity, Map, Tile};
use crate::types::*;

#[derive(Clone, Debug, PartialEq)]
pub struct VisionResult {
    pub positions: BTreeSet<TileId>,
    pub entities: BTreeSet<EntityId>,
    pub angles: Vec<AngleSample>,
}

impl VisionResult {
    /// Blocking samples, one per distinct tile, in ray order.
    pub fn blockers(&self) -> Vec<TileInView> {
        let mut seen = BTreeSet::new();
        self.angles
            .iter()
            .filter_map(|sample| sample.blocking)
            .filter(|blocker| seen.insert(blocker.tile))
            .collect()
    }
}

pub fn compute_visibility(
    map: &Map,
    entities: &SlotMap<EntityId, Entity>,
    observer: &Entity,
    config: &VisionConfig,
) -> VisionResult {
    let mut positions = BTreeSet::new();
    let mut visible_entities = BTreeSet::new();
    if let Some(own) = map.tile_id(observer.pos) {
        positions.insert(own);
    }

    let facing_angle = observer.vision.facing.angle_degrees();
    let ray_count = (config.half_angle.max(0) * 2) as usize;
    let mut angles = Vec::with_capacity(ray_count);

    for i in 0..ray_count {
        let relative = i as i32 - config.half_angle;
        let mut sample = AngleSample::default();
        let mut last_tile = None;

        for (distance, tile_pos) in ray_cells(observer.pos, facing_angle + relative, config) {
            let Some(tile) = map.tile(tile_pos) else {
                break;
            };
            if last_tile == Some(tile.id) {
                continue;
            }
            last_tile = Some(tile.id);
            positions.insert(tile.id);

            let kind = classify(tile, entities, observer.id);
            let seen = TileInView { tile: tile.id, distance, angle: relative, kind };
            if kind.is_blocking() {
                if kind == SightKind::Entity
                    && let Some(occupant) = tile.occupant
                {
                    visible_entities.insert(occupant);
                }
                sample.blocking = Some(seen);
                break;
            }
            if !sample.items.iter().any(|item| item.kind == kind) {
                sample.items.push(seen);
            }
        }
        angles.push(sample);
    }

    VisionResult { positions, entities: visible_entities, angles }
}

fn classify(tile: &Tile, entities: &SlotMap<EntityId, Entity>, observer: EntityId) -> SightKind {
    if tile.terrain == Terrain::Wall {
        return SightKind::Wall;
    }
    match tile.occupant {
        Some(occupant)
            if occupant != observer && entities.get(occupant).is_some_and(Entity::is_alive) =>
        {
            SightKind::Entity
        }
        _ if !tile.remains.is_empty() => SightKind::Corpse,
        _ => SightKind::Floor,
    }
}

/// Unit direction for a compass angle in degrees (0 = north, clockwise).
/// Opposite angles produce exactly negated vectors.
fn ray_direction(degrees: i32) -> (f64, f64) {
    let normalized = degrees.rem_euclid(360);
    if normalized >= 180 {
        let (dx, dy) = ray_direction(normalized - 180);
        return (-dx, -dy);
    }
    let (sin, cos) = f64::from(normalized).to_radians().sin_cos();
    (sin, -cos)
}

/// Cells under successive samples along one ray, starting half a step out from the
/// observer's cell centre and stopping at the configured range.
fn ray_cells(origin: Pos, degrees: i32, config: &VisionConfig) -> impl Iterator<Item = (f64, Pos)> {
    let (dx, dy) = ray_direction(degrees);
    let step = if config.ray_step.is_finite() { config.ray_step.max(MIN_RAY_STEP) } else { 0.1 };
    // Non-finite ranges cast nothing.
    let range = if config.range.is_finite() { config.range } else { 0.0 };
    (0u32..)
        .map(move |k| (f64::from(k) + 0.5) * step)
        .take_while(move |distance| *distance <= range)
        .map(move |distance| {
            let x = origin.x + (0.5 + distance * dx).floor() as i32;
            let y = origin.y + (0.5 + distance * dy).floor() as i32;
            (distance, Pos { x, y, z: origin.z })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;

    #[test]
    fn observer_tile_is_always_visible() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(0, 0, 0), Direction::NW);
        let result = vision_of(&state, observer);
        let own = state.map.tile_id(Pos::new(0, 0, 0)).expect("tile");
        assert!(result.positions.contains(&own));
        assert_eq!(result.positions.len(), 1, "facing off-map sees only its own tile");
    }

    #[test]
    fn casts_one_ray_per_degree_of_the_cone() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(5, 5, 0), Direction::N);
        let result = vision_of(&state, observer);
        assert_eq!(result.angles.len(), 128);
        assert_eq!(result.angles[0].items.first().map(|item| item.angle), Some(-64));
    }

    #[test]
    fn cone_excludes_tiles_behind_the_observer() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(5, 5, 0), Direction::N);
        let result = vision_of(&state, observer);
        let behind = state.map.tile_id(Pos::new(5, 8, 0)).expect("tile");
        let ahead = state.map.tile_id(Pos::new(5, 1, 0)).expect("tile");
        assert!(!result.positions.contains(&behind));
        assert!(result.positions.contains(&ahead));
    }

    #[test]
    fn entities_no_ray_reaches_are_not_seen() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(5, 5, 0), Direction::N);
        let behind = place_entity(&mut state, Pos::new(5, 8, 0), Direction::N);
        let ahead = place_entity(&mut state, Pos::new(5, 2, 0), Direction::S);
        let result = vision_of(&state, observer);

        assert!(state.entities[behind].pos.distance(Pos::new(5, 5, 0)) < 20.0);
        assert!(!result.entities.contains(&behind));
        assert!(result.entities.contains(&ahead));
        assert!(!result.entities.contains(&observer));
    }

    #[test]
    fn wall_terminates_rays_and_is_classified() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(5, 5, 0), Direction::N);
        state.map.set_terrain(Pos::new(5, 3, 0), Terrain::Wall);
        let result = vision_of(&state, observer);
        let wall = state.map.tile_id(Pos::new(5, 3, 0)).expect("tile");
        let hidden = state.map.tile_id(Pos::new(5, 2, 0)).expect("tile");
        assert!(result.positions.contains(&wall));
        assert!(!result.positions.contains(&hidden));
        let straight_ahead = &result.angles[64];
        assert_eq!(straight_ahead.blocking.map(|b| (b.tile, b.kind)), Some((wall, SightKind::Wall)));
    }

    #[test]
    fn corpses_are_seen_through() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(5, 5, 0), Direction::N);
        let corpse = place_entity(&mut state, Pos::new(5, 3, 0), Direction::S);
        kill_in_place(&mut state, corpse);
        let result = vision_of(&state, observer);

        assert!(!result.entities.contains(&corpse));
        let straight_ahead = &result.angles[64];
        assert!(straight_ahead.items.iter().any(|item| item.kind == SightKind::Corpse));
        let beyond = state.map.tile_id(Pos::new(5, 1, 0)).expect("tile");
        assert!(result.positions.contains(&beyond));
    }

    #[test]
    fn visibility_is_idempotent() {
        let (mut state, observer) = lone_observer_fixture(Pos::new(4, 6, 0), Direction::NE);
        place_entity(&mut state, Pos::new(6, 3, 0), Direction::S);
        state.map.set_terrain(Pos::new(7, 5, 0), Terrain::Wall);
        let first = vision_of(&state, observer);
        let second = vision_of(&state, observer);
        assert_eq!(first, second);
    }

    #[test]
    fn non_finite_vision_settings_still_terminate() {
        let (state, observer) = lone_observer_fixture(Pos::new(5, 5, 0), Direction::N);
        let observer = &state.entities[observer];
        let unbounded = VisionConfig { range: f64::INFINITY, ..VisionConfig::default() };
        let undefined = VisionConfig { range: f64::NAN, ray_step: f64::NAN, ..unbounded };
        let stalled = VisionConfig { ray_step: 0.0, ..VisionConfig::default() };

        for config in [unbounded, undefined] {
            let result = compute_visibility(&state.map, &state.entities, observer, &config);
            assert_eq!(result.positions.len(), 1);
        }
        let result = compute_visibility(&state.map, &state.entities, observer, &stalled);
        let ahead = state.map.tile_id(Pos::new(5, 1, 0)).expect("tile");
        assert!(result.positions.contains(&ahead));
    }

    #[test]
    fn opposite_rays_are_exact_negations() {
        for degrees in [0, 17, 45, 90, 133, 179] {
            let (dx, dy) = ray_direction(degrees);
            assert_eq!(ray_direction(degrees + 180), (-dx, -dy));
        }
    }
}
