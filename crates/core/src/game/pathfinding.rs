//! Weighted best-first route search over a `PathGrid`.
//! This module exists so routing rules are reusable by the interaction machine and tests.
//! It does not own occupancy; callers sync the grid overlay before searching.
//!
//! Routes include the start cell. An empty route means "no path", which is an
//! ordinary result rather than an error.
//!
//! The heuristic is Manhattan distance on every topology. It overestimates on
//! intercardinal and hex grids, so routes there are always valid and contiguous but a
//! detour around obstacles may cost more than the cheapest one. Open-grid routes are
//! still shortest.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::grid::PathGrid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathOptions {
    /// Maximum accumulated cost a route may spend.
    pub cost_threshold: Option<u32>,
    /// Allow the goal to be a cell that is walkable-but-unstoppable or blocked.
    pub end_on_unstoppable: bool,
}

/// Open-set entry. Ties on `f` fall back to discovery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    seq: u64,
    x: i32,
    y: i32,
}

pub fn find_path(grid: &PathGrid, start: Pos, end: Pos, opts: PathOptions) -> Vec<Pos> {
    if start.x == end.x && start.y == end.y {
        return vec![start];
    }
    if !grid.in_grid(start) || !grid.in_grid(end) {
        return Vec::new();
    }
    if !grid.is_stoppable(end) && !opts.end_on_unstoppable {
        return Vec::new();
    }

    let goal = (end.x, end.y);
    let mut open_set = BTreeSet::new();
    let mut open_entries: BTreeMap<(i32, i32), OpenNode> = BTreeMap::new();
    let mut came_from: BTreeMap<(i32, i32), (i32, i32)> = BTreeMap::new();
    let mut g_score: BTreeMap<(i32, i32), u32> = BTreeMap::new();
    let mut seq = 0u64;

    let start_node = OpenNode { f: start.manhattan(end), seq, x: start.x, y: start.y };
    open_set.insert(start_node);
    open_entries.insert((start.x, start.y), start_node);
    g_score.insert((start.x, start.y), 0);

    while let Some(current_node) = open_set.pop_first() {
        let current = (current_node.x, current_node.y);
        open_entries.remove(&current);
        if current == goal {
            return reconstruct_path(&came_from, start, end);
        }

        let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
        for &(dx, dy) in grid.neighbor_offsets() {
            let neighbor = Pos { x: current.0 + dx, y: current.1 + dy, z: start.z };
            let is_goal = (neighbor.x, neighbor.y) == goal;
            if !grid.is_walkable(neighbor) && !(is_goal && opts.end_on_unstoppable) {
                continue;
            }
            let tentative_g = current_g.saturating_add(grid.cost(neighbor));
            if opts.cost_threshold.is_some_and(|budget| tentative_g > budget) {
                continue;
            }
            let key = (neighbor.x, neighbor.y);
            if tentative_g >= g_score.get(&key).copied().unwrap_or(u32::MAX) {
                continue;
            }
            if let Some(existing) = open_entries.remove(&key) {
                open_set.remove(&existing);
            }
            came_from.insert(key, current);
            g_score.insert(key, tentative_g);

            seq += 1;
            let node = OpenNode {
                f: tentative_g.saturating_add(neighbor.manhattan(end)),
                seq,
                x: neighbor.x,
                y: neighbor.y,
            };
            open_set.insert(node);
            open_entries.insert(key, node);
        }
    }

    Vec::new()
}

/// Every walkable cell reachable from `start` without exceeding `budget`.
pub fn reachable_within(grid: &PathGrid, start: Pos, budget: u32) -> BTreeSet<Pos> {
    let mut best: BTreeMap<(i32, i32), u32> = BTreeMap::new();
    if !grid.in_grid(start) {
        return BTreeSet::new();
    }
    best.insert((start.x, start.y), 0);
    let mut queue = VecDeque::from([(start.x, start.y)]);

    while let Some(current) = queue.pop_front() {
        let spent = best[&current];
        for &(dx, dy) in grid.neighbor_offsets() {
            let neighbor = Pos { x: current.0 + dx, y: current.1 + dy, z: start.z };
            if !grid.is_walkable(neighbor) {
                continue;
            }
            let total = spent.saturating_add(grid.cost(neighbor));
            if total > budget {
                continue;
            }
            let key = (neighbor.x, neighbor.y);
            if total < best.get(&key).copied().unwrap_or(u32::MAX) {
                best.insert(key, total);
                queue.push_back(key);
            }
        }
    }

    best.into_keys().map(|(x, y)| Pos { x, y, z: start.z }).collect()
}

fn reconstruct_path(
    came_from: &BTreeMap<(i32, i32), (i32, i32)>,
    start: Pos,
    end: Pos,
) -> Vec<Pos> {
    let mut path = vec![end];
    let mut current = (end.x, end.y);
    while current != (start.x, start.y) {
        let Some(prev) = came_from.get(&current).copied() else {
            return Vec::new();
        };
        current = prev;
        path.push(Pos { x: prev.0, y: prev.1, z: start.z });
    }
    path.reverse();
    path
}
