//! Hit rolls, damage application and death bookkeeping.
//! This module exists so combat arithmetic stays independent of interaction flow.
//! It does not decide who may attack whom; callers check targeting rules first.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::error::CommandError;
use crate::state::GameState;
use crate::types::{EntityId, Pos};

/// Source of uniform rolls in `[0, 1)`.
pub trait RollSource {
    fn roll(&mut self) -> f64;
}

pub struct SeededRolls {
    rng: ChaCha8Rng,
}

impl SeededRolls {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl RollSource for SeededRolls {
    fn roll(&mut self) -> f64 {
        // 53 random mantissa bits.
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed roll sequence, cycling once exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    next: usize,
}

impl ScriptedRolls {
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, next: 0 }
    }
}

impl RollSource for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.0;
        }
        let value = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        value
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackOutcome {
    pub from: Pos,
    pub to: Pos,
    pub hit: bool,
    pub damage: i32,
    pub killed: bool,
}

/// Ranged attack from `attacker` on `defender`. Both must exist and be alive.
pub fn resolve_fire(
    state: &mut GameState,
    rolls: &mut dyn RollSource,
    attacker: EntityId,
    defender: EntityId,
) -> Result<AttackOutcome, CommandError> {
    let (from, to) = living_pair(state, attacker, defender)?;
    let ranged = state.entities[attacker].attack.ranged;
    let hit = rolls.roll() < ranged.accuracy;
    Ok(settle(state, defender, from, to, hit, ranged.damage))
}

/// Melee strike used by the stub turn behaviour.
pub fn resolve_melee(
    state: &mut GameState,
    rolls: &mut dyn RollSource,
    attacker: EntityId,
    defender: EntityId,
) -> Result<AttackOutcome, CommandError> {
    let (from, to) = living_pair(state, attacker, defender)?;
    let melee = state.entities[attacker].attack.melee;
    let hit = rolls.roll() < melee.accuracy;
    Ok(settle(state, defender, from, to, hit, melee.damage))
}

fn living_pair(
    state: &GameState,
    attacker: EntityId,
    defender: EntityId,
) -> Result<(Pos, Pos), CommandError> {
    let from = living_pos(state, attacker)?;
    let to = living_pos(state, defender)?;
    Ok((from, to))
}

fn living_pos(state: &GameState, id: EntityId) -> Result<Pos, CommandError> {
    let entity = state.entity(id).ok_or(CommandError::UnknownEntity(id))?;
    if !entity.is_alive() {
        return Err(CommandError::EntityDead(id));
    }
    Ok(entity.pos)
}

fn settle(
    state: &mut GameState,
    defender: EntityId,
    from: Pos,
    to: Pos,
    hit: bool,
    damage: i32,
) -> AttackOutcome {
    let mut killed = false;
    if hit {
        let health = &mut state.entities[defender].health;
        health.current -= damage;
        if health.current <= 0 {
            health.dead = true;
            killed = true;
            clear_occupancy(state, defender, to);
        }
    }
    AttackOutcome { from, to, hit, damage: if hit { damage } else { 0 }, killed }
}

/// Moves a dead entity from the tile's occupant slot to its remains.
fn clear_occupancy(state: &mut GameState, id: EntityId, pos: Pos) {
    if let Some(tile) = state.map.tile_mut(pos) {
        if tile.occupant == Some(id) {
            tile.occupant = None;
        }
        tile.remains.push(id);
    }
}
