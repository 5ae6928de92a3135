//! Shots, melee strikes and the cleanup that follows a death.

use super::*;

impl Game {
    /// Fires the selected entity's ranged attack at its locked target.
    pub(super) fn fire_at_target(
        &mut self,
        shooter: EntityId,
        target: EntityId,
    ) -> Result<(), HandlerError> {
        let outcome = resolve_fire(&mut self.state, self.rolls.as_mut(), shooter, target)?;

        self.shots.retain(|shot| !shot.done);
        let shot = ShotId(self.next_shot);
        self.next_shot += 1;
        self.shots.push(ShotEvent {
            id: shot,
            from: outcome.from,
            to: outcome.to,
            hit: outcome.hit,
            done: false,
        });
        self.log.push(LogEvent::ShotFired {
            shot,
            attacker: shooter,
            defender: target,
            hit: outcome.hit,
        });
        debug!(?shooter, ?target, hit = outcome.hit, "shot fired");

        self.settle_attack(target, outcome)
    }

    pub(super) fn melee_strike(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
    ) -> Result<(), HandlerError> {
        let outcome = resolve_melee(&mut self.state, self.rolls.as_mut(), attacker, defender)?;
        self.log.push(LogEvent::MeleeStrike { attacker, defender, hit: outcome.hit });
        self.settle_attack(defender, outcome)
    }

    fn settle_attack(
        &mut self,
        defender: EntityId,
        outcome: AttackOutcome,
    ) -> Result<(), HandlerError> {
        if outcome.hit {
            let remaining = self.state.entities[defender].health.current;
            self.log.push(LogEvent::EntityDamaged {
                entity: defender,
                amount: outcome.damage,
                remaining,
            });
        }
        if outcome.killed {
            self.on_entity_killed(defender)?;
        }
        Ok(())
    }

    fn on_entity_killed(&mut self, killed: EntityId) -> Result<(), HandlerError> {
        debug!(?killed, "entity killed");
        self.log.push(LogEvent::EntityKilled { entity: killed });
        match self.mode {
            Mode::Selected { entity, .. } if entity == killed => {
                self.change_mode(Mode::Selecting)?;
            }
            Mode::Selected { entity, sub: SelectedMode::Aiming(AimMode::Locked { target }) }
                if target == killed =>
            {
                self.set_aim(entity, AimMode::Acquiring);
            }
            _ => {}
        }
        self.after_board_change();
        Ok(())
    }
}
