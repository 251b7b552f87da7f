//! Player-progression inputs: per-operator multipliers computed by an
//! external progression collaborator and injected at construction. The core
//! never persists or derives these values itself.

use crate::abilities::AbilityKind;
use crate::operator::OperatorId;

/// Multipliers and unlocks for one operator.
#[derive(Debug, Clone)]
pub struct OperatorLoadout {
    /// Scales ship damage at spawn.
    pub damage_mult: f32,
    /// Scales ship max health at spawn.
    pub health_mult: f32,
    /// Scales ship speed at spawn.
    pub speed_mult: f32,
    /// Scales ability cooldowns; below 1.0 means faster recovery.
    pub cooldown_mult: f32,
    /// Scales ability effect strength.
    pub power_mult: f32,
    /// Scales ability effect durations.
    pub duration_mult: f32,
    /// Abilities this operator may activate.
    pub unlocked: Vec<AbilityKind>,
}

impl Default for OperatorLoadout {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            health_mult: 1.0,
            speed_mult: 1.0,
            cooldown_mult: 1.0,
            power_mult: 1.0,
            duration_mult: 1.0,
            unlocked: AbilityKind::ALL.to_vec(),
        }
    }
}

impl OperatorLoadout {
    pub fn is_unlocked(&self, kind: AbilityKind) -> bool {
        self.unlocked.contains(&kind)
    }
}

/// Loadouts for every operator in a session, indexed by [`OperatorId`].
/// Operators past the end of the list fall back to the default loadout.
#[derive(Debug, Clone, Default)]
pub struct Progression {
    loadouts: Vec<OperatorLoadout>,
    fallback: OperatorLoadout,
}

impl Progression {
    pub fn new(loadouts: Vec<OperatorLoadout>) -> Self {
        Self {
            loadouts,
            fallback: OperatorLoadout::default(),
        }
    }

    /// Identical default loadouts for `count` operators.
    pub fn uniform(count: usize) -> Self {
        Self::new(vec![OperatorLoadout::default(); count])
    }

    pub fn loadout(&self, op: OperatorId) -> &OperatorLoadout {
        self.loadouts.get(op.0).unwrap_or(&self.fallback)
    }

    pub fn loadout_mut(&mut self, op: OperatorId) -> Option<&mut OperatorLoadout> {
        self.loadouts.get_mut(op.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_falls_back_past_the_end() {
        let p = Progression::uniform(1);
        let l = p.loadout(OperatorId(5));
        assert_eq!(l.damage_mult, 1.0);
        assert!(l.is_unlocked(AbilityKind::Heal));
    }

    #[test]
    fn progression_lockout_respected() {
        let mut p = Progression::uniform(2);
        p.loadout_mut(OperatorId(1)).unwrap().unlocked = vec![AbilityKind::Heal];
        assert!(!p.loadout(OperatorId(1)).is_unlocked(AbilityKind::BlackHole));
        assert!(p.loadout(OperatorId(0)).is_unlocked(AbilityKind::BlackHole));
    }
}
