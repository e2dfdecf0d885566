//! Hold-to-commit: a to-hit bonus that pays off on a good read and bites
//! back on a bad one.

use crate::config::RulesConfig;
use crate::AdMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitEffect {
    pub to_hit_bonus: i32,
    pub damage_bonus: i32,
    /// Extra guard reduction when the committed action is a guard.
    pub guard_bonus: i32,
    /// True damage the player takes on submission.
    pub backlash: i32,
}

pub fn commit_effect(committed: bool, mode: AdMode, rules: &RulesConfig) -> CommitEffect {
    if !committed {
        return CommitEffect::default();
    }
    CommitEffect {
        to_hit_bonus: rules.commit_to_hit_bonus,
        damage_bonus: if mode == AdMode::Advantage { rules.commit_advantage_damage } else { 0 },
        guard_bonus: rules.guard_commit_bonus,
        backlash: if mode == AdMode::Disadvantage { rules.commit_backlash } else { 0 },
    }
}
