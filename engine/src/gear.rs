use serde::{Deserialize, Serialize};

use crate::matchup::Stance;
use crate::DamageDice;

pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Blade,
    Ranged,
}

impl WeaponKind {
    pub fn stance(self) -> Stance {
        match self {
            WeaponKind::Blade => Stance::Blade,
            WeaponKind::Ranged => Stance::Ranged,
        }
    }

    /// Die size at tier 1.
    fn base_sides(self) -> u32 {
        match self {
            WeaponKind::Blade => 8,
            WeaponKind::Ranged => 6,
        }
    }
}

pub fn clamp_tier(tier: u8) -> u8 {
    tier.clamp(MIN_TIER, MAX_TIER)
}

/// Damage dice for `kind` at `tier`.
///
/// Tier 1 is one base die, tier 2 one die a size up, tier 3+ two base dice
/// plus `tier - 3` flat.
pub fn weapon_profile(kind: WeaponKind, tier: u8) -> DamageDice {
    let base = kind.base_sides();
    match clamp_tier(tier) {
        1 => DamageDice::new(1, base),
        2 => DamageDice::new(1, base + 2),
        t => DamageDice::new(2, base).with_flat(i32::from(t) - 3),
    }
}

/// AC added on top of the player's base AC.
pub fn armor_bonus(tier: u8) -> i32 {
    i32::from(clamp_tier(tier) - MIN_TIER)
}
