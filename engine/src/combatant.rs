//! Snapshots handed to a session by the world layer.
//!
//! Every numeric field defaults to 0 when absent so a partially filled
//! snapshot still resolves.

use serde::{Deserialize, Serialize};

use crate::gear::{armor_bonus, clamp_tier};
use crate::matchup::Stance;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OpponentSnapshot {
    pub name: String,
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub max_hp: i32,
    #[serde(default)]
    pub ac: i32,
    #[serde(default)]
    pub atk: i32,
    #[serde(default = "default_stance")]
    pub weapon_stance: Stance,
    #[serde(default = "default_damage_die")]
    pub damage_die: u32,
    #[serde(default)]
    pub damage_modifier: i32,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default = "default_phase")]
    pub boss_phase: u8,
}

fn default_stance() -> Stance {
    Stance::Blade
}

fn default_damage_die() -> u32 {
    4
}

fn default_phase() -> u8 {
    1
}

impl OpponentSnapshot {
    /// Snapshot for the boss's next phase, or `None` once `phases` is reached
    /// (or for non-bosses).
    pub fn next_boss_phase(&self, phases: u8) -> Option<OpponentSnapshot> {
        if !self.is_boss || self.boss_phase >= phases {
            return None;
        }
        let mut next = self.clone();
        next.boss_phase += 1;
        next.hp = next.max_hp;
        next.atk += 1;
        next.damage_modifier += 1;
        Some(next)
    }

    pub fn is_final_phase(&self, phases: u8) -> bool {
        !self.is_boss || self.boss_phase >= phases
    }

    /// Clamp HP into `0..=max_hp`, raising `max_hp` to cover a larger HP.
    pub fn normalize_hp(&mut self) {
        (self.hp, self.max_hp) = clamp_hp(self.hp, self.max_hp);
    }
}

fn clamp_hp(hp: i32, max_hp: i32) -> (i32, i32) {
    let hp = hp.max(0);
    (hp, max_hp.max(hp))
}

/// Named capability flags. Once-per-battle effects track their consumed bit
/// on the session, not here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Passives {
    /// Chance to add one extra damage die to a player hit.
    #[serde(default)]
    pub keen_edge: bool,
    /// Once per battle, soak part of one incoming hit.
    #[serde(default)]
    pub ward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlayerStats {
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub max_hp: i32,
    #[serde(default)]
    pub ac: i32,
    #[serde(default)]
    pub atk: i32,
    #[serde(default, rename = "str")]
    pub str_: i32,
    #[serde(default, rename = "int")]
    pub int_: i32,
    /// Free panic-overload charges; each one waives the HP cost once.
    #[serde(default)]
    pub panic_charges: u32,
    #[serde(default)]
    pub passives: Passives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Gear {
    #[serde(default = "default_tier")]
    pub weapon_tier: u8,
    #[serde(default = "default_tier")]
    pub armor_tier: u8,
}

fn default_tier() -> u8 {
    1
}

impl Default for Gear {
    fn default() -> Self {
        Self { weapon_tier: 1, armor_tier: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlayerState {
    #[serde(default = "default_player_name")]
    pub name: String,
    pub stats: PlayerStats,
    #[serde(default)]
    pub gear: Gear,
}

fn default_player_name() -> String {
    "You".to_string()
}

impl PlayerState {
    /// See [`OpponentSnapshot::normalize_hp`].
    pub fn normalize_hp(&mut self) {
        (self.stats.hp, self.stats.max_hp) = clamp_hp(self.stats.hp, self.stats.max_hp);
    }

    /// Base AC plus the armor-tier bonus.
    pub fn effective_ac(&self) -> i32 {
        self.stats.ac + armor_bonus(self.gear.armor_tier)
    }

    pub fn weapon_tier(&self) -> u8 {
        clamp_tier(self.gear.weapon_tier)
    }
}
