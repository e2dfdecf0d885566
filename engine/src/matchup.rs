//! Blade beats ranged, ranged beats guard, guard beats blade.

use serde::{Deserialize, Serialize};

use crate::{AdMode, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Blade,
    Ranged,
    Guard,
}

impl Stance {
    pub const ALL: [Stance; 3] = [Stance::Blade, Stance::Ranged, Stance::Guard];

    /// The stance this one wins against.
    pub fn beats(self) -> Stance {
        match self {
            Stance::Blade => Stance::Ranged,
            Stance::Ranged => Stance::Guard,
            Stance::Guard => Stance::Blade,
        }
    }

    pub fn random(dice: &mut Dice) -> Stance {
        dice.choose(&Self::ALL).copied().unwrap_or(Stance::Blade)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stance::Blade => "Blade",
            Stance::Ranged => "Ranged",
            Stance::Guard => "Guard",
        }
    }
}

/// Attacker-relative matchup between two stances.
pub fn matchup(attacker: Stance, defender: Stance) -> AdMode {
    if attacker == defender {
        AdMode::Normal
    } else if attacker.beats() == defender {
        AdMode::Advantage
    } else {
        AdMode::Disadvantage
    }
}

pub fn mode_label(mode: AdMode) -> &'static str {
    match mode {
        AdMode::Normal => "neutral",
        AdMode::Advantage => "advantage",
        AdMode::Disadvantage => "disadvantage",
    }
}
