use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod api;
pub mod combatant;
pub mod commit;
pub mod config;
pub mod content;
pub mod error;
pub mod gear;
pub mod life;
pub mod log;
pub mod matchup;
pub mod pacing;
pub mod resolver;
pub mod rng;
pub mod session;
pub mod turn;

pub use combatant::{Gear, OpponentSnapshot, Passives, PlayerState, PlayerStats};
pub use config::RulesConfig;
pub use matchup::{matchup, Stance};
pub use rng::{EntropySource, RandomSource, ScriptedSource, SeededSource};
pub use session::{Action, EncounterObserver, Outcome, Session, Submission};
pub use turn::Turn;

/// Roll mode for the to-hit d20 and for the damage-dice count.
///
/// `Normal` is the neutral matchup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMode { Normal, Advantage, Disadvantage }

/// `count`d`sides` plus a flat bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDice {
    pub count: u32,
    pub sides: u32,
    #[serde(default)]
    pub flat: i32,
}

impl DamageDice {
    pub fn new(count: u32, sides: u32) -> Self {
        Self { count, sides, flat: 0 }
    }

    pub fn with_flat(mut self, flat: i32) -> Self {
        self.flat = flat;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    pub total: i32,
    /// Individual faces in draw order; display only.
    pub rolls: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestedRoll {
    pub raw: Vec<i32>,
    pub kept: i32,
    pub crit: bool,
}

/// Largest die `Dice` rolls; faces are reported as `i32`.
pub const MAX_SIDES: u32 = i32::MAX as u32;

pub struct Dice { source: Box<dyn RandomSource + Send> }

impl Dice {
    /// Entropy-backed dice; the normal in-game roller.
    pub fn entropy() -> Self {
        Self::from_source(EntropySource::new())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::from_source(SeededSource::new(seed))
    }

    /// Dice that replay `faces` in order. See [`ScriptedSource`].
    pub fn from_scripted(faces: Vec<u32>) -> Self {
        Self::from_source(ScriptedSource::new(faces))
    }

    pub fn from_source(source: impl RandomSource + Send + 'static) -> Self {
        Self { source: Box::new(source) }
    }

    /// Uniform face in `1..=sides`. Sides above [`MAX_SIDES`] roll as
    /// [`MAX_SIDES`] so every face fits an `i32`.
    pub fn roll_die(&mut self, sides: u32) -> i32 {
        let face = self.source.roll_uniform(sides.min(MAX_SIDES));
        i32::try_from(face).unwrap_or(i32::MAX)
    }

    /// NdS; the total saturates instead of overflowing.
    pub fn roll_dice(&mut self, count: u32, sides: u32) -> DiceRoll {
        let rolls: Vec<i32> = (0..count).map(|_| self.roll_die(sides)).collect();
        let total = rolls.iter().fold(0i32, |acc, r| acc.saturating_add(*r));
        DiceRoll { total, rolls }
    }

    /// d20 under `mode`; a natural 20 on the kept die is a crit in every mode.
    pub fn d20(&mut self, mode: AdMode) -> ContestedRoll {
        let raw = match mode {
            AdMode::Normal => vec![self.roll_die(20)],
            AdMode::Advantage | AdMode::Disadvantage => vec![self.roll_die(20), self.roll_die(20)],
        };
        let kept = keep_contested(&raw, mode);
        ContestedRoll { crit: kept == 20, kept, raw }
    }

    /// Uniform pick from a slice; `None` when empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.roll_die(items.len() as u32) as usize - 1;
        items.get(idx)
    }

    /// True with `percent` in 100 chance.
    pub fn chance(&mut self, percent: u32) -> bool {
        self.roll_die(100) as u32 <= percent
    }
}

/// Reduce a contested pair to the kept die.
pub fn keep_contested(raw: &[i32], mode: AdMode) -> i32 {
    let first = raw.first().copied().unwrap_or(1);
    match mode {
        AdMode::Normal => first,
        AdMode::Advantage => raw.iter().copied().max().unwrap_or(first),
        AdMode::Disadvantage => raw.iter().copied().min().unwrap_or(first),
    }
}

/// Advantage adds a damage die, disadvantage removes one (never below one).
pub fn adjust_dice_count(base: u32, mode: AdMode) -> u32 {
    match mode {
        AdMode::Normal => base,
        AdMode::Advantage => base + 1,
        AdMode::Disadvantage => base.saturating_sub(1).max(1),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackResult {
    pub mode: AdMode,
    pub roll: i32,
    pub raw_rolls: Vec<i32>,
    pub total: i32,
    pub ac: i32,
    pub hit: bool,
    pub is_crit: bool,
}

/// Contested d20 + `to_hit` against `ac`. Hits on a kept natural 20 or on
/// total >= AC; there is no automatic miss.
pub fn attack(dice: &mut Dice, mode: AdMode, to_hit: i32, ac: i32) -> AttackResult {
    let d20 = dice.d20(mode);
    let total = d20.kept + to_hit;
    let hit = d20.crit || total >= ac;
    debug!(?mode, raw = ?d20.raw, kept = d20.kept, total, ac, hit, "to-hit roll");
    AttackResult {
        mode,
        roll: d20.kept,
        raw_rolls: d20.raw,
        total,
        ac,
        hit,
        is_crit: d20.crit,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRoll {
    pub dice: DamageDice,
    pub rolls: Vec<i32>,
    pub modifier: i32,
    pub crit: bool,
    /// Dice + flat + modifier, floored at 1.
    pub total: i32,
}

/// Roll `dd` (count doubled on a crit), add its flat bonus and `modifier`,
/// floor at 1.
pub fn damage(dice: &mut Dice, dd: DamageDice, modifier: i32, crit: bool) -> DamageRoll {
    let count = if crit { dd.count * 2 } else { dd.count };
    let roll = dice.roll_dice(count, dd.sides);
    let total = roll.total.saturating_add(dd.flat).saturating_add(modifier).max(1);
    debug!(count, sides = dd.sides, rolls = ?roll.rolls, modifier, total, "damage roll");
    DamageRoll { dice: dd, rolls: roll.rolls, modifier, crit, total }
}

/// Floor-halve a stat, rounding toward negative infinity.
pub fn half_down(value: i32) -> i32 {
    value.div_euclid(2)
}
