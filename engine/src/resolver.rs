//! Rule application for one action at a time.
//!
//! Each call runs matchup → roll → damage → HP mutation → terminal check to
//! completion before returning. The caller owns turn sequencing; these
//! functions only flip the turn to `Ended` when someone drops.

use serde::Serialize;
use tracing::{debug, info};

use crate::combatant::{OpponentSnapshot, PlayerState};
use crate::commit::{commit_effect, CommitEffect};
use crate::config::RulesConfig;
use crate::gear::{weapon_profile, WeaponKind};
use crate::life::apply_damage;
use crate::log::{attack_line, damage_line, BattleLog};
use crate::matchup::{matchup, mode_label, Stance};
use crate::turn::TurnState;
use crate::{adjust_dice_count, attack, damage, half_down, AdMode, DamageDice, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Blade,
    Ranged,
    Guard,
    Panic,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Blade => "Blade",
            Action::Ranged => "Ranged",
            Action::Guard => "Guard",
            Action::Panic => "Panic Overload",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Continue,
    PlayerWon,
    PlayerLost,
}

/// Per-encounter scratch state, reset on every open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempState {
    pub guarding: bool,
    pub guard_reduction: i32,
    /// True only until the player's first action.
    pub stance_known: bool,
    pub ward_used: bool,
}

impl TempState {
    pub fn fresh() -> Self {
        Self {
            guarding: false,
            guard_reduction: 0,
            stance_known: true,
            ward_used: false,
        }
    }

    fn clear_guard(&mut self) {
        self.guarding = false;
        self.guard_reduction = 0;
    }
}

/// Everything a session owns while open.
#[derive(Debug, Clone)]
pub struct Encounter {
    pub player: PlayerState,
    pub opponent: OpponentSnapshot,
    pub temp: TempState,
    pub turn: TurnState,
    pub log: BattleLog,
}

impl Encounter {
    pub fn new(player: PlayerState, opponent: OpponentSnapshot, log_capacity: usize) -> Self {
        Self {
            player,
            opponent,
            temp: TempState::fresh(),
            turn: TurnState::new(),
            log: BattleLog::new(log_capacity),
        }
    }

    /// Damage the player; ends the fight if they drop.
    fn hurt_player(&mut self, dmg: i32) -> bool {
        let name = self.player.name.clone();
        let log = &mut self.log;
        let dropped = apply_damage(&name, &mut self.player.stats.hp, dmg, |m| log.push(m));
        if dropped {
            self.turn.end();
            self.log.push(format!("[END] {} falls", name));
            info!(player = %name, "player defeated");
        }
        dropped
    }

    /// Damage the opponent; ends the fight if they drop.
    fn hurt_opponent(&mut self, dmg: i32) -> bool {
        let name = self.opponent.name.clone();
        let log = &mut self.log;
        let dropped = apply_damage(&name, &mut self.opponent.hp, dmg, |m| log.push(m));
        if dropped {
            self.turn.end();
            self.log.push(format!("[END] {} is destroyed", name));
            info!(opponent = %name, phase = self.opponent.boss_phase, "opponent defeated");
        }
        dropped
    }

    /// Hidden stances are re-rolled right before every resolution.
    fn shuffle_hidden_stance(&mut self, dice: &mut Dice) {
        if !self.temp.stance_known {
            self.opponent.weapon_stance = Stance::random(dice);
            debug!(stance = ?self.opponent.weapon_stance, "opponent stance re-rolled");
        }
    }
}

pub fn resolve_player_action(
    enc: &mut Encounter,
    action: Action,
    committed: bool,
    dice: &mut Dice,
    rules: &RulesConfig,
) -> Resolution {
    enc.temp.clear_guard();
    enc.shuffle_hidden_stance(dice);
    enc.temp.stance_known = false;

    debug!(?action, committed, "player action");
    match action {
        Action::Blade => player_attack(enc, WeaponKind::Blade, committed, dice, rules),
        Action::Ranged => player_attack(enc, WeaponKind::Ranged, committed, dice, rules),
        Action::Guard => player_guard(enc, committed, rules),
        Action::Panic => panic_overload(enc, rules),
    }
}

/// Read the matchup for `stance` and pay any commit backlash. `None` means
/// the backlash alone ended the fight.
fn read_and_commit(
    enc: &mut Encounter,
    stance: Stance,
    committed: bool,
    rules: &RulesConfig,
) -> Option<(AdMode, CommitEffect)> {
    let mode = matchup(stance, enc.opponent.weapon_stance);
    let effect = commit_effect(committed, mode, rules);
    enc.log.push(format!("[READ][{}] {} → {}", enc.player.name, stance.label(), mode_label(mode)));
    if committed {
        enc.log.push(format!(
            "[COMMIT][{}] {} committed (+{} to hit)",
            enc.player.name,
            stance.label(),
            effect.to_hit_bonus
        ));
    }
    if effect.backlash > 0 {
        enc.log.push(format!(
            "[COMMIT][{}] bad read! backlash {}",
            enc.player.name, effect.backlash
        ));
        if enc.hurt_player(effect.backlash) {
            return None;
        }
    }
    Some((mode, effect))
}

fn player_attack(
    enc: &mut Encounter,
    kind: WeaponKind,
    committed: bool,
    dice: &mut Dice,
    rules: &RulesConfig,
) -> Resolution {
    let Some((mode, effect)) = read_and_commit(enc, kind.stance(), committed, rules) else {
        return Resolution::PlayerLost;
    };

    let stats = &enc.player.stats;
    let base_to_hit = match kind {
        WeaponKind::Blade => stats.atk,
        WeaponKind::Ranged => (stats.atk - 1).max(0),
    };
    let atk = attack(dice, mode, base_to_hit + effect.to_hit_bonus, enc.opponent.ac);
    enc.log.push(attack_line(&enc.player.name, &atk));
    if !atk.hit {
        return Resolution::Continue;
    }

    let profile = weapon_profile(kind, enc.player.weapon_tier());
    let dd = DamageDice {
        count: adjust_dice_count(profile.count, mode),
        ..profile
    };
    let mut modifier = enc.player.stats.str_ + effect.damage_bonus;
    let mut roll = damage(dice, dd, modifier, atk.is_crit);
    if enc.player.stats.passives.keen_edge && dice.chance(rules.keen_edge_chance) {
        let extra = dice.roll_die(rules.keen_edge_die);
        enc.log.push(format!("[PASSIVE][{}] keen edge +{}", enc.player.name, extra));
        modifier += extra;
        roll.modifier = modifier;
        roll.total += extra;
    }
    enc.log.push(damage_line(&enc.player.name, &roll));

    if enc.hurt_opponent(roll.total) {
        Resolution::PlayerWon
    } else {
        Resolution::Continue
    }
}

fn player_guard(enc: &mut Encounter, committed: bool, rules: &RulesConfig) -> Resolution {
    let Some((_, effect)) = read_and_commit(enc, Stance::Guard, committed, rules) else {
        return Resolution::PlayerLost;
    };
    let reduction = guard_reduction(enc.player.stats.str_, rules) + effect.guard_bonus;
    enc.temp.guarding = true;
    enc.temp.guard_reduction = reduction;
    enc.log.push(format!("[GUARD][{}] raises guard (DR {})", enc.player.name, reduction));
    Resolution::Continue
}

/// Base guard reduction for a given strength: base + floor(str / 2).
pub fn guard_reduction(strength: i32, rules: &RulesConfig) -> i32 {
    rules.guard_base_reduction + half_down(strength)
}

/// Reduce a raw hit by the guard's reduction, floored at 0.
pub fn apply_guard(raw: i32, reduction: i32) -> i32 {
    (raw - reduction).max(0)
}

fn panic_overload(enc: &mut Encounter, rules: &RulesConfig) -> Resolution {
    let name = enc.player.name.clone();
    let stats = &mut enc.player.stats;
    if stats.panic_charges > 0 {
        stats.panic_charges -= 1;
        enc.log.push(format!(
            "[PANIC][{}] free charge spent ({} left)",
            name, stats.panic_charges
        ));
    } else if stats.hp - rules.panic_hp_cost < 1 {
        enc.log.push(format!("[PANIC][{}] Panic Overload failed: insufficient HP", name));
        return Resolution::Continue;
    } else {
        enc.log.push(format!("[PANIC][{}] burns {} HP", name, rules.panic_hp_cost));
        enc.hurt_player(rules.panic_hp_cost);
    }

    let burst = (rules.panic_damage + enc.player.stats.int_).max(0);
    enc.log.push(format!("[PANIC][{}] overload hits for {} true damage", name, burst));
    if enc.hurt_opponent(burst) {
        Resolution::PlayerWon
    } else {
        Resolution::Continue
    }
}

pub fn resolve_opponent_turn(enc: &mut Encounter, dice: &mut Dice, rules: &RulesConfig) -> Resolution {
    enc.shuffle_hidden_stance(dice);
    let stance = enc.opponent.weapon_stance;
    let guarding = enc.temp.guarding;
    let mode = if guarding { matchup(stance, Stance::Guard) } else { AdMode::Normal };
    debug!(?stance, guarding, ?mode, "opponent turn");

    let atk = attack(dice, mode, enc.opponent.atk, enc.player.effective_ac());
    enc.log.push(attack_line(&enc.opponent.name, &atk));

    if atk.hit {
        let dd = DamageDice::new(adjust_dice_count(1, mode), enc.opponent.damage_die);
        let roll = damage(dice, dd, enc.opponent.damage_modifier, atk.is_crit);
        enc.log.push(damage_line(&enc.opponent.name, &roll));
        let mut dealt = roll.total;
        if guarding {
            dealt = apply_guard(dealt, enc.temp.guard_reduction);
            enc.log.push(format!(
                "[GUARD][{}] blocks {} → {}",
                enc.player.name, roll.total, dealt
            ));
        }
        if enc.player.stats.passives.ward && !enc.temp.ward_used && dealt > 0 {
            enc.temp.ward_used = true;
            let before = dealt;
            dealt = (dealt - rules.ward_reduction).max(0);
            enc.log.push(format!("[PASSIVE][{}] ward soaks {} → {}", enc.player.name, before, dealt));
        }
        if enc.hurt_player(dealt) {
            return Resolution::PlayerLost;
        }
    }

    if guarding && matchup(Stance::Guard, stance) == AdMode::Advantage {
        let bash = (dice.roll_die(rules.counter_die) + enc.player.stats.str_).max(0);
        enc.log.push(format!(
            "[COUNTER][{}] shield bash for {}",
            enc.player.name, bash
        ));
        if enc.hurt_opponent(bash) {
            return Resolution::PlayerWon;
        }
    }

    enc.temp.clear_guard();
    Resolution::Continue
}
