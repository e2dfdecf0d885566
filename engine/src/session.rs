//! The encounter's public surface.
//!
//! A `Session` is opened with copies of both combatants, accepts player
//! actions while it is the player's turn, runs the opponent's reply after a
//! cancellable pacing delay, and reports the result through an
//! [`EncounterObserver`] once the fight has ended.

use std::time::Duration;

use tracing::{debug, info};

use crate::combatant::{OpponentSnapshot, PlayerState};
use crate::config::RulesConfig;
use crate::log::BattleLog;
use crate::matchup::Stance;
use crate::pacing::Deferred;
use crate::resolver::{resolve_opponent_turn, resolve_player_action, Encounter, Resolution};
use crate::turn::{Side, Turn};
use crate::Dice;

pub use crate::resolver::Action;

/// Terminal callbacks. Each fires at most once per opened session, and only
/// after the turn has reached `Ended`.
pub trait EncounterObserver {
    /// `opponent` is the final snapshot; check `is_boss`/`boss_phase` to tell a
    /// cleared boss phase from a finished encounter.
    fn on_win(&mut self, _opponent: &OpponentSnapshot) {}
    fn on_lose(&mut self) {}
    fn on_exit(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Wrong turn, no open session, or a stale duplicate.
    Ignored,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Victory {
        opponent: OpponentSnapshot,
        /// More boss phases follow; re-open with the next phase.
        boss_phase_cleared: bool,
    },
    Defeat,
}

struct Active {
    enc: Encounter,
    pending: Option<Deferred>,
    outcome: Option<Outcome>,
}

pub struct Session {
    rules: RulesConfig,
    dice: Dice,
    observer: Option<Box<dyn EncounterObserver>>,
    active: Option<Active>,
}

impl Session {
    pub fn new(rules: RulesConfig, dice: Dice) -> Self {
        Self { rules, dice, observer: None, active: None }
    }

    pub fn with_observer(mut self, observer: impl EncounterObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Start an encounter against a copy of `opponent`.
    ///
    /// Any encounter still open is discarded along with its pending
    /// opponent turn. Both sides' HP is clamped into `0..=max_hp`; a side
    /// that starts at 0 ends the encounter on the spot.
    pub fn open(&mut self, opponent: &OpponentSnapshot, mut player: PlayerState) {
        if let Some(mut old) = self.active.take() {
            if let Some(p) = old.pending.as_mut() {
                p.cancel();
            }
            debug!("discarding previous encounter on open");
        }
        let mut opponent = opponent.clone();
        opponent.normalize_hp();
        player.normalize_hp();
        let mut enc = Encounter::new(player, opponent, self.rules.log_capacity);
        enc.log.push(format!(
            "[START] {} (HP {}) vs {} (HP {}/{}, stance {})",
            enc.player.name,
            enc.player.stats.hp,
            enc.opponent.name,
            enc.opponent.hp,
            enc.opponent.max_hp,
            enc.opponent.weapon_stance.label()
        ));
        info!(
            opponent = %enc.opponent.name,
            boss = enc.opponent.is_boss,
            phase = enc.opponent.boss_phase,
            "encounter opened"
        );
        let already_down = if enc.player.stats.hp == 0 {
            enc.log.push(format!("[END] {} falls", enc.player.name));
            Some(Resolution::PlayerLost)
        } else if enc.opponent.hp == 0 {
            enc.log.push(format!("[END] {} is destroyed", enc.opponent.name));
            Some(Resolution::PlayerWon)
        } else {
            None
        };
        self.active = Some(Active { enc, pending: None, outcome: None });
        if let Some(resolution) = already_down {
            debug!(?resolution, "encounter opened with a side at 0 HP");
            self.finish(resolution);
        }
    }

    /// Submit a player action. `committed` selects the hold-to-commit path;
    /// it has no effect on panic-overload.
    pub fn submit(&mut self, action: Action, committed: bool) -> Submission {
        let Some(active) = self.active.as_mut() else {
            return Submission::Ignored;
        };
        if !active.enc.turn.accepts(Side::Player) {
            debug!(?action, turn = ?active.enc.turn.current(), "stale player action ignored");
            return Submission::Ignored;
        }
        let committed = committed && action != Action::Panic;
        match resolve_player_action(&mut active.enc, action, committed, &mut self.dice, &self.rules) {
            Resolution::Continue => {
                active.enc.turn.end_player_turn();
                active.pending = Some(Deferred::schedule(self.rules.opponent_delay()));
            }
            resolution => self.finish(resolution),
        }
        Submission::Resolved
    }

    /// Advance the pacing clock; runs the opponent's reply once its delay
    /// has elapsed.
    pub fn advance(&mut self, elapsed: Duration) {
        let due = self
            .active
            .as_mut()
            .and_then(|a| a.pending.as_mut())
            .is_some_and(|p| p.tick(elapsed));
        if due {
            self.run_opponent_turn();
        }
    }

    /// Run a pending opponent reply immediately.
    pub fn flush(&mut self) {
        let due = self
            .active
            .as_mut()
            .and_then(|a| a.pending.as_mut())
            .is_some_and(|p| p.fire_now());
        if due {
            self.run_opponent_turn();
        }
    }

    fn run_opponent_turn(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.pending = None;
        if !active.enc.turn.accepts(Side::Opponent) {
            return;
        }
        match resolve_opponent_turn(&mut active.enc, &mut self.dice, &self.rules) {
            Resolution::Continue => active.enc.turn.end_opponent_turn(),
            resolution => self.finish(resolution),
        }
    }

    fn finish(&mut self, resolution: Resolution) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.outcome.is_some() {
            return;
        }
        active.enc.turn.end();
        if let Some(p) = active.pending.as_mut() {
            p.cancel();
        }
        let outcome = match resolution {
            Resolution::PlayerWon => {
                let opponent = active.enc.opponent.clone();
                let boss_phase_cleared = !opponent.is_final_phase(self.rules.boss_phases);
                Outcome::Victory { opponent, boss_phase_cleared }
            }
            Resolution::PlayerLost | Resolution::Continue => Outcome::Defeat,
        };
        info!(?outcome, "encounter ended");
        active.outcome = Some(outcome.clone());
        if let Some(observer) = self.observer.as_mut() {
            match &outcome {
                Outcome::Victory { opponent, .. } => observer.on_win(opponent),
                Outcome::Defeat => observer.on_lose(),
            }
        }
    }

    /// Tear the encounter down. Only honored once the fight has ended;
    /// returns whether the close happened.
    pub fn close(&mut self) -> bool {
        let ended = self.active.as_ref().is_some_and(|a| a.enc.turn.is_ended());
        if !ended {
            debug!("close ignored: encounter not ended");
            return false;
        }
        if let Some(mut active) = self.active.take() {
            if let Some(p) = active.pending.as_mut() {
                p.cancel();
            }
        }
        info!("encounter closed");
        if let Some(observer) = self.observer.as_mut() {
            observer.on_exit();
        }
        true
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// `Ended` when no encounter is open.
    pub fn turn(&self) -> Turn {
        self.active.as_ref().map_or(Turn::Ended, |a| a.enc.turn.current())
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.active.as_ref().map(|a| &a.enc.player)
    }

    pub fn opponent(&self) -> Option<&OpponentSnapshot> {
        self.active.as_ref().map(|a| &a.enc.opponent)
    }

    /// The opponent's stance, while the player may still see it.
    pub fn visible_stance(&self) -> Option<Stance> {
        self.active
            .as_ref()
            .filter(|a| a.enc.temp.stance_known)
            .map(|a| a.enc.opponent.weapon_stance)
    }

    pub fn is_guarding(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.enc.temp.guarding)
    }

    pub fn guard_reduction(&self) -> i32 {
        self.active.as_ref().map_or(0, |a| a.enc.temp.guard_reduction)
    }

    pub fn ward_used(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.enc.temp.ward_used)
    }

    /// Time left before the opponent replies, if a reply is pending.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.active
            .as_ref()
            .and_then(|a| a.pending.as_ref())
            .and_then(Deferred::remaining)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.active.as_ref().and_then(|a| a.outcome.as_ref())
    }

    pub fn log(&self) -> Option<&BattleLog> {
        self.active.as_ref().map(|a| &a.enc.log)
    }
}
