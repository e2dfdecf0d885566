use std::fs;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::combatant::{OpponentSnapshot, PlayerState};
use crate::config::RulesConfig;
use crate::content;
use crate::matchup::Stance;
use crate::session::{Action, Outcome, Session};
use crate::turn::Turn;
use crate::Dice;

const DEFAULT_MAX_TURNS: u32 = 200;
/// Simulations keep the whole narrative instead of the on-screen window.
const SIM_LOG_CAPACITY: usize = 10_000;

/// How the simulated player picks actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    #[default]
    Blade,
    Ranged,
    Guard,
    /// Counter the visible stance, then rotate blade → ranged → guard.
    Mixed,
    /// Blade, switching to panic-overload when the burst would finish.
    Finisher,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FightConfig {
    #[serde(default)]
    pub opponent_id: Option<String>,
    #[serde(default)]
    pub opponent_path: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub player_path: Option<String>,
    #[serde(default)]
    pub rules_path: Option<String>,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub commit: bool,
    /// Seeded dice when set; OS entropy otherwise.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub max_turns: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FightResult {
    pub winner: String,
    pub turns: u32,
    pub phases_cleared: u32,
    pub player_hp_end: i32,
    pub opponent_hp_end: i32,
    /// Oldest first.
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FightStats {
    pub samples: u32,
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
    pub avg_turns: f64,
}

pub fn simulate_fight(cfg: FightConfig) -> Result<FightResult> {
    let rules = load_rules(&cfg)?;
    let opponent = load_opponent(&cfg)?;
    let player = load_player(&cfg)?;
    let dice = match cfg.seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::entropy(),
    };
    run_fight(&cfg, rules, dice, opponent, player)
}

/// Run `samples` fights, seeding trial `i` with `seed + i`.
pub fn simulate_fight_many(cfg: FightConfig, samples: u32) -> Result<FightStats> {
    let rules = load_rules(&cfg)?;
    let opponent = load_opponent(&cfg)?;
    let player = load_player(&cfg)?;
    let base = cfg.seed.unwrap_or(0);

    let mut stats = FightStats {
        samples,
        player_wins: 0,
        opponent_wins: 0,
        draws: 0,
        avg_turns: 0.0,
    };
    let mut total_turns = 0u64;
    for i in 0..samples {
        let dice = Dice::from_seed(base.wrapping_add(u64::from(i)));
        let res = run_fight(&cfg, rules.clone(), dice, opponent.clone(), player.clone())?;
        total_turns += u64::from(res.turns);
        match res.winner.as_str() {
            "player" => stats.player_wins += 1,
            "opponent" => stats.opponent_wins += 1,
            _ => stats.draws += 1,
        }
    }
    if samples > 0 {
        stats.avg_turns = total_turns as f64 / f64::from(samples);
    }
    Ok(stats)
}

fn run_fight(
    cfg: &FightConfig,
    mut rules: RulesConfig,
    dice: Dice,
    opponent: OpponentSnapshot,
    player: PlayerState,
) -> Result<FightResult> {
    if opponent.hp <= 0 {
        bail!("opponent '{}' starts with no HP", opponent.name);
    }
    if player.stats.hp <= 0 {
        bail!("player '{}' starts with no HP", player.name);
    }

    let max_turns = cfg.max_turns.unwrap_or(DEFAULT_MAX_TURNS);
    rules.log_capacity = rules.log_capacity.max(SIM_LOG_CAPACITY);
    let delay = rules.opponent_delay();
    let mut session = Session::new(rules, dice);
    let mut logs = Vec::new();
    let mut current = opponent;
    let mut player = player;
    let mut turns = 0u32;
    let mut phases_cleared = 0u32;

    let winner = loop {
        session.open(&current, player.clone());
        let mut picker = Picker::new(cfg.policy);
        while session.turn() != Turn::Ended && turns < max_turns {
            if session.turn() == Turn::Player {
                let action = picker.next(&session);
                session.submit(action, cfg.commit);
                turns += 1;
            }
            session.advance(delay);
        }

        if let Some(log) = session.log() {
            logs.extend(log.entries().iter().rev().cloned());
        }
        let outcome = session.outcome().cloned();
        if let Some(p) = session.player() {
            player = p.clone();
        }
        let opponent_hp = session.opponent().map_or(current.hp, |o| o.hp);
        session.close();

        match outcome {
            Some(Outcome::Victory { opponent, boss_phase_cleared }) => {
                phases_cleared += 1;
                if boss_phase_cleared {
                    if let Some(next) = opponent.next_boss_phase(session.rules().boss_phases) {
                        logs.push(format!("[PHASE] {} enters phase {}", next.name, next.boss_phase));
                        current = next;
                        continue;
                    }
                }
                current.hp = opponent.hp;
                break "player";
            }
            Some(Outcome::Defeat) => {
                current.hp = opponent_hp;
                break "opponent";
            }
            None => {
                current.hp = opponent_hp;
                break "draw";
            }
        }
    };

    logs.push(format!(
        "[END] winner={} player_hp={} opponent_hp={} turns={}",
        winner, player.stats.hp, current.hp, turns
    ));

    Ok(FightResult {
        winner: winner.to_string(),
        turns,
        phases_cleared,
        player_hp_end: player.stats.hp,
        opponent_hp_end: current.hp,
        log: logs,
    })
}

struct Picker {
    policy: Policy,
    step: usize,
}

impl Picker {
    fn new(policy: Policy) -> Self {
        Self { policy, step: 0 }
    }

    fn next(&mut self, session: &Session) -> Action {
        self.step += 1;
        match self.policy {
            Policy::Blade => Action::Blade,
            Policy::Ranged => Action::Ranged,
            Policy::Guard => Action::Guard,
            Policy::Mixed => match session.visible_stance() {
                Some(stance) => counter_action(stance),
                None => [Action::Blade, Action::Ranged, Action::Guard][self.step % 3],
            },
            Policy::Finisher => {
                let rules = session.rules();
                let finishes = match (session.player(), session.opponent()) {
                    (Some(p), Some(o)) => {
                        let affordable =
                            p.stats.panic_charges > 0 || p.stats.hp - rules.panic_hp_cost >= 1;
                        affordable && o.hp <= rules.panic_damage + p.stats.int_
                    }
                    _ => false,
                };
                if finishes { Action::Panic } else { Action::Blade }
            }
        }
    }
}

/// The action whose stance beats `stance`.
fn counter_action(stance: Stance) -> Action {
    match stance {
        Stance::Blade => Action::Guard,
        Stance::Ranged => Action::Blade,
        Stance::Guard => Action::Ranged,
    }
}

fn load_rules(cfg: &FightConfig) -> Result<RulesConfig> {
    match &cfg.rules_path {
        Some(path) => RulesConfig::load(path).with_context(|| format!("failed to load rules: {}", path)),
        None => Ok(content::default_rules()?),
    }
}

fn load_opponent(cfg: &FightConfig) -> Result<OpponentSnapshot> {
    if let Some(path) = &cfg.opponent_path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read opponent JSON: {}", path))?;
        return content::parse_opponent(&text, path)
            .with_context(|| format!("failed to parse opponent JSON: {}", path));
    }
    let id = cfg.opponent_id.as_deref().unwrap_or("void_drone");
    Ok(content::opponent(id)?)
}

fn load_player(cfg: &FightConfig) -> Result<PlayerState> {
    if let Some(path) = &cfg.player_path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read player JSON: {}", path))?;
        return content::parse_player(&text, path)
            .with_context(|| format!("failed to parse player JSON: {}", path));
    }
    let id = cfg.player_id.as_deref().unwrap_or("scavenger");
    Ok(content::player(id)?)
}
