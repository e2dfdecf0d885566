//! Narrative log for display. Newest entry first, bounded.

use tracing::debug;

use crate::matchup::mode_label;
use crate::{AttackResult, DamageRoll};

#[derive(Debug, Clone, Default)]
pub struct BattleLog {
    entries: Vec<String>,
    capacity: usize,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::new(), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, line: String) {
        debug!(target: "battle_log", "{}", line);
        self.entries.insert(0, line);
        self.entries.truncate(self.capacity);
    }

    /// Newest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }
}

pub fn format_d20_sequence(raw: &[i32], kept: i32) -> String {
    match raw {
        [] => format!("d20=? (keep={})", kept),
        [only] => format!("d20={} (keep={})", only, kept),
        [first, second] => format!("d20={} vs d20={} (keep={})", first, second, kept),
        _ => {
            let joined = raw.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
            format!("d20s=[{}] (keep={})", joined, kept)
        }
    }
}

pub fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.abs())
    }
}

pub fn attack_line(name: &str, atk: &AttackResult) -> String {
    let rolls = format_d20_sequence(&atk.raw_rolls, atk.roll);
    let outcome = if atk.is_crit {
        "CRIT!"
    } else if atk.hit {
        "HIT"
    } else {
        "MISS"
    };
    format!(
        "[ATTACK][{}] {} {} → {} to-hit={} vs AC={}",
        name,
        mode_label(atk.mode),
        rolls,
        outcome,
        atk.total,
        atk.ac
    )
}

pub fn damage_line(name: &str, dmg: &DamageRoll) -> String {
    let count = if dmg.crit { dmg.dice.count * 2 } else { dmg.dice.count };
    let prefix = if dmg.crit { "crit: " } else { "" };
    let faces = dmg.rolls.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("+");
    format!(
        "[DMG][{}] {}rolled {}d{} [{}] {} = {}",
        name,
        prefix,
        count,
        dmg.dice.sides,
        faces,
        format_modifier(dmg.modifier + dmg.dice.flat),
        dmg.total
    )
}
