//! Whose move it is.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Player,
    Opponent,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Opponent,
}

/// `Player` ⇄ `Opponent` until someone drops, then `Ended` for good.
#[derive(Debug, Clone)]
pub struct TurnState {
    turn: Turn,
}

impl TurnState {
    pub fn new() -> Self {
        Self { turn: Turn::Player }
    }

    pub fn current(&self) -> Turn {
        self.turn
    }

    pub fn is_ended(&self) -> bool {
        self.turn == Turn::Ended
    }

    /// Whether `side` may act right now.
    pub fn accepts(&self, side: Side) -> bool {
        matches!(
            (self.turn, side),
            (Turn::Player, Side::Player) | (Turn::Opponent, Side::Opponent)
        )
    }

    pub fn end_player_turn(&mut self) {
        if self.turn == Turn::Player {
            self.turn = Turn::Opponent;
        }
    }

    pub fn end_opponent_turn(&mut self) {
        if self.turn == Turn::Opponent {
            self.turn = Turn::Player;
        }
    }

    pub fn end(&mut self) {
        self.turn = Turn::Ended;
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}
