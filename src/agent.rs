use serde::{Deserialize, Serialize};
use std::fmt;

/// Moves an agent can make in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Move {
    Cooperate = 0,
    Defect = 1,
}

impl Move {
    pub fn opposite(self) -> Self {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }

    pub fn is_cooperate(self) -> bool {
        self == Move::Cooperate
    }

    /// Single-letter form used in exports and logs
    pub fn as_char(self) -> char {
        match self {
            Move::Cooperate => 'C',
            Move::Defect => 'D',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Per-agent record of a match: own moves and the opponent's moves, one pair per round.
///
/// Both sequences only grow through [`History::record`], so they always have the
/// same length as the number of completed rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    mine: Vec<Move>,
    theirs: Vec<Move>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, my_move: Move, opp_move: Move) {
        self.mine.push(my_move);
        self.theirs.push(opp_move);
    }

    pub fn mine(&self) -> &[Move] {
        &self.mine
    }

    pub fn theirs(&self) -> &[Move] {
        &self.theirs
    }

    pub fn len(&self) -> usize {
        self.mine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mine.is_empty()
    }

    pub fn clear(&mut self) {
        self.mine.clear();
        self.theirs.clear();
    }
}

/// Fraction of cooperative moves; 0.5 for an empty slice
pub fn cooperation_rate(moves: &[Move]) -> f64 {
    if moves.is_empty() {
        return 0.5;
    }
    let coop = moves.iter().filter(|m| m.is_cooperate()).count();
    coop as f64 / moves.len() as f64
}

/// Cooperation rate over the last `window` moves
pub fn recent_cooperation_rate(moves: &[Move], window: usize) -> f64 {
    let start = moves.len().saturating_sub(window);
    cooperation_rate(&moves[start..])
}
