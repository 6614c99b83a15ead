use crate::agent::Move;

/// Payoff table for the Prisoner's Dilemma
///
/// Ranking is the classic one: sucker (0) < punishment (1) < reward (3) < temptation (5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoffMatrix {
    table: [[(u32, u32); 2]; 2],
}

impl PayoffMatrix {
    pub const REWARD: u32 = 3;
    pub const SUCKER: u32 = 0;
    pub const TEMPTATION: u32 = 5;
    pub const PUNISHMENT: u32 = 1;

    pub const fn standard() -> Self {
        // Rows: my move (C, D); columns: opponent move (C, D)
        let table = [
            [(Self::REWARD, Self::REWARD), (Self::SUCKER, Self::TEMPTATION)],
            [(Self::TEMPTATION, Self::SUCKER), (Self::PUNISHMENT, Self::PUNISHMENT)],
        ];
        Self { table }
    }

    /// Scores for the ordered pair `(a, b)`, returned as `(score_a, score_b)`
    #[inline]
    pub fn score(&self, a: Move, b: Move) -> (u32, u32) {
        self.table[a as usize][b as usize]
    }

    /// Best a single player can get out of one round
    pub const fn max_round_score(&self) -> u32 {
        Self::TEMPTATION
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

/// Shorthand for the standard matrix
pub fn payoff(a: Move, b: Move) -> (u32, u32) {
    PayoffMatrix::standard().score(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoff_matrix() {
        assert_eq!(payoff(Move::Cooperate, Move::Cooperate), (3, 3));
        assert_eq!(payoff(Move::Cooperate, Move::Defect), (0, 5));
        assert_eq!(payoff(Move::Defect, Move::Cooperate), (5, 0));
        assert_eq!(payoff(Move::Defect, Move::Defect), (1, 1));
    }

    #[test]
    fn test_dilemma_ranking() {
        let m = PayoffMatrix::default();
        let (sucker, temptation) = m.score(Move::Cooperate, Move::Defect);
        let (reward, _) = m.score(Move::Cooperate, Move::Cooperate);
        let (punishment, _) = m.score(Move::Defect, Move::Defect);

        assert!(sucker < punishment && punishment < reward && reward < temptation);
        assert_eq!(m.max_round_score(), temptation);
    }
}
