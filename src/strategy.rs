//! Decision algorithms available to the adaptive agent
//!
//! Every algorithm reads the caller's own [`History`] and returns one [`Move`].
//! Randomness always comes from the injected `rng`.

use crate::adaptive::AdaptiveState;
use crate::agent::{cooperation_rate, recent_cooperation_rate, History, Move};
use crate::analyzer::pattern_consistency;
use crate::payoff::PayoffMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Number of most recent opponent moves treated as the "recent trend"
pub const RECENT_WINDOW: usize = 3;

/// Fraction of the temptation payoff the minimax agent discounts as risk
pub const RISK_TOLERANCE: f64 = 0.4;

const REWARD: f64 = PayoffMatrix::REWARD as f64;
const SUCKER: f64 = PayoffMatrix::SUCKER as f64;
const TEMPTATION: f64 = PayoffMatrix::TEMPTATION as f64;
const PUNISHMENT: f64 = PayoffMatrix::PUNISHMENT as f64;

/// Closed set of decision algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Expected-value comparison of cooperating and defecting.
    #[default]
    Minimax,
    /// Threshold rules blending the other algorithms.
    Fuzzy,
    /// Echo the opponent, with forgiveness scaled by its cooperation.
    TitForTat,
    /// Success-tracking with loss-driven escalation.
    Adaptive,
    /// Fixed responses to 4-move tails, Markov counter-play otherwise.
    PatternMatcher,
    /// Posterior over opponent cooperation using a self-updated prior.
    Bayesian,
}

impl StrategyKind {
    pub const COUNT: usize = 6;

    pub const ALL: [StrategyKind; Self::COUNT] = [
        StrategyKind::Minimax,
        StrategyKind::Fuzzy,
        StrategyKind::TitForTat,
        StrategyKind::Adaptive,
        StrategyKind::PatternMatcher,
        StrategyKind::Bayesian,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Minimax => "minimax",
            StrategyKind::Fuzzy => "fuzzy",
            StrategyKind::TitForTat => "tit_for_tat",
            StrategyKind::Adaptive => "adaptive",
            StrategyKind::PatternMatcher => "pattern_matcher",
            StrategyKind::Bayesian => "bayesian",
        }
    }

    /// Parse a strategy name, falling back to minimax for anything unknown
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match Self::ALL.iter().find(|kind| kind.name() == normalized) {
            Some(kind) => *kind,
            None => {
                warn!("Unknown strategy '{}', falling back to minimax", name);
                StrategyKind::Minimax
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::Minimax => "Maximizing minimum gain",
            StrategyKind::Fuzzy => "Fuzzy logic reasoning",
            StrategyKind::TitForTat => "Mirroring with forgiveness",
            StrategyKind::Adaptive => "Dynamic learning",
            StrategyKind::PatternMatcher => "Pattern exploitation",
            StrategyKind::Bayesian => "Probabilistic inference",
        }
    }

    /// Run this algorithm for one round
    pub fn decide<R: Rng + ?Sized>(
        self,
        history: &History,
        state: &mut AdaptiveState,
        rng: &mut R,
    ) -> Move {
        match self {
            StrategyKind::Minimax => execute_minimax(history),
            StrategyKind::Fuzzy => execute_fuzzy(history, state.bayesian_prior, rng),
            StrategyKind::TitForTat => execute_tit_for_tat(history, rng),
            StrategyKind::Adaptive => execute_adaptive(history, state, rng),
            StrategyKind::PatternMatcher => execute_pattern_matcher(history),
            StrategyKind::Bayesian => execute_bayesian(history, state.bayesian_prior),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Minimax: compare expected values of cooperating and defecting
///
/// The opponent's cooperation probability is estimated as 40% overall rate and
/// 60% recent trend. A caller that has defected in more than 70% of over 10
/// rounds discounts its defect value by 10%.
pub fn execute_minimax(history: &History) -> Move {
    let opp = history.theirs();
    if opp.is_empty() {
        return Move::Cooperate;
    }

    let weighted_coop =
        0.4 * cooperation_rate(opp) + 0.6 * recent_cooperation_rate(opp, RECENT_WINDOW);
    let ev_coop = weighted_coop * REWARD + (1.0 - weighted_coop) * SUCKER;
    let mut ev_defect =
        weighted_coop * TEMPTATION * (1.0 - RISK_TOLERANCE) + (1.0 - weighted_coop) * PUNISHMENT;

    let mine = history.mine();
    if mine.len() > 10 && 1.0 - cooperation_rate(mine) > 0.7 {
        ev_defect *= 0.9;
    }

    if ev_coop > ev_defect {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Fuzzy rules over cooperation rate, recent trend and pattern consistency
pub fn execute_fuzzy<R: Rng + ?Sized>(history: &History, prior: f64, rng: &mut R) -> Move {
    let opp = history.theirs();
    if opp.is_empty() {
        return Move::Cooperate;
    }

    let coop_rate = cooperation_rate(opp);
    let recent_trend = recent_cooperation_rate(opp, RECENT_WINDOW);
    let consistency = pattern_consistency(opp);

    if coop_rate > 0.8 && recent_trend > 0.6 {
        if rng.gen::<f64>() < 0.9 {
            Move::Cooperate
        } else {
            Move::Defect
        }
    } else if coop_rate < 0.2 && recent_trend < 0.4 {
        if rng.gen::<f64>() < 0.9 {
            Move::Defect
        } else {
            Move::Cooperate
        }
    } else if consistency > 0.7 {
        execute_pattern_matcher(history)
    } else if (coop_rate - 0.5).abs() < 0.3 && consistency < 0.4 {
        execute_tit_for_tat(history, rng)
    } else {
        execute_bayesian(history, prior)
    }
}

/// Tit-for-tat, forgiving a defection with probability `0.1 + 0.3 * coop_rate`
pub fn execute_tit_for_tat<R: Rng + ?Sized>(history: &History, rng: &mut R) -> Move {
    let opp = history.theirs();
    match opp.last() {
        None => Move::Cooperate,
        Some(Move::Cooperate) => Move::Cooperate,
        Some(Move::Defect) => {
            let forgiveness = 0.1 + 0.3 * cooperation_rate(opp);
            if rng.gen::<f64>() < forgiveness {
                Move::Cooperate
            } else {
                Move::Defect
            }
        }
    }
}

/// Fixed responses to the opponent's last four moves
pub fn execute_pattern_matcher(history: &History) -> Move {
    use Move::{Cooperate as C, Defect as D};

    let opp = history.theirs();
    if opp.len() < 4 {
        return execute_minimax(history);
    }

    let last = opp[opp.len() - 1];
    match opp[opp.len() - 4..] {
        [C, C, C, C] => D,
        [D, D, D, D] => C,
        [C, D, C, D] | [D, C, D, C] => last,
        [C, C, D, C] => D,
        [D, D, C, D] => C,
        _ => execute_markov(history),
    }
}

/// First-order Markov prediction on the opponent's last two moves
///
/// Tallies what followed every earlier occurrence of the current two-move state
/// and plays the counter to the majority. No occurrences or a tie defer to minimax.
pub fn execute_markov(history: &History) -> Move {
    let opp = history.theirs();
    if opp.len() < 3 {
        return execute_minimax(history);
    }

    let state = &opp[opp.len() - 2..];
    let (mut followed_by_coop, mut followed_by_defect) = (0u32, 0u32);
    for window in opp.windows(3) {
        if window[..2] == *state {
            match window[2] {
                Move::Cooperate => followed_by_coop += 1,
                Move::Defect => followed_by_defect += 1,
            }
        }
    }

    let predicted = match followed_by_coop.cmp(&followed_by_defect) {
        std::cmp::Ordering::Greater => Move::Cooperate,
        std::cmp::Ordering::Less => Move::Defect,
        std::cmp::Ordering::Equal => return execute_minimax(history),
    };
    predicted.opposite()
}

/// Posterior cooperation estimate from the recent trend and the agent's prior
pub fn execute_bayesian(history: &History, prior: f64) -> Move {
    let opp = history.theirs();
    if opp.is_empty() {
        return Move::Cooperate;
    }

    let likelihood = recent_cooperation_rate(opp, RECENT_WINDOW);
    let evidence = likelihood * prior + (1.0 - likelihood) * (1.0 - prior);
    if evidence <= 0.0 {
        return execute_minimax(history);
    }

    let posterior = likelihood * prior / evidence;
    let confidence = (posterior - 0.5).abs() * 2.0;
    if confidence > 0.6 {
        if posterior > 0.5 {
            Move::Cooperate
        } else {
            Move::Defect
        }
    } else {
        execute_minimax(history)
    }
}

/// Success-tracking play that escalates after repeated poor rounds
pub fn execute_adaptive<R: Rng + ?Sized>(
    history: &History,
    state: &mut AdaptiveState,
    rng: &mut R,
) -> Move {
    if history.theirs().is_empty() {
        return Move::Cooperate;
    }

    let success = comprehensive_success(history);
    if success > 0.7 {
        match history.mine().last() {
            Some(&last) if rng.gen::<f64>() < 0.8 => last,
            Some(_) => Move::Defect,
            None => Move::Cooperate,
        }
    } else if success < 0.4 {
        state.consecutive_losses += 1;
        state.aggression_level = (state.aggression_level + 0.1).min(AdaptiveState::MAX_AGGRESSION);
        if state.consecutive_losses > 2 || rng.gen::<f64>() >= 0.3 {
            Move::Defect
        } else {
            Move::Cooperate
        }
    } else {
        state.consecutive_losses = 0;
        if rng.gen::<f64>() < 0.6 {
            Move::Cooperate
        } else {
            Move::Defect
        }
    }
}

/// `0.7 * realized / max_possible + 0.3 * exploit_rate`, capped at 1
///
/// Returns 0.5 with fewer than two rounds played.
pub fn comprehensive_success(history: &History) -> f64 {
    let rounds = history.len();
    if rounds < 2 {
        return 0.5;
    }

    let matrix = PayoffMatrix::standard();
    let (realized, exploits) = history
        .mine()
        .iter()
        .zip(history.theirs())
        .fold((0u32, 0u32), |(score, exploits), (&mine, &theirs)| {
            let exploited = mine == Move::Defect && theirs == Move::Cooperate;
            (score + matrix.score(mine, theirs).0, exploits + exploited as u32)
        });

    let max_possible = (matrix.max_round_score() as usize * rounds) as f64;
    let base_rate = realized as f64 / max_possible;
    let exploit_rate = exploits as f64 / rounds as f64;
    (base_rate * 0.7 + exploit_rate * 0.3).min(1.0)
}
