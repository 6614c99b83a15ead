use crate::agent::{cooperation_rate, Move};
use crate::ledger::StrategyLedger;
use crate::strategy::StrategyKind;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opponent history needed before the analyzer does anything but recommend minimax
pub const MIN_ANALYSIS_HISTORY: usize = 3;

/// Inherent noise of the analysis: at full confidence it is trusted 85% of the time
pub const ANALYSIS_ACCURACY: f64 = 0.85;

/// Consistency of consecutive transitions in a move sequence
///
/// `1 - unique_transitions / min(4, transitions)`: near 1 for repetitive play, 0 when
/// every possible transition shows up. Sequences shorter than 3 read as 0.5.
pub fn pattern_consistency(history: &[Move]) -> f64 {
    if history.len() < 3 {
        return 0.5;
    }

    let unique: FxHashSet<(Move, Move)> = history.windows(2).map(|w| (w[0], w[1])).collect();
    let max_possible = (history.len() - 1).min(4);
    1.0 - unique.len() as f64 / max_possible as f64
}

/// How far to trust the analysis: mean of pattern consistency and a data-volume ramp
///
/// Fewer than 5 moves read as 0.5.
pub fn analysis_confidence(history: &[Move]) -> f64 {
    if history.len() < 5 {
        return 0.5;
    }
    let data_quality = (history.len() as f64 / 20.0).min(1.0);
    (pattern_consistency(history) + data_quality) / 2.0
}

/// Highest score wins; on equal scores the earlier candidate is kept
fn best_candidate(candidates: &[(StrategyKind, f64)]) -> StrategyKind {
    let mut best: Option<(StrategyKind, f64)> = None;
    for &(kind, score) in candidates {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((kind, score)),
        }
    }
    best.map(|(kind, _)| kind).unwrap_or_default()
}

/// Recommends a strategy for the adaptive agent from the opponent's history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyAnalyzer {
    ledger: StrategyLedger,
}

impl StrategyAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &StrategyLedger {
        &self.ledger
    }

    pub fn record_strategy_performance(&mut self, strategy: StrategyKind, won_round: bool) {
        self.ledger.record(strategy, won_round);
    }

    /// Pick the strategy to play next
    ///
    /// With probability `1 - ANALYSIS_ACCURACY * confidence` the analysis is skipped and
    /// a strategy is drawn weighted by ledger success instead.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        opp_history: &[Move],
        my_score: u32,
        opp_score: u32,
        rng: &mut R,
    ) -> StrategyKind {
        if opp_history.len() < MIN_ANALYSIS_HISTORY {
            return StrategyKind::Minimax;
        }

        let confidence = analysis_confidence(opp_history);
        if rng.gen::<f64>() > ANALYSIS_ACCURACY * confidence {
            let pick = self.weighted_random_strategy(rng);
            debug!(confidence, strategy = %pick, "analysis skipped, weighted draw");
            return pick;
        }

        self.select_by_regime(opp_history, my_score, opp_score)
    }

    /// Deterministic part of [`recommend`](Self::recommend)
    ///
    /// The first matching regime proposes two candidates, each scaled by
    /// `0.5 + success_rate` from the ledger.
    pub fn select_by_regime(&self, opp_history: &[Move], my_score: u32, opp_score: u32) -> StrategyKind {
        use StrategyKind::*;

        let coop_rate = cooperation_rate(opp_history);
        let consistency = pattern_consistency(opp_history);
        let score_differential = my_score as i64 - opp_score as i64;

        let mut candidates = if coop_rate > 0.8 && consistency > 0.7 {
            [(PatternMatcher, 0.9), (Adaptive, 0.6)]
        } else if coop_rate < 0.2 && consistency > 0.6 {
            [(Minimax, 0.9), (Bayesian, 0.7)]
        } else if consistency < 0.4 {
            [(Adaptive, 0.8), (Fuzzy, 0.7)]
        } else if (coop_rate - 0.5).abs() < 0.2 && score_differential < -5 {
            [(Minimax, 0.8), (PatternMatcher, 0.6)]
        } else {
            [(Adaptive, 0.7), (Bayesian, 0.6)]
        };

        for (kind, score) in candidates.iter_mut() {
            *score *= self.ledger.selection_weight(*kind);
        }

        best_candidate(&candidates)
    }

    /// Draw a strategy with weight `0.1 + success_rate` each
    pub fn weighted_random_strategy<R: Rng + ?Sized>(&self, rng: &mut R) -> StrategyKind {
        let weights = StrategyKind::ALL
            .iter()
            .map(|&kind| 0.1 + self.ledger.success_rate(kind));
        match WeightedIndex::new(weights) {
            Ok(dist) => StrategyKind::ALL[dist.sample(rng)],
            Err(_) => StrategyKind::Minimax,
        }
    }
}
