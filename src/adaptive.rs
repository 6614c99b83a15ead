//! Adaptive agent: re-selects its decision algorithm as the match unfolds

use crate::agent::{History, Move};
use crate::analyzer::{StrategyAnalyzer, MIN_ANALYSIS_HISTORY};
use crate::strategy::StrategyKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

/// Chance per round of playing a uniformly random move instead of the strategy's
pub const NOISE_RATE: f64 = 0.01;

/// Rounds an agent stays on a newly chosen strategy before re-evaluating
pub const COOLDOWN_RANGE: RangeInclusive<u32> = 2..=5;

/// Mutable decision state of the adaptive agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveState {
    pub current_strategy: StrategyKind,
    pub strategy_change_cooldown: u32,
    /// Updated from the agent's own moves, kept in `[MIN_PRIOR, MAX_PRIOR]`
    pub bayesian_prior: f64,
    pub consecutive_losses: u32,
    pub aggression_level: f64,
}

impl AdaptiveState {
    pub const MIN_PRIOR: f64 = 0.05;
    pub const MAX_PRIOR: f64 = 0.95;
    pub const INITIAL_PRIOR: f64 = 0.5;
    pub const INITIAL_AGGRESSION: f64 = 0.3;
    pub const MAX_AGGRESSION: f64 = 0.8;

    pub fn new(initial_strategy: StrategyKind) -> Self {
        Self {
            current_strategy: initial_strategy,
            strategy_change_cooldown: 0,
            bayesian_prior: Self::INITIAL_PRIOR,
            consecutive_losses: 0,
            aggression_level: Self::INITIAL_AGGRESSION,
        }
    }

    /// Nudge the prior toward cooperation (x1.1) or defection (x0.9), clamped
    pub fn update_bayesian_prior(&mut self, own_move: Move) {
        self.bayesian_prior = match own_move {
            Move::Cooperate => (self.bayesian_prior * 1.1).min(Self::MAX_PRIOR),
            Move::Defect => (self.bayesian_prior * 0.9).max(Self::MIN_PRIOR),
        };
    }
}

impl Default for AdaptiveState {
    fn default() -> Self {
        Self::new(StrategyKind::default())
    }
}

/// Informational event emitted when the agent switches algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChange {
    pub round: u32,
    pub from: StrategyKind,
    pub to: StrategyKind,
}

/// Outcome of one [`AdaptiveAgent::decide`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub chosen: Move,
    /// Strategy in force this round, credited in the ledger afterwards
    pub strategy: StrategyKind,
    pub change: Option<StrategyChange>,
    /// Set when the move came from the noise floor rather than the strategy
    pub noise: bool,
}

/// Agent that switches between decision algorithms based on opponent analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveAgent {
    history: History,
    state: AdaptiveState,
    analyzer: StrategyAnalyzer,
    initial_strategy: StrategyKind,
}

impl AdaptiveAgent {
    pub const NAME: &'static str = "Adaptive AI";

    pub fn new() -> Self {
        Self::with_strategy(StrategyKind::default())
    }

    pub fn with_strategy(initial_strategy: StrategyKind) -> Self {
        Self {
            history: History::new(),
            state: AdaptiveState::new(initial_strategy),
            analyzer: StrategyAnalyzer::new(),
            initial_strategy,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> &AdaptiveState {
        &self.state
    }

    pub fn analyzer(&self) -> &StrategyAnalyzer {
        &self.analyzer
    }

    pub fn current_strategy(&self) -> StrategyKind {
        self.state.current_strategy
    }

    /// Whether this round may consult the analyzer
    ///
    /// Requires an expired cooldown, at least 3 opponent moves, and either a round
    /// number divisible by 3 or a history still shorter than 8.
    pub fn should_reanalyze(&self, round: u32) -> bool {
        let seen = self.history.theirs().len();
        self.state.strategy_change_cooldown == 0
            && seen >= MIN_ANALYSIS_HISTORY
            && (round % 3 == 0 || seen < 8)
    }

    /// Choose this round's move
    ///
    /// `my_score` and `opp_score` are the running match totals before this round.
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        round: u32,
        my_score: u32,
        opp_score: u32,
        rng: &mut R,
    ) -> Decision {
        let mut change = None;

        if self.should_reanalyze(round) {
            let recommended =
                self.analyzer
                    .recommend(self.history.theirs(), my_score, opp_score, rng);
            if recommended != self.state.current_strategy {
                let event = StrategyChange {
                    round,
                    from: self.state.current_strategy,
                    to: recommended,
                };
                self.state.current_strategy = recommended;
                self.state.strategy_change_cooldown = rng.gen_range(COOLDOWN_RANGE);
                debug!(
                    round,
                    from = %event.from,
                    to = %event.to,
                    cooldown = self.state.strategy_change_cooldown,
                    "strategy switch"
                );
                change = Some(event);
            }
        } else {
            self.state.strategy_change_cooldown = self.state.strategy_change_cooldown.saturating_sub(1);
        }

        let strategy = self.state.current_strategy;
        let noise = rng.gen::<f64>() < NOISE_RATE;
        let chosen = if noise {
            if rng.gen_bool(0.5) {
                Move::Cooperate
            } else {
                Move::Defect
            }
        } else {
            strategy.decide(&self.history, &mut self.state, rng)
        };

        self.state.update_bayesian_prior(chosen);

        Decision {
            chosen,
            strategy,
            change,
            noise,
        }
    }

    /// Append a completed round to this agent's view of the match
    pub fn record_round(&mut self, my_move: Move, opp_move: Move) {
        self.history.record(my_move, opp_move);
    }

    pub fn record_strategy_performance(&mut self, strategy: StrategyKind, won_round: bool) {
        self.analyzer.record_strategy_performance(strategy, won_round);
    }

    /// Back to the freshly constructed state, keeping the configured initial strategy
    pub fn reset(&mut self) {
        *self = Self::with_strategy(self.initial_strategy);
    }
}

impl Default for AdaptiveAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use Move::{Cooperate as C, Defect as D};

    #[test]
    fn test_prior_clamps() {
        let mut state = AdaptiveState::default();
        for _ in 0..100 {
            state.update_bayesian_prior(C);
        }
        assert_eq!(state.bayesian_prior, AdaptiveState::MAX_PRIOR);
        for _ in 0..100 {
            state.update_bayesian_prior(D);
        }
        assert_eq!(state.bayesian_prior, AdaptiveState::MIN_PRIOR);
    }

    #[test]
    fn test_no_analysis_before_three_rounds() {
        let mut agent = AdaptiveAgent::with_strategy(StrategyKind::Fuzzy);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        for round in 0..3 {
            assert!(!agent.should_reanalyze(round));
            let decision = agent.decide(round, 0, 0, &mut rng);
            assert_eq!(decision.strategy, StrategyKind::Fuzzy);
            assert!(decision.change.is_none());
            agent.record_round(decision.chosen, D);
        }
        assert!(agent.should_reanalyze(3));
    }

    #[test]
    fn test_eligibility_rules() {
        let mut agent = AdaptiveAgent::new();
        for _ in 0..10 {
            agent.record_round(C, C);
        }
        // Long history: only rounds divisible by 3
        assert!(!agent.should_reanalyze(10));
        assert!(!agent.should_reanalyze(11));
        assert!(agent.should_reanalyze(12));

        agent.state.strategy_change_cooldown = 1;
        assert!(!agent.should_reanalyze(12));
    }

    #[test]
    fn test_cooldown_decrements_and_floors() {
        let mut agent = AdaptiveAgent::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        agent.state.strategy_change_cooldown = 2;

        agent.decide(0, 0, 0, &mut rng);
        assert_eq!(agent.state().strategy_change_cooldown, 1);
        agent.decide(1, 0, 0, &mut rng);
        assert_eq!(agent.state().strategy_change_cooldown, 0);
        agent.decide(2, 0, 0, &mut rng);
        assert_eq!(agent.state().strategy_change_cooldown, 0);
    }

    #[test]
    fn test_switch_sets_cooldown() {
        let mut switches = 0;
        for seed in 0..50 {
            let mut agent = AdaptiveAgent::with_strategy(StrategyKind::TitForTat);
            for _ in 0..20 {
                agent.record_round(C, C);
            }
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let decision = agent.decide(21, 60, 60, &mut rng);

            if let Some(change) = decision.change {
                switches += 1;
                assert_eq!(change.from, StrategyKind::TitForTat);
                assert_eq!(change.to, agent.current_strategy());
                assert_eq!(decision.strategy, change.to);
                assert!(COOLDOWN_RANGE.contains(&agent.state().strategy_change_cooldown));
            } else {
                assert_eq!(agent.current_strategy(), StrategyKind::TitForTat);
            }
        }
        // Tit-for-tat is never a regime candidate, only a 1-in-6 weighted draw
        assert!(switches > 40, "switches = {}", switches);
    }

    #[test]
    fn test_reset_matches_fresh_agent() {
        let mut agent = AdaptiveAgent::with_strategy(StrategyKind::Adaptive);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        for round in 0..15 {
            let decision = agent.decide(round, round * 2, round, &mut rng);
            agent.record_round(decision.chosen, if round % 2 == 0 { C } else { D });
            agent.record_strategy_performance(decision.strategy, round % 3 == 0);
        }
        assert_ne!(agent, AdaptiveAgent::with_strategy(StrategyKind::Adaptive));

        agent.reset();
        assert_eq!(agent, AdaptiveAgent::with_strategy(StrategyKind::Adaptive));
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_noise_floor_is_rare() {
        let mut agent = AdaptiveAgent::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let noisy = (0..5000).filter(|&r| agent.decide(r, 0, 0, &mut rng).noise).count();
        assert!(noisy > 20 && noisy < 90, "noisy = {}", noisy);
    }

    proptest! {
        #[test]
        fn prior_stays_bounded(moves in prop::collection::vec(any::<bool>(), 0..500)) {
            let mut state = AdaptiveState::default();
            for cooperate in moves {
                state.update_bayesian_prior(if cooperate { C } else { D });
                prop_assert!(state.bayesian_prior >= AdaptiveState::MIN_PRIOR);
                prop_assert!(state.bayesian_prior <= AdaptiveState::MAX_PRIOR);
            }
        }
    }
}
