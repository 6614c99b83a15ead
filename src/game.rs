use crate::adaptive::{AdaptiveAgent, StrategyChange};
use crate::agent::{cooperation_rate, Move};
use crate::ledger::StrategyLedger;
use crate::opponent::{OpponentAgent, OpponentKind};
use crate::payoff::PayoffMatrix;
use crate::strategy::StrategyKind;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Rounds per match when none is configured
pub const DEFAULT_MAX_ROUNDS: u32 = 25;

/// Settings fixed at match start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub opponent: OpponentKind,
    pub max_rounds: u32,
    pub seed: u64,
    pub initial_strategy: StrategyKind,
}

impl MatchConfig {
    pub fn new(opponent: OpponentKind, max_rounds: u32, seed: u64) -> Self {
        Self {
            opponent,
            max_rounds,
            seed,
            initial_strategy: StrategyKind::default(),
        }
    }

    pub fn with_initial_strategy(mut self, strategy: StrategyKind) -> Self {
        self.initial_strategy = strategy;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(OpponentKind::default(), DEFAULT_MAX_ROUNDS, 0)
    }
}

/// Everything observable about one completed round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub adaptive_move: Move,
    pub opponent_move: Move,
    pub adaptive_score: u32,
    pub opponent_score: u32,
    pub cumulative_adaptive: u32,
    pub cumulative_opponent: u32,
    /// Strategy the adaptive agent played this round
    pub strategy: StrategyKind,
    /// Ledger credit: the adaptive agent scored at least as much as the opponent
    pub won_round: bool,
    pub strategy_change: Option<StrategyChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    AdaptiveWin,
    OpponentWin,
    Tie,
}

impl MatchOutcome {
    pub fn from_scores(adaptive: u32, opponent: u32) -> Self {
        match adaptive.cmp(&opponent) {
            std::cmp::Ordering::Greater => MatchOutcome::AdaptiveWin,
            std::cmp::Ordering::Less => MatchOutcome::OpponentWin,
            std::cmp::Ordering::Equal => MatchOutcome::Tie,
        }
    }
}

/// Coarse read of how an opponent has been playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorProfile {
    Analyzing,
    HighlyCooperative,
    MostlyCooperative,
    Balanced,
    MostlyAggressive,
    HighlyAggressive,
}

impl BehaviorProfile {
    pub fn classify(moves: &[Move]) -> Self {
        if moves.is_empty() {
            return BehaviorProfile::Analyzing;
        }
        let rate = cooperation_rate(moves);
        if rate > 0.8 {
            BehaviorProfile::HighlyCooperative
        } else if rate > 0.6 {
            BehaviorProfile::MostlyCooperative
        } else if rate > 0.4 {
            BehaviorProfile::Balanced
        } else if rate > 0.2 {
            BehaviorProfile::MostlyAggressive
        } else {
            BehaviorProfile::HighlyAggressive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BehaviorProfile::Analyzing => "Analyzing...",
            BehaviorProfile::HighlyCooperative => "Highly Cooperative",
            BehaviorProfile::MostlyCooperative => "Mostly Cooperative",
            BehaviorProfile::Balanced => "Balanced Strategy",
            BehaviorProfile::MostlyAggressive => "Mostly Aggressive",
            BehaviorProfile::HighlyAggressive => "Highly Aggressive",
        }
    }
}

impl fmt::Display for BehaviorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// End-of-match report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub opponent: OpponentKind,
    pub seed: u64,
    pub rounds_played: u32,
    pub adaptive_score: u32,
    pub opponent_score: u32,
    pub outcome: MatchOutcome,
    pub final_strategy: StrategyKind,
    pub strategy_changes: u32,
    pub adaptive_cooperation_rate: f64,
    pub opponent_cooperation_rate: f64,
    pub opponent_behavior: BehaviorProfile,
    pub ledger: StrategyLedger,
}

impl MatchSummary {
    pub fn score_differential(&self) -> i64 {
        self.adaptive_score as i64 - self.opponent_score as i64
    }
}

/// Tally of match outcomes across a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub adaptive_wins: u32,
    pub opponent_wins: u32,
    pub ties: u32,
}

impl Scoreboard {
    pub fn record(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::AdaptiveWin => self.adaptive_wins += 1,
            MatchOutcome::OpponentWin => self.opponent_wins += 1,
            MatchOutcome::Tie => self.ties += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.adaptive_wins + self.opponent_wins + self.ties
    }

    pub fn adaptive_win_rate(&self) -> f64 {
        if self.total() > 0 {
            self.adaptive_wins as f64 / self.total() as f64
        } else {
            0.0
        }
    }
}

impl<'a> FromIterator<&'a MatchSummary> for Scoreboard {
    fn from_iter<I: IntoIterator<Item = &'a MatchSummary>>(iter: I) -> Self {
        let mut board = Scoreboard::default();
        for summary in iter {
            board.record(summary.outcome);
        }
        board
    }
}

fn seeded_streams(seed: u64) -> (Xoshiro256PlusPlus, Xoshiro256PlusPlus) {
    let adaptive = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut opponent = adaptive.clone();
    opponent.jump();
    (adaptive, opponent)
}

/// One match between the adaptive agent and a scripted opponent
///
/// Each agent draws from its own seeded stream, so a match is fully determined by
/// its [`MatchConfig`].
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    payoff: PayoffMatrix,
    adaptive: AdaptiveAgent,
    opponent: OpponentAgent,
    adaptive_rng: Xoshiro256PlusPlus,
    opponent_rng: Xoshiro256PlusPlus,
    round: u32,
    adaptive_score: u32,
    opponent_score: u32,
    rounds: Vec<RoundOutcome>,
}

impl Match {
    pub fn new(mut config: MatchConfig) -> Self {
        config.max_rounds = config.max_rounds.max(1);
        let (adaptive_rng, opponent_rng) = seeded_streams(config.seed);

        Self {
            payoff: PayoffMatrix::standard(),
            adaptive: AdaptiveAgent::with_strategy(config.initial_strategy),
            opponent: OpponentAgent::new(config.opponent),
            adaptive_rng,
            opponent_rng,
            round: 0,
            adaptive_score: 0,
            opponent_score: 0,
            rounds: Vec::with_capacity(config.max_rounds as usize),
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn adaptive(&self) -> &AdaptiveAgent {
        &self.adaptive
    }

    pub fn opponent(&self) -> &OpponentAgent {
        &self.opponent
    }

    pub fn rounds(&self) -> &[RoundOutcome] {
        &self.rounds
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.adaptive_score, self.opponent_score)
    }

    pub fn is_finished(&self) -> bool {
        self.round >= self.config.max_rounds
    }

    /// Play one round; `None` once the round limit is reached
    ///
    /// The opponent decides without seeing the adaptive agent's move for this round.
    pub fn play_round(&mut self) -> Option<RoundOutcome> {
        if self.is_finished() {
            return None;
        }

        let round = self.round;
        let decision = self.adaptive.decide(
            round,
            self.adaptive_score,
            self.opponent_score,
            &mut self.adaptive_rng,
        );
        let opponent_move = self.opponent.decide(&mut self.opponent_rng);
        let adaptive_move = decision.chosen;

        self.adaptive.record_round(adaptive_move, opponent_move);
        self.opponent.record_round(opponent_move, adaptive_move);

        let (adaptive_score, opponent_score) = self.payoff.score(adaptive_move, opponent_move);
        self.adaptive_score = self.adaptive_score.saturating_add(adaptive_score);
        self.opponent_score = self.opponent_score.saturating_add(opponent_score);

        let won_round = adaptive_score >= opponent_score;
        self.adaptive
            .record_strategy_performance(decision.strategy, won_round);

        debug!(
            round,
            adaptive = %adaptive_move,
            opponent = %opponent_move,
            adaptive_score,
            opponent_score,
            strategy = %decision.strategy,
            noise = decision.noise,
            "round played"
        );

        let outcome = RoundOutcome {
            round,
            adaptive_move,
            opponent_move,
            adaptive_score,
            opponent_score,
            cumulative_adaptive: self.adaptive_score,
            cumulative_opponent: self.opponent_score,
            strategy: decision.strategy,
            won_round,
            strategy_change: decision.change,
        };
        self.rounds.push(outcome);
        self.round += 1;

        Some(outcome)
    }

    /// Play out every remaining round and summarize
    pub fn run(&mut self) -> MatchSummary {
        debug!(
            opponent = %self.config.opponent,
            rounds = self.config.max_rounds,
            seed = self.config.seed,
            "match start"
        );
        while self.play_round().is_some() {}

        let summary = self.summary();
        debug!(
            adaptive = summary.adaptive_score,
            opponent = summary.opponent_score,
            outcome = ?summary.outcome,
            "match finished"
        );
        summary
    }

    /// Summary of the rounds played so far
    pub fn summary(&self) -> MatchSummary {
        let opponent_moves = self.adaptive.history().theirs();
        MatchSummary {
            opponent: self.config.opponent,
            seed: self.config.seed,
            rounds_played: self.round,
            adaptive_score: self.adaptive_score,
            opponent_score: self.opponent_score,
            outcome: MatchOutcome::from_scores(self.adaptive_score, self.opponent_score),
            final_strategy: self.adaptive.current_strategy(),
            strategy_changes: self
                .rounds
                .iter()
                .filter(|r| r.strategy_change.is_some())
                .count() as u32,
            adaptive_cooperation_rate: cooperation_rate(self.adaptive.history().mine()),
            opponent_cooperation_rate: cooperation_rate(opponent_moves),
            opponent_behavior: BehaviorProfile::classify(opponent_moves),
            ledger: self.adaptive.analyzer().ledger().clone(),
        }
    }

    /// Clear all per-match state; opponent type and seed are kept
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Move to the next opponent type in rotation and start over
    pub fn cycle_opponent(&mut self) -> OpponentKind {
        self.config.opponent = self.config.opponent.next();
        self.reset();
        self.config.opponent
    }
}

/// Play `matches` independent matches to completion in parallel, seeds `base.seed + i`
///
/// Matches come back in seed order with their round records intact.
pub fn play_series(base: &MatchConfig, matches: usize) -> Vec<Match> {
    (0..matches)
        .into_par_iter()
        .map(|i| {
            let config = MatchConfig {
                seed: base.seed.wrapping_add(i as u64),
                ..base.clone()
            };
            let mut game = Match::new(config);
            game.run();
            game
        })
        .collect()
}

/// Summaries of [`play_series`]
pub fn run_series(base: &MatchConfig, matches: usize) -> Vec<MatchSummary> {
    play_series(base, matches).iter().map(Match::summary).collect()
}

/// [`run_series`] against every opponent type in rotation order
pub fn run_gauntlet(base: &MatchConfig, matches_per_opponent: usize) -> Vec<MatchSummary> {
    OpponentKind::ALL
        .iter()
        .flat_map(|&opponent| {
            let config = MatchConfig {
                opponent,
                ..base.clone()
            };
            run_series(&config, matches_per_opponent)
        })
        .collect()
}
