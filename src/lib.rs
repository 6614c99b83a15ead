//! Adaptive Iterated Prisoner's Dilemma
//!
//! An adaptive agent switches between six decision algorithms, steered by a running
//! analysis of its opponent, while playing repeated matches against scripted
//! personality-driven opponents.

pub mod adaptive;
pub mod agent;
pub mod analyzer;
pub mod csv_export;
pub mod game;
pub mod ledger;
pub mod opponent;
pub mod payoff;
pub mod strategy;

pub use adaptive::{AdaptiveAgent, AdaptiveState, Decision, StrategyChange};
pub use agent::{History, Move};
pub use analyzer::StrategyAnalyzer;
pub use game::{
    play_series, run_gauntlet, run_series, BehaviorProfile, Match, MatchConfig, MatchOutcome, MatchSummary,
    RoundOutcome, Scoreboard,
};
pub use ledger::{StrategyLedger, StrategyRecord};
pub use opponent::{OpponentAgent, OpponentKind, Personality};
pub use payoff::{payoff, PayoffMatrix};
pub use strategy::StrategyKind;
