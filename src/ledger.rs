use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};

/// Win/use counters for a single strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub uses: u32,
    pub wins: u32,
}

impl StrategyRecord {
    /// `wins / max(1, uses)`, so an unused strategy reads as 0
    pub fn success_rate(&self) -> f64 {
        self.wins as f64 / self.uses.max(1) as f64
    }
}

/// Per-strategy performance ledger used to bias strategy selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyLedger {
    records: [StrategyRecord; StrategyKind::COUNT],
}

impl StrategyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, strategy: StrategyKind, won: bool) {
        let entry = &mut self.records[strategy.index()];
        entry.uses += 1;
        if won {
            entry.wins += 1;
        }
    }

    pub fn get(&self, strategy: StrategyKind) -> StrategyRecord {
        self.records[strategy.index()]
    }

    pub fn success_rate(&self, strategy: StrategyKind) -> f64 {
        self.get(strategy).success_rate()
    }

    /// Multiplier applied to analyzer candidate scores
    pub fn selection_weight(&self, strategy: StrategyKind) -> f64 {
        0.5 + self.success_rate(strategy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyKind, StrategyRecord)> + '_ {
        StrategyKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unused_strategy_rate_is_zero() {
        let ledger = StrategyLedger::new();
        for kind in StrategyKind::ALL {
            assert_eq!(ledger.success_rate(kind), 0.0);
            assert_eq!(ledger.selection_weight(kind), 0.5);
        }
    }

    #[test]
    fn test_record_counts() {
        let mut ledger = StrategyLedger::new();
        ledger.record(StrategyKind::Bayesian, true);
        ledger.record(StrategyKind::Bayesian, false);
        ledger.record(StrategyKind::Bayesian, true);
        ledger.record(StrategyKind::Fuzzy, false);

        assert_eq!(ledger.get(StrategyKind::Bayesian), StrategyRecord { uses: 3, wins: 2 });
        assert_eq!(ledger.get(StrategyKind::Fuzzy), StrategyRecord { uses: 1, wins: 0 });
        assert!((ledger.success_rate(StrategyKind::Bayesian) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(ledger.get(StrategyKind::Minimax), StrategyRecord::default());
    }

    proptest! {
        #[test]
        fn success_rate_stays_in_unit_interval(outcomes in prop::collection::vec((0usize..6, any::<bool>()), 0..200)) {
            let mut ledger = StrategyLedger::new();
            for (idx, won) in outcomes {
                ledger.record(StrategyKind::ALL[idx], won);
            }
            for (kind, record) in ledger.iter() {
                prop_assert!(record.wins <= record.uses);
                let rate = ledger.success_rate(kind);
                prop_assert!((0.0..=1.0).contains(&rate));
            }
        }
    }
}
