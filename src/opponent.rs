//! Scripted opponents with fixed personalities

use crate::agent::{cooperation_rate, History, Move};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Personality types of the scripted opponents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    Cooperative,
    Aggressive,
    #[default]
    Random,
    TitForTat,
    Forgiving,
    Strategic,
    Unpredictable,
    Exploitative,
    Mirror,
}

impl OpponentKind {
    pub const COUNT: usize = 9;

    /// Fixed rotation order
    pub const ALL: [OpponentKind; Self::COUNT] = [
        OpponentKind::Cooperative,
        OpponentKind::Aggressive,
        OpponentKind::Random,
        OpponentKind::TitForTat,
        OpponentKind::Forgiving,
        OpponentKind::Strategic,
        OpponentKind::Unpredictable,
        OpponentKind::Exploitative,
        OpponentKind::Mirror,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OpponentKind::Cooperative => "cooperative",
            OpponentKind::Aggressive => "aggressive",
            OpponentKind::Random => "random",
            OpponentKind::TitForTat => "tit_for_tat",
            OpponentKind::Forgiving => "forgiving",
            OpponentKind::Strategic => "strategic",
            OpponentKind::Unpredictable => "unpredictable",
            OpponentKind::Exploitative => "exploitative",
            OpponentKind::Mirror => "mirror",
        }
    }

    /// Parse an opponent type, falling back to `random` for unknown names
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match Self::ALL.iter().find(|kind| kind.name() == normalized) {
            Some(kind) => *kind,
            None => {
                warn!("Unknown opponent type '{}', falling back to random", name);
                OpponentKind::Random
            }
        }
    }

    /// Next type in rotation, wrapping after `mirror`
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::COUNT]
    }

    /// "tit_for_tat" -> "Tit For Tat AI"
    pub fn display_name(self) -> String {
        let words: Vec<String> = self
            .name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect();
        format!("{} AI", words.join(" "))
    }

    /// Display-only strength rating in [0, 1]
    pub fn strength(self) -> f64 {
        match self {
            OpponentKind::Cooperative => 0.6,
            OpponentKind::Aggressive => 0.8,
            OpponentKind::Random => 0.4,
            OpponentKind::TitForTat => 0.7,
            OpponentKind::Forgiving => 0.5,
            OpponentKind::Strategic => 0.9,
            OpponentKind::Unpredictable => 0.75,
            OpponentKind::Exploitative => 0.85,
            OpponentKind::Mirror => 0.7,
        }
    }

    pub fn personality(self) -> Personality {
        let (cooperation_bias, forgiveness, aggression, adaptability) = match self {
            OpponentKind::Cooperative => (0.8, 0.9, 0.1, 0.3),
            OpponentKind::Aggressive => (0.2, 0.1, 0.9, 0.6),
            OpponentKind::Random => (0.5, 0.5, 0.5, 1.0),
            OpponentKind::TitForTat => (0.5, 0.3, 0.5, 0.7),
            OpponentKind::Forgiving => (0.7, 0.8, 0.2, 0.5),
            OpponentKind::Strategic => (0.6, 0.4, 0.6, 0.9),
            OpponentKind::Unpredictable => (0.5, 0.5, 0.5, 0.8),
            OpponentKind::Exploitative => (0.4, 0.2, 0.8, 0.7),
            OpponentKind::Mirror => (0.5, 0.5, 0.5, 0.6),
        };
        Personality {
            cooperation_bias,
            forgiveness,
            aggression,
            adaptability,
        }
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Probability weights governing a scripted opponent, all in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub cooperation_bias: f64,
    pub forgiveness: f64,
    pub aggression: f64,
    pub adaptability: f64,
}

/// Chance the unpredictable opponent flips its own last move
const UNPREDICTABLE_FLIP: f64 = 0.3;
/// Chance the exploitative opponent defects on a mixed recent history
const EXPLOIT_PROBE: f64 = 0.6;
/// Chance the mirror opponent inverts the echoed move
const MIRROR_INVERT: f64 = 0.1;
/// Cooperation rate above which the strategic opponent cooperates
const STRATEGIC_THRESHOLD: f64 = 0.6;

/// Scripted opponent: fixed policy, no learned state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentAgent {
    kind: OpponentKind,
    personality: Personality,
    history: History,
}

impl OpponentAgent {
    pub fn new(kind: OpponentKind) -> Self {
        Self {
            kind,
            personality: kind.personality(),
            history: History::new(),
        }
    }

    pub fn kind(&self) -> OpponentKind {
        self.kind
    }

    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn name(&self) -> String {
        self.kind.display_name()
    }

    pub fn decide<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        execute_policy(self.kind, &self.personality, &self.history, rng)
    }

    pub fn record_round(&mut self, my_move: Move, opp_move: Move) {
        self.history.record(my_move, opp_move);
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

fn biased<R: Rng + ?Sized>(p_cooperate: f64, rng: &mut R) -> Move {
    if rng.gen::<f64>() < p_cooperate {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Execute an opponent policy for one round
///
/// `history.mine()` are the opponent's own moves, `history.theirs()` the adaptive agent's.
pub fn execute_policy<R: Rng + ?Sized>(
    kind: OpponentKind,
    personality: &Personality,
    history: &History,
    rng: &mut R,
) -> Move {
    let mine = history.mine();
    let theirs = history.theirs();

    match kind {
        OpponentKind::Cooperative | OpponentKind::Aggressive | OpponentKind::Random => {
            biased(personality.cooperation_bias, rng)
        }
        OpponentKind::TitForTat => theirs.last().copied().unwrap_or(Move::Cooperate),
        OpponentKind::Forgiving => match theirs.last() {
            None => Move::Cooperate,
            Some(Move::Defect) if rng.gen::<f64>() < personality.forgiveness => Move::Cooperate,
            Some(&last) => last,
        },
        OpponentKind::Strategic => {
            if theirs.len() < 3 {
                return Move::Cooperate;
            }
            if theirs.len() >= 5 {
                let recent = &theirs[theirs.len() - 3..];
                if recent.iter().all(|&m| m == recent[0]) {
                    return recent[0].opposite();
                }
            }
            if cooperation_rate(theirs) > STRATEGIC_THRESHOLD {
                Move::Cooperate
            } else {
                Move::Defect
            }
        }
        OpponentKind::Unpredictable => {
            if mine.len() < 2 {
                return Move::Cooperate;
            }
            let my_last = mine[mine.len() - 1];
            if rng.gen::<f64>() < UNPREDICTABLE_FLIP {
                my_last.opposite()
            } else {
                theirs.last().copied().unwrap_or(Move::Cooperate)
            }
        }
        OpponentKind::Exploitative => {
            if theirs.len() < 4 {
                return Move::Cooperate;
            }
            match theirs[theirs.len() - 2..] {
                [Move::Cooperate, Move::Cooperate] => Move::Defect,
                [Move::Defect, Move::Defect] => Move::Cooperate,
                _ => biased(1.0 - EXPLOIT_PROBE, rng),
            }
        }
        OpponentKind::Mirror => match theirs.last() {
            None => Move::Cooperate,
            Some(&last) if rng.gen::<f64>() < MIRROR_INVERT => last.opposite(),
            Some(&last) => last,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use Move::{Cooperate as C, Defect as D};

    fn make_rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    /// Opponent whose own moves are all cooperative and whose view of the adaptive agent is `theirs`
    fn agent_facing(kind: OpponentKind, theirs: &[Move]) -> OpponentAgent {
        let mut agent = OpponentAgent::new(kind);
        for &m in theirs {
            agent.record_round(C, m);
        }
        agent
    }

    #[test]
    fn test_names_and_fallback() {
        for kind in OpponentKind::ALL {
            assert_eq!(OpponentKind::from_name(kind.name()), kind);
        }
        assert_eq!(OpponentKind::from_name("Tit For Tat"), OpponentKind::TitForTat);
        assert_eq!(OpponentKind::from_name("berserker"), OpponentKind::Random);
        assert_eq!(OpponentKind::TitForTat.display_name(), "Tit For Tat AI");
        assert_eq!(OpponentKind::Mirror.display_name(), "Mirror AI");
    }

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(OpponentKind::Cooperative.next(), OpponentKind::Aggressive);
        assert_eq!(OpponentKind::Mirror.next(), OpponentKind::Cooperative);
        let mut kind = OpponentKind::Strategic;
        for _ in 0..OpponentKind::COUNT {
            kind = kind.next();
        }
        assert_eq!(kind, OpponentKind::Strategic);
    }

    #[test]
    fn test_personality_profiles_in_range() {
        for kind in OpponentKind::ALL {
            let p = kind.personality();
            for v in [p.cooperation_bias, p.forgiveness, p.aggression, p.adaptability] {
                assert!((0.0..=1.0).contains(&v));
            }
            assert!((0.0..=1.0).contains(&kind.strength()));
        }
    }

    #[test]
    fn test_biased_policies() {
        let mut rng = make_rng();
        let cooperative = OpponentAgent::new(OpponentKind::Cooperative);
        let aggressive = OpponentAgent::new(OpponentKind::Aggressive);

        let coop = (0..2000).filter(|_| cooperative.decide(&mut rng) == C).count();
        let agg_coop = (0..2000).filter(|_| aggressive.decide(&mut rng) == C).count();
        assert!(coop > 1500 && coop < 1700, "coop = {}", coop);
        assert!(agg_coop > 300 && agg_coop < 500, "agg_coop = {}", agg_coop);
    }

    #[test]
    fn test_tit_for_tat_echo() {
        let mut rng = make_rng();
        assert_eq!(agent_facing(OpponentKind::TitForTat, &[]).decide(&mut rng), C);
        assert_eq!(agent_facing(OpponentKind::TitForTat, &[C, D]).decide(&mut rng), D);
        assert_eq!(agent_facing(OpponentKind::TitForTat, &[D, C]).decide(&mut rng), C);
    }

    #[test]
    fn test_forgiving_mostly_forgives() {
        let mut rng = make_rng();
        let agent = agent_facing(OpponentKind::Forgiving, &[C, D]);
        let forgiven = (0..1000).filter(|_| agent.decide(&mut rng) == C).count();
        assert!(forgiven > 740 && forgiven < 860, "forgiven = {}", forgiven);
    }

    #[test]
    fn test_strategic() {
        let mut rng = make_rng();
        assert_eq!(agent_facing(OpponentKind::Strategic, &[D, D]).decide(&mut rng), C);
        // Streak of three after five rounds: counter it
        assert_eq!(agent_facing(OpponentKind::Strategic, &[D, D, C, C, C]).decide(&mut rng), D);
        assert_eq!(agent_facing(OpponentKind::Strategic, &[C, C, D, D, D]).decide(&mut rng), C);
        // Mixed tail: cooperation-rate threshold
        assert_eq!(agent_facing(OpponentKind::Strategic, &[C, C, C, D]).decide(&mut rng), C);
        assert_eq!(agent_facing(OpponentKind::Strategic, &[C, D, D, C, D]).decide(&mut rng), D);
    }

    #[test]
    fn test_exploitative() {
        let mut rng = make_rng();
        assert_eq!(agent_facing(OpponentKind::Exploitative, &[D, D, C]).decide(&mut rng), C);
        assert_eq!(agent_facing(OpponentKind::Exploitative, &[D, D, C, C]).decide(&mut rng), D);
        assert_eq!(agent_facing(OpponentKind::Exploitative, &[C, C, D, D]).decide(&mut rng), C);
    }

    #[test]
    fn test_unpredictable_opens_cooperative() {
        let mut rng = make_rng();
        let agent = agent_facing(OpponentKind::Unpredictable, &[D]);
        for _ in 0..20 {
            assert_eq!(agent.decide(&mut rng), C);
        }
    }

    #[test]
    fn test_unpredictable_flips_own_move_or_echoes() {
        let mut rng = make_rng();

        // Own last C, adaptive last C: only the flip produces D
        let agent = agent_facing(OpponentKind::Unpredictable, &[C, C, C]);
        let flips = (0..1000).filter(|_| agent.decide(&mut rng) == D).count();
        assert!(flips > 240 && flips < 360, "flips = {}", flips);

        // Own last D, adaptive last D: only the flip produces C
        let mut agent = OpponentAgent::new(OpponentKind::Unpredictable);
        for _ in 0..3 {
            agent.record_round(D, D);
        }
        let flips = (0..1000).filter(|_| agent.decide(&mut rng) == C).count();
        assert!(flips > 240 && flips < 360, "flips = {}", flips);
    }

    #[test]
    fn test_mirror_mostly_echoes() {
        let mut rng = make_rng();
        let agent = agent_facing(OpponentKind::Mirror, &[C, D]);
        let echoed = (0..1000).filter(|_| agent.decide(&mut rng) == D).count();
        assert!(echoed > 860 && echoed < 940, "echoed = {}", echoed);
    }

    #[test]
    fn test_reset_matches_fresh_opponent() {
        let mut agent = agent_facing(OpponentKind::Strategic, &[C, D, C]);
        agent.reset();
        assert_eq!(agent, OpponentAgent::new(OpponentKind::Strategic));
    }
}
