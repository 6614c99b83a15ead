use crate::game::RoundOutcome;
use crate::opponent::OpponentKind;
use csv::Writer;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Buffered CSV writer for per-round match records
pub struct BufferedCsvExporter {
    path: PathBuf,
    buffer: Vec<RoundRecord>,
    buffer_size: usize,
}

#[derive(Debug, Clone)]
struct RoundRecord {
    seed: u64,
    opponent: OpponentKind,
    outcome: RoundOutcome,
}

impl BufferedCsvExporter {
    pub fn new(path: &Path, buffer_size: usize) -> Self {
        Self {
            path: path.to_owned(),
            buffer: Vec::with_capacity(buffer_size),
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn add_round(
        &mut self,
        seed: u64,
        opponent: OpponentKind,
        outcome: RoundOutcome,
    ) -> Result<(), Box<dyn Error>> {
        self.buffer.push(RoundRecord {
            seed,
            opponent,
            outcome,
        });

        if self.buffer.len() >= self.buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Box<dyn Error>> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let file_exists = self.path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = Writer::from_writer(file);

        // Write header if file is new
        if !file_exists {
            writer.write_record([
                "seed",
                "opponent",
                "round",
                "adaptive_move",
                "opponent_move",
                "adaptive_score",
                "opponent_score",
                "cumulative_adaptive",
                "cumulative_opponent",
                "strategy",
                "won_round",
                "switched_to",
            ])?;
        }

        for record in &self.buffer {
            let r = &record.outcome;
            writer.write_record(&[
                record.seed.to_string(),
                record.opponent.name().to_string(),
                r.round.to_string(),
                r.adaptive_move.to_string(),
                r.opponent_move.to_string(),
                r.adaptive_score.to_string(),
                r.opponent_score.to_string(),
                r.cumulative_adaptive.to_string(),
                r.cumulative_opponent.to_string(),
                r.strategy.name().to_string(),
                r.won_round.to_string(),
                r.strategy_change
                    .map(|c| c.to.name().to_string())
                    .unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        self.buffer.clear();

        Ok(())
    }

    pub fn finish(mut self) -> Result<(), Box<dyn Error>> {
        self.flush()?;
        Ok(())
    }
}
