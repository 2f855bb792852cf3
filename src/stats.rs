//! Cumulative play statistics
//!
//! Persisted through the storage gateway, updated once per finished run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub games_played: u32,
    pub total_blocks: u64,
    pub perfect_placements: u64,
    pub max_combo: u32,
    pub average_score: f64,
}

/// Partial stats update; present fields replace stored ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPatch {
    pub games_played: Option<u32>,
    pub total_blocks: Option<u64>,
    pub perfect_placements: Option<u64>,
    pub max_combo: Option<u32>,
    pub average_score: Option<f64>,
}

impl From<Stats> for StatsPatch {
    fn from(s: Stats) -> Self {
        Self {
            games_played: Some(s.games_played),
            total_blocks: Some(s.total_blocks),
            perfect_placements: Some(s.perfect_placements),
            max_combo: Some(s.max_combo),
            average_score: Some(s.average_score),
        }
    }
}

/// Summary of one finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u64,
    pub blocks: u32,
    pub perfect_placements: u32,
    pub max_combo: u32,
}

impl Stats {
    pub fn apply(&mut self, patch: StatsPatch) {
        if let Some(v) = patch.games_played {
            self.games_played = v;
        }
        if let Some(v) = patch.total_blocks {
            self.total_blocks = v;
        }
        if let Some(v) = patch.perfect_placements {
            self.perfect_placements = v;
        }
        if let Some(v) = patch.max_combo {
            self.max_combo = v;
        }
        if let Some(v) = patch.average_score {
            self.average_score = v;
        }
    }

    /// Stats after folding in one more run (running average score)
    pub fn with_run(&self, run: RunSummary) -> Stats {
        let games = self.games_played + 1;
        let average =
            (self.average_score * self.games_played as f64 + run.score as f64) / games as f64;
        Stats {
            games_played: games,
            total_blocks: self.total_blocks + run.blocks as u64,
            perfect_placements: self.perfect_placements + run.perfect_placements as u64,
            max_combo: self.max_combo.max(run.max_combo),
            average_score: average,
        }
    }
}
