//! Search configuration and the common move-selection entry point.
//!
//! Callers describe the search they want with a [`SearchConfig`] and get a
//! move back from [`select_move`]. `None` always means the player has no
//! legal move and must pass.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::alphabeta::AlphaBetaSearch;
use crate::board::{Board, Color, Move};
use crate::constants::{DEFAULT_DEPTH, N_ITERATIONS, ROLLOUT_DEPTH, UCT_C};
use crate::eval::EvaluatorKind;
use crate::mcts::{MctsConfig, MctsSearch, RolloutPolicy};

/// Which search algorithm picks the move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchKind {
    AlphaBeta,
    #[default]
    Mcts,
}

/// Everything needed to build a search.
///
/// Missing fields in a config file take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub kind: SearchKind,
    pub evaluator: EvaluatorKind,
    /// Alpha-beta depth in plies
    pub depth: i32,
    /// MCTS iterations per move
    pub iterations: usize,
    /// MCTS plies per rollout
    pub rollout_depth: usize,
    /// UCT exploration constant
    pub exploration: f64,
    /// Score divisor before `tanh`; defaults to the evaluator's own constant
    pub normalization: Option<f64>,
    pub rollout: RolloutPolicy,
    /// Seed for MCTS randomness; unseeded searches draw a fresh seed
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            kind: SearchKind::default(),
            evaluator: EvaluatorKind::default(),
            depth: DEFAULT_DEPTH,
            iterations: N_ITERATIONS,
            rollout_depth: ROLLOUT_DEPTH,
            exploration: UCT_C,
            normalization: None,
            rollout: RolloutPolicy::default(),
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!("loaded search config from {}", path.display());
        Ok(config)
    }

    pub fn normalization(&self) -> f64 {
        self.normalization.unwrap_or_else(|| self.evaluator.normalization())
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig {
            iterations: self.iterations,
            rollout_depth: self.rollout_depth,
            exploration: self.exploration,
            normalization: self.normalization(),
            rollout: self.rollout,
        }
    }

    fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Build the configured search.
    pub fn build(&self) -> Box<dyn MoveSelector> {
        let evaluator = self.evaluator.build();
        match self.kind {
            SearchKind::AlphaBeta => Box::new(AlphaBetaSearch::new(evaluator, self.depth)),
            SearchKind::Mcts => {
                Box::new(MctsSearch::new(evaluator, self.mcts_config(), self.rng()))
            }
        }
    }
}

/// Anything that can choose a move for a position.
pub trait MoveSelector: Send {
    /// Choose a move for `color`, or `None` if `color` must pass.
    fn select_move(&mut self, board: &Board, color: Color) -> Option<Move>;
}

impl MoveSelector for AlphaBetaSearch {
    fn select_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        self.get_move(board, color)
    }
}

impl MoveSelector for MctsSearch {
    fn select_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        self.get_move(board, color)
    }
}

/// Build a search from `config` and run it once.
pub fn select_move(board: &Board, color: Color, config: &SearchConfig) -> Option<Move> {
    config.build().select_move(board, color)
}
