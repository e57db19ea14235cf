//! Position evaluation.
//!
//! Both searches score leaf positions through the [`Evaluator`] trait, so the
//! scoring strategy is chosen once at construction time:
//!
//! - [`StaticTable`] - fixed positional weights
//! - [`PhaseAware`] - per-phase weights plus a mobility term

use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Color};
use crate::constants::{
    ENDGAME_MOBILITY, ENDGAME_STONES, ENDGAME_WEIGHTS, MIDGAME_MOBILITY, MIDGAME_STONES,
    MIDGAME_WEIGHTS, N, OPENING_MOBILITY, OPENING_WEIGHTS, PHASE_AWARE_NORMALIZATION,
    STATIC_TABLE_NORMALIZATION, STATIC_WEIGHTS,
};
use crate::rules::mobility;

/// Scores a board from one player's point of view. Higher is better for
/// `color`.
///
/// Implementations hold configuration only, so one instance can be shared
/// between any number of searches.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board, color: Color) -> i32;
}

/// Which [`Evaluator`] to build.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluatorKind {
    #[default]
    StaticTable,
    PhaseAware,
}

impl EvaluatorKind {
    pub fn build(self) -> Arc<dyn Evaluator> {
        match self {
            EvaluatorKind::StaticTable => Arc::new(StaticTable),
            EvaluatorKind::PhaseAware => Arc::new(PhaseAware),
        }
    }

    /// Typical score magnitude, used to squash scores into (-1, 1) in MCTS.
    pub fn normalization(self) -> f64 {
        match self {
            EvaluatorKind::StaticTable => STATIC_TABLE_NORMALIZATION,
            EvaluatorKind::PhaseAware => PHASE_AWARE_NORMALIZATION,
        }
    }
}

/// Sum of `weights` under `color`'s stones minus the sum under the opponent's.
fn weighted_sum(board: &Board, color: Color, weights: &[[i32; N]; N]) -> i32 {
    board
        .cells()
        .map(|(mv, cell)| match cell {
            Some(c) if c == color => weights[mv.row][mv.col],
            Some(_) => -weights[mv.row][mv.col],
            None => 0,
        })
        .sum()
}

/// Fixed positional weights, see [`STATIC_WEIGHTS`].
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticTable;

impl Evaluator for StaticTable {
    fn evaluate(&self, board: &Board, color: Color) -> i32 {
        weighted_sum(board, color, &STATIC_WEIGHTS)
    }
}

/// Game phase, decided by the number of stones on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Midgame,
    Endgame,
}

impl Phase {
    pub fn of(board: &Board) -> Phase {
        let stones = board.stones();
        if stones > ENDGAME_STONES {
            Phase::Endgame
        } else if stones > MIDGAME_STONES {
            Phase::Midgame
        } else {
            Phase::Opening
        }
    }

    fn weights(self) -> &'static [[i32; N]; N] {
        match self {
            Phase::Opening => &OPENING_WEIGHTS,
            Phase::Midgame => &MIDGAME_WEIGHTS,
            Phase::Endgame => &ENDGAME_WEIGHTS,
        }
    }

    fn mobility_weight(self) -> i32 {
        match self {
            Phase::Opening => OPENING_MOBILITY,
            Phase::Midgame => MIDGAME_MOBILITY,
            Phase::Endgame => ENDGAME_MOBILITY,
        }
    }
}

/// Phase-dependent weights plus `k * (own mobility - opponent mobility)`.
///
/// The endgame table is flat, so late in the game the positional part is
/// just the stone differential and mobility dominates.
#[derive(Copy, Clone, Debug, Default)]
pub struct PhaseAware;

impl Evaluator for PhaseAware {
    fn evaluate(&self, board: &Board, color: Color) -> i32 {
        let phase = Phase::of(board);
        let own = mobility(board, color) as i32;
        let theirs = mobility(board, color.opponent()) as i32;
        weighted_sum(board, color, phase.weights()) + phase.mobility_weight() * (own - theirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;
    use crate::rules::{apply_move, play_move};

    #[test]
    fn test_initial_position_is_balanced() {
        let board = Board::new();
        for kind in [EvaluatorKind::StaticTable, EvaluatorKind::PhaseAware] {
            let eval = kind.build();
            assert_eq!(eval.evaluate(&board, Color::Black), 0, "{kind:?}");
            assert_eq!(eval.evaluate(&board, Color::White), 0, "{kind:?}");
        }
    }

    #[test]
    fn test_static_table_is_zero_sum() {
        let mut board = Board::new();
        play_move(&mut board, Move::new(2, 3));
        let black = StaticTable.evaluate(&board, Color::Black);
        assert_eq!(black, -StaticTable.evaluate(&board, Color::White));
        // four black stones and one white stone, all on weight-3 squares
        assert_eq!(black, 4 * 3 - 3);
    }

    #[test]
    fn test_corner_outweighs_x_square() {
        let mut board = Board::empty(Color::Black);
        board.set(Move::new(0, 0), Some(Color::Black));
        board.set(Move::new(1, 1), Some(Color::White));
        assert_eq!(StaticTable.evaluate(&board, Color::Black), 120 + 40);
    }

    #[test]
    fn test_phase_boundaries() {
        let mut board = Board::empty(Color::Black);
        let fill = |n: usize, board: &mut Board| {
            for i in 0..n {
                board.set(Move::new(i / N, i % N), Some(Color::Black));
            }
        };
        fill(20, &mut board);
        assert_eq!(Phase::of(&board), Phase::Opening);
        fill(21, &mut board);
        assert_eq!(Phase::of(&board), Phase::Midgame);
        fill(44, &mut board);
        assert_eq!(Phase::of(&board), Phase::Midgame);
        fill(45, &mut board);
        assert_eq!(Phase::of(&board), Phase::Endgame);
    }

    #[test]
    fn test_endgame_counts_stones_and_mobility() {
        // 45 black stones and an isolated white corner: nobody can move
        let mut board = Board::empty(Color::Black);
        for i in 0..45 {
            board.set(Move::new(i / N, i % N), Some(Color::Black));
        }
        board.set(Move::new(7, 7), Some(Color::White));
        assert_eq!(mobility(&board, Color::Black), 0);
        assert_eq!(mobility(&board, Color::White), 0);
        assert_eq!(PhaseAware.evaluate(&board, Color::Black), 44);
        assert_eq!(PhaseAware.evaluate(&board, Color::White), -44);
    }

    /// Black fills the first `black_rows` rows, White holds the first
    /// `white_cols` cells of the next row.
    fn black_rows_over_white(black_rows: usize, white_cols: usize) -> Board {
        let mut board = Board::empty(Color::Black);
        for i in 0..black_rows * N {
            board.set(Move::new(i / N, i % N), Some(Color::Black));
        }
        for col in 0..white_cols {
            board.set(Move::new(black_rows, col), Some(Color::White));
        }
        board
    }

    #[test]
    fn test_mobility_term_in_midgame() {
        // 28 stones: Black can play under each white stone and diagonally
        // past the last one, White has no move
        let board = black_rows_over_white(3, 4);
        assert_eq!(Phase::of(&board), Phase::Midgame);
        assert_eq!(mobility(&board, Color::Black), 5);
        assert_eq!(mobility(&board, Color::White), 0);

        let positional = weighted_sum(&board, Color::Black, &MIDGAME_WEIGHTS);
        assert_eq!(PhaseAware.evaluate(&board, Color::Black), positional + 10 * 5);
        assert_eq!(PhaseAware.evaluate(&board, Color::White), -positional - 10 * 5);
    }

    #[test]
    fn test_mobility_term_in_endgame() {
        // 46 stones: 40 black, 6 white; Black has 7 moves, White none
        let board = black_rows_over_white(5, 6);
        assert_eq!(Phase::of(&board), Phase::Endgame);
        assert_eq!(mobility(&board, Color::Black), 7);
        assert_eq!(mobility(&board, Color::White), 0);

        assert_eq!(PhaseAware.evaluate(&board, Color::Black), 34 + 50 * 7);
        assert_eq!(PhaseAware.evaluate(&board, Color::White), -34 - 50 * 7);
    }

    #[test]
    fn test_mobility_term_in_opening() {
        let mut board = Board::new();
        apply_move(&mut board, Move::new(2, 3), Color::Black);
        let black_moves = mobility(&board, Color::Black) as i32;
        let white_moves = mobility(&board, Color::White) as i32;
        let positional = weighted_sum(&board, Color::Black, &OPENING_WEIGHTS);
        assert_eq!(
            PhaseAware.evaluate(&board, Color::Black),
            positional + OPENING_MOBILITY * (black_moves - white_moves)
        );
    }

    #[test]
    fn test_default_normalization_differs() {
        assert!(
            EvaluatorKind::PhaseAware.normalization() > EvaluatorKind::StaticTable.normalization()
        );
    }
}
