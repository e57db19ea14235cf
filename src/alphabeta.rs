//! Depth-limited minimax search with alpha-beta pruning.
//!
//! Every node scores positions from the root player's point of view: the
//! root player maximizes, the opponent minimizes. A side with no legal move
//! passes, which flips the role but still spends one ply of depth.

use std::sync::Arc;

use log::debug;

use crate::board::{Board, Color, Move};
use crate::eval::Evaluator;
use crate::rules::{apply_move, is_terminal, legal_moves, pass_move};

pub struct AlphaBetaSearch {
    evaluator: Arc<dyn Evaluator>,
    depth: i32,
    nodes_searched: usize,
}

impl AlphaBetaSearch {
    pub fn new(evaluator: Arc<dyn Evaluator>, depth: i32) -> Self {
        Self {
            evaluator,
            depth,
            nodes_searched: 0,
        }
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Positions visited below the root during the last [`get_move`](Self::get_move).
    pub fn nodes_searched(&self) -> usize {
        self.nodes_searched
    }

    /// Pick the best move for `color`, or `None` if `color` must pass.
    ///
    /// Ties go to the first move in row-major order.
    pub fn get_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        self.nodes_searched = 0;

        let mut best: Option<(Move, i32)> = None;
        for mv in legal_moves(board, color) {
            let mut child = board.clone();
            apply_move(&mut child, mv, color);
            child.current_player = color.opponent();

            let score = self.alpha_beta(&child, self.depth - 1, i32::MIN, i32::MAX, color);
            debug!("alpha-beta {color} {mv}: {score}");

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        debug!(
            "alpha-beta depth {} searched {} nodes",
            self.depth, self.nodes_searched
        );
        best.map(|(mv, _)| mv)
    }

    fn alpha_beta(
        &mut self,
        board: &Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        root: Color,
    ) -> i32 {
        self.nodes_searched += 1;

        if depth <= 0 || is_terminal(board) {
            return self.evaluator.evaluate(board, root);
        }

        let to_move = board.current_player;
        let moves = legal_moves(board, to_move);
        if moves.is_empty() {
            let mut passed = board.clone();
            pass_move(&mut passed);
            return self.alpha_beta(&passed, depth - 1, alpha, beta, root);
        }

        let maximizing = to_move == root;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for mv in moves {
            let mut child = board.clone();
            apply_move(&mut child, mv, to_move);
            child.current_player = to_move.opponent();

            let score = self.alpha_beta(&child, depth - 1, alpha, beta, root);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }
}
