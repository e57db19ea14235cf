//! Short playouts (rollouts) for MCTS leaf estimation.
//!
//! A playout continues the game from a leaf for a fixed number of plies.
//! Moves are uniformly random unless an alpha-beta search is supplied to
//! pick them. A side with no legal move passes, and the playout stops early
//! once the game is over.

use crate::alphabeta::AlphaBetaSearch;
use crate::board::Board;
use crate::rules::{is_terminal, legal_moves, pass_move, play_move};

/// Play up to `plies` plies on `state`. Returns the number of stones placed.
pub fn rollout(
    state: &mut Board,
    plies: usize,
    rng: &mut fastrand::Rng,
    mut guide: Option<&mut AlphaBetaSearch>,
) -> usize {
    let mut placed = 0;
    for _ in 0..plies {
        if is_terminal(state) {
            break;
        }
        let to_move = state.current_player;
        let moves = legal_moves(state, to_move);
        if moves.is_empty() {
            pass_move(state);
            continue;
        }
        let mv = guide
            .as_deref_mut()
            .and_then(|search| search.get_move(state, to_move))
            .unwrap_or_else(|| moves[rng.usize(..moves.len())]);
        play_move(state, mv);
        placed += 1;
    }
    placed
}
