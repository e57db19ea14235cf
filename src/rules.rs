//! Othello move rules.
//!
//! A move is legal when at least one ray from the played cell runs over an
//! unbroken line of opponent stones and ends on one of the mover's own
//! stones. Playing the move flips every such line.
//!
//! None of these functions keep state; they read or update a [`Board`].

use crate::board::{Board, Color, Move};
use crate::constants::{DIRECTIONS, N};

/// Final result of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}

/// Step one cell from `mv` in direction `(dr, dc)`, or `None` at the edge.
#[inline]
fn step(mv: Move, (dr, dc): (isize, isize)) -> Option<Move> {
    let row = mv.row.checked_add_signed(dr)?;
    let col = mv.col.checked_add_signed(dc)?;
    (row < N && col < N).then(|| Move::new(row, col))
}

/// Number of opponent stones `color` would flip along one ray from `mv`.
///
/// Returns 0 if the ray is not closed by one of `color`'s stones.
fn ray_flips(board: &Board, mv: Move, dir: (isize, isize), color: Color) -> usize {
    let opponent = Some(color.opponent());
    let mut run = 0;
    let mut cur = step(mv, dir);
    while let Some(pt) = cur {
        match board.get(pt) {
            c if c == opponent => run += 1,
            Some(_) => return run,
            None => return 0,
        }
        cur = step(pt, dir);
    }
    0
}

/// Check if `color` may play at `mv`.
pub fn is_legal(board: &Board, mv: Move, color: Color) -> bool {
    board.get(mv).is_none()
        && DIRECTIONS
            .iter()
            .any(|&dir| ray_flips(board, mv, dir, color) > 0)
}

/// All legal moves for `color`, in row-major order.
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    board
        .cells()
        .filter(|&(mv, cell)| cell.is_none() && is_legal(board, mv, color))
        .map(|(mv, _)| mv)
        .collect()
}

/// Number of legal moves available to `color`.
pub fn mobility(board: &Board, color: Color) -> usize {
    board
        .cells()
        .filter(|&(mv, cell)| cell.is_none() && is_legal(board, mv, color))
        .count()
}

fn has_legal_move(board: &Board, color: Color) -> bool {
    board
        .cells()
        .any(|(mv, cell)| cell.is_none() && is_legal(board, mv, color))
}

/// Place a `color` stone at `mv` and flip every enclosed opponent line.
///
/// Returns the number of stones flipped. The turn is left unchanged.
///
/// The caller must have checked that `mv` is in [`legal_moves`]; an illegal
/// move is not detected and leaves the board in an inconsistent state.
pub fn apply_move(board: &mut Board, mv: Move, color: Color) -> usize {
    board.set(mv, Some(color));
    let mut flipped = 0;
    for dir in DIRECTIONS {
        let run = ray_flips(board, mv, dir, color);
        let mut pt = mv;
        for _ in 0..run {
            // ray_flips guarantees `run` on-board cells in this direction
            if let Some(next) = step(pt, dir) {
                board.set(next, Some(color));
                pt = next;
            }
        }
        flipped += run;
    }
    flipped
}

/// Play `mv` for the side to move and hand the turn to the opponent.
pub fn play_move(board: &mut Board, mv: Move) -> usize {
    let flipped = apply_move(board, mv, board.current_player);
    board.toggle_turn();
    flipped
}

/// Pass the turn without placing a stone.
pub fn pass_move(board: &mut Board) {
    board.toggle_turn();
}

/// The game is over once neither side can move.
pub fn is_terminal(board: &Board) -> bool {
    !has_legal_move(board, Color::Black) && !has_legal_move(board, Color::White)
}

/// Stone counts as `(black, white)`.
pub fn score(board: &Board) -> (usize, usize) {
    (board.count(Color::Black), board.count(Color::White))
}

/// Winner by stone count. Meaningful once [`is_terminal`] holds.
pub fn winner(board: &Board) -> Outcome {
    let (black, white) = score(board);
    match black.cmp(&white) {
        std::cmp::Ordering::Greater => Outcome::Winner(Color::Black),
        std::cmp::Ordering::Less => Outcome::Winner(Color::White),
        std::cmp::Ordering::Equal => Outcome::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_legal_moves() {
        let board = Board::new();
        let moves = legal_moves(&board, Color::Black);
        assert_eq!(
            moves,
            vec![
                Move::new(2, 3),
                Move::new(3, 2),
                Move::new(4, 5),
                Move::new(5, 4)
            ]
        );
        assert_eq!(legal_moves(&board, Color::White).len(), 4);
        assert_eq!(mobility(&board, Color::Black), 4);
    }

    #[test]
    fn test_apply_flips_one() {
        let mut board = Board::new();
        let flipped = apply_move(&mut board, Move::new(2, 3), Color::Black);
        assert_eq!(flipped, 1);
        assert_eq!(board.get(Move::new(3, 3)), Some(Color::Black));
        assert_eq!(score(&board), (4, 1));
        assert_eq!(board.current_player, Color::Black, "turn is unchanged");
    }

    #[test]
    fn test_play_move_toggles_turn() {
        let mut board = Board::new();
        play_move(&mut board, Move::new(2, 3));
        assert_eq!(board.current_player, Color::White);
        pass_move(&mut board);
        assert_eq!(board.current_player, Color::Black);
    }

    #[test]
    fn test_multi_direction_flip() {
        // Black plays (0,0) closing a row and a diagonal at once
        let mut board = Board::empty(Color::Black);
        board.set(Move::new(0, 1), Some(Color::White));
        board.set(Move::new(0, 2), Some(Color::White));
        board.set(Move::new(0, 3), Some(Color::Black));
        board.set(Move::new(1, 1), Some(Color::White));
        board.set(Move::new(2, 2), Some(Color::Black));
        board.set(Move::new(1, 0), Some(Color::White));

        assert!(is_legal(&board, Move::new(0, 0), Color::Black));
        let flipped = apply_move(&mut board, Move::new(0, 0), Color::Black);
        assert_eq!(flipped, 3);
        assert_eq!(board.get(Move::new(1, 0)), Some(Color::White), "open ray");
        assert_eq!(score(&board), (6, 1));
    }

    #[test]
    fn test_run_ending_in_empty_is_not_legal() {
        let mut board = Board::empty(Color::Black);
        board.set(Move::new(0, 1), Some(Color::White));
        board.set(Move::new(0, 2), Some(Color::White));
        assert!(!is_legal(&board, Move::new(0, 0), Color::Black));
        assert!(legal_moves(&board, Color::Black).is_empty());
    }

    #[test]
    fn test_occupied_cell_is_not_legal() {
        let board = Board::new();
        assert!(!is_legal(&board, Move::new(3, 3), Color::Black));
    }

    #[test]
    fn test_terminal_and_winner() {
        let mut board = Board::empty(Color::Black);
        board.set(Move::new(0, 0), Some(Color::Black));
        board.set(Move::new(7, 7), Some(Color::Black));
        board.set(Move::new(4, 4), Some(Color::White));
        assert!(is_terminal(&board));
        assert_eq!(winner(&board), Outcome::Winner(Color::Black));

        board.set(Move::new(7, 7), None);
        assert_eq!(winner(&board), Outcome::Draw);

        assert!(!is_terminal(&Board::new()));
    }
}
