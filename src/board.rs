//! Othello board state.
//!
//! The board is a flat row-major array of 64 cells, each either empty or
//! holding a stone of one [`Color`], plus the color whose turn it is.
//! Move legality and flipping live in [`rules`](crate::rules); this module
//! only owns the data and its serialized form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BOARDSIZE, N};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Wire value: +1 for Black, -1 for White.
    pub fn to_i8(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }

    pub fn from_i8(value: i8) -> Option<Color> {
        match value {
            1 => Some(Color::Black),
            -1 => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A board coordinate, 0-indexed from the top-left corner.
///
/// Serializes as the pair `[row, col]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < N && col < N, "move ({row}, {col}) is off the board");
        Self { row, col }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.row * N + self.col
    }
}

impl TryFrom<(usize, usize)> for Move {
    type Error = BoardError;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        if row < N && col < N {
            Ok(Move { row, col })
        } else {
            Err(BoardError::OffBoard { row, col })
        }
    }
}

impl From<Move> for (usize, usize) {
    fn from(mv: Move) -> Self {
        (mv.row, mv.col)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.row, self.col)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have 8 rows, got {0}")]
    RowCount(usize),
    #[error("row {row} must have 8 cells, got {len}")]
    RowLength { row: usize, len: usize },
    #[error("cell ({row}, {col}) holds {value}, expected -1, 0 or 1")]
    CellValue { row: usize, col: usize, value: i8 },
    #[error("current player must be -1 or 1, got {0}")]
    Player(i8),
    #[error("move ({row}, {col}) is off the board")]
    OffBoard { row: usize, col: usize },
}

/// An Othello position: stones plus the color to move.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Color>; BOARDSIZE],
    /// Color whose turn it is
    pub current_player: Color,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard opening position, Black to move.
    pub fn new() -> Self {
        let mut board = Self::empty(Color::Black);
        let mid = N / 2;
        board.set(Move::new(mid - 1, mid - 1), Some(Color::White));
        board.set(Move::new(mid, mid), Some(Color::White));
        board.set(Move::new(mid - 1, mid), Some(Color::Black));
        board.set(Move::new(mid, mid - 1), Some(Color::Black));
        board
    }

    /// A board with no stones. Useful for setting up test positions.
    pub fn empty(current_player: Color) -> Self {
        Self {
            cells: [None; BOARDSIZE],
            current_player,
        }
    }

    #[inline]
    pub fn get(&self, mv: Move) -> Option<Color> {
        self.cells[mv.index()]
    }

    #[inline]
    pub fn set(&mut self, mv: Move, cell: Option<Color>) {
        self.cells[mv.index()] = cell;
    }

    pub fn toggle_turn(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    /// Number of stones of `color` on the board.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| **c == Some(color)).count()
    }

    /// Total number of occupied cells.
    pub fn stones(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over every cell as `(move, contents)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Move, Option<Color>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (Move::new(i / N, i % N), *c))
    }

    /// Row-major grid of wire values (-1, 0, 1).
    pub fn to_rows(&self) -> Vec<Vec<i8>> {
        self.cells
            .chunks(N)
            .map(|row| row.iter().map(|c| c.map_or(0, Color::to_i8)).collect())
            .collect()
    }

    /// Build a board from a row-major grid of wire values.
    pub fn from_rows(rows: &[Vec<i8>], current_player: Color) -> Result<Self, BoardError> {
        if rows.len() != N {
            return Err(BoardError::RowCount(rows.len()));
        }
        let mut board = Self::empty(current_player);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != N {
                return Err(BoardError::RowLength {
                    row,
                    len: cells.len(),
                });
            }
            for (col, &value) in cells.iter().enumerate() {
                let cell = match value {
                    0 => None,
                    v => Some(
                        Color::from_i8(v).ok_or(BoardError::CellValue { row, col, value })?,
                    ),
                };
                board.set(Move::new(row, col), cell);
            }
        }
        Ok(board)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(to move: {})\n{self}", self.current_player)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..N {
            write!(f, " {col}")?;
        }
        writeln!(f)?;
        for (row, cells) in self.cells.chunks(N).enumerate() {
            write!(f, "{row}")?;
            for cell in cells {
                let ch = match cell {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialized board: row-major grid of -1/0/1 plus the player to move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Vec<Vec<i8>>,
    pub current_player: i8,
}

impl From<&Board> for BoardSnapshot {
    fn from(board: &Board) -> Self {
        Self {
            board: board.to_rows(),
            current_player: board.current_player.to_i8(),
        }
    }
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = BoardError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        let player = Color::from_i8(snapshot.current_player)
            .ok_or(BoardError::Player(snapshot.current_player))?;
        Board::from_rows(&snapshot.board, player)
    }
}
