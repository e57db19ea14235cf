//! Othello-Search: an Othello (Reversi) engine.
//!
//! This crate keeps the rules of the game and picks moves with one of two
//! searches, both scoring positions through a pluggable evaluator.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, weight tables and search defaults
//! - [`board`] - Board state, colors, moves and their serialized form
//! - [`rules`] - Move legality, flipping, passing and game end
//! - [`eval`] - Static-table and phase-aware position evaluators
//! - [`alphabeta`] - Depth-limited minimax with alpha-beta pruning
//! - [`mcts`] - Monte Carlo Tree Search
//! - [`playout`] - Short random or guided playouts for MCTS
//! - [`search`] - Search configuration and the `select_move` entry point
//! - [`executor`] - Background worker thread for move searches
//! - [`session`] - Line-oriented command session holding one game
//!
//! ## Example
//!
//! ```
//! use othello_search::board::{Board, Color};
//! use othello_search::rules::{legal_moves, play_move};
//! use othello_search::search::{select_move, SearchConfig};
//!
//! let mut board = Board::new();
//! let config = SearchConfig { seed: Some(1), ..SearchConfig::default() };
//!
//! let mv = select_move(&board, Color::Black, &config).expect("black can move");
//! assert!(legal_moves(&board, Color::Black).contains(&mv));
//! play_move(&mut board, mv);
//! ```

pub mod alphabeta;
pub mod board;
pub mod constants;
pub mod eval;
pub mod executor;
pub mod mcts;
pub mod playout;
pub mod rules;
pub mod search;
pub mod session;
