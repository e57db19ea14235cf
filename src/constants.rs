//! Constants for board geometry, evaluation weights, and search parameters.
//!
//! Everything tunable about the engine lives here so the search modules stay
//! free of magic numbers. Runtime overrides go through
//! [`SearchConfig`](crate::search::SearchConfig).

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Othello is always played on 8x8.
pub const N: usize = 8;

/// Number of cells on the board.
pub const BOARDSIZE: usize = N * N;

/// Stones on the board before the first move.
pub const INITIAL_STONES: usize = 4;

/// Ray directions as (row, col) steps.
/// Order: NW, N, NE, W, E, SW, S, SE
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// =============================================================================
// Alpha-Beta Parameters
// =============================================================================

/// Default search depth in plies.
pub const DEFAULT_DEPTH: i32 = 4;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of iterations per move.
pub const N_ITERATIONS: usize = 100;

/// Default number of random plies played after expansion.
pub const ROLLOUT_DEPTH: usize = 5;

/// UCT exploration constant (approximately sqrt(2)).
pub const UCT_C: f64 = 1.414;

/// Normalization for the static table before `tanh` squashing.
pub const STATIC_TABLE_NORMALIZATION: f64 = 200.0;

/// Normalization for the phase-aware evaluator before `tanh` squashing.
/// Its mobility terms push scores an order of magnitude past the static table.
pub const PHASE_AWARE_NORMALIZATION: f64 = 1000.0;

// =============================================================================
// Evaluation Weights
// =============================================================================

/// Fixed positional weights: corners highest, X- and C-squares negative.
pub const STATIC_WEIGHTS: [[i32; N]; N] = [
    [120, -20, 20, 5, 5, 20, -20, 120],
    [-20, -40, -5, -5, -5, -5, -40, -20],
    [20, -5, 15, 3, 3, 15, -5, 20],
    [5, -5, 3, 3, 3, 3, -5, 5],
    [5, -5, 3, 3, 3, 3, -5, 5],
    [20, -5, 15, 3, 3, 15, -5, 20],
    [-20, -40, -5, -5, -5, -5, -40, -20],
    [120, -20, 20, 5, 5, 20, -20, 120],
];

/// Opening weights: central squares are worth holding, edges are not yet.
pub const OPENING_WEIGHTS: [[i32; N]; N] = [
    [50, -20, 10, 5, 5, 10, -20, 50],
    [-20, -30, -2, -2, -2, -2, -30, -20],
    [10, -2, 8, 6, 6, 8, -2, 10],
    [5, -2, 6, 10, 10, 6, -2, 5],
    [5, -2, 6, 10, 10, 6, -2, 5],
    [10, -2, 8, 6, 6, 8, -2, 10],
    [-20, -30, -2, -2, -2, -2, -30, -20],
    [50, -20, 10, 5, 5, 10, -20, 50],
];

/// Midgame weights: corners and stable edges dominate.
pub const MIDGAME_WEIGHTS: [[i32; N]; N] = [
    [200, -40, 30, 15, 15, 30, -40, 200],
    [-40, -60, -5, -5, -5, -5, -60, -40],
    [30, -5, 10, 3, 3, 10, -5, 30],
    [15, -5, 3, 0, 0, 3, -5, 15],
    [15, -5, 3, 0, 0, 3, -5, 15],
    [30, -5, 10, 3, 3, 10, -5, 30],
    [-40, -60, -5, -5, -5, -5, -60, -40],
    [200, -40, 30, 15, 15, 30, -40, 200],
];

/// Endgame weights: every stone counts the same.
pub const ENDGAME_WEIGHTS: [[i32; N]; N] = [[1; N]; N];

/// Stones on the board above which the position is a midgame.
pub const MIDGAME_STONES: usize = 20;

/// Stones on the board above which the position is an endgame.
pub const ENDGAME_STONES: usize = 44;

/// Mobility multipliers per phase.
pub const OPENING_MOBILITY: i32 = 15;
pub const MIDGAME_MOBILITY: i32 = 10;
pub const ENDGAME_MOBILITY: i32 = 50;
