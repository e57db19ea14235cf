//! Monte Carlo Tree Search (MCTS) implementation.
//!
//! Each iteration runs the usual four phases:
//! - Selection: descend by UCT while a node is fully expanded
//! - Expansion: add one random untried move as a new child
//! - Simulation: play a few plies with the rollout policy
//! - Backpropagation: squash the evaluator's score with `tanh` and add it
//!   to every node on the path
//!
//! The tree is an arena of [`SearchNode`]s addressed by index. Parent links
//! are indices as well, so the tree has a single owner and no cycles. It is
//! rebuilt for every decision.

use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::alphabeta::AlphaBetaSearch;
use crate::board::{Board, Color, Move};
use crate::constants::{N_ITERATIONS, ROLLOUT_DEPTH, STATIC_TABLE_NORMALIZATION, UCT_C};
use crate::eval::Evaluator;
use crate::playout::rollout;
use crate::rules::{legal_moves, play_move};

/// How moves are chosen during the simulation phase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolloutPolicy {
    /// Uniformly random legal moves
    #[default]
    Random,
    /// Moves picked by an alpha-beta search of the given depth
    AlphaBeta { depth: i32 },
}

/// Tunable MCTS parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MctsConfig {
    pub iterations: usize,
    pub rollout_depth: usize,
    /// UCT exploration constant `C`
    pub exploration: f64,
    /// Divisor applied to evaluator scores before `tanh`
    pub normalization: f64,
    pub rollout: RolloutPolicy,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: N_ITERATIONS,
            rollout_depth: ROLLOUT_DEPTH,
            exploration: UCT_C,
            normalization: STATIC_TABLE_NORMALIZATION,
            rollout: RolloutPolicy::Random,
        }
    }
}

/// A node in the search tree.
pub struct SearchNode {
    /// Position after `mv` was played
    pub board: Board,
    /// Move that led here from the parent (`None` for the root)
    pub mv: Option<Move>,
    /// Index of the parent node (`None` for the root)
    pub parent: Option<usize>,
    /// Indices of expanded children
    pub children: Vec<usize>,
    pub visits: u32,
    /// Sum of backpropagated results
    pub total: f64,
    /// Legal moves from this position not yet expanded
    pub untried: Vec<Move>,
}

impl SearchNode {
    fn new(board: Board, mv: Option<Move>, parent: Option<usize>) -> Self {
        let untried = legal_moves(&board, board.current_player);
        Self {
            board,
            mv,
            parent,
            children: Vec::new(),
            visits: 0,
            total: 0.0,
            untried,
        }
    }

    /// Average backpropagated result, 0.0 for unvisited nodes.
    pub fn value(&self) -> f64 {
        if self.visits > 0 {
            self.total / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Arena holding every node built during one search. Index 0 is the root.
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    const ROOT: usize = 0;

    fn new(board: Board) -> Self {
        Self {
            nodes: vec![SearchNode::new(board, None, None)],
        }
    }

    pub fn root(&self) -> &SearchNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, idx: usize) -> &SearchNode {
        &self.nodes[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root's children, in expansion order.
    pub fn root_children(&self) -> impl Iterator<Item = &SearchNode> {
        self.root().children.iter().map(|&i| &self.nodes[i])
    }

    /// Most visited root child's move, or `None` if the root had no moves.
    pub fn best_move(&self) -> Option<Move> {
        self.root_children().max_by_key(|c| c.visits).and_then(|c| c.mv)
    }

    fn add_child(&mut self, parent: usize, mv: Move, board: Board) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(SearchNode::new(board, Some(mv), Some(parent)));
        self.nodes[parent].children.push(idx);
        idx
    }

    /// Child of `parent` with the highest UCT score.
    ///
    /// An unvisited child is returned immediately. Child averages are read
    /// as stored by [`backpropagate`](Self::backpropagate), so for children
    /// of the root (where the opponent is to move) a higher average means a
    /// worse position for the root player. Selection and the most-visited
    /// final choice therefore lean towards moves that favour the opponent.
    fn select_child(&self, parent: usize, exploration: f64) -> usize {
        let node = &self.nodes[parent];
        if let Some(&unvisited) = node.children.iter().find(|&&c| self.nodes[c].visits == 0) {
            return unvisited;
        }

        let log_visits = (node.visits as f64).ln();
        let uct = |c: usize| {
            let child = &self.nodes[c];
            let n = child.visits as f64;
            child.total / n + exploration * (log_visits / n).sqrt()
        };
        node.children
            .iter()
            .copied()
            .max_by(|&a, &b| uct(a).partial_cmp(&uct(b)).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(node.children[0])
    }

    /// Add `result` to every node from `leaf` up to the root.
    ///
    /// The result is negated at nodes where the side to move is not `root`.
    fn backpropagate(&mut self, leaf: usize, result: f64, root: Color) {
        let mut cur = Some(leaf);
        while let Some(idx) = cur {
            let node = &mut self.nodes[idx];
            node.visits += 1;
            node.total += if node.board.current_player == root {
                result
            } else {
                -result
            };
            cur = node.parent;
        }
    }
}

pub struct MctsSearch {
    evaluator: Arc<dyn Evaluator>,
    config: MctsConfig,
    rng: fastrand::Rng,
    rollout_search: Option<AlphaBetaSearch>,
}

impl MctsSearch {
    pub fn new(evaluator: Arc<dyn Evaluator>, config: MctsConfig, rng: fastrand::Rng) -> Self {
        let rollout_search = match config.rollout {
            RolloutPolicy::Random => None,
            RolloutPolicy::AlphaBeta { depth } => {
                Some(AlphaBetaSearch::new(Arc::clone(&evaluator), depth))
            }
        };
        Self {
            evaluator,
            config,
            rng,
            rollout_search,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Pick a move for `color`, or `None` if `color` must pass.
    pub fn get_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        self.search(board, color).best_move()
    }

    /// Run the configured number of iterations and return the tree.
    pub fn search(&mut self, board: &Board, color: Color) -> SearchTree {
        let mut root_board = board.clone();
        root_board.current_player = color;
        let mut tree = SearchTree::new(root_board);

        if tree.root().untried.is_empty() {
            debug!("mcts: {color} has no legal moves");
            return tree;
        }

        for _ in 0..self.config.iterations {
            let mut node = SearchTree::ROOT;
            let mut state = tree.root().board.clone();

            // Selection
            while tree.node(node).untried.is_empty() && !tree.node(node).children.is_empty() {
                node = tree.select_child(node, self.config.exploration);
                if let Some(mv) = tree.node(node).mv {
                    play_move(&mut state, mv);
                }
            }

            // Expansion
            if !tree.node(node).untried.is_empty() {
                let untried = &mut tree.nodes[node].untried;
                let pick = self.rng.usize(..untried.len());
                let mv = untried.swap_remove(pick);
                play_move(&mut state, mv);
                node = tree.add_child(node, mv, state.clone());
            }

            // Simulation
            let placed = rollout(
                &mut state,
                self.config.rollout_depth,
                &mut self.rng,
                self.rollout_search.as_mut(),
            );

            // Backpropagation
            let score = self.evaluator.evaluate(&state, color) as f64;
            let result = (score / self.config.normalization).tanh();
            trace!("mcts: leaf {node} +{placed} plies, score {score} result {result:.3}");
            tree.backpropagate(node, result, color);
        }

        for child in tree.root_children() {
            if let Some(mv) = child.mv {
                debug!(
                    "mcts {color} {mv}: visits={} value={:.3}",
                    child.visits,
                    child.value()
                );
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::N;
    use crate::eval::{EvaluatorKind, StaticTable};

    fn mcts(iterations: usize, seed: u64) -> MctsSearch {
        let config = MctsConfig {
            iterations,
            ..MctsConfig::default()
        };
        MctsSearch::new(Arc::new(StaticTable), config, fastrand::Rng::with_seed(seed))
    }

    #[test]
    fn test_no_moves_creates_no_children() {
        let mut board = Board::empty(Color::Black);
        board.set(Move::new(0, 0), Some(Color::White));
        board.set(Move::new(0, 1), Some(Color::Black));

        let tree = mcts(50, 1).search(&board, Color::Black);
        assert_eq!(tree.len(), 1);
        assert!(tree.root().children.is_empty());
        assert_eq!(tree.best_move(), None);
    }

    #[test]
    fn test_root_visits_match_iterations() {
        let board = Board::new();
        let tree = mcts(200, 7).search(&board, Color::Black);
        assert_eq!(tree.root().visits, 200);
        let child_visits: u32 = tree.root_children().map(|c| c.visits).sum();
        assert_eq!(child_visits, 200);
        // All four opening moves get expanded
        assert_eq!(tree.root().children.len(), 4);
        assert!(tree.root().untried.is_empty());
    }

    #[test]
    fn test_move_is_legal_and_reproducible() {
        let board = Board::new();
        let legal = legal_moves(&board, Color::Black);
        let first = mcts(150, 42).get_move(&board, Color::Black).unwrap();
        assert!(legal.contains(&first));
        for _ in 0..3 {
            assert_eq!(mcts(150, 42).get_move(&board, Color::Black), Some(first));
        }
    }

    #[test]
    fn test_parent_links() {
        let tree = mcts(100, 3).search(&Board::new(), Color::Black);
        for idx in 1..tree.len() {
            let parent = tree.node(idx).parent.unwrap();
            assert!(parent < idx);
            assert!(tree.node(parent).children.contains(&idx));
        }
        assert!(tree.root().parent.is_none());
    }

    #[test]
    fn test_alpha_beta_rollout() {
        let config = MctsConfig {
            iterations: 30,
            rollout_depth: 3,
            normalization: EvaluatorKind::PhaseAware.normalization(),
            rollout: RolloutPolicy::AlphaBeta { depth: 1 },
            ..MctsConfig::default()
        };
        let mut search = MctsSearch::new(
            EvaluatorKind::PhaseAware.build(),
            config,
            fastrand::Rng::with_seed(5),
        );
        let board = Board::new();
        let mv = search.get_move(&board, Color::Black).unwrap();
        assert!(legal_moves(&board, Color::Black).contains(&mv));
    }

    #[test]
    fn test_values_stay_bounded() {
        let tree = mcts(100, 11).search(&Board::new(), Color::Black);
        for child in tree.root_children() {
            assert!(child.value().abs() <= 1.0);
        }
    }

    #[test]
    fn test_backpropagate_flips_sign_by_side_to_move() {
        let mut board = Board::new();
        let mut tree = SearchTree::new(board.clone());

        play_move(&mut board, Move::new(2, 3));
        let child = tree.add_child(SearchTree::ROOT, Move::new(2, 3), board.clone());
        play_move(&mut board, Move::new(2, 2));
        let grandchild = tree.add_child(child, Move::new(2, 2), board);

        tree.backpropagate(grandchild, 0.5, Color::Black);
        assert_eq!(tree.root().total, 0.5);
        assert_eq!(tree.node(child).total, -0.5);
        assert_eq!(tree.node(grandchild).total, 0.5);
        for idx in [SearchTree::ROOT, child, grandchild] {
            assert_eq!(tree.node(idx).visits, 1);
        }

        // A leaf one level down only touches itself and the root
        tree.backpropagate(child, 0.25, Color::Black);
        assert_eq!(tree.root().total, 0.75);
        assert_eq!(tree.node(child).total, -0.75);
        assert_eq!(tree.node(child).visits, 2);
        assert_eq!(tree.node(grandchild).visits, 1);
    }

    #[test]
    fn test_root_children_store_opponent_view() {
        // Black owns every edge square; each black move captures the only
        // white stone and ends the game far ahead for Black
        let mut board = Board::empty(Color::Black);
        for i in 0..N {
            for mv in [Move::new(0, i), Move::new(N - 1, i), Move::new(i, 0), Move::new(i, N - 1)] {
                board.set(mv, Some(Color::Black));
            }
        }
        board.set(Move::new(1, 2), Some(Color::White));
        assert_eq!(
            legal_moves(&board, Color::Black),
            vec![Move::new(2, 1), Move::new(2, 2), Move::new(2, 3)]
        );

        let tree = mcts(30, 9).search(&board, Color::Black);
        assert_eq!(tree.root().children.len(), 3);
        assert!(tree.root().value() > 0.9);
        for child in tree.root_children() {
            assert_eq!(child.board.current_player, Color::White);
            assert!(child.value() < -0.9, "{:?}: {}", child.mv, child.value());
        }
    }
}
