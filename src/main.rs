//! Othello-Search: command-line front end.
//!
//! ## Usage
//!
//! - `othello-search` - Show a demo
//! - `othello-search session` - Run the command session on stdin/stdout
//! - `othello-search move [BOARD]` - Pick a move for a JSON board
//! - `othello-search selfplay` - Play one engine-vs-engine game
//!
//! Search options (`--search`, `--evaluator`, `--depth`, ...) go before the
//! subcommand and override values from `--config`.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use othello_search::board::{Board, BoardSnapshot, Color};
use othello_search::eval::EvaluatorKind;
use othello_search::mcts::RolloutPolicy;
use othello_search::rules::{Outcome, is_terminal, legal_moves, pass_move, play_move, score, winner};
use othello_search::search::{SearchConfig, SearchKind, select_move};
use othello_search::session::Session;

/// Othello-Search: alpha-beta and MCTS Othello engine
#[derive(Parser)]
#[command(name = "othello-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SearchArgs {
    /// JSON file with search settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Search algorithm
    #[arg(long, value_enum)]
    search: Option<SearchKind>,
    /// Position evaluator
    #[arg(long, value_enum)]
    evaluator: Option<EvaluatorKind>,
    /// Alpha-beta depth in plies
    #[arg(long)]
    depth: Option<i32>,
    /// MCTS iterations per move
    #[arg(long)]
    iterations: Option<usize>,
    /// MCTS plies per rollout
    #[arg(long)]
    rollout_depth: Option<usize>,
    /// UCT exploration constant
    #[arg(long)]
    exploration: Option<f64>,
    /// Divisor applied to evaluator scores before tanh
    #[arg(long)]
    normalization: Option<f64>,
    /// Pick MCTS rollout moves with an alpha-beta search of this depth
    #[arg(long)]
    rollout_search_depth: Option<i32>,
    /// Seed for MCTS randomness
    #[arg(long)]
    seed: Option<u64>,
}

impl SearchArgs {
    /// Defaults, then the config file, then command-line flags.
    fn resolve(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::load(path)?,
            None => SearchConfig::default(),
        };
        if let Some(kind) = self.search {
            config.kind = kind;
        }
        if let Some(evaluator) = self.evaluator {
            config.evaluator = evaluator;
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(rollout_depth) = self.rollout_depth {
            config.rollout_depth = rollout_depth;
        }
        if let Some(exploration) = self.exploration {
            config.exploration = exploration;
        }
        if self.normalization.is_some() {
            config.normalization = self.normalization;
        }
        if let Some(depth) = self.rollout_search_depth {
            config.rollout = RolloutPolicy::AlphaBeta { depth };
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the command session on stdin/stdout
    Session,
    /// Read a JSON board and print the chosen move as JSON
    Move {
        /// File holding {"board": [[...]], "current_player": 1}; stdin if omitted
        board: Option<PathBuf>,
    },
    /// Play one full game, engine against engine
    Selfplay {
        /// Search used by White (Black uses --search)
        #[arg(long, value_enum)]
        white: Option<SearchKind>,
    },
    /// Run a simple demo of the engine
    Demo,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.search.resolve()?;
    info!("search config: {config:?}");

    match cli.command {
        Some(Commands::Session) => {
            let mut session = Session::new(&config)?;
            session
                .run(io::stdin().lock(), io::stdout().lock())
                .context("session I/O failed")?;
        }
        Some(Commands::Move { board }) => run_move(&config, board)?,
        Some(Commands::Selfplay { white }) => {
            let white_config = SearchConfig {
                kind: white.unwrap_or(config.kind),
                ..config.clone()
            };
            run_selfplay(&config, &white_config);
        }
        Some(Commands::Demo) | None => run_demo(&config),
    }
    Ok(())
}

fn run_move(config: &SearchConfig, path: Option<PathBuf>) -> Result<()> {
    let text = match path {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read board {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read board from stdin")?;
            text
        }
    };
    let snapshot: BoardSnapshot = serde_json::from_str(&text).context("invalid board json")?;
    let board = Board::try_from(snapshot)?;

    let mv = select_move(&board, board.current_player, config);
    println!("{}", serde_json::json!({ "move": mv }));
    Ok(())
}

fn run_selfplay(black: &SearchConfig, white: &SearchConfig) {
    let mut black_search = black.build();
    let mut white_search = white.build();
    let mut board = Board::new();

    while !is_terminal(&board) {
        let color = board.current_player;
        let search = match color {
            Color::Black => &mut black_search,
            Color::White => &mut white_search,
        };
        match search.select_move(&board, color) {
            Some(mv) => {
                let flipped = play_move(&mut board, mv);
                info!("{color} plays {mv} (flips {flipped})");
            }
            None => {
                info!("{color} passes");
                pass_move(&mut board);
            }
        }
    }

    let (b, w) = score(&board);
    println!("{board}");
    println!("Black {b} - White {w}");
    match winner(&board) {
        Outcome::Winner(color) => println!("Winner: {color}"),
        Outcome::Draw => println!("Draw"),
    }
}

fn run_demo(config: &SearchConfig) {
    println!("Othello-Search: alpha-beta and MCTS Othello engine\n");

    let board = Board::new();
    println!("{board}");
    let moves: Vec<String> = legal_moves(&board, Color::Black)
        .iter()
        .map(|mv| format!("({mv})"))
        .collect();
    println!("Legal moves for black: {}", moves.join(", "));

    for kind in [SearchKind::AlphaBeta, SearchKind::Mcts] {
        let demo = SearchConfig {
            kind,
            ..config.clone()
        };
        match select_move(&board, Color::Black, &demo) {
            Some(mv) => println!("{kind:?} picks ({mv})"),
            None => println!("{kind:?} passes"),
        }
    }
}
