//! Line-oriented command session.
//!
//! A session holds one game (board and player to move) between commands and
//! hands engine searches to a [`MoveExecutor`]. The wire format follows the
//! GTP conventions: an optional numeric id, a command word, arguments, and a
//! reply of `=id result` on success or `?id message` on failure, followed by
//! a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `clear_board` - Start a new game
//! - `showboard` - Print the board as text
//! - `board` - Board, player to move, stone counts and game state as JSON
//! - `setboard <json>` - Load `{"board": [[...]], "current_player": 1}`
//! - `legal_moves` - Legal moves for the side to move as JSON pairs
//! - `play <row> <col>` / `play pass` - Play a move for the side to move
//! - `genmove` - Search and play a move for the side to move
//! - `think` - Start a search in the background and return its job id
//! - `result <id>` - `pending`, or play the finished job's move
//! - `score` - Stone counts as `<black> <white>`
//!
//! Engine moves are answered as `<row> <col>`. When the engine's move leaves
//! the other side without a legal move, that side passes automatically and
//! the reply ends with `pass`.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::board::{Board, BoardError, BoardSnapshot, Move};
use crate::constants::N;
use crate::executor::{ExecutorError, JobId, JobState, MoveExecutor};
use crate::rules::{
    Outcome, is_legal, is_terminal, legal_moves, pass_move, play_move, score, winner,
};
use crate::search::SearchConfig;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "board",
    "clear_board",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "quit",
    "result",
    "score",
    "setboard",
    "showboard",
    "think",
    "version",
];

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("missing argument")]
    MissingArgument,
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("illegal move: {0}")]
    IllegalMove(Move),
    #[error("cannot pass while a legal move exists")]
    IllegalPass,
    #[error("game is over")]
    GameOver,
    #[error("invalid job id: {0}")]
    InvalidJob(String),
    #[error("job {0} was started on a different position")]
    StaleJob(JobId),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("invalid board json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Reply to the `board` command.
#[derive(Serialize)]
struct BoardStatus {
    #[serde(flatten)]
    snapshot: BoardSnapshot,
    black: usize,
    white: usize,
    game_over: bool,
    /// 1 or -1 for a win, 0 for a draw, absent while the game is running
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<i8>,
}

/// One game in progress plus the worker that searches for it.
pub struct Session {
    board: Board,
    executor: MoveExecutor,
    /// Position each `think` job was started on
    jobs: HashMap<JobId, Board>,
}

impl Session {
    /// Start a session on the opening position.
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        Ok(Self::with_executor(MoveExecutor::spawn(config)?))
    }

    pub fn with_executor(executor: MoveExecutor) -> Self {
        Self {
            board: Board::new(),
            executor,
            jobs: HashMap::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            match self.execute(&command, args) {
                Ok(message) => writeln!(output, "={id_str} {message}\n")?,
                Err(e) => {
                    warn!("session: {command} failed: {e}");
                    writeln!(output, "?{id_str} {e}\n")?;
                }
            }
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn parse_index(arg: &str) -> Result<usize, SessionError> {
        match arg.parse::<usize>() {
            Ok(i) if i < N => Ok(i),
            _ => Err(SessionError::InvalidCoordinate(arg.to_string())),
        }
    }

    /// Execute one command and return its reply text.
    fn execute(&mut self, command: &str, args: &[&str]) -> Result<String, SessionError> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let cmd = args.first().ok_or(SessionError::MissingArgument)?;
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "clear_board" => {
                self.board = Board::new();
                self.drop_jobs();
                info!("session: new game");
                Ok(String::new())
            }

            "showboard" => Ok(format!("\n{}", self.board)),

            "board" => {
                let (black, white) = score(&self.board);
                let game_over = is_terminal(&self.board);
                let status = BoardStatus {
                    snapshot: BoardSnapshot::from(&self.board),
                    black,
                    white,
                    game_over,
                    winner: game_over.then(|| match winner(&self.board) {
                        Outcome::Winner(color) => color.to_i8(),
                        Outcome::Draw => 0,
                    }),
                };
                Ok(serde_json::to_string(&status)?)
            }

            "setboard" => {
                if args.is_empty() {
                    return Err(SessionError::MissingArgument);
                }
                let snapshot: BoardSnapshot = serde_json::from_str(&args.join(" "))?;
                self.board = Board::try_from(snapshot)?;
                self.drop_jobs();
                Ok(String::new())
            }

            "legal_moves" => {
                let moves = if is_terminal(&self.board) {
                    Vec::new()
                } else {
                    legal_moves(&self.board, self.board.current_player)
                };
                Ok(serde_json::to_string(&moves)?)
            }

            "play" => {
                let first = args.first().ok_or(SessionError::MissingArgument)?;
                if first.eq_ignore_ascii_case("pass") {
                    if !legal_moves(&self.board, self.board.current_player).is_empty() {
                        return Err(SessionError::IllegalPass);
                    }
                    pass_move(&mut self.board);
                    return Ok(String::new());
                }

                let second = args.get(1).ok_or(SessionError::MissingArgument)?;
                let mv = Move::new(Self::parse_index(first)?, Self::parse_index(second)?);
                if !is_legal(&self.board, mv, self.board.current_player) {
                    return Err(SessionError::IllegalMove(mv));
                }
                play_move(&mut self.board, mv);
                Ok(String::new())
            }

            "genmove" => {
                if let Some(reply) = self.pass_if_stuck()? {
                    return Ok(reply);
                }
                let id = self.executor.submit(&self.board, self.board.current_player)?;
                let mv = self.executor.wait(id)?;
                self.play_engine_move(mv)
            }

            "think" => {
                if let Some(reply) = self.pass_if_stuck()? {
                    return Ok(reply);
                }
                let id = self.executor.submit(&self.board, self.board.current_player)?;
                self.jobs.insert(id, self.board.clone());
                Ok(id.to_string())
            }

            "result" => {
                let arg = args.first().ok_or(SessionError::MissingArgument)?;
                let id: JobId = arg
                    .parse()
                    .map_err(|_| SessionError::InvalidJob(arg.to_string()))?;
                match self.executor.poll(id)? {
                    JobState::Pending => Ok("pending".to_string()),
                    JobState::Done(mv) => {
                        if self.jobs.remove(&id).as_ref() != Some(&self.board) {
                            return Err(SessionError::StaleJob(id));
                        }
                        self.play_engine_move(mv)
                    }
                }
            }

            "score" => {
                let (black, white) = score(&self.board);
                Ok(format!("{black} {white}"))
            }

            _ => Err(SessionError::UnknownCommand(command.to_string())),
        }
    }

    /// Forget background searches started on an earlier position.
    fn drop_jobs(&mut self) {
        self.executor.discard_all();
        self.jobs.clear();
    }

    /// Pass for the side to move if it has nothing to play.
    fn pass_if_stuck(&mut self) -> Result<Option<String>, SessionError> {
        if is_terminal(&self.board) {
            return Err(SessionError::GameOver);
        }
        if legal_moves(&self.board, self.board.current_player).is_empty() {
            pass_move(&mut self.board);
            return Ok(Some("pass".to_string()));
        }
        Ok(None)
    }

    /// Play a move returned by the search, then pass for the opponent if the
    /// move left them without a reply.
    fn play_engine_move(&mut self, mv: Option<Move>) -> Result<String, SessionError> {
        let Some(mv) = mv else {
            pass_move(&mut self.board);
            return Ok("pass".to_string());
        };
        if !is_legal(&self.board, mv, self.board.current_player) {
            return Err(SessionError::IllegalMove(mv));
        }
        play_move(&mut self.board, mv);

        if !is_terminal(&self.board)
            && legal_moves(&self.board, self.board.current_player).is_empty()
        {
            pass_move(&mut self.board);
            return Ok(format!("{mv} pass"));
        }
        Ok(mv.to_string())
    }
}
