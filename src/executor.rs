//! Background move worker.
//!
//! A dedicated thread owns one search built from a [`SearchConfig`] and
//! answers move requests one at a time:
//! - Owns: the search (and its evaluator and random source)
//! - Receives: `(job id, board, player)` over a channel
//! - Returns: `(job id, move or pass)` over a second channel
//!
//! Callers submit a job, keep working, and poll or wait for the result.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use anyhow::Context;
use log::{debug, info, warn};
use thiserror::Error;

use crate::board::{Board, Color, Move};
use crate::search::{MoveSelector, SearchConfig};

pub type JobId = u64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("search worker has stopped")]
    WorkerGone,
    #[error("unknown job {0}")]
    UnknownJob(JobId),
}

/// State of a submitted job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    Pending,
    /// Finished; `None` means the player must pass
    Done(Option<Move>),
}

struct MoveRequest {
    id: JobId,
    board: Board,
    player: Color,
}

struct MoveReply {
    id: JobId,
    mv: Option<Move>,
}

/// Handle to the search worker thread.
pub struct MoveExecutor {
    work_tx: Option<Sender<MoveRequest>>,
    result_rx: Receiver<MoveReply>,
    worker: Option<JoinHandle<()>>,
    next_id: JobId,
    pending: Vec<JobId>,
    finished: HashMap<JobId, Option<Move>>,
}

fn run_worker(
    mut search: Box<dyn MoveSelector>,
    work_rx: Receiver<MoveRequest>,
    result_tx: Sender<MoveReply>,
) {
    info!("search worker: thread started");
    while let Ok(request) = work_rx.recv() {
        debug!("search worker: job {} for {}", request.id, request.player);
        let mv = search.select_move(&request.board, request.player);
        if result_tx.send(MoveReply { id: request.id, mv }).is_err() {
            warn!("search worker: result channel closed");
            break;
        }
    }
    info!("search worker: thread stopped");
}

impl MoveExecutor {
    /// Spawn the worker thread.
    pub fn spawn(config: &SearchConfig) -> anyhow::Result<Self> {
        let (work_tx, work_rx) = channel();
        let (result_tx, result_rx) = channel();
        let search = config.build();

        let worker = thread::Builder::new()
            .name("search".to_string())
            .spawn(move || run_worker(search, work_rx, result_tx))
            .context("failed to spawn search thread")?;

        info!("search worker spawned ({:?})", config.kind);
        Ok(Self {
            work_tx: Some(work_tx),
            result_rx,
            worker: Some(worker),
            next_id: 1,
            pending: Vec::new(),
            finished: HashMap::new(),
        })
    }

    /// Queue a search for `player` on a copy of `board`.
    pub fn submit(&mut self, board: &Board, player: Color) -> Result<JobId, ExecutorError> {
        let id = self.next_id;
        let request = MoveRequest {
            id,
            board: board.clone(),
            player,
        };
        self.work_tx
            .as_ref()
            .ok_or(ExecutorError::WorkerGone)?
            .send(request)
            .map_err(|_| ExecutorError::WorkerGone)?;
        self.next_id += 1;
        self.pending.push(id);
        Ok(id)
    }

    /// Record a reply. Replies for discarded jobs are dropped.
    fn store(&mut self, reply: MoveReply) {
        match self.pending.iter().position(|&id| id == reply.id) {
            Some(pos) => {
                self.pending.swap_remove(pos);
                self.finished.insert(reply.id, reply.mv);
            }
            None => debug!("search worker: dropping result of job {}", reply.id),
        }
    }

    /// Forget every queued or finished job. Their ids become unknown and
    /// results still in flight are dropped on arrival.
    pub fn discard_all(&mut self) {
        if !self.pending.is_empty() || !self.finished.is_empty() {
            debug!(
                "search worker: discarding {} pending and {} finished jobs",
                self.pending.len(),
                self.finished.len()
            );
        }
        self.pending.clear();
        self.finished.clear();
    }

    /// Check on a job without blocking. A finished result is handed out once.
    pub fn poll(&mut self, id: JobId) -> Result<JobState, ExecutorError> {
        while let Ok(reply) = self.result_rx.try_recv() {
            self.store(reply);
        }
        if let Some(mv) = self.finished.remove(&id) {
            return Ok(JobState::Done(mv));
        }
        if self.pending.contains(&id) {
            Ok(JobState::Pending)
        } else {
            Err(ExecutorError::UnknownJob(id))
        }
    }

    /// Block until job `id` finishes.
    pub fn wait(&mut self, id: JobId) -> Result<Option<Move>, ExecutorError> {
        loop {
            if let JobState::Done(mv) = self.poll(id)? {
                return Ok(mv);
            }
            let reply = self
                .result_rx
                .recv()
                .map_err(|_| ExecutorError::WorkerGone)?;
            self.store(reply);
        }
    }
}

impl Drop for MoveExecutor {
    fn drop(&mut self) {
        // Closing the work channel ends the worker loop
        self.work_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("search worker panicked");
            }
        }
    }
}
