// Per-connection session engine.
//
// One `Session` per accepted connection: it owns the only board the client
// will ever see and runs the command loop until EXIT, a dead stream, or a
// protocol violation. The board and the buffered writer live together
// behind one `Mutex` (`SessionShared`) shared with the session's countdown
// timer — a single lock covers both, so a board mutation and the response
// computed from it are atomic with respect to timer ticks, and all writes
// to the stream are serialized.
//
// Failure policy: malformed command text and out-of-range coordinates are
// treated as a corrupt stream — the session closes. Persistence failures
// degrade per command (empty listings on reads, a logged warning on
// writes). Decode failures on LOADFROM abandon the load and keep the
// current board. Every abnormal path logs.

use std::io::{self, BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, info, warn};

use minesweep_board::board::{
    DEFAULT_COLS, DEFAULT_MINES, DEFAULT_ROWS, DEFAULT_STARTING_TIME,
};
use minesweep_board::{Board, BoardError, codec};
use minesweep_protocol::command::{Command, ParseCommandError, UpdateAction};
use minesweep_protocol::framing;
use minesweep_protocol::response::Response;
use minesweep_protocol::types::Slot;

use crate::store::GameStore;
use crate::timer::{self, TimerHandle};

/// Parameters for the boards a session deals out, plus the timer cadence.
/// Tests shrink the board and the tick to keep scenarios fast.
#[derive(Clone, Copy, Debug)]
pub struct GameRules {
    pub rows: usize,
    pub cols: usize,
    pub mine_count: usize,
    pub starting_time: u32,
    pub tick_interval: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            mine_count: DEFAULT_MINES,
            starting_time: DEFAULT_STARTING_TIME,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl GameRules {
    pub(crate) fn fresh_board(&self) -> Result<Board, BoardError> {
        Board::new(self.rows, self.cols, self.mine_count, self.starting_time)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("malformed command: {0}")]
    Protocol(#[from] ParseCommandError),
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),
    #[error("board rejected the request: {0}")]
    Board(#[from] BoardError),
}

/// The state shared between a session's command loop and its timer: the
/// board and the write half of the stream, under one lock.
pub(crate) struct SessionShared {
    pub(crate) board: Board,
    pub(crate) writer: BufWriter<TcpStream>,
}

/// Serialize a response and write it out. Callers hold the session lock.
pub(crate) fn send(shared: &mut SessionShared, response: &Response) -> io::Result<()> {
    framing::write_line(&mut shared.writer, &response.encode())
}

pub struct Session {
    conn_id: u64,
    rules: GameRules,
    shared: Arc<Mutex<SessionShared>>,
    reader: BufReader<TcpStream>,
    store: Arc<dyn GameStore>,
    timer: Option<TimerHandle>,
}

impl Session {
    /// Set up a session over an accepted stream. Deals the initial board
    /// immediately; the timer starts only with the first NEW.
    pub fn new(
        stream: TcpStream,
        conn_id: u64,
        store: Arc<dyn GameStore>,
        rules: GameRules,
    ) -> Result<Self, SessionError> {
        let board = rules.fresh_board()?;
        let reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream);
        Ok(Self {
            conn_id,
            rules,
            shared: Arc::new(Mutex::new(SessionShared { board, writer })),
            reader,
            store,
            timer: None,
        })
    }

    /// Run the command loop to completion, then release the timer.
    pub fn run(mut self) -> Result<(), SessionError> {
        let result = self.command_loop();
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        result
    }

    fn command_loop(&mut self) -> Result<(), SessionError> {
        loop {
            let line = match framing::read_line(&mut self.reader) {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    info!(conn = self.conn_id, "client disconnected without EXIT");
                    return Ok(());
                }
                Err(e) => return Err(SessionError::Transport(e)),
            };
            debug!(conn = self.conn_id, command = %line, "received");

            match Command::parse(&line)? {
                Command::New => self.handle_new()?,
                Command::Update { action, y, x } => self.handle_update(action, y, x)?,
                Command::GetLoad => self.handle_slot_listing(false)?,
                Command::LoadFrom(slot) => self.handle_load_from(slot)?,
                Command::GetSave => self.handle_slot_listing(true)?,
                Command::SaveTo(slot) => self.handle_save_to(slot),
                Command::Score => self.handle_score()?,
                Command::Name { name, score } => self.handle_name(&name, score),
                Command::Exit => {
                    self.handle_exit()?;
                    return Ok(());
                }
            }
        }
    }

    /// NEW: deal a fresh board and make sure the countdown is running.
    fn handle_new(&mut self) -> Result<(), SessionError> {
        let board = self.rules.fresh_board()?;
        {
            let mut shared = self.shared.lock();
            shared.board = board;
            let response = Response::Board(codec::encode(&shared.board));
            send(&mut shared, &response)?;
        }
        if self.timer.is_none() {
            self.timer = Some(timer::start(
                Arc::clone(&self.shared),
                self.rules.tick_interval,
                self.conn_id,
            ));
        }
        Ok(())
    }

    /// UPDATE: apply a reveal or flag-cycle, detect a fresh win (running
    /// the high-score check before the board goes out), respond BOARD.
    fn handle_update(&self, action: UpdateAction, y: usize, x: usize) -> Result<(), SessionError> {
        let mut shared = self.shared.lock();
        match action {
            UpdateAction::Reveal => shared.board.reveal(y, x)?,
            UpdateAction::Flag => shared.board.set_flag(y, x)?,
        }
        if !shared.board.finished() && shared.board.check_win_condition() {
            shared.board.mark_won();
            self.check_high_score(&mut shared)?;
        }
        let response = Response::Board(codec::encode(&shared.board));
        send(&mut shared, &response)?;
        Ok(())
    }

    /// After a win: if the remaining time beats the lowest leaderboard
    /// score, ask the client for a name. A store failure skips the prompt.
    fn check_high_score(&self, shared: &mut SessionShared) -> Result<(), SessionError> {
        let scores = match self.store.top_scores() {
            Ok(scores) => scores,
            Err(e) => {
                warn!(conn = self.conn_id, error = %e, "failed to read leaderboard after win");
                return Ok(());
            }
        };
        let lowest = scores.iter().map(|entry| entry.score).min().unwrap_or(0);
        if shared.board.time_remaining() > lowest {
            send(shared, &Response::GetName)?;
        }
        Ok(())
    }

    /// GETLOAD / GETSAVE: the five slot captions. A store failure degrades
    /// to an all-empty listing.
    fn handle_slot_listing(&self, for_save: bool) -> Result<(), SessionError> {
        let captions = match self.store.list_slots() {
            Ok(captions) => captions,
            Err(e) => {
                warn!(conn = self.conn_id, error = %e, "failed to list save slots");
                std::array::from_fn(|_| String::new())
            }
        };
        let response = if for_save {
            Response::SaveInfo(captions)
        } else {
            Response::LoadInfo(captions)
        };
        let mut shared = self.shared.lock();
        send(&mut shared, &response)?;
        Ok(())
    }

    /// LOADFROM: replace the board from a slot. A missing slot or a corrupt
    /// record abandons the load; the current board is reported either way.
    fn handle_load_from(&self, slot: Slot) -> Result<(), SessionError> {
        let loaded = match self.store.load_slot(slot) {
            Ok(data) => match codec::decode(&data) {
                Ok(board) => Some(board),
                Err(e) => {
                    warn!(conn = self.conn_id, %slot, error = %e, "corrupt board record in slot");
                    None
                }
            },
            Err(e) => {
                warn!(conn = self.conn_id, %slot, error = %e, "failed to load slot");
                None
            }
        };
        let mut shared = self.shared.lock();
        if let Some(board) = loaded {
            shared.board = board;
        }
        let response = Response::Board(codec::encode(&shared.board));
        send(&mut shared, &response)?;
        Ok(())
    }

    /// SAVETO: persist the current board under a timestamp caption. No
    /// response; a store failure is logged and the session continues.
    fn handle_save_to(&self, slot: Slot) {
        let (caption, data) = {
            let shared = self.shared.lock();
            (
                make_caption(shared.board.time_remaining()),
                codec::encode(&shared.board),
            )
        };
        if let Err(e) = self.store.save_slot(slot, &caption, &data) {
            warn!(conn = self.conn_id, %slot, error = %e, "failed to save game");
        }
    }

    /// SCORE: the leaderboard. A store failure degrades to an empty list.
    fn handle_score(&self) -> Result<(), SessionError> {
        let entries = match self.store.top_scores() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(conn = self.conn_id, error = %e, "failed to read leaderboard");
                Vec::new()
            }
        };
        let mut shared = self.shared.lock();
        send(&mut shared, &Response::Scores(entries))?;
        Ok(())
    }

    /// NAME: record the winner. No response.
    fn handle_name(&self, name: &str, score: u32) {
        if let Err(e) = self.store.submit_score(name, score) {
            warn!(conn = self.conn_id, error = %e, "failed to record score");
        }
    }

    /// EXIT: stop the countdown, acknowledge, and let the loop end.
    fn handle_exit(&mut self) -> Result<(), SessionError> {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        let mut shared = self.shared.lock();
        send(&mut shared, &Response::Exit)?;
        Ok(())
    }
}

/// Save-slot caption: a timestamp plus the clock value, e.g.
/// `"Mon Jan 05 10:00:00 2026 953s"`. Captions travel in comma-joined
/// listings, so the format must stay comma-free.
fn make_caption(time_remaining: u32) -> String {
    let format = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [year]"
    );
    let stamp = OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "unknown time".to_string());
    format!("{stamp} {time_remaining}s")
}
