// Per-session countdown timer.
//
// One thread per session, started by the first NEW and stopped by EXIT or
// session teardown. Each tick takes the session lock, so a tick never
// observes a board mid-mutation and its TIME/BOARD write is serialized
// with the command loop's responses.
//
// Tick rules: a finished board or an exhausted clock is left alone; an
// ordinary tick decrements and reports TIME; the tick that reaches zero
// marks the timeout loss (disclosing the mines) and reports the final
// BOARD. A write failure cancels the timer — the command loop notices the
// dead stream on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use minesweep_board::codec;
use minesweep_protocol::response::Response;

use crate::session::{self, SessionShared};

/// Handle to a running countdown thread.
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Stop the countdown and wait for the thread to wind down (at most
    /// one tick interval away).
    pub fn cancel(mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawn the countdown thread for a session.
pub(crate) fn start(
    shared: Arc<Mutex<SessionShared>>,
    interval: Duration,
    conn_id: u64,
) -> TimerHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let thread = thread::spawn(move || run(shared, interval, conn_id, flag));
    TimerHandle {
        cancelled,
        thread: Some(thread),
    }
}

fn run(
    shared: Arc<Mutex<SessionShared>>,
    interval: Duration,
    conn_id: u64,
    cancelled: Arc<AtomicBool>,
) {
    loop {
        thread::sleep(interval);
        if cancelled.load(Ordering::SeqCst) {
            return;
        }

        let mut shared = shared.lock();
        if shared.board.finished() || shared.board.time_remaining() == 0 {
            continue;
        }
        shared.board.decrement_time();

        let response = if shared.board.time_remaining() == 0 {
            // Timeout: the game is lost and the board says so.
            shared.board.mark_lost();
            Response::Board(codec::encode(&shared.board))
        } else {
            Response::Time(shared.board.time_remaining())
        };

        if let Err(e) = session::send(&mut shared, &response) {
            debug!(conn = conn_id, error = %e, "timer write failed, stopping countdown");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, BufWriter};
    use std::net::{TcpListener, TcpStream};

    use minesweep_board::Board;
    use minesweep_protocol::framing;

    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    fn shared_with_board(board: Board) -> (Arc<Mutex<SessionShared>>, BufReader<TcpStream>) {
        let (client, server) = tcp_pair();
        let shared = Arc::new(Mutex::new(SessionShared {
            board,
            writer: BufWriter::new(server),
        }));
        (shared, BufReader::new(client))
    }

    fn recv(reader: &mut BufReader<TcpStream>) -> Response {
        let line = framing::read_line(reader).unwrap();
        Response::parse(&line).unwrap()
    }

    #[test]
    fn tick_decrements_and_reports_time() {
        let board = Board::with_mines(vec![vec![true, false]], 5).unwrap();
        let (shared, mut reader) = shared_with_board(board);
        let handle = start(Arc::clone(&shared), TICK, 0);

        assert_eq!(recv(&mut reader), Response::Time(4));
        assert_eq!(recv(&mut reader), Response::Time(3));
        handle.cancel();
    }

    #[test]
    fn final_tick_is_a_timeout_loss() {
        let board = Board::with_mines(vec![vec![true, false]], 1).unwrap();
        let (shared, mut reader) = shared_with_board(board);
        let handle = start(Arc::clone(&shared), TICK, 0);

        // One tick takes the clock from 1 to 0: loss, mines disclosed.
        let response = recv(&mut reader);
        let record = match response {
            Response::Board(record) => record,
            other => panic!("expected BOARD, got {other:?}"),
        };
        let board = codec::decode(&record).unwrap();
        assert!(board.lost());
        assert!(!board.won());
        assert_eq!(board.time_remaining(), 0);
        assert!(board.cell_state(0, 0).is_revealed());

        handle.cancel();

        let shared = shared.lock();
        assert!(shared.board.lost());
        assert_eq!(shared.board.time_remaining(), 0);
    }

    #[test]
    fn finished_board_is_left_alone() {
        let mut board = Board::with_mines(vec![vec![true, false]], 5).unwrap();
        board.mark_won();
        let (shared, reader) = shared_with_board(board);
        let handle = start(Arc::clone(&shared), TICK, 0);

        thread::sleep(TICK * 5);
        handle.cancel();

        let shared = shared.lock();
        assert_eq!(shared.board.time_remaining(), 5);

        // No message was written while the board was finished.
        let stream = reader.get_ref();
        stream
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let mut reader = reader;
        assert!(framing::read_line(&mut reader).is_err());
    }

    #[test]
    fn cancel_stops_the_countdown() {
        let board = Board::with_mines(vec![vec![true, false]], 1000).unwrap();
        let (shared, _reader) = shared_with_board(board);
        let handle = start(Arc::clone(&shared), TICK, 0);

        thread::sleep(TICK * 3);
        handle.cancel();
        let time_after_cancel = shared.lock().board.time_remaining();

        thread::sleep(TICK * 5);
        assert_eq!(shared.lock().board.time_remaining(), time_after_cancel);
    }

    #[test]
    fn write_failure_stops_the_countdown() {
        let board = Board::with_mines(vec![vec![true, false]], 1000).unwrap();
        let (shared, reader) = shared_with_board(board);
        drop(reader); // Close the client half; writes will fail.

        let handle = start(Arc::clone(&shared), TICK, 0);
        thread::sleep(TICK * 10);

        // The thread bailed on its own; cancel() just joins it.
        handle.cancel();
    }
}
