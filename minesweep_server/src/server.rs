// TCP listener and session dispatcher.
//
// Architecture: an accept-loop thread plus one thread per accepted
// connection (each of which may in turn start its own timer thread — see
// `session.rs`). Sessions share nothing with each other except the store,
// which serializes itself.
//
// The accept loop runs the listener non-blocking with a short sleep so it
// can check the `keep_running` flag; `ServerHandle::stop()` flips the flag
// and joins the loop. Live sessions are not interrupted — they end when
// their clients disconnect.
//
// Concurrency bound: an atomic count of live sessions. A connection that
// arrives at capacity is logged and dropped — the client observes an
// immediate close. A second atomic counter issues connection ids so every
// log line can be correlated to one session.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::session::{GameRules, Session};
use crate::store::GameStore;

/// Configuration for starting a server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// Maximum concurrent sessions; connections beyond it are refused.
    pub max_sessions: usize,
    pub rules: GameRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            max_sessions: 5,
            rules: GameRules::default(),
        }
    }
}

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for the accept loop to exit.
    /// Sessions already running drain on their own.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Start the server on a background thread. Returns a handle for stopping
/// it and the actual bound address (useful when port 0 is used to let the
/// OS pick a free port).
pub fn start_server(
    config: ServerConfig,
    store: Arc<dyn GameStore>,
) -> io::Result<(ServerHandle, SocketAddr)> {
    // Surface bad board parameters at startup instead of on the first NEW.
    config
        .rules
        .fresh_board()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let listener = TcpListener::bind(format!("127.0.0.1:{}", config.port))?;
    let addr = listener.local_addr()?;
    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = Arc::clone(&keep_running);

    let thread = thread::spawn(move || {
        run_dispatcher(listener, config, store, keep_running_clone);
    });

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Accept loop. Runs until `keep_running` is set to false.
fn run_dispatcher(
    listener: TcpListener,
    config: ServerConfig,
    store: Arc<dyn GameStore>,
    keep_running: Arc<AtomicBool>,
) {
    // Non-blocking so the loop can check keep_running between connections.
    listener.set_nonblocking(true).ok();

    let active_sessions = Arc::new(AtomicUsize::new(0));
    let next_conn_id = AtomicU64::new(0);

    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false).ok();
                let conn_id = next_conn_id.fetch_add(1, Ordering::SeqCst);

                if active_sessions.load(Ordering::SeqCst) >= config.max_sessions {
                    warn!(
                        conn = conn_id,
                        %peer,
                        limit = config.max_sessions,
                        "refusing connection: session capacity reached"
                    );
                    continue;
                }

                info!(conn = conn_id, %peer, "session starting");
                active_sessions.fetch_add(1, Ordering::SeqCst);

                let store = Arc::clone(&store);
                let active = Arc::clone(&active_sessions);
                let rules = config.rules;
                thread::spawn(move || {
                    let outcome =
                        Session::new(stream, conn_id, store, rules).and_then(Session::run);
                    match outcome {
                        Ok(()) => info!(conn = conn_id, "session ended"),
                        Err(e) => warn!(conn = conn_id, error = %e, "session closed on error"),
                    }
                    active.fetch_sub(1, Ordering::SeqCst);
                });
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                error!(error = %e, "accept failed, dispatcher stopping");
                break;
            }
        }
    }
}
