// minesweep_server — the session server for networked minesweeper.
//
// Each accepted TCP connection gets a private session: one board, one
// command-loop thread, and one countdown-timer thread sharing the board
// under a session-scoped lock. Sessions talk to a persistence collaborator
// (save slots + leaderboard) through the narrow `GameStore` trait.
//
// Module overview:
// - `server.rs`:  `ServerConfig`, the listener/dispatcher (bounded number
//                 of concurrent sessions, thread per connection), and the
//                 `ServerHandle` returned to the embedder.
// - `session.rs`: the per-connection protocol engine — reads commands,
//                 mutates the board, calls the store, writes responses.
// - `timer.rs`:   the per-session countdown thread; decrements the clock
//                 once per tick and reports TIME or the timeout loss.
// - `store.rs`:   `GameStore` trait, the JSON-file implementation used by
//                 the binary, and an in-memory implementation for tests.
// - `client.rs`:  a blocking protocol-level TCP client, used by the
//                 integration tests and by frontends (it does no rendering).
//
// The server can run standalone (`main.rs`) or be embedded via
// `start_server`, which binds, spawns the accept loop, and returns the
// actual bound address (bind port 0 to let the OS pick one).

pub mod client;
pub mod server;
pub mod session;
pub mod store;
pub mod timer;

pub use server::{ServerConfig, ServerHandle, start_server};
pub use session::{GameRules, Session, SessionError};
pub use store::{GameStore, JsonFileStore, MemoryStore, StoreError};
