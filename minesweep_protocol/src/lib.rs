// minesweep_protocol — wire protocol for the minesweeper session server.
//
// The protocol is line-oriented ASCII: one client command or one server
// response per newline-framed message. Both directions are fully typed here
// so that the server, the client, and the tests all speak through the same
// vocabulary instead of ad-hoc string splitting:
//
// - `framing.rs`:  newline framing over any reader/writer, with an oversize
//                  guard against unbounded allocation.
// - `command.rs`:  `Command` — client→server requests (`VERB[ ARGS]`),
//                  validated at parse time; any malformation is a typed
//                  `ParseCommandError`, which the server treats as fatal.
// - `response.rs`: `Response` — server→client messages (`TAG\tPAYLOAD`),
//                  with the board record, countdown ticks, save-slot
//                  listings, and the fixed-width leaderboard format.
// - `types.rs`:    small shared types — validated save-slot index,
//                  leaderboard entry.
//
// No dependency on the board crate: board state crosses this layer as the
// opaque encoded record produced by `minesweep_board::codec`.

pub mod command;
pub mod framing;
pub mod response;
pub mod types;

pub use command::{Command, ParseCommandError, UpdateAction};
pub use response::{ParseResponseError, Response};
pub use types::{InvalidSlot, ScoreEntry, Slot};
