// minesweep_board — board state and game rules for networked minesweeper.
//
// This crate owns everything about a single game of minesweeper and nothing
// about how games are played over a network: the mine grid, the per-cell
// reveal state, the reveal/flag/cascade algorithms, win detection, the
// countdown clock value, and the text codec that turns a board into a
// single-line record and back.
//
// Module overview:
// - `board.rs`: the `Board` type and all game mutation/query operations.
// - `codec.rs`: `encode`/`decode` between a `Board` and its wire/storage
//               text record. Pure and stateless; the only way to build a
//               board in an arbitrary mid-game state from outside the crate.
//
// The session engine (in `minesweep_server`) wraps a `Board` in a mutex
// shared between its command loop and its countdown timer; this crate is
// single-threaded and has no opinion on locking.

pub mod board;
pub mod codec;

pub use board::{Board, BoardError, CellState};
pub use codec::{DecodeError, decode, encode};
