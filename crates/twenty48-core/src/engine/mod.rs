//! Engine module: packed 2048 board, line merge + shift ops, precomputed
//! lookup tables and the `Game` state machine on top of them.
//!
//! - `Board` is the packed 4x4 state with useful methods.
//! - `Game` owns a board, its score, status, rules and the spawn RNG.
//! - Internals (tables and hot ops) live in submodules to keep things tidy.

mod game;
mod ops;
pub mod rules;
pub mod state;
mod tables;

pub use game::{Game, GameStatus, MoveOutcome, MoveReport, Snapshot};
pub use rules::{LossRule, Rules, SpawnPolicy};
pub use state::{Board, BoardError, Direction, Score, Spawn, MAX_TILE, SIZE, WIN_TILE};

pub use ops::{has_legal_move, is_game_over, legal_moves, merge_tiles, shift, Merged, Shift};

/// Build the line lookup tables now instead of on the first shift.
/// Safe to call multiple times.
pub fn warm_up() {
    tables::init();
}
