//! twenty48-core: the grid engine behind a game of 2048.
//!
//! This crate provides:
//! - A packed 4x4 `Board` with the slide/merge shift in all four directions
//! - The `Game` state machine: spawning, score accounting, win/loss detection
//! - `Rules` to choose between the classic and the standard edge-case policies
//!
//! Nothing here renders or reads input; callers drive a `Game` and display
//! its `Snapshot` however they like.
//!
//! Quick start:
//! ```
//! use twenty48_core::engine::{Direction, Game, MoveOutcome, Rules};
//!
//! // Seeded RNG so the spawns are reproducible
//! let mut game = Game::seeded(Rules::default(), 42);
//! assert_eq!(game.board().count_empty(), 14);
//!
//! if let MoveOutcome::Applied(report) = game.make_move(Direction::Left) {
//!     assert!(game.score() >= report.gained);
//! }
//! ```

pub mod engine;

pub use engine::{Board, Direction, Game, GameStatus, MoveOutcome, Rules, Snapshot};
