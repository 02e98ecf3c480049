use log::{debug, trace};
use rand::SeedableRng;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::ops::{self, Shift};
use super::rules::{LossRule, Rules, SpawnPolicy};
use super::state::{Board, Direction, Score, Spawn, WIN_TILE};

/// Where a game stands. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// What an accepted move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub direction: Direction,
    /// Whether any tile slid or merged.
    pub changed: bool,
    /// Score added by this move's merges.
    pub gained: Score,
    pub spawned: Option<Spawn>,
    /// Status after the move.
    pub status: GameStatus,
    /// Set only on the move that ended the game.
    pub finished: Option<GameStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game is already over; nothing changed.
    Rejected,
    Applied(MoveReport),
}

impl MoveOutcome {
    pub fn report(&self) -> Option<&MoveReport> {
        match self {
            MoveOutcome::Rejected => None,
            MoveOutcome::Applied(report) => Some(report),
        }
    }
}

/// Everything a renderer needs to draw the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub score: Score,
    pub status: GameStatus,
}

/// A single game of 2048: board, score and status, mutated only through
/// moves, spawns and restarts. The spawn RNG is injected so games can be
/// replayed from a seed.
///
/// ```
/// use twenty48_core::engine::{Board, Direction, Game, GameStatus, Rules};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let board = Board::from_rows([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
/// let mut game = Game::from_board(board, Rules::default(), StdRng::seed_from_u64(1));
/// let report = *game.make_move(Direction::Left).report().unwrap();
/// assert_eq!(report.finished, Some(GameStatus::Won));
/// assert_eq!(game.score(), 2048);
///
/// game.restart();
/// assert_eq!(game.status(), GameStatus::InProgress);
/// assert_eq!(game.score(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Game<R = StdRng> {
    board: Board,
    score: Score,
    status: GameStatus,
    rules: Rules,
    rng: R,
}

impl Game<StdRng> {
    /// New game whose spawns are fully determined by `seed`.
    pub fn seeded(rules: Rules, seed: u64) -> Self {
        Self::new(rules, StdRng::seed_from_u64(seed))
    }

    /// New game seeded from OS entropy.
    pub fn from_entropy(rules: Rules) -> Self {
        Self::new(rules, StdRng::from_entropy())
    }
}

impl<R: Rng> Game<R> {
    /// Start a fresh game: empty board, zero score, two spawned tiles.
    pub fn new(rules: Rules, rng: R) -> Self {
        let mut game = Self {
            board: Board::EMPTY,
            score: 0,
            status: GameStatus::InProgress,
            rules,
            rng,
        };
        game.initialize();
        game
    }

    /// Resume from an arbitrary board with a zero score. The status is
    /// evaluated right away, so a finished board starts finished.
    pub fn from_board(board: Board, rules: Rules, rng: R) -> Self {
        let mut game = Self {
            board,
            score: 0,
            status: GameStatus::InProgress,
            rules,
            rng,
        };
        game.check_terminal();
        game
    }

    /// Reset to an empty board and zero score, then spawn two tiles.
    pub fn initialize(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.status = GameStatus::InProgress;
        self.spawn_tile();
        self.spawn_tile();
        debug!("new game: {:?}", self.board);
    }

    /// Start over; clears any terminal status.
    pub fn restart(&mut self) {
        self.initialize();
    }

    /// Place a 2 (90%) or 4 (10%) on a random empty cell.
    /// Does nothing on a full board.
    pub fn spawn_tile(&mut self) -> Option<Spawn> {
        let (board, spawn) = self.board.place_random_tile(&mut self.rng)?;
        trace!("spawned {} at ({}, {})", spawn.value, spawn.row, spawn.col);
        self.board = board;
        Some(spawn)
    }

    /// Slide every line toward `direction`, merge, spawn per the rules, then
    /// re-evaluate the status. Rejected without effect once the game is over.
    pub fn make_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.status.is_terminal() {
            debug!("ignoring {direction:?}: game is {:?}", self.status);
            return MoveOutcome::Rejected;
        }

        let Shift { board, gained } = ops::shift(self.board, direction);
        let changed = board != self.board;
        self.board = board;
        self.score += gained;

        let spawned = match self.rules.spawn {
            SpawnPolicy::Always => self.spawn_tile(),
            SpawnPolicy::OnChange if changed => self.spawn_tile(),
            SpawnPolicy::OnChange => None,
        };

        let status = self.check_terminal();
        let finished = status.is_terminal().then_some(status);
        if let Some(status) = finished {
            debug!("game over ({status:?}) with score {}", self.score);
        }

        MoveOutcome::Applied(MoveReport {
            direction,
            changed,
            gained,
            spawned,
            status,
            finished,
        })
    }

    /// Update and return the status: `Won` once a 2048 tile exists, `Lost`
    /// when the board is full and the loss rule applies. A terminal status
    /// never changes until restart.
    pub fn check_terminal(&mut self) -> GameStatus {
        if !self.status.is_terminal() {
            self.status = self.evaluate_status();
        }
        self.status
    }

    fn evaluate_status(&self) -> GameStatus {
        if self.board.highest_tile() >= WIN_TILE {
            return GameStatus::Won;
        }
        if !self.board.is_full() {
            return GameStatus::InProgress;
        }
        match self.rules.loss {
            LossRule::BoardFull => GameStatus::Lost,
            LossRule::NoMoves if ops::has_legal_move(self.board) => GameStatus::InProgress,
            LossRule::NoMoves => GameStatus::Lost,
        }
    }

    /// Which directions would change the board, indexed like [`Direction::ALL`].
    pub fn legal_moves(&self) -> [bool; 4] {
        ops::legal_moves(self.board)
    }

    pub fn has_legal_move(&self) -> bool {
        ops::has_legal_move(self.board)
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            score: self.score,
            status: self.status,
        }
    }
}
