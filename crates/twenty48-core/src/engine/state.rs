use rand::Rng;
use std::fmt;

use super::ops;
use serde::{Deserialize, Serialize, Serializer};

// Internal type aliases for packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
/// Tile exponent: 0 for empty, k for a tile of value 2^k.
pub(crate) type Tile = u64;

/// Accumulated merge score.
pub type Score = u64;

/// Side length of the board.
pub const SIZE: usize = 4;
pub(crate) const CELLS: usize = SIZE * SIZE;

/// Reaching this tile wins the game.
pub const WIN_TILE: u32 = 2048;

/// Largest tile a 4-bit exponent can hold.
pub const MAX_TILE: u32 = 1 << 15;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in the order used by `legal_moves` masks.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Position of this direction in [`Direction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// True when the leading edge is the last index of the line (Right/Down).
    pub(crate) fn is_reversed(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

/// Rejected cell values when building a board from plain numbers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("tile {value} at ({row}, {col}) is not a power of two >= 2")]
    NotPowerOfTwo { row: usize, col: usize, value: u32 },
    #[error("tile {value} at ({row}, {col}) exceeds the largest tile {max}", max = MAX_TILE)]
    TooLarge { row: usize, col: usize, value: u32 },
}

/// A tile placed by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Packed 4x4 2048 board as 16 4-bit exponents in a `u64`, row-major with
/// the top-left cell in the most significant nibble.
///
/// Public methods work in tile values (2, 4, 8, ...); the raw packed form is
/// still reachable for tables and tests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Build a board from tile values, 0 meaning empty.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::from_rows([[2, 2, 4, 0], [0; 4], [0; 4], [0, 0, 0, 2048]]).unwrap();
    /// assert_eq!(b.get(0, 2), Some(4));
    /// assert_eq!(b.get(3, 3), Some(2048));
    /// assert_eq!(b.get(1, 1), None);
    /// ```
    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Result<Self, BoardError> {
        let mut raw: BoardRaw = 0;
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if value < 2 || !value.is_power_of_two() {
                    return Err(BoardError::NotPowerOfTwo { row, col, value });
                }
                if value > MAX_TILE {
                    return Err(BoardError::TooLarge { row, col, value });
                }
                let exponent = value.trailing_zeros() as Tile;
                raw |= exponent << nibble_shift(row * SIZE + col);
            }
        }
        Ok(Board(raw))
    }

    /// Tile value at `(row, col)`, `None` when the cell is empty.
    ///
    /// Panics if either index is outside `0..SIZE`.
    #[inline]
    pub fn get(self, row: usize, col: usize) -> Option<u32> {
        assert!(
            row < SIZE && col < SIZE,
            "cell ({row}, {col}) is outside the {SIZE}x{SIZE} board"
        );
        match ops::get_tile_val(self, row * SIZE + col) {
            0 => None,
            v => Some(v),
        }
    }

    /// Tile values as a matrix, 0 for empty cells.
    pub fn rows(self) -> [[u32; SIZE]; SIZE] {
        let mut out = [[0u32; SIZE]; SIZE];
        for (idx, exponent) in self.tiles().enumerate() {
            out[idx / SIZE][idx % SIZE] = exponent_to_value(exponent as Tile);
        }
        out
    }

    /// Return the result of sliding/merging tiles in `dir`. No random insert.
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Direction};
    /// let b = Board::from_rows([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let shifted = b.shift(Direction::Left);
    /// assert_eq!(shifted.board.rows()[0], [4, 4, 0, 0]);
    /// assert_eq!(shifted.gained, 8);
    /// ```
    #[inline]
    pub fn shift(self, dir: Direction) -> ops::Shift {
        ops::shift(self, dir)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty
    /// cell, using the provided RNG. A full board is returned unchanged.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.place_random_tile(rng)
            .map_or(self, |(board, _)| board)
    }

    /// Like `with_random_tile`, also reporting where the tile landed.
    /// Returns `None` (and consumes no randomness) when the board is full.
    pub fn place_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Option<(Self, Spawn)> {
        let empty = self.count_empty() as usize;
        if empty == 0 {
            return None;
        }
        let nth = rng.gen_range(0..empty);
        let idx = self
            .tiles()
            .enumerate()
            .filter(|&(_, exponent)| exponent == 0)
            .nth(nth)
            .map(|(idx, _)| idx)?;
        let exponent = ops::generate_random_tile(rng);
        let spawn = Spawn {
            row: idx / SIZE,
            col: idx % SIZE,
            value: exponent_to_value(exponent),
        };
        Some((Board(self.0 | (exponent << nibble_shift(idx))), spawn))
    }

    /// Return true if no direction changes the board.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// // On an empty board nothing can slide.
    /// assert!(Board::EMPTY.is_game_over());
    /// ```
    #[inline]
    pub fn is_game_over(self) -> bool {
        ops::is_game_over(self)
    }

    /// Return the highest tile value on the board, 0 when empty.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::get_highest_tile_val(self)
    }

    /// Sum of all tile values.
    pub fn tile_sum(self) -> u64 {
        self.rows().iter().flatten().map(|&v| v as u64).sum()
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        ops::count_empty(self)
    }

    /// True when every cell holds a tile.
    #[inline]
    pub fn is_full(self) -> bool {
        self.count_empty() == 0
    }

    /// Iterate over tile exponents (nibbles) in row-major order.
    /// Returns 0 for empty, 1 for 2, 2 for 4, etc.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter {
            raw: self.0,
            idx: 0,
        }
    }
}

#[inline]
pub(crate) fn nibble_shift(idx: usize) -> u32 {
    (60 - 4 * idx) as u32
}

#[inline]
pub(crate) fn exponent_to_value(exponent: Tile) -> u32 {
    if exponent == 0 { 0 } else { 1 << exponent }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(SIZE * 8 - 1);
        for (idx, row) in self.rows().iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{separator}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Serialized as the matrix of tile values, which is what front ends want.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}
impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.into_raw()
    }
}

impl TryFrom<[[u32; SIZE]; SIZE]> for Board {
    type Error = BoardError;

    fn try_from(rows: [[u32; SIZE]; SIZE]) -> Result<Self, Self::Error> {
        Board::from_rows(rows)
    }
}

/// Iterator over board tiles (exponents) in row-major order.
pub struct TilesIter {
    raw: BoardRaw,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = u8;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= CELLS {
            return None;
        }
        let n = ((self.raw >> nibble_shift(self.idx)) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}
