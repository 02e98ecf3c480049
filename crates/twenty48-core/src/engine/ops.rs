use rand::Rng;

use super::state::{
    Board, BoardRaw, Direction, Line, MAX_TILE, SIZE, Score, Tile, exponent_to_value,
    nibble_shift,
};
use super::tables::{get_line_entry, stores};

/// A board after sliding, with the score its merges produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub board: Board,
    pub gained: Score,
}

/// A merged line, leading edge first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub tiles: Vec<u32>,
    pub gained: Score,
}

/// Merge the non-empty tiles of one line, given leading edge first.
///
/// A single left-to-right pass: equal neighbours combine into one tile of
/// twice the value and the cursor skips both, so a merged tile never merges
/// again in the same move. Two `MAX_TILE` tiles stay apart.
///
/// ```
/// use twenty48_core::engine::merge_tiles;
/// let m = merge_tiles(&[2, 2, 2, 2]);
/// assert_eq!(m.tiles, vec![4, 4]);
/// assert_eq!(m.gained, 8);
/// ```
pub fn merge_tiles(tiles: &[u32]) -> Merged {
    let mut merged = Vec::with_capacity(tiles.len());
    let mut gained: Score = 0;
    let mut i = 0;
    while i < tiles.len() {
        let tile = tiles[i];
        if i + 1 < tiles.len() && tiles[i + 1] == tile && tile < MAX_TILE {
            merged.push(tile * 2);
            gained += Score::from(tile * 2);
            i += 2;
        } else {
            merged.push(tile);
            i += 1;
        }
    }
    Merged {
        tiles: merged,
        gained,
    }
}

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: Board, direction: Direction) -> Shift {
    match direction {
        Direction::Left | Direction::Right => shift_rows(board, direction),
        Direction::Up | Direction::Down => shift_cols(board, direction),
    }
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Return the cell's actual value (0 if empty), e.g., 2, 4, 8, ...
pub(crate) fn get_tile_val(board: Board, idx: usize) -> u32 {
    exponent_to_value((board.0 >> nibble_shift(idx)) & 0xf)
}

pub(crate) fn line_tiles(line: Line) -> [Tile; SIZE] {
    let mut tiles = [0; SIZE];
    for (tile_idx, tile) in tiles.iter_mut().enumerate() {
        *tile = (line >> ((3 - tile_idx) * 4)) & 0xf;
    }
    tiles
}

/// True if no move in any direction changes the board.
pub fn is_game_over(board: Board) -> bool {
    !has_legal_move(board)
}

/// True if at least one direction changes the board.
pub fn has_legal_move(board: Board) -> bool {
    Direction::ALL
        .iter()
        .any(|&direction| shift(board, direction).board != board)
}

/// Which directions change the board, indexed like [`Direction::ALL`].
pub fn legal_moves(board: Board) -> [bool; 4] {
    Direction::ALL.map(|direction| shift(board, direction).board != board)
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the number of zero tiles.
pub(crate) fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 1 } else { 2 }
}

fn shift_rows(board: Board, direction: Direction) -> Shift {
    let s = stores();
    let table: &[u64] = match direction {
        Direction::Left => &s.shift_left,
        Direction::Right => &s.shift_right,
        _ => unreachable!("shift_rows only handles Left/Right"),
    };
    let gains = s.gains(direction);
    let (res, gained) = (0..4).fold((0, 0), |(new_board, gained), row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = get_line_entry(table, row_val);
        (
            new_board | (new_row_val << (48 - (16 * row_idx))),
            gained + get_line_entry(gains, row_val),
        )
    });
    Shift {
        board: Board(res),
        gained,
    }
}

fn shift_cols(board: Board, direction: Direction) -> Shift {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match direction {
        Direction::Up => &s.shift_up,
        Direction::Down => &s.shift_down,
        _ => unreachable!("shift_cols only handles Up/Down"),
    };
    let gains = s.gains(direction);
    let (res, gained) = (0..4).fold((0, 0), |(new_board, gained), col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = get_line_entry(table, col_val);
        (
            new_board | (new_col_val << (12 - (4 * col_idx))),
            gained + get_line_entry(gains, col_val),
        )
    });
    Shift {
        board: Board(res),
        gained,
    }
}

/// Shift a single packed line. Row results are laid out as a 16-bit row,
/// column results with one tile per 16-bit lane so they can be OR-ed into
/// place without transposing back.
pub(crate) fn shift_line(line: Line, direction: Direction) -> Line {
    let (tiles, _) = slide_line(line, direction.is_reversed());
    match direction {
        Direction::Left | Direction::Right => tiles_to_row(tiles),
        Direction::Up | Direction::Down => tiles_to_col(tiles),
    }
}

/// Score gained by sliding a packed line toward index 0, or toward index 3
/// when `reversed`.
pub(crate) fn line_gain(line: Line, reversed: bool) -> Score {
    slide_line(line, reversed).1
}

fn slide_line(line: Line, reversed: bool) -> ([Tile; SIZE], Score) {
    let mut values: Vec<u32> = line_tiles(line)
        .into_iter()
        .filter(|&tile| tile != 0)
        .map(exponent_to_value)
        .collect();
    if reversed {
        values.reverse();
    }
    let Merged { tiles, gained } = merge_tiles(&values);
    let mut out = [0; SIZE];
    for (k, value) in tiles.into_iter().enumerate() {
        let slot = if reversed { SIZE - 1 - k } else { k };
        out[slot] = Tile::from(value.trailing_zeros());
    }
    (out, gained)
}

fn tiles_to_row(tiles: [Tile; SIZE]) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn tiles_to_col(tiles: [Tile; SIZE]) -> Line {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}

pub(crate) fn format_val(val: u32) -> String {
    match val {
        0 => String::from("       "),
        v => format!("{v:^7}"),
    }
}

pub(crate) fn get_highest_tile_val(board: Board) -> u32 {
    let max_tile = board.tiles().max().unwrap_or(0);
    exponent_to_value(Tile::from(max_tile))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_board(rows: [[u32; 4]; 4]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn merge_single_pass() {
        assert_eq!(merge_tiles(&[]).tiles, Vec::<u32>::new());
        assert_eq!(merge_tiles(&[2]).tiles, vec![2]);

        let m = merge_tiles(&[2, 2, 4]);
        assert_eq!(m.tiles, vec![4, 4]);
        assert_eq!(m.gained, 4);

        // Freshly merged 8 does not merge with the following 8.
        let m = merge_tiles(&[4, 4, 8]);
        assert_eq!(m.tiles, vec![8, 8]);
        assert_eq!(m.gained, 8);

        let m = merge_tiles(&[2, 4, 2, 4]);
        assert_eq!(m.tiles, vec![2, 4, 2, 4]);
        assert_eq!(m.gained, 0);

        let m = merge_tiles(&[8, 4, 4, 4]);
        assert_eq!(m.tiles, vec![8, 8, 4]);
        assert_eq!(m.gained, 8);
    }

    #[test]
    fn merge_length_drops_by_merge_count() {
        // (input, merges expected)
        let cases = [
            (vec![2, 2, 2, 2], 2),
            (vec![2, 2, 2], 1),
            (vec![16, 8, 8, 16], 1),
            (vec![2, 4, 8, 16], 0),
        ];
        for (input, merges) in cases {
            let m = merge_tiles(&input);
            assert_eq!(m.tiles.len(), input.len() - merges, "{input:?}");
            let input_sum: u32 = input.iter().sum();
            let output_sum: u32 = m.tiles.iter().sum();
            assert_eq!(input_sum, output_sum);
        }
    }

    #[test]
    fn max_tiles_do_not_merge() {
        let m = merge_tiles(&[MAX_TILE, MAX_TILE]);
        assert_eq!(m.tiles, vec![MAX_TILE, MAX_TILE]);
        assert_eq!(m.gained, 0);
    }

    #[test]
    fn test_shift_left() {
        let cases = [
            (0x0000, 0x0000, 0),
            (0x0002, 0x2000, 0),
            (0x2020, 0x3000, 8),
            (0x1332, 0x1420, 16),
            (0x1234, 0x1234, 0),
            (0x1002, 0x1200, 0),
        ];
        for (before, after, gained) in cases {
            let s = shift(Board::from_raw(before), Direction::Left);
            assert_eq!(s.board, Board::from_raw(after), "{before:#06x}");
            assert_eq!(s.gained, gained, "{before:#06x}");
        }
        assert_ne!(
            shift(Board::from_raw(0x1210), Direction::Left).board,
            Board::from_raw(0x2200)
        );
    }

    #[test]
    fn test_shift_right() {
        let cases = [
            (0x0000, 0x0000, 0),
            (0x2000, 0x0002, 0),
            (0x2020, 0x0003, 8),
            (0x1332, 0x0142, 16),
            (0x1234, 0x1234, 0),
            (0x1002, 0x0012, 0),
            (0x0222, 0x0023, 8),
        ];
        for (before, after, gained) in cases {
            let s = shift(Board::from_raw(before), Direction::Right);
            assert_eq!(s.board, Board::from_raw(after), "{before:#06x}");
            assert_eq!(s.gained, gained, "{before:#06x}");
        }
        assert_ne!(
            shift(Board::from_raw(0x0121), Direction::Right).board,
            Board::from_raw(0x0022)
        );
    }

    #[test]
    fn test_move_left() {
        let game = Board::from_raw(0x1234133220021002);
        let s = shift(game, Direction::Left);
        assert_eq!(s.board, Board::from_raw(0x1234142030001200));
        assert_eq!(s.gained, 16 + 8);
    }

    #[test]
    fn test_move_up() {
        let game = Board::from_raw(0x1121230033004222);
        let s = shift(game, Direction::Up);
        assert_eq!(s.board, Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_right() {
        let game = Board::from_raw(0x1234133220021002);
        let s = shift(game, Direction::Right);
        assert_eq!(s.board, Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn test_move_down() {
        let game = Board::from_raw(0x1121230033004222);
        let s = shift(game, Direction::Down);
        assert_eq!(s.board, Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn down_merges_nearest_the_bottom_first() {
        let b = row_board([[2, 0, 0, 0], [2, 0, 0, 0], [2, 0, 0, 0], [0; 4]]);
        let s = shift(b, Direction::Down);
        assert_eq!(
            s.board.rows(),
            [[0; 4], [0; 4], [2, 0, 0, 0], [4, 0, 0, 0]]
        );
        let s = shift(b, Direction::Up);
        assert_eq!(
            s.board.rows(),
            [[4, 0, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]]
        );
        assert_eq!(s.gained, 4);
    }

    #[test]
    fn full_checkerboard_has_no_moves() {
        let b = row_board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        for direction in Direction::ALL {
            let s = shift(b, direction);
            assert_eq!(s.board, b);
            assert_eq!(s.gained, 0);
        }
        assert!(is_game_over(b));
        assert_eq!(legal_moves(b), [false; 4]);
    }

    #[test]
    fn legal_moves_mask() {
        // Only a tile in the top-left corner: Down and Right move it.
        let b = row_board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(legal_moves(b), [false, true, false, true]);
        assert!(has_legal_move(b));
    }

    #[test]
    fn shifts_conserve_tile_sum() {
        let b = Board::from_raw(0x1121230033004222);
        for direction in Direction::ALL {
            assert_eq!(shift(b, direction).board.tile_sum(), b.tile_sum());
        }
    }

    #[test]
    fn it_count_empty() {
        let game = Board::from_raw(0x1111000011110000);
        assert_eq!(count_empty(game), 8);
        let game = Board::from_raw(0x1100000000000000);
        assert_eq!(count_empty(game), 14);
    }

    #[test]
    fn it_get_tile_val() {
        let game = Board::from_raw(0x0123456789abcdef);
        assert_eq!(get_tile_val(game, 3), 8);
        assert_eq!(get_tile_val(game, 10), 1024);
        assert_eq!(get_tile_val(game, 15), 32768);
        assert_eq!(get_tile_val(Board::EMPTY, 8), 0);
        assert_eq!(get_highest_tile_val(game), 32768);
        assert_eq!(get_highest_tile_val(Board::EMPTY), 0);
    }
}
