use std::sync::OnceLock;

use super::ops::{line_gain, shift_line};
use super::state::{Direction, Score};

/// Precomputed lookup tables for all possible 4-tile lines (16-bit packed).
///
/// Shifting/merging a row or column depends only on its 4 nibbles, so there
/// are 2^16 possible inputs. We precompute the shifted line for every
/// direction plus the merge score for both leading edges, which turns a board
/// shift into four lookups.
///
/// Layout:
/// - `shift_left/right/up/down[i]`: replacement line after applying the move
///   (columns already spread across 16-bit lanes).
/// - `gain_leading[i]`: score from merging toward index 0 (Left/Up).
/// - `gain_trailing[i]`: score from merging toward index 3 (Right/Down).
///
/// The tables are immutable once built and shared by every `Game`.
pub(crate) struct Stores {
    pub(crate) shift_left: Box<[u64]>,
    pub(crate) shift_right: Box<[u64]>,
    pub(crate) shift_up: Box<[u64]>,
    pub(crate) shift_down: Box<[u64]>,
    gain_leading: Box<[Score]>,
    gain_trailing: Box<[Score]>,
}

impl Stores {
    pub(crate) fn gains(&self, direction: Direction) -> &[Score] {
        if direction.is_reversed() {
            &self.gain_trailing
        } else {
            &self.gain_leading
        }
    }
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub(crate) fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    log::debug!("building {LINE_TABLE_SIZE}-entry line tables");
    // Allocate on the heap to keep stack frames small during init.
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut gain_leading = vec![0; LINE_TABLE_SIZE];
    let mut gain_trailing = vec![0; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as u64;
        shift_left[val] = shift_line(line, Direction::Left);
        shift_right[val] = shift_line(line, Direction::Right);
        shift_up[val] = shift_line(line, Direction::Up);
        shift_down[val] = shift_line(line, Direction::Down);
        gain_leading[val] = line_gain(line, false);
        gain_trailing[val] = line_gain(line, true);
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        gain_leading: gain_leading.into_boxed_slice(),
        gain_trailing: gain_trailing.into_boxed_slice(),
    }
}

#[inline(always)]
pub(crate) fn get_line_entry(table: &[u64], idx: u16) -> u64 {
    table[idx as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_every_line() {
        let s = stores();
        assert_eq!(s.shift_left.len(), LINE_TABLE_SIZE);
        assert_eq!(s.gain_trailing.len(), LINE_TABLE_SIZE);
        // [2, 2, 4, 0] -> [4, 4, 0, 0]
        assert_eq!(get_line_entry(&s.shift_left, 0x1120), 0x2200);
        assert_eq!(get_line_entry(s.gains(Direction::Left), 0x1120), 4);
        // Same line as a column, sliding up.
        assert_eq!(get_line_entry(&s.shift_up, 0x1120), 0x0002_0002_0000_0000);
        // Toward index 3: [2, 2, 4, 0] -> [0, 0, 4, 4]
        assert_eq!(get_line_entry(&s.shift_right, 0x1120), 0x0022);
        assert_eq!(get_line_entry(s.gains(Direction::Down), 0x1120), 4);
    }
}
