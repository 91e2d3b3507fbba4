//! Key count dependent layout: the play mode and the column remap table.

use crate::model::Mode;

/// Horizontal size of the osu! playfield in osu! pixels.
const PLAYFIELD_WIDTH: i64 = 512;

const KEYS_4: &[Option<usize>] = &[Some(0), Some(2), Some(4), Some(6), None, None, None, None];
const KEYS_5: &[Option<usize>] = &[Some(0), Some(1), Some(2), Some(3), Some(4), None];
const KEYS_6: &[Option<usize>] = &[
    Some(0),
    Some(1),
    Some(2),
    Some(4),
    Some(5),
    Some(6),
    None,
    None,
];
const KEYS_7: &[Option<usize>] = &[
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
    None,
];
// The 8th key is the scratch, placed before the others.
const KEYS_8: &[Option<usize>] = &[
    Some(7),
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
];
const KEYS_9: &[Option<usize>] = &[
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
    Some(7),
    Some(8),
];
const KEYS_10: &[Option<usize>] = &[
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(6),
    Some(7),
    Some(8),
    Some(9),
    Some(10),
    None,
    None,
];
const KEYS_12: &[Option<usize>] = &[
    Some(5),
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(6),
    Some(7),
    Some(8),
    Some(9),
    Some(10),
    Some(11),
];
const KEYS_14: &[Option<usize>] = &[
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
    Some(8),
    Some(9),
    Some(10),
    Some(11),
    Some(12),
    Some(13),
    Some(14),
    None,
    None,
];
const KEYS_16: &[Option<usize>] = &[
    Some(7),
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
    Some(8),
    Some(9),
    Some(10),
    Some(11),
    Some(12),
    Some(13),
    Some(14),
    Some(15),
];

/// How osu!mania columns of one key count are laid on lanes of a play mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLayout {
    key_count: u32,
    mode: Mode,
    columns: &'static [Option<usize>],
}

impl KeyLayout {
    /// Layout for a key count, `None` if the key count is not supported.
    #[must_use]
    pub const fn for_key_count(key_count: u32) -> Option<Self> {
        let (mode, columns) = match key_count {
            4 => (Mode::Beat7K, KEYS_4),
            5 => (Mode::Beat5K, KEYS_5),
            6 => (Mode::Beat7K, KEYS_6),
            7 => (Mode::Beat7K, KEYS_7),
            8 => (Mode::Beat7K, KEYS_8),
            9 => (Mode::Popn9K, KEYS_9),
            10 => (Mode::Beat10K, KEYS_10),
            12 => (Mode::Beat10K, KEYS_12),
            14 => (Mode::Beat14K, KEYS_14),
            16 => (Mode::Beat14K, KEYS_16),
            _ => return None,
        };
        Some(Self {
            key_count,
            mode,
            columns,
        })
    }

    /// Key count of the osu!mania chart.
    #[must_use]
    pub const fn key_count(&self) -> u32 {
        self.key_count
    }

    /// Play mode the chart is converted into.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Remap table from physical column to lane, `None` for an unused slot.
    #[must_use]
    pub const fn columns(&self) -> &'static [Option<usize>] {
        self.columns
    }

    /// Physical column of a horizontal position, clamped into the key count.
    #[must_use]
    pub fn physical_column(&self, x: i32) -> usize {
        let key_count = i64::from(self.key_count);
        let column = (i64::from(x) * key_count).div_euclid(PLAYFIELD_WIDTH);
        column.clamp(0, key_count - 1) as usize
    }

    /// Lane of a horizontal position.
    #[must_use]
    pub fn lane_for_x(&self, x: i32) -> Option<usize> {
        self.columns
            .get(self.physical_column(x))
            .copied()
            .flatten()
    }
}
