//! Tetromino definitions and shapes
//!
//! All 7 standard tetrominoes as square masks. Rotation is a pure mask
//! transform (transpose, then reverse each row) with no wall kicks.

use ratatui::style::Color;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // long bar
    J,
    L,
    O, // square
    S,
    T,
    Z,
}

impl TetrominoType {
    /// Numeric identity of this type, 1-7 (0 is the empty cell value)
    pub fn id(self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::J => 2,
            TetrominoType::L => 3,
            TetrominoType::O => 4,
            TetrominoType::S => 5,
            TetrominoType::T => 6,
            TetrominoType::Z => 7,
        }
    }

    /// Get the display color for this tetromino
    pub fn color(self) -> Color {
        match self {
            TetrominoType::I => Color::Rgb(255, 13, 114),
            TetrominoType::J => Color::Rgb(13, 194, 255),
            TetrominoType::L => Color::Rgb(13, 255, 114),
            TetrominoType::O => Color::Rgb(245, 56, 255),
            TetrominoType::S => Color::Rgb(255, 142, 13),
            TetrominoType::T => Color::Rgb(255, 225, 56),
            TetrominoType::Z => Color::Rgb(56, 119, 255),
        }
    }

    /// Get all tetromino types
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::T,
            TetrominoType::Z,
        ]
    }

    /// Get the canonical spawn mask for this tetromino
    pub fn mask(self) -> Mask {
        match self {
            TetrominoType::I => Mask::from_rows([
                [0, 0, 0, 0],
                [1, 1, 1, 1],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
            ]),
            // J..    L: ..L
            // JJJ       LLL
            TetrominoType::J => Mask::from_rows([[1, 0, 0], [1, 1, 1], [0, 0, 0]]),
            TetrominoType::L => Mask::from_rows([[0, 0, 1], [1, 1, 1], [0, 0, 0]]),
            TetrominoType::O => Mask::from_rows([[1, 1], [1, 1]]),
            // .SS   Z: ZZ.
            // SS.       .ZZ
            TetrominoType::S => Mask::from_rows([[0, 1, 1], [1, 1, 0], [0, 0, 0]]),
            TetrominoType::T => Mask::from_rows([[0, 1, 0], [1, 1, 1], [0, 0, 0]]),
            TetrominoType::Z => Mask::from_rows([[1, 1, 0], [0, 1, 1], [0, 0, 0]]),
        }
    }
}

/// A piece's occupancy mask: a square grid of side 2, 3, or 4, stored in
/// a fixed 4x4 backing array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mask {
    side: usize,
    cells: [[bool; 4]; 4],
}

impl Mask {
    /// Build a mask from row-major literal rows (nonzero = filled)
    fn from_rows<const N: usize>(rows: [[u8; N]; N]) -> Self {
        let mut cells = [[false; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                cells[r][c] = v != 0;
            }
        }
        Self { side: N, cells }
    }

    /// Side length of the square mask
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.side && col < self.side && self.cells[row][col]
    }

    /// Rotate 90 degrees clockwise: transpose, then reverse each row.
    /// Applied uniformly to every type; a no-op for O, a two-state flip
    /// for I, S, and Z.
    pub fn rotated_cw(&self) -> Self {
        let n = self.side;
        let mut cells = [[false; 4]; 4];
        for r in 0..n {
            for c in 0..n {
                cells[r][c] = self.cells[n - 1 - c][r];
            }
        }
        Self { side: n, cells }
    }

    /// Iterate over filled cells as (row, col) within the mask
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.side;
        (0..n).flat_map(move |r| (0..n).filter(move |&c| self.cells[r][c]).map(move |c| (r, c)))
    }
}
