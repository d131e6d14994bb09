//! Tetromino archetypes: their spawn matrices and colours
//!
//! Every archetype rotates through the same matrix transform, so only the
//! spawn orientation is stored here.

use rand::Rng;
use ratatui::style::Color;

/// The 7 tetromino archetypes, in selection-index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    L, // Red
    J, // Magenta
    O, // White - square
    S, // Green
    Z, // Yellow
    T, // Blue
}

impl TetrominoType {
    /// Number of archetypes
    pub const COUNT: usize = 7;

    /// All archetypes, indexed the same way as `from_index`
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::L,
            TetrominoType::J,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::T,
        ]
    }

    /// Map a selection index in `[0, 6]` to an archetype
    ///
    /// Panics on an index outside that range.
    pub fn from_index(index: usize) -> TetrominoType {
        assert!(index < Self::COUNT, "tetromino index {index} out of range");
        Self::all()[index]
    }

    /// Pick an archetype uniformly at random; repeats are possible
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> TetrominoType {
        Self::from_index(rng.gen_range(0..Self::COUNT))
    }

    /// Get the colour this archetype is drawn and settled with
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Cyan,
            TetrominoType::L => Color::Red,
            TetrominoType::J => Color::Magenta,
            TetrominoType::O => Color::White,
            TetrominoType::S => Color::Green,
            TetrominoType::Z => Color::Yellow,
            TetrominoType::T => Color::Blue,
        }
    }

    /// Spawn matrix, rows top to bottom, `1` = occupied
    pub fn matrix(&self) -> &'static [&'static [u8]] {
        match self {
            TetrominoType::I => &[&[1, 1, 1, 1]],
            // LLL
            // ..L
            TetrominoType::L => &[&[1, 1, 1], &[0, 0, 1]],
            // JJJ
            // J..
            TetrominoType::J => &[&[1, 1, 1], &[1, 0, 0]],
            TetrominoType::O => &[&[1, 1], &[1, 1]],
            // SS.
            // .SS
            TetrominoType::S => &[&[1, 1, 0], &[0, 1, 1]],
            // .ZZ
            // ZZ.
            TetrominoType::Z => &[&[0, 1, 1], &[1, 1, 0]],
            TetrominoType::T => &[&[1, 1, 1], &[0, 1, 0]],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::L => "L",
            TetrominoType::J => "J",
            TetrominoType::O => "O",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
            TetrominoType::T => "T",
        }
    }
}
