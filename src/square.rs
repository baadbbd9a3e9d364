// src/square.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SquareParseError;

pub const BOARD_SIZE: u8 = 8;

/// A board coordinate. Row 0 is Black's back rank, row 7 is White's.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawSquare")]
pub struct Square {
    row: u8,
    col: u8,
}

/// Unchecked wire form; deserialized squares are bounds-checked through it.
#[derive(Deserialize)]
struct RawSquare {
    row: i32,
    col: i32,
}

impl TryFrom<RawSquare> for Square {
    type Error = String;

    fn try_from(raw: RawSquare) -> Result<Self, Self::Error> {
        Square::checked(raw.row, raw.col).ok_or_else(|| format!("square ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl Square {
    /// Panics if either coordinate is off the board.
    pub const fn new(row: u8, col: u8) -> Self {
        assert!(row < BOARD_SIZE && col < BOARD_SIZE, "square out of bounds");
        Square { row, col }
    }

    /// Bounds-checked constructor for signed arithmetic results.
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        let size = BOARD_SIZE as i32;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Square { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn row(&self) -> u8 { self.row }

    #[inline(always)]
    pub fn col(&self) -> u8 { self.col }

    /// Index 0-63 in row-major order, used for the precomputed tables.
    #[inline(always)]
    pub fn index(&self) -> usize { (self.row * BOARD_SIZE + self.col) as usize }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Option<Square> {
        Square::checked(self.row as i32 + d_row, self.col as i32 + d_col)
    }

    /// Every square in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Square { row, col }))
    }

    /// Squares strictly between `self` and `other` along a shared row, column or diagonal.
    /// Empty when the two squares are adjacent or do not share a line.
    pub fn between(&self, other: Square) -> Vec<Square> {
        let d_row = other.row as i32 - self.row as i32;
        let d_col = other.col as i32 - self.col as i32;
        let aligned = d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs();
        if !aligned || (d_row == 0 && d_col == 0) {
            return Vec::new();
        }
        let (step_row, step_col) = (d_row.signum(), d_col.signum());
        let mut squares = Vec::new();
        let mut current = self.offset(step_row, step_col);
        while let Some(sq) = current {
            if sq == other { break; }
            squares.push(sq);
            current = sq.offset(step_row, step_col);
        }
        squares
    }

    /// Algebraic name such as "e2" (file from the column, rank counted from White's side).
    pub fn to_algebraic(&self) -> String {
        let file_char = (b'a' + self.col) as char;
        let rank_char = (b'1' + (BOARD_SIZE - 1 - self.row)) as char;
        format!("{}{}", file_char, rank_char)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.row, self.col)
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (file_char, rank_char) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => (f.to_ascii_lowercase(), r),
            _ => return Err(SquareParseError(s.to_string())),
        };
        let col = match file_char { 'a'..='h' => file_char as u8 - b'a', _ => return Err(SquareParseError(s.to_string())) };
        let rank = match rank_char { '1'..='8' => rank_char as u8 - b'1', _ => return Err(SquareParseError(s.to_string())) };
        Ok(Square::new(BOARD_SIZE - 1 - rank, col))
    }
}
