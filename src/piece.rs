// src/piece.rs
use lazy_static::lazy_static;
use std::fmt;

use crate::square::{Square, BOARD_SIZE};

// Rays for sliding pieces: (d_row, d_col)
const ORTHOGONAL_RAYS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL_RAYS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    ( 1, -2), ( 1, 2), ( 2, -1), ( 2, 1),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    ( 0,  1), ( 1, -1), ( 1, 0), (1, 1),
];

// --- Precomputed Jump Tables ---

lazy_static! {
    static ref KNIGHT_TARGETS: Vec<Vec<Square>> = compute_jump_targets(&KNIGHT_OFFSETS);
    static ref KING_TARGETS: Vec<Vec<Square>> = compute_jump_targets(&KING_OFFSETS);
}

fn compute_jump_targets(offsets: &[(i32, i32)]) -> Vec<Vec<Square>> {
    Square::all()
        .map(|from| offsets.iter().filter_map(|&(dr, dc)| from.offset(dr, dc)).collect())
        .collect()
}

// --- Enums ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color { White, Black }

impl Color {
    pub fn opponent(&self) -> Color {
        match self { Color::White => Color::Black, Color::Black => Color::White }
    }

    /// Slot in per-color arrays.
    #[inline(always)]
    pub fn index(&self) -> usize {
        match self { Color::White => 0, Color::Black => 1 }
    }

    /// Saved games and the turn flag encode White as `true`.
    pub fn from_flag(is_white: bool) -> Color {
        if is_white { Color::White } else { Color::Black }
    }

    pub fn flag(&self) -> bool { *self == Color::White }

    /// Row delta of a single pawn step.
    pub fn forward(&self) -> i32 {
        match self { Color::White => -1, Color::Black => 1 }
    }

    /// Row on which pawns of this color promote.
    pub fn promotion_row(&self) -> u8 {
        match self { Color::White => 0, Color::Black => BOARD_SIZE - 1 }
    }

    pub fn back_row(&self) -> u8 { self.opponent().promotion_row() }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind { Pawn, Knight, Bishop, Rook, Queen, King }

impl PieceKind {
    /// Code written to saved games.
    pub fn short_code(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "P", PieceKind::Knight => "Kn", PieceKind::Bishop => "B",
            PieceKind::Rook => "R", PieceKind::Queen => "Q", PieceKind::King => "K",
        }
    }

    pub fn from_short_code(code: &str) -> Option<PieceKind> {
        match code {
            "P" => Some(PieceKind::Pawn), "Kn" => Some(PieceKind::Knight), "B" => Some(PieceKind::Bishop),
            "R" => Some(PieceKind::Rook), "Q" => Some(PieceKind::Queen), "K" => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Rooks, bishops and queens: their paths must be clear of intervening pieces.
    pub fn is_sliding(&self) -> bool {
        matches!(self, PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen)
    }
}

// --- Piece ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    square: Square,
    has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, square: Square) -> Self {
        Piece { kind, color, square, has_moved: false }
    }

    pub fn kind(&self) -> PieceKind { self.kind }
    pub fn color(&self) -> Color { self.color }
    pub fn square(&self) -> Square { self.square }
    pub fn has_moved(&self) -> bool { self.has_moved }
    pub fn short_code(&self) -> &'static str { self.kind.short_code() }

    pub fn glyph(&self) -> &'static str {
        match (self.color, self.kind) {
            (Color::White, PieceKind::King) => "\u{2654}",
            (Color::White, PieceKind::Queen) => "\u{2655}",
            (Color::White, PieceKind::Rook) => "\u{2656}",
            (Color::White, PieceKind::Bishop) => "\u{2657}",
            (Color::White, PieceKind::Knight) => "\u{2658}",
            (Color::White, PieceKind::Pawn) => "\u{2659}",
            (Color::Black, PieceKind::King) => "\u{265A}",
            (Color::Black, PieceKind::Queen) => "\u{265B}",
            (Color::Black, PieceKind::Rook) => "\u{265C}",
            (Color::Black, PieceKind::Bishop) => "\u{265D}",
            (Color::Black, PieceKind::Knight) => "\u{265E}",
            (Color::Black, PieceKind::Pawn) => "\u{265F}",
        }
    }

    /// Uppercase for White, lowercase for Black.
    pub fn ascii(&self) -> char {
        let symbol = match self.kind {
            PieceKind::Pawn => 'p', PieceKind::Knight => 'n', PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r', PieceKind::Queen => 'q', PieceKind::King => 'k',
        };
        match self.color {
            Color::White => symbol.to_ascii_uppercase(),
            Color::Black => symbol,
        }
    }

    /// Relocates the piece and marks it as moved. No validation.
    pub fn move_to(&mut self, square: Square) {
        self.square = square;
        self.has_moved = true;
    }

    /// Squares reachable by raw geometry from the current square, ignoring occupancy.
    pub fn move_set(&self) -> Vec<Square> {
        match self.kind {
            PieceKind::Pawn => self.pawn_move_set(),
            PieceKind::Knight => KNIGHT_TARGETS[self.square.index()].clone(),
            PieceKind::King => KING_TARGETS[self.square.index()].clone(),
            PieceKind::Bishop => self.ray_move_set(&DIAGONAL_RAYS),
            PieceKind::Rook => self.ray_move_set(&ORTHOGONAL_RAYS),
            PieceKind::Queen => {
                let mut moves = self.ray_move_set(&ORTHOGONAL_RAYS);
                moves.extend(self.ray_move_set(&DIAGONAL_RAYS));
                moves
            }
        }
    }

    fn ray_move_set(&self, rays: &[(i32, i32)]) -> Vec<Square> {
        let mut moves = Vec::with_capacity(14);
        for &(dr, dc) in rays {
            let mut current = self.square.offset(dr, dc);
            while let Some(sq) = current {
                moves.push(sq);
                current = sq.offset(dr, dc);
            }
        }
        moves
    }

    fn pawn_move_set(&self) -> Vec<Square> {
        let forward = self.color.forward();
        let mut moves = Vec::with_capacity(4);
        moves.extend(self.square.offset(forward, 0));
        if !self.has_moved {
            moves.extend(self.square.offset(2 * forward, 0));
        }
        moves.extend(self.square.offset(forward, -1));
        moves.extend(self.square.offset(forward, 1));
        moves
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}
