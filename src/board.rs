// src/board.rs
use std::collections::BTreeSet;

use crate::piece::{Color, Piece, PieceKind};
use crate::square::{Square, BOARD_SIZE};

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

/// The 8x8 grid together with the per-color piece index and king lookup.
///
/// All placement and removal goes through [`Board::place`] and [`Board::take`], which
/// update the grid and the index together, so index membership always matches
/// presence on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    index: [BTreeSet<Square>; 2],
    kings: [Option<Square>; 2],
}

/// Prior contents of a handful of cells, captured before a provisional move.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    cells: Vec<(Square, Option<Piece>)>,
}

impl Default for Board {
    fn default() -> Self { Board::empty() }
}

impl Board {
    pub fn empty() -> Self {
        Board {
            grid: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
            index: [BTreeSet::new(), BTreeSet::new()],
            kings: [None, None],
        }
    }

    /// The standard opening position, White on rows 6-7.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            let back = color.back_row();
            let pawns = (back as i32 + color.forward()) as u8;
            for (col, kind) in BACK_RANK.iter().enumerate() {
                board.place(Piece::new(*kind, color, Square::new(back, col as u8)));
                board.place(Piece::new(PieceKind::Pawn, color, Square::new(pawns, col as u8)));
            }
        }
        board
    }

    /// Builds a board from loose pieces; a later piece on the same square replaces an earlier one.
    pub fn from_pieces<I: IntoIterator<Item = Piece>>(pieces: I) -> Self {
        let mut board = Board::empty();
        for piece in pieces {
            board.place(piece);
        }
        board
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.grid[sq.row() as usize][sq.col() as usize].as_ref()
    }

    #[inline(always)]
    pub fn is_empty(&self, sq: Square) -> bool { self.piece_at(sq).is_none() }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|p| p.color())
    }

    /// Squares holding live pieces of `color`.
    pub fn squares_of(&self, color: Color) -> &BTreeSet<Square> {
        &self.index[color.index()]
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.index[color.index()].iter().filter_map(move |sq| self.piece_at(*sq))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    /// Occupied squares in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.grid.iter().flat_map(|row| row.iter().flatten())
    }

    pub fn piece_count(&self) -> usize {
        self.index[0].len() + self.index[1].len()
    }

    // --- Mutation Interface ---

    /// Puts `piece` on its own square, returning whatever was displaced.
    pub fn place(&mut self, piece: Piece) -> Option<Piece> {
        let sq = piece.square();
        let displaced = self.take(sq);
        self.grid[sq.row() as usize][sq.col() as usize] = Some(piece);
        self.index[piece.color().index()].insert(sq);
        if piece.kind() == PieceKind::King {
            self.kings[piece.color().index()] = Some(sq);
        }
        displaced
    }

    /// Removes and returns the piece on `sq`.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.grid[sq.row() as usize][sq.col() as usize].take()?;
        let color = piece.color();
        self.index[color.index()].remove(&sq);
        if self.kings[color.index()] == Some(sq) {
            self.kings[color.index()] = self.find_king(color);
        }
        Some(piece)
    }

    /// Moves the piece on `from` to `to`, capturing any occupant. Returns the captured piece.
    pub(crate) fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mut piece = self.take(from)?;
        let captured = self.take(to);
        piece.move_to(to);
        self.place(piece);
        captured
    }

    fn find_king(&self, color: Color) -> Option<Square> {
        self.index[color.index()].iter().copied()
            .find(|sq| self.piece_at(*sq).map_or(false, |p| p.kind() == PieceKind::King))
    }

    // --- Provisional Moves ---

    pub(crate) fn snapshot(&self, squares: &[Square]) -> Snapshot {
        let mut cells: Vec<(Square, Option<Piece>)> = Vec::with_capacity(squares.len());
        for sq in squares {
            if !cells.iter().any(|(seen, _)| seen == sq) {
                cells.push((*sq, self.piece_at(*sq).copied()));
            }
        }
        Snapshot { cells }
    }

    /// Puts every captured cell back exactly as it was, index included.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        for (sq, _) in &snapshot.cells {
            self.take(*sq);
        }
        for (_, prior) in snapshot.cells {
            if let Some(piece) = prior {
                self.place(piece);
            }
        }
    }

    /// Debug check of the grid/index invariant.
    pub fn is_consistent(&self) -> bool {
        let on_grid = Square::all().filter(|sq| !self.is_empty(*sq)).count();
        let grid_matches = Square::all().all(|sq| match self.piece_at(sq) {
            Some(p) => p.square() == sq && self.index[p.color().index()].contains(&sq),
            None => !self.index[0].contains(&sq) && !self.index[1].contains(&sq),
        });
        let kings_match = [Color::White, Color::Black].iter().all(|c| match self.kings[c.index()] {
            Some(sq) => self.piece_at(sq).map_or(false, |p| p.kind() == PieceKind::King && p.color() == *c),
            None => self.find_king(*c).is_none(),
        });
        grid_matches && kings_match && on_grid == self.piece_count()
    }
}
