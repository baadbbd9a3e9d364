// src/rules.rs
//! Path clearing and the check / checkmate queries.
//!
//! Everything here works on a bare [`Board`]; turn bookkeeping lives in [`crate::game`].
//! The checkmate search provisionally executes candidates on the board it is given and
//! always restores it before returning.

use crate::board::Board;
use crate::piece::{Color, PieceKind};
use crate::square::Square;

/// Line along which a move travels, classified from the two endpoints.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis { Horizontal, Vertical, Diagonal }

impl Axis {
    pub fn of(from: Square, to: Square) -> Axis {
        if from.row() == to.row() { Axis::Horizontal }
        else if from.col() == to.col() { Axis::Vertical }
        else { Axis::Diagonal }
    }
}

/// Whether the piece on `from` has nothing in its way to `to`.
///
/// Knights always pass. Pawns may only move diagonally onto an enemy piece and only
/// straight onto empty squares, including the square skipped by a double step. Sliding
/// pieces need the squares strictly between the two endpoints to be empty.
pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let piece = match board.piece_at(from) {
        Some(p) => *p,
        None => return false,
    };
    match piece.kind() {
        PieceKind::Knight => true,
        PieceKind::Pawn => pawn_path_clear(board, piece.color(), from, to),
        kind if kind.is_sliding() => from.between(to).iter().all(|sq| board.is_empty(*sq)),
        // One step: nothing lies between.
        _ => true,
    }
}

fn pawn_path_clear(board: &Board, color: Color, from: Square, to: Square) -> bool {
    match Axis::of(from, to) {
        Axis::Diagonal => board.color_at(to) == Some(color.opponent()),
        Axis::Vertical => {
            board.is_empty(to) && from.between(to).iter().all(|sq| board.is_empty(*sq))
        }
        Axis::Horizontal => false,
    }
}

/// Pseudo-legal reach: `to` is in the move set of the piece on `from`, is not held by a
/// piece of the same color, and the path is clear. Says nothing about self-check.
pub fn can_reach(board: &Board, from: Square, to: Square) -> bool {
    let piece = match board.piece_at(from) {
        Some(p) => p,
        None => return false,
    };
    if board.color_at(to) == Some(piece.color()) {
        return false;
    }
    piece.move_set().contains(&to) && path_clear(board, from, to)
}

/// True when any piece of the other color can reach `color`'s king.
/// A board without a king for `color` is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let king = match board.king_square(color) {
        Some(sq) => sq,
        None => return false,
    };
    board.squares_of(color.opponent()).iter().any(|attacker| can_reach(board, *attacker, king))
}

/// Executes `from -> to` on the board, checks whether `color`'s king is left attacked,
/// and restores the board before returning.
pub fn leaves_king_attacked(board: &mut Board, color: Color, from: Square, to: Square) -> bool {
    let snapshot = board.snapshot(&[from, to]);
    board.relocate(from, to);
    let attacked = is_in_check(board, color);
    board.restore(snapshot);
    attacked
}

/// Every (origin, destination) pair `color` could physically play, ignoring self-check.
pub fn candidate_moves(board: &Board, color: Color) -> Vec<(Square, Square)> {
    let mut candidates = Vec::new();
    for piece in board.pieces_of(color) {
        let from = piece.square();
        for to in piece.move_set() {
            if can_reach(board, from, to) {
                candidates.push((from, to));
            }
        }
    }
    candidates
}

/// Exhaustive search for a move that gets `color` out of check. Only meaningful while
/// `color` is in check; the board is left exactly as it was found.
pub fn is_checkmate(board: &mut Board, color: Color) -> bool {
    if !is_in_check(board, color) {
        return false;
    }
    candidate_moves(board, color)
        .into_iter()
        .all(|(from, to)| leaves_king_attacked(board, color, from, to))
}
