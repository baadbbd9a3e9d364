// src/save.rs
//! Plain-text saved games.
//!
//! ```text
//! true
//! 0 0 R false
//! 0 1 Kn false
//! ...
//! ```
//!
//! The first line is the turn flag (`true` = White to move). Every following line is
//! `row col shortCode colorFlag` for one occupied square, in row-major order. The
//! has-moved history of pieces is not recorded.

use std::io::BufRead;

use crate::board::Board;
use crate::error::LoadError;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// How `parse` treats lines it cannot use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Unusable lines are skipped silently.
    #[default]
    Lenient,
    /// The first unusable line aborts the load with [`LoadError::Malformed`].
    Strict,
}

/// A fully rebuilt position, ready to swap in for the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGame {
    pub board: Board,
    pub white_turn: bool,
}

pub fn write(board: &Board, white_turn: bool) -> String {
    let mut text = String::with_capacity(16 + board.piece_count() * 12);
    text.push_str(if white_turn { "true" } else { "false" });
    text.push('\n');
    for piece in board.occupied() {
        let sq = piece.square();
        text.push_str(&format!("{} {} {} {}\n", sq.row(), sq.col(), piece.short_code(), piece.color().flag()));
    }
    text
}

/// Rebuilds a position from saved text, starting from an empty board.
/// `white_turn` is kept when the source has no turn line.
pub fn parse<R: BufRead>(reader: R, policy: LoadPolicy, white_turn: bool) -> Result<SavedGame, LoadError> {
    let mut board = Board::empty();
    let mut white_turn = white_turn;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let parsed = match tokens.as_slice() {
            [] => Ok(Line::Blank),
            [flag] => parse_flag(flag, policy).map(Line::Turn),
            [row, col, code, flag] => parse_piece(row, col, code, flag, policy).map(Line::Piece),
            other => Err(format!("expected 1 or 4 tokens, found {}", other.len())),
        };
        match parsed {
            Ok(Line::Blank) => {}
            Ok(Line::Turn(flag)) => white_turn = flag,
            Ok(Line::Piece(piece)) => { board.place(piece); }
            Err(reason) => {
                if policy == LoadPolicy::Strict {
                    return Err(LoadError::Malformed { line: number + 1, reason });
                }
            }
        }
    }

    Ok(SavedGame { board, white_turn })
}

enum Line {
    Blank,
    Turn(bool),
    Piece(Piece),
}

/// Flags ignore case. Under [`LoadPolicy::Lenient`] anything but "true" reads as false.
fn parse_flag(token: &str, policy: LoadPolicy) -> Result<bool, String> {
    if token.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if token.eq_ignore_ascii_case("false") || policy == LoadPolicy::Lenient {
        Ok(false)
    } else {
        Err(format!("invalid flag '{}'", token))
    }
}

fn parse_piece(row: &str, col: &str, code: &str, flag: &str, policy: LoadPolicy) -> Result<Piece, String> {
    let row: i32 = row.parse().map_err(|_| format!("invalid row '{}'", row))?;
    let col: i32 = col.parse().map_err(|_| format!("invalid column '{}'", col))?;
    let square = Square::checked(row, col).ok_or_else(|| format!("square ({}, {}) is off the board", row, col))?;
    let kind = PieceKind::from_short_code(code).ok_or_else(|| format!("unknown piece code '{}'", code))?;
    let color = Color::from_flag(parse_flag(flag, policy)?);
    Ok(Piece::new(kind, color, square))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_board_text_layout() {
        let text = write(&Board::standard(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 33);
        assert_eq!(lines[0], "true");
        assert_eq!(lines[1], "0 0 R false");
        assert_eq!(lines[2], "0 1 Kn false");
        assert_eq!(lines[5], "0 4 K false");
        assert_eq!(lines[32], "7 7 R true");
    }

    #[test]
    fn lenient_parse_skips_garbage() {
        let text = "false\n\n3 3 Q true\nhello there\n9 9 K true\n2 2 X false\n0 4 K false extra\n";
        let saved = parse(Cursor::new(text), LoadPolicy::Lenient, true).unwrap();
        assert!(!saved.white_turn);
        assert_eq!(saved.board.piece_count(), 1);
        let queen = saved.board.piece_at(Square::new(3, 3)).unwrap();
        assert_eq!((queen.kind(), queen.color(), queen.has_moved()), (PieceKind::Queen, Color::White, false));
    }

    #[test]
    fn strict_parse_reports_line() {
        let text = "true\n0 4 K false\n2 2 X false\n";
        match parse(Cursor::new(text), LoadPolicy::Strict, true) {
            Err(LoadError::Malformed { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("'X'"));
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn flags_ignore_case_and_lenient_reads_unknown_as_false() {
        let saved = parse(Cursor::new("TRUE\n7 4 K True\n0 4 K no\n"), LoadPolicy::Lenient, false).unwrap();
        assert!(saved.white_turn);
        assert_eq!(saved.board.color_at(Square::new(7, 4)), Some(Color::White));
        assert_eq!(saved.board.color_at(Square::new(0, 4)), Some(Color::Black));

        let saved = parse(Cursor::new("False\n"), LoadPolicy::Strict, true).unwrap();
        assert!(!saved.white_turn);
        assert!(parse(Cursor::new("yes\n"), LoadPolicy::Strict, true).is_err());
    }

    #[test]
    fn missing_turn_line_keeps_default() {
        let saved = parse(Cursor::new("7 4 K true\n"), LoadPolicy::Strict, false).unwrap();
        assert!(!saved.white_turn);
        assert_eq!(saved.board.king_square(Color::White), Some(Square::new(7, 4)));
    }
}
