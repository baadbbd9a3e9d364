// src/game.rs
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use crate::board::{Board, Snapshot};
use crate::error::LoadError;
use crate::network::MoveMessage;
use crate::notify::{GameEvent, Listener, ListenerId, Listeners, MoveNotification};
use crate::piece::{Color, Piece, PieceKind};
use crate::rules;
use crate::save::{self, LoadPolicy};
use crate::square::{Square, BOARD_SIZE};

/// Short castles start three columns apart, long castles four.
const SHORT_CASTLE_DISTANCE: i32 = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CastleSide { Short, Long }

/// Where the king and rook start and land for one castle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Castle {
    pub side: CastleSide,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// A move that passed every check except the self-check test.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum MovePlan {
    Standard { from: Square, to: Square },
    Castle(Castle),
}

// --- Game State ---

/// A two-player game: the board, whose turn it is, and the event subscribers.
///
/// Moves are submitted as an origin/destination pair of squares. Illegal submissions
/// are answered with `false` (or `None`) and never touch the board.
#[derive(Debug)]
pub struct Game {
    board: Board,
    white_turn: bool,
    load_policy: LoadPolicy,
    listeners: Listeners,
}

impl Default for Game {
    fn default() -> Self { Game::new() }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

impl Game {
    /// Standard opening position, White to move.
    pub fn new() -> Self { Game::with_side_to_move(true) }

    pub fn with_side_to_move(white_turn: bool) -> Self {
        Game::from_board(Board::standard(), white_turn)
    }

    pub fn from_board(board: Board, white_turn: bool) -> Self {
        Game { board, white_turn, load_policy: LoadPolicy::default(), listeners: Listeners::default() }
    }

    pub fn board(&self) -> &Board { &self.board }

    pub fn is_white_turn(&self) -> bool { self.white_turn }

    pub fn side_to_move(&self) -> Color { Color::from_flag(self.white_turn) }

    pub fn set_white_turn(&mut self, white_turn: bool) { self.white_turn = white_turn; }

    pub fn load_policy(&self) -> LoadPolicy { self.load_policy }

    pub fn set_load_policy(&mut self, policy: LoadPolicy) { self.load_policy = policy; }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId { self.listeners.subscribe(listener) }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool { self.listeners.unsubscribe(id) }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> { self.board.piece_at(sq) }

    /// Display glyph of the piece on `sq`, or "" for an empty square.
    pub fn piece_glyph_at(&self, sq: Square) -> &'static str {
        self.board.piece_at(sq).map_or("", |p| p.glyph())
    }

    pub fn is_in_check(&self, color: Color) -> bool { rules::is_in_check(&self.board, color) }

    pub fn is_checkmate(&self, color: Color) -> bool {
        let mut scratch = self.board.clone();
        rules::is_checkmate(&mut scratch, color)
    }

    // --- Two-Phase Selection ---

    /// First selection: the square must hold a piece of the side to move.
    pub fn try_select_origin(&self, sq: Square) -> bool {
        self.board.color_at(sq) == Some(self.side_to_move())
    }

    /// Second selection: would `commit_move(origin, dest)` be accepted? Never mutates the game.
    pub fn is_legal_destination(&self, origin: Square, dest: Square) -> bool {
        let mut scratch = self.board.clone();
        probe(&mut scratch, self.side_to_move(), origin, dest)
    }

    /// Every square `commit_move` would accept for the piece on `origin`, castling partners included.
    pub fn legal_destinations_from(&self, origin: Square) -> BTreeSet<Square> {
        if !self.try_select_origin(origin) {
            return BTreeSet::new();
        }
        let side = self.side_to_move();
        let mut scratch = self.board.clone();
        Square::all().filter(|dest| probe(&mut scratch, side, origin, *dest)).collect()
    }

    /// The castle that selecting `first` then `second` would attempt, before the self-check test.
    pub fn castle_plan(&self, first: Square, second: Square) -> Option<Castle> {
        plan_castle(&self.board, self.side_to_move(), first, second)
    }

    // --- Commit ---

    /// Plays `origin -> dest` for the side to move and notifies subscribers.
    /// Returns `false`, leaving the game untouched, when the move is illegal.
    pub fn commit_move(&mut self, origin: Square, dest: Square) -> bool {
        match self.execute(origin, dest) {
            Some(notification) => {
                self.listeners.emit(&GameEvent::Moved(notification));
                true
            }
            None => false,
        }
    }

    /// Same commit path as [`Game::commit_move`], but instead of notifying subscribers it
    /// hands back the message to send to the remote player.
    pub fn networked_move(&mut self, origin: Square, dest: Square) -> Option<MoveMessage> {
        self.execute(origin, dest).map(|notification| MoveMessage::from(&notification))
    }

    fn execute(&mut self, origin: Square, dest: Square) -> Option<MoveNotification> {
        let side = self.side_to_move();
        let plan = plan_move(&self.board, side, origin, dest)?;

        let snapshot = apply_plan(&mut self.board, plan);
        if rules::is_in_check(&self.board, side) {
            self.board.restore(snapshot);
            return None;
        }

        let (king_after, rook_after) = match plan {
            MovePlan::Standard { to, .. } => {
                self.promote_if_last_rank(to);
                (None, None)
            }
            MovePlan::Castle(castle) => (Some(castle.king_to), Some(castle.rook_to)),
        };

        self.white_turn = !self.white_turn;

        let opponent = side.opponent();
        let gives_check = rules::is_in_check(&self.board, opponent);
        let is_checkmate = gives_check && rules::is_checkmate(&mut self.board, opponent);

        Some(MoveNotification {
            origin,
            destination: dest,
            glyph: self.piece_glyph_at(dest).to_string(),
            gives_check,
            is_checkmate,
            is_castle: matches!(plan, MovePlan::Castle(_)),
            king_after,
            rook_after,
        })
    }

    /// A pawn standing on its promotion row becomes a queen of the same color.
    fn promote_if_last_rank(&mut self, sq: Square) {
        let pawn = match self.board.piece_at(sq) {
            Some(p) if p.kind() == PieceKind::Pawn && sq.row() == p.color().promotion_row() => *p,
            _ => return,
        };
        self.board.take(sq);
        let mut queen = Piece::new(PieceKind::Queen, pawn.color(), sq);
        queen.move_to(sq);
        self.board.place(queen);
    }

    // --- Persistence ---

    pub fn save(&self) -> String { save::write(&self.board, self.white_turn) }

    /// Replaces the position. With no source the standard opening is set up and
    /// `white_to_move_if_new` picks the side to move; otherwise the source is parsed
    /// under the current [`LoadPolicy`]. The live board is swapped only after the new one
    /// is complete, and subscribers get [`GameEvent::Reset`] on success. A failed load
    /// leaves the game as it was and emits nothing.
    pub fn load<R: BufRead>(&mut self, source: Option<R>, white_to_move_if_new: bool) -> Result<(), LoadError> {
        let (board, white_turn) = match source {
            None => (Board::standard(), white_to_move_if_new),
            Some(reader) => {
                let saved = save::parse(reader, self.load_policy, self.white_turn)?;
                (saved.board, saved.white_turn)
            }
        };
        self.board = board;
        self.white_turn = white_turn;
        self.listeners.emit(&GameEvent::Reset);
        Ok(())
    }

    pub fn load_str(&mut self, text: &str) -> Result<(), LoadError> {
        let white_turn = self.white_turn;
        self.load(Some(Cursor::new(text)), white_turn)
    }

    /// [`Game::load`] from a file; `None` starts a new game.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: Option<P>, white_to_move_if_new: bool) -> Result<(), LoadError> {
        match path {
            Some(path) => {
                let reader = BufReader::new(File::open(path)?);
                self.load(Some(reader), white_to_move_if_new)
            }
            None => self.load(None::<BufReader<File>>, white_to_move_if_new),
        }
    }

    pub fn new_game(&mut self, white_to_move: bool) {
        self.board = Board::standard();
        self.white_turn = white_to_move;
        self.listeners.emit(&GameEvent::Reset);
    }

    /// Text picture of the board, rank 8 at the top.
    pub fn render(&self, unicode: bool) -> String {
        let mut out = String::new();
        out.push_str("  +-----------------+\n");
        for row in 0..BOARD_SIZE {
            out.push_str(&format!("{} | ", BOARD_SIZE - row));
            for col in 0..BOARD_SIZE {
                match self.board.piece_at(Square::new(row, col)) {
                    Some(piece) if unicode => out.push_str(piece.glyph()),
                    Some(piece) => out.push(piece.ascii()),
                    None => out.push('.'),
                }
                out.push(' ');
            }
            out.push_str("|\n");
        }
        out.push_str("  +-----------------+\n");
        out.push_str("    a b c d e f g h\n");
        out.push_str(&format!("Turn: {:?}\n", self.side_to_move()));
        out
    }
}

// --- Decision Procedure ---

/// Runs the full legality test for `origin -> dest` on `board` and leaves it unchanged.
fn probe(board: &mut Board, side: Color, origin: Square, dest: Square) -> bool {
    match plan_move(board, side, origin, dest) {
        Some(plan) => {
            let snapshot = apply_plan(board, plan);
            let safe = !rules::is_in_check(board, side);
            board.restore(snapshot);
            safe
        }
        None => false,
    }
}

/// Selection, geometry, occupancy and path checks; castling is tried first.
fn plan_move(board: &Board, side: Color, origin: Square, dest: Square) -> Option<MovePlan> {
    if board.color_at(origin) != Some(side) {
        return None;
    }
    if let Some(castle) = plan_castle(board, side, origin, dest) {
        return Some(MovePlan::Castle(castle));
    }
    if rules::can_reach(board, origin, dest) {
        Some(MovePlan::Standard { from: origin, to: dest })
    } else {
        None
    }
}

/// The two squares must hold an unmoved king and an unmoved rook of `side`, in either
/// order, on the same row with nothing between them, and `side` must not be in check.
fn plan_castle(board: &Board, side: Color, first: Square, second: Square) -> Option<Castle> {
    let a = board.piece_at(first)?;
    let b = board.piece_at(second)?;
    if a.color() != side || b.color() != side || a.has_moved() || b.has_moved() {
        return None;
    }
    let (king_from, rook_from) = match (a.kind(), b.kind()) {
        (PieceKind::King, PieceKind::Rook) => (first, second),
        (PieceKind::Rook, PieceKind::King) => (second, first),
        _ => return None,
    };
    if king_from.row() != rook_from.row() {
        return None;
    }
    if !king_from.between(rook_from).iter().all(|sq| board.is_empty(*sq)) {
        return None;
    }
    if rules::is_in_check(board, side) {
        return None;
    }

    let distance = rook_from.col() as i32 - king_from.col() as i32;
    let toward_rook = distance.signum();
    let king_to = king_from.offset(0, 2 * toward_rook)?;
    let rook_to = king_to.offset(0, -toward_rook)?;
    let landing_free = [king_to, rook_to]
        .iter()
        .all(|sq| board.is_empty(*sq) || *sq == king_from || *sq == rook_from);
    if !landing_free {
        return None;
    }

    let side = if distance.abs() == SHORT_CASTLE_DISTANCE { CastleSide::Short } else { CastleSide::Long };
    Some(Castle { side, king_from, king_to, rook_from, rook_to })
}

/// Carries out a plan and returns what is needed to undo it.
fn apply_plan(board: &mut Board, plan: MovePlan) -> Snapshot {
    match plan {
        MovePlan::Standard { from, to } => {
            let snapshot = board.snapshot(&[from, to]);
            board.relocate(from, to);
            snapshot
        }
        MovePlan::Castle(c) => {
            let snapshot = board.snapshot(&[c.king_from, c.rook_from, c.king_to, c.rook_to]);
            if let (Some(mut king), Some(mut rook)) = (board.take(c.king_from), board.take(c.rook_from)) {
                king.move_to(c.king_to);
                rook.move_to(c.rook_to);
                board.place(king);
                board.place(rook);
            }
            snapshot
        }
    }
}
