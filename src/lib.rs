// src/lib.rs
//! Chess rules engine for a click-to-move board.
//!
//! A move is submitted as two squares: an origin holding a piece of the side to move and
//! a destination. [`Game`] validates the pair (geometry, blocking pieces, castling,
//! self-check), applies it, promotes pawns, detects checkmate and reports what changed
//! through [`GameEvent`] subscribers. Positions save to and load from a small line-based
//! text format (see [`save`]).

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod notify;
pub mod piece;
pub mod rules;
pub mod save;
pub mod square;

pub use board::Board;
pub use config::Config;
pub use error::{ConfigError, LoadError, MessageError, SquareParseError};
pub use game::{Castle, CastleSide, Game};
pub use network::{MoveMessage, RemoteSession};
pub use notify::{GameEvent, ListenerId, MoveNotification};
pub use piece::{Color, Piece, PieceKind};
pub use save::LoadPolicy;
pub use square::Square;
