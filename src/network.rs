// src/network.rs
//! The move-exchange contract for two players on separate machines.
//!
//! The socket itself belongs to the application. This module only defines what travels
//! over it ([`MoveMessage`]) and a [`RemoteSession`] that keeps track of which side is
//! played locally. Incoming moves are never trusted: they go through the same selection
//! and commit checks as a local move.

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::game::Game;
use crate::notify::MoveNotification;
use crate::piece::Color;
use crate::square::Square;

/// A move intent as sent to the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMessage {
    pub origin: Square,
    pub destination: Square,
    pub glyph: String,
    pub is_checkmate: bool,
    pub is_castle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub king_after: Option<Square>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rook_after: Option<Square>,
}

impl From<&MoveNotification> for MoveMessage {
    fn from(n: &MoveNotification) -> Self {
        MoveMessage {
            origin: n.origin,
            destination: n.destination,
            glyph: n.glyph.clone(),
            is_checkmate: n.is_checkmate,
            is_castle: n.is_castle,
            king_after: n.king_after,
            rook_after: n.rook_after,
        }
    }
}

impl MoveMessage {
    pub fn to_json(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// One end of a networked game.
#[derive(Debug)]
pub struct RemoteSession {
    local: Color,
    game: Game,
}

impl RemoteSession {
    pub fn new(local: Color, game: Game) -> Self { RemoteSession { local, game } }

    pub fn local_color(&self) -> Color { self.local }

    pub fn game(&self) -> &Game { &self.game }

    pub fn game_mut(&mut self) -> &mut Game { &mut self.game }

    pub fn into_game(self) -> Game { self.game }

    pub fn is_my_turn(&self) -> bool { self.game.side_to_move() == self.local }

    /// Plays a local move. Returns the message to send, or `None` when it is not the
    /// local side's turn or the move is illegal.
    pub fn submit_local(&mut self, origin: Square, dest: Square) -> Option<MoveMessage> {
        if !self.is_my_turn() {
            return None;
        }
        self.game.networked_move(origin, dest)
    }

    /// Applies the opponent's move, re-validated from scratch. Subscribers of the game are
    /// notified when it is accepted.
    pub fn receive(&mut self, message: &MoveMessage) -> bool {
        if self.is_my_turn() {
            return false;
        }
        self.game.try_select_origin(message.origin) && self.game.commit_move(message.origin, message.destination)
    }

    pub fn receive_json(&mut self, text: &str) -> Result<bool, MessageError> {
        let message = MoveMessage::from_json(text)?;
        Ok(self.receive(&message))
    }
}
