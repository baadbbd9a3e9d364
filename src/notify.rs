// src/notify.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::square::Square;

/// What an accepted move changed, for whoever draws the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveNotification {
    pub origin: Square,
    pub destination: Square,
    /// Glyph now standing on `destination` ("" when a castle left it empty).
    pub glyph: String,
    /// The side that just moved attacks the opposing king.
    pub gives_check: bool,
    pub is_checkmate: bool,
    pub is_castle: bool,
    pub king_after: Option<Square>,
    pub rook_after: Option<Square>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Moved(MoveNotification),
    /// The whole board was replaced (new game or load); redraw everything.
    Reset,
}

pub type Listener = Box<dyn FnMut(&GameEvent)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Subscribers to game events, called in subscription order.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &GameEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("count", &self.entries.len()).finish()
    }
}
