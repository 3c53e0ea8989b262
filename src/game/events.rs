//! State-change notifications for whatever renders the battle.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::cards::card_catalog::CardId;
use crate::game::turn::Phase;
use crate::game_state::chess_types::{PieceKind, Square};
use crate::game_state::status::StatusExpiry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The board, selection or move cache changed; re-render.
    BoardChanged,
    CardPlayed {
        card: CardId,
        message: String,
    },
    Rejected(String),
    EnemyMoved {
        from: Square,
        to: Square,
        captured: Option<PieceKind>,
        /// The capture bounced off a protection.
        blocked: bool,
    },
    EnemyPassed {
        reason: String,
    },
    StatusExpired(StatusExpiry),
    TurnStarted {
        turn: u32,
    },
    BattleEnded(Phase),
}

/// Fan-out of session events to every live subscriber.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event`; subscribers whose receiver was dropped are removed.
    pub fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
