//! Per-turn movement augmentations granted by cards.
//!
//! Modifiers only ever apply to the player's pieces and are reset when a new
//! player turn begins.

use crate::cards::card_catalog::CardId;
use crate::game_state::chess_types::PieceId;

/// Extra reach granted to the piece chosen with Dash.
pub const DASH_RANGE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnModifiers {
    /// Extra steps for every step-limited piece (Rally).
    pub extra_range: u8,
    pub dash_piece: Option<PieceId>,
    pub ghost_piece: Option<PieceId>,
    pub ricochet_piece: Option<PieceId>,
    pub knights_tour: bool,
    pub piercing: bool,
    pub chain_reaction: bool,
    /// Moves allowed before the turn ends.
    pub moves_allowed: u8,
    /// A piece-arming card whose target has not been chosen yet.
    pub pending_arm: Option<CardId>,
}

impl Default for TurnModifiers {
    fn default() -> Self {
        Self {
            extra_range: 0,
            dash_piece: None,
            ghost_piece: None,
            ricochet_piece: None,
            knights_tour: false,
            piercing: false,
            chain_reaction: false,
            moves_allowed: 1,
            pending_arm: None,
        }
    }
}

impl TurnModifiers {
    /// Modifiers for a side that has none (the enemy, or simulations).
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// Additional steps available to `piece` this turn.
    #[inline]
    pub fn range_bonus(&self, piece: PieceId) -> u8 {
        let dash = if self.dash_piece == Some(piece) {
            DASH_RANGE
        } else {
            0
        };
        self.extra_range.saturating_add(dash)
    }

    #[inline]
    pub fn passes_through(&self, piece: PieceId) -> bool {
        self.ghost_piece == Some(piece)
    }

    /// Undo a piece-arming card that was selected but never resolved.
    pub fn disarm_pending(&mut self) -> Option<CardId> {
        self.pending_arm.take()
    }
}
