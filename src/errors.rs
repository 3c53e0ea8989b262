//! Errors used throughout the battle engine.
//!
//! `RogueError` is the single error type for rules, cards, layouts and
//! configuration. Illegal player actions never surface as errors at the
//! session boundary: `GameSession` converts them into rejection messages and
//! keeps its state unchanged.

use thiserror::Error;

use crate::cards::card_catalog::CardId;
use crate::game_state::chess_types::{PieceId, Square};

/// Unified error type for the battle engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RogueError {
    /// A coordinate outside `0..8` was supplied.
    #[error("square ({row}, {col}) is off the board")]
    OffBoard { row: i8, col: i8 },

    /// An operation needed a piece but the square is empty.
    #[error("no piece on {0}")]
    EmptySquare(Square),

    /// An operation needed an empty square but it is occupied.
    #[error("{0} is occupied")]
    OccupiedSquare(Square),

    /// A piece id no longer refers to a piece on the board.
    #[error("piece #{0} is not on the board")]
    UnknownPiece(PieceId),

    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// The per-battle card cap has been reached.
    #[error("no more cards can be played this battle ({0} already played)")]
    CardLimitReached(u8),

    #[error("{0:?} is not in hand")]
    CardNotInHand(CardId),

    /// A card target failed its targeting filter.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// A command arrived in a phase that cannot accept it.
    #[error("not allowed during {0}")]
    WrongPhase(&'static str),

    #[error("the battle is over")]
    GameOver,

    /// A formation layout string was malformed.
    #[error("layout error: {0}")]
    Layout(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// Board bookkeeping no longer agrees with itself.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// Result alias used by the crate.
pub type RogueResult<T> = Result<T, RogueError>;
