//! Request/response boundary to an external best-move oracle.
//!
//! The oracle is a black box: it receives a position in rank-file notation
//! and answers with a move code and an optional evaluation, or fails. All
//! board-to-notation conversion happens on this side of the boundary.

use std::time::Duration;

use thiserror::Error;

use crate::game_state::chess_types::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    /// FEN position string.
    pub position: String,
    pub side_to_move: Side,
    pub search_depth: u8,
}

/// Evaluation reported by the oracle, from the side to move's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Centipawns(i32),
    /// Moves until mate; negative when the side to move is being mated.
    Mate(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    /// Four- or five-character move code, for example `e7e5`.
    pub best_move: String,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),

    #[error("oracle is unavailable: {0}")]
    Unavailable(String),

    #[error("malformed oracle response: {0}")]
    Malformed(String),

    #[error("oracle i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The position cannot be expressed in standard notation.
    #[error("position not supported by the oracle: {0}")]
    Unsupported(String),
}

impl OracleError {
    /// Failures that say nothing about the oracle's health.
    #[inline]
    pub fn is_position_specific(&self) -> bool {
        matches!(self, OracleError::Unsupported(_))
    }
}

pub trait Oracle: Send {
    fn name(&self) -> &str {
        "oracle"
    }

    /// Ask for a best move, giving up after `timeout`. A new request
    /// supersedes any search still running.
    fn best_move(
        &mut self,
        request: &OracleRequest,
        timeout: Duration,
    ) -> Result<OracleResponse, OracleError>;
}
