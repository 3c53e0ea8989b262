//! Static evaluation of a battle position.
//!
//! Search and the adversary's lookahead delegate position scoring to
//! `BoardScorer`, so alternate heuristics can be swapped without touching
//! the search code.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusRegistry;

pub const KING_VALUE: i32 = 10_000;

pub trait BoardScorer: Send + Sync {
    /// Score from `side`'s point of view; positive favours `side`.
    fn score(&self, board: &Board, status: &StatusRegistry, side: Side) -> i32;
}

#[inline]
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => KING_VALUE,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl BoardScorer for MaterialScorer {
    fn score(&self, board: &Board, _status: &StatusRegistry, side: Side) -> i32 {
        board
            .all_pieces()
            .map(|p| {
                let value = piece_value(p.kind);
                if p.owner == side {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }
}

/// Material plus a few positional terms: pawn advancement, centralised minor
/// pieces and a small penalty for pieces that are locked in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalScorer;

const PAWN_ADVANCE_BONUS: i32 = 8;
const CENTER_BONUS: i32 = 6;
const LOCKED_PENALTY: i32 = 15;

impl PositionalScorer {
    fn positional_terms(piece: &Piece, status: &StatusRegistry) -> i32 {
        let mut score = 0;
        match piece.kind {
            PieceKind::Pawn => {
                let advanced = (piece.square.row - piece.owner.pawn_start_row()).abs() as i32;
                score += advanced * PAWN_ADVANCE_BONUS;
            }
            PieceKind::Knight | PieceKind::Bishop => {
                score += (3 - center_distance(piece.square)) * CENTER_BONUS;
            }
            _ => {}
        }
        if !status.is_actionable(piece.id) {
            score -= LOCKED_PENALTY;
        }
        score
    }
}

impl BoardScorer for PositionalScorer {
    fn score(&self, board: &Board, status: &StatusRegistry, side: Side) -> i32 {
        board
            .all_pieces()
            .map(|p| {
                let value = piece_value(p.kind) + Self::positional_terms(p, status);
                if p.owner == side {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }
}

/// Chebyshev distance to the nearest of the four centre squares (0..=3).
#[inline]
pub fn center_distance(square: Square) -> i32 {
    let dr = if square.row < 4 { 3 - square.row } else { square.row - 4 };
    let dc = if square.col < 4 { 3 - square.col } else { square.col - 4 };
    dr.max(dc) as i32
}
