//! Attack queries, check and checkmate detection.
//!
//! Attack sets use the basic, unmodified movement patterns; a locked
//! (frozen or invulnerable) piece attacks nothing.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusRegistry;
use crate::game_state::turn_modifiers::TurnModifiers;
use crate::move_generation::legal_move_apply::simulate_move;
use crate::move_generation::legal_move_generator::moves_for;
use crate::moves::king_moves::king_attacks;
use crate::moves::knight_moves::knight_attacks;
use crate::moves::pawn_moves::pawn_attacks;
use crate::moves::sliding_moves::slider_attacks;

/// Squares `piece` attacks with its basic pattern.
pub fn attacks_from(board: &Board, piece: &Piece) -> SquareSet {
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(piece.owner, piece.square),
        PieceKind::Knight => knight_attacks(piece.square),
        PieceKind::King => king_attacks(piece.square),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            slider_attacks(board, piece.kind, piece.square)
        }
    }
}

/// Union of every square attacked by `attacker`'s actionable pieces.
pub fn attacked_squares(board: &Board, status: &StatusRegistry, attacker: Side) -> SquareSet {
    board
        .pieces(attacker)
        .filter(|p| status.is_actionable(p.id))
        .fold(SquareSet::EMPTY, |acc, p| acc.union(attacks_from(board, p)))
}

pub fn is_square_attacked(
    board: &Board,
    status: &StatusRegistry,
    square: Square,
    attacker: Side,
) -> bool {
    board
        .pieces(attacker)
        .filter(|p| status.is_actionable(p.id))
        .any(|p| attacks_from(board, p).contains(square))
}

pub fn attackers_to_square(
    board: &Board,
    status: &StatusRegistry,
    square: Square,
    attacker: Side,
) -> Vec<Piece> {
    board
        .pieces(attacker)
        .filter(|p| status.is_actionable(p.id) && attacks_from(board, p).contains(square))
        .copied()
        .collect()
}

#[inline]
pub fn king_square(board: &Board, side: Side) -> Option<Square> {
    board.king(side).map(|k| k.square)
}

/// A missing king is never "in check".
pub fn is_in_check(board: &Board, status: &StatusRegistry, side: Side) -> bool {
    let Some(king) = king_square(board, side) else {
        return false;
    };
    is_square_attacked(board, status, king, side.opposite())
}

/// In check, and no move by any of `side`'s pieces resolves it.
///
/// Every candidate is played on a scratch copy, so the caller's board is
/// never modified.
pub fn is_checkmate(
    board: &Board,
    status: &StatusRegistry,
    side: Side,
    modifiers: &TurnModifiers,
) -> bool {
    if !is_in_check(board, status, side) {
        return false;
    }
    !has_escape(board, status, side, modifiers)
}

/// Any move at all for `side`.
pub fn has_any_move(
    board: &Board,
    status: &StatusRegistry,
    side: Side,
    modifiers: &TurnModifiers,
) -> bool {
    let simulate_for_enemy = side == Side::Enemy;
    board
        .pieces(side)
        .any(|p| !moves_for(p, board, status, modifiers, simulate_for_enemy).is_empty())
}

fn has_escape(
    board: &Board,
    status: &StatusRegistry,
    side: Side,
    modifiers: &TurnModifiers,
) -> bool {
    // Every legal move counts here, including quiet steps onto traps.
    for piece in board.pieces(side) {
        for target in moves_for(piece, board, status, modifiers, false) {
            let Ok(sim) = simulate_move(board, status, piece.square, target) else {
                continue;
            };
            if !is_in_check(&sim.board, status, side) {
                return true;
            }
        }
    }
    false
}
