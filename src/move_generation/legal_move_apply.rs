//! Scratch-copy move simulation.
//!
//! Used by the checkmate detector and the enemy's search. The authoritative
//! board is never touched: every simulation works on its own clone.

use crate::errors::{RogueError, RogueResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusRegistry;
use crate::move_generation::legal_move_generator::MoveTarget;

#[derive(Debug, Clone)]
pub struct SimulatedMove {
    pub board: Board,
    pub captured: Option<Piece>,
    /// The capture was vetoed by a protection; nothing moved.
    pub blocked: bool,
}

/// Apply `target` for the piece on `from` to a copy of `board`.
///
/// Protected targets block the capture and leave the attacker in place.
/// Piercing captures remove the target without moving the attacker. Pawns
/// reaching the far row become queens.
pub fn simulate_move(
    board: &Board,
    status: &StatusRegistry,
    from: Square,
    target: MoveTarget,
) -> RogueResult<SimulatedMove> {
    let mover = *board.piece_at(from).ok_or(RogueError::EmptySquare(from))?;
    let to = target.square;
    let mut next = board.clone();

    if let Some(victim) = board.piece_at(to) {
        if victim.owner == mover.owner {
            return Err(RogueError::IllegalMove { from, to });
        }
        if status.is_capture_immune(victim.id) {
            return Ok(SimulatedMove {
                board: next,
                captured: None,
                blocked: true,
            });
        }
    } else if target.piercing {
        return Err(RogueError::IllegalMove { from, to });
    }

    if target.piercing {
        let captured = next.remove(to);
        return Ok(SimulatedMove {
            board: next,
            captured,
            blocked: false,
        });
    }

    let captured = next.move_piece(from, to)?;
    promote_if_due(&mut next, to)?;

    Ok(SimulatedMove {
        board: next,
        captured,
        blocked: false,
    })
}

/// Turn a pawn standing on its promotion row into a queen.
pub fn promote_if_due(board: &mut Board, square: Square) -> RogueResult<bool> {
    let Some(piece) = board.piece_at(square) else {
        return Ok(false);
    };
    if piece.kind == PieceKind::Pawn && square.row == piece.owner.promotion_row() {
        board.set_kind(square, PieceKind::Queen)?;
        return Ok(true);
    }
    Ok(false)
}
