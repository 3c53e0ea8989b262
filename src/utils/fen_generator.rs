//! Board-to-FEN serialization for the oracle.
//!
//! The battle board has no castling or en-passant state, so those fields are
//! always `-`. Positions the notation cannot express safely are refused.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::utils::algebraic::Orientation;

/// Reject positions a standard engine would misread or refuse.
pub fn check_oracle_position(board: &Board, orientation: Orientation) -> Result<(), String> {
    for side in [Side::Player, Side::Enemy] {
        let kings = board
            .pieces(side)
            .filter(|p| p.kind == PieceKind::King)
            .count();
        if kings != 1 {
            return Err(format!("{side:?} has {kings} kings"));
        }
    }

    for pawn in board.all_pieces().filter(|p| p.kind == PieceKind::Pawn) {
        let (_, rank) = orientation.to_file_rank(pawn.square);
        if rank == 0 || rank == 7 {
            return Err(format!("pawn on back rank at {}", pawn.square));
        }
    }
    Ok(())
}

pub fn generate_fen(
    board: &Board,
    side_to_move: Side,
    orientation: Orientation,
    fullmove_number: u32,
) -> Result<String, String> {
    check_oracle_position(board, orientation)?;

    let white = orientation.white_side();
    let active = if side_to_move == white { "w" } else { "b" };

    Ok(format!(
        "{} {} - - 0 {}",
        generate_board_field(board, orientation),
        active,
        fullmove_number.max(1)
    ))
}

fn generate_board_field(board: &Board, orientation: Orientation) -> String {
    let white = orientation.white_side();
    let mut out = String::with_capacity(72);

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            let square = orientation.from_file_rank(file, rank);
            match board.piece_at(square) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece_to_fen_char(piece, white));
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn piece_to_fen_char(piece: &Piece, white: Side) -> char {
    let base = piece.kind.letter();
    if piece.owner == white {
        base.to_ascii_uppercase()
    } else {
        base
    }
}
