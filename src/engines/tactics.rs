//! Fork and pin recognition on a position after a move.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::attacks_from;
use crate::moves::sliding_moves::slide_directions;

/// The piece on `square` attacks two or more non-pawn opposing pieces.
pub fn detect_fork(board: &Board, square: Square) -> bool {
    let Some(piece) = board.piece_at(square) else {
        return false;
    };
    let attacked = attacks_from(board, piece);
    board
        .pieces(piece.owner.opposite())
        .filter(|p| p.kind != PieceKind::Pawn && attacked.contains(p.square))
        .take(2)
        .count()
        >= 2
}

/// The piece on `square` pins an opposing piece to its king along one of
/// the lines it moves on.
pub fn detect_pin(board: &Board, square: Square) -> bool {
    let Some(piece) = board.piece_at(square) else {
        return false;
    };
    if !piece.kind.is_slider() {
        return false;
    }
    let opponent = piece.owner.opposite();

    slide_directions(piece.kind).iter().any(|&dir| {
        let mut occupants = ray_occupants(board, square, dir);
        let Some(front) = occupants.next() else {
            return false;
        };
        if front.owner != opponent || front.kind == PieceKind::King {
            return false;
        }
        occupants
            .next()
            .is_some_and(|behind| behind.owner == opponent && behind.kind == PieceKind::King)
    })
}

fn ray_occupants<'a>(
    board: &'a Board,
    from: Square,
    dir: Direction,
) -> impl Iterator<Item = &'a Piece> + 'a {
    std::iter::successors(from.step(dir), move |sq| sq.step(dir))
        .filter_map(move |sq| board.piece_at(sq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::layout_parser::parse_layout;

    #[test]
    fn knight_hitting_two_majors_is_a_fork() {
        // Enemy knight on (2,3) hits the player rook on (4,2) and queen on (4,4).
        let board = parse_layout("8/8/3n4/8/2R1Q3/8/8/8").expect("valid layout");
        assert!(detect_fork(&board, Square::new(2, 3)));
    }

    #[test]
    fn a_pawn_does_not_complete_a_fork() {
        let board = parse_layout("8/8/3n4/8/2R1P3/8/8/8").expect("valid layout");
        assert!(!detect_fork(&board, Square::new(2, 3)));
    }

    #[test]
    fn king_counts_toward_a_fork() {
        let board = parse_layout("8/8/3n4/8/2K1B3/8/8/8").expect("valid layout");
        assert!(detect_fork(&board, Square::new(2, 3)));
    }

    #[test]
    fn rook_pins_a_piece_to_the_king() {
        let board = parse_layout("r7/8/8/8/N7/8/8/K7").expect("valid layout");
        assert!(detect_pin(&board, Square::new(0, 0)));
    }

    #[test]
    fn wrong_line_orientation_is_not_a_pin() {
        // A bishop cannot pin along a file.
        let board = parse_layout("b7/8/8/8/N7/8/8/K7").expect("valid layout");
        assert!(!detect_pin(&board, Square::new(0, 0)));
    }

    #[test]
    fn own_piece_in_front_is_not_a_pin() {
        let board = parse_layout("r7/8/8/8/n7/8/8/K7").expect("valid layout");
        assert!(!detect_pin(&board, Square::new(0, 0)));
    }
}
