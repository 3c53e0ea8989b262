//! Ray tracing for rooks, bishops and queens.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Direction, PieceKind, Square, SquareSet};

/// Direction set a piece slides along; empty for non-sliders.
pub fn slide_directions(kind: PieceKind) -> &'static [Direction] {
    const QUEEN: [Direction; 8] = Direction::ALL_EIGHT;
    match kind {
        PieceKind::Rook => &Direction::ORTHOGONAL,
        PieceKind::Bishop => &Direction::DIAGONAL,
        PieceKind::Queen => &QUEEN,
        _ => &[],
    }
}

/// Squares reached along `direction` up to and including the first occupied one.
pub fn trace_ray(board: &Board, from: Square, direction: Direction) -> SquareSet {
    let mut set = SquareSet::EMPTY;
    let mut cursor = from.step(direction);
    while let Some(square) = cursor {
        set.insert(square);
        if board.piece_at(square).is_some() {
            break;
        }
        cursor = square.step(direction);
    }
    set
}

/// Standard sliding attack set for `kind` on `from`.
pub fn slider_attacks(board: &Board, kind: PieceKind, from: Square) -> SquareSet {
    slide_directions(kind)
        .iter()
        .fold(SquareSet::EMPTY, |acc, dir| acc.union(trace_ray(board, from, *dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Side;

    #[test]
    fn rook_ray_stops_at_first_blocker() {
        let mut board = Board::new_empty();
        board
            .spawn(PieceKind::Pawn, Side::Enemy, Square::new(4, 2))
            .expect("spawn should succeed");
        let ray = trace_ray(&board, Square::new(4, 0), Direction::new(0, 1));
        assert_eq!(
            ray.iter().collect::<Vec<_>>(),
            vec![Square::new(4, 1), Square::new(4, 2)]
        );
    }

    #[test]
    fn open_board_queen_attacks() {
        let board = Board::new_empty();
        assert_eq!(slider_attacks(&board, PieceKind::Queen, Square::new(3, 3)).len(), 27);
        assert_eq!(slider_attacks(&board, PieceKind::Rook, Square::new(0, 0)).len(), 14);
        assert!(slider_attacks(&board, PieceKind::Knight, Square::new(0, 0)).is_empty());
    }
}
