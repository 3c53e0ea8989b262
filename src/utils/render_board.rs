//! Terminal-oriented Unicode board renderer.
//!
//! Rows and columns are labelled with their zero-based indices, the same
//! coordinates the session commands take.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;

pub fn render_board(board: &Board) -> String {
    render_board_with_marks(board, &[])
}

/// Render the board, drawing `marks` on empty squares as `*` (for example a
/// selected piece's destinations).
pub fn render_board_with_marks(board: &Board, marks: &[Square]) -> String {
    let mut out = String::new();
    out.push_str("  0 1 2 3 4 5 6 7\n");

    for row in 0..BOARD_SIZE {
        out.push(char::from(b'0' + row as u8));
        out.push(' ');

        for col in 0..BOARD_SIZE {
            let square = Square::new(row, col);
            match board.piece_at(square) {
                Some(piece) => out.push(piece_to_unicode(piece.owner, piece.kind)),
                None if marks.contains(&square) => out.push('*'),
                None => out.push('·'),
            }
            if col < BOARD_SIZE - 1 {
                out.push(' ');
            }
        }

        out.push('\n');
    }

    out.push_str("  0 1 2 3 4 5 6 7");
    out
}

fn piece_to_unicode(owner: Side, kind: PieceKind) -> char {
    match (owner, kind) {
        (Side::Player, PieceKind::Pawn) => '♙',
        (Side::Player, PieceKind::Knight) => '♘',
        (Side::Player, PieceKind::Bishop) => '♗',
        (Side::Player, PieceKind::Rook) => '♖',
        (Side::Player, PieceKind::Queen) => '♕',
        (Side::Player, PieceKind::King) => '♔',
        (Side::Enemy, PieceKind::Pawn) => '♟',
        (Side::Enemy, PieceKind::Knight) => '♞',
        (Side::Enemy, PieceKind::Bishop) => '♝',
        (Side::Enemy, PieceKind::Rook) => '♜',
        (Side::Enemy, PieceKind::Queen) => '♛',
        (Side::Enemy, PieceKind::King) => '♚',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_pieces_and_marks() {
        let mut board = Board::new_empty();
        board
            .spawn(PieceKind::King, Side::Enemy, Square::new(0, 0))
            .expect("spawn should succeed");
        board
            .spawn(PieceKind::King, Side::Player, Square::new(7, 7))
            .expect("spawn should succeed");

        let text = render_board_with_marks(&board, &[Square::new(1, 1)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[1].starts_with("0 ♚"));
        assert!(lines[2].starts_with("1 · *"));
        assert!(lines[8].ends_with('♔'));
    }
}
