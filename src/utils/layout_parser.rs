//! Formation layout strings.
//!
//! A layout is the placement field of a FEN string written from the player's
//! point of view: the first segment is row 0 (the enemy's home row), digits
//! are runs of empty squares, lowercase letters are enemy pieces and
//! uppercase letters are player pieces.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;

pub fn parse_layout(layout: &str) -> Result<Board, String> {
    let mut board = Board::new_empty();
    place_layout(layout, &mut board)?;
    Ok(board)
}

/// Spawn every piece of `layout` onto `board`, failing on overlaps.
pub fn place_layout(layout: &str, board: &mut Board) -> Result<(), String> {
    let rows: Vec<&str> = layout.trim().split('/').collect();
    if rows.len() != 8 {
        return Err(format!("Layout must contain 8 rows, got {}", rows.len()));
    }

    for (row, row_str) in rows.iter().enumerate() {
        let mut col = 0i8;

        for ch in row_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(format!("Invalid empty-square count '{ch}'"));
                }
                col += empty_count as i8;
                continue;
            }

            let kind = PieceKind::from_letter(ch)
                .ok_or_else(|| format!("Invalid piece character '{ch}' in layout"))?;
            if col >= BOARD_SIZE {
                return Err(format!("Row {row} has too many columns"));
            }
            let owner = if ch.is_ascii_uppercase() {
                Side::Player
            } else {
                Side::Enemy
            };
            board
                .spawn(kind, owner, Square::new(row as i8, col))
                .map_err(|err| err.to_string())?;
            col += 1;
        }

        if col != BOARD_SIZE {
            return Err(format!("Row {row} does not sum to 8 columns"));
        }
    }

    Ok(())
}

/// Layout string for the current board (inverse of `parse_layout`).
pub fn board_to_layout(board: &Board) -> String {
    let mut out = String::with_capacity(72);
    for row in 0..BOARD_SIZE {
        let mut empty_count = 0u8;
        for col in 0..BOARD_SIZE {
            match board.piece_at(Square::new(row, col)) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    let letter = piece.kind.letter();
                    out.push(match piece.owner {
                        Side::Player => letter.to_ascii_uppercase(),
                        Side::Enemy => letter,
                    });
                }
                None => empty_count += 1,
            }
        }
        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }
        if row < BOARD_SIZE - 1 {
            out.push('/');
        }
    }
    out
}
