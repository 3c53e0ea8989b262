//! Square conversions between board coordinates and file/rank notation.
//!
//! The mapping depends on which army plays White in the notation. The
//! orientation is chosen once per session and never inferred from the
//! position, so swapping kings mid-battle cannot flip the board.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::{Side, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Row 7 is rank 1 and column 0 is the a-file.
    #[default]
    PlayerIsWhite,
    /// Row 0 is rank 1 and column 7 is the a-file (the board turned 180 degrees).
    EnemyIsWhite,
}

impl Orientation {
    #[inline]
    pub const fn white_side(self) -> Side {
        match self {
            Orientation::PlayerIsWhite => Side::Player,
            Orientation::EnemyIsWhite => Side::Enemy,
        }
    }

    /// Zero-based `(file, rank)` for an on-board square.
    #[inline]
    pub const fn to_file_rank(self, square: Square) -> (u8, u8) {
        match self {
            Orientation::PlayerIsWhite => (square.col as u8, (7 - square.row) as u8),
            Orientation::EnemyIsWhite => ((7 - square.col) as u8, square.row as u8),
        }
    }

    #[inline]
    pub const fn from_file_rank(self, file: u8, rank: u8) -> Square {
        match self {
            Orientation::PlayerIsWhite => Square::new(7 - rank as i8, file as i8),
            Orientation::EnemyIsWhite => Square::new(rank as i8, 7 - file as i8),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "player" | "playeriswhite" | "player_is_white" => Ok(Orientation::PlayerIsWhite),
            "enemy" | "enemyiswhite" | "enemy_is_white" => Ok(Orientation::EnemyIsWhite),
            _ => Err(format!("invalid orientation '{s}'")),
        }
    }
}

/// Convert a square to notation such as `e4`.
pub fn square_to_algebraic(square: Square, orientation: Orientation) -> Result<String, String> {
    if !square.is_on_board() {
        return Err(format!("Square out of bounds: {square}"));
    }
    let (file, rank) = orientation.to_file_rank(square);
    let file_char = char::from(b'a' + file);
    let rank_char = char::from(b'1' + rank);
    Ok(format!("{file_char}{rank_char}"))
}

/// Parse notation such as `e4` back to a board square.
pub fn algebraic_to_square(text: &str, orientation: Orientation) -> Result<Square, String> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid algebraic square: {text}"));
    }

    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("Invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("Invalid algebraic rank: {}", rank as char));
    }

    Ok(orientation.from_file_rank(file - b'a', rank - b'1'))
}
