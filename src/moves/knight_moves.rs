//! Knight geometry.

use crate::game_state::chess_types::{Square, SquareSet};

/// The eight `(dr, dc)` knight jumps.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const KNIGHT_ATTACKS: [u64; 64] = generate_knight_attacks();

/// Squares a knight on `square` attacks, regardless of occupancy.
#[inline]
pub fn knight_attacks(square: Square) -> SquareSet {
    if !square.is_on_board() {
        return SquareSet::EMPTY;
    }
    SquareSet(KNIGHT_ATTACKS[square.index()])
}

/// True when `a` and `b` are a knight's jump apart.
#[inline]
pub fn is_knight_offset(a: Square, b: Square) -> bool {
    knight_attacks(a).contains(b)
}

const fn generate_knight_attacks() -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let row = (sq / 8) as i32;
        let col = (sq % 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < KNIGHT_OFFSETS.len() {
            let (dr, dc) = KNIGHT_OFFSETS[i];
            attacks |= set_if_valid(row + dr as i32, col + dc as i32);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn set_if_valid(row: i32, col: i32) -> u64 {
    if row < 0 || row > 7 || col < 0 || col > 7 {
        return 0;
    }
    1u64 << ((row as usize) * 8 + (col as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_attacks_from_center_has_eight_targets() {
        assert_eq!(knight_attacks(Square::new(4, 3)).len(), 8);
        assert_eq!(knight_attacks(Square::new(0, 0)).len(), 2);
        assert!(is_knight_offset(Square::new(0, 0), Square::new(2, 1)));
    }
}
