//! King geometry.

use crate::game_state::chess_types::{Square, SquareSet};

pub const KING_ATTACKS: [u64; 64] = generate_king_attacks();

#[inline]
pub fn king_attacks(square: Square) -> SquareSet {
    if !square.is_on_board() {
        return SquareSet::EMPTY;
    }
    SquareSet(KING_ATTACKS[square.index()])
}

const fn generate_king_attacks() -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let row = (sq / 8) as i32;
        let col = (sq % 8) as i32;
        let mut attacks = 0u64;
        let mut dr = -1i32;

        while dr <= 1 {
            let mut dc = -1i32;
            while dc <= 1 {
                let r = row + dr;
                let c = col + dc;
                if !(dr == 0 && dc == 0) && r >= 0 && r < 8 && c >= 0 && c < 8 {
                    attacks |= 1u64 << ((r as usize) * 8 + (c as usize));
                }
                dc += 1;
            }
            dr += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}
