//! Pawn geometry. "Forward" depends on the owner.

use crate::game_state::chess_types::{Side, Square, SquareSet};

/// The two forward-diagonal squares a pawn of `side` attacks.
#[inline]
pub fn pawn_attacks(side: Side, square: Square) -> SquareSet {
    let mut set = SquareSet::EMPTY;
    if let Some(left) = square.offset(side.forward(), -1) {
        set.insert(left);
    }
    if let Some(right) = square.offset(side.forward(), 1) {
        set.insert(right);
    }
    set
}

/// The square directly ahead of a pawn, if any.
#[inline]
pub fn pawn_push(side: Side, square: Square) -> Option<Square> {
    square.offset(side.forward(), 0)
}
