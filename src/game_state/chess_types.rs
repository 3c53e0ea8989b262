//! Core value types shared by every subsystem.
//!
//! Rows and columns are zero-indexed from the top-left corner as seen by the
//! player: row 0 is the enemy's home row and row 7 is the player's. The
//! player therefore advances toward decreasing row indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a piece for its whole lifetime on the board.
pub type PieceId = u32;

pub const BOARD_SIZE: i8 = 8;

/// Which army a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    /// Row delta of a single forward step.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Side::Player => -1,
            Side::Enemy => 1,
        }
    }

    #[inline]
    pub const fn home_row(self) -> i8 {
        match self {
            Side::Player => 7,
            Side::Enemy => 0,
        }
    }

    /// Rank from which a pawn may make its double step.
    #[inline]
    pub const fn pawn_start_row(self) -> i8 {
        match self {
            Side::Player => 6,
            Side::Enemy => 1,
        }
    }

    #[inline]
    pub const fn promotion_row(self) -> i8 {
        match self {
            Side::Player => 0,
            Side::Enemy => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Lowercase letter used by layouts and position strings.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }

    #[inline]
    pub const fn is_minor(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Knight)
    }
}

/// A board coordinate. May be off-board while offsets are being explored.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    #[inline]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    #[inline]
    pub const fn is_on_board(self) -> bool {
        self.row >= 0 && self.row < BOARD_SIZE && self.col >= 0 && self.col < BOARD_SIZE
    }

    /// Offset by `(dr, dc)`, returning `None` when the result leaves the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        let next = Square::new(self.row + dr, self.col + dc);
        next.is_on_board().then_some(next)
    }

    #[inline]
    pub fn step(self, direction: Direction) -> Option<Square> {
        self.offset(direction.dr, direction.dc)
    }

    /// King-move distance between two squares.
    #[inline]
    pub fn chebyshev(self, other: Square) -> i8 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    #[inline]
    pub fn is_edge(self) -> bool {
        self.row == 0 || self.row == BOARD_SIZE - 1 || self.col == 0 || self.col == BOARD_SIZE - 1
    }

    #[inline]
    pub fn is_corner(self) -> bool {
        (self.row == 0 || self.row == BOARD_SIZE - 1)
            && (self.col == 0 || self.col == BOARD_SIZE - 1)
    }

    /// Dense index `row * 8 + col`; only meaningful for on-board squares.
    #[inline]
    pub const fn index(self) -> usize {
        (self.row as usize) * 8 + (self.col as usize)
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self::new((index / 8) as i8, (index % 8) as i8)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square::from_index)
    }

    /// The eight surrounding squares that are on the board.
    pub fn neighbors(self) -> impl Iterator<Item = Square> {
        Direction::ALL_EIGHT
            .into_iter()
            .filter_map(move |dir| self.step(dir))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A unit step on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dr: i8,
    pub dc: i8,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::new(-1, 0),
        Direction::new(1, 0),
        Direction::new(0, -1),
        Direction::new(0, 1),
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::new(-1, -1),
        Direction::new(-1, 1),
        Direction::new(1, -1),
        Direction::new(1, 1),
    ];

    pub const ALL_EIGHT: [Direction; 8] = [
        Direction::new(-1, 0),
        Direction::new(1, 0),
        Direction::new(0, -1),
        Direction::new(0, 1),
        Direction::new(-1, -1),
        Direction::new(-1, 1),
        Direction::new(1, -1),
        Direction::new(1, 1),
    ];

    #[inline]
    pub const fn new(dr: i8, dc: i8) -> Self {
        Self { dr, dc }
    }

    /// True for the eight king-step offsets.
    #[inline]
    pub const fn is_unit(self) -> bool {
        self.dr >= -1 && self.dr <= 1 && self.dc >= -1 && self.dc <= 1 && !(self.dr == 0 && self.dc == 0)
    }

    #[inline]
    pub const fn is_orthogonal(self) -> bool {
        self.is_unit() && (self.dr == 0 || self.dc == 0)
    }

    /// Direction of the single step from `from` to an adjacent `to`.
    pub fn between(from: Square, to: Square) -> Option<Direction> {
        let dir = Direction::new(to.row - from.row, to.col - from.col);
        dir.is_unit().then_some(dir)
    }
}

/// A piece record. The square is kept in sync with the board cell holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub owner: Side,
    pub square: Square,
}

/// Set of squares packed into a `u64` (bit `row * 8 + col`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(pub u64);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    #[inline]
    pub fn insert(&mut self, square: Square) {
        if square.is_on_board() {
            self.0 |= 1u64 << square.index();
        }
    }

    #[inline]
    pub fn contains(self, square: Square) -> bool {
        square.is_on_board() && self.0 & (1u64 << square.index()) != 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn union(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 | other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(Square::from_index(index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_direction_depends_on_owner() {
        assert_eq!(Side::Player.forward(), -1);
        assert_eq!(Side::Enemy.forward(), 1);
        assert_eq!(Side::Player.promotion_row(), 0);
        assert_eq!(Side::Enemy.promotion_row(), 7);
    }

    #[test]
    fn offset_rejects_off_board_results() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 1), Some(Square::new(1, 1)));
        assert!(corner.is_corner());
        assert_eq!(corner.neighbors().count(), 3);
    }

    #[test]
    fn square_set_iterates_in_index_order() {
        let mut set = SquareSet::EMPTY;
        set.insert(Square::new(7, 7));
        set.insert(Square::new(0, 1));
        set.insert(Square::new(-1, 3));
        let squares: Vec<Square> = set.iter().collect();
        assert_eq!(squares, vec![Square::new(0, 1), Square::new(7, 7)]);
        assert_eq!(set.len(), 2);
    }
}
