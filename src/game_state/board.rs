//! 8x8 board model.
//!
//! Every occupied cell owns its `Piece` record, so a piece's recorded square
//! always matches the cell it sits in and each piece belongs to exactly one
//! side. Per-side piece lists are derived views over the grid.

use crate::errors::{RogueError, RogueResult};
use crate::game_state::chess_types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
    next_id: PieceId,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [[None; 8]; 8],
            next_id: 1,
        }
    }
}

impl Board {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    fn check_square(square: Square) -> RogueResult<()> {
        if square.is_on_board() {
            Ok(())
        } else {
            Err(RogueError::OffBoard {
                row: square.row,
                col: square.col,
            })
        }
    }

    /// Place a new piece and return its freshly allocated id.
    pub fn spawn(&mut self, kind: PieceKind, owner: Side, square: Square) -> RogueResult<PieceId> {
        Self::check_square(square)?;
        if self.piece_at(square).is_some() {
            return Err(RogueError::OccupiedSquare(square));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.cells[square.row as usize][square.col as usize] = Some(Piece {
            id,
            kind,
            owner,
            square,
        });
        Ok(id)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        if !square.is_on_board() {
            return None;
        }
        self.cells[square.row as usize][square.col as usize].as_ref()
    }

    #[inline]
    fn cell_mut(&mut self, square: Square) -> &mut Option<Piece> {
        &mut self.cells[square.row as usize][square.col as usize]
    }

    /// On-board and unoccupied.
    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        square.is_on_board() && self.piece_at(square).is_none()
    }

    pub fn find(&self, id: PieceId) -> Option<Square> {
        self.all_pieces().find(|p| p.id == id).map(|p| p.square)
    }

    pub fn piece_by_id(&self, id: PieceId) -> Option<&Piece> {
        self.all_pieces().find(|p| p.id == id)
    }

    #[inline]
    pub fn contains(&self, id: PieceId) -> bool {
        self.find(id).is_some()
    }

    /// Relocate the piece on `from` to `to`, returning whatever occupied `to`.
    pub fn move_piece(&mut self, from: Square, to: Square) -> RogueResult<Option<Piece>> {
        Self::check_square(from)?;
        Self::check_square(to)?;
        if from == to {
            return Err(RogueError::IllegalMove { from, to });
        }

        let mut piece = self.cell_mut(from).take().ok_or(RogueError::EmptySquare(from))?;
        piece.square = to;
        Ok(self.cell_mut(to).replace(piece))
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        if !square.is_on_board() {
            return None;
        }
        self.cell_mut(square).take()
    }

    pub fn remove_by_id(&mut self, id: PieceId) -> Option<Piece> {
        let square = self.find(id)?;
        self.remove(square)
    }

    pub fn set_kind(&mut self, square: Square, kind: PieceKind) -> RogueResult<()> {
        Self::check_square(square)?;
        let piece = self
            .cell_mut(square)
            .as_mut()
            .ok_or(RogueError::EmptySquare(square))?;
        piece.kind = kind;
        Ok(())
    }

    pub fn set_owner(&mut self, square: Square, owner: Side) -> RogueResult<()> {
        Self::check_square(square)?;
        let piece = self
            .cell_mut(square)
            .as_mut()
            .ok_or(RogueError::EmptySquare(square))?;
        piece.owner = owner;
        Ok(())
    }

    /// Exchange the contents of two occupied squares.
    pub fn swap(&mut self, a: Square, b: Square) -> RogueResult<()> {
        Self::check_square(a)?;
        Self::check_square(b)?;
        if self.piece_at(a).is_none() {
            return Err(RogueError::EmptySquare(a));
        }
        if self.piece_at(b).is_none() {
            return Err(RogueError::EmptySquare(b));
        }

        let mut first = self.cell_mut(a).take().ok_or(RogueError::EmptySquare(a))?;
        let mut second = self.cell_mut(b).take().ok_or(RogueError::EmptySquare(b))?;
        first.square = b;
        second.square = a;
        *self.cell_mut(b) = Some(first);
        *self.cell_mut(a) = Some(second);
        Ok(())
    }

    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.cells.iter().flatten().flatten()
    }

    pub fn pieces(&self, side: Side) -> impl Iterator<Item = &Piece> + '_ {
        self.all_pieces().filter(move |p| p.owner == side)
    }

    pub fn king(&self, side: Side) -> Option<&Piece> {
        self.pieces(side).find(|p| p.kind == PieceKind::King)
    }

    #[inline]
    pub fn count(&self, side: Side) -> usize {
        self.pieces(side).count()
    }

    pub fn clear(&mut self) {
        *self = Self {
            next_id: self.next_id,
            ..Self::default()
        };
    }

    /// Check the cell/record and single-king invariants.
    pub fn validate(&self) -> RogueResult<()> {
        for square in Square::all() {
            if let Some(piece) = self.piece_at(square) {
                if piece.square != square {
                    return Err(RogueError::Invariant(format!(
                        "piece #{} records {} but sits on {}",
                        piece.id, piece.square, square
                    )));
                }
            }
        }

        let mut ids: Vec<PieceId> = self.all_pieces().map(|p| p.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != total {
            return Err(RogueError::Invariant("duplicate piece id".to_owned()));
        }

        for side in [Side::Player, Side::Enemy] {
            let kings = self
                .pieces(side)
                .filter(|p| p.kind == PieceKind::King)
                .count();
            if kings > 1 {
                return Err(RogueError::Invariant(format!("{side:?} has {kings} kings")));
            }
        }

        Ok(())
    }
}
