//! Destination generation for a single piece.
//!
//! Base chess geometry is augmented by the current turn modifiers (extended
//! reach, pass-through, universal knight jumps, piercing captures) and
//! restricted by status effects (locked pieces, invulnerable targets). When
//! generating for the enemy's own planning, squares holding a trap are not
//! offered as quiet destinations.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::{StatusKind, StatusRegistry};
use crate::game_state::turn_modifiers::TurnModifiers;
use crate::moves::knight_moves::knight_attacks;
use crate::moves::pawn_moves::{pawn_attacks, pawn_push};
use crate::moves::sliding_moves::slide_directions;

/// A reachable destination. `piercing` marks a capture through one blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveTarget {
    pub square: Square,
    pub piercing: bool,
}

impl MoveTarget {
    #[inline]
    pub const fn plain(square: Square) -> Self {
        Self {
            square,
            piercing: false,
        }
    }
}

/// Legal destinations for `piece`.
///
/// Returns nothing for frozen or invulnerable pieces. Never includes a square
/// occupied by the mover's own side, and never a capture of an invulnerable
/// piece.
pub fn moves_for(
    piece: &Piece,
    board: &Board,
    status: &StatusRegistry,
    modifiers: &TurnModifiers,
    for_opponent_simulation: bool,
) -> Vec<MoveTarget> {
    if !status.is_actionable(piece.id) {
        return Vec::new();
    }

    let mut out = Vec::<MoveTarget>::with_capacity(32);
    let bonus = modifiers.range_bonus(piece.id);
    let ghost = modifiers.passes_through(piece.id);

    match piece.kind {
        PieceKind::King if status.has(piece.id, StatusKind::ArmyOfOne) => {
            for dir in slide_directions(PieceKind::Queen) {
                push_ray(piece, board, *dir, None, ghost, &mut out);
            }
        }
        PieceKind::King => {
            let reach = 1 + bonus;
            for dir in Direction::ALL_EIGHT {
                push_ray(piece, board, dir, Some(reach), ghost, &mut out);
            }
        }
        PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => {
            for dir in slide_directions(piece.kind) {
                push_ray(piece, board, *dir, None, ghost, &mut out);
            }
        }
        PieceKind::Knight => push_knight_jumps(piece, board, &mut out),
        PieceKind::Pawn => push_pawn_moves(piece, board, bonus, &mut out),
    }

    if modifiers.knights_tour && piece.kind != PieceKind::Knight {
        push_knight_jumps(piece, board, &mut out);
    }

    if modifiers.piercing && piece.kind.is_slider() {
        push_piercing_captures(piece, board, status, &mut out);
    }

    out.retain(|target| {
        let occupant = board.piece_at(target.square);
        match occupant {
            Some(other) => {
                other.owner != piece.owner && !status.has(other.id, StatusKind::Invulnerable)
            }
            None => !(for_opponent_simulation && status.has_trap(target.square)),
        }
    });

    dedup_targets(&mut out);
    out
}

/// Every `(piece, destination)` pair available to `side`.
pub fn all_moves(
    board: &Board,
    status: &StatusRegistry,
    side: Side,
    modifiers: &TurnModifiers,
    for_opponent_simulation: bool,
) -> Vec<(Piece, MoveTarget)> {
    let mut out = Vec::with_capacity(64);
    for piece in board.pieces(side) {
        for target in moves_for(piece, board, status, modifiers, for_opponent_simulation) {
            out.push((*piece, target));
        }
    }
    out
}

/// Walk a ray, stopping after `limit` steps, at an own piece, or at the
/// first enemy (which is included as a capture) unless `pass_through` is set.
fn push_ray(
    piece: &Piece,
    board: &Board,
    direction: Direction,
    limit: Option<u8>,
    pass_through: bool,
    out: &mut Vec<MoveTarget>,
) {
    let mut steps = 0u8;
    let mut cursor = piece.square.step(direction);

    while let Some(square) = cursor {
        if limit.is_some_and(|max| steps >= max) {
            break;
        }
        steps += 1;

        match board.piece_at(square) {
            None => out.push(MoveTarget::plain(square)),
            Some(other) if other.owner == piece.owner => break,
            Some(_) => {
                out.push(MoveTarget::plain(square));
                if !pass_through {
                    break;
                }
            }
        }

        cursor = square.step(direction);
    }
}

fn push_knight_jumps(piece: &Piece, board: &Board, out: &mut Vec<MoveTarget>) {
    for square in knight_attacks(piece.square).iter() {
        match board.piece_at(square) {
            Some(other) if other.owner == piece.owner => {}
            _ => out.push(MoveTarget::plain(square)),
        }
    }
}

fn push_pawn_moves(piece: &Piece, board: &Board, bonus: u8, out: &mut Vec<MoveTarget>) {
    let side = piece.owner;
    let base_reach: u8 = if piece.square.row == side.pawn_start_row() {
        2
    } else {
        1
    };
    let reach = base_reach.saturating_add(bonus);

    let mut cursor = pawn_push(side, piece.square);
    let mut steps = 0u8;
    while let Some(square) = cursor {
        if steps >= reach || !board.is_empty(square) {
            break;
        }
        out.push(MoveTarget::plain(square));
        steps += 1;
        cursor = pawn_push(side, square);
    }

    for square in pawn_attacks(side, piece.square).iter() {
        if board
            .piece_at(square)
            .is_some_and(|other| other.owner != side)
        {
            out.push(MoveTarget::plain(square));
        }
    }
}

/// Captures through exactly one non-king blocker onto a non-king enemy.
fn push_piercing_captures(
    piece: &Piece,
    board: &Board,
    status: &StatusRegistry,
    out: &mut Vec<MoveTarget>,
) {
    for dir in slide_directions(piece.kind) {
        let mut cursor = piece.square.step(*dir);
        let mut blocker_seen = false;

        while let Some(square) = cursor {
            if let Some(other) = board.piece_at(square) {
                if !blocker_seen {
                    if other.kind == PieceKind::King {
                        break;
                    }
                    blocker_seen = true;
                } else {
                    if other.owner != piece.owner
                        && other.kind != PieceKind::King
                        && !status.has(other.id, StatusKind::Invulnerable)
                    {
                        out.push(MoveTarget {
                            square,
                            piercing: true,
                        });
                    }
                    break;
                }
            }
            cursor = square.step(*dir);
        }
    }
}

/// Keep the first entry per square, preferring an ordinary move over a
/// piercing one.
fn dedup_targets(out: &mut Vec<MoveTarget>) {
    let mut seen = SquareSet::EMPTY;
    let mut plain = SquareSet::EMPTY;
    for target in out.iter() {
        if !target.piercing {
            plain.insert(target.square);
        }
    }

    out.retain(|target| {
        if seen.contains(target.square) || (target.piercing && plain.contains(target.square)) {
            return false;
        }
        seen.insert(target.square);
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squares(targets: &[MoveTarget]) -> Vec<Square> {
        let mut out: Vec<Square> = targets.iter().map(|t| t.square).collect();
        out.sort();
        out
    }

    fn spawn(board: &mut Board, kind: PieceKind, owner: Side, row: i8, col: i8) -> Piece {
        let id = board
            .spawn(kind, owner, Square::new(row, col))
            .expect("spawn should succeed");
        *board.piece_by_id(id).expect("piece should exist")
    }

    #[test]
    fn frozen_and_invulnerable_pieces_have_no_moves() {
        let mut board = Board::new_empty();
        let rook = spawn(&mut board, PieceKind::Rook, Side::Player, 4, 4);
        let mut status = StatusRegistry::new();
        let modifiers = TurnModifiers::none();

        assert!(!moves_for(&rook, &board, &status, &modifiers, false).is_empty());
        status.apply(rook.id, StatusKind::Frozen, 1);
        assert!(moves_for(&rook, &board, &status, &modifiers, false).is_empty());
        status.clear(rook.id, StatusKind::Frozen);
        status.apply(rook.id, StatusKind::Invulnerable, 1);
        assert!(moves_for(&rook, &board, &status, &modifiers, false).is_empty());
    }

    #[test]
    fn pawn_double_step_needs_both_squares_empty() {
        let mut board = Board::new_empty();
        let pawn = spawn(&mut board, PieceKind::Pawn, Side::Player, 6, 3);
        let status = StatusRegistry::new();
        let modifiers = TurnModifiers::none();

        assert_eq!(
            squares(&moves_for(&pawn, &board, &status, &modifiers, false)),
            vec![Square::new(4, 3), Square::new(5, 3)]
        );

        spawn(&mut board, PieceKind::Knight, Side::Enemy, 5, 3);
        assert!(moves_for(&pawn, &board, &status, &modifiers, false).is_empty());
    }

    #[test]
    fn pawn_captures_only_diagonally_forward() {
        let mut board = Board::new_empty();
        let pawn = spawn(&mut board, PieceKind::Pawn, Side::Enemy, 3, 3);
        spawn(&mut board, PieceKind::Queen, Side::Player, 4, 4);
        spawn(&mut board, PieceKind::Rook, Side::Player, 2, 2);
        let moves = moves_for(
            &pawn,
            &board,
            &StatusRegistry::new(),
            &TurnModifiers::none(),
            true,
        );
        assert_eq!(squares(&moves), vec![Square::new(4, 3), Square::new(4, 4)]);
    }

    #[test]
    fn invulnerable_targets_are_not_capturable() {
        let mut board = Board::new_empty();
        let rook = spawn(&mut board, PieceKind::Rook, Side::Player, 7, 0);
        let target = spawn(&mut board, PieceKind::Knight, Side::Enemy, 3, 0);
        let mut status = StatusRegistry::new();
        status.apply(target.id, StatusKind::Invulnerable, 2);

        let moves = moves_for(&rook, &board, &status, &TurnModifiers::none(), false);
        assert!(!moves.iter().any(|t| t.square == Square::new(3, 0)));
        assert!(moves.iter().any(|t| t.square == Square::new(4, 0)));
        assert!(!moves.iter().any(|t| t.square == Square::new(2, 0)));
    }

    #[test]
    fn traps_only_restrict_the_opponent_simulation() {
        let mut board = Board::new_empty();
        let knight = spawn(&mut board, PieceKind::Knight, Side::Enemy, 0, 1);
        let mut status = StatusRegistry::new();
        status.place_trap(Square::new(2, 2));

        let simulated = moves_for(&knight, &board, &status, &TurnModifiers::none(), true);
        let human = moves_for(&knight, &board, &status, &TurnModifiers::none(), false);
        assert!(!simulated.iter().any(|t| t.square == Square::new(2, 2)));
        assert!(human.iter().any(|t| t.square == Square::new(2, 2)));
    }

    #[test]
    fn ghost_walk_passes_enemies_but_not_friends() {
        let mut board = Board::new_empty();
        let rook = spawn(&mut board, PieceKind::Rook, Side::Player, 7, 0);
        spawn(&mut board, PieceKind::Pawn, Side::Enemy, 5, 0);
        spawn(&mut board, PieceKind::Pawn, Side::Player, 2, 0);
        let modifiers = TurnModifiers {
            ghost_piece: Some(rook.id),
            ..TurnModifiers::default()
        };

        let moves = moves_for(&rook, &board, &StatusRegistry::new(), &modifiers, false);
        let column: Vec<Square> = squares(&moves)
            .into_iter()
            .filter(|sq| sq.col == 0)
            .collect();
        assert_eq!(
            column,
            vec![
                Square::new(3, 0),
                Square::new(4, 0),
                Square::new(5, 0),
                Square::new(6, 0)
            ]
        );
    }

    #[test]
    fn piercing_skips_exactly_one_blocker_and_never_hits_kings() {
        let mut board = Board::new_empty();
        let rook = spawn(&mut board, PieceKind::Rook, Side::Player, 7, 0);
        spawn(&mut board, PieceKind::Pawn, Side::Enemy, 5, 0);
        spawn(&mut board, PieceKind::Bishop, Side::Enemy, 2, 0);
        spawn(&mut board, PieceKind::Pawn, Side::Enemy, 7, 3);
        spawn(&mut board, PieceKind::King, Side::Enemy, 7, 5);
        let modifiers = TurnModifiers {
            piercing: true,
            ..TurnModifiers::default()
        };

        let moves = moves_for(&rook, &board, &StatusRegistry::new(), &modifiers, false);
        assert!(moves.contains(&MoveTarget {
            square: Square::new(2, 0),
            piercing: true
        }));
        assert!(!moves.iter().any(|t| t.square == Square::new(7, 5)));
    }

    #[test]
    fn knights_tour_adds_jumps_to_every_piece() {
        let mut board = Board::new_empty();
        let king = spawn(&mut board, PieceKind::King, Side::Player, 7, 4);
        let modifiers = TurnModifiers {
            knights_tour: true,
            ..TurnModifiers::default()
        };
        let moves = moves_for(&king, &board, &StatusRegistry::new(), &modifiers, false);
        assert!(moves.iter().any(|t| t.square == Square::new(5, 3)));
        assert_eq!(moves.len(), 5 + 4);
    }

    #[test]
    fn army_of_one_replaces_king_steps_with_queen_slides() {
        let mut board = Board::new_empty();
        let king = spawn(&mut board, PieceKind::King, Side::Player, 7, 4);
        let mut status = StatusRegistry::new();
        status.apply(king.id, StatusKind::ArmyOfOne, 3);
        let moves = moves_for(&king, &board, &status, &TurnModifiers::none(), false);
        assert!(moves.iter().any(|t| t.square == Square::new(0, 4)));
        assert_eq!(moves.len(), 7 + 7 + 3 + 4);
    }

    #[test]
    fn dash_extends_king_reach() {
        let mut board = Board::new_empty();
        let king = spawn(&mut board, PieceKind::King, Side::Player, 7, 4);
        let modifiers = TurnModifiers {
            dash_piece: Some(king.id),
            ..TurnModifiers::default()
        };
        let moves = moves_for(&king, &board, &StatusRegistry::new(), &modifiers, false);
        assert!(moves.iter().any(|t| t.square == Square::new(4, 4)));
        assert!(!moves.iter().any(|t| t.square == Square::new(3, 4)));
    }

    #[test]
    fn dash_adds_to_the_pawn_double_step() {
        let mut board = Board::new_empty();
        let pawn = spawn(&mut board, PieceKind::Pawn, Side::Player, 6, 4);
        let modifiers = TurnModifiers {
            dash_piece: Some(pawn.id),
            ..TurnModifiers::default()
        };
        let moves = moves_for(&pawn, &board, &StatusRegistry::new(), &modifiers, false);
        assert!(moves.iter().any(|t| t.square == Square::new(2, 4)));
        assert!(!moves.iter().any(|t| t.square == Square::new(1, 4)));
    }
}
