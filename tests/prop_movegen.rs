//! Property-based tests for move generation, notation and status ticking.
//!
//! Run with: cargo test --release prop_movegen

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use rogue_gambit::game_state::board::Board;
use rogue_gambit::game_state::chess_types::{Direction, PieceKind, Side, Square};
use rogue_gambit::game_state::status::{StatusKind, StatusRegistry};
use rogue_gambit::game_state::turn_modifiers::TurnModifiers;
use rogue_gambit::move_generation::legal_move_generator::moves_for;
use rogue_gambit::utils::algebraic::{algebraic_to_square, square_to_algebraic, Orientation};
use rogue_gambit::utils::long_algebraic::{long_algebraic_to_move, move_to_long_algebraic, MoveCode};

const KINDS: [PieceKind; 6] = [
    PieceKind::King,
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Pawn,
];

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![
        Just(Orientation::PlayerIsWhite),
        Just(Orientation::EnemyIsWhite)
    ]
}

/// Up to 20 pieces on distinct squares; later duplicates are skipped.
fn board_strategy() -> impl Strategy<Value = Board> {
    prop::collection::vec((0usize..6, any::<bool>(), 0usize..64), 1..20).prop_map(|placements| {
        let mut board = Board::new_empty();
        for (kind, is_player, index) in placements {
            let owner = if is_player { Side::Player } else { Side::Enemy };
            let _ = board.spawn(KINDS[kind], owner, Square::from_index(index));
        }
        board
    })
}

fn signum_direction(from: Square, to: Square) -> Direction {
    Direction::new((to.row - from.row).signum(), (to.col - from.col).signum())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Destinations stay on the board and never hold a piece of the mover's side.
    #[test]
    fn prop_moves_never_land_on_own_pieces(board in board_strategy()) {
        let status = StatusRegistry::new();
        let modifiers = TurnModifiers::none();
        for piece in board.all_pieces() {
            for target in moves_for(piece, &board, &status, &modifiers, false) {
                prop_assert!(target.square.is_on_board());
                if let Some(occupant) = board.piece_at(target.square) {
                    prop_assert_ne!(occupant.owner, piece.owner);
                }
            }
        }
    }

    /// Frozen and invulnerable pieces have no moves at all.
    #[test]
    fn prop_locked_pieces_cannot_move(board in board_strategy(), invulnerable in any::<bool>()) {
        let mut status = StatusRegistry::new();
        let kind = if invulnerable { StatusKind::Invulnerable } else { StatusKind::Frozen };
        for piece in board.all_pieces() {
            status.apply(piece.id, kind, 2);
        }
        let modifiers = TurnModifiers {
            extra_range: 2,
            knights_tour: true,
            ..TurnModifiers::default()
        };
        for piece in board.all_pieces() {
            prop_assert!(moves_for(piece, &board, &status, &modifiers, false).is_empty());
        }
    }

    /// Without modifiers a slider never passes its first blocker.
    #[test]
    fn prop_sliders_stop_at_first_blocker(board in board_strategy()) {
        let status = StatusRegistry::new();
        let modifiers = TurnModifiers::none();
        for piece in board.all_pieces().filter(|p| p.kind.is_slider()) {
            for target in moves_for(piece, &board, &status, &modifiers, false) {
                let dir = signum_direction(piece.square, target.square);
                let mut cursor = piece.square.step(dir);
                while let Some(square) = cursor {
                    if square == target.square {
                        break;
                    }
                    prop_assert!(board.is_empty(square), "{} jumped over {}", piece.square, square);
                    cursor = square.step(dir);
                }
            }
        }
    }

    /// An invulnerable piece is never offered as a capture.
    #[test]
    fn prop_invulnerable_pieces_are_never_targets(board in board_strategy(), pick in 0usize..20) {
        let pieces: Vec<_> = board.all_pieces().copied().collect();
        let stone = pieces[pick % pieces.len()];
        let mut status = StatusRegistry::new();
        status.apply(stone.id, StatusKind::Invulnerable, 2);
        let modifiers = TurnModifiers { piercing: true, ..TurnModifiers::default() };
        for piece in board.all_pieces() {
            for target in moves_for(piece, &board, &status, &modifiers, false) {
                prop_assert_ne!(target.square, stone.square);
            }
        }
    }

    #[test]
    fn prop_square_notation_round_trips(row in 0i8..8, col in 0i8..8, orientation in orientation()) {
        let square = Square::new(row, col);
        let text = square_to_algebraic(square, orientation).unwrap();
        prop_assert_eq!(algebraic_to_square(&text, orientation).unwrap(), square);
    }

    #[test]
    fn prop_move_codes_round_trip(
        from in 0usize..64,
        to in 0usize..64,
        promote in any::<bool>(),
        orientation in orientation(),
    ) {
        prop_assume!(from != to);
        let code = MoveCode {
            from: Square::from_index(from),
            to: Square::from_index(to),
            promotion: promote.then_some(PieceKind::Queen),
        };
        let text = move_to_long_algebraic(&code, orientation).unwrap();
        prop_assert_eq!(text.len(), if promote { 5 } else { 4 });
        prop_assert_eq!(long_algebraic_to_move(&text, orientation).unwrap(), code);
    }

    /// An effect applied for `n` turns is active for exactly `n` ticks, and
    /// ticking afterwards reports nothing further.
    #[test]
    fn prop_status_expires_after_its_duration(turns in 1u8..6, extra_ticks in 1usize..4) {
        let mut board = Board::new_empty();
        let id = board.spawn(PieceKind::Rook, Side::Enemy, Square::new(2, 2)).unwrap();
        let mut status = StatusRegistry::new();
        status.apply(id, StatusKind::Frozen, turns);

        for remaining in (1..turns).rev() {
            prop_assert!(status.tick(&mut board).is_empty());
            prop_assert_eq!(status.remaining(id, StatusKind::Frozen), Some(remaining));
        }
        let expiries = status.tick(&mut board);
        prop_assert_eq!(expiries.len(), 1);
        prop_assert!(!status.has(id, StatusKind::Frozen));

        let snapshot = board.clone();
        for _ in 0..extra_ticks {
            prop_assert!(status.tick(&mut board).is_empty());
        }
        prop_assert_eq!(board, snapshot);
        prop_assert!(status.is_empty());
    }
}
