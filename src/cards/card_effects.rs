//! What each card does to the battle once its targets are known.
//!
//! Each effect validates everything it needs before touching the battle, so
//! an `Err` leaves the state as it was. Rewind is not handled here because
//! it needs the session's turn history.

use crate::cards::card_catalog::*;
use crate::cards::targeting::ResolvedTarget;
use crate::errors::{RogueError, RogueResult};
use crate::game::session::BattleState;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusKind;
use crate::move_generation::legal_move_apply::promote_if_due;

/// Apply `card` to `battle`, returning a message for the player.
pub fn apply_effect(
    card: CardId,
    target: ResolvedTarget,
    battle: &mut BattleState,
) -> RogueResult<String> {
    use CardId::*;

    match (card, target) {
        (Rally, ResolvedTarget::None) => {
            battle.modifiers.extra_range = battle.modifiers.extra_range.saturating_add(1);
            Ok("Your pieces surge forward: one extra square of reach this turn.".to_owned())
        }
        (KnightsTour, ResolvedTarget::None) => {
            battle.modifiers.knights_tour = true;
            Ok("Every piece may also leap like a knight this turn.".to_owned())
        }
        (Snipe, ResolvedTarget::None) => {
            battle.modifiers.piercing = true;
            Ok("Ranged pieces may shoot through one blocker this turn.".to_owned())
        }
        (ChainReaction, ResolvedTarget::None) => {
            battle.modifiers.chain_reaction = true;
            Ok("Your next capture will set off a chain reaction.".to_owned())
        }
        (ParallelPlay, ResolvedTarget::None) => {
            battle.modifiers.moves_allowed = battle.modifiers.moves_allowed.max(2);
            Ok("You may make two moves this turn.".to_owned())
        }
        (ArmyOfOne, ResolvedTarget::None) => {
            let king = battle
                .board
                .king(Side::Player)
                .map(|k| k.id)
                .ok_or_else(|| RogueError::InvalidTarget("you have no king".to_owned()))?;
            battle
                .status
                .apply(king, StatusKind::ArmyOfOne, ARMY_OF_ONE_TURNS);
            Ok(format!(
                "Your king moves like a queen for {} turns.",
                ARMY_OF_ONE_TURNS
            ))
        }
        (LoadedDice, ResolvedTarget::None) => {
            battle.enemy_skip_pending = true;
            Ok("The dice are loaded against the enemy's next move.".to_owned())
        }
        (Zugzwang, ResolvedTarget::None) => {
            battle.zugzwang_pending = true;
            Ok("The enemy king will be forced to move.".to_owned())
        }

        (Dash, ResolvedTarget::Piece(id)) => {
            own_piece(battle, id)?;
            battle.modifiers.dash_piece = Some(id);
            Ok("That piece reaches two squares further this turn.".to_owned())
        }
        (GhostWalk, ResolvedTarget::Piece(id)) => {
            own_piece(battle, id)?;
            battle.modifiers.ghost_piece = Some(id);
            Ok("That piece passes through enemies this turn.".to_owned())
        }
        (Ricochet, ResolvedTarget::Piece(id)) => {
            own_piece(battle, id)?;
            battle.modifiers.ricochet_piece = Some(id);
            Ok("That piece's next capture will ricochet.".to_owned())
        }
        (Freeze, ResolvedTarget::Piece(id)) => {
            let piece = enemy_piece(battle, id)?;
            battle.status.apply(id, StatusKind::Frozen, FREEZE_TURNS);
            Ok(format!("The enemy {:?} is frozen.", piece.kind))
        }
        (Shield, ResolvedTarget::Piece(id)) => {
            own_piece(battle, id)?;
            battle.status.apply(id, StatusKind::Shielded, SHIELD_TURNS);
            Ok("A shield will turn aside the next capture.".to_owned())
        }
        (Brace, ResolvedTarget::Piece(id)) => {
            let piece = own_piece(battle, id)?;
            let mut braced = vec![id];
            for direction in Direction::ORTHOGONAL {
                if let Some(ally) = piece
                    .square
                    .step(direction)
                    .and_then(|sq| battle.board.piece_at(sq))
                    .filter(|p| p.owner == Side::Player)
                {
                    braced.push(ally.id);
                }
            }
            for ally in &braced {
                battle.status.apply(*ally, StatusKind::Braced, BRACE_TURNS);
            }
            Ok(format!("{} pieces brace for impact.", braced.len()))
        }
        (StoneForm, ResolvedTarget::Piece(id)) => {
            battle
                .board
                .piece_by_id(id)
                .ok_or(RogueError::UnknownPiece(id))?;
            battle
                .status
                .apply(id, StatusKind::Invulnerable, STONE_FORM_TURNS);
            Ok("The piece turns to stone.".to_owned())
        }
        (MindControl, ResolvedTarget::Piece(id)) => {
            let piece = enemy_piece(battle, id)?;
            if piece.kind == PieceKind::King {
                return Err(RogueError::InvalidTarget("kings cannot be controlled".to_owned()));
            }
            battle.board.set_owner(piece.square, Side::Player)?;
            battle
                .status
                .apply(id, StatusKind::Controlled, MIND_CONTROL_TURNS);
            Ok(format!(
                "The enemy {:?} fights for you for {} turns.",
                piece.kind, MIND_CONTROL_TURNS
            ))
        }
        (Usurper, ResolvedTarget::Piece(id)) => {
            let piece = own_piece(battle, id)?;
            if matches!(piece.kind, PieceKind::King | PieceKind::Pawn) {
                return Err(RogueError::InvalidTarget(
                    "choose a piece other than a king or pawn".to_owned(),
                ));
            }
            let king = *battle
                .board
                .king(Side::Player)
                .ok_or_else(|| RogueError::InvalidTarget("you have no king".to_owned()))?;
            battle.board.set_kind(piece.square, PieceKind::King)?;
            battle.board.set_kind(king.square, piece.kind)?;
            if let Some(turns) = battle.status.remaining(king.id, StatusKind::ArmyOfOne) {
                battle.status.clear(king.id, StatusKind::ArmyOfOne);
                battle.status.apply(id, StatusKind::ArmyOfOne, turns);
            }
            Ok(format!("Your {:?} takes the crown.", piece.kind))
        }
        (Demotion, ResolvedTarget::Piece(id)) => {
            let piece = enemy_piece(battle, id)?;
            let demoted = match piece.kind {
                PieceKind::Queen => PieceKind::Rook,
                PieceKind::Rook => PieceKind::Bishop,
                PieceKind::Bishop | PieceKind::Knight => PieceKind::Pawn,
                PieceKind::King | PieceKind::Pawn => {
                    return Err(RogueError::InvalidTarget(
                        "kings and pawns cannot be demoted".to_owned(),
                    ))
                }
            };
            battle.board.set_kind(piece.square, demoted)?;
            Ok(format!("The enemy {:?} is reduced to a {:?}.", piece.kind, demoted))
        }
        (Exile, ResolvedTarget::Piece(id)) => {
            let piece = enemy_piece(battle, id)?;
            if piece.kind == PieceKind::King {
                return Err(RogueError::InvalidTarget("kings cannot be exiled".to_owned()));
            }
            battle.board.remove(piece.square);
            battle.status.forget_piece(id);
            Ok(format!("The enemy {:?} is exiled.", piece.kind))
        }

        (Phantom, ResolvedTarget::Square(square)) => {
            empty_square(battle, square)?;
            let id = battle.board.spawn(PieceKind::Knight, Side::Player, square)?;
            battle.status.apply(id, StatusKind::Phantom, PHANTOM_TURNS);
            Ok(format!("A phantom knight appears on {}.", square))
        }
        (Trap, ResolvedTarget::Square(square)) => {
            empty_square(battle, square)?;
            battle.status.place_trap(square);
            Ok(format!("A trap is hidden on {}.", square))
        }

        (Switcheroo, ResolvedTarget::TwoPieces(first, second)) => {
            let a = own_piece(battle, first)?;
            let b = own_piece(battle, second)?;
            battle.board.swap(a.square, b.square)?;
            Ok("Your pieces trade places.".to_owned())
        }

        (Shove, ResolvedTarget::PieceAndEnemy { mover, enemy }) => {
            let pusher = own_piece(battle, mover)?;
            let victim = enemy_piece(battle, enemy)?;
            let direction = Direction::between(pusher.square, victim.square)
                .filter(|_| pusher.square.chebyshev(victim.square) == 1)
                .ok_or_else(|| RogueError::InvalidTarget("the enemy must be adjacent".to_owned()))?;
            if battle.status.has(enemy, StatusKind::Invulnerable) {
                return Err(RogueError::InvalidTarget(
                    "a piece of stone cannot be pushed".to_owned(),
                ));
            }
            let landing = victim
                .square
                .step(direction)
                .filter(|sq| battle.board.is_empty(*sq))
                .ok_or_else(|| {
                    RogueError::InvalidTarget("there is no room to push that piece".to_owned())
                })?;
            battle.board.move_piece(victim.square, landing)?;
            promote_if_due(&mut battle.board, landing)?;
            Ok(format!("The enemy {:?} is shoved to {}.", victim.kind, landing))
        }

        (Lunge, ResolvedTarget::PieceAndDirection(id, direction)) => {
            let piece = own_piece(battle, id)?;
            if !direction.is_unit() {
                return Err(RogueError::InvalidTarget(
                    "lunge one square at a time".to_owned(),
                ));
            }
            if !battle.status.is_actionable(id) {
                return Err(RogueError::InvalidTarget("that piece cannot move".to_owned()));
            }
            let landing = piece
                .square
                .step(direction)
                .filter(|sq| battle.board.is_empty(*sq))
                .ok_or_else(|| RogueError::InvalidTarget("that square is blocked".to_owned()))?;
            battle.board.move_piece(piece.square, landing)?;
            promote_if_due(&mut battle.board, landing)?;
            Ok(format!("Your {:?} lunges to {}.", piece.kind, landing))
        }

        (FieldPromotion, ResolvedTarget::PieceAndKind(id, kind)) => {
            let piece = own_piece(battle, id)?;
            if piece.kind != PieceKind::Pawn {
                return Err(RogueError::InvalidTarget("only pawns can be promoted".to_owned()));
            }
            if matches!(kind, PieceKind::King | PieceKind::Pawn) {
                return Err(RogueError::InvalidTarget(
                    "choose knight, bishop, rook or queen".to_owned(),
                ));
            }
            battle.board.set_kind(piece.square, kind)?;
            Ok(format!("Your pawn is promoted to a {:?}.", kind))
        }

        (
            Resurrect,
            ResolvedTarget::Revive {
                captured_index,
                square,
            },
        ) => {
            if captured_index >= battle.captured.len() {
                return Err(RogueError::InvalidTarget(
                    "no fallen piece with that number".to_owned(),
                ));
            }
            empty_square(battle, square)?;
            if square.row < 6 {
                return Err(RogueError::InvalidTarget(
                    "fallen pieces return to your back two rows".to_owned(),
                ));
            }
            let kind = battle.captured[captured_index];
            battle.board.spawn(kind, Side::Player, square)?;
            battle.captured.remove(captured_index);
            Ok(format!("Your {:?} returns to the fight on {}.", kind, square))
        }

        (card, target) => Err(RogueError::InvalidTarget(format!(
            "{} cannot be played on {:?}",
            card, target
        ))),
    }
}

fn own_piece(battle: &BattleState, id: PieceId) -> RogueResult<Piece> {
    let piece = *battle
        .board
        .piece_by_id(id)
        .ok_or(RogueError::UnknownPiece(id))?;
    if piece.owner != Side::Player {
        return Err(RogueError::InvalidTarget("that piece is not yours".to_owned()));
    }
    Ok(piece)
}

fn enemy_piece(battle: &BattleState, id: PieceId) -> RogueResult<Piece> {
    let piece = *battle
        .board
        .piece_by_id(id)
        .ok_or(RogueError::UnknownPiece(id))?;
    if piece.owner != Side::Enemy {
        return Err(RogueError::InvalidTarget("choose an enemy piece".to_owned()));
    }
    Ok(piece)
}

fn empty_square(battle: &BattleState, square: Square) -> RogueResult<()> {
    if !square.is_on_board() {
        return Err(RogueError::OffBoard {
            row: square.row,
            col: square.col,
        });
    }
    if !battle.board.is_empty(square) {
        return Err(RogueError::OccupiedSquare(square));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::layout_parser::parse_layout;

    fn battle(layout: &str) -> BattleState {
        BattleState {
            board: parse_layout(layout).expect("valid layout"),
            ..BattleState::default()
        }
    }

    fn id_at(battle: &BattleState, row: i8, col: i8) -> PieceId {
        battle
            .board
            .piece_at(Square::new(row, col))
            .expect("piece expected")
            .id
    }

    #[test]
    fn freeze_locks_an_enemy_piece() {
        let mut battle = battle("3qk3/8/8/8/8/8/8/4K3");
        let queen = id_at(&battle, 0, 3);
        apply_effect(CardId::Freeze, ResolvedTarget::Piece(queen), &mut battle)
            .expect("freeze should apply");
        assert_eq!(
            battle.status.remaining(queen, StatusKind::Frozen),
            Some(FREEZE_TURNS)
        );
        assert!(!battle.status.is_actionable(queen));
    }

    #[test]
    fn brace_covers_orthogonal_allies_only() {
        let mut battle = battle("4k3/8/8/8/3P4/2PRP3/3PP3/4K3");
        let rook = id_at(&battle, 5, 3);
        apply_effect(CardId::Brace, ResolvedTarget::Piece(rook), &mut battle)
            .expect("brace should apply");

        for (row, col) in [(5, 3), (4, 3), (5, 2), (5, 4), (6, 3)] {
            assert!(
                battle.status.has(id_at(&battle, row, col), StatusKind::Braced),
                "({row}, {col}) should be braced"
            );
        }
        assert!(!battle.status.has(id_at(&battle, 6, 4), StatusKind::Braced));
    }

    #[test]
    fn mind_control_flips_ownership() {
        let mut battle = battle("3qk3/8/8/8/8/8/8/4K3");
        let queen = id_at(&battle, 0, 3);
        apply_effect(CardId::MindControl, ResolvedTarget::Piece(queen), &mut battle)
            .expect("control should apply");
        assert_eq!(
            battle.board.piece_by_id(queen).map(|p| p.owner),
            Some(Side::Player)
        );
        assert!(battle.status.has(queen, StatusKind::Controlled));
    }

    #[test]
    fn usurper_moves_the_crown() {
        let mut battle = battle("4k3/8/8/8/8/8/8/3QK3");
        let queen = id_at(&battle, 7, 3);
        let king = id_at(&battle, 7, 4);
        battle.status.apply(king, StatusKind::ArmyOfOne, 2);

        apply_effect(CardId::Usurper, ResolvedTarget::Piece(queen), &mut battle)
            .expect("usurper should apply");

        assert_eq!(battle.board.king(Side::Player).map(|k| k.id), Some(queen));
        assert_eq!(
            battle.board.piece_by_id(king).map(|p| p.kind),
            Some(PieceKind::Queen)
        );
        assert!(battle.status.has(queen, StatusKind::ArmyOfOne));
        assert!(!battle.status.has(king, StatusKind::ArmyOfOne));
    }

    #[test]
    fn demotion_ladder() {
        let mut battle = battle("qrbnk3/8/8/8/8/8/8/4K3");
        let expected = [
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Pawn,
            PieceKind::Pawn,
        ];
        for (col, want) in expected.into_iter().enumerate() {
            let id = id_at(&battle, 0, col as i8);
            apply_effect(CardId::Demotion, ResolvedTarget::Piece(id), &mut battle)
                .expect("demotion should apply");
            assert_eq!(battle.board.piece_by_id(id).map(|p| p.kind), Some(want));
        }
    }

    #[test]
    fn shove_needs_room_behind_the_enemy() {
        let mut battle = battle("4k3/8/8/3n4/3R4/8/8/4K3");
        let rook = id_at(&battle, 4, 3);
        let knight = id_at(&battle, 3, 3);
        apply_effect(
            CardId::Shove,
            ResolvedTarget::PieceAndEnemy {
                mover: rook,
                enemy: knight,
            },
            &mut battle,
        )
        .expect("shove should apply");
        assert_eq!(battle.board.find(knight), Some(Square::new(2, 3)));

        let mut blocked = self::battle("4k3/8/3p4/3n4/3R4/8/8/4K3");
        let before = blocked.board.clone();
        let rook = id_at(&blocked, 4, 3);
        let knight = id_at(&blocked, 3, 3);
        let result = apply_effect(
            CardId::Shove,
            ResolvedTarget::PieceAndEnemy {
                mover: rook,
                enemy: knight,
            },
            &mut blocked,
        );
        assert!(matches!(result, Err(RogueError::InvalidTarget(_))));
        assert_eq!(blocked.board, before);
    }

    #[test]
    fn resurrect_returns_a_fallen_piece() {
        let mut battle = battle("4k3/8/8/8/8/8/8/4K3");
        battle.captured = vec![PieceKind::Knight, PieceKind::Rook];
        apply_effect(
            CardId::Resurrect,
            ResolvedTarget::Revive {
                captured_index: 1,
                square: Square::new(7, 0),
            },
            &mut battle,
        )
        .expect("resurrect should apply");
        assert_eq!(
            battle.board.piece_at(Square::new(7, 0)).map(|p| p.kind),
            Some(PieceKind::Rook)
        );
        assert_eq!(battle.captured, vec![PieceKind::Knight]);
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let mut battle = battle("4k3/8/8/8/8/8/8/4K3");
        let before = battle.board.clone();
        let result = apply_effect(CardId::Freeze, ResolvedTarget::None, &mut battle);
        assert!(matches!(result, Err(RogueError::InvalidTarget(_))));
        assert_eq!(battle.board, before);
    }
}
