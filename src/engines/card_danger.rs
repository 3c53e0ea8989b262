//! The adversary's fear of cards it has not seen played yet.
//!
//! Each card in the player's hand maps to a positional condition and a fixed
//! penalty. A candidate move pays the penalty of every held card whose
//! condition holds on the position after the move.

use crate::cards::card_catalog::CardId;
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusRegistry;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::knight_moves::is_knight_offset;
use crate::moves::sliding_moves::slide_directions;
use crate::search::board_scoring::piece_value;

/// Position after a candidate enemy move.
#[derive(Debug, Clone, Copy)]
pub struct DangerContext<'a> {
    pub board: &'a Board,
    pub status: &'a StatusRegistry,
    pub from: Square,
    pub to: Square,
    /// The moved piece as it stands on `to`.
    pub mover: Piece,
    pub is_capture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerCondition {
    /// Destination within `radius` squares of a player rook, queen or king.
    NearHighValue { radius: i8 },
    /// Destination a knight jump away from any player piece.
    KnightOffsetOfOpponent,
    /// Exactly one piece separates a player slider from the destination.
    OneObstructionBehindRanged,
    /// A player slider shares an open or blocked line with the destination.
    OnSliderLine,
    /// Destination adjacent to a player piece.
    AdjacentToOpponent,
    /// Destination attacked by the player and next to another enemy piece.
    AttackedAndClustered,
    /// The moved piece is worth at least `min_value`.
    ValuableMover { min_value: i32 },
    /// Unblocked queen line from the player king to the destination.
    OnKingQueenLine,
    /// A king stepping onto the edge or a corner.
    KingToEdgeOrCorner,
    /// The move captures something.
    Capture,
}

pub const fn danger_rule(card: CardId) -> Option<(DangerCondition, i32)> {
    use DangerCondition::*;
    match card {
        CardId::Dash => Some((NearHighValue { radius: 3 }, 40)),
        CardId::Rally => Some((NearHighValue { radius: 2 }, 30)),
        CardId::GhostWalk => Some((OnSliderLine, 35)),
        CardId::KnightsTour => Some((KnightOffsetOfOpponent, 50)),
        CardId::Snipe => Some((OneObstructionBehindRanged, 60)),
        CardId::ChainReaction => Some((AttackedAndClustered, 45)),
        CardId::Ricochet => Some((AttackedAndClustered, 35)),
        CardId::ParallelPlay => Some((NearHighValue { radius: 2 }, 25)),
        CardId::ArmyOfOne => Some((OnKingQueenLine, 50)),
        CardId::Freeze => Some((ValuableMover { min_value: 500 }, 20)),
        CardId::MindControl => Some((ValuableMover { min_value: 500 }, 40)),
        CardId::Demotion => Some((ValuableMover { min_value: 900 }, 30)),
        CardId::Exile => Some((ValuableMover { min_value: 500 }, 45)),
        CardId::Shove => Some((AdjacentToOpponent, 20)),
        CardId::Zugzwang => Some((KingToEdgeOrCorner, 30)),
        CardId::Rewind => Some((Capture, 20)),
        CardId::Shield
        | CardId::Brace
        | CardId::StoneForm
        | CardId::Phantom
        | CardId::Trap
        | CardId::Usurper
        | CardId::LoadedDice
        | CardId::Switcheroo
        | CardId::Lunge
        | CardId::FieldPromotion
        | CardId::Resurrect => None,
    }
}

pub fn condition_holds(condition: DangerCondition, ctx: &DangerContext<'_>) -> bool {
    let player = ctx.mover.owner.opposite();
    match condition {
        DangerCondition::NearHighValue { radius } => ctx.board.pieces(player).any(|p| {
            matches!(p.kind, PieceKind::Rook | PieceKind::Queen | PieceKind::King)
                && p.square.chebyshev(ctx.to) <= radius
        }),
        DangerCondition::KnightOffsetOfOpponent => ctx
            .board
            .pieces(player)
            .any(|p| is_knight_offset(p.square, ctx.to)),
        DangerCondition::OneObstructionBehindRanged => ctx
            .board
            .pieces(player)
            .filter(|p| p.kind.is_slider())
            .any(|p| blockers_on_line(ctx.board, p, ctx.to) == Some(1)),
        DangerCondition::OnSliderLine => ctx
            .board
            .pieces(player)
            .filter(|p| p.kind.is_slider())
            .any(|p| blockers_on_line(ctx.board, p, ctx.to).is_some()),
        DangerCondition::AdjacentToOpponent => ctx
            .board
            .pieces(player)
            .any(|p| p.square.chebyshev(ctx.to) == 1),
        DangerCondition::AttackedAndClustered => {
            is_square_attacked(ctx.board, ctx.status, ctx.to, player)
                && ctx.to.neighbors().any(|sq| {
                    ctx.board
                        .piece_at(sq)
                        .is_some_and(|p| p.owner == ctx.mover.owner && p.kind != PieceKind::King)
                })
        }
        DangerCondition::ValuableMover { min_value } => piece_value(ctx.mover.kind) >= min_value,
        DangerCondition::OnKingQueenLine => ctx.board.king(player).is_some_and(|king| {
            let queen = Piece {
                kind: PieceKind::Queen,
                ..*king
            };
            blockers_on_line(ctx.board, &queen, ctx.to) == Some(0)
        }),
        DangerCondition::KingToEdgeOrCorner => {
            ctx.mover.kind == PieceKind::King && (ctx.to.is_edge() || ctx.to.is_corner())
        }
        DangerCondition::Capture => ctx.is_capture,
    }
}

/// Sum of penalties for every held card whose condition holds, before the
/// difficulty multiplier.
pub fn card_danger_penalty(hand: &[CardId], ctx: &DangerContext<'_>) -> i32 {
    hand.iter()
        .filter_map(|card| danger_rule(*card))
        .filter(|(condition, _)| condition_holds(*condition, ctx))
        .map(|(_, penalty)| penalty)
        .sum()
}

/// Number of pieces strictly between `slider` and `target`, if `target` lies
/// on one of the slider's lines.
fn blockers_on_line(board: &Board, slider: &Piece, target: Square) -> Option<u8> {
    let dr = target.row - slider.square.row;
    let dc = target.col - slider.square.col;
    if dr == 0 && dc == 0 {
        return None;
    }
    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return None;
    }
    let direction = Direction::new(dr.signum(), dc.signum());
    if !slide_directions(slider.kind).contains(&direction) {
        return None;
    }

    let mut count = 0u8;
    let mut cursor = slider.square.step(direction);
    while let Some(square) = cursor {
        if square == target {
            return Some(count);
        }
        if board.piece_at(square).is_some() {
            count += 1;
        }
        cursor = square.step(direction);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::layout_parser::parse_layout;

    fn ctx<'a>(board: &'a Board, status: &'a StatusRegistry, to: Square) -> DangerContext<'a> {
        let mover = *board.piece_at(to).expect("mover should stand on the destination");
        DangerContext {
            board,
            status,
            from: to,
            to,
            mover,
            is_capture: false,
        }
    }

    #[test]
    fn snipe_fears_a_single_screen() {
        // Player rook on (7,0), player pawn screen on (5,0), enemy knight lands on (3,0).
        let board = parse_layout("4k3/8/8/n7/8/P7/8/R3K3").expect("valid layout");
        let status = StatusRegistry::new();
        let c = ctx(&board, &status, Square::new(3, 0));
        assert!(condition_holds(DangerCondition::OneObstructionBehindRanged, &c));
        assert_eq!(card_danger_penalty(&[CardId::Snipe], &c), 60);
    }

    #[test]
    fn open_line_is_not_a_snipe_threat() {
        let board = parse_layout("4k3/8/8/n7/8/8/8/R3K3").expect("valid layout");
        let status = StatusRegistry::new();
        let c = ctx(&board, &status, Square::new(3, 0));
        assert!(!condition_holds(DangerCondition::OneObstructionBehindRanged, &c));
        assert!(condition_holds(DangerCondition::OnSliderLine, &c));
    }

    #[test]
    fn knights_tour_fears_knight_offsets() {
        let board = parse_layout("4k3/8/8/3b4/8/4P3/8/4K3").expect("valid layout");
        let status = StatusRegistry::new();
        let c = ctx(&board, &status, Square::new(3, 3));
        assert_eq!(card_danger_penalty(&[CardId::KnightsTour], &c), 50);
        assert_eq!(card_danger_penalty(&[CardId::Shield, CardId::LoadedDice], &c), 0);
    }

    #[test]
    fn penalties_add_up_across_the_hand() {
        let board = parse_layout("4k3/8/8/8/8/8/3q4/4K3").expect("valid layout");
        let status = StatusRegistry::new();
        let c = ctx(&board, &status, Square::new(6, 3));
        // Adjacent to the player king: Rally, Dash, Shove, Exile and Mind Control all apply.
        let total = card_danger_penalty(
            &[CardId::Rally, CardId::Dash, CardId::Shove, CardId::Exile, CardId::MindControl],
            &c,
        );
        assert_eq!(total, 30 + 40 + 20 + 45 + 40);
    }
}
