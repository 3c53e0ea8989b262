//! Depth-limited alpha-beta used to look one reply deeper.
//!
//! Each node orders its moves by the static evaluation from the mover's
//! point of view and only searches the best `breadth` of them, so the
//! opponent's reply is modelled as a greedy choice among its top candidates
//! rather than a full adversarial search. Status effects are not ticked
//! inside the search.

use crate::game_state::board::Board;
use crate::game_state::chess_types::Side;
use crate::game_state::status::StatusRegistry;
use crate::game_state::turn_modifiers::TurnModifiers;
use crate::move_generation::legal_move_apply::simulate_move;
use crate::move_generation::legal_move_generator::all_moves;
use crate::search::board_scoring::BoardScorer;

pub const SCORE_INFINITY: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: u8,
    pub breadth: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

/// Value of `board` for `perspective` with `to_move` about to play.
pub fn search_value(
    board: &Board,
    status: &StatusRegistry,
    to_move: Side,
    perspective: Side,
    limits: SearchLimits,
    scorer: &dyn BoardScorer,
    stats: &mut SearchStats,
) -> i32 {
    alpha_beta(
        board,
        status,
        to_move,
        perspective,
        limits.depth,
        -SCORE_INFINITY,
        SCORE_INFINITY,
        limits.breadth.max(1),
        scorer,
        stats,
    )
}

#[allow(clippy::too_many_arguments)]
fn alpha_beta(
    board: &Board,
    status: &StatusRegistry,
    to_move: Side,
    perspective: Side,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    breadth: usize,
    scorer: &dyn BoardScorer,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;
    if depth == 0 || board.king(to_move).is_none() || board.king(perspective).is_none() {
        return scorer.score(board, status, perspective);
    }

    let children = ordered_children(board, status, to_move, breadth, scorer);
    if children.is_empty() {
        return scorer.score(board, status, perspective);
    }

    let maximizing = to_move == perspective;
    let mut best = if maximizing {
        -SCORE_INFINITY
    } else {
        SCORE_INFINITY
    };

    for child in &children {
        let value = alpha_beta(
            child,
            status,
            to_move.opposite(),
            perspective,
            depth - 1,
            alpha,
            beta,
            breadth,
            scorer,
            stats,
        );
        if maximizing {
            best = best.max(value);
            alpha = alpha.max(best);
        } else {
            best = best.min(value);
            beta = beta.min(best);
        }
        if alpha >= beta {
            stats.cutoffs += 1;
            break;
        }
    }

    best
}

/// Resulting boards of `to_move`'s best `breadth` moves by static score.
fn ordered_children(
    board: &Board,
    status: &StatusRegistry,
    to_move: Side,
    breadth: usize,
    scorer: &dyn BoardScorer,
) -> Vec<Board> {
    let modifiers = TurnModifiers::none();
    let mut scored: Vec<(i32, Board)> =
        all_moves(board, status, to_move, &modifiers, to_move == Side::Enemy)
            .into_iter()
            .filter_map(|(piece, target)| simulate_move(board, status, piece.square, target).ok())
            .map(|sim| (scorer.score(&sim.board, status, to_move), sim.board))
            .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(breadth);
    scored.into_iter().map(|(_, board)| board).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::board_scoring::MaterialScorer;
    use crate::utils::layout_parser::parse_layout;

    #[test]
    fn sees_the_recapture() {
        // Enemy queen took a pawn on (4,4) that the player rook on (4,0) defends.
        let board = parse_layout("4k3/8/8/8/R3q3/8/8/4K3").expect("valid layout");
        let status = StatusRegistry::new();
        let mut stats = SearchStats::default();

        let static_value = MaterialScorer.score(&board, &status, Side::Enemy);
        let searched = search_value(
            &board,
            &status,
            Side::Player,
            Side::Enemy,
            SearchLimits {
                depth: 1,
                breadth: 4,
            },
            &MaterialScorer,
            &mut stats,
        );
        assert_eq!(static_value, 400);
        assert_eq!(searched, -500);
        assert!(stats.nodes > 1);
    }

    #[test]
    fn depth_zero_is_the_static_score() {
        let board = parse_layout("4k3/8/8/8/8/8/8/3QK3").expect("valid layout");
        let status = StatusRegistry::new();
        let mut stats = SearchStats::default();
        let value = search_value(
            &board,
            &status,
            Side::Enemy,
            Side::Player,
            SearchLimits {
                depth: 0,
                breadth: 4,
            },
            &MaterialScorer,
            &mut stats,
        );
        assert_eq!(value, 900);
        assert_eq!(stats.nodes, 1);
    }

    #[test]
    fn search_never_mutates_the_input() {
        let board = parse_layout("r3k3/pppp4/8/8/8/8/2PPPP2/2NQKR2").expect("valid layout");
        let before = board.clone();
        let status = StatusRegistry::new();
        let mut stats = SearchStats::default();
        let _ = search_value(
            &board,
            &status,
            Side::Enemy,
            Side::Enemy,
            SearchLimits {
                depth: 2,
                breadth: 3,
            },
            &MaterialScorer,
            &mut stats,
        );
        assert_eq!(board, before);
    }
}
