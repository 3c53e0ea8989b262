//! End-to-end battle scenarios driven through the public API.
//!
//! Run with: cargo test --release battle_scenarios

#![allow(clippy::unwrap_used)]

use std::sync::mpsc::Receiver;

use rogue_gambit::cards::card_catalog::CardId;
use rogue_gambit::engines::adversary::AdversaryEngine;
use rogue_gambit::engines::archetype::Archetype;
use rogue_gambit::engines::difficulty::Difficulty;
use rogue_gambit::engines::engine_trait::{EnemyEngine, SelectionContext};
use rogue_gambit::engines::tactics::detect_fork;
use rogue_gambit::game::capture::resolve_move;
use rogue_gambit::game::events::SessionEvent;
use rogue_gambit::game::session::{BattleState, CommandOutcome, GameSession};
use rogue_gambit::game::session_config::SessionConfig;
use rogue_gambit::game::turn::Phase;
use rogue_gambit::game_state::chess_types::{PieceKind, Side, Square};
use rogue_gambit::game_state::status::{ExpiryOutcome, StatusKind, StatusRegistry};
use rogue_gambit::game_state::turn_modifiers::TurnModifiers;
use rogue_gambit::move_generation::legal_move_checks::is_checkmate;
use rogue_gambit::move_generation::legal_move_generator::{moves_for, MoveTarget};
use rogue_gambit::utils::layout_parser::parse_layout;

fn session(layout: &str, archetype: Archetype, difficulty: Difficulty, hand: &[CardId]) -> GameSession {
    let mut session = GameSession::new(SessionConfig {
        seed: Some(5),
        auto_enemy_turn: false,
        ..SessionConfig::default()
    });
    session
        .reset_with_board(parse_layout(layout).unwrap(), archetype, difficulty, hand)
        .expect("battle should start");
    session
}

fn battle(layout: &str) -> BattleState {
    BattleState {
        board: parse_layout(layout).unwrap(),
        ..BattleState::default()
    }
}

fn drain(events: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
    events.try_iter().collect()
}

#[test]
fn hard_enemy_pawn_takes_the_hanging_queen() {
    let layout = "4k3/8/8/3p4/4Q3/8/8/4K3";
    let board = parse_layout(layout).unwrap();
    let status = StatusRegistry::new();
    let mut engine = AdversaryEngine::new(Some(3));
    let output = engine
        .choose_move(&SelectionContext {
            board: &board,
            status: &status,
            player_hand: &[],
            difficulty: Difficulty::Hard,
            archetype: Archetype::Wall,
            turn_number: 1,
            recapture_square: None,
        })
        .unwrap();
    let chosen = output.best_move.expect("enemy has moves");
    assert_eq!(chosen.from, Square::new(3, 3));
    assert_eq!(chosen.to, Square::new(4, 4));

    let mut session = session(layout, Archetype::Wall, Difficulty::Hard, &[]);
    let intent = session.enemy_intent().expect("intent is announced");
    assert_eq!((intent.from, intent.to), (Square::new(3, 3), Square::new(4, 4)));

    let events = session.subscribe();
    assert_eq!(session.end_turn(), CommandOutcome::Updated);
    assert_eq!(session.run_enemy_turn(), CommandOutcome::Updated);
    let moved = drain(&events).into_iter().any(|event| {
        event
            == SessionEvent::EnemyMoved {
                from: Square::new(3, 3),
                to: Square::new(4, 4),
                captured: Some(PieceKind::Queen),
                blocked: false,
            }
    });
    assert!(moved);
    assert_eq!(session.captured(), &[PieceKind::Queen]);
}

#[test]
fn shield_turns_away_one_capture() {
    let mut state = battle("4k3/8/8/3p4/4R3/8/8/4K3");
    let rook = state.board.piece_at(Square::new(4, 4)).unwrap().id;
    state.status.apply(rook, StatusKind::Shielded, 1);

    let report = resolve_move(&mut state, Square::new(3, 3), MoveTarget::plain(Square::new(4, 4))).unwrap();
    assert!(report.blocked);
    assert!(report.captured.is_empty());
    assert_eq!(state.board.piece_at(Square::new(4, 4)).unwrap().id, rook);
    assert_eq!(state.board.piece_at(Square::new(3, 3)).unwrap().kind, PieceKind::Pawn);
    assert!(!state.status.has(rook, StatusKind::Shielded));

    let report = resolve_move(&mut state, Square::new(3, 3), MoveTarget::plain(Square::new(4, 4))).unwrap();
    assert!(!report.blocked);
    assert_eq!(report.primary_capture().map(|p| p.id), Some(rook));
    assert_eq!(state.captured, vec![PieceKind::Rook]);
}

#[test]
fn frozen_queen_sits_out_one_enemy_turn() {
    let mut session = session("3qk3/8/8/8/8/8/3P4/4K3", Archetype::Aggressor, Difficulty::Medium, &[CardId::Freeze]);
    assert_eq!(session.select_card(CardId::Freeze), CommandOutcome::Updated);
    assert_eq!(session.select_square(0, 3), CommandOutcome::Updated);
    assert_eq!(session.phase(), Phase::EnemyTurn);

    let queen = *session.board().piece_at(Square::new(0, 3)).unwrap();
    assert!(moves_for(&queen, session.board(), session.status(), &TurnModifiers::none(), true).is_empty());
    if let Some(intent) = session.enemy_intent() {
        assert_ne!(intent.piece, queen.id);
    }

    session.run_enemy_turn();
    assert_eq!(session.board().find(queen.id), Some(Square::new(0, 3)));
    assert!(!session.status().has(queen.id, StatusKind::Frozen));
    assert_eq!(session.phase(), Phase::PlayerTurn);
}

#[test]
fn fourth_card_in_a_battle_is_rejected_without_side_effects() {
    let hand = [
        CardId::Rally,
        CardId::KnightsTour,
        CardId::Snipe,
        CardId::ChainReaction,
    ];
    let mut session = session("4k3/8/8/8/8/8/3P4/4K3", Archetype::Passive, Difficulty::Easy, &hand);
    for card in &hand[..3] {
        assert_eq!(session.select_card(*card), CommandOutcome::Updated);
    }
    assert_eq!(session.cards_played_this_battle(), 3);

    let before = session.battle().clone();
    let outcome = session.select_card(CardId::ChainReaction);
    assert!(matches!(outcome, CommandOutcome::Rejected(_)));
    assert_eq!(session.battle(), &before);
    assert_eq!(session.hand(), &[CardId::ChainReaction]);
    assert_eq!(session.cards_played_this_battle(), 3);
    assert!(session.card_state().is_idle());
}

#[test]
fn phantom_with_one_turn_left_vanishes_on_the_next_tick() {
    let mut state = battle("4k3/8/8/8/8/8/8/4K3");
    let phantom = state
        .board
        .spawn(PieceKind::Knight, Side::Player, Square::new(5, 5))
        .unwrap();
    state.status.apply(phantom, StatusKind::Phantom, 1);

    let expiries = state.status.tick(&mut state.board);
    assert_eq!(expiries.len(), 1);
    assert_eq!(
        expiries[0].outcome,
        ExpiryOutcome::PhantomVanished(Square::new(5, 5))
    );
    assert!(state.board.is_empty(Square::new(5, 5)));
    assert!(state.status.is_empty());
}

#[test]
fn summoned_phantom_fades_after_two_enemy_turns() {
    let mut session = session("7k/8/8/8/8/8/8/4K3", Archetype::Passive, Difficulty::Easy, &[CardId::Phantom]);
    session.select_card(CardId::Phantom);
    assert_eq!(session.select_square(7, 0), CommandOutcome::Updated);
    let knight = session.board().piece_at(Square::new(7, 0)).unwrap().id;

    session.run_enemy_turn();
    assert!(session.board().contains(knight));
    assert_eq!(session.end_turn(), CommandOutcome::Updated);
    session.run_enemy_turn();
    assert!(!session.board().contains(knight));
    assert!(session.captured().is_empty());
}

#[test]
fn protected_queen_mates_a_cornered_king() {
    let status = StatusRegistry::new();
    let mated = parse_layout("k7/1Q6/2K5/8/8/8/8/8").unwrap();
    assert!(is_checkmate(&mated, &status, Side::Enemy, &TurnModifiers::none()));

    let loose = parse_layout("k7/1Q6/8/8/8/8/8/4K3").unwrap();
    assert!(!is_checkmate(&loose, &status, Side::Enemy, &TurnModifiers::none()));
}

#[test]
fn covered_last_escape_square_decides_checkmate() {
    let status = StatusRegistry::new();
    // Rook checks along the back rank; the bishop covers the only flight square.
    let covered = parse_layout("k6R/p7/B7/8/8/8/8/4K3").unwrap();
    assert!(is_checkmate(&covered, &status, Side::Enemy, &TurnModifiers::none()));

    let open = parse_layout("k6R/p7/8/8/8/8/8/4K3").unwrap();
    assert!(!is_checkmate(&open, &status, Side::Enemy, &TurnModifiers::none()));
}

#[test]
fn knight_fork_ignores_pawns() {
    let fork = parse_layout("1r1qk3/8/2N5/8/8/8/8/4K3").unwrap();
    assert!(detect_fork(&fork, Square::new(2, 2)));

    let pawns = parse_layout("1p1qk3/8/2N5/8/8/8/8/4K3").unwrap();
    assert!(!detect_fork(&pawns, Square::new(2, 2)));
}

#[test]
fn checkmating_capture_wins_the_battle() {
    let mut session = session("k7/8/1QK5/8/8/8/8/8", Archetype::Passive, Difficulty::Easy, &[]);
    let events = session.subscribe();
    assert_eq!(session.select_square(2, 1), CommandOutcome::Updated);
    assert_eq!(session.select_square(1, 1), CommandOutcome::Updated);
    assert_eq!(session.phase(), Phase::Victory);
    assert!(drain(&events).contains(&SessionEvent::BattleEnded(Phase::Victory)));
}
