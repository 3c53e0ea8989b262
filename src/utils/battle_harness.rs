//! Scripted battle harness for local testing.
//!
//! A seeded random "player" fights the adversary engine through the public
//! session commands, occasionally playing cards from its hand, and a series
//! runner aggregates victories, defeats and enemy move timings.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::cards::card_catalog::CardId;
use crate::cards::targeting::CardTarget;
use crate::game::formations::{random_formation, Formation};
use crate::game::session::GameSession;
use crate::game::session_config::SessionConfig;
use crate::game::turn::Phase;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::moves_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    PlayerVictory,
    PlayerDefeat,
    TurnLimit,
}

#[derive(Debug, Clone)]
pub struct BattleConfig {
    pub max_turns: u32,
    /// Chance per turn that the scripted player tries a card first.
    pub card_chance: f64,
    pub session: SessionConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_turns: 120,
            card_chance: 0.25,
            session: SessionConfig {
                auto_enemy_turn: false,
                ..SessionConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct BattleResult {
    pub outcome: BattleOutcome,
    pub formation: &'static str,
    pub turns: u32,
    pub player_moves: u32,
    pub cards_played: u8,
    pub enemy_move_count: u32,
    pub enemy_total_time_ns: u128,
}

#[derive(Debug, Clone)]
pub struct BattleSeriesConfig {
    pub battles: u16,
    pub base_seed: u64,
    pub hand: Vec<CardId>,
    pub per_battle: BattleConfig,
    pub verbose: bool,
}

impl Default for BattleSeriesConfig {
    fn default() -> Self {
        Self {
            battles: 9,
            base_seed: 0,
            hand: vec![CardId::Freeze, CardId::Shield, CardId::Snipe],
            per_battle: BattleConfig::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BattleSeriesStats {
    pub battles: u16,
    pub victories: u16,
    pub defeats: u16,
    pub turn_limits: u16,
    pub outcomes: Vec<BattleOutcome>,
    pub cards_played: u32,
    pub enemy_moves: u32,
    pub enemy_total_time_ns: u128,
    pub avg_turns: f64,
    pub enemy_avg_move_time_ms: f64,
}

impl BattleSeriesStats {
    pub fn report(&self) -> String {
        format!(
            "battles={} victories={} defeats={} turn_limits={} cards={} avg_turns={:.1} enemy_avg_ms={:.3}",
            self.battles,
            self.victories,
            self.defeats,
            self.turn_limits,
            self.cards_played,
            self.avg_turns,
            self.enemy_avg_move_time_ms
        )
    }
}

/// Play one seeded battle against `formation`.
pub fn play_battle(
    formation: Formation,
    hand: &[CardId],
    seed: u64,
    config: &BattleConfig,
) -> Result<BattleResult, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut session = GameSession::new(SessionConfig {
        seed: Some(seed),
        auto_enemy_turn: false,
        ..config.session.clone()
    });
    session
        .reset_battle_state(formation, hand)
        .map_err(|err| err.to_string())?;

    let mut player_moves = 0u32;
    let mut enemy_move_count = 0u32;
    let mut enemy_total_time_ns = 0u128;

    while !session.phase().is_over() && session.turn_number() <= config.max_turns {
        if session.phase() == Phase::PlayerTurn {
            if !session.hand().is_empty() && rng.random_bool(config.card_chance) {
                try_random_card(&mut session, &mut rng);
            }
            while session.phase() == Phase::PlayerTurn {
                if play_random_move(&mut session, &mut rng) {
                    player_moves += 1;
                } else {
                    session.end_turn();
                }
            }
        }

        if session.phase() == Phase::EnemyTurn {
            let started = Instant::now();
            session.run_enemy_turn();
            enemy_total_time_ns += started.elapsed().as_nanos();
            enemy_move_count += 1;
        }
    }

    let outcome = match session.phase() {
        Phase::Victory => BattleOutcome::PlayerVictory,
        Phase::Defeat => BattleOutcome::PlayerDefeat,
        Phase::PlayerTurn | Phase::EnemyTurn => BattleOutcome::TurnLimit,
    };

    Ok(BattleResult {
        outcome,
        formation: formation.name,
        turns: session.turn_number(),
        player_moves,
        cards_played: session.cards_played_this_battle(),
        enemy_move_count,
        enemy_total_time_ns,
    })
}

/// Play a series of battles against randomly drawn formations.
pub fn play_battle_series(config: BattleSeriesConfig) -> Result<BattleSeriesStats, String> {
    let mut stats = BattleSeriesStats {
        battles: config.battles,
        ..BattleSeriesStats::default()
    };
    let mut formation_rng = StdRng::seed_from_u64(config.base_seed ^ 0xA5A5_5A5A_0123_4567);
    let mut total_turns = 0u64;

    for i in 0..config.battles {
        let formation = random_formation(&mut formation_rng);
        let seed = config.base_seed.wrapping_add(u64::from(i));
        if config.verbose {
            println!(
                "[series] battle {}/{} seed={} formation={} archetype={:?} difficulty={:?}",
                i + 1,
                config.battles,
                seed,
                formation.name,
                formation.archetype,
                formation.difficulty
            );
        }

        let result = play_battle(formation, &config.hand, seed, &config.per_battle)?;
        total_turns += u64::from(result.turns);
        stats.cards_played += u32::from(result.cards_played);
        stats.enemy_moves = stats.enemy_moves.saturating_add(result.enemy_move_count);
        stats.enemy_total_time_ns = stats
            .enemy_total_time_ns
            .saturating_add(result.enemy_total_time_ns);

        match result.outcome {
            BattleOutcome::PlayerVictory => stats.victories += 1,
            BattleOutcome::PlayerDefeat => stats.defeats += 1,
            BattleOutcome::TurnLimit => stats.turn_limits += 1,
        }
        stats.outcomes.push(result.outcome);

        if config.verbose {
            println!(
                "[series] battle {}/{} result={:?} turns={} victories={} defeats={}\n",
                i + 1,
                config.battles,
                result.outcome,
                result.turns,
                stats.victories,
                stats.defeats
            );
        }
    }

    if stats.battles > 0 {
        stats.avg_turns = total_turns as f64 / f64::from(stats.battles);
    }
    if stats.enemy_moves > 0 {
        stats.enemy_avg_move_time_ms =
            stats.enemy_total_time_ns as f64 / f64::from(stats.enemy_moves) / 1_000_000.0;
    }
    Ok(stats)
}

/// Select a random card and feed it shuffled targets until one sticks.
fn try_random_card(session: &mut GameSession, rng: &mut StdRng) {
    let hand = session.hand().to_vec();
    let Some(card) = hand.choose(rng).copied() else {
        return;
    };
    session.select_card(card);
    if session.card_state().is_idle() {
        return;
    }

    for _ in 0..4 {
        let mut candidates = target_candidates(session);
        candidates.shuffle(rng);
        for target in candidates {
            if session.card_state().is_idle() {
                return;
            }
            session.confirm_target(target);
        }
    }
    if !session.card_state().is_idle() {
        session.cancel_card();
    }
}

fn target_candidates(session: &GameSession) -> Vec<CardTarget> {
    let mut out: Vec<CardTarget> = Square::all().map(CardTarget::Square).collect();
    out.extend(Direction::ALL_EIGHT.into_iter().map(CardTarget::Direction));
    out.extend(
        [
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ]
        .into_iter()
        .map(CardTarget::Promotion),
    );
    out.extend((0..session.captured().len()).map(CardTarget::Captured));
    out
}

/// Random player move, preferring captures. Returns false if none exist.
fn play_random_move(session: &mut GameSession, rng: &mut StdRng) -> bool {
    let battle = session.battle();
    let mut candidates = Vec::new();
    for piece in battle.board.pieces(Side::Player) {
        for target in moves_for(piece, &battle.board, &battle.status, &battle.modifiers, false) {
            candidates.push((piece.square, target.square));
        }
    }
    if candidates.is_empty() {
        return false;
    }

    let captures: Vec<(Square, Square)> = candidates
        .iter()
        .copied()
        .filter(|(_, to)| battle.board.piece_at(*to).is_some())
        .collect();
    let pool = if !captures.is_empty() && rng.random_bool(0.7) {
        captures
    } else {
        candidates
    };
    let Some((from, to)) = pool.choose(rng).copied() else {
        return false;
    };

    session.select_square(from.row, from.col);
    session.select_square(to.row, to.col).is_updated()
}
