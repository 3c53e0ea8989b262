//! Adversary decision engine.
//!
//! Every enemy move is scored as
//! `base - safety - card_danger + archetype + fork/pin (+ lookahead)`, then
//! one of the top candidates is picked according to the difficulty profile.
//! On hard difficulty an external oracle may supply the baseline move,
//! which is still checked against the player's cards. If scoring yields
//! nothing the engine falls back to any capture, then any move.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::engines::archetype::MoveFeatures;
use crate::engines::card_danger::{card_danger_penalty, DangerContext};
use crate::engines::difficulty::DifficultyProfile;
use crate::engines::engine_trait::{EnemyEngine, EnemyIntent, EngineOutput, SelectionContext};
use crate::engines::tactics::{detect_fork, detect_pin};
use crate::game::session_config::{LookaheadConfig, OracleConfig};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusRegistry;
use crate::game_state::turn_modifiers::TurnModifiers;
use crate::move_generation::legal_move_apply::simulate_move;
use crate::move_generation::legal_move_checks::{attacks_from, is_in_check, is_square_attacked};
use crate::move_generation::legal_move_generator::{all_moves, MoveTarget};
use crate::oracle::oracle_trait::{Evaluation, Oracle, OracleRequest};
use crate::search::board_scoring::{piece_value, BoardScorer, PositionalScorer};
use crate::search::lookahead::{search_value, SearchLimits, SearchStats};
use crate::utils::algebraic::Orientation;
use crate::utils::fen_generator::generate_fen;
use crate::utils::long_algebraic::long_algebraic_to_move;

const BASELINE: i32 = 10;
const CHECK_BONUS: i32 = 50;
const THREAT_BONUS: i32 = 15;
const ADVANCE_BONUS: i32 = 5;
const PAWN_ADVANCE_BONUS: i32 = 10;
const DEVELOPMENT_BONUS: i32 = 15;
const DEFEND_ALLY_BONUS: i32 = 20;
const RECAPTURE_BONUS: i32 = 40;
const BLOCKED_CAPTURE_SCORE: i32 = -200;
const KING_EXPOSED_PENALTY: i32 = 5_000;
const KING_GUARD_PENALTY: i32 = 25;

/// One scored enemy move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub piece: Piece,
    pub to: Square,
    /// Final score with every component applied.
    pub score: i32,
    /// Safety penalty that was subtracted.
    pub safety: i32,
    /// Card-danger penalty after the difficulty multiplier.
    pub danger: i32,
    pub features: MoveFeatures,
}

impl ScoredMove {
    #[inline]
    pub fn score_ignoring_safety(&self) -> i32 {
        self.score + self.safety
    }

    /// Strength of the move before the player's cards are considered.
    #[inline]
    pub fn strength(&self) -> i32 {
        self.score + self.danger
    }

    #[inline]
    pub fn intent(&self, score: i32) -> EnemyIntent {
        EnemyIntent {
            piece: self.piece.id,
            from: self.piece.square,
            to: self.to,
            score,
        }
    }
}

pub struct AdversaryEngine {
    rng: StdRng,
    scorer: PositionalScorer,
    lookahead: LookaheadConfig,
    oracle_config: OracleConfig,
    oracle: Option<Box<dyn Oracle>>,
    oracle_available: bool,
    orientation: Orientation,
}

impl AdversaryEngine {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            scorer: PositionalScorer,
            lookahead: LookaheadConfig::default(),
            oracle_config: OracleConfig::default(),
            oracle: None,
            oracle_available: false,
            orientation: Orientation::PlayerIsWhite,
        }
    }

    pub fn with_lookahead(mut self, lookahead: LookaheadConfig) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Attach an oracle; it is only consulted on difficulties that allow it.
    pub fn with_oracle(mut self, oracle: Box<dyn Oracle>, config: OracleConfig) -> Self {
        self.oracle = Some(oracle);
        self.oracle_config = config;
        self.oracle_available = true;
        self
    }

    #[inline]
    pub fn oracle_available(&self) -> bool {
        self.oracle.is_some() && self.oracle_available
    }

    /// Score every enemy move in the position, best first.
    pub fn score_moves(&self, ctx: &SelectionContext<'_>, info: &mut Vec<String>) -> Vec<ScoredMove> {
        let profile = ctx.difficulty.profile();
        let modifiers = TurnModifiers::none();
        let candidates = all_moves(ctx.board, ctx.status, Side::Enemy, &modifiers, true);

        let mut stats = SearchStats::default();
        let mut scored: Vec<ScoredMove> = candidates
            .into_iter()
            .filter_map(|(piece, target)| self.score_move(ctx, &profile, piece, target, &mut stats))
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        if stats.nodes > 0 {
            info.push(format!(
                "info string adversary lookahead nodes {} cutoffs {}",
                stats.nodes, stats.cutoffs
            ));
        }
        scored
    }

    fn score_move(
        &self,
        ctx: &SelectionContext<'_>,
        profile: &DifficultyProfile,
        piece: Piece,
        target: MoveTarget,
        stats: &mut SearchStats,
    ) -> Option<ScoredMove> {
        let board = ctx.board;
        let status = ctx.status;
        let from = piece.square;
        let to = target.square;
        let sim = simulate_move(board, status, from, target).ok()?;

        if sim.blocked {
            return Some(ScoredMove {
                piece,
                to,
                score: BLOCKED_CAPTURE_SCORE,
                safety: 0,
                danger: 0,
                features: MoveFeatures::default(),
            });
        }

        let after = &sim.board;
        let mover = *after.piece_at(to)?;
        let value = piece_value(piece.kind);
        let player = Side::Player;
        let forward_rows = (to.row - from.row) * piece.owner.forward();

        // Base.
        let mut base = BASELINE;
        if let Some(captured) = sim.captured {
            base += piece_value(captured.kind);
            if ctx.recapture_square == Some(to) {
                base += RECAPTURE_BONUS;
            }
        }
        if is_in_check(after, status, player) {
            base += CHECK_BONUS;
        }
        let attacked_now = attacks_from(after, &mover);
        let threatened = after
            .pieces(player)
            .filter(|p| attacked_now.contains(p.square))
            .count() as i32;
        base += threatened * THREAT_BONUS;
        if forward_rows > 0 {
            base += forward_rows as i32
                * if piece.kind == PieceKind::Pawn {
                    PAWN_ADVANCE_BONUS
                } else {
                    ADVANCE_BONUS
                };
        }
        if from.row == piece.owner.home_row()
            && !matches!(piece.kind, PieceKind::King | PieceKind::Pawn)
        {
            base += DEVELOPMENT_BONUS;
        }
        let was_attacked = is_square_attacked(board, status, from, player);
        let attacked_after = is_square_attacked(after, status, to, player);
        if was_attacked && !attacked_after && piece.kind != PieceKind::King {
            base += value / 5;
        }
        let net_defense = defended_allies(after, status, piece.id) - defended_allies(board, status, piece.id);
        if net_defense > 0 {
            base += DEFEND_ALLY_BONUS * net_defense;
        }

        // Safety.
        let mut safety = 0;
        if attacked_after {
            let defended = is_square_attacked(after, status, to, Side::Enemy);
            safety += if defended { value / 3 } else { value };
        }
        if is_in_check(after, status, Side::Enemy) {
            safety += KING_EXPOSED_PENALTY;
        }
        if piece.kind != PieceKind::King
            && board
                .king(Side::Enemy)
                .is_some_and(|king| king.square.chebyshev(from) == 1)
        {
            safety += KING_GUARD_PENALTY;
        }

        // Card danger.
        let danger_ctx = DangerContext {
            board: after,
            status,
            from,
            to,
            mover,
            is_capture: sim.captured.is_some(),
        };
        let raw_danger = card_danger_penalty(ctx.player_hand, &danger_ctx);
        let danger = (raw_danger as f32 * profile.card_penalty_multiplier).round() as i32;

        // Archetype and tactics.
        let fork = detect_fork(after, to);
        let pin = detect_pin(after, to);
        let features = MoveFeatures {
            is_capture: sim.captured.is_some(),
            pawn_advance: piece.kind == PieceKind::Pawn && forward_rows > 0,
            king_advance: piece.kind == PieceKind::King && forward_rows > 0,
            queen_approach: queen_approach(board, piece, to),
            net_defense,
            fork,
            pin,
            minor_piece: piece.kind.is_minor(),
        };
        let archetype = ctx.archetype.modifier(&features);
        let tactics = if fork || pin { profile.fork_pin_bonus } else { 0 };

        let mut score = base - safety - danger + archetype + tactics;

        if profile.lookahead && self.lookahead.enabled && self.lookahead.depth > 0 {
            let static_after = self.scorer.score(after, status, Side::Enemy);
            let searched = search_value(
                after,
                status,
                player,
                Side::Enemy,
                SearchLimits {
                    depth: self.lookahead.depth,
                    breadth: self.lookahead.reply_breadth,
                },
                &self.scorer,
                stats,
            );
            score += ((searched - static_after) as f32 * self.lookahead.weight).round() as i32;
        }

        Some(ScoredMove {
            piece,
            to,
            score,
            safety,
            danger,
            features,
        })
    }

    /// Weighted pick among the best `top_moves` candidates; rank 1 weighs most.
    fn pick<'a>(&mut self, ranked: &'a [ScoredMove], top_moves: usize) -> Option<&'a ScoredMove> {
        let pool = &ranked[..ranked.len().min(top_moves.max(1))];
        if pool.len() <= 1 {
            return pool.first();
        }
        let total_weight: usize = (1..=pool.len()).sum();
        let mut pick = self.rng.random_range(0..total_weight);
        for (rank, candidate) in pool.iter().enumerate() {
            let weight = pool.len() - rank;
            if pick < weight {
                return Some(candidate);
            }
            pick -= weight;
        }
        pool.first()
    }

    fn consult_oracle(
        &mut self,
        ctx: &SelectionContext<'_>,
        ranked: &[ScoredMove],
        info: &mut Vec<String>,
    ) -> Option<ScoredMove> {
        let fen = match generate_fen(ctx.board, Side::Enemy, self.orientation, ctx.turn_number) {
            Ok(fen) => fen,
            Err(reason) => {
                debug!(%reason, "position not sent to the oracle");
                info.push(format!("info string oracle skipped {reason}"));
                return None;
            }
        };
        let request = OracleRequest {
            position: fen,
            side_to_move: Side::Enemy,
            search_depth: self.oracle_config.search_depth,
        };
        let timeout = Duration::from_millis(self.oracle_config.timeout_ms);
        let oracle = self.oracle.as_mut()?;

        let started = Instant::now();
        let response = match oracle.best_move(&request, timeout) {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "oracle failed, using heuristic move selection");
                info.push(format!("info string oracle failed {err}"));
                if !err.is_position_specific() {
                    self.oracle_available = false;
                }
                return None;
            }
        };
        info.push(format!(
            "info string oracle bestmove {} in {} ms",
            response.best_move,
            started.elapsed().as_millis()
        ));
        if let Some(Evaluation::Mate(moves)) = response.evaluation {
            info.push(format!("info string oracle reports mate {moves}"));
        }

        let code = match long_algebraic_to_move(&response.best_move, self.orientation) {
            Ok(code) => code,
            Err(err) => {
                warn!(%err, "oracle move could not be decoded");
                return None;
            }
        };
        let Some(baseline) = ranked
            .iter()
            .find(|m| m.piece.square == code.from && m.to == code.to)
            .copied()
        else {
            warn!(best_move = %response.best_move, "oracle move is not legal in this battle");
            return None;
        };

        if baseline.danger <= self.oracle_config.danger_threshold {
            return Some(baseline);
        }

        let margin = self.oracle_config.comparable_margin;
        let alternative = ranked
            .iter()
            .filter(|m| m.danger <= self.oracle_config.danger_threshold)
            .filter(|m| m.strength() + margin >= baseline.strength())
            .max_by_key(|m| m.score)
            .copied();
        match alternative {
            Some(alt) => {
                info.push(format!(
                    "info string oracle move danger {} replaced by safer {}->{}",
                    baseline.danger, alt.piece.square, alt.to
                ));
                Some(alt)
            }
            None => Some(baseline),
        }
    }

    /// The heuristic/oracle decision, or `None` when nothing was scored.
    fn select(&mut self, ctx: &SelectionContext<'_>, out: &mut EngineOutput) -> Option<EnemyIntent> {
        let profile = ctx.difficulty.profile();
        let mut ranked = self.score_moves(ctx, &mut out.info_lines);
        out.info_lines.push(format!(
            "info string adversary candidates {} difficulty {:?} archetype {:?}",
            ranked.len(),
            ctx.difficulty,
            ctx.archetype
        ));
        if ranked.is_empty() {
            return None;
        }

        if profile.consult_oracle && self.oracle_config.enabled && self.oracle_available() {
            if let Some(chosen) = self.consult_oracle(ctx, &ranked, &mut out.info_lines) {
                return Some(chosen.intent(chosen.score));
            }
        }

        let blunder = profile.ignore_safety_chance > 0.0
            && self.rng.random_bool(profile.ignore_safety_chance);
        if blunder {
            ranked.sort_by(|a, b| b.score_ignoring_safety().cmp(&a.score_ignoring_safety()));
            out.info_lines
                .push("info string adversary ignoring safety this turn".to_owned());
        }

        let chosen = *self.pick(&ranked, profile.top_moves)?;
        let score = if blunder {
            chosen.score_ignoring_safety()
        } else {
            chosen.score
        };
        Some(chosen.intent(score))
    }
}

impl EnemyEngine for AdversaryEngine {
    fn set_option(&mut self, name: &str, value: &str) -> Result<(), String> {
        if name.eq_ignore_ascii_case("Seed") {
            let seed = value
                .parse::<u64>()
                .map_err(|_| format!("invalid Seed value '{}'", value))?;
            self.rng = StdRng::seed_from_u64(seed);
        } else if name.eq_ignore_ascii_case("Lookahead") {
            let lower = value.to_ascii_lowercase();
            self.lookahead.enabled = matches!(lower.as_str(), "true" | "1" | "yes" | "on");
        } else if name.eq_ignore_ascii_case("LookaheadBreadth") {
            self.lookahead.reply_breadth = value
                .parse::<usize>()
                .map_err(|_| format!("invalid LookaheadBreadth value '{}'", value))?
                .max(1);
        } else {
            return Err(format!("unknown adversary option '{}'", name));
        }
        Ok(())
    }

    fn choose_move(&mut self, ctx: &SelectionContext<'_>) -> Result<EngineOutput, String> {
        let mut out = EngineOutput::default();
        let chosen = self
            .select(ctx, &mut out)
            .or_else(|| fallback_move(ctx.board, ctx.status));

        match chosen {
            Some(intent) => {
                debug!(from = %intent.from, to = %intent.to, score = intent.score, "enemy move selected");
                out.info_lines.push(format!(
                    "info string adversary chose {}->{} score {}",
                    intent.from, intent.to, intent.score
                ));
            }
            None => out
                .info_lines
                .push("info string adversary has no legal move".to_owned()),
        }
        out.best_move = chosen;
        Ok(out)
    }
}

/// Any capture, else any move, else nothing.
pub fn fallback_move(board: &Board, status: &StatusRegistry) -> Option<EnemyIntent> {
    let moves = all_moves(board, status, Side::Enemy, &TurnModifiers::none(), true);
    let capture = moves
        .iter()
        .find(|(_, target)| board.piece_at(target.square).is_some());
    capture.or_else(|| moves.first()).map(|(piece, target)| EnemyIntent {
        piece: piece.id,
        from: piece.square,
        to: target.square,
        score: 0,
    })
}

/// Allies of `mover` currently attacked by the player and defended by the
/// enemy, excluding the mover itself.
fn defended_allies(board: &Board, status: &StatusRegistry, mover: PieceId) -> i32 {
    board
        .pieces(Side::Enemy)
        .filter(|p| p.id != mover)
        .filter(|p| is_square_attacked(board, status, p.square, Side::Player))
        .filter(|p| is_square_attacked(board, status, p.square, Side::Enemy))
        .count() as i32
}

fn queen_approach(board: &Board, piece: Piece, to: Square) -> i32 {
    if piece.kind != PieceKind::Queen {
        return 0;
    }
    board
        .king(piece.owner.opposite())
        .map(|king| (king.square.chebyshev(piece.square) - king.square.chebyshev(to)) as i32)
        .unwrap_or(0)
}
