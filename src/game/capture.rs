//! Authoritative move resolution.
//!
//! Every piece removal caused by a move goes through `try_capture`, which
//! re-checks protections at the moment of removal. Chain Reaction and
//! Ricochet run after the primary capture and fire at most once per turn,
//! so chained effects never recurse.

use tracing::debug;

use crate::errors::{RogueError, RogueResult};
use crate::game::session::BattleState;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusKind;
use crate::move_generation::legal_move_apply::promote_if_due;
use crate::move_generation::legal_move_generator::MoveTarget;
use crate::search::board_scoring::piece_value;

/// Result of one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured(Piece),
    /// A protection absorbed the attack; the piece stays.
    Blocked(Piece),
}

/// Everything that happened while resolving one move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub from: Square,
    pub to: Square,
    /// Pieces removed, the primary victim first.
    pub captured: Vec<Piece>,
    /// The primary capture was vetoed and the mover stayed put.
    pub blocked: bool,
    /// The mover stepped on a trap and was destroyed.
    pub trapped: bool,
    pub promoted: bool,
}

impl MoveReport {
    #[inline]
    pub fn primary_capture(&self) -> Option<&Piece> {
        self.captured.first()
    }
}

/// Remove the piece on `square` unless it is protected.
///
/// A shield that is the piece's only protection breaks when it blocks.
/// Player pieces that fall are remembered for Resurrect unless they were
/// summoned or borrowed.
pub fn try_capture(battle: &mut BattleState, square: Square) -> RogueResult<CaptureOutcome> {
    let victim = *battle
        .board
        .piece_at(square)
        .ok_or(RogueError::EmptySquare(square))?;

    if battle.status.is_capture_immune(victim.id) {
        let braced = battle.status.has(victim.id, StatusKind::Braced);
        let stone = battle.status.has(victim.id, StatusKind::Invulnerable);
        if !braced && !stone && battle.status.clear(victim.id, StatusKind::Shielded) {
            debug!(piece = victim.id, %square, "shield broke");
        }
        return Ok(CaptureOutcome::Blocked(victim));
    }

    battle.board.remove(square);
    let summoned = battle.status.has(victim.id, StatusKind::Phantom)
        || battle.status.has(victim.id, StatusKind::Controlled);
    if victim.owner == Side::Player && victim.kind != PieceKind::King && !summoned {
        battle.captured.push(victim.kind);
    }
    battle.status.forget_piece(victim.id);
    Ok(CaptureOutcome::Captured(victim))
}

/// Play `target` for the piece on `from` against the live battle.
pub fn resolve_move(
    battle: &mut BattleState,
    from: Square,
    target: MoveTarget,
) -> RogueResult<MoveReport> {
    let mover = *battle
        .board
        .piece_at(from)
        .ok_or(RogueError::EmptySquare(from))?;
    let to = target.square;
    let mut report = MoveReport {
        from,
        to,
        ..MoveReport::default()
    };

    match battle.board.piece_at(to).copied() {
        Some(occupant) if occupant.owner == mover.owner => {
            return Err(RogueError::IllegalMove { from, to });
        }
        Some(_) => match try_capture(battle, to)? {
            CaptureOutcome::Captured(victim) => report.captured.push(victim),
            CaptureOutcome::Blocked(_) => {
                report.blocked = true;
                disarm_mover(battle, mover);
                return Ok(report);
            }
        },
        None if target.piercing => return Err(RogueError::IllegalMove { from, to }),
        None => {}
    }

    // A piercing shot leaves the attacker where it stood.
    let landing = if target.piercing {
        from
    } else {
        battle.board.move_piece(from, to)?;
        to
    };

    if !target.piercing && battle.status.spring_trap(to) {
        match try_capture(battle, to)? {
            CaptureOutcome::Captured(_) => {
                debug!(piece = mover.id, square = %to, "trap sprung");
                report.trapped = true;
            }
            CaptureOutcome::Blocked(_) => {
                debug!(piece = mover.id, square = %to, "trap sprung on a protected piece");
            }
        }
    }

    if !report.trapped {
        report.promoted = promote_if_due(&mut battle.board, landing)?;
    }

    if mover.owner == Side::Player {
        if let Some(victim) = report.primary_capture().copied() {
            chain_reaction(battle, victim.square, &mut report)?;
            if battle.modifiers.ricochet_piece == Some(mover.id) {
                battle.modifiers.ricochet_piece = None;
                ricochet(battle, victim.square, &mut report)?;
            }
        }
    }

    disarm_mover(battle, mover);
    Ok(report)
}

/// Enemy non-kings around `center` fall too, once.
fn chain_reaction(
    battle: &mut BattleState,
    center: Square,
    report: &mut MoveReport,
) -> RogueResult<()> {
    if !battle.modifiers.chain_reaction {
        return Ok(());
    }
    battle.modifiers.chain_reaction = false;

    let targets: Vec<Square> = center
        .neighbors()
        .filter(|sq| {
            battle
                .board
                .piece_at(*sq)
                .is_some_and(|p| p.owner == Side::Enemy && p.kind != PieceKind::King)
        })
        .collect();

    for square in targets {
        if let CaptureOutcome::Captured(victim) = try_capture(battle, square)? {
            debug!(piece = victim.id, %square, "chain reaction capture");
            report.captured.push(victim);
        }
    }
    Ok(())
}

/// The most valuable enemy non-king next to `center` is also taken.
fn ricochet(battle: &mut BattleState, center: Square, report: &mut MoveReport) -> RogueResult<()> {
    let target = center
        .neighbors()
        .filter_map(|sq| battle.board.piece_at(sq).copied())
        .filter(|p| p.owner == Side::Enemy && p.kind != PieceKind::King)
        .max_by_key(|p| piece_value(p.kind));

    if let Some(target) = target {
        if let CaptureOutcome::Captured(victim) = try_capture(battle, target.square)? {
            debug!(piece = victim.id, square = %victim.square, "ricochet capture");
            report.captured.push(victim);
        }
    }
    Ok(())
}

/// Single-move arming cards are spent once their piece acts.
fn disarm_mover(battle: &mut BattleState, mover: Piece) {
    if battle.modifiers.dash_piece == Some(mover.id) {
        battle.modifiers.dash_piece = None;
    }
    if battle.modifiers.ghost_piece == Some(mover.id) {
        battle.modifiers.ghost_piece = None;
    }
}
