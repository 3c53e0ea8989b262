//! Timed status effects keyed by piece id, plus square traps.
//!
//! All per-piece effects live in one map keyed by `(PieceId, StatusKind)` so
//! that ticking, expiry and cleanup on piece removal are written once. An
//! effect with `n` turns remaining is active while `n >= 1`; `tick` runs once
//! per completed enemy turn and removes entries that reach zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::game_state::board::Board;
use crate::game_state::chess_types::{PieceId, Side, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Cannot move.
    Frozen,
    /// Cannot move and cannot be captured.
    Invulnerable,
    /// Blocks one capture, then breaks.
    Shielded,
    /// Blocks every capture while it lasts.
    Braced,
    /// Timed summon; the piece vanishes when this expires.
    Phantom,
    /// Ownership was flipped by the opposing side; reverts on expiry.
    Controlled,
    /// King moves like a queen.
    ArmyOfOne,
}

/// What happened to an effect during `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    Expired,
    PhantomVanished(Square),
    ControlReverted { square: Square, owner: Side },
    /// The entry referenced a piece that is no longer on the board.
    Orphaned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusExpiry {
    pub piece: PieceId,
    pub kind: StatusKind,
    pub outcome: ExpiryOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRegistry {
    effects: BTreeMap<(PieceId, StatusKind), u8>,
    traps: BTreeSet<Square>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an effect, keeping the longer duration if one is already active.
    pub fn apply(&mut self, piece: PieceId, kind: StatusKind, turns: u8) {
        if turns == 0 {
            return;
        }
        let entry = self.effects.entry((piece, kind)).or_insert(0);
        *entry = (*entry).max(turns);
    }

    pub fn clear(&mut self, piece: PieceId, kind: StatusKind) -> bool {
        self.effects.remove(&(piece, kind)).is_some()
    }

    #[inline]
    pub fn remaining(&self, piece: PieceId, kind: StatusKind) -> Option<u8> {
        self.effects.get(&(piece, kind)).copied()
    }

    #[inline]
    pub fn has(&self, piece: PieceId, kind: StatusKind) -> bool {
        self.effects.contains_key(&(piece, kind))
    }

    /// Frozen and invulnerable pieces are locked in place.
    #[inline]
    pub fn is_actionable(&self, piece: PieceId) -> bool {
        !self.has(piece, StatusKind::Frozen) && !self.has(piece, StatusKind::Invulnerable)
    }

    /// Any one of shielded, braced or invulnerable vetoes a capture.
    #[inline]
    pub fn is_capture_immune(&self, piece: PieceId) -> bool {
        self.has(piece, StatusKind::Shielded)
            || self.has(piece, StatusKind::Braced)
            || self.has(piece, StatusKind::Invulnerable)
    }

    /// Drop every effect attached to a piece that left the board.
    pub fn forget_piece(&mut self, piece: PieceId) {
        self.effects.retain(|(id, _), _| *id != piece);
    }

    pub fn effects_of(&self, piece: PieceId) -> Vec<(StatusKind, u8)> {
        self.effects
            .iter()
            .filter(|((id, _), _)| *id == piece)
            .map(|((_, kind), turns)| (*kind, *turns))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (PieceId, StatusKind, u8)> + '_ {
        self.effects
            .iter()
            .map(|((id, kind), turns)| (*id, *kind, *turns))
    }

    pub fn place_trap(&mut self, square: Square) {
        self.traps.insert(square);
    }

    #[inline]
    pub fn has_trap(&self, square: Square) -> bool {
        self.traps.contains(&square)
    }

    /// Remove a trap, reporting whether one was armed there.
    pub fn spring_trap(&mut self, square: Square) -> bool {
        self.traps.remove(&square)
    }

    pub fn traps(&self) -> impl Iterator<Item = Square> + '_ {
        self.traps.iter().copied()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.traps.is_empty()
    }

    pub fn clear_all(&mut self) {
        self.effects.clear();
        self.traps.clear();
    }

    /// Advance every effect by one turn and resolve expiries against `board`.
    ///
    /// Phantoms are removed from the board when they expire and controlled
    /// pieces return to their original side. Entries whose piece has vanished
    /// are dropped and reported as orphaned.
    pub fn tick(&mut self, board: &mut Board) -> Vec<StatusExpiry> {
        let mut expiries = Vec::new();
        let keys: Vec<(PieceId, StatusKind)> = self.effects.keys().copied().collect();

        for key in keys {
            let (piece, kind) = key;
            if !self.effects.contains_key(&key) {
                continue;
            }
            let Some(square) = board.find(piece) else {
                warn!(piece, ?kind, "dropping status entry for a piece that left the board");
                self.effects.remove(&key);
                expiries.push(StatusExpiry {
                    piece,
                    kind,
                    outcome: ExpiryOutcome::Orphaned,
                });
                continue;
            };

            let Some(turns) = self.effects.get_mut(&key) else {
                continue;
            };
            *turns = turns.saturating_sub(1);
            if *turns > 0 {
                continue;
            }
            self.effects.remove(&key);

            let outcome = match kind {
                StatusKind::Phantom => {
                    board.remove(square);
                    self.forget_piece(piece);
                    ExpiryOutcome::PhantomVanished(square)
                }
                StatusKind::Controlled => {
                    let owner = board
                        .piece_at(square)
                        .map(|p| p.owner.opposite())
                        .unwrap_or(Side::Enemy);
                    if let Err(err) = board.set_owner(square, owner) {
                        warn!(piece, %err, "failed to revert control");
                    }
                    ExpiryOutcome::ControlReverted { square, owner }
                }
                _ => ExpiryOutcome::Expired,
            };

            debug!(piece, ?kind, ?outcome, "status expired");
            expiries.push(StatusExpiry {
                piece,
                kind,
                outcome,
            });
        }

        expiries
    }
}
