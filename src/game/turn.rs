//! Turn and game state machine.
//!
//! `PlayerTurn -> (card plays)* -> move -> EnemyTurn -> status decay ->
//! PlayerTurn`, with `Victory` and `Defeat` checked after every move,
//! capture and card. Status effects tick exactly once per cycle, after the
//! enemy's move and before control returns to the player.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cards::targeting::CardTarget;
use crate::engines::engine_trait::EnemyIntent;
use crate::errors::RogueError;
use crate::game::capture::resolve_move;
use crate::game::events::SessionEvent;
use crate::game::session::{CommandOutcome, GameSession};
use crate::game_state::chess_types::*;
use crate::game_state::turn_modifiers::TurnModifiers;
use crate::move_generation::legal_move_checks::is_checkmate;
use crate::move_generation::legal_move_generator::{moves_for, MoveTarget};

/// Chance that Loaded Dice costs the enemy its move.
pub const LOADED_DICE_SKIP_CHANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl Phase {
    #[inline]
    pub fn is_over(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

impl GameSession {
    /// Click on a square: feeds a pending card, selects a piece, or moves
    /// the selected piece.
    pub fn select_square(&mut self, row: i8, col: i8) -> CommandOutcome {
        if let Some(outcome) = self.require_player_turn() {
            return outcome;
        }
        let square = Square::new(row, col);
        if !square.is_on_board() {
            return self.reject(format!("({}, {}) is off the board", row, col));
        }

        if !self.card_state.is_idle() {
            return self.confirm_target(CardTarget::Square(square));
        }

        if self.selected_piece.is_some() {
            if let Some(target) = self.valid_moves.iter().find(|t| t.square == square).copied() {
                return self.commit_move(target);
            }
        }

        match self.battle.board.piece_at(square).copied() {
            Some(piece) if piece.owner == Side::Player => {
                self.valid_moves = moves_for(
                    &piece,
                    &self.battle.board,
                    &self.battle.status,
                    &self.battle.modifiers,
                    false,
                );
                self.selected_piece = Some(piece.id);
                self.last_message = if self.valid_moves.is_empty() {
                    Some(format!("your {:?} cannot move", piece.kind))
                } else {
                    None
                };
                self.emit(SessionEvent::BoardChanged);
                CommandOutcome::Updated
            }
            _ if self.selected_piece.is_some() => {
                self.clear_selection();
                self.emit(SessionEvent::BoardChanged);
                self.reject(format!("the selected piece cannot reach {}", square))
            }
            _ => CommandOutcome::Ignored,
        }
    }

    /// Give up the rest of a multi-move turn.
    pub fn end_turn(&mut self) -> CommandOutcome {
        if let Some(outcome) = self.require_player_turn() {
            return outcome;
        }
        if !self.card_state.is_idle() {
            self.cancel_card();
        }
        self.end_player_turn();
        CommandOutcome::Updated
    }

    /// Play the enemy turn when `auto_enemy_turn` is off.
    pub fn run_enemy_turn(&mut self) -> CommandOutcome {
        if self.phase != Phase::EnemyTurn {
            return self.reject("it is not the enemy's turn");
        }
        self.play_enemy_turn();
        CommandOutcome::Updated
    }

    fn require_player_turn(&mut self) -> Option<CommandOutcome> {
        let err = match self.phase {
            Phase::PlayerTurn => return None,
            Phase::EnemyTurn => RogueError::WrongPhase("the enemy turn"),
            Phase::Victory | Phase::Defeat => RogueError::GameOver,
        };
        Some(self.reject(err.to_string()))
    }

    fn commit_move(&mut self, target: MoveTarget) -> CommandOutcome {
        let Some(from) = self
            .selected_piece
            .and_then(|id| self.battle.board.find(id))
        else {
            self.clear_selection();
            return self.reject("the selected piece is gone");
        };

        let report = match resolve_move(&mut self.battle, from, target) {
            Ok(report) => report,
            Err(err) => {
                warn!(%err, "player move failed to resolve");
                self.clear_selection();
                return self.reject(err.to_string());
            }
        };

        debug!(from = %report.from, to = %report.to, captured = report.captured.len(), "player moved");
        if report.primary_capture().is_some() {
            self.last_player_capture = Some(report.to);
        }
        self.last_message = if report.blocked {
            Some("the attack was blocked".to_owned())
        } else if report.trapped {
            Some("your piece was caught in a trap".to_owned())
        } else {
            None
        };

        self.moves_this_turn += 1;
        self.clear_selection();
        self.emit(SessionEvent::BoardChanged);

        if self.check_outcome() {
            return CommandOutcome::Updated;
        }
        if self.moves_this_turn >= self.battle.modifiers.moves_allowed {
            self.end_player_turn();
        } else {
            self.refresh_intent();
        }
        CommandOutcome::Updated
    }

    /// Hand control to the enemy.
    pub(crate) fn end_player_turn(&mut self) {
        if self.phase != Phase::PlayerTurn {
            return;
        }
        self.clear_selection();
        self.battle.modifiers.disarm_pending();
        self.phase = Phase::EnemyTurn;
        if self.config.auto_enemy_turn {
            self.play_enemy_turn();
        }
    }

    fn play_enemy_turn(&mut self) {
        match self.pick_enemy_action() {
            EnemyAction::Move(intent) => {
                let target = MoveTarget::plain(intent.to);
                match resolve_move(&mut self.battle, intent.from, target) {
                    Ok(report) => {
                        debug!(from = %intent.from, to = %intent.to, "enemy moved");
                        self.emit(SessionEvent::EnemyMoved {
                            from: intent.from,
                            to: intent.to,
                            captured: report.primary_capture().map(|p| p.kind),
                            blocked: report.blocked,
                        });
                    }
                    Err(err) => {
                        warn!(%err, "enemy move failed to resolve; enemy passes");
                        self.emit(SessionEvent::EnemyPassed {
                            reason: "the enemy hesitated".to_owned(),
                        });
                    }
                }
            }
            EnemyAction::Pass(reason) => {
                debug!(%reason, "enemy passed");
                self.emit(SessionEvent::EnemyPassed { reason });
            }
        }

        if self.check_outcome() {
            return;
        }

        for expiry in self.battle.status.tick(&mut self.battle.board) {
            self.emit(SessionEvent::StatusExpired(expiry));
        }

        if self.check_outcome() {
            return;
        }
        self.start_player_turn();
    }

    fn pick_enemy_action(&mut self) -> EnemyAction {
        if self.battle.enemy_skip_pending {
            self.battle.enemy_skip_pending = false;
            if self.rng.random_bool(LOADED_DICE_SKIP_CHANCE) {
                return EnemyAction::Pass("the loaded dice cost the enemy its move".to_owned());
            }
        }

        if self.battle.zugzwang_pending {
            self.battle.zugzwang_pending = false;
            if let Some(intent) = self.random_king_move() {
                return EnemyAction::Move(intent);
            }
        }

        let intent = match self.enemy_intent.take() {
            Some(intent) if self.intent_still_legal(&intent) => Some(intent),
            _ => self.choose_enemy_move(),
        };
        match intent {
            Some(intent) => EnemyAction::Move(intent),
            None => EnemyAction::Pass("the enemy has no legal move".to_owned()),
        }
    }

    /// The piece is where the intent expects, can act, and can still reach
    /// the destination.
    fn intent_still_legal(&self, intent: &EnemyIntent) -> bool {
        let Some(piece) = self.battle.board.piece_at(intent.from) else {
            return false;
        };
        piece.id == intent.piece
            && piece.owner == Side::Enemy
            && moves_for(
                piece,
                &self.battle.board,
                &self.battle.status,
                &TurnModifiers::none(),
                true,
            )
            .iter()
            .any(|t| t.square == intent.to)
    }

    fn random_king_move(&mut self) -> Option<EnemyIntent> {
        let king = *self.battle.board.king(Side::Enemy)?;
        let moves = moves_for(
            &king,
            &self.battle.board,
            &self.battle.status,
            &TurnModifiers::none(),
            true,
        );
        if moves.is_empty() {
            return None;
        }
        let target = moves[self.rng.random_range(0..moves.len())];
        Some(EnemyIntent {
            piece: king.id,
            from: king.square,
            to: target.square,
            score: 0,
        })
    }

    fn start_player_turn(&mut self) {
        self.battle.turn_number += 1;
        self.battle.modifiers = TurnModifiers::default();
        self.moves_this_turn = 0;
        self.last_player_capture = None;
        self.clear_selection();
        self.phase = Phase::PlayerTurn;
        self.history.push(&self.battle);
        self.refresh_intent();
        self.emit(SessionEvent::TurnStarted {
            turn: self.battle.turn_number,
        });
        self.emit(SessionEvent::BoardChanged);
    }

    /// Enter `Victory` or `Defeat` if the battle is decided.
    pub(crate) fn check_outcome(&mut self) -> bool {
        if self.phase.is_over() {
            return true;
        }
        let board = &self.battle.board;
        let outcome = if board.king(Side::Player).is_none() {
            Some(Phase::Defeat)
        } else if board.king(Side::Enemy).is_none()
            || board.count(Side::Enemy) == 0
            || is_checkmate(board, &self.battle.status, Side::Enemy, &TurnModifiers::none())
        {
            Some(Phase::Victory)
        } else {
            None
        };

        let Some(phase) = outcome else {
            return false;
        };
        info!(?phase, turn = self.battle.turn_number, "battle ended");
        self.phase = phase;
        self.enemy_intent = None;
        self.clear_selection();
        self.emit(SessionEvent::BattleEnded(phase));
        true
    }
}

enum EnemyAction {
    Move(EnemyIntent),
    Pass(String),
}
