//! Card effect executor: selecting, targeting, cancelling and finishing a
//! card play.
//!
//! Effects are applied to a scratch copy of the battle and committed only on
//! success, so a rejected play never changes the board.

use tracing::{debug, info};

use crate::cards::card_catalog::CardId;
use crate::cards::card_effects::apply_effect;
use crate::cards::targeting::{CardState, CardTarget, ResolvedTarget, TargetStep};
use crate::errors::{RogueError, RogueResult};
use crate::game::events::SessionEvent;
use crate::game::session::{CommandOutcome, GameSession};
use crate::game::turn::Phase;

impl GameSession {
    /// Choose a card from hand. Choosing the card that is already waiting
    /// for a target cancels it.
    pub fn select_card(&mut self, card: CardId) -> CommandOutcome {
        if self.card_state.card() == Some(card) {
            return self.cancel_card();
        }
        if let Err(err) = self.card_playable(card) {
            return self.reject(err.to_string());
        }
        if card == CardId::Rewind && self.history.len() < 2 {
            return self.reject("there is no earlier turn to return to");
        }

        if !self.card_state.is_idle() {
            self.cancel_card();
        }
        self.clear_selection();

        match CardState::begin(card) {
            None => self.play_resolved(card, ResolvedTarget::None),
            Some(state) => {
                self.card_state = state;
                if card.arms_piece() {
                    self.battle.modifiers.pending_arm = Some(card);
                }
                debug!(%card, "card awaiting target");
                self.last_message = Some(state.prompt());
                self.emit(SessionEvent::BoardChanged);
                CommandOutcome::Updated
            }
        }
    }

    /// Feed one target to the card in play.
    pub fn confirm_target(&mut self, target: CardTarget) -> CommandOutcome {
        let Some(card) = self.card_state.card() else {
            return CommandOutcome::Ignored;
        };
        let step = self.card_state.advance(
            target,
            &self.battle.board,
            &self.battle.status,
            &self.battle.captured,
        );
        match step {
            Err(message) => self.reject(message),
            Ok(TargetStep::Continue(next)) => {
                self.card_state = next;
                self.last_message = Some(next.prompt());
                self.emit(SessionEvent::BoardChanged);
                CommandOutcome::Updated
            }
            Ok(TargetStep::Resolve(resolved)) => self.play_resolved(card, resolved),
        }
    }

    /// Abandon the card in play without spending it.
    pub fn cancel_card(&mut self) -> CommandOutcome {
        let Some(card) = self.card_state.card() else {
            return CommandOutcome::Ignored;
        };
        self.battle.modifiers.disarm_pending();
        self.card_state = CardState::Idle;
        self.last_message = Some(format!("{} cancelled", card));
        self.emit(SessionEvent::BoardChanged);
        CommandOutcome::Updated
    }

    /// Phase, per-battle cap and hand membership, in that order.
    fn card_playable(&self, card: CardId) -> RogueResult<()> {
        match self.phase {
            Phase::PlayerTurn => {}
            Phase::EnemyTurn => return Err(RogueError::WrongPhase("the enemy turn")),
            Phase::Victory | Phase::Defeat => return Err(RogueError::GameOver),
        }
        if self.cards_played_this_battle >= self.config.max_cards_per_battle {
            return Err(RogueError::CardLimitReached(self.cards_played_this_battle));
        }
        if !self.hand.contains(&card) {
            return Err(RogueError::CardNotInHand(card));
        }
        Ok(())
    }

    fn play_resolved(&mut self, card: CardId, target: ResolvedTarget) -> CommandOutcome {
        if let Err(err) = self.card_playable(card) {
            return self.reject(err.to_string());
        }

        if card == CardId::Rewind {
            let Some(previous) = self.history.rewind() else {
                return self.reject("there is no earlier turn to return to");
            };
            self.battle = previous;
            self.moves_this_turn = 0;
            self.last_player_capture = None;
            return self.finish_card_play(card, "Time folds back to your previous turn.".to_owned());
        }

        let mut next = self.battle.clone();
        match apply_effect(card, target, &mut next) {
            Ok(message) => {
                self.battle = next;
                self.finish_card_play(card, message)
            }
            Err(err) => self.reject(err.to_string()),
        }
    }

    /// Spend the card and, unless it grants extra action, end the turn.
    fn finish_card_play(&mut self, card: CardId, message: String) -> CommandOutcome {
        self.cards_played_this_battle += 1;
        self.cards_played_total += 1;
        if let Some(index) = self.hand.iter().position(|c| *c == card) {
            self.hand.remove(index);
        }
        if card.is_burn() {
            if let Some(index) = self.deck.iter().position(|c| *c == card) {
                self.deck.remove(index);
            }
        }
        self.card_state = CardState::Idle;
        self.battle.modifiers.pending_arm = None;
        self.clear_selection();

        info!(%card, played = self.cards_played_this_battle, "card played");
        self.last_message = Some(message.clone());
        self.emit(SessionEvent::CardPlayed { card, message });
        self.emit(SessionEvent::BoardChanged);

        if self.check_outcome() {
            return CommandOutcome::Updated;
        }
        self.refresh_intent();
        if card.ends_turn() {
            self.end_player_turn();
        }
        CommandOutcome::Updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::archetype::Archetype;
    use crate::engines::difficulty::Difficulty;
    use crate::game::session_config::SessionConfig;
    use crate::game_state::chess_types::*;
    use crate::game_state::status::StatusKind;
    use crate::utils::layout_parser::parse_layout;

    fn session(layout: &str, hand: &[CardId]) -> GameSession {
        let mut session = GameSession::new(SessionConfig {
            seed: Some(21),
            auto_enemy_turn: false,
            ..SessionConfig::default()
        });
        session
            .reset_with_board(
                parse_layout(layout).expect("valid layout"),
                Archetype::Passive,
                Difficulty::Easy,
                hand,
            )
            .expect("valid battle");
        session
    }

    #[test]
    fn instant_card_resolves_and_keeps_the_turn() {
        let mut session = session("4k3/8/8/8/8/8/3P4/4K3", &[CardId::Rally]);
        assert_eq!(session.select_card(CardId::Rally), CommandOutcome::Updated);
        assert_eq!(session.battle().modifiers.extra_range, 1);
        assert_eq!(session.cards_played_this_battle(), 1);
        assert!(session.hand().is_empty());
        assert_eq!(session.phase(), Phase::PlayerTurn);
    }

    #[test]
    fn targeted_card_ends_the_turn() {
        let mut session = session("3qk3/8/8/8/8/8/3P4/4K3", &[CardId::Freeze]);
        session.select_card(CardId::Freeze);
        assert!(matches!(
            session.card_state(),
            CardState::AwaitingEnemyPiece { .. }
        ));
        assert_eq!(session.select_square(0, 3), CommandOutcome::Updated);
        let queen = session
            .board()
            .piece_at(Square::new(0, 3))
            .expect("queen")
            .id;
        assert!(session.status().has(queen, StatusKind::Frozen));
        assert_eq!(session.phase(), Phase::EnemyTurn);
    }

    #[test]
    fn wrong_target_keeps_the_state() {
        let mut session = session("3qk3/8/8/8/8/8/3P4/4K3", &[CardId::Freeze]);
        session.select_card(CardId::Freeze);
        let state = session.card_state();
        assert!(matches!(
            session.select_square(6, 3),
            CommandOutcome::Rejected(_)
        ));
        assert_eq!(session.card_state(), state);
        assert_eq!(session.cards_played_this_battle(), 0);
    }

    #[test]
    fn reselecting_cancels_and_disarms() {
        let mut session = session("4k3/8/8/8/8/8/3R4/4K3", &[CardId::Dash]);
        session.select_card(CardId::Dash);
        assert_eq!(session.battle().modifiers.pending_arm, Some(CardId::Dash));
        assert_eq!(session.select_card(CardId::Dash), CommandOutcome::Updated);
        assert!(session.card_state().is_idle());
        assert_eq!(session.battle().modifiers.pending_arm, None);
        assert_eq!(session.hand(), &[CardId::Dash]);
    }

    #[test]
    fn dash_rejects_pieces_it_cannot_extend() {
        let mut session = session("4k3/8/8/8/8/8/3RP3/4K3", &[CardId::Dash]);
        session.select_card(CardId::Dash);
        assert!(matches!(
            session.select_square(6, 3),
            CommandOutcome::Rejected(_)
        ));
        assert!(!session.card_state().is_idle());
        assert_eq!(session.hand(), &[CardId::Dash]);
        assert_eq!(session.cards_played_this_battle(), 0);
        assert_eq!(session.battle().modifiers.dash_piece, None);

        let pawn = session
            .board()
            .piece_at(Square::new(6, 4))
            .expect("pawn")
            .id;
        assert_eq!(session.select_square(6, 4), CommandOutcome::Updated);
        assert_eq!(session.battle().modifiers.dash_piece, Some(pawn));
        assert_eq!(session.cards_played_this_battle(), 1);
        assert_eq!(session.phase(), Phase::PlayerTurn);

        assert_eq!(session.select_square(6, 4), CommandOutcome::Updated);
        let reach: Vec<Square> = session.valid_moves().iter().map(|t| t.square).collect();
        assert!(reach.contains(&Square::new(2, 4)));
        assert!(!reach.contains(&Square::new(1, 4)));
    }

    #[test]
    fn burn_cards_leave_the_deck() {
        let mut session = session("4k3/8/8/8/8/8/3P4/4K3", &[CardId::ParallelPlay]);
        session.set_deck(vec![CardId::ParallelPlay, CardId::Rally]);
        session.select_card(CardId::ParallelPlay);
        assert_eq!(session.deck(), &[CardId::Rally]);
        assert_eq!(session.battle().modifiers.moves_allowed, 2);
    }

    #[test]
    fn rewind_needs_history() {
        let mut session = session("4k3/8/8/8/8/8/3P4/4K3", &[CardId::Rewind]);
        assert!(matches!(
            session.select_card(CardId::Rewind),
            CommandOutcome::Rejected(_)
        ));
        assert_eq!(session.hand(), &[CardId::Rewind]);
    }

    #[test]
    fn card_not_in_hand_is_rejected() {
        let mut session = session("4k3/8/8/8/8/8/3P4/4K3", &[CardId::Rally]);
        assert!(matches!(
            session.select_card(CardId::Exile),
            CommandOutcome::Rejected(_)
        ));
    }
}
