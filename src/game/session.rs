//! The game session: one owned value holding a whole battle.
//!
//! Hosts drive it with discrete commands (`select_square`, `select_card`,
//! `confirm_target`, `end_turn`) and read it back through snapshot getters.
//! Each command returns a `CommandOutcome` and emits `SessionEvent`s to
//! subscribers. Command handling lives in `game::turn` and `cards::card_play`.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::cards::card_catalog::CardId;
use crate::cards::targeting::CardState;
use crate::engines::adversary::{fallback_move, AdversaryEngine};
use crate::engines::archetype::Archetype;
use crate::engines::difficulty::Difficulty;
use crate::engines::engine_trait::{EnemyEngine, EnemyIntent, SelectionContext};
use crate::errors::{RogueError, RogueResult};
use crate::game::events::{EventBus, SessionEvent};
use crate::game::formations::{build_battle_board, Formation};
use crate::game::session_config::SessionConfig;
use crate::game::turn::Phase;
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::history::History;
use crate::game_state::status::StatusRegistry;
use crate::game_state::turn_modifiers::TurnModifiers;
use crate::move_generation::legal_move_generator::MoveTarget;
use crate::oracle::uci_process::UciProcessOracle;

/// Cards a player may bring into one battle.
pub const MAX_HAND_SIZE: usize = 5;

/// Everything a Rewind restores: board, effects and per-turn flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleState {
    pub board: Board,
    pub status: StatusRegistry,
    pub modifiers: TurnModifiers,
    /// Fallen player pieces, oldest first; Resurrect draws from here.
    pub captured: Vec<PieceKind>,
    /// Loaded Dice was played; the enemy may lose its next move.
    pub enemy_skip_pending: bool,
    /// Zugzwang was played; the next enemy move is a king move.
    pub zugzwang_pending: bool,
    pub turn_number: u32,
}

/// How a command was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Updated,
    /// Illegal action; nothing changed.
    Rejected(String),
    /// The command did not apply in the current state.
    Ignored,
}

impl CommandOutcome {
    #[inline]
    pub fn is_updated(&self) -> bool {
        matches!(self, CommandOutcome::Updated)
    }
}

pub struct GameSession {
    pub(crate) config: SessionConfig,
    pub(crate) battle: BattleState,
    pub(crate) history: History,
    pub(crate) phase: Phase,
    pub(crate) formation: Option<Formation>,
    pub(crate) difficulty: Difficulty,
    pub(crate) archetype: Archetype,
    /// Cards brought into the current battle.
    pub(crate) hand: Vec<CardId>,
    /// The run's deck; burn cards leave it for good.
    pub(crate) deck: Vec<CardId>,
    pub(crate) cards_played_this_battle: u8,
    pub(crate) cards_played_total: u32,
    pub(crate) selected_piece: Option<PieceId>,
    pub(crate) valid_moves: Vec<MoveTarget>,
    pub(crate) card_state: CardState,
    pub(crate) moves_this_turn: u8,
    pub(crate) enemy_intent: Option<EnemyIntent>,
    /// Where the player captured this turn, for the enemy's recapture bonus.
    pub(crate) last_player_capture: Option<Square>,
    pub(crate) engine: Box<dyn EnemyEngine>,
    pub(crate) rng: StdRng,
    pub(crate) events: EventBus,
    pub(crate) last_message: Option<String>,
}

impl GameSession {
    /// Session with the built-in adversary, plus the oracle when enabled.
    pub fn new(config: SessionConfig) -> Self {
        let mut engine = AdversaryEngine::new(config.seed)
            .with_lookahead(config.lookahead.clone())
            .with_orientation(config.orientation);

        if config.oracle.enabled {
            let handshake = Duration::from_millis(config.oracle.timeout_ms.max(1));
            match UciProcessOracle::spawn(&config.oracle.command, &config.oracle.args, handshake) {
                Ok(oracle) => {
                    info!(oracle = %config.oracle.command, "oracle attached");
                    engine = engine.with_oracle(Box::new(oracle), config.oracle.clone());
                }
                Err(err) => {
                    warn!(error = %err, "oracle unavailable, using heuristics only");
                }
            }
        }

        Self::with_engine(config, Box::new(engine))
    }

    /// Session driven by a caller-supplied engine.
    pub fn with_engine(config: SessionConfig, engine: Box<dyn EnemyEngine>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        let history = History::new(config.history_depth);
        Self {
            difficulty: config.difficulty.unwrap_or(Difficulty::Medium),
            config,
            battle: BattleState::default(),
            history,
            phase: Phase::PlayerTurn,
            formation: None,
            archetype: Archetype::Passive,
            hand: Vec::new(),
            deck: Vec::new(),
            cards_played_this_battle: 0,
            cards_played_total: 0,
            selected_piece: None,
            valid_moves: Vec::new(),
            card_state: CardState::Idle,
            moves_this_turn: 0,
            enemy_intent: None,
            last_player_capture: None,
            engine,
            rng,
            events: EventBus::new(),
            last_message: None,
        }
    }

    /// Start a battle against `formation` with the given hand.
    pub fn reset_battle_state(&mut self, formation: Formation, hand: &[CardId]) -> RogueResult<()> {
        if hand.len() > MAX_HAND_SIZE {
            return Err(RogueError::InvalidTarget(format!(
                "a hand holds at most {} cards",
                MAX_HAND_SIZE
            )));
        }
        let board = build_battle_board(&formation)?;
        self.start_battle(board, formation.archetype, formation.difficulty, hand);
        self.formation = Some(formation);
        info!(
            formation = formation.name,
            archetype = ?self.archetype,
            difficulty = ?self.difficulty,
            "battle started"
        );
        Ok(())
    }

    /// Start a battle from an arbitrary board, for puzzles and tests.
    pub fn reset_with_board(
        &mut self,
        board: Board,
        archetype: Archetype,
        difficulty: Difficulty,
        hand: &[CardId],
    ) -> RogueResult<()> {
        board.validate()?;
        if hand.len() > MAX_HAND_SIZE {
            return Err(RogueError::InvalidTarget(format!(
                "a hand holds at most {} cards",
                MAX_HAND_SIZE
            )));
        }
        self.start_battle(board, archetype, difficulty, hand);
        self.formation = None;
        Ok(())
    }

    fn start_battle(
        &mut self,
        board: Board,
        archetype: Archetype,
        difficulty: Difficulty,
        hand: &[CardId],
    ) {
        self.battle = BattleState {
            board,
            turn_number: 1,
            ..BattleState::default()
        };
        self.history = History::new(self.config.history_depth);
        self.archetype = archetype;
        self.difficulty = self.config.difficulty.unwrap_or(difficulty);
        self.hand = hand.to_vec();
        if self.deck.is_empty() {
            self.deck = hand.to_vec();
        }
        self.cards_played_this_battle = 0;
        self.selected_piece = None;
        self.valid_moves.clear();
        self.card_state = CardState::Idle;
        self.moves_this_turn = 0;
        self.last_player_capture = None;
        self.last_message = None;
        self.phase = Phase::PlayerTurn;
        self.engine.new_battle();

        self.history.push(&self.battle);
        self.refresh_intent();
        self.emit(SessionEvent::TurnStarted {
            turn: self.battle.turn_number,
        });
        self.emit(SessionEvent::BoardChanged);
    }

    /// Recompute the enemy's predicted move for the current position.
    pub(crate) fn refresh_intent(&mut self) {
        if self.phase.is_over() {
            self.enemy_intent = None;
            return;
        }
        self.enemy_intent = self.choose_enemy_move();
    }

    /// Ask the engine for a move, falling back to any legal move on error.
    pub(crate) fn choose_enemy_move(&mut self) -> Option<EnemyIntent> {
        let ctx = SelectionContext {
            board: &self.battle.board,
            status: &self.battle.status,
            player_hand: &self.hand,
            difficulty: self.difficulty,
            archetype: self.archetype,
            turn_number: self.battle.turn_number,
            recapture_square: self.last_player_capture,
        };
        match self.engine.choose_move(&ctx) {
            Ok(output) => {
                for line in &output.info_lines {
                    debug!("{}", line);
                }
                output.best_move
            }
            Err(err) => {
                warn!(error = %err, "enemy engine failed, using fallback move");
                fallback_move(&self.battle.board, &self.battle.status)
            }
        }
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        self.events.emit(event);
    }

    /// Record a rejection; the state stays as it was.
    pub(crate) fn reject(&mut self, message: impl Into<String>) -> CommandOutcome {
        let message = message.into();
        debug!(%message, "command rejected");
        self.last_message = Some(message.clone());
        self.emit(SessionEvent::Rejected(message.clone()));
        CommandOutcome::Rejected(message)
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_piece = None;
        self.valid_moves.clear();
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Apply a named option to the session config and, where relevant, the
    /// engine.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), String> {
        self.config.set_option(name, value)?;
        let engine_option = ["Seed", "Lookahead", "LookaheadBreadth"]
            .iter()
            .any(|known| name.trim().eq_ignore_ascii_case(known));
        if engine_option {
            self.engine.set_option(name.trim(), value.trim())?;
        }
        if name.trim().eq_ignore_ascii_case("Difficulty") {
            if let Some(difficulty) = self.config.difficulty {
                self.difficulty = difficulty;
            }
        }
        Ok(())
    }

    /// Replace the run-level deck.
    pub fn set_deck(&mut self, deck: Vec<CardId>) {
        self.deck = deck;
    }

    pub fn board(&self) -> &Board {
        &self.battle.board
    }

    pub fn battle(&self) -> &BattleState {
        &self.battle
    }

    pub fn valid_moves(&self) -> &[MoveTarget] {
        &self.valid_moves
    }

    pub fn selected_piece(&self) -> Option<PieceId> {
        self.selected_piece
    }

    pub fn status(&self) -> &StatusRegistry {
        &self.battle.status
    }

    pub fn enemy_intent(&self) -> Option<EnemyIntent> {
        self.enemy_intent
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn card_state(&self) -> CardState {
        self.card_state
    }

    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    pub fn deck(&self) -> &[CardId] {
        &self.deck
    }

    pub fn captured(&self) -> &[PieceKind] {
        &self.battle.captured
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn cards_played_this_battle(&self) -> u8 {
        self.cards_played_this_battle
    }

    pub fn cards_played_total(&self) -> u32 {
        self.cards_played_total
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn formation(&self) -> Option<&Formation> {
        self.formation.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn turn_number(&self) -> u32 {
        self.battle.turn_number
    }
}
