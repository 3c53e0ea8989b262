//! Enemy engine abstraction.
//!
//! The session talks to its opponent through `EnemyEngine`, so scripted or
//! alternative engines can be swapped in behind the same interface.

use crate::cards::card_catalog::CardId;
use crate::engines::archetype::Archetype;
use crate::engines::difficulty::Difficulty;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{PieceId, Square};
use crate::game_state::status::StatusRegistry;

/// The enemy's predicted (and, if still legal, executed) next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyIntent {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
    pub score: i32,
}

/// Everything the engine may look at when choosing a move.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub board: &'a Board,
    pub status: &'a StatusRegistry,
    /// Cards the player still holds this battle.
    pub player_hand: &'a [CardId],
    pub difficulty: Difficulty,
    pub archetype: Archetype,
    pub turn_number: u32,
    /// Square where the player captured on its last move, if any.
    pub recapture_square: Option<Square>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub best_move: Option<EnemyIntent>,
    pub info_lines: Vec<String>,
}

pub trait EnemyEngine: Send {
    fn new_battle(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    /// `best_move: None` means the enemy has no move and passes.
    fn choose_move(&mut self, ctx: &SelectionContext<'_>) -> Result<EngineOutput, String>;
}
