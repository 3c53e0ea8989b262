//! Enemy formations and the fixed player army.

use rand::Rng;

use crate::engines::archetype::Archetype;
use crate::engines::difficulty::Difficulty;
use crate::errors::{RogueError, RogueResult};
use crate::game_state::board::Board;
use crate::utils::layout_parser::place_layout;

/// The player's army, placed on rows 6 and 7 at the start of every battle.
pub const PLAYER_ARMY_LAYOUT: &str = "8/8/8/8/8/8/2PPPP2/2NQKR2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formation {
    pub name: &'static str,
    /// Enemy placement; see `utils::layout_parser`.
    pub layout: &'static str,
    pub archetype: Archetype,
    pub difficulty: Difficulty,
}

pub const FORMATIONS: [Formation; 6] = [
    Formation {
        name: "Pawn Storm",
        layout: "3qk3/pppppppp/2pppp2/8/8/8/8/8",
        archetype: Archetype::Swarm,
        difficulty: Difficulty::Easy,
    },
    Formation {
        name: "Idle Court",
        layout: "r2qk2r/pppppppp/8/8/8/8/8/8",
        archetype: Archetype::Passive,
        difficulty: Difficulty::Easy,
    },
    Formation {
        name: "Bastion",
        layout: "rnbqkbnr/pppppppp/8/8/8/8/8/8",
        archetype: Archetype::Wall,
        difficulty: Difficulty::Medium,
    },
    Formation {
        name: "Headhunters",
        layout: "1n1qk1n1/pppppppp/8/8/8/8/8/8",
        archetype: Archetype::Hunter,
        difficulty: Difficulty::Medium,
    },
    Formation {
        name: "War Council",
        layout: "r1bqkb1r/pppppppp/2n2n2/8/8/8/8/8",
        archetype: Archetype::Tactician,
        difficulty: Difficulty::Hard,
    },
    Formation {
        name: "Vanguard",
        layout: "r2qk2r/1pp2pp1/2nppn2/p6p/8/8/8/8",
        archetype: Archetype::Aggressor,
        difficulty: Difficulty::Hard,
    },
];

/// Look a formation up by name, ignoring case.
pub fn formation_by_name(name: &str) -> Option<Formation> {
    FORMATIONS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
        .copied()
}

/// Uniform pick from the built-in pool.
pub fn random_formation<R: Rng + ?Sized>(rng: &mut R) -> Formation {
    FORMATIONS[rng.random_range(0..FORMATIONS.len())]
}

/// Fresh board with the player army and `formation` in place.
pub fn build_battle_board(formation: &Formation) -> RogueResult<Board> {
    let mut board = Board::new_empty();
    place_layout(PLAYER_ARMY_LAYOUT, &mut board).map_err(RogueError::Layout)?;
    place_layout(formation.layout, &mut board).map_err(|err| {
        RogueError::Layout(format!("formation '{}': {}", formation.name, err))
    })?;
    board.validate()?;
    Ok(board)
}
