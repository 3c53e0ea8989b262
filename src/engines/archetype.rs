//! Personality profiles for enemy formations.
//!
//! An archetype adds signed adjustments to a move's score based on a handful
//! of features extracted by the adversary. It never vetoes a move.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Passive,
    Swarm,
    Hunter,
    Wall,
    Tactician,
    Aggressor,
}

/// Facts about a candidate move that archetypes react to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveFeatures {
    pub is_capture: bool,
    pub pawn_advance: bool,
    /// The king stepped toward the opposing side.
    pub king_advance: bool,
    /// Squares the queen gained (positive) or lost toward the opposing king.
    pub queen_approach: i32,
    /// Attacked allies defended after the move minus before it.
    pub net_defense: i32,
    pub fork: bool,
    pub pin: bool,
    pub minor_piece: bool,
}

/// Per-feature weights. Boolean features add their weight once; counted
/// features multiply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeWeights {
    pub capture: i32,
    pub pawn_advance: i32,
    pub king_advance: i32,
    pub queen_approach: i32,
    pub net_defense: i32,
    pub fork_pin: i32,
    pub minor_piece: i32,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Archetype::Passive,
        Archetype::Swarm,
        Archetype::Hunter,
        Archetype::Wall,
        Archetype::Tactician,
        Archetype::Aggressor,
    ];

    pub const fn weights(self) -> ArchetypeWeights {
        match self {
            Archetype::Passive => ArchetypeWeights {
                capture: -20,
                pawn_advance: -10,
                king_advance: -30,
                queen_approach: 0,
                net_defense: 15,
                fork_pin: 0,
                minor_piece: 0,
            },
            Archetype::Swarm => ArchetypeWeights {
                capture: 10,
                pawn_advance: 35,
                king_advance: -10,
                queen_approach: 0,
                net_defense: 0,
                fork_pin: 0,
                minor_piece: -5,
            },
            Archetype::Hunter => ArchetypeWeights {
                capture: 15,
                pawn_advance: 0,
                king_advance: 0,
                queen_approach: 12,
                net_defense: -5,
                fork_pin: 20,
                minor_piece: 0,
            },
            Archetype::Wall => ArchetypeWeights {
                capture: -5,
                pawn_advance: -15,
                king_advance: -40,
                queen_approach: 0,
                net_defense: 25,
                fork_pin: 0,
                minor_piece: 0,
            },
            Archetype::Tactician => ArchetypeWeights {
                capture: 0,
                pawn_advance: 0,
                king_advance: -10,
                queen_approach: 0,
                net_defense: 5,
                fork_pin: 80,
                minor_piece: 15,
            },
            Archetype::Aggressor => ArchetypeWeights {
                capture: 40,
                pawn_advance: 10,
                king_advance: 10,
                queen_approach: 5,
                net_defense: -10,
                fork_pin: 10,
                minor_piece: 0,
            },
        }
    }

    /// Signed score adjustment for a move with `features`.
    pub fn modifier(self, features: &MoveFeatures) -> i32 {
        let w = self.weights();
        let mut total = 0;
        if features.is_capture {
            total += w.capture;
        }
        if features.pawn_advance {
            total += w.pawn_advance;
        }
        if features.king_advance {
            total += w.king_advance;
        }
        total += w.queen_approach * features.queen_approach;
        total += w.net_defense * features.net_defense;
        if features.fork || features.pin {
            total += w.fork_pin;
        }
        if features.minor_piece {
            total += w.minor_piece;
        }
        total
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Archetype::ALL
            .into_iter()
            .find(|a| format!("{a:?}").to_ascii_lowercase() == lower)
            .ok_or_else(|| format!("invalid archetype '{s}'"))
    }
}
