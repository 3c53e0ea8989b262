//! Difficulty tiers and the knobs each one turns.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Candidates the final pick is drawn from; 1 always plays the best move.
    pub top_moves: usize,
    /// Scales the card-danger penalty.
    pub card_penalty_multiplier: f32,
    /// Chance of rescoring with the safety penalty ignored.
    pub ignore_safety_chance: f64,
    pub fork_pin_bonus: i32,
    pub lookahead: bool,
    pub consult_oracle: bool,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                top_moves: 4,
                card_penalty_multiplier: 0.4,
                ignore_safety_chance: 0.30,
                fork_pin_bonus: 0,
                lookahead: false,
                consult_oracle: false,
            },
            Difficulty::Medium => DifficultyProfile {
                top_moves: 2,
                card_penalty_multiplier: 0.7,
                ignore_safety_chance: 0.10,
                fork_pin_bonus: 0,
                lookahead: false,
                consult_oracle: false,
            },
            Difficulty::Hard => DifficultyProfile {
                top_moves: 1,
                card_penalty_multiplier: 1.0,
                ignore_safety_chance: 0.0,
                fork_pin_bonus: 60,
                lookahead: true,
                consult_oracle: true,
            },
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "medium" | "2" => Ok(Difficulty::Medium),
            "hard" | "3" => Ok(Difficulty::Hard),
            _ => Err(format!("invalid difficulty '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harder_tiers_are_stricter() {
        let easy = Difficulty::Easy.profile();
        let hard = Difficulty::Hard.profile();
        assert!(easy.top_moves > hard.top_moves);
        assert!(easy.card_penalty_multiplier < hard.card_penalty_multiplier);
        assert!(easy.ignore_safety_chance > hard.ignore_safety_chance);
        assert_eq!(hard.top_moves, 1);
        assert_eq!(easy.fork_pin_bonus, 0);
    }
}
