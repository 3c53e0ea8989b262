//! Session configuration.
//!
//! Loaded from JSON with every field optional, and adjustable at runtime
//! through `set_option(name, value)` using the same name/value convention as
//! a UCI `setoption` command.

use serde::{Deserialize, Serialize};

use crate::engines::difficulty::Difficulty;
use crate::errors::{RogueError, RogueResult};
use crate::utils::algebraic::Orientation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookaheadConfig {
    /// Allow lookahead on difficulty tiers that use it.
    pub enabled: bool,
    pub depth: u8,
    /// Replies searched per node.
    pub reply_breadth: usize,
    /// Share of the lookahead correction blended into a move's score.
    pub weight: f32,
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            depth: 1,
            reply_breadth: 4,
            weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub enabled: bool,
    /// Program launched as the UCI oracle.
    pub command: String,
    pub args: Vec<String>,
    pub search_depth: u8,
    pub timeout_ms: u64,
    /// Card danger above which the oracle's move may be replaced.
    pub danger_threshold: i32,
    /// How much weaker (by heuristic score) a replacement may be.
    pub comparable_margin: i32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "stockfish".to_owned(),
            args: Vec::new(),
            search_depth: 10,
            timeout_ms: 3_000,
            danger_threshold: 60,
            comparable_margin: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Overrides the formation's difficulty when set.
    pub difficulty: Option<Difficulty>,
    pub max_cards_per_battle: u8,
    pub history_depth: usize,
    /// Seed for every random decision; `None` draws from the OS.
    pub seed: Option<u64>,
    pub orientation: Orientation,
    /// Play the enemy turn as soon as the player's turn ends.
    pub auto_enemy_turn: bool,
    pub lookahead: LookaheadConfig,
    pub oracle: OracleConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: None,
            max_cards_per_battle: 3,
            history_depth: 5,
            seed: None,
            orientation: Orientation::PlayerIsWhite,
            auto_enemy_turn: true,
            lookahead: LookaheadConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(text: &str) -> RogueResult<Self> {
        serde_json::from_str(text).map_err(|err| RogueError::Config(err.to_string()))
    }

    pub fn to_json_string(&self) -> RogueResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| RogueError::Config(err.to_string()))
    }

    /// Apply one named option. Names are matched case-insensitively.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), String> {
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("Difficulty") {
            self.difficulty = if value.eq_ignore_ascii_case("formation") || value.is_empty() {
                None
            } else {
                Some(value.parse::<Difficulty>()?)
            };
        } else if name.eq_ignore_ascii_case("MaxCards") {
            self.max_cards_per_battle = value
                .parse::<u8>()
                .map_err(|_| format!("invalid MaxCards value '{}'", value))?;
        } else if name.eq_ignore_ascii_case("HistoryDepth") {
            let parsed = value
                .parse::<usize>()
                .map_err(|_| format!("invalid HistoryDepth value '{}'", value))?;
            self.history_depth = parsed.max(1);
        } else if name.eq_ignore_ascii_case("Seed") {
            self.seed = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid Seed value '{}'", value))?,
                )
            };
        } else if name.eq_ignore_ascii_case("Orientation") {
            self.orientation = value.parse()?;
        } else if name.eq_ignore_ascii_case("AutoEnemyTurn") {
            self.auto_enemy_turn = parse_flag(value);
        } else if name.eq_ignore_ascii_case("Lookahead") {
            self.lookahead.enabled = parse_flag(value);
        } else if name.eq_ignore_ascii_case("LookaheadDepth") {
            self.lookahead.depth = value
                .parse::<u8>()
                .map_err(|_| format!("invalid LookaheadDepth value '{}'", value))?;
        } else if name.eq_ignore_ascii_case("LookaheadBreadth") {
            let parsed = value
                .parse::<usize>()
                .map_err(|_| format!("invalid LookaheadBreadth value '{}'", value))?;
            self.lookahead.reply_breadth = parsed.max(1);
        } else if name.eq_ignore_ascii_case("LookaheadWeight") {
            let parsed = value
                .parse::<f32>()
                .map_err(|_| format!("invalid LookaheadWeight value '{}'", value))?;
            self.lookahead.weight = parsed.clamp(0.0, 1.0);
        } else if name.eq_ignore_ascii_case("Oracle") {
            self.oracle.enabled = parse_flag(value);
        } else if name.eq_ignore_ascii_case("OracleCommand") {
            self.oracle.command = value.to_owned();
        } else if name.eq_ignore_ascii_case("OracleDepth") {
            self.oracle.search_depth = value
                .parse::<u8>()
                .map_err(|_| format!("invalid OracleDepth value '{}'", value))?;
        } else if name.eq_ignore_ascii_case("OracleTimeoutMs") {
            self.oracle.timeout_ms = value
                .parse::<u64>()
                .map_err(|_| format!("invalid OracleTimeoutMs value '{}'", value))?;
        } else {
            return Err(format!("unknown option '{}'", name));
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    matches!(lower.as_str(), "true" | "1" | "yes" | "on")
}
