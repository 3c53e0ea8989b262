//! Crate root module declarations for the Rogue Gambit battle engine.
//!
//! This file exposes all subsystems (board and status model, move
//! generation, cards, the game session, search, the adversary engine, the
//! oracle boundary and utility helpers) so binaries, tests and benches can
//! import stable module paths.

pub mod errors;

pub mod game_state {
    pub mod board;
    pub mod chess_types;
    pub mod history;
    pub mod status;
    pub mod turn_modifiers;
}

pub mod moves {
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod sliding_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
}

pub mod cards {
    pub mod card_catalog;
    pub mod card_effects;
    pub mod card_play;
    pub mod targeting;
}

pub mod game {
    pub mod capture;
    pub mod events;
    pub mod formations;
    pub mod session;
    pub mod session_config;
    pub mod turn;
}

pub mod search {
    pub mod board_scoring;
    pub mod lookahead;
}

pub mod engines {
    pub mod adversary;
    pub mod archetype;
    pub mod card_danger;
    pub mod difficulty;
    pub mod engine_trait;
    pub mod tactics;
}

pub mod oracle {
    pub mod oracle_trait;
    pub mod uci_process;
}

pub mod utils {
    pub mod algebraic;
    pub mod battle_harness;
    pub mod fen_generator;
    pub mod layout_parser;
    pub mod long_algebraic;
    pub mod render_board;
}
