//! Standalone scripted-player vs adversary battle series.
//!
//! Run with:
//! `cargo run --release --bin battle_sim`
//! `cargo run --release --bin battle_sim -- --verbose --battles 20 --seed 7`

use rogue_gambit::cards::card_catalog::CardId;
use rogue_gambit::utils::battle_harness::{play_battle_series, BattleConfig, BattleSeriesConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let battles = numeric_arg(&args, "--battles").unwrap_or(10) as u16;
    let seed = numeric_arg(&args, "--seed").unwrap_or(1234);

    let stats = play_battle_series(BattleSeriesConfig {
        battles,
        base_seed: seed,
        hand: vec![
            CardId::Freeze,
            CardId::Shield,
            CardId::Snipe,
            CardId::ChainReaction,
            CardId::Phantom,
        ],
        per_battle: BattleConfig {
            max_turns: 80,
            ..BattleConfig::default()
        },
        verbose,
    })?;

    println!("{}", stats.report());
    println!("outcomes: {:?}", stats.outcomes);
    Ok(())
}

fn numeric_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
