//! Line-oriented console driver for a single battle.
//!
//! Run with:
//! `cargo run -- [--config session.json] [--formation "war council"] [--hand freeze,shield,snipe]`
//!
//! Logging is controlled with `RUST_LOG`, for example `RUST_LOG=rogue_gambit=debug`.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use rogue_gambit::cards::card_catalog::CardId;
use rogue_gambit::cards::targeting::CardTarget;
use rogue_gambit::game::events::SessionEvent;
use rogue_gambit::game::formations::{formation_by_name, random_formation};
use rogue_gambit::game::session::{CommandOutcome, GameSession};
use rogue_gambit::game::session_config::SessionConfig;
use rogue_gambit::game_state::chess_types::{Direction, PieceKind};
use rogue_gambit::utils::render_board::render_board_with_marks;

const HELP: &str = "commands: square <row> <col> | card <name> | cancel | dir <dr> <dc> | \
promote <q|r|b|n> | revive <index> | end | enemy | board | hand | set <name> <value> | help | quit";

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match arg_value(&args, "--config") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("cannot read {}: {}", path, err))?;
            SessionConfig::from_json_str(&text).map_err(|err| err.to_string())?
        }
        None => SessionConfig::default(),
    };

    let formation = match arg_value(&args, "--formation") {
        Some(name) => formation_by_name(&name).ok_or_else(|| format!("unknown formation '{}'", name))?,
        None => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            random_formation(&mut rng)
        }
    };

    let hand = match arg_value(&args, "--hand") {
        Some(list) => list
            .split(',')
            .map(|name| name.parse::<CardId>().map_err(|err| err.to_string()))
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![CardId::Freeze, CardId::Shield, CardId::Snipe, CardId::Dash],
    };

    let mut session = GameSession::new(config);
    let events = session.subscribe();
    session
        .reset_battle_state(formation, &hand)
        .map_err(|err| err.to_string())?;

    println!(
        "{} ({:?}, {:?})",
        formation.name,
        session.archetype(),
        session.difficulty()
    );
    print_board(&session);
    drain_events(&events);
    println!("{}", HELP);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| err.to_string())?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };

        let outcome = match command {
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "board" => {
                print_board(&session);
                continue;
            }
            "hand" => {
                let names: Vec<String> = session.hand().iter().map(|c| c.to_string()).collect();
                println!("hand: {}", names.join(", "));
                continue;
            }
            "square" => match parse_pair(rest) {
                Some((row, col)) => session.select_square(row, col),
                None => CommandOutcome::Rejected("usage: square <row> <col>".to_owned()),
            },
            "card" => match rest.join(" ").parse::<CardId>() {
                Ok(card) => session.select_card(card),
                Err(err) => CommandOutcome::Rejected(err.to_string()),
            },
            "cancel" => session.cancel_card(),
            "dir" => match parse_pair(rest) {
                Some((dr, dc)) => session.confirm_target(CardTarget::Direction(Direction::new(dr, dc))),
                None => CommandOutcome::Rejected("usage: dir <dr> <dc>".to_owned()),
            },
            "promote" => match rest.first().and_then(|w| w.chars().next()).and_then(PieceKind::from_letter) {
                Some(kind) => session.confirm_target(CardTarget::Promotion(kind)),
                None => CommandOutcome::Rejected("usage: promote <q|r|b|n>".to_owned()),
            },
            "revive" => match rest.first().and_then(|w| w.parse::<usize>().ok()) {
                Some(index) => session.confirm_target(CardTarget::Captured(index)),
                None => CommandOutcome::Rejected("usage: revive <index>".to_owned()),
            },
            "end" => session.end_turn(),
            "enemy" => session.run_enemy_turn(),
            "set" => match rest {
                [name, value @ ..] => match session.set_option(name, &value.join(" ")) {
                    Ok(()) => CommandOutcome::Updated,
                    Err(err) => CommandOutcome::Rejected(err),
                },
                [] => CommandOutcome::Rejected("usage: set <name> <value>".to_owned()),
            },
            other => CommandOutcome::Rejected(format!("unknown command '{}'", other)),
        };

        match outcome {
            CommandOutcome::Updated => print_board(&session),
            CommandOutcome::Rejected(message) => println!("rejected: {}", message),
            CommandOutcome::Ignored => println!("nothing to do"),
        }
        drain_events(&events);
        if let Some(message) = session.last_message() {
            println!("{}", message);
        }
        if session.phase().is_over() {
            println!("battle over: {:?}", session.phase());
            break;
        }
        io::stdout().flush().map_err(|err| err.to_string())?;
    }

    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_pair(words: &[&str]) -> Option<(i8, i8)> {
    match words {
        [a, b] => Some((a.parse().ok()?, b.parse().ok()?)),
        _ => None,
    }
}

fn print_board(session: &GameSession) {
    let marks: Vec<_> = session.valid_moves().iter().map(|t| t.square).collect();
    println!("{}", render_board_with_marks(session.board(), &marks));
    if let Some(intent) = session.enemy_intent() {
        println!("enemy intends {} -> {}", intent.from, intent.to);
    }
    if !session.card_state().is_idle() {
        println!("card: {}", session.card_state().prompt());
    }
}

fn drain_events(events: &Receiver<SessionEvent>) {
    for event in events.try_iter() {
        match event {
            SessionEvent::BoardChanged => {}
            SessionEvent::CardPlayed { card, message } => println!("[{}] {}", card, message),
            SessionEvent::Rejected(_) => {}
            SessionEvent::EnemyMoved {
                from,
                to,
                captured,
                blocked,
            } => {
                let suffix = match (captured, blocked) {
                    (_, true) => " (blocked)".to_owned(),
                    (Some(kind), false) => format!(" capturing {:?}", kind),
                    (None, false) => String::new(),
                };
                println!("enemy: {} -> {}{}", from, to, suffix);
            }
            SessionEvent::EnemyPassed { reason } => println!("enemy passes: {}", reason),
            SessionEvent::StatusExpired(expiry) => {
                println!("{:?} on piece #{} ended", expiry.kind, expiry.piece)
            }
            SessionEvent::TurnStarted { turn } => println!("-- turn {} --", turn),
            SessionEvent::BattleEnded(phase) => println!("** {:?} **", phase),
        }
    }
}
