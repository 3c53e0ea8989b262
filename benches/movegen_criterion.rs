use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rogue_gambit::game::formations::{build_battle_board, FORMATIONS};
use rogue_gambit::game_state::chess_types::Side;
use rogue_gambit::game_state::status::StatusRegistry;
use rogue_gambit::game_state::turn_modifiers::TurnModifiers;
use rogue_gambit::move_generation::legal_move_checks::is_checkmate;
use rogue_gambit::move_generation::legal_move_generator::all_moves;
use rogue_gambit::utils::layout_parser::parse_layout;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    layout: &'static str,
}

const MIDGAME_CASES: &[BenchCase] = &[
    BenchCase {
        name: "open_center",
        layout: "r2qk2r/1pp2pp1/2n2n2/p2pp2p/3P4/2N1P3/2P2P2/3QKR2",
    },
    BenchCase {
        name: "cornered_king",
        layout: "k7/2Q5/1K6/8/8/8/8/8",
    },
];

fn augmented() -> TurnModifiers {
    TurnModifiers {
        extra_range: 1,
        knights_tour: true,
        piercing: true,
        ..TurnModifiers::default()
    }
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(30);

    let status = StatusRegistry::new();
    let plain = TurnModifiers::none();
    let boosted = augmented();

    for formation in FORMATIONS {
        let board = build_battle_board(&formation).expect("formation should build");
        let enemy_moves = all_moves(&board, &status, Side::Enemy, &plain, true).len() as u64;

        group.throughput(Throughput::Elements(enemy_moves.max(1)));
        group.bench_with_input(
            BenchmarkId::new("enemy_all_moves", formation.name),
            &board,
            |b, board| {
                b.iter(|| black_box(all_moves(black_box(board), &status, Side::Enemy, &plain, true).len()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("player_augmented_moves", formation.name),
            &board,
            |b, board| {
                b.iter(|| black_box(all_moves(black_box(board), &status, Side::Player, &boosted, false).len()));
            },
        );
    }

    for case in MIDGAME_CASES {
        let board = parse_layout(case.layout).expect("benchmark layout should parse");
        group.bench_with_input(BenchmarkId::new("is_checkmate", case.name), &board, |b, board| {
            b.iter(|| black_box(is_checkmate(black_box(board), &status, Side::Enemy, &plain)));
        });
    }

    group.finish();
}

criterion_group!(movegen_benches, bench_movegen);
criterion_main!(movegen_benches);
