//! Criterion benchmarks for building and replaying games.
//!
//! Benchmarks:
//!   - setup of a four-player 1889 game
//!   - replay of the scripted opening (auction, stock round, operating round)
//!   - a single transactional action on a game in progress
//!   - state snapshot encoding
//!
//! Run with: cargo bench --bench replay

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rust_18xx::games::g1889;
use rust_18xx::{Action, ActionKind, GameBuilder};

const PLAYERS: [&str; 4] = ["A", "B", "C", "D"];

fn player(name: &str, kind: ActionKind) -> Action {
    Action::player(name, kind)
}

fn opening() -> Vec<Action> {
    let buy = |p: &str, c: &str, price| {
        player(
            p,
            ActionKind::BuyCompany {
                company: c.into(),
                price,
            },
        )
    };
    let share = |p: &str, s: &str| player(p, ActionKind::BuyShare { share: s.into() });

    vec![
        buy("A", "TR", 20),
        buy("B", "MF", 30),
        buy("C", "ER", 40),
        buy("D", "SMR", 50),
        buy("A", "DR", 60),
        buy("B", "SIR", 80),
        buy("C", "UTF", 150),
        player(
            "D",
            ActionKind::Par {
                corporation: "AR".into(),
                share_price: "0,3".into(),
            },
        ),
        share("A", "AR_1"),
        share("B", "AR_2"),
        share("C", "AR_3"),
        player("D", ActionKind::Pass),
        player("A", ActionKind::Pass),
        player("B", ActionKind::Pass),
        player("C", ActionKind::Pass),
        Action::corporation(
            "AR",
            ActionKind::BuyTrain {
                train: "2-0".into(),
                price: 80,
            },
        ),
        Action::corporation("AR", ActionKind::Pass),
    ]
}

// ---------------------------------------------------------------------------
// Benchmark: setup and replay
// ---------------------------------------------------------------------------

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    let config = std::sync::Arc::new(g1889::config());
    let actions = opening();

    group.bench_function("setup_4p", |b| {
        b.iter(|| {
            black_box(
                GameBuilder::new(config.clone())
                    .players(PLAYERS)
                    .build()
                    .unwrap(),
            )
        });
    });

    group.bench_function("opening_17_actions", |b| {
        b.iter(|| {
            black_box(
                GameBuilder::new(config.clone())
                    .players(PLAYERS)
                    .actions(actions.iter().cloned())
                    .build()
                    .unwrap(),
            )
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: single action and snapshot
// ---------------------------------------------------------------------------

fn bench_single_action(c: &mut Criterion) {
    let mut group = c.benchmark_group("action");
    let game = GameBuilder::new(g1889::config())
        .players(PLAYERS)
        .actions(opening())
        .build()
        .unwrap();

    group.bench_function("process_pass", |b| {
        b.iter(|| {
            let mut g = game.clone();
            g.process_action(black_box(player("D", ActionKind::Pass))).unwrap();
            black_box(g)
        });
    });

    group.bench_function("snapshot", |b| {
        b.iter(|| black_box(game.snapshot().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_replay, bench_single_action);
criterion_main!(benches);
