//! Shared helpers for integration tests: action constructors and the
//! scripted four-player opening.

#![allow(dead_code)]

use rust_18xx::games::g1889;
use rust_18xx::{Action, ActionKind, Game, GameBuilder};

pub const PLAYERS: [&str; 4] = ["A", "B", "C", "D"];

pub fn new_game() -> Game {
    GameBuilder::new(g1889::config()).players(PLAYERS).build().unwrap()
}

pub fn replay(actions: Vec<Action>) -> Game {
    GameBuilder::new(g1889::config())
        .players(PLAYERS)
        .actions(actions)
        .build()
        .unwrap()
}

pub fn pass(player: &str) -> Action {
    Action::player(player, ActionKind::Pass)
}

pub fn corp_pass(sym: &str) -> Action {
    Action::corporation(sym, ActionKind::Pass)
}

pub fn buy_company(player: &str, company: &str, price: i64) -> Action {
    Action::player(
        player,
        ActionKind::BuyCompany {
            company: company.into(),
            price,
        },
    )
}

pub fn bid(player: &str, company: &str, price: i64) -> Action {
    Action::player(
        player,
        ActionKind::Bid {
            company: company.into(),
            price,
        },
    )
}

pub fn par(player: &str, corporation: &str, cell: &str) -> Action {
    Action::player(
        player,
        ActionKind::Par {
            corporation: corporation.into(),
            share_price: cell.into(),
        },
    )
}

pub fn buy_share(player: &str, share: &str) -> Action {
    Action::player(player, ActionKind::BuyShare { share: share.into() })
}

pub fn sell(player: &str, shares: &[&str]) -> Action {
    Action::player(
        player,
        ActionKind::SellShares {
            shares: shares.iter().map(|s| s.to_string()).collect(),
        },
    )
}

pub fn buy_train(sym: &str, train: &str, price: i64) -> Action {
    Action::corporation(
        sym,
        ActionKind::BuyTrain {
            train: train.into(),
            price,
        },
    )
}

/// Every private company bought at face value, cheapest first.
pub fn auction() -> Vec<Action> {
    vec![
        buy_company("A", "TR", 20),
        buy_company("B", "MF", 30),
        buy_company("C", "ER", 40),
        buy_company("D", "SMR", 50),
        buy_company("A", "DR", 60),
        buy_company("B", "SIR", 80),
        buy_company("C", "UTF", 150),
    ]
}

/// D pars AR at $100, A B and C each buy one share, everyone passes.
pub fn first_stock_round() -> Vec<Action> {
    vec![
        par("D", "AR", "0,3"),
        buy_share("A", "AR_1"),
        buy_share("B", "AR_2"),
        buy_share("C", "AR_3"),
        pass("D"),
        pass("A"),
        pass("B"),
        pass("C"),
    ]
}

/// AR buys its first train and passes.
pub fn first_operating_round() -> Vec<Action> {
    vec![buy_train("AR", "2-0", 80), corp_pass("AR")]
}

/// The opening up to the start of stock round 2.
pub fn opening() -> Vec<Action> {
    let mut actions = auction();
    actions.extend(first_stock_round());
    actions.extend(first_operating_round());
    actions
}
