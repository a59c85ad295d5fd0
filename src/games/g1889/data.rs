//! Static tables for 1889 (Shikoku).

use crate::tiles::TileColor;

pub const TITLE: &str = "1889";

pub const BANK_CASH: i64 = 7000;

/// (players, starting cash, certificate limit)
pub const PLAYER_COUNTS: [(usize, i64, usize); 5] = [
    (2, 420, 25),
    (3, 420, 19),
    (4, 420, 14),
    (5, 390, 12),
    (6, 390, 11),
];

pub const MARKET: [&[&str]; 11] = [
    &["75", "80", "90", "100p", "110", "125", "140", "155", "175", "200", "225", "255", "285", "315", "350"],
    &["70", "75", "80", "90p", "100", "110", "125", "140", "155", "175", "200", "225", "255", "285", "315"],
    &["65", "70", "75", "80p", "90", "100", "110", "125", "140", "155", "175", "200"],
    &["60", "65", "70", "75p", "80", "90", "100", "110", "125", "140"],
    &["55", "60", "65", "70p", "75", "80", "90", "100"],
    &["50y", "55", "60", "65p", "70", "75", "80"],
    &["45y", "50y", "55", "60", "65", "70"],
    &["40y", "45y", "50y", "55", "60"],
    &["30o", "40y", "45y", "50y"],
    &["20o", "30o", "40y", "45y"],
    &["10o", "20o", "30o", "40y"],
];

pub const TILES: [(&str, usize); 40] = [
    ("3", 2),
    ("5", 2),
    ("6", 2),
    ("7", 2),
    ("8", 5),
    ("9", 5),
    ("12", 1),
    ("13", 1),
    ("14", 1),
    ("15", 3),
    ("16", 1),
    ("19", 1),
    ("20", 1),
    ("23", 2),
    ("24", 2),
    ("25", 1),
    ("26", 1),
    ("27", 1),
    ("28", 1),
    ("29", 1),
    ("39", 1),
    ("40", 1),
    ("41", 1),
    ("42", 1),
    ("45", 1),
    ("46", 1),
    ("47", 1),
    ("57", 2),
    ("58", 3),
    ("205", 1),
    ("206", 1),
    ("437", 1),
    ("438", 1),
    ("439", 1),
    ("440", 1),
    ("448", 4),
    ("465", 1),
    ("466", 1),
    ("492", 1),
    ("611", 2),
];

/// Preprinted hexes: color, coordinates, and a catalog name or tile code.
pub const HEXES: &[(TileColor, &[&str], &str)] = &[
    (TileColor::White, &["B5", "C8", "D3", "D9", "E8", "H3", "I8", "I10", "J3"], "blank"),
    (TileColor::White, &["B11", "G10", "I12", "J5", "J9"], "town"),
    (TileColor::White, &["A10", "C10", "E2", "F3", "G4", "G12", "H7", "I2", "J11", "K8"], "city"),
    (
        TileColor::White,
        &["A8", "B9", "C6", "D5", "D7", "E4", "E6", "F5", "F7", "G6", "G8", "H9", "H11", "H13"],
        "mtn80",
    ),
    (TileColor::White, &["K6"], "wtr80"),
    (TileColor::White, &["H5", "I6"], "mtn+wtr80"),
    (TileColor::White, &["I4"], "c=r:0;l=H;u=c:80"),
    (TileColor::Yellow, &["C4"], "c=r:20;p=a:2,b:_0"),
    (TileColor::Yellow, &["K4"], "c=r:30;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;l=T"),
    (
        TileColor::Green,
        &["F9"],
        "c=r:30,s:2;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;p=a:5,b:_0;l=K;u=c:80",
    ),
    (TileColor::Gray, &["B3"], "t=r:20;p=a:0,b:_0;p=a:_0,b:5"),
    (TileColor::Gray, &["B7"], "c=r:40,s:2;p=a:1,b:_0;p=a:3,b:_0;p=a:5,b:_0"),
    (TileColor::Gray, &["G14"], "t=r:20;p=a:3,b:_0;p=a:_0,b:4"),
    (TileColor::Gray, &["J7"], "p=a:1,b:5"),
    (TileColor::Red, &["F1"], "o=r:yellow_30|brown_60|diesel_100;p=a:0,b:_0;p=a:1,b:_0"),
    (TileColor::Red, &["J1"], "o=r:yellow_20|brown_40|diesel_80;p=a:0,b:_0;p=a:1,b:_0"),
    (TileColor::Red, &["L7"], "o=r:yellow_20|brown_40|diesel_80;p=a:1,b:_0;p=a:2,b:_0"),
];

pub const LOCATION_NAMES: [(&str, &str); 25] = [
    ("A10", "Sukumo"),
    ("B11", "Nakamura"),
    ("B3", "Yawatahama"),
    ("B7", "Uwajima"),
    ("C10", "Kubokawa"),
    ("C4", "Ohzu"),
    ("E2", "Matsuyama"),
    ("F1", "Imabari"),
    ("F3", "Saijou"),
    ("F9", "Kouchi"),
    ("G10", "Nangoku"),
    ("G12", "Nahari"),
    ("G14", "Muroto"),
    ("G4", "Niihama"),
    ("H7", "Ikeda"),
    ("I12", "Muki"),
    ("I2", "Marugame"),
    ("I4", "Kotohira"),
    ("J1", "Sakaide & Okoyama"),
    ("J11", "Anan"),
    ("J5", "Ritsurin Kouen"),
    ("J9", "Komatsujima"),
    ("K4", "Takamatsu"),
    ("K8", "Tokushima"),
    ("L7", "Naruoto & Awaji"),
];

/// (sym, name, tokens, home)
pub const CORPORATIONS: [(&str, &str, u8, &str); 7] = [
    ("AR", "Awa Railroad", 2, "K8"),
    ("IR", "Iyo Railway", 2, "E2"),
    ("SR", "Sanuki Railway", 2, "I2"),
    ("KO", "Takamatsu & Kotohira Electric Railway", 2, "K4"),
    ("TR", "Tosa Electric Railway", 3, "F9"),
    ("KU", "Tosa Kuroshio Railway", 1, "C10"),
    ("UR", "Uwajima Railway", 3, "B7"),
];

pub const FLOAT_PERCENT: u8 = 50;
