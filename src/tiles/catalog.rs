//! Standard tile catalog.
//!
//! Tiles are looked up by their printed name. White entries are used for
//! preprinted hexes only.

use super::tile::TileColor;

const WHITE: &[(&str, &str)] = &[
    ("blank", ""),
    ("town", "t=r:0"),
    ("city", "c=r:0"),
    ("mtn80", "u=c:80,t:mountain"),
    ("wtr80", "u=c:80,t:water"),
    ("mtn+wtr80", "u=c:80,t:mountain+water"),
];

const YELLOW: &[(&str, &str)] = &[
    ("1", "t=r:10,id:0;p=a:0,b:_0;p=a:_0,b:4;t=r:10,id:1;p=a:1,b:_1;p=a:_1,b:3"),
    ("3", "t=r:10;p=a:0,b:_0;p=a:_0,b:1"),
    ("4", "t=r:10;p=a:0,b:_0;p=a:_0,b:3"),
    ("5", "c=r:20;p=a:0,b:_0;p=a:_0,b:1"),
    ("6", "c=r:20;p=a:0,b:_0;p=a:_0,b:2"),
    ("7", "p=a:0,b:5"),
    ("8", "p=a:0,b:4"),
    ("9", "p=a:0,b:3"),
    ("57", "c=r:20;p=a:0,b:_0;p=a:_0,b:3"),
    ("58", "t=r:10;p=a:0,b:_0;p=a:_0,b:2"),
    ("437", "t=r:30;p=a:0,b:_0;p=a:_0,b:2;l=P"),
    ("438", "c=r:40;p=a:0,b:_0;p=a:_0,b:2;l=H;u=c:80"),
];

const GREEN: &[(&str, &str)] = &[
    ("12", "c=r:30;p=a:0,b:_0;p=a:1,b:_0;p=a:5,b:_0"),
    ("13", "c=r:30;p=a:0,b:_0;p=a:2,b:_0;p=a:4,b:_0"),
    ("14", "c=r:30,s:2;p=a:0,b:_0;p=a:1,b:_0;p=a:3,b:_0;p=a:4,b:_0"),
    ("15", "c=r:30,s:2;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0"),
    ("16", "p=a:0,b:4;p=a:1,b:5"),
    ("18", "p=a:0,b:3;p=a:1,b:2"),
    ("19", "p=a:0,b:3;p=a:1,b:5"),
    ("20", "p=a:0,b:3;p=a:1,b:4"),
    ("23", "p=a:0,b:3;p=a:0,b:4"),
    ("24", "p=a:0,b:3;p=a:0,b:2"),
    ("25", "p=a:0,b:2;p=a:0,b:4"),
    ("26", "p=a:0,b:3;p=a:0,b:5"),
    ("27", "p=a:0,b:3;p=a:0,b:1"),
    ("28", "p=a:0,b:4;p=a:0,b:5"),
    ("29", "p=a:0,b:1;p=a:0,b:2"),
    ("81A", "p=a:0,b:j;p=a:2,b:j;p=a:4,b:j"),
    ("87", "t=r:10;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0"),
    ("205", "c=r:30;p=a:0,b:_0;p=a:1,b:_0;p=a:3,b:_0"),
    ("206", "c=r:30;p=a:0,b:_0;p=a:3,b:_0;p=a:5,b:_0"),
    (
        "298",
        "c=r:40,id:0;c=r:40,id:1;c=r:40,id:2;c=r:40,id:3;l=Chi;\
         p=a:1,b:_0;p=a:0,b:_1;p=a:5,b:_2;p=a:4,b:_3;\
         p=a:_0,b:3;p=a:_2,b:3;p=a:_3,b:3;p=a:_1,b:3",
    ),
    ("439", "c=r:60,s:2;p=a:0,b:_0;p=a:2,b:_0;p=a:4,b:_0;l=H;u=c:80"),
    ("440", "c=r:40,s:2;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;l=T"),
];

const BROWN: &[(&str, &str)] = &[
    ("39", "p=a:0,b:1;p=a:0,b:2;p=a:1,b:2"),
    ("40", "p=a:0,b:2;p=a:0,b:4;p=a:2,b:4"),
    ("41", "p=a:0,b:3;p=a:0,b:4;p=a:3,b:4"),
    ("42", "p=a:0,b:3;p=a:0,b:2;p=a:2,b:3"),
    ("45", "p=a:0,b:3;p=a:0,b:5;p=a:1,b:3;p=a:1,b:5"),
    ("46", "p=a:0,b:1;p=a:0,b:3;p=a:1,b:5;p=a:3,b:5"),
    ("47", "p=a:0,b:2;p=a:0,b:3;p=a:2,b:5;p=a:3,b:5"),
    ("448", "c=r:40,s:2;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0"),
    ("465", "c=r:40,s:2;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;p=a:5,b:_0;l=K"),
    ("466", "c=r:60,s:2;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;l=T"),
    ("492", "c=r:80,s:3;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;p=a:5,b:_0;l=H"),
    ("611", "c=r:40,s:2;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;"),
    ("W5", "c=r:50,s:6;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;p=a:5,b:_0"),
];

const GRAY: &[(&str, &str)] = &[
    ("456", "c=r:70,s:5;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;p=a:5,b:_0"),
    ("639", "c=r:100,s:4;p=a:0,b:_0;p=a:1,b:_0;p=a:2,b:_0;p=a:3,b:_0;p=a:4,b:_0;p=a:5,b:_0"),
];

const TABLES: [(TileColor, &[(&str, &str)]); 5] = [
    (TileColor::White, WHITE),
    (TileColor::Yellow, YELLOW),
    (TileColor::Green, GREEN),
    (TileColor::Brown, BROWN),
    (TileColor::Gray, GRAY),
];

/// Color and code of a catalog tile.
#[must_use]
pub fn lookup(name: &str) -> Option<(TileColor, &'static str)> {
    TABLES.iter().find_map(|(color, table)| {
        table
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| (*color, *code))
    })
}

/// Every catalog name with its color, in catalog order.
pub fn names() -> impl Iterator<Item = (TileColor, &'static str)> {
    TABLES
        .iter()
        .flat_map(|(color, table)| table.iter().map(move |(name, _)| (*color, *name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::decode;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("9"), Some((TileColor::Yellow, "p=a:0,b:3")));
        assert_eq!(lookup("W5").map(|(c, _)| c), Some(TileColor::Brown));
        assert_eq!(lookup("9999"), None);
    }

    #[test]
    fn test_every_catalog_code_decodes() {
        for (color, name) in names() {
            let (_, code) = lookup(name).unwrap();
            assert!(decode(code).is_ok(), "{name} ({color:?}) failed to decode");
        }
    }
}
