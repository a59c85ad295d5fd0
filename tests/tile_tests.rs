//! Tile rotation and upgrade properties over the whole catalog.

use proptest::prelude::*;
use rust_18xx::tiles::{catalog, Tile, TileColor};

fn catalog_tiles() -> Vec<Tile> {
    catalog::names()
        .filter(|(color, _)| *color != TileColor::White)
        .map(|(_, name)| Tile::for_name(name).unwrap())
        .collect()
}

fn any_tile() -> impl Strategy<Value = Tile> {
    let tiles = catalog_tiles();
    (0..tiles.len()).prop_map(move |i| tiles[i].clone())
}

proptest! {
    #[test]
    fn prop_rotations_compose(tile in any_tile(), a in 0u8..6, b in 0u8..6) {
        let twice = tile.rotated(a).rotated(b);
        prop_assert_eq!(twice.rotation(), (a + b) % 6);
        prop_assert_eq!(twice.exits(), tile.exits_at((a + b) % 6));
    }

    #[test]
    fn prop_full_turn_is_identity(tile in any_tile(), a in 0u8..6) {
        let mut turned = tile.clone();
        for _ in 0..6 {
            turned = turned.rotated(a);
        }
        prop_assert_eq!(turned.exits(), tile.exits());
        prop_assert_eq!(turned.rotation(), 0);
    }

    #[test]
    fn prop_rotation_keeps_exit_count(tile in any_tile(), a in 0u8..6) {
        prop_assert_eq!(tile.rotated(a).exits().len(), tile.exits().len());
    }

    #[test]
    fn prop_upgrades_step_one_color(old in any_tile(), new in any_tile()) {
        if old.upgrades_to(&new, true) {
            prop_assert_eq!(old.color.next(), Some(new.color));
            prop_assert_eq!(&old.label, &new.label);
            prop_assert!(old.counts_match(&new));
            prop_assert!((0..6).any(|r| old.preserved_by(&new.rotated(r))));
        }
    }
}

#[test]
fn test_known_upgrades() {
    let tile = |name| Tile::for_name(name).unwrap();

    // Straight track to a green crossing that carries it.
    assert!(tile("9").upgrades_to(&tile("24"), true));
    // A city cannot become plain track.
    assert!(!tile("57").upgrades_to(&tile("24"), true));
    // Kouchi's K label only takes the K tiles.
    assert!(!tile("15").upgrades_to(&tile("465"), true));
    // Yellow cannot jump to brown.
    assert!(!tile("9").upgrades_to(&tile("45"), true));
}

#[test]
fn test_exact_preservation_depends_on_rotation() {
    let straight = Tile::for_name("9").unwrap();
    let crossing = Tile::for_name("24").unwrap();
    let keeps: Vec<u8> = (0..6).filter(|&r| straight.preserved_by(&crossing.rotated(r))).collect();
    assert!(!keeps.is_empty());
    assert!(keeps.len() < 6);
}
