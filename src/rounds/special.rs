//! Actions taken by private companies through their abilities.
//!
//! These run outside the turn order of the active round: a company acts
//! whenever its owner chooses, as long as the ability is usable.

use crate::core::{ActionKind, CompanyId, EngineResult, EntityId, GameError};
use crate::game::GameState;
use crate::ledger::{AbilityKind, ShareOwner};

/// Apply an action whose acting entity is `company`.
pub fn process(state: &mut GameState, company: CompanyId, action: &ActionKind) -> EngineResult<()> {
    match action {
        ActionKind::LayTile { hex, tile, rotation } => lay_tile(state, company, hex, tile, *rotation),
        ActionKind::BuyShare { share } => exchange(state, company, share),
        other => Err(GameError::illegal(format!(
            "{} cannot {}",
            state.company(company).sym,
            other.type_name()
        ))),
    }
}

fn lay_tile(state: &mut GameState, company: CompanyId, hex_id: &str, tile_id: &str, rotation: u8) -> EngineResult<()> {
    let hex = state.board.find_hex(hex_id)?;
    let tile = state.board.find_tile(tile_id)?;
    let c = state.company(company);
    let new = state.board.tile(tile);

    let listed = c.active_abilities().any(|a| match a {
        AbilityKind::TileLay { tiles, hexes } => tiles.contains(&new.name) && hexes.iter().any(|h| h == hex_id),
        _ => false,
    });
    if !listed {
        return Err(GameError::illegal(format!(
            "{} cannot lay tile {tile_id} on {hex_id}",
            c.sym
        )));
    }
    if state.board.hex_of_tile(tile).is_some() {
        return Err(GameError::illegal(format!("tile {tile_id} is not available")));
    }

    // Labels are not compared: the listed tiles may carry labels the
    // listed hexes lack (the port tile on a plain town).
    let old = state.board.tile_on(hex);
    if old.color.next() != Some(new.color) || !old.counts_match(new) || !old.preserved_by(&new.rotated(rotation)) {
        return Err(GameError::illegal(format!("{} cannot replace {} on {hex_id}", new.name, old.name)));
    }
    if !state.board.legal_rotations(hex, tile).contains(&rotation) {
        return Err(GameError::illegal(format!("rotation {rotation} is not legal on {hex_id}")));
    }

    let name = new.name.clone();
    state.board.lay(hex, tile, rotation)?;
    state
        .company_mut(company)
        .remove_ability(|a| matches!(a, AbilityKind::TileLay { .. }));
    let c = state.company(company);
    let line = format!("{} lays tile #{name} with rotation {rotation} on {hex_id}", c.name);
    state.log.push(line);
    Ok(())
}

fn exchange(state: &mut GameState, company: CompanyId, share_id: &str) -> EngineResult<()> {
    let (corporation, share) = state.find_share(share_id)?;
    let c = state.company(company);
    let sym = &state.corporation(corporation).sym;

    let exchangeable = c.active_abilities().any(|a| matches!(a, AbilityKind::Exchange { corporation: target } if target == sym));
    if !exchangeable {
        return Err(GameError::illegal(format!("{} cannot be exchanged for {sym}", c.sym)));
    }
    let Some(EntityId::Player(owner)) = c.owner else {
        return Err(GameError::illegal(format!("{} is not owned by a player", c.sym)));
    };

    let corp = state.corporation(corporation);
    if !corp.is_parred() {
        return Err(GameError::illegal(format!("{} has not been parred", corp.sym)));
    }
    let s = &corp.shares[share];
    if s.president || !matches!(s.owner, ShareOwner::Treasury | ShareOwner::Market) {
        return Err(GameError::illegal(format!("{share_id} cannot be exchanged for")));
    }

    state.transfer_share(corporation, share, ShareOwner::Player(owner));
    let line = format!(
        "{} exchanges {} for a share of {}",
        state.players[owner].name,
        state.company(company).name,
        state.corporation(corporation).sym
    );
    state.log.push(line);
    tracing::debug!(company = %state.company(company).sym, share = share_id, "company exchanged");

    state.check_presidency(corporation, owner)?;
    state.check_float(corporation)?;
    state.company_mut(company).close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CorporationId, PlayerId};
    use crate::games::g1889;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn state() -> GameState {
        let names: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        GameState::new(&g1889::config(), &names).unwrap()
    }

    fn lay(hex: &str, tile: &str, rotation: u8) -> ActionKind {
        ActionKind::LayTile {
            hex: hex.into(),
            tile: tile.into(),
            rotation,
        }
    }

    #[test]
    fn test_ferry_lays_port_tile_once() {
        let mut s = state();
        let mf = s.company_id("MF").unwrap();

        // Unowned companies have no usable abilities.
        assert!(matches!(process(&mut s, mf, &lay("J9", "437-0", 0)), Err(GameError::Illegal(_))));

        s.company_mut(mf).owner = Some(EntityId::Player(A));
        assert!(matches!(process(&mut s, mf, &lay("C8", "437-0", 0)), Err(GameError::Illegal(_))));
        assert!(matches!(process(&mut s, mf, &lay("J9", "3-0", 0)), Err(GameError::Illegal(_))));
        assert!(matches!(process(&mut s, mf, &lay("J9", "437-0", 5)), Err(GameError::Illegal(_))));

        let j9 = s.board.hex_index("J9").unwrap();
        let port = s.board.tile_by_id("437-0").unwrap();
        assert_eq!(port.label.as_deref(), Some("P"));
        assert!(!s.board.tile_on(j9).upgrades_to(port, true));

        process(&mut s, mf, &lay("J9", "437-0", 0)).unwrap();
        assert_eq!(s.board.tile_on(j9).name, "437");
        assert!(s.log.contains("Mitsubishi Ferry lays tile #437 with rotation 0 on J9"));
        assert!(!s.company(mf).has_ability(|a| matches!(a, AbilityKind::TileLay { .. })));
        assert!(matches!(process(&mut s, mf, &lay("B11", "437-0", 0)), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_ehime_upgrades_without_phase_check() {
        let mut s = state();
        let er = s.company_id("ER").unwrap();
        s.company_mut(er).owner = Some(EntityId::Player(A));
        // Corporation-only ability.
        assert!(matches!(process(&mut s, er, &lay("C4", "12-0", 1)), Err(GameError::Illegal(_))));

        s.company_mut(er).owner = Some(EntityId::Corporation(CorporationId(1)));
        let c4 = s.board.hex_index("C4").unwrap();
        let rotation = s
            .board
            .legal_rotations(c4, s.board.find_tile("205-0").unwrap())
            .into_iter()
            .find(|&r| s.board.tile_on(c4).preserved_by(&s.board.tile_by_id("205-0").unwrap().rotated(r)))
            .unwrap();
        process(&mut s, er, &lay("C4", "205-0", rotation)).unwrap();
        assert_eq!(s.board.tile_on(c4).name, "205");
    }

    #[test]
    fn test_dougo_exchanges_for_iyo_share() {
        let mut s = state();
        let dr = s.company_id("DR").unwrap();
        let ir = s.corporation_id("IR").unwrap();
        s.company_mut(dr).owner = Some(EntityId::Player(B));
        let buy = ActionKind::BuyShare { share: "IR_1".into() };

        // Not parred yet.
        assert!(matches!(process(&mut s, dr, &buy), Err(GameError::Illegal(_))));
        s.par(A, ir, "0,3").unwrap();
        assert!(matches!(
            process(&mut s, dr, &ActionKind::BuyShare { share: "AR_1".into() }),
            Err(GameError::Illegal(_))
        ));
        assert!(matches!(
            process(&mut s, dr, &ActionKind::BuyShare { share: "IR_0".into() }),
            Err(GameError::Illegal(_))
        ));

        let cash = s.players[B].cash;
        process(&mut s, dr, &buy).unwrap();
        assert_eq!(s.corporation(ir).player_percent(B), 10);
        assert_eq!(s.players[B].cash, cash);
        assert!(s.company(dr).closed);
        assert!(s.log.contains("B exchanges Dougo Railway for a share of IR"));
        assert!(matches!(process(&mut s, dr, &buy), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_other_actions_rejected() {
        let mut s = state();
        let dr = s.company_id("DR").unwrap();
        assert!(matches!(process(&mut s, dr, &ActionKind::Pass), Err(GameError::Illegal(_))));
    }
}
