//! Share movements: par, buy, sell, presidency and float.
//!
//! All certificate movements go through [`GameState::transfer_share`].
//! Every movement that can change who leads a corporation ends with a
//! presidency check, so the president certificate always sits with the
//! largest holder.

use rustc_hash::FxHashSet;

use crate::core::{CorporationId, EngineResult, EntityId, GameError, PlayerId};
use crate::game::GameState;

use super::share::ShareOwner;
use super::stock_market::Movement;

impl GameState {
    /// Reassign a certificate. No cash moves.
    pub fn transfer_share(&mut self, corporation: CorporationId, share: usize, owner: ShareOwner) {
        self.corporation_mut(corporation).shares[share].owner = owner;
    }

    /// Par `corporation` at market cell `cell` and sell the president
    /// certificate to `player`.
    pub fn par(&mut self, player: PlayerId, corporation: CorporationId, cell: &str) -> EngineResult<()> {
        let market = &mut self.market;
        let c = &mut self.corporations[corporation.index()];
        market.set_par(c, cell)?;

        let president = c
            .shares
            .iter()
            .position(|s| s.president)
            .ok_or_else(|| GameError::invariant(format!("{} has no president certificate", c.sym)))?;
        let cost = self.share_cost(corporation, president);
        self.pay_bank(EntityId::Player(player), cost)?;
        self.transfer_share(corporation, president, ShareOwner::Player(player));

        let par = self.corporation(corporation).par_price.unwrap_or_default();
        self.log.push(format!(
            "{} pars {} at ${par}",
            self.players[player].name,
            self.corporation(corporation).sym
        ));
        self.check_float(corporation)
    }

    /// Buy a certificate from the treasury (at par) or the market (at the
    /// current price). Returns the price paid.
    pub fn buy_share(&mut self, player: PlayerId, corporation: CorporationId, share: usize) -> EngineResult<i64> {
        let (owner, percent, president, id) = {
            let s = &self.corporation(corporation).shares[share];
            (s.owner, s.percent, s.president, s.id.clone())
        };
        if president {
            return Err(GameError::illegal(format!("{id} is only sold by parring")));
        }
        if !self.corporation(corporation).is_parred() {
            return Err(GameError::illegal(format!(
                "{} has not been parred",
                self.corporation(corporation).sym
            )));
        }
        let from = match owner {
            ShareOwner::Treasury => "IPO",
            ShareOwner::Market => "market",
            ShareOwner::Player(_) => return Err(GameError::illegal(format!("{id} is held by a player"))),
        };

        let price = self.share_cost(corporation, share);
        self.pay_bank(EntityId::Player(player), price)?;
        self.transfer_share(corporation, share, ShareOwner::Player(player));
        self.log.push(format!(
            "{} buys a {percent}% share of {} from the {from} for ${price}",
            self.players[player].name,
            self.corporation(corporation).sym
        ));

        self.check_presidency(corporation, player)?;
        self.check_float(corporation)?;
        Ok(price)
    }

    /// Percent of `corporation` that would be in the market after selling
    /// `percent` more.
    #[must_use]
    pub fn market_percent_after(&self, corporation: CorporationId, percent: u8) -> u8 {
        self.corporation(corporation)
            .percent_of(ShareOwner::Market)
            .saturating_add(percent)
    }

    /// Someone other than `seller` could take the presidency if `seller`
    /// sold `percent`.
    #[must_use]
    pub fn successor(&self, corporation: CorporationId, seller: PlayerId, percent: u8) -> Option<PlayerId> {
        let c = self.corporation(corporation);
        let remaining = c.player_percent(seller).saturating_sub(percent);
        self.priority
            .iter()
            .copied()
            .filter(|&p| p != seller)
            .map(|p| (p, c.player_percent(p)))
            .filter(|&(_, pct)| pct > 10 && pct >= remaining)
            .max_by_key(|&(p, pct)| (pct, std::cmp::Reverse(self.seat_distance(seller, p))))
            .map(|(p, _)| p)
    }

    /// Check that `player` may sell `shares` of `corporation` to the
    /// market: each certificate listed once and held by the player, the
    /// market limit respected, and a successor available for the
    /// president certificate. Returns the percent sold.
    pub fn check_sale(&self, player: PlayerId, corporation: CorporationId, shares: &[usize]) -> EngineResult<u8> {
        if shares.is_empty() {
            return Err(GameError::illegal("no shares to sell"));
        }
        let c = self.corporation(corporation);
        let owner = ShareOwner::Player(player);
        let mut seen = FxHashSet::default();
        let mut percent = 0u8;
        for &i in shares {
            let s = c
                .shares
                .get(i)
                .ok_or_else(|| GameError::invariant(format!("{} has no certificate {i}", c.sym)))?;
            if !seen.insert(i) {
                return Err(GameError::illegal(format!("{} is listed more than once", s.id)));
            }
            if s.owner != owner {
                return Err(GameError::illegal(format!(
                    "{} does not hold {}",
                    self.players[player].name, s.id
                )));
            }
            percent = percent
                .checked_add(s.percent)
                .ok_or_else(|| GameError::invariant(format!("{} certificates exceed 255%", c.sym)))?;
        }

        let limit = self.rules.market_share_limit;
        if self.market_percent_after(corporation, percent) > limit {
            return Err(GameError::illegal(format!("the market may hold at most {limit}% of {}", c.sym)));
        }
        if shares.iter().any(|&i| c.shares[i].president) && self.successor(corporation, player, percent).is_none() {
            return Err(GameError::illegal(format!("nobody can take the presidency of {}", c.sym)));
        }
        Ok(percent)
    }

    /// Sell `player`'s certificates `shares` of `corporation` to the
    /// market. Returns the cash received.
    pub fn sell_shares(&mut self, player: PlayerId, corporation: CorporationId, shares: &[usize]) -> EngineResult<i64> {
        let percent = self.check_sale(player, corporation, shares)?;
        let mut selling: Vec<usize> = shares.to_vec();

        if let Some(pos) = selling.iter().position(|&i| self.corporation(corporation).shares[i].president) {
            let successor = self
                .successor(corporation, player, percent)
                .ok_or_else(|| GameError::invariant("presidency successor vanished"))?;
            let received = self.swap_president(corporation, player, successor)?;
            selling.remove(pos);
            selling.extend(received);
        }

        let price = self
            .market_price(corporation)
            .ok_or_else(|| GameError::invariant("selling shares of an unparred corporation"))?;
        let amount = price * i64::from(percent) / 10;
        for &i in &selling {
            self.transfer_share(corporation, i, ShareOwner::Market);
        }
        self.receive_from_bank(EntityId::Player(player), amount);
        self.log.push(format!(
            "{} sells {} share{} of {} and receives ${amount}",
            self.players[player].name,
            selling.len(),
            if selling.len() == 1 { "" } else { "s" },
            self.corporation(corporation).sym
        ));

        for _ in &selling {
            self.move_price(corporation, Movement::Down);
        }
        self.check_presidency(corporation, player)?;
        Ok(amount)
    }

    /// Hand the presidency to whoever strictly exceeds the president. Ties
    /// go to the holder closest after `actor` in seat order.
    pub fn check_presidency(&mut self, corporation: CorporationId, actor: PlayerId) -> EngineResult<()> {
        let c = self.corporation(corporation);
        let Some(president) = c.president() else {
            return Ok(());
        };
        let held = c.player_percent(president);
        let challenger = self
            .priority
            .iter()
            .copied()
            .filter(|&p| p != president)
            .map(|p| (p, c.player_percent(p)))
            .filter(|&(_, pct)| pct > held)
            .max_by_key(|&(p, pct)| (pct, std::cmp::Reverse(self.seat_distance(actor, p))))
            .map(|(p, _)| p);

        if let Some(challenger) = challenger {
            self.swap_president(corporation, president, challenger)?;
        }
        Ok(())
    }

    /// Exchange the president certificate for ordinary certificates of
    /// equal percent. Returns the indices `from` received.
    fn swap_president(&mut self, corporation: CorporationId, from: PlayerId, to: PlayerId) -> EngineResult<Vec<usize>> {
        let c = self.corporation(corporation);
        let president = c
            .shares
            .iter()
            .position(|s| s.president)
            .ok_or_else(|| GameError::invariant(format!("{} has no president certificate", c.sym)))?;
        let needed = c.shares[president].percent;

        let mut given = Vec::new();
        let mut percent = 0;
        for (i, s) in c.shares.iter().enumerate() {
            if percent >= needed {
                break;
            }
            if !s.president && s.owner == ShareOwner::Player(to) {
                given.push(i);
                percent += s.percent;
            }
        }
        if percent < needed {
            return Err(GameError::invariant(format!(
                "{} cannot exchange {needed}% for the presidency of {}",
                self.players[to].name, c.sym
            )));
        }

        for &i in &given {
            self.transfer_share(corporation, i, ShareOwner::Player(from));
        }
        self.transfer_share(corporation, president, ShareOwner::Player(to));
        tracing::debug!(corporation = %self.corporation(corporation).sym, from = from.0, to = to.0, "presidency swapped");
        self.log.push(format!(
            "{} becomes the president of {}",
            self.players[to].name,
            self.corporation(corporation).sym
        ));
        Ok(given)
    }

    /// Float the corporation once enough certificates have left the
    /// treasury: full capitalisation from the bank and the home token.
    pub fn check_float(&mut self, corporation: CorporationId) -> EngineResult<()> {
        let c = self.corporation(corporation);
        if c.floated || c.sold_percent() < c.float_percent {
            return Ok(());
        }
        let Some(par) = c.par_price else {
            return Ok(());
        };
        let home = self.board.find_hex(&c.coordinates)?;

        self.corporation_mut(corporation).floated = true;
        self.receive_from_bank(EntityId::Corporation(corporation), par * 10);
        let sym = self.corporation(corporation).sym.clone();
        tracing::info!(corporation = %sym, capital = par * 10, "corporation floated");
        self.log.push(format!("{sym} floats"));
        self.log.push(format!("{sym} receives ${}", par * 10));

        self.board.place_home_token(home, corporation)?;
        self.corporation_mut(corporation).tokens_used += 1;
        self.log.push(format!("{sym} places a token on {}", self.board.hex(home).id));
        Ok(())
    }
}
