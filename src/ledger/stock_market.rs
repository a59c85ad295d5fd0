//! The stock market grid.
//!
//! A ragged 2-D grid of price cells parsed from codes: a number with an
//! optional suffix (`p` par cell, `y` yellow, `o` orange, `b` brown), or
//! an empty string for a hole in the grid. Each cell keeps the
//! corporations standing on it in arrival order, which breaks operating
//! order ties.
//!
//! ## Movement
//!
//! - Up and down stay in the column and do nothing at the edge.
//! - Right falls back to up at the end of a row.
//! - Left falls back to down at the start of a row.

use serde::{Deserialize, Serialize};

use crate::core::{CorporationId, EngineResult, GameError};

use super::corporation::Corporation;

/// Color zone of a price cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceColor {
    White,
    Yellow,
    Orange,
    Brown,
}

/// One cell of the market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePrice {
    pub row: usize,
    pub column: usize,
    pub price: i64,
    pub color: PriceColor,
    pub par: bool,
    pub corporations: Vec<CorporationId>,
}

impl SharePrice {
    fn parse(row: usize, column: usize, code: &str) -> EngineResult<Option<Self>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        let split = code.find(|c: char| !c.is_ascii_digit()).unwrap_or(code.len());
        let (number, suffix) = code.split_at(split);
        let price = number
            .parse()
            .map_err(|_| GameError::config(format!("bad market cell `{code}`")))?;
        let (color, par) = match suffix {
            "" => (PriceColor::White, false),
            "p" => (PriceColor::White, true),
            "y" => (PriceColor::Yellow, false),
            "o" => (PriceColor::Orange, false),
            "b" => (PriceColor::Brown, false),
            _ => return Err(GameError::config(format!("bad market cell `{code}`"))),
        };

        Ok(Some(Self {
            row,
            column,
            price,
            color,
            par,
            corporations: Vec::new(),
        }))
    }

    /// Stable id `row,column`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{},{}", self.row, self.column)
    }

    #[must_use]
    pub fn coordinates(&self) -> (usize, usize) {
        (self.row, self.column)
    }
}

/// A price movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    Up,
    Down,
    Left,
    Right,
}

/// The market grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMarket {
    rows: Vec<Vec<Option<SharePrice>>>,
}

impl StockMarket {
    /// Parse rows of cell codes.
    ///
    /// ```
    /// use rust_18xx::ledger::{PriceColor, StockMarket};
    ///
    /// let market = StockMarket::new(&[
    ///     vec!["75".into(), "100p".into()],
    ///     vec!["50y".into(), "".into()],
    /// ]).unwrap();
    /// assert_eq!(market.cell((0, 1)).unwrap().price, 100);
    /// assert_eq!(market.cell((1, 0)).unwrap().color, PriceColor::Yellow);
    /// assert!(market.cell((1, 1)).is_none());
    /// ```
    pub fn new(codes: &[Vec<String>]) -> EngineResult<Self> {
        let rows = codes
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, code)| SharePrice::parse(r, c, code))
                    .collect::<EngineResult<Vec<_>>>()
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let market = Self { rows };
        if market.par_prices().is_empty() {
            return Err(GameError::config("stock market has no par cells"));
        }
        Ok(market)
    }

    #[must_use]
    pub fn cell(&self, (row, column): (usize, usize)) -> Option<&SharePrice> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    fn cell_mut(&mut self, (row, column): (usize, usize)) -> Option<&mut SharePrice> {
        self.rows.get_mut(row)?.get_mut(column)?.as_mut()
    }

    /// Look up a cell by its `row,column` id.
    #[must_use]
    pub fn cell_by_id(&self, id: &str) -> Option<&SharePrice> {
        let (row, column) = id.split_once(',')?;
        self.cell((row.trim().parse().ok()?, column.trim().parse().ok()?))
    }

    /// Par cells, top row first.
    #[must_use]
    pub fn par_prices(&self) -> Vec<&SharePrice> {
        self.rows
            .iter()
            .flatten()
            .flatten()
            .filter(|cell| cell.par)
            .collect()
    }

    /// Lowest par price; the price of certificates of unparred
    /// corporations.
    #[must_use]
    pub fn min_par_price(&self) -> i64 {
        self.par_prices().iter().map(|c| c.price).min().unwrap_or(0)
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &SharePrice> {
        self.rows.iter().flatten().flatten()
    }

    /// Where a movement from `from` ends up.
    #[must_use]
    pub fn target(&self, from: (usize, usize), movement: Movement) -> (usize, usize) {
        let (row, column) = from;
        let up = || {
            row.checked_sub(1)
                .filter(|&r| self.cell((r, column)).is_some())
                .map_or(from, |r| (r, column))
        };
        let down = || {
            if self.cell((row + 1, column)).is_some() {
                (row + 1, column)
            } else {
                from
            }
        };

        match movement {
            Movement::Up => up(),
            Movement::Down => down(),
            Movement::Right => {
                if self.cell((row, column + 1)).is_some() {
                    (row, column + 1)
                } else {
                    up()
                }
            }
            Movement::Left => match column.checked_sub(1) {
                Some(c) if self.cell((row, c)).is_some() => (row, c),
                _ => down(),
            },
        }
    }

    /// Par a corporation at the cell `id`.
    pub fn set_par(&mut self, corporation: &mut Corporation, id: &str) -> EngineResult<()> {
        if corporation.par_price.is_some() {
            return Err(GameError::illegal(format!("{} is already parred", corporation.sym)));
        }
        let cell = self
            .cell_by_id(id)
            .ok_or_else(|| GameError::unknown("share price", id))?;
        if !cell.par {
            return Err(GameError::illegal(format!("{} is not a par price", cell.id())));
        }

        let position = cell.coordinates();
        corporation.par_price = Some(cell.price);
        corporation.share_price = Some(position);
        if let Some(cell) = self.cell_mut(position) {
            cell.corporations.push(corporation.id);
        }
        Ok(())
    }

    /// Move a parred corporation's price. Returns true if it changed cell.
    pub fn shift(&mut self, corporation: &mut Corporation, movement: Movement) -> bool {
        let Some(from) = corporation.share_price else {
            return false;
        };
        let to = self.target(from, movement);
        if to == from {
            return false;
        }

        if let Some(cell) = self.cell_mut(from) {
            cell.corporations.retain(|&c| c != corporation.id);
        }
        if let Some(cell) = self.cell_mut(to) {
            cell.corporations.push(corporation.id);
        }
        corporation.share_price = Some(to);
        true
    }

    /// Current per-10% price of a corporation.
    #[must_use]
    pub fn price_of(&self, corporation: &Corporation) -> Option<i64> {
        corporation
            .share_price
            .and_then(|p| self.cell(p))
            .map(|c| c.price)
    }

    /// Position of a corporation within its cell's arrival order.
    #[must_use]
    pub fn position_in_cell(&self, corporation: &Corporation) -> usize {
        corporation
            .share_price
            .and_then(|p| self.cell(p))
            .and_then(|c| c.corporations.iter().position(|&id| id == corporation.id))
            .unwrap_or(usize::MAX)
    }
}
