//! Ownership ledger: corporations, certificates, private companies, the
//! stock market and the bank.

pub mod bank;
pub mod company;
pub mod corporation;
pub mod pool;
pub mod share;
pub mod stock_market;

pub use bank::Bank;
pub use company::{Ability, AbilityKind, Company, CompanySpec, OwnerType};
pub use corporation::{Corporation, CorporationSpec};
pub use share::{Share, ShareOwner};
pub use stock_market::{Movement, PriceColor, SharePrice, StockMarket};
