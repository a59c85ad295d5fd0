//! The bank: a finite pool of cash.
//!
//! Payments from the bank are never refused. When its cash runs out the
//! bank is *broken*; that is recorded once and the game carries on with a
//! negative balance.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub cash: i64,
    broken: bool,
}

impl Bank {
    #[must_use]
    pub fn new(cash: i64) -> Self {
        Self { cash, broken: false }
    }

    /// Pay out `amount`. Returns true the first time the bank breaks.
    pub fn spend(&mut self, amount: i64) -> bool {
        self.cash -= amount;
        if self.cash <= 0 && !self.broken {
            self.broken = true;
            return true;
        }
        false
    }

    pub fn receive(&mut self, amount: i64) {
        self.cash += amount;
    }

    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaks_once() {
        let mut bank = Bank::new(100);
        assert!(!bank.spend(60));
        assert!(bank.spend(60));
        assert_eq!(bank.cash, -20);
        assert!(bank.is_broken());

        bank.receive(500);
        assert!(!bank.spend(10));
        assert!(bank.is_broken());
    }
}
