//! Player credit ledger boundary.

use dashmap::DashMap;
use thiserror::Error;
use wagerhall_types::PlayerId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{player} has {balance} credits, cannot debit {amount}")]
    InsufficientFunds {
        player: PlayerId,
        balance: u64,
        amount: u64,
    },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// External store of player credits.
///
/// Implementations must be safe to call from any thread. The engine never holds a session or
/// cooldown lock while calling into the ledger.
pub trait CreditLedger: Send + Sync {
    fn balance(&self, player: &PlayerId) -> Result<u64, LedgerError>;

    /// Apply a signed change. Debits that would take the balance below zero fail.
    fn adjust(&self, player: &PlayerId, delta: i64) -> Result<(), LedgerError>;
}

/// In-process ledger. Unknown players start with `opening_balance` credits.
#[derive(Debug)]
pub struct MemoryLedger {
    balances: DashMap<PlayerId, u64>,
    opening_balance: u64,
}

impl MemoryLedger {
    pub fn new(opening_balance: u64) -> Self {
        Self {
            balances: DashMap::new(),
            opening_balance,
        }
    }

    pub fn set_balance(&self, player: &PlayerId, balance: u64) {
        self.balances.insert(player.clone(), balance);
    }
}

impl CreditLedger for MemoryLedger {
    fn balance(&self, player: &PlayerId) -> Result<u64, LedgerError> {
        Ok(self
            .balances
            .get(player)
            .map(|entry| *entry.value())
            .unwrap_or(self.opening_balance))
    }

    fn adjust(&self, player: &PlayerId, delta: i64) -> Result<(), LedgerError> {
        let mut balance = self
            .balances
            .entry(player.clone())
            .or_insert(self.opening_balance);
        let amount = delta.unsigned_abs();
        if delta < 0 {
            if *balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    player: player.clone(),
                    balance: *balance,
                    amount,
                });
            }
            *balance -= amount;
        } else {
            *balance = balance.saturating_add(amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_balance_and_adjustments() {
        let ledger = MemoryLedger::new(1_000);
        let alice = PlayerId::from("alice");

        assert_eq!(ledger.balance(&alice), Ok(1_000));
        ledger.adjust(&alice, -250).expect("debit");
        ledger.adjust(&alice, 100).expect("credit");
        assert_eq!(ledger.balance(&alice), Ok(850));
    }

    #[test]
    fn test_overdraft_is_rejected() {
        let ledger = MemoryLedger::new(0);
        let bob = PlayerId::from("bob");
        ledger.set_balance(&bob, 40);

        assert_eq!(
            ledger.adjust(&bob, -50),
            Err(LedgerError::InsufficientFunds {
                player: bob.clone(),
                balance: 40,
                amount: 50,
            })
        );
        assert_eq!(ledger.balance(&bob), Ok(40));
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let ledger = MemoryLedger::new(100);
        let carol = PlayerId::from("carol");

        let accepted = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..10)
                .map(|_| scope.spawn(|| ledger.adjust(&carol, -30).is_ok()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread"))
                .filter(|ok| *ok)
                .count()
        });
        assert_eq!(accepted, 3);
        assert_eq!(ledger.balance(&carol), Ok(10));
    }
}
