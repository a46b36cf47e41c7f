use super::error::AccountError;
use super::Decimal;
use serde::Serialize;

pub type AccountId = u64;

/// A single bank account. The balance never goes below zero.
#[derive(Debug, Serialize, PartialEq)]
pub struct Account {
    #[serde(rename = "account")]
    id: AccountId,
    balance: Decimal,
}

impl Account {
    /// Create an account with an opening balance.
    /// Zero is a valid opening balance, negative is not.
    pub fn new(id: AccountId, opening_balance: Decimal) -> Result<Self, AccountError> {
        if opening_balance < Decimal::ZERO {
            return Err(AccountError::NegativeBalance {
                account: id,
                balance: opening_balance,
            });
        }
        Ok(Self {
            id,
            balance: opening_balance.normalize(),
        })
    }

    /// Returns the account ID
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Returns the current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Credit the account and return the new balance.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, AccountError> {
        Self::check_amount(amount)?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(AccountError::BalanceOverflow { account: self.id })?;

        self.balance = balance.normalize();
        #[cfg(debug_assertions)]
        self.assert_invariant();
        Ok(self.balance)
    }

    /// Debit the account and return the new balance.
    /// Fails without touching the balance if funds are insufficient.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, AccountError> {
        Self::check_amount(amount)?;
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                account: self.id,
                available: self.balance,
                requested: amount,
            });
        }

        self.balance = (self.balance - amount).normalize();
        #[cfg(debug_assertions)]
        self.assert_invariant();
        Ok(self.balance)
    }

    fn check_amount(amount: Decimal) -> Result<(), AccountError> {
        if amount <= Decimal::ZERO {
            return Err(AccountError::InvalidAmount { amount });
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn assert_invariant(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: account {} balance ({}) is negative",
            self.id,
            self.balance
        );
    }
}
