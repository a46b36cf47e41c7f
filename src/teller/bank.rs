use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;

use super::account::{Account, AccountId};
use super::error::{Error, LedgerError};
use super::Decimal;

/// The bank's ledger: sole owner of every account.
///
/// Accounts are created once and never removed. Identifiers come from a
/// monotonically increasing generator and are never reused.
#[derive(Debug, Default)]
pub struct Bank {
    /// Maps account ID to its account state
    accounts: HashMap<AccountId, Account>,
    /// Last identifier handed out by `next_account_id`
    last_issued_id: AccountId,
}

impl Bank {
    /// Create an empty ledger
    pub fn new() -> Self {
        log::trace!("Bank initialized");
        Self::default()
    }

    /// Issue a fresh account identifier. The first one is 1.
    /// Once the identifier space is used up every call fails; nothing wraps.
    pub fn next_account_id(&mut self) -> Result<AccountId, LedgerError> {
        self.last_issued_id = self
            .last_issued_id
            .checked_add(1)
            .ok_or(LedgerError::IdsExhausted)?;
        Ok(self.last_issued_id)
    }

    /// Register an account under its own identifier.
    /// An existing entry is never overwritten.
    pub fn add_account(&mut self, account: Account) -> Result<(), LedgerError> {
        match self.accounts.entry(account.id()) {
            Entry::Occupied(entry) => Err(LedgerError::DuplicateAccount {
                account: *entry.key(),
            }),
            Entry::Vacant(entry) => {
                log::debug!(
                    "Registered account {} with balance {}",
                    account.id(),
                    account.balance()
                );
                entry.insert(account);
                Ok(())
            }
        }
    }

    /// Issue an identifier, create the account and register it.
    /// The identifier is consumed even if a later step fails.
    pub fn open_account(&mut self, opening_balance: Decimal) -> Result<AccountId, Error> {
        let id = self.next_account_id()?;
        self.add_account(Account::new(id, opening_balance)?)?;
        Ok(id)
    }

    pub fn get_account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts
            .get(&id)
            .ok_or(LedgerError::AccountNotFound { account: id })
    }

    pub fn get_account_mut(&mut self, id: AccountId) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound { account: id })
    }

    /// Returns the number of accounts in the ledger
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Write every account to any sink as CSV (`account,balance`), ordered by ID.
    /// The CSV writer is buffered, don't wrap `writer` in a `BufWriter`.
    pub fn export_accounts<W: Write>(&self, writer: W) -> Result<(), Error> {
        log::info!("Exporting {} accounts", self.accounts.len());

        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.id());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for account in accounts {
            csv_writer.serialize(account)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
