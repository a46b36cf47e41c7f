use std::collections::BTreeSet;
use std::fmt;

use super::account::AccountId;
use super::bank::Bank;
use super::card::{Card, Pin};
use super::error::{AtmError, SessionError};
use super::Decimal;

/// The externally visible state of an ATM session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtmState {
    NoCard,
    CardPresent,
    Authenticated,
    AccountSelected,
}

impl fmt::Display for AtmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtmState::NoCard => write!(f, "no card is present"),
            AtmState::CardPresent => write!(f, "card is present"),
            AtmState::Authenticated => write!(f, "card is authenticated"),
            AtmState::AccountSelected => write!(f, "account is selected"),
        }
    }
}

/// Session state together with the data each state owns.
/// A selected account can only exist next to an authenticated card.
#[derive(Debug, Clone, Copy)]
enum Session<'c> {
    NoCard,
    CardPresent { card: &'c Card },
    Authenticated { card: &'c Card },
    AccountSelected { card: &'c Card, account: AccountId },
}

impl Session<'_> {
    fn state(&self) -> AtmState {
        match self {
            Session::NoCard => AtmState::NoCard,
            Session::CardPresent { .. } => AtmState::CardPresent,
            Session::Authenticated { .. } => AtmState::Authenticated,
            Session::AccountSelected { .. } => AtmState::AccountSelected,
        }
    }
}

/// An automated teller machine driving one card session at a time.
///
/// The ATM borrows the bank's ledger for its whole lifetime and the inserted
/// card until it is ejected. Every operation checks the session state first;
/// money moves only through the selected account.
#[derive(Debug)]
pub struct Atm<'b, 'c> {
    bank: &'b mut Bank,
    session: Session<'c>,
}

impl<'b, 'c> Atm<'b, 'c> {
    pub fn new(bank: &'b mut Bank) -> Self {
        log::trace!("ATM initialized");
        Self {
            bank,
            session: Session::NoCard,
        }
    }

    pub fn state(&self) -> AtmState {
        self.session.state()
    }

    /// Returns the selected account, if the session has one
    pub fn selected_account(&self) -> Option<AccountId> {
        match self.session {
            Session::AccountSelected { account, .. } => Some(account),
            _ => None,
        }
    }

    pub fn insert_card(&mut self, card: &'c Card) -> Result<(), SessionError> {
        if !matches!(self.session, Session::NoCard) {
            return Err(self.wrong_state("insert card", AtmState::NoCard));
        }
        self.transition(Session::CardPresent { card });
        Ok(())
    }

    /// Authenticate the inserted card. A wrong PIN keeps the card inserted
    /// so the caller may retry.
    pub fn authenticate(&mut self, pin: &Pin) -> Result<(), SessionError> {
        let Session::CardPresent { card } = self.session else {
            return Err(self.wrong_state("authenticate", AtmState::CardPresent));
        };
        if !card.check_pin(pin) {
            log::warn!("Authentication failed, card stays inserted");
            return Err(SessionError::AuthenticationFailed);
        }
        self.transition(Session::Authenticated { card });
        Ok(())
    }

    pub fn list_accounts(&self) -> Result<&'c BTreeSet<AccountId>, SessionError> {
        let Session::Authenticated { card } = self.session else {
            return Err(self.wrong_state("list accounts", AtmState::Authenticated));
        };
        Ok(card.accounts())
    }

    /// Select one of the card's accounts, resolving it through the bank.
    pub fn select_account(&mut self, id: AccountId) -> Result<(), SessionError> {
        let Session::Authenticated { card } = self.session else {
            return Err(self.wrong_state("select account", AtmState::Authenticated));
        };
        if !card.has_account(id) {
            return Err(SessionError::AccountNotOnCard { account: id });
        }
        self.bank.get_account(id)?;

        self.transition(Session::AccountSelected { card, account: id });
        Ok(())
    }

    /// Withdraw from the selected account and return its new balance.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, AtmError> {
        let account = self.selected("withdraw")?;
        let balance = self
            .bank
            .get_account_mut(account)
            .map_err(SessionError::from)?
            .withdraw(amount)?;

        log::trace!("[withdraw] account={account} amount={amount} -> new_balance={balance}");
        Ok(balance)
    }

    /// Deposit into the selected account and return its new balance.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, AtmError> {
        let account = self.selected("deposit")?;
        let balance = self
            .bank
            .get_account_mut(account)
            .map_err(SessionError::from)?
            .deposit(amount)?;

        log::trace!("[deposit] account={account} amount={amount} -> new_balance={balance}");
        Ok(balance)
    }

    pub fn balance(&self) -> Result<Decimal, SessionError> {
        let account = self.selected("check balance")?;
        Ok(self.bank.get_account(account)?.balance())
    }

    /// Release the card and any selection. Valid in every state.
    pub fn eject(&mut self) {
        self.transition(Session::NoCard);
    }

    fn selected(&self, operation: &'static str) -> Result<AccountId, SessionError> {
        match self.session {
            Session::AccountSelected { account, .. } => Ok(account),
            _ => Err(self.wrong_state(operation, AtmState::AccountSelected)),
        }
    }

    fn wrong_state(&self, operation: &'static str, required: AtmState) -> SessionError {
        SessionError::WrongState {
            operation,
            required,
            actual: self.state(),
        }
    }

    fn transition(&mut self, next: Session<'c>) {
        log::trace!("[atm] {:?} -> {:?}", self.state(), next.state());
        self.session = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teller::error::{AccountError, LedgerError};
    use rust_decimal_macros::dec;

    fn pin(digits: &str) -> Pin {
        digits.parse().unwrap()
    }

    /// Accounts 1 (balance 10) and 2 (balance 20)
    fn bank() -> Bank {
        let mut bank = Bank::new();
        bank.open_account(dec!(10)).unwrap();
        bank.open_account(dec!(20)).unwrap();
        bank
    }

    fn wrong_state(operation: &'static str, required: AtmState, actual: AtmState) -> SessionError {
        SessionError::WrongState {
            operation,
            required,
            actual,
        }
    }

    #[test]
    fn test_initial_state_is_no_card() {
        let mut bank = bank();
        let atm = Atm::new(&mut bank);
        assert_eq!(atm.state(), AtmState::NoCard);
        assert_eq!(atm.selected_account(), None);
    }

    #[test]
    fn test_full_session_flow() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);

        atm.insert_card(&card).unwrap();
        assert_eq!(atm.state(), AtmState::CardPresent);
        atm.authenticate(&pin("1234")).unwrap();
        assert_eq!(atm.state(), AtmState::Authenticated);
        atm.select_account(1).unwrap();
        assert_eq!(atm.state(), AtmState::AccountSelected);
        assert_eq!(atm.selected_account(), Some(1));

        assert_eq!(atm.balance().unwrap(), dec!(10));
        assert_eq!(atm.deposit(dec!(1)).unwrap(), dec!(11));
        assert_eq!(atm.withdraw(dec!(4)).unwrap(), dec!(7));
        atm.eject();

        assert_eq!(bank.get_account(1).unwrap().balance(), dec!(7));
        assert_eq!(bank.get_account(2).unwrap().balance(), dec!(20));
    }

    #[test]
    fn test_insert_card_twice_fails() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let other = Card::new(pin("5555"), [2]);
        let mut atm = Atm::new(&mut bank);

        atm.insert_card(&card).unwrap();
        assert_eq!(
            atm.insert_card(&other),
            Err(wrong_state("insert card", AtmState::NoCard, AtmState::CardPresent))
        );
        // First card is still the one inserted
        atm.authenticate(&pin("1234")).unwrap();
    }

    #[test]
    fn test_authenticate_without_card_fails() {
        let mut bank = bank();
        let mut atm = Atm::new(&mut bank);
        assert_eq!(
            atm.authenticate(&pin("1234")),
            Err(wrong_state("authenticate", AtmState::CardPresent, AtmState::NoCard))
        );
    }

    #[test]
    fn test_authenticate_twice_fails() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();

        assert!(matches!(
            atm.authenticate(&pin("1234")),
            Err(SessionError::WrongState { .. })
        ));
        assert_eq!(atm.state(), AtmState::Authenticated);
    }

    #[test]
    fn test_wrong_pin_allows_retry() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();

        assert_eq!(
            atm.authenticate(&pin("9999")),
            Err(SessionError::AuthenticationFailed)
        );
        assert_eq!(atm.state(), AtmState::CardPresent);

        atm.authenticate(&pin("1234")).unwrap();
        assert_eq!(atm.state(), AtmState::Authenticated);
    }

    #[test]
    fn test_list_accounts_requires_authentication() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [2, 1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();

        assert!(atm.list_accounts().is_err());
        atm.authenticate(&pin("1234")).unwrap();
        let accounts: Vec<AccountId> = atm.list_accounts().unwrap().iter().copied().collect();
        assert_eq!(accounts, vec![1, 2]);
    }

    #[test]
    fn test_select_account_not_on_card() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();

        assert_eq!(
            atm.select_account(2),
            Err(SessionError::AccountNotOnCard { account: 2 })
        );
        assert_eq!(atm.state(), AtmState::Authenticated);
        assert_eq!(atm.selected_account(), None);
    }

    #[test]
    fn test_select_account_missing_from_bank() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1, 999]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();

        assert_eq!(
            atm.select_account(999),
            Err(SessionError::AccountNotFound(LedgerError::AccountNotFound {
                account: 999
            }))
        );
        assert_eq!(atm.state(), AtmState::Authenticated);
    }

    #[test]
    fn test_select_account_before_authentication_fails() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();

        assert_eq!(
            atm.select_account(1),
            Err(wrong_state(
                "select account",
                AtmState::Authenticated,
                AtmState::CardPresent
            ))
        );
    }

    #[test]
    fn test_money_operations_require_selected_account() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();

        assert_eq!(
            atm.withdraw(dec!(1)),
            Err(AtmError::Session(wrong_state(
                "withdraw",
                AtmState::AccountSelected,
                AtmState::Authenticated
            )))
        );
        assert!(matches!(
            atm.deposit(dec!(1)),
            Err(AtmError::Session(SessionError::WrongState { .. }))
        ));
        assert!(matches!(
            atm.balance(),
            Err(SessionError::WrongState { .. })
        ));
        atm.eject();

        assert_eq!(bank.get_account(1).unwrap().balance(), dec!(10));
    }

    #[test]
    fn test_account_errors_propagate_and_keep_selection() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);
        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();
        atm.select_account(1).unwrap();

        assert_eq!(
            atm.withdraw(dec!(22)),
            Err(AtmError::Account(AccountError::InsufficientFunds {
                account: 1,
                available: dec!(10),
                requested: dec!(22),
            }))
        );
        assert_eq!(
            atm.deposit(dec!(0)),
            Err(AtmError::Account(AccountError::InvalidAmount {
                amount: dec!(0)
            }))
        );
        assert_eq!(atm.state(), AtmState::AccountSelected);
        assert_eq!(atm.balance().unwrap(), dec!(10));
    }

    #[test]
    fn test_eject_from_every_state() {
        let mut bank = bank();
        let card = Card::new(pin("1234"), [1]);
        let mut atm = Atm::new(&mut bank);

        atm.eject();
        assert_eq!(atm.state(), AtmState::NoCard);

        atm.insert_card(&card).unwrap();
        atm.eject();
        assert_eq!(atm.state(), AtmState::NoCard);

        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();
        atm.eject();
        assert_eq!(atm.state(), AtmState::NoCard);

        atm.insert_card(&card).unwrap();
        atm.authenticate(&pin("1234")).unwrap();
        atm.select_account(1).unwrap();
        atm.eject();
        assert_eq!(atm.state(), AtmState::NoCard);
        assert_eq!(atm.selected_account(), None);

        // A fresh session has to authenticate again
        atm.insert_card(&card).unwrap();
        assert!(atm.balance().is_err());
    }

    #[test]
    fn test_wrong_state_message() {
        let err = wrong_state("withdraw", AtmState::AccountSelected, AtmState::NoCard);
        assert_eq!(
            err.to_string(),
            "Cannot withdraw while no card is present (requires account is selected)"
        );
    }
}
