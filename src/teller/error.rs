use crate::teller::account::AccountId;
use crate::teller::atm::AtmState;
use crate::teller::card::InvalidPin;
use crate::teller::Decimal;

/// Top-level error type for bootstrapping and driving a session.
/// Any of these stops the session loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Account error: {0}")]
    Account(#[from] AccountError),
    #[error("Invalid opening balance {value:?}: {reason}")]
    InvalidBalance { value: String, reason: String },
    #[error("Invalid PIN: {0}")]
    InvalidPin(#[from] InvalidPin),
    #[error("Invalid card record {name}: {reason}")]
    InvalidCard { name: String, reason: String },
    #[error("Card {name} is already registered")]
    DuplicateCard { name: String },
}

/// Balance mutation errors. A failed call leaves the balance untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid amount {amount}: must be greater than zero")]
    InvalidAmount { amount: Decimal },

    #[error("Insufficient funds: account {account} has {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Account {account} cannot open with negative balance {balance}")]
    NegativeBalance { account: AccountId, balance: Decimal },

    #[error("Account {account} balance would overflow")]
    BalanceOverflow { account: AccountId },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    #[error("Account {account} already exists")]
    DuplicateAccount { account: AccountId },

    #[error("Account identifiers exhausted")]
    IdsExhausted,
}

/// Sequencing and authorization errors raised by the ATM.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {operation} while {actual} (requires {required})")]
    WrongState {
        operation: &'static str,
        required: AtmState,
        actual: AtmState,
    },

    /// Recoverable: the card stays inserted and the PIN may be retried.
    #[error("Authentication failed: wrong PIN")]
    AuthenticationFailed,

    #[error("Account {account} is not on this card")]
    AccountNotOnCard { account: AccountId },

    #[error(transparent)]
    AccountNotFound(#[from] LedgerError),
}

/// Errors from ATM operations that touch the selected account.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AtmError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Errors turning a line of text into an executable command.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {name}")]
    Unknown { name: String },

    #[error("{command} requires an argument")]
    MissingArgument { command: &'static str },

    #[error("{command} takes no more arguments, got {extra}")]
    UnexpectedArgument { command: &'static str, extra: String },

    #[error("Invalid argument for {command}: {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("Unknown card: {name}")]
    UnknownCard { name: String },
}

/// Soft (end user) errors while processing a single command.
/// These don't stop the session loop, we log, report and continue.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Atm(#[from] AtmError),
}

impl From<SessionError> for ProcessingError {
    fn from(err: SessionError) -> Self {
        ProcessingError::Atm(AtmError::Session(err))
    }
}
