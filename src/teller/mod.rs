//! ATM teller module.
//!
//! This module contains the ATM session logic including:
//! - `Atm` - The session state machine
//! - `Bank` - The account ledger
//! - `Account` - A single balance with deposit/withdraw rules
//! - `Card` / `CardRegistry` - Credentials and the named cards a driver can insert
//! - `Command` - Typed user actions parsed from text
//! - `Error` types - Hard failures and per-command processing errors

mod account;
mod atm;
mod bank;
mod card;
mod command;
mod error;
mod session;
pub mod setup;

pub use rust_decimal::Decimal;

pub use account::{Account, AccountId};
pub use atm::{Atm, AtmState};
pub use bank::Bank;
pub use card::{Card, CardRegistry, InvalidPin, Pin};
pub use command::{Command, Outcome};
pub use error::{
    AccountError, AtmError, CommandError, Error, LedgerError, ProcessingError, SessionError,
};
pub use session::{run_session, SessionSummary};
