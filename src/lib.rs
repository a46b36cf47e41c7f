//! An ATM session against an in-memory bank ledger.
//!
//! A [`Bank`] owns every [`Account`]. An [`Atm`] borrows the bank and walks a
//! card through insertion, PIN authentication and account selection before it
//! lets money move. [`run_session`] drives an ATM from lines of text.

mod teller;

pub use teller::*;
