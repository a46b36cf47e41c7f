use std::fmt;
use std::str::FromStr;

use super::account::AccountId;
use super::atm::Atm;
use super::card::{CardRegistry, Pin};
use super::error::{CommandError, ProcessingError};
use super::Decimal;

/// A validated user action, ready to run against an [`Atm`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InsertCard { card: String },
    Authenticate { pin: Pin },
    ListAccounts,
    SelectAccount { account: AccountId },
    Withdraw { amount: Decimal },
    Deposit { amount: Decimal },
    Balance,
    Eject,
}

impl FromStr for Command {
    type Err = CommandError;

    /// Parse one line such as `withdraw 20` or `insert_card card1`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        match name {
            "insert_card" | "add_card" => Ok(Command::InsertCard {
                card: single_argument("insert_card", &args)?.to_owned(),
            }),
            "authenticate" => Ok(Command::Authenticate {
                pin: parse_argument("authenticate", &args)?,
            }),
            "list_accounts" | "list_account" => {
                no_arguments("list_accounts", &args)?;
                Ok(Command::ListAccounts)
            }
            "select_account" => Ok(Command::SelectAccount {
                account: parse_argument("select_account", &args)?,
            }),
            "withdraw" | "withdrawal" => Ok(Command::Withdraw {
                amount: parse_argument("withdraw", &args)?,
            }),
            "deposit" => Ok(Command::Deposit {
                amount: parse_argument("deposit", &args)?,
            }),
            "balance" | "get_balance" => {
                no_arguments("balance", &args)?;
                Ok(Command::Balance)
            }
            "eject" => {
                no_arguments("eject", &args)?;
                Ok(Command::Eject)
            }
            _ => Err(CommandError::Unknown {
                name: name.to_owned(),
            }),
        }
    }
}

fn single_argument<'a>(command: &'static str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    match args {
        [] => Err(CommandError::MissingArgument { command }),
        [arg] => Ok(*arg),
        [_, extra @ ..] => Err(CommandError::UnexpectedArgument {
            command,
            extra: extra.join(" "),
        }),
    }
}

fn parse_argument<T: FromStr>(command: &'static str, args: &[&str]) -> Result<T, CommandError> {
    let value = single_argument(command, args)?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: value.to_owned(),
    })
}

fn no_arguments(command: &'static str, args: &[&str]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::UnexpectedArgument {
            command,
            extra: args.join(" "),
        })
    }
}

/// What a successful command produced, for the caller to display.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    CardInserted { card: String },
    Authenticated,
    Accounts(Vec<AccountId>),
    AccountSelected { account: AccountId },
    Withdrawn { amount: Decimal, balance: Decimal },
    Deposited { amount: Decimal, balance: Decimal },
    Balance { balance: Decimal },
    Ejected,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::CardInserted { card } => write!(f, "card {card} inserted"),
            Outcome::Authenticated => write!(f, "card authenticated"),
            Outcome::Accounts(accounts) => {
                let ids: Vec<String> = accounts.iter().map(ToString::to_string).collect();
                write!(f, "accounts on card: {}", ids.join(", "))
            }
            Outcome::AccountSelected { account } => write!(f, "account {account} selected"),
            Outcome::Withdrawn { amount, balance } => {
                write!(f, "balance after withdrawing {amount}: {balance}")
            }
            Outcome::Deposited { amount, balance } => {
                write!(f, "balance after depositing {amount}: {balance}")
            }
            Outcome::Balance { balance } => write!(f, "balance: {balance}"),
            Outcome::Ejected => write!(f, "card ejected"),
        }
    }
}

impl Command {
    /// Run the command. Card names are resolved through `cards` only.
    pub fn execute<'c>(
        self,
        atm: &mut Atm<'_, 'c>,
        cards: &'c CardRegistry,
    ) -> Result<Outcome, ProcessingError> {
        match self {
            Command::InsertCard { card: name } => {
                let card = cards
                    .get(&name)
                    .ok_or_else(|| CommandError::UnknownCard { name: name.clone() })?;
                atm.insert_card(card)?;
                Ok(Outcome::CardInserted { card: name })
            }
            Command::Authenticate { pin } => {
                atm.authenticate(&pin)?;
                Ok(Outcome::Authenticated)
            }
            Command::ListAccounts => Ok(Outcome::Accounts(
                atm.list_accounts()?.iter().copied().collect(),
            )),
            Command::SelectAccount { account } => {
                atm.select_account(account)?;
                Ok(Outcome::AccountSelected { account })
            }
            Command::Withdraw { amount } => Ok(Outcome::Withdrawn {
                amount,
                balance: atm.withdraw(amount)?,
            }),
            Command::Deposit { amount } => Ok(Outcome::Deposited {
                amount,
                balance: atm.deposit(amount)?,
            }),
            Command::Balance => Ok(Outcome::Balance {
                balance: atm.balance()?,
            }),
            Command::Eject => {
                atm.eject();
                Ok(Outcome::Ejected)
            }
        }
    }
}
