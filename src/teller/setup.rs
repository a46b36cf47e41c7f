//! Bootstrapping a ledger and its cards, from CSV or from the demo fixture.

use std::io::Read;
use std::str::FromStr;

use serde::Deserialize;

use super::account::AccountId;
use super::bank::Bank;
use super::card::{Card, CardRegistry, Pin};
use super::error::Error;
use super::Decimal;

/// Raw account row: `balance`. IDs are issued by the bank in row order.
/// The balance stays text until parsed as a `Decimal`, so no digits are lost.
#[derive(Debug, Deserialize)]
struct AccountRecord {
    balance: String,
}

impl AccountRecord {
    fn opening_balance(&self) -> Result<Decimal, Error> {
        Decimal::from_str(&self.balance).map_err(|e| Error::InvalidBalance {
            value: self.balance.clone(),
            reason: e.to_string(),
        })
    }
}

/// Raw card row: `name,pin,accounts`, with space-separated account IDs.
#[derive(Debug, Deserialize)]
struct CardRecord {
    name: String,
    pin: String,
    accounts: String,
}

impl CardRecord {
    /// Validate the raw row into a card and the name it is registered under.
    fn into_named_card(self) -> Result<(String, Card), Error> {
        let invalid = |reason: String| Error::InvalidCard {
            name: self.name.clone(),
            reason,
        };

        let pin: Pin = self.pin.parse().map_err(|e| invalid(format!("{e}")))?;
        let accounts = self
            .accounts
            .split_whitespace()
            .map(|id| {
                id.parse::<AccountId>()
                    .map_err(|_| invalid(format!("invalid account ID {id:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((self.name, Card::new(pin, accounts)))
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Open one account per CSV row and return the issued IDs in row order.
pub fn load_accounts<R: Read>(bank: &mut Bank, reader: R) -> Result<Vec<AccountId>, Error> {
    let mut ids = Vec::new();
    for result in csv_reader(reader).deserialize() {
        let record: AccountRecord = result?;
        ids.push(bank.open_account(record.opening_balance()?)?);
    }
    log::info!("Loaded {} accounts", ids.len());
    Ok(ids)
}

/// Read named cards from CSV. Cards may name accounts the bank doesn't know;
/// selecting such an account fails at session time.
pub fn load_cards<R: Read>(reader: R) -> Result<CardRegistry, Error> {
    let mut cards = CardRegistry::new();
    for result in csv_reader(reader).deserialize() {
        let record: CardRecord = result?;
        let (name, card) = record.into_named_card()?;
        cards.register(name, card)?;
    }
    log::info!("Loaded {} cards", cards.len());
    Ok(cards)
}

/// The demo fixture: accounts 1 (balance 10) and 2 (balance 20),
/// `card1` (PIN 1234) on account 1 and `card2` (PIN 5555) on account 2.
pub fn demo() -> Result<(Bank, CardRegistry), Error> {
    let mut bank = Bank::new();
    let first = bank.open_account(Decimal::from(10))?;
    let second = bank.open_account(Decimal::from(20))?;

    let mut cards = CardRegistry::new();
    cards.register("card1", Card::new("1234".parse()?, [first]))?;
    cards.register("card2", Card::new("5555".parse()?, [second]))?;
    Ok((bank, cards))
}
