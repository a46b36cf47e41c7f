use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use super::account::AccountId;
use super::error::Error;

/// A card PIN: a non-empty string of ASCII digits, leading zeros included.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl FromStr for Pin {
    type Err = InvalidPin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPin);
        }
        Ok(Pin(s.to_owned()))
    }
}

// Never print the secret, not even in debug logs
impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("PIN must be a non-empty string of digits")]
pub struct InvalidPin;

/// A physical credential binding a PIN to the accounts it may access.
/// Immutable once issued.
#[derive(Debug, Clone)]
pub struct Card {
    pin: Pin,
    accounts: BTreeSet<AccountId>,
}

impl Card {
    pub fn new(pin: Pin, accounts: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            pin,
            accounts: accounts.into_iter().collect(),
        }
    }

    /// Plain equality; constant-time comparison is out of scope.
    pub fn check_pin(&self, pin: &Pin) -> bool {
        self.pin == *pin
    }

    pub fn has_account(&self, id: AccountId) -> bool {
        self.accounts.contains(&id)
    }

    /// Returns the authorized account IDs in ascending order
    pub fn accounts(&self) -> &BTreeSet<AccountId> {
        &self.accounts
    }
}

/// Named cards available to the driver of a session.
///
/// `insert_card` commands refer to cards by name; the name is only ever
/// looked up here.
#[derive(Debug, Default)]
pub struct CardRegistry {
    cards: HashMap<String, Card>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, card: Card) -> Result<(), Error> {
        let name = name.into();
        if self.cards.contains_key(&name) {
            return Err(Error::DuplicateCard { name });
        }
        log::debug!("Registered card {name} for accounts {:?}", card.accounts());
        self.cards.insert(name, card);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.get(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(digits: &str) -> Pin {
        digits.parse().unwrap()
    }

    #[test]
    fn test_check_pin() {
        let card = Card::new(pin("1234"), [1]);
        assert!(card.check_pin(&pin("1234")));
        assert!(!card.check_pin(&pin("9999")));
    }

    #[test]
    fn test_pin_leading_zeros_are_significant() {
        let card = Card::new(pin("0123"), [1]);
        assert!(!card.check_pin(&pin("123")));
        assert!(card.check_pin(&pin("0123")));
    }

    #[test]
    fn test_pin_rejects_non_digits() {
        assert_eq!("".parse::<Pin>(), Err(InvalidPin));
        assert_eq!("12a4".parse::<Pin>(), Err(InvalidPin));
        assert_eq!("-123".parse::<Pin>(), Err(InvalidPin));
    }

    #[test]
    fn test_pin_debug_is_redacted() {
        assert_eq!(format!("{:?}", pin("1234")), "Pin(****)");
    }

    #[test]
    fn test_has_account_and_accounts_sorted() {
        let card = Card::new(pin("1"), [3, 1, 2, 1]);
        assert!(card.has_account(2));
        assert!(!card.has_account(4));
        assert_eq!(card.accounts().iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let mut cards = CardRegistry::new();
        cards.register("card1", Card::new(pin("1234"), [1])).unwrap();

        let err = cards
            .register("card1", Card::new(pin("5555"), [2]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateCard { name } if name == "card1"));

        // The original card is kept
        assert!(cards.get("card1").unwrap().check_pin(&pin("1234")));
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_registry_unknown_name() {
        let cards = CardRegistry::new();
        assert!(cards.get("card1").is_none());
        assert!(cards.is_empty());
    }
}
