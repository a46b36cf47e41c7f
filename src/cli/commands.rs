pub(crate) use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "atm",
    author,
    version,
    about = "A simple ATM session against an in-memory bank",
    long_about = None,
    after_help = "COMMANDS:\n    insert_card <NAME>, authenticate <PIN>, list_accounts,\n    select_account <ID>, withdraw <AMOUNT>, deposit <AMOUNT>,\n    balance, eject\n\n    One command per line. Without --accounts/--cards a demo bank is used:\n    card1 (PIN 1234) on account 1, card2 (PIN 5555) on account 2."
)]
pub struct Args {
    /// Path to a file of ATM commands
    #[arg(
        index = 1,
        value_name = "SCRIPT",
        help = "File with one ATM command per line (reads stdin when omitted)"
    )]
    pub script: Option<PathBuf>,

    /// Accounts CSV with a single `balance` column
    #[arg(long, value_name = "FILE", requires = "cards")]
    pub accounts: Option<PathBuf>,

    /// Cards CSV with columns: name, pin, accounts (space-separated IDs)
    #[arg(long, value_name = "FILE", requires = "accounts")]
    pub cards: Option<PathBuf>,

    /// Print the ledger as CSV to stdout once the session ends
    #[arg(long)]
    pub export: bool,
}
