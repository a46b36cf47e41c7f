//! Basic example of driving an `Atm` from a command script.
//!
//! Run with: `cargo run --example basic`

use atm_session::{run_session, setup, Atm};
use std::io::Cursor;

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Two cards against two accounts: card1 (PIN 1234) -> 1, card2 (PIN 5555) -> 2
    let (mut bank, cards) = setup::demo().expect("Failed to build demo bank");

    // Each wrong step is reported and the session carries on
    let script = r"insert_card card1
insert_card card2
authenticate 1
withdraw 1
authenticate 1234
list_accounts
select_account 999
select_account 1
balance
withdraw 1
deposit 1
withdraw 22
eject
insert_card card1
balance
authenticate 1234
balance
eject
insert_card card2
authenticate 5555
select_account 2
balance
eject
";

    let mut atm = Atm::new(&mut bank);
    let summary = run_session(&mut atm, &cards, Cursor::new(script), std::io::stdout())
        .expect("Failed to run session");

    println!(
        "\n=== {} commands executed, {} failed ===",
        summary.executed, summary.failed
    );
    bank.export_accounts(std::io::stdout())
        .expect("Failed to export accounts");
}
