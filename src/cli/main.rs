mod commands;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use atm_session::{run_session, setup, Atm, Bank, CardRegistry};
use commands::{Args, Parser};

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of warn (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // 1. Build the bank and the cards that can be inserted
    let (mut bank, cards) = match (&args.accounts, &args.cards) {
        (Some(accounts), Some(cards)) => load(accounts, cards)?,
        _ => setup::demo().context("Failed to build the demo bank")?,
    };

    // 2. Run the session until input ends
    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    let mut atm = Atm::new(&mut bank);
    let summary = run_session(&mut atm, &cards, input, io::stdout().lock())
        .context("Failed to run ATM session")?;
    atm.eject();

    log::info!(
        "Session ended: {} commands executed, {} failed",
        summary.executed,
        summary.failed
    );

    // 3. Optionally export the ledger to stdout
    if args.export {
        bank.export_accounts(io::stdout())
            .context("Failed to export accounts to stdout")?;
    }

    Ok(())
}

fn load(accounts: &Path, cards: &Path) -> Result<(Bank, CardRegistry)> {
    let mut bank = Bank::new();
    setup::load_accounts(&mut bank, open(accounts)?)
        .with_context(|| format!("Failed to load accounts from {}", accounts.display()))?;
    let cards = setup::load_cards(open(cards)?)
        .with_context(|| format!("Failed to load cards from {}", cards.display()))?;
    Ok((bank, cards))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open input file: {}", path.display()))
}
