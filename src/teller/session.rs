use std::io::{BufRead, Write};

use super::atm::Atm;
use super::card::CardRegistry;
use super::command::Command;
use super::error::{Error, ProcessingError};

/// Counts of commands run by [`run_session`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub executed: u64,
    pub failed: u64,
}

/// Drive an ATM from any line source (stdin, a script file, a `Cursor`, ...),
/// writing one line per command to `output`.
///
/// Blank lines and lines starting with `#` are skipped. A failed command is
/// reported as `error: <message>` and the loop carries on; only I/O errors
/// stop it. The ATM is left in whatever state the last command put it in.
pub fn run_session<'c, R: BufRead, W: Write>(
    atm: &mut Atm<'_, 'c>,
    cards: &'c CardRegistry,
    input: R,
    mut output: W,
) -> Result<SessionSummary, Error> {
    log::info!("Starting ATM session with {} cards", cards.len());

    let mut summary = SessionSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_num = index + 1;
        let result = match line.parse::<Command>() {
            Ok(command) => {
                log::trace!("[line {line_num}] {command:?}");
                command.execute(atm, cards)
            }
            Err(e) => Err(ProcessingError::from(e)),
        };

        match result {
            Ok(outcome) => {
                summary.executed += 1;
                writeln!(output, "{outcome}")?;
            }
            Err(e) => {
                log::warn!("[line {line_num}] - Failed: {e}");
                summary.failed += 1;
                writeln!(output, "error: {e}")?;
            }
        }
    }

    output.flush()?;
    log::info!(
        "Session complete: {} executed, {} failed",
        summary.executed,
        summary.failed
    );
    Ok(summary)
}
