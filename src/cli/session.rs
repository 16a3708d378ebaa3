use std::io::{BufRead, Write};

use anyhow::Result;

use crate::application::{DispenserLedger, PurchaseOutcome};
use crate::domain::{format_litres, parse_amount, DispenserStatus, FuelType};

use super::{write_levels, write_prices};

/// What happened during an interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub sales: usize,
    pub refills: usize,
}

/// Drive the ledger from line-based input until `-1` or end of input.
///
/// Each round: pick a dispenser, optionally refill it when it is low, pick a
/// fuel type, enter an amount of money. Bad input is reported and the round
/// starts over; ledger errors are printed and never end the session.
pub async fn run_session<R: BufRead, W: Write>(
    ledger: &mut DispenserLedger,
    mut input: R,
    mut out: W,
) -> Result<SessionSummary> {
    let mut summary = SessionSummary::default();
    let count = ledger.dispensers().len();

    writeln!(out, "Current fuel prices:")?;
    write_prices(&mut out, ledger)?;

    loop {
        writeln!(out, "Choose a dispenser (0-{}) or -1 to exit:", count - 1)?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else {
            break;
        };

        let id = match line.parse::<i64>() {
            Ok(-1) => break,
            Ok(index) if index >= 0 && (index as usize) < count => index as usize,
            _ => {
                writeln!(out, "Invalid dispenser. Please try again.")?;
                continue;
            }
        };

        if ledger.status(id)? == DispenserStatus::Low {
            let name = ledger.dispenser(id)?.name.clone();
            writeln!(
                out,
                "{} needs to be filled up. Do you want to fill it up? (yes/no):",
                name
            )?;
            out.flush()?;
            let Some(answer) = read_line(&mut input)? else {
                break;
            };
            if answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y") {
                let added = ledger.refill(id)?;
                writeln!(
                    out,
                    "{} filled up with {} litres.",
                    name,
                    format_litres(added)
                )?;
                summary.refills += 1;
                continue;
            }
        }

        writeln!(out, "Choose a fuel type (ron95, ron97, diesel):")?;
        out.flush()?;
        let Some(fuel) = read_line(&mut input)? else {
            break;
        };
        if FuelType::from_str(&fuel).is_none() {
            writeln!(out, "Invalid fuel type. Please try again.")?;
            continue;
        }

        writeln!(out, "Enter the amount of money to purchase fuel (in RM):")?;
        out.flush()?;
        let Some(amount) = read_line(&mut input)? else {
            break;
        };
        let amount = match parse_amount(&amount) {
            Ok(amount) => amount,
            Err(err) => {
                writeln!(out, "Invalid amount: {}. Please try again.", err)?;
                continue;
            }
        };

        match ledger.purchase(id, &fuel, amount).await {
            Ok(PurchaseOutcome::Completed(done)) => {
                match &done.receipt {
                    Ok(path) => writeln!(out, "Receipt saved to {}", path.display())?,
                    Err(err) => writeln!(out, "Error saving receipt: {}", err)?,
                }
                writeln!(out, "{}", done.sale)?;
                summary.sales += 1;
            }
            Ok(PurchaseOutcome::LowLevel(warning)) => writeln!(out, "{}", warning)?,
            Err(err) => writeln!(out, "Error: {}", err)?,
        }

        write_levels(&mut out, ledger)?;
    }

    writeln!(out, "Goodbye.")?;
    out.flush()?;
    Ok(summary)
}

/// Next non-blank line, trimmed. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if !line.is_empty() {
            return Ok(Some(line.to_string()));
        }
    }
}
