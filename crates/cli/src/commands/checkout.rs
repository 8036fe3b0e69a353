//! Interactive, line-based checkout.
//!
//! Each answer becomes a [`Command`] for the flow. Rejected answers print the
//! reason and ask again; the session is saved after every accepted answer, so
//! quitting at any point can be continued with `leipomo resume`.

use std::io::Write;

use chrono::NaiveDate;
use leipomo_core::{SlotTime, YearMonth};
use leipomo_ordering::checkout::{CheckoutError, Command};
use leipomo_ordering::{FlowError, Prompt, View};

use super::{CliError, Flow, ask, report};
use crate::render;

/// What an answer to a prompt means.
#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Command(Command),
    Quit,
    Invalid(&'static str),
}

/// Begin checkout with the current cart.
pub async fn start(flow: &mut Flow) -> Result<(), CliError> {
    let view = flow.dispatch(Command::BeginCheckout).await?;
    run(flow, view).await
}

/// Continue where the saved session left off.
pub async fn resume(flow: &mut Flow) -> Result<(), CliError> {
    let view = flow.resume().await?;
    match &view {
        View::Cart(summary) => {
            render::cart(&mut std::io::stdout().lock(), summary)?;
            writeln!(std::io::stdout().lock(), "Start checkout with `leipomo checkout`.")?;
            return Ok(());
        }
        View::Prompt(prompt) => {
            let summary = flow.session().cart.summary();
            render::resumed(&mut std::io::stdout().lock(), &summary, prompt)?;
        }
        View::Catalog | View::Confirmed { .. } => {}
    }
    run(flow, view).await
}

pub fn reset(flow: &mut Flow) -> Result<(), CliError> {
    flow.reset()?;
    writeln!(std::io::stdout().lock(), "The saved order was cleared.")?;
    Ok(())
}

async fn run(flow: &mut Flow, mut view: View) -> Result<(), CliError> {
    loop {
        render::view(&mut std::io::stdout().lock(), &view)?;
        let View::Prompt(prompt) = &view else {
            return Ok(());
        };

        let Some(line) = ask(">")? else {
            return Ok(());
        };
        let command = match parse_answer(prompt, &line) {
            Answer::Command(command) => command,
            Answer::Quit => {
                writeln!(
                    std::io::stdout().lock(),
                    "Your order is saved. Continue with `leipomo resume`."
                )?;
                return Ok(());
            }
            Answer::Invalid(hint) => {
                writeln!(std::io::stdout().lock(), "{hint}")?;
                continue;
            }
        };

        view = match flow.dispatch(command).await {
            Ok(next) => next,
            Err(FlowError::Checkout(CheckoutError::PickupExpired(check))) => {
                tracing::info!(?check, "Pickup expired before submission");
                report(&CliError::Flow(CheckoutError::PickupExpired(check).into()));
                flow.dispatch(Command::Back).await?
            }
            Err(e) => {
                report(&CliError::Flow(e));
                flow.resume().await?
            }
        };
    }
}

fn parse_answer(prompt: &Prompt, line: &str) -> Answer {
    match line.to_ascii_lowercase().as_str() {
        "quit" | "q" => return Answer::Quit,
        "back" | "b" => return Answer::Command(Command::Back),
        _ => {}
    }

    match prompt {
        Prompt::Name { current } => Answer::Command(Command::SubmitName(keep(line, current))),
        Prompt::Email { current } => Answer::Command(Command::SubmitEmail(keep(line, current))),
        Prompt::Phone { current } => Answer::Command(Command::SubmitPhone(keep(line, current))),
        Prompt::Note { current, .. } => Answer::Command(Command::SubmitNote(keep(line, current))),
        Prompt::Date { step, .. } => {
            let month = step.calendar.month;
            match line {
                "<" => Answer::Command(Command::PreviousMonth),
                ">" => Answer::Command(Command::NextMonth),
                "" => step
                    .calendar
                    .days
                    .iter()
                    .find(|day| day.is_selected && day.in_month)
                    .map_or(Answer::Invalid("Type a date, e.g. 2026-12-21."), |day| {
                        Answer::Command(Command::SelectDate(day.date))
                    }),
                _ => parse_date(line, month),
            }
        }
        Prompt::Time { selected, .. } => match (line, selected) {
            ("", Some(time)) => Answer::Command(Command::SelectTime(*time)),
            _ => line.parse::<SlotTime>().map_or(
                Answer::Invalid("Type a time as HH:MM, e.g. 09:00."),
                |time| Answer::Command(Command::SelectTime(time)),
            ),
        },
    }
}

/// An empty answer keeps what was entered before.
fn keep(line: &str, current: &str) -> String {
    if line.is_empty() {
        current.to_owned()
    } else {
        line.to_owned()
    }
}

/// `YYYY-MM-DD`, `YYYY-MM` to jump to a month, or a day of the shown month.
fn parse_date(line: &str, shown: YearMonth) -> Answer {
    if let Ok(date) = line.parse::<NaiveDate>() {
        return Answer::Command(Command::SelectDate(date));
    }
    if line.len() == 7 {
        if let Ok(month) = line.parse::<YearMonth>() {
            return Answer::Command(Command::ShowMonth(month));
        }
    }
    line.parse::<u32>()
        .ok()
        .and_then(|day| NaiveDate::from_ymd_opt(shown.year(), shown.month(), day))
        .map_or(
            Answer::Invalid("Type a date, e.g. 2026-12-21."),
            |date| Answer::Command(Command::SelectDate(date)),
        )
}
