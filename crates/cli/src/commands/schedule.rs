//! Read-only pickup availability views. These never touch the session.

use std::io::Write;

use chrono::NaiveDate;
use leipomo_core::YearMonth;
use leipomo_ordering::schedule::{DayStatus, MonthResolution};

use super::{CliError, Flow};
use crate::render;

/// Calendar for `month`, or the next month with availability.
pub async fn dates(flow: &Flow, month: Option<YearMonth>) -> Result<(), CliError> {
    let schedule = flow.schedule().await?;
    let availability = schedule.at(flow.now());
    let requested = month.unwrap_or_else(|| YearMonth::of(availability.today()));

    let mut stdout = std::io::stdout().lock();
    if schedule.is_fallback() {
        writeln!(stdout, "Pickup rules could not be loaded; showing default availability.")?;
    }

    let shown = match availability.resolve_month(requested) {
        MonthResolution::Found {
            month, substituted, ..
        } => {
            if substituted {
                writeln!(stdout, "Nothing available in {requested}; showing {month}.")?;
            }
            month
        }
        MonthResolution::NoAvailability => {
            writeln!(stdout, "No pickup dates are available at the moment.")?;
            requested
        }
    };

    let selected = flow.session().pickup_date;
    render::calendar(&mut stdout, &availability.calendar(shown, selected))?;
    Ok(())
}

/// Pickup times offered on `date`.
pub async fn slots(flow: &Flow, date: NaiveDate) -> Result<(), CliError> {
    let schedule = flow.schedule().await?;
    let availability = schedule.at(flow.now());
    let mut stdout = std::io::stdout().lock();

    let status = availability.day_status(date);
    if status != DayStatus::Available {
        render::unavailable_day(&mut stdout, date, status)?;
        return Ok(());
    }

    let slots = availability.time_slots(date);
    let selected = flow
        .session()
        .pickup()
        .filter(|(picked, _)| *picked == date)
        .map(|(_, time)| time);
    render::slots(&mut stdout, date, &slots, selected)?;
    Ok(())
}
