//! Pickup scheduling: weekly hours, order constraints and the availability
//! calculator built on them.

mod availability;
mod constraints;
mod hours;

use chrono::NaiveDateTime;

pub use availability::{
    Availability, CALENDAR_CELLS, CalendarDay, CalendarView, DayStatus, MONTH_SEARCH_LIMIT,
    MonthResolution, PickupCheck,
};
pub use constraints::{
    BlackoutDate, BlackoutDateError, BlackoutRange, FALLBACK_MAX_DAYS, FALLBACK_MIN_LEAD_MINUTES,
    OrderConstraints,
};
pub use hours::{TimeWindow, WeeklyHours};

/// Where the active constraints came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintsSource {
    Backend,
    Fallback,
}

/// Hours and constraints resolved for the current session.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub hours: WeeklyHours,
    pub constraints: OrderConstraints,
    pub constraints_source: ConstraintsSource,
}

impl Schedule {
    /// Evaluate availability at `now`.
    #[must_use]
    pub const fn at(&self, now: NaiveDateTime) -> Availability<'_> {
        Availability::new(&self.hours, &self.constraints, now)
    }

    /// Whether the constraints are the offline defaults.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.constraints_source == ConstraintsSource::Fallback
    }
}
