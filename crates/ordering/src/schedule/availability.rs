//! Pickup date and time availability.
//!
//! Every query is a pure function of the weekly hours, the order constraints
//! and a reference "now". Callers pass a fresh `now` for every evaluation so
//! lead-time boundaries move with the wall clock.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use leipomo_core::{SlotTime, YearMonth};
use serde::Serialize;

use super::constraints::OrderConstraints;
use super::hours::{TimeWindow, WeeklyHours};

/// How many months the forward search inspects before giving up.
pub const MONTH_SEARCH_LIMIT: u32 = 12;

/// Cells in a calendar grid: six Monday-first weeks.
pub const CALENDAR_CELLS: usize = 42;

/// Why a date can or cannot be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    /// Before today.
    Past,
    /// Before the day the lead time ends on.
    TooSoon,
    /// After the booking horizon.
    TooFar,
    /// No opening windows on this weekday.
    Closed,
    /// Inside a blackout range.
    Blackout,
}

/// Result of validating a concrete pickup date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupCheck {
    Ok,
    Closed,
    OutsideHours,
    TooSoon,
    TooFar,
    Blackout,
}

impl PickupCheck {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// The month the date step should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthResolution {
    /// A month with at least one available date.
    Found {
        month: YearMonth,
        /// Available dates in ascending order, never empty.
        dates: Vec<NaiveDate>,
        /// The requested month had nothing and a later one was chosen.
        substituted: bool,
    },
    /// No month in the search window has an available date.
    NoAvailability,
}

/// One cell of a calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub status: DayStatus,
}

impl CalendarDay {
    /// Whether the cell can be chosen. Padding days from neighbouring months
    /// never can.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.in_month && self.status == DayStatus::Available
    }
}

/// A month rendered as a Monday-first grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub month: YearMonth,
    pub days: Vec<CalendarDay>,
}

impl CalendarView {
    /// The grid split into weeks.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(7)
    }

    /// Dates in the month that can be chosen.
    pub fn selectable_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days
            .iter()
            .filter(|day| day.is_selectable())
            .map(|day| day.date)
    }
}

/// Availability rules evaluated at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct Availability<'a> {
    hours: &'a WeeklyHours,
    constraints: &'a OrderConstraints,
    now: NaiveDateTime,
}

impl<'a> Availability<'a> {
    #[must_use]
    pub const fn new(
        hours: &'a WeeklyHours,
        constraints: &'a OrderConstraints,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            hours,
            constraints,
            now,
        }
    }

    #[must_use]
    pub const fn now(&self) -> NaiveDateTime {
        self.now
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// The earliest instant a pickup may be scheduled strictly after.
    #[must_use]
    pub fn earliest_pickup(&self) -> NaiveDateTime {
        self.now + self.constraints.lead_time()
    }

    /// The last day inside the booking horizon.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.today()
            .checked_add_days(Days::new(u64::from(self.constraints.max_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Classify a date.
    ///
    /// Blackouts are reported even for past or out-of-range dates so
    /// calendars can mark them consistently.
    #[must_use]
    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        if self.constraints.is_blackout(date) {
            DayStatus::Blackout
        } else if date < self.today() {
            DayStatus::Past
        } else if date < self.earliest_pickup().date() {
            DayStatus::TooSoon
        } else if date > self.last_day() {
            DayStatus::TooFar
        } else if !self.hours.is_open(date.weekday()) {
            DayStatus::Closed
        } else {
            DayStatus::Available
        }
    }

    /// Whether a pickup can be booked on `date` at all.
    #[must_use]
    pub fn is_date_available(&self, date: NaiveDate) -> bool {
        self.day_status(date) == DayStatus::Available
    }

    /// Available dates in `month`, ascending.
    #[must_use]
    pub fn available_dates(&self, month: YearMonth) -> Vec<NaiveDate> {
        month
            .days()
            .filter(|date| self.is_date_available(*date))
            .collect()
    }

    /// Find the month to show, starting at `requested` and walking forward.
    ///
    /// The search stops at the first month with an available date, at the
    /// first month that starts after the booking horizon, or after
    /// [`MONTH_SEARCH_LIMIT`] months.
    #[must_use]
    pub fn resolve_month(&self, requested: YearMonth) -> MonthResolution {
        let last_day = self.last_day();
        let mut month = requested;

        for _ in 0..MONTH_SEARCH_LIMIT {
            if month.first_day() > last_day {
                break;
            }
            let dates = self.available_dates(month);
            if !dates.is_empty() {
                return MonthResolution::Found {
                    month,
                    dates,
                    substituted: month != requested,
                };
            }
            month = month.next();
        }

        MonthResolution::NoAvailability
    }

    /// Bookable hourly slots on `date`, ascending and unique. Empty unless
    /// [`Self::is_date_available`] holds for `date`.
    #[must_use]
    pub fn time_slots(&self, date: NaiveDate) -> Vec<SlotTime> {
        if !self.is_date_available(date) {
            return Vec::new();
        }
        let earliest = self.earliest_pickup();
        let mut slots: Vec<SlotTime> = self
            .hours
            .windows(date.weekday())
            .iter()
            .flat_map(TimeWindow::hourly_slots)
            .filter(|slot| slot.on(date) > earliest)
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Validate a concrete pickup moment against every rule.
    #[must_use]
    pub fn check_pickup(&self, date: NaiveDate, time: SlotTime) -> PickupCheck {
        if self.constraints.is_blackout(date) {
            return PickupCheck::Blackout;
        }
        let windows = self.hours.windows(date.weekday());
        if windows.is_empty() {
            return PickupCheck::Closed;
        }
        if !windows.iter().any(|window| window.contains(time)) {
            return PickupCheck::OutsideHours;
        }
        if time.on(date) <= self.earliest_pickup() {
            return PickupCheck::TooSoon;
        }
        if date > self.last_day() {
            return PickupCheck::TooFar;
        }
        PickupCheck::Ok
    }

    /// Render `month` as a 42-cell grid starting on the Monday on or before
    /// the first of the month.
    #[must_use]
    pub fn calendar(&self, month: YearMonth, selected: Option<NaiveDate>) -> CalendarView {
        let first = month.first_day();
        let start = first.week(Weekday::Mon).first_day();
        let today = self.today();

        let days = start
            .iter_days()
            .take(CALENDAR_CELLS)
            .map(|date| CalendarDay {
                date,
                in_month: month.contains(date),
                is_today: date == today,
                is_selected: selected == Some(date),
                status: self.day_status(date),
            })
            .collect();

        CalendarView { month, days }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schedule::BlackoutRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn t(s: &str) -> SlotTime {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(t(start), t(end)).unwrap()
    }

    fn monday_hours() -> WeeklyHours {
        WeeklyHours::closed().with_window(Weekday::Mon, window("08:00", "16:00"))
    }

    fn constraints(lead: u32, max_days: u32) -> OrderConstraints {
        OrderConstraints {
            min_lead_minutes: lead,
            max_days,
            blackout_dates: Vec::new(),
        }
    }

    #[test]
    fn test_monday_slots_with_no_lead() {
        let hours = monday_hours();
        let rules = constraints(0, 60);
        // Friday 2026-10-16, the following Monday is 2026-10-26.
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        let slots = availability.time_slots(date(2026, 10, 26));
        assert_eq!(slots.len(), 9);
        assert_eq!(slots.first(), Some(&t("08:00")));
        assert_eq!(slots.last(), Some(&t("16:00")));
    }

    #[test]
    fn test_slots_respect_lead_time_strictly() {
        let hours = monday_hours();
        let rules = constraints(60, 60);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 19, 9, 0));

        // now + lead = 10:00, which is not strictly after itself.
        let slots = availability.time_slots(date(2026, 10, 19));
        assert_eq!(slots.first(), Some(&t("11:00")));
        assert_eq!(slots.len(), 6);
    }

    #[test]
    fn test_slots_empty_on_closed_weekday() {
        let hours = monday_hours();
        let rules = constraints(0, 60);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));
        assert!(availability.time_slots(date(2026, 10, 20)).is_empty());
    }

    #[test]
    fn test_overlapping_windows_dedupe() {
        let hours = WeeklyHours::closed()
            .with_window(Weekday::Mon, window("12:00", "16:00"))
            .with_window(Weekday::Mon, window("08:00", "13:00"));
        let rules = constraints(0, 60);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        let slots = availability.time_slots(date(2026, 10, 26));
        assert_eq!(slots.len(), 9);
        assert!(slots.windows(2).all(|pair| matches!(pair, [a, b] if a < b)));
    }

    #[test]
    fn test_day_status_rules() {
        let hours = monday_hours();
        let rules = OrderConstraints {
            min_lead_minutes: 720,
            max_days: 14,
            blackout_dates: vec![BlackoutRange {
                from: "11-02".parse().unwrap(),
                to: "11-02".parse().unwrap(),
                repeated_annually: true,
            }],
        };
        // Sunday 18:00, lead ends Monday 06:00.
        let availability = Availability::new(&hours, &rules, at(2026, 10, 18, 18, 0));

        assert_eq!(availability.day_status(date(2026, 10, 12)), DayStatus::Past);
        assert_eq!(availability.day_status(date(2026, 10, 19)), DayStatus::Available);
        assert_eq!(availability.day_status(date(2026, 10, 20)), DayStatus::Closed);
        assert_eq!(availability.day_status(date(2026, 11, 2)), DayStatus::Blackout);
        assert_eq!(availability.day_status(date(2026, 11, 9)), DayStatus::TooFar);
    }

    #[test]
    fn test_lead_time_pushes_first_date() {
        let hours = WeeklyHours::closed()
            .with_window(Weekday::Fri, window("08:00", "16:00"))
            .with_window(Weekday::Sat, window("08:00", "16:00"));
        let rules = constraints(48 * 60, 60);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        assert_eq!(availability.day_status(date(2026, 10, 17)), DayStatus::TooSoon);
        let month = YearMonth::new(2026, 10).unwrap();
        assert_eq!(
            availability.available_dates(month),
            vec![date(2026, 10, 23), date(2026, 10, 24), date(2026, 10, 30), date(2026, 10, 31)]
        );
    }

    #[test]
    fn test_same_day_only_horizon() {
        let hours = WeeklyHours::closed().with_window(Weekday::Fri, window("08:00", "16:00"));
        let rules = constraints(0, 0);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        assert!(availability.is_date_available(date(2026, 10, 16)));
        assert!(!availability.is_date_available(date(2026, 10, 23)));
    }

    #[test]
    fn test_annual_blackout_excludes_christmas() {
        let hours = WeeklyHours::closed()
            .with_window(Weekday::Mon, window("08:00", "16:00"))
            .with_window(Weekday::Tue, window("08:00", "16:00"))
            .with_window(Weekday::Wed, window("08:00", "16:00"))
            .with_window(Weekday::Thu, window("08:00", "16:00"))
            .with_window(Weekday::Fri, window("08:00", "16:00"))
            .with_window(Weekday::Sat, window("08:00", "16:00"))
            .with_window(Weekday::Sun, window("08:00", "16:00"));
        let rules = OrderConstraints {
            min_lead_minutes: 0,
            max_days: 365,
            blackout_dates: vec![BlackoutRange {
                from: "12-24".parse().unwrap(),
                to: "12-26".parse().unwrap(),
                repeated_annually: true,
            }],
        };
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        let december = availability.available_dates(YearMonth::new(2026, 12).unwrap());
        assert!(december.contains(&date(2026, 12, 23)));
        assert!(!december.contains(&date(2026, 12, 24)));
        assert!(!december.contains(&date(2026, 12, 25)));
        assert!(!december.contains(&date(2026, 12, 26)));
        assert!(december.contains(&date(2026, 12, 27)));

        assert!(availability.time_slots(date(2026, 12, 25)).is_empty());
        assert_eq!(availability.time_slots(date(2026, 12, 23)).len(), 9);
    }

    #[test]
    fn test_no_slots_on_unbookable_days() {
        let hours = monday_hours();
        let rules = OrderConstraints {
            min_lead_minutes: 720,
            max_days: 60,
            blackout_dates: vec![BlackoutRange {
                from: "12-21".parse().unwrap(),
                to: "12-21".parse().unwrap(),
                repeated_annually: true,
            }],
        };
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        // Blackout Monday, a Monday past the horizon, and a past Monday.
        assert!(availability.time_slots(date(2026, 12, 21)).is_empty());
        assert!(availability.time_slots(date(2027, 6, 7)).is_empty());
        assert!(availability.time_slots(date(2026, 10, 12)).is_empty());
        assert_eq!(availability.time_slots(date(2026, 12, 14)).len(), 9);
    }

    #[test]
    fn test_resolve_month_substitutes_forward() {
        let hours = monday_hours();
        let rules = OrderConstraints {
            min_lead_minutes: 0,
            max_days: 90,
            blackout_dates: vec![BlackoutRange {
                from: "2026-10-01".parse().unwrap(),
                to: "2026-10-31".parse().unwrap(),
                repeated_annually: false,
            }],
        };
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        let resolution = availability.resolve_month(YearMonth::new(2026, 10).unwrap());
        let MonthResolution::Found {
            month,
            dates,
            substituted,
        } = resolution
        else {
            panic!("expected a month with availability");
        };
        assert_eq!(month, YearMonth::new(2026, 11).unwrap());
        assert_eq!(dates.first(), Some(&date(2026, 11, 2)));
        assert!(substituted);
    }

    #[test]
    fn test_resolve_month_keeps_requested_month() {
        let hours = monday_hours();
        let rules = constraints(0, 60);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        let resolution = availability.resolve_month(YearMonth::new(2026, 10).unwrap());
        assert!(matches!(
            resolution,
            MonthResolution::Found { substituted: false, .. }
        ));
    }

    #[test]
    fn test_resolve_month_all_closed() {
        let hours = WeeklyHours::closed();
        let rules = constraints(0, 365);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));
        assert_eq!(
            availability.resolve_month(YearMonth::new(2026, 10).unwrap()),
            MonthResolution::NoAvailability
        );
    }

    #[test]
    fn test_resolve_month_stops_past_horizon() {
        let hours = monday_hours();
        let rules = constraints(0, 5);
        // Tuesday; the next Monday is beyond the five-day horizon.
        let availability = Availability::new(&hours, &rules, at(2026, 10, 20, 9, 0));
        assert_eq!(
            availability.resolve_month(YearMonth::new(2026, 10).unwrap()),
            MonthResolution::NoAvailability
        );
    }

    #[test]
    fn test_check_pickup() {
        let hours = monday_hours();
        let rules = OrderConstraints {
            min_lead_minutes: 60,
            max_days: 30,
            blackout_dates: vec![BlackoutRange {
                from: "2026-11-02".parse().unwrap(),
                to: "2026-11-02".parse().unwrap(),
                repeated_annually: false,
            }],
        };
        let availability = Availability::new(&hours, &rules, at(2026, 10, 19, 9, 0));

        assert_eq!(availability.check_pickup(date(2026, 10, 26), t("10:00")), PickupCheck::Ok);
        assert_eq!(availability.check_pickup(date(2026, 10, 19), t("10:00")), PickupCheck::TooSoon);
        assert_eq!(availability.check_pickup(date(2026, 10, 26), t("17:00")), PickupCheck::OutsideHours);
        assert_eq!(availability.check_pickup(date(2026, 10, 27), t("10:00")), PickupCheck::Closed);
        assert_eq!(availability.check_pickup(date(2026, 11, 2), t("10:00")), PickupCheck::Blackout);
        assert_eq!(availability.check_pickup(date(2026, 11, 23), t("10:00")), PickupCheck::TooFar);
    }

    #[test]
    fn test_calendar_grid() {
        let hours = monday_hours();
        let rules = constraints(0, 60);
        let availability = Availability::new(&hours, &rules, at(2026, 10, 16, 9, 0));

        let view = availability.calendar(YearMonth::new(2026, 10).unwrap(), Some(date(2026, 10, 19)));
        assert_eq!(view.days.len(), CALENDAR_CELLS);
        assert_eq!(view.weeks().count(), 6);

        // 2026-10-01 is a Thursday, so the grid opens on Monday 2026-09-28.
        let first = view.days.first().unwrap();
        assert_eq!(first.date, date(2026, 9, 28));
        assert!(!first.in_month);

        let today = view.days.iter().find(|d| d.is_today).unwrap();
        assert_eq!(today.date, date(2026, 10, 16));

        let selected: Vec<_> = view.days.iter().filter(|d| d.is_selected).collect();
        assert_eq!(selected.len(), 1);

        let selectable: Vec<_> = view.selectable_dates().collect();
        assert_eq!(selectable, vec![date(2026, 10, 19), date(2026, 10, 26)]);
    }
}
