//! Recurring weekly pickup hours.
//!
//! The backend sends `{ "0": [["08:00", "16:00"]], ... }` keyed by weekday
//! with Monday = 0. Closed days are missing, `null`, or an empty list.

use std::collections::BTreeMap;

use chrono::Weekday;
use leipomo_core::SlotTime;
use serde::Deserialize;
use tracing::warn;

/// A single opening window, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: SlotTime,
    pub end: SlotTime,
}

impl TimeWindow {
    /// Create a window, or `None` when `start` is after `end`.
    #[must_use]
    pub fn new(start: SlotTime, end: SlotTime) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Whether `time` falls inside the window.
    #[must_use]
    pub fn contains(&self, time: SlotTime) -> bool {
        self.start <= time && time <= self.end
    }

    /// Whole-hour slots that lie inside the window.
    ///
    /// A window of `08:30`-`11:00` yields `09:00`, `10:00`, `11:00`.
    pub fn hourly_slots(&self) -> impl Iterator<Item = SlotTime> + use<> {
        let window = *self;
        (window.start.hour()..=window.end.hour())
            .filter_map(|hour| SlotTime::new(hour, 0))
            .filter(move |slot| window.contains(*slot))
    }
}

/// Opening windows for each weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<Vec<(String, String)>>>")]
pub struct WeeklyHours {
    days: [Vec<TimeWindow>; 7],
}

impl WeeklyHours {
    /// Hours with every day closed.
    #[must_use]
    pub fn closed() -> Self {
        Self::default()
    }

    /// Add an opening window to a weekday.
    #[must_use]
    pub fn with_window(mut self, weekday: Weekday, window: TimeWindow) -> Self {
        if let Some(day) = self.days.get_mut(weekday.num_days_from_monday() as usize) {
            day.push(window);
        }
        self
    }

    /// Opening windows for a weekday, in the order the backend listed them.
    #[must_use]
    pub fn windows(&self, weekday: Weekday) -> &[TimeWindow] {
        self.days
            .get(weekday.num_days_from_monday() as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether the shop has at least one window on `weekday`.
    #[must_use]
    pub fn is_open(&self, weekday: Weekday) -> bool {
        !self.windows(weekday).is_empty()
    }
}

impl From<BTreeMap<String, Option<Vec<(String, String)>>>> for WeeklyHours {
    fn from(raw: BTreeMap<String, Option<Vec<(String, String)>>>) -> Self {
        let mut hours = Self::default();

        for (key, windows) in raw {
            let Some(day) = key
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|index| hours.days.get_mut(index))
            else {
                warn!(key = %key, "Ignoring pickup hours for unknown weekday");
                continue;
            };

            for (start, end) in windows.unwrap_or_default() {
                let window = start
                    .parse::<SlotTime>()
                    .ok()
                    .zip(end.parse::<SlotTime>().ok())
                    .and_then(|(start, end)| TimeWindow::new(start, end));

                match window {
                    Some(window) => day.push(window),
                    None => warn!(
                        weekday = %key,
                        start = %start,
                        end = %end,
                        "Ignoring malformed pickup window"
                    ),
                }
            }
        }

        hours
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn t(s: &str) -> SlotTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_backend_payload() {
        let hours: WeeklyHours = serde_json::from_str(
            r#"{"3": [["11:00", "17:00"]], "4": [["11:00", "17:00"]], "5": [["11:00", "15:00"]]}"#,
        )
        .unwrap();

        assert!(!hours.is_open(Weekday::Mon));
        assert!(hours.is_open(Weekday::Thu));
        assert_eq!(
            hours.windows(Weekday::Sat),
            &[TimeWindow::new(t("11:00"), t("15:00")).unwrap()]
        );
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let hours: WeeklyHours = serde_json::from_str(
            r#"{"0": [["8", "16:00"], ["08:00", "16:00"]], "1": null, "2": [], "9": [["08:00", "09:00"]], "6": [["17:00", "09:00"]]}"#,
        )
        .unwrap();

        assert_eq!(hours.windows(Weekday::Mon).len(), 1);
        assert!(!hours.is_open(Weekday::Tue));
        assert!(!hours.is_open(Weekday::Wed));
        assert!(!hours.is_open(Weekday::Sun));
    }

    #[test]
    fn test_hourly_slots_inclusive() {
        let window = TimeWindow::new(t("08:00"), t("16:00")).unwrap();
        let slots: Vec<String> = window.hourly_slots().map(|s| s.to_string()).collect();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots.first().map(String::as_str), Some("08:00"));
        assert_eq!(slots.last().map(String::as_str), Some("16:00"));
    }

    #[test]
    fn test_hourly_slots_skip_partial_hours() {
        let window = TimeWindow::new(t("08:30"), t("11:15")).unwrap();
        let slots: Vec<String> = window.hourly_slots().map(|s| s.to_string()).collect();
        assert_eq!(slots, vec!["09:00", "10:00", "11:00"]);
    }
}
