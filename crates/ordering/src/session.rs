//! The order session: cart plus in-progress checkout fields.

use chrono::NaiveDate;
use leipomo_core::{CheckoutStep, SlotTime, YearMonth};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::cart::Cart;

/// Everything the customer has entered so far.
///
/// Stored as one record. Each field is restored independently: a field that
/// is missing or malformed keeps its default instead of discarding the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSession {
    #[serde(deserialize_with = "lenient")]
    pub cart: Cart,
    #[serde(deserialize_with = "lenient")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient")]
    pub pickup_time: Option<SlotTime>,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub email: String,
    #[serde(deserialize_with = "lenient")]
    pub phone: String,
    #[serde(deserialize_with = "lenient")]
    pub note: String,
    /// `None` outside checkout.
    #[serde(deserialize_with = "lenient")]
    pub step: Option<CheckoutStep>,
    /// Month shown by the date step; `None` means the current month.
    #[serde(deserialize_with = "lenient")]
    pub calendar_month: Option<YearMonth>,
}

impl OrderSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a checkout is in progress.
    #[must_use]
    pub const fn in_checkout(&self) -> bool {
        self.step.is_some()
    }

    /// The pickup moment, when both date and time are chosen.
    #[must_use]
    pub fn pickup(&self) -> Option<(NaiveDate, SlotTime)> {
        self.pickup_date.zip(self.pickup_time)
    }

    /// Pickup as sent to the order endpoint: `YYYY-MM-DDTHH:MM`.
    #[must_use]
    pub fn pickup_timestamp(&self) -> Option<String> {
        self.pickup()
            .map(|(date, time)| format!("{}T{time}", date.format("%Y-%m-%d")))
    }

    /// Return to an empty session, as after a placed order.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Deserialize a field, falling back to its default when the stored value
/// has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        warn!(error = %e, "Discarding malformed session field");
        T::default()
    }))
}
