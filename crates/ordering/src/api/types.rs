//! Wire types for the ordering API.

use core::fmt;

use leipomo_core::{CategoryId, Price, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schedule::WeeklyHours;

/// `{ "items": [...] }` list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `{ "hours": {...} }` envelope of the pickup hours endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoursEnvelope {
    #[serde(default)]
    pub hours: WeeklyHours,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    /// Units left, when the shop tracks stock.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl Product {
    /// Explicitly out of stock, or tracked stock at zero.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.in_stock == Some(false) || self.quantity == Some(0)
    }
}

// =============================================================================
// Order creation
// =============================================================================

/// Body of `POST order`. Absent optional values are omitted, not `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    /// `YYYY-MM-DDTHH:MM`, local time.
    pub pickup_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub quantity: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

/// The order identifier returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderReference {
    Number(i64),
    Text(String),
}

impl OrderReference {
    /// Zero and blank references count as missing.
    fn is_present(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0,
            Self::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A successful (2xx) order response, reduced to what matters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderResponse {
    /// `orderNumber`, else `id`.
    pub reference: Option<OrderReference>,
    /// Any reason the body gives, for responses without a reference.
    pub reason: Option<String>,
}

impl From<Value> for OrderResponse {
    fn from(body: Value) -> Self {
        let reference = ["orderNumber", "id"].iter().find_map(|field| {
            body.get(field)
                .cloned()
                .and_then(|v| serde_json::from_value::<OrderReference>(v).ok())
                .filter(OrderReference::is_present)
        });

        Self {
            reference,
            reason: failure_reason(&body),
        }
    }
}

/// The human-readable reason in an error body: `detail`, `error` or
/// `message`, in that order. Non-string values are rendered as JSON.
#[must_use]
pub fn failure_reason(body: &Value) -> Option<String> {
    ["detail", "error", "message"].iter().find_map(|field| {
        match body.get(field)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    })
}
