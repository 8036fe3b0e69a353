//! Ordering API: the backend seam and its HTTP implementation.

mod client;
mod types;

use async_trait::async_trait;
use leipomo_core::{CategoryId, Language};
use thiserror::Error;

use crate::schedule::{OrderConstraints, WeeklyHours};

pub use client::HttpOrderBackend;
pub use types::{
    Category, HoursEnvelope, Items, OrderItem, OrderReference, OrderRequest, OrderResponse,
    Product, failure_reason,
};

/// Errors that can occur when talking to the ordering API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status}{}", detail.as_ref().map(|d| format!(" - {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    /// Failed to parse a response or build a request URL.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend could not be reached at all.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// The backend the ordering engine reads from and submits to.
///
/// Content is language-scoped, so every read carries the widget language.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// `GET categories`
    async fn categories(&self, language: Language) -> Result<Vec<Category>, ApiError>;

    /// `GET products[?category=ID]`
    async fn products(
        &self,
        category: Option<CategoryId>,
        language: Language,
    ) -> Result<Vec<Product>, ApiError>;

    /// `GET pickup_hours`
    async fn pickup_hours(&self, language: Language) -> Result<WeeklyHours, ApiError>;

    /// `GET order_constraints`
    async fn order_constraints(&self, language: Language) -> Result<OrderConstraints, ApiError>;

    /// `POST order`. Non-2xx responses are returned as `ApiError::Status`.
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError>;
}
