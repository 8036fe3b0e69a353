//! HTTP implementation of [`OrderBackend`] using `reqwest`.

use async_trait::async_trait;
use leipomo_core::{CategoryId, Language};
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, warn};
use url::Url;

use super::types::{Category, HoursEnvelope, Items, OrderRequest, OrderResponse, Product};
use super::{ApiError, OrderBackend, failure_reason};
use crate::schedule::{OrderConstraints, WeeklyHours};

const USER_AGENT: &str = concat!("leipomo/", env!("CARGO_PKG_VERSION"));

/// Client for the ordering API.
#[derive(Debug, Clone)]
pub struct HttpOrderBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrderBackend {
    /// Create a client for the API under `base_url`.
    ///
    /// `base_url` should end in `/` so endpoint paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Parse(format!("invalid endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        language: Language,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(COOKIE, language_cookie(language))
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// The backend reads the widget language from the `chat_lang` cookie.
fn language_cookie(language: Language) -> HeaderValue {
    HeaderValue::from_static(match language {
        Language::Fi => "chat_lang=fi",
        Language::Sv => "chat_lang=sv",
        Language::En => "chat_lang=en",
    })
}

/// Build `ApiError::Status`, taking the reason from a JSON error body.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| failure_reason(&value));

    warn!(
        status = %status,
        detail = detail.as_deref().unwrap_or(""),
        "Ordering API returned non-success status"
    );

    ApiError::Status {
        status: status.as_u16(),
        detail,
    }
}

#[async_trait]
impl OrderBackend for HttpOrderBackend {
    #[instrument(skip(self))]
    async fn categories(&self, language: Language) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint("categories")?;
        let list: Items<Category> = self.get_json(url, language).await?;
        Ok(list.items)
    }

    #[instrument(skip(self))]
    async fn products(
        &self,
        category: Option<CategoryId>,
        language: Language,
    ) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("products")?;
        if let Some(category) = category {
            url.query_pairs_mut()
                .append_pair("category", &category.to_string());
        }
        let list: Items<Product> = self.get_json(url, language).await?;
        Ok(list.items)
    }

    #[instrument(skip(self))]
    async fn pickup_hours(&self, language: Language) -> Result<WeeklyHours, ApiError> {
        let url = self.endpoint("pickup_hours")?;
        let envelope: HoursEnvelope = self.get_json(url, language).await?;
        Ok(envelope.hours)
    }

    #[instrument(skip(self))]
    async fn order_constraints(&self, language: Language) -> Result<OrderConstraints, ApiError> {
        let url = self.endpoint("order_constraints")?;
        self.get_json(url, language).await
    }

    #[instrument(skip(self, order), fields(items = order.items.len(), pickup = %order.pickup_time))]
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError> {
        let url = self.endpoint("order")?;
        let response = self.client.post(url).json(order).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let value = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
        Ok(OrderResponse::from(value))
    }
}
