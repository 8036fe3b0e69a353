//! Integration tests for Leipomo.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p leipomo-integration-tests
//! ```
//!
//! The tests drive a real [`OrderFlow`] against [`FakeBackend`], an
//! in-process stand-in for the ordering API, with a [`MemoryStore`] and a
//! [`FixedClock`], so availability is deterministic and no network or disk
//! is involved.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Guided checkout, navigation and availability checks
//! - `session_resume` - Persistence across reloads and storage failures
//! - `order_submission` - Placing orders and handling rejections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use leipomo_core::{CategoryId, Language, Price, ProductId, SlotTime};
use leipomo_ordering::api::{
    ApiError, Category, OrderBackend, OrderReference, OrderRequest, OrderResponse, Product,
};
use leipomo_ordering::clock::FixedClock;
use leipomo_ordering::persistence::MemoryStore;
use leipomo_ordering::schedule::{OrderConstraints, TimeWindow, WeeklyHours};
use leipomo_ordering::{FlowSettings, OrderFlow};

/// The flow as wired for tests.
pub type TestFlow = OrderFlow<FakeBackend, Arc<MemoryStore>, FixedClock>;

/// How the fake answers an order.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    Accept(OrderReference),
    /// Non-2xx with an optional `detail`.
    Reject { status: u16, detail: Option<String> },
    /// 2xx without an order number.
    MissingReference,
    /// Network failure.
    Down,
}

#[derive(Debug)]
struct State {
    categories: Option<Vec<Category>>,
    products: Option<Vec<Product>>,
    hours: Option<WeeklyHours>,
    constraints: Option<OrderConstraints>,
    outcome: OrderOutcome,
    orders: Vec<OrderRequest>,
    languages: Vec<Language>,
}

/// In-process ordering API. `None` data makes the matching endpoint fail.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the flow.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
    hours_calls: Arc<AtomicUsize>,
    constraints_calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    /// A bakery open on Mondays 08:00-16:00 with the default constraints.
    #[must_use]
    pub fn bakery() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                categories: Some(vec![
                    category(1, "Uunituoreet"),
                    category(2, "Pakasteet"),
                    category(3, "Lahjakortit"),
                ]),
                products: Some(vec![pulla(), ruisleipa(), sold_out_product()]),
                hours: Some(monday_hours()),
                constraints: Some(OrderConstraints::fallback()),
                outcome: OrderOutcome::Accept(OrderReference::Number(1042)),
                orders: Vec::new(),
                languages: Vec::new(),
            })),
            hours_calls: Arc::new(AtomicUsize::new(0)),
            constraints_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_categories(&self, categories: Option<Vec<Category>>) {
        self.state().categories = categories;
    }

    pub fn set_hours(&self, hours: Option<WeeklyHours>) {
        self.state().hours = hours;
    }

    pub fn set_constraints(&self, constraints: Option<OrderConstraints>) {
        self.state().constraints = constraints;
    }

    pub fn set_outcome(&self, outcome: OrderOutcome) {
        self.state().outcome = outcome;
    }

    /// Orders received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.state().orders.clone()
    }

    /// Languages requests were made in, in call order.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.state().languages.clone()
    }

    #[must_use]
    pub fn hours_calls(&self) -> usize {
        self.hours_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn constraints_calls(&self) -> usize {
        self.constraints_calls.load(Ordering::SeqCst)
    }
}

fn unavailable(endpoint: &str) -> ApiError {
    ApiError::Unavailable(format!("{endpoint} is down"))
}

#[async_trait]
impl OrderBackend for FakeBackend {
    async fn categories(&self, language: Language) -> Result<Vec<Category>, ApiError> {
        let mut state = self.state();
        state.languages.push(language);
        state.categories.clone().ok_or_else(|| unavailable("categories"))
    }

    async fn products(
        &self,
        category: Option<CategoryId>,
        language: Language,
    ) -> Result<Vec<Product>, ApiError> {
        let mut state = self.state();
        state.languages.push(language);
        let products = state.products.clone().ok_or_else(|| unavailable("products"))?;

        // Category 1 holds the bread, everything else is empty.
        Ok(match category {
            None => products,
            Some(id) if id == CategoryId::new(1) => products,
            Some(_) => Vec::new(),
        })
    }

    async fn pickup_hours(&self, language: Language) -> Result<WeeklyHours, ApiError> {
        self.hours_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.languages.push(language);
        state.hours.clone().ok_or_else(|| unavailable("pickup_hours"))
    }

    async fn order_constraints(&self, language: Language) -> Result<OrderConstraints, ApiError> {
        self.constraints_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.languages.push(language);
        state
            .constraints
            .clone()
            .ok_or_else(|| unavailable("order_constraints"))
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse, ApiError> {
        let mut state = self.state();
        state.orders.push(request.clone());
        match state.outcome.clone() {
            OrderOutcome::Accept(reference) => Ok(OrderResponse {
                reference: Some(reference),
                reason: None,
            }),
            OrderOutcome::Reject { status, detail } => Err(ApiError::Status { status, detail }),
            OrderOutcome::MissingReference => Ok(OrderResponse::default()),
            OrderOutcome::Down => Err(unavailable("order")),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn category(id: i64, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        image_url: None,
    }
}

#[must_use]
pub fn pulla() -> Product {
    Product {
        id: ProductId::new(7),
        sku: Some("PULLA".to_string()),
        name: "Pulla".to_string(),
        price: Some(Price::from_cents(350)),
        image_url: None,
        in_stock: Some(true),
        quantity: None,
    }
}

#[must_use]
pub fn ruisleipa() -> Product {
    Product {
        id: ProductId::new(12),
        sku: Some("RUIS-500".to_string()),
        name: "Ruisleipä".to_string(),
        price: Some(Price::from_cents(600)),
        image_url: None,
        in_stock: None,
        quantity: Some(4),
    }
}

#[must_use]
pub fn sold_out_product() -> Product {
    Product {
        id: ProductId::new(30),
        sku: None,
        name: "Joulutorttu".to_string(),
        price: Some(Price::from_cents(250)),
        image_url: None,
        in_stock: Some(false),
        quantity: None,
    }
}

/// Monday 08:00-16:00, closed otherwise.
#[must_use]
pub fn monday_hours() -> WeeklyHours {
    WeeklyHours::closed().with_window(Weekday::Mon, window(8, 16))
}

/// Monday to Friday 08:00-16:00.
#[must_use]
pub fn weekday_hours() -> WeeklyHours {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
    .into_iter()
    .fold(WeeklyHours::closed(), |hours, day| {
        hours.with_window(day, window(8, 16))
    })
}

fn window(start: u32, end: u32) -> TimeWindow {
    slot(start, 0)
        .zip(slot(end, 0))
        .and_then(|(start, end)| TimeWindow::new(start, end))
        .unwrap_or_else(|| panic!("invalid window {start}-{end}"))
}

fn slot(hour: u32, minute: u32) -> Option<SlotTime> {
    SlotTime::new(hour, minute)
}

/// A `SlotTime` fixture.
///
/// # Panics
///
/// Panics on an invalid time.
#[must_use]
pub fn at(hour: u32, minute: u32) -> SlotTime {
    slot(hour, minute).unwrap_or_else(|| panic!("invalid time {hour}:{minute}"))
}

/// A date fixture.
///
/// # Panics
///
/// Panics on an invalid date.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}

/// A wall-clock fixture.
///
/// # Panics
///
/// Panics on an invalid date or time.
#[must_use]
pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| panic!("invalid time {hour}:{minute}"))
}

/// Friday 2026-10-16 09:00, a week and a half before Monday 2026-10-26.
#[must_use]
pub fn friday_morning() -> NaiveDateTime {
    datetime(2026, 10, 16, 9, 0)
}

/// Open a flow over `backend` and `store` at `now` with default settings.
#[must_use]
pub fn open_flow(backend: &FakeBackend, store: &Arc<MemoryStore>, now: NaiveDateTime) -> TestFlow {
    open_flow_with(backend, store, now, FlowSettings::default())
}

#[must_use]
pub fn open_flow_with(
    backend: &FakeBackend,
    store: &Arc<MemoryStore>,
    now: NaiveDateTime,
    settings: FlowSettings,
) -> TestFlow {
    OrderFlow::open(
        backend.clone(),
        Arc::clone(store),
        FixedClock::new(now),
        settings,
    )
}
