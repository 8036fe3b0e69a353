//! The order flow controller.
//!
//! [`OrderFlow`] owns the session and wires the pieces together: commands go
//! through the checkout state machine, every accepted command is persisted,
//! date and time steps are evaluated against freshly fetched (or cached)
//! schedule data and the clock, and the final step places the order.

mod cache;

use chrono::{NaiveDate, NaiveDateTime};
use leipomo_core::{CategoryId, CheckoutStep, Language, ProductId, SlotTime};
use tracing::{debug, instrument, warn};

use crate::api::{OrderBackend, OrderReference, Product};
use crate::cart::CartSummary;
use crate::catalog::{CatalogView, featured_categories, product_entries};
use crate::checkout::{self, CheckoutError, Command, DateStep, Transition};
use crate::clock::Clock;
use crate::config::{FlowSettings, OfflinePolicy};
use crate::error::FlowError;
use crate::persistence::{self, SESSION_KEY, SessionStore};
use crate::schedule::{ConstraintsSource, Schedule, WeeklyHours};
use crate::session::OrderSession;
use crate::submission;

pub use cache::{ScheduleCache, ScheduleKey, ScheduleValue};

/// What to show after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Category browsing. Call [`OrderFlow::browse`] for the content.
    Catalog,
    Cart(CartSummary),
    Prompt(Prompt),
    /// The order was placed and the session reset.
    Confirmed { reference: OrderReference },
}

/// The question for the current checkout step, with what is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Name {
        current: String,
    },
    Email {
        current: String,
    },
    Phone {
        current: String,
    },
    Date {
        step: DateStep,
        /// Constraints are the offline defaults.
        offline: bool,
    },
    Time {
        date: NaiveDate,
        slots: Vec<SlotTime>,
        selected: Option<SlotTime>,
    },
    Note {
        current: String,
        summary: CartSummary,
        pickup: String,
    },
}

impl Prompt {
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        match self {
            Self::Name { .. } => CheckoutStep::Name,
            Self::Email { .. } => CheckoutStep::Email,
            Self::Phone { .. } => CheckoutStep::Phone,
            Self::Date { .. } => CheckoutStep::Date,
            Self::Time { .. } => CheckoutStep::Time,
            Self::Note { .. } => CheckoutStep::Note,
        }
    }
}

/// Drives one customer's order session.
pub struct OrderFlow<B, S, C> {
    backend: B,
    store: S,
    clock: C,
    settings: FlowSettings,
    session: OrderSession,
    cache: ScheduleCache,
}

impl<B, S, C> OrderFlow<B, S, C>
where
    B: OrderBackend,
    S: SessionStore,
    C: Clock,
{
    /// Open the flow, restoring any stored session.
    pub fn open(backend: B, store: S, clock: C, settings: FlowSettings) -> Self {
        let session = persistence::load(&store);
        debug!(step = ?session.step, lines = session.cart.lines().len(), "Session restored");
        Self {
            backend,
            store,
            clock,
            settings,
            session,
            cache: ScheduleCache::new(),
        }
    }

    #[must_use]
    pub const fn session(&self) -> &OrderSession {
        &self.session
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.settings.language
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Switch language. Menu content is language-scoped, so cached schedule
    /// data is dropped and refetched on next use.
    pub async fn set_language(&mut self, language: Language) {
        if self.settings.language != language {
            self.settings.language = language;
            self.cache.invalidate_all().await;
        }
    }

    /// Re-show wherever the customer left off.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` if the prompt for the stored step cannot be built.
    #[instrument(skip(self), fields(step = ?self.session.step))]
    pub async fn resume(&mut self) -> Result<View, FlowError> {
        match self.session.step {
            Some(step) => Ok(View::Prompt(self.prompt(step).await?)),
            None if !self.session.cart.is_empty() => Ok(View::Cart(self.session.cart.summary())),
            None => Ok(View::Catalog),
        }
    }

    /// Apply a customer command and return the next view.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` if the command is rejected or the order fails. A
    /// rejected command leaves the session as it was.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn dispatch(&mut self, command: Command) -> Result<View, FlowError> {
        let schedule = if command.needs_schedule() {
            Some(self.schedule().await?)
        } else {
            None
        };
        let availability = schedule.as_ref().map(|s| s.at(self.clock.now()));

        let transition = checkout::apply(&mut self.session, command, availability.as_ref())?;
        self.persist();

        match transition {
            Transition::Catalog => Ok(View::Catalog),
            Transition::Cart => Ok(View::Cart(self.session.cart.summary())),
            Transition::Step(step) => Ok(View::Prompt(self.prompt(step).await?)),
            Transition::Submit => {
                let reference = submission::submit(&self.backend, &mut self.session).await?;
                self.persist();
                Ok(View::Confirmed { reference })
            }
        }
    }

    /// Forget the session entirely.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Store` if the stored record cannot be deleted.
    pub fn reset(&mut self) -> Result<(), FlowError> {
        self.session.reset();
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Categories, or the products of one category.
    ///
    /// When categories cannot be loaded, every product is listed instead.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` if products cannot be loaded either.
    #[instrument(skip(self))]
    pub async fn browse(&self, category: Option<CategoryId>) -> Result<CatalogView, FlowError> {
        let language = self.settings.language;

        if let Some(category) = category {
            let products = self.backend.products(Some(category), language).await?;
            return Ok(CatalogView::Products {
                products: product_entries(products, &self.session.cart),
                flat: false,
            });
        }

        match self.backend.categories(language).await {
            Ok(categories) if !categories.is_empty() => Ok(CatalogView::Categories(
                featured_categories(categories, &self.settings.featured_categories),
            )),
            result => {
                if let Err(e) = result {
                    warn!(error = %e, "Categories unavailable, listing all products");
                }
                let products = self.backend.products(None, language).await?;
                Ok(CatalogView::Products {
                    products: product_entries(products, &self.session.cart),
                    flat: true,
                })
            }
        }
    }

    /// Look up a product by ID across the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` if products cannot be loaded.
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, FlowError> {
        let products = self.backend.products(None, self.settings.language).await?;
        Ok(products.into_iter().find(|product| product.id == id))
    }

    // =========================================================================
    // Schedule
    // =========================================================================

    /// Pickup hours and constraints for availability checks.
    ///
    /// Failed fetches fall back to closed hours and the configured default
    /// constraints, and are retried on the next call.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderingUnavailable` when constraints cannot
    /// be fetched and the offline policy is `Block`.
    pub async fn schedule(&self) -> Result<Schedule, FlowError> {
        let hours = self.hours().await;

        if let Some(constraints) = self.cache.constraints().await {
            return Ok(Schedule {
                hours,
                constraints,
                constraints_source: ConstraintsSource::Backend,
            });
        }

        match self.backend.order_constraints(self.settings.language).await {
            Ok(constraints) => {
                self.cache.insert_constraints(constraints.clone()).await;
                Ok(Schedule {
                    hours,
                    constraints,
                    constraints_source: ConstraintsSource::Backend,
                })
            }
            Err(e) if self.settings.offline_policy == OfflinePolicy::Block => {
                warn!(error = %e, "Order constraints unavailable, ordering blocked");
                Err(CheckoutError::OrderingUnavailable.into())
            }
            Err(e) => {
                warn!(error = %e, "Order constraints unavailable, using defaults");
                Ok(Schedule {
                    hours,
                    constraints: self.settings.fallback_constraints.clone(),
                    constraints_source: ConstraintsSource::Fallback,
                })
            }
        }
    }

    async fn hours(&self) -> WeeklyHours {
        if let Some(hours) = self.cache.hours().await {
            return hours;
        }

        match self.backend.pickup_hours(self.settings.language).await {
            Ok(hours) => {
                self.cache.insert_hours(hours.clone()).await;
                hours
            }
            Err(e) => {
                warn!(error = %e, "Pickup hours unavailable, no pickup days offered");
                WeeklyHours::closed()
            }
        }
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    async fn prompt(&mut self, step: CheckoutStep) -> Result<Prompt, FlowError> {
        match step {
            CheckoutStep::Name => Ok(Prompt::Name {
                current: self.session.name.clone(),
            }),
            CheckoutStep::Email => Ok(Prompt::Email {
                current: self.session.email.clone(),
            }),
            CheckoutStep::Phone => Ok(Prompt::Phone {
                current: self.session.phone.clone(),
            }),
            CheckoutStep::Date => self.date_prompt().await,
            CheckoutStep::Time => self.time_prompt().await,
            CheckoutStep::Note => Ok(Prompt::Note {
                current: self.session.note.clone(),
                summary: self.session.cart.summary(),
                pickup: self.session.pickup_timestamp().unwrap_or_default(),
            }),
        }
    }

    async fn date_prompt(&mut self) -> Result<Prompt, FlowError> {
        let schedule = self.schedule().await?;
        let availability = schedule.at(self.clock.now());
        let step = checkout::prepare_date_step(&mut self.session, &availability);
        self.persist();

        Ok(Prompt::Date {
            step,
            offline: schedule.is_fallback(),
        })
    }

    async fn time_prompt(&mut self) -> Result<Prompt, FlowError> {
        let schedule = self.schedule().await?;
        let availability = schedule.at(self.clock.now());
        let chosen = self
            .session
            .pickup_date
            .filter(|date| availability.is_date_available(*date))
            .map(|date| (date, availability.time_slots(date)))
            .filter(|(_, slots)| !slots.is_empty());

        // A restored session may hold a day that has since passed.
        let Some((date, slots)) = chosen else {
            self.session.step = Some(CheckoutStep::Date);
            return self.date_prompt().await;
        };
        let selected = self.session.pickup_time.filter(|time| slots.contains(time));

        Ok(Prompt::Time {
            date,
            slots,
            selected,
        })
    }

    fn persist(&self) {
        persistence::save(&self.store, &self.session);
    }
}
